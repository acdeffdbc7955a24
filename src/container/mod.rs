//! Audio container persistence
//!
//! Recorded frames are written to an uncompressed WAV file and read back in
//! chunks for playback.

mod wav;

pub use wav::{ContainerError, ContainerSpec, WavSink, WavSource};
