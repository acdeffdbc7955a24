//! Audio capture and playback
//!
//! Platform access goes through the `AudioBackend` trait; `CpalBackend` is
//! the cpal implementation.

mod backend;
mod buffer;
mod format;
mod host;
mod microphone;
mod speaker;

pub use backend::{AudioBackend, AudioError, DeviceInfo, InputStream, OutputStream};
pub use buffer::FrameBuffer;
pub use format::{SampleFormat, StreamParams};
pub use host::CpalBackend;
pub use microphone::MicrophoneStream;
pub use speaker::SpeakerStream;

#[cfg(test)]
pub use backend::{MockAudioBackend, MockInputStream, MockOutputStream};
