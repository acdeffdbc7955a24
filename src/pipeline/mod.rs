//! The two utilities built on the audio and container layers
//!
//! - `Recorder`: record → save → play back
//! - `list_devices`: enumerate platform audio devices

mod lister;
mod recorder;

pub use lister::{list_devices, write_device_report};
pub use recorder::{PipelineError, PlaybackSummary, Recorder, RecorderConfig};
