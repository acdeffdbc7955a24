//! Platform audio abstraction
//!
//! The recorder and the device lister only talk to the platform through these
//! traits. `CpalBackend` is the real implementation; tests use the generated
//! mocks.

use super::format::StreamParams;
use thiserror::Error;

/// Audio layer errors
#[derive(Error, Debug)]
pub enum AudioError {
    #[error("No input device available")]
    NoInputDevice,

    #[error("No output device available")]
    NoOutputDevice,

    #[error("No audio device at index {0}")]
    DeviceIndex(usize),

    #[error("Audio host error: {0}")]
    HostError(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Stream error: {0}")]
    StreamError(String),

    #[error("Unsupported sample format: {0}")]
    UnsupportedFormat(String),
}

/// Description of one audio device as reported by the platform
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceInfo {
    pub index: usize,
    pub name: String,
    pub max_input_channels: u16,
    pub max_output_channels: u16,
    pub default_sample_rate: Option<u32>,
}

/// Blocking input stream
#[cfg_attr(test, mockall::automock)]
pub trait InputStream {
    /// Blocks until `frames` frames are captured and returns them as raw bytes
    fn read(&mut self, frames: usize) -> Result<Vec<u8>, AudioError>;

    /// Stops capturing. The stream is released when dropped.
    fn stop(&mut self) -> Result<(), AudioError>;
}

/// Blocking output stream
#[cfg_attr(test, mockall::automock)]
pub trait OutputStream {
    /// Queues raw bytes for playback, blocking while the queue is full
    fn write(&mut self, bytes: &[u8]) -> Result<(), AudioError>;

    /// Waits until everything written has been played, then stops the stream
    fn finish(&mut self) -> Result<(), AudioError>;
}

/// Handle on the platform audio subsystem
#[cfg_attr(test, mockall::automock)]
pub trait AudioBackend {
    /// Number of devices known to the platform
    fn device_count(&self) -> Result<usize, AudioError>;

    /// Descriptor of the device at `index` (`0..device_count()`)
    fn device_info(&self, index: usize) -> Result<DeviceInfo, AudioError>;

    /// Opens and starts an input stream on the default input device
    fn open_input(&self, params: &StreamParams) -> Result<Box<dyn InputStream>, AudioError>;

    /// Opens and starts an output stream on the default output device
    fn open_output(&self, params: &StreamParams) -> Result<Box<dyn OutputStream>, AudioError>;
}
