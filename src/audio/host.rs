//! cpal implementation of `AudioBackend`

use cpal::traits::{DeviceTrait, HostTrait};
use cpal::{Device, Host};

use super::backend::{AudioBackend, AudioError, DeviceInfo, InputStream, OutputStream};
use super::format::StreamParams;
use super::microphone::MicrophoneStream;
use super::speaker::SpeakerStream;

/// Audio context owned by the caller for the lifetime of a run.
///
/// Created once at startup and passed by reference; the underlying host is
/// released when the context is dropped.
pub struct CpalBackend {
    host: Host,
}

impl CpalBackend {
    /// Uses the platform's default host
    pub fn new() -> Self {
        Self::with_host(cpal::default_host())
    }

    pub fn with_host(host: Host) -> Self {
        tracing::debug!("Audio host initialized: {:?}", host.id());
        Self { host }
    }

    fn devices(&self) -> Result<Vec<Device>, AudioError> {
        self.host
            .devices()
            .map(|devices| devices.collect())
            .map_err(|e| AudioError::HostError(e.to_string()))
    }
}

impl Default for CpalBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for CpalBackend {
    fn drop(&mut self) {
        tracing::debug!("Audio host released: {:?}", self.host.id());
    }
}

impl AudioBackend for CpalBackend {
    fn device_count(&self) -> Result<usize, AudioError> {
        Ok(self.devices()?.len())
    }

    fn device_info(&self, index: usize) -> Result<DeviceInfo, AudioError> {
        let device = self
            .devices()?
            .into_iter()
            .nth(index)
            .ok_or(AudioError::DeviceIndex(index))?;

        let name = device
            .name()
            .map_err(|e| AudioError::HostError(e.to_string()))?;

        // Devices without inputs (or outputs) report an error rather than an
        // empty list on some hosts.
        let max_input_channels = device
            .supported_input_configs()
            .map(|configs| configs.map(|c| c.channels()).max().unwrap_or(0))
            .unwrap_or(0);
        let max_output_channels = device
            .supported_output_configs()
            .map(|configs| configs.map(|c| c.channels()).max().unwrap_or(0))
            .unwrap_or(0);

        let default_sample_rate = device
            .default_input_config()
            .or_else(|_| device.default_output_config())
            .map(|config| config.sample_rate().0)
            .ok();

        Ok(DeviceInfo {
            index,
            name,
            max_input_channels,
            max_output_channels,
            default_sample_rate,
        })
    }

    fn open_input(&self, params: &StreamParams) -> Result<Box<dyn InputStream>, AudioError> {
        let device = self
            .host
            .default_input_device()
            .ok_or(AudioError::NoInputDevice)?;
        Ok(Box::new(MicrophoneStream::open(&device, params)?))
    }

    fn open_output(&self, params: &StreamParams) -> Result<Box<dyn OutputStream>, AudioError> {
        let device = self
            .host
            .default_output_device()
            .ok_or(AudioError::NoOutputDevice)?;
        Ok(Box::new(SpeakerStream::open(&device, params)?))
    }
}
