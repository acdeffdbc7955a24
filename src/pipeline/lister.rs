//! Audio device enumeration

use std::io::{self, Write};

use crate::audio::{AudioBackend, AudioError, DeviceInfo};

/// Queries every device known to the backend, in index order
pub fn list_devices(backend: &dyn AudioBackend) -> Result<Vec<DeviceInfo>, AudioError> {
    let count = backend.device_count()?;
    tracing::debug!("{} audio device(s) reported", count);

    (0..count).map(|index| backend.device_info(index)).collect()
}

/// Prints the device count followed by one block per device
pub fn write_device_report<W: Write>(devices: &[DeviceInfo], out: &mut W) -> io::Result<()> {
    writeln!(out, "Number of audio devices: {}", devices.len())?;

    for device in devices {
        writeln!(out)?;
        writeln!(out, "Device {}: {}", device.index, device.name)?;
        writeln!(out, "  Max input channels: {}", device.max_input_channels)?;
        writeln!(out, "  Max output channels: {}", device.max_output_channels)?;
    }

    Ok(())
}
