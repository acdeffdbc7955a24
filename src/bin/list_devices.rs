//! Lists the audio devices known to the platform with their channel counts.

use anyhow::{Context, Result};
use hello_audio::audio::CpalBackend;
use hello_audio::pipeline::{list_devices, write_device_report};

fn main() -> Result<()> {
    hello_audio::init_tracing();

    let backend = CpalBackend::new();
    let devices = list_devices(&backend).context("could not query audio devices")?;

    let stdout = std::io::stdout();
    write_device_report(&devices, &mut stdout.lock())?;

    Ok(())
}
