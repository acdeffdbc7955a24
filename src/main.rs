//! hello-audio - records five seconds of microphone audio to
//! `recording.wav`, then plays it back.

use anyhow::{Context, Result};
use hello_audio::audio::CpalBackend;
use hello_audio::pipeline::{Recorder, RecorderConfig};

fn main() -> Result<()> {
    hello_audio::init_tracing();

    tracing::info!("hello-audio v{}", env!("CARGO_PKG_VERSION"));

    let backend = CpalBackend::new();
    let recorder = Recorder::new(&backend, RecorderConfig::default())?;
    let output_path = recorder.config().output_path.clone();

    println!("Recording...");
    let frames = recorder.record().context("recording failed")?;
    println!("Recording finished");

    println!("Saving to {}...", output_path.display());
    recorder
        .save(&frames)
        .with_context(|| format!("could not save {}", output_path.display()))?;
    println!("File saved");

    println!("Playing back recording...");
    recorder.play().context("playback failed")?;
    println!("Playback finished");

    Ok(())
}
