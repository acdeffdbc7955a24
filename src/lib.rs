//! hello-audio - record, save and play back microphone audio
//!
//! Two small utilities over the platform audio layer: a recorder that
//! captures a fixed duration to `recording.wav` and plays it back, and a
//! device lister.

pub mod audio;
pub mod container;
pub mod pipeline;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Installs the global tracing subscriber (`RUST_LOG`, default `hello_audio=info`)
pub fn init_tracing() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "hello_audio=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}
