//! Record, save and play back
//!
//! Records a fixed duration from the default input device into memory, writes
//! it to a WAV container, then plays the container on the default output
//! device.

use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

use crate::audio::{AudioBackend, AudioError, FrameBuffer, SampleFormat, StreamParams};
use crate::container::{ContainerError, ContainerSpec, WavSink, WavSource};

/// Recorder configuration
#[derive(Debug, Clone)]
pub struct RecorderConfig {
    /// Frames per read and per write
    pub chunk_size: usize,
    pub format: SampleFormat,
    /// Number of channels (1 = mono)
    pub channels: u16,
    pub sample_rate: u32,
    /// How long to record
    pub duration: Duration,
    /// Container written after recording, overwritten on every run
    pub output_path: PathBuf,
}

impl Default for RecorderConfig {
    fn default() -> Self {
        Self {
            chunk_size: 1024,
            format: SampleFormat::I16,
            channels: 1,
            sample_rate: 44100,
            duration: Duration::from_secs(5),
            output_path: PathBuf::from("recording.wav"),
        }
    }
}

impl RecorderConfig {
    /// Number of chunk reads needed to cover `duration`, rounded up
    pub fn chunk_count(&self) -> usize {
        if self.chunk_size == 0 {
            return 0;
        }
        let rate_x_nanos = self.sample_rate as u128 * self.duration.as_nanos();
        let chunk_x_nanos = self.chunk_size as u128 * 1_000_000_000;
        rate_x_nanos.div_ceil(chunk_x_nanos) as usize
    }

    /// Size of the recording once every chunk has been read
    pub fn expected_byte_len(&self) -> usize {
        self.chunk_count() * self.stream_params().chunk_bytes()
    }

    pub fn stream_params(&self) -> StreamParams {
        StreamParams {
            format: self.format,
            channels: self.channels,
            sample_rate: self.sample_rate,
            frames_per_buffer: self.chunk_size,
        }
    }

    pub fn container_spec(&self) -> ContainerSpec {
        ContainerSpec {
            channels: self.channels,
            format: self.format,
            frame_rate: self.sample_rate,
        }
    }

    pub fn validate(&self) -> Result<(), PipelineError> {
        if self.chunk_size == 0 {
            return Err(PipelineError::InvalidConfig("chunk size must be > 0".into()));
        }
        if self.channels == 0 {
            return Err(PipelineError::InvalidConfig("channel count must be > 0".into()));
        }
        if self.sample_rate == 0 {
            return Err(PipelineError::InvalidConfig("sample rate must be > 0".into()));
        }
        Ok(())
    }
}

/// Pipeline errors
#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("Audio error: {0}")]
    Audio(#[from] AudioError),

    #[error("Container error: {0}")]
    Container(#[from] ContainerError),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Input returned {got} bytes instead of a full {expected}-byte chunk")]
    ShortRead { expected: usize, got: usize },
}

/// What `Recorder::play` sent to the output stream
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PlaybackSummary {
    pub chunks: usize,
    pub bytes: usize,
}

/// Recorder/player bound to an audio backend
pub struct Recorder<'a> {
    backend: &'a dyn AudioBackend,
    config: RecorderConfig,
}

impl<'a> Recorder<'a> {
    pub fn new(backend: &'a dyn AudioBackend, config: RecorderConfig) -> Result<Self, PipelineError> {
        config.validate()?;
        Ok(Self { backend, config })
    }

    pub fn config(&self) -> &RecorderConfig {
        &self.config
    }

    /// Captures `chunk_count()` chunks from the default input device
    pub fn record(&self) -> Result<FrameBuffer, PipelineError> {
        let params = self.config.stream_params();
        let chunk_count = self.config.chunk_count();
        let expected = params.chunk_bytes();

        tracing::info!(
            "Recording {:?}: {} chunks of {} frames",
            self.config.duration,
            chunk_count,
            self.config.chunk_size
        );

        let mut input = self.backend.open_input(&params)?;
        let mut frames = FrameBuffer::with_capacity(chunk_count);

        for _ in 0..chunk_count {
            let chunk = input.read(self.config.chunk_size)?;
            if chunk.len() != expected {
                return Err(PipelineError::ShortRead {
                    expected,
                    got: chunk.len(),
                });
            }
            frames.push(chunk);
        }

        input.stop()?;

        tracing::info!("Recorded {} bytes", frames.byte_len());
        Ok(frames)
    }

    /// Writes `frames` to the output container, replacing any previous file
    pub fn save(&self, frames: &FrameBuffer) -> Result<ContainerSpec, PipelineError> {
        let spec = self.config.container_spec();
        let mut sink = WavSink::create(&self.config.output_path, spec)?;

        for chunk in frames.chunks() {
            sink.write_frames(chunk)?;
        }

        let written = sink.bytes_written();
        sink.finalize()?;

        tracing::info!("Saved {} bytes to {:?}", written, self.config.output_path);
        Ok(spec)
    }

    /// Plays the output container until it is exhausted
    pub fn play(&self) -> Result<PlaybackSummary, PipelineError> {
        let mut source = WavSource::open(&self.config.output_path)?;
        let spec = source.spec();

        let params = StreamParams {
            format: spec.format,
            channels: spec.channels,
            sample_rate: spec.frame_rate,
            frames_per_buffer: self.config.chunk_size,
        };

        let mut output = self.backend.open_output(&params)?;
        let mut summary = PlaybackSummary::default();

        loop {
            let data = source.read_frames(self.config.chunk_size)?;
            if data.is_empty() {
                break;
            }
            output.write(&data)?;
            summary.chunks += 1;
            summary.bytes += data.len();
        }

        output.finish()?;

        tracing::info!(
            "Played {} chunks ({} bytes) from {:?}",
            summary.chunks,
            summary.bytes,
            self.config.output_path
        );
        Ok(summary)
    }
}
