//! Audio playback to the default output device
//!
//! `write` pushes decoded samples into a ring buffer that the cpal callback
//! drains; the callback plays silence when the buffer runs dry.

use cpal::traits::{DeviceTrait, StreamTrait};
use cpal::{Device, FromSample, SampleRate, SizedSample, Stream, StreamConfig};
use ringbuf::{traits::*, HeapRb};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use super::backend::{AudioError, OutputStream};
use super::format::StreamParams;
use super::microphone::{ErrorSlot, POLL_INTERVAL};

/// Extra wait after the ring buffer is empty, so the device plays its last period
const DRAIN_TAIL: Duration = Duration::from_millis(100);

/// Output stream on a cpal device
pub struct SpeakerStream {
    stream: Stream,
    producer: ringbuf::HeapProd<f32>,
    /// Samples written but not yet taken by the callback
    pending: Arc<AtomicUsize>,
    params: StreamParams,
    errors: ErrorSlot,
}

impl SpeakerStream {
    /// Opens and starts playback on `device` with the requested parameters
    pub fn open(device: &Device, params: &StreamParams) -> Result<Self, AudioError> {
        let native_format = device
            .default_output_config()
            .map_err(|e| AudioError::ConfigError(e.to_string()))?
            .sample_format();

        let stream_config = StreamConfig {
            channels: params.channels,
            sample_rate: SampleRate(params.sample_rate),
            buffer_size: cpal::BufferSize::Default,
        };

        let rb = HeapRb::<f32>::new(params.ring_capacity());
        let (producer, consumer) = rb.split();
        let pending = Arc::new(AtomicUsize::new(0));
        let errors = ErrorSlot::default();

        let stream = match native_format {
            cpal::SampleFormat::F32 => {
                build_playback::<f32>(device, &stream_config, consumer, &pending, &errors)
            }
            cpal::SampleFormat::I16 => {
                build_playback::<i16>(device, &stream_config, consumer, &pending, &errors)
            }
            cpal::SampleFormat::U16 => {
                build_playback::<u16>(device, &stream_config, consumer, &pending, &errors)
            }
            cpal::SampleFormat::I32 => {
                build_playback::<i32>(device, &stream_config, consumer, &pending, &errors)
            }
            cpal::SampleFormat::U8 => {
                build_playback::<u8>(device, &stream_config, consumer, &pending, &errors)
            }
            other => return Err(AudioError::UnsupportedFormat(format!("{:?}", other))),
        }?;

        stream
            .play()
            .map_err(|e| AudioError::StreamError(e.to_string()))?;

        tracing::info!(
            "Audio playback started on {:?}: {}Hz {}ch {:?}",
            device.name().unwrap_or_else(|_| "Unknown".to_string()),
            params.sample_rate,
            params.channels,
            params.format
        );

        Ok(Self {
            stream,
            producer,
            pending,
            params: params.clone(),
            errors,
        })
    }
}

impl OutputStream for SpeakerStream {
    fn write(&mut self, bytes: &[u8]) -> Result<(), AudioError> {
        let samples = self.params.format.decode(bytes);
        let mut offset = 0;

        while offset < samples.len() {
            self.errors.check()?;
            let pushed = self.producer.push_slice(&samples[offset..]);
            offset += pushed;
            self.pending.fetch_add(pushed, Ordering::AcqRel);
            if pushed == 0 {
                thread::sleep(POLL_INTERVAL);
            }
        }

        Ok(())
    }

    fn finish(&mut self) -> Result<(), AudioError> {
        while self.pending.load(Ordering::Acquire) > 0 {
            self.errors.check()?;
            thread::sleep(POLL_INTERVAL);
        }
        thread::sleep(DRAIN_TAIL);

        self.stream
            .pause()
            .map_err(|e| AudioError::StreamError(e.to_string()))?;

        tracing::info!("Audio playback stopped");
        Ok(())
    }
}

fn build_playback<T>(
    device: &Device,
    config: &StreamConfig,
    mut consumer: ringbuf::HeapCons<f32>,
    pending: &Arc<AtomicUsize>,
    errors: &ErrorSlot,
) -> Result<Stream, AudioError>
where
    T: SizedSample + FromSample<f32>,
{
    let pending = Arc::clone(pending);
    let errors = errors.clone();

    device
        .build_output_stream(
            config,
            move |data: &mut [T], _: &cpal::OutputCallbackInfo| {
                let mut played = 0;
                for out in data.iter_mut() {
                    *out = match consumer.try_pop() {
                        Some(sample) => {
                            played += 1;
                            T::from_sample(sample)
                        }
                        None => T::EQUILIBRIUM,
                    };
                }
                if played > 0 {
                    pending.fetch_sub(played, Ordering::AcqRel);
                }
            },
            move |err| {
                tracing::error!("Audio output stream error: {}", err);
                errors.set(err.to_string());
            },
            None,
        )
        .map_err(|e| AudioError::StreamError(e.to_string()))
}
