//! Audio capture from the microphone
//!
//! cpal delivers samples on its own callback thread. The callback pushes them
//! into a ring buffer and `read` pops whole chunks from it, blocking until a
//! chunk is complete.

use cpal::traits::{DeviceTrait, StreamTrait};
use cpal::{Device, FromSample, Sample, SampleRate, SizedSample, Stream, StreamConfig};
use ringbuf::{traits::*, HeapRb};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

use super::backend::{AudioError, InputStream};
use super::format::StreamParams;

/// Wait between two polls of the ring buffer when it has nothing to give
pub(super) const POLL_INTERVAL: Duration = Duration::from_millis(2);

/// First error reported by a cpal error callback
#[derive(Clone, Default)]
pub(super) struct ErrorSlot(Arc<Mutex<Option<String>>>);

impl ErrorSlot {
    pub(super) fn set(&self, message: String) {
        if let Ok(mut slot) = self.0.lock() {
            if slot.is_none() {
                *slot = Some(message);
            }
        }
    }

    pub(super) fn check(&self) -> Result<(), AudioError> {
        match self.0.lock() {
            Ok(slot) => match slot.as_ref() {
                Some(message) => Err(AudioError::StreamError(message.clone())),
                None => Ok(()),
            },
            Err(_) => Err(AudioError::StreamError("error slot poisoned".to_string())),
        }
    }
}

/// Input stream on a cpal device
pub struct MicrophoneStream {
    stream: Stream,
    consumer: ringbuf::HeapCons<f32>,
    params: StreamParams,
    dropped: Arc<AtomicUsize>,
    errors: ErrorSlot,
}

impl MicrophoneStream {
    /// Opens and starts capture on `device` with the requested parameters
    pub fn open(device: &Device, params: &StreamParams) -> Result<Self, AudioError> {
        let native_format = device
            .default_input_config()
            .map_err(|e| AudioError::ConfigError(e.to_string()))?
            .sample_format();

        let stream_config = StreamConfig {
            channels: params.channels,
            sample_rate: SampleRate(params.sample_rate),
            buffer_size: cpal::BufferSize::Default,
        };

        let rb = HeapRb::<f32>::new(params.ring_capacity());
        let (producer, consumer) = rb.split();
        let dropped = Arc::new(AtomicUsize::new(0));
        let errors = ErrorSlot::default();

        let stream = match native_format {
            cpal::SampleFormat::F32 => {
                build_capture::<f32>(device, &stream_config, producer, &dropped, &errors)
            }
            cpal::SampleFormat::I16 => {
                build_capture::<i16>(device, &stream_config, producer, &dropped, &errors)
            }
            cpal::SampleFormat::U16 => {
                build_capture::<u16>(device, &stream_config, producer, &dropped, &errors)
            }
            cpal::SampleFormat::I32 => {
                build_capture::<i32>(device, &stream_config, producer, &dropped, &errors)
            }
            cpal::SampleFormat::U8 => {
                build_capture::<u8>(device, &stream_config, producer, &dropped, &errors)
            }
            other => return Err(AudioError::UnsupportedFormat(format!("{:?}", other))),
        }?;

        stream
            .play()
            .map_err(|e| AudioError::StreamError(e.to_string()))?;

        tracing::info!(
            "Audio capture started on {:?}: {}Hz {}ch {:?} (device native {:?})",
            device.name().unwrap_or_else(|_| "Unknown".to_string()),
            params.sample_rate,
            params.channels,
            params.format,
            native_format
        );

        Ok(Self {
            stream,
            consumer,
            params: params.clone(),
            dropped,
            errors,
        })
    }
}

impl InputStream for MicrophoneStream {
    fn read(&mut self, frames: usize) -> Result<Vec<u8>, AudioError> {
        let wanted = frames * self.params.channels as usize;
        let mut samples = vec![0.0f32; wanted];
        let mut filled = 0;

        while filled < wanted {
            self.errors.check()?;
            let popped = self.consumer.pop_slice(&mut samples[filled..]);
            filled += popped;
            if popped == 0 {
                thread::sleep(POLL_INTERVAL);
            }
        }

        Ok(self.params.format.encode(&samples))
    }

    fn stop(&mut self) -> Result<(), AudioError> {
        self.stream
            .pause()
            .map_err(|e| AudioError::StreamError(e.to_string()))?;

        let dropped = self.dropped.swap(0, Ordering::Relaxed);
        if dropped > 0 {
            tracing::warn!("{} captured samples dropped (ring buffer full)", dropped);
        }

        tracing::info!("Audio capture stopped");
        Ok(())
    }
}

fn build_capture<T>(
    device: &Device,
    config: &StreamConfig,
    mut producer: ringbuf::HeapProd<f32>,
    dropped: &Arc<AtomicUsize>,
    errors: &ErrorSlot,
) -> Result<Stream, AudioError>
where
    T: SizedSample,
    f32: FromSample<T>,
{
    let dropped = Arc::clone(dropped);
    let errors = errors.clone();

    device
        .build_input_stream(
            config,
            move |data: &[T], _: &cpal::InputCallbackInfo| {
                let mut lost = 0;
                for &sample in data {
                    if producer.try_push(f32::from_sample(sample)).is_err() {
                        lost += 1;
                    }
                }
                if lost > 0 {
                    dropped.fetch_add(lost, Ordering::Relaxed);
                }
            },
            move |err| {
                tracing::error!("Audio input stream error: {}", err);
                errors.set(err.to_string());
            },
            None,
        )
        .map_err(|e| AudioError::StreamError(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_slot_keeps_first_error() {
        let slot = ErrorSlot::default();
        assert!(slot.check().is_ok());

        slot.set("device unplugged".to_string());
        slot.clone().set("second".to_string());

        match slot.check() {
            Err(AudioError::StreamError(message)) => assert_eq!(message, "device unplugged"),
            other => panic!("unexpected result: {:?}", other),
        }
    }
}
