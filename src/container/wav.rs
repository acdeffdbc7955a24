//! WAV container for recorded audio
//!
//! Stores raw little-endian frames behind a RIFF/WAVE header and hands them
//! back in fixed-size chunks.

use hound::{WavReader, WavSpec, WavWriter};
use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;
use thiserror::Error;

use crate::audio::SampleFormat;

/// Container errors
#[derive(Error, Debug)]
pub enum ContainerError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("WAV error: {0}")]
    Wav(#[from] hound::Error),

    #[error("Unsupported WAV format: {bits}-bit {kind}")]
    UnsupportedFormat { bits: u16, kind: &'static str },

    #[error("{len} bytes is not a whole number of {frame_bytes}-byte frames")]
    MisalignedFrames { len: usize, frame_bytes: usize },
}

/// Header fields of a container
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContainerSpec {
    pub channels: u16,
    pub format: SampleFormat,
    pub frame_rate: u32,
}

impl ContainerSpec {
    /// Bytes per sample
    pub fn sample_width(&self) -> usize {
        self.format.width()
    }

    /// Bytes per frame
    pub fn frame_bytes(&self) -> usize {
        self.sample_width() * self.channels as usize
    }

    fn to_wav(self) -> WavSpec {
        WavSpec {
            channels: self.channels,
            sample_rate: self.frame_rate,
            bits_per_sample: (self.sample_width() * 8) as u16,
            sample_format: if self.format.is_float() {
                hound::SampleFormat::Float
            } else {
                hound::SampleFormat::Int
            },
        }
    }

    fn from_wav(spec: WavSpec) -> Result<Self, ContainerError> {
        let format = match (spec.sample_format, spec.bits_per_sample) {
            (hound::SampleFormat::Float, 32) => Some(SampleFormat::F32),
            (hound::SampleFormat::Int, bits) if bits % 8 == 0 => {
                SampleFormat::from_width(bits as usize / 8)
            }
            _ => None,
        };

        let format = format.ok_or(ContainerError::UnsupportedFormat {
            bits: spec.bits_per_sample,
            kind: match spec.sample_format {
                hound::SampleFormat::Float => "float",
                hound::SampleFormat::Int => "integer",
            },
        })?;

        Ok(Self {
            channels: spec.channels,
            format,
            frame_rate: spec.sample_rate,
        })
    }
}

/// Write side of a container. Creating one truncates any existing file.
///
/// Dropping a sink without calling `finalize` still writes the header, but
/// any error doing so is lost.
pub struct WavSink {
    writer: WavWriter<BufWriter<File>>,
    spec: ContainerSpec,
    bytes_written: usize,
}

impl WavSink {
    pub fn create(path: impl AsRef<Path>, spec: ContainerSpec) -> Result<Self, ContainerError> {
        let writer = WavWriter::create(path.as_ref(), spec.to_wav())?;
        tracing::debug!("WAV container created: {:?} ({:?})", path.as_ref(), spec);

        Ok(Self {
            writer,
            spec,
            bytes_written: 0,
        })
    }

    /// Appends raw frames; `bytes` must hold whole frames
    pub fn write_frames(&mut self, bytes: &[u8]) -> Result<(), ContainerError> {
        let frame_bytes = self.spec.frame_bytes();
        if bytes.len() % frame_bytes != 0 {
            return Err(ContainerError::MisalignedFrames {
                len: bytes.len(),
                frame_bytes,
            });
        }

        match self.spec.format {
            SampleFormat::U8 => {
                // hound stores 8-bit samples unsigned and takes them as i8
                for &byte in bytes {
                    self.writer.write_sample((byte as i16 - 128) as i8)?;
                }
            }
            SampleFormat::I16 => {
                for b in bytes.chunks_exact(2) {
                    self.writer.write_sample(i16::from_le_bytes([b[0], b[1]]))?;
                }
            }
            SampleFormat::F32 => {
                for b in bytes.chunks_exact(4) {
                    self.writer
                        .write_sample(f32::from_le_bytes([b[0], b[1], b[2], b[3]]))?;
                }
            }
        }

        self.bytes_written += bytes.len();
        Ok(())
    }

    pub fn bytes_written(&self) -> usize {
        self.bytes_written
    }

    /// Writes the final header sizes and closes the file
    pub fn finalize(self) -> Result<(), ContainerError> {
        self.writer.finalize()?;
        Ok(())
    }
}

/// Read side of a container
pub struct WavSource {
    reader: WavReader<BufReader<File>>,
    spec: ContainerSpec,
}

impl WavSource {
    pub fn open(path: impl AsRef<Path>) -> Result<Self, ContainerError> {
        let reader = WavReader::open(path.as_ref())?;
        let spec = ContainerSpec::from_wav(reader.spec())?;
        tracing::debug!(
            "WAV container opened: {:?} ({:?}, {} frames)",
            path.as_ref(),
            spec,
            reader.duration()
        );

        Ok(Self { reader, spec })
    }

    pub fn spec(&self) -> ContainerSpec {
        self.spec
    }

    /// Total number of frames stored
    pub fn frame_count(&self) -> u32 {
        self.reader.duration()
    }

    /// Reads up to `frames` frames as raw bytes.
    ///
    /// Returns fewer bytes for the last partial chunk and an empty vector once
    /// the container is exhausted.
    pub fn read_frames(&mut self, frames: usize) -> Result<Vec<u8>, ContainerError> {
        let wanted = frames * self.spec.channels as usize;

        let bytes = match self.spec.format {
            SampleFormat::U8 => self
                .reader
                .samples::<i8>()
                .take(wanted)
                .map(|s| s.map(|v| (v as i16 + 128) as u8))
                .collect::<Result<Vec<u8>, _>>()?,
            SampleFormat::I16 => {
                let samples = self
                    .reader
                    .samples::<i16>()
                    .take(wanted)
                    .collect::<Result<Vec<i16>, _>>()?;
                samples.iter().flat_map(|s| s.to_le_bytes()).collect()
            }
            SampleFormat::F32 => {
                let samples = self
                    .reader
                    .samples::<f32>()
                    .take(wanted)
                    .collect::<Result<Vec<f32>, _>>()?;
                samples.iter().flat_map(|s| s.to_le_bytes()).collect()
            }
        };

        Ok(bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn temp_path(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!(
            "hello_audio_wav_{}_{}.wav",
            name,
            std::process::id()
        ))
    }

    fn mono_i16() -> ContainerSpec {
        ContainerSpec {
            channels: 1,
            format: SampleFormat::I16,
            frame_rate: 44100,
        }
    }

    fn write_container(path: &Path, spec: ContainerSpec, bytes: &[u8]) {
        let mut sink = WavSink::create(path, spec).unwrap();
        sink.write_frames(bytes).unwrap();
        assert_eq!(sink.bytes_written(), bytes.len());
        sink.finalize().unwrap();
    }

    #[test]
    fn test_header_matches_spec() {
        let path = temp_path("header");
        let spec = ContainerSpec {
            channels: 2,
            format: SampleFormat::I16,
            frame_rate: 22050,
        };
        write_container(&path, spec, &[0u8; 16]);

        let reader = WavReader::open(&path).unwrap();
        assert_eq!(reader.spec().channels, 2);
        assert_eq!(reader.spec().bits_per_sample, 16);
        assert_eq!(reader.spec().sample_rate, 22050);
        assert_eq!(reader.len(), 8);

        let source = WavSource::open(&path).unwrap();
        assert_eq!(source.spec(), spec);
        assert_eq!(source.frame_count(), 4);

        std::fs::remove_file(&path).unwrap();
    }

    #[test]
    fn test_chunked_read_returns_bytes_in_order() {
        let path = temp_path("chunks");
        let bytes: Vec<u8> = (0..10i16).flat_map(|s| (s * 300).to_le_bytes()).collect();
        write_container(&path, mono_i16(), &bytes);

        let mut source = WavSource::open(&path).unwrap();
        let first = source.read_frames(4).unwrap();
        let second = source.read_frames(4).unwrap();
        let last = source.read_frames(4).unwrap();
        let end = source.read_frames(4).unwrap();

        assert_eq!(first.len(), 8);
        assert_eq!(second.len(), 8);
        assert_eq!(last.len(), 4);
        assert!(end.is_empty());
        assert_eq!([first, second, last].concat(), bytes);

        std::fs::remove_file(&path).unwrap();
    }

    #[test]
    fn test_create_truncates_existing_file() {
        let path = temp_path("truncate");
        write_container(&path, mono_i16(), &[7u8; 400]);
        write_container(&path, mono_i16(), &[9u8; 40]);

        let mut source = WavSource::open(&path).unwrap();
        assert_eq!(source.frame_count(), 20);
        assert_eq!(source.read_frames(1024).unwrap(), vec![9u8; 40]);

        std::fs::remove_file(&path).unwrap();
    }

    #[test]
    fn test_u8_and_f32_bytes_are_stored_verbatim() {
        let path = temp_path("u8");
        let spec = ContainerSpec {
            format: SampleFormat::U8,
            ..mono_i16()
        };
        let bytes = vec![0u8, 64, 128, 200, 255];
        write_container(&path, spec, &bytes);
        let mut source = WavSource::open(&path).unwrap();
        assert_eq!(source.spec().sample_width(), 1);
        assert_eq!(source.read_frames(16).unwrap(), bytes);
        std::fs::remove_file(&path).unwrap();

        let path = temp_path("f32");
        let spec = ContainerSpec {
            format: SampleFormat::F32,
            ..mono_i16()
        };
        let bytes: Vec<u8> = [0.5f32, -0.25, 1.0].iter().flat_map(|s| s.to_le_bytes()).collect();
        write_container(&path, spec, &bytes);
        let mut source = WavSource::open(&path).unwrap();
        assert_eq!(source.spec(), spec);
        assert_eq!(source.read_frames(16).unwrap(), bytes);
        std::fs::remove_file(&path).unwrap();
    }

    #[test]
    fn test_misaligned_frames_are_rejected() {
        let path = temp_path("misaligned");
        let mut sink = WavSink::create(&path, mono_i16()).unwrap();

        match sink.write_frames(&[1, 2, 3]) {
            Err(ContainerError::MisalignedFrames { len, frame_bytes }) => {
                assert_eq!(len, 3);
                assert_eq!(frame_bytes, 2);
            }
            other => panic!("unexpected result: {:?}", other),
        }

        sink.finalize().unwrap();
        std::fs::remove_file(&path).unwrap();
    }

    #[test]
    fn test_open_missing_file_fails() {
        let path = temp_path("missing");
        assert!(WavSource::open(&path).is_err());
    }
}
