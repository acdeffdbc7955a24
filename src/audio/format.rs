//! Sample formats and stream parameters
//!
//! Samples travel between the platform layer and the rest of the crate as
//! normalized `f32`; everything that is stored or returned to callers is raw
//! little-endian bytes in one of the formats below.

/// Sample encoding of the raw bytes exchanged with streams and containers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SampleFormat {
    /// Unsigned 8-bit, midpoint 128
    U8,
    /// Signed 16-bit little-endian
    #[default]
    I16,
    /// IEEE float 32-bit little-endian
    F32,
}

impl SampleFormat {
    /// Number of bytes per sample
    pub fn width(self) -> usize {
        match self {
            SampleFormat::U8 => 1,
            SampleFormat::I16 => 2,
            SampleFormat::F32 => 4,
        }
    }

    /// Integer format for a sample width in bytes
    pub fn from_width(width: usize) -> Option<Self> {
        match width {
            1 => Some(SampleFormat::U8),
            2 => Some(SampleFormat::I16),
            _ => None,
        }
    }

    pub fn is_float(self) -> bool {
        self == SampleFormat::F32
    }

    /// Encodes normalized samples into raw bytes
    pub fn encode(self, samples: &[f32]) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(samples.len() * self.width());
        for &sample in samples {
            match self {
                SampleFormat::U8 => {
                    let value = (sample * 128.0 + 128.0).round().clamp(0.0, 255.0);
                    bytes.push(value as u8);
                }
                SampleFormat::I16 => {
                    let value = (sample * 32768.0).round().clamp(-32768.0, 32767.0);
                    bytes.extend_from_slice(&(value as i16).to_le_bytes());
                }
                SampleFormat::F32 => bytes.extend_from_slice(&sample.to_le_bytes()),
            }
        }
        bytes
    }

    /// Decodes raw bytes into normalized samples.
    ///
    /// Trailing bytes that do not form a whole sample are ignored.
    pub fn decode(self, bytes: &[u8]) -> Vec<f32> {
        match self {
            SampleFormat::U8 => bytes.iter().map(|&b| (b as f32 - 128.0) / 128.0).collect(),
            SampleFormat::I16 => bytes
                .chunks_exact(2)
                .map(|b| i16::from_le_bytes([b[0], b[1]]) as f32 / 32768.0)
                .collect(),
            SampleFormat::F32 => bytes
                .chunks_exact(4)
                .map(|b| f32::from_le_bytes([b[0], b[1], b[2], b[3]]))
                .collect(),
        }
    }
}

/// Parameters used to open an input or output stream
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StreamParams {
    pub format: SampleFormat,
    pub channels: u16,
    pub sample_rate: u32,
    /// Frames per read/write call
    pub frames_per_buffer: usize,
}

impl StreamParams {
    /// Bytes in one frame (one sample per channel)
    pub fn frame_bytes(&self) -> usize {
        self.format.width() * self.channels as usize
    }

    /// Bytes in one full chunk of `frames_per_buffer` frames
    pub fn chunk_bytes(&self) -> usize {
        self.frame_bytes() * self.frames_per_buffer
    }

    /// Samples held by the ring buffer between the platform callback and the
    /// blocking caller: one second of audio, and never less than four chunks
    pub(crate) fn ring_capacity(&self) -> usize {
        let channels = self.channels.max(1) as usize;
        let one_second = self.sample_rate as usize * channels;
        let four_chunks = self.frames_per_buffer * channels * 4;
        one_second.max(four_chunks).max(1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_widths() {
        assert_eq!(SampleFormat::U8.width(), 1);
        assert_eq!(SampleFormat::I16.width(), 2);
        assert_eq!(SampleFormat::F32.width(), 4);
        assert_eq!(SampleFormat::from_width(2), Some(SampleFormat::I16));
        assert_eq!(SampleFormat::from_width(1), Some(SampleFormat::U8));
        assert_eq!(SampleFormat::from_width(3), None);
    }

    #[test]
    fn test_i16_bytes_survive_decode_encode() {
        let raw: Vec<u8> = [0i16, 1, -1, 1234, i16::MIN, i16::MAX]
            .iter()
            .flat_map(|s| s.to_le_bytes())
            .collect();

        let samples = SampleFormat::I16.decode(&raw);
        assert_eq!(samples.len(), 6);
        assert_eq!(SampleFormat::I16.encode(&samples), raw);
    }

    #[test]
    fn test_u8_midpoint_is_silence() {
        assert_eq!(SampleFormat::U8.decode(&[128]), vec![0.0]);
        assert_eq!(SampleFormat::U8.encode(&[0.0]), vec![128]);
        assert_eq!(SampleFormat::U8.encode(&[2.0, -2.0]), vec![255, 0]);
    }

    #[test]
    fn test_i16_clamps_out_of_range() {
        let bytes = SampleFormat::I16.encode(&[1.5, -1.5]);
        assert_eq!(bytes[..2], i16::MAX.to_le_bytes());
        assert_eq!(bytes[2..], i16::MIN.to_le_bytes());
    }

    #[test]
    fn test_chunk_bytes() {
        let params = StreamParams {
            format: SampleFormat::I16,
            channels: 2,
            sample_rate: 44100,
            frames_per_buffer: 1024,
        };
        assert_eq!(params.frame_bytes(), 4);
        assert_eq!(params.chunk_bytes(), 4096);
        assert_eq!(params.ring_capacity(), 88200);
    }
}
