//! Offline audio readers: RIFF/WAV and headerless PCM.

use std::io::Read;
use std::ops::RangeInclusive;

use byteorder::{ByteOrder, LittleEndian};

use crate::error::IntakeError;

/// Sample rates accepted by [`read_wav`] unless told otherwise. KiwiSDR
/// recordings report either 12000 or 12001 Hz.
pub const DEFAULT_WAV_RATES: RangeInclusive<u32> = 12000..=12001;

/// Decoded mono 16-bit audio.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WavAudio {
    pub sample_rate: u32,
    pub samples: Vec<i16>,
}

impl WavAudio {
    pub fn duration_secs(&self) -> f64 {
        self.samples.len() as f64 / self.sample_rate as f64
    }
}

/// Read a WAV stream that must be mono, 16-bit integer PCM, with a sample
/// rate inside `rates`.
pub fn read_wav<R: Read>(reader: R, rates: RangeInclusive<u32>) -> Result<WavAudio, IntakeError> {
    let reader = hound::WavReader::new(reader)?;
    let spec = reader.spec();

    if spec.channels != 1 {
        return Err(IntakeError::Format(format!(
            "expected 1 channel, found {}",
            spec.channels
        )));
    }
    if spec.sample_format != hound::SampleFormat::Int || spec.bits_per_sample != 16 {
        return Err(IntakeError::Format(format!(
            "expected 16-bit integer samples, found {}-bit {:?}",
            spec.bits_per_sample, spec.sample_format
        )));
    }
    if !rates.contains(&spec.sample_rate) {
        return Err(IntakeError::Format(format!(
            "sample rate {} Hz outside {}..={} Hz",
            spec.sample_rate,
            rates.start(),
            rates.end()
        )));
    }

    let samples = reader
        .into_samples::<i16>()
        .collect::<Result<Vec<_>, _>>()?;
    tracing::debug!(
        sample_rate = spec.sample_rate,
        samples = samples.len(),
        "read wav"
    );

    Ok(WavAudio {
        sample_rate: spec.sample_rate,
        samples,
    })
}

/// Read headerless little-endian signed 16-bit samples until end of input.
pub fn read_raw<R: Read>(mut reader: R) -> Result<Vec<i16>, IntakeError> {
    let mut bytes = Vec::new();
    reader.read_to_end(&mut bytes)?;
    if bytes.len() % 2 != 0 {
        return Err(IntakeError::Format(format!(
            "raw PCM has an odd byte count ({})",
            bytes.len()
        )));
    }
    let mut samples = vec![0i16; bytes.len() / 2];
    LittleEndian::read_i16_into(&bytes, &mut samples);
    Ok(samples)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::io::Cursor;

    fn wav_bytes(spec: hound::WavSpec, samples: &[i32]) -> Vec<u8> {
        let mut buffer = Vec::new();
        {
            let cursor = Cursor::new(&mut buffer);
            let mut writer = hound::WavWriter::new(cursor, spec).unwrap();
            for &s in samples {
                writer.write_sample(s).unwrap();
            }
            writer.finalize().unwrap();
        }
        buffer
    }

    fn spec(channels: u16, sample_rate: u32, bits: u16) -> hound::WavSpec {
        hound::WavSpec {
            channels,
            sample_rate,
            bits_per_sample: bits,
            sample_format: hound::SampleFormat::Int,
        }
    }

    #[test]
    fn test_reads_mono_16_bit() {
        let bytes = wav_bytes(spec(1, 12001, 16), &[0, 1, -1, 32767, -32768]);
        let audio = read_wav(Cursor::new(bytes), DEFAULT_WAV_RATES).unwrap();
        assert_eq!(audio.sample_rate, 12001);
        assert_eq!(audio.samples, vec![0, 1, -1, 32767, -32768]);
    }

    #[test]
    fn test_rejects_wrong_layout() {
        let stereo = wav_bytes(spec(2, 12000, 16), &[0, 0]);
        assert!(matches!(
            read_wav(Cursor::new(stereo), DEFAULT_WAV_RATES),
            Err(IntakeError::Format(_))
        ));

        let wide = wav_bytes(spec(1, 12000, 24), &[0]);
        assert!(matches!(
            read_wav(Cursor::new(wide), DEFAULT_WAV_RATES),
            Err(IntakeError::Format(_))
        ));

        let fast = wav_bytes(spec(1, 44100, 16), &[0]);
        assert!(matches!(
            read_wav(Cursor::new(fast.clone()), DEFAULT_WAV_RATES),
            Err(IntakeError::Format(_))
        ));
        assert!(read_wav(Cursor::new(fast), 44100..=44100).is_ok());
    }

    #[test]
    fn test_rejects_non_riff() {
        assert!(matches!(
            read_wav(Cursor::new(b"not a wave file at all".to_vec()), DEFAULT_WAV_RATES),
            Err(IntakeError::Format(_))
        ));
    }

    #[test]
    fn test_raw_little_endian() {
        let samples = read_raw(Cursor::new(vec![0x01, 0x00, 0xFF, 0xFF, 0x00, 0x80])).unwrap();
        assert_eq!(samples, vec![1, -1, i16::MIN]);
        assert!(read_raw(Cursor::new(Vec::new())).unwrap().is_empty());
    }

    #[test]
    fn test_raw_odd_length() {
        assert!(matches!(
            read_raw(Cursor::new(vec![1, 2, 3])),
            Err(IntakeError::Format(_))
        ));
    }
}
