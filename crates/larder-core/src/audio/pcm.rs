//! Raw PCM handling for narration payloads.

use anyhow::{Context, Result};

/// The speech service always answers with 24 kHz mono
pub const NARRATION_SAMPLE_RATE: u32 = 24_000;

/// Decode signed 16-bit little-endian mono PCM into samples in [-1, 1].
///
/// A trailing odd byte is ignored.
pub fn decode_pcm16le(bytes: &[u8]) -> Vec<f32> {
    bytes
        .chunks_exact(2)
        .map(|pair| i16::from_le_bytes([pair[0], pair[1]]) as f32 / 32768.0)
        .collect()
}

/// Resample mono audio to the output device rate.
///
/// The last chunk is zero-padded, so the result may run slightly longer than
/// the input at the new rate.
pub fn resample(samples: &[f32], from_rate: u32, to_rate: u32) -> Result<Vec<f32>> {
    use rubato::{FftFixedIn, Resampler};

    if samples.is_empty() || from_rate == to_rate {
        return Ok(samples.to_vec());
    }

    let mut resampler = FftFixedIn::<f32>::new(
        from_rate as usize,
        to_rate as usize,
        1024, // chunk size
        2,    // sub-chunks
        1,    // channels (mono)
    )
    .context("Failed to create resampler")?;

    let mut output = Vec::new();
    let chunk_size = resampler.input_frames_max();

    for chunk in samples.chunks(chunk_size) {
        let mut padded = chunk.to_vec();
        if padded.len() < chunk_size {
            padded.resize(chunk_size, 0.0);
        }

        let result = resampler
            .process(&[padded], None)
            .context("Resampling failed")?;
        output.extend_from_slice(&result[0]);
    }

    Ok(output)
}

/// Playback length in seconds
pub fn duration_secs(sample_count: usize, sample_rate: u32) -> f64 {
    sample_count as f64 / sample_rate.max(1) as f64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_extremes_and_zero() {
        let bytes = [0x00, 0x00, 0x00, 0x80, 0xFF, 0x7F, 0x00, 0x40];
        let samples = decode_pcm16le(&bytes);
        assert_eq!(samples.len(), 4);
        assert_eq!(samples[0], 0.0);
        assert_eq!(samples[1], -1.0);
        assert!((samples[2] - 32767.0 / 32768.0).abs() < 1e-6);
        assert_eq!(samples[3], 0.5);
    }

    #[test]
    fn decoded_samples_stay_in_range() {
        let bytes: Vec<u8> = (0..=u16::MAX).step_by(97).flat_map(|v| v.to_le_bytes()).collect();
        assert!(
            decode_pcm16le(&bytes)
                .iter()
                .all(|s| (-1.0..=1.0).contains(s))
        );
    }

    #[test]
    fn ignores_trailing_odd_byte() {
        assert_eq!(decode_pcm16le(&[0x00, 0x40, 0x12]), vec![0.5]);
        assert!(decode_pcm16le(&[]).is_empty());
    }

    #[test]
    fn resample_passthrough() {
        let samples = vec![0.1, 0.2, 0.3];
        assert_eq!(resample(&samples, 24_000, 24_000).unwrap(), samples);
        assert!(resample(&[], 24_000, 48_000).unwrap().is_empty());
    }

    #[test]
    fn resample_to_device_rate_doubles_length() {
        let samples: Vec<f32> = (0..4096).map(|i| (i as f32 * 0.05).sin() * 0.5).collect();
        let out = resample(&samples, NARRATION_SAMPLE_RATE, 48_000).unwrap();

        let ratio = out.len() as f64 / samples.len() as f64;
        assert!((ratio - 2.0).abs() < 0.1, "ratio {ratio}");
        assert!(out.iter().all(|s| s.abs() <= 1.0));
    }

    #[test]
    fn duration_of_one_second() {
        assert_eq!(duration_secs(24_000, NARRATION_SAMPLE_RATE), 1.0);
    }
}
