//! Narration audio: PCM decoding, resampling and playback.

mod devices;
pub mod pcm;
mod playback;
#[cfg(feature = "wav-export")]
mod wav;

use anyhow::Result;

pub use devices::{AudioDeviceInfo, list_output_devices};
pub use pcm::{NARRATION_SAMPLE_RATE, decode_pcm16le, resample};
pub use playback::CpalSink;
#[cfg(feature = "wav-export")]
pub use wav::write_wav;

/// Somewhere to send decoded narration.
///
/// `play` blocks until playback finishes; callers run it off the async
/// runtime.
pub trait AudioSink: Send + Sync {
    fn play(&self, samples: &[f32], sample_rate: u32) -> Result<()>;
}

/// Sink that discards audio (used with `--mute` and in tests)
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSink;

impl AudioSink for NullSink {
    fn play(&self, samples: &[f32], sample_rate: u32) -> Result<()> {
        crate::verbose!(
            "Muted: dropping {:.1}s of narration",
            samples.len() as f64 / sample_rate.max(1) as f64
        );
        Ok(())
    }
}
