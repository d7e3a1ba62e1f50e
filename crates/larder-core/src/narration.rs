//! Narration of cooking steps.
//!
//! At most one narration plays at a time: [`Narrator::try_begin`] hands out a
//! guard and refuses while one is held. Moving to another step calls
//! [`Narrator::reset`], which frees the flag right away without stopping audio
//! that is already playing.

use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use tokio_util::sync::CancellationToken;

use crate::audio::{AudioSink, NARRATION_SAMPLE_RATE, decode_pcm16le, pcm::duration_secs};
use crate::provider::RecipeBackend;

#[derive(Debug, Clone, Default)]
pub struct Narrator {
    speaking: Arc<AtomicBool>,
    /// Bumped on every begin/reset so a stale guard cannot clear a newer flag
    generation: Arc<AtomicU64>,
}

/// Held for the duration of one narration; clears the flag when dropped
#[derive(Debug)]
pub struct SpeakingGuard {
    speaking: Arc<AtomicBool>,
    generation: Arc<AtomicU64>,
    mine: u64,
}

impl Narrator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_speaking(&self) -> bool {
        self.speaking.load(Ordering::SeqCst)
    }

    /// Claim the speaker, or `None` if a narration is already active
    pub fn try_begin(&self) -> Option<SpeakingGuard> {
        self.speaking
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .ok()?;
        let mine = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        Some(SpeakingGuard {
            speaking: self.speaking.clone(),
            generation: self.generation.clone(),
            mine,
        })
    }

    /// Free the speaker immediately (step change)
    pub fn reset(&self) {
        self.generation.fetch_add(1, Ordering::SeqCst);
        self.speaking.store(false, Ordering::SeqCst);
    }
}

impl Drop for SpeakingGuard {
    fn drop(&mut self) {
        if self.generation.load(Ordering::SeqCst) == self.mine {
            self.speaking.store(false, Ordering::SeqCst);
        }
    }
}

/// How a narration ended
#[derive(Debug, Clone, PartialEq)]
pub enum NarrationResult {
    Played { seconds: f64 },
    Cancelled,
    Failed(String),
}

/// Synthesize `text`, decode it and play it on `sink`.
///
/// Failures are reported in the result, never raised: a narration that
/// cannot be played simply ends. When `export` is set the decoded audio is
/// also written there as WAV.
pub async fn narrate(
    backend: Arc<dyn RecipeBackend>,
    sink: Arc<dyn AudioSink>,
    text: String,
    cancel: CancellationToken,
    export: Option<PathBuf>,
) -> NarrationResult {
    let pcm = tokio::select! {
        biased;
        _ = cancel.cancelled() => return NarrationResult::Cancelled,
        result = backend.synthesize_speech(&text) => match result {
            Ok(pcm) => pcm,
            Err(e) => {
                crate::verbose!("Narration failed: {e:#}");
                return NarrationResult::Failed(format!("{e:#}"));
            }
        },
    };

    let samples = decode_pcm16le(&pcm);
    let seconds = duration_secs(samples.len(), NARRATION_SAMPLE_RATE);

    if let Some(path) = export {
        export_wav(&path, &samples);
    }

    if cancel.is_cancelled() {
        return NarrationResult::Cancelled;
    }

    let played = tokio::task::spawn_blocking(move || sink.play(&samples, NARRATION_SAMPLE_RATE)).await;
    match played {
        Ok(Ok(())) => NarrationResult::Played { seconds },
        Ok(Err(e)) => {
            crate::verbose!("Narration playback failed: {e:#}");
            NarrationResult::Failed(format!("{e:#}"))
        }
        Err(e) => NarrationResult::Failed(format!("Playback task failed: {e}")),
    }
}

#[cfg(feature = "wav-export")]
fn export_wav(path: &std::path::Path, samples: &[f32]) {
    if let Err(e) = crate::audio::write_wav(path, samples, NARRATION_SAMPLE_RATE) {
        crate::verbose!("Could not export narration: {e:#}");
    }
}

#[cfg(not(feature = "wav-export"))]
fn export_wav(path: &std::path::Path, _samples: &[f32]) {
    crate::verbose!(
        "Skipping export to {}: built without the 'wav-export' feature",
        path.display()
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn second_begin_is_rejected_while_active() {
        let narrator = Narrator::new();
        let guard = narrator.try_begin().unwrap();
        assert!(narrator.is_speaking());
        assert!(narrator.try_begin().is_none());
        assert!(narrator.is_speaking());

        drop(guard);
        assert!(!narrator.is_speaking());
        assert!(narrator.try_begin().is_some());
    }

    #[test]
    fn reset_frees_speaker_and_stale_guard_is_harmless() {
        let narrator = Narrator::new();
        let stale = narrator.try_begin().unwrap();

        narrator.reset();
        assert!(!narrator.is_speaking());

        let fresh = narrator.try_begin().unwrap();
        drop(stale);
        assert!(narrator.is_speaking(), "stale guard must not clear a newer narration");

        drop(fresh);
        assert!(!narrator.is_speaking());
    }
}
