//! Narration playback through the default output device.

use anyhow::{Context, Result};
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{Device, Stream, StreamConfig};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::mpsc;
use std::time::Duration;

use super::AudioSink;
use super::pcm::{duration_secs, resample};

/// Extra time allowed beyond the clip length before giving up on the device
const DRAIN_GRACE: Duration = Duration::from_secs(2);

/// Count of non-fatal stream errors in the current playback
static STREAM_ERROR_COUNT: AtomicU64 = AtomicU64::new(0);

/// Plays narration on the system's default output device via cpal
#[derive(Debug, Default, Clone)]
pub struct CpalSink {
    /// Output device name (None = system default)
    device_name: Option<String>,
}

impl CpalSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_device(device_name: impl Into<String>) -> Self {
        Self {
            device_name: Some(device_name.into()),
        }
    }

    fn output_device(&self) -> Result<Device> {
        super::devices::init_platform();
        let host = cpal::default_host();

        if let Some(wanted) = &self.device_name {
            for device in host.output_devices()? {
                if device
                    .description()
                    .map(|d| d.to_string() == *wanted)
                    .unwrap_or(false)
                {
                    return Ok(device);
                }
            }
            anyhow::bail!("Audio output device '{wanted}' not found");
        }

        host.default_output_device()
            .context("No audio output device available")
    }
}

impl AudioSink for CpalSink {
    fn play(&self, samples: &[f32], sample_rate: u32) -> Result<()> {
        if samples.is_empty() {
            return Ok(());
        }

        let device = self.output_device()?;
        let supported = device
            .default_output_config()
            .context("Failed to query output configuration")?;
        let sample_format = supported.sample_format();
        let config: StreamConfig = supported.into();

        let device_rate = config.sample_rate;
        let frames = Arc::new(resample(samples, sample_rate, device_rate)?);
        crate::verbose!(
            "Playing {:.1}s of narration at {} Hz ({} ch, {:?})",
            duration_secs(samples.len(), sample_rate),
            device_rate,
            config.channels,
            sample_format
        );

        STREAM_ERROR_COUNT.store(0, Ordering::Relaxed);
        let (done_tx, done_rx) = mpsc::channel();

        let stream = match sample_format {
            cpal::SampleFormat::F32 => build_stream::<f32>(&device, &config, frames, done_tx)?,
            cpal::SampleFormat::I16 => build_stream::<i16>(&device, &config, frames, done_tx)?,
            cpal::SampleFormat::U16 => build_stream::<u16>(&device, &config, frames, done_tx)?,
            other => anyhow::bail!("Unsupported output sample format: {other:?}"),
        };
        stream.play().context("Failed to start playback")?;

        let limit = Duration::from_secs_f64(duration_secs(samples.len(), sample_rate)) + DRAIN_GRACE;
        let finished = done_rx.recv_timeout(limit).is_ok();
        drop(stream);

        if !finished {
            anyhow::bail!("Playback did not finish within {:.1}s", limit.as_secs_f64());
        }
        Ok(())
    }
}

/// Build an output stream that plays `frames` once on every channel, then
/// signals `done` and emits silence.
fn build_stream<T>(
    device: &Device,
    config: &StreamConfig,
    frames: Arc<Vec<f32>>,
    done: mpsc::Sender<()>,
) -> Result<Stream>
where
    T: cpal::SizedSample + cpal::FromSample<f32>,
{
    let channels = config.channels.max(1) as usize;
    let mut position = 0usize;
    let mut signalled = false;

    let err_fn = |err| {
        let count = STREAM_ERROR_COUNT.fetch_add(1, Ordering::Relaxed);
        if count == 0 {
            crate::verbose!("Audio output stream error (non-fatal): {err}");
        }
    };

    let stream = device.build_output_stream(
        config,
        move |data: &mut [T], _: &cpal::OutputCallbackInfo| {
            for frame in data.chunks_mut(channels) {
                let sample = frames.get(position).copied().unwrap_or(0.0);
                position = position.saturating_add(1);
                let value: T = cpal::Sample::from_sample(sample);
                for slot in frame.iter_mut() {
                    *slot = value;
                }
            }

            if position >= frames.len() && !signalled {
                signalled = true;
                let _ = done.send(());
            }
        },
        err_fn,
        None,
    )?;

    Ok(stream)
}
