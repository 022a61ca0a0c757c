//! Audio capture
//!
//! Blocking capture into an in-memory [`AudioBuffer`] using CPAL
//! (Cross-Platform Audio Library), plus input-device enumeration.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use anyhow::{Result, anyhow};
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{Device, SampleFormat, StreamConfig};

use super::ops::AudioBuffer;

/// Default input device configured for a target sample rate and channel
/// count.
pub struct AudioRecorder {
    device: Device,
    config: StreamConfig,
}

/// Information about an available audio input device
#[derive(Debug)]
pub struct AudioDeviceInfo {
    pub name: String,
    pub is_default: bool,
    pub supported_sample_rates: Vec<u32>,
    pub supported_formats: Vec<SampleFormat>,
}

impl AudioRecorder {
    /// Open the default input device, configured as close as possible to the
    /// requested sample rate.
    pub fn open(sample_rate: u32, channels: u16) -> Result<Self> {
        let host = cpal::default_host();
        let device = host
            .default_input_device()
            .ok_or_else(|| anyhow!("No default input device found"))?;

        let config = Self::closest_config(&device, sample_rate, channels)?;
        Ok(Self { device, config })
    }

    /// Sample rate the device was actually configured with. May differ from
    /// the requested rate when the hardware cannot provide it.
    pub fn sample_rate(&self) -> u32 {
        self.config.sample_rate.0
    }

    pub fn channels(&self) -> u16 {
        self.config.channels
    }

    /// Find the supported configuration closest to the target sample rate.
    fn closest_config(
        device: &Device,
        target_sample_rate: u32,
        channels: u16,
    ) -> Result<StreamConfig> {
        let supported_configs = device.supported_input_configs()?;

        let mut best_range = None;
        let mut best_diff = u32::MAX;
        for range in supported_configs {
            if range.channels() != channels {
                continue;
            }
            let diff = range.max_sample_rate().0.abs_diff(target_sample_rate);
            if diff < best_diff {
                best_diff = diff;
                best_range = Some(range);
            }
        }

        let range = best_range.ok_or_else(|| {
            anyhow!("No supported input configuration with {channels} channel(s)")
        })?;

        let clamped =
            target_sample_rate.clamp(range.min_sample_rate().0, range.max_sample_rate().0);
        Ok(StreamConfig {
            channels,
            sample_rate: cpal::SampleRate(clamped),
            buffer_size: cpal::BufferSize::Default,
        })
    }

    /// Record for the requested duration and return the captured frames.
    ///
    /// Blocks until the duration elapses (or the device reports a stream
    /// error, in which case whatever was captured so far is returned).
    pub fn record(&self, duration: Duration) -> Result<AudioBuffer> {
        let samples = Arc::new(Mutex::new(Vec::<f32>::new()));
        let failed = Arc::new(AtomicBool::new(false));

        let samples_clone = samples.clone();
        let failed_clone = failed.clone();
        let stream = self.device.build_input_stream(
            &self.config,
            move |data: &[f32], _: &cpal::InputCallbackInfo| {
                if let Ok(mut samples) = samples_clone.lock() {
                    samples.extend_from_slice(data);
                }
            },
            move |err| {
                eprintln!("Audio device disconnected or stream error: {}", err);
                failed_clone.store(true, Ordering::Release);
            },
            None,
        )?;

        stream.play()?;

        let start_time = Instant::now();
        while start_time.elapsed() < duration && !failed.load(Ordering::Acquire) {
            std::thread::sleep(Duration::from_millis(50));
        }
        drop(stream);

        let mut samples = Arc::try_unwrap(samples)
            .map_err(|_| anyhow!("Audio callback still holds the capture buffer"))?
            .into_inner()
            .map_err(|_| anyhow!("Capture buffer lock poisoned"))?;

        // Drop any ragged tail so the frame count divides evenly.
        let channels = self.config.channels;
        let whole_frames = samples.len() - samples.len() % channels as usize;
        samples.truncate(whole_frames);

        Ok(AudioBuffer::interleaved(samples, channels))
    }

    /// List all available audio input devices
    pub fn list_devices() -> Result<Vec<AudioDeviceInfo>> {
        let host = cpal::default_host();
        let devices = host.input_devices()?;
        let default_device = host.default_input_device();

        let mut device_infos = Vec::new();

        for device in devices {
            let name = device.name().unwrap_or("Unknown Device".to_string());
            let is_default = default_device
                .as_ref()
                .map(|d| d.name().unwrap_or_default() == name)
                .unwrap_or(false);

            let supported_sample_rates = device
                .supported_input_configs()?
                .map(|c| c.max_sample_rate().0)
                .collect();

            let supported_formats = device
                .supported_input_configs()?
                .map(|c| c.sample_format())
                .collect();

            device_infos.push(AudioDeviceInfo {
                name,
                is_default,
                supported_sample_rates,
                supported_formats,
            });
        }

        Ok(device_infos)
    }
}
