//! Blocking playback of an [`AudioBuffer`] through the default output
//! device.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;

use anyhow::{Result, anyhow};
use cpal::StreamConfig;
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};

use super::ops::AudioBuffer;

/// Play the buffer and return once every sample has been handed to the
/// device. Interrupting playback early is the caller's concern.
pub fn play(buffer: &AudioBuffer, sample_rate: u32) -> Result<()> {
    if buffer.is_empty() {
        return Ok(());
    }

    let host = cpal::default_host();
    let device = host
        .default_output_device()
        .ok_or_else(|| anyhow!("No default output device found"))?;

    let config = StreamConfig {
        channels: buffer.channels(),
        sample_rate: cpal::SampleRate(sample_rate),
        buffer_size: cpal::BufferSize::Default,
    };

    let samples: Arc<[f32]> = buffer.samples().into();
    let position = Arc::new(AtomicUsize::new(0));
    let done = Arc::new(AtomicBool::new(false));

    let samples_clone = samples.clone();
    let position_clone = position.clone();
    let done_clone = done.clone();
    let stream = device.build_output_stream(
        &config,
        move |data: &mut [f32], _: &cpal::OutputCallbackInfo| {
            let mut index = position_clone.load(Ordering::Acquire);
            for out in data.iter_mut() {
                if index < samples_clone.len() {
                    *out = samples_clone[index];
                    index += 1;
                } else {
                    *out = 0.0;
                }
            }
            position_clone.store(index, Ordering::Release);
            if index >= samples_clone.len() {
                done_clone.store(true, Ordering::Release);
            }
        },
        |err| {
            eprintln!("Playback error: {}", err);
        },
        None,
    )?;

    stream.play()?;
    while !done.load(Ordering::Acquire) {
        std::thread::sleep(Duration::from_millis(50));
    }
    // Give the device a moment to drain the last callback's worth of frames.
    std::thread::sleep(Duration::from_millis(100));
    drop(stream);

    Ok(())
}
