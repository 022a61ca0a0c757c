//! Amplitude-domain transforms on in-memory audio.
//!
//! Every function here is pure: it consumes a buffer and returns one, with
//! no failure modes. "Silent" inputs (all-zero, all below threshold) pass
//! through unchanged rather than erroring.

/// Interleaved f32 samples plus a channel count, time-major.
///
/// Mono audio is `channels == 1`; stereo interleaves left/right per frame.
/// A frame is one sample per channel at a single time step.
#[derive(Debug, Clone, PartialEq)]
pub struct AudioBuffer {
    samples: Vec<f32>,
    channels: u16,
}

impl AudioBuffer {
    /// Wrap a flat sequence of mono samples.
    pub fn mono(samples: Vec<f32>) -> Self {
        Self {
            samples,
            channels: 1,
        }
    }

    /// Wrap interleaved multi-channel samples.
    ///
    /// # Panics
    /// Panics if `channels` is zero or does not divide the sample count.
    pub fn interleaved(samples: Vec<f32>, channels: u16) -> Self {
        assert!(channels > 0, "AudioBuffer requires at least one channel");
        assert!(
            samples.len() % channels as usize == 0,
            "interleaved sample count must be a multiple of the channel count"
        );
        Self { samples, channels }
    }

    pub fn channels(&self) -> u16 {
        self.channels
    }

    pub fn is_mono(&self) -> bool {
        self.channels == 1
    }

    /// Interleaved samples, time-major.
    pub fn samples(&self) -> &[f32] {
        &self.samples
    }

    pub fn into_samples(self) -> Vec<f32> {
        self.samples
    }

    /// Number of time steps (samples per channel).
    pub fn frames(&self) -> usize {
        self.samples.len() / self.channels as usize
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn duration_secs(&self, sample_rate: u32) -> f64 {
        self.frames() as f64 / sample_rate as f64
    }
}

/// Amplitude below which a sample counts as silence when no threshold is
/// given.
pub const DEFAULT_SILENCE_THRESHOLD: f32 = 0.01;

/// Scale the buffer so its peak absolute value becomes 1.0.
///
/// All-zero input is returned unchanged; there is nothing to scale and the
/// zero peak must not become a divisor.
pub fn normalize(mut buffer: AudioBuffer) -> AudioBuffer {
    let peak = buffer
        .samples
        .iter()
        .fold(0.0f32, |peak, sample| peak.max(sample.abs()));
    if peak == 0.0 {
        return buffer;
    }

    for sample in &mut buffer.samples {
        *sample /= peak;
    }
    buffer
}

/// Drop leading and trailing frames whose samples all sit at or below
/// `threshold` in magnitude.
///
/// Keeps the inclusive span from the first to the last frame with any sample
/// above the threshold. When no frame qualifies, the input is returned
/// unchanged: "no signal found" is a no-op, not a truncation to zero length.
pub fn trim_silence(buffer: AudioBuffer, threshold: f32) -> AudioBuffer {
    let channels = buffer.channels as usize;
    let loud = |frame: &[f32]| frame.iter().any(|sample| sample.abs() > threshold);

    let mut frames = buffer.samples.chunks_exact(channels);
    let Some(start) = frames.clone().position(loud) else {
        return buffer;
    };
    let end = frames.rposition(loud).unwrap_or(start);

    let samples = buffer.samples[start * channels..(end + 1) * channels].to_vec();
    AudioBuffer {
        samples,
        channels: buffer.channels,
    }
}

/// Fold a multi-channel buffer down to mono by per-frame averaging.
/// Already-mono input passes through untouched.
pub fn to_mono(buffer: AudioBuffer) -> AudioBuffer {
    if buffer.channels <= 1 {
        return buffer;
    }

    let channels = buffer.channels as usize;
    let samples = buffer
        .samples
        .chunks_exact(channels)
        .map(|frame| frame.iter().sum::<f32>() / channels as f32)
        .collect();
    AudioBuffer {
        samples,
        channels: 1,
    }
}

/// Duplicate a mono buffer into two identical channels.
/// Anything already multi-channel passes through untouched.
pub fn to_stereo(buffer: AudioBuffer) -> AudioBuffer {
    if buffer.channels != 1 {
        return buffer;
    }

    let mut samples = Vec::with_capacity(buffer.samples.len() * 2);
    for &sample in &buffer.samples {
        samples.push(sample);
        samples.push(sample);
    }
    AudioBuffer {
        samples,
        channels: 2,
    }
}
