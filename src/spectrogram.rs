//! Spectrogram computation and PNG rendering.
//!
//! A short-time Fourier transform with a 256-point FFT, 128-sample hop, and
//! a Hann window, rendered as a frequency-over-time heatmap. Multi-channel
//! input is folded to mono before analysis.

use std::path::{Path, PathBuf};

use image::{Rgb, RgbImage};
use rustfft::{FftPlanner, num_complex::Complex};
use thiserror::Error;

use crate::audio::ops::{self, AudioBuffer};
use crate::session;

/// STFT window length in samples.
pub const FFT_SIZE: usize = 256;
/// Samples between consecutive windows (50% overlap).
pub const HOP_SIZE: usize = 128;

const DB_FLOOR: f32 = 1e-10;

#[derive(Error, Debug)]
pub enum SpectrogramError {
    #[error("Failed to write spectrogram image: {0}")]
    Image(#[from] image::ImageError),
}

/// Power spectrum over time, in decibels.
///
/// Stored column-major: one column of `bins()` values per analysis frame,
/// bin 0 being DC.
pub struct Spectrogram {
    power_db: Vec<f32>,
    bins: usize,
    frames: usize,
    sample_rate: u32,
}

impl Spectrogram {
    /// Compute the spectrogram of a buffer.
    ///
    /// Input shorter than one window produces an empty spectrogram (zero
    /// frames), which still renders to a valid placeholder image.
    pub fn compute(buffer: &AudioBuffer, sample_rate: u32) -> Self {
        let mono = ops::to_mono(buffer.clone());
        let samples = mono.samples();
        let bins = FFT_SIZE / 2 + 1;

        // Hann window to reduce spectral leakage
        let mut window = vec![0.0f32; FFT_SIZE];
        for (i, w) in window.iter_mut().enumerate() {
            *w = 0.5
                * (1.0 - (2.0 * std::f32::consts::PI * i as f32 / FFT_SIZE as f32).cos());
        }

        let frames = if samples.len() >= FFT_SIZE {
            1 + (samples.len() - FFT_SIZE) / HOP_SIZE
        } else {
            0
        };

        let mut planner = FftPlanner::new();
        let fft = planner.plan_fft_forward(FFT_SIZE);

        let mut power_db = Vec::with_capacity(frames * bins);
        for frame in 0..frames {
            let start = frame * HOP_SIZE;
            let mut scratch: Vec<Complex<f32>> = samples[start..start + FFT_SIZE]
                .iter()
                .zip(&window)
                .map(|(&s, &w)| Complex::new(s * w, 0.0))
                .collect();
            fft.process(&mut scratch);

            for bin in scratch.iter().take(bins) {
                let power = bin.norm_sqr();
                power_db.push(10.0 * (power + DB_FLOOR).log10());
            }
        }

        Self {
            power_db,
            bins,
            frames,
            sample_rate,
        }
    }

    /// Number of frequency bins per frame (`FFT_SIZE / 2 + 1`).
    pub fn bins(&self) -> usize {
        self.bins
    }

    /// Number of analysis frames (time steps).
    pub fn frames(&self) -> usize {
        self.frames
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Highest frequency represented, in Hz (the Nyquist frequency).
    pub fn max_frequency(&self) -> f32 {
        self.sample_rate as f32 / 2.0
    }

    /// Power in dB at an analysis frame and frequency bin.
    pub fn power_db(&self, frame: usize, bin: usize) -> f32 {
        self.power_db[frame * self.bins + bin]
    }

    fn db_range(&self) -> (f32, f32) {
        let mut lo = f32::INFINITY;
        let mut hi = f32::NEG_INFINITY;
        for &db in &self.power_db {
            lo = lo.min(db);
            hi = hi.max(db);
        }
        if lo >= hi {
            // Uniform (or empty) spectrogram: any fixed span renders it flat.
            (hi - 60.0, hi.max(0.0))
        } else {
            (lo, hi)
        }
    }

    /// Render as a heatmap image: time left to right, low frequencies at the
    /// bottom, power mapped through a dark-to-bright colormap.
    pub fn render(&self) -> RgbImage {
        let width = self.frames.max(1) as u32;
        let height = self.bins as u32;
        let (lo, hi) = self.db_range();

        let mut image = RgbImage::new(width, height);
        for frame in 0..self.frames {
            for bin in 0..self.bins {
                let db = self.power_db(frame, bin);
                let t = ((db - lo) / (hi - lo)).clamp(0.0, 1.0);
                let y = (self.bins - 1 - bin) as u32;
                image.put_pixel(frame as u32, y, heat_color(t));
            }
        }
        image
    }
}

/// Piecewise-linear perceptual colormap from near-black through purple and
/// orange to pale yellow.
fn heat_color(t: f32) -> Rgb<u8> {
    const STOPS: [[f32; 3]; 5] = [
        [0.0, 0.0, 4.0],
        [87.0, 16.0, 110.0],
        [188.0, 55.0, 84.0],
        [249.0, 142.0, 9.0],
        [252.0, 255.0, 164.0],
    ];

    let scaled = t.clamp(0.0, 1.0) * (STOPS.len() - 1) as f32;
    let index = (scaled as usize).min(STOPS.len() - 2);
    let frac = scaled - index as f32;

    let low = STOPS[index];
    let high = STOPS[index + 1];
    let mix = |a: f32, b: f32| (a + (b - a) * frac).round() as u8;
    Rgb([
        mix(low[0], high[0]),
        mix(low[1], high[1]),
        mix(low[2], high[2]),
    ])
}

/// Render and write the spectrogram into a session folder as
/// `spectrogram_<timestamp>.png`, returning the written path.
///
/// Several saves can land inside the same clock second (batch runs); a
/// numeric suffix keeps them from overwriting each other.
pub fn save_spectrogram(
    spectrogram: &Spectrogram,
    session_folder: &Path,
) -> Result<PathBuf, SpectrogramError> {
    let filename = session::timestamped_filename("spectrogram", "png");
    let stem = filename.trim_end_matches(".png");

    let mut path = session_folder.join(&filename);
    let mut counter = 1u32;
    while path.exists() {
        counter += 1;
        path = session_folder.join(format!("{stem}_{counter}.png"));
    }

    spectrogram.render().save(&path)?;
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sine(frequency: f32, sample_rate: u32, samples: usize) -> AudioBuffer {
        let data = (0..samples)
            .map(|i| {
                (2.0 * std::f32::consts::PI * frequency * i as f32 / sample_rate as f32).sin()
            })
            .collect();
        AudioBuffer::mono(data)
    }

    #[test]
    fn test_frame_and_bin_counts() {
        let buffer = AudioBuffer::mono(vec![0.0; 1024]);
        let spectrogram = Spectrogram::compute(&buffer, 8_192);
        assert_eq!(spectrogram.bins(), 129);
        assert_eq!(spectrogram.frames(), 1 + (1024 - FFT_SIZE) / HOP_SIZE);
    }

    #[test]
    fn test_short_input_yields_zero_frames() {
        let buffer = AudioBuffer::mono(vec![0.0; FFT_SIZE - 1]);
        let spectrogram = Spectrogram::compute(&buffer, 8_192);
        assert_eq!(spectrogram.frames(), 0);

        // Still renders a placeholder image rather than a zero-size one.
        let image = spectrogram.render();
        assert_eq!(image.width(), 1);
        assert_eq!(image.height(), 129);
    }

    #[test]
    fn test_sine_peaks_at_expected_bin() {
        // 1024 Hz at 8192 Hz sampling; bin width is 8192/256 = 32 Hz.
        let buffer = sine(1024.0, 8_192, 2048);
        let spectrogram = Spectrogram::compute(&buffer, 8_192);

        let frame = spectrogram.frames() / 2;
        let peak_bin = (0..spectrogram.bins())
            .max_by(|&a, &b| {
                spectrogram
                    .power_db(frame, a)
                    .total_cmp(&spectrogram.power_db(frame, b))
            })
            .unwrap();
        assert!(
            (peak_bin as i64 - 32).abs() <= 1,
            "peak at bin {peak_bin}, expected near 32"
        );
    }

    #[test]
    fn test_render_dimensions_match_grid() {
        let buffer = sine(440.0, 8_192, 2048);
        let spectrogram = Spectrogram::compute(&buffer, 8_192);
        let image = spectrogram.render();
        assert_eq!(image.width() as usize, spectrogram.frames());
        assert_eq!(image.height() as usize, spectrogram.bins());
    }

    #[test]
    fn test_save_writes_timestamped_png() {
        let tmp = tempfile::TempDir::new().unwrap();
        let buffer = sine(440.0, 8_192, 1024);
        let spectrogram = Spectrogram::compute(&buffer, 8_192);

        let path = save_spectrogram(&spectrogram, tmp.path()).unwrap();
        assert!(path.is_file());
        let name = path.file_name().unwrap().to_str().unwrap();
        assert!(name.starts_with("spectrogram_"));
        assert!(name.ends_with(".png"));
    }

    #[test]
    fn test_save_twice_in_one_second_keeps_both() {
        let tmp = tempfile::TempDir::new().unwrap();
        let buffer = sine(440.0, 8_192, 1024);
        let spectrogram = Spectrogram::compute(&buffer, 8_192);

        let first = save_spectrogram(&spectrogram, tmp.path()).unwrap();
        let second = save_spectrogram(&spectrogram, tmp.path()).unwrap();
        assert_ne!(first, second);
        assert!(first.is_file());
        assert!(second.is_file());
    }

    #[test]
    fn test_stereo_input_is_folded() {
        let stereo = ops::to_stereo(sine(440.0, 8_192, 1024));
        let spectrogram = Spectrogram::compute(&stereo, 8_192);
        assert_eq!(spectrogram.frames(), 1 + (1024 - FFT_SIZE) / HOP_SIZE);
        assert_eq!(spectrogram.max_frequency(), 4_096.0);
    }
}
