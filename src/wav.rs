//! WAV file input/output on top of hound.
//!
//! Buffers are converted to and from f32 regardless of the on-disk sample
//! format; writing always produces 16-bit PCM.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use hound::{SampleFormat, WavReader, WavSpec, WavWriter};
use serde::Serialize;
use thiserror::Error;

use crate::audio::ops::AudioBuffer;

/// WAV codec error types
#[derive(Error, Debug)]
pub enum WavError {
    #[error("WAV codec error: {0}")]
    Codec(#[from] hound::Error),
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

/// Metadata for a WAV file on disk.
#[derive(Debug, Clone, Serialize)]
pub struct WavInfo {
    pub sample_rate: u32,
    pub channels: u16,
    pub frames: u32,
    pub duration_secs: f64,
    pub format: String,
    pub subtype: String,
}

/// Load a WAV file into an interleaved f32 buffer, preserving channels.
pub fn load_wav(path: &Path) -> Result<(AudioBuffer, u32), WavError> {
    let mut reader = WavReader::open(path)?;
    let spec = reader.spec();

    let samples: Vec<f32> = match spec.sample_format {
        SampleFormat::Float => reader.samples::<f32>().collect::<Result<_, _>>()?,
        SampleFormat::Int => {
            let scale = ((1i64 << (spec.bits_per_sample - 1)) - 1) as f32;
            reader
                .samples::<i32>()
                .map(|sample| sample.map(|s| s as f32 / scale))
                .collect::<Result<_, _>>()?
        }
    };

    Ok((
        AudioBuffer::interleaved(samples, spec.channels),
        spec.sample_rate,
    ))
}

/// Write a buffer as 16-bit PCM. Samples outside [-1, 1] are clipped.
pub fn save_wav(path: &Path, buffer: &AudioBuffer, sample_rate: u32) -> Result<(), WavError> {
    let spec = WavSpec {
        channels: buffer.channels(),
        sample_rate,
        bits_per_sample: 16,
        sample_format: SampleFormat::Int,
    };

    let mut writer = WavWriter::create(path, spec)?;
    for &sample in buffer.samples() {
        let clamped = sample.clamp(-1.0, 1.0);
        writer.write_sample((clamped * i16::MAX as f32) as i16)?;
    }
    writer.finalize()?;
    Ok(())
}

/// Read a WAV file's header without decoding its samples.
pub fn wav_info(path: &Path) -> Result<WavInfo, WavError> {
    let reader = WavReader::open(path)?;
    let spec = reader.spec();
    let frames = reader.duration();

    let subtype = match spec.sample_format {
        SampleFormat::Int => format!("PCM_{}", spec.bits_per_sample),
        SampleFormat::Float => "FLOAT".to_string(),
    };

    Ok(WavInfo {
        sample_rate: spec.sample_rate,
        channels: spec.channels,
        frames,
        duration_secs: frames as f64 / spec.sample_rate as f64,
        format: "WAV".to_string(),
        subtype,
    })
}

/// Paths of the WAV files directly under `directory`, sorted by name.
/// The extension check is case-insensitive; subdirectories are not entered.
pub fn wav_paths_in(directory: &Path) -> Result<Vec<PathBuf>, WavError> {
    let mut paths = Vec::new();
    for entry in fs::read_dir(directory)? {
        let entry = entry?;
        let path = entry.path();
        if !path.is_file() {
            continue;
        }
        let is_wav = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.eq_ignore_ascii_case("wav"))
            .unwrap_or(false);
        if is_wav {
            paths.push(path);
        }
    }
    paths.sort();
    Ok(paths)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn assert_close(actual: &[f32], expected: &[f32], tolerance: f32) {
        assert_eq!(actual.len(), expected.len());
        for (i, (a, e)) in actual.iter().zip(expected).enumerate() {
            assert!(
                (a - e).abs() <= tolerance,
                "sample {i}: {a} vs {e} exceeds tolerance {tolerance}"
            );
        }
    }

    #[test]
    fn test_mono_round_trip_within_tolerance() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("mono.wav");

        let original = AudioBuffer::mono(vec![0.0, 0.25, -0.5, 1.0, -1.0, 0.123]);
        save_wav(&path, &original, 44_100).unwrap();

        let (loaded, sample_rate) = load_wav(&path).unwrap();
        assert_eq!(sample_rate, 44_100);
        assert_eq!(loaded.channels(), 1);
        assert_close(loaded.samples(), original.samples(), 1e-4);
    }

    #[test]
    fn test_stereo_round_trip_preserves_channels() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("stereo.wav");

        let original = AudioBuffer::interleaved(vec![0.1, -0.1, 0.5, -0.5, 0.9, -0.9], 2);
        save_wav(&path, &original, 22_050).unwrap();

        let (loaded, sample_rate) = load_wav(&path).unwrap();
        assert_eq!(sample_rate, 22_050);
        assert_eq!(loaded.channels(), 2);
        assert_eq!(loaded.frames(), 3);
        assert_close(loaded.samples(), original.samples(), 1e-4);
    }

    #[test]
    fn test_wav_info_reports_header() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("info.wav");

        let buffer = AudioBuffer::interleaved(vec![0.0; 16_000], 2);
        save_wav(&path, &buffer, 8_000).unwrap();

        let info = wav_info(&path).unwrap();
        assert_eq!(info.sample_rate, 8_000);
        assert_eq!(info.channels, 2);
        assert_eq!(info.frames, 8_000);
        assert!((info.duration_secs - 1.0).abs() < 1e-9);
        assert_eq!(info.format, "WAV");
        assert_eq!(info.subtype, "PCM_16");
    }

    #[test]
    fn test_wav_paths_filters_and_sorts() {
        let tmp = TempDir::new().unwrap();
        let write_wav = |name: &str| {
            let buffer = AudioBuffer::mono(vec![0.0; 8]);
            save_wav(&tmp.path().join(name), &buffer, 8_000).unwrap();
        };
        write_wav("b.wav");
        write_wav("a.WAV");
        fs::write(tmp.path().join("notes.txt"), b"not audio").unwrap();
        fs::create_dir(tmp.path().join("nested.wav")).unwrap();

        let paths = wav_paths_in(tmp.path()).unwrap();
        let names: Vec<_> = paths
            .iter()
            .map(|p| p.file_name().unwrap().to_str().unwrap())
            .collect();
        assert_eq!(names, vec!["a.WAV", "b.wav"]);
    }

    #[test]
    fn test_load_missing_file_is_an_error() {
        let tmp = TempDir::new().unwrap();
        assert!(load_wav(&tmp.path().join("missing.wav")).is_err());
    }
}
