//! Audio capture, playback, and amplitude-domain transforms.

pub mod ops;
pub mod player;
pub mod recorder;

pub use ops::{AudioBuffer, DEFAULT_SILENCE_THRESHOLD, normalize, to_mono, to_stereo, trim_silence};
pub use player::play;
pub use recorder::{AudioDeviceInfo, AudioRecorder};
