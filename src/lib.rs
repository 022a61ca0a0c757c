//! Record audio, clean it up, and render spectrograms into numbered
//! `session_<N>` folders on disk.
//!
//! The filesystem is the only store: session numbers are re-derived from the
//! directory listing on every allocation, and exclusive directory creation
//! resolves races between concurrent writers. See [`session`] for the
//! allocation scheme, [`audio::ops`] for the amplitude transforms, and
//! [`spectrogram`] for rendering.

pub mod audio;
pub mod paths;
pub mod session;
pub mod spectrogram;
pub mod storage;
pub mod wav;

pub use audio::ops::{
    AudioBuffer, DEFAULT_SILENCE_THRESHOLD, normalize, to_mono, to_stereo, trim_silence,
};
pub use audio::player::play;
pub use audio::recorder::{AudioDeviceInfo, AudioRecorder};
pub use paths::{PathError, default_root_dir};
pub use session::{
    SessionError, create_session_folder, delete_latest_session, latest_session_folder,
    session_numbers, timestamped_filename,
};
pub use spectrogram::{Spectrogram, SpectrogramError, save_spectrogram};
pub use storage::{folder_size, megabytes};
pub use wav::{WavError, WavInfo, load_wav, save_wav, wav_info, wav_paths_in};
