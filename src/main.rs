use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use indicatif::ProgressBar;

use specto::audio::ops::{self, DEFAULT_SILENCE_THRESHOLD};
use specto::audio::player;
use specto::audio::recorder::AudioRecorder;
use specto::spectrogram::{Spectrogram, save_spectrogram};
use specto::{paths, session, storage, wav};

#[derive(Parser)]
#[command(name = "specto")]
#[command(about = "Record audio and render spectrograms into numbered session folders")]
#[command(version = "0.1.0")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Record audio into a new session folder
    Record {
        /// Recording length in seconds
        #[arg(long, default_value = "3")]
        duration: u64,

        /// Sample rate in Hz
        #[arg(long, default_value = "44100")]
        rate: u32,

        /// Number of input channels
        #[arg(long, default_value = "1")]
        channels: u16,

        /// Session root directory (defaults to <home>/SOUNDS/spectrograms)
        #[arg(long)]
        root: Option<PathBuf>,

        /// Peak-normalize before saving
        #[arg(long)]
        normalize: bool,

        /// Trim leading/trailing silence before saving
        #[arg(long)]
        trim: bool,
    },

    /// Render spectrograms for WAV files into a new session folder
    Plot {
        /// WAV files to plot
        #[arg(required = true)]
        files: Vec<PathBuf>,

        /// Session root directory
        #[arg(long)]
        root: Option<PathBuf>,
    },

    /// Normalize, trim, and plot every WAV file in a directory
    Batch {
        /// Directory containing WAV files
        directory: PathBuf,

        /// Session root directory
        #[arg(long)]
        root: Option<PathBuf>,
    },

    /// Show WAV file metadata
    Info {
        file: PathBuf,

        /// Output format
        #[arg(long, value_enum, default_value = "text")]
        format: OutputFormat,
    },

    /// Play a WAV file
    Play { file: PathBuf },

    /// List available audio input devices
    Devices,

    /// Inspect or clean up session folders
    Sessions {
        #[command(subcommand)]
        action: SessionAction,
    },
}

#[derive(clap::ValueEnum, Clone, Debug)]
enum OutputFormat {
    Text,
    Json,
}

#[derive(Subcommand)]
enum SessionAction {
    /// Print the path of the latest session folder
    Latest {
        #[arg(long)]
        root: Option<PathBuf>,
    },
    /// Print the total size of the latest session folder
    Size {
        #[arg(long)]
        root: Option<PathBuf>,
    },
    /// Delete the latest session folder
    Delete {
        #[arg(long)]
        root: Option<PathBuf>,
    },
}

fn resolve_root(root: Option<PathBuf>) -> Result<PathBuf> {
    match root {
        Some(root) => Ok(root),
        None => Ok(paths::default_root_dir()?),
    }
}

fn record(
    duration: u64,
    rate: u32,
    channels: u16,
    root: Option<PathBuf>,
    normalize: bool,
    trim: bool,
) -> Result<()> {
    let root = resolve_root(root)?;
    let session_folder = session::create_session_folder(&root)?;
    println!("Created new session: {}", session_folder.display());

    let recorder =
        AudioRecorder::open(rate, channels).context("Failed to open audio input device")?;
    if recorder.sample_rate() != rate {
        eprintln!(
            "Requested {} Hz, device supports {} Hz",
            rate,
            recorder.sample_rate()
        );
    }

    let bar = ProgressBar::new_spinner();
    bar.set_message(format!("Recording for {duration}s..."));
    bar.enable_steady_tick(Duration::from_millis(100));
    let mut buffer = recorder
        .record(Duration::from_secs(duration))
        .context("Recording failed")?;
    bar.finish_and_clear();
    println!("Recording finished.");

    if normalize {
        buffer = ops::normalize(buffer);
    }
    if trim {
        buffer = ops::trim_silence(buffer, DEFAULT_SILENCE_THRESHOLD);
    }

    let wav_path = session_folder.join(session::timestamped_filename("recording", "wav"));
    wav::save_wav(&wav_path, &buffer, recorder.sample_rate())?;
    println!("Saved recording to: {}", wav_path.display());

    let spectrogram = Spectrogram::compute(&buffer, recorder.sample_rate());
    let png_path = save_spectrogram(&spectrogram, &session_folder)?;
    println!("Saved spectrogram to: {}", png_path.display());

    Ok(())
}

fn plot_into_session(file: &Path, session_folder: &Path, clean: bool) -> Result<PathBuf> {
    let (buffer, sample_rate) =
        wav::load_wav(file).with_context(|| format!("Failed to load {}", file.display()))?;

    let buffer = if clean {
        ops::trim_silence(
            ops::normalize(ops::to_mono(buffer)),
            DEFAULT_SILENCE_THRESHOLD,
        )
    } else {
        buffer
    };

    let spectrogram = Spectrogram::compute(&buffer, sample_rate);
    Ok(save_spectrogram(&spectrogram, session_folder)?)
}

fn plot(files: Vec<PathBuf>, root: Option<PathBuf>) -> Result<()> {
    let root = resolve_root(root)?;
    let session_folder = session::create_session_folder(&root)?;
    println!("Created new session: {}", session_folder.display());

    for file in &files {
        let out = plot_into_session(file, &session_folder, false)?;
        println!("Saved spectrogram to: {}", out.display());
    }
    Ok(())
}

fn batch(directory: PathBuf, root: Option<PathBuf>) -> Result<()> {
    let files = wav::wav_paths_in(&directory)
        .with_context(|| format!("Failed to list {}", directory.display()))?;
    if files.is_empty() {
        println!("No WAV files found in {}", directory.display());
        return Ok(());
    }

    let root = resolve_root(root)?;
    let session_folder = session::create_session_folder(&root)?;
    println!("Created new session: {}", session_folder.display());

    for file in &files {
        let out = plot_into_session(file, &session_folder, true)?;
        println!("Processed {} -> {}", file.display(), out.display());
    }
    Ok(())
}

fn info(file: PathBuf, format: OutputFormat) -> Result<()> {
    let info = wav::wav_info(&file)
        .with_context(|| format!("Failed to read {}", file.display()))?;

    match format {
        OutputFormat::Text => {
            println!("Sample rate: {} Hz", info.sample_rate);
            println!("Channels:    {}", info.channels);
            println!("Frames:      {}", info.frames);
            println!("Duration:    {:.3}s", info.duration_secs);
            println!("Format:      {}", info.format);
            println!("Subtype:     {}", info.subtype);
        }
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&info)?);
        }
    }
    Ok(())
}

fn play(file: PathBuf) -> Result<()> {
    let (buffer, sample_rate) =
        wav::load_wav(&file).with_context(|| format!("Failed to load {}", file.display()))?;
    println!(
        "Playing {} ({:.1}s)...",
        file.display(),
        buffer.duration_secs(sample_rate)
    );
    player::play(&buffer, sample_rate)?;
    Ok(())
}

fn devices() -> Result<()> {
    let devices = AudioRecorder::list_devices().context("Failed to list audio devices")?;

    println!("Available Audio Devices:");
    println!(
        "{:<30} {:<10} {:<20} Formats",
        "Name", "Default", "Sample Rates"
    );
    println!("{}", "-".repeat(80));

    for device in devices {
        let default_str = if device.is_default { "YES" } else { "NO" };
        let sample_rates = device
            .supported_sample_rates
            .iter()
            .take(3)
            .map(|sr| sr.to_string())
            .collect::<Vec<_>>()
            .join(", ");

        let formats = device
            .supported_formats
            .iter()
            .take(2)
            .map(|f| format!("{:?}", f))
            .collect::<Vec<_>>()
            .join(", ");

        println!(
            "{:<30} {:<10} {:<20} {}",
            &device.name[..device.name.len().min(30)],
            default_str,
            sample_rates,
            formats
        );
    }
    Ok(())
}

fn sessions(action: SessionAction) -> Result<()> {
    match action {
        SessionAction::Latest { root } => {
            let root = resolve_root(root)?;
            match session::latest_session_folder(&root)? {
                Some(latest) => println!("{}", latest.display()),
                None => println!("No session folders found."),
            }
        }
        SessionAction::Size { root } => {
            let root = resolve_root(root)?;
            match session::latest_session_folder(&root)? {
                Some(latest) => {
                    let bytes = storage::folder_size(&latest);
                    println!(
                        "Total size of folder {}: {:.2} MB",
                        latest.display(),
                        storage::megabytes(bytes)
                    );
                }
                None => println!("No session folder found."),
            }
        }
        SessionAction::Delete { root } => {
            let root = resolve_root(root)?;
            match session::delete_latest_session(&root)? {
                Some(deleted) => {
                    println!("Deleted the latest session folder: {}", deleted.display());
                }
                None => println!("No session folders found to delete."),
            }
        }
    }
    Ok(())
}

fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Record {
            duration,
            rate,
            channels,
            root,
            normalize,
            trim,
        } => record(duration, rate, channels, root, normalize, trim),
        Commands::Plot { files, root } => plot(files, root),
        Commands::Batch { directory, root } => batch(directory, root),
        Commands::Info { file, format } => info(file, format),
        Commands::Play { file } => play(file),
        Commands::Devices => devices(),
        Commands::Sessions { action } => sessions(action),
    }
}

fn main() {
    let cli = Cli::parse();
    if let Err(err) = run(cli) {
        eprintln!("Error: {err:#}");
        std::process::exit(1);
    }
}
