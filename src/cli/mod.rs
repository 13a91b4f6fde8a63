//! CLI Module
//!
//! Command-line interface for the sleepstack generator and mixer.

pub mod commands;

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

use crate::config::CONFIG_FILE_NAME;

/// Longest track the generator will render, in seconds
pub const MAX_DURATION_SEC: f64 = 600.0;

/// Sleepstack - binaural beats layered over ambience
#[derive(Parser, Debug)]
#[command(name = "sleepstack")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Path to the JSON config file
    #[arg(short, long, global = true, default_value = CONFIG_FILE_NAME)]
    pub config: PathBuf,

    #[command(subcommand)]
    pub command: Commands,
}

/// Track length, given in minutes or seconds
#[derive(Args, Debug, Clone, Default)]
pub struct DurationArgs {
    /// Length in minutes (max 10)
    #[arg(long, conflicts_with = "seconds")]
    pub minutes: Option<f64>,

    /// Length in seconds (max 600)
    #[arg(long)]
    pub seconds: Option<f64>,
}

/// Binaural overrides shared by `generate` and `run`
#[derive(Args, Debug, Clone, Default)]
pub struct ToneArgs {
    /// Beat frequency in Hz (right - left)
    #[arg(long)]
    pub beat: Option<f64>,

    /// Carrier frequency in Hz
    #[arg(long)]
    pub carrier: Option<f64>,

    /// Output sample rate
    #[arg(long)]
    pub samplerate: Option<u32>,

    /// Output volume in (0, 1]
    #[arg(long)]
    pub volume: Option<f64>,

    /// Fade in/out in seconds
    #[arg(long)]
    pub fade: Option<f64>,
}

/// Ambience selection: explicit files or named sounds
#[derive(Args, Debug, Clone, Default)]
pub struct AmbienceArgs {
    /// Ambience WAV file (repeatable)
    #[arg(long = "ambience-file", conflicts_with = "ambient")]
    pub ambience_files: Vec<PathBuf>,

    /// Comma-separated ambience sound names (e.g. rain,campfire)
    #[arg(short, long, value_delimiter = ',')]
    pub ambient: Vec<String>,

    /// Assets root holding ambience/<sound>/ clips
    #[arg(long)]
    pub assets_dir: Option<PathBuf>,
}

/// Mix levels
#[derive(Args, Debug, Clone, Default)]
pub struct LevelArgs {
    /// Binaural gain in dB
    #[arg(long, allow_negative_numbers = true)]
    pub binaural_db: Option<f64>,

    /// Ambience gain in dB; one value for all tracks or one per track
    #[arg(long, allow_negative_numbers = true)]
    pub ambience_db: Vec<f64>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Generate a binaural beat WAV
    #[command(name = "generate")]
    Generate {
        #[command(flatten)]
        duration: DurationArgs,

        #[command(flatten)]
        tone: ToneArgs,

        /// Output WAV path
        #[arg(short, long)]
        out: Option<PathBuf>,
    },

    /// Mix an existing binaural WAV with ambience
    #[command(name = "mix")]
    Mix {
        /// Stereo binaural WAV
        #[arg(short, long)]
        binaural: PathBuf,

        #[command(flatten)]
        ambience: AmbienceArgs,

        #[command(flatten)]
        levels: LevelArgs,

        /// Ambience fade in/out in seconds
        #[arg(long)]
        fade: Option<f64>,

        /// Output WAV path
        #[arg(short, long)]
        out: Option<PathBuf>,
    },

    /// Generate a vibe and mix it with ambience in one go
    #[command(name = "run")]
    Run {
        /// Vibe preset name, alias or prefix
        #[arg(long)]
        vibe: Option<String>,

        #[command(flatten)]
        duration: DurationArgs,

        #[command(flatten)]
        ambience: AmbienceArgs,

        #[command(flatten)]
        tone: ToneArgs,

        /// Disable fades for seamless looping
        #[arg(long = "loop")]
        seamless_loop: bool,

        #[command(flatten)]
        levels: LevelArgs,

        /// Ambience fade in/out in seconds
        #[arg(long)]
        ambience_fade: Option<f64>,

        /// Binaural WAV output path
        #[arg(long)]
        binaural_out: Option<PathBuf>,

        /// Mixed WAV output path
        #[arg(short, long)]
        out: Option<PathBuf>,
    },

    /// List vibe presets and aliases
    #[command(name = "vibes")]
    Vibes,

    /// Show, create or check the config file
    #[command(name = "config")]
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigAction {
    /// Print the effective config as JSON
    Show,
    /// Write a default config file
    Init,
    /// Report problems with the config file
    Validate,
}
