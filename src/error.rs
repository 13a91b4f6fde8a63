//! Error handling for Sleepstack
//!
//! Every failure is fatal to the current pipeline run. Variants are grouped
//! into a small set of kinds so the binary can map them to exit codes.

use std::path::PathBuf;

use thiserror::Error;

/// Result type alias for Sleepstack operations
pub type Result<T> = std::result::Result<T, SleepstackError>;

/// Broad category of a [`SleepstackError`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Bad synthesis or mix parameters
    Validation,
    /// Audio that the engine cannot process as-is
    Format,
    /// Missing, empty or unreadable files
    Io,
    /// Broken configuration document
    Config,
}

/// Main error type for Sleepstack operations
#[derive(Error, Debug)]
pub enum SleepstackError {
    // Validation Errors
    #[error("Invalid parameter: {reason}")]
    InvalidParameter { reason: String },

    #[error("Unknown vibe '{name}'. Choices: {choices}")]
    UnknownVibe { name: String, choices: String },

    // Format Errors
    #[error("Unsupported bit depth in {path}: only 16-bit PCM supported (got {bits}-bit)")]
    UnsupportedBitDepth { path: PathBuf, bits: u16 },

    #[error("Unsupported channel count: {channels} (only mono/stereo supported)")]
    UnsupportedChannels { channels: usize },

    #[error(
        "Sample rate mismatch: binaural={binaural} Hz, ambience={ambience} Hz. \
         Resample externally or regenerate to match"
    )]
    SampleRateMismatch { binaural: u32, ambience: u32 },

    #[error("Invalid audio: {reason}")]
    InvalidAudio { reason: String },

    // I/O Errors
    #[error("File not found: {path}")]
    FileNotFound { path: PathBuf },

    #[error("File is empty: {path}")]
    EmptyFile { path: PathBuf },

    #[error("Failed to read {path}: {reason}")]
    ReadFailed { path: PathBuf, reason: String },

    #[error("All {attempts} read attempts failed for {path}: {source}")]
    RetriesExhausted {
        path: PathBuf,
        attempts: u32,
        #[source]
        source: Box<SleepstackError>,
    },

    #[error("Failed to write {path}: {reason}")]
    WriteFailed { path: PathBuf, reason: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    // Config Errors
    #[error("Invalid config {path}: {reason}")]
    InvalidConfig { path: PathBuf, reason: String },

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl SleepstackError {
    /// Shorthand for an [`SleepstackError::InvalidParameter`]
    pub fn invalid(reason: impl Into<String>) -> Self {
        SleepstackError::InvalidParameter {
            reason: reason.into(),
        }
    }

    /// Get the category of this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            SleepstackError::InvalidParameter { .. } | SleepstackError::UnknownVibe { .. } => {
                ErrorKind::Validation
            }
            SleepstackError::UnsupportedBitDepth { .. }
            | SleepstackError::UnsupportedChannels { .. }
            | SleepstackError::SampleRateMismatch { .. }
            | SleepstackError::InvalidAudio { .. } => ErrorKind::Format,
            SleepstackError::FileNotFound { .. }
            | SleepstackError::EmptyFile { .. }
            | SleepstackError::ReadFailed { .. }
            | SleepstackError::RetriesExhausted { .. }
            | SleepstackError::WriteFailed { .. }
            | SleepstackError::Io(_) => ErrorKind::Io,
            SleepstackError::InvalidConfig { .. } | SleepstackError::Serialization(_) => {
                ErrorKind::Config
            }
        }
    }

    /// Get the error code for this error type
    pub fn error_code(&self) -> &'static str {
        match self {
            SleepstackError::InvalidParameter { .. } => "INVALID_PARAMETER",
            SleepstackError::UnknownVibe { .. } => "UNKNOWN_VIBE",
            SleepstackError::UnsupportedBitDepth { .. } => "UNSUPPORTED_BIT_DEPTH",
            SleepstackError::UnsupportedChannels { .. } => "UNSUPPORTED_CHANNELS",
            SleepstackError::SampleRateMismatch { .. } => "SAMPLE_RATE_MISMATCH",
            SleepstackError::InvalidAudio { .. } => "INVALID_AUDIO",
            SleepstackError::FileNotFound { .. } => "FILE_NOT_FOUND",
            SleepstackError::EmptyFile { .. } => "EMPTY_FILE",
            SleepstackError::ReadFailed { .. } => "READ_FAILED",
            SleepstackError::RetriesExhausted { .. } => "RETRIES_EXHAUSTED",
            SleepstackError::WriteFailed { .. } => "WRITE_FAILED",
            SleepstackError::Io(_) => "IO_ERROR",
            SleepstackError::InvalidConfig { .. } => "INVALID_CONFIG",
            SleepstackError::Serialization(_) => "SERIALIZATION_ERROR",
        }
    }

    /// Process exit code the CLI reports for this error
    pub fn exit_code(&self) -> i32 {
        match self.kind() {
            ErrorKind::Validation => 2,
            ErrorKind::Format => 3,
            ErrorKind::Io => 4,
            ErrorKind::Config => 5,
        }
    }

    /// Check if a read may succeed when attempted again
    ///
    /// Only unreadable-file failures qualify. Missing or empty files and
    /// every format/validation failure are final.
    pub fn is_transient(&self) -> bool {
        matches!(self, SleepstackError::ReadFailed { .. })
    }

    /// Get recovery suggestions for this error
    pub fn recovery_suggestions(&self) -> Vec<&'static str> {
        match self {
            SleepstackError::InvalidParameter { .. } => vec![
                "Beat frequency must be > 0",
                "Carrier frequency must be greater than half the beat frequency",
                "Volume must be in (0, 1]",
            ],
            SleepstackError::UnknownVibe { .. } => {
                vec!["Run 'sleepstack vibes' to list available presets"]
            }
            SleepstackError::UnsupportedBitDepth { .. } => vec![
                "Convert the file to 16-bit PCM WAV first",
                "e.g. ffmpeg -i input.wav -c:a pcm_s16le output.wav",
            ],
            SleepstackError::SampleRateMismatch { .. } => vec![
                "Resample the ambience externally (e.g. ffmpeg -ar 48000)",
                "Or regenerate the binaural track at the ambience sample rate",
            ],
            SleepstackError::FileNotFound { .. } => vec![
                "Check the file path is correct",
                "Verify the ambience clips exist under assets/ambience/<sound>/",
            ],
            SleepstackError::EmptyFile { .. } | SleepstackError::RetriesExhausted { .. } => vec![
                "The file may still be being written - try again shortly",
                "The file may be corrupted - try re-exporting from source",
            ],
            SleepstackError::InvalidConfig { .. } | SleepstackError::Serialization(_) => vec![
                "Run 'sleepstack config validate' to see every problem",
                "Run 'sleepstack config init' to write a fresh default config",
            ],
            _ => vec![],
        }
    }
}
