//! Sleepstack - Binaural Beat Generator and Ambience Mixer
//!
//! Sleepstack renders stereo binaural beats and layers them over looped
//! ambience recordings (rain, campfire, ...) into a single 16-bit WAV.
//!
//! # Architecture
//!
//! - `engine`: sample buffers, 16-bit PCM WAV codec, read retry
//! - `dsp`: tone generation, fade envelopes, ambience mixing, clip tiers
//! - `presets`: named "vibe" configurations
//! - `pipeline`: generate → encode → decode ambience → mix → encode
//! - `config` / `cli`: application defaults and the command-line surface

pub mod cli;
pub mod config;
pub mod dsp;
pub mod engine;
pub mod error;
pub mod pipeline;
pub mod presets;

pub use error::{ErrorKind, Result, SleepstackError};
