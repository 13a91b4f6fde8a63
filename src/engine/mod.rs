//! Audio Engine Module
//!
//! Core audio plumbing:
//! - Sample buffer representation
//! - 16-bit PCM WAV codec
//! - Bounded retry for reads

pub mod buffer;
pub mod io;
pub mod retry;

pub use buffer::{db_to_gain, ChannelLayout, SampleBuffer, DEFAULT_SAMPLE_RATE};
pub use io::{decode, decode_with_policy, encode, ensure_stereo, WavDescriptor};
pub use retry::{retry_with_backoff, RetryPolicy, MAX_DELAY_MS};
