//! Synthesis and Mixing
//!
//! Tone generation, fade envelopes and ambience mixing. Every operation takes
//! its buffer by value and returns the transformed buffer.

mod clips;
mod envelope;
mod mixer;
mod tone;

pub use clips::{resolve_preset_clip, select_preset_clip, sound_dir, ClipTier, DEFAULT_TIERS};
pub use envelope::{apply_fade, fade_frames};
pub use mixer::{
    limit_peak, match_length, mix, AmbienceGain, MixParams, DEFAULT_AMBIENCE_DB,
    DEFAULT_AMBIENCE_FADE_SEC, DEFAULT_BINAURAL_DB, PEAK_CEILING,
};
pub use tone::{generate, BinauralParams};
