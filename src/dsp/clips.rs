//! Preset ambience clip tiers
//!
//! Each ambience sound ships as a few fixed-length clips. The tier only
//! decides which file is read; the mixer tiles or trims whatever it gets.

use std::path::{Path, PathBuf};

use log::debug;

use crate::error::{Result, SleepstackError};

/// One fixed-duration clip length
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClipTier {
    /// Suffix used in the clip file name (`campfire_5m.wav`)
    pub label: &'static str,
    /// Nominal clip duration in seconds
    pub seconds: f64,
}

/// 10 minute, 5 minute and 1 minute clips
pub const DEFAULT_TIERS: [ClipTier; 3] = [
    ClipTier {
        label: "10m",
        seconds: 600.0,
    },
    ClipTier {
        label: "5m",
        seconds: 300.0,
    },
    ClipTier {
        label: "1m",
        seconds: 60.0,
    },
];

impl ClipTier {
    /// File name of this tier for `sound`
    pub fn file_name(&self, sound: &str) -> String {
        format!("{}_{}.wav", sound, self.label)
    }
}

/// Pick the longest tier not longer than `target_seconds`
///
/// Falls back to the shortest tier when every tier is longer than the
/// target. Returns `None` only for an empty tier list.
pub fn select_preset_clip(target_seconds: f64, tiers: &[ClipTier]) -> Option<&ClipTier> {
    tiers
        .iter()
        .filter(|tier| tier.seconds <= target_seconds)
        .max_by(|a, b| a.seconds.total_cmp(&b.seconds))
        .or_else(|| tiers.iter().min_by(|a, b| a.seconds.total_cmp(&b.seconds)))
}

/// Directory holding the clips of one ambience sound
pub fn sound_dir(assets_dir: &Path, sound: &str) -> PathBuf {
    assets_dir.join("ambience").join(sound)
}

/// Resolve the clip file for `sound` that best fits `target_seconds`
///
/// # Errors
/// * `InvalidParameter` - if `tiers` is empty
/// * `FileNotFound` - if the selected clip does not exist
pub fn resolve_preset_clip(
    assets_dir: &Path,
    sound: &str,
    target_seconds: f64,
    tiers: &[ClipTier],
) -> Result<PathBuf> {
    let tier = select_preset_clip(target_seconds, tiers)
        .ok_or_else(|| SleepstackError::invalid("no ambience clip tiers configured"))?;

    let path = sound_dir(assets_dir, sound).join(tier.file_name(sound));
    debug!(
        "Selected {} tier for {:.1}s of '{}': {}",
        tier.label,
        target_seconds,
        sound,
        path.display()
    );

    if !path.exists() {
        return Err(SleepstackError::FileNotFound { path });
    }
    Ok(path)
}
