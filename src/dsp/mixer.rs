//! Ambience Mixer
//!
//! Lays one or more ambience beds under a binaural track:
//! stereo expansion → length match → fade → gain staging → sum → peak limit.
//!
//! The limiter is a uniform rescale of the whole mix, not a compressor: if
//! the summed peak exceeds [`PEAK_CEILING`], every sample is multiplied by
//! `PEAK_CEILING / peak`.

use log::debug;
use serde::{Deserialize, Serialize};

use crate::dsp::envelope::apply_fade;
use crate::engine::{db_to_gain, ensure_stereo, SampleBuffer};
use crate::error::{Result, SleepstackError};

// ============================================================================
// Constants
// ============================================================================

/// Highest absolute sample value the mix may contain
pub const PEAK_CEILING: f64 = 0.999;

/// Default binaural level in dBFS
pub const DEFAULT_BINAURAL_DB: f64 = -15.0;

/// Default ambience level in dBFS
pub const DEFAULT_AMBIENCE_DB: f64 = -21.0;

/// Default ambience fade in/out seconds
pub const DEFAULT_AMBIENCE_FADE_SEC: f64 = 2.0;

// ============================================================================
// Parameters
// ============================================================================

/// Ambience level, either shared by every track or given per track
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AmbienceGain {
    Uniform(f64),
    PerTrack(Vec<f64>),
}

impl AmbienceGain {
    /// Build from CLI-style values: one value is uniform, more are per track
    pub fn from_values(values: &[f64]) -> Option<Self> {
        match values {
            [] => None,
            [db] => Some(AmbienceGain::Uniform(*db)),
            many => Some(AmbienceGain::PerTrack(many.to_vec())),
        }
    }

    /// Gain in dB for the track at `index`
    pub fn db_for(&self, index: usize) -> Option<f64> {
        match self {
            AmbienceGain::Uniform(db) => Some(*db),
            AmbienceGain::PerTrack(dbs) => dbs.get(index).copied(),
        }
    }
}

/// Levels and fade for one mix call
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MixParams {
    pub binaural_gain_db: f64,
    pub ambience_gain_db: AmbienceGain,
    /// Fade applied to each ambience track only (>= 0)
    pub ambience_fade_sec: f64,
}

impl Default for MixParams {
    fn default() -> Self {
        Self {
            binaural_gain_db: DEFAULT_BINAURAL_DB,
            ambience_gain_db: AmbienceGain::Uniform(DEFAULT_AMBIENCE_DB),
            ambience_fade_sec: DEFAULT_AMBIENCE_FADE_SEC,
        }
    }
}

impl MixParams {
    /// Mix parameters with one ambience level for every track
    pub fn uniform(binaural_gain_db: f64, ambience_gain_db: f64, ambience_fade_sec: f64) -> Self {
        Self {
            binaural_gain_db,
            ambience_gain_db: AmbienceGain::Uniform(ambience_gain_db),
            ambience_fade_sec,
        }
    }

    /// Check the parameters against the number of ambience tracks
    pub fn validate(&self, track_count: usize) -> Result<()> {
        if self.ambience_fade_sec.is_nan() || self.ambience_fade_sec < 0.0 {
            return Err(SleepstackError::invalid(format!(
                "ambience_fade_sec must be >= 0 (got {})",
                self.ambience_fade_sec
            )));
        }
        if let AmbienceGain::PerTrack(dbs) = &self.ambience_gain_db {
            if dbs.len() != track_count {
                return Err(SleepstackError::invalid(format!(
                    "{} ambience gains given for {} ambience tracks",
                    dbs.len(),
                    track_count
                )));
            }
        }
        let all_finite = std::iter::once(self.binaural_gain_db)
            .chain((0..track_count).filter_map(|i| self.ambience_gain_db.db_for(i)))
            .all(f64::is_finite);
        if !all_finite {
            return Err(SleepstackError::invalid("gains must be finite dB values"));
        }
        Ok(())
    }
}

// ============================================================================
// Operations
// ============================================================================

/// Tile or trim `buffer` to exactly `target_frames` frames
///
/// A shorter buffer is repeated end-to-end and the last repeat cut short; a
/// longer one keeps its first `target_frames` frames. The seams are plain
/// butt joins.
///
/// # Errors
/// * `InvalidAudio` - if `buffer` is empty and `target_frames > 0`
pub fn match_length(buffer: SampleBuffer, target_frames: usize) -> Result<SampleBuffer> {
    let frames = buffer.frame_count();

    if frames >= target_frames {
        let mut buffer = buffer;
        buffer.truncate(target_frames);
        return Ok(buffer);
    }

    if frames == 0 {
        return Err(SleepstackError::InvalidAudio {
            reason: format!("cannot tile an empty ambience track to {} frames", target_frames),
        });
    }

    let sample_rate = buffer.sample_rate();
    let channels = buffer
        .into_channels()
        .into_iter()
        .map(|ch| ch.iter().cycle().take(target_frames).copied().collect::<Vec<f64>>())
        .collect();

    SampleBuffer::from_channels(channels, sample_rate)
}

/// Rescale the whole buffer so its peak does not exceed [`PEAK_CEILING`]
///
/// Buffers already under the ceiling are returned unchanged.
pub fn limit_peak(mut buffer: SampleBuffer) -> SampleBuffer {
    let peak = buffer.peak();
    if peak > PEAK_CEILING {
        debug!("Limiting peak {:.4} to {}", peak, PEAK_CEILING);
        for channel in buffer.channels_mut() {
            for sample in channel.iter_mut() {
                *sample = *sample / peak * PEAK_CEILING;
            }
        }
    }
    buffer
}

/// Mix a stereo binaural track with ambience tracks
///
/// Each ambience track is expanded to stereo, tiled/trimmed to the binaural
/// length and faded on its own before summation. The binaural track is never
/// faded here. The result is peak limited and carries the binaural sample
/// rate.
///
/// # Errors
/// * `UnsupportedChannels` - if the binaural track is not stereo
/// * `SampleRateMismatch` - if any ambience track has a different rate
/// * `InvalidParameter` - if the gains do not fit the track count
/// * `InvalidAudio` - if an ambience track is empty
pub fn mix(
    binaural: SampleBuffer,
    ambience_tracks: Vec<SampleBuffer>,
    params: &MixParams,
) -> Result<SampleBuffer> {
    if !binaural.is_stereo() {
        return Err(SleepstackError::UnsupportedChannels {
            channels: binaural.channel_count(),
        });
    }

    let sample_rate = binaural.sample_rate();
    if let Some(track) = ambience_tracks
        .iter()
        .find(|t| t.sample_rate() != sample_rate)
    {
        return Err(SleepstackError::SampleRateMismatch {
            binaural: sample_rate,
            ambience: track.sample_rate(),
        });
    }

    params.validate(ambience_tracks.len())?;

    let target = binaural.frame_count();
    let binaural_gain = db_to_gain(params.binaural_gain_db);

    let mut mixed = binaural;
    mixed.scale(binaural_gain);

    for (index, track) in ambience_tracks.into_iter().enumerate() {
        let ambience_db = params
            .ambience_gain_db
            .db_for(index)
            .ok_or_else(|| {
                SleepstackError::invalid(format!("no gain for ambience track {}", index))
            })?;
        let gain = db_to_gain(ambience_db);

        let track = ensure_stereo(track);
        let track = match_length(track, target)?;
        let track = apply_fade(track, sample_rate, params.ambience_fade_sec);

        debug!(
            "Ambience track {}: {} dB (x{:.6}), fade {}s",
            index, ambience_db, gain, params.ambience_fade_sec
        );

        for ch in 0..2 {
            for (out, amb) in mixed.channel_mut(ch).iter_mut().zip(track.channel(ch)) {
                *out += amb * gain;
            }
        }
    }

    Ok(limit_peak(mixed))
}

// ============================================================================
// Tests
// ============================================================================
