//! Sample Buffer
//!
//! In-memory multichannel float audio. Samples are stored per channel
//! (`[[L, L, ...], [R, R, ...]]`) as `f64` in the nominal range [-1.0, 1.0].

use crate::error::{Result, SleepstackError};

// ============================================================================
// Constants
// ============================================================================

/// Default sample rate for generated audio (48kHz)
pub const DEFAULT_SAMPLE_RATE: u32 = 48000;

// ============================================================================
// Helper Functions
// ============================================================================

/// Convert decibels to a linear gain multiplier
///
/// `gain = 10^(db / 20)`, so 0 dB is unity and -20 dB is 0.1.
#[inline]
pub fn db_to_gain(db: f64) -> f64 {
    10.0_f64.powf(db / 20.0)
}

// ============================================================================
// Channel Layout
// ============================================================================

/// Audio channel configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ChannelLayout {
    /// Single channel (mono)
    Mono,
    /// Two channels (stereo: left, right)
    #[default]
    Stereo,
}

impl ChannelLayout {
    /// Returns the number of channels for this layout
    pub fn num_channels(&self) -> usize {
        match self {
            ChannelLayout::Mono => 1,
            ChannelLayout::Stereo => 2,
        }
    }

    /// Create a ChannelLayout from a channel count
    pub fn from_count(count: usize) -> Option<Self> {
        match count {
            1 => Some(ChannelLayout::Mono),
            2 => Some(ChannelLayout::Stereo),
            _ => None,
        }
    }
}

// ============================================================================
// SampleBuffer
// ============================================================================

/// Fully materialized mono or stereo audio
///
/// The channel count is always 1 or 2; constructors reject anything else.
/// Buffers move between pipeline stages by value and are never shared.
///
/// # Example
/// ```
/// use sleepstack::engine::{ChannelLayout, SampleBuffer};
///
/// let buffer = SampleBuffer::new(48000, ChannelLayout::Stereo, 48000);
/// assert_eq!(buffer.channel_count(), 2);
/// assert_eq!(buffer.frame_count(), 48000);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct SampleBuffer {
    channels: Vec<Vec<f64>>,
    sample_rate: u32,
}

impl SampleBuffer {
    /// Create a silent buffer with `frames` frames
    pub fn new(frames: usize, layout: ChannelLayout, sample_rate: u32) -> Self {
        Self {
            channels: vec![vec![0.0; frames]; layout.num_channels()],
            sample_rate,
        }
    }

    /// Create a buffer where every sample holds `value`
    pub fn filled(frames: usize, layout: ChannelLayout, sample_rate: u32, value: f64) -> Self {
        Self {
            channels: vec![vec![value; frames]; layout.num_channels()],
            sample_rate,
        }
    }

    /// Build a buffer from per-channel sample vectors
    ///
    /// # Errors
    /// * `UnsupportedChannels` - if there are not exactly 1 or 2 channels
    /// * `InvalidAudio` - if the channels differ in length
    pub fn from_channels(channels: Vec<Vec<f64>>, sample_rate: u32) -> Result<Self> {
        if ChannelLayout::from_count(channels.len()).is_none() {
            return Err(SleepstackError::UnsupportedChannels {
                channels: channels.len(),
            });
        }

        let frames = channels[0].len();
        if channels.iter().any(|ch| ch.len() != frames) {
            return Err(SleepstackError::InvalidAudio {
                reason: "channels have different lengths".to_string(),
            });
        }

        Ok(Self {
            channels,
            sample_rate,
        })
    }

    /// Build a buffer from interleaved samples (L, R, L, R, ... for stereo)
    pub fn from_interleaved(
        interleaved: &[f64],
        channel_count: usize,
        sample_rate: u32,
    ) -> Result<Self> {
        if ChannelLayout::from_count(channel_count).is_none() {
            return Err(SleepstackError::UnsupportedChannels {
                channels: channel_count,
            });
        }

        if interleaved.len() % channel_count != 0 {
            return Err(SleepstackError::InvalidAudio {
                reason: format!(
                    "Interleaved data length {} is not divisible by channel count {}",
                    interleaved.len(),
                    channel_count
                ),
            });
        }

        let frames = interleaved.len() / channel_count;
        let mut channels = vec![Vec::with_capacity(frames); channel_count];

        for frame in interleaved.chunks_exact(channel_count) {
            for (ch, &sample) in frame.iter().enumerate() {
                channels[ch].push(sample);
            }
        }

        Ok(Self {
            channels,
            sample_rate,
        })
    }

    /// Get the number of frames (samples per channel)
    #[inline]
    pub fn frame_count(&self) -> usize {
        self.channels.first().map(|ch| ch.len()).unwrap_or(0)
    }

    /// Get the number of channels
    #[inline]
    pub fn channel_count(&self) -> usize {
        self.channels.len()
    }

    #[inline]
    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.frame_count() == 0
    }

    #[inline]
    pub fn is_stereo(&self) -> bool {
        self.channel_count() == 2
    }

    /// Get the duration in seconds
    pub fn duration_secs(&self) -> f64 {
        if self.sample_rate == 0 {
            return 0.0;
        }
        self.frame_count() as f64 / self.sample_rate as f64
    }

    /// Get immutable access to a channel's samples
    ///
    /// # Panics
    /// Panics if the channel index is out of bounds
    #[inline]
    pub fn channel(&self, index: usize) -> &[f64] {
        &self.channels[index]
    }

    /// Get mutable access to a channel's samples
    ///
    /// # Panics
    /// Panics if the channel index is out of bounds
    #[inline]
    pub fn channel_mut(&mut self, index: usize) -> &mut [f64] {
        &mut self.channels[index]
    }

    /// Iterate mutably over the channels
    pub fn channels_mut(&mut self) -> impl Iterator<Item = &mut Vec<f64>> {
        self.channels.iter_mut()
    }

    /// Get the samples of one frame
    pub fn frame(&self, index: usize) -> Option<Vec<f64>> {
        if index >= self.frame_count() {
            return None;
        }
        Some(self.channels.iter().map(|ch| ch[index]).collect())
    }

    /// Consume the buffer, returning its per-channel samples
    pub fn into_channels(self) -> Vec<Vec<f64>> {
        self.channels
    }

    /// Largest absolute sample value across all channels
    pub fn peak(&self) -> f64 {
        self.channels
            .iter()
            .flat_map(|ch| ch.iter())
            .map(|s| s.abs())
            .fold(0.0_f64, f64::max)
    }

    /// Multiply every sample by a linear gain
    pub fn scale(&mut self, gain: f64) {
        for channel in &mut self.channels {
            for sample in channel.iter_mut() {
                *sample *= gain;
            }
        }
    }

    /// Clamp all samples to the valid range [-1.0, 1.0]
    pub fn clamp(&mut self) {
        for channel in &mut self.channels {
            for sample in channel.iter_mut() {
                *sample = sample.clamp(-1.0, 1.0);
            }
        }
    }

    /// Duplicate a mono channel into left and right; stereo is returned as is
    pub fn into_stereo(mut self) -> Self {
        if self.channels.len() == 1 {
            let mono = self.channels[0].clone();
            self.channels.push(mono);
        }
        self
    }

    /// Keep only the first `frames` frames
    pub fn truncate(&mut self, frames: usize) {
        for channel in &mut self.channels {
            channel.truncate(frames);
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
