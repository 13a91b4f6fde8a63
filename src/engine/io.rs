//! WAV codec for Sleepstack
//!
//! Reads and writes 16-bit PCM WAV files. Decoding accepts mono or stereo
//! input; encoding always writes stereo. No other bit depth is supported and
//! nothing is ever resampled.
//!
//! Integer samples are normalized by 32767 in both directions, so a full
//! scale negative sample (-32768) decodes to slightly below -1.0.

use std::fs;
use std::path::Path;

use hound::{SampleFormat, WavReader, WavSpec, WavWriter};
use log::debug;

use crate::engine::buffer::SampleBuffer;
use crate::engine::retry::{retry_with_backoff, RetryPolicy};
use crate::error::{Result, SleepstackError};

/// The only supported bit depth
pub const BIT_DEPTH: u16 = 16;

/// Scale between float samples and 16-bit integers
pub const PCM16_SCALE: f64 = 32767.0;

/// Metadata accompanying a decoded or encoded buffer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WavDescriptor {
    pub sample_rate: u32,
    pub channel_count: u16,
    /// Always 16
    pub bit_depth: u16,
    pub frame_count: usize,
}

impl WavDescriptor {
    /// Size of the PCM data chunk in bytes
    pub fn data_len_bytes(&self) -> usize {
        self.frame_count * self.channel_count as usize * (self.bit_depth as usize / 8)
    }

    /// Get the duration in seconds
    pub fn duration_secs(&self) -> f64 {
        if self.sample_rate == 0 {
            return 0.0;
        }
        self.frame_count as f64 / self.sample_rate as f64
    }
}

/// Decode a 16-bit PCM WAV file with the default retry policy
///
/// # Errors
/// * `FileNotFound` / `EmptyFile` - immediately, without retrying
/// * `UnsupportedBitDepth` / `UnsupportedChannels` - immediately
/// * `RetriesExhausted` - if the file stayed unreadable for every attempt
pub fn decode(path: &Path) -> Result<(SampleBuffer, WavDescriptor)> {
    decode_with_policy(path, &RetryPolicy::default())
}

/// Decode a 16-bit PCM WAV file, retrying transient read failures
pub fn decode_with_policy(
    path: &Path,
    policy: &RetryPolicy,
) -> Result<(SampleBuffer, WavDescriptor)> {
    let metadata = fs::metadata(path).map_err(|e| match e.kind() {
        std::io::ErrorKind::NotFound => SleepstackError::FileNotFound {
            path: path.to_path_buf(),
        },
        _ => SleepstackError::Io(e),
    })?;

    if metadata.len() == 0 {
        return Err(SleepstackError::EmptyFile {
            path: path.to_path_buf(),
        });
    }

    retry_with_backoff(path, policy, |_| decode_once(path))
}

/// Single decode attempt without any retry
pub fn decode_once(path: &Path) -> Result<(SampleBuffer, WavDescriptor)> {
    let mut reader = WavReader::open(path).map_err(|e| read_error(path, e))?;

    let spec = reader.spec();
    if spec.bits_per_sample != BIT_DEPTH || spec.sample_format != SampleFormat::Int {
        return Err(SleepstackError::UnsupportedBitDepth {
            path: path.to_path_buf(),
            bits: spec.bits_per_sample,
        });
    }

    let channel_count = spec.channels as usize;
    if !(1..=2).contains(&channel_count) {
        return Err(SleepstackError::UnsupportedChannels {
            channels: channel_count,
        });
    }

    let interleaved = reader
        .samples::<i16>()
        .map(|s| s.map(|v| v as f64 / PCM16_SCALE))
        .collect::<std::result::Result<Vec<f64>, _>>()
        .map_err(|e| read_error(path, e))?;

    let buffer = SampleBuffer::from_interleaved(&interleaved, channel_count, spec.sample_rate)
        .map_err(|_| SleepstackError::ReadFailed {
            path: path.to_path_buf(),
            reason: "data chunk ends mid-frame".to_string(),
        })?;

    let descriptor = WavDescriptor {
        sample_rate: spec.sample_rate,
        channel_count: spec.channels,
        bit_depth: BIT_DEPTH,
        frame_count: buffer.frame_count(),
    };

    debug!(
        "Decoded {}: {} frames, {} ch @ {} Hz",
        path.display(),
        descriptor.frame_count,
        descriptor.channel_count,
        descriptor.sample_rate
    );

    Ok((buffer, descriptor))
}

/// Encode a stereo buffer as a 16-bit PCM WAV file
///
/// Samples are clipped to [-1.0, 1.0], scaled by 32767 and rounded. Parent
/// directories are created as needed.
///
/// # Errors
/// * `UnsupportedChannels` - if the buffer is not stereo; expand mono with
///   [`ensure_stereo`] first
/// * `InvalidParameter` - if `sample_rate` is zero
/// * `WriteFailed` - if the file cannot be written
pub fn encode(path: &Path, buffer: &SampleBuffer, sample_rate: u32) -> Result<WavDescriptor> {
    if !buffer.is_stereo() {
        return Err(SleepstackError::UnsupportedChannels {
            channels: buffer.channel_count(),
        });
    }
    if sample_rate == 0 {
        return Err(SleepstackError::invalid("sample_rate must be > 0"));
    }

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|e| write_error(path, e))?;
    }

    let spec = WavSpec {
        channels: 2,
        sample_rate,
        bits_per_sample: BIT_DEPTH,
        sample_format: SampleFormat::Int,
    };

    let mut writer = WavWriter::create(path, spec).map_err(|e| write_error(path, e))?;

    let left = buffer.channel(0);
    let right = buffer.channel(1);
    for (&l, &r) in left.iter().zip(right) {
        writer
            .write_sample(to_pcm16(l))
            .map_err(|e| write_error(path, e))?;
        writer
            .write_sample(to_pcm16(r))
            .map_err(|e| write_error(path, e))?;
    }

    writer.finalize().map_err(|e| write_error(path, e))?;

    debug!(
        "Encoded {}: {} frames @ {} Hz",
        path.display(),
        buffer.frame_count(),
        sample_rate
    );

    Ok(WavDescriptor {
        sample_rate,
        channel_count: 2,
        bit_depth: BIT_DEPTH,
        frame_count: buffer.frame_count(),
    })
}

/// Return a stereo version of `buffer`
///
/// Stereo buffers pass through unchanged; mono buffers have their single
/// channel duplicated into left and right. [`SampleBuffer`] never holds any
/// other channel count.
pub fn ensure_stereo(buffer: SampleBuffer) -> SampleBuffer {
    if !buffer.is_stereo() {
        debug!("Expanding mono buffer ({} frames) to stereo", buffer.frame_count());
    }
    buffer.into_stereo()
}

// ============================================================================
// Internal helper functions
// ============================================================================

#[inline]
fn to_pcm16(sample: f64) -> i16 {
    (sample.clamp(-1.0, 1.0) * PCM16_SCALE).round() as i16
}

fn read_error(path: &Path, err: hound::Error) -> SleepstackError {
    match err {
        hound::Error::Unsupported | hound::Error::TooWide | hound::Error::InvalidSampleFormat => {
            SleepstackError::InvalidAudio {
                reason: format!("{}: {}", path.display(), err),
            }
        }
        _ => SleepstackError::ReadFailed {
            path: path.to_path_buf(),
            reason: err.to_string(),
        },
    }
}

fn write_error(path: &Path, err: impl std::fmt::Display) -> SleepstackError {
    SleepstackError::WriteFailed {
        path: path.to_path_buf(),
        reason: err.to_string(),
    }
}

// ============================================================================
// Tests
// ============================================================================
