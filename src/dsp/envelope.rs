//! Fade Envelope
//!
//! Linear fade-in/fade-out applied as a pure amplitude envelope. The frame
//! count is never changed.

use crate::engine::SampleBuffer;

/// Number of frames each fade ramp covers
///
/// `min(round(fade_sec * sample_rate), frame_count / 2)`, or 0 when
/// `fade_sec <= 0`.
pub fn fade_frames(frame_count: usize, sample_rate: u32, fade_sec: f64) -> usize {
    if fade_sec.is_nan() || fade_sec <= 0.0 {
        return 0;
    }
    let requested = (fade_sec * sample_rate as f64).round() as usize;
    requested.min(frame_count / 2)
}

/// Apply a linear fade-in over the first frames and a fade-out over the last
///
/// The fade-in ramps 0→1 and the fade-out 1→0, both endpoints included, so
/// the very first and very last frame end up silent. Frames between the two
/// ramps are untouched.
pub fn apply_fade(mut buffer: SampleBuffer, sample_rate: u32, fade_sec: f64) -> SampleBuffer {
    let frames = buffer.frame_count();
    let fade = fade_frames(frames, sample_rate, fade_sec);
    if fade == 0 {
        return buffer;
    }

    let fade_in = linspace(0.0, 1.0, fade);
    let fade_out = linspace(1.0, 0.0, fade);
    for channel in buffer.channels_mut() {
        for (sample, gain) in channel[..fade].iter_mut().zip(&fade_in) {
            *sample *= gain;
        }
        for (sample, gain) in channel[frames - fade..].iter_mut().zip(&fade_out) {
            *sample *= gain;
        }
    }

    buffer
}

/// `n` evenly spaced values from `start` to `stop` inclusive
///
/// A single point is just `[start]`.
fn linspace(start: f64, stop: f64, n: usize) -> Vec<f64> {
    if n == 1 {
        return vec![start];
    }
    let step = (stop - start) / (n - 1) as f64;
    (0..n)
        .map(|i| if i == n - 1 { stop } else { start + i as f64 * step })
        .collect()
}
