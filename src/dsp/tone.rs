//! Binaural Tone Generator
//!
//! Produces a stereo pair of pure sine tones offset symmetrically around a
//! carrier: left = carrier - beat/2, right = carrier + beat/2. The listener
//! perceives the difference as a beat at `beat_hz`.

use std::f64::consts::PI;

use log::debug;
use serde::{Deserialize, Serialize};

use crate::dsp::envelope::apply_fade;
use crate::engine::{SampleBuffer, DEFAULT_SAMPLE_RATE};
use crate::error::{Result, SleepstackError};

/// Parameters for one binaural generation request
///
/// Build with [`BinauralParams::new`] (validated) or fill the fields and let
/// [`generate`] validate them before any computation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BinauralParams {
    /// Track length in seconds (> 0)
    pub duration_sec: f64,
    /// Beat frequency in Hz (> 0)
    pub beat_hz: f64,
    /// Carrier frequency in Hz (> beat_hz / 2)
    pub carrier_hz: f64,
    /// Sample rate in Hz (> 0)
    pub sample_rate: u32,
    /// Output volume scalar in (0, 1]
    pub volume: f64,
    /// Fade in/out seconds (>= 0, capped to half the duration)
    pub fade_sec: f64,
}

impl Default for BinauralParams {
    fn default() -> Self {
        Self {
            duration_sec: 300.0,
            beat_hz: 6.0,
            carrier_hz: 200.0,
            sample_rate: DEFAULT_SAMPLE_RATE,
            volume: 0.3,
            fade_sec: 3.0,
        }
    }
}

impl BinauralParams {
    /// Create validated parameters
    pub fn new(
        duration_sec: f64,
        beat_hz: f64,
        carrier_hz: f64,
        sample_rate: u32,
        volume: f64,
        fade_sec: f64,
    ) -> Result<Self> {
        let params = Self {
            duration_sec,
            beat_hz,
            carrier_hz,
            sample_rate,
            volume,
            fade_sec,
        };
        params.validate()?;
        Ok(params)
    }

    /// Check every constraint, reporting the first violation
    ///
    /// Beat, carrier and volume are checked before duration and sample rate.
    pub fn validate(&self) -> Result<()> {
        if !self.beat_hz.is_finite() || self.beat_hz <= 0.0 {
            return Err(SleepstackError::invalid(format!(
                "beat_hz must be > 0 (got {})",
                self.beat_hz
            )));
        }
        if !self.carrier_hz.is_finite() || self.carrier_hz <= self.beat_hz / 2.0 {
            return Err(SleepstackError::invalid(format!(
                "carrier_hz must be greater than beat_hz/2 (got carrier {} Hz, beat {} Hz)",
                self.carrier_hz, self.beat_hz
            )));
        }
        if self.volume.is_nan() || self.volume <= 0.0 || self.volume > 1.0 {
            return Err(SleepstackError::invalid(format!(
                "volume must be in (0, 1] (got {})",
                self.volume
            )));
        }
        if !self.duration_sec.is_finite() || self.duration_sec <= 0.0 {
            return Err(SleepstackError::invalid(format!(
                "duration_sec must be > 0 (got {})",
                self.duration_sec
            )));
        }
        if self.sample_rate == 0 {
            return Err(SleepstackError::invalid("sample_rate must be > 0"));
        }
        if self.fade_sec.is_nan() || self.fade_sec < 0.0 {
            return Err(SleepstackError::invalid(format!(
                "fade_sec must be >= 0 (got {})",
                self.fade_sec
            )));
        }
        Ok(())
    }

    /// Left ear frequency (carrier - beat/2)
    pub fn left_hz(&self) -> f64 {
        self.carrier_hz - self.beat_hz / 2.0
    }

    /// Right ear frequency (carrier + beat/2)
    pub fn right_hz(&self) -> f64 {
        self.carrier_hz + self.beat_hz / 2.0
    }

    /// Fade length after capping to half the duration
    pub fn effective_fade_sec(&self) -> f64 {
        self.fade_sec.max(0.0).min(self.duration_sec / 2.0)
    }

    /// Number of frames [`generate`] produces
    ///
    /// `duration_sec * sample_rate` truncated toward zero, so durations that
    /// are not an exact multiple of the sample period come out one frame
    /// shorter than rounding would give.
    pub fn frame_count(&self) -> usize {
        (self.duration_sec * self.sample_rate as f64) as usize
    }
}

/// Generate a stereo binaural beat buffer
///
/// Validates `params` first, so an invalid request never allocates. The
/// sine pair is shaped by the fade envelope, scaled by `volume` and clipped
/// to [-1.0, 1.0].
///
/// # Errors
/// * `InvalidParameter` - if any parameter is out of range
pub fn generate(params: &BinauralParams) -> Result<SampleBuffer> {
    params.validate()?;

    let frames = params.frame_count();
    let sample_rate = params.sample_rate as f64;
    let left_w = 2.0 * PI * params.left_hz();
    let right_w = 2.0 * PI * params.right_hz();

    debug!(
        "Generating {} frames: L={} Hz, R={} Hz @ {} Hz",
        frames,
        params.left_hz(),
        params.right_hz(),
        params.sample_rate
    );

    let (left, right): (Vec<f64>, Vec<f64>) = (0..frames)
        .map(|i| {
            let t = i as f64 / sample_rate;
            ((left_w * t).sin(), (right_w * t).sin())
        })
        .unzip();

    let buffer = SampleBuffer::from_channels(vec![left, right], params.sample_rate)?;
    let mut buffer = apply_fade(buffer, params.sample_rate, params.effective_fade_sec());

    buffer.scale(params.volume);
    buffer.clamp();

    Ok(buffer)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use test_case::test_case;

    fn params(duration_sec: f64, fade_sec: f64) -> BinauralParams {
        BinauralParams {
            duration_sec,
            fade_sec,
            ..BinauralParams::default()
        }
    }

    #[test]
    fn test_left_right_frequencies() {
        let p = BinauralParams::default();
        assert_eq!(p.left_hz(), 197.0);
        assert_eq!(p.right_hz(), 203.0);
    }

    #[test_case(1.0, 48000, 48000 ; "one second")]
    #[test_case(0.5, 44100, 22050 ; "half second cd rate")]
    #[test_case(2.25, 48000, 108000 ; "fractional seconds")]
    fn test_frame_count(duration_sec: f64, sample_rate: u32, expected: usize) {
        let p = BinauralParams {
            duration_sec,
            sample_rate,
            fade_sec: 0.0,
            ..BinauralParams::default()
        };
        let buffer = generate(&p).unwrap();
        assert_eq!(buffer.frame_count(), expected);
        assert_eq!(buffer.channel_count(), 2);
        assert_eq!(buffer.sample_rate(), sample_rate);
    }

    #[test]
    fn test_frame_count_within_one_of_rounded() {
        let p = BinauralParams {
            duration_sec: 0.123457,
            sample_rate: 44100,
            fade_sec: 0.0,
            ..BinauralParams::default()
        };
        let expected = (p.duration_sec * p.sample_rate as f64).round() as i64;
        let actual = generate(&p).unwrap().frame_count() as i64;
        assert!((expected - actual).abs() <= 1);
    }

    #[test]
    fn test_samples_follow_sine_pair() {
        let p = params(0.1, 0.0);
        let buffer = generate(&p).unwrap();

        for i in [0usize, 1, 17, 1000, 4799] {
            let t = i as f64 / 48000.0;
            let left = (2.0 * PI * 197.0 * t).sin() * 0.3;
            let right = (2.0 * PI * 203.0 * t).sin() * 0.3;
            assert_abs_diff_eq!(buffer.channel(0)[i], left, epsilon = 1e-12);
            assert_abs_diff_eq!(buffer.channel(1)[i], right, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_volume_bounds_peak() {
        let buffer = generate(&params(1.0, 0.0)).unwrap();
        assert!(buffer.peak() <= 0.3 + 1e-12);
        assert!(buffer.peak() > 0.29);
    }

    #[test]
    fn test_fade_silences_edges() {
        let buffer = generate(&params(1.0, 0.25)).unwrap();
        assert_eq!(buffer.channel(0)[0], 0.0);
        assert_eq!(buffer.channel(1)[47999], 0.0);
    }

    #[test]
    fn test_fade_capped_to_half_duration() {
        let p = params(1.0, 10.0);
        assert_eq!(p.effective_fade_sec(), 0.5);
        assert_eq!(generate(&p).unwrap().frame_count(), 48000);
    }

    #[test_case(0.0, 200.0, 0.3 ; "zero beat")]
    #[test_case(-1.0, 200.0, 0.3 ; "negative beat")]
    #[test_case(10.0, 5.0, 0.3 ; "carrier at half beat")]
    #[test_case(6.0, 200.0, 0.0 ; "zero volume")]
    #[test_case(6.0, 200.0, 1.5 ; "volume above one")]
    #[test_case(6.0, f64::INFINITY, 0.3 ; "infinite carrier")]
    #[test_case(f64::INFINITY, 200.0, 0.3 ; "infinite beat")]
    #[test_case(f64::NAN, 200.0, 0.3 ; "nan beat")]
    #[test_case(6.0, f64::NAN, 0.3 ; "nan carrier")]
    #[test_case(6.0, 200.0, f64::NAN ; "nan volume")]
    fn test_invalid_params_rejected(beat_hz: f64, carrier_hz: f64, volume: f64) {
        let p = BinauralParams {
            beat_hz,
            carrier_hz,
            volume,
            ..BinauralParams::default()
        };
        assert!(matches!(
            generate(&p),
            Err(SleepstackError::InvalidParameter { .. })
        ));
    }

    #[test]
    fn test_zero_beat_reported_before_sample_rate() {
        let p = BinauralParams {
            beat_hz: 0.0,
            sample_rate: 0,
            duration_sec: -1.0,
            ..BinauralParams::default()
        };
        match generate(&p).unwrap_err() {
            SleepstackError::InvalidParameter { reason } => assert!(reason.contains("beat_hz")),
            other => panic!("Expected InvalidParameter, got: {:?}", other),
        }
    }

    #[test]
    fn test_new_validates() {
        assert!(BinauralParams::new(60.0, 6.0, 200.0, 48000, 0.3, 2.0).is_ok());
        assert!(BinauralParams::new(60.0, 6.0, 200.0, 48000, 0.3, -2.0).is_err());
        assert!(BinauralParams::new(0.0, 6.0, 200.0, 48000, 0.3, 2.0).is_err());
    }
}
