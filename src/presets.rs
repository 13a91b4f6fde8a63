//! Vibe presets
//!
//! Named beat/carrier combinations. Night-safe presets sit in the theta
//! range; the awake/focus ones drift toward alpha.

use crate::dsp::BinauralParams;
use crate::engine::DEFAULT_SAMPLE_RATE;
use crate::error::{Result, SleepstackError};

/// Default fade for every preset in seconds
const PRESET_FADE_SEC: f64 = 2.0;

/// A named binaural configuration
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Preset {
    pub name: &'static str,
    pub beat_hz: f64,
    pub carrier_hz: f64,
    pub sample_rate: u32,
    pub volume: f64,
    pub fade_sec: f64,
    pub description: &'static str,
}

const fn preset(
    name: &'static str,
    beat_hz: f64,
    carrier_hz: f64,
    volume: f64,
    description: &'static str,
) -> Preset {
    Preset {
        name,
        beat_hz,
        carrier_hz,
        sample_rate: DEFAULT_SAMPLE_RATE,
        volume,
        fade_sec: PRESET_FADE_SEC,
        description,
    }
}

/// All presets, in the order prefix matching walks them
pub static PRESETS: [Preset; 10] = [
    // Night-safe
    preset("deep", 4.5, 180.0, 0.25, "Deeper settle (theta-delta border)."),
    preset("calm", 6.0, 200.0, 0.28, "Mid-theta calm & clear (default)."),
    preset("soothe", 5.0, 190.0, 0.26, "Gentle settle."),
    preset("dream", 4.0, 170.0, 0.24, "Very sleepy."),
    // Awake/focus (not bedtime)
    preset("focus", 6.5, 210.0, 0.27, "Light focus."),
    preset("flow", 7.0, 220.0, 0.27, "Creative energy."),
    preset("alert", 8.0, 240.0, 0.26, "Alpha-theta edge; peppy."),
    preset("meditate", 5.5, 200.0, 0.26, "Balanced presence."),
    preset("warm", 5.5, 180.0, 0.27, "Warmer timbre; good under fire/rain."),
    preset("airy", 6.0, 260.0, 0.26, "Brighter; leaves space for deep voices."),
];

/// Alternative names mapped to preset names
pub static ALIASES: [(&str, &str); 12] = [
    ("sleep", "deep"),
    ("settle", "deep"),
    ("night", "calm"),
    ("study", "focus"),
    ("work", "focus"),
    ("creative", "flow"),
    ("energize", "alert"),
    ("presence", "meditate"),
    ("soft", "soothe"),
    ("rain", "warm"),
    ("fire", "warm"),
    ("bright", "airy"),
];

/// Optional per-field overrides applied on top of a preset
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PresetOverrides {
    pub beat_hz: Option<f64>,
    pub carrier_hz: Option<f64>,
    pub sample_rate: Option<u32>,
    pub volume: Option<f64>,
    pub fade_sec: Option<f64>,
    /// Force fade to 0 for seamless looping
    pub seamless_loop: bool,
}

impl Preset {
    /// Look up a preset by exact name
    pub fn get(name: &str) -> Option<&'static Preset> {
        PRESETS.iter().find(|p| p.name == name)
    }

    /// Build validated generation parameters for `duration_sec`
    pub fn to_params(
        &self,
        duration_sec: f64,
        overrides: &PresetOverrides,
    ) -> Result<BinauralParams> {
        let fade_sec = if overrides.seamless_loop {
            0.0
        } else {
            overrides.fade_sec.unwrap_or(self.fade_sec)
        };

        BinauralParams::new(
            duration_sec,
            overrides.beat_hz.unwrap_or(self.beat_hz),
            overrides.carrier_hz.unwrap_or(self.carrier_hz),
            overrides.sample_rate.unwrap_or(self.sample_rate),
            overrides.volume.unwrap_or(self.volume),
            fade_sec,
        )
    }
}

/// Resolve a user-supplied vibe name to a preset
///
/// Matching is case-insensitive: exact name, then alias, then the first
/// preset whose name starts with the input.
///
/// # Errors
/// * `UnknownVibe` - if nothing matches
pub fn resolve_vibe(name: &str) -> Result<&'static Preset> {
    let key = name.trim().to_lowercase();

    if let Some(preset) = Preset::get(&key) {
        return Ok(preset);
    }

    if let Some((_, target)) = ALIASES.iter().find(|(alias, _)| *alias == key) {
        if let Some(preset) = Preset::get(target) {
            return Ok(preset);
        }
    }

    if !key.is_empty() {
        if let Some(preset) = PRESETS.iter().find(|p| p.name.starts_with(&key)) {
            return Ok(preset);
        }
    }

    Err(SleepstackError::UnknownVibe {
        name: name.to_string(),
        choices: PRESETS
            .iter()
            .map(|p| p.name)
            .collect::<Vec<_>>()
            .join(", "),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case("calm", "calm" ; "exact")]
    #[test_case("  DEEP ", "deep" ; "case and whitespace")]
    #[test_case("sleep", "deep" ; "alias")]
    #[test_case("fire", "warm" ; "alias to warm")]
    #[test_case("med", "meditate" ; "prefix")]
    #[test_case("d", "deep" ; "prefix takes first in table order")]
    fn test_resolve_vibe(input: &str, expected: &str) {
        assert_eq!(resolve_vibe(input).unwrap().name, expected);
    }

    #[test]
    fn test_resolve_unknown_vibe() {
        match resolve_vibe("zzz").unwrap_err() {
            SleepstackError::UnknownVibe { name, choices } => {
                assert_eq!(name, "zzz");
                assert!(choices.contains("calm"));
            }
            other => panic!("Expected UnknownVibe, got: {:?}", other),
        }
    }

    #[test]
    fn test_empty_vibe_is_not_a_prefix() {
        assert!(resolve_vibe("   ").is_err());
    }

    #[test]
    fn test_aliases_point_at_presets() {
        for (alias, target) in ALIASES.iter() {
            assert!(Preset::get(target).is_some(), "{} -> {}", alias, target);
        }
    }

    #[test]
    fn test_to_params_uses_preset_values() {
        let params = resolve_vibe("calm")
            .unwrap()
            .to_params(300.0, &PresetOverrides::default())
            .unwrap();
        assert_eq!(params.beat_hz, 6.0);
        assert_eq!(params.carrier_hz, 200.0);
        assert_eq!(params.volume, 0.28);
        assert_eq!(params.fade_sec, 2.0);
        assert_eq!(params.sample_rate, 48000);
    }

    #[test]
    fn test_to_params_overrides_and_loop() {
        let overrides = PresetOverrides {
            beat_hz: Some(4.0),
            fade_sec: Some(5.0),
            seamless_loop: true,
            ..PresetOverrides::default()
        };
        let params = resolve_vibe("deep")
            .unwrap()
            .to_params(60.0, &overrides)
            .unwrap();
        assert_eq!(params.beat_hz, 4.0);
        assert_eq!(params.carrier_hz, 180.0);
        assert_eq!(params.fade_sec, 0.0);
    }

    #[test]
    fn test_to_params_rejects_bad_override() {
        let overrides = PresetOverrides {
            volume: Some(2.0),
            ..PresetOverrides::default()
        };
        assert!(resolve_vibe("calm").unwrap().to_params(60.0, &overrides).is_err());
    }
}
