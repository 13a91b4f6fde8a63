//! CLI Command Implementations
//!
//! Implements the actual logic for each CLI command. Flag values win over
//! the config file, which wins over built-in defaults.

use std::path::{Path, PathBuf};

use log::{info, warn};

use crate::cli::{AmbienceArgs, ConfigAction, DurationArgs, LevelArgs, ToneArgs, MAX_DURATION_SEC};
use crate::config::AppConfig;
use crate::dsp::{self, AmbienceGain, BinauralParams, MixParams};
use crate::engine;
use crate::error::{Result, SleepstackError};
use crate::pipeline::{self, AmbienceSource, PipelineOutput, PipelineRequest};
use crate::presets::{resolve_vibe, PresetOverrides, ALIASES, PRESETS};

/// Tag used in default file names for `generate`
const CUSTOM_TAG: &str = "binaural";

/// Track length used when neither `--minutes` nor `--seconds` is given
const DEFAULT_DURATION_SEC: f64 = 300.0;

/// Generate a binaural beat WAV.
pub fn generate(
    config: &AppConfig,
    duration: &DurationArgs,
    tone: &ToneArgs,
    out: Option<&Path>,
) -> Result<PathBuf> {
    let defaults = BinauralParams::default();
    let params = BinauralParams::new(
        resolve_duration(duration)?,
        tone.beat.unwrap_or(defaults.beat_hz),
        tone.carrier.unwrap_or(defaults.carrier_hz),
        tone.samplerate.unwrap_or(config.generation.sample_rate),
        tone.volume.unwrap_or(defaults.volume),
        tone.fade.unwrap_or(defaults.fade_sec),
    )?;

    info!(
        "Generating {:.1}s: L={} Hz, R={} Hz",
        params.duration_sec,
        params.left_hz(),
        params.right_hz()
    );

    let buffer = dsp::generate(&params)?;
    let path = out.map(Path::to_path_buf).unwrap_or_else(|| {
        pipeline::default_binaural_path(&config.paths.build_dir, CUSTOM_TAG, &params)
    });
    let descriptor = engine::encode(&path, &buffer, params.sample_rate)?;

    println!(
        "Wrote {} ({:.1}s @ {} Hz)",
        path.display(),
        descriptor.duration_secs(),
        descriptor.sample_rate
    );
    Ok(path)
}

/// Mix an existing binaural WAV with ambience.
pub fn mix(
    config: &AppConfig,
    binaural: &Path,
    ambience: &AmbienceArgs,
    levels: &LevelArgs,
    fade: Option<f64>,
    out: Option<&Path>,
) -> Result<PathBuf> {
    info!("Mixing {}", binaural.display());

    let source = ambience_source(config, ambience)?;
    let params = mix_params(config, levels, fade);
    let output = pipeline::mix_files(
        binaural,
        &source,
        &params,
        out,
        &config.paths.build_dir,
        &config.read_retry,
    )?;

    print_ambience(&output);
    println!("Mixed: {}", output.mix_path.display());
    Ok(output.mix_path)
}

/// Generate a vibe and mix it with ambience in one run.
#[allow(clippy::too_many_arguments)]
pub fn run(
    config: &AppConfig,
    vibe: Option<&str>,
    duration: &DurationArgs,
    ambience: &AmbienceArgs,
    tone: &ToneArgs,
    seamless_loop: bool,
    levels: &LevelArgs,
    ambience_fade: Option<f64>,
    binaural_out: Option<&Path>,
    out: Option<&Path>,
) -> Result<PipelineOutput> {
    let preset = resolve_vibe(vibe.unwrap_or(&config.generation.default_vibe))?;
    let overrides = PresetOverrides {
        beat_hz: tone.beat,
        carrier_hz: tone.carrier,
        sample_rate: tone.samplerate.or(Some(config.generation.sample_rate)),
        volume: tone.volume,
        fade_sec: tone.fade,
        seamless_loop,
    };
    let params = preset.to_params(resolve_duration(duration)?, &overrides)?;

    info!("Vibe '{}': {}", preset.name, preset.description);

    let request = PipelineRequest {
        vibe: preset.name.to_string(),
        params,
        mix: mix_params(config, levels, ambience_fade),
        ambience: ambience_source(config, ambience)?,
        binaural_out: binaural_out.map(Path::to_path_buf),
        mix_out: out.map(Path::to_path_buf),
        build_dir: config.paths.build_dir.clone(),
        retry: config.read_retry.clone(),
    };
    let output = pipeline::run(&request)?;

    println!("Binaural: {}", output.binaural_path.display());
    print_ambience(&output);
    println!("Mixed: {}", output.mix_path.display());
    Ok(output)
}

/// List vibe presets and aliases.
pub fn list_vibes() {
    println!("Vibes:");
    println!("{:-<72}", "");
    for preset in PRESETS.iter() {
        println!(
            "  {:<9} beat {:>4} Hz  carrier {:>4} Hz  vol {:<4}  {}",
            preset.name, preset.beat_hz, preset.carrier_hz, preset.volume, preset.description
        );
    }
    println!("{:-<72}", "");
    println!("Aliases:");
    for (alias, target) in ALIASES.iter() {
        println!("  {:<9} -> {}", alias, target);
    }
}

/// Show, create or check the config file.
pub fn config(path: &Path, action: ConfigAction) -> Result<()> {
    match action {
        ConfigAction::Show => {
            let config = AppConfig::load(path)?;
            println!("{}", serde_json::to_string_pretty(&config)?);
        }
        ConfigAction::Init => {
            let mut config = AppConfig::default();
            config.save(path)?;
            println!("Config written: {}", path.display());
        }
        ConfigAction::Validate => {
            load_config(path)?;
            println!("Config OK: {}", path.display());
        }
    }
    Ok(())
}

/// Load the config and refuse it if validation finds any problem
///
/// # Errors
/// * `InvalidConfig` - if the file is malformed or any value is out of range
pub fn load_config(path: &Path) -> Result<AppConfig> {
    let config = AppConfig::load(path)?;
    let problems = config.validate();
    if !problems.is_empty() {
        for problem in &problems {
            warn!("{}: {}", path.display(), problem);
        }
        return Err(SleepstackError::InvalidConfig {
            path: path.to_path_buf(),
            reason: problems.join("; "),
        });
    }
    Ok(config)
}

// ============================================================================
// Argument resolution
// ============================================================================

/// Duration in seconds from `--minutes` / `--seconds`
pub fn resolve_duration(args: &DurationArgs) -> Result<f64> {
    let seconds = match (args.minutes, args.seconds) {
        (Some(minutes), _) => minutes * 60.0,
        (None, Some(seconds)) => seconds,
        (None, None) => DEFAULT_DURATION_SEC,
    };

    if !seconds.is_finite() || seconds <= 0.0 {
        return Err(SleepstackError::invalid("duration must be > 0"));
    }
    if seconds > MAX_DURATION_SEC {
        return Err(SleepstackError::invalid(format!(
            "duration {}s exceeds the {}s maximum",
            seconds, MAX_DURATION_SEC
        )));
    }
    Ok(seconds)
}

/// Mix levels from flags, falling back to the config
pub fn mix_params(config: &AppConfig, levels: &LevelArgs, fade: Option<f64>) -> MixParams {
    MixParams {
        binaural_gain_db: levels.binaural_db.unwrap_or(config.mix.binaural_db),
        ambience_gain_db: AmbienceGain::from_values(&levels.ambience_db)
            .unwrap_or(AmbienceGain::Uniform(config.mix.ambience_db)),
        ambience_fade_sec: fade.unwrap_or(config.mix.ambience_fade_sec),
    }
}

/// Ambience source from flags: explicit files win over sound names
pub fn ambience_source(config: &AppConfig, args: &AmbienceArgs) -> Result<AmbienceSource> {
    if !args.ambience_files.is_empty() {
        return Ok(AmbienceSource::Files(args.ambience_files.clone()));
    }

    let sounds: Vec<String> = args
        .ambient
        .iter()
        .map(|s| s.trim().to_lowercase())
        .filter(|s| !s.is_empty())
        .collect();
    if sounds.is_empty() {
        return Err(SleepstackError::invalid(
            "provide --ambience-file or --ambient",
        ));
    }

    Ok(AmbienceSource::Preset {
        assets_dir: args
            .assets_dir
            .clone()
            .unwrap_or_else(|| config.paths.assets_dir.clone()),
        sounds,
    })
}

fn print_ambience(output: &PipelineOutput) {
    for path in &output.ambience_paths {
        println!("Ambience: {}", path.display());
    }
}
