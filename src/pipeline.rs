//! One-shot pipeline
//!
//! Generate → encode binaural → decode ambience → mix → encode final mix.
//! Also owns the default output naming under the build directory.

use std::path::{Path, PathBuf};

use log::info;

use crate::dsp::{self, BinauralParams, MixParams, DEFAULT_TIERS};
use crate::engine::{self, RetryPolicy, SampleBuffer};
use crate::error::{Result, SleepstackError};

/// Where the ambience beds come from
#[derive(Debug, Clone, PartialEq)]
pub enum AmbienceSource {
    /// Explicit WAV files, mono or stereo
    Files(Vec<PathBuf>),
    /// Named sounds whose clip tier is picked by track duration
    Preset {
        assets_dir: PathBuf,
        sounds: Vec<String>,
    },
}

impl AmbienceSource {
    /// Number of ambience tracks this source yields
    pub fn len(&self) -> usize {
        match self {
            AmbienceSource::Files(paths) => paths.len(),
            AmbienceSource::Preset { sounds, .. } => sounds.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Resolve the WAV paths for a track of `target_seconds`
    pub fn resolve(&self, target_seconds: f64) -> Result<Vec<PathBuf>> {
        match self {
            AmbienceSource::Files(paths) => {
                for path in paths {
                    if !path.exists() {
                        return Err(SleepstackError::FileNotFound { path: path.clone() });
                    }
                }
                Ok(paths.clone())
            }
            AmbienceSource::Preset { assets_dir, sounds } => sounds
                .iter()
                .map(|sound| {
                    dsp::resolve_preset_clip(assets_dir, sound, target_seconds, &DEFAULT_TIERS)
                })
                .collect(),
        }
    }
}

/// Everything one pipeline run needs
#[derive(Debug, Clone)]
pub struct PipelineRequest {
    /// Tag used in the default binaural file name
    pub vibe: String,
    pub params: BinauralParams,
    pub mix: MixParams,
    pub ambience: AmbienceSource,
    /// Explicit binaural output path (default: `<build>/binaural/<auto>.wav`)
    pub binaural_out: Option<PathBuf>,
    /// Explicit mix output path (default: `<build>/mix/<auto>.wav`)
    pub mix_out: Option<PathBuf>,
    pub build_dir: PathBuf,
    pub retry: RetryPolicy,
}

/// Files produced by a pipeline run
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineOutput {
    pub binaural_path: PathBuf,
    pub ambience_paths: Vec<PathBuf>,
    pub mix_path: PathBuf,
}

/// Run the whole pipeline
///
/// The mix is computed fully in memory before the final encode, so a format
/// error during mixing never leaves a mixed file behind.
pub fn run(request: &PipelineRequest) -> Result<PipelineOutput> {
    request.params.validate()?;
    if request.ambience.is_empty() {
        return Err(SleepstackError::invalid("at least one ambience source is required"));
    }
    request.mix.validate(request.ambience.len())?;

    // 1) Binaural
    let binaural = dsp::generate(&request.params)?;
    let binaural_path = request.binaural_out.clone().unwrap_or_else(|| {
        default_binaural_path(&request.build_dir, &request.vibe, &request.params)
    });
    engine::encode(&binaural_path, &binaural, request.params.sample_rate)?;
    info!(
        "Binaural: {} ({:.1}s @ {} Hz, beat={} Hz, carrier={} Hz, vol={}, fade={})",
        binaural_path.display(),
        binaural.duration_secs(),
        request.params.sample_rate,
        request.params.beat_hz,
        request.params.carrier_hz,
        request.params.volume,
        request.params.effective_fade_sec()
    );

    // 2) Ambience
    let ambience_paths = request.ambience.resolve(binaural.duration_secs())?;
    let tracks = decode_all(&ambience_paths, &request.retry)?;

    // 3) Mix
    let mix_path = request
        .mix_out
        .clone()
        .unwrap_or_else(|| default_mix_path(&request.build_dir, &binaural_path, &ambience_paths));
    mix_and_encode(binaural, tracks, &request.mix, &mix_path)?;

    Ok(PipelineOutput {
        binaural_path,
        ambience_paths,
        mix_path,
    })
}

/// Mix an existing binaural WAV with ambience
///
/// Preset sounds pick their clip tier from the binaural file's duration.
///
/// # Errors
/// * `UnsupportedChannels` - if the binaural file is mono
/// * `SampleRateMismatch` - if any ambience file has a different rate
pub fn mix_files(
    binaural_path: &Path,
    ambience: &AmbienceSource,
    params: &MixParams,
    out: Option<&Path>,
    build_dir: &Path,
    retry: &RetryPolicy,
) -> Result<PipelineOutput> {
    if ambience.is_empty() {
        return Err(SleepstackError::invalid("at least one ambience source is required"));
    }
    params.validate(ambience.len())?;

    let (binaural, descriptor) = engine::decode_with_policy(binaural_path, retry)?;
    if descriptor.channel_count != 2 {
        return Err(SleepstackError::UnsupportedChannels {
            channels: descriptor.channel_count as usize,
        });
    }

    let ambience_paths = ambience.resolve(descriptor.duration_secs())?;
    let tracks = decode_all(&ambience_paths, retry)?;
    let mix_path = out
        .map(Path::to_path_buf)
        .unwrap_or_else(|| default_mix_path(build_dir, binaural_path, &ambience_paths));

    mix_and_encode(binaural, tracks, params, &mix_path)?;
    Ok(PipelineOutput {
        binaural_path: binaural_path.to_path_buf(),
        ambience_paths,
        mix_path,
    })
}

// ============================================================================
// Default naming
// ============================================================================

/// `<N>min` for whole minutes, otherwise `<N>sec`
pub fn duration_tag(duration_sec: f64) -> String {
    if duration_sec % 60.0 == 0.0 {
        format!("{}min", (duration_sec / 60.0) as u64)
    } else {
        format!("{}sec", duration_sec as u64)
    }
}

/// `<vibe>_beat<b>_car<c>_<tag>.wav`
pub fn binaural_file_name(vibe: &str, params: &BinauralParams) -> String {
    format!(
        "{}_beat{}_car{}_{}.wav",
        vibe,
        params.beat_hz,
        params.carrier_hz,
        duration_tag(params.duration_sec)
    )
}

/// Default binaural output under `<build>/binaural/`
pub fn default_binaural_path(build_dir: &Path, vibe: &str, params: &BinauralParams) -> PathBuf {
    build_dir
        .join("binaural")
        .join(binaural_file_name(vibe, params))
}

/// Default mix output: `<build>/mix/<binaural>__<ambience stems joined by '+'>.wav`
pub fn default_mix_path(
    build_dir: &Path,
    binaural_path: &Path,
    ambience_paths: &[PathBuf],
) -> PathBuf {
    let tag = if ambience_paths.is_empty() {
        "mix".to_string()
    } else {
        ambience_paths
            .iter()
            .map(|p| file_stem(p))
            .collect::<Vec<_>>()
            .join("+")
    };

    build_dir
        .join("mix")
        .join(format!("{}__{}.wav", file_stem(binaural_path), tag))
}

// ============================================================================
// Internal helper functions
// ============================================================================

fn file_stem(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default()
}

fn decode_all(paths: &[PathBuf], retry: &RetryPolicy) -> Result<Vec<SampleBuffer>> {
    paths
        .iter()
        .map(|path| engine::decode_with_policy(path, retry).map(|(buffer, _)| buffer))
        .collect()
}

fn mix_and_encode(
    binaural: SampleBuffer,
    tracks: Vec<SampleBuffer>,
    params: &MixParams,
    path: &Path,
) -> Result<()> {
    let sample_rate = binaural.sample_rate();
    let mixed = dsp::mix(binaural, tracks, params)?;
    engine::encode(path, &mixed, sample_rate)?;

    info!(
        "Mixed: {} @ {} Hz (binaural {} dB, ambience {:?} dB, fade {}s)",
        path.display(),
        sample_rate,
        params.binaural_gain_db,
        params.ambience_gain_db,
        params.ambience_fade_sec
    );
    Ok(())
}
