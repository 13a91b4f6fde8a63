//! Integration Tests
//!
//! End-to-end tests for the sleepstack generate → mix pipeline, using real
//! WAV files on disk.

use std::fs;
use std::path::Path;

use approx::assert_relative_eq;
use hound::{SampleFormat, WavSpec, WavWriter};
use tempfile::tempdir;

use sleepstack::dsp::{self, AmbienceGain, BinauralParams, MixParams};
use sleepstack::engine::{self, RetryPolicy};
use sleepstack::pipeline::{self, AmbienceSource, PipelineRequest};
use sleepstack::presets::{resolve_vibe, PresetOverrides};
use sleepstack::SleepstackError;

/// Helper to write a constant-valued 16-bit WAV fixture
fn write_wav(path: &Path, channels: u16, sample_rate: u32, frames: usize, value: f64) {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    let spec = WavSpec {
        channels,
        sample_rate,
        bits_per_sample: 16,
        sample_format: SampleFormat::Int,
    };
    let mut writer = WavWriter::create(path, spec).unwrap();
    let sample = (value * 32767.0).round() as i16;
    for _ in 0..frames * channels as usize {
        writer.write_sample(sample).unwrap();
    }
    writer.finalize().unwrap();
}

fn short_params(duration_sec: f64) -> BinauralParams {
    BinauralParams::new(duration_sec, 6.0, 200.0, 48000, 0.3, 0.1).unwrap()
}

fn request(dir: &Path, params: BinauralParams, ambience: AmbienceSource) -> PipelineRequest {
    PipelineRequest {
        vibe: "calm".to_string(),
        params,
        mix: MixParams::default(),
        ambience,
        binaural_out: None,
        mix_out: None,
        build_dir: dir.join("build"),
        retry: RetryPolicy::immediate(2),
    }
}

fn peak(path: &Path) -> f64 {
    let (buffer, _) = engine::decode(path).unwrap();
    buffer.peak()
}

// === Codec ===

#[test]
fn test_one_second_stereo_file_size() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("one_second.wav");

    let buffer = dsp::generate(&short_params(1.0)).unwrap();
    let descriptor = engine::encode(&path, &buffer, 48000).unwrap();

    assert_eq!(descriptor.frame_count, 48000);
    assert_eq!(descriptor.data_len_bytes(), 192_000);
    assert_eq!(fs::metadata(&path).unwrap().len(), 44 + 192_000);

    let (decoded, read_back) = engine::decode(&path).unwrap();
    assert_eq!(read_back.channel_count, 2);
    assert_eq!(read_back.bit_depth, 16);
    assert_eq!(decoded.frame_count(), 48000);
}

#[test]
fn test_corrupt_file_exhausts_retries() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("corrupt.wav");
    fs::write(&path, b"definitely not a wav file").unwrap();

    match engine::decode_with_policy(&path, &RetryPolicy::immediate(3)).unwrap_err() {
        SleepstackError::RetriesExhausted { attempts, .. } => assert_eq!(attempts, 3),
        other => panic!("Expected RetriesExhausted, got: {:?}", other),
    }
}

// === Full Pipeline Tests ===

#[test]
fn test_pipeline_with_preset_clip() {
    let dir = tempdir().unwrap();
    let assets = dir.path().join("assets");
    let clip = dsp::sound_dir(&assets, "rain").join("rain_1m.wav");
    write_wav(&clip, 2, 48000, 12_000, 0.5);

    let source = AmbienceSource::Preset {
        assets_dir: assets,
        sounds: vec!["rain".to_string()],
    };
    let output = pipeline::run(&request(dir.path(), short_params(2.0), source)).unwrap();

    assert_eq!(output.ambience_paths, vec![clip]);
    assert_eq!(
        output.binaural_path,
        dir.path()
            .join("build")
            .join("binaural")
            .join("calm_beat6_car200_2sec.wav")
    );
    assert_eq!(
        output.mix_path,
        dir.path()
            .join("build")
            .join("mix")
            .join("calm_beat6_car200_2sec__rain_1m.wav")
    );

    let (mixed, descriptor) = engine::decode(&output.mix_path).unwrap();
    assert_eq!(descriptor.channel_count, 2);
    assert_eq!(mixed.frame_count(), 96_000);
    assert!(mixed.peak() <= dsp::PEAK_CEILING + 1.0 / 32767.0);
}

#[test]
fn test_pipeline_mono_ambience_file() {
    let dir = tempdir().unwrap();
    let mono = dir.path().join("fire.wav");
    write_wav(&mono, 1, 48000, 4_800, 0.25);

    let mut req = request(
        dir.path(),
        short_params(1.0),
        AmbienceSource::Files(vec![mono]),
    );
    req.mix = MixParams::uniform(-15.0, 0.0, 0.0);
    let output = pipeline::run(&req).unwrap();

    let (mixed, descriptor) = engine::decode(&output.mix_path).unwrap();
    assert_eq!(descriptor.channel_count, 2);
    assert_eq!(mixed.frame_count(), 48_000);

    // Binaural channels differ, the mono bed lands equally in both
    let (binaural, _) = engine::decode(&output.binaural_path).unwrap();
    let gain = engine::db_to_gain(-15.0);
    for frame in [0usize, 1000, 30_000, 47_999] {
        for ch in 0..2 {
            let expected = binaural.channel(ch)[frame] * gain + 0.25;
            assert_relative_eq!(mixed.channel(ch)[frame], expected, epsilon = 2e-4);
        }
    }
}

#[test]
fn test_sample_rate_mismatch_writes_no_mix() {
    let dir = tempdir().unwrap();
    let ambience = dir.path().join("rain_44k.wav");
    write_wav(&ambience, 2, 44100, 4_410, 0.1);

    let mut req = request(
        dir.path(),
        short_params(1.0),
        AmbienceSource::Files(vec![ambience]),
    );
    let mix_out = dir.path().join("out").join("mix.wav");
    req.mix_out = Some(mix_out.clone());

    match pipeline::run(&req).unwrap_err() {
        SleepstackError::SampleRateMismatch {
            binaural,
            ambience,
        } => {
            assert_eq!(binaural, 48000);
            assert_eq!(ambience, 44100);
        }
        other => panic!("Expected SampleRateMismatch, got: {:?}", other),
    }
    assert!(!mix_out.exists());
}

#[test]
fn test_loud_mix_is_limited() {
    let dir = tempdir().unwrap();
    let bed = dir.path().join("loud.wav");
    write_wav(&bed, 2, 48000, 48_000, 0.9);

    let params = BinauralParams::new(1.0, 6.0, 200.0, 48000, 1.0, 0.0).unwrap();
    let mut req = request(dir.path(), params, AmbienceSource::Files(vec![bed]));
    req.mix = MixParams::uniform(0.0, 0.0, 0.0);
    let output = pipeline::run(&req).unwrap();

    let limited = peak(&output.mix_path);
    assert!(limited <= dsp::PEAK_CEILING + 1e-4, "peak {}", limited);
    assert!(limited >= 0.998, "peak {}", limited);
}

#[test]
fn test_per_track_gains_and_explicit_paths() {
    let dir = tempdir().unwrap();
    let rain = dir.path().join("rain.wav");
    let fire = dir.path().join("fire.wav");
    write_wav(&rain, 2, 48000, 48_000, 0.1);
    write_wav(&fire, 1, 48000, 10_000, 0.1);

    let binaural_out = dir.path().join("custom").join("bed.wav");
    let mix_out = dir.path().join("custom").join("final.wav");
    let mut req = request(
        dir.path(),
        short_params(1.0),
        AmbienceSource::Files(vec![rain.clone(), fire.clone()]),
    );
    req.binaural_out = Some(binaural_out.clone());
    req.mix_out = Some(mix_out.clone());
    req.mix = MixParams {
        binaural_gain_db: -120.0,
        ambience_gain_db: AmbienceGain::PerTrack(vec![0.0, -6.0]),
        ambience_fade_sec: 0.0,
    };

    let output = pipeline::run(&req).unwrap();
    assert_eq!(output.binaural_path, binaural_out);
    assert_eq!(output.mix_path, mix_out);
    assert_eq!(output.ambience_paths, vec![rain, fire]);

    let (mixed, _) = engine::decode(&mix_out).unwrap();
    let expected = 0.1 + 0.1 * engine::db_to_gain(-6.0);
    assert_relative_eq!(mixed.channel(0)[24_000], expected, epsilon = 2e-4);
}

#[test]
fn test_mismatched_gain_count_fails_before_writing() {
    let dir = tempdir().unwrap();
    let rain = dir.path().join("rain.wav");
    write_wav(&rain, 2, 48000, 4_800, 0.1);

    let mut req = request(
        dir.path(),
        short_params(1.0),
        AmbienceSource::Files(vec![rain]),
    );
    req.mix.ambience_gain_db = AmbienceGain::PerTrack(vec![-20.0, -25.0]);

    assert!(matches!(
        pipeline::run(&req),
        Err(SleepstackError::InvalidParameter { .. })
    ));
    assert!(!dir.path().join("build").exists());
}

// === Standalone mix ===

#[test]
fn test_mix_files_from_existing_binaural() {
    let dir = tempdir().unwrap();
    let binaural = dir.path().join("bed.wav");
    let params = resolve_vibe("deep")
        .unwrap()
        .to_params(1.0, &PresetOverrides::default())
        .unwrap();
    engine::encode(&binaural, &dsp::generate(&params).unwrap(), params.sample_rate).unwrap();

    let assets = dir.path().join("assets");
    let clip = dsp::sound_dir(&assets, "ocean").join("ocean_1m.wav");
    write_wav(&clip, 2, 48000, 3_000, 0.2);

    let output = pipeline::mix_files(
        &binaural,
        &AmbienceSource::Preset {
            assets_dir: assets,
            sounds: vec!["ocean".to_string()],
        },
        &MixParams::default(),
        None,
        &dir.path().join("build"),
        &RetryPolicy::immediate(1),
    )
    .unwrap();

    assert_eq!(
        output.mix_path,
        dir.path().join("build").join("mix").join("bed__ocean_1m.wav")
    );
    let (mixed, _) = engine::decode(&output.mix_path).unwrap();
    assert_eq!(mixed.frame_count(), 48_000);
}

#[test]
fn test_mix_files_rejects_mono_binaural() {
    let dir = tempdir().unwrap();
    let binaural = dir.path().join("mono_bed.wav");
    let ambience = dir.path().join("rain.wav");
    write_wav(&binaural, 1, 48000, 4_800, 0.1);
    write_wav(&ambience, 2, 48000, 4_800, 0.1);

    let result = pipeline::mix_files(
        &binaural,
        &AmbienceSource::Files(vec![ambience]),
        &MixParams::default(),
        Some(&dir.path().join("out.wav")),
        dir.path(),
        &RetryPolicy::no_retry(),
    );

    match result.unwrap_err() {
        SleepstackError::UnsupportedChannels { channels } => assert_eq!(channels, 1),
        other => panic!("Expected UnsupportedChannels, got: {:?}", other),
    }
    assert!(!dir.path().join("out.wav").exists());
}

#[test]
fn test_missing_preset_clip() {
    let dir = tempdir().unwrap();
    let source = AmbienceSource::Preset {
        assets_dir: dir.path().join("assets"),
        sounds: vec!["wind".to_string()],
    };

    let err = pipeline::run(&request(dir.path(), short_params(1.0), source)).unwrap_err();
    match err {
        SleepstackError::FileNotFound { path } => {
            assert_eq!(path, dir.path().join("assets/ambience/wind/wind_1m.wav"));
        }
        other => panic!("Expected FileNotFound, got: {:?}", other),
    }
}
