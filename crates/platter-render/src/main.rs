//! Platter Render - offline scratch renderer
//!
//! Runs a capture and playback unit pair the way an audio callback would,
//! block by block, and writes the result to a WAV file:
//! 1. The input (or a synthesized tone) is captured and passed through
//! 2. Capture is frozen and playback starts at the write cursor
//! 3. A back-and-forth "baby scratch" gesture scrubs the frozen record
//!
//! ## Usage
//!
//! ```text
//! platter-render <out.wav> [input.wav] [--config <path>] [--lane]
//! ```
//!
//! - `--config`: scratch config YAML (defaults to the user config dir)
//! - `--lane`: drive the rate with a per-sample lane instead of messages

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};

use platter_core::config::{default_config_path, load_config, RateSource, ScratchConfig, CONFIG_FILENAME};
use platter_core::engine::{ControlMessage, ScratchEngine, Telemetry};
use platter_core::{DeckId, StereoSample, DEFAULT_SAMPLE_RATE};

/// Frames per simulated audio callback
const BLOCK_FRAMES: usize = 128;
/// Length of the synthesized tone when no input is given
const TONE_SECONDS: f64 = 3.0;
/// Length of the scratch section
const SCRATCH_SECONDS: f64 = 2.0;
/// Back-and-forth strokes per second
const STROKE_HZ: f64 = 2.0;
/// How far back each stroke pulls the record
const STROKE_SECONDS: f64 = 0.25;

struct Args {
    output: PathBuf,
    input: Option<PathBuf>,
    config: Option<PathBuf>,
    lane: bool,
}

fn parse_args() -> Result<Args> {
    let mut positional = Vec::new();
    let mut config = None;
    let mut lane = false;

    let mut args = std::env::args().skip(1);
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--lane" => lane = true,
            "--config" => match args.next() {
                Some(path) => config = Some(PathBuf::from(path)),
                None => bail!("--config needs a path"),
            },
            flag if flag.starts_with("--") => bail!("Unknown flag: {}", flag),
            _ => positional.push(PathBuf::from(arg)),
        }
    }

    let mut positional = positional.into_iter();
    let Some(output) = positional.next() else {
        bail!("Usage: platter-render <out.wav> [input.wav] [--config <path>] [--lane]");
    };
    Ok(Args {
        output,
        input: positional.next(),
        config,
        lane,
    })
}

/// Read a WAV file as stereo frames (mono is duplicated, extra channels dropped)
fn read_wav(path: &Path) -> Result<(Vec<StereoSample>, u32)> {
    let mut reader =
        hound::WavReader::open(path).with_context(|| format!("Failed to open {:?}", path))?;
    let spec = reader.spec();

    let samples: Vec<f32> = match spec.sample_format {
        hound::SampleFormat::Float => reader.samples::<f32>().collect::<Result<_, _>>()?,
        hound::SampleFormat::Int => {
            let scale = 1.0 / (1u64 << (spec.bits_per_sample.saturating_sub(1))) as f32;
            reader
                .samples::<i32>()
                .map(|s| s.map(|v| v as f32 * scale))
                .collect::<Result<_, _>>()?
        }
    };

    let channels = spec.channels.max(1) as usize;
    let frames = samples
        .chunks_exact(channels)
        .map(|c| match c {
            [mono] => StereoSample::mono(*mono),
            [left, right, ..] => StereoSample::new(*left, *right),
            [] => StereoSample::silence(),
        })
        .collect();

    log::info!(
        "Loaded {:?}: {} channel(s), {}Hz, {}-bit {:?}",
        path,
        spec.channels,
        spec.sample_rate,
        spec.bits_per_sample,
        spec.sample_format
    );
    Ok((frames, spec.sample_rate))
}

/// Detuned saw pair with a slow amplitude pulse, so scrubbing is audible
fn synth_tone(sample_rate: u32) -> Vec<StereoSample> {
    let frames = (TONE_SECONDS * sample_rate as f64) as usize;
    (0..frames)
        .map(|i| {
            let t = i as f64 / sample_rate as f64;
            let saw = |freq: f64| 2.0 * (t * freq).fract() - 1.0;
            let pulse = 0.6 + 0.4 * (std::f64::consts::TAU * 3.0 * t).sin();
            let l = 0.3 * pulse * saw(110.0);
            let r = 0.3 * pulse * saw(110.7);
            StereoSample::new(l as f32, r as f32)
        })
        .collect()
}

/// Record speed for the scratch gesture at time `t` seconds
///
/// The record is pulled back `STROKE_SECONDS` and released, `STROKE_HZ` times
/// per second; this is the derivative of that position curve.
fn gesture_rate(t: f64) -> f64 {
    let w = std::f64::consts::TAU * STROKE_HZ;
    -0.5 * STROKE_SECONDS * w * (w * t).sin()
}

fn write_wav(path: &Path, frames: &[StereoSample], sample_rate: u32) -> Result<()> {
    let spec = hound::WavSpec {
        channels: 2,
        sample_rate,
        bits_per_sample: 32,
        sample_format: hound::SampleFormat::Float,
    };
    let mut writer =
        hound::WavWriter::create(path, spec).with_context(|| format!("Failed to create {:?}", path))?;
    for frame in frames {
        writer.write_sample(frame.left)?;
        writer.write_sample(frame.right)?;
    }
    writer.finalize()?;
    Ok(())
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp_millis()
        .init();

    let args = parse_args()?;

    let config_path = args
        .config
        .clone()
        .unwrap_or_else(|| default_config_path(CONFIG_FILENAME));
    let mut config: ScratchConfig = load_config(&config_path);
    if args.lane {
        config.rate_source = RateSource::Lane;
    }
    log::info!("Rate source: {}", config.rate_source.display_name());

    let (input, sample_rate) = match &args.input {
        Some(path) => read_wav(path)?,
        None => {
            log::info!("No input given, synthesizing {:.1}s tone", TONE_SECONDS);
            (synth_tone(DEFAULT_SAMPLE_RATE), DEFAULT_SAMPLE_RATE)
        }
    };

    let deck = DeckId::new(0);
    let mut engine = ScratchEngine::new(config);
    let (mut capture, mut playback) = engine.attach_deck(deck, sample_rate)?;
    let rate_source = engine.config().rate_source;
    if let Some(ring) = engine.ring(deck) {
        log::info!("Scratch window: {:.1}s", ring.duration_seconds());
    }

    let scratch_frames = (SCRATCH_SECONDS * sample_rate as f64) as usize;
    let mut output = Vec::with_capacity(input.len() + scratch_frames);
    let mut block = vec![StereoSample::silence(); BLOCK_FRAMES];
    let mut telemetry = Vec::new();

    // Live section: capture and pass through
    for chunk in input.chunks(BLOCK_FRAMES) {
        let out = &mut block[..chunk.len()];
        capture.process(chunk, out);
        output.extend_from_slice(out);
        engine.drain_telemetry_into(&mut telemetry);
    }

    // Scratch section: the capture keeps running but no longer records
    engine.send(deck, ControlMessage::Freeze)?;
    engine.send(deck, ControlMessage::StartFromWrite { rate: 0.0 })?;

    let silence = vec![StereoSample::silence(); BLOCK_FRAMES];
    let mut lane = vec![0.0f32; BLOCK_FRAMES];
    let mut rendered = 0;
    while rendered < scratch_frames {
        let n = BLOCK_FRAMES.min(scratch_frames - rendered);
        let t0 = rendered as f64 / sample_rate as f64;
        capture.capture(&silence[..n]);

        let out = &mut block[..n];
        match rate_source {
            RateSource::Messages => {
                engine.send(deck, ControlMessage::SetRate { rate: gesture_rate(t0) })?;
                playback.process(out);
            }
            RateSource::Lane => {
                for (i, value) in lane[..n].iter_mut().enumerate() {
                    let t = (rendered + i) as f64 / sample_rate as f64;
                    *value = gesture_rate(t) as f32;
                }
                playback.process_with_rate_lane(out, &lane[..n]);
            }
        }
        output.extend_from_slice(out);
        rendered += n;
        engine.drain_telemetry_into(&mut telemetry);
    }

    engine.send(deck, ControlMessage::Stop)?;
    playback.process(&mut block[..1]);
    engine.drain_telemetry_into(&mut telemetry);

    for report in &telemetry {
        match report {
            Telemetry::Stopped { frames_traversed, .. } => {
                log::info!("Scratch stopped {} frames from its start point", frames_traversed);
            }
            other => log::debug!("{:?}", other),
        }
    }

    write_wav(&args.output, &output, sample_rate)?;
    log::info!(
        "Wrote {:?}: {:.2}s ({} live + {} scratched frames)",
        args.output,
        output.len() as f64 / sample_rate as f64,
        input.len(),
        scratch_frames
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gesture_returns_to_start() {
        // Integrate one full stroke: the record ends where it began
        let sr = 48_000.0;
        let stroke = (sr / STROKE_HZ) as usize;
        let travel: f64 = (0..stroke).map(|i| gesture_rate(i as f64 / sr)).sum();
        assert!(travel.abs() < 1e-6);

        // Half a stroke pulls it back by the full stroke length
        let half: f64 = (0..stroke / 2).map(|i| gesture_rate(i as f64 / sr)).sum();
        assert!((half + STROKE_SECONDS * sr).abs() < 1.0);
    }

    #[test]
    fn test_synth_tone_in_range() {
        let tone = synth_tone(8_000);
        assert_eq!(tone.len(), 24_000);
        assert!(tone.iter().all(|s| s.left.abs() <= 0.3 && s.right.abs() <= 0.3));
    }

    #[test]
    fn test_wav_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.wav");
        let frames = vec![StereoSample::new(0.25, -0.5), StereoSample::new(0.0, 1.0)];

        write_wav(&path, &frames, 44_100).unwrap();
        let (read, sr) = read_wav(&path).unwrap();
        assert_eq!(sr, 44_100);
        assert_eq!(read, frames);
    }
}
