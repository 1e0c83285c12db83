//! End-to-end checks of the strike -> capture -> estimate pipeline.

use std::f32::consts::PI;
use std::time::Duration;

use drumtune_core::capture::CaptureOrchestrator;
use drumtune_core::config::CaptureConfig;
use drumtune_core::{
    Estimate, Presenter, Selection, Session, SpectrumAnalyser, SpectrumSource, TunerConfig,
    TuningStatus,
};

const SAMPLE_RATE: u32 = 44100;
const FFT_SIZE: usize = 16384;

#[derive(Default)]
struct Recorder {
    estimates: Vec<Estimate>,
    misses: usize,
}

impl Presenter for Recorder {
    fn on_estimate(&mut self, estimate: &Estimate) {
        self.estimates.push(estimate.clone());
    }

    fn on_no_estimate(&mut self) {
        self.misses += 1;
    }
}

/// A dB spectrum holding one smooth lobe centred on `hz`.
struct LobeSpectrum {
    spectrum: Vec<f32>,
}

impl LobeSpectrum {
    fn new(hz: f32) -> Self {
        let bin_width = SAMPLE_RATE as f32 / FFT_SIZE as f32;
        let spectrum = (0..FFT_SIZE / 2)
            .map(|i| {
                let offset = (i as f32 * bin_width - hz) / bin_width;
                let amplitude = 0.5 * (-offset * offset).exp();
                (20.0 * amplitude.log10()).max(-120.0)
            })
            .collect();
        Self { spectrum }
    }
}

impl SpectrumSource for LobeSpectrum {
    fn bin_count(&self) -> usize {
        self.spectrum.len()
    }

    fn bin_width_hz(&self) -> f32 {
        SAMPLE_RATE as f32 / FFT_SIZE as f32
    }

    fn capture_db(&mut self, out: &mut [f32]) {
        out.copy_from_slice(&self.spectrum);
    }
}

fn analyze(hz: f32) -> Estimate {
    let mut source = LobeSpectrum::new(hz);
    let mut recorder = Recorder::default();
    let mut orchestrator = CaptureOrchestrator::new(CaptureConfig::default());
    orchestrator
        .analyze(Selection::default(), &mut source, &mut recorder)
        .expect("lobe inside the search window")
}

#[test]
fn snare_at_225_hz_is_in_range() {
    let estimate = analyze(225.0);
    assert!((estimate.frequency_hz - 225.0).abs() <= 3.0, "{}", estimate.frequency_hz);
    assert_eq!(estimate.status, TuningStatus::InRange);
}

#[test]
fn snare_at_180_hz_is_too_low() {
    let estimate = analyze(180.0);
    assert!((estimate.frequency_hz - 180.0).abs() <= 3.0, "{}", estimate.frequency_hz);
    assert_eq!(estimate.status, TuningStatus::TooLow);
}

/// Quiet room tone followed by a decaying drum-like partial starting at `strike_at`.
fn render_strike(fundamental: f32, strike_at: usize, total: usize) -> Vec<f32> {
    (0..total)
        .map(|n| {
            let t = n as f32 / SAMPLE_RATE as f32;
            let room = 0.004 * (2.0 * PI * 1500.0 * t).sin();
            if n < strike_at {
                room
            } else {
                let dt = (n - strike_at) as f32 / SAMPLE_RATE as f32;
                room + 0.6 * (-dt / 0.1).exp() * (2.0 * PI * fundamental * dt).sin()
            }
        })
        .collect()
}

/// Feeds `signal` through an analyser and a session the way the CLI does.
fn run_session(signal: &[f32]) -> Recorder {
    let config = TunerConfig::default();
    let mut analyser = SpectrumAnalyser::new(SAMPLE_RATE, &config.analyser);
    let mut frame = vec![0.0; analyser.time_buffer_len()];
    let poll_interval = config.analyser.poll_interval(SAMPLE_RATE);

    let mut session = Session::start(&config);
    let mut recorder = Recorder::default();

    for (i, chunk) in signal.chunks(poll_interval).enumerate() {
        analyser.push_samples(chunk);
        let samples_seen = (i * poll_interval + chunk.len()) as f64;
        let now = Duration::from_secs_f64(samples_seen / SAMPLE_RATE as f64);
        analyser.time_domain(&mut frame);
        session.tick(&frame, now, Selection::default(), &mut analyser, &mut recorder);
    }

    session.stop();
    recorder
}

#[test]
fn live_strike_is_detected_and_measured() {
    let signal = render_strike(225.0, SAMPLE_RATE as usize, SAMPLE_RATE as usize * 2);
    let recorder = run_session(&signal);

    assert_eq!(recorder.misses, 0);
    assert_eq!(recorder.estimates.len(), 1);
    let estimate = &recorder.estimates[0];
    assert!((estimate.frequency_hz - 225.0).abs() <= 3.0, "{}", estimate.frequency_hz);
    assert_eq!(estimate.status, TuningStatus::InRange);
}

#[test]
fn room_tone_alone_never_triggers() {
    let signal = render_strike(225.0, usize::MAX, SAMPLE_RATE as usize * 2);
    let recorder = run_session(&signal);

    assert!(recorder.estimates.is_empty());
    assert_eq!(recorder.misses, 0);
}
