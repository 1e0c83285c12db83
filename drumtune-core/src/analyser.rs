//! # Spectrum Analyser Module
//!
//! Keeps a rolling window of the most recent input samples and turns it into
//! either a short time-domain frame (for strike detection) or a dB magnitude
//! spectrum (for peak estimation).
//!
//! ## Features
//! - Ring buffer sized to the transform, fed from the capture callback
//! - Blackman windowing to keep leakage from masking nearby partials
//! - Planned RustFFT transform reused across captures
//! - Magnitudes normalised by transform size and reported in dB

use rustfft::{Fft, FftPlanner, num_complex::Complex};
use std::f32::consts::PI;
use std::sync::Arc;

use crate::config::AnalyserConfig;

/// Floor for dB values so silence stays finite.
pub const MIN_DB: f32 = -160.0;

/// Anything that can hand out a dB magnitude spectrum on demand.
pub trait SpectrumSource {
    /// Number of bins written by `capture_db`.
    fn bin_count(&self) -> usize;

    /// Width of one bin in Hz.
    fn bin_width_hz(&self) -> f32;

    /// Writes the current spectrum into `out`, which holds `bin_count` values.
    fn capture_db(&mut self, out: &mut [f32]);
}

/// Builds Blackman window coefficients.
fn blackman_window(n: usize) -> Vec<f32> {
    let n_f = n as f32;
    (0..n)
        .map(|i| {
            let x = i as f32 / n_f;
            0.42 - 0.5 * (2.0 * PI * x).cos() + 0.08 * (4.0 * PI * x).cos()
        })
        .collect()
}

/// Rolling-window FFT analyser.
pub struct SpectrumAnalyser {
    fft: Arc<dyn Fft<f32>>,
    sample_rate: u32,
    fft_size: usize,
    time_buffer: usize,
    history: Vec<f32>,
    write_pos: usize,
    window: Vec<f32>,
    buffer: Vec<Complex<f32>>,
    scratch: Vec<Complex<f32>>,
}

impl SpectrumAnalyser {
    pub fn new(sample_rate: u32, config: &AnalyserConfig) -> Self {
        let fft_size = config.fft_size.max(4);
        let time_buffer = config.time_buffer.clamp(1, fft_size);

        let mut planner = FftPlanner::new();
        let fft = planner.plan_fft_forward(fft_size);
        let scratch = vec![Complex::new(0.0, 0.0); fft.get_inplace_scratch_len()];

        Self {
            fft,
            sample_rate,
            fft_size,
            time_buffer,
            history: vec![0.0; fft_size],
            write_pos: 0,
            window: blackman_window(fft_size),
            buffer: vec![Complex::new(0.0, 0.0); fft_size],
            scratch,
        }
    }

    /// Length of the frame returned by `time_domain`.
    pub fn time_buffer_len(&self) -> usize {
        self.time_buffer
    }

    /// Appends mono samples, overwriting the oldest ones.
    pub fn push_samples(&mut self, samples: &[f32]) {
        for &sample in samples {
            self.history[self.write_pos] = sample;
            self.write_pos = (self.write_pos + 1) % self.fft_size;
        }
    }

    /// Copies the most recent samples, oldest first, into `out`.
    ///
    /// At most `time_buffer_len` samples are written.
    pub fn time_domain(&self, out: &mut [f32]) {
        let len = out.len().min(self.time_buffer);
        let start = (self.write_pos + self.fft_size - len) % self.fft_size;
        for (k, slot) in out.iter_mut().take(len).enumerate() {
            *slot = self.history[(start + k) % self.fft_size];
        }
    }
}

impl SpectrumSource for SpectrumAnalyser {
    fn bin_count(&self) -> usize {
        self.fft_size / 2
    }

    fn bin_width_hz(&self) -> f32 {
        self.sample_rate as f32 / self.fft_size as f32
    }

    fn capture_db(&mut self, out: &mut [f32]) {
        let (newest, oldest) = self.history.split_at(self.write_pos);
        let ordered = oldest.iter().chain(newest.iter());
        for ((slot, &sample), &w) in self.buffer.iter_mut().zip(ordered).zip(self.window.iter()) {
            *slot = Complex::new(sample * w, 0.0);
        }

        self.fft.process_with_scratch(&mut self.buffer, &mut self.scratch);

        let scale = 1.0 / self.fft_size as f32;
        for (slot, c) in out.iter_mut().zip(self.buffer.iter().take(self.fft_size / 2)) {
            let magnitude = c.norm() * scale;
            *slot = if magnitude > 0.0 {
                (20.0 * magnitude.log10()).max(MIN_DB)
            } else {
                MIN_DB
            };
        }
    }
}
