//! # Capture Module
//!
//! Turns a strike into a frequency reading. After a short settle delay the
//! orchestrator grabs several spectra, averages them, searches the window
//! implied by the selected target band and hands the result to the
//! presentation layer.

use crate::analyser::SpectrumSource;
use crate::catalog::{self, Selection, SkinSide, TargetBand, TuningStatus};
use crate::config::CaptureConfig;
use crate::onset::StrikeEvent;
use crate::peak;
use crate::timer::{CancellationToken, Deferred};

/// One completed reading.
#[derive(Debug, Clone, PartialEq)]
pub struct Estimate {
    /// Estimated fundamental in Hz
    pub frequency_hz: f32,
    pub style_label: &'static str,
    pub target_label: &'static str,
    pub skin: SkinSide,
    pub band: TargetBand,
    pub status: TuningStatus,
}

/// Receives the outcome of every capture.
pub trait Presenter {
    fn on_estimate(&mut self, estimate: &Estimate);

    /// The capture found no usable peak; the user should strike again.
    fn on_no_estimate(&mut self);
}

/// Adds `frame` element-wise into `acc`.
fn accumulate(acc: &mut [f32], frame: &[f32]) {
    for (a, &v) in acc.iter_mut().zip(frame) {
        *a += v;
    }
}

/// Element-wise mean of equally sized spectra.
pub fn average_spectra(frames: &[Vec<f32>]) -> Vec<f32> {
    let len = frames.first().map_or(0, Vec::len);
    let mut acc = vec![0.0; len];
    for frame in frames {
        accumulate(&mut acc, frame);
    }
    let count = frames.len().max(1) as f32;
    acc.iter_mut().for_each(|v| *v /= count);
    acc
}

/// Schedules and runs post-strike spectral captures.
#[derive(Debug, Clone)]
pub struct CaptureOrchestrator {
    config: CaptureConfig,
    scratch: Vec<f32>,
    acc: Vec<f32>,
}

impl CaptureOrchestrator {
    pub fn new(config: CaptureConfig) -> Self {
        Self {
            config,
            scratch: Vec::new(),
            acc: Vec::new(),
        }
    }

    /// Creates the deferred capture for a strike, due after the settle delay.
    pub fn on_strike(
        &self,
        strike: StrikeEvent,
        token: CancellationToken,
    ) -> Deferred<StrikeEvent> {
        let due = strike.at + self.config.settle_delay();
        log::debug!("[CAPTURE] Strike at {:?}, capture due at {:?}", strike.at, due);
        Deferred::new(due, token, strike)
    }

    /// Captures `avg_spectra` spectra from `source` and returns their mean.
    pub fn capture_averaged<S: SpectrumSource + ?Sized>(&mut self, source: &mut S) -> &[f32] {
        let bins = source.bin_count();
        let passes = self.config.avg_spectra.max(1);

        self.scratch.resize(bins, 0.0);
        self.acc.clear();
        self.acc.resize(bins, 0.0);

        for _ in 0..passes {
            source.capture_db(&mut self.scratch);
            accumulate(&mut self.acc, &self.scratch);
        }
        let count = passes as f32;
        self.acc.iter_mut().for_each(|v| *v /= count);
        &self.acc
    }

    /// Runs one full capture for the current selection and reports it.
    ///
    /// Returns the estimate that was presented, if any.
    pub fn analyze<S, P>(
        &mut self,
        selection: Selection,
        source: &mut S,
        presenter: &mut P,
    ) -> Option<Estimate>
    where
        S: SpectrumSource + ?Sized,
        P: Presenter + ?Sized,
    {
        let (profile, target, band) = catalog::resolve(selection);
        let (search_min, search_max) = band.search_window(&self.config);
        let bin_width = source.bin_width_hz();

        let spectrum = self.capture_averaged(source);
        let Some(frequency_hz) = peak::estimate(spectrum, bin_width, search_min, search_max) else {
            log::warn!(
                "[CAPTURE] No peak between {:.1} and {:.1} Hz",
                search_min,
                search_max
            );
            presenter.on_no_estimate();
            return None;
        };

        let estimate = Estimate {
            frequency_hz,
            style_label: profile.label,
            target_label: target.label,
            skin: selection.skin,
            band,
            status: band.classify(frequency_hz),
        };
        log::debug!(
            "[CAPTURE] {} {} -> {:.1} Hz ({:?})",
            profile.label,
            target.label,
            frequency_hz,
            estimate.status
        );
        presenter.on_estimate(&estimate);
        Some(estimate)
    }
}
