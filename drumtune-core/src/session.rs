//! # Session Module
//!
//! A `Session` owns all per-listening state: the onset detector, the capture
//! orchestrator and at most one pending capture. It is created when listening
//! starts and consumed when it stops, so nothing outlives the microphone it
//! was fed from.
//!
//! The host drives it by calling `tick` once per poll with the latest
//! time-domain frame. Strike detection and the deferred capture both run
//! inside `tick`, on the caller's thread.

use std::time::Duration;

use crate::analyser::SpectrumSource;
use crate::capture::{CaptureOrchestrator, Estimate, Presenter};
use crate::catalog::Selection;
use crate::config::TunerConfig;
use crate::onset::{self, OnsetDetector, StrikeEvent};
use crate::timer::{CancellationToken, Deferred};

/// What happened during one tick.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TickOutcome {
    /// Strike detected on this tick
    pub strike: Option<StrikeEvent>,
    /// A deferred capture ran on this tick
    pub captured: bool,
    /// The estimate produced by that capture, if it found one
    pub estimate: Option<Estimate>,
}

/// Per-listening state.
#[derive(Debug)]
pub struct Session {
    detector: OnsetDetector,
    orchestrator: CaptureOrchestrator,
    pending: Option<Deferred<StrikeEvent>>,
    token: CancellationToken,
}

impl Session {
    /// Starts a session with fresh detector state.
    pub fn start(config: &TunerConfig) -> Self {
        log::info!("[SESSION] Started");
        Self {
            detector: OnsetDetector::new(config.onset.clone()),
            orchestrator: CaptureOrchestrator::new(config.capture.clone()),
            pending: None,
            token: CancellationToken::new(),
        }
    }

    /// Token that invalidates this session's deferred work when cancelled.
    ///
    /// Hand a clone to anything that may need to stop the session from
    /// outside the polling thread.
    pub fn token(&self) -> CancellationToken {
        self.token.clone()
    }

    pub fn is_live(&self) -> bool {
        !self.token.is_cancelled()
    }

    pub fn detector(&self) -> &OnsetDetector {
        &self.detector
    }

    pub fn has_pending_capture(&self) -> bool {
        self.pending.as_ref().is_some_and(|p| !p.is_cancelled())
    }

    /// Runs one poll.
    ///
    /// # Arguments
    /// * `frame` - Latest time-domain samples, normalised to [-1, 1]
    /// * `now` - Time since session start
    /// * `selection` - What the user is tuning right now
    /// * `source` - Live spectrum for deferred captures
    /// * `presenter` - Receives capture results
    pub fn tick<S, P>(
        &mut self,
        frame: &[f32],
        now: Duration,
        selection: Selection,
        source: &mut S,
        presenter: &mut P,
    ) -> TickOutcome
    where
        S: SpectrumSource + ?Sized,
        P: Presenter + ?Sized,
    {
        let mut outcome = TickOutcome::default();
        if !self.is_live() {
            self.pending = None;
            return outcome;
        }

        // Fire a capture that came due before looking for a new strike.
        if self.pending.as_ref().is_some_and(|p| p.is_due(now)) {
            if let Some(pending) = self.pending.take() {
                let strike = pending.fire();
                log::debug!("[SESSION] Capturing for strike at {:?}", strike.at);
                outcome.captured = true;
                outcome.estimate = self.orchestrator.analyze(selection, source, presenter);
            }
        }

        let energy = onset::rms(frame);
        if let Some(strike) = self.detector.observe(energy, now) {
            outcome.strike = Some(strike);
            if self.pending.is_none() {
                self.pending = Some(self.orchestrator.on_strike(strike, self.token.clone()));
            } else {
                log::debug!("[SESSION] Capture already pending, strike at {:?} ignored", now);
            }
        }

        outcome
    }

    /// Stops the session, cancelling any pending capture.
    pub fn stop(mut self) {
        self.token.cancel();
        self.pending = None;
        self.detector.reset();
        log::info!("[SESSION] Stopped");
    }
}
