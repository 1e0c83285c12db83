//! # Onset Detection Module
//!
//! Energy-based strike detection. Each poll reduces the latest time-domain
//! frame to one RMS value, folds it into a slowly moving noise baseline and
//! reports a strike when the value clears both an absolute floor and a
//! relative rise over the baseline, outside the refractory window of the
//! previous strike.

use std::time::Duration;

use crate::config::OnsetConfig;

/// A detected drum strike.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StrikeEvent {
    /// Time of the strike, relative to session start
    pub at: Duration,
}

/// Root-mean-square amplitude of a frame.
pub fn rms(frame: &[f32]) -> f32 {
    if frame.is_empty() {
        return 0.0;
    }
    (frame.iter().map(|&s| s * s).sum::<f32>() / frame.len() as f32).sqrt()
}

/// Rolling-baseline transient detector.
#[derive(Debug, Clone)]
pub struct OnsetDetector {
    config: OnsetConfig,
    baseline: f32,
    last_strike: Option<Duration>,
}

impl OnsetDetector {
    pub fn new(config: OnsetConfig) -> Self {
        Self {
            config,
            baseline: 0.0,
            last_strike: None,
        }
    }

    /// Current ambient RMS estimate.
    pub fn baseline(&self) -> f32 {
        self.baseline
    }

    pub fn last_strike(&self) -> Option<Duration> {
        self.last_strike
    }

    /// Forgets the baseline and the last strike.
    pub fn reset(&mut self) {
        self.baseline = 0.0;
        self.last_strike = None;
    }

    /// Feeds one energy sample taken at `now`.
    ///
    /// The baseline is updated before the gates are checked and also on
    /// strike frames, so a strike is compared against a baseline that
    /// already contains it.
    pub fn observe(&mut self, sample: f32, now: Duration) -> Option<StrikeEvent> {
        // A zero baseline means nothing has been heard yet.
        self.baseline = if self.baseline == 0.0 {
            sample
        } else {
            (1.0 - self.config.smoothing) * self.baseline + self.config.smoothing * sample
        };

        let can_trigger = match self.last_strike {
            Some(last) => now.saturating_sub(last) > self.config.refractory(),
            None => true,
        };

        let is_strike = can_trigger
            && sample > self.config.abs_threshold
            && sample > self.baseline * self.config.rise_factor;

        if is_strike {
            self.last_strike = Some(now);
            log::debug!(
                "[ONSET] Strike at {:?} (rms {:.4}, baseline {:.4})",
                now,
                sample,
                self.baseline
            );
            Some(StrikeEvent { at: now })
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(value: u64) -> Duration {
        Duration::from_millis(value)
    }

    /// Detector whose baseline has settled on `level`.
    fn settled_detector(level: f32) -> OnsetDetector {
        let mut detector = OnsetDetector::new(OnsetConfig::default());
        for i in 0..50 {
            assert!(detector.observe(level, ms(i * 16)).is_none());
        }
        detector
    }

    #[test]
    fn test_rms() {
        assert_eq!(rms(&[]), 0.0);
        assert!((rms(&[0.5, -0.5, 0.5, -0.5]) - 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_baseline_seeded_with_first_sample() {
        let mut detector = OnsetDetector::new(OnsetConfig::default());
        detector.observe(0.02, ms(0));
        assert_eq!(detector.baseline(), 0.02);
        detector.observe(0.04, ms(16));
        assert!((detector.baseline() - (0.98 * 0.02 + 0.02 * 0.04)).abs() < 1e-7);
    }

    #[test]
    fn test_loud_sample_over_quiet_room_triggers() {
        let mut detector = settled_detector(0.01);
        let event = detector.observe(0.07, ms(1000));
        assert_eq!(event, Some(StrikeEvent { at: ms(1000) }));
        assert_eq!(detector.last_strike(), Some(ms(1000)));
    }

    #[test]
    fn test_absolute_gate_alone_blocks() {
        // 0.03 is three times the baseline but under the 0.035 floor.
        let mut detector = settled_detector(0.01);
        assert!(detector.observe(0.03, ms(1000)).is_none());
    }

    #[test]
    fn test_rise_gate_alone_blocks() {
        // 0.07 clears the floor but is not 1.8x a noisy room.
        let mut detector = settled_detector(0.05);
        assert!(detector.observe(0.07, ms(1000)).is_none());
    }

    #[test]
    fn test_refractory_suppresses_second_strike() {
        let mut detector = settled_detector(0.01);
        let strikes = [ms(1000), ms(1100), ms(1240)]
            .into_iter()
            .filter_map(|t| detector.observe(0.2, t))
            .count();
        assert_eq!(strikes, 1);
    }

    #[test]
    fn test_strike_allowed_after_refractory() {
        let mut detector = settled_detector(0.01);
        assert!(detector.observe(0.2, ms(1000)).is_some());
        for i in 1..20 {
            detector.observe(0.01, ms(1000 + i * 10));
        }
        assert!(detector.observe(0.2, ms(1251)).is_some());
    }

    #[test]
    fn test_refractory_window_is_exclusive() {
        let mut detector = settled_detector(0.01);
        assert!(detector.observe(0.2, ms(1000)).is_some());
        assert!(detector.observe(0.2, ms(1250)).is_none());
        assert_eq!(detector.observe(0.2, ms(1251)), Some(StrikeEvent { at: ms(1251) }));
    }

    #[test]
    fn test_baseline_converges_to_constant_input() {
        let mut detector = OnsetDetector::new(OnsetConfig::default());
        detector.observe(0.05, ms(0));
        for i in 1..=300 {
            detector.observe(0.01, ms(i * 16));
        }
        assert!(
            (detector.baseline() - 0.01).abs() < 2e-4,
            "baseline {}",
            detector.baseline()
        );
    }

    #[test]
    fn test_reset_clears_state() {
        let mut detector = settled_detector(0.01);
        detector.observe(0.2, ms(1000));
        detector.reset();
        assert_eq!(detector.baseline(), 0.0);
        assert_eq!(detector.last_strike(), None);
    }
}
