//! # Configuration Module
//!
//! Runtime parameters for onset detection, spectral capture and the analyser.
//! Every field has a default, so a JSON file only needs to name the values it
//! overrides.

use serde::{Deserialize, Serialize};
use std::fs;
use std::io::ErrorKind;
use std::path::Path;
use std::time::Duration;

use crate::error::Result;

/// Complete tuner configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TunerConfig {
    pub onset: OnsetConfig,
    pub capture: CaptureConfig,
    pub analyser: AnalyserConfig,
}

/// Strike detection parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OnsetConfig {
    /// Absolute RMS floor on a normalized [-1, 1] scale
    pub abs_threshold: f32,
    /// Required rise over the ambient baseline
    pub rise_factor: f32,
    /// Minimum gap between two strikes
    pub refractory_ms: u64,
    /// Weight of the newest sample in the baseline average
    pub smoothing: f32,
}

impl Default for OnsetConfig {
    fn default() -> Self {
        Self {
            abs_threshold: 0.035,
            rise_factor: 1.8,
            refractory_ms: 250,
            smoothing: 0.02,
        }
    }
}

impl OnsetConfig {
    pub fn refractory(&self) -> Duration {
        Duration::from_millis(self.refractory_ms)
    }
}

/// Post-strike capture parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CaptureConfig {
    /// Wait after the strike so the attack click decays into the tone
    pub settle_delay_ms: u64,
    /// Number of spectra averaged per capture
    pub avg_spectra: usize,
    /// Lowest frequency ever searched
    pub absolute_floor_hz: f32,
    /// Search margin below the target band
    pub guard_low_hz: f32,
    /// Search margin above the target band
    pub guard_high_hz: f32,
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            settle_delay_ms: 45,
            avg_spectra: 4,
            absolute_floor_hz: 40.0,
            guard_low_hz: 40.0,
            guard_high_hz: 100.0,
        }
    }
}

impl CaptureConfig {
    pub fn settle_delay(&self) -> Duration {
        Duration::from_millis(self.settle_delay_ms)
    }
}

/// Spectrum analyser parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalyserConfig {
    /// Transform size; large for fine low-frequency resolution
    pub fft_size: usize,
    /// Samples used for the per-frame RMS
    pub time_buffer: usize,
    /// How often the onset detector is polled, in frames per second
    pub poll_hz: u32,
}

impl Default for AnalyserConfig {
    fn default() -> Self {
        Self {
            fft_size: 16384,
            time_buffer: 2048,
            poll_hz: 60,
        }
    }
}

impl AnalyserConfig {
    /// Number of input samples between two detector polls.
    pub fn poll_interval(&self, sample_rate: u32) -> usize {
        (sample_rate / self.poll_hz.max(1)).max(1) as usize
    }
}

impl TunerConfig {
    /// Loads configuration from a JSON file.
    ///
    /// A missing file yields the defaults. A file that exists but cannot be
    /// read or parsed is an error, so a typo never silently falls back.
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        match fs::read_to_string(&path) {
            Ok(contents) => {
                let config = serde_json::from_str(&contents)?;
                log::info!("[CONFIG] Loaded configuration from {:?}", path.as_ref());
                Ok(config)
            }
            Err(err) if err.kind() == ErrorKind::NotFound => {
                log::warn!(
                    "[CONFIG] No config file at {:?}. Using defaults.",
                    path.as_ref()
                );
                Ok(Self::default())
            }
            Err(err) => Err(err.into()),
        }
    }
}
