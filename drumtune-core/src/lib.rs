// drumtune-core/src/lib.rs

//! The core logic for the drum tuner.
//! This crate detects drum strikes in a microphone signal, estimates the
//! fundamental of each strike from an averaged spectrum, and compares it
//! with the target band of the selected drum. It is completely headless
//! and contains no terminal or GUI code.

pub mod analyser;
pub mod audio;
pub mod capture;
pub mod catalog;
pub mod config;
pub mod error;
pub mod onset;
pub mod peak;
pub mod session;
pub mod timer;

pub use analyser::{SpectrumAnalyser, SpectrumSource};
pub use capture::{Estimate, Presenter};
pub use catalog::{DrumId, Selection, SkinSide, Style, TargetBand, TuningStatus};
pub use config::TunerConfig;
pub use error::{Result, TunerError};
pub use session::{Session, TickOutcome};
