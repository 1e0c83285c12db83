//! Error types for session setup and configuration.
//!
//! Only failures that end a session live here. A capture that finds no peak
//! is reported as `None` by the estimator, not as an error.

use thiserror::Error;

/// Errors raised while opening the microphone or loading settings.
#[derive(Error, Debug)]
pub enum TunerError {
    /// No input device, or the host refused access to it
    #[error("Audio input unavailable: {0}")]
    DeviceUnavailable(String),

    /// The device offers no usable input configuration
    #[error("Unsupported input configuration: {0}")]
    StreamConfig(String),

    /// The input stream could not be built
    #[error("Failed to open input stream: {0}")]
    StreamBuild(#[from] cpal::BuildStreamError),

    /// The input stream could not be started
    #[error("Failed to start input stream: {0}")]
    StreamPlay(#[from] cpal::PlayStreamError),

    /// Style identifier not present in the catalog
    #[error("Unknown style: {0}")]
    UnknownStyle(String),

    /// Drum identifier not present in the catalog
    #[error("Unknown drum: {0}")]
    UnknownDrum(String),

    /// Head side other than batter or reso
    #[error("Unknown skin side: {0}")]
    UnknownSkin(String),

    /// Malformed configuration file
    #[error("Invalid configuration: {0}")]
    Config(#[from] serde_json::Error),

    /// I/O error while reading configuration
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for core operations
pub type Result<T> = std::result::Result<T, TunerError>;
