//! # UI Module
//!
//! Terminal output for the drum tuner: the band meter and the presenter
//! that prints each capture.

pub mod meter;
pub mod presenter;
