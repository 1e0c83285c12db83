//! # Band Meter
//!
//! Text rendition of the tuning meter: a fixed-width bar covering the
//! 40-300 Hz view, the target band drawn with `=` and the reading with `|`.

use drumtune_core::catalog::meter_position;
use drumtune_core::TargetBand;

/// Default number of cells in the meter.
pub const METER_WIDTH: usize = 52;

/// Converts a meter fraction to a cell index.
fn cell(fraction: f32, width: usize) -> usize {
    ((fraction * (width - 1) as f32).round() as usize).min(width - 1)
}

/// Renders the meter for `band`, with the needle at `frequency_hz` if given.
pub fn render(band: TargetBand, frequency_hz: Option<f32>, width: usize) -> String {
    let width = width.max(2);
    let left = cell(meter_position(band.min_hz), width);
    let right = cell(meter_position(band.max_hz), width);

    let mut cells = vec!['-'; width];
    for c in cells.iter_mut().take(right + 1).skip(left) {
        *c = '=';
    }
    if let Some(hz) = frequency_hz {
        cells[cell(meter_position(hz), width)] = '|';
    }

    let bar: String = cells.into_iter().collect();
    format!("[{}]", bar)
}
