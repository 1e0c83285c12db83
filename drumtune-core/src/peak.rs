//! # Spectral Peak Module
//!
//! Locates the strongest component of a dB magnitude spectrum inside a
//! frequency window and refines it below bin resolution.
//!
//! At 44.1 kHz with a 16384-point transform one bin is about 2.7 Hz wide,
//! which is too coarse to tell a head that is a few Hz out of its band. The
//! coarse bin search is therefore followed by a 3-point centroid over the
//! linear amplitudes of the peak and its two neighbours.

/// Converts a dB value to linear amplitude.
fn db_to_amplitude(db: f32) -> f32 {
    10.0_f32.powf(db / 20.0)
}

/// Estimates the peak frequency of a dB spectrum within `[min_hz, max_hz]`.
///
/// # Arguments
/// * `spectrum_db` - Magnitudes in dB, indexed by bin
/// * `bin_width_hz` - Width of one bin (sample rate / transform size)
/// * `min_hz` - Lower edge of the search window
/// * `max_hz` - Upper edge of the search window
///
/// # Returns
/// * `Some(frequency)` - Interpolated peak frequency in Hz
/// * `None` - The window is empty once clamped to bins that have both
///   neighbours, or the inputs are not usable
pub fn estimate(spectrum_db: &[f32], bin_width_hz: f32, min_hz: f32, max_hz: f32) -> Option<f32> {
    if spectrum_db.len() < 3 || !(bin_width_hz.is_finite() && bin_width_hz > 0.0) {
        return None;
    }
    if !(min_hz.is_finite() && max_hz.is_finite()) || max_hz < 0.0 {
        return None;
    }

    // Clamp so the peak always has a bin on each side.
    let start = ((min_hz / bin_width_hz).floor().max(0.0) as usize).max(1);
    let end = ((max_hz / bin_width_hz).floor() as usize).min(spectrum_db.len() - 2);
    if start >= end {
        return None;
    }

    let peak_bin = find_peak_bin(spectrum_db, start, end)?;
    if peak_bin < 1 {
        return None;
    }

    Some(centroid(spectrum_db, peak_bin) * bin_width_hz)
}

/// Linear scan for the largest value in `[start, end]`.
///
/// Ties keep the lowest index. NaN never compares greater, so it never wins,
/// and a window of `-inf` bins has no peak at all.
fn find_peak_bin(spectrum_db: &[f32], start: usize, end: usize) -> Option<usize> {
    let mut best_bin = None;
    let mut best_db = f32::NEG_INFINITY;
    for (i, &value) in spectrum_db.iter().enumerate().take(end + 1).skip(start) {
        if value > best_db {
            best_db = value;
            best_bin = Some(i);
        }
    }
    best_bin
}

/// Amplitude-weighted centre of bins `i-1`, `i`, `i+1`, in bins.
///
/// Falls back to `i` when the three amplitudes carry no energy.
fn centroid(spectrum_db: &[f32], i: usize) -> f32 {
    let a0 = db_to_amplitude(spectrum_db[i - 1]);
    let a1 = db_to_amplitude(spectrum_db[i]);
    let a2 = db_to_amplitude(spectrum_db[i + 1]);
    let denom = a0 + a1 + a2;

    if denom > 0.0 && denom.is_finite() {
        let frac = (a0 * (i - 1) as f32 + a1 * i as f32 + a2 * (i + 1) as f32) / denom;
        if frac.is_finite() {
            return frac;
        }
    }
    i as f32
}
