//! # Terminal Presenter
//!
//! Prints one line per capture: the reading, the selected target, the
//! verdict and the band meter.

use std::io::Write;

use drumtune_core::{Estimate, Presenter, TargetBand};

use super::meter;

/// Writes capture results to any `Write` sink, usually stdout.
pub struct TerminalPresenter<W: Write> {
    out: W,
}

impl<W: Write> TerminalPresenter<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    /// Prints the idle meter and the hint shown before the first strike.
    pub fn show_target(
        &mut self,
        style_label: &str,
        target_label: &str,
        skin_label: &str,
        band: TargetBand,
    ) {
        let _ = writeln!(
            self.out,
            "Style: {} • {} • Peau: {}  ({})",
            style_label,
            target_label,
            skin_label,
            band.range_text()
        );
        let _ = writeln!(self.out, "{}", meter::render(band, None, meter::METER_WIDTH));
        let _ = writeln!(
            self.out,
            "Frappe 1 coup (micro proche), attends l'analyse, puis refrappe."
        );
        let _ = self.out.flush();
    }

    #[cfg(test)]
    fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> Presenter for TerminalPresenter<W> {
    fn on_estimate(&mut self, estimate: &Estimate) {
        // Terminal write failures are not worth stopping the session for.
        let _ = writeln!(
            self.out,
            "{:>6.1} Hz  {} {}  {} • {} : {}",
            estimate.frequency_hz,
            meter::render(estimate.band, Some(estimate.frequency_hz), meter::METER_WIDTH),
            estimate.band.range_text(),
            estimate.style_label,
            estimate.target_label,
            estimate.status
        );
        let _ = self.out.flush();
    }

    fn on_no_estimate(&mut self) {
        let _ = writeln!(self.out, "   --- Hz  pas de pic net, refrappe.");
        let _ = self.out.flush();
    }
}
