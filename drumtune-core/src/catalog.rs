//! # Target Catalog Module
//!
//! Preset tuning bands for a four-piece kit (14" snare, 10"/12"/14" toms)
//! in two styles. Each drum carries one band for the batter head and one for
//! the resonant head.
//!
//! ## Features
//! - Static style profiles built once on first access
//! - Identifier parsing for styles, drums and head sides
//! - Band classification (too low / in range / too high)
//! - Meter positioning over the 40-300 Hz display range

use once_cell::sync::Lazy;
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use crate::config::CaptureConfig;
use crate::error::TunerError;

/// Lower edge of the tuning meter in Hz.
pub const METER_MIN_HZ: f32 = 40.0;
/// Upper edge of the tuning meter in Hz.
pub const METER_MAX_HZ: f32 = 300.0;

/// A closed frequency interval a head should ring in.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TargetBand {
    pub min_hz: f32,
    pub max_hz: f32,
}

/// Where a measured frequency sits relative to a band.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TuningStatus {
    TooLow,
    InRange,
    TooHigh,
}

impl TargetBand {
    pub const fn new(min_hz: f32, max_hz: f32) -> Self {
        Self { min_hz, max_hz }
    }

    pub fn contains(&self, hz: f32) -> bool {
        hz >= self.min_hz && hz <= self.max_hz
    }

    /// Classifies a frequency against this band. Both edges count as in range.
    pub fn classify(&self, hz: f32) -> TuningStatus {
        if hz < self.min_hz {
            TuningStatus::TooLow
        } else if hz > self.max_hz {
            TuningStatus::TooHigh
        } else {
            TuningStatus::InRange
        }
    }

    /// Frequency window searched for the peak.
    ///
    /// Wider than the band itself so a head that is badly out of tune is
    /// still found, but never below the absolute floor.
    pub fn search_window(&self, capture: &CaptureConfig) -> (f32, f32) {
        let search_min = capture
            .absolute_floor_hz
            .max(self.min_hz - capture.guard_low_hz);
        let search_max = self.max_hz + capture.guard_high_hz;
        (search_min, search_max)
    }

    /// Human readable range, e.g. "plage: 205–245 Hz".
    pub fn range_text(&self) -> String {
        format!("plage: {}–{} Hz", self.min_hz, self.max_hz)
    }
}

impl fmt::Display for TuningStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            TuningStatus::TooLow => "⬇ trop bas",
            TuningStatus::InRange => "✅ OK",
            TuningStatus::TooHigh => "⬆ trop haut",
        };
        f.write_str(text)
    }
}

/// Maps a frequency onto the meter as a fraction in [0, 1].
pub fn meter_position(hz: f32) -> f32 {
    ((hz - METER_MIN_HZ) / (METER_MAX_HZ - METER_MIN_HZ)).clamp(0.0, 1.0)
}

/// Drumhead side being tuned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum SkinSide {
    /// The struck (top) head
    Batter,
    /// The resonant (bottom) head
    Reso,
}

/// Drum in the kit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum DrumId {
    Snare,
    TomHigh,
    TomMid,
    TomLow,
}

/// Tuning style.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Style {
    /// Higher pitch with a sharp attack
    Tight,
    /// Lower pitch with more body
    Rock,
}

impl DrumId {
    pub const ALL: [DrumId; 4] = [DrumId::Snare, DrumId::TomHigh, DrumId::TomMid, DrumId::TomLow];

    /// Identifier accepted by `from_str`.
    pub fn id(&self) -> &'static str {
        match self {
            DrumId::Snare => "snare",
            DrumId::TomHigh => "tomHigh",
            DrumId::TomMid => "tomMid",
            DrumId::TomLow => "tomLow",
        }
    }
}

impl Style {
    pub const ALL: [Style; 2] = [Style::Tight, Style::Rock];

    /// Identifier accepted by `from_str`.
    pub fn id(&self) -> &'static str {
        match self {
            Style::Tight => "tight",
            Style::Rock => "rock",
        }
    }
}

impl SkinSide {
    pub fn label(&self) -> &'static str {
        match self {
            SkinSide::Batter => "frappe",
            SkinSide::Reso => "résonance",
        }
    }
}

impl FromStr for Style {
    type Err = TunerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "tight" | "tendu" => Ok(Style::Tight),
            "rock" => Ok(Style::Rock),
            _ => Err(TunerError::UnknownStyle(s.to_string())),
        }
    }
}

impl FromStr for DrumId {
    type Err = TunerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized: String = s
            .chars()
            .filter(|c| *c != '-' && *c != '_')
            .collect::<String>()
            .to_ascii_lowercase();
        match normalized.as_str() {
            "snare" => Ok(DrumId::Snare),
            "tomhigh" => Ok(DrumId::TomHigh),
            "tommid" => Ok(DrumId::TomMid),
            "tomlow" => Ok(DrumId::TomLow),
            _ => Err(TunerError::UnknownDrum(s.to_string())),
        }
    }
}

impl FromStr for SkinSide {
    type Err = TunerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "batter" => Ok(SkinSide::Batter),
            "reso" | "resonant" => Ok(SkinSide::Reso),
            _ => Err(TunerError::UnknownSkin(s.to_string())),
        }
    }
}

/// Target bands for one drum.
#[derive(Debug, Clone, PartialEq)]
pub struct TuningTarget {
    pub label: &'static str,
    pub batter: TargetBand,
    pub reso: TargetBand,
}

impl TuningTarget {
    pub fn band(&self, skin: SkinSide) -> TargetBand {
        match skin {
            SkinSide::Batter => self.batter,
            SkinSide::Reso => self.reso,
        }
    }
}

/// A named set of targets, one per drum.
#[derive(Debug, Clone, PartialEq)]
pub struct StyleProfile {
    pub label: &'static str,
    pub targets: BTreeMap<DrumId, TuningTarget>,
}

/// What the user is currently tuning. Read at capture time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Selection {
    pub style: Style,
    pub drum: DrumId,
    pub skin: SkinSide,
}

impl Default for Selection {
    fn default() -> Self {
        Self {
            style: Style::Tight,
            drum: DrumId::Snare,
            skin: SkinSide::Batter,
        }
    }
}

fn target(label: &'static str, batter: (f32, f32), reso: (f32, f32)) -> TuningTarget {
    TuningTarget {
        label,
        batter: TargetBand::new(batter.0, batter.1),
        reso: TargetBand::new(reso.0, reso.1),
    }
}

static TIGHT: Lazy<StyleProfile> = Lazy::new(|| StyleProfile {
    label: "Tendu",
    targets: BTreeMap::from([
        (DrumId::Snare, target("Caisse claire (14\")", (205.0, 245.0), (220.0, 265.0))),
        (DrumId::TomHigh, target("Tom aigu (10\")", (175.0, 215.0), (190.0, 235.0))),
        (DrumId::TomMid, target("Tom medium (12\")", (135.0, 175.0), (150.0, 195.0))),
        (DrumId::TomLow, target("Tom basse (14\")", (95.0, 130.0), (110.0, 145.0))),
    ]),
});

static ROCK: Lazy<StyleProfile> = Lazy::new(|| StyleProfile {
    label: "Rock",
    targets: BTreeMap::from([
        (DrumId::Snare, target("Caisse claire (14\")", (190.0, 220.0), (205.0, 240.0))),
        (DrumId::TomHigh, target("Tom aigu (10\")", (160.0, 180.0), (175.0, 195.0))),
        (DrumId::TomMid, target("Tom medium (12\")", (120.0, 140.0), (135.0, 155.0))),
        (DrumId::TomLow, target("Tom basse (14\")", (85.0, 105.0), (100.0, 120.0))),
    ]),
});

/// Returns the profile for a style.
pub fn profile(style: Style) -> &'static StyleProfile {
    match style {
        Style::Tight => &*TIGHT,
        Style::Rock => &*ROCK,
    }
}

/// Returns the target for a drum within a style.
///
/// Every built-in profile covers every `DrumId`, so this cannot miss.
pub fn target_for(style: Style, drum: DrumId) -> &'static TuningTarget {
    &profile(style).targets[&drum]
}

/// Resolves a selection to its profile, target and band in one lookup.
pub fn resolve(selection: Selection) -> (&'static StyleProfile, &'static TuningTarget, TargetBand) {
    let profile = profile(selection.style);
    let target = &profile.targets[&selection.drum];
    (profile, target, target.band(selection.skin))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_band_is_ordered() {
        for style in Style::ALL {
            for drum in DrumId::ALL {
                let target = target_for(style, drum);
                assert!(target.batter.min_hz < target.batter.max_hz);
                assert!(target.reso.min_hz < target.reso.max_hz);
            }
        }
    }

    #[test]
    fn test_resolve_selection() {
        let selection = Selection {
            style: Style::Rock,
            drum: DrumId::TomLow,
            skin: SkinSide::Reso,
        };
        let (profile, target, band) = resolve(selection);
        assert_eq!(profile.label, "Rock");
        assert_eq!(target.label, "Tom basse (14\")");
        assert_eq!(band, TargetBand::new(100.0, 120.0));
    }

    #[test]
    fn test_classify_edges_are_in_range() {
        let band = TargetBand::new(205.0, 245.0);
        assert_eq!(band.classify(180.0), TuningStatus::TooLow);
        assert_eq!(band.classify(205.0), TuningStatus::InRange);
        assert_eq!(band.classify(245.0), TuningStatus::InRange);
        assert_eq!(band.classify(245.1), TuningStatus::TooHigh);
        assert!(band.contains(225.0));
    }

    #[test]
    fn test_search_window_respects_floor() {
        let capture = CaptureConfig::default();
        assert_eq!(TargetBand::new(205.0, 245.0).search_window(&capture), (165.0, 345.0));
        assert_eq!(TargetBand::new(60.0, 90.0).search_window(&capture), (40.0, 190.0));
    }

    #[test]
    fn test_parse_identifiers() {
        assert_eq!("tight".parse::<Style>().unwrap(), Style::Tight);
        assert_eq!("Rock".parse::<Style>().unwrap(), Style::Rock);
        assert_eq!("tomHigh".parse::<DrumId>().unwrap(), DrumId::TomHigh);
        assert_eq!("tom-low".parse::<DrumId>().unwrap(), DrumId::TomLow);
        assert_eq!("reso".parse::<SkinSide>().unwrap(), SkinSide::Reso);
        assert!(matches!("jazz".parse::<Style>(), Err(TunerError::UnknownStyle(_))));
        assert!(matches!("cowbell".parse::<DrumId>(), Err(TunerError::UnknownDrum(_))));
        assert!(matches!("side".parse::<SkinSide>(), Err(TunerError::UnknownSkin(_))));
    }

    #[test]
    fn test_ids_parse_back() {
        for style in Style::ALL {
            assert_eq!(style.id().parse::<Style>().unwrap(), style);
        }
        for drum in DrumId::ALL {
            assert_eq!(drum.id().parse::<DrumId>().unwrap(), drum);
        }
    }

    #[test]
    fn test_meter_position_clamps() {
        assert_eq!(meter_position(20.0), 0.0);
        assert_eq!(meter_position(170.0), 0.5);
        assert_eq!(meter_position(400.0), 1.0);
    }
}
