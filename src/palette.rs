//! Resistor color-code palette
//!
//! The 12 standard band colors with their digit, multiplier and tolerance
//! meanings. Reference L*a*b* values are computed once and matching is a
//! nearest-neighbour search in declaration order.

use std::fmt;
use std::sync::LazyLock;

use serde::Serialize;
use utoipa::ToSchema;

use crate::color::{Lab, Rgb};

/// Multiplier decades from Silver (x0.01) to White (x1e9), indexed by exponent + 2
pub const DECADES: [f64; 12] = [
    0.01,
    0.1,
    1.0,
    10.0,
    100.0,
    1_000.0,
    10_000.0,
    100_000.0,
    1_000_000.0,
    10_000_000.0,
    100_000_000.0,
    1_000_000_000.0,
];

/// Tolerance carried by a band color
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
pub enum Tolerance {
    #[serde(rename = "±1%")]
    OnePercent,
    #[serde(rename = "±2%")]
    TwoPercent,
    #[serde(rename = "±5%")]
    FivePercent,
    #[serde(rename = "±10%")]
    TenPercent,
}

impl Tolerance {
    pub fn percent(self) -> u8 {
        match self {
            Tolerance::OnePercent => 1,
            Tolerance::TwoPercent => 2,
            Tolerance::FivePercent => 5,
            Tolerance::TenPercent => 10,
        }
    }

    pub fn from_percent(percent: u8) -> Option<Self> {
        match percent {
            1 => Some(Tolerance::OnePercent),
            2 => Some(Tolerance::TwoPercent),
            5 => Some(Tolerance::FivePercent),
            10 => Some(Tolerance::TenPercent),
            _ => None,
        }
    }

    pub fn label(self) -> String {
        self.to_string()
    }
}

impl fmt::Display for Tolerance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "±{}%", self.percent())
    }
}

/// A reference color with its color-code meanings
#[derive(Debug, Clone, PartialEq)]
pub struct PaletteEntry {
    pub name: &'static str,
    pub digit: Option<u8>,
    pub multiplier: Option<f64>,
    pub tolerance: Option<Tolerance>,
    pub rgb: Rgb,
    /// Cached L*a*b* of `rgb`
    pub lab: Lab,
}

impl PaletteEntry {
    pub fn new(name: &'static str, rgb: Rgb) -> Self {
        Self {
            name,
            digit: None,
            multiplier: None,
            tolerance: None,
            rgb,
            lab: rgb.to_lab(),
        }
    }

    pub fn with_digit(mut self, digit: u8) -> Self {
        self.digit = Some(digit);
        self
    }

    pub fn with_multiplier(mut self, multiplier: f64) -> Self {
        self.multiplier = Some(multiplier);
        self
    }

    pub fn with_tolerance(mut self, tolerance: Tolerance) -> Self {
        self.tolerance = Some(tolerance);
        self
    }
}

/// Standard resistor band colors in declaration order
fn resistor_entries() -> Vec<PaletteEntry> {
    use Tolerance::*;

    let coded = |name: &'static str, digit: u8, rgb: Rgb| {
        PaletteEntry::new(name, rgb)
            .with_digit(digit)
            .with_multiplier(DECADES[digit as usize + 2])
    };

    vec![
        coded("Black", 0, Rgb::new(0, 0, 0)),
        coded("Brown", 1, Rgb::new(150, 75, 0)).with_tolerance(OnePercent),
        coded("Red", 2, Rgb::new(255, 0, 0)).with_tolerance(TwoPercent),
        coded("Orange", 3, Rgb::new(255, 165, 0)),
        coded("Yellow", 4, Rgb::new(255, 255, 0)),
        coded("Green", 5, Rgb::new(0, 128, 0)),
        coded("Blue", 6, Rgb::new(0, 0, 255)),
        coded("Violet", 7, Rgb::new(143, 0, 255)),
        coded("Gray", 8, Rgb::new(128, 128, 128)),
        coded("White", 9, Rgb::new(255, 255, 255)),
        PaletteEntry::new("Gold", Rgb::new(218, 165, 32))
            .with_multiplier(DECADES[1])
            .with_tolerance(FivePercent),
        PaletteEntry::new("Silver", Rgb::new(192, 192, 192))
            .with_multiplier(DECADES[0])
            .with_tolerance(TenPercent),
    ]
}

/// Process-wide resistor palette, built on first use and read-only afterwards
pub static RESISTOR_PALETTE: LazyLock<PaletteClassifier> =
    LazyLock::new(|| PaletteClassifier::new(resistor_entries()));

/// Result of classifying one color against the palette
#[derive(Debug, Clone, Copy)]
pub struct ClassifiedSample<'p> {
    pub entry: &'p PaletteEntry,
    pub distance: f64,
}

/// Nearest-color matcher over an ordered palette
#[derive(Debug, Clone)]
pub struct PaletteClassifier {
    entries: Vec<PaletteEntry>,
}

impl PaletteClassifier {
    /// # Panics
    ///
    /// Panics if `entries` is empty.
    pub fn new(entries: Vec<PaletteEntry>) -> Self {
        assert!(!entries.is_empty(), "palette must have at least one entry");
        Self { entries }
    }

    /// The standard resistor palette
    pub fn resistor() -> &'static PaletteClassifier {
        &RESISTOR_PALETTE
    }

    pub fn entries(&self) -> &[PaletteEntry] {
        &self.entries
    }

    /// Find the nearest palette entry; ties go to the earliest declared entry
    pub fn classify(&self, rgb: Rgb) -> ClassifiedSample<'_> {
        let lab = rgb.to_lab();
        let mut best = &self.entries[0];
        let mut best_dist = f64::INFINITY;

        for entry in &self.entries {
            let dist = lab.distance(&entry.lab);
            if dist < best_dist {
                best_dist = dist;
                best = entry;
            }
        }

        ClassifiedSample {
            entry: best,
            distance: best_dist,
        }
    }

    /// Classify a sequence of colors, preserving order
    pub fn classify_all(&self, colors: &[Rgb]) -> Vec<ClassifiedSample<'_>> {
        colors.iter().map(|&c| self.classify(c)).collect()
    }

    /// Case-insensitive lookup by color name
    pub fn by_name(&self, name: &str) -> Option<&PaletteEntry> {
        let name = name.trim();
        self.entries
            .iter()
            .find(|e| e.name.eq_ignore_ascii_case(name))
    }

    pub fn by_digit(&self, digit: u8) -> Option<&PaletteEntry> {
        self.entries.iter().find(|e| e.digit == Some(digit))
    }

    /// Lookup by exact multiplier value
    pub fn by_multiplier(&self, multiplier: f64) -> Option<&PaletteEntry> {
        self.entries
            .iter()
            .find(|e| e.multiplier == Some(multiplier))
    }

    /// First entry carrying this tolerance
    pub fn by_tolerance(&self, tolerance: Tolerance) -> Option<&PaletteEntry> {
        self.entries
            .iter()
            .find(|e| e.tolerance == Some(tolerance))
    }
}
