//! Band sequence to resistance value, and back

use std::fmt;

use serde::Serialize;
use utoipa::ToSchema;

use crate::error::ScanError;
use crate::palette::{PaletteClassifier, PaletteEntry, Tolerance, DECADES};
use crate::segment::Band;

/// What a band position encodes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum BandRole {
    FirstDigit,
    SecondDigit,
    Multiplier,
    Tolerance,
    /// Anything past the fourth band
    Extra,
}

impl BandRole {
    pub fn for_position(index: usize) -> Self {
        match index {
            0 => BandRole::FirstDigit,
            1 => BandRole::SecondDigit,
            2 => BandRole::Multiplier,
            3 => BandRole::Tolerance,
            _ => BandRole::Extra,
        }
    }
}

impl fmt::Display for BandRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            BandRole::FirstDigit => "first digit",
            BandRole::SecondDigit => "second digit",
            BandRole::Multiplier => "multiplier",
            BandRole::Tolerance => "tolerance",
            BandRole::Extra => "extra",
        };
        f.write_str(s)
    }
}

/// A decoded 4-band (or 3-band) resistor
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedResistance {
    pub digits: (u8, u8),
    pub multiplier: f64,
    /// `None` means unspecified tolerance
    pub tolerance: Option<Tolerance>,
    pub ohms: f64,
}

impl DecodedResistance {
    pub fn tolerance_label(&self) -> Option<String> {
        self.tolerance.map(Tolerance::label)
    }

    pub fn formatted(&self) -> String {
        format_resistance(self.ohms)
    }
}

fn require<T>(
    entry: &PaletteEntry,
    index: usize,
    value: Option<T>,
) -> Result<T, ScanError> {
    value.ok_or_else(|| ScanError::AmbiguousBand {
        position: index + 1,
        role: BandRole::for_position(index),
        color: entry.name.to_string(),
    })
}

/// Decode palette entries in band order
///
/// Digits and multiplier are required. A fourth entry without a tolerance
/// value is read as unspecified tolerance. Entries past the fourth are ignored.
pub fn decode_entries(entries: &[&PaletteEntry]) -> Result<DecodedResistance, ScanError> {
    if entries.len() < 3 {
        return Err(ScanError::InsufficientBands {
            found: entries.len(),
        });
    }

    let d1 = require(entries[0], 0, entries[0].digit)?;
    let d2 = require(entries[1], 1, entries[1].digit)?;
    let multiplier = require(entries[2], 2, entries[2].multiplier)?;
    let tolerance = entries.get(3).and_then(|e| e.tolerance);

    Ok(DecodedResistance {
        digits: (d1, d2),
        multiplier,
        tolerance,
        ohms: (d1 as f64 * 10.0 + d2 as f64) * multiplier,
    })
}

/// Decode segmented bands
pub fn decode(bands: &[Band<'_>]) -> Result<DecodedResistance, ScanError> {
    let entries: Vec<&PaletteEntry> = bands.iter().map(|b| b.entry).collect();
    decode_entries(&entries)
}

/// Resolve color names through the palette, then decode
pub fn decode_names<S: AsRef<str>>(
    palette: &PaletteClassifier,
    names: &[S],
) -> Result<DecodedResistance, ScanError> {
    let entries = names
        .iter()
        .map(|n| {
            palette
                .by_name(n.as_ref())
                .ok_or_else(|| ScanError::UnknownColor(n.as_ref().to_string()))
        })
        .collect::<Result<Vec<_>, _>>()?;

    decode_entries(&entries)
}

/// Band colors for a resistance: first digit, second digit, multiplier
///
/// Only the two leading significant digits are kept; the rest are truncated.
pub fn encode(palette: &PaletteClassifier, ohms: f64) -> Result<[&PaletteEntry; 3], ScanError> {
    // 0.10 ohm (Brown Black Silver) to 99 Gohm (White White White)
    if !ohms.is_finite() || ohms < 0.1 || ohms >= 1e11 {
        return Err(ScanError::ValueOutOfRange(ohms));
    }

    // Hundredths of an ohm so the multiplier table starts at exponent 0; the
    // epsilon keeps products like 0.29 * 100 = 28.99.. from losing a digit
    let hundredths = (ohms * 100.0 + 1e-6).floor() as u64;
    let digits = hundredths.to_string();
    let bytes = digits.as_bytes();
    let d1 = bytes[0] - b'0';
    let d2 = bytes[1] - b'0';
    let decade = digits.len() - 2;

    let missing = || ScanError::ValueOutOfRange(ohms);
    let first = palette.by_digit(d1).ok_or_else(missing)?;
    let second = palette.by_digit(d2).ok_or_else(missing)?;
    let multiplier = DECADES
        .get(decade)
        .and_then(|&m| palette.by_multiplier(m))
        .ok_or_else(missing)?;

    Ok([first, second, multiplier])
}

/// Human-readable resistance, e.g. `4.7 kΩ`
///
/// Scaled units show one decimal only when the value is not a whole number
/// of the unit. Plain ohms show up to two decimals, trailing zeros dropped,
/// so Silver-multiplier values such as `0.47 Ω` keep both significant digits
/// instead of rounding to `0.5 Ω`.
pub fn format_resistance(ohms: f64) -> String {
    const UNITS: [(f64, &str); 3] = [(1e9, "GΩ"), (1e6, "MΩ"), (1e3, "kΩ")];

    for (scale, unit) in UNITS {
        if ohms >= scale {
            let scaled = ohms / scale;
            return if ohms % scale == 0.0 {
                format!("{:.0} {}", scaled, unit)
            } else {
                format!("{:.1} {}", scaled, unit)
            };
        }
    }

    let fixed = format!("{:.2}", ohms);
    let trimmed = fixed.trim_end_matches('0').trim_end_matches('.');
    format!("{} Ω", trimmed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::segment::Band;

    fn palette() -> &'static PaletteClassifier {
        PaletteClassifier::resistor()
    }

    fn bands(names: &[&str]) -> Vec<Band<'static>> {
        names
            .iter()
            .enumerate()
            .map(|(i, n)| Band {
                entry: palette().by_name(n).unwrap(),
                start: i * 10,
                len: 5,
            })
            .collect()
    }

    #[test]
    fn test_brown_black_red_is_one_kilohm() {
        let decoded = decode(&bands(&["Brown", "Black", "Red"])).unwrap();
        assert_eq!(decoded.digits, (1, 0));
        assert_eq!(decoded.multiplier, 100.0);
        assert_eq!(decoded.ohms, 1000.0);
        assert_eq!(decoded.tolerance, None);
        assert_eq!(decoded.formatted(), "1 kΩ");
    }

    #[test]
    fn test_tolerance_band() {
        let decoded = decode(&bands(&["Yellow", "Violet", "Orange", "Gold"])).unwrap();
        assert_eq!(decoded.ohms, 47_000.0);
        assert_eq!(decoded.tolerance_label().as_deref(), Some("±5%"));
    }

    #[test]
    fn test_fourth_band_without_tolerance_is_unspecified() {
        let decoded = decode(&bands(&["Yellow", "Violet", "Orange", "Blue"])).unwrap();
        assert_eq!(decoded.ohms, 47_000.0);
        assert_eq!(decoded.tolerance, None);
    }

    #[test]
    fn test_extra_bands_are_ignored() {
        let decoded = decode(&bands(&["Red", "Red", "Black", "Silver", "Blue"])).unwrap();
        assert_eq!(decoded.ohms, 22.0);
        assert_eq!(decoded.tolerance, Some(Tolerance::TenPercent));
    }

    #[test]
    fn test_fractional_multipliers() {
        let decoded = decode(&bands(&["Yellow", "Violet", "Gold"])).unwrap();
        assert!((decoded.ohms - 4.7).abs() < 1e-9);
        assert_eq!(decoded.formatted(), "4.7 Ω");

        let decoded = decode(&bands(&["Yellow", "Violet", "Silver"])).unwrap();
        assert_eq!(decoded.formatted(), "0.47 Ω");
    }

    #[test]
    fn test_too_few_bands() {
        assert_eq!(
            decode(&bands(&["Brown", "Black"])),
            Err(ScanError::InsufficientBands { found: 2 })
        );
        assert_eq!(decode(&[]), Err(ScanError::InsufficientBands { found: 0 }));
    }

    #[test]
    fn test_gold_digit_is_ambiguous() {
        let err = decode(&bands(&["Gold", "Black", "Red"])).unwrap_err();
        assert_eq!(
            err,
            ScanError::AmbiguousBand {
                position: 1,
                role: BandRole::FirstDigit,
                color: "Gold".to_string(),
            }
        );

        let err = decode(&bands(&["Brown", "Silver", "Red"])).unwrap_err();
        assert!(matches!(
            err,
            ScanError::AmbiguousBand {
                position: 2,
                role: BandRole::SecondDigit,
                ..
            }
        ));
    }

    #[test]
    fn test_decode_names() {
        let decoded = decode_names(palette(), &["brown", "BLACK", "red", "gold"]).unwrap();
        assert_eq!(decoded.ohms, 1000.0);

        assert_eq!(
            decode_names(palette(), &["brown", "beige", "red"]),
            Err(ScanError::UnknownColor("beige".to_string()))
        );
    }

    #[test]
    fn test_encode() {
        let names = |ohms| encode(palette(), ohms).unwrap().map(|e| e.name);
        assert_eq!(names(1000.0), ["Brown", "Black", "Red"]);
        assert_eq!(names(47_000.0), ["Yellow", "Violet", "Orange"]);
        assert_eq!(names(220.0), ["Red", "Red", "Brown"]);
        assert_eq!(names(10.0), ["Brown", "Black", "Black"]);
        assert_eq!(names(4.7), ["Yellow", "Violet", "Gold"]);
        assert_eq!(names(0.1), ["Brown", "Black", "Silver"]);
        assert_eq!(names(4567.0), ["Yellow", "Green", "Red"]);
        assert_eq!(names(99e9), ["White", "White", "White"]);
    }

    #[test]
    fn test_encode_truncates_past_two_digits() {
        let names = |ohms| encode(palette(), ohms).unwrap().map(|e| e.name);
        assert_eq!(names(0.999), ["White", "White", "Silver"]);
        assert_eq!(names(0.125), ["Brown", "Red", "Silver"]);
        assert_eq!(names(0.109), ["Brown", "Black", "Silver"]);
        assert_eq!(names(9.999), ["White", "White", "Gold"]);
        assert_eq!(names(1299.0), ["Brown", "Red", "Red"]);
        assert_eq!(names(0.29), ["Red", "White", "Silver"]);

        let decoded = decode_entries(&encode(palette(), 0.999).unwrap()).unwrap();
        assert!((decoded.ohms - 0.99).abs() < 1e-9);
    }

    #[test]
    fn test_encode_out_of_range() {
        for ohms in [0.0, 0.05, -10.0, 1e11, f64::NAN, f64::INFINITY] {
            assert!(matches!(encode(palette(), ohms), Err(ScanError::ValueOutOfRange(_))));
        }
    }

    #[test]
    fn test_encode_then_decode() {
        let entries = encode(palette(), 330_000.0).unwrap();
        let decoded = decode_entries(&entries).unwrap();
        assert_eq!(decoded.ohms, 330_000.0);
    }

    #[test]
    fn test_format_resistance() {
        assert_eq!(format_resistance(1000.0), "1 kΩ");
        assert_eq!(format_resistance(1500.0), "1.5 kΩ");
        assert_eq!(format_resistance(999.0), "999 Ω");
        assert_eq!(format_resistance(1_000_000.0), "1 MΩ");
        assert_eq!(format_resistance(4_700_000.0), "4.7 MΩ");
        assert_eq!(format_resistance(2e9), "2 GΩ");
        assert_eq!(format_resistance(470_000.0), "470 kΩ");
        assert_eq!(format_resistance(0.1), "0.1 Ω");
    }

    #[test]
    fn test_roles() {
        assert_eq!(BandRole::for_position(0), BandRole::FirstDigit);
        assert_eq!(BandRole::for_position(3), BandRole::Tolerance);
        assert_eq!(BandRole::for_position(7), BandRole::Extra);
    }
}
