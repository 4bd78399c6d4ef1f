//! Request and response types for the HTTP API

use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::color::Rgb;
use crate::decode::{BandRole, DecodedResistance};
use crate::error::ScanError;
use crate::image_processing::ScanReport;
use crate::palette::{PaletteEntry, Tolerance};
use crate::segment::{Band, Run};

/// Query parameters for scanning an uploaded frame
#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ScanQuery {
    /// Strip height as a fraction of frame height, in (0, 1]
    pub band_fraction: Option<f64>,
}

/// Query parameters for encoding a resistance
#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct EncodeQuery {
    /// Tolerance percentage to append as a fourth band: 1, 2, 5 or 10
    pub tolerance: Option<u8>,
}

/// Scan a frame fetched from a URL
#[derive(Debug, Deserialize, ToSchema)]
pub struct ScanUrlRequest {
    pub url: String,
    pub band_fraction: Option<f64>,
}

/// A detected band
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct BandView {
    pub name: String,
    pub hex: String,
    pub role: BandRole,
    pub start: usize,
    pub len: usize,
}

impl BandView {
    fn new(index: usize, band: &Band<'_>) -> Self {
        Self {
            name: band.name().to_string(),
            hex: band.entry.rgb.hex(),
            role: BandRole::for_position(index),
            start: band.start,
            len: band.len,
        }
    }
}

/// A run that passed the noise filter
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct RunView {
    pub name: String,
    pub start: usize,
    pub len: usize,
}

impl From<&Run<'_>> for RunView {
    fn from(run: &Run<'_>) -> Self {
        Self {
            name: run.name().to_string(),
            start: run.start,
            len: run.len,
        }
    }
}

/// A decoded resistance value
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct DecodedView {
    pub digits: Vec<u8>,
    pub multiplier: f64,
    pub tolerance: Option<String>,
    pub ohms: f64,
    /// e.g. "4.7 kΩ"
    pub formatted: String,
}

impl From<&DecodedResistance> for DecodedView {
    fn from(d: &DecodedResistance) -> Self {
        Self {
            digits: vec![d.digits.0, d.digits.1],
            multiplier: d.multiplier,
            tolerance: d.tolerance_label(),
            ohms: d.ohms,
            formatted: d.formatted(),
        }
    }
}

/// Why a scan did not produce a value
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ScanFailure {
    pub kind: String,
    pub message: String,
}

impl From<&ScanError> for ScanFailure {
    fn from(e: &ScanError) -> Self {
        Self {
            kind: e.kind().to_string(),
            message: e.to_string(),
        }
    }
}

/// Result of scanning one frame
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ScanResponse {
    pub width: u32,
    pub height: u32,
    pub body: Option<String>,
    pub bands: Vec<BandView>,
    pub significant_runs: Vec<RunView>,
    pub mean_distance: f64,
    pub decoded: Option<DecodedView>,
    pub failure: Option<ScanFailure>,
}

impl From<&ScanReport> for ScanResponse {
    fn from(report: &ScanReport) -> Self {
        let result = &report.result;
        let (decoded, failure) = match &report.decoded {
            Ok(d) => (Some(d.into()), None),
            Err(e) => (None, Some(e.into())),
        };

        Self {
            width: report.width,
            height: report.height,
            body: result.body_name().map(str::to_string),
            bands: result
                .bands
                .iter()
                .enumerate()
                .map(|(i, b)| BandView::new(i, b))
                .collect(),
            significant_runs: result.significant_runs.iter().map(RunView::from).collect(),
            mean_distance: report.mean_distance,
            decoded,
            failure,
        }
    }
}

/// Band colors for a resistance value
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct EncodeResponse {
    pub bands: Vec<String>,
    /// Value the bands actually encode, after truncation to two digits
    pub ohms: f64,
    pub tolerance: Option<String>,
    pub formatted: String,
}

/// One palette color and its meanings
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct PaletteEntryView {
    pub name: String,
    pub rgb: Rgb,
    pub hex: String,
    pub digit: Option<u8>,
    pub multiplier: Option<f64>,
    pub tolerance: Option<Tolerance>,
}

impl From<&PaletteEntry> for PaletteEntryView {
    fn from(e: &PaletteEntry) -> Self {
        Self {
            name: e.name.to_string(),
            rgb: e.rgb,
            hex: e.rgb.hex(),
            digit: e.digit,
            multiplier: e.multiplier,
            tolerance: e.tolerance,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::palette::PaletteClassifier;
    use crate::segment::ScanResult;

    #[test]
    fn test_scan_response_json() {
        let palette = PaletteClassifier::resistor();
        let entry = |n: &str| palette.by_name(n).unwrap();
        let bands = vec![
            Band { entry: entry("Brown"), start: 10, len: 4 },
            Band { entry: entry("Black"), start: 20, len: 4 },
            Band { entry: entry("Red"), start: 30, len: 4 },
            Band { entry: entry("Gold"), start: 40, len: 4 },
        ];
        let report = ScanReport {
            width: 100,
            height: 50,
            result: ScanResult {
                bands: bands.clone(),
                body: Some(entry("Silver")),
                significant_runs: Vec::new(),
            },
            mean_distance: 3.5,
            decoded: crate::decode::decode(&bands),
        };

        let json = serde_json::to_value(ScanResponse::from(&report)).unwrap();
        assert_eq!(json["body"], "Silver");
        assert_eq!(json["bands"][0]["role"], "first_digit");
        assert_eq!(json["bands"][3]["role"], "tolerance");
        assert_eq!(json["bands"][2]["hex"], "#FF0000");
        assert_eq!(json["decoded"]["formatted"], "1 kΩ");
        assert_eq!(json["decoded"]["tolerance"], "±5%");
        assert!(json["failure"].is_null());
    }

    #[test]
    fn test_failure_is_reported() {
        let report = ScanReport {
            width: 10,
            height: 10,
            result: ScanResult {
                bands: Vec::new(),
                body: None,
                significant_runs: Vec::new(),
            },
            mean_distance: 0.0,
            decoded: Err(ScanError::InsufficientBands { found: 0 }),
        };

        let response = ScanResponse::from(&report);
        assert!(response.decoded.is_none());
        assert_eq!(response.failure.unwrap().kind, "insufficient_bands");
    }

    #[test]
    fn test_palette_entry_view() {
        let gold = PaletteClassifier::resistor().by_name("gold").unwrap();
        let json = serde_json::to_value(PaletteEntryView::from(gold)).unwrap();
        assert_eq!(json["tolerance"], "±5%");
        assert_eq!(json["multiplier"], 0.1);
        assert!(json["digit"].is_null());
        assert_eq!(json["rgb"]["r"], 218);
    }
}
