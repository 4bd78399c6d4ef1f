//! Band segmentation along the scan line
//!
//! The body color is not known up front, so it is inferred as the color
//! covering the most columns. Everything else that survives the noise
//! filter is a band.

use crate::palette::{ClassifiedSample, PaletteEntry};

/// Runs narrower than this fraction of the scan width are noise
pub const MIN_BAND_WIDTH_FRACTION: f64 = 0.015;

/// Minimum band count a body choice must produce to be accepted as-is
const MIN_BANDS: usize = 3;

/// A maximal stretch of columns classified to the same color
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Run<'p> {
    pub entry: &'p PaletteEntry,
    pub start: usize,
    pub len: usize,
}

impl Run<'_> {
    pub fn name(&self) -> &'static str {
        self.entry.name
    }

    /// One past the last column
    pub fn end(&self) -> usize {
        self.start + self.len
    }
}

/// A significant, non-body run
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Band<'p> {
    pub entry: &'p PaletteEntry,
    pub start: usize,
    pub len: usize,
}

impl Band<'_> {
    pub fn name(&self) -> &'static str {
        self.entry.name
    }

    pub fn end(&self) -> usize {
        self.start + self.len
    }
}

impl<'p> From<Run<'p>> for Band<'p> {
    fn from(run: Run<'p>) -> Self {
        Self {
            entry: run.entry,
            start: run.start,
            len: run.len,
        }
    }
}

/// Segmentation output for one scan line
#[derive(Debug, Clone, PartialEq)]
pub struct ScanResult<'p> {
    /// Bands left to right
    pub bands: Vec<Band<'p>>,
    /// Inferred body color, `None` only for an empty scan line
    pub body: Option<&'p PaletteEntry>,
    /// Runs that passed the noise filter, body runs included
    pub significant_runs: Vec<Run<'p>>,
}

impl ScanResult<'_> {
    pub fn body_name(&self) -> Option<&'static str> {
        self.body.map(|e| e.name)
    }
}

/// Noise threshold for a scan line of `width` columns
pub fn min_band_width(width: usize) -> usize {
    (width as f64 * MIN_BAND_WIDTH_FRACTION).round() as usize
}

/// Run-length encode classified samples by color name
pub fn run_length_encode<'p>(samples: &[ClassifiedSample<'p>]) -> Vec<Run<'p>> {
    let mut runs: Vec<Run<'p>> = Vec::new();

    for (i, sample) in samples.iter().enumerate() {
        match runs.last_mut() {
            Some(run) if run.entry.name == sample.entry.name => run.len += 1,
            _ => runs.push(Run {
                entry: sample.entry,
                start: i,
                len: 1,
            }),
        }
    }

    runs
}

/// Total columns per color, ranked by count descending
///
/// Equal counts keep first-encountered order.
fn rank_by_coverage<'p>(runs: &[Run<'p>]) -> Vec<(&'p PaletteEntry, usize)> {
    let mut totals: Vec<(&'p PaletteEntry, usize)> = Vec::new();

    for run in runs {
        match totals.iter_mut().find(|(e, _)| e.name == run.entry.name) {
            Some((_, total)) => *total += run.len,
            None => totals.push((run.entry, run.len)),
        }
    }

    // stable sort
    totals.sort_by(|a, b| b.1.cmp(&a.1));
    totals
}

fn bands_excluding<'p>(runs: &[Run<'p>], body: &PaletteEntry) -> Vec<Run<'p>> {
    runs.iter()
        .filter(|r| r.entry.name != body.name)
        .copied()
        .collect()
}

/// Join same-colored bands separated by a gap narrower than `2 * min_width`
fn merge_split_bands<'p>(bands: Vec<Run<'p>>, min_width: usize) -> Vec<Band<'p>> {
    let mut merged: Vec<Band<'p>> = Vec::with_capacity(bands.len());

    for run in bands {
        match merged.last_mut() {
            Some(prev)
                if prev.entry.name == run.entry.name
                    && run.start.saturating_sub(prev.end()) < min_width * 2 =>
            {
                prev.len = run.end() - prev.start;
            }
            _ => merged.push(run.into()),
        }
    }

    merged
}

/// Split a classified scan line into body and bands
pub fn segment<'p>(samples: &[ClassifiedSample<'p>]) -> ScanResult<'p> {
    let width = samples.len();
    let runs = run_length_encode(samples);
    let ranked = rank_by_coverage(&runs);

    let Some(&(primary, _)) = ranked.first() else {
        return ScanResult {
            bands: Vec::new(),
            body: None,
            significant_runs: Vec::new(),
        };
    };

    let mut body = primary;
    let min_width = min_band_width(width);
    let significant: Vec<Run<'p>> = runs.into_iter().filter(|r| r.len >= min_width).collect();

    let mut bands = bands_excluding(&significant, body);

    if bands.len() < MIN_BANDS && has_multiple_colors(&significant) {
        if let Some(&(alt_body, _)) = ranked.get(1) {
            let alt_bands = bands_excluding(&significant, alt_body);
            if alt_bands.len() >= MIN_BANDS {
                tracing::debug!(
                    "Body {} left {} bands, using {} as body instead",
                    body.name,
                    bands.len(),
                    alt_body.name
                );
                body = alt_body;
                bands = alt_bands;
            }
        }
    }

    ScanResult {
        bands: merge_split_bands(bands, min_width),
        body: Some(body),
        significant_runs: significant,
    }
}

fn has_multiple_colors(runs: &[Run<'_>]) -> bool {
    runs.split_first()
        .is_some_and(|(first, rest)| rest.iter().any(|r| r.entry.name != first.entry.name))
}
