#![forbid(unsafe_code)]
#![cfg_attr(not(feature = "std"), no_std)]

extern crate alloc;

pub mod catalog;
pub mod error;
pub mod histogram;
pub mod kmeans;
pub mod mapping;
pub mod matcher;
pub mod reduce;

pub use catalog::{ReferenceColor, ThreadCatalog, WHITE_ID};
pub use error::PatternError;
pub use histogram::{HistogramEntry, MaterialEntry, MaterialSummary};
pub use mapping::CollapseMapping;
pub use matcher::{ColorMatch, MatchKind};
pub use reduce::DEFAULT_ANCHORS;

use alloc::string::String;
use alloc::string::ToString as _;
use alloc::vec::Vec;

/// How the observed palette is collapsed to `max_colors`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReduceStrategy {
    /// Keep the anchor colors plus the most frequent matched threads, then
    /// collapse everything else onto the nearest kept color.
    #[default]
    GreedyAnchored,
    /// Discover dominant colors by k-means over a pixel sample, match each
    /// centroid to its nearest catalog thread, and collapse onto those.
    KMeansSampled,
}

/// Configuration for pattern generation.
#[derive(Debug, Clone)]
pub struct PatternConfig {
    /// Maximum number of thread colors in the finished pattern (1..=30).
    pub max_colors: u32,
    /// Palette reduction strategy.
    pub strategy: ReduceStrategy,
    /// Anchor thread ids force-kept by [`ReduceStrategy::GreedyAnchored`].
    pub anchors: Vec<String>,
    /// Manual merges, applied before matching feeds the histogram.
    pub overrides: CollapseMapping,
    /// Match by luma only, ignoring hue and saturation.
    pub grayscale: bool,
    /// Iteration cap for [`ReduceStrategy::KMeansSampled`].
    pub max_iterations: u32,
    /// Seed for the quantizer's orphan re-seeding RNG.
    pub seed: u64,
}

impl Default for PatternConfig {
    fn default() -> Self {
        Self {
            max_colors: 15,
            strategy: ReduceStrategy::default(),
            anchors: DEFAULT_ANCHORS.iter().map(|s| s.to_string()).collect(),
            overrides: CollapseMapping::new(),
            grayscale: false,
            max_iterations: 5,
            seed: 0,
        }
    }
}

impl PatternConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn max_colors(mut self, n: u32) -> Self {
        self.max_colors = n;
        self
    }

    pub fn strategy(mut self, strategy: ReduceStrategy) -> Self {
        self.strategy = strategy;
        self
    }

    pub fn anchors<I, S>(mut self, anchors: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.anchors = anchors.into_iter().map(Into::into).collect();
        self
    }

    pub fn overrides(mut self, overrides: CollapseMapping) -> Self {
        self.overrides = overrides;
        self
    }

    pub fn grayscale(mut self, grayscale: bool) -> Self {
        self.grayscale = grayscale;
        self
    }

    pub fn max_iterations(mut self, n: u32) -> Self {
        self.max_iterations = n;
        self
    }

    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }
}

/// A finished stitch grid.
#[derive(Debug, Clone)]
pub struct Pattern {
    width: usize,
    height: usize,
    cells: Vec<u16>,
    summary: MaterialSummary,
}

impl Pattern {
    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// Row-major catalog indices, one per cell, into the catalog that
    /// produced this pattern.
    pub fn cells(&self) -> &[u16] {
        &self.cells
    }

    pub fn summary(&self) -> &MaterialSummary {
        &self.summary
    }
}

/// Convert an RGBA cell grid into a stitch pattern against `catalog`.
///
/// One matching pass produces the per-cell thread and the color histogram
/// (manual overrides already applied); the reduction strategy then computes
/// a collapse mapping which is applied as a pure second pass, with no
/// re-matching. Transparent or corrupt cells degrade to safe defaults
/// instead of failing; errors are reserved for structurally invalid input.
pub fn generate(
    catalog: &ThreadCatalog,
    pixels: &[rgb::RGBA<u8>],
    width: usize,
    height: usize,
    config: &PatternConfig,
) -> Result<Pattern, PatternError> {
    validate_inputs(pixels.len(), width, height, config)?;

    let (mut cells, raw_histogram) =
        histogram::match_cells(catalog, pixels, &config.overrides, config.grayscale);

    let max_colors = config.max_colors as usize;
    let collapse = match config.strategy {
        ReduceStrategy::GreedyAnchored => {
            let anchors: Vec<&str> = config.anchors.iter().map(String::as_str).collect();
            reduce::reduce_palette(&raw_histogram, catalog, &anchors, max_colors)
        }
        ReduceStrategy::KMeansSampled => {
            let centroids = kmeans::quantize(
                pixels,
                max_colors,
                config.max_iterations as usize,
                config.seed,
            );
            reduce::reduce_to_centroids(&raw_histogram, catalog, &centroids)
        }
    };

    let final_histogram = histogram::apply_collapse(catalog, &mut cells, &collapse);
    let summary = histogram::summarize(catalog, &final_histogram);

    Ok(Pattern {
        width,
        height,
        cells,
        summary,
    })
}

fn validate_inputs(
    pixel_count: usize,
    width: usize,
    height: usize,
    config: &PatternConfig,
) -> Result<(), PatternError> {
    if width == 0 || height == 0 {
        return Err(PatternError::ZeroDimension);
    }
    if pixel_count != width * height {
        return Err(PatternError::DimensionMismatch {
            len: pixel_count,
            width,
            height,
        });
    }
    if config.max_colors < 1 || config.max_colors > 30 {
        return Err(PatternError::InvalidMaxColors(config.max_colors));
    }
    Ok(())
}
