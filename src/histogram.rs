extern crate alloc;
use alloc::string::String;
use alloc::vec;
use alloc::vec::Vec;

use crate::catalog::ThreadCatalog;
use crate::mapping::CollapseMapping;

/// Observed usage of one matched catalog color within a single image.
/// Rebuilt from scratch on every reduction request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistogramEntry {
    pub id: String,
    /// Copied from the catalog entry for distance computations.
    pub rgb: rgb::RGB<u8>,
    pub count: u64,
}

/// Cells a skein of floss covers (2 strands on 14-count aida).
const CELLS_PER_SKEIN: u64 = 2000;

/// Cells stitched per hour, for the time estimate.
const CELLS_PER_HOUR: u64 = 100;

/// Symbols printed on the chart, assigned to final colors by id order.
const SYMBOLS: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789#*@+";

/// Match every pixel to its catalog color in one pass, applying manual
/// `overrides` as each cell is matched, and accumulate the histogram at the
/// same time. Returns per-cell catalog indices (row-major) alongside the
/// histogram in catalog order.
///
/// Override targets missing from the catalog are skipped and the matched
/// color is kept, so a stale override can never lose cells.
pub fn match_cells(
    catalog: &ThreadCatalog,
    pixels: &[rgb::RGBA<u8>],
    overrides: &CollapseMapping,
    grayscale: bool,
) -> (Vec<u16>, Vec<HistogramEntry>) {
    let mut cells = Vec::with_capacity(pixels.len());
    let mut counts = vec![0u64; catalog.len()];
    let table = rewrite_table(catalog, overrides);

    for p in pixels {
        let (r, g, b) = (f32::from(p.r), f32::from(p.g), f32::from(p.b));
        let m = if grayscale {
            catalog.nearest_gray(r, g, b)
        } else {
            catalog.nearest(r, g, b)
        };

        let index = table[m.index];
        counts[usize::from(index)] += 1;
        cells.push(index);
    }

    (cells, histogram_from_counts(catalog, &counts))
}

/// Rewrite `cells` and the histogram through a collapse mapping, as a pure
/// second pass with no re-matching. Mapping sources or targets missing from
/// the catalog are left as-is.
pub fn apply_collapse(
    catalog: &ThreadCatalog,
    cells: &mut [u16],
    mapping: &CollapseMapping,
) -> Vec<HistogramEntry> {
    let table = rewrite_table(catalog, mapping);

    let mut counts = vec![0u64; catalog.len()];
    for cell in cells.iter_mut() {
        *cell = table[usize::from(*cell)];
        counts[usize::from(*cell)] += 1;
    }

    histogram_from_counts(catalog, &counts)
}

/// Per-index rewrite table for a collapse mapping, computed once so the hot
/// per-pixel loops avoid id lookups. Sources or targets missing from the
/// catalog map to themselves.
fn rewrite_table(catalog: &ThreadCatalog, mapping: &CollapseMapping) -> Vec<u16> {
    catalog
        .iter()
        .enumerate()
        .map(|(i, entry)| {
            match mapping
                .get(&entry.id)
                .and_then(|target| catalog.index_of(target))
            {
                Some(target_index) => target_index as u16,
                None => i as u16,
            }
        })
        .collect()
}

fn histogram_from_counts(catalog: &ThreadCatalog, counts: &[u64]) -> Vec<HistogramEntry> {
    catalog
        .iter()
        .zip(counts)
        .filter(|(_, &count)| count > 0)
        .map(|(entry, &count)| HistogramEntry {
            id: entry.id.clone(),
            rgb: entry.rgb,
            count,
        })
        .collect()
}

/// One line of the material list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MaterialEntry {
    pub id: String,
    pub rgb: rgb::RGB<u8>,
    pub name: String,
    /// Chart symbol, unique per color until the symbol set cycles.
    pub symbol: char,
    pub count: u64,
    /// Skeins to buy: `count / 2000`, rounded up.
    pub skeins: u64,
}

/// Aggregated material list for a finished pattern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MaterialSummary {
    /// Sorted by count descending, ties by id ascending.
    pub entries: Vec<MaterialEntry>,
    pub total_cells: u64,
}

impl MaterialSummary {
    pub fn color_count(&self) -> usize {
        self.entries.len()
    }

    /// Rough stitching time at 100 cells per hour.
    pub fn estimated_hours(&self) -> f64 {
        self.total_cells as f64 / CELLS_PER_HOUR as f64
    }
}

/// Build the material list from a final (post-collapse) histogram.
///
/// Symbols are assigned to the distinct ids sorted ascending, so the symbol
/// for a given color is stable across runs on the same palette.
pub fn summarize(catalog: &ThreadCatalog, histogram: &[HistogramEntry]) -> MaterialSummary {
    let mut ids: Vec<&str> = histogram.iter().map(|e| e.id.as_str()).collect();
    ids.sort_unstable();
    ids.dedup();

    let symbol_for = |id: &str| -> char {
        let pos = ids.iter().position(|i| *i == id).unwrap_or(0);
        SYMBOLS[pos % SYMBOLS.len()] as char
    };

    let mut entries: Vec<MaterialEntry> = histogram
        .iter()
        .map(|e| MaterialEntry {
            id: e.id.clone(),
            rgb: e.rgb,
            name: catalog
                .by_id(&e.id)
                .map(|c| c.name.clone())
                .unwrap_or_default(),
            symbol: symbol_for(&e.id),
            count: e.count,
            skeins: e.count.div_ceil(CELLS_PER_SKEIN),
        })
        .collect();
    entries.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.id.cmp(&b.id)));

    let total_cells = entries.iter().map(|e| e.count).sum();
    MaterialSummary {
        entries,
        total_cells,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::ReferenceColor;
    use alloc::string::ToString;

    fn catalog() -> ThreadCatalog {
        ThreadCatalog::new(vec![
            ReferenceColor::new("310", 0, 0, 0, "Black"),
            ReferenceColor::new("5200", 255, 255, 255, "Snow White"),
            ReferenceColor::new("666", 227, 29, 66, "Bright Red"),
        ])
        .unwrap()
    }

    fn px(r: u8, g: u8, b: u8) -> rgb::RGBA<u8> {
        rgb::RGBA { r, g, b, a: 255 }
    }

    #[test]
    fn single_pass_counts_every_cell() {
        let catalog = catalog();
        let pixels = [px(0, 0, 0), px(10, 5, 5), px(250, 250, 250), px(230, 30, 60)];
        let (cells, hist) = match_cells(&catalog, &pixels, &CollapseMapping::new(), false);

        assert_eq!(cells, vec![0, 0, 1, 2]);
        assert_eq!(hist.len(), 3);
        assert_eq!(hist.iter().map(|e| e.count).sum::<u64>(), 4);
        let black = hist.iter().find(|e| e.id == "310").unwrap();
        assert_eq!(black.count, 2);
    }

    #[test]
    fn overrides_apply_before_the_histogram() {
        let catalog = catalog();
        let mut overrides = CollapseMapping::new();
        overrides.insert("310", "666");
        let pixels = [px(0, 0, 0), px(255, 255, 255)];
        let (cells, hist) = match_cells(&catalog, &pixels, &overrides, false);

        assert_eq!(cells, vec![2, 1]);
        assert!(hist.iter().all(|e| e.id != "310"));
    }

    #[test]
    fn override_to_unknown_id_keeps_original() {
        let catalog = catalog();
        let mut overrides = CollapseMapping::new();
        overrides.insert("310", "nonexistent");
        let (cells, hist) = match_cells(&catalog, &[px(0, 0, 0)], &overrides, false);

        assert_eq!(cells, vec![0]);
        assert_eq!(hist[0].id, "310");
    }

    #[test]
    fn rewrite_table_resolves_each_id_once() {
        let catalog = catalog();
        let mut mapping = CollapseMapping::new();
        mapping.insert("5200", "310");
        mapping.insert("666", "missing");

        // White collapses onto black; the stale target leaves red in place.
        assert_eq!(rewrite_table(&catalog, &mapping), vec![0, 0, 2]);
    }

    #[test]
    fn collapse_rewrites_cells_and_recounts() {
        let catalog = catalog();
        let mut cells = vec![0u16, 0, 1, 2, 2, 2];
        let mut mapping = CollapseMapping::new();
        mapping.insert("666", "310");

        let hist = apply_collapse(&catalog, &mut cells, &mapping);
        assert_eq!(cells, vec![0, 0, 1, 0, 0, 0]);
        assert_eq!(hist.len(), 2);
        assert_eq!(hist.iter().find(|e| e.id == "310").unwrap().count, 5);
    }

    #[test]
    fn summary_sorts_and_estimates() {
        let catalog = catalog();
        let hist = vec![
            HistogramEntry {
                id: "310".to_string(),
                rgb: rgb::RGB { r: 0, g: 0, b: 0 },
                count: 100,
            },
            HistogramEntry {
                id: "666".to_string(),
                rgb: rgb::RGB {
                    r: 227,
                    g: 29,
                    b: 66,
                },
                count: 2500,
            },
        ];
        let summary = summarize(&catalog, &hist);

        assert_eq!(summary.total_cells, 2600);
        assert_eq!(summary.entries[0].id, "666");
        assert_eq!(summary.entries[0].skeins, 2);
        assert_eq!(summary.entries[1].skeins, 1);
        assert_eq!(summary.entries[0].name, "Bright Red");
        assert!((summary.estimated_hours() - 26.0).abs() < f64::EPSILON);
    }

    #[test]
    fn symbols_follow_id_order_and_stay_stable() {
        let catalog = catalog();
        let hist = vec![
            HistogramEntry {
                id: "666".to_string(),
                rgb: rgb::RGB {
                    r: 227,
                    g: 29,
                    b: 66,
                },
                count: 9,
            },
            HistogramEntry {
                id: "310".to_string(),
                rgb: rgb::RGB { r: 0, g: 0, b: 0 },
                count: 1,
            },
        ];
        let summary = summarize(&catalog, &hist);

        // Ids sorted ascending: "310" -> 'A', "666" -> 'B', regardless of
        // the count-descending entry order.
        let red = summary.entries.iter().find(|e| e.id == "666").unwrap();
        let black = summary.entries.iter().find(|e| e.id == "310").unwrap();
        assert_eq!(black.symbol, 'A');
        assert_eq!(red.symbol, 'B');

        let again = summarize(&catalog, &hist);
        assert_eq!(summary, again);
    }
}
