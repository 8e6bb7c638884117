extern crate alloc;
use alloc::string::String;
use alloc::vec::Vec;

use crate::catalog::ThreadCatalog;
use crate::histogram::HistogramEntry;
use crate::mapping::CollapseMapping;
use crate::matcher::distance_sq;

/// Anchor thread ids force-kept in any reduced palette, in priority order:
/// black, white, then cyan, magenta, yellow.
///
/// This is a product decision, not a numerical optimum: a reduced palette
/// keeps structural contrast even when the histogram alone would not surface
/// these colors, trading histogram-exact coverage for it.
pub const DEFAULT_ANCHORS: [&str; 5] = ["310", "5200", "996", "602", "444"];

/// A retained palette member that dropped histogram entries collapse onto.
#[derive(Debug, Clone)]
struct KeptColor {
    id: String,
    rgb: rgb::RGB<u8>,
}

/// Collapse a matched-color histogram down to at most `max_colors` kept ids.
///
/// The kept set starts with the `anchors` in their declared order (resolved
/// against `catalog`, misses dropped, truncated to `max_colors` if the anchor
/// list alone exceeds it), then fills with the most frequent histogram
/// entries not already kept. Every remaining histogram entry maps to its
/// nearest kept color by squared RGB distance; kept entries are absent from
/// the mapping.
///
/// `max_colors == 0` is treated as "no reduction" and returns an empty
/// mapping, as does an empty histogram.
pub fn reduce_palette(
    histogram: &[HistogramEntry],
    catalog: &ThreadCatalog,
    anchors: &[&str],
    max_colors: usize,
) -> CollapseMapping {
    if max_colors == 0 || histogram.is_empty() {
        return CollapseMapping::new();
    }

    let mut kept: Vec<KeptColor> = Vec::with_capacity(max_colors);
    for id in anchors {
        if kept.iter().any(|k| k.id == *id) {
            continue;
        }
        // Anchor ids missing from the catalog are silently dropped.
        if let Some(entry) = catalog.by_id(id) {
            kept.push(KeptColor {
                id: entry.id.clone(),
                rgb: entry.rgb,
            });
        }
    }
    kept.truncate(max_colors);

    // Most frequent first; ties broken by id ascending for determinism.
    let mut by_count: Vec<&HistogramEntry> = histogram.iter().collect();
    by_count.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.id.cmp(&b.id)));

    for entry in &by_count {
        if kept.len() == max_colors {
            break;
        }
        if kept.iter().any(|k| k.id == entry.id) {
            continue;
        }
        kept.push(KeptColor {
            id: entry.id.clone(),
            rgb: entry.rgb,
        });
    }

    collapse_onto(histogram, kept)
}

/// Build the kept set directly from quantized centroids: each centroid is
/// matched to its nearest catalog thread and deduplicated in slot order.
/// An empty centroid list yields an empty mapping (no reduction).
pub fn reduce_to_centroids(
    histogram: &[HistogramEntry],
    catalog: &ThreadCatalog,
    centroids: &[rgb::RGB<u8>],
) -> CollapseMapping {
    let mut kept: Vec<KeptColor> = Vec::with_capacity(centroids.len());
    for c in centroids {
        let m = catalog.nearest(f32::from(c.r), f32::from(c.g), f32::from(c.b));
        if kept.iter().all(|k| k.id != m.color.id) {
            kept.push(KeptColor {
                id: m.color.id.clone(),
                rgb: m.color.rgb,
            });
        }
    }
    collapse_onto(histogram, kept)
}

/// Map every histogram entry outside the kept set to its nearest kept color.
/// Ties break toward the earlier kept entry (strict `<` scan in kept order).
fn collapse_onto(histogram: &[HistogramEntry], kept: Vec<KeptColor>) -> CollapseMapping {
    let mut mapping = CollapseMapping::new();
    if kept.is_empty() {
        return mapping;
    }

    for entry in histogram {
        if kept.iter().any(|k| k.id == entry.id) {
            continue;
        }

        let mut best = &kept[0];
        let mut best_dist = u32::MAX;
        for k in &kept {
            let d = distance_sq(entry.rgb, k.rgb);
            if d < best_dist {
                best_dist = d;
                best = k;
            }
        }
        mapping.insert(entry.id.clone(), best.id.clone());
    }

    mapping
}
