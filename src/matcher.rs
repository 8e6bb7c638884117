use crate::catalog::{ReferenceColor, ThreadCatalog, WHITE_ID};

/// How a match was produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchKind {
    /// Normal nearest-neighbor result.
    Nearest,
    /// A non-finite input channel forced the white default.
    FallbackWhite,
}

/// Result of a nearest-color query: the matched catalog entry, its index in
/// catalog order, and whether the white fallback was taken.
#[derive(Debug, Clone, Copy)]
pub struct ColorMatch<'a> {
    pub color: &'a ReferenceColor,
    pub index: usize,
    pub kind: MatchKind,
}

/// Rec. 601 luma, in the 0..=255 range.
fn luma(r: f32, g: f32, b: f32) -> f32 {
    0.299 * r + 0.587 * g + 0.114 * b
}

impl ThreadCatalog {
    /// The entry used when a query cannot be trusted: pure white, or the
    /// first catalog entry if the catalog has no white.
    fn white_fallback(&self) -> ColorMatch<'_> {
        let index = self.index_of(WHITE_ID).unwrap_or(0);
        ColorMatch {
            color: &self.as_slice()[index],
            index,
            kind: MatchKind::FallbackWhite,
        }
    }

    /// Find the closest catalog entry to `(r, g, b)` by squared Euclidean
    /// distance in RGB space. The square root is skipped since only relative
    /// ordering matters.
    ///
    /// Ties go to the first entry in catalog order (strict `<` scan).
    ///
    /// Any non-finite channel returns the pure-white entry instead of a
    /// match. NaN comparisons are always false, so without this explicit
    /// check a corrupted channel (e.g. from a fully transparent source
    /// pixel) would silently select an arbitrary entry.
    pub fn nearest(&self, r: f32, g: f32, b: f32) -> ColorMatch<'_> {
        if !(r.is_finite() && g.is_finite() && b.is_finite()) {
            return self.white_fallback();
        }

        let mut best_index = 0;
        let mut best_dist = f32::INFINITY;

        for (i, entry) in self.iter().enumerate() {
            let dr = r - f32::from(entry.rgb.r);
            let dg = g - f32::from(entry.rgb.g);
            let db = b - f32::from(entry.rgb.b);
            let d = dr * dr + dg * dg + db * db;
            if d < best_dist {
                best_dist = d;
                best_index = i;
            }
        }

        ColorMatch {
            color: &self.as_slice()[best_index],
            index: best_index,
            kind: MatchKind::Nearest,
        }
    }

    /// Find the catalog entry with the closest luma to `(r, g, b)`, ignoring
    /// hue and saturation entirely. Same tie-break and fallback rules as
    /// [`nearest`](Self::nearest).
    pub fn nearest_gray(&self, r: f32, g: f32, b: f32) -> ColorMatch<'_> {
        if !(r.is_finite() && g.is_finite() && b.is_finite()) {
            return self.white_fallback();
        }

        let query = luma(r, g, b);
        let mut best_index = 0;
        let mut best_diff = f32::INFINITY;

        for (i, entry) in self.iter().enumerate() {
            let entry_luma = luma(
                f32::from(entry.rgb.r),
                f32::from(entry.rgb.g),
                f32::from(entry.rgb.b),
            );
            let diff = (query - entry_luma).abs();
            if diff < best_diff {
                best_diff = diff;
                best_index = i;
            }
        }

        ColorMatch {
            color: &self.as_slice()[best_index],
            index: best_index,
            kind: MatchKind::Nearest,
        }
    }
}

/// Squared Euclidean distance between two catalog-space colors.
pub(crate) fn distance_sq(a: rgb::RGB<u8>, b: rgb::RGB<u8>) -> u32 {
    let dr = i32::from(a.r) - i32::from(b.r);
    let dg = i32::from(a.g) - i32::from(b.g);
    let db = i32::from(a.b) - i32::from(b.b);
    (dr * dr + dg * dg + db * db) as u32
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::ReferenceColor;
    use alloc::vec;
    use alloc::vec::Vec;

    fn catalog() -> ThreadCatalog {
        ThreadCatalog::new(vec![
            ReferenceColor::new("310", 0, 0, 0, "Black"),
            ReferenceColor::new("5200", 255, 255, 255, "Snow White"),
            ReferenceColor::new("666", 227, 29, 66, "Bright Red"),
            ReferenceColor::new("699", 5, 101, 23, "Green"),
            ReferenceColor::new("797", 19, 71, 125, "Royal Blue"),
        ])
        .unwrap()
    }

    #[test]
    fn exact_match() {
        let c = catalog();
        let m = c.nearest(227.0, 29.0, 66.0);
        assert_eq!(m.color.id, "666");
        assert_eq!(m.kind, MatchKind::Nearest);
    }

    #[test]
    fn nearest_is_closest_of_all_entries() {
        let c = catalog();
        // Exhaustive oracle over a coarse grid of queries.
        for r in (0..=255u16).step_by(51) {
            for g in (0..=255u16).step_by(51) {
                for b in (0..=255u16).step_by(51) {
                    let m = c.nearest(f32::from(r), f32::from(g), f32::from(b));
                    let query = rgb::RGB {
                        r: r as u8,
                        g: g as u8,
                        b: b as u8,
                    };
                    let best = distance_sq(query, m.color.rgb);
                    for entry in c.iter() {
                        assert!(best <= distance_sq(query, entry.rgb));
                    }
                }
            }
        }
    }

    #[test]
    fn tie_breaks_to_first_in_catalog_order() {
        let c = ThreadCatalog::new(vec![
            ReferenceColor::new("a", 10, 0, 0, "A"),
            ReferenceColor::new("b", 30, 0, 0, "B"),
        ])
        .unwrap();
        // (20, 0, 0) is equidistant from both; first entry wins.
        assert_eq!(c.nearest(20.0, 0.0, 0.0).color.id, "a");
    }

    #[test]
    fn non_finite_channel_falls_back_to_white() {
        let c = catalog();
        for (r, g, b) in [
            (f32::NAN, 10.0, 10.0),
            (10.0, f32::NAN, 10.0),
            (10.0, 10.0, f32::NAN),
            (f32::INFINITY, 0.0, 0.0),
            (0.0, f32::NEG_INFINITY, 0.0),
        ] {
            let m = c.nearest(r, g, b);
            assert_eq!(m.color.id, "5200");
            assert_eq!(m.kind, MatchKind::FallbackWhite);
            let gm = c.nearest_gray(r, g, b);
            assert_eq!(gm.color.id, "5200");
            assert_eq!(gm.kind, MatchKind::FallbackWhite);
        }
    }

    #[test]
    fn fallback_without_white_uses_first_entry() {
        let c = ThreadCatalog::new(vec![
            ReferenceColor::new("1", 1, 2, 3, "First"),
            ReferenceColor::new("2", 4, 5, 6, "Second"),
        ])
        .unwrap();
        let m = c.nearest(f32::NAN, 0.0, 0.0);
        assert_eq!(m.color.id, "1");
        assert_eq!(m.kind, MatchKind::FallbackWhite);
    }

    #[test]
    fn gray_matcher_ignores_hue() {
        // Pure red has luma ~76; a mid gray entry should win over a much
        // closer-by-hue but brighter entry.
        let c = ThreadCatalog::new(vec![
            ReferenceColor::new("white", 255, 255, 255, "White"),
            ReferenceColor::new("gray", 76, 76, 76, "Gray"),
        ])
        .unwrap();
        let m = c.nearest_gray(255.0, 0.0, 0.0);
        assert_eq!(m.color.id, "gray");
    }

    #[test]
    fn match_is_deterministic() {
        let c = catalog();
        let runs: Vec<usize> = (0..3).map(|_| c.nearest(120.0, 60.0, 200.0).index).collect();
        assert!(runs.windows(2).all(|w| w[0] == w[1]));
    }
}
