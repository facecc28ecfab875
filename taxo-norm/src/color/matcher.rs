//! Color matching against the canonical palette
//!
//! Similarity is the Euclidean distance in L*a*b* (CIE76): smaller is closer.
//! Distances are mapped to a confidence percentage with a linear falloff that
//! reaches zero at `max_distance`.

use crate::color::convert::{hex_to_lab, Lab};
use crate::color::palette::palette;
use serde::Serialize;
use taxo_common::Result;
use tracing::debug;

/// Distance at which confidence reaches 0%
///
/// Not calibrated against perceptual studies; override via `ColorMatcher::new`.
pub const DEFAULT_MAX_DISTANCE: f64 = 100.0;

/// A ranked palette candidate
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ColorMatch {
    pub color_name: &'static str,
    pub distance: f64,
    pub confidence_percent: f64,
}

/// Euclidean distance in LAB space
pub fn lab_distance(a: Lab, b: Lab) -> f64 {
    let dl = a.l - b.l;
    let da = a.a - b.a;
    let db = a.b - b.b;
    (dl * dl + da * da + db * db).sqrt()
}

pub fn hex_distance(hex_a: &str, hex_b: &str) -> Result<f64> {
    Ok(lab_distance(hex_to_lab(hex_a)?, hex_to_lab(hex_b)?))
}

/// Map a LAB distance to a confidence in [0, 100]
///
/// Distance 0 maps to exactly 100; the curve never increases with distance.
/// A NaN distance scores 0.
pub fn distance_to_confidence(distance: f64, max_distance: f64) -> f64 {
    if distance.is_nan() {
        return 0.0;
    }
    if distance <= 0.0 {
        return 100.0;
    }
    if max_distance <= 0.0 || distance >= max_distance {
        return 0.0;
    }
    let confidence = 100.0 * (1.0 - distance / max_distance);
    if confidence.is_nan() {
        return 0.0;
    }
    confidence.clamp(0.0, 100.0)
}

/// Palette matcher
#[derive(Debug, Clone, Copy)]
pub struct ColorMatcher {
    max_distance: f64,
}

impl Default for ColorMatcher {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_DISTANCE)
    }
}

impl ColorMatcher {
    pub fn new(max_distance: f64) -> Self {
        Self { max_distance }
    }

    pub fn max_distance(&self) -> f64 {
        self.max_distance
    }

    /// Rank palette colors by distance to `query_hex`
    ///
    /// # Arguments
    /// * `query_hex` - Swatch to match (`#rgb` / `#rrggbb`, marker optional)
    /// * `candidates` - Restrict to these palette names (case-insensitive);
    ///   `None` means the whole palette. Names outside the palette are ignored.
    ///
    /// # Returns
    /// Matches sorted ascending by distance. An empty candidate list yields an
    /// empty result.
    pub fn find_matching_colors(
        &self,
        query_hex: &str,
        candidates: Option<&[&str]>,
    ) -> Result<Vec<ColorMatch>> {
        let query = hex_to_lab(query_hex)?;

        let mut matches: Vec<ColorMatch> = palette()
            .iter()
            .filter(|color| match candidates {
                Some(names) => names.iter().any(|n| n.trim().eq_ignore_ascii_case(color.name)),
                None => true,
            })
            .map(|color| {
                let distance = lab_distance(query, color.lab);
                ColorMatch {
                    color_name: color.name,
                    distance,
                    confidence_percent: distance_to_confidence(distance, self.max_distance),
                }
            })
            .collect();

        // Stable sort keeps palette order on ties
        matches.sort_by(|a, b| a.distance.total_cmp(&b.distance));

        debug!(
            query = %query_hex,
            candidates = matches.len(),
            "Ranked palette colors"
        );

        Ok(matches)
    }

    /// Closest palette color, or `None` when the candidate set is empty
    pub fn find_best_match(
        &self,
        query_hex: &str,
        candidates: Option<&[&str]>,
    ) -> Result<Option<ColorMatch>> {
        Ok(self
            .find_matching_colors(query_hex, candidates)?
            .into_iter()
            .next())
    }

    pub fn is_color_similar(&self, hex_a: &str, hex_b: &str, threshold: f64) -> Result<bool> {
        Ok(hex_distance(hex_a, hex_b)? <= threshold)
    }
}
