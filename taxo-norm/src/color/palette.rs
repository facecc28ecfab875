//! Canonical color palette
//!
//! Sixteen language-independent color names used by catalog search. LAB values
//! are computed once, on first access, and shared by the whole process.

use crate::color::convert::{rgb_to_hex, rgb_to_lab, Lab, Rgb};
use once_cell::sync::Lazy;
use serde::Serialize;

/// Palette entry with its precomputed LAB value
#[derive(Debug, Clone, Serialize)]
pub struct PaletteColor {
    pub name: &'static str,
    pub hex: String,
    pub label_fr: &'static str,
    pub lab: Lab,
}

/// (name, reference swatch, French label) in display order
const CANONICAL_COLORS: [(&str, Rgb, &str); 16] = [
    ("black", Rgb::new(0, 0, 0), "noir"),
    ("white", Rgb::new(255, 255, 255), "blanc"),
    ("gray", Rgb::new(128, 128, 128), "gris"),
    ("beige", Rgb::new(216, 200, 168), "beige"),
    ("brown", Rgb::new(123, 74, 42), "marron"),
    ("red", Rgb::new(200, 16, 46), "rouge"),
    ("pink", Rgb::new(244, 166, 192), "rose"),
    ("orange", Rgb::new(240, 138, 36), "orange"),
    ("yellow", Rgb::new(245, 209, 48), "jaune"),
    ("green", Rgb::new(58, 138, 60), "vert"),
    ("khaki", Rgb::new(143, 138, 90), "kaki"),
    ("turquoise", Rgb::new(48, 192, 192), "turquoise"),
    ("blue", Rgb::new(42, 98, 200), "bleu"),
    ("navy", Rgb::new(31, 42, 72), "bleu marine"),
    ("purple", Rgb::new(122, 62, 157), "violet"),
    ("burgundy", Rgb::new(109, 26, 46), "bordeaux"),
];

static PALETTE: Lazy<Vec<PaletteColor>> = Lazy::new(|| {
    CANONICAL_COLORS
        .iter()
        .map(|&(name, rgb, label_fr)| PaletteColor {
            name,
            hex: rgb_to_hex(rgb),
            label_fr,
            lab: rgb_to_lab(rgb),
        })
        .collect()
});

/// All palette entries in stable display order
pub fn palette() -> &'static [PaletteColor] {
    &PALETTE
}

/// Case-insensitive lookup by canonical name
pub fn get_color_by_name(name: &str) -> Option<&'static PaletteColor> {
    let name = name.trim();
    PALETTE.iter().find(|c| c.name.eq_ignore_ascii_case(name))
}

pub fn get_all_color_names() -> Vec<&'static str> {
    PALETTE.iter().map(|c| c.name).collect()
}

/// French display label for a canonical name
pub fn get_color_label_fr(name: &str) -> Option<&'static str> {
    get_color_by_name(name).map(|c| c.label_fr)
}
