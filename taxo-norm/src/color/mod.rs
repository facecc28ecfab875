//! Perceptual color engine
//!
//! Hex ↔ sRGB ↔ XYZ (D65) ↔ CIE L*a*b* conversion, a fixed canonical palette,
//! and LAB-distance matching against it.

pub mod convert;
pub mod matcher;
pub mod palette;

pub use convert::{hex_to_lab, hex_to_rgb, is_valid_hex, lab_to_hex, normalize_hex, Lab, Rgb, Xyz};
pub use matcher::{
    distance_to_confidence, hex_distance, lab_distance, ColorMatch, ColorMatcher,
    DEFAULT_MAX_DISTANCE,
};
pub use palette::{
    get_all_color_names, get_color_by_name, get_color_label_fr, palette, PaletteColor,
};
