//! Color space conversion
//!
//! Pure functions between hex strings, 8-bit sRGB, CIE XYZ (D65, Y scaled to
//! 100) and CIE 1976 L*a*b*.

use serde::{Deserialize, Serialize};
use taxo_common::{Error, Result};

/// D65 reference white
const REF_X: f64 = 95.047;
const REF_Y: f64 = 100.0;
const REF_Z: f64 = 108.883;

/// 6/29, the LAB linear-segment breakpoint in f-space
const DELTA: f64 = 6.0 / 29.0;

/// sRGB decoding threshold
const SRGB_DECODE_THRESHOLD: f64 = 0.04045;

/// sRGB encoding threshold (linear side)
const SRGB_ENCODE_THRESHOLD: f64 = 0.0031308;

/// 8-bit sRGB color
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }
}

/// CIE XYZ tristimulus values (D65, Y of white = 100)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Xyz {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

/// CIE L*a*b* color
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Lab {
    pub l: f64,
    pub a: f64,
    pub b: f64,
}

impl Lab {
    pub const fn new(l: f64, a: f64, b: f64) -> Self {
        Self { l, a, b }
    }
}

/// Split a hex string into its digits, validating length and alphabet
fn hex_digits(hex: &str) -> Result<&str> {
    let trimmed = hex.trim();
    let digits = trimmed.strip_prefix('#').unwrap_or(trimmed);

    if !(digits.len() == 3 || digits.len() == 6) || !digits.chars().all(|c| c.is_ascii_hexdigit())
    {
        return Err(Error::validation(format!("Malformed hex color: '{}'", hex)));
    }

    Ok(digits)
}

/// Parse `#rgb`, `rgb`, `#rrggbb` or `rrggbb`
pub fn hex_to_rgb(hex: &str) -> Result<Rgb> {
    let digits = hex_digits(hex)?;

    let channel = |s: &str| {
        u8::from_str_radix(s, 16)
            .map_err(|_| Error::validation(format!("Malformed hex color: '{}'", hex)))
    };

    if digits.len() == 3 {
        let expand = |i: usize| {
            let d = &digits[i..i + 1];
            channel(&format!("{d}{d}"))
        };
        Ok(Rgb::new(expand(0)?, expand(1)?, expand(2)?))
    } else {
        Ok(Rgb::new(
            channel(&digits[0..2])?,
            channel(&digits[2..4])?,
            channel(&digits[4..6])?,
        ))
    }
}

/// Format as lowercase `#rrggbb`
pub fn rgb_to_hex(rgb: Rgb) -> String {
    format!("#{:02x}{:02x}{:02x}", rgb.r, rgb.g, rgb.b)
}

/// Canonical lowercase 6-digit form with leading `#`
pub fn normalize_hex(hex: &str) -> Result<String> {
    hex_to_rgb(hex).map(rgb_to_hex)
}

/// Non-failing validity check
pub fn is_valid_hex(hex: &str) -> bool {
    hex_digits(hex).is_ok()
}

fn srgb_to_linear(channel: u8) -> f64 {
    let c = channel as f64 / 255.0;
    if c > SRGB_DECODE_THRESHOLD {
        ((c + 0.055) / 1.055).powf(2.4)
    } else {
        c / 12.92
    }
}

fn linear_to_srgb(linear: f64) -> u8 {
    let c = if linear > SRGB_ENCODE_THRESHOLD {
        1.055 * linear.powf(1.0 / 2.4) - 0.055
    } else {
        12.92 * linear
    };
    (c.clamp(0.0, 1.0) * 255.0).round() as u8
}

/// sRGB → XYZ (D65)
pub fn rgb_to_xyz(rgb: Rgb) -> Xyz {
    let r = srgb_to_linear(rgb.r) * 100.0;
    let g = srgb_to_linear(rgb.g) * 100.0;
    let b = srgb_to_linear(rgb.b) * 100.0;

    Xyz {
        x: r * 0.4124564 + g * 0.3575761 + b * 0.1804375,
        y: r * 0.2126729 + g * 0.7151522 + b * 0.0721750,
        z: r * 0.0193339 + g * 0.1191920 + b * 0.9503041,
    }
}

/// XYZ (D65) → sRGB, clamped to gamut
pub fn xyz_to_rgb(xyz: Xyz) -> Rgb {
    let x = xyz.x / 100.0;
    let y = xyz.y / 100.0;
    let z = xyz.z / 100.0;

    let r = x * 3.2404542 + y * -1.5371385 + z * -0.4985314;
    let g = x * -0.9692660 + y * 1.8760108 + z * 0.0415560;
    let b = x * 0.0556434 + y * -0.2040259 + z * 1.0572252;

    Rgb::new(linear_to_srgb(r), linear_to_srgb(g), linear_to_srgb(b))
}

fn lab_f(t: f64) -> f64 {
    if t > DELTA.powi(3) {
        t.cbrt()
    } else {
        t / (3.0 * DELTA * DELTA) + 4.0 / 29.0
    }
}

fn lab_f_inv(t: f64) -> f64 {
    if t > DELTA {
        t.powi(3)
    } else {
        3.0 * DELTA * DELTA * (t - 4.0 / 29.0)
    }
}

/// XYZ → L*a*b*
pub fn xyz_to_lab(xyz: Xyz) -> Lab {
    let fx = lab_f(xyz.x / REF_X);
    let fy = lab_f(xyz.y / REF_Y);
    let fz = lab_f(xyz.z / REF_Z);

    Lab {
        l: 116.0 * fy - 16.0,
        a: 500.0 * (fx - fy),
        b: 200.0 * (fy - fz),
    }
}

/// L*a*b* → XYZ
pub fn lab_to_xyz(lab: Lab) -> Xyz {
    let fy = (lab.l + 16.0) / 116.0;
    let fx = fy + lab.a / 500.0;
    let fz = fy - lab.b / 200.0;

    Xyz {
        x: REF_X * lab_f_inv(fx),
        y: REF_Y * lab_f_inv(fy),
        z: REF_Z * lab_f_inv(fz),
    }
}

pub fn rgb_to_lab(rgb: Rgb) -> Lab {
    xyz_to_lab(rgb_to_xyz(rgb))
}

pub fn hex_to_lab(hex: &str) -> Result<Lab> {
    hex_to_rgb(hex).map(rgb_to_lab)
}

pub fn lab_to_hex(lab: Lab) -> String {
    rgb_to_hex(xyz_to_rgb(lab_to_xyz(lab)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_close(actual: f64, expected: f64, tol: f64) {
        assert!(
            (actual - expected).abs() <= tol,
            "expected {} ± {}, got {}",
            expected,
            tol,
            actual
        );
    }

    #[test]
    fn test_hex_to_rgb_forms() {
        assert_eq!(hex_to_rgb("#ff8000").unwrap(), Rgb::new(255, 128, 0));
        assert_eq!(hex_to_rgb("FF8000").unwrap(), Rgb::new(255, 128, 0));
        assert_eq!(hex_to_rgb("#f80").unwrap(), Rgb::new(255, 136, 0));
        assert_eq!(hex_to_rgb("abc").unwrap(), Rgb::new(0xaa, 0xbb, 0xcc));
        assert_eq!(hex_to_rgb("  #000000 ").unwrap(), Rgb::new(0, 0, 0));
    }

    #[test]
    fn test_hex_to_rgb_rejects_malformed() {
        for bad in ["", "#", "#12", "#1234", "#12345g", "##123456", "1234567", "#ggg", "#ff 000"] {
            let result = hex_to_rgb(bad);
            assert!(matches!(result, Err(Error::Validation(_))), "accepted '{}'", bad);
        }
    }

    #[test]
    fn test_normalize_hex() {
        assert_eq!(normalize_hex("#ABC").unwrap(), "#aabbcc");
        assert_eq!(normalize_hex("1A2b3C").unwrap(), "#1a2b3c");
        assert!(normalize_hex("xyz").is_err());
    }

    #[test]
    fn test_is_valid_hex() {
        assert!(is_valid_hex("#fff"));
        assert!(is_valid_hex("00ff00"));
        assert!(!is_valid_hex("#00ff0"));
        assert!(!is_valid_hex("blue"));
    }

    #[test]
    fn test_black_and_white_lab() {
        let black = hex_to_lab("#000000").unwrap();
        assert_close(black.l, 0.0, 1e-6);
        assert_close(black.a, 0.0, 1e-6);
        assert_close(black.b, 0.0, 1e-6);

        let white = hex_to_lab("#ffffff").unwrap();
        assert_close(white.l, 100.0, 0.01);
        assert_close(white.a, 0.0, 0.01);
        assert_close(white.b, 0.0, 0.01);
    }

    #[test]
    fn test_reference_red() {
        // sRGB red in D65 LAB
        let red = hex_to_lab("#ff0000").unwrap();
        assert_close(red.l, 53.24, 0.05);
        assert_close(red.a, 80.09, 0.05);
        assert_close(red.b, 67.20, 0.05);
    }

    #[test]
    fn test_white_xyz_matches_reference_white() {
        let white = rgb_to_xyz(Rgb::new(255, 255, 255));
        assert_close(white.x, REF_X, 0.001);
        assert_close(white.y, REF_Y, 0.001);
        assert_close(white.z, REF_Z, 0.001);
    }

    #[test]
    fn test_round_trip_within_one_per_channel() {
        let mut samples = Vec::new();
        for r in (0..=255u16).step_by(17) {
            for g in (0..=255u16).step_by(51) {
                for b in (0..=255u16).step_by(85) {
                    samples.push(Rgb::new(r as u8, g as u8, b as u8));
                }
            }
        }
        samples.extend([Rgb::new(1, 2, 3), Rgb::new(200, 162, 200), Rgb::new(135, 206, 235)]);

        for rgb in samples {
            let back = hex_to_rgb(&lab_to_hex(rgb_to_lab(rgb))).unwrap();
            for (orig, got) in [(rgb.r, back.r), (rgb.g, back.g), (rgb.b, back.b)] {
                assert!(
                    (orig as i16 - got as i16).abs() <= 1,
                    "round trip drifted: {:?} -> {:?}",
                    rgb,
                    back
                );
            }
        }
    }

    #[test]
    fn test_lab_f_continuous_at_breakpoint() {
        let eps = DELTA.powi(3);
        assert_close(lab_f(eps), DELTA, 1e-12);
        assert_close(lab_f_inv(DELTA), eps, 1e-12);
    }
}
