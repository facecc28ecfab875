//! Color conversion and palette matching properties

use taxo_norm::color::{
    distance_to_confidence, get_all_color_names, get_color_by_name, hex_distance, hex_to_lab,
    hex_to_rgb, lab_to_hex, palette, ColorMatcher, DEFAULT_MAX_DISTANCE,
};

fn close(a: f64, b: f64, tolerance: f64) -> bool {
    (a - b).abs() <= tolerance
}

#[test]
fn test_black_and_white_reference_points() {
    let black = hex_to_lab("#000000").unwrap();
    assert!(close(black.l, 0.0, 0.01) && close(black.a, 0.0, 0.01) && close(black.b, 0.0, 0.01));

    let white = hex_to_lab("#ffffff").unwrap();
    assert!(close(white.l, 100.0, 0.01), "L = {}", white.l);
    assert!(close(white.a, 0.0, 0.01), "a = {}", white.a);
    assert!(close(white.b, 0.0, 0.01), "b = {}", white.b);
}

#[test]
fn test_lab_round_trip_within_one_step() {
    // Coarse sweep of the RGB cube
    for r in (0..=255u16).step_by(51) {
        for g in (0..=255u16).step_by(51) {
            for b in (0..=255u16).step_by(51) {
                let hex = format!("#{:02x}{:02x}{:02x}", r, g, b);
                let back = hex_to_rgb(&lab_to_hex(hex_to_lab(&hex).unwrap())).unwrap();
                let original = hex_to_rgb(&hex).unwrap();

                assert!((back.r as i16 - original.r as i16).abs() <= 1, "{hex}");
                assert!((back.g as i16 - original.g as i16).abs() <= 1, "{hex}");
                assert!((back.b as i16 - original.b as i16).abs() <= 1, "{hex}");
            }
        }
    }
}

#[test]
fn test_short_and_unmarked_hex_forms_agree() {
    assert_eq!(hex_to_rgb("#f80").unwrap(), hex_to_rgb("ff8800").unwrap());
    assert_eq!(hex_to_rgb(" #FF8800 ").unwrap(), hex_to_rgb("#ff8800").unwrap());
    assert!(hex_to_rgb("#ff88").is_err());
    assert!(hex_to_rgb("#gg0000").is_err());
    assert!(hex_to_rgb("").is_err());
}

#[test]
fn test_distance_is_a_metric() {
    let samples = ["#000000", "#ff0000", "#1f2a48", "#c8b89a", "#ffffff"];
    for a in samples {
        assert_eq!(hex_distance(a, a).unwrap(), 0.0);
        for b in samples {
            let ab = hex_distance(a, b).unwrap();
            let ba = hex_distance(b, a).unwrap();
            assert!(ab >= 0.0);
            assert!(close(ab, ba, 1e-9), "{a} / {b}");
        }
    }
}

#[test]
fn test_confidence_is_monotonic_and_bounded() {
    assert_eq!(distance_to_confidence(0.0, DEFAULT_MAX_DISTANCE), 100.0);
    assert_eq!(distance_to_confidence(DEFAULT_MAX_DISTANCE, DEFAULT_MAX_DISTANCE), 0.0);
    assert_eq!(distance_to_confidence(250.0, DEFAULT_MAX_DISTANCE), 0.0);

    let mut previous = 100.0;
    for step in 0..=120 {
        let confidence = distance_to_confidence(step as f64, DEFAULT_MAX_DISTANCE);
        assert!((0.0..=100.0).contains(&confidence));
        assert!(confidence <= previous, "confidence rose at distance {step}");
        previous = confidence;
    }
}

#[test]
fn test_every_palette_color_matches_itself_first() {
    let matcher = ColorMatcher::default();
    for color in palette() {
        let best = matcher.find_best_match(&color.hex, None).unwrap().unwrap();
        assert_eq!(best.color_name, color.name);
        assert_eq!(best.confidence_percent, 100.0);
    }
}

#[test]
fn test_matches_sorted_and_restricted() {
    let matcher = ColorMatcher::default();

    let all = matcher.find_matching_colors("#2b3a67", None).unwrap();
    assert_eq!(all.len(), get_all_color_names().len());
    assert!(all.windows(2).all(|w| w[0].distance <= w[1].distance));
    assert_eq!(all[0].color_name, "navy");

    let some = matcher
        .find_matching_colors("#2b3a67", Some(&["Red", "green", "not-a-color"]))
        .unwrap();
    let names: Vec<_> = some.iter().map(|m| m.color_name).collect();
    assert_eq!(names.len(), 2);
    assert!(names.contains(&"red") && names.contains(&"green"));

    assert!(matcher.find_matching_colors("#2b3a67", Some(&[])).unwrap().is_empty());
    assert!(matcher.find_best_match("#2b3a67", Some(&[])).unwrap().is_none());
    assert!(matcher.find_matching_colors("nope", None).is_err());
}

#[test]
fn test_palette_lookup_is_case_insensitive() {
    let navy = get_color_by_name("NAVY").unwrap();
    assert_eq!(navy.name, "navy");
    assert_eq!(navy.label_fr, "bleu marine");
    assert!(get_color_by_name("teal").is_none());
}

#[test]
fn test_similarity_threshold_is_inclusive() {
    let matcher = ColorMatcher::new(50.0);
    let d = hex_distance("#ff0000", "#ee0000").unwrap();
    assert!(matcher.is_color_similar("#ff0000", "#ee0000", d).unwrap());
    assert!(!matcher.is_color_similar("#ff0000", "#0000ff", 10.0).unwrap());
    assert_eq!(matcher.max_distance(), 50.0);
}
