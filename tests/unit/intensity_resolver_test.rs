//! Unit tests for intensity code resolution.

use rideplan::intensity::{IntensityDefinition, IntensityError, IntensityTable, PowerLevel};

fn range(code: &str) -> (f32, f32) {
    match IntensityTable::standard().resolve(code).unwrap() {
        IntensityDefinition::Range { low, high } => (low, high),
        other => panic!("Expected range for {code}, got {other:?}"),
    }
}

#[test]
fn test_standard_zone_bounds() {
    let expected = [
        ("EM", 0.45, 0.73),
        ("T", 0.80, 0.85),
        ("SS", 0.86, 0.90),
        ("CR", 0.95, 1.00),
        ("PI", 1.01, 1.50),
    ];
    for (code, low, high) in expected {
        let (l, h) = range(code);
        assert!((l - low).abs() < 1e-4, "{code} low");
        assert!((h - high).abs() < 1e-4, "{code} high");
    }
}

#[test]
fn test_codes_are_case_insensitive() {
    let table = IntensityTable::standard();
    assert_eq!(table.resolve("pfpi").unwrap(), table.resolve("PFPI").unwrap());
    assert_eq!(table.resolve(" Sepi ").unwrap(), table.resolve("SEPI").unwrap());
}

#[test]
fn test_over_under_whitespace_variants() {
    let table = IntensityTable::standard();
    let canonical = table.resolve("OU (2U,1O)").unwrap();
    for token in ["OU(2U,1O)", "ou (2u, 1o)", "OU ( 2U , 1O )"] {
        assert_eq!(table.resolve(token).unwrap(), canonical, "{token}");
    }
}

#[test]
fn test_over_under_uses_lower_under_target() {
    let pattern = match IntensityTable::standard().resolve("OU (3U,2O)").unwrap() {
        IntensityDefinition::Pattern(pattern) => pattern,
        other => panic!("Expected pattern, got {other:?}"),
    };

    assert_eq!(pattern.segments.len(), 2);
    assert_eq!(pattern.segments[0].label, "under");
    assert_eq!(pattern.segments[0].duration_seconds, 180);
    assert_eq!(pattern.segments[1].label, "over");
    assert_eq!(pattern.segments[1].duration_seconds, 120);
    assert_eq!(pattern.segments[0].target, PowerLevel::range(0.86, 0.90));
    assert!(pattern.segments[1].target.midpoint() > pattern.segments[0].target.midpoint());
}

#[test]
fn test_over_under_fill_seven_minutes() {
    let pattern = match IntensityTable::standard().resolve("OU (2U,1O)").unwrap() {
        IntensityDefinition::Pattern(pattern) => pattern,
        other => panic!("Expected pattern, got {other:?}"),
    };

    let filled = pattern.fill(7 * 60);
    let summary: Vec<(&str, u32)> = filled
        .iter()
        .map(|s| (s.label.as_str(), s.duration_seconds))
        .collect();
    assert_eq!(
        summary,
        vec![
            ("under", 120),
            ("over", 60),
            ("under", 120),
            ("over", 60),
            ("under", 60),
        ]
    );
}

#[test]
fn test_unknown_tokens() {
    let table = IntensityTable::standard();
    for token in [
        "ZZZ",
        "",
        "OU",
        "OU (2X,1O)",
        "SS2",
        "OU (2U)",
        "OU (1O)",
        "OU (1U,1U,1U)",
        "OU (99999999U,1O)",
    ] {
        assert_eq!(
            table.resolve(token),
            Err(IntensityError::UnknownCode(token.trim().to_string())),
            "{token}"
        );
    }
}

#[test]
fn test_codes_listing() {
    let codes = IntensityTable::standard().codes();
    assert_eq!(codes, vec!["CR", "EM", "FP", "PFPI", "PI", "SEPI", "SS", "T"]);
}
