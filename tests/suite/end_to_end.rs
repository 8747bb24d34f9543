//! Default rule engine driven through the public facade.

use timex_core::{Normalizer, OutputFormat};

#[test]
fn relative_expressions_against_fixed_anchor() {
    let normalizer = Normalizer::new().unwrap();
    let cases = [
        ("tomorrow", "2024-01-02"),
        ("yesterday", "2023-12-31"),
        ("next week", "2024-W02"),
        ("last month", "2023-12"),
        ("next year", "2025"),
        ("Christmas", "2024-12-25"),
    ];
    for (text, expected) in cases {
        assert_eq!(
            normalizer.normalize_on(text, 2024, 1, 1).unwrap(),
            expected,
            "{text}"
        );
    }
}

#[test]
fn absolute_expressions_ignore_anchor() {
    let normalizer = Normalizer::new().unwrap();
    assert_eq!(
        normalizer.normalize_on("5/13, 2012", 2024, 1, 1).unwrap(),
        "2012-05-13"
    );
    assert_eq!(
        normalizer.normalize_on("March, 2000", 1990, 6, 1).unwrap(),
        "2000-03"
    );
}

#[test]
fn structured_output() {
    let normalizer = Normalizer::builder()
        .output_format(OutputFormat::Structured)
        .build()
        .unwrap();
    assert!(!normalizer.is_simple_format());
    assert_eq!(
        normalizer.normalize_at("noon", 2024, 1, 1, 9, 0).unwrap(),
        "TimeSpan(2024-01-01T12:00Z,2024-01-01T13:00Z,Period(Map(Hours -> 1),Exact),Exact)"
    );
}

#[test]
fn repeated_calls_are_deterministic() {
    let normalizer = Normalizer::new().unwrap();
    let first = normalizer.normalize_on("last week", 2024, 1, 1).unwrap();
    for _ in 0..5 {
        assert_eq!(
            normalizer.normalize_on("last week", 2024, 1, 1).unwrap(),
            first
        );
    }
    assert_eq!(first, "2023-W52");
}
