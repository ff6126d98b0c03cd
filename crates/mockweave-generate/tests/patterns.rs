use std::collections::BTreeMap;

use chrono::NaiveDate;
use regex::Regex;
use serde_json::json;

use mockweave_core::PatternSpec;
use mockweave_generate::{GenerateOptions, GeneratedValue, GenerationEngine, GenerationError};

fn engine() -> GenerationEngine {
    GenerationEngine::new(GenerateOptions {
        base_date: NaiveDate::from_ymd_opt(2026, 6, 1),
        ..GenerateOptions::default()
    })
}

fn patterns(value: serde_json::Value) -> BTreeMap<String, PatternSpec> {
    serde_json::from_value(value).expect("parse patterns")
}

#[test]
fn single_value_enum_is_constant() {
    let records = engine()
        .generate_custom(5, &patterns(json!({"tag": {"type": "enum", "value": ["x"]}})), Some(1))
        .expect("generate");
    assert_eq!(records.len(), 5);
    for record in &records {
        assert_eq!(record.get("tag"), Some(&GeneratedValue::Text("x".to_string())));
    }
}

#[test]
fn degenerate_range_is_constant() {
    let records = engine()
        .generate_custom(
            20,
            &patterns(json!({"qty": {"type": "range", "value": {"min": 5, "max": 5}}})),
            Some(2),
        )
        .expect("generate");
    for record in &records {
        assert_eq!(record.get("qty"), Some(&GeneratedValue::Int(5)));
    }
}

#[test]
fn inverted_range_is_rejected() {
    let err = engine()
        .generate_custom(
            3,
            &patterns(json!({"qty": {"type": "range", "value": {"min": 10, "max": 1}}})),
            Some(3),
        )
        .expect_err("inverted range");
    assert!(matches!(err, GenerationError::InvalidRange(_)));
}

#[test]
fn regex_values_match_pattern() {
    let records = engine()
        .generate_custom(
            100,
            &patterns(json!({"code": {"type": "regex", "value": "[A-Z]{3}-[0-9]{2}"}})),
            Some(4),
        )
        .expect("generate");
    let check = Regex::new("^[A-Z]{3}-[0-9]{2}$").expect("regex");
    assert_eq!(records.len(), 100);
    for record in &records {
        let code = record.get("code").and_then(GeneratedValue::as_str).expect("code");
        assert!(check.is_match(code), "{code}");
    }
}

#[test]
fn regex_shorthand_classes_stay_ascii() {
    let records = engine()
        .generate_custom(
            50,
            &patterns(json!({
                "pin": {"type": "regex", "value": r"\d{4}"},
                "handle": {"type": "regex", "value": r"\w+"}
            })),
            Some(1),
        )
        .expect("generate");
    let pin = Regex::new("^[0-9]{4}$").expect("regex");
    let handle = Regex::new("^[A-Za-z0-9_]+$").expect("regex");
    for record in &records {
        let value = record.get("pin").and_then(GeneratedValue::as_str).expect("pin");
        assert!(pin.is_match(value), "{value}");
        let value = record.get("handle").and_then(GeneratedValue::as_str).expect("handle");
        assert!(handle.is_match(value), "{value}");
    }
}

#[test]
fn regex_with_inner_assertions_is_accepted() {
    let records = engine()
        .generate_custom(
            30,
            &patterns(json!({
                "flag": {"type": "regex", "value": "a$|b"},
                "word": {"type": "regex", "value": r"\bword\b"},
                "pair": {"type": "regex", "value": "^(a|b)$"}
            })),
            Some(7),
        )
        .expect("generate");
    for record in &records {
        let flag = record.get("flag").and_then(GeneratedValue::as_str).expect("flag");
        assert!(flag == "a" || flag == "b", "{flag}");
        assert_eq!(record.get("word").and_then(GeneratedValue::as_str), Some("word"));
        let pair = record.get("pair").and_then(GeneratedValue::as_str).expect("pair");
        assert!(pair == "a" || pair == "b", "{pair}");
    }
}

#[test]
fn templates_expand_placeholders() {
    let records = engine()
        .generate_custom(
            10,
            &patterns(json!({
                "invoice": {"type": "template", "value": "INV-{{year}}-{{number:5}}-{{random:3}}-{{other}}"}
            })),
            Some(5),
        )
        .expect("generate");
    let check = Regex::new(r"^INV-2026-[0-9]{5}-[A-Za-z0-9]{3}-\{\{other\}\}$").expect("regex");
    for record in &records {
        let invoice = record.get("invoice").and_then(GeneratedValue::as_str).expect("invoice");
        assert!(check.is_match(invoice), "{invoice}");
    }
}

#[test]
fn precision_range_rounds_values() {
    let records = engine()
        .generate_custom(
            50,
            &patterns(json!({"price": {"type": "range", "value": {"min": 1, "max": 2, "precision": 2}}})),
            Some(6),
        )
        .expect("generate");
    for record in &records {
        let price = record.get("price").and_then(GeneratedValue::as_f64).expect("price");
        assert!((1.0..=2.0).contains(&price));
        assert_eq!((price * 100.0).round() / 100.0, price);
    }
}

#[test]
fn custom_records_are_reproducible_and_numbered() {
    let spec = patterns(json!({
        "sku": {"type": "regex", "value": "^SKU-[0-9]{6}$"},
        "size": {"type": "enum", "value": ["S", "M", "L"]}
    }));
    let a = engine().generate_custom(8, &spec, Some(77)).expect("generate");
    let b = engine().generate_custom(8, &spec, Some(77)).expect("generate");
    let c = engine().generate_custom(8, &spec, Some(78)).expect("generate");
    assert_eq!(a, b);
    assert_ne!(a, c);
    assert_eq!(a[0].id, "record_1");
    assert_eq!(a[7].id, "record_8");
}

#[test]
fn empty_enum_and_bad_regex_are_rejected() {
    let err = engine()
        .generate_custom(1, &patterns(json!({"tag": {"type": "enum", "value": []}})), Some(1))
        .expect_err("empty enum");
    assert!(matches!(err, GenerationError::EmptyEnum { field } if field == "tag"));

    let err = engine()
        .generate_custom(1, &patterns(json!({"code": {"type": "regex", "value": "(unclosed"}})), Some(1))
        .expect_err("bad regex");
    assert!(matches!(err, GenerationError::InvalidPattern(_)));
}

#[test]
fn count_bounds_are_enforced() {
    let spec = patterns(json!({"tag": {"type": "enum", "value": ["x"]}}));
    for count in [0, 10_001] {
        let err = engine()
            .generate_custom(count, &spec, Some(1))
            .expect_err("count out of range");
        assert!(matches!(err, GenerationError::SchemaInvalid(report) if report.has_code("invalid_count")));
    }
    assert_eq!(engine().generate_custom(10_000, &spec, Some(1)).expect("max count").len(), 10_000);
}
