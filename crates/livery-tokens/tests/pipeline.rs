use livery_test_support::fixtures::{
    cyclic_theme, dark_theme, legacy_colors, light_theme, minimal_theme,
};
use livery_tokens::{
    LegacyColorMap, OverrideDocument, SizeClass, TokenDocument, UnresolvedReason,
    audit_contrast, emit_css, flatten, flatten_with_report, from_legacy, is_reference, merge,
    parse_document, parse_overrides, to_legacy, validate_contrast,
};
use serde_json::{Value, json};

#[test]
fn minimal_document_flattens_to_resolved_tokens() -> anyhow::Result<()> {
    let document = parse_document(minimal_theme("t1"))?;
    let flat = flatten(&document);
    assert_eq!(
        Value::from(flat),
        json!({ "primary": "#3498db", "button-bg": "#3498db" })
    );
    Ok(())
}

#[test]
fn flattening_is_deterministic() -> anyhow::Result<()> {
    let document = parse_document(light_theme())?;
    let first = flatten(&document);
    let second = flatten(&document);
    assert_eq!(first, second);
    assert_eq!(emit_css("light", &first), emit_css("light", &second));
    Ok(())
}

#[test]
fn complete_documents_leave_no_dangling_references() -> anyhow::Result<()> {
    for fixture in [light_theme(), dark_theme(), minimal_theme("t1")] {
        let document = parse_document(fixture)?;
        let report = flatten_with_report(&document);
        assert!(report.unresolved.is_empty(), "{:?}", report.unresolved);
        assert!(report.tokens.iter().all(|(_, value)| !is_reference(value)));
    }
    Ok(())
}

#[test]
fn unresolved_tokens_still_emit_one_declaration_each() -> anyhow::Result<()> {
    let document = parse_document(json!({
        "name": "t1",
        "palette": { "blue": "#3498db" },
        "semantic": { "primary": "{palette.blue}", "ghost": "{palette.nope}" },
        "components": {}
    }))?;
    let report = flatten_with_report(&document);
    assert_eq!(report.tokens.len(), 2);
    assert_eq!(report.unresolved.len(), 1);

    let css = emit_css(&document.name, &report.tokens);
    assert_eq!(
        css,
        "[data-theme=\"t1\"] {\n  --ghost: {palette.nope};\n  --primary: #3498db;\n}\n"
    );
    Ok(())
}

#[test]
fn reference_cycles_terminate_and_report_both_sides() -> anyhow::Result<()> {
    let document = parse_document(cyclic_theme())?;
    let report = flatten_with_report(&document);
    assert_eq!(report.tokens.get_str("a"), Some("{semantic.b}"));
    assert_eq!(report.tokens.get_str("b"), Some("{semantic.a}"));
    assert_eq!(report.tokens.get_str("ok"), Some("#ffffff"));
    let tokens: Vec<&str> = report
        .unresolved
        .iter()
        .map(|entry| entry.token.as_str())
        .collect();
    assert_eq!(tokens, ["a", "b"]);
    assert!(
        report
            .unresolved
            .iter()
            .all(|entry| matches!(entry.reference.reason, UnresolvedReason::Cycle { .. }))
    );
    Ok(())
}

#[test]
fn overrides_merge_without_touching_the_base() -> anyhow::Result<()> {
    let base = parse_document(light_theme())?;
    let snapshot = base.clone();
    let overrides = parse_overrides(json!({
        "palette": { "blue": "#0f766e" },
        "components": { "button": { "text": "#000000" } }
    }))?;

    let merged = merge(&base, &overrides);
    assert_eq!(base, snapshot);
    assert_eq!(merge(&base, &OverrideDocument::default()), base);

    let flat = flatten(&merged);
    assert_eq!(flat.get_str("primary"), Some("#0f766e"));
    assert_eq!(flat.get_str("button-bg"), Some("#0f766e"));
    assert_eq!(flat.get_str("button-text"), Some("#000000"));
    assert_eq!(flat.get_str("text"), Some("#1f2933"));
    Ok(())
}

#[test]
fn css_block_lists_every_flat_token() -> anyhow::Result<()> {
    let document = parse_document(light_theme())?;
    let flat = flatten(&document);
    let css = emit_css(&document.name, &flat);
    assert!(css.starts_with("[data-theme=\"light\"] {\n"));
    assert!(css.ends_with("}\n"));
    assert!(css.contains("  --table-header-bg: #f5f7fa;\n"));
    assert!(css.contains("  --text-muted: #52606d;\n"));
    assert_eq!(css.matches(": ").count(), flat.len());
    Ok(())
}

#[test]
fn contrast_scenarios() -> anyhow::Result<()> {
    let strong = validate_contrast("#ffffff", "#000000", SizeClass::Normal)?;
    assert!((strong.ratio - 21.0).abs() < f64::EPSILON);
    assert!(strong.passes);

    let weak = validate_contrast("#777777", "#888888", SizeClass::Normal)?;
    assert!(weak.ratio < 4.5);
    assert!(!weak.passes);
    assert!(weak.note.is_some());

    let swapped = validate_contrast("#888888", "#777777", SizeClass::Normal)?;
    assert!((weak.ratio - swapped.ratio).abs() < f64::EPSILON);
    Ok(())
}

#[test]
fn audit_flags_weak_pairs() -> anyhow::Result<()> {
    let dark = parse_document(dark_theme())?;
    let audit = audit_contrast(&flatten(&dark));
    let menu = audit
        .iter()
        .find(|entry| entry.label == "menu")
        .ok_or_else(|| anyhow::anyhow!("menu pair not audited"))?;
    assert!(!menu.report.passes);
    let button = audit
        .iter()
        .find(|entry| entry.label == "button")
        .ok_or_else(|| anyhow::anyhow!("button pair not audited"))?;
    assert!(button.report.passes);

    let light = parse_document(light_theme())?;
    assert_eq!(audit_contrast(&flatten(&light)).len(), 8);
    Ok(())
}

#[test]
fn legacy_button_keys_survive_a_round_trip() -> anyhow::Result<()> {
    let legacy: LegacyColorMap = serde_json::from_value(json!({
        "color_button": "#3498db",
        "color_button_text": "#ffffff"
    }))?;
    let exported = to_legacy(&from_legacy(&legacy));
    assert_eq!(exported.get("color_button"), Some(&json!("#3498db")));
    assert_eq!(exported.get("color_button_text"), Some(&json!("#ffffff")));
    Ok(())
}

#[test]
fn migrated_documents_flatten_like_native_ones() -> anyhow::Result<()> {
    let legacy: LegacyColorMap = serde_json::from_value(legacy_colors())?;
    let document = from_legacy(&legacy);
    assert_eq!(document.name, "Clasico");
    assert_eq!(document.meta["migrated_from"], json!("legacy"));

    let reparsed: TokenDocument = serde_json::from_value(document.to_json())?;
    assert_eq!(reparsed, document);

    let flat = flatten(&document);
    assert_eq!(flat.get_str("bg"), Some("#fafafa"));
    assert_eq!(flat.get_str("button-bg"), Some("#3498db"));
    assert_eq!(flat.get_str("table-header-text"), Some("#ecf0f1"));
    Ok(())
}

#[test]
fn missing_required_fields_are_structural_errors() {
    let mut payload = minimal_theme("t1");
    if let Some(map) = payload.as_object_mut() {
        map.remove("components");
    }
    let err = parse_document(payload).unwrap_err();
    assert!(err.is_structural());
    assert!(err.detail().contains("components"));
}
