//! Validation helpers converting untyped JSON into the typed token model.
//!
//! Every document and override crosses this boundary exactly once; nothing
//! downstream inspects raw JSON shapes.

use serde_json::{Map, Value};
use tracing::debug;

use crate::defaults::CURRENT_SCHEMA_VERSION;
use crate::error::{TokenError, TokenResult};
use crate::model::{Layer, OverrideDocument, TokenDocument, TokenGroup, group_from_map};

/// Top-level keys a token document must carry.
pub const REQUIRED_FIELDS: [&str; 4] = ["name", "palette", "semantic", "components"];

const KNOWN_FIELDS: [&str; 6] = ["name", "version", "meta", "palette", "semantic", "components"];

/// Check that every required top-level key is present.
///
/// # Errors
///
/// Returns [`TokenError::MissingField`] for the first absent key, or
/// [`TokenError::InvalidField`] when the payload is not an object.
pub fn ensure_required_fields(value: &Value) -> TokenResult<()> {
    let map = value
        .as_object()
        .ok_or_else(|| TokenError::invalid_field("$", "must be an object", Some(kind(value))))?;
    for field in REQUIRED_FIELDS {
        if !map.contains_key(field) {
            return Err(TokenError::MissingField { field });
        }
    }
    Ok(())
}

/// Convert a JSON payload into a [`TokenDocument`].
///
/// # Errors
///
/// Returns a structural error when required keys are missing or mistyped.
pub fn parse_document(value: Value) -> TokenResult<TokenDocument> {
    ensure_required_fields(&value)?;
    let Value::Object(mut map) = value else {
        return Err(TokenError::invalid_field("$", "must be an object", None));
    };
    log_unknown_fields(&map, "document");

    let name =
        parse_name(map.remove("name"))?.ok_or(TokenError::MissingField { field: "name" })?;
    let version = parse_version(map.remove("version"))?.unwrap_or(CURRENT_SCHEMA_VERSION);
    let meta = parse_meta(map.remove("meta"))?.unwrap_or_default();
    let palette = parse_layer(Layer::Palette, map.remove(Layer::Palette.as_str()))?;
    let semantic = parse_layer(Layer::Semantic, map.remove(Layer::Semantic.as_str()))?;
    let components = parse_layer(Layer::Components, map.remove(Layer::Components.as_str()))?;

    Ok(TokenDocument {
        name,
        version,
        meta,
        palette,
        semantic,
        components,
    })
}

/// Convert a JSON payload into an [`OverrideDocument`].
///
/// Every key is optional; `null` is treated as an empty override.
///
/// # Errors
///
/// Returns a structural error when a present key is mistyped.
pub fn parse_overrides(value: Value) -> TokenResult<OverrideDocument> {
    let mut map = match value {
        Value::Null => return Ok(OverrideDocument::default()),
        Value::Object(map) => map,
        other => {
            return Err(TokenError::invalid_field(
                "$",
                "must be an object",
                Some(kind(&other)),
            ));
        }
    };
    log_unknown_fields(&map, "override");

    Ok(OverrideDocument {
        name: parse_name(map.remove("name"))?,
        version: parse_version(map.remove("version"))?,
        meta: parse_meta(map.remove("meta"))?,
        palette: parse_layer(Layer::Palette, map.remove(Layer::Palette.as_str()))?,
        semantic: parse_layer(Layer::Semantic, map.remove(Layer::Semantic.as_str()))?,
        components: parse_layer(Layer::Components, map.remove(Layer::Components.as_str()))?,
    })
}

fn parse_name(value: Option<Value>) -> TokenResult<Option<String>> {
    match value {
        None => Ok(None),
        Some(Value::String(name)) if !name.trim().is_empty() => Ok(Some(name)),
        Some(Value::String(_)) => Err(TokenError::invalid_field(
            "name",
            "must not be empty",
            None,
        )),
        Some(other) => Err(TokenError::invalid_field(
            "name",
            "must be a string",
            Some(kind(&other)),
        )),
    }
}

fn parse_version(value: Option<Value>) -> TokenResult<Option<u32>> {
    match value {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Number(number)) => number
            .as_u64()
            .and_then(|raw| u32::try_from(raw).ok())
            .map(Some)
            .ok_or_else(|| {
                TokenError::invalid_field(
                    "version",
                    "must be a non-negative integer",
                    Some(number.to_string()),
                )
            }),
        Some(other) => Err(TokenError::invalid_field(
            "version",
            "must be a non-negative integer",
            Some(kind(&other)),
        )),
    }
}

fn parse_meta(value: Option<Value>) -> TokenResult<Option<Map<String, Value>>> {
    match value {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Object(meta)) => Ok(Some(meta)),
        Some(other) => Err(TokenError::invalid_field(
            "meta",
            "must be an object",
            Some(kind(&other)),
        )),
    }
}

fn parse_layer(layer: Layer, value: Option<Value>) -> TokenResult<TokenGroup> {
    match value {
        None => Ok(TokenGroup::new()),
        Some(Value::Object(map)) => Ok(group_from_map(map)),
        Some(other) => Err(TokenError::invalid_field(
            layer.as_str(),
            "must be an object",
            Some(kind(&other)),
        )),
    }
}

fn log_unknown_fields(map: &Map<String, Value>, scope: &'static str) {
    for key in map.keys() {
        if !KNOWN_FIELDS.contains(&key.as_str()) {
            debug!(scope, field = %key, "ignoring unknown top-level field");
        }
    }
}

fn kind(value: &Value) -> String {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
    .to_string()
}
