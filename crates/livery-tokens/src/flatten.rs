//! Flattening of the `semantic` and `components` layers into resolved tokens.
//!
//! # Design
//! - Only the two public layers are emitted; the palette is reachable through
//!   references but never flattened itself.
//! - Output is an ordered map so consumers see a stable iteration order.

use std::collections::BTreeMap;
use std::collections::btree_map::{self, Entry};

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::warn;

use crate::defaults::{FLAT_KEY_SEPARATOR, MAX_REFERENCE_DEPTH};
use crate::model::{Layer, TokenDocument, TokenGroup, TokenNode};
use crate::reference::{Resolver, UnresolvedReference};

/// Flat token name to resolved literal.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FlatTokenMap(BTreeMap<String, Value>);

impl FlatTokenMap {
    /// Empty map.
    #[must_use]
    pub const fn new() -> Self {
        Self(BTreeMap::new())
    }

    /// Value stored under `key`.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// String value stored under `key`.
    #[must_use]
    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.0.get(key).and_then(Value::as_str)
    }

    /// Insert a token, returning the value it replaced.
    pub fn insert(&mut self, key: impl Into<String>, value: Value) -> Option<Value> {
        self.0.insert(key.into(), value)
    }

    /// Number of tokens.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the map holds no tokens.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterate tokens in key order.
    pub fn iter(&self) -> btree_map::Iter<'_, String, Value> {
        self.0.iter()
    }
}

impl<'a> IntoIterator for &'a FlatTokenMap {
    type Item = (&'a String, &'a Value);
    type IntoIter = btree_map::Iter<'a, String, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl<K: Into<String>> FromIterator<(K, Value)> for FlatTokenMap {
    fn from_iter<T: IntoIterator<Item = (K, Value)>>(iter: T) -> Self {
        Self(iter.into_iter().map(|(key, value)| (key.into(), value)).collect())
    }
}

impl From<FlatTokenMap> for Value {
    fn from(map: FlatTokenMap) -> Self {
        Self::Object(map.0.into_iter().collect())
    }
}

/// Unresolved reference found while flattening, tagged with its flat key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FlatUnresolved {
    /// Flat key of the token carrying the reference.
    pub token: String,
    /// Resolver diagnostic.
    #[serde(flatten)]
    pub reference: UnresolvedReference,
}

/// Flattened tokens plus the diagnostics gathered on the way.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FlattenReport {
    /// Resolved tokens.
    pub tokens: FlatTokenMap,
    /// References left unresolved, in token order.
    pub unresolved: Vec<FlatUnresolved>,
}

/// Build the flat key for a path below a layer.
///
/// Segments are joined with `-` and underscores become dashes.
#[must_use]
pub fn flat_key<S: AsRef<str>>(segments: &[S]) -> String {
    let separator = FLAT_KEY_SEPARATOR.to_string();
    segments
        .iter()
        .map(|segment| segment.as_ref().replace('_', &separator))
        .collect::<Vec<_>>()
        .join(&separator)
}

/// Flatten `document`, substituting unresolved references verbatim.
#[must_use]
pub fn flatten(document: &TokenDocument) -> FlatTokenMap {
    flatten_with_report(document).tokens
}

/// Flatten `document` and collect unresolved-reference diagnostics.
#[must_use]
pub fn flatten_with_report(document: &TokenDocument) -> FlattenReport {
    flatten_with_depth(document, MAX_REFERENCE_DEPTH)
}

/// Flatten with an explicit reference hop limit.
#[must_use]
pub fn flatten_with_depth(document: &TokenDocument, max_depth: usize) -> FlattenReport {
    let resolver = Resolver::new(document).with_max_depth(max_depth);
    let mut report = FlattenReport::default();
    for layer in Layer::FLATTENED {
        let mut trail = Vec::new();
        walk(
            document.layer(layer),
            layer,
            &mut trail,
            &resolver,
            &mut report,
        );
    }
    report
}

fn walk<'a>(
    group: &'a TokenGroup,
    layer: Layer,
    trail: &mut Vec<&'a str>,
    resolver: &Resolver<'_>,
    report: &mut FlattenReport,
) {
    for (name, node) in group {
        trail.push(name);
        match node {
            TokenNode::Group(inner) => walk(inner, layer, trail, resolver, report),
            TokenNode::Value(raw) => {
                let key = flat_key(trail.as_slice());
                let resolution = resolver.resolve(raw);
                if let Some(reference) = resolution.unresolved {
                    report.unresolved.push(FlatUnresolved {
                        token: key.clone(),
                        reference,
                    });
                }
                match report.tokens.0.entry(key) {
                    Entry::Vacant(slot) => {
                        slot.insert(resolution.value);
                    }
                    Entry::Occupied(mut slot) => {
                        warn!(
                            token = %slot.key(),
                            layer = %layer,
                            "flat token key collision; later layer wins"
                        );
                        slot.insert(resolution.value);
                    }
                }
            }
        }
        trail.pop();
    }
}
