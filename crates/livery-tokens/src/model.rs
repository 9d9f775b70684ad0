//! Typed token documents and override payloads.
//!
//! # Design
//! - Pure data carriers; untyped JSON only enters through `validate.rs`.
//! - Groups are ordered maps so every walk over a document is deterministic.

use std::collections::BTreeMap;
use std::fmt::{self, Display, Formatter};

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{TokenError, TokenResult};
use crate::validate::{parse_document, parse_overrides};

/// Ordered mapping from token name to node.
pub type TokenGroup = BTreeMap<String, TokenNode>;

/// A node inside one of the document layers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "Value", into = "Value")]
pub enum TokenNode {
    /// Nested group of named nodes.
    Group(TokenGroup),
    /// Leaf value: any JSON value that is not an object (arrays are leaves).
    Value(Value),
}

impl TokenNode {
    /// Borrow the nested group when this node is one.
    #[must_use]
    pub const fn as_group(&self) -> Option<&TokenGroup> {
        match self {
            Self::Group(group) => Some(group),
            Self::Value(_) => None,
        }
    }

    /// Borrow the leaf value when this node is one.
    #[must_use]
    pub const fn as_value(&self) -> Option<&Value> {
        match self {
            Self::Group(_) => None,
            Self::Value(value) => Some(value),
        }
    }
}

impl From<Value> for TokenNode {
    fn from(value: Value) -> Self {
        match value {
            Value::Object(map) => Self::Group(group_from_map(map)),
            other => Self::Value(other),
        }
    }
}

impl From<TokenNode> for Value {
    fn from(node: TokenNode) -> Self {
        match node {
            TokenNode::Group(group) => Self::Object(group_to_map(group)),
            TokenNode::Value(value) => value,
        }
    }
}

pub(crate) fn group_from_map(map: Map<String, Value>) -> TokenGroup {
    map.into_iter()
        .map(|(key, value)| (key, TokenNode::from(value)))
        .collect()
}

pub(crate) fn group_to_map(group: TokenGroup) -> Map<String, Value> {
    group
        .into_iter()
        .map(|(key, node)| (key, Value::from(node)))
        .collect()
}

/// The three token layers of a document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Layer {
    /// Raw literal values; only ever referenced.
    Palette,
    /// Abstract roles bound to palette values or other roles.
    Semantic,
    /// Per-component slots bound to roles or palette values.
    Components,
}

impl Layer {
    /// Every layer in document order.
    pub const ALL: [Self; 3] = [Self::Palette, Self::Semantic, Self::Components];
    /// Layers emitted by the flattener.
    pub const FLATTENED: [Self; 2] = [Self::Semantic, Self::Components];

    /// Render the layer as its document key.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Palette => "palette",
            Self::Semantic => "semantic",
            Self::Components => "components",
        }
    }

    /// Map a document key back to its layer.
    #[must_use]
    pub fn from_segment(segment: &str) -> Option<Self> {
        match segment {
            "palette" => Some(Self::Palette),
            "semantic" => Some(Self::Semantic),
            "components" => Some(Self::Components),
            _ => None,
        }
    }
}

impl Display for Layer {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.as_str())
    }
}

/// Dotted address of a node, rooted at one of the layers.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TokenPath {
    /// Layer the path starts in.
    pub layer: Layer,
    /// Segments below the layer.
    pub segments: Vec<String>,
}

impl TokenPath {
    /// Build a path from a layer and its segments.
    #[must_use]
    pub fn new<I, S>(layer: Layer, segments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            layer,
            segments: segments.into_iter().map(Into::into).collect(),
        }
    }

    /// Parse `layer.segment.segment`.
    ///
    /// # Errors
    ///
    /// Returns the first segment when it does not name a layer.
    pub fn parse(dotted: &str) -> Result<Self, String> {
        let mut parts = dotted.split('.');
        let first = parts.next().unwrap_or_default();
        let layer = Layer::from_segment(first).ok_or_else(|| first.to_string())?;
        Ok(Self::new(layer, parts))
    }
}

impl Display for TokenPath {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.layer.as_str())?;
        for segment in &self.segments {
            write!(formatter, ".{segment}")?;
        }
        Ok(())
    }
}

/// A complete three-layer theme document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Value", into = "Value")]
pub struct TokenDocument {
    /// Unique theme identifier.
    pub name: String,
    /// Schema version of the document.
    pub version: u32,
    /// Free-form attributes passed through untouched.
    pub meta: Map<String, Value>,
    /// Raw palette values.
    pub palette: TokenGroup,
    /// Semantic roles.
    pub semantic: TokenGroup,
    /// Component bindings.
    pub components: TokenGroup,
}

impl TokenDocument {
    /// Parse and validate a document from JSON text.
    ///
    /// # Errors
    ///
    /// Returns [`TokenError::Json`] for malformed JSON and a structural error
    /// when required fields are missing or mistyped.
    pub fn from_json_str(text: &str) -> TokenResult<Self> {
        let value: Value = serde_json::from_str(text)?;
        parse_document(value)
    }

    /// Render the document back into its JSON shape.
    #[must_use]
    pub fn to_json(&self) -> Value {
        Value::from(self.clone())
    }

    /// Borrow one of the layers.
    #[must_use]
    pub const fn layer(&self, layer: Layer) -> &TokenGroup {
        match layer {
            Layer::Palette => &self.palette,
            Layer::Semantic => &self.semantic,
            Layer::Components => &self.components,
        }
    }

    pub(crate) fn layer_mut(&mut self, layer: Layer) -> &mut TokenGroup {
        match layer {
            Layer::Palette => &mut self.palette,
            Layer::Semantic => &mut self.semantic,
            Layer::Components => &mut self.components,
        }
    }

    /// Look up the node addressed by `path`.
    #[must_use]
    pub fn lookup(&self, path: &TokenPath) -> Option<&TokenNode> {
        let (first, rest) = path.segments.split_first()?;
        let mut node = self.layer(path.layer).get(first)?;
        for segment in rest {
            node = node.as_group()?.get(segment)?;
        }
        Some(node)
    }

    /// Place a leaf at `path`, creating intermediate groups as needed.
    ///
    /// A leaf sitting where a group is required is replaced by a group.
    pub(crate) fn set_value(&mut self, path: &TokenPath, value: Value) {
        let Some((last, parents)) = path.segments.split_last() else {
            return;
        };
        let mut group = self.layer_mut(path.layer);
        for segment in parents {
            let slot = group
                .entry(segment.clone())
                .or_insert_with(|| TokenNode::Group(TokenGroup::new()));
            if slot.as_group().is_none() {
                *slot = TokenNode::Group(TokenGroup::new());
            }
            group = match slot {
                TokenNode::Group(inner) => inner,
                TokenNode::Value(_) => return,
            };
        }
        group.insert(last.clone(), TokenNode::Value(value));
    }

    /// Whether `meta.dark` marks this as a dark theme.
    #[must_use]
    pub fn is_dark(&self) -> bool {
        self.meta.get("dark").and_then(Value::as_bool).unwrap_or(false)
    }
}

impl TryFrom<Value> for TokenDocument {
    type Error = TokenError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        parse_document(value)
    }
}

impl From<TokenDocument> for Value {
    fn from(document: TokenDocument) -> Self {
        let mut map = Map::new();
        map.insert("name".to_string(), Self::String(document.name));
        map.insert("version".to_string(), Self::from(document.version));
        map.insert("meta".to_string(), Self::Object(document.meta));
        map.insert(
            Layer::Palette.as_str().to_string(),
            Self::Object(group_to_map(document.palette)),
        );
        map.insert(
            Layer::Semantic.as_str().to_string(),
            Self::Object(group_to_map(document.semantic)),
        );
        map.insert(
            Layer::Components.as_str().to_string(),
            Self::Object(group_to_map(document.components)),
        );
        Self::Object(map)
    }
}

/// Partial document applied on top of a base via deep merge.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Value", into = "Value")]
pub struct OverrideDocument {
    /// Replacement theme name.
    pub name: Option<String>,
    /// Replacement schema version.
    pub version: Option<u32>,
    /// Attributes deep-merged into the base `meta`.
    pub meta: Option<Map<String, Value>>,
    /// Palette overrides.
    pub palette: TokenGroup,
    /// Semantic overrides.
    pub semantic: TokenGroup,
    /// Component overrides.
    pub components: TokenGroup,
}

impl OverrideDocument {
    /// Parse an override payload from JSON text.
    ///
    /// # Errors
    ///
    /// Returns an error for malformed JSON or mistyped layers.
    pub fn from_json_str(text: &str) -> TokenResult<Self> {
        let value: Value = serde_json::from_str(text)?;
        parse_overrides(value)
    }

    /// Whether applying this override would change nothing.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.version.is_none()
            && self.meta.as_ref().is_none_or(Map::is_empty)
            && self.palette.is_empty()
            && self.semantic.is_empty()
            && self.components.is_empty()
    }

    /// Borrow one of the override layers.
    #[must_use]
    pub const fn layer(&self, layer: Layer) -> &TokenGroup {
        match layer {
            Layer::Palette => &self.palette,
            Layer::Semantic => &self.semantic,
            Layer::Components => &self.components,
        }
    }
}

impl TryFrom<Value> for OverrideDocument {
    type Error = TokenError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        parse_overrides(value)
    }
}

impl From<OverrideDocument> for Value {
    fn from(overrides: OverrideDocument) -> Self {
        let mut map = Map::new();
        if let Some(name) = overrides.name {
            map.insert("name".to_string(), Self::String(name));
        }
        if let Some(version) = overrides.version {
            map.insert("version".to_string(), Self::from(version));
        }
        if let Some(meta) = overrides.meta {
            map.insert("meta".to_string(), Self::Object(meta));
        }
        for (layer, group) in [
            (Layer::Palette, overrides.palette),
            (Layer::Semantic, overrides.semantic),
            (Layer::Components, overrides.components),
        ] {
            if !group.is_empty() {
                map.insert(layer.as_str().to_string(), Self::Object(group_to_map(group)));
            }
        }
        Self::Object(map)
    }
}
