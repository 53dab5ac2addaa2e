//! Tree nodes and the references that link them.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// Structural role of a node
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Feature {
    Root,
    Container,
    Slot,
    #[default]
    Solid,
    Transparent,
    BlackBox,
    WithSlots,
}

impl Feature {
    /// Skipped when looking for the first real ancestor or descendant
    pub fn is_ignorable(self) -> bool {
        matches!(self, Feature::Slot | Feature::Transparent)
    }
}

/// Kind of external substitution recorded on a reference
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ReplacementKind {
    Variable,
    Component,
    Module,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Replacement {
    #[serde(rename = "type")]
    pub kind: ReplacementKind,
    #[serde(rename = "ref")]
    pub target: String,
}

/// A child position: either literal text or a pointer at another node
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "RawNodeRef", into = "RawNodeRef")]
pub enum NodeRef {
    Text(String),
    Component {
        id: String,
        config_name: Option<String>,
        replacement: Option<Replacement>,
        ext: Option<Value>,
        /// Persisted without an `isText` key
        bare: bool,
    },
}

/// Persisted shape: `{current, isText, configName?, ext?, replacement?}`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawNodeRef {
    current: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    is_text: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    config_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    ext: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    replacement: Option<Replacement>,
}

impl From<RawNodeRef> for NodeRef {
    fn from(raw: RawNodeRef) -> Self {
        if raw.is_text == Some(true) {
            NodeRef::Text(raw.current)
        } else {
            NodeRef::Component {
                id: raw.current,
                config_name: raw.config_name,
                replacement: raw.replacement,
                ext: raw.ext,
                bare: raw.is_text.is_none(),
            }
        }
    }
}

impl From<NodeRef> for RawNodeRef {
    fn from(node_ref: NodeRef) -> Self {
        match node_ref {
            NodeRef::Text(text) => RawNodeRef {
                current: text,
                is_text: Some(true),
                config_name: None,
                ext: None,
                replacement: None,
            },
            NodeRef::Component {
                id,
                config_name,
                replacement,
                ext,
                bare,
            } => RawNodeRef {
                current: id,
                is_text: (!bare).then_some(false),
                config_name,
                ext,
                replacement,
            },
        }
    }
}

impl NodeRef {
    pub fn component(id: impl Into<String>, config_name: impl Into<String>) -> Self {
        NodeRef::Component {
            id: id.into(),
            config_name: Some(config_name.into()),
            replacement: None,
            ext: None,
            bare: false,
        }
    }

    pub fn text(text: impl Into<String>) -> Self {
        NodeRef::Text(text.into())
    }

    /// Id of the referenced node, `None` for text leaves
    pub fn id(&self) -> Option<&str> {
        match self {
            NodeRef::Component { id, .. } => Some(id),
            NodeRef::Text(_) => None,
        }
    }

    pub fn is_text(&self) -> bool {
        matches!(self, NodeRef::Text(_))
    }

    pub fn points_to(&self, node_id: &str) -> bool {
        self.id() == Some(node_id)
    }

    /// Interpret a JSON value found inside a prop as a reference.
    ///
    /// Anything without a string `current` field is not a reference; that
    /// covers `null`, `false` and `{}` placeholders in empty slots.
    pub fn from_value(value: &Value) -> Option<Self> {
        let current = value.as_object()?.get("current")?;
        if !current.is_string() {
            return None;
        }
        serde_json::from_value(value.clone()).ok()
    }

    pub fn to_value(&self) -> Value {
        serde_json::to_value(self).unwrap_or(Value::Null)
    }
}

/// One component in the page tree
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Node {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<String>,
    #[serde(default)]
    pub name: String,
    pub config_name: String,
    #[serde(default)]
    pub dependency: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub feature: Option<Feature>,
    #[serde(default)]
    pub children: Vec<NodeRef>,
    #[serde(rename = "propsRefs", default)]
    pub prop_names: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub import_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub calling_name: Option<String>,
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

impl Node {
    pub fn new(id: impl Into<String>, config_name: impl Into<String>, dependency: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            parent_id: None,
            name: String::new(),
            config_name: config_name.into(),
            dependency: dependency.into(),
            feature: None,
            children: Vec::new(),
            prop_names: Vec::new(),
            import_name: None,
            calling_name: None,
            extra: BTreeMap::new(),
        }
    }

    pub fn feature(&self) -> Feature {
        self.feature.unwrap_or_default()
    }

    pub fn to_ref(&self) -> NodeRef {
        NodeRef::component(self.id.clone(), self.config_name.clone())
    }

    /// Ids of direct component children, in order
    pub fn child_ids(&self) -> impl Iterator<Item = &str> {
        self.children.iter().filter_map(NodeRef::id)
    }

    /// The single text child, if the node has exactly one
    pub fn text(&self) -> Option<&str> {
        match self.children.as_slice() {
            [NodeRef::Text(text)] => Some(text),
            _ => None,
        }
    }
}
