//! # Component Registry
//!
//! Static descriptors for the components a page may use, keyed by
//! `(dependency, configName)`. The document model and the code generators
//! only see the [`ComponentRegistry`] trait; [`StaticRegistry`] is the
//! JSON-backed implementation used by the CLI and the tests.

use crate::error::SchemaResult;
use crate::key_path::KeyPathPattern;
use crate::node::Feature;
use crate::props::{PropCategory, PropValue, ValueSource, ValueType};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use tracing::debug;

const BUILTIN_CATALOG: &str = include_str!("../catalog/builtin.json");

/// Dependency name for plain host elements; these need no import
pub const HTML_DEPENDENCY: &str = "html";

/// How a component is brought into scope
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ImportKind {
    /// `import Name from 'module'`
    #[serde(rename = "default")]
    Default,
    /// `import { Name } from 'module'`
    #[default]
    #[serde(rename = "object")]
    Named,
    /// `import * as Name from 'module'`
    #[serde(rename = "*")]
    Namespace,
}

/// Child synthesized when a component is created
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ChildrenPolicy {
    #[default]
    None,
    Text {
        #[serde(default)]
        value: String,
    },
    Slot,
}

/// Default configuration of one prop
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PropConfig {
    #[serde(default)]
    pub value: Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value_type: Option<ValueType>,
    #[serde(default)]
    pub value_source: ValueSource,
    #[serde(default)]
    pub category: PropCategory,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_value: Option<bool>,
    #[serde(
        rename = "templateKeyPathsReg",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub embedded_ref_patterns: Option<Vec<KeyPathPattern>>,
}

impl PropConfig {
    /// Instantiate the prop for a node, using `value` instead of the default
    pub fn to_prop_value(&self, name: &str, value: Value) -> PropValue {
        PropValue {
            name: name.to_string(),
            category: self.category,
            value_type: self.value_type.or_else(|| Some(ValueType::of(&value))),
            value,
            value_source: self.value_source,
            is_value: self.is_value,
            embedded_ref_patterns: self.embedded_ref_patterns.clone(),
            extra: BTreeMap::new(),
            value_omitted: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComponentDescriptor {
    pub config_name: String,
    pub dependency: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub feature: Option<Feature>,
    #[serde(default)]
    pub props_config: BTreeMap<String, PropConfig>,
    #[serde(default)]
    pub children_policy: ChildrenPolicy,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub import_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub calling_name: Option<String>,
    #[serde(default)]
    pub import_type: ImportKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub import_path: Option<String>,
}

impl ComponentDescriptor {
    pub fn feature(&self) -> Feature {
        self.feature.unwrap_or_default()
    }

    /// Name used in markup, e.g. `Typography.Text` or `div`
    pub fn tag_name(&self) -> &str {
        self.calling_name
            .as_deref()
            .or(self.import_name.as_deref())
            .unwrap_or(&self.config_name)
    }

    /// Binding brought into scope by the import
    pub fn import_binding(&self) -> &str {
        self.import_name.as_deref().unwrap_or(&self.config_name)
    }

    /// Module to import from; `None` for host elements
    pub fn import_module(&self) -> Option<&str> {
        if self.dependency == HTML_DEPENDENCY {
            return None;
        }
        Some(self.import_path.as_deref().unwrap_or(&self.dependency))
    }

    /// Prefix for generated display names
    pub fn display_base(&self) -> String {
        match (&self.calling_name, &self.import_name) {
            (Some(calling), _) => calling.replace('.', ""),
            (None, Some(import)) => import.clone(),
            (None, None) => self.config_name.clone(),
        }
    }
}

/// Query contract the core needs from the component catalog
pub trait ComponentRegistry {
    fn lookup(&self, name: &str, dependency: &str) -> Option<&ComponentDescriptor>;

    fn default_values(&self, name: &str, dependency: &str) -> Option<BTreeMap<String, Value>> {
        self.lookup(name, dependency).map(|descriptor| {
            descriptor
                .props_config
                .iter()
                .map(|(key, config)| (key.clone(), config.value.clone()))
                .collect()
        })
    }
}

/// In-memory registry loaded from JSON
#[derive(Debug, Clone, Default)]
pub struct StaticRegistry {
    descriptors: BTreeMap<(String, String), ComponentDescriptor>,
}

impl StaticRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, descriptor: ComponentDescriptor) {
        let key = (descriptor.dependency.clone(), descriptor.config_name.clone());
        self.descriptors.insert(key, descriptor);
    }

    /// Parse a JSON array of descriptors
    pub fn from_json(source: &str) -> SchemaResult<Self> {
        let descriptors: Vec<ComponentDescriptor> = serde_json::from_str(source)?;
        let mut registry = Self::new();
        for descriptor in descriptors {
            registry.register(descriptor);
        }
        debug!(count = registry.len(), "Loaded component registry");
        Ok(registry)
    }

    /// Catalog of html elements and common antd components
    pub fn builtin() -> SchemaResult<Self> {
        Self::from_json(BUILTIN_CATALOG)
    }

    /// Add every descriptor of `other`, replacing duplicates
    pub fn extend(&mut self, other: StaticRegistry) {
        self.descriptors.extend(other.descriptors);
    }

    pub fn len(&self) -> usize {
        self.descriptors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.descriptors.is_empty()
    }

    pub fn descriptors(&self) -> impl Iterator<Item = &ComponentDescriptor> {
        self.descriptors.values()
    }
}

impl ComponentRegistry for StaticRegistry {
    fn lookup(&self, name: &str, dependency: &str) -> Option<&ComponentDescriptor> {
        self.descriptors
            .get(&(dependency.to_string(), name.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_catalog_loads() {
        let registry = StaticRegistry::builtin().unwrap();
        assert!(!registry.is_empty());

        let button = registry.lookup("Button", "antd").unwrap();
        assert_eq!(button.import_module(), Some("antd"));
        assert!(matches!(button.children_policy, ChildrenPolicy::Text { .. }));

        let tabs = registry.lookup("Tabs", "antd").unwrap();
        assert_eq!(tabs.feature(), Feature::WithSlots);
        assert!(tabs.props_config["items"].embedded_ref_patterns.is_some());

        let root = registry.lookup("pageRoot", "html").unwrap();
        assert_eq!(root.import_module(), None);
        assert_eq!(root.tag_name(), "div");
    }

    #[test]
    fn test_default_values() {
        let registry = StaticRegistry::builtin().unwrap();
        let defaults = registry.default_values("Button", "antd").unwrap();
        assert_eq!(defaults["type"], Value::String("primary".into()));
        assert!(registry.default_values("Nope", "antd").is_none());
    }

    #[test]
    fn test_display_base_strips_dots() {
        let registry = StaticRegistry::builtin().unwrap();
        let text = registry.lookup("TypographyText", "antd").unwrap();
        assert_eq!(text.display_base(), "TypographyText");
        assert_eq!(text.tag_name(), "Typography.Text");
        assert_eq!(text.import_binding(), "Typography");
    }

    #[test]
    fn test_lookup_is_keyed_by_dependency() {
        let registry = StaticRegistry::builtin().unwrap();
        assert!(registry.lookup("Button", "html").is_none());
    }
}
