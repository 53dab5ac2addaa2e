//! # Page Document
//!
//! The persisted page description: a string-keyed arena of nodes plus the
//! side tables hanging off it.
//!
//! ```text
//! child ──► componentIndexes[root] ──children──► componentIndexes[id] ...
//!                                    props[id]["items"].value ──► embedded refs
//! ```
//!
//! Unknown top-level keys are kept in `extra` so documents written by other
//! tools survive a load/save cycle. The hidden set and the id generator are
//! editor state and never reach disk.

use crate::error::SchemaResult;
use crate::id_generator::IdGenerator;
use crate::node::{Feature, Node, NodeRef};
use crate::props::{ActionSchema, EventBinding, PropValue, VariableInfo};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::{BTreeMap, BTreeSet};

pub const ROOT_CONFIG_NAME: &str = "pageRoot";
pub const ROOT_DEPENDENCY: &str = "html";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageDocument {
    #[serde(rename = "child")]
    pub root: NodeRef,
    #[serde(rename = "componentIndexes", default)]
    pub nodes: BTreeMap<String, Node>,
    #[serde(default)]
    pub props: BTreeMap<String, BTreeMap<String, PropValue>>,
    #[serde(default)]
    pub events: BTreeMap<String, Vec<EventBinding>>,
    #[serde(default)]
    pub actions: BTreeMap<String, ActionSchema>,
    #[serde(rename = "variableDict", default)]
    pub variables: BTreeMap<String, VariableInfo>,
    #[serde(rename = "componentStats", default)]
    pub name_usage_counters: BTreeMap<String, u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub business_replacement: Option<BTreeMap<String, Value>>,
    #[serde(skip)]
    pub hidden: BTreeSet<String>,
    #[serde(skip)]
    ids: IdGenerator,
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

impl PartialEq for PageDocument {
    fn eq(&self, other: &Self) -> bool {
        self.root == other.root
            && self.nodes == other.nodes
            && self.props == other.props
            && self.events == other.events
            && self.actions == other.actions
            && self.variables == other.variables
            && self.name_usage_counters == other.name_usage_counters
            && self.business_replacement == other.business_replacement
            && self.extra == other.extra
    }
}

impl PageDocument {
    /// Create an empty page holding only its root node
    pub fn new(page_name: &str) -> Self {
        let mut ids = IdGenerator::new(page_name);
        let root_id = ids.new_id();

        let mut root = Node::new(root_id.clone(), ROOT_CONFIG_NAME, ROOT_DEPENDENCY);
        root.name = "root".to_string();
        root.feature = Some(Feature::Root);

        let mut extra = BTreeMap::new();
        extra.insert("name".to_string(), Value::String(page_name.to_string()));

        Self {
            root: root.to_ref(),
            nodes: BTreeMap::from([(root_id, root)]),
            props: BTreeMap::new(),
            events: BTreeMap::new(),
            actions: BTreeMap::new(),
            variables: BTreeMap::new(),
            name_usage_counters: BTreeMap::new(),
            business_replacement: None,
            hidden: BTreeSet::new(),
            ids,
            extra,
        }
    }

    pub fn from_json(source: &str) -> SchemaResult<Self> {
        Ok(serde_json::from_str(source)?)
    }

    pub fn from_value(value: Value) -> SchemaResult<Self> {
        Ok(serde_json::from_value(value)?)
    }

    pub fn to_json(&self) -> SchemaResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn to_value(&self) -> SchemaResult<Value> {
        Ok(serde_json::to_value(self)?)
    }

    /// Replace the persisted state with `value`, keeping editor state.
    ///
    /// Hidden entries whose node no longer exists are dropped.
    pub fn restore_from_value(&mut self, value: Value) -> SchemaResult<()> {
        let mut restored = Self::from_value(value)?;
        restored.hidden = std::mem::take(&mut self.hidden)
            .into_iter()
            .filter(|id| restored.nodes.contains_key(id))
            .collect();
        restored.ids = std::mem::take(&mut self.ids);
        *self = restored;
        Ok(())
    }

    /// Page name recorded in the document, if any
    pub fn page_name(&self) -> Option<&str> {
        self.extra
            .get("name")
            .or_else(|| self.extra.get("id"))
            .and_then(Value::as_str)
    }

    pub fn root_id(&self) -> Option<&str> {
        self.root.id()
    }

    pub fn is_root(&self, id: &str) -> bool {
        self.root_id() == Some(id)
    }

    pub fn node(&self, id: &str) -> Option<&Node> {
        self.nodes.get(id)
    }

    pub fn node_mut(&mut self, id: &str) -> Option<&mut Node> {
        self.nodes.get_mut(id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.nodes.contains_key(id)
    }

    pub fn prop(&self, id: &str, name: &str) -> Option<&PropValue> {
        self.props.get(id)?.get(name)
    }

    /// Props of a node in declaration order, followed by any unlisted ones
    pub fn ordered_props(&self, id: &str) -> Vec<(&str, &PropValue)> {
        let Some(props) = self.props.get(id) else {
            return Vec::new();
        };
        let declared: Vec<&str> = self
            .node(id)
            .map(|node| node.prop_names.iter().map(String::as_str).collect())
            .unwrap_or_default();

        let mut ordered: Vec<(&str, &PropValue)> = declared
            .iter()
            .filter_map(|name| props.get_key_value(*name))
            .map(|(name, prop)| (name.as_str(), prop))
            .collect();
        ordered.extend(
            props
                .iter()
                .filter(|(name, _)| !declared.contains(&name.as_str()))
                .map(|(name, prop)| (name.as_str(), prop)),
        );
        ordered
    }

    /// Feature of a node; the root always reports `Root`
    pub fn feature(&self, id: &str) -> Option<Feature> {
        if self.is_root(id) {
            return Some(Feature::Root);
        }
        self.node(id).map(Node::feature)
    }

    pub fn name_in_use(&self, name: &str) -> bool {
        self.nodes.values().any(|node| node.name == name)
    }

    pub fn id_in_use(&self, id: &str) -> bool {
        self.nodes.contains_key(id)
            || self.actions.contains_key(id)
            || self
                .events
                .values()
                .flatten()
                .any(|binding| binding.id == id)
    }

    /// Allocate an id not used by any node, event or action
    pub fn next_id(&mut self) -> String {
        if !self.ids.is_seeded() {
            let page = self.page_name().unwrap_or("page").to_string();
            self.ids = IdGenerator::new(&page);
        }
        let Self {
            ids,
            nodes,
            actions,
            events,
            ..
        } = self;
        ids.new_id_where(|id| {
            nodes.contains_key(id)
                || actions.contains_key(id)
                || events.values().flatten().any(|binding| binding.id == id)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample() -> Value {
        json!({
            "child": { "current": "r", "isText": false, "configName": "pageRoot" },
            "componentIndexes": {
                "r": {
                    "id": "r",
                    "name": "root",
                    "configName": "pageRoot",
                    "dependency": "html",
                    "feature": "root",
                    "children": [{ "current": "a", "isText": false, "configName": "text" }],
                    "propsRefs": []
                },
                "a": {
                    "id": "a",
                    "parentId": "r",
                    "name": "text1",
                    "configName": "text",
                    "dependency": "html",
                    "children": [{ "current": "hi", "isText": true }],
                    "propsRefs": ["style"]
                }
            },
            "props": {
                "a": { "style": { "name": "style", "category": "style", "value": {}, "valueSource": "editorInput" } }
            },
            "events": {},
            "actions": {},
            "variableDict": {},
            "componentStats": { "text": 1 },
            "businessReplacement": {},
            "name": "home",
            "version": 3
        })
    }

    #[test]
    fn test_round_trip_preserves_json() {
        let raw = sample();
        let doc = PageDocument::from_value(raw.clone()).unwrap();
        assert_eq!(doc.root_id(), Some("r"));
        assert_eq!(doc.page_name(), Some("home"));
        assert_eq!(doc.to_value().unwrap(), raw);

        let reparsed = PageDocument::from_json(&doc.to_json().unwrap()).unwrap();
        assert_eq!(reparsed, doc);
    }

    #[test]
    fn test_omitted_keys_stay_omitted() {
        let raw: Value = serde_json::from_str(include_str!("../../../fixtures/tab-case.json")).unwrap();
        let doc = PageDocument::from_value(raw.clone()).unwrap();
        assert_eq!(doc.business_replacement, None);
        assert_eq!(doc.to_value().unwrap(), raw);

        let mut sparse = sample();
        sparse.as_object_mut().unwrap().remove("businessReplacement");
        sparse["child"] = json!({ "current": "r", "configName": "pageRoot" });
        sparse["props"]["a"]["style"] = json!({ "name": "style", "category": "style", "valueSource": "editorInput" });
        let doc = PageDocument::from_value(sparse.clone()).unwrap();
        assert_eq!(doc.prop("a", "style").map(|p| &p.value), Some(&Value::Null));
        assert_eq!(doc.to_value().unwrap(), sparse);
    }

    #[test]
    fn test_new_document_has_root() {
        let doc = PageDocument::new("home");
        let root_id = doc.root_id().unwrap();
        assert_eq!(doc.feature(root_id), Some(Feature::Root));
        assert_eq!(doc.nodes.len(), 1);
    }

    #[test]
    fn test_next_id_skips_existing() {
        let mut doc = PageDocument::new("home");
        let root_id = doc.root_id().unwrap().to_string();
        let id = doc.next_id();
        assert_ne!(id, root_id);
        assert!(!doc.id_in_use(&id));
    }

    #[test]
    fn test_restore_keeps_hidden_of_surviving_nodes() {
        let mut doc = PageDocument::from_value(sample()).unwrap();
        doc.hidden.insert("a".into());
        doc.hidden.insert("gone".into());

        let snapshot = doc.to_value().unwrap();
        doc.restore_from_value(snapshot).unwrap();
        assert!(doc.hidden.contains("a"));
        assert!(!doc.hidden.contains("gone"));
    }

    #[test]
    fn test_ordered_props_follow_declaration() {
        let mut doc = PageDocument::from_value(sample()).unwrap();
        doc.props
            .get_mut("a")
            .unwrap()
            .insert("alpha".into(), PropValue::literal("alpha", json!(1)));
        let names: Vec<&str> = doc.ordered_props("a").into_iter().map(|(n, _)| n).collect();
        assert_eq!(names, vec!["style", "alpha"]);
    }
}
