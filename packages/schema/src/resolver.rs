//! # Reference Resolver
//!
//! Finds node references embedded inside prop values.
//!
//! A prop such as a Tabs `items` list carries sub-trees in nested fields:
//!
//! ```text
//! items = [ { label: "A", children: {current: "n-7", isText: false} },
//!           { label: "B", children: null } ]
//! pattern "[].children"  ──►  [0].children -> n-7,  [1].children -> empty
//! ```
//!
//! Clone, delete, move, the integrity checker and code generation all go
//! through this module, so embedded refs are treated exactly like entries
//! in a node's `children` list.

use crate::document::PageDocument;
use crate::key_path::{KeyPath, KeyPathPattern};
use crate::node::NodeRef;
use serde_json::Value;
use std::collections::BTreeMap;

/// A position matched by a pattern, occupied or not
#[derive(Debug, Clone, PartialEq)]
pub struct SlotPosition {
    pub path: KeyPath,
    pub node_ref: Option<NodeRef>,
}

/// An occupied slot
#[derive(Debug, Clone, PartialEq)]
pub struct EmbeddedRef {
    pub path: KeyPath,
    pub node_ref: NodeRef,
}

impl EmbeddedRef {
    pub fn id(&self) -> Option<&str> {
        self.node_ref.id()
    }
}

/// Every position inside `value` matched by one of `patterns`.
///
/// Descent stops at the first matched position, so a ref's own fields are
/// never inspected.
pub fn slot_positions(value: &Value, patterns: &[KeyPathPattern]) -> Vec<SlotPosition> {
    let mut positions = Vec::new();
    if !patterns.is_empty() {
        walk(value, KeyPath::root(), patterns, &mut positions);
    }
    positions
}

fn walk(value: &Value, path: KeyPath, patterns: &[KeyPathPattern], out: &mut Vec<SlotPosition>) {
    if patterns.iter().any(|pattern| pattern.matches(&path)) {
        out.push(SlotPosition {
            node_ref: NodeRef::from_value(value),
            path,
        });
        return;
    }

    match value {
        Value::Object(map) => {
            for (key, child) in map {
                walk(child, path.child_key(key), patterns, out);
            }
        }
        Value::Array(items) => {
            for (index, child) in items.iter().enumerate() {
                walk(child, path.child_index(index), patterns, out);
            }
        }
        _ => {}
    }
}

/// Occupied slots inside `value`
pub fn embedded_refs(value: &Value, patterns: &[KeyPathPattern]) -> Vec<EmbeddedRef> {
    slot_positions(value, patterns)
        .into_iter()
        .filter_map(|slot| {
            slot.node_ref.map(|node_ref| EmbeddedRef {
                path: slot.path,
                node_ref,
            })
        })
        .collect()
}

/// Occupied slots of one prop of one node. Missing props resolve to nothing.
pub fn resolve_embedded_refs(doc: &PageDocument, node_id: &str, prop_name: &str) -> Vec<EmbeddedRef> {
    doc.prop(node_id, prop_name)
        .map(|prop| embedded_refs(&prop.value, prop.patterns()))
        .unwrap_or_default()
}

/// Occupied slots across all props of a node, in prop declaration order
pub fn node_embedded_refs(doc: &PageDocument, node_id: &str) -> Vec<(String, EmbeddedRef)> {
    doc.ordered_props(node_id)
        .into_iter()
        .filter(|(_, prop)| prop.has_embedded_refs())
        .flat_map(|(name, prop)| {
            embedded_refs(&prop.value, prop.patterns())
                .into_iter()
                .map(move |embedded| (name.to_string(), embedded))
        })
        .collect()
}

/// Visit every matched position mutably
pub fn map_slots(value: &mut Value, patterns: &[KeyPathPattern], mut f: impl FnMut(&KeyPath, &mut Value)) {
    for slot in slot_positions(value, patterns) {
        if let Some(target) = slot.path.get_mut(value) {
            f(&slot.path, target);
        }
    }
}

/// Point refs at new ids according to `mapping`. Returns the number rewritten.
pub fn rewrite_refs(
    value: &mut Value,
    patterns: &[KeyPathPattern],
    mapping: &BTreeMap<String, String>,
) -> usize {
    let mut rewritten = 0;
    map_slots(value, patterns, |_, slot| {
        let Some(NodeRef::Component {
            id,
            config_name,
            replacement,
            ext,
            bare,
        }) = NodeRef::from_value(slot)
        else {
            return;
        };
        if let Some(new_id) = mapping.get(&id) {
            *slot = NodeRef::Component {
                id: new_id.clone(),
                config_name,
                replacement,
                ext,
                bare,
            }
            .to_value();
            rewritten += 1;
        }
    });
    rewritten
}

/// Empty every slot pointing at `node_id`. Returns whether one was found.
pub fn clear_ref(value: &mut Value, patterns: &[KeyPathPattern], node_id: &str) -> bool {
    let mut cleared = false;
    map_slots(value, patterns, |_, slot| {
        if NodeRef::from_value(slot).is_some_and(|r| r.points_to(node_id)) {
            *slot = Value::Null;
            cleared = true;
        }
    });
    cleared
}
