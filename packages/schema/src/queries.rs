//! Read-only tree queries over a [`PageDocument`].
//!
//! Children are always the union of the `children` list and the refs
//! embedded in props, in that order.

use crate::document::PageDocument;
use crate::key_path::KeyPath;
use crate::node::{Feature, NodeRef};
use crate::resolver::node_embedded_refs;
use std::collections::{BTreeSet, VecDeque};

/// Where the single incoming reference to a node lives
#[derive(Debug, Clone, PartialEq)]
pub enum RefLocation {
    Child {
        parent: String,
        index: usize,
    },
    Embedded {
        parent: String,
        prop: String,
        path: KeyPath,
    },
}

impl RefLocation {
    pub fn parent(&self) -> &str {
        match self {
            RefLocation::Child { parent, .. } | RefLocation::Embedded { parent, .. } => parent,
        }
    }
}

impl PageDocument {
    pub fn parent_of(&self, id: &str) -> Option<&str> {
        self.node(id)?.parent_id.as_deref()
    }

    /// Direct children followed by embedded refs
    pub fn component_children(&self, id: &str) -> Vec<String> {
        let Some(node) = self.node(id) else {
            return Vec::new();
        };
        let mut children: Vec<String> = node.child_ids().map(str::to_string).collect();
        children.extend(
            node_embedded_refs(self, id)
                .into_iter()
                .filter_map(|(_, embedded)| embedded.id().map(str::to_string)),
        );
        children
    }

    /// Parent chain, nearest first
    pub fn ancestors(&self, id: &str) -> Vec<String> {
        let mut chain = Vec::new();
        let mut current = self.parent_of(id);
        while let Some(parent) = current {
            if chain.len() > self.nodes.len() || chain.iter().any(|seen| seen == parent) {
                break;
            }
            chain.push(parent.to_string());
            current = self.parent_of(parent);
        }
        chain
    }

    /// Depth-first descendants, not entering `BlackBox` nodes below `id`
    pub fn descendants(&self, id: &str) -> Vec<String> {
        let mut found = Vec::new();
        self.collect_descendants(id, true, &mut found);
        found
    }

    /// `id` and everything reachable from it, black boxes included
    pub fn subtree(&self, id: &str) -> Vec<String> {
        let mut found = vec![id.to_string()];
        self.collect_descendants(id, false, &mut found);
        found
    }

    fn collect_descendants(&self, id: &str, stop_at_black_box: bool, found: &mut Vec<String>) {
        for child in self.component_children(id) {
            if found.contains(&child) || !self.contains(&child) {
                continue;
            }
            found.push(child.clone());
            if stop_at_black_box && self.feature(&child) == Some(Feature::BlackBox) {
                continue;
            }
            self.collect_descendants(&child, stop_at_black_box, found);
        }
    }

    /// Position among the parent's `children`; `None` for embedded or detached nodes
    pub fn index_in_parent(&self, id: &str, skip_hidden: bool) -> Option<usize> {
        let parent = self.node(self.parent_of(id)?)?;
        let visible = |node_ref: &&NodeRef| {
            !skip_hidden || node_ref.id().map_or(true, |child| !self.hidden.contains(child))
        };
        if skip_hidden && self.hidden.contains(id) {
            return None;
        }
        parent
            .children
            .iter()
            .filter(visible)
            .position(|node_ref| node_ref.points_to(id))
    }

    pub fn is_descendant_of(&self, id: &str, ancestor: &str) -> bool {
        self.ancestors(id).iter().any(|a| a == ancestor)
    }

    pub fn is_ignorable(&self, id: &str) -> bool {
        self.feature(id).is_some_and(Feature::is_ignorable)
    }

    /// Nearest ancestor that is neither a slot nor transparent
    pub fn first_real_ancestor(&self, id: &str) -> Option<String> {
        self.ancestors(id)
            .into_iter()
            .find(|ancestor| !self.is_ignorable(ancestor))
    }

    /// Breadth-first search for the nearest real descendant
    pub fn first_real_descendant(&self, id: &str) -> Option<String> {
        let mut queue: VecDeque<String> = self.component_children(id).into();
        let mut seen = BTreeSet::new();
        while let Some(candidate) = queue.pop_front() {
            if !seen.insert(candidate.clone()) || !self.contains(&candidate) {
                continue;
            }
            if !self.is_ignorable(&candidate) {
                return Some(candidate);
            }
            queue.extend(self.component_children(&candidate));
        }
        None
    }

    pub fn is_in_black_box(&self, id: &str) -> bool {
        self.ancestors(id)
            .iter()
            .any(|ancestor| self.feature(ancestor) == Some(Feature::BlackBox))
    }

    /// Whether the canvas may pick this node up
    pub fn is_draggable(&self, id: &str) -> bool {
        !self.is_in_black_box(id)
            && matches!(
                self.feature(id),
                Some(Feature::Container | Feature::WithSlots | Feature::BlackBox | Feature::Solid)
            )
    }

    /// Find the incoming reference to `id`.
    ///
    /// The recorded parent is checked first; if it holds no ref the whole
    /// document is scanned.
    pub fn locate(&self, id: &str) -> Option<RefLocation> {
        if let Some(location) = self.parent_of(id).and_then(|parent| self.locate_in(parent, id)) {
            return Some(location);
        }
        self.nodes.keys().find_map(|parent| self.locate_in(parent, id))
    }

    fn locate_in(&self, parent: &str, id: &str) -> Option<RefLocation> {
        let node = self.node(parent)?;
        if let Some(index) = node.children.iter().position(|r| r.points_to(id)) {
            return Some(RefLocation::Child {
                parent: parent.to_string(),
                index,
            });
        }
        node_embedded_refs(self, parent)
            .into_iter()
            .find(|(_, embedded)| embedded.node_ref.points_to(id))
            .map(|(prop, embedded)| RefLocation::Embedded {
                parent: parent.to_string(),
                prop,
                path: embedded.path,
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::Node;
    use crate::props::PropValue;
    use crate::KeyPathPattern;
    use serde_json::json;

    /// root -> [slot -> [a], tabs{items[0].children -> x -> [y]}], x is a black box
    fn fixture() -> PageDocument {
        let mut doc = PageDocument::new("q");
        let root = doc.root_id().unwrap().to_string();

        let add = |doc: &mut PageDocument, id: &str, parent: &str, feature: Feature| {
            let mut node = Node::new(id, "c", "html");
            node.parent_id = Some(parent.to_string());
            node.name = id.to_string();
            node.feature = Some(feature);
            doc.nodes.insert(id.to_string(), node);
        };
        add(&mut doc, "slot", root.as_str(), Feature::Slot);
        add(&mut doc, "a", "slot", Feature::Solid);
        add(&mut doc, "tabs", root.as_str(), Feature::WithSlots);
        add(&mut doc, "x", "tabs", Feature::BlackBox);
        add(&mut doc, "y", "x", Feature::Solid);

        let link = |doc: &mut PageDocument, parent: &str, child: &str| {
            doc.nodes
                .get_mut(parent)
                .unwrap()
                .children
                .push(NodeRef::component(child, "c"));
        };
        link(&mut doc, root.as_str(), "slot");
        link(&mut doc, "slot", "a");
        link(&mut doc, root.as_str(), "tabs");
        link(&mut doc, "x", "y");

        let mut items = PropValue::literal(
            "items",
            json!([{ "children": { "current": "x", "isText": false } }, { "children": null }]),
        );
        items.embedded_ref_patterns = Some(vec![KeyPathPattern::parse("[].children").unwrap()]);
        doc.nodes.get_mut("tabs").unwrap().prop_names.push("items".into());
        doc.props
            .entry("tabs".into())
            .or_default()
            .insert("items".into(), items);
        doc
    }

    #[test]
    fn test_component_children_include_embedded() {
        let doc = fixture();
        assert_eq!(doc.component_children("tabs"), vec!["x".to_string()]);
    }

    #[test]
    fn test_descendants_stop_at_black_box() {
        let doc = fixture();
        let root = doc.root_id().unwrap().to_string();
        let descendants = doc.descendants(&root);
        assert!(descendants.contains(&"x".to_string()));
        assert!(!descendants.contains(&"y".to_string()));

        let subtree = doc.subtree(&root);
        assert!(subtree.contains(&"y".to_string()));
    }

    #[test]
    fn test_ancestors_and_descendant_check() {
        let doc = fixture();
        let root = doc.root_id().unwrap().to_string();
        assert_eq!(doc.ancestors("y"), vec!["x".to_string(), "tabs".into(), root.clone()]);
        assert!(doc.is_descendant_of("y", &root));
        assert!(!doc.is_descendant_of("tabs", "y"));
    }

    #[test]
    fn test_index_in_parent_with_hidden() {
        let mut doc = fixture();
        assert_eq!(doc.index_in_parent("tabs", false), Some(1));
        doc.hidden.insert("slot".into());
        assert_eq!(doc.index_in_parent("tabs", true), Some(0));
        assert_eq!(doc.index_in_parent("x", false), None);
    }

    #[test]
    fn test_real_ancestor_and_descendant_skip_slots() {
        let doc = fixture();
        let root = doc.root_id().unwrap().to_string();
        assert_eq!(doc.first_real_ancestor("a"), Some(root.clone()));
        assert_eq!(doc.first_real_descendant("slot"), Some("a".to_string()));
        assert_eq!(doc.first_real_descendant(&root), Some("tabs".to_string()));
    }

    #[test]
    fn test_black_box_and_draggable() {
        let doc = fixture();
        assert!(doc.is_in_black_box("y"));
        assert!(!doc.is_draggable("y"));
        assert!(doc.is_draggable("x"));
        assert!(!doc.is_draggable("slot"));
    }

    #[test]
    fn test_locate() {
        let doc = fixture();
        assert_eq!(
            doc.locate("a"),
            Some(RefLocation::Child {
                parent: "slot".into(),
                index: 0
            })
        );
        match doc.locate("x") {
            Some(RefLocation::Embedded { parent, prop, path }) => {
                assert_eq!(parent, "tabs");
                assert_eq!(prop, "items");
                assert_eq!(path.to_string(), "[0].children");
            }
            other => panic!("unexpected location: {:?}", other),
        }
    }
}
