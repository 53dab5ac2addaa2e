use crate::document::PageDocument;
use crate::node::Feature;
use crate::resolver::node_embedded_refs;
use std::collections::BTreeMap;
use thiserror::Error;

/// A broken structural invariant found in a document
#[derive(Error, Debug, Clone, PartialEq)]
pub enum IntegrityViolation {
    #[error("Root reference does not point at a node")]
    MissingRoot,

    #[error("Root node {id} has feature {found:?}")]
    RootFeature { id: String, found: Feature },

    #[error("Root node {id} is referenced by {holder}")]
    RootReferenced { id: String, holder: String },

    #[error("Node {holder} references missing node {target}")]
    DanglingReference { holder: String, target: String },

    #[error("Node {id} is not referenced by any parent")]
    Unreferenced { id: String },

    #[error("Node {id} is referenced {count} times")]
    MultipleReferences { id: String, count: usize },

    #[error("Node {id} records parent {recorded:?} but is held by {holder}")]
    ParentMismatch {
        id: String,
        recorded: Option<String>,
        holder: String,
    },

    #[error("Display name '{name}' is shared by {ids:?}")]
    DuplicateName { name: String, ids: Vec<String> },

    #[error("Side table entry for missing node {id}")]
    OrphanEntry { id: String },
}

/// Check the structural invariants of a document, returning every violation
pub fn check_integrity(doc: &PageDocument) -> Vec<IntegrityViolation> {
    let mut violations = Vec::new();

    let root_id = match doc.root_id().filter(|id| doc.contains(id)) {
        Some(id) => id,
        None => {
            violations.push(IntegrityViolation::MissingRoot);
            ""
        }
    };

    if let Some(found) = doc.node(root_id).and_then(|root| root.feature) {
        if found != Feature::Root {
            violations.push(IntegrityViolation::RootFeature {
                id: root_id.to_string(),
                found,
            });
        }
    }

    let embedded: Vec<(String, String)> = doc
        .nodes
        .keys()
        .flat_map(|holder| {
            node_embedded_refs(doc, holder)
                .into_iter()
                .filter_map(move |(_, embedded)| {
                    embedded.id().map(|target| (holder.clone(), target.to_string()))
                })
        })
        .collect();

    // target id -> holders
    let mut incoming: BTreeMap<&str, Vec<&str>> = BTreeMap::new();
    for node in doc.nodes.values() {
        for child in node.child_ids() {
            incoming.entry(child).or_default().push(&node.id);
        }
    }
    for (holder, target) in &embedded {
        incoming.entry(target).or_default().push(holder);
    }

    for (target, holders) in &incoming {
        if !doc.contains(target) {
            for holder in holders {
                violations.push(IntegrityViolation::DanglingReference {
                    holder: holder.to_string(),
                    target: target.to_string(),
                });
            }
        }
    }

    for node in doc.nodes.values() {
        let holders = incoming.get(node.id.as_str()).map(Vec::as_slice).unwrap_or(&[]);
        if node.id == root_id {
            if let Some(holder) = holders.first() {
                violations.push(IntegrityViolation::RootReferenced {
                    id: node.id.clone(),
                    holder: holder.to_string(),
                });
            }
            continue;
        }
        match holders {
            [] => violations.push(IntegrityViolation::Unreferenced { id: node.id.clone() }),
            [holder] => {
                if node.parent_id.as_deref() != Some(*holder) {
                    violations.push(IntegrityViolation::ParentMismatch {
                        id: node.id.clone(),
                        recorded: node.parent_id.clone(),
                        holder: holder.to_string(),
                    });
                }
            }
            many => violations.push(IntegrityViolation::MultipleReferences {
                id: node.id.clone(),
                count: many.len(),
            }),
        }
    }

    let mut by_name: BTreeMap<&str, Vec<String>> = BTreeMap::new();
    for node in doc.nodes.values().filter(|node| !node.name.is_empty()) {
        by_name.entry(&node.name).or_default().push(node.id.clone());
    }
    for (name, ids) in by_name {
        if ids.len() > 1 {
            violations.push(IntegrityViolation::DuplicateName {
                name: name.to_string(),
                ids,
            });
        }
    }

    for id in doc.props.keys().chain(doc.events.keys()) {
        if !doc.contains(id) {
            violations.push(IntegrityViolation::OrphanEntry { id: id.clone() });
        }
    }

    violations
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::{Node, NodeRef};

    fn with_child() -> (PageDocument, String) {
        let mut doc = PageDocument::new("v");
        let root = doc.root_id().unwrap().to_string();
        let mut child = Node::new("c1", "text", "html");
        child.name = "text1".into();
        child.parent_id = Some(root.clone());
        doc.nodes.insert("c1".into(), child);
        doc.nodes
            .get_mut(&root)
            .unwrap()
            .children
            .push(NodeRef::component("c1", "text"));
        (doc, root)
    }

    #[test]
    fn test_clean_document() {
        let (doc, _) = with_child();
        assert!(check_integrity(&doc).is_empty());
    }

    #[test]
    fn test_dangling_and_unreferenced() {
        let (mut doc, root) = with_child();
        doc.nodes
            .get_mut(&root)
            .unwrap()
            .children
            .push(NodeRef::component("ghost", "text"));
        let mut orphan = Node::new("o", "text", "html");
        orphan.name = "text2".into();
        doc.nodes.insert("o".into(), orphan);

        let violations = check_integrity(&doc);
        assert!(violations.contains(&IntegrityViolation::DanglingReference {
            holder: root,
            target: "ghost".into()
        }));
        assert!(violations.contains(&IntegrityViolation::Unreferenced { id: "o".into() }));
    }

    #[test]
    fn test_parent_mismatch_and_duplicate_names() {
        let (mut doc, root) = with_child();
        doc.nodes.get_mut("c1").unwrap().parent_id = Some("elsewhere".into());
        doc.nodes.get_mut(&root).unwrap().name = "text1".into();

        let violations = check_integrity(&doc);
        assert!(violations
            .iter()
            .any(|v| matches!(v, IntegrityViolation::ParentMismatch { id, .. } if id == "c1")));
        assert!(violations
            .iter()
            .any(|v| matches!(v, IntegrityViolation::DuplicateName { name, .. } if name == "text1")));
    }

    #[test]
    fn test_double_reference() {
        let (mut doc, root) = with_child();
        doc.nodes
            .get_mut(&root)
            .unwrap()
            .children
            .push(NodeRef::component("c1", "text"));
        let violations = check_integrity(&doc);
        assert_eq!(
            violations,
            vec![IntegrityViolation::MultipleReferences {
                id: "c1".into(),
                count: 2
            }]
        );
    }
}
