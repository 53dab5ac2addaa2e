//! Tests for complex mutation sequences
//!
//! This tests:
//! - Insert + clone + undo + delete chains
//! - Embedded slot ownership across delete and undo
//! - Undo/redo sequences
//! - Document integrity after every step

use serde_json::{json, Value};
use std::collections::BTreeMap;
use voltron_editor::{Document, EditSession, MutationError, PageDocument, StaticRegistry};
use voltron_schema::{check_integrity, NodeRef};

fn new_session() -> (EditSession, String) {
    let page = PageDocument::new("sequences");
    let root = page.root_id().unwrap().to_string();
    let registry = StaticRegistry::builtin().unwrap();
    (
        EditSession::new(Document::new("sequences.json", page), Box::new(registry)),
        root,
    )
}

fn assert_intact(session: &EditSession) {
    let violations = check_integrity(session.document.page());
    assert!(violations.is_empty(), "integrity violations: {:?}", violations);
}

fn child_ids(session: &EditSession, id: &str) -> Vec<String> {
    session
        .document
        .page()
        .node(id)
        .unwrap()
        .child_ids()
        .map(str::to_string)
        .collect()
}

fn patch(entries: &[(&str, Value)]) -> BTreeMap<String, Value> {
    entries
        .iter()
        .map(|(k, v)| (k.to_string(), v.clone()))
        .collect()
}

#[test]
fn test_insert_clone_undo_delete_sequence() {
    let (mut session, root) = new_session();

    let text = session.insert_component(&root, "text", "html", None).unwrap();
    session
        .update_component_props(&text.id, patch(&[("children", json!("hi"))]))
        .unwrap();
    assert_eq!(
        session.document.page().node(&text.id).unwrap().text(),
        Some("hi")
    );

    let button = session.insert_component(&root, "Button", "antd", None).unwrap();
    assert_eq!(button.name, "Button1");
    assert_intact(&session);

    let before_clone = session.document.page().clone();
    let copy = session
        .clone_and_insert_component(&button.id, &root, None)
        .unwrap();
    assert_ne!(copy.id, button.id);
    assert_eq!(copy.name, "Button1_copy");
    assert_eq!(
        child_ids(&session, &root),
        vec![text.id.clone(), button.id.clone(), copy.id.clone()]
    );
    assert_eq!(
        session.document.page().prop(&copy.id, "type").map(|p| &p.value),
        Some(&json!("primary"))
    );
    assert_intact(&session);

    session.undo().unwrap();
    assert_eq!(session.document.page(), &before_clone);
    assert!(!session.document.page().contains(&copy.id));

    session.redo().unwrap();
    assert!(session.document.page().contains(&copy.id));

    let removed = session.delete_component(&button.id).unwrap().unwrap();
    assert_eq!(removed.id, button.id);
    assert_eq!(child_ids(&session, &root), vec![text.id, copy.id]);
    assert!(session.document.page().props.get(&button.id).is_none());
    assert_intact(&session);
}

#[test]
fn test_delete_with_null_slot() {
    let (mut session, root) = new_session();
    let tabs = session.insert_component(&root, "Tabs", "antd", None).unwrap();
    assert_intact(&session);

    let items = session.document.page().prop(&tabs.id, "items").unwrap().value.clone();
    let first = NodeRef::from_value(&items[0]["children"]).unwrap();
    let second = NodeRef::from_value(&items[1]["children"]).unwrap();
    let first_id = first.id().unwrap().to_string();
    let second_id = second.id().unwrap().to_string();

    // Drop the second slot; its container goes with it
    let mut edited = items.clone();
    edited[1]["children"] = Value::Null;
    session
        .update_component_props(&tabs.id, patch(&[("items", edited)]))
        .unwrap();
    assert!(!session.document.page().contains(&second_id));
    assert_intact(&session);

    let inner = session.insert_component(&first_id, "Button", "antd", None).unwrap();

    let removed = session.delete_component(&tabs.id).unwrap();
    assert!(removed.is_some());
    let page = session.document.page();
    assert!(!page.contains(&tabs.id));
    assert!(!page.contains(&first_id));
    assert!(!page.contains(&inner.id));
    assert_eq!(page.nodes.len(), 1);
    assert_intact(&session);

    session.undo().unwrap();
    assert!(session.document.page().contains(&inner.id));
    assert_eq!(session.document.page().parent_of(&first_id), Some(tabs.id.as_str()));
    assert_intact(&session);
}

#[test]
fn test_clone_with_embedded_closure_is_disjoint() {
    let (mut session, root) = new_session();
    let tabs = session.insert_component(&root, "Tabs", "antd", None).unwrap();
    let original: Vec<String> = session.document.page().subtree(&tabs.id);

    let copy = session
        .clone_and_insert_component(&tabs.id, &root, None)
        .unwrap();
    let cloned: Vec<String> = session.document.page().subtree(&copy.id);

    assert_eq!(original.len(), cloned.len());
    assert!(cloned.iter().all(|id| !original.contains(id)));
    for id in &cloned[1..] {
        assert!(session.document.page().is_descendant_of(id, &copy.id));
    }
    assert_intact(&session);
}

#[test]
fn test_move_across_parents_and_undo() {
    let (mut session, root) = new_session();
    let card = session.insert_component(&root, "Card", "antd", None).unwrap();
    let slot = child_ids(&session, &card.id)[0].clone();
    let button = session.insert_component(&root, "Button", "antd", None).unwrap();
    let snapshot = session.document.page().clone();

    session.move_component(&slot, &button.id, None).unwrap();
    assert_eq!(child_ids(&session, &slot), vec![button.id.clone()]);
    assert_eq!(child_ids(&session, &root), vec![card.id.clone()]);
    assert_intact(&session);

    let err = session.move_component(&button.id, &card.id, None).unwrap_err();
    assert_eq!(err.as_mutation(), Some(&MutationError::CycleDetected));

    session.undo().unwrap();
    assert_eq!(session.document.page(), &snapshot);
}

#[test]
fn test_undo_all_then_redo_all() {
    let (mut session, root) = new_session();
    let initial = session.document.page().clone();

    let row = session.insert_component(&root, "row", "html", None).unwrap();
    let input = session.insert_component(&row.id, "Input", "antd", None).unwrap();
    session.rename_component(&input.id, "emailInput").unwrap();
    session
        .update_component_props(&input.id, patch(&[("placeholder", json!("Email"))]))
        .unwrap();
    session.clone_and_insert_component(&row.id, &root, Some(0)).unwrap();
    let last = session.document.page().clone();

    let mut steps = 0;
    while session.undo().unwrap() {
        steps += 1;
        assert_intact(&session);
    }
    assert_eq!(steps, 5);
    assert_eq!(session.document.page(), &initial);

    while session.redo().unwrap() {
        assert_intact(&session);
    }
    assert_eq!(session.document.page(), &last);
}

#[test]
fn test_json_round_trip_after_edits() {
    let (mut session, root) = new_session();
    let tabs = session.insert_component(&root, "Tabs", "antd", None).unwrap();
    session.insert_component(&root, "TypographyText", "antd", None).unwrap();
    session.clone_and_insert_component(&tabs.id, &root, None).unwrap();

    let json = session.document.to_json().unwrap();
    let reloaded = PageDocument::from_json(&json).unwrap();
    assert_eq!(&reloaded, session.document.page());
    assert!(check_integrity(&reloaded).is_empty());
}

/// Small deterministic generator so failures reproduce
struct Lcg(u64);

impl Lcg {
    fn next(&mut self) -> u64 {
        self.0 = self.0.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
        self.0 >> 33
    }

    fn pick<'a>(&mut self, items: &'a [String]) -> &'a str {
        &items[(self.next() as usize) % items.len()]
    }
}

#[test]
fn test_random_sequences_keep_integrity() {
    const CONFIGS: &[(&str, &str)] = &[
        ("row", "html"),
        ("column", "html"),
        ("text", "html"),
        ("Button", "antd"),
        ("Tabs", "antd"),
        ("Card", "antd"),
        ("Select", "antd"),
    ];

    for seed in [1u64, 7, 42, 2024] {
        let (mut session, _) = new_session();
        let mut rng = Lcg(seed);

        for _ in 0..60 {
            let ids: Vec<String> = session.document.page().nodes.keys().cloned().collect();
            let before = session.document.page().clone();

            let result = match rng.next() % 6 {
                0 | 1 => {
                    let (config, dependency) = CONFIGS[(rng.next() as usize) % CONFIGS.len()];
                    let parent = rng.pick(&ids).to_string();
                    session
                        .insert_component(&parent, config, dependency, None)
                        .map(|_| ())
                }
                2 => {
                    let parent = rng.pick(&ids).to_string();
                    let node = rng.pick(&ids).to_string();
                    session
                        .move_component(&parent, &node, Some(0))
                        .map(|_| ())
                }
                3 => {
                    let source = rng.pick(&ids).to_string();
                    let parent = rng.pick(&ids).to_string();
                    session
                        .clone_and_insert_component(&source, &parent, None)
                        .map(|_| ())
                }
                4 => {
                    let node = rng.pick(&ids).to_string();
                    session.delete_component(&node).map(|_| ())
                }
                _ => session.undo().map(|_| ()),
            };

            if result.is_err() {
                assert_eq!(session.document.page(), &before, "seed {}", seed);
            }
            assert_intact(&session);
        }

        while session.undo().unwrap() {
            assert_intact(&session);
        }
        assert_eq!(session.document.page().nodes.len(), 1, "seed {}", seed);
    }
}
