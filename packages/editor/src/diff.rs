//! # Structural Diff
//!
//! Difference between two JSON snapshots of a document, partitioned into
//! added, updated and deleted entries keyed by object path.
//!
//! Objects are compared key by key. Arrays and scalars are compared as a
//! whole, so reordering a `children` list records one update of that list.
//!
//! ```text
//! before {a: 1, b: {c: 2}}     after {b: {c: 3}, d: 4}
//!   deleted  [a]       = 1
//!   updated  [b, c]    = 2 -> 3
//!   added    [d]       = 4
//! ```

use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// Object keys from the document root
pub type DiffPath = Vec<String>;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Diff {
    pub added: BTreeMap<DiffPath, Value>,
    /// `(old, new)` per path
    pub updated: BTreeMap<DiffPath, (Value, Value)>,
    pub deleted: BTreeMap<DiffPath, Value>,
}

impl Diff {
    /// Changes that turn `before` into `after`
    pub fn between(before: &Value, after: &Value) -> Self {
        let mut diff = Diff::default();
        diff.walk(&mut Vec::new(), before, after);
        diff
    }

    fn walk(&mut self, path: &mut DiffPath, before: &Value, after: &Value) {
        match (before, after) {
            (Value::Object(old), Value::Object(new)) => {
                for (key, old_value) in old {
                    path.push(key.clone());
                    match new.get(key) {
                        Some(new_value) => self.walk(path, old_value, new_value),
                        None => {
                            self.deleted.insert(path.clone(), old_value.clone());
                        }
                    }
                    path.pop();
                }
                for (key, new_value) in new {
                    if !old.contains_key(key) {
                        path.push(key.clone());
                        self.added.insert(path.clone(), new_value.clone());
                        path.pop();
                    }
                }
            }
            _ if before != after => {
                self.updated
                    .insert(path.clone(), (before.clone(), after.clone()));
            }
            _ => {}
        }
    }

    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.updated.is_empty() && self.deleted.is_empty()
    }

    /// Number of changed paths
    pub fn len(&self) -> usize {
        self.added.len() + self.updated.len() + self.deleted.len()
    }

    /// Diff that undoes this one
    pub fn inverse(&self) -> Self {
        Diff {
            added: self.deleted.clone(),
            updated: self
                .updated
                .iter()
                .map(|(path, (old, new))| (path.clone(), (new.clone(), old.clone())))
                .collect(),
            deleted: self.added.clone(),
        }
    }

    /// Apply forward onto `target`.
    ///
    /// Missing intermediate objects are created; deleting a missing path is a no-op.
    pub fn apply_to(&self, target: &mut Value) {
        for path in self.deleted.keys() {
            remove_at(target, path);
        }
        for (path, (_, new)) in &self.updated {
            set_at(target, path, new.clone());
        }
        for (path, value) in &self.added {
            set_at(target, path, value.clone());
        }
    }
}

fn remove_at(target: &mut Value, path: &[String]) {
    let Some((last, parents)) = path.split_last() else {
        return;
    };
    let mut current = target;
    for key in parents {
        match current.get_mut(key.as_str()) {
            Some(next) => current = next,
            None => return,
        }
    }
    if let Some(map) = current.as_object_mut() {
        map.remove(last);
    }
}

fn set_at(target: &mut Value, path: &[String], value: Value) {
    let Some((last, parents)) = path.split_last() else {
        *target = value;
        return;
    };
    let mut current = target;
    for key in parents {
        if !current.is_object() {
            *current = Value::Object(Map::new());
        }
        current = match current {
            Value::Object(map) => map
                .entry(key.clone())
                .or_insert_with(|| Value::Object(Map::new())),
            _ => return,
        };
    }
    if !current.is_object() {
        *current = Value::Object(Map::new());
    }
    if let Value::Object(map) = current {
        map.insert(last.clone(), value);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn path(keys: &[&str]) -> DiffPath {
        keys.iter().map(|k| k.to_string()).collect()
    }

    #[test]
    fn test_partitioned_diff() {
        let before = json!({ "a": 1, "b": { "c": 2, "list": [1, 2] } });
        let after = json!({ "b": { "c": 3, "list": [2, 1] }, "d": 4 });
        let diff = Diff::between(&before, &after);

        assert_eq!(diff.deleted.get(&path(&["a"])), Some(&json!(1)));
        assert_eq!(diff.updated.get(&path(&["b", "c"])), Some(&(json!(2), json!(3))));
        assert_eq!(
            diff.updated.get(&path(&["b", "list"])),
            Some(&(json!([1, 2]), json!([2, 1])))
        );
        assert_eq!(diff.added.get(&path(&["d"])), Some(&json!(4)));
        assert_eq!(diff.len(), 4);
    }

    #[test]
    fn test_identical_values_have_empty_diff() {
        let value = json!({ "a": [1, { "b": null }] });
        assert!(Diff::between(&value, &value).is_empty());
    }

    #[test]
    fn test_apply_and_inverse_restore_both_sides() {
        let before = json!({ "a": 1, "nodes": { "x": { "name": "X" } } });
        let after = json!({ "nodes": { "x": { "name": "Y" }, "y": { "name": "Z" } }, "e": [] });
        let diff = Diff::between(&before, &after);

        let mut forward = before.clone();
        diff.apply_to(&mut forward);
        assert_eq!(forward, after);

        let mut backward = after.clone();
        diff.inverse().apply_to(&mut backward);
        assert_eq!(backward, before);
    }

    #[test]
    fn test_apply_creates_missing_parents() {
        let mut diff = Diff::default();
        diff.added.insert(path(&["props", "n1", "type"]), json!("primary"));
        let mut target = json!({});
        diff.apply_to(&mut target);
        assert_eq!(target, json!({ "props": { "n1": { "type": "primary" } } }));
    }
}
