//! # Undo/Redo Stack
//!
//! Records document history as structural diffs rather than commands.
//!
//! ## Design
//!
//! - Every change runs inside [`UndoStack::transact`]: snapshot, run, snapshot, diff
//! - A failed closure restores the "before" snapshot
//! - An empty diff is not recorded
//! - Undo applies the inverse of the newest diff and moves the diff it
//!   produced onto the redo stack; redo mirrors this
//! - New transactions clear the redo stack
//!
//! ## Example
//!
//! ```rust,ignore
//! let mut stack = UndoStack::new();
//! let (node, recorded) = stack.transact(&mut page, |page| {
//!     DocumentModel::new(page, &registry).insert(&root, "Button", "antd", None)
//! })?;
//!
//! stack.undo(&mut page)?;
//! stack.redo(&mut page)?;
//! ```

use crate::diff::Diff;
use crate::errors::EditorError;
use crate::mutations::MutationError;
use tracing::debug;
use voltron_schema::PageDocument;

pub const DEFAULT_MAX_LEVELS: usize = 100;

/// One recorded history step
#[derive(Debug, Clone)]
pub struct HistoryEntry {
    pub diff: Diff,

    /// Optional description of this step
    pub description: Option<String>,
}

/// Undo/redo stack for document editing
#[derive(Debug)]
pub struct UndoStack {
    /// Applied steps (most recent last)
    undo_stack: Vec<HistoryEntry>,

    /// Undone steps (most recent last)
    redo_stack: Vec<HistoryEntry>,

    /// Maximum number of undo levels (0 = unlimited)
    max_levels: usize,
}

impl UndoStack {
    /// Create a new undo stack with default max levels (100)
    pub fn new() -> Self {
        Self::with_max_levels(DEFAULT_MAX_LEVELS)
    }

    /// Create an undo stack with custom max levels
    pub fn with_max_levels(max_levels: usize) -> Self {
        Self {
            undo_stack: Vec::new(),
            redo_stack: Vec::new(),
            max_levels,
        }
    }

    /// Run `f` against the document and record what it changed.
    ///
    /// Returns the closure's value and whether a history step was pushed.
    pub fn transact<T>(
        &mut self,
        doc: &mut PageDocument,
        f: impl FnOnce(&mut PageDocument) -> Result<T, MutationError>,
    ) -> Result<(T, bool), EditorError> {
        self.transact_described(doc, None, f)
    }

    pub fn transact_described<T>(
        &mut self,
        doc: &mut PageDocument,
        description: Option<String>,
        f: impl FnOnce(&mut PageDocument) -> Result<T, MutationError>,
    ) -> Result<(T, bool), EditorError> {
        let before = doc.to_value()?;

        let value = match f(doc) {
            Ok(value) => value,
            Err(e) => {
                doc.restore_from_value(before)?;
                return Err(e.into());
            }
        };

        let after = doc.to_value()?;
        let diff = Diff::between(&before, &after);
        if diff.is_empty() {
            debug!("Transaction changed nothing");
            return Ok((value, false));
        }

        debug!(changes = diff.len(), "Recorded transaction");
        self.push(HistoryEntry { diff, description });
        Ok((value, true))
    }

    /// Push a step to the undo stack
    fn push(&mut self, entry: HistoryEntry) {
        self.undo_stack.push(entry);

        // Trim if exceeded max levels
        if self.max_levels > 0 && self.undo_stack.len() > self.max_levels {
            self.undo_stack.remove(0);
        }

        // Clear redo stack (new action invalidates future)
        self.redo_stack.clear();
    }

    /// Undo the most recent step
    pub fn undo(&mut self, doc: &mut PageDocument) -> Result<bool, EditorError> {
        let Some(entry) = self.undo_stack.pop() else {
            return Ok(false); // Nothing to undo
        };

        match replay(doc, &entry.diff.inverse()) {
            Ok(reversal) => {
                self.redo_stack.push(HistoryEntry {
                    diff: reversal,
                    description: entry.description,
                });
                Ok(true)
            }
            Err(e) => {
                self.undo_stack.push(entry);
                Err(e)
            }
        }
    }

    /// Redo the most recently undone step
    pub fn redo(&mut self, doc: &mut PageDocument) -> Result<bool, EditorError> {
        let Some(entry) = self.redo_stack.pop() else {
            return Ok(false); // Nothing to redo
        };

        match replay(doc, &entry.diff.inverse()) {
            Ok(forward) => {
                self.undo_stack.push(HistoryEntry {
                    diff: forward,
                    description: entry.description,
                });
                Ok(true)
            }
            Err(e) => {
                self.redo_stack.push(entry);
                Err(e)
            }
        }
    }

    /// Check if undo is available
    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    /// Check if redo is available
    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    /// Get the number of undo levels available
    pub fn undo_levels(&self) -> usize {
        self.undo_stack.len()
    }

    /// Get the number of redo levels available
    pub fn redo_levels(&self) -> usize {
        self.redo_stack.len()
    }

    pub fn max_levels(&self) -> usize {
        self.max_levels
    }

    /// Clear all undo/redo history
    pub fn clear(&mut self) {
        self.undo_stack.clear();
        self.redo_stack.clear();
    }

    /// Get description of the next undo operation
    pub fn undo_description(&self) -> Option<&str> {
        self.undo_stack
            .last()
            .and_then(|entry| entry.description.as_deref())
    }

    /// Get description of the next redo operation
    pub fn redo_description(&self) -> Option<&str> {
        self.redo_stack
            .last()
            .and_then(|entry| entry.description.as_deref())
    }
}

impl Default for UndoStack {
    fn default() -> Self {
        Self::new()
    }
}

/// Apply `diff` to the document and return the diff actually produced
fn replay(doc: &mut PageDocument, diff: &Diff) -> Result<Diff, EditorError> {
    let before = doc.to_value()?;
    let mut after = before.clone();
    diff.apply_to(&mut after);
    doc.restore_from_value(after.clone())?;
    Ok(Diff::between(&before, &after))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::DocumentModel;
    use voltron_schema::StaticRegistry;

    fn setup() -> (PageDocument, StaticRegistry, String) {
        let doc = PageDocument::new("undo");
        let root = doc.root_id().unwrap().to_string();
        (doc, StaticRegistry::builtin().unwrap(), root)
    }

    #[test]
    fn test_undo_stack_creation() {
        let stack = UndoStack::new();
        assert_eq!(stack.undo_levels(), 0);
        assert_eq!(stack.redo_levels(), 0);
        assert_eq!(stack.max_levels(), DEFAULT_MAX_LEVELS);
        assert!(!stack.can_undo());
        assert!(!stack.can_redo());
    }

    #[test]
    fn test_transact_undo_redo() {
        let (mut doc, registry, root) = setup();
        let original = doc.clone();
        let mut stack = UndoStack::new();

        let (node, recorded) = stack
            .transact(&mut doc, |page| {
                DocumentModel::new(page, &registry).insert(&root, "Button", "antd", None)
            })
            .unwrap();
        assert!(recorded);
        let inserted = doc.clone();

        assert!(stack.undo(&mut doc).unwrap());
        assert_eq!(doc, original);
        assert!(!doc.contains(&node.id));
        assert_eq!(stack.redo_levels(), 1);

        assert!(stack.redo(&mut doc).unwrap());
        assert_eq!(doc, inserted);
        assert_eq!(stack.undo_levels(), 1);
        assert_eq!(stack.redo_levels(), 0);
    }

    #[test]
    fn test_empty_diff_is_not_recorded() {
        let (mut doc, _, _) = setup();
        let mut stack = UndoStack::new();
        let (_, recorded) = stack.transact(&mut doc, |_| Ok(())).unwrap();
        assert!(!recorded);
        assert!(!stack.can_undo());
    }

    #[test]
    fn test_failed_transaction_restores_document() {
        let (mut doc, registry, root) = setup();
        let original = doc.clone();
        let mut stack = UndoStack::new();

        let result = stack.transact(&mut doc, |page| {
            let mut model = DocumentModel::new(page, &registry);
            model.insert(&root, "Button", "antd", None)?;
            model.insert("missing", "Button", "antd", None)
        });
        assert!(result.is_err());
        assert_eq!(doc, original);
        assert!(!stack.can_undo());
    }

    #[test]
    fn test_new_transaction_clears_redo() {
        let (mut doc, registry, root) = setup();
        let mut stack = UndoStack::new();
        let insert = |page: &mut PageDocument| {
            DocumentModel::new(page, &registry).insert(&root, "Button", "antd", None)
        };

        stack.transact(&mut doc, insert).unwrap();
        stack.undo(&mut doc).unwrap();
        assert_eq!(stack.redo_levels(), 1);

        stack.transact(&mut doc, insert).unwrap();
        assert_eq!(stack.redo_levels(), 0);
    }

    #[test]
    fn test_max_levels_enforced() {
        let (mut doc, registry, root) = setup();
        let mut stack = UndoStack::with_max_levels(2);
        for _ in 0..3 {
            stack
                .transact(&mut doc, |page| {
                    DocumentModel::new(page, &registry).insert(&root, "Button", "antd", None)
                })
                .unwrap();
        }
        assert_eq!(stack.undo_levels(), 2);
    }

    #[test]
    fn test_description_travels_with_step() {
        let (mut doc, registry, root) = setup();
        let mut stack = UndoStack::new();
        stack
            .transact_described(&mut doc, Some("Add button".into()), |page| {
                DocumentModel::new(page, &registry).insert(&root, "Button", "antd", None)
            })
            .unwrap();
        assert_eq!(stack.undo_description(), Some("Add button"));
        stack.undo(&mut doc).unwrap();
        assert_eq!(stack.redo_description(), Some("Add button"));
    }
}
