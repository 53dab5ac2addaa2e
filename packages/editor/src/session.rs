//! # Edit Session
//!
//! The mutation surface exposed to the editor UI.
//!
//! An EditSession owns one document, the undo history, the current
//! selection and the change listeners. Every structural operation goes
//! through one transaction path, so history cannot be bypassed.

use crate::document::Document;
use crate::errors::EditorError;
use crate::model::DocumentModel;
use crate::mutations::{Mutation, MutationError, MutationResult, DEFAULT_CLONE_SUFFIX};
use crate::undo_stack::{UndoStack, DEFAULT_MAX_LEVELS};
use serde_json::Value;
use std::collections::BTreeMap;
use tracing::{debug, warn};
use voltron_schema::{ActionSchema, ComponentRegistry, EventBinding, Node};

/// Session options
#[derive(Debug, Clone)]
pub struct EditorOptions {
    /// Maximum number of undo steps kept (0 = unlimited)
    pub max_undo_levels: usize,
}

impl Default for EditorOptions {
    fn default() -> Self {
        Self {
            max_undo_levels: DEFAULT_MAX_LEVELS,
        }
    }
}

/// What caused a document change
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeOrigin {
    Mutation,
    Undo,
    Redo,
}

/// Notification sent to subscribers
#[derive(Debug, Clone, PartialEq)]
pub enum ChangeEvent {
    /// The persisted document changed
    Document { version: u64, origin: ChangeOrigin },
    /// The selected node changed
    Selection { node_id: String },
    /// A node was hidden or shown on the canvas
    Visibility { node_id: String, hidden: bool },
}

pub type ChangeListener = Box<dyn FnMut(&ChangeEvent)>;

/// Single-user edit session
pub struct EditSession {
    /// Document being edited
    pub document: Document,

    registry: Box<dyn ComponentRegistry>,

    undo_stack: UndoStack,

    /// Currently selected node; `None` means the root
    selected: Option<String>,

    listeners: Vec<ChangeListener>,
}

impl EditSession {
    /// Create new edit session
    pub fn new(document: Document, registry: Box<dyn ComponentRegistry>) -> Self {
        Self::with_options(document, registry, EditorOptions::default())
    }

    pub fn with_options(
        document: Document,
        registry: Box<dyn ComponentRegistry>,
        options: EditorOptions,
    ) -> Self {
        Self {
            document,
            registry,
            undo_stack: UndoStack::with_max_levels(options.max_undo_levels),
            selected: None,
            listeners: Vec::new(),
        }
    }

    pub fn registry(&self) -> &dyn ComponentRegistry {
        self.registry.as_ref()
    }

    pub fn undo_stack(&self) -> &UndoStack {
        &self.undo_stack
    }

    /// Register a listener for change events
    pub fn subscribe(&mut self, listener: impl FnMut(&ChangeEvent) + 'static) {
        self.listeners.push(Box::new(listener));
    }

    fn emit(&mut self, event: ChangeEvent) {
        for listener in self.listeners.iter_mut() {
            listener(&event);
        }
    }

    /// Apply a mutation as one undoable step
    pub fn apply(&mut self, mutation: Mutation) -> Result<MutationResult, EditorError> {
        let registry = self.registry.as_ref();
        let result = self.undo_stack.transact_described(
            self.document.page_mut(),
            Some(mutation.kind().to_string()),
            |page| mutation.apply(&mut DocumentModel::new(page, registry)),
        );

        let (outcome, recorded) = match result {
            Ok(applied) => applied,
            Err(e) => {
                warn!(mutation = mutation.kind(), error = %e, "Rejected mutation");
                return Err(e);
            }
        };

        let version = if recorded {
            self.document.bump_version()
        } else {
            self.document.version
        };
        debug!(mutation = mutation.kind(), version, recorded, "Applied mutation");

        // Prop edits can drop slot containers along with whatever they hold
        if recorded {
            self.ensure_selection();
            self.emit(ChangeEvent::Document {
                version,
                origin: ChangeOrigin::Mutation,
            });
        }

        Ok(MutationResult {
            version,
            recorded,
            created_id: outcome.created_id,
            removed: outcome.removed,
        })
    }

    fn created_node(&self, result: &MutationResult) -> Result<Node, EditorError> {
        let id = result.created_id.as_deref().unwrap_or_default();
        self.document
            .page()
            .node(id)
            .cloned()
            .ok_or_else(|| MutationError::NodeNotFound(id.to_string()).into())
    }

    pub fn insert_component(
        &mut self,
        parent_id: &str,
        config_name: &str,
        dependency: &str,
        index: Option<usize>,
    ) -> Result<Node, EditorError> {
        let result = self.apply(Mutation::InsertComponent {
            parent_id: parent_id.to_string(),
            config_name: config_name.to_string(),
            dependency: dependency.to_string(),
            index,
        })?;
        self.created_node(&result)
    }

    pub fn move_component(
        &mut self,
        parent_id: &str,
        node_id: &str,
        index: Option<usize>,
    ) -> Result<MutationResult, EditorError> {
        self.apply(Mutation::MoveComponent {
            node_id: node_id.to_string(),
            new_parent_id: parent_id.to_string(),
            index,
        })
    }

    /// Delete a node; returns `None` for the root
    pub fn delete_component(&mut self, node_id: &str) -> Result<Option<Node>, EditorError> {
        let result = self.apply(Mutation::DeleteComponent {
            node_id: node_id.to_string(),
        })?;
        Ok(result.removed)
    }

    /// Clone `source_id` and attach the copy under `parent_id`
    pub fn clone_and_insert_component(
        &mut self,
        source_id: &str,
        parent_id: &str,
        index: Option<usize>,
    ) -> Result<Node, EditorError> {
        let result = self.apply(Mutation::CloneComponent {
            source_id: source_id.to_string(),
            parent_id: parent_id.to_string(),
            index,
            suffix: DEFAULT_CLONE_SUFFIX.to_string(),
        })?;
        self.created_node(&result)
    }

    pub fn update_component_props(
        &mut self,
        node_id: &str,
        patch: BTreeMap<String, Value>,
    ) -> Result<MutationResult, EditorError> {
        self.apply(Mutation::UpdateProps {
            node_id: node_id.to_string(),
            patch,
        })
    }

    pub fn rename_component(&mut self, node_id: &str, name: &str) -> Result<MutationResult, EditorError> {
        self.apply(Mutation::RenameComponent {
            node_id: node_id.to_string(),
            name: name.to_string(),
        })
    }

    pub fn set_events(
        &mut self,
        node_id: &str,
        events: Vec<EventBinding>,
    ) -> Result<MutationResult, EditorError> {
        self.apply(Mutation::SetEvents {
            node_id: node_id.to_string(),
            events,
        })
    }

    /// Register an action, returning its id
    pub fn add_action(&mut self, action: ActionSchema) -> Result<String, EditorError> {
        let result = self.apply(Mutation::AddAction { action })?;
        Ok(result.created_id.unwrap_or_default())
    }

    pub fn delete_action(&mut self, action_id: &str) -> Result<MutationResult, EditorError> {
        self.apply(Mutation::DeleteAction {
            action_id: action_id.to_string(),
        })
    }

    /// Undo the most recent step; returns false if there was none
    pub fn undo(&mut self) -> Result<bool, EditorError> {
        let undone = self.undo_stack.undo(self.document.page_mut())?;
        if undone {
            self.after_history_step(ChangeOrigin::Undo);
        }
        Ok(undone)
    }

    /// Redo the most recently undone step; returns false if there was none
    pub fn redo(&mut self) -> Result<bool, EditorError> {
        let redone = self.undo_stack.redo(self.document.page_mut())?;
        if redone {
            self.after_history_step(ChangeOrigin::Redo);
        }
        Ok(redone)
    }

    fn after_history_step(&mut self, origin: ChangeOrigin) {
        let version = self.document.bump_version();
        debug!(?origin, version, "Replayed history step");
        self.ensure_selection();
        self.emit(ChangeEvent::Document { version, origin });
    }

    /// Fall back to the root when the selected node no longer exists
    fn ensure_selection(&mut self) {
        let vanished = self
            .selected
            .as_deref()
            .is_some_and(|id| !self.document.page().contains(id));
        if vanished {
            self.selected = None;
            let node_id = self.selected_component().unwrap_or_default().to_string();
            self.emit(ChangeEvent::Selection { node_id });
        }
    }

    pub fn select_component(&mut self, node_id: &str) -> Result<(), EditorError> {
        if !self.document.page().contains(node_id) {
            return Err(MutationError::NodeNotFound(node_id.to_string()).into());
        }
        self.selected = Some(node_id.to_string());
        self.emit(ChangeEvent::Selection {
            node_id: node_id.to_string(),
        });
        Ok(())
    }

    /// Selected node id, the root when nothing else is selected
    pub fn selected_component(&self) -> Option<&str> {
        self.selected
            .as_deref()
            .or_else(|| self.document.page().root_id())
    }

    /// Hide a node on the canvas. Visibility is not part of history.
    pub fn hide_component(&mut self, node_id: &str) -> Result<(), EditorError> {
        self.set_hidden(node_id, true)
    }

    pub fn show_component(&mut self, node_id: &str) -> Result<(), EditorError> {
        self.set_hidden(node_id, false)
    }

    pub fn is_hidden(&self, node_id: &str) -> bool {
        self.document.page().hidden.contains(node_id)
    }

    fn set_hidden(&mut self, node_id: &str, hidden: bool) -> Result<(), EditorError> {
        if !self.document.page().contains(node_id) {
            return Err(MutationError::NodeNotFound(node_id.to_string()).into());
        }
        let page = self.document.page_mut();
        let changed = if hidden {
            page.hidden.insert(node_id.to_string())
        } else {
            page.hidden.remove(node_id)
        };
        if changed {
            self.emit(ChangeEvent::Visibility {
                node_id: node_id.to_string(),
                hidden,
            });
        }
        Ok(())
    }
}
