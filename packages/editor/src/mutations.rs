//! # Page Mutations
//!
//! High-level semantic operations on a page document.
//!
//! Every mutation is applied through [`DocumentModel`](crate::DocumentModel)
//! inside an undo transaction, so a failed mutation leaves the document
//! exactly as it was.
//!
//! ## Mutation Semantics
//!
//! ### InsertComponent
//! - Creates the component from its registry descriptor
//! - Fails if the parent or the descriptor is missing
//!
//! ### MoveComponent
//! - Detaches the node from its current position (child list or embedded slot)
//! - Index is counted before removal when reordering within one parent
//! - Fails if the move would create a cycle or touch the root
//!
//! ### CloneComponent
//! - Deep-copies the whole closure, embedded refs included, with fresh ids
//!
//! ### DeleteComponent
//! - Cascades through children and embedded refs
//! - Deleting the root is a no-op

use crate::model::DocumentModel;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use thiserror::Error;
use voltron_schema::{ActionSchema, EventBinding, Node, PageDocument};

pub const DEFAULT_CLONE_SUFFIX: &str = "copy";

/// Semantic mutations (intent-preserving operations)
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub enum Mutation {
    /// Create a component and attach it under a parent
    InsertComponent {
        parent_id: String,
        config_name: String,
        dependency: String,
        index: Option<usize>,
    },

    /// Move a node to a new parent at index
    MoveComponent {
        node_id: String,
        new_parent_id: String,
        index: Option<usize>,
    },

    /// Deep-copy a node and attach the copy under a parent
    CloneComponent {
        source_id: String,
        parent_id: String,
        index: Option<usize>,
        suffix: String,
    },

    /// Remove a node and everything it holds
    DeleteComponent { node_id: String },

    /// Overwrite values of props the node already owns
    UpdateProps {
        node_id: String,
        patch: BTreeMap<String, Value>,
    },

    RenameComponent { node_id: String, name: String },

    /// Replace the event bindings of a node
    SetEvents {
        node_id: String,
        events: Vec<EventBinding>,
    },

    AddAction { action: ActionSchema },

    DeleteAction { action_id: String },
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum MutationError {
    #[error("No component config for {name} in {dependency}")]
    ConfigNotFound { name: String, dependency: String },

    #[error("Node not found: {0}")]
    NodeNotFound(String),

    #[error("Parent not found: {0}")]
    ParentNotFound(String),

    #[error("Action not found: {0}")]
    ActionNotFound(String),

    #[error("Root node cannot be moved, cloned or deleted")]
    RootImmutable,

    #[error("Would create cycle")]
    CycleDetected,

    #[error("Invalid structure: {0}")]
    InvalidStructure(String),

    #[error("Name already in use: {0}")]
    NameInUse(String),
}

/// What a successful mutation produced
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MutationOutcome {
    /// Id of the node or action created
    pub created_id: Option<String>,
    /// Root of the removed subtree
    pub removed: Option<Node>,
}

/// Result of applying a mutation through a document or session
#[derive(Debug, Clone, PartialEq)]
pub struct MutationResult {
    /// Document version after the mutation
    pub version: u64,
    /// False when the mutation changed nothing and no undo step was pushed
    pub recorded: bool,
    pub created_id: Option<String>,
    pub removed: Option<Node>,
}

impl Mutation {
    /// Apply mutation with validation
    pub fn apply(&self, model: &mut DocumentModel<'_>) -> Result<MutationOutcome, MutationError> {
        self.validate(model.document())?;

        match self {
            Mutation::InsertComponent {
                parent_id,
                config_name,
                dependency,
                index,
            } => {
                let node = model.insert(parent_id, config_name, dependency, *index)?;
                Ok(MutationOutcome {
                    created_id: Some(node.id),
                    removed: None,
                })
            }

            Mutation::MoveComponent {
                node_id,
                new_parent_id,
                index,
            } => {
                model.move_node(new_parent_id, node_id, *index)?;
                Ok(MutationOutcome::default())
            }

            Mutation::CloneComponent {
                source_id,
                parent_id,
                index,
                suffix,
            } => {
                let node = model.clone_node(source_id, parent_id, *index, suffix)?;
                Ok(MutationOutcome {
                    created_id: Some(node.id),
                    removed: None,
                })
            }

            Mutation::DeleteComponent { node_id } => Ok(MutationOutcome {
                created_id: None,
                removed: model.delete(node_id)?,
            }),

            Mutation::UpdateProps { node_id, patch } => {
                model.update_props(node_id, patch)?;
                Ok(MutationOutcome::default())
            }

            Mutation::RenameComponent { node_id, name } => {
                model.rename(node_id, name)?;
                Ok(MutationOutcome::default())
            }

            Mutation::SetEvents { node_id, events } => {
                model.set_events(node_id, events.clone())?;
                Ok(MutationOutcome::default())
            }

            Mutation::AddAction { action } => Ok(MutationOutcome {
                created_id: Some(model.add_action(action.clone())?),
                removed: None,
            }),

            Mutation::DeleteAction { action_id } => {
                model.delete_action(action_id)?;
                Ok(MutationOutcome::default())
            }
        }
    }

    /// Cheap existence checks done before touching the document
    pub fn validate(&self, doc: &PageDocument) -> Result<(), MutationError> {
        let node_exists = |id: &str| {
            if doc.contains(id) {
                Ok(())
            } else {
                Err(MutationError::NodeNotFound(id.to_string()))
            }
        };
        let parent_exists = |id: &str| {
            if doc.contains(id) {
                Ok(())
            } else {
                Err(MutationError::ParentNotFound(id.to_string()))
            }
        };

        match self {
            Mutation::InsertComponent { parent_id, .. } => parent_exists(parent_id),
            Mutation::MoveComponent {
                node_id,
                new_parent_id,
                ..
            } => {
                node_exists(node_id)?;
                parent_exists(new_parent_id)?;
                if doc.is_root(node_id) {
                    return Err(MutationError::RootImmutable);
                }
                Ok(())
            }
            Mutation::CloneComponent {
                source_id,
                parent_id,
                ..
            } => {
                node_exists(source_id)?;
                parent_exists(parent_id)?;
                if doc.is_root(source_id) {
                    return Err(MutationError::RootImmutable);
                }
                Ok(())
            }
            // Deleting the root is a no-op, not an error
            Mutation::DeleteComponent { node_id } if doc.is_root(node_id) => Ok(()),
            Mutation::DeleteComponent { node_id }
            | Mutation::UpdateProps { node_id, .. }
            | Mutation::RenameComponent { node_id, .. }
            | Mutation::SetEvents { node_id, .. } => node_exists(node_id),
            Mutation::AddAction { .. } => Ok(()),
            Mutation::DeleteAction { action_id } => {
                if doc.actions.contains_key(action_id) {
                    Ok(())
                } else {
                    Err(MutationError::ActionNotFound(action_id.clone()))
                }
            }
        }
    }

    /// Short name used in logs
    pub fn kind(&self) -> &'static str {
        match self {
            Mutation::InsertComponent { .. } => "insert",
            Mutation::MoveComponent { .. } => "move",
            Mutation::CloneComponent { .. } => "clone",
            Mutation::DeleteComponent { .. } => "delete",
            Mutation::UpdateProps { .. } => "update_props",
            Mutation::RenameComponent { .. } => "rename",
            Mutation::SetEvents { .. } => "set_events",
            Mutation::AddAction { .. } => "add_action",
            Mutation::DeleteAction { .. } => "delete_action",
        }
    }
}
