//! # Voltron Editor
//!
//! Document editing engine for Voltron pages.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │ schema: PageDocument, registry, resolver    │
//! └─────────────────────────────────────────────┘
//!                     ↓
//! ┌─────────────────────────────────────────────┐
//! │ editor: Document lifecycle + mutations      │
//! │  - Load/save documents                      │
//! │  - Apply mutations with validation          │
//! │  - Diff-based undo/redo                     │
//! │  - Selection, visibility, change events     │
//! └─────────────────────────────────────────────┘
//!                     ↓
//! ┌─────────────────────────────────────────────┐
//! │ codegen: PageDocument → React / Vue source  │
//! └─────────────────────────────────────────────┘
//! ```
//!
//! ## Core Principles
//!
//! 1. **The page JSON is the source of truth**: selection and visibility are views
//! 2. **History is structural**: undo replays diffs of the persisted JSON
//! 3. **All-or-nothing mutations**: a failed mutation leaves the page untouched
//!
//! ## Usage
//!
//! ```rust,ignore
//! use voltron_editor::{Document, EditSession};
//! use voltron_schema::StaticRegistry;
//!
//! let doc = Document::load("home.json")?;
//! let mut session = EditSession::new(doc, Box::new(StaticRegistry::builtin()?));
//!
//! let root = session.document.page().root_id().unwrap().to_string();
//! let button = session.insert_component(&root, "Button", "antd", None)?;
//! session.clone_and_insert_component(&button.id, &root, None)?;
//! session.undo()?;
//!
//! session.document.save()?;
//! ```

mod diff;
mod document;
mod errors;
mod model;
mod mutations;
mod session;
mod undo_stack;

pub use diff::{Diff, DiffPath};
pub use document::{Document, DocumentStorage};
pub use errors::EditorError;
pub use model::DocumentModel;
pub use mutations::{
    Mutation, MutationError, MutationOutcome, MutationResult, DEFAULT_CLONE_SUFFIX,
};
pub use session::{ChangeEvent, ChangeListener, ChangeOrigin, EditSession, EditorOptions};
pub use undo_stack::{HistoryEntry, UndoStack, DEFAULT_MAX_LEVELS};

// Re-export common types for convenience
pub use voltron_schema::{ComponentRegistry, PageDocument, StaticRegistry};
