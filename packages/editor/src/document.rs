//! # Document Handle
//!
//! A page document plus where it lives.
//!
//! Documents can be:
//! - **Memory-backed**: Temporary, for tests or generated pages
//! - **File-backed**: Loaded from and saved to a JSON file on disk
//!
//! ## Lifecycle
//!
//! ```text
//! Load → Edit (transactions) → Save
//!   ↓          ↓                 ↓
//! JSON    PageDocument          JSON
//! ```

use crate::EditorError;
use std::path::{Path, PathBuf};
use tracing::debug;
use voltron_schema::PageDocument;

/// Editable page document
#[derive(Debug)]
pub struct Document {
    /// Path of the JSON file (if any)
    pub path: PathBuf,

    /// Current version number (increments on each recorded change)
    pub version: u64,

    /// Backing storage strategy
    storage: DocumentStorage,
}

/// Storage backend for document
#[derive(Debug)]
pub enum DocumentStorage {
    /// In-memory only
    Memory { page: PageDocument },

    /// File-backed
    File { page: PageDocument, dirty: bool },
}

impl Document {
    /// Wrap an in-memory page
    pub fn new(path: impl Into<PathBuf>, page: PageDocument) -> Self {
        Self {
            path: path.into(),
            version: 0,
            storage: DocumentStorage::Memory { page },
        }
    }

    /// Create document from JSON text (memory-backed)
    pub fn from_json(path: impl Into<PathBuf>, source: &str) -> Result<Self, EditorError> {
        Ok(Self::new(path, PageDocument::from_json(source)?))
    }

    /// Load document from file (file-backed)
    pub fn load(path: impl AsRef<Path>) -> Result<Self, EditorError> {
        let path = path.as_ref().to_path_buf();
        let source = std::fs::read_to_string(&path)?;
        let page = PageDocument::from_json(&source)?;
        debug!(path = %path.display(), nodes = page.nodes.len(), "Loaded document");

        Ok(Self {
            path,
            version: 0,
            storage: DocumentStorage::File { page, dirty: false },
        })
    }

    pub fn page(&self) -> &PageDocument {
        match &self.storage {
            DocumentStorage::Memory { page } | DocumentStorage::File { page, .. } => page,
        }
    }

    /// Mutable page access; marks file-backed documents dirty
    pub fn page_mut(&mut self) -> &mut PageDocument {
        match &mut self.storage {
            DocumentStorage::Memory { page } => page,
            DocumentStorage::File { page, dirty } => {
                *dirty = true;
                page
            }
        }
    }

    /// Record that a change landed
    pub(crate) fn bump_version(&mut self) -> u64 {
        self.version += 1;
        self.version
    }

    /// Check if document has unsaved changes
    pub fn is_dirty(&self) -> bool {
        match &self.storage {
            DocumentStorage::File { dirty, .. } => *dirty,
            _ => false,
        }
    }

    /// Save document to disk (if file-backed)
    pub fn save(&mut self) -> Result<(), EditorError> {
        match &mut self.storage {
            DocumentStorage::File { page, dirty } => {
                std::fs::write(&self.path, page.to_json()?)?;
                *dirty = false;
                debug!(path = %self.path.display(), "Saved document");
                Ok(())
            }
            _ => Err(EditorError::NotFileBacked),
        }
    }

    /// Serialized form of the page
    pub fn to_json(&self) -> Result<String, EditorError> {
        Ok(self.page().to_json()?)
    }
}
