//! # Voltron Schema
//!
//! Data model of a Voltron page: the persisted document, its nodes and
//! props, the component registry contract, and the reference resolver that
//! finds sub-trees embedded inside prop values.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │ PageDocument (arena keyed by node id)                    │
//! │   componentIndexes ── props ── events ── actions         │
//! └──────────┬───────────────────────────────┬───────────────┘
//!            │ children                      │ prop values
//!            ▼                               ▼
//!        NodeRef ◄──── resolver ◄──── KeyPathPattern
//!            ▲
//!            │ lookup(configName, dependency)
//!     ComponentRegistry
//! ```
//!
//! Mutation lives in `voltron-editor`; this crate only reads and validates.

pub mod document;
pub mod error;
pub mod id_generator;
pub mod key_path;
pub mod node;
pub mod props;
pub mod queries;
pub mod registry;
pub mod resolver;
pub mod validate;

pub use document::{PageDocument, ROOT_CONFIG_NAME, ROOT_DEPENDENCY};
pub use error::{SchemaError, SchemaResult};
pub use id_generator::{get_page_seed, IdGenerator};
pub use key_path::{KeyPath, KeyPathPattern, PathSegment};
pub use node::{Feature, Node, NodeRef, Replacement, ReplacementKind};
pub use props::{
    ActionSchema, EventBinding, PropCategory, PropValue, ValueSource, ValueType, VariableInfo,
};
pub use queries::RefLocation;
pub use registry::{
    ChildrenPolicy, ComponentDescriptor, ComponentRegistry, ImportKind, PropConfig,
    StaticRegistry, HTML_DEPENDENCY,
};
pub use resolver::{
    clear_ref, embedded_refs, map_slots, node_embedded_refs, resolve_embedded_refs, rewrite_refs,
    slot_positions, EmbeddedRef, SlotPosition,
};
pub use validate::{check_integrity, IntegrityViolation};
