//! # Voltron Codegen
//!
//! Target-neutral half of page compilation.
//!
//! ```text
//! PageDocument ──► Analyzer (BFS, resolver-aware) ──► PageIr ──► Emitter ──► source
//!                                                        │
//!                                   voltron-compiler-react / voltron-compiler-vue
//! ```
//!
//! Emitters share [`CodeWriter`] for output and [`typescript`] for imports,
//! declarations and literals.

mod analyzer;
mod context;
mod emitter;
mod error;
pub mod ir;
pub mod naming;
pub mod typescript;

pub use analyzer::Analyzer;
pub use context::CodeWriter;
pub use emitter::{EmitOutput, Emitter, Target};
pub use error::{CodegenError, CodegenResult, CodegenWarning};
pub use ir::{
    AttrValue, Attribute, CallbackDecl, ConstantDecl, EffectDecl, ImportGroup, ImportMap,
    MemoDecl, PageIr, RenderId, RenderKind, RenderNode, RenderTree, Skeleton, StateDecl,
};

use voltron_schema::{ComponentRegistry, PageDocument};

/// Analyze `doc` and render it with `emitter`
pub fn generate(
    doc: &PageDocument,
    registry: &dyn ComponentRegistry,
    emitter: &dyn Emitter,
) -> CodegenResult<EmitOutput> {
    let ir = Analyzer::new(doc, registry).analyze(None)?;
    emitter.emit(&ir)
}
