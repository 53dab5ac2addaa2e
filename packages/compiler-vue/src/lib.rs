mod compiler;
mod context;

pub use compiler::{compile_to_vue, VueEmitter, VUE_DEPENDENCY_MAP};
pub use context::{CompileOptions, CompilerContext};

pub use voltron_codegen::{EmitOutput, Emitter, PageIr, Target};

#[cfg(test)]
mod tests;
