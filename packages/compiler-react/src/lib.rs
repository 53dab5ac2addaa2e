mod compiler;
mod context;
mod store;

pub use compiler::{compile_to_react, ReactEmitter};
pub use context::{CompileOptions, CompilerContext};
pub use store::{store_bindings, STORE_HOOK, STORE_MODULE};

// Re-export from codegen crate for convenience
pub use voltron_codegen::{EmitOutput, Emitter, PageIr, Target};

#[cfg(test)]
mod tests;
