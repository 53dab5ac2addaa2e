//! Companion store module.
//!
//! With `extract_store` set, state and memo declarations move out of the
//! page component into a `usePageStore` hook:
//!
//! ```text
//! store.ts                              index.tsx
//!   export function usePageStore() {      const { input1Value, setInput1Value } = usePageStore();
//!     const [input1Value, ...] = ...
//!     return { input1Value, ... };
//!   }
//! ```

use crate::compiler::{compile_memo, compile_state, has_store};
use crate::context::CompilerContext;
use voltron_codegen::typescript::{function_signature, import_sentence};
use voltron_codegen::PageIr;
use voltron_schema::ImportKind;

pub const STORE_HOOK: &str = "usePageStore";
pub const STORE_MODULE: &str = "./store";

/// Names the store hook returns, states with their setters first
pub fn store_bindings(ir: &PageIr) -> Vec<String> {
    ir.states
        .iter()
        .flat_map(|s| [s.name.clone(), s.setter.clone()])
        .chain(ir.memos.iter().map(|m| m.name.clone()))
        .collect()
}

pub fn compile_store(ctx: &CompilerContext) -> String {
    let ir = ctx.ir;

    let mut hooks = Vec::new();
    if !ir.states.is_empty() {
        hooks.push("useState".to_string());
    }
    if !ir.memos.is_empty() {
        hooks.push("useMemo".to_string());
    }
    if let Some(sentence) = import_sentence("react", ImportKind::Named, &hooks) {
        ctx.add_line(&sentence);
        ctx.add("\n");
    }

    ctx.add_line(&format!(
        "export {}",
        function_signature(Some(STORE_HOOK), &[], false, false)
    ));
    ctx.indent();
    if has_store(ir) {
        for state in &ir.states {
            compile_state(ctx, state);
        }
        for memo in &ir.memos {
            compile_memo(ctx, memo);
        }
        ctx.add("\n");
    }
    let bindings = store_bindings(ir);
    if bindings.is_empty() {
        ctx.add_line("return {};");
    } else {
        ctx.add_line(&format!("return {{ {} }};", bindings.join(", ")));
    }
    ctx.dedent();
    ctx.add_line("}");

    ctx.get_output()
}
