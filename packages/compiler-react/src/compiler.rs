use crate::context::{CompileOptions, CompilerContext};
use crate::store::{compile_store, store_bindings, STORE_HOOK, STORE_MODULE};
use serde_json::Value;
use tracing::info;
use voltron_codegen::typescript::{
    assignment, dependency_list, function_signature, import_sentence, literal, quote, skeleton,
    skeleton_statement_lines, statement_lines, type_annotation,
};
use voltron_codegen::{
    Analyzer, AttrValue, CallbackDecl, CodegenError, CodegenResult, EffectDecl, EmitOutput,
    Emitter, ImportGroup, ImportMap, MemoDecl, PageIr, RenderId, RenderKind, StateDecl, Target,
};
use voltron_schema::{ComponentRegistry, ImportKind, PageDocument};

/// Emitter for React function components
#[derive(Debug, Clone, Default)]
pub struct ReactEmitter {
    pub options: CompileOptions,
}

impl ReactEmitter {
    pub fn new(options: CompileOptions) -> Self {
        Self { options }
    }
}

impl Emitter for ReactEmitter {
    fn target(&self) -> Target {
        Target::React
    }

    fn emit(&self, ir: &PageIr) -> CodegenResult<EmitOutput> {
        let ctx = CompilerContext::new(ir, self.options.clone());
        let store = if ctx.options.extract_store {
            Some(compile_store(&ctx.with_new_buffer()))
        } else {
            None
        };

        compile_imports(&ctx);
        compile_constants(&ctx);
        compile_component(&ctx)?;

        info!(page = %ir.page_name, store = store.is_some(), "Generated React page");
        Ok(EmitOutput {
            source: ctx.get_output(),
            store,
            warnings: ir.warnings.clone(),
        })
    }
}

/// Compile a page document to a React module
pub fn compile_to_react(
    doc: &PageDocument,
    registry: &dyn ComponentRegistry,
    options: CompileOptions,
) -> CodegenResult<EmitOutput> {
    let ir = Analyzer::new(doc, registry).analyze(None)?;
    ReactEmitter::new(options).emit(&ir)
}

/// React hooks the page module itself calls
fn page_hooks(ctx: &CompilerContext) -> Vec<&'static str> {
    let ir = ctx.ir;
    let in_page = !ctx.options.extract_store;
    let mut hooks = Vec::new();
    if in_page && !ir.states.is_empty() {
        hooks.push("useState");
    }
    if !ir.effects.is_empty() {
        hooks.push("useEffect");
    }
    if in_page && !ir.memos.is_empty() {
        hooks.push("useMemo");
    }
    if !ir.callbacks.is_empty() {
        hooks.push("useCallback");
    }
    hooks
}

fn compile_imports(ctx: &CompilerContext) {
    let mut imports = ImportMap::default();
    imports.add("react", ImportKind::Default, "React");
    for hook in page_hooks(ctx) {
        imports.add("react", ImportKind::Named, hook);
    }
    for (module, group) in ctx.ir.imports.iter() {
        for kind in [ImportKind::Default, ImportKind::Namespace, ImportKind::Named] {
            for name in group.names(kind) {
                imports.add(module, kind, name);
            }
        }
    }
    if ctx.options.extract_store && has_store(ctx.ir) {
        imports.add(STORE_MODULE, ImportKind::Named, STORE_HOOK);
    }

    for (module, group) in imports.iter() {
        if let Some(sentence) = combined_import(module, group) {
            ctx.add_line(&sentence);
            continue;
        }
        for kind in [ImportKind::Default, ImportKind::Namespace, ImportKind::Named] {
            if let Some(sentence) = import_sentence(module, kind, group.names(kind)) {
                ctx.add_line(&sentence);
            }
        }
    }
    ctx.add("\n");
}

/// `import React, { useState } from 'react';` for a single default plus named imports
fn combined_import(module: &str, group: &ImportGroup) -> Option<String> {
    match (group.default.as_slice(), group.named.is_empty(), group.namespace.is_empty()) {
        ([default], false, true) => Some(format!(
            "import {}, {{ {} }} from '{}';",
            default,
            group.named.join(", "),
            module
        )),
        _ => None,
    }
}

pub(crate) fn has_store(ir: &PageIr) -> bool {
    !ir.states.is_empty() || !ir.memos.is_empty()
}

fn compile_constants(ctx: &CompilerContext) {
    for constant in &ctx.ir.constants {
        ctx.writer
            .add_block(&statement_lines(&format!("const {} =", constant.name), &constant.value, ";"));
    }
    if !ctx.ir.constants.is_empty() {
        ctx.add("\n");
    }
}

fn compile_component(ctx: &CompilerContext) -> CodegenResult<()> {
    let ir = ctx.ir;
    ctx.add_line(&format!(
        "export default {}",
        function_signature(Some(&ir.component_name), &[], false, false)
    ));
    ctx.indent();

    if ctx.options.extract_store {
        if has_store(ir) {
            ctx.add_line(&assignment(
                &format!("{{ {} }}", store_bindings(ir).join(", ")),
                &format!("{}()", STORE_HOOK),
            ));
        }
    } else {
        for state in &ir.states {
            compile_state(ctx, state);
        }
        for memo in &ir.memos {
            compile_memo(ctx, memo);
        }
    }
    for callback in &ir.callbacks {
        compile_callback(ctx, callback);
    }
    for effect in &ir.effects {
        compile_effect(ctx, effect);
    }
    if !ir.states.is_empty() || !ir.memos.is_empty() || !ir.callbacks.is_empty() || !ir.effects.is_empty() {
        ctx.add("\n");
    }

    match ir.render.root {
        Some(root) => {
            ctx.add_line("return (");
            ctx.indent();
            compile_node(ctx, root)?;
            ctx.dedent();
            ctx.add_line(");");
        }
        None => ctx.add_line("return null;"),
    }

    ctx.dedent();
    ctx.add_line("}");
    Ok(())
}

pub(crate) fn compile_state(ctx: &CompilerContext, state: &StateDecl) {
    let annotation = if state.initial.is_null() {
        format!("{} | null", type_annotation(state.value_type))
    } else {
        type_annotation(state.value_type).to_string()
    };
    let initial = skeleton(&state.initial, &mut |id, _| inline_node(ctx, id));
    ctx.add_line(&assignment(
        &format!("[{}, {}]", state.name, state.setter),
        &format!("useState{}({})", ctx.type_param(&annotation), initial),
    ));
}

pub(crate) fn compile_memo(ctx: &CompilerContext, memo: &MemoDecl) {
    ctx.add_line(&format!("const {} = useMemo(() => {{", memo.name));
    ctx.indent();
    let lines =
        skeleton_statement_lines("return", &memo.value, ";", &mut |id, _| inline_node(ctx, id));
    ctx.writer.add_block(&lines);
    ctx.dedent();
    ctx.add_line(&format!("}}, {});", dependency_list(&memo.dependencies)));
}

fn compile_callback(ctx: &CompilerContext, callback: &CallbackDecl) {
    let params: Vec<String> = callback
        .params
        .iter()
        .map(|p| typed_param(ctx, p))
        .collect();
    ctx.add_line(&format!(
        "const {} = useCallback({}",
        callback.name,
        function_signature(None, &params, true, false)
    ));
    ctx.indent();
    for line in &callback.body {
        ctx.add_line(line);
    }
    ctx.dedent();
    ctx.add_line(&format!("}}, {});", dependency_list(&callback.dependencies)));
}

fn typed_param(ctx: &CompilerContext, param: &str) -> String {
    if !ctx.options.use_typescript || param.contains(':') {
        return param.to_string();
    }
    if param.starts_with("...") {
        format!("{}: any[]", param)
    } else {
        format!("{}: any", param)
    }
}

fn compile_effect(ctx: &CompilerContext, effect: &EffectDecl) {
    ctx.add_line("useEffect(() => {");
    ctx.indent();
    for line in &effect.body {
        ctx.add_line(line);
    }
    ctx.dedent();
    ctx.add_line(&format!("}}, {});", dependency_list(&effect.dependencies)));
}

fn compile_node(ctx: &CompilerContext, id: RenderId) -> CodegenResult<()> {
    let node = ctx
        .ir
        .render
        .get(id)
        .ok_or_else(|| CodegenError::NodeNotFound(format!("render node {}", id)))?;

    match &node.kind {
        RenderKind::Text(text) => ctx.add_line(&text_content(text)),
        RenderKind::Placeholder { .. } => ctx.add_line("<></>"),
        RenderKind::Element { tag, .. } => {
            let attributes = compile_attributes(ctx, id);
            if node.children.is_empty() {
                ctx.add_line(&format!("<{}{} />", tag, attributes));
            } else {
                ctx.add_line(&format!("<{}{}>", tag, attributes));
                ctx.indent();
                for child in &node.children {
                    compile_node(ctx, *child)?;
                }
                ctx.dedent();
                ctx.add_line(&format!("</{}>", tag));
            }
        }
    }
    Ok(())
}

fn compile_attributes(ctx: &CompilerContext, id: RenderId) -> String {
    let Some(node) = ctx.ir.render.get(id) else {
        return String::new();
    };
    node.attributes
        .iter()
        .map(|attribute| {
            let name = match attribute.name.as_str() {
                "class" => "className",
                other => other,
            };
            format!(" {}={}", name, attribute_value(ctx, &attribute.value))
        })
        .collect()
}

fn attribute_value(ctx: &CompilerContext, value: &AttrValue) -> String {
    match value {
        AttrValue::Literal(Value::String(s)) if !s.contains(['"', '\n', '{', '}']) => {
            format!("\"{}\"", s)
        }
        AttrValue::Literal(v) => format!("{{{}}}", literal(v)),
        AttrValue::Binding(name) => format!("{{{}}}", name),
        AttrValue::Skeleton(value) => {
            let rendered = skeleton(value, &mut |id, _| inline_node(ctx, id));
            format!("{{{}}}", rendered)
        }
    }
}

/// Single-line JSX for a spliced sub-tree
fn inline_node(ctx: &CompilerContext, id: RenderId) -> String {
    let Some(node) = ctx.ir.render.get(id) else {
        return "null".to_string();
    };
    match &node.kind {
        RenderKind::Text(text) => format!("<>{}</>", text_content(text)),
        RenderKind::Placeholder { .. } => "<></>".to_string(),
        RenderKind::Element { tag, .. } => {
            let attributes = compile_attributes(ctx, id);
            if node.children.is_empty() {
                return format!("<{}{} />", tag, attributes);
            }
            let children: String = node
                .children
                .iter()
                .map(|child| match ctx.ir.render.get(*child).map(|n| &n.kind) {
                    Some(RenderKind::Text(text)) => text_content(text),
                    _ => inline_node(ctx, *child),
                })
                .collect();
            format!("<{}{}>{}</{}>", tag, attributes, children, tag)
        }
    }
}

fn text_content(text: &str) -> String {
    if text.contains(['{', '}', '<', '>']) {
        format!("{{{}}}", quote(text))
    } else {
        text.to_string()
    }
}
