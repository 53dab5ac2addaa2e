use crate::context::{CompileOptions, CompilerContext};
use serde_json::Value;
use tracing::info;
use voltron_codegen::typescript::{
    assignment, function_signature, import_sentence, literal, quote, skeleton,
    skeleton_statement_lines, statement_lines, type_annotation,
};
use voltron_codegen::{
    Analyzer, AttrValue, CodegenError, CodegenResult, EmitOutput, Emitter, ImportMap, PageIr,
    RenderId, RenderKind, Skeleton, Target,
};
use voltron_schema::{ComponentRegistry, ImportKind, PageDocument};

/// React component libraries and their Vue counterparts
pub const VUE_DEPENDENCY_MAP: &[(&str, &str)] = &[("antd", "ant-design-vue")];

/// Emitter for Vue single-file components using `<script setup>`
#[derive(Debug, Clone, Default)]
pub struct VueEmitter {
    pub options: CompileOptions,
}

impl VueEmitter {
    pub fn new(options: CompileOptions) -> Self {
        Self { options }
    }
}

impl Emitter for VueEmitter {
    fn target(&self) -> Target {
        Target::Vue
    }

    fn emit(&self, ir: &PageIr) -> CodegenResult<EmitOutput> {
        let ctx = CompilerContext::new(ir, self.options.clone());

        compile_template(&ctx)?;
        ctx.add("\n");
        compile_script(&ctx);

        info!(page = %ir.page_name, "Generated Vue page");
        Ok(EmitOutput {
            source: ctx.get_output(),
            store: None,
            warnings: ir.warnings.clone(),
        })
    }
}

/// Compile a page document to a Vue single-file component
pub fn compile_to_vue(
    doc: &PageDocument,
    registry: &dyn ComponentRegistry,
    options: CompileOptions,
) -> CodegenResult<EmitOutput> {
    let ir = Analyzer::new(doc, registry).analyze(None)?;
    VueEmitter::new(options).emit(&ir)
}

fn compile_template(ctx: &CompilerContext) -> CodegenResult<()> {
    ctx.add_line("<template>");
    ctx.indent();
    if let Some(root) = ctx.ir.render.root {
        compile_node(ctx, root)?;
    }
    ctx.dedent();
    ctx.add_line("</template>");
    Ok(())
}

fn compile_node(ctx: &CompilerContext, id: RenderId) -> CodegenResult<()> {
    let node = ctx
        .ir
        .render
        .get(id)
        .ok_or_else(|| CodegenError::NodeNotFound(format!("render node {}", id)))?;

    match &node.kind {
        RenderKind::Text(text) => ctx.add_line(&text_content(text)),
        RenderKind::Placeholder { target } => {
            ctx.add_line(&format!("<!-- missing node {} -->", target))
        }
        RenderKind::Element { tag, .. } => {
            let mut attributes = String::new();
            let mut slots: Vec<(RenderId, String)> = Vec::new();
            for attribute in &node.attributes {
                attributes.push(' ');
                attributes.push_str(&compile_attribute(&attribute.name, &attribute.value));
                let spliced = match &attribute.value {
                    AttrValue::Skeleton(value) => Some(value),
                    AttrValue::Binding(binding) => bound_skeleton(ctx.ir, binding),
                    AttrValue::Literal(_) => None,
                };
                if let Some(value) = spliced {
                    slots.extend(value.nodes().into_iter().map(|(id, slot)| (id, slot.to_string())));
                }
            }

            if node.children.is_empty() && slots.is_empty() {
                ctx.add_line(&format!("<{}{} />", tag, attributes));
                return Ok(());
            }

            ctx.add_line(&format!("<{}{}>", tag, attributes));
            ctx.indent();
            for child in &node.children {
                compile_node(ctx, *child)?;
            }
            for (slot_id, slot) in &slots {
                ctx.add_line(&format!("<template #{}>", slot));
                ctx.indent();
                compile_node(ctx, *slot_id)?;
                ctx.dedent();
                ctx.add_line("</template>");
            }
            ctx.dedent();
            ctx.add_line(&format!("</{}>", tag));
        }
    }
    Ok(())
}

fn compile_attribute(name: &str, value: &AttrValue) -> String {
    match value {
        AttrValue::Binding(binding) => match event_name(name) {
            Some(event) => format!("@{}=\"{}\"", event, binding),
            None => format!(":{}=\"{}\"", name, binding),
        },
        AttrValue::Literal(Value::String(s)) => format!("{}=\"{}\"", name, escape_attribute(s)),
        AttrValue::Literal(v) => format!(":{}=\"{}\"", name, escape_attribute(&literal(v))),
        AttrValue::Skeleton(value) => {
            let expression = skeleton_expression(value);
            format!(":{}=\"{}\"", name, escape_attribute(&expression))
        }
    }
}

/// Spliced sub-trees are hoisted into named slots; the literal keeps the slot name
fn skeleton_expression(value: &Skeleton) -> String {
    skeleton(value, &mut |_, slot| quote(slot))
}

/// Initializer of the state or computed value `binding` names
fn bound_skeleton<'a>(ir: &'a PageIr, binding: &str) -> Option<&'a Skeleton> {
    ir.states
        .iter()
        .find(|s| s.name == binding)
        .map(|s| &s.initial)
        .or_else(|| ir.memos.iter().find(|m| m.name == binding).map(|m| &m.value))
}

/// Script code reads refs through `.value`; quoted text is left alone
fn unref(line: &str, refs: &[&str]) -> String {
    if line.trim_start().starts_with("//") {
        return line.to_string();
    }
    let mut out = String::with_capacity(line.len());
    let mut chars = line.char_indices().peekable();
    while let Some((start, c)) = chars.next() {
        if c == '\'' || c == '"' || c == '`' {
            out.push(c);
            while let Some((_, next)) = chars.next() {
                out.push(next);
                if next == '\\' {
                    if let Some((_, escaped)) = chars.next() {
                        out.push(escaped);
                    }
                } else if next == c {
                    break;
                }
            }
            continue;
        }
        if c.is_alphabetic() || c == '_' || c == '$' {
            let mut end = start + c.len_utf8();
            while let Some(&(i, next)) = chars.peek() {
                if next.is_alphanumeric() || next == '_' || next == '$' {
                    end = i + next.len_utf8();
                    chars.next();
                } else {
                    break;
                }
            }
            let word = &line[start..end];
            out.push_str(word);
            let is_member = line[..start].ends_with('.');
            let has_value = line[end..].starts_with(".value");
            if refs.contains(&word) && !is_member && !has_value {
                out.push_str(".value");
            }
            continue;
        }
        out.push(c);
    }
    out
}

/// `onClick` → `click`, `onTabClick` → `tab-click`
fn event_name(attribute: &str) -> Option<String> {
    let rest = attribute.strip_prefix("on")?;
    if !rest.starts_with(|c: char| c.is_ascii_uppercase()) {
        return None;
    }
    let mut event = String::new();
    for (i, c) in rest.chars().enumerate() {
        if c.is_ascii_uppercase() {
            if i > 0 {
                event.push('-');
            }
            event.push(c.to_ascii_lowercase());
        } else {
            event.push(c);
        }
    }
    Some(event)
}

fn escape_attribute(text: &str) -> String {
    text.replace('&', "&amp;").replace('"', "&quot;")
}

fn text_content(text: &str) -> String {
    if text.contains("{{") || text.contains('<') {
        format!("{{{{ {} }}}}", quote(text))
    } else {
        text.to_string()
    }
}

fn vue_module(module: &str) -> &str {
    VUE_DEPENDENCY_MAP
        .iter()
        .find(|(react, _)| *react == module)
        .map(|(_, vue)| *vue)
        .unwrap_or(module)
}

fn compile_script(ctx: &CompilerContext) {
    let ir = ctx.ir;
    if ctx.options.use_typescript {
        ctx.add_line("<script setup lang=\"ts\">");
    } else {
        ctx.add_line("<script setup>");
    }

    let mut imports = ImportMap::default();
    if !ir.states.is_empty() {
        imports.add("vue", ImportKind::Named, "ref");
    }
    if !ir.effects.is_empty() {
        imports.add("vue", ImportKind::Named, "watch");
    }
    if !ir.memos.is_empty() {
        imports.add("vue", ImportKind::Named, "computed");
    }
    for (module, group) in ir.imports.iter() {
        for kind in [ImportKind::Default, ImportKind::Namespace, ImportKind::Named] {
            for name in group.names(kind) {
                imports.add(vue_module(module), kind, name);
            }
        }
    }
    for (module, group) in imports.iter() {
        for kind in [ImportKind::Default, ImportKind::Namespace, ImportKind::Named] {
            if let Some(sentence) = import_sentence(module, kind, group.names(kind)) {
                ctx.add_line(&sentence);
            }
        }
    }

    let has_declarations = !ir.constants.is_empty()
        || !ir.states.is_empty()
        || !ir.memos.is_empty()
        || !ir.callbacks.is_empty()
        || !ir.effects.is_empty();
    if has_declarations {
        ctx.add("\n");
    }

    let refs: Vec<&str> = ir
        .states
        .iter()
        .map(|s| s.name.as_str())
        .chain(ir.memos.iter().map(|m| m.name.as_str()))
        .collect();

    for constant in &ir.constants {
        ctx.writer
            .add_block(&statement_lines(&format!("const {} =", constant.name), &constant.value, ";"));
    }
    for state in &ir.states {
        let annotation = if state.initial.is_null() {
            format!("{} | null", type_annotation(state.value_type))
        } else {
            type_annotation(state.value_type).to_string()
        };
        ctx.add_line(&assignment(
            &state.name,
            &format!("ref{}({})", ctx.type_param(&annotation), skeleton_expression(&state.initial)),
        ));
    }
    for memo in &ir.memos {
        ctx.add_line(&format!("const {} = computed(() => {{", memo.name));
        ctx.indent();
        let lines = skeleton_statement_lines("return", &memo.value, ";", &mut |_, slot| quote(slot));
        ctx.writer.add_block(&lines);
        ctx.dedent();
        ctx.add_line("});");
    }
    for callback in &ir.callbacks {
        ctx.add_line(&format!(
            "const {} = {}",
            callback.name,
            function_signature(None, &callback.params, true, false)
        ));
        ctx.indent();
        for line in &callback.body {
            ctx.add_line(&unref(line, &refs));
        }
        ctx.dedent();
        ctx.add_line("};");
    }
    for effect in &ir.effects {
        let source = match effect.dependencies.as_slice() {
            [single] => single.clone(),
            many => format!("[{}]", many.join(", ")),
        };
        ctx.add_line(&format!("watch({}, () => {{", source));
        ctx.indent();
        for line in &effect.body {
            ctx.add_line(&unref(line, &refs));
        }
        ctx.dedent();
        ctx.add_line("}, { immediate: true });");
    }

    ctx.add_line("</script>");
}
