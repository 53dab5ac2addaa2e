//! # Analyzer
//!
//! Walks a page breadth-first and lowers it into a [`PageIr`].
//!
//! ## Prop lowering
//!
//! | source / shape                         | lowered to                      |
//! |----------------------------------------|---------------------------------|
//! | literal, basic                         | inline attribute                |
//! | literal, non-basic, with embedded refs | skeleton with spliced sub-trees |
//! | literal, non-basic                     | constant                        |
//! | handler                                | callback                        |
//! | computed                               | memo                            |
//! | state / userInput                      | state seeded with the literal   |
//! | `isValue`                              | state plus an effect keyed on it|
//!
//! States and memos seeded from a prop with embedded refs get a skeleton
//! initializer, so their sub-trees are rendered too.
//!
//! `children` and `hidden` category props never reach the output. Event
//! bindings become callbacks and take precedence over a prop of the same
//! name.

use crate::error::{CodegenError, CodegenResult, CodegenWarning};
use crate::ir::{
    AttrValue, Attribute, CallbackDecl, ConstantDecl, EffectDecl, MemoDecl, PageIr, RenderId,
    RenderKind, RenderNode, Skeleton, StateDecl,
};
use crate::naming::{to_camel_case, to_pascal_case, NameAllocator};
use crate::typescript;
use serde_json::Value;
use std::collections::{BTreeMap, BTreeSet, VecDeque};
use tracing::{debug, info, instrument, warn};
use voltron_schema::{
    embedded_refs, ComponentRegistry, EventBinding, ImportKind, KeyPath, Node, NodeRef,
    PageDocument, PathSegment, PropCategory, PropValue, ValueSource, ValueType, HTML_DEPENDENCY,
};

/// Identifiers the generated module already uses
const RESERVED_NAMES: &[&str] = &[
    "React", "useState", "useEffect", "useMemo", "useCallback", "ref", "watch", "computed",
    "props", "usePageStore",
];

const DEFAULT_PAGE_NAME: &str = "index";

pub struct Analyzer<'a> {
    doc: &'a PageDocument,
    registry: &'a dyn ComponentRegistry,
    names: NameAllocator,
    ir: PageIr,
    queue: VecDeque<(String, RenderId)>,
    unknown_components: BTreeSet<(String, String)>,
}

impl<'a> Analyzer<'a> {
    pub fn new(doc: &'a PageDocument, registry: &'a dyn ComponentRegistry) -> Self {
        let mut names = NameAllocator::new();
        names.reserve(RESERVED_NAMES.iter().copied());
        Self {
            doc,
            registry,
            names,
            ir: PageIr::default(),
            queue: VecDeque::new(),
            unknown_components: BTreeSet::new(),
        }
    }

    /// Lower the page, or only the sub-tree under `root`
    #[instrument(skip(self), fields(nodes = self.doc.nodes.len()))]
    pub fn analyze(mut self, root: Option<&str>) -> CodegenResult<PageIr> {
        let root_id = match root {
            Some(id) if self.doc.contains(id) => id.to_string(),
            Some(id) => return Err(CodegenError::NodeNotFound(id.to_string())),
            None => self
                .doc
                .root_id()
                .filter(|id| self.doc.contains(id))
                .ok_or(CodegenError::MissingRoot)?
                .to_string(),
        };

        let page_name = self.doc.page_name().unwrap_or(DEFAULT_PAGE_NAME).to_string();
        info!(page = %page_name, root = %root_id, "Starting page analysis");
        self.ir.component_name = component_name(&page_name);
        self.ir.page_name = page_name;

        self.declare_variables();

        let root_render = self.element(&root_id);
        self.ir.render.root = Some(root_render);

        while let Some((node_id, render_id)) = self.queue.pop_front() {
            self.visit(&node_id, render_id);
        }

        info!(
            render_nodes = self.ir.render.len(),
            imports = self.ir.imports.len(),
            states = self.ir.states.len(),
            warnings = self.ir.warnings.len(),
            "Page analysis complete"
        );
        Ok(self.ir)
    }

    /// Page variables become states named after the variable
    fn declare_variables(&mut self) {
        let doc = self.doc;
        for (key, variable) in &doc.variables {
            let base = if variable.name.is_empty() { key } else { &variable.name };
            let name = self.names.allocate(&to_camel_case(base), key);
            let value_type = variable
                .value_type
                .unwrap_or_else(|| ValueType::of(&variable.value));
            self.push_state(name, value_type, variable.value.clone().into());
        }
    }

    fn push_state(&mut self, name: String, value_type: ValueType, initial: Skeleton) -> String {
        let setter = format!("set{}", to_pascal_case(&name));
        self.ir.states.push(StateDecl {
            name: name.clone(),
            setter,
            value_type,
            initial,
        });
        name
    }

    /// Render node for an existing document node; queued for a visit
    fn element(&mut self, node_id: &str) -> RenderId {
        let (tag, dependency) = match self.doc.node(node_id) {
            Some(node) => self.component_info(node),
            None => (node_id.to_string(), HTML_DEPENDENCY.to_string()),
        };
        let id = self.ir.render.push(RenderNode::new(RenderKind::Element {
            node_id: node_id.to_string(),
            tag,
            dependency,
        }));
        self.queue.push_back((node_id.to_string(), id));
        id
    }

    /// Tag name for `node`, recording its import
    fn component_info(&mut self, node: &Node) -> (String, String) {
        if let Some(descriptor) = self.registry.lookup(&node.config_name, &node.dependency) {
            if let Some(module) = descriptor.import_module() {
                self.ir
                    .imports
                    .add(module, descriptor.import_type, descriptor.import_binding());
            }
            return (descriptor.tag_name().to_string(), node.dependency.clone());
        }

        let key = (node.config_name.clone(), node.dependency.clone());
        if self.unknown_components.insert(key) {
            warn!(config = %node.config_name, dependency = %node.dependency, "Unknown component config");
            self.ir.warnings.push(CodegenWarning::UnknownComponent {
                config_name: node.config_name.clone(),
                dependency: node.dependency.clone(),
            });
        }

        if node.dependency == HTML_DEPENDENCY {
            let tag = node.calling_name.clone().unwrap_or_else(|| "div".to_string());
            return (tag, node.dependency.clone());
        }
        let binding = node.import_name.as_deref().unwrap_or(&node.config_name);
        self.ir
            .imports
            .add(&node.dependency, ImportKind::Named, binding);
        let tag = node.calling_name.as_deref().unwrap_or(binding).to_string();
        (tag, node.dependency.clone())
    }

    /// Render node for a ref held by `holder`
    fn reference(&mut self, holder: &str, node_ref: &NodeRef) -> RenderId {
        match node_ref {
            NodeRef::Text(text) => self.ir.render.push(RenderNode::new(RenderKind::Text(text.clone()))),
            NodeRef::Component { id, .. } if self.doc.contains(id) => self.element(id),
            NodeRef::Component { id, .. } => {
                warn!(holder = %holder, target = %id, "Dangling reference");
                self.ir.warnings.push(CodegenWarning::DanglingReference {
                    holder: holder.to_string(),
                    target: id.clone(),
                });
                self.ir
                    .render
                    .push(RenderNode::new(RenderKind::Placeholder { target: id.clone() }))
            }
        }
    }

    fn visit(&mut self, node_id: &str, render_id: RenderId) {
        let doc = self.doc;
        let Some(node) = doc.node(node_id) else {
            return;
        };
        debug!(id = %node_id, name = %node.name, "Analyzing node");

        let events: &[EventBinding] = doc.events.get(node_id).map(Vec::as_slice).unwrap_or(&[]);
        let mut attributes = Vec::new();

        for (name, prop) in doc.ordered_props(node_id) {
            if matches!(prop.category, PropCategory::Children | PropCategory::Hidden) {
                continue;
            }
            if events.iter().any(|e| e.trigger == name) {
                continue;
            }
            if let Some(value) = self.lower_prop(node, name, prop) {
                attributes.push(Attribute {
                    name: name.to_string(),
                    value,
                });
            }
        }

        for binding in events {
            let callback = self.lower_event(node, binding);
            attributes.push(Attribute {
                name: binding.trigger.clone(),
                value: AttrValue::Binding(callback),
            });
        }

        let children: Vec<RenderId> = node
            .children
            .iter()
            .map(|child| self.reference(node_id, child))
            .collect();

        if let Some(render) = self.ir.render.get_mut(render_id) {
            render.attributes = attributes;
            render.children = children;
        }
    }

    fn lower_prop(&mut self, node: &Node, name: &str, prop: &PropValue) -> Option<AttrValue> {
        let base = format!("{}{}", to_camel_case(&node.name), to_pascal_case(name));
        let value_type = prop.value_type();

        let lowered = match prop.value_source {
            ValueSource::Handler => {
                let callback = self.names.allocate(&handler_name(&node.name, name), &node.id);
                let (params, body) = split_function(&prop.value);
                self.ir.callbacks.push(CallbackDecl {
                    name: callback.clone(),
                    params,
                    body,
                    dependencies: Vec::new(),
                });
                AttrValue::Binding(callback)
            }
            ValueSource::Computed => {
                let memo = self.names.allocate(&base, &node.id);
                let value = self.initializer(node, name, prop);
                self.ir.memos.push(MemoDecl {
                    name: memo.clone(),
                    value_type,
                    value,
                    dependencies: Vec::new(),
                });
                AttrValue::Binding(memo)
            }
            ValueSource::State | ValueSource::UserInput => {
                let state = self.names.allocate(&base, &node.id);
                let initial = self.initializer(node, name, prop);
                AttrValue::Binding(self.push_state(state, value_type, initial))
            }
            ValueSource::Literal if prop.is_value() => {
                let state = self.names.allocate(&base, &node.id);
                let initial = self.initializer(node, name, prop);
                AttrValue::Binding(self.push_state(state, value_type, initial))
            }
            ValueSource::Literal if is_inline(&prop.value) => AttrValue::Literal(prop.value.clone()),
            ValueSource::Literal if prop.has_embedded_refs() => {
                AttrValue::Skeleton(self.skeleton(node, name, prop))
            }
            ValueSource::Literal => {
                let constant = self.names.allocate(&base, &node.id);
                self.ir.constants.push(ConstantDecl {
                    name: constant.clone(),
                    value: prop.value.clone(),
                });
                AttrValue::Binding(constant)
            }
        };

        if prop.is_value() {
            if let AttrValue::Binding(binding) = &lowered {
                self.ir.effects.push(EffectDecl {
                    dependencies: vec![binding.clone()],
                    body: vec![format!(
                        "console.log({}, {});",
                        typescript::quote(&format!("{}.{} changed", node.name, name)),
                        binding
                    )],
                });
            }
        }
        Some(lowered)
    }

    fn lower_event(&mut self, node: &Node, binding: &EventBinding) -> String {
        let callback = self
            .names
            .allocate(&handler_name(&node.name, &binding.trigger), &node.id);
        let body = binding
            .action_ids
            .iter()
            .map(|action_id| match self.doc.actions.get(action_id) {
                Some(action) if !action.action_type.is_empty() => {
                    format!("// {} ({})", action.name, action.action_type)
                }
                Some(action) => format!("// {}", action.name),
                None => format!("// missing action {}", action_id),
            })
            .collect();
        self.ir.callbacks.push(CallbackDecl {
            name: callback.clone(),
            params: Vec::new(),
            body,
            dependencies: Vec::new(),
        });
        callback
    }

    /// Seed for a state or memo; embedded sub-trees are analyzed like any
    /// other prop literal
    fn initializer(&mut self, node: &Node, name: &str, prop: &PropValue) -> Skeleton {
        if prop.has_embedded_refs() {
            self.skeleton(node, name, prop)
        } else {
            Skeleton::Literal(prop.value.clone())
        }
    }

    fn skeleton(&mut self, node: &Node, name: &str, prop: &PropValue) -> Skeleton {
        let mut spliced = BTreeMap::new();
        for embedded in embedded_refs(&prop.value, prop.patterns()) {
            let render_id = self.reference(&node.id, &embedded.node_ref);
            spliced.insert(embedded.path, render_id);
        }
        build_skeleton(&prop.value, &KeyPath::root(), name, &spliced)
    }
}

fn build_skeleton(
    value: &Value,
    path: &KeyPath,
    prop_name: &str,
    spliced: &BTreeMap<KeyPath, RenderId>,
) -> Skeleton {
    if let Some(id) = spliced.get(path) {
        return Skeleton::Node {
            id: *id,
            slot: slot_name(prop_name, path),
        };
    }
    match value {
        Value::Array(items) => Skeleton::Array(
            items
                .iter()
                .enumerate()
                .map(|(i, item)| build_skeleton(item, &path.child_index(i), prop_name, spliced))
                .collect(),
        ),
        Value::Object(map) => Skeleton::Object(
            map.iter()
                .map(|(key, item)| {
                    let child = build_skeleton(item, &path.child_key(key), prop_name, spliced);
                    (key.clone(), child)
                })
                .collect(),
        ),
        other => Skeleton::Literal(other.clone()),
    }
}

/// `items` + `[0].children` → `items0Children`
fn slot_name(prop_name: &str, path: &KeyPath) -> String {
    let mut parts = vec![prop_name.to_string()];
    for segment in path.segments() {
        parts.push(match segment {
            PathSegment::Key(key) => key.clone(),
            PathSegment::Index(index) => index.to_string(),
        });
    }
    to_camel_case(&parts.join(" "))
}

fn is_inline(value: &Value) -> bool {
    value.is_null() || ValueType::of(value).is_basic()
}

/// `Button1` + `onClick` → `handleButton1Click`
fn handler_name(node_name: &str, trigger: &str) -> String {
    let trigger = trigger.strip_prefix("on").unwrap_or(trigger);
    format!("handle{}{}", to_pascal_case(node_name), to_pascal_case(trigger))
}

fn component_name(page_name: &str) -> String {
    let name = to_pascal_case(page_name);
    if name.is_empty() || name.starts_with(|c: char| c.is_ascii_digit()) {
        format!("Page{}", name)
    } else {
        name
    }
}

/// Split `(a, b) => { body }` into params and body lines.
///
/// Anything else is wrapped so the generated callback still calls it.
fn split_function(value: &Value) -> (Vec<String>, Vec<String>) {
    let Some(source) = value.as_str().map(str::trim) else {
        return (Vec::new(), Vec::new());
    };
    if let Some((head, body)) = source.split_once("=>") {
        let params: Vec<String> = head
            .trim()
            .trim_start_matches("async")
            .trim()
            .trim_start_matches('(')
            .trim_end_matches(')')
            .split(',')
            .map(str::trim)
            .filter(|p| !p.is_empty())
            .map(str::to_string)
            .collect();
        let body = body.trim();
        let lines: Vec<String> = match body.strip_prefix('{').and_then(|b| b.strip_suffix('}')) {
            Some(block) => block
                .lines()
                .map(str::trim)
                .filter(|l| !l.is_empty())
                .map(str::to_string)
                .collect(),
            None => vec![format!("return {};", body)],
        };
        return (params, lines);
    }
    if source.is_empty() {
        return (Vec::new(), Vec::new());
    }
    (
        vec!["...args".to_string()],
        vec![format!("return ({})(...args);", source)],
    )
}
