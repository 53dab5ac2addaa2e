//! # Page IR
//!
//! Target-neutral description of one generated page: what to import, which
//! reactive declarations to emit, and the render tree.
//!
//! Render nodes live in an arena and point at each other by index, so a
//! prop literal can splice a sub-tree without owning it:
//!
//! ```text
//! arena[0] Element div          (root)
//!   arena[1] Element Tabs
//!     attr items = Skeleton [ { label: "A", children: Node(2) } ]
//! arena[2] Element div          (slot container, reached through items)
//! ```

use crate::error::CodegenWarning;
use serde_json::Value;
use voltron_schema::{ImportKind, ValueType};

/// Index into [`RenderTree::nodes`]
pub type RenderId = usize;

/// Everything an emitter needs for one page
#[derive(Debug, Clone, Default)]
pub struct PageIr {
    /// Page name as stored in the document
    pub page_name: String,
    /// Identifier for the generated component, e.g. `HomePage`
    pub component_name: String,
    pub imports: ImportMap,
    pub states: Vec<StateDecl>,
    pub memos: Vec<MemoDecl>,
    pub callbacks: Vec<CallbackDecl>,
    pub effects: Vec<EffectDecl>,
    pub constants: Vec<ConstantDecl>,
    pub render: RenderTree,
    pub warnings: Vec<CodegenWarning>,
}

impl PageIr {
    /// Names of every reactive value, in declaration order
    pub fn reactive_names(&self) -> Vec<&str> {
        self.states
            .iter()
            .map(|s| s.name.as_str())
            .chain(self.memos.iter().map(|m| m.name.as_str()))
            .collect()
    }
}

/// Imports grouped by module, in first-use order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ImportMap {
    modules: Vec<(String, ImportGroup)>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ImportGroup {
    pub default: Vec<String>,
    pub named: Vec<String>,
    pub namespace: Vec<String>,
}

impl ImportGroup {
    pub fn names(&self, kind: ImportKind) -> &[String] {
        match kind {
            ImportKind::Default => &self.default,
            ImportKind::Named => &self.named,
            ImportKind::Namespace => &self.namespace,
        }
    }

    fn names_mut(&mut self, kind: ImportKind) -> &mut Vec<String> {
        match kind {
            ImportKind::Default => &mut self.default,
            ImportKind::Named => &mut self.named,
            ImportKind::Namespace => &mut self.namespace,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.default.is_empty() && self.named.is_empty() && self.namespace.is_empty()
    }
}

impl ImportMap {
    /// Record `name` from `module`; duplicates are ignored
    pub fn add(&mut self, module: &str, kind: ImportKind, name: &str) {
        let index = match self.modules.iter().position(|(m, _)| m == module) {
            Some(index) => index,
            None => {
                self.modules.push((module.to_string(), ImportGroup::default()));
                self.modules.len() - 1
            }
        };
        let names = self.modules[index].1.names_mut(kind);
        if !names.iter().any(|n| n == name) {
            names.push(name.to_string());
        }
    }

    pub fn get(&self, module: &str) -> Option<&ImportGroup> {
        self.modules.iter().find(|(m, _)| m == module).map(|(_, g)| g)
    }

    /// Rename a module, merging into an existing group of the new name
    pub fn rename_module(&mut self, from: &str, to: &str) {
        let Some(index) = self.modules.iter().position(|(m, _)| m == from) else {
            return;
        };
        let (_, group) = self.modules.remove(index);
        for kind in [ImportKind::Default, ImportKind::Named, ImportKind::Namespace] {
            for name in group.names(kind) {
                self.add(to, kind, name);
            }
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &ImportGroup)> {
        self.modules.iter().map(|(m, g)| (m.as_str(), g))
    }

    pub fn len(&self) -> usize {
        self.modules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }
}

/// Reactive state seeded with a literal
#[derive(Debug, Clone, PartialEq)]
pub struct StateDecl {
    pub name: String,
    pub setter: String,
    pub value_type: ValueType,
    /// Initial value; embedded sub-trees are spliced in as render nodes
    pub initial: Skeleton,
}

/// Derived value recomputed when its dependencies change
#[derive(Debug, Clone, PartialEq)]
pub struct MemoDecl {
    pub name: String,
    pub value_type: ValueType,
    pub value: Skeleton,
    pub dependencies: Vec<String>,
}

/// Stable function handed to a component
#[derive(Debug, Clone, PartialEq)]
pub struct CallbackDecl {
    pub name: String,
    pub params: Vec<String>,
    /// Body statements
    pub body: Vec<String>,
    pub dependencies: Vec<String>,
}

/// Side effect run whenever `dependencies` change
#[derive(Debug, Clone, PartialEq)]
pub struct EffectDecl {
    pub dependencies: Vec<String>,
    pub body: Vec<String>,
}

/// Module-level constant
#[derive(Debug, Clone, PartialEq)]
pub struct ConstantDecl {
    pub name: String,
    pub value: Value,
}

#[derive(Debug, Clone, Default)]
pub struct RenderTree {
    pub nodes: Vec<RenderNode>,
    pub root: Option<RenderId>,
}

impl RenderTree {
    pub fn push(&mut self, node: RenderNode) -> RenderId {
        self.nodes.push(node);
        self.nodes.len() - 1
    }

    pub fn get(&self, id: RenderId) -> Option<&RenderNode> {
        self.nodes.get(id)
    }

    pub fn get_mut(&mut self, id: RenderId) -> Option<&mut RenderNode> {
        self.nodes.get_mut(id)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Render node generated for a document node
    pub fn find_by_node_id(&self, node_id: &str) -> Option<RenderId> {
        self.nodes.iter().position(|n| match &n.kind {
            RenderKind::Element { node_id: id, .. } => id == node_id,
            _ => false,
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RenderNode {
    pub kind: RenderKind,
    pub attributes: Vec<Attribute>,
    pub children: Vec<RenderId>,
}

impl RenderNode {
    pub fn new(kind: RenderKind) -> Self {
        Self {
            kind,
            attributes: Vec::new(),
            children: Vec::new(),
        }
    }

    pub fn attribute(&self, name: &str) -> Option<&AttrValue> {
        self.attributes
            .iter()
            .find(|a| a.name == name)
            .map(|a| &a.value)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum RenderKind {
    Element {
        node_id: String,
        /// Markup name, e.g. `div` or `Typography.Text`
        tag: String,
        /// Registry dependency the tag comes from
        dependency: String,
    },
    Text(String),
    /// Stand-in for a reference to a missing node
    Placeholder { target: String },
}

#[derive(Debug, Clone, PartialEq)]
pub struct Attribute {
    pub name: String,
    pub value: AttrValue,
}

#[derive(Debug, Clone, PartialEq)]
pub enum AttrValue {
    /// Basic literal written inline
    Literal(Value),
    /// Reference to a declared state, memo, callback or constant
    Binding(String),
    /// Structured literal with render nodes spliced in
    Skeleton(Skeleton),
}

#[derive(Debug, Clone, PartialEq)]
pub enum Skeleton {
    Literal(Value),
    Array(Vec<Skeleton>),
    Object(Vec<(String, Skeleton)>),
    /// Sub-tree rendered in place; `slot` names the position for targets
    /// that hoist it out of the literal
    Node { id: RenderId, slot: String },
}

impl From<Value> for Skeleton {
    fn from(value: Value) -> Self {
        Skeleton::Literal(value)
    }
}

impl Skeleton {
    pub fn is_null(&self) -> bool {
        matches!(self, Skeleton::Literal(Value::Null))
    }

    /// Render nodes spliced into this literal, with their slot names
    pub fn nodes(&self) -> Vec<(RenderId, &str)> {
        let mut found = Vec::new();
        self.collect_nodes(&mut found);
        found
    }

    fn collect_nodes<'a>(&'a self, found: &mut Vec<(RenderId, &'a str)>) {
        match self {
            Skeleton::Literal(_) => {}
            Skeleton::Array(items) => items.iter().for_each(|item| item.collect_nodes(found)),
            Skeleton::Object(entries) => entries
                .iter()
                .for_each(|(_, value)| value.collect_nodes(found)),
            Skeleton::Node { id, slot } => found.push((*id, slot)),
        }
    }
}
