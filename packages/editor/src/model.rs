//! # Document Model
//!
//! Mutation primitives over one [`PageDocument`], with the component
//! registry injected.
//!
//! A node's children are the refs in its `children` list plus the refs
//! embedded in its props. Every primitive keeps the structural invariants:
//!
//! 1. each non-root node is referenced exactly once, by its parent
//! 2. every referenced id exists
//! 3. `parent_id` names the node holding the reference
//! 4. the root is never moved, cloned or deleted
//! 5. display names stay unique
//!
//! Primitives may leave the document half-updated when they fail; callers
//! run them inside [`UndoStack::transact`](crate::UndoStack::transact),
//! which restores the previous state.

use crate::mutations::MutationError;
use serde_json::Value;
use std::collections::{BTreeMap, BTreeSet};
use tracing::debug;
use voltron_schema::{
    clear_ref, embedded_refs, rewrite_refs, slot_positions, ActionSchema, ChildrenPolicy,
    ComponentDescriptor, ComponentRegistry, EventBinding, Feature, KeyPathPattern, Node, NodeRef,
    PageDocument, PropValue, RefLocation, HTML_DEPENDENCY,
};

type Result<T> = std::result::Result<T, MutationError>;

/// Registry entry used for synthesized slot containers
const SLOT_CONFIG_NAME: &str = "column";

pub struct DocumentModel<'a> {
    doc: &'a mut PageDocument,
    registry: &'a dyn ComponentRegistry,
}

impl<'a> DocumentModel<'a> {
    pub fn new(doc: &'a mut PageDocument, registry: &'a dyn ComponentRegistry) -> Self {
        Self { doc, registry }
    }

    pub fn document(&self) -> &PageDocument {
        self.doc
    }

    /// Create a component from its descriptor without attaching it.
    ///
    /// Object overrides are shallow-merged into object defaults; any other
    /// override replaces the default.
    pub fn create_component(
        &mut self,
        name: &str,
        dependency: &str,
        overrides: Option<&BTreeMap<String, Value>>,
    ) -> Result<Node> {
        let registry = self.registry;
        let descriptor = registry
            .lookup(name, dependency)
            .ok_or_else(|| MutationError::ConfigNotFound {
                name: name.to_string(),
                dependency: dependency.to_string(),
            })?;

        let id = self.doc.next_id();
        let mut node = Node::new(id.clone(), name, dependency);
        node.feature = descriptor.feature;
        node.import_name = descriptor.import_name.clone();
        node.calling_name = descriptor.calling_name.clone();
        node.name = self.allocate_name(name, &descriptor.display_base());

        let mut props = self.seed_props(descriptor, overrides);
        node.prop_names = props.keys().cloned().collect();
        // Insert the node first so synthesized children can point back at it
        self.doc.nodes.insert(id.clone(), node);

        for prop in props.values_mut() {
            self.fill_template_slots(&id, prop)?;
        }
        if !props.is_empty() {
            self.doc.props.insert(id.clone(), props);
        }

        let children = match &descriptor.children_policy {
            _ if descriptor.feature() == Feature::Container => Vec::new(),
            ChildrenPolicy::None => Vec::new(),
            ChildrenPolicy::Text { value } => vec![NodeRef::Text(value.clone())],
            ChildrenPolicy::Slot => vec![self.create_slot_container(&id)?.to_ref()],
        };
        let node = self.node_mut(&id)?;
        node.children = children;

        debug!(id = %id, name = %node.name, config = %name, "Created component");
        Ok(node.clone())
    }

    fn seed_props(
        &self,
        descriptor: &ComponentDescriptor,
        overrides: Option<&BTreeMap<String, Value>>,
    ) -> BTreeMap<String, PropValue> {
        let mut props: BTreeMap<String, PropValue> = descriptor
            .props_config
            .iter()
            .map(|(prop_name, config)| {
                let value = match overrides.and_then(|o| o.get(prop_name)) {
                    Some(patch) => merge_override(&config.value, patch),
                    None => config.value.clone(),
                };
                (prop_name.clone(), config.to_prop_value(prop_name, value))
            })
            .collect();

        for (prop_name, value) in overrides.into_iter().flatten() {
            props
                .entry(prop_name.clone())
                .or_insert_with(|| PropValue::literal(prop_name.clone(), value.clone()));
        }
        props
    }

    /// Give every non-empty template slot of `prop` its own slot container
    fn fill_template_slots(&mut self, owner_id: &str, prop: &mut PropValue) -> Result<()> {
        let patterns = prop.patterns().to_vec();
        for slot in slot_positions(&prop.value, &patterns) {
            if slot.node_ref.is_some() {
                return Err(MutationError::InvalidStructure(format!(
                    "template of {} already references a node at {}",
                    prop.name, slot.path
                )));
            }
            let wants_container = slot
                .path
                .get(&prop.value)
                .is_some_and(|v| !is_empty_slot(v));
            if wants_container {
                let container = self.create_slot_container(owner_id)?;
                if let Some(target) = slot.path.get_mut(&mut prop.value) {
                    *target = container.to_ref().to_value();
                }
            }
        }
        Ok(())
    }

    /// Empty container tagged `Slot`, owned by `parent_id`
    fn create_slot_container(&mut self, parent_id: &str) -> Result<Node> {
        let mut container = if self.registry.lookup(SLOT_CONFIG_NAME, HTML_DEPENDENCY).is_some() {
            self.create_component(SLOT_CONFIG_NAME, HTML_DEPENDENCY, None)?
        } else {
            let id = self.doc.next_id();
            let mut node = Node::new(id.clone(), SLOT_CONFIG_NAME, HTML_DEPENDENCY);
            node.name = self.allocate_name(SLOT_CONFIG_NAME, "slot");
            self.doc.nodes.insert(id, node.clone());
            node
        };
        container.feature = Some(Feature::Slot);
        container.parent_id = Some(parent_id.to_string());
        self.doc.nodes.insert(container.id.clone(), container.clone());
        Ok(container)
    }

    /// `{base}{n}` with `n` taken from the usage counter of `config_name`
    fn allocate_name(&mut self, config_name: &str, base: &str) -> String {
        loop {
            let counter = self
                .doc
                .name_usage_counters
                .entry(config_name.to_string())
                .or_insert(0);
            *counter += 1;
            let name = format!("{}{}", base, counter);
            if !self.doc.name_in_use(&name) {
                return name;
            }
        }
    }

    /// Create a component and attach it at `index` (`None` or out of range appends)
    pub fn insert(
        &mut self,
        parent_id: &str,
        name: &str,
        dependency: &str,
        index: Option<usize>,
    ) -> Result<Node> {
        if !self.doc.contains(parent_id) {
            return Err(MutationError::ParentNotFound(parent_id.to_string()));
        }
        let node = self.create_component(name, dependency, None)?;
        self.attach(parent_id, node.to_ref(), index)?;

        debug!(id = %node.id, parent = %parent_id, "Inserted component");
        self.node(&node.id).cloned()
    }

    fn attach(&mut self, parent_id: &str, node_ref: NodeRef, index: Option<usize>) -> Result<()> {
        let child_id = node_ref
            .id()
            .map(str::to_string)
            .ok_or_else(|| MutationError::InvalidStructure("cannot attach a text leaf".into()))?;

        let parent = self
            .doc
            .node_mut(parent_id)
            .ok_or_else(|| MutationError::ParentNotFound(parent_id.to_string()))?;
        let at = index
            .filter(|i| *i <= parent.children.len())
            .unwrap_or(parent.children.len());
        parent.children.insert(at, node_ref);

        self.node_mut(&child_id)?.parent_id = Some(parent_id.to_string());
        Ok(())
    }

    /// Move `child_id` under `parent_id`.
    ///
    /// Within the same parent, `index` is counted before the node is removed.
    pub fn move_node(&mut self, parent_id: &str, child_id: &str, index: Option<usize>) -> Result<()> {
        if !self.doc.contains(child_id) {
            return Err(MutationError::NodeNotFound(child_id.to_string()));
        }
        if !self.doc.contains(parent_id) {
            return Err(MutationError::ParentNotFound(parent_id.to_string()));
        }
        if self.doc.is_root(child_id) {
            return Err(MutationError::RootImmutable);
        }
        if parent_id == child_id || self.doc.is_descendant_of(parent_id, child_id) {
            return Err(MutationError::CycleDetected);
        }

        let mut index = index;
        let node_ref = match self.doc.locate(child_id) {
            Some(RefLocation::Child {
                parent,
                index: old_index,
            }) => {
                let old_parent = self.node_mut(&parent)?;
                let removed = old_parent.children.remove(old_index);
                if parent == parent_id {
                    index = index.map(|i| if i > old_index { i - 1 } else { i });
                }
                removed
            }
            Some(RefLocation::Embedded { parent, prop, .. }) => {
                self.clear_embedded(&parent, &prop, child_id);
                self.node(child_id)?.to_ref()
            }
            // Unreferenced nodes are simply reparented
            None => self.node(child_id)?.to_ref(),
        };

        self.attach(parent_id, node_ref, index)?;
        debug!(id = %child_id, parent = %parent_id, ?index, "Moved component");
        Ok(())
    }

    /// Deep-copy `source_id` with its closure and attach the copy under `target_parent_id`
    pub fn clone_node(
        &mut self,
        source_id: &str,
        target_parent_id: &str,
        index: Option<usize>,
        suffix: &str,
    ) -> Result<Node> {
        if !self.doc.contains(source_id) {
            return Err(MutationError::NodeNotFound(source_id.to_string()));
        }
        if !self.doc.contains(target_parent_id) {
            return Err(MutationError::ParentNotFound(target_parent_id.to_string()));
        }
        if self.doc.is_root(source_id) {
            return Err(MutationError::RootImmutable);
        }

        let closure = self.doc.subtree(source_id);
        let id_map: BTreeMap<String, String> = closure
            .iter()
            .map(|old| (old.clone(), self.doc.next_id()))
            .collect();

        let mut taken_names = BTreeSet::new();
        let mut action_map: BTreeMap<String, String> = BTreeMap::new();
        let mut copies = Vec::with_capacity(closure.len());

        for old_id in &closure {
            let mut node = self.node(old_id)?.clone();
            node.id = id_map[old_id].clone();
            node.parent_id = if old_id == source_id {
                Some(target_parent_id.to_string())
            } else {
                node.parent_id.as_ref().and_then(|p| id_map.get(p)).cloned()
            };
            node.name = self.unique_clone_name(&node.name, suffix, &mut taken_names);
            for child in node.children.iter_mut() {
                if let NodeRef::Component { id, .. } = child {
                    if let Some(new_id) = id_map.get(id.as_str()) {
                        *id = new_id.clone();
                    }
                }
            }

            if let Some(props) = self.doc.props.get(old_id) {
                let mut props = props.clone();
                for prop in props.values_mut() {
                    let patterns = prop.patterns().to_vec();
                    rewrite_refs(&mut prop.value, &patterns, &id_map);
                }
                self.doc.props.insert(node.id.clone(), props);
            }

            if let Some(events) = self.doc.events.get(old_id).cloned() {
                let events = events
                    .into_iter()
                    .map(|binding| self.clone_binding(binding, &mut action_map))
                    .collect();
                self.doc.events.insert(node.id.clone(), events);
            }

            copies.push(node);
        }

        let clone_root = copies[0].clone();
        for node in copies {
            self.doc.nodes.insert(node.id.clone(), node);
        }
        self.attach(target_parent_id, clone_root.to_ref(), index)?;

        debug!(
            source = %source_id,
            id = %clone_root.id,
            nodes = closure.len(),
            "Cloned component"
        );
        self.node(&clone_root.id).cloned()
    }

    fn unique_clone_name(&self, name: &str, suffix: &str, taken: &mut BTreeSet<String>) -> String {
        let base = format!("{}_{}", name, suffix);
        let mut candidate = base.clone();
        let mut tail = 1;
        while self.doc.name_in_use(&candidate) || taken.contains(&candidate) {
            tail += 1;
            candidate = format!("{}{}", base, tail);
        }
        taken.insert(candidate.clone());
        candidate
    }

    fn clone_binding(
        &mut self,
        mut binding: EventBinding,
        action_map: &mut BTreeMap<String, String>,
    ) -> EventBinding {
        binding.id = self.doc.next_id();
        binding.action_ids = std::mem::take(&mut binding.action_ids)
            .into_iter()
            .map(|action_id| {
                if let Some(mapped) = action_map.get(&action_id) {
                    return mapped.clone();
                }
                let Some(mut action) = self.doc.actions.get(&action_id).cloned() else {
                    return action_id;
                };
                action.id = self.doc.next_id();
                let new_id = action.id.clone();
                self.doc.actions.insert(new_id.clone(), action);
                action_map.insert(action_id, new_id.clone());
                new_id
            })
            .collect();
        binding
    }

    /// Delete a node and its closure. The root is left alone.
    pub fn delete(&mut self, id: &str) -> Result<Option<Node>> {
        if self.doc.is_root(id) {
            return Ok(None);
        }
        if !self.doc.contains(id) {
            return Err(MutationError::NodeNotFound(id.to_string()));
        }

        match self.doc.locate(id) {
            Some(RefLocation::Child { parent, index }) => {
                self.node_mut(&parent)?.children.remove(index);
            }
            Some(RefLocation::Embedded { parent, prop, .. }) => {
                self.clear_embedded(&parent, &prop, id);
            }
            None => {}
        }

        let closure = self.doc.subtree(id);
        let mut removed = None;
        for node_id in &closure {
            let node = self.doc.nodes.remove(node_id);
            self.doc.props.remove(node_id);
            self.doc.events.remove(node_id);
            self.doc.hidden.remove(node_id);
            if node_id == id {
                removed = node;
            }
        }

        debug!(id = %id, nodes = closure.len(), "Deleted component");
        Ok(removed)
    }

    fn clear_embedded(&mut self, parent_id: &str, prop_name: &str, child_id: &str) {
        if let Some(prop) = self
            .doc
            .props
            .get_mut(parent_id)
            .and_then(|props| props.get_mut(prop_name))
        {
            let patterns = prop.patterns().to_vec();
            clear_ref(&mut prop.value, &patterns, child_id);
        }
    }

    /// Overwrite the values of props the node already owns.
    ///
    /// `children` replaces the node's text child. Props carrying embedded
    /// refs are reconciled against the new value.
    pub fn update_props(&mut self, id: &str, patch: &BTreeMap<String, Value>) -> Result<()> {
        if !self.doc.contains(id) {
            return Err(MutationError::NodeNotFound(id.to_string()));
        }

        for (key, value) in patch {
            if key == "children" && self.doc.prop(id, key).is_none() {
                self.set_text_child(id, value)?;
                continue;
            }
            let Some(prop) = self.doc.prop(id, key) else {
                debug!(id = %id, prop = %key, "Ignoring unknown prop");
                continue;
            };

            let value = if prop.has_embedded_refs() {
                let patterns = prop.patterns().to_vec();
                let old = prop.value.clone();
                self.reconcile_embedded(id, &patterns, &old, value.clone())?
            } else {
                value.clone()
            };

            if let Some(prop) = self.doc.props.get_mut(id).and_then(|p| p.get_mut(key)) {
                prop.value = value;
            }
        }

        debug!(id = %id, keys = patch.len(), "Updated props");
        Ok(())
    }

    fn set_text_child(&mut self, id: &str, value: &Value) -> Result<()> {
        let text = match value {
            Value::String(s) => s.clone(),
            Value::Number(n) => n.to_string(),
            Value::Bool(b) => b.to_string(),
            _ => {
                return Err(MutationError::InvalidStructure(
                    "children must be a text value".into(),
                ))
            }
        };
        let node = self.node_mut(id)?;
        if node.children.iter().any(|child| !child.is_text()) {
            return Err(MutationError::InvalidStructure(format!(
                "{} has component children",
                id
            )));
        }
        node.children = vec![NodeRef::Text(text)];
        Ok(())
    }

    /// Keep refs that survive, give new template slots fresh containers and
    /// delete the sub-trees whose refs disappeared
    fn reconcile_embedded(
        &mut self,
        owner_id: &str,
        patterns: &[KeyPathPattern],
        old: &Value,
        mut new: Value,
    ) -> Result<Value> {
        let previous: BTreeSet<String> = embedded_refs(old, patterns)
            .into_iter()
            .filter_map(|r| r.id().map(str::to_string))
            .collect();
        let mut kept = BTreeSet::new();

        for slot in slot_positions(&new, patterns) {
            match slot.node_ref.as_ref().and_then(NodeRef::id) {
                Some(ref_id) if previous.contains(ref_id) => {
                    if !kept.insert(ref_id.to_string()) {
                        return Err(MutationError::InvalidStructure(format!(
                            "{} is referenced twice",
                            ref_id
                        )));
                    }
                }
                Some(ref_id) => {
                    return Err(MutationError::InvalidStructure(format!(
                        "{} is not owned by {}",
                        ref_id, owner_id
                    )));
                }
                None if slot.node_ref.is_none()
                    && slot.path.get(&new).is_some_and(|v| !is_empty_slot(v)) =>
                {
                    let container = self.create_slot_container(owner_id)?;
                    if let Some(target) = slot.path.get_mut(&mut new) {
                        *target = container.to_ref().to_value();
                    }
                }
                None => {}
            }
        }

        for dropped in previous.difference(&kept) {
            // The old value is still stored, so this clears its slot before it is replaced
            self.delete(dropped)?;
        }
        Ok(new)
    }

    /// Give a node a new display name
    pub fn rename(&mut self, id: &str, name: &str) -> Result<()> {
        let current = &self.node(id)?.name;
        if current == name {
            return Ok(());
        }
        if name.trim().is_empty() {
            return Err(MutationError::InvalidStructure("empty name".into()));
        }
        if self.doc.name_in_use(name) {
            return Err(MutationError::NameInUse(name.to_string()));
        }
        self.node_mut(id)?.name = name.to_string();
        Ok(())
    }

    /// Replace the event bindings of a node. Bindings without an id get one.
    pub fn set_events(&mut self, id: &str, events: Vec<EventBinding>) -> Result<()> {
        self.node(id)?;
        for action_id in events.iter().flat_map(|binding| &binding.action_ids) {
            if !self.doc.actions.contains_key(action_id) {
                return Err(MutationError::ActionNotFound(action_id.clone()));
            }
        }

        self.doc.events.remove(id);
        let mut bound = Vec::with_capacity(events.len());
        for mut binding in events {
            if binding.id.is_empty() || self.doc.id_in_use(&binding.id) {
                binding.id = self.doc.next_id();
            }
            bound.push(binding);
        }
        if !bound.is_empty() {
            self.doc.events.insert(id.to_string(), bound);
        }
        Ok(())
    }

    /// Register an action and return its id
    pub fn add_action(&mut self, mut action: ActionSchema) -> Result<String> {
        if action.id.is_empty() || self.doc.id_in_use(&action.id) {
            action.id = self.doc.next_id();
        }
        let id = action.id.clone();
        self.doc.actions.insert(id.clone(), action);
        Ok(id)
    }

    /// Remove an action and detach it from every event binding
    pub fn delete_action(&mut self, id: &str) -> Result<()> {
        if self.doc.actions.remove(id).is_none() {
            return Err(MutationError::ActionNotFound(id.to_string()));
        }
        for binding in self.doc.events.values_mut().flatten() {
            binding.action_ids.retain(|action_id| action_id != id);
        }
        Ok(())
    }

    fn node(&self, id: &str) -> Result<&Node> {
        self.doc
            .node(id)
            .ok_or_else(|| MutationError::NodeNotFound(id.to_string()))
    }

    fn node_mut(&mut self, id: &str) -> Result<&mut Node> {
        self.doc
            .node_mut(id)
            .ok_or_else(|| MutationError::NodeNotFound(id.to_string()))
    }
}

/// `null` and `false` mark a slot that holds nothing
fn is_empty_slot(value: &Value) -> bool {
    matches!(value, Value::Null | Value::Bool(false))
}

fn merge_override(default: &Value, patch: &Value) -> Value {
    match (default, patch) {
        (Value::Object(base), Value::Object(over)) => {
            let mut merged = base.clone();
            for (key, value) in over {
                merged.insert(key.clone(), value.clone());
            }
            Value::Object(merged)
        }
        _ => patch.clone(),
    }
}
