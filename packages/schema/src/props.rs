use crate::key_path::KeyPathPattern;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum PropCategory {
    #[default]
    Basic,
    Style,
    Event,
    Children,
    Hidden,
    Advanced,
    Data,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ValueType {
    String,
    Number,
    Boolean,
    Function,
    Object,
    Array,
}

impl ValueType {
    /// Infer the type of a literal
    pub fn of(value: &Value) -> Self {
        match value {
            Value::String(_) => ValueType::String,
            Value::Number(_) => ValueType::Number,
            Value::Bool(_) => ValueType::Boolean,
            Value::Array(_) => ValueType::Array,
            Value::Object(_) | Value::Null => ValueType::Object,
        }
    }

    pub fn is_basic(self) -> bool {
        matches!(self, ValueType::String | ValueType::Number | ValueType::Boolean)
    }
}

/// Where a prop's runtime value comes from
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ValueSource {
    #[default]
    #[serde(rename = "editorInput", alias = "literal")]
    Literal,
    Handler,
    Computed,
    State,
    UserInput,
}

/// Value of one prop owned by one node
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(from = "RawPropValue", into = "RawPropValue")]
pub struct PropValue {
    pub name: String,
    pub category: PropCategory,
    pub value: Value,
    pub value_type: Option<ValueType>,
    pub value_source: ValueSource,
    pub is_value: Option<bool>,
    pub embedded_ref_patterns: Option<Vec<KeyPathPattern>>,
    pub extra: BTreeMap<String, Value>,
    /// Loaded without a `value` key; saved the same way while still null
    pub value_omitted: bool,
}

/// Persisted shape; `value` is optional and absent stays absent
#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawPropValue {
    #[serde(default)]
    name: String,
    #[serde(default)]
    category: PropCategory,
    #[serde(
        default,
        deserialize_with = "present",
        skip_serializing_if = "Option::is_none"
    )]
    value: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    value_type: Option<ValueType>,
    #[serde(default)]
    value_source: ValueSource,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    is_value: Option<bool>,
    #[serde(
        rename = "templateKeyPathsReg",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    embedded_ref_patterns: Option<Vec<KeyPathPattern>>,
    #[serde(flatten)]
    extra: BTreeMap<String, Value>,
}

/// A `null` that is spelled out counts as present
fn present<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<Value>, D::Error> {
    Value::deserialize(deserializer).map(Some)
}

impl PartialEq for PropValue {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
            && self.category == other.category
            && self.value == other.value
            && self.value_type == other.value_type
            && self.value_source == other.value_source
            && self.is_value == other.is_value
            && self.embedded_ref_patterns == other.embedded_ref_patterns
            && self.extra == other.extra
            && self.omits_value() == other.omits_value()
    }
}

impl From<RawPropValue> for PropValue {
    fn from(raw: RawPropValue) -> Self {
        Self {
            name: raw.name,
            category: raw.category,
            value_omitted: raw.value.is_none(),
            value: raw.value.unwrap_or(Value::Null),
            value_type: raw.value_type,
            value_source: raw.value_source,
            is_value: raw.is_value,
            embedded_ref_patterns: raw.embedded_ref_patterns,
            extra: raw.extra,
        }
    }
}

impl From<PropValue> for RawPropValue {
    fn from(prop: PropValue) -> Self {
        let omit = prop.omits_value();
        Self {
            name: prop.name,
            category: prop.category,
            value: (!omit).then_some(prop.value),
            value_type: prop.value_type,
            value_source: prop.value_source,
            is_value: prop.is_value,
            embedded_ref_patterns: prop.embedded_ref_patterns,
            extra: prop.extra,
        }
    }
}

impl PropValue {
    pub fn literal(name: impl Into<String>, value: Value) -> Self {
        Self {
            name: name.into(),
            category: PropCategory::Basic,
            value_type: Some(ValueType::of(&value)),
            value,
            value_source: ValueSource::Literal,
            is_value: None,
            embedded_ref_patterns: None,
            extra: BTreeMap::new(),
            value_omitted: false,
        }
    }

    fn omits_value(&self) -> bool {
        self.value_omitted && self.value.is_null()
    }

    pub fn value_type(&self) -> ValueType {
        self.value_type.unwrap_or_else(|| ValueType::of(&self.value))
    }

    pub fn is_value(&self) -> bool {
        self.is_value.unwrap_or(false)
    }

    pub fn patterns(&self) -> &[KeyPathPattern] {
        self.embedded_ref_patterns.as_deref().unwrap_or(&[])
    }

    pub fn has_embedded_refs(&self) -> bool {
        !self.patterns().is_empty()
    }
}

/// Event trigger bound to a list of actions
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventBinding {
    pub id: String,
    pub trigger: String,
    #[serde(default)]
    pub action_ids: Vec<String>,
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActionSchema {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub desc: String,
    #[serde(default)]
    pub action_type: String,
    #[serde(default)]
    pub payload: Value,
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VariableInfo {
    pub name: String,
    #[serde(default)]
    pub value: Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value_type: Option<ValueType>,
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_value_source_aliases() {
        let editor: ValueSource = serde_json::from_value(json!("editorInput")).unwrap();
        let literal: ValueSource = serde_json::from_value(json!("literal")).unwrap();
        assert_eq!(editor, ValueSource::Literal);
        assert_eq!(literal, ValueSource::Literal);
        assert_eq!(serde_json::to_value(ValueSource::Literal).unwrap(), json!("editorInput"));
        assert_eq!(serde_json::to_value(ValueSource::UserInput).unwrap(), json!("userInput"));
    }

    #[test]
    fn test_missing_value_stays_missing() {
        let raw = json!({ "name": "title", "category": "basic", "valueSource": "editorInput" });
        let prop: PropValue = serde_json::from_value(raw.clone()).unwrap();
        assert_eq!(prop.value, Value::Null);
        assert_eq!(serde_json::to_value(&prop).unwrap(), raw);

        let explicit = json!({ "name": "title", "category": "basic", "value": null, "valueSource": "editorInput" });
        let prop: PropValue = serde_json::from_value(explicit.clone()).unwrap();
        assert_eq!(serde_json::to_value(&prop).unwrap(), explicit);

        let mut edited: PropValue = serde_json::from_value(raw).unwrap();
        edited.value = json!("Hello");
        assert_eq!(serde_json::to_value(&edited).unwrap()["value"], json!("Hello"));
    }

    #[test]
    fn test_prop_value_with_patterns() {
        let raw = json!({
            "name": "items",
            "category": "basic",
            "value": [{ "key": "1", "children": null }],
            "valueType": "array",
            "valueSource": "editorInput",
            "templateKeyPathsReg": [{ "type": "object", "path": "[].children" }]
        });
        let prop: PropValue = serde_json::from_value(raw.clone()).unwrap();
        assert!(prop.has_embedded_refs());
        assert_eq!(prop.value_type(), ValueType::Array);
        assert_eq!(serde_json::to_value(&prop).unwrap(), raw);
    }

    #[test]
    fn test_inferred_value_type() {
        let prop = PropValue::literal("danger", json!(true));
        assert_eq!(prop.value_type(), ValueType::Boolean);
        assert!(prop.value_type().is_basic());
        assert!(!ValueType::of(&json!({})).is_basic());
    }
}
