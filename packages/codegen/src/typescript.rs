//! TypeScript fragments shared by the React and Vue emitters.

use crate::ir::{RenderId, Skeleton};
use crate::naming::is_identifier;
use serde_json::Value;
use voltron_schema::{ImportKind, ValueType};

/// `import React from 'react';`, `import { a, b } from 'antd';`, ...
///
/// Returns `None` when there is nothing to import.
pub fn import_sentence(module: &str, kind: ImportKind, names: &[String]) -> Option<String> {
    if names.is_empty() {
        return None;
    }
    let sentence = match kind {
        ImportKind::Named => format!("import {{ {} }} from '{}';", names.join(", "), module),
        ImportKind::Namespace => format!("import * as {} from '{}';", names[0], module),
        ImportKind::Default => format!("import {} from '{}';", names[0], module),
    };
    Some(sentence)
}

/// `const name = expression;`
pub fn assignment(name: &str, expression: &str) -> String {
    format!("const {} = {};", name, expression)
}

/// Opening line of a function, ending in `{`
pub fn function_signature(name: Option<&str>, params: &[String], arrow: bool, is_async: bool) -> String {
    let params = params.join(", ");
    let signature = match (arrow, name) {
        (true, _) => format!("({}) => {{", params),
        (false, Some(name)) => format!("function {}({}) {{", name, params),
        (false, None) => format!("function ({}) {{", params),
    };
    if is_async {
        format!("async {}", signature)
    } else {
        signature
    }
}

/// Type annotation for a declared value
pub fn type_annotation(value_type: ValueType) -> &'static str {
    match value_type {
        ValueType::String => "string",
        ValueType::Number => "number",
        ValueType::Boolean => "boolean",
        ValueType::Function => "(...args: any[]) => void",
        ValueType::Object => "Record<string, any>",
        ValueType::Array => "any[]",
    }
}

pub fn quote(text: &str) -> String {
    let mut quoted = String::with_capacity(text.len() + 2);
    quoted.push('\'');
    for c in text.chars() {
        match c {
            '\'' => quoted.push_str("\\'"),
            '\\' => quoted.push_str("\\\\"),
            '\n' => quoted.push_str("\\n"),
            '\r' => quoted.push_str("\\r"),
            _ => quoted.push(c),
        }
    }
    quoted.push('\'');
    quoted
}

fn object_key(key: &str) -> String {
    if is_identifier(key) {
        key.to_string()
    } else {
        quote(key)
    }
}

/// Single-line TypeScript literal for a JSON value
pub fn literal(value: &Value) -> String {
    match value {
        Value::Null => "null".to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        Value::String(s) => quote(s),
        Value::Array(items) => {
            let items: Vec<String> = items.iter().map(literal).collect();
            format!("[{}]", items.join(", "))
        }
        Value::Object(map) if map.is_empty() => "{}".to_string(),
        Value::Object(map) => {
            let entries: Vec<String> = map
                .iter()
                .map(|(k, v)| format!("{}: {}", object_key(k), literal(v)))
                .collect();
            format!("{{ {} }}", entries.join(", "))
        }
    }
}

/// Multi-line literal; nested containers open and close on their own lines
pub fn literal_lines(value: &Value) -> Vec<String> {
    let mut lines = Vec::new();
    push_literal_lines(value, None, true, &mut lines);
    lines
}

/// `{head} <literal>{tail}` with the literal spread over several lines
pub fn statement_lines(head: &str, value: &Value, tail: &str) -> Vec<String> {
    let mut lines = literal_lines(value);
    if let Some(first) = lines.first_mut() {
        *first = format!("{} {}", head, first);
    }
    if let Some(last) = lines.last_mut() {
        last.push_str(tail);
    }
    lines
}

fn push_literal_lines(value: &Value, key: Option<&str>, last: bool, lines: &mut Vec<String>) {
    let prefix = key.map(|k| format!("{}: ", object_key(k))).unwrap_or_default();
    let comma = if last { "" } else { "," };
    match value {
        Value::Array(items) if !items.is_empty() => {
            lines.push(format!("{}[", prefix));
            for (i, item) in items.iter().enumerate() {
                push_literal_lines(item, None, i + 1 == items.len(), lines);
            }
            lines.push(format!("]{}", comma));
        }
        Value::Object(map) if !map.is_empty() => {
            lines.push(format!("{}{{", prefix));
            for (i, (k, v)) in map.iter().enumerate() {
                push_literal_lines(v, Some(k), i + 1 == map.len(), lines);
            }
            lines.push(format!("}}{}", comma));
        }
        _ => lines.push(format!("{}{}{}", prefix, literal(value), comma)),
    }
}

/// Single-line literal with spliced render nodes written by `render_node`
pub fn skeleton(value: &Skeleton, render_node: &mut dyn FnMut(RenderId, &str) -> String) -> String {
    match value {
        Skeleton::Literal(v) => literal(v),
        Skeleton::Array(items) => {
            let items: Vec<String> = items.iter().map(|i| skeleton(i, render_node)).collect();
            format!("[{}]", items.join(", "))
        }
        Skeleton::Object(entries) if entries.is_empty() => "{}".to_string(),
        Skeleton::Object(entries) => {
            let entries: Vec<String> = entries
                .iter()
                .map(|(k, v)| format!("{}: {}", object_key(k), skeleton(v, render_node)))
                .collect();
            format!("{{ {} }}", entries.join(", "))
        }
        Skeleton::Node { id, slot } => render_node(*id, slot),
    }
}

/// [`statement_lines`] for a skeleton; literals with spliced nodes stay on one line
pub fn skeleton_statement_lines(
    head: &str,
    value: &Skeleton,
    tail: &str,
    render_node: &mut dyn FnMut(RenderId, &str) -> String,
) -> Vec<String> {
    match value {
        Skeleton::Literal(v) => statement_lines(head, v, tail),
        other => vec![format!("{} {}{}", head, skeleton(other, render_node), tail)],
    }
}

/// `[a, b]`
pub fn dependency_list(dependencies: &[String]) -> String {
    format!("[{}]", dependencies.join(", "))
}
