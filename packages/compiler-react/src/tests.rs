use crate::{compile_to_react, CompileOptions};
use serde_json::json;
use voltron_codegen::CodegenWarning;
use voltron_schema::{PageDocument, PropValue, StaticRegistry, ValueSource};

const TAB_CASE: &str = include_str!("../../../fixtures/tab-case.json");

fn tab_case() -> PageDocument {
    PageDocument::from_json(TAB_CASE).expect("Failed to load fixture")
}

fn compile(doc: &PageDocument, options: CompileOptions) -> crate::EmitOutput {
    let registry = StaticRegistry::builtin().expect("Failed to load catalog");
    compile_to_react(doc, &registry, options).expect("Failed to compile")
}

#[test]
fn test_tab_case_page() {
    let result = compile(&tab_case(), CompileOptions::default());
    let source = &result.source;

    println!("Generated code:\n{}", source);

    assert!(source.starts_with("import React, { useState, useEffect, useCallback } from 'react';\n"));
    assert_eq!(source.matches("from 'react'").count(), 1);
    assert!(source.contains("import { Button, Tabs, Input } from 'antd';"));
    assert!(source.contains("export default function Home() {"));
    assert!(source.contains("const [input1Value, setInput1Value] = useState<string>('');"));
    assert!(source.contains("const handleButton1Click = useCallback(() => {"));
    assert!(source.contains("}, [input1Value]);"));
    assert!(source.contains("<Button type=\"primary\" onClick={handleButton1Click}>"));
    assert!(source.contains("Submit"));
    assert!(source.contains("<Input value={input1Value} placeholder=\"Email\" />"));
    assert!(source.contains(
        "items={[{ children: <div>Inside</div>, key: '1', label: 'Tab 1' }, { children: null, key: '2', label: 'Tab 2' }]}"
    ));
    assert!(result.store.is_none());
    assert!(result.warnings.is_empty());
}

#[test]
fn test_markup_nesting() {
    let result = compile(&tab_case(), CompileOptions::default());

    println!("Generated code:\n{}", result.source);

    let expected = [
        "  return (",
        "    <div>",
        "      <Button type=\"primary\" onClick={handleButton1Click}>",
        "        Submit",
        "      </Button>",
    ]
    .join("\n");
    assert!(result.source.contains(&expected));
    assert!(result.source.trim_end().ends_with("  );\n}"));
}

#[test]
fn test_javascript_output() {
    let options = CompileOptions {
        use_typescript: false,
        ..CompileOptions::default()
    };
    let result = compile(&tab_case(), options);

    println!("Generated code:\n{}", result.source);

    assert!(result.source.contains("useState('')"));
    assert!(!result.source.contains("useState<"));
}

#[test]
fn test_extract_store() {
    let options = CompileOptions {
        extract_store: true,
        ..CompileOptions::default()
    };
    let result = compile(&tab_case(), options);
    let store = result.store.expect("store module");

    println!("Generated store:\n{}", store);
    println!("Generated code:\n{}", result.source);

    assert!(store.contains("import { useState } from 'react';"));
    assert!(store.contains("export function usePageStore() {"));
    assert!(store.contains("const [input1Value, setInput1Value] = useState<string>('');"));
    assert!(store.contains("return { input1Value, setInput1Value };"));

    assert!(result.source.contains("import { usePageStore } from './store';"));
    assert!(result
        .source
        .contains("const { input1Value, setInput1Value } = usePageStore();"));
    assert!(!result.source.contains("useState"));
    assert!(result
        .source
        .contains("import React, { useEffect, useCallback } from 'react';"));
}

#[test]
fn test_constants_and_memos() {
    let mut doc = tab_case();

    doc.node_mut("btn").unwrap().prop_names.push("style".into());
    doc.props
        .get_mut("btn")
        .unwrap()
        .insert("style".into(), PropValue::literal("style", json!({ "marginTop": 8 })));

    let mut options = PropValue::literal("options", json!([1, 2]));
    options.value_source = ValueSource::Computed;
    doc.node_mut("input").unwrap().prop_names.push("options".into());
    doc.props.get_mut("input").unwrap().insert("options".into(), options);

    let result = compile(&doc, CompileOptions::default());

    println!("Generated code:\n{}", result.source);

    assert!(result
        .source
        .contains("const button1Style = {\n  marginTop: 8\n};"));
    assert!(result.source.contains("style={button1Style}"));
    assert!(result
        .source
        .contains("const input1Options = useMemo(() => {\n    return [\n      1,\n      2\n    ];\n  }, []);"));
    assert!(result.source.contains("options={input1Options}"));
}

#[test]
fn test_state_with_embedded_sub_tree() {
    let mut doc = tab_case();
    if let Some(items) = doc.props.get_mut("tabs").and_then(|p| p.get_mut("items")) {
        items.value_source = ValueSource::State;
    }

    let result = compile(&doc, CompileOptions::default());

    println!("Generated code:\n{}", result.source);

    assert!(result.source.contains(
        "const [tabs1Items, setTabs1Items] = useState<any[]>([{ children: <div>Inside</div>, key: '1', label: 'Tab 1' }, { children: null, key: '2', label: 'Tab 2' }]);"
    ));
    assert!(result.source.contains("<Tabs items={tabs1Items} />"));
    assert!(!result.source.contains("current:"));
}

#[test]
fn test_memo_with_embedded_sub_tree() {
    let mut doc = tab_case();
    if let Some(items) = doc.props.get_mut("tabs").and_then(|p| p.get_mut("items")) {
        items.value_source = ValueSource::Computed;
    }

    let result = compile(&doc, CompileOptions::default());

    println!("Generated code:\n{}", result.source);

    assert!(result.source.contains(
        "    return [{ children: <div>Inside</div>, key: '1', label: 'Tab 1' }, { children: null, key: '2', label: 'Tab 2' }];"
    ));
    assert!(!result.source.contains("isText"));
}

#[test]
fn test_dangling_reference_is_a_warning() {
    let mut doc = tab_case();
    doc.nodes.remove("slot");

    let result = compile(&doc, CompileOptions::default());

    println!("Generated code:\n{}", result.source);

    assert!(result.source.contains("children: <></>"));
    assert_eq!(
        result.warnings,
        vec![CodegenWarning::DanglingReference {
            holder: "tabs".into(),
            target: "slot".into()
        }]
    );
}

#[test]
fn test_blank_page() {
    let result = compile(&PageDocument::new("blank"), CompileOptions::default());

    println!("Generated code:\n{}", result.source);

    assert!(result.source.starts_with("import React from 'react';\n"));
    assert!(result.source.contains("export default function Blank() {"));
    assert!(result.source.contains("<div />"));
    assert!(!result.source.contains("from 'antd'"));
}
