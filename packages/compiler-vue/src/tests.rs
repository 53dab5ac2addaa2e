use crate::{compile_to_vue, CompileOptions};
use serde_json::json;
use voltron_codegen::CodegenWarning;
use voltron_schema::{PageDocument, PropValue, StaticRegistry, ValueSource};

const TAB_CASE: &str = include_str!("../../../fixtures/tab-case.json");

fn tab_case() -> PageDocument {
    PageDocument::from_json(TAB_CASE).expect("Failed to load fixture")
}

fn compile(doc: &PageDocument, options: CompileOptions) -> crate::EmitOutput {
    let registry = StaticRegistry::builtin().expect("Failed to load catalog");
    compile_to_vue(doc, &registry, options).expect("Failed to compile")
}

#[test]
fn test_tab_case_component() {
    let result = compile(&tab_case(), CompileOptions::default());
    let source = &result.source;

    println!("Generated code:\n{}", source);

    assert!(source.starts_with("<template>\n"));
    assert!(source.contains("<script setup lang=\"ts\">"));
    assert!(source.contains("import { ref, watch } from 'vue';"));
    assert!(source.contains("import { Button, Tabs, Input } from 'ant-design-vue';"));
    assert!(!source.contains("from 'antd'"));
    assert!(source.contains("<Button type=\"primary\" @click=\"handleButton1Click\">"));
    assert!(source.contains("<Input :value=\"input1Value\" placeholder=\"Email\" />"));
    assert!(source.contains("const input1Value = ref<string>('');"));
    assert!(source.contains("const handleButton1Click = () => {\n};"));
    assert!(source.contains("watch(input1Value, () => {"));
    assert!(source.contains("  console.log('Input1.value changed', input1Value.value);"));
    assert!(source.contains("}, { immediate: true });"));
    assert!(source.trim_end().ends_with("</script>"));
    assert!(result.store.is_none());
    assert!(result.warnings.is_empty());
}

#[test]
fn test_spliced_nodes_become_named_slots() {
    let result = compile(&tab_case(), CompileOptions::default());

    println!("Generated code:\n{}", result.source);

    assert!(result.source.contains(
        ":items=\"[{ children: 'items0Children', key: '1', label: 'Tab 1' }, { children: null, key: '2', label: 'Tab 2' }]\""
    ));
    let expected = [
        "    <Tabs :items=\"[{ children: 'items0Children', key: '1', label: 'Tab 1' }, { children: null, key: '2', label: 'Tab 2' }]\">",
        "      <template #items0Children>",
        "        <div>",
        "          Inside",
        "        </div>",
        "      </template>",
        "    </Tabs>",
    ]
    .join("\n");
    assert!(result.source.contains(&expected));
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
        "const tabs1Items = ref<any[]>([{ children: 'items0Children', key: '1', label: 'Tab 1' }, { children: null, key: '2', label: 'Tab 2' }]);"
    ));
    let expected = [
        "    <Tabs :items=\"tabs1Items\">",
        "      <template #items0Children>",
        "        <div>",
        "          Inside",
        "        </div>",
        "      </template>",
        "    </Tabs>",
    ]
    .join("\n");
    assert!(result.source.contains(&expected));
    assert!(!result.source.contains("current:"));
    assert!(result.warnings.is_empty());
}

#[test]
fn test_javascript_output() {
    let options = CompileOptions {
        use_typescript: false,
    };
    let result = compile(&tab_case(), options);

    println!("Generated code:\n{}", result.source);

    assert!(result.source.contains("<script setup>"));
    assert!(!result.source.contains("lang=\"ts\""));
    assert!(result.source.contains("const input1Value = ref('');"));
}

#[test]
fn test_constants_and_computed() {
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

    assert!(result.source.contains("import { ref, watch, computed } from 'vue';"));
    assert!(result.source.contains("const button1Style = {\n  marginTop: 8\n};"));
    assert!(result.source.contains(":style=\"button1Style\""));
    assert!(result
        .source
        .contains("const input1Options = computed(() => {\n  return [\n    1,\n    2\n  ];\n});"));
}

#[test]
fn test_dangling_reference_is_a_comment() {
    let mut doc = tab_case();
    doc.nodes.remove("slot");

    let result = compile(&doc, CompileOptions::default());

    println!("Generated code:\n{}", result.source);

    assert!(result.source.contains("<!-- missing node slot -->"));
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

    assert_eq!(
        result.source,
        "<template>\n  <div />\n</template>\n\n<script setup lang=\"ts\">\n</script>\n"
    );
}
