//! Metadata of each authoring style, extracted from in-memory and temporary projects

use component_meta::{ComponentKind, ComponentMeta, ComponentMetaChecker, MetaCheckerOptions, MetaError, SchemaNode};
use component_meta_checker::CheckError;
use component_meta_common::MemoryFileSystem;
use serde_json::json;
use std::fs;
use std::path::Path;
use std::sync::Arc;

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .with_test_writer()
        .try_init();
}

fn meta_with(options: MetaCheckerOptions, path: &str, source: &str) -> ComponentMeta {
    init_tracing();
    let fs = MemoryFileSystem::new().with_file(path, source);
    let checker = ComponentMetaChecker::for_single_file_with_fs(Arc::new(fs), options).unwrap();
    checker.get_component_meta(Path::new(path)).unwrap()
}

fn meta(path: &str, source: &str) -> ComponentMeta {
    meta_with(MetaCheckerOptions::default(), path, source)
}

fn declared(meta: &ComponentMeta) -> Vec<&str> {
    meta.props
        .iter()
        .filter(|prop| !prop.global)
        .map(|prop| prop.name.as_str())
        .collect()
}

#[test]
fn test_options_object_with_runtime_props() {
    let meta = meta(
        "/src/Card.ts",
        r#"import { defineComponent } from 'vue'
export default defineComponent({
  props: {
    title: { type: String, required: true },
    size: { type: Number, default: 2 },
    tags: { type: Array, default: () => ['a'] },
  },
  emits: ['close'],
})
"#,
    );

    assert_eq!(meta.kind, ComponentKind::ObjectLike);
    assert_eq!(declared(&meta), ["title", "size", "tags"]);

    let title = meta.prop("title").unwrap();
    assert!(title.required);
    assert_eq!(title.type_, "string");
    assert!(title.default.is_none());

    let size = meta.prop("size").unwrap();
    assert!(!size.required);
    assert_eq!(size.type_, "number | undefined");
    assert_eq!(size.default.as_deref(), Some("2"));
    assert_eq!(meta.prop("tags").unwrap().default.as_deref(), Some("[\"a\"]"));

    let close = meta.event("close").unwrap();
    assert_eq!(close.type_, "[...args: any[]]");
    assert_eq!(close.signature, "(event: \"close\", ...args: any[]): void");

    assert!(meta.prop("class").unwrap().global);
}

#[test]
fn test_typed_events() {
    let meta = meta(
        "/src/Input.vue",
        r#"<script setup lang="ts">
const emit = defineEmits<{
  /** value changed */
  (e: 'change', id: number): void
  (e: 'focus' | 'blur'): void
}>()
</script>
"#,
    );

    let names: Vec<&str> = meta.events.iter().map(|event| event.name.as_str()).collect();
    assert_eq!(names, ["change", "focus", "blur"]);

    let change = meta.event("change").unwrap();
    assert_eq!(change.description, "value changed");
    assert_eq!(change.type_, "[id: number]");
    assert_eq!(change.signature, "(event: \"change\", id: number): void");
    assert_eq!(change.schema, vec![SchemaNode::from("number")]);

    let blur = meta.event("blur").unwrap();
    assert_eq!(blur.type_, "[]");
    assert!(blur.schema.is_empty());
}

#[test]
fn test_tuple_style_events() {
    let meta = meta(
        "/src/Picker.vue",
        r#"<script setup lang="ts">
defineEmits<{
  select: [id: number, label: string]
  reset: []
  raw: [string]
}>()
</script>
"#,
    );

    assert_eq!(meta.event("select").unwrap().type_, "[id: number, label: string]");
    assert_eq!(meta.event("reset").unwrap().signature, "(event: \"reset\"): void");
    assert_eq!(meta.event("raw").unwrap().type_, "[args_0: string]");
}

#[test]
fn test_runtime_event_validators() {
    let meta = meta(
        "/src/Form.vue",
        r#"<script setup lang="ts">
defineEmits({
  submit: (payload: { email: string }) => true,
  cancel: null,
})
</script>
"#,
    );

    let submit = meta.event("submit").unwrap();
    assert_eq!(submit.type_, "[payload: { email: string; }]");
    assert_eq!(
        serde_json::to_value(&submit.schema[0]).unwrap()["kind"],
        json!("object")
    );
    assert_eq!(meta.event("cancel").unwrap().type_, "[...args: any[]]");
}

#[test]
fn test_slots() {
    let meta = meta(
        "/src/List.vue",
        r#"<script setup lang="ts">
defineSlots<{
  /** each row */
  item(props: { index: number }): any
  empty(): any
}>()
</script>
"#,
    );

    let names: Vec<&str> = meta.slots.iter().map(|slot| slot.name.as_str()).collect();
    assert_eq!(names, ["item", "empty"]);

    let item = meta.slot("item").unwrap();
    assert_eq!(item.description, "each row");
    assert_eq!(item.type_, "{ index: number; }");
    assert_eq!(meta.slot("empty").unwrap().type_, "{}");
}

#[test]
fn test_functional_and_class_components() {
    let function = meta(
        "/src/Label.ts",
        "export default function Label({ text = 'hi' }: { text?: string }) { return null }\n",
    );
    assert_eq!(function.kind, ComponentKind::FunctionLike);
    assert_eq!(declared(&function), ["text"]);
    assert_eq!(function.prop("text").unwrap().default.as_deref(), Some("\"hi\""));

    let class = meta(
        "/src/Counter.ts",
        "export default class Counter { count: number = 0; label = 'x' }\n",
    );
    assert_eq!(class.kind, ComponentKind::ClassLike);
    assert_eq!(class.prop("count").unwrap().default.as_deref(), Some("0"));
}

#[test]
fn test_non_components_have_no_globals() {
    let meta = meta("/src/data.ts", "export default { width: 1 }\n");
    assert_eq!(meta.kind, ComponentKind::Unknown);
    assert!(meta.props.is_empty());
    assert_eq!(serde_json::to_value(&meta).unwrap()["type"], json!("unknown"));
}

#[test]
fn test_schema_disabled() {
    let options = MetaCheckerOptions::from_json(r#"{ "schema": false }"#).unwrap();
    let meta = meta_with(
        options,
        "/src/Box.vue",
        "<script setup lang=\"ts\">\ndefineProps<{ box: { w: number } }>()\n</script>\n",
    );

    let schema = &meta.prop("box").unwrap().schema;
    assert!(schema.is_primitive());
    assert_eq!(schema.type_name(), "{ w: number; }");
}

#[test]
fn test_multiline_defaults_follow_printer_newline() {
    let source = "<script setup lang=\"ts\">\nwithDefaults(defineProps<{ items?: string[] }>(), {\n  items: () => [\n    'a',\n    'b',\n  ],\n})\n</script>\n";
    let crlf = MetaCheckerOptions::from_json(r#"{ "printer": { "newLine": 0 } }"#).unwrap();

    let meta = meta_with(crlf, "/src/List.vue", source);
    assert_eq!(
        meta.prop("items").unwrap().default.as_deref(),
        Some("[\r\n    \"a\",\r\n    \"b\"\r\n]")
    );
}

#[test]
fn test_declarations_point_at_sources() {
    let meta = meta(
        "/src/Tag.vue",
        "<script setup lang=\"ts\">\ndefineProps<{ label: string }>()\n</script>\n",
    );
    let label = meta.prop("label").unwrap();
    assert_eq!(label.declarations.len(), 1);
    assert_eq!(label.declarations[0].file, Path::new("/src/Tag.vue"));
}

#[test]
fn test_named_exports() {
    let fs = MemoryFileSystem::new().with_file(
        "/src/index.ts",
        r#"import { defineComponent } from 'vue'
export const Alert = defineComponent({ props: { level: String } })
export function Badge(props: { count: number }) { return null }
export const VERSION = '1.0'
"#,
    );
    let checker =
        ComponentMetaChecker::for_single_file_with_fs(Arc::new(fs), MetaCheckerOptions::default()).unwrap();

    let exports = checker.get_exported_components(Path::new("/src/index.ts")).unwrap();
    assert_eq!(exports, ["Alert", "Badge"]);

    let badge = checker
        .get_component_meta_for_export(Path::new("/src/index.ts"), "Badge")
        .unwrap();
    assert_eq!(badge.kind, ComponentKind::FunctionLike);
    assert!(badge.prop("count").unwrap().required);
}

#[test]
fn test_edits_are_observed_between_queries() {
    let dir = tempfile::tempdir().unwrap();
    let component = dir.path().join("Button.vue");
    fs::write(dir.path().join("tsconfig.json"), "{ \"include\": [\"**/*\"] }").unwrap();
    fs::write(
        &component,
        "<script setup lang=\"ts\">\ndefineProps<{ label: string }>()\n</script>\n",
    )
    .unwrap();

    let checker =
        ComponentMetaChecker::from_tsconfig(dir.path().join("tsconfig.json"), MetaCheckerOptions::default()).unwrap();
    assert_eq!(declared(&checker.get_component_meta(&component).unwrap()), ["label"]);

    fs::write(
        &component,
        "<script setup lang=\"ts\">\ndefineProps<{ label: string; icon?: string }>()\n</script>\n",
    )
    .unwrap();
    assert_eq!(
        declared(&checker.get_component_meta(&component).unwrap()),
        ["label", "icon"]
    );
}

#[test]
fn test_doc_comments_on_setup_props() {
    let meta = meta(
        "/src/Doc.vue",
        "<script setup lang=\"ts\">\ndefineProps<{\n  /**\n   * string foo\n   * @since v1\n   */\n  foo: string\n  /* plain */ bar?: number\n}>()\n</script>\n",
    );

    assert_eq!(declared(&meta), ["foo", "bar"]);
    let foo = meta.prop("foo").unwrap();
    assert!(foo.required);
    assert_eq!(foo.description, "string foo");
    assert_eq!(foo.tags.len(), 1);
    assert_eq!(foo.tags[0].name, "since");
    assert_eq!(foo.tags[0].text, "v1");
    assert_eq!(meta.prop("bar").unwrap().description, "");
}

#[test]
fn test_unlexable_component_is_a_syntax_error() {
    let sources = [
        "<script setup lang=\"ts\">\ndefineProps<{ /** never closed foo: string }>()\n</script>\n",
        "<script setup lang=\"ts\">\ndefineProps<{ foo: string \\ }>()\n</script>\n",
    ];

    for source in sources {
        let fs = MemoryFileSystem::new().with_file("/src/Broken.vue", source);
        let checker =
            ComponentMetaChecker::for_single_file_with_fs(Arc::new(fs), MetaCheckerOptions::default()).unwrap();

        match checker.get_component_meta(Path::new("/src/Broken.vue")) {
            Err(MetaError::Check(CheckError::Syntax { error, .. })) => {
                // Reported against the whole file, past the opening script tag
                assert!(error.span().start > 24, "{:?}", error);
            }
            other => panic!("expected a syntax error, got {:?}", other.map(|meta| meta.props.len())),
        }
    }
}
