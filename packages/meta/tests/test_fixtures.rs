//! Fixture projects on disk, checked through both a tsconfig file and an in-memory JSON config

use component_meta::{ComponentKind, ComponentMeta, ComponentMetaChecker, MetaCheckerOptions, PropertyMeta};
use serde_json::{json, Value};
use std::path::{Path, PathBuf};

fn fixtures() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures")
}

fn checker_options() -> MetaCheckerOptions {
    MetaCheckerOptions::from_json(
        r#"{
            "forceUseTs": true,
            "noDeclarations": true,
            "schema": { "ignore": ["MyIgnoredNestedProps"] },
            "printer": { "newLine": 1 }
        }"#,
    )
    .unwrap()
}

fn checkers() -> Vec<(&'static str, ComponentMetaChecker)> {
    let tsconfig = ComponentMetaChecker::from_tsconfig(fixtures().join("tsconfig.json"), checker_options()).unwrap();
    let json_config = ComponentMetaChecker::from_json_config(
        fixtures(),
        &json!({ "extends": "../tsconfig.json", "include": ["**/*"] }),
        checker_options(),
    )
    .unwrap();
    vec![("with tsconfig", tsconfig), ("without tsconfig", json_config)]
}

fn prop<'a>(meta: &'a ComponentMeta, name: &str) -> &'a PropertyMeta {
    meta.prop(name)
        .unwrap_or_else(|| panic!("missing prop {}", name))
}

fn schema(prop: &PropertyMeta) -> Value {
    serde_json::to_value(&prop.schema).unwrap()
}

fn nested_prop_entry() -> Value {
    json!({
        "name": "nestedProp",
        "description": "nested prop documentation",
        "tags": [],
        "global": false,
        "required": true,
        "type": "string",
        "declarations": [],
        "schema": "string"
    })
}

fn my_nested_props() -> Value {
    json!({
        "kind": "object",
        "type": "MyNestedProps",
        "schema": { "nestedProp": nested_prop_entry() }
    })
}

#[test]
fn test_empty_component() {
    for (label, checker) in checkers() {
        let meta = checker
            .get_component_meta(&fixtures().join("empty-component/component.vue"))
            .unwrap();

        let names: Vec<&str> = meta.props.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, ["key", "ref", "ref_for", "ref_key", "class", "style"], "{}", label);
        assert!(meta.props.iter().all(|p| p.global), "{}", label);
        assert!(meta
            .props
            .iter()
            .all(|p| p.tags.is_empty() && p.declarations.is_empty() && p.default.is_none()));
    }
}

#[test]
fn test_reference_type_props_scalars() {
    for (label, checker) in checkers() {
        let meta = checker
            .get_component_meta(&fixtures().join("reference-type-props/component.vue"))
            .unwrap();
        assert_eq!(meta.kind, ComponentKind::ClassLike, "{}", label);

        let foo = prop(&meta, "foo");
        assert!(foo.required);
        assert_eq!(foo.type_, "string");
        assert_eq!(schema(foo), json!("string"));
        assert_eq!(foo.description, "string foo");
        let tags: Vec<(&str, &str)> = foo.tags.iter().map(|t| (t.name.as_str(), t.text.as_str())).collect();
        assert_eq!(
            tags,
            [
                ("default", "\"rounded\""),
                ("since", "v1.0.0"),
                ("see", "https://vuejs.org/"),
                (
                    "example",
                    "```vue\n<template>\n  <component foo=\"straight\" />\n</template>\n```"
                ),
            ]
        );

        let bar = prop(&meta, "bar");
        assert_eq!(bar.default.as_deref(), Some("1"));
        assert!(!bar.required);
        assert_eq!(bar.type_, "number | undefined");
        assert_eq!(bar.description, "optional number bar");
        assert_eq!(
            schema(bar),
            json!({ "kind": "enum", "type": "number | undefined", "schema": ["undefined", "number"] })
        );

        let baz = prop(&meta, "baz");
        assert_eq!(baz.default.as_deref(), Some(r#"["foo", "bar"]"#));
        assert!(!baz.required);
        assert_eq!(baz.type_, "string[] | undefined");
        assert_eq!(baz.description, "string array baz");
        assert_eq!(
            schema(baz),
            json!({
                "kind": "enum",
                "type": "string[] | undefined",
                "schema": ["undefined", { "kind": "array", "type": "string[]", "schema": ["string"] }]
            })
        );

        let union = prop(&meta, "union");
        assert!(union.default.is_none());
        assert!(union.required);
        assert_eq!(union.type_, "string | number");
        assert_eq!(
            schema(union),
            json!({ "kind": "enum", "type": "string | number", "schema": ["string", "number"] })
        );

        let union_optional = prop(&meta, "unionOptional");
        assert!(!union_optional.required);
        assert_eq!(union_optional.type_, "string | number | undefined");
        assert_eq!(
            schema(union_optional),
            json!({
                "kind": "enum",
                "type": "string | number | undefined",
                "schema": ["undefined", "string", "number"]
            })
        );
    }
}

#[test]
fn test_reference_type_props_objects() {
    for (label, checker) in checkers() {
        let meta = checker
            .get_component_meta(&fixtures().join("reference-type-props/component.vue"))
            .unwrap();

        let nested = prop(&meta, "nested");
        assert!(nested.required, "{}", label);
        assert_eq!(nested.type_, "MyNestedProps");
        assert_eq!(nested.description, "required nested object");
        assert_eq!(schema(nested), my_nested_props());

        let intersection = prop(&meta, "nestedIntersection");
        assert_eq!(intersection.type_, "MyNestedProps & { additionalProp: string; }");
        assert_eq!(
            schema(intersection),
            json!({
                "kind": "object",
                "type": "MyNestedProps & { additionalProp: string; }",
                "schema": {
                    "nestedProp": nested_prop_entry(),
                    "additionalProp": {
                        "name": "additionalProp",
                        "description": "required additional property",
                        "tags": [],
                        "global": false,
                        "required": true,
                        "type": "string",
                        "declarations": [],
                        "schema": "string"
                    }
                }
            })
        );

        let optional = prop(&meta, "nestedOptional");
        assert!(!optional.required);
        assert_eq!(optional.type_, "MyNestedProps | MyIgnoredNestedProps | undefined");
        assert_eq!(
            schema(optional),
            json!({
                "kind": "enum",
                "type": "MyNestedProps | MyIgnoredNestedProps | undefined",
                "schema": ["undefined", my_nested_props(), "MyIgnoredNestedProps"]
            })
        );

        let array = prop(&meta, "array");
        assert_eq!(array.type_, "MyNestedProps[]");
        assert_eq!(
            schema(array),
            json!({ "kind": "array", "type": "MyNestedProps[]", "schema": [my_nested_props()] })
        );

        let array_optional = prop(&meta, "arrayOptional");
        assert_eq!(array_optional.type_, "MyNestedProps[] | undefined");
        assert_eq!(
            schema(array_optional),
            json!({
                "kind": "enum",
                "type": "MyNestedProps[] | undefined",
                "schema": [
                    "undefined",
                    { "kind": "array", "type": "MyNestedProps[]", "schema": [my_nested_props()] }
                ]
            })
        );

        let inlined = prop(&meta, "inlined");
        assert!(inlined.required);
        assert_eq!(
            schema(inlined),
            json!({
                "kind": "object",
                "type": "{ foo: string; }",
                "schema": {
                    "foo": {
                        "name": "foo",
                        "description": "",
                        "tags": [],
                        "global": false,
                        "required": true,
                        "type": "string",
                        "declarations": [],
                        "schema": "string"
                    }
                }
            })
        );

        let recursive = prop(&meta, "recursive");
        assert_eq!(recursive.type_, "MyNestedRecursiveProps");
        assert_eq!(
            schema(recursive),
            json!({
                "kind": "object",
                "type": "MyNestedRecursiveProps",
                "schema": {
                    "recursive": {
                        "name": "recursive",
                        "description": "",
                        "tags": [],
                        "global": false,
                        "required": true,
                        "type": "MyNestedRecursiveProps",
                        "declarations": [],
                        "schema": "MyNestedRecursiveProps"
                    }
                }
            })
        );
    }
}

#[test]
fn test_reference_type_props_enums_and_literals() {
    for (label, checker) in checkers() {
        let meta = checker
            .get_component_meta(&fixtures().join("reference-type-props/component.vue"))
            .unwrap();

        let enum_value = prop(&meta, "enumValue");
        assert!(enum_value.required, "{}", label);
        assert_eq!(enum_value.type_, "MyEnum");
        assert_eq!(enum_value.description, "enum value");
        assert_eq!(
            schema(enum_value),
            json!({
                "kind": "enum",
                "type": "MyEnum",
                "schema": ["MyEnum.Small", "MyEnum.Medium", "MyEnum.Large"]
            })
        );

        let categories = r#""Uncategorized" | "Content" | "Interaction" | "Display" | "Forms" | "Addons""#;
        let literal = prop(&meta, "literalFromContext");
        assert!(literal.required);
        assert!(literal.default.is_none());
        assert_eq!(literal.type_, categories);
        assert_eq!(literal.description, "literal type alias that require context");
        assert_eq!(
            schema(literal),
            json!({
                "kind": "enum",
                "type": categories,
                "schema": [
                    "\"Uncategorized\"",
                    "\"Content\"",
                    "\"Interaction\"",
                    "\"Display\"",
                    "\"Forms\"",
                    "\"Addons\""
                ]
            })
        );
    }
}

#[test]
fn test_default_omitted_from_json_when_absent() {
    let (_, checker) = checkers().remove(0);
    let meta = checker
        .get_component_meta(&fixtures().join("reference-type-props/component.vue"))
        .unwrap();
    let json = serde_json::to_value(&meta).unwrap();

    assert_eq!(json["type"], "class");
    let foo = json["props"].as_array().unwrap().iter().find(|p| p["name"] == "foo").unwrap();
    assert!(foo.get("default").is_none());
    let bar = json["props"].as_array().unwrap().iter().find(|p| p["name"] == "bar").unwrap();
    assert_eq!(bar["default"], "1");
}

#[test]
fn test_project_files_and_exports() {
    let (_, checker) = checkers().remove(0);
    let files = checker.project_files().unwrap();
    let names: Vec<String> = files
        .iter()
        .map(|f| f.strip_prefix(fixtures()).unwrap().to_string_lossy().replace('\\', "/"))
        .collect();
    assert_eq!(
        names,
        [
            "empty-component/component.vue",
            "reference-type-props/component.vue",
            "reference-type-props/my-props.ts"
        ]
    );

    let exports = checker
        .get_exported_components(&fixtures().join("reference-type-props/my-props.ts"))
        .unwrap();
    assert!(exports.is_empty());
    let exports = checker
        .get_exported_components(&fixtures().join("empty-component/component.vue"))
        .unwrap();
    assert_eq!(exports, ["default"]);
}

#[test]
fn test_files_outside_the_project_are_rejected() {
    let (_, checker) = checkers().remove(0);
    let outside = Path::new(env!("CARGO_MANIFEST_DIR")).join("src/lib.rs");
    assert!(matches!(
        checker.get_component_meta(&outside),
        Err(component_meta::MetaError::NotInProject(_))
    ));
}

#[test]
fn test_repeated_queries_are_byte_identical() {
    let component = fixtures().join("reference-type-props/component.vue");

    for (label, checker) in checkers() {
        let first = serde_json::to_string(&checker.get_component_meta(&component).unwrap()).unwrap();
        let second = serde_json::to_string(&checker.get_component_meta(&component).unwrap()).unwrap();
        assert_eq!(first, second, "{}", label);

        // Object schemas keep declaration order
        let nested = first.find("\"nestedProp\"").unwrap();
        let additional = first.find("\"additionalProp\"").unwrap();
        assert!(nested < additional, "{}", label);
    }

    let (_, tsconfig) = checkers().remove(0);
    let (_, json_config) = checkers().remove(1);
    assert_eq!(
        serde_json::to_string(&tsconfig.get_component_meta(&component).unwrap()).unwrap(),
        serde_json::to_string(&json_config.get_component_meta(&component).unwrap()).unwrap()
    );
}
