use component_meta_parser::ast::*;
use component_meta_parser::{parse_module, parse_sfc, ParseError};

fn parse_ok(source: &str) -> Module {
    let result = parse_module(source);
    if let Err(e) = &result {
        eprintln!("Parse error: {:?}", e);
    }
    result.unwrap()
}

#[test]
fn test_reference_type_props_sfc() {
    let source = r#"<script setup lang="ts">
import { MyProps } from './my-props';

defineProps<MyProps>();
</script>
"#;

    let sfc = parse_sfc(source).unwrap();
    let script = sfc.setup_script().unwrap();
    let module = parse_ok(script.content);

    assert_eq!(module.items.len(), 2);
    let Item::Import(import) = &module.items[0] else {
        panic!("expected import");
    };
    assert_eq!(import.source, "./my-props");
    assert_eq!(import.named[0].local, "MyProps");

    let Item::Expression { expr, .. } = &module.items[1] else {
        panic!("expected defineProps call");
    };
    assert_eq!(expr.callee_name(), Some("defineProps"));
}

#[test]
fn test_props_declaration_file() {
    let source = r#"
import { MyEnum } from './my-enum';

export interface MyNestedProps {
	/**
	 * nested prop documentation
	 */
	nestedProp: string;
}

export interface MyIgnoredNestedProps {
	nestedProp: string;
}

export interface MyNestedRecursiveProps {
	recursive: MyNestedRecursiveProps
}

export interface MyProps {
	/**
	 * string foo
	 *
	 * @default "rounded"
	 * @since v1.0.0
	 * @see https://vuejs.org/
	 * @example
	 * ```vue
	 * <template>
	 *   <component foo="straight" />
	 * </template>
	 * ```
	 */
	foo: string,
	/**
	 * optional number bar
	 */
	bar?: number,
	/**
	 * string array baz
	 */
	baz?: string[],
	/**
	 * required union type
	 */
	union: string | number,
	/**
	 * optional union type
	 */
	unionOptional?: string | number,
	/**
	 * required nested object
	 */
	nested: MyNestedProps,
	/**
	 * required nested object with intersection
	 */
	nestedIntersection: MyNestedProps & {
		/**
		 * required additional property
		 */
		additionalProp: string;
	},
	/**
	 * optional nested object
	 */
	nestedOptional?: MyNestedProps | MyIgnoredNestedProps,
	/**
	 * required array object
	 */
	array: MyNestedProps[],
	/**
	 * optional array object
	 */
	arrayOptional?: MyNestedProps[],
	/**
	 * enum value
	 */
	enumValue: MyEnum,
	/**
	 * literal type alias that require context
	 */
	literalFromContext: MyCategories,
	inlined: { foo: string; },
	recursive: MyNestedRecursiveProps
}

export enum MyEnum {
	Small,
	Medium,
	Large,
}

const categories = [
	'Uncategorized',
	'Content',
	'Interaction',
	'Display',
	'Forms',
	'Addons',
] as const;

type MyCategories = typeof categories[number];
"#;

    let module = parse_ok(source);

    let props = module
        .items
        .iter()
        .find_map(|item| match item {
            Item::Interface(decl) if decl.name == "MyProps" => Some(decl),
            _ => None,
        })
        .unwrap();

    assert_eq!(props.members.len(), 14);
    let foo = &props.members[0];
    let doc = foo.doc.as_ref().unwrap();
    assert_eq!(doc.description, "string foo");
    assert_eq!(doc.tags.len(), 4);
    assert_eq!(doc.tags[3].name, "example");

    let nested_intersection = &props.members[6];
    let TypeMemberKind::Property(Some(TypeExpr::Intersection { members, .. })) =
        &nested_intersection.kind
    else {
        panic!("expected intersection");
    };
    let TypeExpr::Object { members: inline, .. } = &members[1] else {
        panic!("expected inline object");
    };
    assert_eq!(
        inline[0].doc.as_ref().unwrap().description,
        "required additional property"
    );

    let alias = module
        .items
        .iter()
        .find_map(|item| match item {
            Item::TypeAlias(decl) => Some(decl),
            _ => None,
        })
        .unwrap();
    let TypeExpr::IndexedAccess { object, index, .. } = &alias.type_ else {
        panic!("expected indexed access");
    };
    assert!(matches!(object.as_ref(), TypeExpr::TypeQuery { name, .. } if name == "categories"));
    assert!(matches!(
        index.as_ref(),
        TypeExpr::Keyword {
            keyword: TypeKeyword::Number,
            ..
        }
    ));

    let categories = module
        .items
        .iter()
        .find_map(|item| match item {
            Item::Variable(decl) => Some(decl),
            _ => None,
        })
        .unwrap();
    assert!(matches!(
        categories.declarators[0].init,
        Some(Expr::TypeAssertion { .. })
    ));
}

#[test]
fn test_functional_component() {
    let source = r#"
import { h } from 'vue'

export default function Badge(props: { label: string; count?: number }) {
    return h('span', props.label)
}
"#;

    let module = parse_ok(source);
    let Item::ExportDefault(ExportDefault::Function(decl)) = &module.items[1] else {
        panic!("expected default function export");
    };
    assert_eq!(decl.name.as_deref(), Some("Badge"));
    assert!(matches!(
        decl.function.params[0].type_,
        Some(TypeExpr::Object { .. })
    ));
}

#[test]
fn test_ast_serializes() {
    let module = parse_ok("export type Size = 'small' | 'large'");
    let json = serde_json::to_value(&module).unwrap();
    assert_eq!(json["items"][0]["item"], "TypeAlias");
    assert_eq!(json["items"][0]["type_"]["type"], "Union");
}

#[test]
fn test_syntax_errors() {
    let cases = [
        "export interface {",
        "import { a from './a'",
        "export const value = (1",
        "}",
    ];

    for source in cases {
        let result = parse_module(source);
        assert!(result.is_err(), "expected error for {:?}", source);
    }

    assert!(matches!(
        parse_module("type A = "),
        Err(ParseError::UnexpectedEof { .. })
    ));
}
