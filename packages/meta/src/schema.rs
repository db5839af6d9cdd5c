//! Schema normalization.
//!
//! Turns a checker type into a bounded [`SchemaNode`] tree. Expansion stops at
//! ignored type names and at types already being expanded further up the
//! tree, so recursive type graphs always produce a finite schema.

use crate::adapter::{TypeChecker, TypeShape};
use crate::merger::build_property;
use crate::types::PropertyMeta;
use component_meta_checker::TypeId;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Shape description of one type
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "SchemaRepr", into = "SchemaRepr")]
pub enum SchemaNode {
    /// Serialized as the bare type string
    Primitive(String),
    Enum {
        type_: String,
        schema: Vec<SchemaNode>,
    },
    Object {
        type_: String,
        schema: IndexMap<String, PropertyMeta>,
    },
    Array {
        type_: String,
        schema: Vec<SchemaNode>,
    },
}

impl SchemaNode {
    /// The rendered type this node describes
    pub fn type_name(&self) -> &str {
        match self {
            SchemaNode::Primitive(type_)
            | SchemaNode::Enum { type_, .. }
            | SchemaNode::Object { type_, .. }
            | SchemaNode::Array { type_, .. } => type_,
        }
    }

    pub fn is_primitive(&self) -> bool {
        matches!(self, SchemaNode::Primitive(_))
    }
}

impl From<&str> for SchemaNode {
    fn from(type_: &str) -> Self {
        SchemaNode::Primitive(type_.to_string())
    }
}

#[derive(Serialize, Deserialize)]
#[serde(untagged)]
enum SchemaRepr {
    Primitive(String),
    Composite(CompositeRepr),
}

#[derive(Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
enum CompositeRepr {
    Enum {
        #[serde(rename = "type")]
        type_: String,
        schema: Vec<SchemaNode>,
    },
    Object {
        #[serde(rename = "type")]
        type_: String,
        schema: IndexMap<String, PropertyMeta>,
    },
    Array {
        #[serde(rename = "type")]
        type_: String,
        schema: Vec<SchemaNode>,
    },
}

impl From<SchemaRepr> for SchemaNode {
    fn from(repr: SchemaRepr) -> Self {
        match repr {
            SchemaRepr::Primitive(type_) => SchemaNode::Primitive(type_),
            SchemaRepr::Composite(CompositeRepr::Enum { type_, schema }) => SchemaNode::Enum { type_, schema },
            SchemaRepr::Composite(CompositeRepr::Object { type_, schema }) => {
                SchemaNode::Object { type_, schema }
            }
            SchemaRepr::Composite(CompositeRepr::Array { type_, schema }) => SchemaNode::Array { type_, schema },
        }
    }
}

impl From<SchemaNode> for SchemaRepr {
    fn from(node: SchemaNode) -> Self {
        match node {
            SchemaNode::Primitive(type_) => SchemaRepr::Primitive(type_),
            SchemaNode::Enum { type_, schema } => SchemaRepr::Composite(CompositeRepr::Enum { type_, schema }),
            SchemaNode::Object { type_, schema } => {
                SchemaRepr::Composite(CompositeRepr::Object { type_, schema })
            }
            SchemaNode::Array { type_, schema } => SchemaRepr::Composite(CompositeRepr::Array { type_, schema }),
        }
    }
}

/// Settings shared by every node of one schema build
#[derive(Debug, Clone, Copy)]
pub struct SchemaContext<'a> {
    /// Rendered type names that never expand
    pub ignore: &'a [String],
    /// `false` collapses every schema to the bare type string
    pub enabled: bool,
    /// Keep declaration sites on nested properties
    pub declarations: bool,
}

impl Default for SchemaContext<'_> {
    fn default() -> Self {
        Self {
            ignore: &[],
            enabled: true,
            declarations: true,
        }
    }
}

/// Build the schema of `ty`
///
/// `in_expansion` holds the object types currently being expanded on the path
/// from the root; callers start every top-level build with an empty set.
pub fn normalize<C: TypeChecker + ?Sized>(
    checker: &C,
    ty: TypeId,
    ctx: &SchemaContext<'_>,
    in_expansion: &mut HashSet<TypeId>,
) -> SchemaNode {
    let rendered = checker.type_to_string(ty);

    if !ctx.enabled || in_expansion.contains(&ty) || ctx.ignore.iter().any(|name| *name == rendered) {
        return SchemaNode::Primitive(rendered);
    }

    match checker.shape(ty) {
        TypeShape::Union(members) => {
            let mut ordered: Vec<TypeId> = members.iter().filter(|m| **m == TypeId::UNDEFINED).copied().collect();
            ordered.extend(members.iter().filter(|m| **m != TypeId::UNDEFINED));
            let schema = ordered
                .into_iter()
                .map(|member| normalize(checker, member, ctx, in_expansion))
                .collect();
            SchemaNode::Enum {
                type_: rendered,
                schema,
            }
        }
        TypeShape::Array(element) => SchemaNode::Array {
            type_: rendered,
            schema: vec![normalize(checker, element, ctx, in_expansion)],
        },
        TypeShape::Tuple(elements) => SchemaNode::Array {
            type_: rendered,
            schema: elements
                .into_iter()
                .map(|element| normalize(checker, element, ctx, in_expansion))
                .collect(),
        },
        TypeShape::Object => {
            in_expansion.insert(ty);
            let mut schema = IndexMap::new();
            for property in checker.properties(ty) {
                let meta = build_property(checker, &property, ctx, in_expansion);
                schema.insert(meta.name.clone(), meta);
            }
            in_expansion.remove(&ty);
            SchemaNode::Object {
                type_: rendered,
                schema,
            }
        }
        TypeShape::Unresolved => SchemaNode::Primitive("unknown".to_string()),
        TypeShape::Leaf => SchemaNode::Primitive(rendered),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use component_meta_checker::{Member, ObjectType, TypeArena, TypeKind};
    use serde_json::json;

    fn member(name: &str, ty: TypeId, optional: bool) -> Member {
        Member {
            name: name.to_string(),
            ty,
            optional,
            readonly: false,
            method: false,
            doc: None,
            declarations: Vec::new(),
        }
    }

    fn schema_of(arena: &TypeArena, ty: TypeId, ctx: &SchemaContext<'_>) -> serde_json::Value {
        let node = normalize(arena, ty, ctx, &mut HashSet::new());
        serde_json::to_value(node).unwrap()
    }

    #[test]
    fn test_optional_union_puts_undefined_first() {
        let mut arena = TypeArena::new();
        let bar = arena.optional(TypeId::NUMBER);

        assert_eq!(
            schema_of(&arena, bar, &SchemaContext::default()),
            json!({ "kind": "enum", "type": "number | undefined", "schema": ["undefined", "number"] })
        );
    }

    #[test]
    fn test_recursive_object_terminates() {
        let mut arena = TypeArena::new();
        let node = arena.alloc(TypeKind::Object(ObjectType::named("Node", Vec::new())));
        let mut object = ObjectType::named("Node", Vec::new());
        object.add_member(member("next", node, false));
        arena.replace(node, TypeKind::Object(object));

        let ctx = SchemaContext {
            declarations: false,
            ..Default::default()
        };
        assert_eq!(
            schema_of(&arena, node, &ctx),
            json!({
                "kind": "object",
                "type": "Node",
                "schema": {
                    "next": {
                        "name": "next",
                        "description": "",
                        "tags": [],
                        "global": false,
                        "required": true,
                        "type": "Node",
                        "declarations": [],
                        "schema": "Node"
                    }
                }
            })
        );
    }

    #[test]
    fn test_ignored_names_and_disabled_schema() {
        let mut arena = TypeArena::new();
        let mut object = ObjectType::named("Ignored", Vec::new());
        object.add_member(member("a", TypeId::STRING, false));
        let ignored = arena.alloc(TypeKind::Object(object));
        let list = arena.array(ignored);

        let ignore = vec!["Ignored".to_string()];
        let ctx = SchemaContext {
            ignore: &ignore,
            ..Default::default()
        };
        assert_eq!(
            schema_of(&arena, list, &ctx),
            json!({ "kind": "array", "type": "Ignored[]", "schema": ["Ignored"] })
        );

        let disabled = SchemaContext {
            enabled: false,
            ..Default::default()
        };
        assert_eq!(schema_of(&arena, list, &disabled), json!("Ignored[]"));
    }

    #[test]
    fn test_structural_duplicates_are_kept() {
        let mut arena = TypeArena::new();
        let mut first = ObjectType::named("A", Vec::new());
        first.add_member(member("x", TypeId::STRING, false));
        let mut second = ObjectType::named("A", Vec::new());
        second.add_member(member("x", TypeId::STRING, false));
        let first = arena.alloc(TypeKind::Object(first));
        let second = arena.alloc(TypeKind::Object(second));
        let union = arena.union(vec![first, second]);

        let SchemaNode::Enum { schema, .. } = normalize(&arena, union, &SchemaContext::default(), &mut HashSet::new())
        else {
            panic!("expected enum schema");
        };
        assert_eq!(schema.len(), 2);
        assert_eq!(schema[0], schema[1]);
    }

    #[test]
    fn test_schema_round_trips_through_json() {
        let value = json!({ "kind": "array", "type": "[string, number]", "schema": ["string", "number"] });
        let node: SchemaNode = serde_json::from_value(value).unwrap();
        assert_eq!(
            node,
            SchemaNode::Array {
                type_: "[string, number]".to_string(),
                schema: vec!["string".into(), "number".into()],
            }
        );
        assert_eq!(node.type_name(), "[string, number]");
    }
}
