use crate::adapter::{PropertySymbol, TypeChecker};
use crate::schema::{normalize, SchemaContext};
use crate::types::PropertyMeta;
use component_meta_checker::TypeId;
use std::collections::HashSet;

/// Combine a member's type, documentation and declaration sites into one record
///
/// `required` comes only from the optionality marker; defaults are resolved
/// separately and attached by the caller.
pub fn build_property<C: TypeChecker + ?Sized>(
    checker: &C,
    property: &PropertySymbol,
    ctx: &SchemaContext<'_>,
    in_expansion: &mut HashSet<TypeId>,
) -> PropertyMeta {
    let (description, tags) = match &property.doc {
        Some(doc) => (doc.description.clone(), doc.tags.clone()),
        None => (String::new(), Vec::new()),
    };

    PropertyMeta {
        name: property.name.clone(),
        description,
        tags,
        global: false,
        required: !property.optional,
        type_: checker.type_to_string(property.ty),
        default: None,
        declarations: if ctx.declarations {
            property.declarations.clone()
        } else {
            Vec::new()
        },
        schema: normalize(checker, property.ty, ctx, in_expansion),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::SchemaNode;
    use component_meta_checker::{Declaration, TypeArena};
    use component_meta_parser::{DocComment, DocTag};
    use std::path::PathBuf;

    fn documented(arena: &mut TypeArena) -> PropertySymbol {
        PropertySymbol {
            name: "size".to_string(),
            ty: arena.optional(TypeId::NUMBER),
            optional: true,
            doc: Some(DocComment {
                description: "Size in pixels".to_string(),
                tags: vec![
                    DocTag {
                        name: "since".to_string(),
                        text: "v1".to_string(),
                    },
                    DocTag {
                        name: "since".to_string(),
                        text: "v2".to_string(),
                    },
                ],
            }),
            declarations: vec![
                Declaration {
                    file: PathBuf::from("/src/a.ts"),
                    range: [10, 24],
                },
                Declaration {
                    file: PathBuf::from("/src/b.ts"),
                    range: [3, 17],
                },
            ],
        }
    }

    #[test]
    fn test_build_property() {
        let mut arena = TypeArena::new();
        let property = documented(&mut arena);
        let meta = build_property(&arena, &property, &SchemaContext::default(), &mut HashSet::new());

        assert_eq!(meta.name, "size");
        assert!(!meta.required);
        assert!(!meta.global);
        assert_eq!(meta.type_, "number | undefined");
        assert_eq!(meta.description, "Size in pixels");
        assert_eq!(meta.tags.len(), 2);
        assert_eq!(meta.declarations.len(), 2);
        assert_eq!(meta.default, None);
        assert!(matches!(meta.schema, SchemaNode::Enum { .. }));
    }

    #[test]
    fn test_suppressed_declarations() {
        let mut arena = TypeArena::new();
        let property = documented(&mut arena);
        let ctx = SchemaContext {
            declarations: false,
            ..Default::default()
        };
        let meta = build_property(&arena, &property, &ctx, &mut HashSet::new());
        assert!(meta.declarations.is_empty());
    }
}
