use crate::adapter::TypeChecker;
use crate::schema::{normalize, SchemaContext};
use crate::types::SlotMeta;
use component_meta_checker::{ObjectType, Program, TypeId, TypeKind};
use std::collections::HashSet;

/// One entry per member of a slots type (`defineSlots<T>()`, `SlotsType<T>`)
///
/// A slot declared as a function is described by its first parameter, the
/// props the slot receives.
pub fn extract_slots(program: &mut Program, slots: TypeId, ctx: &SchemaContext<'_>) -> Vec<SlotMeta> {
    let properties = TypeChecker::properties(program.arena(), slots);
    let mut result = Vec::with_capacity(properties.len());

    for property in properties {
        let signature = program.arena().signature(property.ty);
        let props = match signature.as_ref().map(|signature| signature.params.first()) {
            Some(Some(param)) => program.arena_mut().non_optional(param.ty),
            Some(None) => program
                .arena_mut()
                .alloc(TypeKind::Object(ObjectType::anonymous())),
            None => program.arena_mut().non_optional(property.ty),
        };

        let arena = program.arena();
        result.push(SlotMeta {
            name: property.name,
            description: property.doc.map(|doc| doc.description).unwrap_or_default(),
            type_: arena.type_to_string(props),
            declarations: if ctx.declarations {
                property.declarations
            } else {
                Vec::new()
            },
            schema: normalize(arena, props, ctx, &mut HashSet::new()),
        });
    }

    result
}
