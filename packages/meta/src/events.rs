//! Event extraction from `defineEmits` and the `emits` option.

use crate::adapter::TypeChecker;
use crate::schema::{normalize, SchemaContext};
use crate::types::EventMeta;
use component_meta_checker::{
    Declaration, InferMode, LiteralType, Param, Program, Signature, Site, TypeArena, TypeId, TypeKind,
    ValueRef, ValueSymbol,
};
use component_meta_parser::ast::{Expr, ObjectPropertyKind};
use component_meta_parser::{unescape, DocComment};
use std::collections::HashSet;
use tracing::debug;

const MAX_REFERENCE_DEPTH: usize = 8;

/// How a component declares the events it emits
#[derive(Debug, Clone, PartialEq)]
pub enum EmitsDecl {
    /// `defineEmits<T>()`: call signatures or tuple members of `T`
    Typed(TypeId),
    /// `defineEmits([...])`, `defineEmits({...})` or the `emits` option
    Runtime { site: Site, expr: Expr },
}

struct RawEvent {
    name: String,
    args: Vec<Param>,
    doc: Option<DocComment>,
    declarations: Vec<Declaration>,
}

pub fn extract_events(program: &mut Program, emits: &EmitsDecl, ctx: &SchemaContext<'_>) -> Vec<EventMeta> {
    let raw = match emits {
        EmitsDecl::Typed(ty) => typed_events(program.arena(), *ty),
        EmitsDecl::Runtime { site, expr } => {
            let mut events = Vec::new();
            runtime_events(program, *site, expr, 0, &mut events);
            events
        }
    };
    debug!(events = raw.len(), "extracted events");

    raw.into_iter().map(|event| build_event(program, event, ctx)).collect()
}

fn typed_events(arena: &TypeArena, ty: TypeId) -> Vec<RawEvent> {
    let mut events = Vec::new();

    for signature in TypeChecker::call_signatures(arena, ty) {
        let Some((first, rest)) = signature.params.split_first() else {
            continue;
        };
        for name in string_literals(arena, first.ty) {
            events.push(RawEvent {
                name,
                args: rest.to_vec(),
                doc: signature.doc.clone(),
                declarations: signature.declarations.clone(),
            });
        }
    }

    for property in TypeChecker::properties(arena, ty) {
        let target = defined(arena, property.ty);
        let args = if let Some(elements) = arena.tuple_elements(target) {
            elements
                .into_iter()
                .enumerate()
                .map(|(index, element)| Param {
                    name: element.label.unwrap_or_else(|| format!("args_{}", index)),
                    ty: element.ty,
                    optional: element.optional,
                    rest: element.rest,
                })
                .collect()
        } else if let Some(signature) = arena.signature(target) {
            signature.params
        } else {
            continue;
        };

        events.push(RawEvent {
            name: property.name,
            args,
            doc: property.doc,
            declarations: property.declarations,
        });
    }

    events
}

fn runtime_events(program: &mut Program, site: Site, expr: &Expr, depth: usize, out: &mut Vec<RawEvent>) {
    match expr.unwrap_assertions() {
        Expr::Array { elements, .. } => {
            for element in elements {
                if let Expr::String { raw, span } = element {
                    let args = untyped_args(program);
                    out.push(RawEvent {
                        name: unescape(raw),
                        args,
                        doc: None,
                        declarations: vec![program.declaration(site, *span)],
                    });
                }
            }
        }
        Expr::Object(object) => {
            for property in &object.properties {
                let validator = match &property.kind {
                    ObjectPropertyKind::Init(value) => value.clone(),
                    ObjectPropertyKind::Method(function) => Expr::Function(Box::new(function.clone())),
                    _ => continue,
                };
                let args = match validator.unwrap_assertions() {
                    Expr::Function(_) => {
                        let ty = program.type_of_expr(site, &validator, InferMode::Widen);
                        match program.arena().signature(ty) {
                            Some(signature) => signature.params,
                            None => untyped_args(program),
                        }
                    }
                    _ => untyped_args(program),
                };
                out.push(RawEvent {
                    name: property.key.name().to_string(),
                    args,
                    doc: property.doc.clone(),
                    declarations: vec![program.declaration(site, property.span)],
                });
            }
        }
        Expr::Ident { name, .. } if depth < MAX_REFERENCE_DEPTH => {
            let Some(ValueSymbol::Item {
                file,
                value: ValueRef::Declarator { item, index },
            }) = program.resolve_value(site.file, name)
            else {
                return;
            };
            let source = program.file(file);
            if let Some(init) = source.declarator(item, index).and_then(|d| d.init.as_ref()) {
                runtime_events(program, Site { file, unit: item.unit }, init, depth + 1, out);
            }
        }
        _ => {}
    }
}

/// `...args: any[]`
fn untyped_args(program: &mut Program) -> Vec<Param> {
    let ty = program.arena_mut().array(TypeId::ANY);
    vec![Param {
        name: "args".to_string(),
        ty,
        optional: false,
        rest: true,
    }]
}

fn build_event(program: &mut Program, event: RawEvent, ctx: &SchemaContext<'_>) -> EventMeta {
    let event_type = program.arena_mut().string_literal(event.name.clone());
    let mut params = vec![Param {
        name: "event".to_string(),
        ty: event_type,
        optional: false,
        rest: false,
    }];
    params.extend(event.args.iter().cloned());

    let emit = Signature {
        params,
        return_type: TypeId::VOID,
        doc: None,
        declarations: Vec::new(),
    };
    let args = Signature {
        params: event.args,
        ..emit.clone()
    };

    let arena = program.arena();
    let (description, tags) = match event.doc {
        Some(doc) => (doc.description, doc.tags),
        None => (String::new(), Vec::new()),
    };

    EventMeta {
        name: event.name,
        description,
        tags,
        type_: arena.params_to_tuple_string(&args),
        signature: arena.signature_to_string(&emit),
        declarations: if ctx.declarations {
            event.declarations
        } else {
            Vec::new()
        },
        schema: args
            .params
            .iter()
            .map(|param| normalize(arena, param.ty, ctx, &mut HashSet::new()))
            .collect(),
    }
}

fn string_literals(arena: &TypeArena, ty: TypeId) -> Vec<String> {
    let members = match arena.union_members(ty) {
        Some(members) => members.to_vec(),
        None => vec![ty],
    };
    members
        .into_iter()
        .filter_map(|member| match arena.get(member) {
            TypeKind::Literal(LiteralType::String(value)) => Some(value.clone()),
            _ => None,
        })
        .collect()
}

/// The single non-nullable member of an optional type
fn defined(arena: &TypeArena, ty: TypeId) -> TypeId {
    match arena.union_members(ty) {
        Some(members) => {
            let defined: Vec<TypeId> = members.iter().filter(|m| !m.is_nullable()).copied().collect();
            match defined.as_slice() {
                [single] => *single,
                _ => ty,
            }
        }
        None => ty,
    }
}
