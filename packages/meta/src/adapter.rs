//! Query surface the normalizer and the extractors are written against.

use component_meta_checker::{
    Declaration, Signature, TupleElement, TypeArena, TypeId, TypeKind, TypePrinter,
};
use component_meta_parser::DocComment;

/// Structural view of a type, as far as schema building cares
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeShape {
    /// Flattened members of a union; enums count as the union of their members
    Union(Vec<TypeId>),
    Array(TypeId),
    Tuple(Vec<TypeId>),
    /// Object-like with at least one enumerable member
    Object,
    Leaf,
    Unresolved,
}

/// One enumerable member of an object-like type
#[derive(Debug, Clone, PartialEq)]
pub struct PropertySymbol {
    pub name: String,
    /// Declared type; already includes `undefined` for optional members under strict null checks
    pub ty: TypeId,
    pub optional: bool,
    pub doc: Option<DocComment>,
    pub declarations: Vec<Declaration>,
}

pub trait TypeChecker {
    fn shape(&self, ty: TypeId) -> TypeShape;

    fn type_to_string(&self, ty: TypeId) -> String;

    fn properties(&self, ty: TypeId) -> Vec<PropertySymbol>;

    fn call_signatures(&self, ty: TypeId) -> Vec<Signature>;

    /// The single call signature of a function type, ignoring `undefined`
    fn signature(&self, ty: TypeId) -> Option<Signature>;

    fn tuple_elements(&self, ty: TypeId) -> Option<Vec<TupleElement>>;

    /// `(a: string): void` form used for event signatures
    fn signature_to_string(&self, signature: &Signature) -> String;

    /// `[a: string, b: number]` form used for event argument lists
    fn params_to_tuple_string(&self, signature: &Signature) -> String;
}

impl TypeChecker for TypeArena {
    fn shape(&self, ty: TypeId) -> TypeShape {
        if let Some(members) = self.union_members(ty) {
            if members.len() >= 2 {
                return TypeShape::Union(members.to_vec());
            }
        }
        match self.get(ty) {
            TypeKind::Array(element) => TypeShape::Array(*element),
            TypeKind::Tuple { elements, .. } => {
                TypeShape::Tuple(elements.iter().map(|element| element.ty).collect())
            }
            TypeKind::Unresolved(_) => TypeShape::Unresolved,
            _ if self.is_object_like(ty) && !self.properties(ty).is_empty() => TypeShape::Object,
            _ => TypeShape::Leaf,
        }
    }

    fn type_to_string(&self, ty: TypeId) -> String {
        TypePrinter::new(self).print(ty)
    }

    fn properties(&self, ty: TypeId) -> Vec<PropertySymbol> {
        TypeArena::properties(self, ty)
            .into_iter()
            .map(|member| PropertySymbol {
                name: member.name.clone(),
                ty: member.ty,
                optional: member.optional,
                doc: member.doc.clone(),
                declarations: member.declarations.clone(),
            })
            .collect()
    }

    fn call_signatures(&self, ty: TypeId) -> Vec<Signature> {
        TypeArena::call_signatures(self, ty).into_iter().cloned().collect()
    }

    fn signature(&self, ty: TypeId) -> Option<Signature> {
        let target = match self.union_members(ty) {
            Some(members) => {
                let mut defined = members.iter().filter(|member| !member.is_nullable());
                let first = *defined.next()?;
                if defined.next().is_some() {
                    return None;
                }
                first
            }
            None => ty,
        };
        let signatures = TypeArena::call_signatures(self, target);
        match signatures.as_slice() {
            [signature] => Some((*signature).clone()),
            _ => None,
        }
    }

    fn tuple_elements(&self, ty: TypeId) -> Option<Vec<TupleElement>> {
        match self.get(ty) {
            TypeKind::Tuple { elements, .. } => Some(elements.clone()),
            _ => None,
        }
    }

    fn signature_to_string(&self, signature: &Signature) -> String {
        TypePrinter::new(self).print_signature(signature, false)
    }

    fn params_to_tuple_string(&self, signature: &Signature) -> String {
        format!("[{}]", TypePrinter::new(self).print_params(&signature.params))
    }
}
