use component_meta_parser::DocComment;
use ordered_float::OrderedFloat;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;

/// Handle of a type stored in a [`TypeArena`]
///
/// Two handles are equal exactly when they denote the same type identity:
/// structurally equal named types (two interfaces with the same members)
/// still get distinct handles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TypeId(u32);

impl TypeId {
    pub const ANY: TypeId = TypeId(0);
    pub const UNKNOWN: TypeId = TypeId(1);
    pub const NEVER: TypeId = TypeId(2);
    pub const VOID: TypeId = TypeId(3);
    pub const NULL: TypeId = TypeId(4);
    pub const UNDEFINED: TypeId = TypeId(5);
    pub const STRING: TypeId = TypeId(6);
    pub const NUMBER: TypeId = TypeId(7);
    pub const BOOLEAN: TypeId = TypeId(8);
    pub const BIGINT: TypeId = TypeId(9);
    pub const SYMBOL: TypeId = TypeId(10);
    pub const OBJECT: TypeId = TypeId(11);

    pub fn index(self) -> usize {
        self.0 as usize
    }

    pub fn is_nullable(self) -> bool {
        self == TypeId::NULL || self == TypeId::UNDEFINED
    }
}

/// Built-in keyword types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Intrinsic {
    Any,
    Unknown,
    Never,
    Void,
    Null,
    Undefined,
    String,
    Number,
    Boolean,
    BigInt,
    Symbol,
    Object,
}

impl Intrinsic {
    /// In [`TypeId`] order
    pub const ALL: [Intrinsic; 12] = [
        Intrinsic::Any,
        Intrinsic::Unknown,
        Intrinsic::Never,
        Intrinsic::Void,
        Intrinsic::Null,
        Intrinsic::Undefined,
        Intrinsic::String,
        Intrinsic::Number,
        Intrinsic::Boolean,
        Intrinsic::BigInt,
        Intrinsic::Symbol,
        Intrinsic::Object,
    ];

    pub fn id(self) -> TypeId {
        match self {
            Intrinsic::Any => TypeId::ANY,
            Intrinsic::Unknown => TypeId::UNKNOWN,
            Intrinsic::Never => TypeId::NEVER,
            Intrinsic::Void => TypeId::VOID,
            Intrinsic::Null => TypeId::NULL,
            Intrinsic::Undefined => TypeId::UNDEFINED,
            Intrinsic::String => TypeId::STRING,
            Intrinsic::Number => TypeId::NUMBER,
            Intrinsic::Boolean => TypeId::BOOLEAN,
            Intrinsic::BigInt => TypeId::BIGINT,
            Intrinsic::Symbol => TypeId::SYMBOL,
            Intrinsic::Object => TypeId::OBJECT,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Intrinsic::Any => "any",
            Intrinsic::Unknown => "unknown",
            Intrinsic::Never => "never",
            Intrinsic::Void => "void",
            Intrinsic::Null => "null",
            Intrinsic::Undefined => "undefined",
            Intrinsic::String => "string",
            Intrinsic::Number => "number",
            Intrinsic::Boolean => "boolean",
            Intrinsic::BigInt => "bigint",
            Intrinsic::Symbol => "symbol",
            Intrinsic::Object => "object",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LiteralType {
    String(String),
    Number(OrderedFloat<f64>),
    Boolean(bool),
}

impl LiteralType {
    /// The primitive a literal widens to
    pub fn base(&self) -> TypeId {
        match self {
            LiteralType::String(_) => TypeId::STRING,
            LiteralType::Number(_) => TypeId::NUMBER,
            LiteralType::Boolean(_) => TypeId::BOOLEAN,
        }
    }
}

/// A source location that declares a member
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Declaration {
    pub file: PathBuf,
    pub range: [usize; 2],
}

#[derive(Debug, Clone, PartialEq)]
pub struct Member {
    pub name: String,
    /// Declared type; includes `undefined` for optional members under strict null checks
    pub ty: TypeId,
    pub optional: bool,
    pub readonly: bool,
    /// Declared with method syntax (`name(): void`)
    pub method: bool,
    pub doc: Option<DocComment>,
    pub declarations: Vec<Declaration>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Param {
    pub name: String,
    pub ty: TypeId,
    pub optional: bool,
    pub rest: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Signature {
    pub params: Vec<Param>,
    pub return_type: TypeId,
    pub doc: Option<DocComment>,
    pub declarations: Vec<Declaration>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct IndexSignature {
    pub key_name: String,
    pub key: TypeId,
    pub value: TypeId,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TupleElement {
    pub label: Option<String>,
    pub ty: TypeId,
    pub optional: bool,
    pub rest: bool,
}

/// Interfaces, classes, object literal types and aliases of them
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ObjectType {
    /// Display name of named types; `None` for anonymous object literal types
    pub name: Option<String>,
    pub type_args: Vec<TypeId>,
    pub members: Vec<Member>,
    pub call_signatures: Vec<Signature>,
    pub index: Option<IndexSignature>,
}

impl ObjectType {
    pub fn anonymous() -> Self {
        Self::default()
    }

    pub fn named(name: impl Into<String>, type_args: Vec<TypeId>) -> Self {
        Self {
            name: Some(name.into()),
            type_args,
            ..Default::default()
        }
    }

    pub fn member(&self, name: &str) -> Option<&Member> {
        self.members.iter().find(|member| member.name == name)
    }

    /// Append a member; a repeated name only contributes its declaration sites
    pub fn add_member(&mut self, member: Member) {
        match self.members.iter_mut().find(|m| m.name == member.name) {
            Some(existing) => existing.declarations.extend(member.declarations),
            None => self.members.push(member),
        }
    }
}

/// Display name of a type alias, kept on the union it declares
#[derive(Debug, Clone, PartialEq)]
pub struct AliasName {
    pub name: String,
    pub args: Vec<TypeId>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct UnionType {
    /// Flattened, de-duplicated members; `null` and `undefined` last
    pub members: Vec<TypeId>,
    /// Members as written, when they print differently from `members`
    pub origin: Option<Vec<TypeId>>,
    pub alias: Option<AliasName>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct EnumType {
    pub name: String,
    pub members: Vec<TypeId>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum TypeKind {
    Intrinsic(Intrinsic),
    Literal(LiteralType),
    Union(UnionType),
    Intersection(Vec<TypeId>),
    Array(TypeId),
    Tuple {
        elements: Vec<TupleElement>,
        readonly: bool,
    },
    Object(ObjectType),
    Enum(EnumType),
    EnumMember {
        enum_name: String,
        name: String,
        value: Option<LiteralType>,
    },
    Function(Signature),
    /// Library types rendered by name (`Date`, `Record<string, any>`)
    Builtin { name: String, args: Vec<TypeId> },
    /// Type syntax kept as text (mapped or conditional types)
    Opaque(String),
    /// A name that resolved to nothing
    Unresolved(String),
}

/// Owner of every type created while checking one program
#[derive(Debug, Clone)]
pub struct TypeArena {
    types: Vec<TypeKind>,
    literals: HashMap<LiteralType, TypeId>,
    arrays: HashMap<TypeId, TypeId>,
}

impl Default for TypeArena {
    fn default() -> Self {
        Self::new()
    }
}

impl TypeArena {
    pub fn new() -> Self {
        Self {
            types: Intrinsic::ALL.iter().map(|i| TypeKind::Intrinsic(*i)).collect(),
            literals: HashMap::new(),
            arrays: HashMap::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    pub fn get(&self, id: TypeId) -> &TypeKind {
        &self.types[id.index()]
    }

    pub fn alloc(&mut self, kind: TypeKind) -> TypeId {
        let id = TypeId(self.types.len() as u32);
        self.types.push(kind);
        id
    }

    /// Fill in a type registered earlier as a placeholder
    pub fn replace(&mut self, id: TypeId, kind: TypeKind) {
        self.types[id.index()] = kind;
    }

    pub fn literal(&mut self, literal: LiteralType) -> TypeId {
        if let Some(id) = self.literals.get(&literal) {
            return *id;
        }
        let id = self.alloc(TypeKind::Literal(literal.clone()));
        self.literals.insert(literal, id);
        id
    }

    pub fn string_literal(&mut self, value: impl Into<String>) -> TypeId {
        self.literal(LiteralType::String(value.into()))
    }

    pub fn number_literal(&mut self, value: f64) -> TypeId {
        self.literal(LiteralType::Number(OrderedFloat(value)))
    }

    pub fn array(&mut self, element: TypeId) -> TypeId {
        if let Some(id) = self.arrays.get(&element) {
            return *id;
        }
        let id = self.alloc(TypeKind::Array(element));
        self.arrays.insert(element, id);
        id
    }

    pub fn unresolved(&mut self, name: impl Into<String>) -> TypeId {
        self.alloc(TypeKind::Unresolved(name.into()))
    }

    /// `ty | undefined`; `any` and `unknown` are returned unchanged
    pub fn optional(&mut self, ty: TypeId) -> TypeId {
        if ty == TypeId::ANY || ty == TypeId::UNKNOWN {
            return ty;
        }
        self.union(vec![ty, TypeId::UNDEFINED])
    }

    pub fn union(&mut self, types: Vec<TypeId>) -> TypeId {
        self.make_union(types, None)
    }

    /// A union declared by `type Name<Args> = A | B`
    pub fn aliased_union(&mut self, types: Vec<TypeId>, alias: AliasName) -> TypeId {
        self.make_union(types, Some(alias))
    }

    fn make_union(&mut self, origin: Vec<TypeId>, alias: Option<AliasName>) -> TypeId {
        let mut flat = Vec::new();
        for id in &origin {
            self.flatten_union_member(*id, &mut flat);
        }

        if flat.contains(&TypeId::ANY) {
            return TypeId::ANY;
        }
        if flat.contains(&TypeId::UNKNOWN) {
            return TypeId::UNKNOWN;
        }
        flat.retain(|id| *id != TypeId::NEVER);

        // Literals are absorbed by their own primitive
        let bases: Vec<TypeId> = flat
            .iter()
            .filter(|id| matches!(id.index(), 6..=8))
            .copied()
            .collect();
        flat.retain(|id| match self.get(*id) {
            TypeKind::Literal(literal) => !bases.contains(&literal.base()),
            _ => true,
        });

        let true_id = self.literals.get(&LiteralType::Boolean(true)).copied();
        let false_id = self.literals.get(&LiteralType::Boolean(false)).copied();
        if let (Some(t), Some(f)) = (true_id, false_id) {
            if flat.contains(&t) && flat.contains(&f) {
                let first = flat.iter().position(|id| *id == t || *id == f);
                flat.retain(|id| *id != t && *id != f);
                if let Some(position) = first {
                    flat.insert(position.min(flat.len()), TypeId::BOOLEAN);
                }
            }
        }

        let mut members: Vec<TypeId> = flat.iter().filter(|id| !id.is_nullable()).copied().collect();
        for nullable in [TypeId::NULL, TypeId::UNDEFINED] {
            if flat.contains(&nullable) {
                members.push(nullable);
            }
        }

        match members.len() {
            0 => TypeId::NEVER,
            1 => members[0],
            _ => {
                let origin = self.printable_origin(origin, &members);
                self.alloc(TypeKind::Union(UnionType {
                    members,
                    origin,
                    alias,
                }))
            }
        }
    }

    fn flatten_union_member(&self, id: TypeId, out: &mut Vec<TypeId>) {
        let nested: &[TypeId] = match self.get(id) {
            TypeKind::Union(union) => &union.members,
            TypeKind::Enum(enum_type) if !enum_type.members.is_empty() => &enum_type.members,
            _ => std::slice::from_ref(&id),
        };
        for member in nested {
            if !out.contains(member) {
                out.push(*member);
            }
        }
    }

    /// Keep the written members for printing when they still describe the reduced union
    fn printable_origin(&self, origin: Vec<TypeId>, members: &[TypeId]) -> Option<Vec<TypeId>> {
        let mut deduped: Vec<TypeId> = Vec::new();
        for id in origin {
            if !deduped.contains(&id) {
                deduped.push(id);
            }
        }

        let covered = deduped.iter().all(|id| match self.get(*id) {
            TypeKind::Union(union) => union.members.iter().all(|m| members.contains(m)),
            TypeKind::Enum(enum_type) if !enum_type.members.is_empty() => {
                enum_type.members.iter().all(|m| members.contains(m))
            }
            _ => members.contains(id),
        });

        if covered && deduped.as_slice() != members {
            Some(deduped)
        } else {
            None
        }
    }

    pub fn intersection(&mut self, types: Vec<TypeId>) -> TypeId {
        let mut flat: Vec<TypeId> = Vec::new();
        for id in types {
            let nested: Vec<TypeId> = match self.get(id) {
                TypeKind::Intersection(parts) => parts.clone(),
                _ => vec![id],
            };
            for part in nested {
                if !flat.contains(&part) {
                    flat.push(part);
                }
            }
        }

        if flat.contains(&TypeId::NEVER) {
            return TypeId::NEVER;
        }
        if flat.contains(&TypeId::ANY) {
            return TypeId::ANY;
        }
        flat.retain(|id| *id != TypeId::UNKNOWN);

        match flat.len() {
            0 => TypeId::UNKNOWN,
            1 => flat[0],
            _ => self.alloc(TypeKind::Intersection(flat)),
        }
    }

    /// Object types without call signatures, and intersections made only of them
    pub fn is_object_like(&self, id: TypeId) -> bool {
        match self.get(id) {
            TypeKind::Object(object) => object.call_signatures.is_empty(),
            TypeKind::Intersection(parts) => parts.iter().all(|part| self.is_object_like(*part)),
            _ => false,
        }
    }

    /// Enumerable members in declaration order; for intersections the first
    /// constituent declaring a name wins
    pub fn properties(&self, id: TypeId) -> Vec<&Member> {
        let mut members: Vec<&Member> = Vec::new();
        self.collect_properties(id, &mut members);
        members
    }

    fn collect_properties<'a>(&'a self, id: TypeId, out: &mut Vec<&'a Member>) {
        match self.get(id) {
            TypeKind::Object(object) => {
                for member in &object.members {
                    if !out.iter().any(|m| m.name == member.name) {
                        out.push(member);
                    }
                }
            }
            TypeKind::Intersection(parts) => {
                for part in parts {
                    self.collect_properties(*part, out);
                }
            }
            _ => {}
        }
    }

    pub fn property(&self, id: TypeId, name: &str) -> Option<&Member> {
        self.properties(id).into_iter().find(|member| member.name == name)
    }

    /// Members of a union, or of an enum viewed as the union of its members
    pub fn union_members(&self, id: TypeId) -> Option<&[TypeId]> {
        match self.get(id) {
            TypeKind::Union(union) => Some(&union.members),
            TypeKind::Enum(enum_type) if !enum_type.members.is_empty() => Some(&enum_type.members),
            _ => None,
        }
    }

    /// Call signatures of function types and callable object types
    pub fn call_signatures(&self, id: TypeId) -> Vec<&Signature> {
        match self.get(id) {
            TypeKind::Function(signature) => vec![signature],
            TypeKind::Object(object) => object.call_signatures.iter().collect(),
            TypeKind::Intersection(parts) => parts
                .iter()
                .flat_map(|part| self.call_signatures(*part))
                .collect(),
            _ => Vec::new(),
        }
    }

    /// Drop `undefined` from a union (the declared type of an optional member)
    pub fn non_optional(&mut self, id: TypeId) -> TypeId {
        match self.get(id) {
            TypeKind::Union(union) if union.members.contains(&TypeId::UNDEFINED) => {
                let members: Vec<TypeId> = union
                    .members
                    .iter()
                    .filter(|m| **m != TypeId::UNDEFINED)
                    .copied()
                    .collect();
                self.union(members)
            }
            _ => id,
        }
    }
}
