//! Lowering of type syntax and value expressions into arena types.

use crate::program::{FileId, InstantiationKey, ItemRef, Program, Site, TypeTarget, ValueRef, ValueSymbol};
use crate::scope::Scope;
use crate::types::{
    AliasName, EnumType, IndexSignature, LiteralType, Member, ObjectType, TupleElement, TypeId, TypeKind,
};
use component_meta_parser::ast::*;
use component_meta_parser::unescape;
use ordered_float::OrderedFloat;
use std::rc::Rc;
use tracing::{debug, warn};

/// How literal expressions widen when their type is inferred
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InferMode {
    /// Initializer of a `const` declaration: top-level primitives stay literal
    Literal,
    /// Mutable locations: literals widen to their primitive
    Widen,
    /// Under `as const`: everything stays literal and arrays become readonly tuples
    Const,
}

impl InferMode {
    fn nested(self) -> Self {
        match self {
            InferMode::Const => InferMode::Const,
            _ => InferMode::Widen,
        }
    }
}

fn keyword_type(keyword: TypeKeyword) -> TypeId {
    match keyword {
        TypeKeyword::Any => TypeId::ANY,
        TypeKeyword::Unknown => TypeId::UNKNOWN,
        TypeKeyword::Never => TypeId::NEVER,
        TypeKeyword::Void => TypeId::VOID,
        TypeKeyword::Null => TypeId::NULL,
        TypeKeyword::Undefined => TypeId::UNDEFINED,
        TypeKeyword::String => TypeId::STRING,
        TypeKeyword::Number => TypeId::NUMBER,
        TypeKeyword::Boolean => TypeId::BOOLEAN,
        TypeKeyword::BigInt => TypeId::BIGINT,
        TypeKeyword::Symbol => TypeId::SYMBOL,
        TypeKeyword::Object => TypeId::OBJECT,
    }
}

/// Parse numeric source text (`1_000`, `0x1f`, `-2.5e3`)
pub fn parse_number(raw: &str) -> Option<f64> {
    let text = raw.replace('_', "");
    let (negative, digits) = match text.strip_prefix('-') {
        Some(rest) => (true, rest.to_string()),
        None => (false, text.trim_start_matches('+').to_string()),
    };

    let lower = digits.to_ascii_lowercase();
    let value = if let Some(hex) = lower.strip_prefix("0x") {
        i64::from_str_radix(hex, 16).ok()? as f64
    } else if let Some(bin) = lower.strip_prefix("0b") {
        i64::from_str_radix(bin, 2).ok()? as f64
    } else if let Some(oct) = lower.strip_prefix("0o") {
        i64::from_str_radix(oct, 8).ok()? as f64
    } else {
        lower.trim_end_matches('n').parse::<f64>().ok()?
    };

    Some(if negative { -value } else { value })
}

fn is_const_assertion(type_: &TypeExpr) -> bool {
    matches!(type_, TypeExpr::Reference { name, args, .. } if name == "const" && args.is_empty())
}

impl Program {
    /// Lower a type annotation written at `site`
    ///
    /// Annotations in untyped sources lower to `any` unless typed analysis is forced.
    pub fn lower_type(&mut self, site: Site, expr: &TypeExpr) -> TypeId {
        if !self.file(site.file).typed {
            return TypeId::ANY;
        }
        self.lower(site, expr, &Rc::new(Scope::new()))
    }

    /// Type of a name as seen from the top level of `file`
    pub fn type_named(&mut self, file: FileId, name: &str) -> TypeId {
        let site = Site { file, unit: 0 };
        self.lower_reference(site, name, &[], &Rc::new(Scope::new()))
    }

    pub(crate) fn lower(&mut self, site: Site, expr: &TypeExpr, scope: &Rc<Scope>) -> TypeId {
        match expr {
            TypeExpr::Keyword { keyword, .. } => keyword_type(*keyword),
            TypeExpr::Literal { literal, .. } => self.lower_literal(literal),
            TypeExpr::Reference { name, args, .. } => self.lower_reference(site, name, args, scope),
            TypeExpr::Union { members, .. } => {
                let members = members.iter().map(|m| self.lower(site, m, scope)).collect();
                self.arena.union(members)
            }
            TypeExpr::Intersection { members, .. } => {
                let members = members.iter().map(|m| self.lower(site, m, scope)).collect();
                self.arena.intersection(members)
            }
            TypeExpr::Array { element, .. } => {
                let element = self.lower(site, element, scope);
                self.arena.array(element)
            }
            TypeExpr::Tuple { elements, .. } => {
                let elements = elements
                    .iter()
                    .map(|element| TupleElement {
                        label: element.label.clone(),
                        ty: self.lower(site, &element.type_, scope),
                        optional: element.optional,
                        rest: element.rest,
                    })
                    .collect();
                self.arena.alloc(TypeKind::Tuple {
                    elements,
                    readonly: false,
                })
            }
            TypeExpr::Object { members, .. } => {
                let mut object = ObjectType::anonymous();
                self.lower_members(site, members, scope, &mut object);
                self.arena.alloc(TypeKind::Object(object))
            }
            TypeExpr::Function { signature, .. } => {
                let signature = self.lower_signature(
                    site,
                    &signature.type_params,
                    &signature.params,
                    signature.return_type.as_ref(),
                    None,
                    scope,
                );
                self.arena.alloc(TypeKind::Function(signature))
            }
            TypeExpr::TypeQuery { name, .. } => self.lower_type_query(site.file, name),
            TypeExpr::KeyOf { operand, .. } => {
                let operand = self.lower(site, operand, scope);
                self.key_of(operand)
            }
            TypeExpr::IndexedAccess { object, index, .. } => {
                let object = self.lower(site, object, scope);
                let index = self.lower(site, index, scope);
                self.indexed_access(object, index)
            }
            TypeExpr::Opaque { text, .. } => self.arena.alloc(TypeKind::Opaque(text.clone())),
        }
    }

    fn lower_literal(&mut self, literal: &LiteralTypeExpr) -> TypeId {
        match literal {
            LiteralTypeExpr::String(value) => self.arena.string_literal(value.clone()),
            LiteralTypeExpr::Number(raw) => match parse_number(raw) {
                Some(value) => self.arena.number_literal(value),
                None => TypeId::NUMBER,
            },
            LiteralTypeExpr::Boolean(value) => self.arena.literal(LiteralType::Boolean(*value)),
        }
    }

    fn lower_reference(&mut self, site: Site, name: &str, args: &[TypeExpr], scope: &Rc<Scope>) -> TypeId {
        if args.is_empty() {
            if let Some(bound) = scope.lookup(name) {
                return bound;
            }
        }

        let arg_types: Vec<TypeId> = args.iter().map(|arg| self.lower(site, arg, scope)).collect();

        if matches!(name, "Array" | "ReadonlyArray") && arg_types.len() == 1 {
            return self.arena.array(arg_types[0]);
        }

        if let Some((head, rest)) = name.split_once('.') {
            return self.lower_qualified(site.file, name, head, rest, arg_types);
        }

        match self.resolve_type(site.file, name) {
            Some(target) => self.type_of_target(target, name, arg_types),
            None => {
                warn!(name, file = %self.file(site.file).path.display(), "unresolved type reference");
                self.arena.unresolved(name)
            }
        }
    }

    /// `Enum.Member` and `namespace.Type`
    fn lower_qualified(
        &mut self,
        file: FileId,
        full: &str,
        head: &str,
        rest: &str,
        args: Vec<TypeId>,
    ) -> TypeId {
        match self.resolve_type(file, head) {
            Some(TypeTarget::Namespace(target)) => {
                let mut visited = Default::default();
                match self.resolve_export_type(target, rest, &mut visited) {
                    Some(found) => self.type_of_target(found, rest, args),
                    None => self.arena.unresolved(full),
                }
            }
            Some(target @ TypeTarget::Decl { .. }) => {
                let ty = self.type_of_target(target, head, Vec::new());
                let members = match self.arena.get(ty) {
                    TypeKind::Enum(enum_type) => enum_type.members.clone(),
                    _ => Vec::new(),
                };
                members
                    .into_iter()
                    .find(|member| {
                        matches!(self.arena.get(*member), TypeKind::EnumMember { name, .. } if name == rest)
                    })
                    .unwrap_or_else(|| self.arena.unresolved(full))
            }
            Some(TypeTarget::Builtin(_)) => self.arena.alloc(TypeKind::Builtin {
                name: full.to_string(),
                args,
            }),
            None => {
                warn!(name = full, "unresolved qualified type reference");
                self.arena.unresolved(full)
            }
        }
    }

    fn type_of_target(&mut self, target: TypeTarget, name: &str, args: Vec<TypeId>) -> TypeId {
        match target {
            TypeTarget::Decl { file, items } => self.instantiate(file, &items, args),
            TypeTarget::Builtin(builtin) => self.arena.alloc(TypeKind::Builtin { name: builtin, args }),
            TypeTarget::Namespace(_) => {
                warn!(name, "namespace used as a type");
                self.arena.unresolved(name)
            }
        }
    }

    /// Instantiate a named declaration (interface, alias, enum or class)
    fn instantiate(&mut self, file: FileId, items: &[ItemRef], args: Vec<TypeId>) -> TypeId {
        let Some(first) = items.first().copied() else {
            return TypeId::UNKNOWN;
        };
        let source = self.file(file);
        let Some(item) = source.item(first) else {
            return TypeId::UNKNOWN;
        };
        let site = Site {
            file,
            unit: first.unit,
        };

        let type_params: &[TypeParam] = match item {
            Item::Interface(decl) => &decl.type_params,
            Item::TypeAlias(decl) => &decl.type_params,
            Item::Class(decl) => &decl.type_params,
            Item::ExportDefault(ExportDefault::Class(decl)) => &decl.type_params,
            _ => &[],
        };

        // Bind parameters; missing arguments take their default or `unknown`
        let mut scope = Scope::new();
        let mut bound = Vec::with_capacity(type_params.len());
        for (index, param) in type_params.iter().enumerate() {
            let ty = match args.get(index) {
                Some(arg) => *arg,
                None => match &param.default {
                    Some(default) => {
                        let partial = Rc::new(scope.clone());
                        self.lower(site, default, &partial)
                    }
                    None => TypeId::UNKNOWN,
                },
            };
            scope.bind(param.name.clone(), ty);
            bound.push(ty);
        }
        let scope = Rc::new(scope);

        let key = InstantiationKey {
            file,
            item: first,
            args: bound.clone(),
        };
        if let Some(existing) = self.instantiations.get(&key) {
            return *existing;
        }
        if self.depth >= self.options.max_instantiation_depth {
            warn!(depth = self.depth, "instantiation depth exceeded");
            return TypeId::UNKNOWN;
        }

        self.depth += 1;
        let ty = match item {
            Item::Interface(decl) => self.instantiate_interface(&source, file, items, &decl.name, bound, &key, &scope),
            Item::TypeAlias(decl) => self.instantiate_alias(site, decl, bound, &key, &scope),
            Item::Enum(decl) => self.instantiate_enum(site, decl),
            Item::Class(_) | Item::ExportDefault(ExportDefault::Class(_)) => {
                self.class_instance_type(file, first)
            }
            _ => TypeId::UNKNOWN,
        };
        self.depth -= 1;

        self.instantiations.insert(key, ty);
        ty
    }

    #[allow(clippy::too_many_arguments)]
    fn instantiate_interface(
        &mut self,
        source: &crate::program::SourceFile,
        file: FileId,
        items: &[ItemRef],
        name: &str,
        args: Vec<TypeId>,
        key: &InstantiationKey,
        scope: &Rc<Scope>,
    ) -> TypeId {
        // Registered first so self references resolve to the same type
        let placeholder = self
            .arena
            .alloc(TypeKind::Object(ObjectType::named(name, args.clone())));
        self.instantiations.insert(key.clone(), placeholder);

        let mut object = ObjectType::named(name, args);
        let mut bases = Vec::new();

        for at in items {
            if let Some(Item::Interface(decl)) = source.item(*at) {
                let site = Site { file, unit: at.unit };
                self.lower_members(site, &decl.members, scope, &mut object);
                for base in &decl.extends {
                    bases.push((site, base.clone()));
                }
            }
        }

        for (site, base) in bases {
            let base = self.lower(site, &base, scope);
            self.inherit(&mut object, base);
        }

        self.arena.replace(placeholder, TypeKind::Object(object));
        placeholder
    }

    /// Copy members of `base` that `object` does not declare itself
    fn inherit(&mut self, object: &mut ObjectType, base: TypeId) {
        let inherited: Vec<Member> = self
            .arena
            .properties(base)
            .into_iter()
            .filter(|member| object.member(&member.name).is_none())
            .cloned()
            .collect();
        object.members.extend(inherited);

        if object.call_signatures.is_empty() {
            object.call_signatures = self.arena.call_signatures(base).into_iter().cloned().collect();
        }
        if object.index.is_none() {
            if let TypeKind::Object(base) = self.arena.get(base) {
                object.index = base.index.clone();
            }
        }
    }

    fn instantiate_alias(
        &mut self,
        site: Site,
        decl: &TypeAliasDecl,
        args: Vec<TypeId>,
        key: &InstantiationKey,
        scope: &Rc<Scope>,
    ) -> TypeId {
        match &decl.type_ {
            TypeExpr::Object { members, .. } => {
                let placeholder = self
                    .arena
                    .alloc(TypeKind::Object(ObjectType::named(&decl.name, args.clone())));
                self.instantiations.insert(key.clone(), placeholder);

                let mut object = ObjectType::named(&decl.name, args);
                self.lower_members(site, members, scope, &mut object);
                self.arena.replace(placeholder, TypeKind::Object(object));
                placeholder
            }
            body => {
                if !self.in_progress.insert(key.clone()) {
                    debug!(name = %decl.name, "circular type alias");
                    return self.arena.alloc(TypeKind::Opaque(decl.name.clone()));
                }

                let ty = match body {
                    TypeExpr::Union { members, .. } => {
                        let members = members.iter().map(|m| self.lower(site, m, scope)).collect();
                        self.arena.aliased_union(
                            members,
                            AliasName {
                                name: decl.name.clone(),
                                args,
                            },
                        )
                    }
                    other => self.lower(site, other, scope),
                };

                self.in_progress.remove(key);
                ty
            }
        }
    }

    fn instantiate_enum(&mut self, site: Site, decl: &EnumDecl) -> TypeId {
        let mut members = Vec::with_capacity(decl.members.len());
        let mut next: Option<f64> = Some(0.0);

        for member in &decl.members {
            let value = match member.init.as_ref().map(|init| init.unwrap_assertions()) {
                None => next.map(|n| LiteralType::Number(OrderedFloat(n))),
                Some(Expr::String { raw, .. }) => Some(LiteralType::String(unescape(raw))),
                Some(Expr::Number { raw, .. }) => {
                    parse_number(raw).map(|n| LiteralType::Number(OrderedFloat(n)))
                }
                Some(Expr::Unary {
                    op: UnaryOp::Minus,
                    operand,
                    ..
                }) => match operand.as_ref() {
                    Expr::Number { raw, .. } => {
                        parse_number(raw).map(|n| LiteralType::Number(OrderedFloat(-n)))
                    }
                    _ => None,
                },
                Some(_) => None,
            };

            next = match &value {
                Some(LiteralType::Number(n)) => Some(n.0 + 1.0),
                _ => None,
            };

            members.push(self.arena.alloc(TypeKind::EnumMember {
                enum_name: decl.name.clone(),
                name: member.name.clone(),
                value,
            }));
        }

        debug!(name = %decl.name, members = members.len(), file = ?site.file, "lowered enum");
        self.arena.alloc(TypeKind::Enum(EnumType {
            name: decl.name.clone(),
            members,
        }))
    }

    fn lower_members(&mut self, site: Site, members: &[TypeMember], scope: &Rc<Scope>, object: &mut ObjectType) {
        let strict = self.options.strict_null_checks;

        for member in members {
            let declarations = vec![self.declaration(site, member.span)];
            match &member.kind {
                TypeMemberKind::Property(type_) => {
                    let mut ty = match type_ {
                        Some(type_) => self.lower(site, type_, scope),
                        None => TypeId::ANY,
                    };
                    if member.optional && strict {
                        ty = self.arena.optional(ty);
                    }
                    object.add_member(Member {
                        name: member.name.clone(),
                        ty,
                        optional: member.optional,
                        readonly: member.readonly,
                        method: false,
                        doc: member.doc.clone(),
                        declarations,
                    });
                }
                TypeMemberKind::Method(signature) => {
                    let signature = self.lower_signature(
                        site,
                        &signature.type_params,
                        &signature.params,
                        signature.return_type.as_ref(),
                        None,
                        scope,
                    );
                    let mut ty = self.arena.alloc(TypeKind::Function(signature));
                    if member.optional && strict {
                        ty = self.arena.optional(ty);
                    }
                    object.add_member(Member {
                        name: member.name.clone(),
                        ty,
                        optional: member.optional,
                        readonly: member.readonly,
                        method: true,
                        doc: member.doc.clone(),
                        declarations,
                    });
                }
                TypeMemberKind::Call(signature) => {
                    let mut signature = self.lower_signature(
                        site,
                        &signature.type_params,
                        &signature.params,
                        signature.return_type.as_ref(),
                        None,
                        scope,
                    );
                    signature.doc = member.doc.clone();
                    signature.declarations = declarations;
                    object.call_signatures.push(signature);
                }
                TypeMemberKind::Index { key, value } => {
                    let key = self.lower(site, key, scope);
                    let value = self.lower(site, value, scope);
                    object.index = Some(IndexSignature {
                        key_name: member.name.clone(),
                        key,
                        value,
                    });
                }
                TypeMemberKind::Construct => {}
            }
        }
    }

    pub(crate) fn lower_signature(
        &mut self,
        site: Site,
        type_params: &[TypeParam],
        params: &[Param],
        return_type: Option<&TypeExpr>,
        body: Option<&FunctionBody>,
        scope: &Rc<Scope>,
    ) -> crate::types::Signature {
        let scope = if type_params.is_empty() {
            Rc::clone(scope)
        } else {
            let mut child = Scope::with_parent(Rc::clone(scope));
            for param in type_params {
                let ty = self.arena.alloc(TypeKind::Opaque(param.name.clone()));
                child.bind(param.name.clone(), ty);
            }
            Rc::new(child)
        };

        let strict = self.options.strict_null_checks;
        let mut lowered = Vec::with_capacity(params.len());
        for param in params {
            let mut ty = match (&param.type_, &param.default) {
                (Some(type_), _) => self.lower(site, type_, &scope),
                (None, Some(default)) => self.infer(site, default, InferMode::Widen),
                (None, None) if param.rest => self.arena.array(TypeId::ANY),
                (None, None) => TypeId::ANY,
            };
            let optional = param.optional || param.default.is_some();
            if optional && strict && !param.rest {
                ty = self.arena.optional(ty);
            }
            lowered.push(crate::types::Param {
                name: param.name().unwrap_or("arg").to_string(),
                ty,
                optional,
                rest: param.rest,
            });
        }

        let return_type = match (return_type, body) {
            (Some(type_), _) => self.lower(site, type_, &scope),
            (None, Some(FunctionBody::Expr(expr))) => self.infer(site, expr, InferMode::Widen),
            (None, Some(FunctionBody::Block(statements))) => statements
                .iter()
                .find_map(|statement| match statement {
                    Statement::Return {
                        value: Some(value), ..
                    } => Some(value),
                    _ => None,
                })
                .map(|value| self.infer(site, value, InferMode::Widen))
                .unwrap_or(TypeId::VOID),
            (None, None) => TypeId::ANY,
        };

        crate::types::Signature {
            params: lowered,
            return_type,
            doc: None,
            declarations: Vec::new(),
        }
    }

    /// `typeof name` and `typeof a.b.c`
    fn lower_type_query(&mut self, file: FileId, name: &str) -> TypeId {
        let mut segments = name.split('.');
        let head = segments.next().unwrap_or_default();

        let Some(symbol) = self.resolve_value(file, head) else {
            warn!(name, "unresolved value in type query");
            return self.arena.unresolved(format!("typeof {}", name));
        };

        let mut ty = self.type_of_value(symbol);
        for segment in segments {
            ty = match self.arena.property(ty, segment) {
                Some(member) => member.ty,
                None => return self.arena.unresolved(format!("typeof {}", name)),
            };
        }
        ty
    }

    fn key_of(&mut self, operand: TypeId) -> TypeId {
        if self.arena.is_object_like(operand) {
            let names: Vec<String> = self
                .arena
                .properties(operand)
                .into_iter()
                .map(|member| member.name.clone())
                .collect();
            let keys = names
                .into_iter()
                .map(|name| self.arena.string_literal(name))
                .collect();
            return self.arena.union(keys);
        }
        let text = format!("keyof {}", self.print(operand));
        self.arena.alloc(TypeKind::Opaque(text))
    }

    fn indexed_access(&mut self, object: TypeId, index: TypeId) -> TypeId {
        if index == TypeId::NUMBER {
            match self.arena.get(object) {
                TypeKind::Array(element) => return *element,
                TypeKind::Tuple { elements, .. } => {
                    let elements = elements.iter().map(|element| element.ty).collect();
                    return self.arena.union(elements);
                }
                _ => {}
            }
        }

        let keys: Vec<TypeId> = match self.arena.union_members(index) {
            Some(members) => members.to_vec(),
            None => vec![index],
        };
        let mut found = Vec::with_capacity(keys.len());
        for key in keys {
            let member = match self.arena.get(key) {
                TypeKind::Literal(LiteralType::String(name)) => {
                    self.arena.property(object, name).map(|member| member.ty)
                }
                _ => None,
            };
            match member {
                Some(ty) => found.push(ty),
                None => {
                    let text = format!("{}[{}]", self.print(object), self.print(index));
                    return self.arena.alloc(TypeKind::Opaque(text));
                }
            }
        }
        self.arena.union(found)
    }

    /// Type of a top-level value
    pub fn type_of_value(&mut self, symbol: ValueSymbol) -> TypeId {
        let (file, value) = match symbol {
            ValueSymbol::Item { file, value } => (file, value),
            ValueSymbol::SfcComponent(_) => {
                return self.arena.alloc(TypeKind::Builtin {
                    name: "DefineComponent".to_string(),
                    args: Vec::new(),
                })
            }
        };

        if let Some(ty) = self.value_types.get(&(file, value)) {
            return *ty;
        }
        if !self.values_in_progress.insert((file, value)) {
            return TypeId::ANY;
        }

        let ty = self.compute_value_type(file, value);

        self.values_in_progress.remove(&(file, value));
        self.value_types.insert((file, value), ty);
        ty
    }

    fn compute_value_type(&mut self, file: FileId, value: ValueRef) -> TypeId {
        let source = self.file(file);
        let at = value.item();
        let site = Site { file, unit: at.unit };

        match (value, source.item(at)) {
            (ValueRef::Declarator { index, .. }, Some(Item::Variable(decl))) => {
                let Some(declarator) = decl.declarators.get(index) else {
                    return TypeId::ANY;
                };
                if !matches!(declarator.pattern, Pattern::Ident { .. }) {
                    return TypeId::ANY;
                }
                match (&declarator.type_, &declarator.init) {
                    (Some(type_), _) => self.lower_type(site, type_),
                    (None, Some(init)) => {
                        let mode = match decl.kind {
                            VarKind::Const => InferMode::Literal,
                            _ => InferMode::Widen,
                        };
                        self.infer(site, init, mode)
                    }
                    (None, None) => TypeId::ANY,
                }
            }
            (ValueRef::Function(_), Some(Item::Function(decl)))
            | (ValueRef::Function(_), Some(Item::ExportDefault(ExportDefault::Function(decl))))
            | (ValueRef::DefaultExport(_), Some(Item::ExportDefault(ExportDefault::Function(decl)))) => {
                self.function_type(site, &decl.function)
            }
            (ValueRef::Class(_), Some(Item::Class(decl)))
            | (ValueRef::Class(_), Some(Item::ExportDefault(ExportDefault::Class(decl))))
            | (ValueRef::DefaultExport(_), Some(Item::ExportDefault(ExportDefault::Class(decl)))) => {
                let name = decl.name.clone().unwrap_or_else(|| "default".to_string());
                self.arena
                    .alloc(TypeKind::Object(ObjectType::named(format!("typeof {}", name), Vec::new())))
            }
            (ValueRef::Enum(_), Some(Item::Enum(decl))) => {
                let enum_type = self.instantiate(file, &[at], Vec::new());
                let members = self.arena.union_members(enum_type).map(<[TypeId]>::to_vec).unwrap_or_default();
                let mut object = ObjectType::named(format!("typeof {}", decl.name), Vec::new());
                for (member, ty) in decl.members.iter().zip(members) {
                    object.add_member(Member {
                        name: member.name.clone(),
                        ty,
                        optional: false,
                        readonly: true,
                        method: false,
                        doc: member.doc.clone(),
                        declarations: vec![self.declaration(site, member.span)],
                    });
                }
                self.arena.alloc(TypeKind::Object(object))
            }
            (ValueRef::DefaultExport(_), Some(Item::ExportDefault(ExportDefault::Expr { expr, .. }))) => {
                self.infer(site, expr, InferMode::Widen)
            }
            _ => TypeId::ANY,
        }
    }

    fn function_type(&mut self, site: Site, function: &Function) -> TypeId {
        let signature = self.lower_signature(
            site,
            &function.type_params,
            &function.params,
            function.return_type.as_ref(),
            function.body.as_ref(),
            &Rc::new(Scope::new()),
        );
        self.arena.alloc(TypeKind::Function(signature))
    }

    /// Infer the type of an expression written at `site`
    pub fn type_of_expr(&mut self, site: Site, expr: &Expr, mode: InferMode) -> TypeId {
        self.infer(site, expr, mode)
    }

    fn infer(&mut self, site: Site, expr: &Expr, mode: InferMode) -> TypeId {
        let keep_literal = mode != InferMode::Widen;

        match expr {
            Expr::String { raw, .. } => {
                if keep_literal {
                    self.arena.string_literal(unescape(raw))
                } else {
                    TypeId::STRING
                }
            }
            Expr::Template { raw, .. } => {
                if keep_literal && !raw.contains("${") {
                    self.arena.string_literal(unescape(raw))
                } else {
                    TypeId::STRING
                }
            }
            Expr::Number { raw, .. } => match parse_number(raw) {
                Some(value) if keep_literal => self.arena.number_literal(value),
                _ => TypeId::NUMBER,
            },
            Expr::Boolean { value, .. } => {
                if keep_literal {
                    self.arena.literal(LiteralType::Boolean(*value))
                } else {
                    TypeId::BOOLEAN
                }
            }
            Expr::Null { .. } => TypeId::NULL,
            Expr::Unary { op, operand, .. } => match (op, operand.as_ref()) {
                (UnaryOp::Minus, Expr::Number { raw, .. }) if keep_literal => match parse_number(raw) {
                    Some(value) => self.arena.number_literal(-value),
                    None => TypeId::NUMBER,
                },
                _ => TypeId::NUMBER,
            },
            Expr::Array { elements, .. } => {
                if mode == InferMode::Const {
                    let elements = elements
                        .iter()
                        .map(|element| TupleElement {
                            label: None,
                            ty: self.infer(site, element, InferMode::Const),
                            optional: false,
                            rest: false,
                        })
                        .collect();
                    return self.arena.alloc(TypeKind::Tuple {
                        elements,
                        readonly: true,
                    });
                }
                if elements.is_empty() {
                    return self.arena.array(TypeId::ANY);
                }
                let types = elements
                    .iter()
                    .map(|element| match element {
                        Expr::Spread { argument, .. } => {
                            let spread = self.infer(site, argument, InferMode::Widen);
                            match self.arena.get(spread) {
                                TypeKind::Array(element) => *element,
                                _ => TypeId::ANY,
                            }
                        }
                        other => self.infer(site, other, InferMode::Widen),
                    })
                    .collect();
                let element = self.arena.union(types);
                self.arena.array(element)
            }
            Expr::Object(object) => self.infer_object(site, object, mode.nested()),
            Expr::Function(function) => self.function_type(site, function),
            Expr::Ident { name, .. } => match name.as_str() {
                "undefined" => TypeId::UNDEFINED,
                "NaN" | "Infinity" => TypeId::NUMBER,
                _ => match self.resolve_value(site.file, name) {
                    Some(symbol) => self.type_of_value(symbol),
                    None => TypeId::ANY,
                },
            },
            Expr::Member { object, property, .. } => {
                let object = self.infer(site, object, InferMode::Widen);
                self.arena
                    .property(object, property)
                    .map(|member| member.ty)
                    .unwrap_or(TypeId::ANY)
            }
            Expr::Call { callee, .. } => {
                let callee = self.infer(site, callee, InferMode::Widen);
                self.arena
                    .call_signatures(callee)
                    .first()
                    .map(|signature| signature.return_type)
                    .unwrap_or(TypeId::ANY)
            }
            Expr::TypeAssertion { expr, type_, .. } => {
                if is_const_assertion(type_) {
                    self.infer(site, expr, InferMode::Const)
                } else {
                    self.lower_type(site, type_)
                }
            }
            Expr::Spread { .. } | Expr::Opaque { .. } => TypeId::ANY,
        }
    }

    fn infer_object(&mut self, site: Site, object: &ObjectLit, mode: InferMode) -> TypeId {
        let readonly = mode == InferMode::Const;
        let mut result = ObjectType::anonymous();

        for property in &object.properties {
            let name = property.key.name().to_string();
            let (ty, method) = match &property.kind {
                ObjectPropertyKind::Init(value) => (self.infer(site, value, mode), false),
                ObjectPropertyKind::Shorthand => {
                    let ident = Expr::Ident {
                        name: name.clone(),
                        span: property.span,
                    };
                    (self.infer(site, &ident, mode), false)
                }
                ObjectPropertyKind::Method(function) => (self.function_type(site, function), true),
                ObjectPropertyKind::Spread(spread) => {
                    let spread = self.infer(site, spread, InferMode::Widen);
                    let members: Vec<Member> = self.arena.properties(spread).into_iter().cloned().collect();
                    for member in members {
                        result.members.retain(|existing| existing.name != member.name);
                        result.members.push(member);
                    }
                    continue;
                }
                ObjectPropertyKind::Accessor => continue,
            };

            result.members.retain(|existing| existing.name != name);
            result.members.push(Member {
                name,
                ty,
                optional: false,
                readonly,
                method,
                doc: property.doc.clone(),
                declarations: vec![self.declaration(site, property.span)],
            });
        }

        self.arena.alloc(TypeKind::Object(result))
    }

    /// Props type declared with the runtime `props` option
    ///
    /// Accepts the array form (`['a', 'b']`) and the object form with constructors,
    /// constructor arrays, `PropType<T>` assertions and `{ type, required }` objects.
    pub fn runtime_props_type(&mut self, site: Site, expr: &Expr) -> TypeId {
        let strict = self.options.strict_null_checks;

        match expr.unwrap_assertions() {
            Expr::Array { elements, .. } => {
                let mut object = ObjectType::anonymous();
                for element in elements {
                    if let Expr::String { raw, span } = element {
                        object.add_member(Member {
                            name: unescape(raw),
                            ty: TypeId::ANY,
                            optional: true,
                            readonly: false,
                            method: false,
                            doc: None,
                            declarations: vec![self.declaration(site, *span)],
                        });
                    }
                }
                self.arena.alloc(TypeKind::Object(object))
            }
            Expr::Object(props) => {
                let mut object = ObjectType::anonymous();
                for property in &props.properties {
                    let Some(value) = property.value() else {
                        continue;
                    };
                    let (mut ty, required) = self.runtime_prop(site, value);
                    let optional = !required;
                    if optional && strict {
                        ty = self.arena.optional(ty);
                    }
                    object.add_member(Member {
                        name: property.key.name().to_string(),
                        ty,
                        optional,
                        readonly: false,
                        method: false,
                        doc: property.doc.clone(),
                        declarations: vec![self.declaration(site, property.span)],
                    });
                }
                self.arena.alloc(TypeKind::Object(object))
            }
            Expr::Ident { name, .. } => {
                // `props: buttonProps` declared elsewhere in the same program
                let Some(ValueSymbol::Item {
                    file,
                    value: ValueRef::Declarator { item, index },
                }) = self.resolve_value(site.file, name)
                else {
                    return self.arena.alloc(TypeKind::Object(ObjectType::anonymous()));
                };
                let source = self.file(file);
                match source.declarator(item, index).and_then(|d| d.init.as_ref()) {
                    Some(init) => self.runtime_props_type(Site { file, unit: item.unit }, init),
                    None => self.arena.alloc(TypeKind::Object(ObjectType::anonymous())),
                }
            }
            _ => self.arena.alloc(TypeKind::Object(ObjectType::anonymous())),
        }
    }

    /// Type of one runtime prop definition and whether it is required
    fn runtime_prop(&mut self, site: Site, value: &Expr) -> (TypeId, bool) {
        match value {
            Expr::Object(definition) => {
                let ty = definition
                    .get("type")
                    .and_then(|property| property.value())
                    .map(|type_| self.runtime_prop_type(site, type_))
                    .unwrap_or(TypeId::ANY);
                let required = matches!(
                    definition.get("required").and_then(|property| property.value()),
                    Some(Expr::Boolean { value: true, .. })
                );
                (ty, required)
            }
            other => (self.runtime_prop_type(site, other), false),
        }
    }

    fn runtime_prop_type(&mut self, site: Site, expr: &Expr) -> TypeId {
        match expr {
            Expr::TypeAssertion { expr, type_, .. } => match type_ {
                TypeExpr::Reference { name, args, .. }
                    if (name == "PropType" || name.ends_with(".PropType")) && args.len() == 1 =>
                {
                    self.lower_type(site, &args[0])
                }
                _ => self.runtime_prop_type(site, expr),
            },
            Expr::Array { elements, .. } => {
                let types = elements
                    .iter()
                    .map(|element| self.runtime_prop_type(site, element))
                    .collect();
                self.arena.union(types)
            }
            Expr::Ident { name, .. } => self.constructor_type(site, name),
            _ => TypeId::ANY,
        }
    }

    /// Instance type produced by a runtime constructor
    fn constructor_type(&mut self, site: Site, name: &str) -> TypeId {
        match name {
            "String" => TypeId::STRING,
            "Number" => TypeId::NUMBER,
            "Boolean" => TypeId::BOOLEAN,
            "Symbol" => TypeId::SYMBOL,
            "BigInt" => TypeId::BIGINT,
            "Array" => self.arena.array(TypeId::ANY),
            "Object" => self.arena.alloc(TypeKind::Builtin {
                name: "Record".to_string(),
                args: vec![TypeId::STRING, TypeId::ANY],
            }),
            "Function" => {
                let args = self.arena.array(TypeId::ANY);
                self.arena.alloc(TypeKind::Function(crate::types::Signature {
                    params: vec![crate::types::Param {
                        name: "args".to_string(),
                        ty: args,
                        optional: false,
                        rest: true,
                    }],
                    return_type: TypeId::ANY,
                    doc: None,
                    declarations: Vec::new(),
                }))
            }
            "Date" | "RegExp" | "Error" | "Map" | "Set" => self.arena.alloc(TypeKind::Builtin {
                name: name.to_string(),
                args: Vec::new(),
            }),
            "Promise" => self.arena.alloc(TypeKind::Builtin {
                name: name.to_string(),
                args: vec![TypeId::ANY],
            }),
            _ => match self.resolve_value(site.file, name) {
                Some(ValueSymbol::Item {
                    file,
                    value: ValueRef::Class(item),
                }) => self.class_instance_type(file, item),
                _ => TypeId::ANY,
            },
        }
    }

    /// Instance type of a class: its public, non-static fields
    pub fn class_instance_type(&mut self, file: FileId, item: ItemRef) -> TypeId {
        let key = InstantiationKey {
            file,
            item,
            args: Vec::new(),
        };
        if let Some(existing) = self.instantiations.get(&key) {
            return *existing;
        }

        let source = self.file(file);
        let decl = match source.item(item) {
            Some(Item::Class(decl)) | Some(Item::ExportDefault(ExportDefault::Class(decl))) => decl,
            _ => return TypeId::UNKNOWN,
        };
        let site = Site { file, unit: item.unit };
        let name = decl.name.clone().unwrap_or_else(|| "default".to_string());

        let placeholder = self
            .arena
            .alloc(TypeKind::Object(ObjectType::named(&name, Vec::new())));
        self.instantiations.insert(key, placeholder);

        let typed = source.typed;
        let strict = self.options.strict_null_checks;
        let mut object = ObjectType::named(&name, Vec::new());

        for member in &decl.members {
            if member.is_static || member.visibility != Visibility::Public {
                continue;
            }
            let ClassMemberKind::Field { type_, initializer } = &member.kind else {
                continue;
            };
            let mut ty = match (type_, initializer) {
                (Some(type_), _) if typed => self.lower(site, type_, &Rc::new(Scope::new())),
                (_, Some(initializer)) => self.infer(site, initializer, InferMode::Widen),
                _ => TypeId::ANY,
            };
            if member.optional && strict {
                ty = self.arena.optional(ty);
            }
            object.add_member(Member {
                name: member.name.clone(),
                ty,
                optional: member.optional,
                readonly: member.readonly,
                method: false,
                doc: member.doc.clone(),
                declarations: vec![self.declaration(site, member.span)],
            });
        }

        if let Some(Expr::Ident { name: base, .. }) = &decl.extends {
            if let Some(ValueSymbol::Item {
                file: base_file,
                value: ValueRef::Class(base_item),
            }) = self.resolve_value(file, base)
            {
                let base = self.class_instance_type(base_file, base_item);
                self.inherit(&mut object, base);
            }
        }

        self.arena.replace(placeholder, TypeKind::Object(object));
        placeholder
    }

    /// Attributes every component accepts (`key`, `ref`, `class`, ...)
    pub fn global_attributes(&mut self) -> TypeId {
        let prelude = self.prelude();
        match self.resolve_type(prelude, "GlobalAttributes") {
            Some(target) => self.type_of_target(target, "GlobalAttributes", Vec::new()),
            None => self.arena.alloc(TypeKind::Object(ObjectType::anonymous())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_number() {
        assert_eq!(parse_number("1"), Some(1.0));
        assert_eq!(parse_number("-2.5"), Some(-2.5));
        assert_eq!(parse_number("1_000"), Some(1000.0));
        assert_eq!(parse_number("0x1F"), Some(31.0));
        assert_eq!(parse_number("0b101"), Some(5.0));
        assert_eq!(parse_number("1e3"), Some(1000.0));
        assert_eq!(parse_number("10n"), Some(10.0));
        assert_eq!(parse_number("abc"), None);
    }

    #[test]
    fn test_const_assertion_detection() {
        let type_ = TypeExpr::Reference {
            name: "const".to_string(),
            args: Vec::new(),
            span: Span::default(),
        };
        assert!(is_const_assertion(&type_));
    }
}
