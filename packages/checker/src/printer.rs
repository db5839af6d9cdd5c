use crate::types::{
    LiteralType, Member, ObjectType, Param, Signature, TupleElement, TypeArena, TypeId, TypeKind,
    UnionType,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Operand {
    Union,
    Intersection,
    Element,
}

/// Renders types the way the TypeScript language service displays them
pub struct TypePrinter<'a> {
    arena: &'a TypeArena,
}

impl<'a> TypePrinter<'a> {
    pub fn new(arena: &'a TypeArena) -> Self {
        Self { arena }
    }

    pub fn print(&self, id: TypeId) -> String {
        match self.arena.get(id) {
            TypeKind::Intrinsic(intrinsic) => intrinsic.as_str().to_string(),
            TypeKind::Literal(literal) => print_literal(literal),
            TypeKind::Union(union) => self.print_union(union),
            TypeKind::Intersection(parts) => parts
                .iter()
                .map(|part| self.print_operand(*part, Operand::Intersection))
                .collect::<Vec<_>>()
                .join(" & "),
            TypeKind::Array(element) => format!("{}[]", self.print_operand(*element, Operand::Element)),
            TypeKind::Tuple { elements, readonly } => {
                let prefix = if *readonly { "readonly " } else { "" };
                format!("{}[{}]", prefix, self.print_tuple_elements(elements))
            }
            TypeKind::Object(object) => match &object.name {
                Some(name) => self.print_reference(name, &object.type_args),
                None => self.print_object_literal(object),
            },
            TypeKind::Enum(enum_type) => enum_type.name.clone(),
            TypeKind::EnumMember {
                enum_name, name, ..
            } => format!("{}.{}", enum_name, name),
            TypeKind::Function(signature) => self.print_signature(signature, true),
            TypeKind::Builtin { name, args } => self.print_reference(name, args),
            TypeKind::Opaque(text) => text.clone(),
            TypeKind::Unresolved(_) => "unknown".to_string(),
        }
    }

    fn print_reference(&self, name: &str, args: &[TypeId]) -> String {
        if args.is_empty() {
            return name.to_string();
        }
        let args: Vec<String> = args.iter().map(|arg| self.print(*arg)).collect();
        format!("{}<{}>", name, args.join(", "))
    }

    fn print_union(&self, union: &UnionType) -> String {
        if let Some(alias) = &union.alias {
            return self.print_reference(&alias.name, &alias.args);
        }

        let written = union.origin.as_deref().unwrap_or(&union.members);
        let mut ordered: Vec<TypeId> = written.iter().filter(|id| !id.is_nullable()).copied().collect();
        for nullable in [TypeId::NULL, TypeId::UNDEFINED] {
            if written.contains(&nullable) {
                ordered.push(nullable);
            }
        }

        ordered
            .iter()
            .map(|member| self.print_operand(*member, Operand::Union))
            .collect::<Vec<_>>()
            .join(" | ")
    }

    /// Parenthesize operands that would otherwise bind wrongly
    fn print_operand(&self, id: TypeId, position: Operand) -> String {
        let needs_parens = match self.arena.get(id) {
            TypeKind::Function(_) => true,
            TypeKind::Union(union) => union.alias.is_none() && position != Operand::Union,
            TypeKind::Intersection(_) => position == Operand::Element,
            _ => false,
        };
        let printed = self.print(id);
        if needs_parens {
            format!("({})", printed)
        } else {
            printed
        }
    }

    fn print_object_literal(&self, object: &ObjectType) -> String {
        let mut parts = Vec::new();

        for signature in &object.call_signatures {
            parts.push(format!("{};", self.print_signature(signature, false)));
        }

        if let Some(index) = &object.index {
            parts.push(format!(
                "[{}: {}]: {};",
                index.key_name,
                self.print(index.key),
                self.print(index.value)
            ));
        }

        for member in &object.members {
            parts.push(self.print_member(member));
        }

        if parts.is_empty() {
            "{}".to_string()
        } else {
            format!("{{ {} }}", parts.join(" "))
        }
    }

    fn print_member(&self, member: &Member) -> String {
        let readonly = if member.readonly { "readonly " } else { "" };
        let optional = if member.optional { "?" } else { "" };
        let name = print_property_name(&member.name);

        if member.method {
            if let Some(signature) = self.method_signature(member.ty) {
                return format!(
                    "{}{}{}{};",
                    readonly,
                    name,
                    optional,
                    self.print_signature(signature, false)
                );
            }
        }

        format!("{}{}{}: {};", readonly, name, optional, self.print(member.ty))
    }

    fn method_signature(&self, ty: TypeId) -> Option<&Signature> {
        match self.arena.get(ty) {
            TypeKind::Function(signature) => Some(signature),
            TypeKind::Union(union) => {
                let mut functions = union.members.iter().filter_map(|m| match self.arena.get(*m) {
                    TypeKind::Function(signature) => Some(signature),
                    _ => None,
                });
                let first = functions.next();
                let only_nullables = union
                    .members
                    .iter()
                    .all(|m| m.is_nullable() || matches!(self.arena.get(*m), TypeKind::Function(_)));
                if only_nullables && functions.next().is_none() {
                    first
                } else {
                    None
                }
            }
            _ => None,
        }
    }

    /// `(a: string) => void` when `arrow`, `(a: string): void` otherwise
    pub fn print_signature(&self, signature: &Signature, arrow: bool) -> String {
        let separator = if arrow { " => " } else { ": " };
        format!(
            "({}){}{}",
            self.print_params(&signature.params),
            separator,
            self.print(signature.return_type)
        )
    }

    pub fn print_params(&self, params: &[Param]) -> String {
        params
            .iter()
            .map(|param| {
                let rest = if param.rest { "..." } else { "" };
                let optional = if param.optional { "?" } else { "" };
                format!("{}{}{}: {}", rest, param.name, optional, self.print(param.ty))
            })
            .collect::<Vec<_>>()
            .join(", ")
    }

    pub fn print_tuple_elements(&self, elements: &[TupleElement]) -> String {
        elements
            .iter()
            .map(|element| {
                let rest = if element.rest { "..." } else { "" };
                let optional = if element.optional { "?" } else { "" };
                match &element.label {
                    Some(label) => format!("{}{}{}: {}", rest, label, optional, self.print(element.ty)),
                    None => format!("{}{}{}", rest, self.print_operand(element.ty, Operand::Element), optional),
                }
            })
            .collect::<Vec<_>>()
            .join(", ")
    }
}

pub fn print_literal(literal: &LiteralType) -> String {
    match literal {
        LiteralType::String(value) => quote_string(value),
        LiteralType::Number(value) => print_number(value.0),
        LiteralType::Boolean(value) => value.to_string(),
    }
}

pub fn print_number(value: f64) -> String {
    if value == 0.0 {
        // covers -0
        "0".to_string()
    } else if value.is_nan() {
        "NaN".to_string()
    } else if value.is_infinite() {
        if value > 0.0 { "Infinity" } else { "-Infinity" }.to_string()
    } else {
        value.to_string()
    }
}

/// Double-quoted string with JavaScript escapes
pub fn quote_string(value: &str) -> String {
    let mut quoted = String::with_capacity(value.len() + 2);
    quoted.push('"');
    for c in value.chars() {
        match c {
            '"' => quoted.push_str("\\\""),
            '\\' => quoted.push_str("\\\\"),
            '\n' => quoted.push_str("\\n"),
            '\r' => quoted.push_str("\\r"),
            '\t' => quoted.push_str("\\t"),
            c => quoted.push(c),
        }
    }
    quoted.push('"');
    quoted
}

fn print_property_name(name: &str) -> String {
    let mut chars = name.chars();
    let valid = match chars.next() {
        Some(c) if c.is_alphabetic() || c == '_' || c == '$' => {
            chars.all(|c| c.is_alphanumeric() || c == '_' || c == '$')
        }
        _ => false,
    };
    if valid {
        name.to_string()
    } else {
        quote_string(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{AliasName, EnumType};

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

    #[test]
    fn test_print_primitive_types() {
        let arena = TypeArena::new();
        let printer = TypePrinter::new(&arena);

        assert_eq!(printer.print(TypeId::STRING), "string");
        assert_eq!(printer.print(TypeId::NUMBER), "number");
        assert_eq!(printer.print(TypeId::BOOLEAN), "boolean");
        assert_eq!(printer.print(TypeId::ANY), "any");
        assert_eq!(printer.print(TypeId::NULL), "null");
    }

    #[test]
    fn test_print_literal_types() {
        let mut arena = TypeArena::new();
        let hello = arena.string_literal("say \"hi\"");
        let answer = arena.number_literal(42.0);
        let half = arena.number_literal(-0.5);
        let yes = arena.literal(LiteralType::Boolean(true));
        let printer = TypePrinter::new(&arena);

        assert_eq!(printer.print(hello), "\"say \\\"hi\\\"\"");
        assert_eq!(printer.print(answer), "42");
        assert_eq!(printer.print(half), "-0.5");
        assert_eq!(printer.print(yes), "true");
    }

    #[test]
    fn test_print_array_and_union() {
        let mut arena = TypeArena::new();
        let strings = arena.array(TypeId::STRING);
        let optional = arena.optional(strings);
        let union = arena.union(vec![TypeId::STRING, TypeId::NUMBER]);
        let union_array = arena.array(union);
        let printer = TypePrinter::new(&arena);

        assert_eq!(printer.print(strings), "string[]");
        assert_eq!(printer.print(optional), "string[] | undefined");
        assert_eq!(printer.print(union_array), "(string | number)[]");
    }

    #[test]
    fn test_print_object_literal() {
        let mut arena = TypeArena::new();
        let optional_number = arena.optional(TypeId::NUMBER);
        let mut object = ObjectType::anonymous();
        object.add_member(member("name", TypeId::STRING, false));
        object.add_member(member("age", optional_number, true));
        object.add_member(member("aria-label", TypeId::STRING, false));
        let object = arena.alloc(TypeKind::Object(object));
        let empty = arena.alloc(TypeKind::Object(ObjectType::anonymous()));
        let printer = TypePrinter::new(&arena);

        assert_eq!(
            printer.print(object),
            "{ name: string; age?: number | undefined; \"aria-label\": string; }"
        );
        assert_eq!(printer.print(empty), "{}");
    }

    #[test]
    fn test_print_named_types() {
        let mut arena = TypeArena::new();
        let nested = arena.alloc(TypeKind::Object(ObjectType::named("Box", vec![TypeId::STRING])));
        let mut extra = ObjectType::anonymous();
        extra.add_member(member("additionalProp", TypeId::STRING, false));
        let extra = arena.alloc(TypeKind::Object(extra));
        let both = arena.intersection(vec![nested, extra]);
        let size = arena.alloc(TypeKind::Enum(EnumType {
            name: "Size".to_string(),
            members: Vec::new(),
        }));
        let category = arena.aliased_union(
            vec![TypeId::STRING, TypeId::NUMBER],
            AliasName {
                name: "Category".to_string(),
                args: Vec::new(),
            },
        );
        let optional_category = arena.optional(category);
        let printer = TypePrinter::new(&arena);

        assert_eq!(printer.print(both), "Box<string> & { additionalProp: string; }");
        assert_eq!(printer.print(size), "Size");
        assert_eq!(printer.print(optional_category), "Category | undefined");
    }

    #[test]
    fn test_print_functions_and_tuples() {
        let mut arena = TypeArena::new();
        let callback = arena.alloc(TypeKind::Function(Signature {
            params: vec![Param {
                name: "value".to_string(),
                ty: TypeId::STRING,
                optional: false,
                rest: false,
            }],
            return_type: TypeId::VOID,
            doc: None,
            declarations: Vec::new(),
        }));
        let optional_callback = arena.optional(callback);
        let tuple = arena.alloc(TypeKind::Tuple {
            elements: vec![
                TupleElement {
                    label: Some("id".to_string()),
                    ty: TypeId::NUMBER,
                    optional: false,
                    rest: false,
                },
                TupleElement {
                    label: Some("name".to_string()),
                    ty: TypeId::STRING,
                    optional: true,
                    rest: false,
                },
            ],
            readonly: false,
        });
        let printer = TypePrinter::new(&arena);

        assert_eq!(printer.print(callback), "(value: string) => void");
        assert_eq!(printer.print(optional_callback), "((value: string) => void) | undefined");
        assert_eq!(printer.print(tuple), "[id: number, name?: string]");
    }
}
