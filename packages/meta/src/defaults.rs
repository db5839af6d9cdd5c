//! Default value resolution.
//!
//! Defaults are read from source, never evaluated: only a closed literal
//! grammar (and zero-argument factories returning such a literal) renders.

use component_meta_checker::{parse_number, print_number, quote_string};
use component_meta_parser::ast::{
    Expr, Function, FunctionBody, ObjectLit, ObjectPropertyKind, PropertyKey, Statement, UnaryOp,
};
use component_meta_parser::unescape;

const INDENT: &str = "    ";

/// One default value as written in the component source
#[derive(Debug, Clone, PartialEq)]
pub struct DefaultEntry {
    pub name: String,
    pub value: Expr,
    /// Zero-argument functions are factories whose returned literal is the default
    pub factory: bool,
}

impl DefaultEntry {
    pub fn value(name: impl Into<String>, value: Expr) -> Self {
        Self {
            name: name.into(),
            value,
            factory: false,
        }
    }

    pub fn factory(name: impl Into<String>, value: Expr) -> Self {
        Self {
            name: name.into(),
            value,
            factory: true,
        }
    }
}

/// The defaults declaration of one component
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ComponentDefaults {
    entries: Vec<DefaultEntry>,
}

impl ComponentDefaults {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, entry: DefaultEntry) {
        self.entries.push(entry);
    }

    pub fn extend(&mut self, other: ComponentDefaults) {
        self.entries.extend(other.entries);
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Entries of a `withDefaults` object: values, factories and method shorthands
    pub fn from_object(object: &ObjectLit) -> Self {
        let mut defaults = Self::new();
        for property in &object.properties {
            let value = match &property.kind {
                ObjectPropertyKind::Init(value) => value.clone(),
                ObjectPropertyKind::Method(function) => Expr::Function(Box::new(function.clone())),
                _ => continue,
            };
            defaults.push(DefaultEntry::factory(property.key.name(), value));
        }
        defaults
    }

    /// Canonical rendering of the default declared for `name`
    ///
    /// `newline` separates the lines of multi-line array and object literals.
    pub fn resolve_default(&self, name: &str, newline: &str) -> Option<String> {
        let entry = self.entries.iter().rev().find(|entry| entry.name == name)?;
        let value = entry.value.unwrap_assertions();

        if entry.factory {
            if let Expr::Function(function) = value {
                return render_literal(factory_result(function)?, newline, 0);
            }
        }
        render_literal(value, newline, 0)
    }
}

/// The literal a zero-argument factory returns
fn factory_result(function: &Function) -> Option<&Expr> {
    if !function.params.is_empty() || function.is_async {
        return None;
    }
    match function.body.as_ref()? {
        FunctionBody::Expr(expr) => Some(expr),
        FunctionBody::Block(statements) => match statements.as_slice() {
            [Statement::Return { value: Some(value), .. }] => Some(value),
            _ => None,
        },
    }
}

/// Render a literal expression; `None` for anything outside the literal grammar
pub fn render_literal(expr: &Expr, newline: &str, depth: usize) -> Option<String> {
    match expr {
        Expr::String { raw, .. } => Some(quote_string(&unescape(raw))),
        Expr::Number { raw, .. } => render_number(raw),
        Expr::Boolean { value, .. } => Some(value.to_string()),
        Expr::Null { .. } => Some("null".to_string()),
        Expr::Ident { name, .. } if name == "undefined" => Some("undefined".to_string()),
        Expr::Template { raw, .. } if !raw.contains("${") => Some(format!("`{}`", raw)),
        Expr::Unary { op, operand, .. } => match operand.as_ref() {
            Expr::Number { raw, .. } => {
                let number = render_number(raw)?;
                Some(match op {
                    UnaryOp::Minus => format!("-{}", number),
                    UnaryOp::Plus => number,
                })
            }
            _ => None,
        },
        Expr::TypeAssertion { expr, .. } => render_literal(expr, newline, depth),
        Expr::Array {
            elements, multiline, ..
        } => {
            let rendered = elements
                .iter()
                .map(|element| render_literal(element, newline, depth + 1))
                .collect::<Option<Vec<_>>>()?;
            Some(wrap_list("[", "]", rendered, *multiline, newline, depth))
        }
        Expr::Object(object) => {
            let rendered = object
                .properties
                .iter()
                .map(|property| {
                    let ObjectPropertyKind::Init(value) = &property.kind else {
                        return None;
                    };
                    let key = render_key(&property.key)?;
                    Some(format!("{}: {}", key, render_literal(value, newline, depth + 1)?))
                })
                .collect::<Option<Vec<_>>>()?;
            if rendered.is_empty() {
                return Some("{}".to_string());
            }
            Some(wrap_list("{ ", " }", rendered, object.multiline, newline, depth))
        }
        _ => None,
    }
}

fn render_number(raw: &str) -> Option<String> {
    if raw.ends_with('n') {
        return Some(raw.replace('_', ""));
    }
    parse_number(raw).map(print_number)
}

fn render_key(key: &PropertyKey) -> Option<String> {
    match key {
        PropertyKey::Ident(name) => Some(name.clone()),
        PropertyKey::String(name) => Some(quote_string(name)),
        PropertyKey::Number(raw) => render_number(raw),
        PropertyKey::Computed(_) => None,
    }
}

fn wrap_list(open: &str, close: &str, items: Vec<String>, multiline: bool, newline: &str, depth: usize) -> String {
    if items.is_empty() {
        return format!("{}{}", open.trim(), close.trim());
    }
    if !multiline {
        return format!("{}{}{}", open, items.join(", "), close);
    }

    let inner = INDENT.repeat(depth + 1);
    let outer = INDENT.repeat(depth);
    let body = items
        .iter()
        .map(|item| format!("{}{}", inner, item))
        .collect::<Vec<_>>()
        .join(&format!(",{}", newline));
    format!("{}{}{}{}{}{}", open.trim(), newline, body, newline, outer, close.trim())
}

#[cfg(test)]
mod tests {
    use super::*;
    use component_meta_parser::Parser;

    fn expr(source: &str) -> Expr {
        Parser::new(source).unwrap().parse_expression().unwrap()
    }

    fn resolve(source: &str) -> Option<String> {
        let mut defaults = ComponentDefaults::new();
        defaults.push(DefaultEntry::factory("value", expr(source)));
        defaults.resolve_default("value", "\n")
    }

    #[test]
    fn test_literals() {
        assert_eq!(resolve("1").as_deref(), Some("1"));
        assert_eq!(resolve("-2.5").as_deref(), Some("-2.5"));
        assert_eq!(resolve("'rounded'").as_deref(), Some("\"rounded\""));
        assert_eq!(resolve("true").as_deref(), Some("true"));
        assert_eq!(resolve("null").as_deref(), Some("null"));
        assert_eq!(resolve("undefined").as_deref(), Some("undefined"));
        assert_eq!(resolve("`plain`").as_deref(), Some("`plain`"));
        assert_eq!(resolve("'small' as const").as_deref(), Some("\"small\""));
    }

    #[test]
    fn test_factories() {
        assert_eq!(resolve("() => ['foo', 'bar']").as_deref(), Some("[\"foo\", \"bar\"]"));
        assert_eq!(resolve("() => ({ a: 1 })").as_deref(), Some("{ a: 1 }"));
        assert_eq!(resolve("function () { return 3 }").as_deref(), Some("3"));
        assert_eq!(resolve("(x) => x"), None);

        assert_eq!(resolve("() => ['foo', 'bar']"), resolve("['foo', 'bar']"));
        assert_eq!(resolve("() => { return { a: 1 } }"), resolve("{ a: 1 }"));
    }

    #[test]
    fn test_method_shorthand_defaults() {
        let Expr::Object(object) = expr("{ list() { return [] }, size: 2, other: compute() }") else {
            panic!("expected object literal");
        };
        let defaults = ComponentDefaults::from_object(&object);
        assert_eq!(defaults.len(), 3);
        assert_eq!(defaults.resolve_default("list", "\n").as_deref(), Some("[]"));
        assert_eq!(defaults.resolve_default("size", "\n").as_deref(), Some("2"));
        assert_eq!(defaults.resolve_default("other", "\n"), None);
        assert_eq!(defaults.resolve_default("missing", "\n"), None);
    }

    #[test]
    fn test_function_values_are_not_unwrapped() {
        let mut defaults = ComponentDefaults::new();
        defaults.push(DefaultEntry::value("onClick", expr("() => 1")));
        assert_eq!(defaults.resolve_default("onClick", "\n"), None);
    }

    #[test]
    fn test_unsupported_expressions() {
        assert_eq!(resolve("`a ${b}`"), None);
        assert_eq!(resolve("[...items]"), None);
        assert_eq!(resolve("{ [key]: 1 }"), None);
        assert_eq!(resolve("Date.now()"), None);
    }

    #[test]
    fn test_multiline_rendering_uses_newline() {
        let source = "[\n  'a',\n  { b: 1 }\n]";
        let mut defaults = ComponentDefaults::new();
        defaults.push(DefaultEntry::value("list", expr(source)));

        assert_eq!(
            defaults.resolve_default("list", "\r\n").as_deref(),
            Some("[\r\n    \"a\",\r\n    { b: 1 }\r\n]")
        );
    }
}
