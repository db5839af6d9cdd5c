use serde::{Deserialize, Serialize};

/// Byte range of a node within the parsed source
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    /// Shift the span by a base offset (script blocks inside a larger file)
    pub fn offset(self, base: usize) -> Self {
        Self {
            start: self.start + base,
            end: self.end + base,
        }
    }
}

/// A parsed `/** ... */` comment
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct DocComment {
    pub description: String,
    pub tags: Vec<DocTag>,
}

/// A single `@name text` documentation tag
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocTag {
    pub name: String,
    pub text: String,
}

/// Root node of one script
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Module {
    pub items: Vec<Item>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "item")]
pub enum Item {
    Import(ImportDecl),
    Export(ExportDecl),
    Interface(InterfaceDecl),
    TypeAlias(TypeAliasDecl),
    Enum(EnumDecl),
    Variable(VariableDecl),
    Function(FunctionDecl),
    Class(ClassDecl),
    ExportDefault(ExportDefault),
    Expression { expr: Expr, span: Span },
    /// A statement the metadata engine has no use for
    Other { span: Span },
}

/// Modifiers shared by top-level declarations
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct DeclMeta {
    pub exported: bool,
    pub declare: bool,
    pub doc: Option<DocComment>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImportDecl {
    pub source: String,
    pub default: Option<String>,
    pub namespace: Option<String>,
    pub named: Vec<ImportSpecifier>,
    pub type_only: bool,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImportSpecifier {
    pub imported: String,
    pub local: String,
}

/// `export { a as b }`, `export { a } from './x'`, `export * from './x'`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportDecl {
    pub specifiers: Vec<ExportSpecifier>,
    pub source: Option<String>,
    pub star: bool,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportSpecifier {
    pub local: String,
    pub exported: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TypeParam {
    pub name: String,
    pub constraint: Option<TypeExpr>,
    pub default: Option<TypeExpr>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InterfaceDecl {
    pub name: String,
    pub type_params: Vec<TypeParam>,
    pub extends: Vec<TypeExpr>,
    pub members: Vec<TypeMember>,
    pub meta: DeclMeta,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TypeAliasDecl {
    pub name: String,
    pub type_params: Vec<TypeParam>,
    pub type_: TypeExpr,
    pub meta: DeclMeta,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnumDecl {
    pub name: String,
    pub is_const: bool,
    pub members: Vec<EnumMember>,
    pub meta: DeclMeta,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnumMember {
    pub name: String,
    pub init: Option<Expr>,
    pub doc: Option<DocComment>,
    pub span: Span,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum VarKind {
    Const,
    Let,
    Var,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VariableDecl {
    pub kind: VarKind,
    pub declarators: Vec<Declarator>,
    pub meta: DeclMeta,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Declarator {
    pub pattern: Pattern,
    pub type_: Option<TypeExpr>,
    pub init: Option<Expr>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunctionDecl {
    pub name: Option<String>,
    pub function: Function,
    pub meta: DeclMeta,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassDecl {
    pub name: Option<String>,
    pub type_params: Vec<TypeParam>,
    pub extends: Option<Expr>,
    pub is_abstract: bool,
    pub members: Vec<ClassMember>,
    pub meta: DeclMeta,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Visibility {
    Public,
    Protected,
    Private,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ClassMemberKind {
    Field {
        type_: Option<TypeExpr>,
        initializer: Option<Expr>,
    },
    Method,
    Accessor,
    Constructor,
    StaticBlock,
    IndexSignature,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassMember {
    pub name: String,
    pub kind: ClassMemberKind,
    pub optional: bool,
    pub is_static: bool,
    pub readonly: bool,
    pub visibility: Visibility,
    pub doc: Option<DocComment>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind")]
pub enum ExportDefault {
    Expr { expr: Expr, meta: DeclMeta },
    Function(FunctionDecl),
    Class(ClassDecl),
}

/// Type annotation syntax
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum TypeExpr {
    Keyword { keyword: TypeKeyword, span: Span },
    Literal { literal: LiteralTypeExpr, span: Span },
    Reference { name: String, args: Vec<TypeExpr>, span: Span },
    Union { members: Vec<TypeExpr>, span: Span },
    Intersection { members: Vec<TypeExpr>, span: Span },
    Array { element: Box<TypeExpr>, span: Span },
    Tuple { elements: Vec<TupleElementExpr>, span: Span },
    Object { members: Vec<TypeMember>, span: Span },
    Function { signature: Box<SignatureExpr>, span: Span },
    /// `typeof name`
    TypeQuery { name: String, span: Span },
    /// `keyof T`
    KeyOf { operand: Box<TypeExpr>, span: Span },
    /// `T[K]`
    IndexedAccess {
        object: Box<TypeExpr>,
        index: Box<TypeExpr>,
        span: Span,
    },
    /// A construct kept as normalized source text (mapped types, conditionals, ...)
    Opaque { text: String, span: Span },
}

impl TypeExpr {
    pub fn span(&self) -> Span {
        match self {
            TypeExpr::Keyword { span, .. }
            | TypeExpr::Literal { span, .. }
            | TypeExpr::Reference { span, .. }
            | TypeExpr::Union { span, .. }
            | TypeExpr::Intersection { span, .. }
            | TypeExpr::Array { span, .. }
            | TypeExpr::Tuple { span, .. }
            | TypeExpr::Object { span, .. }
            | TypeExpr::Function { span, .. }
            | TypeExpr::TypeQuery { span, .. }
            | TypeExpr::KeyOf { span, .. }
            | TypeExpr::IndexedAccess { span, .. }
            | TypeExpr::Opaque { span, .. } => *span,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TypeKeyword {
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

impl TypeKeyword {
    pub fn from_ident(ident: &str) -> Option<Self> {
        Some(match ident {
            "any" => Self::Any,
            "unknown" => Self::Unknown,
            "never" => Self::Never,
            "void" => Self::Void,
            "null" => Self::Null,
            "undefined" => Self::Undefined,
            "string" => Self::String,
            "number" => Self::Number,
            "boolean" => Self::Boolean,
            "bigint" => Self::BigInt,
            "symbol" => Self::Symbol,
            "object" => Self::Object,
            _ => return None,
        })
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Any => "any",
            Self::Unknown => "unknown",
            Self::Never => "never",
            Self::Void => "void",
            Self::Null => "null",
            Self::Undefined => "undefined",
            Self::String => "string",
            Self::Number => "number",
            Self::Boolean => "boolean",
            Self::BigInt => "bigint",
            Self::Symbol => "symbol",
            Self::Object => "object",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum LiteralTypeExpr {
    /// Unescaped string value
    String(String),
    /// Numeric source text, sign included
    Number(String),
    Boolean(bool),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TupleElementExpr {
    pub label: Option<String>,
    pub optional: bool,
    pub rest: bool,
    pub type_: TypeExpr,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SignatureExpr {
    pub type_params: Vec<TypeParam>,
    pub params: Vec<Param>,
    pub return_type: Option<TypeExpr>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum TypeMemberKind {
    Property(Option<TypeExpr>),
    Method(SignatureExpr),
    Call(SignatureExpr),
    Index { key: TypeExpr, value: TypeExpr },
    Construct,
}

/// A member of an interface or object literal type
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TypeMember {
    pub name: String,
    pub kind: TypeMemberKind,
    pub optional: bool,
    pub readonly: bool,
    pub doc: Option<DocComment>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Param {
    pub pattern: Pattern,
    pub optional: bool,
    pub rest: bool,
    pub type_: Option<TypeExpr>,
    pub default: Option<Expr>,
    pub span: Span,
}

impl Param {
    /// The bound name for simple identifier parameters
    pub fn name(&self) -> Option<&str> {
        match &self.pattern {
            Pattern::Ident { name, .. } => Some(name),
            _ => None,
        }
    }
}

/// Binding patterns (parameters and variable declarations)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "pattern")]
pub enum Pattern {
    Ident {
        name: String,
        span: Span,
    },
    Object {
        properties: Vec<PatternProperty>,
        rest: Option<String>,
        span: Span,
    },
    Array {
        elements: Vec<Option<Pattern>>,
        span: Span,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PatternProperty {
    pub key: String,
    pub value: Pattern,
    pub default: Option<Expr>,
    pub span: Span,
}

/// Value expressions
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "node")]
pub enum Expr {
    /// String literal; `raw` keeps the escapes as written, without quotes
    String { raw: String, span: Span },
    /// Numeric literal source text
    Number { raw: String, span: Span },
    Boolean { value: bool, span: Span },
    Null { span: Span },
    /// Template literal body without backticks
    Template { raw: String, span: Span },
    Array { elements: Vec<Expr>, multiline: bool, span: Span },
    Object(ObjectLit),
    Ident { name: String, span: Span },
    Member { object: Box<Expr>, property: String, span: Span },
    Call {
        callee: Box<Expr>,
        type_args: Vec<TypeExpr>,
        args: Vec<Expr>,
        span: Span,
    },
    Function(Box<Function>),
    Unary { op: UnaryOp, operand: Box<Expr>, span: Span },
    Spread { argument: Box<Expr>, span: Span },
    /// `expr as T` / `expr satisfies T`
    TypeAssertion { expr: Box<Expr>, type_: TypeExpr, span: Span },
    /// Anything outside the modeled grammar, kept as source text
    Opaque { text: String, span: Span },
}

impl Expr {
    pub fn span(&self) -> Span {
        match self {
            Expr::String { span, .. }
            | Expr::Number { span, .. }
            | Expr::Boolean { span, .. }
            | Expr::Null { span }
            | Expr::Template { span, .. }
            | Expr::Array { span, .. }
            | Expr::Ident { span, .. }
            | Expr::Member { span, .. }
            | Expr::Call { span, .. }
            | Expr::Unary { span, .. }
            | Expr::Spread { span, .. }
            | Expr::TypeAssertion { span, .. }
            | Expr::Opaque { span, .. } => *span,
            Expr::Object(object) => object.span,
            Expr::Function(function) => function.span,
        }
    }

    /// Name of the called function for `name(...)` calls
    pub fn callee_name(&self) -> Option<&str> {
        match self {
            Expr::Call { callee, .. } => match callee.as_ref() {
                Expr::Ident { name, .. } => Some(name),
                _ => None,
            },
            _ => None,
        }
    }

    /// Strip `as`/`satisfies` assertions
    pub fn unwrap_assertions(&self) -> &Expr {
        match self {
            Expr::TypeAssertion { expr, .. } => expr.unwrap_assertions(),
            other => other,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum UnaryOp {
    Minus,
    Plus,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObjectLit {
    pub properties: Vec<ObjectProperty>,
    pub multiline: bool,
    pub span: Span,
}

impl ObjectLit {
    /// Find a non-computed property by key
    pub fn get(&self, key: &str) -> Option<&ObjectProperty> {
        self.properties
            .iter()
            .find(|property| matches!(&property.key, PropertyKey::Ident(k) | PropertyKey::String(k) if k == key))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum PropertyKey {
    Ident(String),
    /// Unescaped string key
    String(String),
    Number(String),
    Computed(String),
}

impl PropertyKey {
    pub fn name(&self) -> &str {
        match self {
            PropertyKey::Ident(name)
            | PropertyKey::String(name)
            | PropertyKey::Number(name)
            | PropertyKey::Computed(name) => name,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ObjectPropertyKind {
    /// `key: value`
    Init(Expr),
    /// `key` (shorthand)
    Shorthand,
    /// `key() { ... }`
    Method(Function),
    /// `get key() {}` / `set key(v) {}`
    Accessor,
    /// `...expr`
    Spread(Expr),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObjectProperty {
    pub key: PropertyKey,
    pub kind: ObjectPropertyKind,
    pub doc: Option<DocComment>,
    pub span: Span,
}

impl ObjectProperty {
    /// The initializer for `key: value` properties
    pub fn value(&self) -> Option<&Expr> {
        match &self.kind {
            ObjectPropertyKind::Init(expr) => Some(expr),
            _ => None,
        }
    }
}

/// Arrow functions, function expressions, declarations and methods
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Function {
    pub is_arrow: bool,
    pub is_async: bool,
    pub type_params: Vec<TypeParam>,
    pub params: Vec<Param>,
    pub return_type: Option<TypeExpr>,
    /// `None` for overloads and ambient declarations
    pub body: Option<FunctionBody>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum FunctionBody {
    Expr(Expr),
    Block(Vec<Statement>),
}

/// Statements inside function bodies; only `return` is modeled
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Statement {
    Return { value: Option<Expr>, span: Span },
    Other { span: Span },
}
