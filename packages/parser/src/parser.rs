use crate::ast::*;
use crate::error::{ParseError, ParseResult};
use crate::jsdoc::parse_doc_comment;
use crate::tokenizer::{tokenize, Token};
use std::ops::Range;

/// Statements the parser never needs to look inside of
const STATEMENT_KEYWORDS: &[&str] = &[
    "if", "for", "while", "do", "switch", "try", "throw", "return", "break", "continue", "with",
    "debugger",
];

const DECLARATION_KEYWORDS: &[&str] = &[
    "const",
    "let",
    "var",
    "function",
    "class",
    "interface",
    "type",
    "enum",
    "namespace",
    "module",
    "global",
    "abstract",
    "async",
];

const CLASS_MODIFIERS: &[&str] = &[
    "public",
    "private",
    "protected",
    "static",
    "readonly",
    "abstract",
    "override",
    "declare",
    "accessor",
    "async",
];

const PARAMETER_MODIFIERS: &[&str] = &["public", "private", "protected", "readonly", "override"];

/// Parse a complete script
pub fn parse_module(source: &str) -> ParseResult<Module> {
    Parser::new(source)?.parse_module()
}

/// Recursive-descent parser for component scripts.
///
/// Declarations (imports, exports, interfaces, aliases, enums, classes,
/// functions and variables) are parsed strictly. Other statements are
/// skipped as balanced token runs, and expressions outside the modeled
/// grammar are kept as opaque source text.
pub struct Parser<'src> {
    source: &'src str,
    tokens: Vec<(Token<'src>, Range<usize>)>,
    /// Doc comment immediately preceding each token
    docs: Vec<Option<DocComment>>,
    pos: usize,
}

impl<'src> Parser<'src> {
    /// Lex `source`; input that is not a token is a syntax error
    pub fn new(source: &'src str) -> ParseResult<Self> {
        let mut tokens = Vec::new();
        let mut docs = Vec::new();
        let mut pending: Option<&'src str> = None;

        for (token, span) in tokenize(source)? {
            match token {
                Token::Comment(text) => {
                    if token.is_doc_comment() {
                        pending = Some(text);
                    }
                }
                _ => {
                    docs.push(pending.take().map(parse_doc_comment));
                    tokens.push((token, span));
                }
            }
        }

        Ok(Self {
            source,
            tokens,
            docs,
            pos: 0,
        })
    }

    /// Parse a complete module
    pub fn parse_module(&mut self) -> ParseResult<Module> {
        let mut items = Vec::new();

        while let Some(token) = self.peek_token() {
            match token {
                Token::Semicolon => {
                    self.advance();
                }
                Token::RBrace | Token::RParen | Token::RBracket => {
                    return Err(self.error_here("statement"));
                }
                _ => items.push(self.parse_item()?),
            }
        }

        Ok(Module { items })
    }

    fn parse_item(&mut self) -> ParseResult<Item> {
        let start = self.peek_span().start;
        let doc = self.peek_doc();

        while self.check(Token::At) {
            self.skip_decorator()?;
        }
        // A doc comment may also sit between the decorators and the declaration
        let doc = doc.or_else(|| self.peek_doc());

        if self.check_ident("import")
            && !matches!(self.peek_token_at(1), Some(Token::LParen) | Some(Token::Dot))
        {
            return self.parse_import();
        }

        if self.check_ident("export") {
            return self.parse_export(start, doc);
        }

        let meta = DeclMeta {
            exported: false,
            declare: false,
            doc,
            span: Span::new(start, start),
        };

        if let Some(item) = self.parse_declaration(meta)? {
            return Ok(item);
        }

        self.parse_statement()
    }

    fn parse_statement(&mut self) -> ParseResult<Item> {
        let start = self.peek_span().start;
        let starts_expression = match self.peek_token() {
            Some(Token::Ident(word)) => !STATEMENT_KEYWORDS.contains(&word),
            Some(Token::LBrace) | None => false,
            Some(_) => true,
        };

        if starts_expression {
            let saved = self.pos;
            if let Ok(expr) = self.parse_expression() {
                if self.at_statement_end() {
                    self.match_token(Token::Semicolon);
                    return Ok(Item::Expression {
                        expr,
                        span: Span::new(start, self.prev_end()),
                    });
                }
            }
            self.pos = saved;
        }

        let span = self.skip_statement()?;
        Ok(Item::Other { span })
    }

    /// Parse a declaration if one starts at the current token
    fn parse_declaration(&mut self, mut meta: DeclMeta) -> ParseResult<Option<Item>> {
        if self.check_ident("declare")
            && matches!(self.peek_token_at(1), Some(Token::Ident(word)) if DECLARATION_KEYWORDS.contains(&word))
        {
            self.advance();
            meta.declare = true;
        }

        let Some(Token::Ident(word)) = self.peek_token() else {
            return Ok(None);
        };

        let next = self.peek_token_at(1);
        let next_is_ident = matches!(next, Some(Token::Ident(_)));

        let item = match word {
            "interface" if next_is_ident => Item::Interface(self.parse_interface(meta)?),
            "type"
                if next_is_ident
                    && matches!(
                        self.peek_token_at(2),
                        Some(Token::Equals) | Some(Token::LAngle)
                    ) =>
            {
                Item::TypeAlias(self.parse_type_alias(meta)?)
            }
            "enum" if next_is_ident => Item::Enum(self.parse_enum(meta, false)?),
            "const" if matches!(next, Some(Token::Ident("enum"))) => {
                self.advance();
                Item::Enum(self.parse_enum(meta, true)?)
            }
            "const" | "let" | "var"
                if matches!(
                    next,
                    Some(Token::Ident(_)) | Some(Token::LBrace) | Some(Token::LBracket)
                ) =>
            {
                Item::Variable(self.parse_variable(meta)?)
            }
            "function" => Item::Function(self.parse_function_decl(meta)?),
            "async" if matches!(next, Some(Token::Ident("function"))) => {
                Item::Function(self.parse_function_decl(meta)?)
            }
            "class" => Item::Class(self.parse_class(meta)?),
            "abstract" if matches!(next, Some(Token::Ident("class"))) => {
                Item::Class(self.parse_class(meta)?)
            }
            "namespace" | "module"
                if matches!(next, Some(Token::Ident(_)) | Some(Token::String(_)))
                    && !self.newline_before(self.pos + 1) =>
            {
                self.skip_namespace()?
            }
            "global" if meta.declare && matches!(next, Some(Token::LBrace)) => {
                self.skip_namespace()?
            }
            _ => return Ok(None),
        };

        Ok(Some(item))
    }

    fn finish_meta(&self, mut meta: DeclMeta) -> DeclMeta {
        meta.span = Span::new(meta.span.start, self.prev_end());
        meta
    }

    fn parse_import(&mut self) -> ParseResult<Item> {
        let start = self.peek_span().start;
        self.expect_keyword("import")?;

        let mut decl = ImportDecl {
            source: String::new(),
            default: None,
            namespace: None,
            named: Vec::new(),
            type_only: false,
            span: Span::new(start, start),
        };

        // Side-effect import
        if let Some(Token::String(raw)) = self.peek_token() {
            self.advance();
            decl.source = unescape_string(raw);
            self.match_token(Token::Semicolon);
            decl.span = Span::new(start, self.prev_end());
            return Ok(Item::Import(decl));
        }

        if self.check_ident("type")
            && matches!(
                self.peek_token_at(1),
                Some(Token::LBrace) | Some(Token::Star) | Some(Token::Ident(_))
            )
            && !matches!(self.peek_token_at(1), Some(Token::Ident("from")))
        {
            self.advance();
            decl.type_only = true;
        }

        if let Some(Token::Ident(name)) = self.peek_token() {
            self.advance();
            decl.default = Some(name.to_string());

            // `import x = require('...')`
            if self.check(Token::Equals) {
                let span = self.skip_statement()?;
                return Ok(Item::Other {
                    span: Span::new(start, span.end),
                });
            }

            self.match_token(Token::Comma);
        }

        if self.match_token(Token::Star) {
            self.expect_keyword("as")?;
            decl.namespace = Some(self.expect_ident()?);
        } else if self.match_token(Token::LBrace) {
            while !self.check(Token::RBrace) {
                if self.check_ident("type")
                    && matches!(self.peek_token_at(1), Some(Token::Ident(word)) if word != "as")
                {
                    self.advance();
                }
                let imported = self.expect_module_export_name()?;
                let local = if self.match_ident("as") {
                    self.expect_ident()?
                } else {
                    imported.clone()
                };
                decl.named.push(ImportSpecifier { imported, local });

                if !self.match_token(Token::Comma) {
                    break;
                }
            }
            self.expect(Token::RBrace)?;
        }

        self.expect_keyword("from")?;
        decl.source = self.expect_string()?;
        self.skip_import_attributes()?;
        self.match_token(Token::Semicolon);
        decl.span = Span::new(start, self.prev_end());

        Ok(Item::Import(decl))
    }

    fn skip_import_attributes(&mut self) -> ParseResult<()> {
        if (self.check_ident("assert") || self.check_ident("with"))
            && !self.newline_before(self.pos)
            && matches!(self.peek_token_at(1), Some(Token::LBrace))
        {
            self.advance();
            self.skip_balanced()?;
        }
        Ok(())
    }

    fn parse_export(&mut self, start: usize, doc: Option<DocComment>) -> ParseResult<Item> {
        self.expect_keyword("export")?;

        if self.match_ident("default") {
            return self.parse_export_default(start, doc);
        }

        // `export = x`, `export import a = b`, `export as namespace X`
        if self.check(Token::Equals)
            || self.check_ident("import")
            || (self.check_ident("as") && matches!(self.peek_token_at(1), Some(Token::Ident("namespace"))))
        {
            let span = self.skip_statement()?;
            return Ok(Item::Other {
                span: Span::new(start, span.end),
            });
        }

        if self.check_ident("type") && matches!(self.peek_token_at(1), Some(Token::LBrace)) {
            self.advance();
        }

        if self.match_token(Token::Star) {
            let mut specifiers = Vec::new();
            if self.match_ident("as") {
                let exported = self.expect_module_export_name()?;
                specifiers.push(ExportSpecifier {
                    local: "*".to_string(),
                    exported,
                });
            }
            self.expect_keyword("from")?;
            let source = self.expect_string()?;
            self.skip_import_attributes()?;
            self.match_token(Token::Semicolon);

            return Ok(Item::Export(ExportDecl {
                star: specifiers.is_empty(),
                specifiers,
                source: Some(source),
                span: Span::new(start, self.prev_end()),
            }));
        }

        if self.match_token(Token::LBrace) {
            let mut specifiers = Vec::new();
            while !self.check(Token::RBrace) {
                if self.check_ident("type")
                    && matches!(self.peek_token_at(1), Some(Token::Ident(word)) if word != "as")
                {
                    self.advance();
                }
                let local = self.expect_module_export_name()?;
                let exported = if self.match_ident("as") {
                    self.expect_module_export_name()?
                } else {
                    local.clone()
                };
                specifiers.push(ExportSpecifier { local, exported });

                if !self.match_token(Token::Comma) {
                    break;
                }
            }
            self.expect(Token::RBrace)?;

            let source = if self.match_ident("from") {
                Some(self.expect_string()?)
            } else {
                None
            };
            self.skip_import_attributes()?;
            self.match_token(Token::Semicolon);

            return Ok(Item::Export(ExportDecl {
                specifiers,
                source,
                star: false,
                span: Span::new(start, self.prev_end()),
            }));
        }

        let meta = DeclMeta {
            exported: true,
            declare: false,
            doc,
            span: Span::new(start, start),
        };

        match self.parse_declaration(meta)? {
            Some(item) => Ok(item),
            None => Err(self.error_here("declaration")),
        }
    }

    fn parse_export_default(&mut self, start: usize, doc: Option<DocComment>) -> ParseResult<Item> {
        let meta = DeclMeta {
            exported: true,
            declare: false,
            doc,
            span: Span::new(start, start),
        };

        let is_function = self.check_ident("function")
            || (self.check_ident("async")
                && matches!(self.peek_token_at(1), Some(Token::Ident("function"))));
        if is_function {
            let decl = self.parse_function_decl(meta)?;
            return Ok(Item::ExportDefault(ExportDefault::Function(decl)));
        }

        let is_class = self.check_ident("class")
            || (self.check_ident("abstract")
                && matches!(self.peek_token_at(1), Some(Token::Ident("class"))));
        if is_class {
            let decl = self.parse_class(meta)?;
            return Ok(Item::ExportDefault(ExportDefault::Class(decl)));
        }

        if self.check_ident("interface") && matches!(self.peek_token_at(1), Some(Token::Ident(_))) {
            return Ok(Item::Interface(self.parse_interface(meta)?));
        }

        let expr = self.parse_expression()?;
        self.match_token(Token::Semicolon);
        let meta = self.finish_meta(meta);

        Ok(Item::ExportDefault(ExportDefault::Expr { expr, meta }))
    }

    fn parse_interface(&mut self, meta: DeclMeta) -> ParseResult<InterfaceDecl> {
        self.expect_keyword("interface")?;
        let name = self.expect_ident()?;
        let type_params = self.parse_type_params_opt()?;

        let mut extends = Vec::new();
        if self.match_ident("extends") {
            loop {
                extends.push(self.parse_primary_type()?);
                if !self.match_token(Token::Comma) {
                    break;
                }
            }
        }

        let members = self.parse_object_type_body()?;

        Ok(InterfaceDecl {
            name,
            type_params,
            extends,
            members,
            meta: self.finish_meta(meta),
        })
    }

    fn parse_type_alias(&mut self, meta: DeclMeta) -> ParseResult<TypeAliasDecl> {
        self.expect_keyword("type")?;
        let name = self.expect_ident()?;
        let type_params = self.parse_type_params_opt()?;
        self.expect(Token::Equals)?;
        let type_ = self.parse_type()?;
        self.match_token(Token::Semicolon);

        Ok(TypeAliasDecl {
            name,
            type_params,
            type_,
            meta: self.finish_meta(meta),
        })
    }

    fn parse_enum(&mut self, meta: DeclMeta, is_const: bool) -> ParseResult<EnumDecl> {
        self.expect_keyword("enum")?;
        let name = self.expect_ident()?;
        self.expect(Token::LBrace)?;

        let mut members = Vec::new();
        while !self.check(Token::RBrace) {
            let start = self.peek_span().start;
            let doc = self.peek_doc();
            let name = self.parse_property_name()?;
            let init = if self.match_token(Token::Equals) {
                Some(self.parse_expression()?)
            } else {
                None
            };
            members.push(EnumMember {
                name,
                init,
                doc,
                span: Span::new(start, self.prev_end()),
            });

            if !self.match_token(Token::Comma) {
                break;
            }
        }
        self.expect(Token::RBrace)?;

        Ok(EnumDecl {
            name,
            is_const,
            members,
            meta: self.finish_meta(meta),
        })
    }

    fn parse_variable(&mut self, meta: DeclMeta) -> ParseResult<VariableDecl> {
        let kind = match self.advance() {
            Some(Token::Ident("const")) => VarKind::Const,
            Some(Token::Ident("let")) => VarKind::Let,
            _ => VarKind::Var,
        };

        let mut declarators = Vec::new();
        loop {
            let start = self.peek_span().start;
            let pattern = self.parse_binding_pattern()?;
            self.match_token(Token::Bang);
            let type_ = if self.match_token(Token::Colon) {
                Some(self.parse_type()?)
            } else {
                None
            };
            let init = if self.match_token(Token::Equals) {
                Some(self.parse_expression()?)
            } else {
                None
            };
            declarators.push(Declarator {
                pattern,
                type_,
                init,
                span: Span::new(start, self.prev_end()),
            });

            if !self.match_token(Token::Comma) {
                break;
            }
        }
        self.match_token(Token::Semicolon);

        Ok(VariableDecl {
            kind,
            declarators,
            meta: self.finish_meta(meta),
        })
    }

    fn parse_function_decl(&mut self, meta: DeclMeta) -> ParseResult<FunctionDecl> {
        let start = self.peek_span().start;
        let is_async = self.match_ident("async");
        self.expect_keyword("function")?;
        self.match_token(Token::Star);

        let name = match self.peek_token() {
            Some(Token::Ident(name)) => {
                self.advance();
                Some(name.to_string())
            }
            _ => None,
        };

        let function = self.parse_function_rest(start, is_async)?;

        Ok(FunctionDecl {
            name,
            function,
            meta: self.finish_meta(meta),
        })
    }

    /// Type parameters, parameters, return type and body of a non-arrow function
    fn parse_function_rest(&mut self, start: usize, is_async: bool) -> ParseResult<Function> {
        let type_params = self.parse_type_params_opt()?;
        let params = self.parse_params()?;
        let return_type = if self.match_token(Token::Colon) {
            Some(self.parse_return_type()?)
        } else {
            None
        };

        let body = if self.check(Token::LBrace) {
            Some(FunctionBody::Block(self.parse_block_body()?))
        } else {
            self.match_token(Token::Semicolon);
            None
        };

        Ok(Function {
            is_arrow: false,
            is_async,
            type_params,
            params,
            return_type,
            body,
            span: Span::new(start, self.prev_end()),
        })
    }

    fn parse_class(&mut self, meta: DeclMeta) -> ParseResult<ClassDecl> {
        let is_abstract = self.match_ident("abstract");
        self.expect_keyword("class")?;

        let name = match self.peek_token() {
            Some(Token::Ident(name)) if name != "extends" && name != "implements" => {
                self.advance();
                Some(name.to_string())
            }
            _ => None,
        };

        let type_params = self.parse_type_params_opt()?;

        let extends = if self.match_ident("extends") {
            let expr = self.parse_postfix_expr()?;
            if self.check(Token::LAngle) {
                self.parse_type_args()?;
            }
            Some(expr)
        } else {
            None
        };

        if self.match_ident("implements") {
            loop {
                self.parse_primary_type()?;
                if !self.match_token(Token::Comma) {
                    break;
                }
            }
        }

        self.expect(Token::LBrace)?;
        let mut members = Vec::new();
        loop {
            match self.peek_token() {
                None => return Err(self.error_here("'}'")),
                Some(Token::RBrace) => {
                    self.advance();
                    break;
                }
                Some(Token::Semicolon) => {
                    self.advance();
                }
                Some(_) => members.push(self.parse_class_member()?),
            }
        }

        Ok(ClassDecl {
            name,
            type_params,
            extends,
            is_abstract,
            members,
            meta: self.finish_meta(meta),
        })
    }

    fn parse_class_member(&mut self) -> ParseResult<ClassMember> {
        let start = self.peek_span().start;
        let doc = self.peek_doc();

        while self.check(Token::At) {
            self.skip_decorator()?;
        }

        let mut member = ClassMember {
            name: String::new(),
            kind: ClassMemberKind::Method,
            optional: false,
            is_static: false,
            readonly: false,
            visibility: Visibility::Public,
            doc,
            span: Span::new(start, start),
        };

        while let Some(Token::Ident(word)) = self.peek_token() {
            if !CLASS_MODIFIERS.contains(&word) || !self.starts_class_member_name_at(1) {
                break;
            }
            self.advance();
            match word {
                "public" => member.visibility = Visibility::Public,
                "protected" => member.visibility = Visibility::Protected,
                "private" => member.visibility = Visibility::Private,
                "static" => member.is_static = true,
                "readonly" => member.readonly = true,
                _ => {}
            }
        }

        if member.is_static && self.check(Token::LBrace) {
            self.skip_balanced()?;
            member.kind = ClassMemberKind::StaticBlock;
            member.span = Span::new(start, self.prev_end());
            return Ok(member);
        }

        if (self.check_ident("get") || self.check_ident("set")) && self.starts_class_member_name_at(1) {
            self.advance();
            member.name = self.parse_class_member_name(&mut member.visibility)?;
            let method_start = self.peek_span().start;
            self.parse_function_rest(method_start, false)?;
            member.kind = ClassMemberKind::Accessor;
            member.span = Span::new(start, self.prev_end());
            return Ok(member);
        }

        self.match_token(Token::Star);

        if self.check(Token::LBracket)
            && matches!(self.peek_token_at(1), Some(Token::Ident(_)))
            && matches!(self.peek_token_at(2), Some(Token::Colon))
        {
            self.skip_statement()?;
            member.kind = ClassMemberKind::IndexSignature;
            member.span = Span::new(start, self.prev_end());
            return Ok(member);
        }

        if self.check_ident("constructor") && matches!(self.peek_token_at(1), Some(Token::LParen)) {
            self.advance();
            member.name = "constructor".to_string();
            let method_start = self.peek_span().start;
            self.parse_function_rest(method_start, false)?;
            member.kind = ClassMemberKind::Constructor;
            member.span = Span::new(start, self.prev_end());
            return Ok(member);
        }

        member.name = self.parse_class_member_name(&mut member.visibility)?;

        if self.match_token(Token::Question) {
            member.optional = true;
        } else {
            self.match_token(Token::Bang);
        }

        if self.check(Token::LParen) || self.check(Token::LAngle) {
            let method_start = self.peek_span().start;
            self.parse_function_rest(method_start, false)?;
            member.kind = ClassMemberKind::Method;
        } else {
            let type_ = if self.match_token(Token::Colon) {
                Some(self.parse_type()?)
            } else {
                None
            };
            let initializer = if self.match_token(Token::Equals) {
                Some(self.parse_expression()?)
            } else {
                None
            };
            self.match_token(Token::Semicolon);
            member.kind = ClassMemberKind::Field { type_, initializer };
        }

        member.span = Span::new(start, self.prev_end());
        Ok(member)
    }

    fn parse_class_member_name(&mut self, visibility: &mut Visibility) -> ParseResult<String> {
        if self.match_token(Token::Hash) {
            *visibility = Visibility::Private;
            return Ok(format!("#{}", self.expect_ident()?));
        }
        self.parse_property_name()
    }

    fn starts_class_member_name_at(&self, offset: usize) -> bool {
        matches!(
            self.peek_token_at(offset),
            Some(Token::Ident(_))
                | Some(Token::String(_))
                | Some(Token::Number(_))
                | Some(Token::LBracket)
                | Some(Token::Hash)
                | Some(Token::Star)
                | Some(Token::LBrace)
        )
    }

    fn skip_decorator(&mut self) -> ParseResult<()> {
        self.expect(Token::At)?;
        self.parse_postfix_expr()?;
        Ok(())
    }

    fn skip_namespace(&mut self) -> ParseResult<Item> {
        let start = self.peek_span().start;
        while let Some(token) = self.peek_token() {
            match token {
                Token::LBrace => {
                    self.skip_balanced()?;
                    break;
                }
                Token::Semicolon => {
                    self.advance();
                    break;
                }
                _ => {
                    self.advance();
                    if self.at_statement_boundary() {
                        break;
                    }
                }
            }
        }
        Ok(Item::Other {
            span: Span::new(start, self.prev_end()),
        })
    }

    // ---------------------------------------------------------------------
    // Types
    // ---------------------------------------------------------------------

    /// Parse a full type, including conditional types
    pub fn parse_type(&mut self) -> ParseResult<TypeExpr> {
        let start = self.peek_span().start;
        let check_type = self.parse_union_type()?;

        if self.check_ident("extends") && !self.newline_before(self.pos) {
            self.advance();
            self.parse_union_type()?;
            self.expect(Token::Question)?;
            self.parse_type()?;
            self.expect(Token::Colon)?;
            self.parse_type()?;
            return Ok(self.opaque_type(start));
        }

        Ok(check_type)
    }

    fn parse_union_type(&mut self) -> ParseResult<TypeExpr> {
        let start = self.peek_span().start;
        self.match_token(Token::Pipe);

        let first = self.parse_intersection_type()?;
        if !self.check(Token::Pipe) {
            return Ok(first);
        }

        let mut members = vec![first];
        while self.match_token(Token::Pipe) {
            members.push(self.parse_intersection_type()?);
        }

        Ok(TypeExpr::Union {
            members,
            span: Span::new(start, self.prev_end()),
        })
    }

    fn parse_intersection_type(&mut self) -> ParseResult<TypeExpr> {
        let start = self.peek_span().start;
        self.match_token(Token::Ampersand);

        let first = self.parse_type_operator()?;
        if !self.check(Token::Ampersand) {
            return Ok(first);
        }

        let mut members = vec![first];
        while self.match_token(Token::Ampersand) {
            members.push(self.parse_type_operator()?);
        }

        Ok(TypeExpr::Intersection {
            members,
            span: Span::new(start, self.prev_end()),
        })
    }

    fn parse_type_operator(&mut self) -> ParseResult<TypeExpr> {
        let start = self.peek_span().start;

        if let Some(Token::Ident(word)) = self.peek_token() {
            let is_operator = matches!(word, "keyof" | "unique" | "readonly" | "infer")
                && !matches!(
                    self.peek_token_at(1),
                    None | Some(Token::Colon)
                        | Some(Token::Comma)
                        | Some(Token::RAngle)
                        | Some(Token::RParen)
                        | Some(Token::RBracket)
                        | Some(Token::RBrace)
                        | Some(Token::Semicolon)
                        | Some(Token::Equals)
                        | Some(Token::Question)
                        | Some(Token::Pipe)
                        | Some(Token::Ampersand)
                );

            if is_operator {
                self.advance();
                if word == "infer" {
                    self.expect_ident()?;
                } else {
                    let operand = self.parse_type_operator()?;
                    match word {
                        "keyof" => {
                            return Ok(TypeExpr::KeyOf {
                                operand: Box::new(operand),
                                span: Span::new(start, self.prev_end()),
                            })
                        }
                        "readonly" => return Ok(operand),
                        _ => {}
                    }
                }
                return Ok(self.opaque_type(start));
            }
        }

        self.parse_postfix_type()
    }

    fn parse_postfix_type(&mut self) -> ParseResult<TypeExpr> {
        let start = self.peek_span().start;
        let mut ty = self.parse_primary_type()?;

        while self.check(Token::LBracket) && !self.newline_before(self.pos) {
            self.advance();
            if self.match_token(Token::RBracket) {
                ty = TypeExpr::Array {
                    element: Box::new(ty),
                    span: Span::new(start, self.prev_end()),
                };
            } else {
                let index = self.parse_type()?;
                self.expect(Token::RBracket)?;
                ty = TypeExpr::IndexedAccess {
                    object: Box::new(ty),
                    index: Box::new(index),
                    span: Span::new(start, self.prev_end()),
                };
            }
        }

        Ok(ty)
    }

    fn parse_primary_type(&mut self) -> ParseResult<TypeExpr> {
        let start = self.peek_span().start;
        let Some(token) = self.peek_token() else {
            return Err(self.error_here("type"));
        };

        match token {
            Token::LParen => {
                if let Some(signature) = self.try_parse(|p| p.parse_function_type_signature()) {
                    return Ok(TypeExpr::Function {
                        signature: Box::new(signature),
                        span: Span::new(start, self.prev_end()),
                    });
                }
                self.advance();
                let inner = self.parse_type()?;
                self.expect(Token::RParen)?;
                Ok(inner)
            }
            Token::LAngle => {
                let signature = self.parse_function_type_signature()?;
                Ok(TypeExpr::Function {
                    signature: Box::new(signature),
                    span: Span::new(start, self.prev_end()),
                })
            }
            Token::LBrace => {
                if self.is_mapped_type_start() {
                    self.skip_balanced()?;
                    return Ok(self.opaque_type(start));
                }
                let members = self.parse_object_type_body()?;
                Ok(TypeExpr::Object {
                    members,
                    span: Span::new(start, self.prev_end()),
                })
            }
            Token::LBracket => self.parse_tuple_type(),
            Token::String(raw) => {
                self.advance();
                Ok(TypeExpr::Literal {
                    literal: LiteralTypeExpr::String(unescape_string(raw)),
                    span: Span::new(start, self.prev_end()),
                })
            }
            Token::Number(raw) => {
                self.advance();
                Ok(TypeExpr::Literal {
                    literal: LiteralTypeExpr::Number(raw.to_string()),
                    span: Span::new(start, self.prev_end()),
                })
            }
            Token::Minus => {
                self.advance();
                match self.advance() {
                    Some(Token::Number(raw)) => Ok(TypeExpr::Literal {
                        literal: LiteralTypeExpr::Number(format!("-{}", raw)),
                        span: Span::new(start, self.prev_end()),
                    }),
                    _ => Err(ParseError::invalid_syntax(
                        Span::new(start, self.prev_end()),
                        "expected a number after '-' in type position",
                    )),
                }
            }
            Token::Template(_) => {
                self.advance();
                Ok(self.opaque_type(start))
            }
            Token::Ident("true") | Token::Ident("false") => {
                self.advance();
                Ok(TypeExpr::Literal {
                    literal: LiteralTypeExpr::Boolean(token.is_ident("true")),
                    span: Span::new(start, self.prev_end()),
                })
            }
            Token::Ident("typeof") => {
                self.advance();
                if self.check_ident("import") {
                    self.parse_import_type()?;
                    return Ok(self.opaque_type(start));
                }
                let name = self.parse_entity_name()?;
                if self.check(Token::LAngle) && !self.newline_before(self.pos) {
                    self.parse_type_args()?;
                    return Ok(self.opaque_type(start));
                }
                Ok(TypeExpr::TypeQuery {
                    name,
                    span: Span::new(start, self.prev_end()),
                })
            }
            Token::Ident("import") if matches!(self.peek_token_at(1), Some(Token::LParen)) => {
                let (name, args) = self.parse_import_type()?;
                if name.is_empty() {
                    return Ok(self.opaque_type(start));
                }
                Ok(TypeExpr::Reference {
                    name,
                    args,
                    span: Span::new(start, self.prev_end()),
                })
            }
            Token::Ident("new") | Token::Ident("abstract")
                if matches!(
                    self.peek_token_at(1),
                    Some(Token::LParen) | Some(Token::LAngle) | Some(Token::Ident("new"))
                ) =>
            {
                self.advance();
                self.match_ident("new");
                self.parse_function_type_signature()?;
                Ok(self.opaque_type(start))
            }
            Token::Ident("this") => {
                self.advance();
                Ok(self.opaque_type(start))
            }
            Token::Ident(word) => {
                if let Some(keyword) = TypeKeyword::from_ident(word) {
                    if !matches!(self.peek_token_at(1), Some(Token::Dot)) {
                        self.advance();
                        return Ok(TypeExpr::Keyword {
                            keyword,
                            span: Span::new(start, self.prev_end()),
                        });
                    }
                }

                let name = self.parse_entity_name()?;
                let args = if self.check(Token::LAngle) && !self.newline_before(self.pos) {
                    self.parse_type_args()?
                } else {
                    Vec::new()
                };

                Ok(TypeExpr::Reference {
                    name,
                    args,
                    span: Span::new(start, self.prev_end()),
                })
            }
            _ => Err(self.error_here("type")),
        }
    }

    /// `import('./mod').Name<Args>`, yielding the qualified name after the import
    fn parse_import_type(&mut self) -> ParseResult<(String, Vec<TypeExpr>)> {
        self.expect_keyword("import")?;
        if !self.check(Token::LParen) {
            return Err(self.error_here("'('"));
        }
        self.skip_balanced()?;

        let mut segments = Vec::new();
        while self.match_token(Token::Dot) {
            segments.push(self.expect_ident()?);
        }
        let args = if self.check(Token::LAngle) && !self.newline_before(self.pos) {
            self.parse_type_args()?
        } else {
            Vec::new()
        };

        Ok((segments.join("."), args))
    }

    /// Dotted name such as `Foo.Bar.Baz`
    fn parse_entity_name(&mut self) -> ParseResult<String> {
        let mut name = self.expect_ident()?;
        while self.check(Token::Dot) && matches!(self.peek_token_at(1), Some(Token::Ident(_))) {
            self.advance();
            name.push('.');
            name.push_str(&self.expect_ident()?);
        }
        Ok(name)
    }

    fn is_mapped_type_start(&self) -> bool {
        let mut offset = 1;
        if matches!(
            self.peek_token_at(offset),
            Some(Token::Plus) | Some(Token::Minus)
        ) {
            offset += 1;
        }
        if matches!(self.peek_token_at(offset), Some(Token::Ident("readonly"))) {
            offset += 1;
        }
        matches!(self.peek_token_at(offset), Some(Token::LBracket))
            && matches!(self.peek_token_at(offset + 1), Some(Token::Ident(_)))
            && matches!(self.peek_token_at(offset + 2), Some(Token::Ident("in")))
    }

    fn parse_tuple_type(&mut self) -> ParseResult<TypeExpr> {
        let start = self.peek_span().start;
        self.expect(Token::LBracket)?;

        let mut elements = Vec::new();
        while !self.check(Token::RBracket) {
            let rest = self.match_token(Token::Ellipsis);

            let labeled = matches!(self.peek_token(), Some(Token::Ident(_)))
                && (matches!(self.peek_token_at(1), Some(Token::Colon))
                    || (matches!(self.peek_token_at(1), Some(Token::Question))
                        && matches!(self.peek_token_at(2), Some(Token::Colon))));

            let mut optional = false;
            let label = if labeled {
                let label = self.expect_ident()?;
                optional = self.match_token(Token::Question);
                self.expect(Token::Colon)?;
                Some(label)
            } else {
                None
            };

            let type_ = self.parse_type()?;
            if label.is_none() && self.match_token(Token::Question) {
                optional = true;
            }

            elements.push(TupleElementExpr {
                label,
                optional,
                rest,
                type_,
            });

            if !self.match_token(Token::Comma) {
                break;
            }
        }
        self.expect(Token::RBracket)?;

        Ok(TypeExpr::Tuple {
            elements,
            span: Span::new(start, self.prev_end()),
        })
    }

    /// `{ member; member }` of an interface or object literal type
    fn parse_object_type_body(&mut self) -> ParseResult<Vec<TypeMember>> {
        self.expect(Token::LBrace)?;

        let mut members = Vec::new();
        loop {
            match self.peek_token() {
                None => return Err(self.error_here("'}'")),
                Some(Token::RBrace) => {
                    self.advance();
                    break;
                }
                Some(Token::Semicolon) | Some(Token::Comma) => {
                    self.advance();
                }
                Some(_) => members.push(self.parse_type_member()?),
            }
        }

        Ok(members)
    }

    fn parse_type_member(&mut self) -> ParseResult<TypeMember> {
        let start = self.peek_span().start;
        let doc = self.peek_doc();

        let mut member = TypeMember {
            name: String::new(),
            kind: TypeMemberKind::Property(None),
            optional: false,
            readonly: false,
            doc,
            span: Span::new(start, start),
        };

        if self.check_ident("readonly") && self.starts_member_name_at(1) {
            self.advance();
            member.readonly = true;
        }

        match self.peek_token() {
            Some(Token::LParen) | Some(Token::LAngle) => {
                let signature = self.parse_method_signature()?;
                member.kind = TypeMemberKind::Call(signature);
                member.span = Span::new(start, self.prev_end());
                return Ok(member);
            }
            Some(Token::Ident("new"))
                if matches!(
                    self.peek_token_at(1),
                    Some(Token::LParen) | Some(Token::LAngle)
                ) =>
            {
                self.advance();
                self.parse_method_signature()?;
                member.kind = TypeMemberKind::Construct;
                member.span = Span::new(start, self.prev_end());
                return Ok(member);
            }
            Some(Token::LBracket)
                if matches!(self.peek_token_at(1), Some(Token::Ident(_)))
                    && matches!(self.peek_token_at(2), Some(Token::Colon)) =>
            {
                self.advance();
                member.name = self.expect_ident()?;
                self.expect(Token::Colon)?;
                let key = self.parse_type()?;
                self.expect(Token::RBracket)?;
                self.expect(Token::Colon)?;
                let value = self.parse_type()?;
                member.kind = TypeMemberKind::Index { key, value };
                member.span = Span::new(start, self.prev_end());
                return Ok(member);
            }
            _ => {}
        }

        let accessor = match self.peek_token() {
            Some(Token::Ident(word @ ("get" | "set"))) if self.starts_member_name_at(1) => {
                self.advance();
                Some(word)
            }
            _ => None,
        };

        member.name = self.parse_property_name()?;
        member.optional = self.match_token(Token::Question);

        member.kind = if self.check(Token::LParen) || self.check(Token::LAngle) {
            let signature = self.parse_method_signature()?;
            match accessor {
                Some("get") => TypeMemberKind::Property(signature.return_type),
                Some(_) => TypeMemberKind::Property(
                    signature.params.into_iter().next().and_then(|param| param.type_),
                ),
                None => TypeMemberKind::Method(signature),
            }
        } else if self.match_token(Token::Colon) {
            TypeMemberKind::Property(Some(self.parse_type()?))
        } else {
            TypeMemberKind::Property(None)
        };

        member.span = Span::new(start, self.prev_end());
        Ok(member)
    }

    fn starts_member_name_at(&self, offset: usize) -> bool {
        matches!(
            self.peek_token_at(offset),
            Some(Token::Ident(_))
                | Some(Token::String(_))
                | Some(Token::Number(_))
                | Some(Token::LBracket)
        )
    }

    /// `<T>(a: A): R` as written in interfaces and object types
    fn parse_method_signature(&mut self) -> ParseResult<SignatureExpr> {
        let type_params = self.parse_type_params_opt()?;
        let params = self.parse_params()?;
        let return_type = if self.match_token(Token::Colon) {
            Some(self.parse_return_type()?)
        } else {
            None
        };

        Ok(SignatureExpr {
            type_params,
            params,
            return_type,
        })
    }

    /// `<T>(a: A) => R`
    fn parse_function_type_signature(&mut self) -> ParseResult<SignatureExpr> {
        let type_params = self.parse_type_params_opt()?;
        let params = self.parse_params()?;
        self.expect(Token::Arrow)?;
        let return_type = self.parse_return_type()?;

        Ok(SignatureExpr {
            type_params,
            params,
            return_type: Some(return_type),
        })
    }

    /// Return type position, where type predicates are allowed
    fn parse_return_type(&mut self) -> ParseResult<TypeExpr> {
        let start = self.peek_span().start;

        if self.check_ident("asserts")
            && matches!(self.peek_token_at(1), Some(Token::Ident(_)))
            && !self.newline_before(self.pos + 1)
        {
            self.advance();
            self.advance();
            if self.match_ident("is") {
                self.parse_type()?;
            }
            return Ok(TypeExpr::Keyword {
                keyword: TypeKeyword::Void,
                span: Span::new(start, self.prev_end()),
            });
        }

        if matches!(self.peek_token(), Some(Token::Ident(_)))
            && matches!(self.peek_token_at(1), Some(Token::Ident("is")))
        {
            self.advance();
            self.advance();
            self.parse_type()?;
            return Ok(TypeExpr::Keyword {
                keyword: TypeKeyword::Boolean,
                span: Span::new(start, self.prev_end()),
            });
        }

        self.parse_type()
    }

    fn parse_type_params_opt(&mut self) -> ParseResult<Vec<TypeParam>> {
        let mut params = Vec::new();
        if !self.match_token(Token::LAngle) {
            return Ok(params);
        }

        while !self.check(Token::RAngle) {
            while matches!(self.peek_token(), Some(Token::Ident("const" | "in" | "out")))
                && matches!(self.peek_token_at(1), Some(Token::Ident(_)))
            {
                self.advance();
            }

            let name = self.expect_ident()?;
            let constraint = if self.match_ident("extends") {
                Some(self.parse_type()?)
            } else {
                None
            };
            let default = if self.match_token(Token::Equals) {
                Some(self.parse_type()?)
            } else {
                None
            };
            params.push(TypeParam {
                name,
                constraint,
                default,
            });

            if !self.match_token(Token::Comma) {
                break;
            }
        }
        self.expect(Token::RAngle)?;

        Ok(params)
    }

    fn parse_type_args(&mut self) -> ParseResult<Vec<TypeExpr>> {
        self.expect(Token::LAngle)?;

        let mut args = Vec::new();
        while !self.check(Token::RAngle) {
            args.push(self.parse_type()?);
            if !self.match_token(Token::Comma) {
                break;
            }
        }
        self.expect(Token::RAngle)?;

        Ok(args)
    }

    fn parse_params(&mut self) -> ParseResult<Vec<Param>> {
        self.expect(Token::LParen)?;

        let mut params = Vec::new();
        while !self.check(Token::RParen) {
            params.push(self.parse_param()?);
            if !self.match_token(Token::Comma) {
                break;
            }
        }
        self.expect(Token::RParen)?;

        Ok(params)
    }

    fn parse_param(&mut self) -> ParseResult<Param> {
        let start = self.peek_span().start;

        while self.check(Token::At) {
            self.skip_decorator()?;
        }

        while matches!(self.peek_token(), Some(Token::Ident(word)) if PARAMETER_MODIFIERS.contains(&word))
            && matches!(
                self.peek_token_at(1),
                Some(Token::Ident(_)) | Some(Token::LBrace) | Some(Token::LBracket)
            )
        {
            self.advance();
        }

        let rest = self.match_token(Token::Ellipsis);
        let pattern = self.parse_binding_pattern()?;
        let optional = self.match_token(Token::Question);
        let type_ = if self.match_token(Token::Colon) {
            Some(self.parse_type()?)
        } else {
            None
        };
        let default = if self.match_token(Token::Equals) {
            Some(self.parse_expression()?)
        } else {
            None
        };

        Ok(Param {
            pattern,
            optional,
            rest,
            type_,
            default,
            span: Span::new(start, self.prev_end()),
        })
    }

    fn parse_binding_pattern(&mut self) -> ParseResult<Pattern> {
        let start = self.peek_span().start;

        match self.peek_token() {
            Some(Token::Ident(name)) => {
                self.advance();
                Ok(Pattern::Ident {
                    name: name.to_string(),
                    span: Span::new(start, self.prev_end()),
                })
            }
            Some(Token::LBrace) => {
                self.advance();
                let mut properties = Vec::new();
                let mut rest = None;

                while !self.check(Token::RBrace) {
                    let property_start = self.peek_span().start;
                    if self.match_token(Token::Ellipsis) {
                        rest = Some(self.expect_ident()?);
                    } else {
                        let key = self.parse_property_key()?;
                        let value = if self.match_token(Token::Colon) {
                            self.parse_binding_pattern()?
                        } else {
                            Pattern::Ident {
                                name: key.name().to_string(),
                                span: Span::new(property_start, self.prev_end()),
                            }
                        };
                        let default = if self.match_token(Token::Equals) {
                            Some(self.parse_expression()?)
                        } else {
                            None
                        };
                        properties.push(PatternProperty {
                            key: key.name().to_string(),
                            value,
                            default,
                            span: Span::new(property_start, self.prev_end()),
                        });
                    }

                    if !self.match_token(Token::Comma) {
                        break;
                    }
                }
                self.expect(Token::RBrace)?;

                Ok(Pattern::Object {
                    properties,
                    rest,
                    span: Span::new(start, self.prev_end()),
                })
            }
            Some(Token::LBracket) => {
                self.advance();
                let mut elements = Vec::new();

                while !self.check(Token::RBracket) {
                    if self.match_token(Token::Comma) {
                        elements.push(None);
                        continue;
                    }
                    self.match_token(Token::Ellipsis);
                    elements.push(Some(self.parse_binding_pattern()?));
                    if self.match_token(Token::Equals) {
                        self.parse_expression()?;
                    }
                    if !self.match_token(Token::Comma) {
                        break;
                    }
                }
                self.expect(Token::RBracket)?;

                Ok(Pattern::Array {
                    elements,
                    span: Span::new(start, self.prev_end()),
                })
            }
            _ => Err(self.error_here("binding pattern")),
        }
    }

    fn opaque_type(&self, start: usize) -> TypeExpr {
        let end = self.prev_end();
        TypeExpr::Opaque {
            text: self.text(start, end),
            span: Span::new(start, end),
        }
    }

    // ---------------------------------------------------------------------
    // Expressions
    // ---------------------------------------------------------------------

    /// Parse an assignment-level expression (no comma operator)
    pub fn parse_expression(&mut self) -> ParseResult<Expr> {
        let start = self.peek_span().start;

        if let Some(function) = self.try_parse_arrow()? {
            return Ok(Expr::Function(Box::new(function)));
        }

        let mut expr = self.parse_unary()?;

        while (self.check_ident("as") || self.check_ident("satisfies"))
            && !self.newline_before(self.pos)
        {
            self.advance();
            let type_ = self.parse_type()?;
            expr = Expr::TypeAssertion {
                expr: Box::new(expr),
                type_,
                span: Span::new(start, self.prev_end()),
            };
        }

        if self.at_binary_operator() {
            return self.finish_opaque_expr(start);
        }

        Ok(expr)
    }

    fn at_binary_operator(&self) -> bool {
        match self.peek_token() {
            Some(
                Token::Plus
                | Token::Minus
                | Token::Star
                | Token::Slash
                | Token::Percent
                | Token::Pipe
                | Token::Ampersand
                | Token::Caret
                | Token::LAngle
                | Token::RAngle
                | Token::Equals
                | Token::Question,
            ) => true,
            Some(Token::Bang) => matches!(self.peek_token_at(1), Some(Token::Equals)),
            Some(Token::Ident("instanceof" | "in")) => true,
            _ => false,
        }
    }

    /// Consume the rest of an expression the parser does not model
    fn finish_opaque_expr(&mut self, start: usize) -> ParseResult<Expr> {
        let mut depth = 0usize;

        while let Some(token) = self.peek_token() {
            match token {
                Token::LBrace | Token::LParen | Token::LBracket => depth += 1,
                Token::RBrace | Token::RParen | Token::RBracket => {
                    if depth == 0 {
                        break;
                    }
                    depth -= 1;
                }
                Token::Comma | Token::Semicolon if depth == 0 => break,
                _ => {}
            }
            self.advance();
            if depth == 0 && self.at_statement_boundary() {
                break;
            }
        }

        if depth > 0 {
            return Err(self.error_here("closing bracket"));
        }

        Ok(self.opaque_expr(start))
    }

    fn try_parse_arrow(&mut self) -> ParseResult<Option<Function>> {
        let start = self.peek_span().start;
        let saved = self.pos;

        let is_async = self.check_ident("async")
            && !self.newline_before(self.pos + 1)
            && matches!(
                self.peek_token_at(1),
                Some(Token::Ident(_)) | Some(Token::LParen) | Some(Token::LAngle)
            );
        if is_async {
            self.advance();
        }

        let head = match self.peek_token() {
            Some(Token::Ident(name)) if matches!(self.peek_token_at(1), Some(Token::Arrow)) => {
                let span = self.peek_span();
                self.advance();
                self.advance();
                Some((
                    Vec::new(),
                    vec![Param {
                        pattern: Pattern::Ident {
                            name: name.to_string(),
                            span,
                        },
                        optional: false,
                        rest: false,
                        type_: None,
                        default: None,
                        span,
                    }],
                    None,
                ))
            }
            Some(Token::LParen) | Some(Token::LAngle) => self.try_parse(|p| {
                let type_params = p.parse_type_params_opt()?;
                let params = p.parse_params()?;
                let return_type = if p.match_token(Token::Colon) {
                    Some(p.parse_return_type()?)
                } else {
                    None
                };
                p.expect(Token::Arrow)?;
                Ok((type_params, params, return_type))
            }),
            _ => None,
        };

        let Some((type_params, params, return_type)) = head else {
            self.pos = saved;
            return Ok(None);
        };

        let body = if self.check(Token::LBrace) {
            FunctionBody::Block(self.parse_block_body()?)
        } else {
            FunctionBody::Expr(self.parse_expression()?)
        };

        Ok(Some(Function {
            is_arrow: true,
            is_async,
            type_params,
            params,
            return_type,
            body: Some(body),
            span: Span::new(start, self.prev_end()),
        }))
    }

    fn parse_unary(&mut self) -> ParseResult<Expr> {
        let start = self.peek_span().start;

        match self.peek_token() {
            Some(Token::Minus) | Some(Token::Plus) => {
                let op = if self.check(Token::Minus) {
                    UnaryOp::Minus
                } else {
                    UnaryOp::Plus
                };
                self.advance();
                let operand = self.parse_unary()?;
                Ok(Expr::Unary {
                    op,
                    operand: Box::new(operand),
                    span: Span::new(start, self.prev_end()),
                })
            }
            Some(Token::Bang) | Some(Token::Tilde) => {
                self.advance();
                self.parse_unary()?;
                Ok(self.opaque_expr(start))
            }
            Some(Token::Ident("typeof" | "void" | "await" | "delete"))
                if !matches!(
                    self.peek_token_at(1),
                    None | Some(Token::Comma)
                        | Some(Token::Semicolon)
                        | Some(Token::RParen)
                        | Some(Token::RBracket)
                        | Some(Token::RBrace)
                        | Some(Token::Colon)
                ) =>
            {
                self.advance();
                self.parse_unary()?;
                Ok(self.opaque_expr(start))
            }
            _ => self.parse_postfix_expr(),
        }
    }

    fn parse_postfix_expr(&mut self) -> ParseResult<Expr> {
        let start = self.peek_span().start;
        let mut expr = self.parse_primary_expr()?;

        loop {
            match self.peek_token() {
                Some(Token::Dot) => {
                    self.advance();
                    let property = self.expect_property_access_name()?;
                    expr = Expr::Member {
                        object: Box::new(expr),
                        property,
                        span: Span::new(start, self.prev_end()),
                    };
                }
                Some(Token::Question) if self.is_optional_chain() => {
                    self.advance();
                    self.advance();
                    if matches!(self.peek_token(), Some(Token::Ident(_))) {
                        let property = self.expect_ident()?;
                        expr = Expr::Member {
                            object: Box::new(expr),
                            property,
                            span: Span::new(start, self.prev_end()),
                        };
                    }
                }
                Some(Token::LParen) if !self.newline_before(self.pos) => {
                    let args = self.parse_arguments()?;
                    expr = Expr::Call {
                        callee: Box::new(expr),
                        type_args: Vec::new(),
                        args,
                        span: Span::new(start, self.prev_end()),
                    };
                }
                Some(Token::LBracket) if !self.newline_before(self.pos) => {
                    self.advance();
                    self.parse_expression()?;
                    self.expect(Token::RBracket)?;
                    expr = self.opaque_expr(start);
                }
                Some(Token::LAngle) => {
                    let type_args = self.try_parse(|p| {
                        let args = p.parse_type_args()?;
                        if p.check(Token::LParen) {
                            Ok(args)
                        } else {
                            Err(p.error_here("'('"))
                        }
                    });
                    let Some(type_args) = type_args else {
                        break;
                    };
                    let args = self.parse_arguments()?;
                    expr = Expr::Call {
                        callee: Box::new(expr),
                        type_args,
                        args,
                        span: Span::new(start, self.prev_end()),
                    };
                }
                // Non-null assertion
                Some(Token::Bang)
                    if !self.newline_before(self.pos)
                        && !matches!(self.peek_token_at(1), Some(Token::Equals)) =>
                {
                    self.advance();
                }
                // Tagged template
                Some(Token::Template(_)) if !self.newline_before(self.pos) => {
                    self.advance();
                    expr = self.opaque_expr(start);
                }
                _ => break,
            }
        }

        Ok(expr)
    }

    fn is_optional_chain(&self) -> bool {
        match (self.tokens.get(self.pos), self.tokens.get(self.pos + 1)) {
            (Some((Token::Question, question)), Some((Token::Dot, dot))) => question.end == dot.start,
            _ => false,
        }
    }

    fn parse_arguments(&mut self) -> ParseResult<Vec<Expr>> {
        self.expect(Token::LParen)?;

        let mut args = Vec::new();
        while !self.check(Token::RParen) {
            let start = self.peek_span().start;
            if self.match_token(Token::Ellipsis) {
                let argument = self.parse_expression()?;
                args.push(Expr::Spread {
                    argument: Box::new(argument),
                    span: Span::new(start, self.prev_end()),
                });
            } else {
                args.push(self.parse_expression()?);
            }

            if !self.match_token(Token::Comma) {
                break;
            }
        }
        self.expect(Token::RParen)?;

        Ok(args)
    }

    fn parse_primary_expr(&mut self) -> ParseResult<Expr> {
        let start = self.peek_span().start;
        let Some(token) = self.peek_token() else {
            return Err(self.error_here("expression"));
        };

        match token {
            Token::String(raw) => {
                self.advance();
                Ok(Expr::String {
                    raw: strip_quotes(raw).to_string(),
                    span: Span::new(start, self.prev_end()),
                })
            }
            Token::Number(raw) => {
                self.advance();
                Ok(Expr::Number {
                    raw: raw.to_string(),
                    span: Span::new(start, self.prev_end()),
                })
            }
            Token::Template(raw) => {
                self.advance();
                Ok(Expr::Template {
                    raw: strip_quotes(raw).to_string(),
                    span: Span::new(start, self.prev_end()),
                })
            }
            Token::LBracket => self.parse_array_literal(),
            Token::LBrace => Ok(Expr::Object(self.parse_object_literal()?)),
            Token::LParen => {
                self.advance();
                let inner = self.parse_expression()?;
                if self.check(Token::Comma) {
                    while self.match_token(Token::Comma) {
                        self.parse_expression()?;
                    }
                    self.expect(Token::RParen)?;
                    return Ok(self.opaque_expr(start));
                }
                self.expect(Token::RParen)?;
                Ok(inner)
            }
            Token::Ident("true") | Token::Ident("false") => {
                self.advance();
                Ok(Expr::Boolean {
                    value: token.is_ident("true"),
                    span: Span::new(start, self.prev_end()),
                })
            }
            Token::Ident("null") => {
                self.advance();
                Ok(Expr::Null {
                    span: Span::new(start, self.prev_end()),
                })
            }
            Token::Ident("function") => {
                self.advance();
                self.match_token(Token::Star);
                if matches!(self.peek_token(), Some(Token::Ident(_))) {
                    self.advance();
                }
                let function = self.parse_function_rest(start, false)?;
                Ok(Expr::Function(Box::new(function)))
            }
            Token::Ident("async")
                if matches!(self.peek_token_at(1), Some(Token::Ident("function"))) =>
            {
                self.advance();
                self.advance();
                self.match_token(Token::Star);
                if matches!(self.peek_token(), Some(Token::Ident(_))) {
                    self.advance();
                }
                let function = self.parse_function_rest(start, true)?;
                Ok(Expr::Function(Box::new(function)))
            }
            Token::Ident("class") => {
                let meta = DeclMeta {
                    span: Span::new(start, start),
                    ..DeclMeta::default()
                };
                self.parse_class(meta)?;
                Ok(self.opaque_expr(start))
            }
            Token::Ident("new") => {
                self.advance();
                if self.match_token(Token::Dot) {
                    self.expect_ident()?;
                    return Ok(self.opaque_expr(start));
                }
                self.parse_primary_expr()?;
                while self.match_token(Token::Dot) {
                    self.expect_property_access_name()?;
                }
                if self.check(Token::LAngle) {
                    self.try_parse(|p| p.parse_type_args());
                }
                if self.check(Token::LParen) {
                    self.parse_arguments()?;
                }
                Ok(self.opaque_expr(start))
            }
            Token::Ident(name) => {
                self.advance();
                Ok(Expr::Ident {
                    name: name.to_string(),
                    span: Span::new(start, self.prev_end()),
                })
            }
            // Regular expression literal
            Token::Slash => {
                self.advance();
                while let Some(token) = self.peek_token() {
                    if self.newline_before(self.pos) {
                        break;
                    }
                    self.advance();
                    if token == Token::Slash {
                        break;
                    }
                }
                if let (Some(Token::Ident(_)), Some((_, flags))) =
                    (self.peek_token(), self.tokens.get(self.pos))
                {
                    if flags.start == self.prev_end() {
                        self.advance();
                    }
                }
                Ok(self.opaque_expr(start))
            }
            Token::RParen
            | Token::RBracket
            | Token::RBrace
            | Token::Comma
            | Token::Semicolon
            | Token::Colon
            | Token::Arrow => Err(self.error_here("expression")),
            _ => {
                self.advance();
                self.finish_opaque_expr(start)
            }
        }
    }

    fn parse_array_literal(&mut self) -> ParseResult<Expr> {
        let start = self.peek_span().start;
        self.expect(Token::LBracket)?;
        let multiline = !self.check(Token::RBracket) && self.newline_before(self.pos);

        let mut elements = Vec::new();
        while !self.check(Token::RBracket) {
            if self.match_token(Token::Comma) {
                continue;
            }
            let element_start = self.peek_span().start;
            if self.match_token(Token::Ellipsis) {
                let argument = self.parse_expression()?;
                elements.push(Expr::Spread {
                    argument: Box::new(argument),
                    span: Span::new(element_start, self.prev_end()),
                });
            } else {
                elements.push(self.parse_expression()?);
            }

            if !self.match_token(Token::Comma) {
                break;
            }
        }
        self.expect(Token::RBracket)?;

        Ok(Expr::Array {
            elements,
            multiline,
            span: Span::new(start, self.prev_end()),
        })
    }

    fn parse_object_literal(&mut self) -> ParseResult<ObjectLit> {
        let start = self.peek_span().start;
        self.expect(Token::LBrace)?;
        let multiline = !self.check(Token::RBrace) && self.newline_before(self.pos);

        let mut properties = Vec::new();
        while !self.check(Token::RBrace) {
            if self.is_at_end() {
                return Err(self.error_here("'}'"));
            }
            properties.push(self.parse_object_property()?);
            if !self.match_token(Token::Comma) {
                break;
            }
        }
        self.expect(Token::RBrace)?;

        Ok(ObjectLit {
            properties,
            multiline,
            span: Span::new(start, self.prev_end()),
        })
    }

    fn parse_object_property(&mut self) -> ParseResult<ObjectProperty> {
        let start = self.peek_span().start;
        let doc = self.peek_doc();

        if self.match_token(Token::Ellipsis) {
            let argument = self.parse_expression()?;
            return Ok(ObjectProperty {
                key: PropertyKey::Computed(String::from("...")),
                kind: ObjectPropertyKind::Spread(argument),
                doc,
                span: Span::new(start, self.prev_end()),
            });
        }

        if (self.check_ident("get") || self.check_ident("set")) && self.starts_member_name_at(1) {
            self.advance();
            let key = self.parse_property_key()?;
            let method_start = self.peek_span().start;
            self.parse_function_rest(method_start, false)?;
            return Ok(ObjectProperty {
                key,
                kind: ObjectPropertyKind::Accessor,
                doc,
                span: Span::new(start, self.prev_end()),
            });
        }

        let is_async = self.check_ident("async")
            && !self.newline_before(self.pos + 1)
            && (self.starts_member_name_at(1) || matches!(self.peek_token_at(1), Some(Token::Star)));
        if is_async {
            self.advance();
        }
        let generator = self.match_token(Token::Star);

        let key = self.parse_property_key()?;

        let kind = match self.peek_token() {
            Some(Token::Colon) if !is_async && !generator => {
                self.advance();
                ObjectPropertyKind::Init(self.parse_expression()?)
            }
            Some(Token::LParen) | Some(Token::LAngle) => {
                let method_start = self.peek_span().start;
                ObjectPropertyKind::Method(self.parse_function_rest(method_start, is_async)?)
            }
            Some(Token::Equals) => {
                self.advance();
                self.parse_expression()?;
                ObjectPropertyKind::Shorthand
            }
            _ => ObjectPropertyKind::Shorthand,
        };

        Ok(ObjectProperty {
            key,
            kind,
            doc,
            span: Span::new(start, self.prev_end()),
        })
    }

    fn parse_property_key(&mut self) -> ParseResult<PropertyKey> {
        let start = self.peek_span().start;
        match self.peek_token() {
            Some(Token::Ident(name)) => {
                self.advance();
                Ok(PropertyKey::Ident(name.to_string()))
            }
            Some(Token::String(raw)) => {
                self.advance();
                Ok(PropertyKey::String(unescape_string(raw)))
            }
            Some(Token::Number(raw)) => {
                self.advance();
                Ok(PropertyKey::Number(raw.to_string()))
            }
            Some(Token::LBracket) => {
                self.advance();
                self.parse_expression()?;
                self.expect(Token::RBracket)?;
                Ok(PropertyKey::Computed(self.text(start, self.prev_end())))
            }
            _ => Err(self.error_here("property name")),
        }
    }

    /// Property names of interfaces, classes and enums
    fn parse_property_name(&mut self) -> ParseResult<String> {
        Ok(self.parse_property_key()?.name().to_string())
    }

    /// Statements of a function body; only `return` is modeled
    fn parse_block_body(&mut self) -> ParseResult<Vec<Statement>> {
        self.expect(Token::LBrace)?;

        let mut statements = Vec::new();
        loop {
            match self.peek_token() {
                None => return Err(self.error_here("'}'")),
                Some(Token::RBrace) => {
                    self.advance();
                    break;
                }
                Some(Token::Semicolon) => {
                    self.advance();
                }
                Some(Token::Ident("return")) => {
                    let start = self.peek_span().start;
                    self.advance();
                    let value = if self.at_statement_end() {
                        None
                    } else {
                        Some(self.parse_expression()?)
                    };
                    self.match_token(Token::Semicolon);
                    statements.push(Statement::Return {
                        value,
                        span: Span::new(start, self.prev_end()),
                    });
                }
                Some(_) => {
                    let span = self.skip_statement()?;
                    statements.push(Statement::Other { span });
                }
            }
        }

        Ok(statements)
    }

    fn opaque_expr(&self, start: usize) -> Expr {
        let end = self.prev_end();
        Expr::Opaque {
            text: self.text(start, end),
            span: Span::new(start, end),
        }
    }

    // ---------------------------------------------------------------------
    // Recovery
    // ---------------------------------------------------------------------

    /// Skip one statement as a balanced token run
    fn skip_statement(&mut self) -> ParseResult<Span> {
        let start = self.peek_span().start;
        let first = self.pos;
        let mut depth = 0usize;

        while let Some(token) = self.peek_token() {
            match token {
                Token::LBrace | Token::LParen | Token::LBracket => depth += 1,
                Token::RBrace | Token::RParen | Token::RBracket => {
                    if depth == 0 {
                        break;
                    }
                    depth -= 1;
                }
                Token::Semicolon if depth == 0 => {
                    self.advance();
                    break;
                }
                _ => {}
            }
            self.advance();
            if depth == 0 && self.at_statement_boundary() {
                break;
            }
        }

        if depth > 0 {
            return Err(self.error_here("closing bracket"));
        }
        if self.pos == first {
            return Err(self.error_here("statement"));
        }

        Ok(Span::new(start, self.prev_end()))
    }

    /// Skip a bracketed group starting at the current opener
    fn skip_balanced(&mut self) -> ParseResult<()> {
        let mut depth = 0usize;

        loop {
            match self.advance() {
                None => return Err(self.error_here("closing bracket")),
                Some(Token::LBrace | Token::LParen | Token::LBracket) => depth += 1,
                Some(Token::RBrace | Token::RParen | Token::RBracket) => {
                    depth = depth.saturating_sub(1);
                    if depth == 0 {
                        return Ok(());
                    }
                }
                Some(_) if depth == 0 => {
                    return Err(ParseError::invalid_syntax(
                        Span::new(self.current_pos(), self.prev_end()),
                        "expected an opening bracket",
                    ))
                }
                Some(_) => {}
            }
        }
    }

    /// Run a speculative parse, rewinding on failure
    fn try_parse<T>(&mut self, f: impl FnOnce(&mut Self) -> ParseResult<T>) -> Option<T> {
        let saved = self.pos;
        match f(self) {
            Ok(value) => Some(value),
            Err(_) => {
                self.pos = saved;
                None
            }
        }
    }

    // ---------------------------------------------------------------------
    // Token helpers
    // ---------------------------------------------------------------------

    fn peek(&self) -> Option<&(Token<'src>, Range<usize>)> {
        self.tokens.get(self.pos)
    }

    fn peek_token(&self) -> Option<Token<'src>> {
        self.peek().map(|(token, _)| *token)
    }

    fn peek_token_at(&self, offset: usize) -> Option<Token<'src>> {
        self.tokens.get(self.pos + offset).map(|(token, _)| *token)
    }

    fn peek_doc(&self) -> Option<DocComment> {
        self.docs.get(self.pos).cloned().flatten()
    }

    fn advance(&mut self) -> Option<Token<'src>> {
        let token = self.peek_token();
        if token.is_some() {
            self.pos += 1;
        }
        token
    }

    fn is_at_end(&self) -> bool {
        self.pos >= self.tokens.len()
    }

    fn check(&self, token: Token) -> bool {
        if let Some((t, _)) = self.peek() {
            std::mem::discriminant(t) == std::mem::discriminant(&token)
        } else {
            false
        }
    }

    fn check_ident(&self, keyword: &str) -> bool {
        self.peek().map(|(t, _)| t.is_ident(keyword)).unwrap_or(false)
    }

    fn match_token(&mut self, token: Token) -> bool {
        if self.check(token) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn match_ident(&mut self, keyword: &str) -> bool {
        if self.check_ident(keyword) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn expect(&mut self, token: Token) -> ParseResult<()> {
        if self.check(token) {
            self.advance();
            Ok(())
        } else {
            Err(self.error_here(format!("'{}'", token)))
        }
    }

    fn expect_keyword(&mut self, keyword: &str) -> ParseResult<()> {
        if self.match_ident(keyword) {
            Ok(())
        } else {
            Err(self.error_here(format!("'{}'", keyword)))
        }
    }

    fn expect_ident(&mut self) -> ParseResult<String> {
        match self.peek_token() {
            Some(Token::Ident(name)) => {
                self.advance();
                Ok(name.to_string())
            }
            _ => Err(self.error_here("identifier")),
        }
    }

    /// Property name after `.`, including private `#names`
    fn expect_property_access_name(&mut self) -> ParseResult<String> {
        if self.match_token(Token::Hash) {
            return Ok(format!("#{}", self.expect_ident()?));
        }
        self.expect_ident()
    }

    /// Identifier or string in import/export specifier lists
    fn expect_module_export_name(&mut self) -> ParseResult<String> {
        match self.peek_token() {
            Some(Token::String(raw)) => {
                self.advance();
                Ok(unescape_string(raw))
            }
            _ => self.expect_ident(),
        }
    }

    fn expect_string(&mut self) -> ParseResult<String> {
        match self.peek_token() {
            Some(Token::String(raw)) => {
                self.advance();
                Ok(unescape_string(raw))
            }
            _ => Err(self.error_here("string")),
        }
    }

    fn current_pos(&self) -> usize {
        self.tokens
            .get(self.pos.saturating_sub(1))
            .map(|(_, span)| span.start)
            .unwrap_or(0)
    }

    /// End of the most recently consumed token
    fn prev_end(&self) -> usize {
        self.pos
            .checked_sub(1)
            .and_then(|index| self.tokens.get(index))
            .map(|(_, span)| span.end)
            .unwrap_or(0)
    }

    fn peek_span(&self) -> Span {
        match self.tokens.get(self.pos) {
            Some((_, span)) => Span::new(span.start, span.end),
            None => Span::new(self.source.len(), self.source.len()),
        }
    }

    fn newline_before(&self, index: usize) -> bool {
        if index == 0 {
            return true;
        }
        match (self.tokens.get(index - 1), self.tokens.get(index)) {
            (Some((_, prev)), Some((_, next))) => self.source[prev.end..next.start].contains('\n'),
            _ => true,
        }
    }

    /// True when automatic semicolon insertion ends the statement here
    fn at_statement_boundary(&self) -> bool {
        if self.is_at_end() {
            return true;
        }
        if !self.newline_before(self.pos) {
            return false;
        }

        let prev = self
            .pos
            .checked_sub(1)
            .and_then(|index| self.tokens.get(index))
            .map(|(token, _)| *token);
        let next = self.peek_token();

        let prev_continues = matches!(
            prev,
            Some(
                Token::Equals
                    | Token::Comma
                    | Token::Dot
                    | Token::LParen
                    | Token::LBracket
                    | Token::LBrace
                    | Token::Colon
                    | Token::Question
                    | Token::Pipe
                    | Token::Ampersand
                    | Token::Plus
                    | Token::Minus
                    | Token::Star
                    | Token::Slash
                    | Token::Percent
                    | Token::Arrow
                    | Token::LAngle
                    | Token::RAngle
                    | Token::Bang
                    | Token::Caret
                    | Token::Tilde
                    | Token::Ellipsis
                    | Token::At
                    | Token::Ident("else" | "do" | "try" | "finally" | "extends" | "implements" | "new")
            )
        );

        let next_continues = matches!(
            next,
            Some(
                Token::Dot
                    | Token::Question
                    | Token::Pipe
                    | Token::Ampersand
                    | Token::Plus
                    | Token::Star
                    | Token::Slash
                    | Token::Percent
                    | Token::Equals
                    | Token::RAngle
                    | Token::LAngle
                    | Token::Arrow
                    | Token::Colon
                    | Token::Comma
                    | Token::Caret
                    | Token::Ident(
                        "else" | "catch" | "finally" | "as" | "satisfies" | "instanceof" | "in"
                            | "extends" | "implements"
                    )
            )
        ) || (matches!(prev, Some(Token::RParen)) && matches!(next, Some(Token::LBrace)));

        !prev_continues && !next_continues
    }

    fn at_statement_end(&self) -> bool {
        self.is_at_end()
            || self.check(Token::Semicolon)
            || self.check(Token::RBrace)
            || self.newline_before(self.pos)
    }

    /// Source text between two offsets with whitespace runs collapsed
    fn text(&self, start: usize, end: usize) -> String {
        let end = end.max(start).min(self.source.len());
        self.source[start.min(end)..end]
            .split_whitespace()
            .collect::<Vec<_>>()
            .join(" ")
    }

    fn error_here(&self, expected: impl Into<String>) -> ParseError {
        match self.peek() {
            None => ParseError::unexpected_eof(self.source.len(), expected),
            Some((token, span)) => ParseError::unexpected_token(
                Span::new(span.start, span.end),
                expected,
                Self::format_token(token),
            ),
        }
    }

    /// Format a token for display in error messages
    fn format_token(token: &Token) -> String {
        match token {
            Token::Ident(_) | Token::String(_) | Token::Number(_) | Token::Template(_) | Token::Comment(_) => {
                token.to_string()
            }
            other => format!("'{}'", other),
        }
    }
}

fn strip_quotes(raw: &str) -> &str {
    if raw.len() >= 2 {
        &raw[1..raw.len() - 1]
    } else {
        raw
    }
}

/// Decode the escapes of a quoted string literal (quotes included)
pub fn unescape_string(raw: &str) -> String {
    unescape(strip_quotes(raw))
}

/// Decode the escapes of a string literal body
pub fn unescape(inner: &str) -> String {
    let mut out = String::with_capacity(inner.len());
    let mut chars = inner.chars().peekable();

    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }

        match chars.next() {
            Some('n') => out.push('\n'),
            Some('t') => out.push('\t'),
            Some('r') => out.push('\r'),
            Some('b') => out.push('\u{8}'),
            Some('f') => out.push('\u{c}'),
            Some('v') => out.push('\u{b}'),
            Some('0') => out.push('\0'),
            Some('x') => {
                let hex: String = chars.by_ref().take(2).collect();
                if let Some(ch) = u32::from_str_radix(&hex, 16).ok().and_then(char::from_u32) {
                    out.push(ch);
                }
            }
            Some('u') => {
                let hex: String = if chars.next_if_eq(&'{').is_some() {
                    chars.by_ref().take_while(|c| *c != '}').collect()
                } else {
                    chars.by_ref().take(4).collect()
                };
                if let Some(ch) = u32::from_str_radix(&hex, 16).ok().and_then(char::from_u32) {
                    out.push(ch);
                }
            }
            // Line continuation
            Some('\r') => {
                chars.next_if_eq(&'\n');
            }
            Some('\n') => {}
            Some(other) => out.push(other),
            None => out.push('\\'),
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(source: &str) -> Module {
        parse_module(source).unwrap()
    }

    #[test]
    fn test_parse_interface_with_docs() {
        let module = parse(
            r#"
            /** Button props */
            export interface ButtonProps extends BaseProps<string>, Other {
                /** string foo */
                foo: string;
                readonly bar?: number | undefined,
                baz(): void
                [key: string]: unknown
            }
            "#,
        );

        let Item::Interface(decl) = &module.items[0] else {
            panic!("expected interface");
        };
        assert_eq!(decl.name, "ButtonProps");
        assert!(decl.meta.exported);
        assert_eq!(decl.meta.doc.as_ref().unwrap().description, "Button props");
        assert_eq!(decl.extends.len(), 2);
        assert_eq!(decl.members.len(), 4);

        let foo = &decl.members[0];
        assert_eq!(foo.name, "foo");
        assert_eq!(foo.doc.as_ref().unwrap().description, "string foo");

        let bar = &decl.members[1];
        assert!(bar.optional);
        assert!(bar.readonly);
        assert!(matches!(
            bar.kind,
            TypeMemberKind::Property(Some(TypeExpr::Union { .. }))
        ));

        assert!(matches!(decl.members[2].kind, TypeMemberKind::Method(_)));
        assert!(matches!(decl.members[3].kind, TypeMemberKind::Index { .. }));
    }

    #[test]
    fn test_parse_type_alias_shapes() {
        let module = parse(
            r#"
            type Tuple = [label: string, count?: number, ...rest: boolean[]];
            type Fn = (a: string, b?: number) => void;
            type Literal = 'a' | "b" | -1 | true;
            type Keys = keyof Props;
            type Nested = Array<(string | number)[]>;
            "#,
        );

        let alias = |index: usize| match &module.items[index] {
            Item::TypeAlias(decl) => &decl.type_,
            other => panic!("expected alias, got {:?}", other),
        };

        let TypeExpr::Tuple { elements, .. } = alias(0) else {
            panic!("expected tuple");
        };
        assert_eq!(elements.len(), 3);
        assert_eq!(elements[0].label.as_deref(), Some("label"));
        assert!(elements[1].optional);
        assert!(elements[2].rest);

        let TypeExpr::Function { signature, .. } = alias(1) else {
            panic!("expected function type");
        };
        assert_eq!(signature.params.len(), 2);
        assert!(signature.params[1].optional);

        let TypeExpr::Union { members, .. } = alias(2) else {
            panic!("expected union");
        };
        assert_eq!(
            members[2],
            TypeExpr::Literal {
                literal: LiteralTypeExpr::Number("-1".to_string()),
                span: members[2].span(),
            }
        );

        let TypeExpr::KeyOf { operand, .. } = alias(3) else {
            panic!("expected keyof");
        };
        assert!(matches!(operand.as_ref(), TypeExpr::Reference { name, .. } if name == "Props"));

        let TypeExpr::Reference { name, args, .. } = alias(4) else {
            panic!("expected reference");
        };
        assert_eq!(name, "Array");
        assert!(matches!(args[0], TypeExpr::Array { .. }));
    }

    #[test]
    fn test_parse_script_setup_macros() {
        let module = parse(
            r#"
            import { ref } from 'vue'
            import type { Props } from './props'

            const props = withDefaults(defineProps<Props>(), {
                foo: 'bar',
                list: () => ['a', 'b'],
            })
            defineEmits<{ (e: 'change', id: number): void }>()
            const count = ref(0)
            "#,
        );

        assert_eq!(module.items.len(), 5);

        let Item::Import(import) = &module.items[1] else {
            panic!("expected import");
        };
        assert!(import.type_only);
        assert_eq!(import.named[0].imported, "Props");

        let Item::Variable(decl) = &module.items[2] else {
            panic!("expected variable");
        };
        let init = decl.declarators[0].init.as_ref().unwrap();
        assert_eq!(init.callee_name(), Some("withDefaults"));
        let Expr::Call { args, .. } = init else {
            panic!("expected call");
        };
        assert_eq!(args[0].callee_name(), Some("defineProps"));
        let Expr::Object(defaults) = &args[1] else {
            panic!("expected defaults object");
        };
        assert!(defaults.multiline);
        assert!(matches!(
            defaults.get("list").and_then(|p| p.value()),
            Some(Expr::Function(_))
        ));

        let Item::Expression { expr, .. } = &module.items[3] else {
            panic!("expected expression statement");
        };
        let Expr::Call { type_args, .. } = expr else {
            panic!("expected call");
        };
        assert!(matches!(type_args[0], TypeExpr::Object { .. }));
    }

    #[test]
    fn test_parse_export_default_options() {
        let module = parse(
            r#"
            export default defineComponent({
                props: {
                    /** the size */
                    size: { type: String as PropType<'small' | 'large'>, required: true },
                    count: [Number, String],
                },
                setup(props) {
                    const doubled = computed(() => props.count * 2)
                    return { doubled }
                },
            })
            "#,
        );

        let Item::ExportDefault(ExportDefault::Expr { expr, .. }) = &module.items[0] else {
            panic!("expected export default");
        };
        let Expr::Call { args, .. } = expr else {
            panic!("expected call");
        };
        let Expr::Object(options) = &args[0] else {
            panic!("expected options object");
        };
        let Some(Expr::Object(props)) = options.get("props").and_then(|p| p.value()) else {
            panic!("expected props object");
        };
        let size = props.get("size").unwrap();
        assert_eq!(size.doc.as_ref().unwrap().description, "the size");
        let Some(Expr::Object(size_options)) = size.value() else {
            panic!("expected prop options");
        };
        assert!(matches!(
            size_options.get("type").and_then(|p| p.value()),
            Some(Expr::TypeAssertion { .. })
        ));

        let setup = options.get("setup").unwrap();
        let ObjectPropertyKind::Method(function) = &setup.kind else {
            panic!("expected method");
        };
        let Some(FunctionBody::Block(statements)) = &function.body else {
            panic!("expected block body");
        };
        assert!(matches!(statements.last(), Some(Statement::Return { value: Some(_), .. })));
    }

    #[test]
    fn test_parse_class_component() {
        let module = parse(
            r#"
            @Component
            export default class Foo extends Vue {
                /** the message */
                @Prop() readonly msg!: string
                private count = 0
                static helper() {}
                get double() { return this.count * 2 }
                constructor() { super() }
            }
            "#,
        );

        let Item::ExportDefault(ExportDefault::Class(class)) = &module.items[0] else {
            panic!("expected class export");
        };
        assert_eq!(class.name.as_deref(), Some("Foo"));
        assert!(class.extends.is_some());
        assert_eq!(class.members.len(), 5);
        assert_eq!(class.members[0].name, "msg");
        assert!(class.members[0].readonly);
        assert_eq!(class.members[0].doc.as_ref().unwrap().description, "the message");
        assert_eq!(class.members[1].visibility, Visibility::Private);
        assert!(class.members[2].is_static);
        assert_eq!(class.members[3].kind, ClassMemberKind::Accessor);
        assert_eq!(class.members[4].kind, ClassMemberKind::Constructor);
    }

    #[test]
    fn test_parse_exports_and_reexports() {
        let module = parse(
            r#"
            export { default as Button, type ButtonProps } from './Button.vue'
            export * from './types'
            export * as utils from './utils'
            const local = 1
            export { local as renamed }
            export declare const Ambient: DefineComponent<{}>;
            "#,
        );

        let Item::Export(first) = &module.items[0] else {
            panic!("expected export");
        };
        assert_eq!(first.specifiers[0].local, "default");
        assert_eq!(first.specifiers[0].exported, "Button");
        assert_eq!(first.source.as_deref(), Some("./Button.vue"));

        assert!(matches!(&module.items[1], Item::Export(decl) if decl.star));
        assert!(matches!(&module.items[2], Item::Export(decl) if !decl.star));
        assert!(matches!(&module.items[4], Item::Export(decl) if decl.source.is_none()));

        let Item::Variable(ambient) = &module.items[5] else {
            panic!("expected variable");
        };
        assert!(ambient.meta.declare);
        assert!(ambient.meta.exported);
    }

    #[test]
    fn test_skips_unmodeled_statements() {
        let module = parse(
            r#"
            if (window.foo) {
                console.log('a')
            } else {
                console.log('b')
            }
            for (let i = 0; i < 10; i++) {}
            const value = a ? { b: 1 } : [2]
            export enum Color { Red = 'red', Green = 'green' }
            "#,
        );

        assert!(matches!(module.items[0], Item::Other { .. }));
        assert!(matches!(module.items[1], Item::Other { .. }));
        let Item::Variable(decl) = &module.items[2] else {
            panic!("expected variable");
        };
        assert!(matches!(decl.declarators[0].init, Some(Expr::Opaque { .. })));
        let Item::Enum(decl) = &module.items[3] else {
            panic!("expected enum");
        };
        assert_eq!(decl.members.len(), 2);
    }

    #[test]
    fn test_unterminated_interface_is_an_error() {
        let result = parse_module("export interface Props {\n  foo: string\n");
        assert!(matches!(result, Err(ParseError::UnexpectedEof { .. })));
    }

    #[test]
    fn test_unescape_string() {
        assert_eq!(unescape_string(r#""a\"b""#), "a\"b");
        assert_eq!(unescape_string(r"'A\x42'"), "AB");
        assert_eq!(unescape_string(r"'\u{1F600}'"), "\u{1F600}");
    }
}
