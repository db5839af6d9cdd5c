use crate::ast::Span;
use crate::error::{ParseError, ParseResult};
use logos::{Lexer, Logos};
use std::fmt;

/// Token types for component script sources.
///
/// Keywords of the script dialect are contextual (`type`, `default` and
/// friends are valid property names), so they lex as identifiers and the
/// parser matches on their text.
#[derive(Logos, Debug, Clone, Copy, PartialEq)]
#[logos(skip r"[ \t\n\r\f]+")]
#[logos(skip r"//[^\n]*")]
pub enum Token<'src> {
    // Block comments are kept so the parser can attach doc comments
    #[token("/*", block_comment)]
    Comment(&'src str),

    #[regex(r"[a-zA-Z_$][a-zA-Z0-9_$]*", |lex| lex.slice())]
    Ident(&'src str),

    // String literals (raw slice, quotes included)
    #[regex(r#""([^"\\\n]|\\.)*""#, |lex| lex.slice())]
    #[regex(r"'([^'\\\n]|\\.)*'", |lex| lex.slice())]
    String(&'src str),

    #[regex(r"`([^`\\]|\\.)*`", |lex| lex.slice())]
    Template(&'src str),

    #[regex(r"[0-9][0-9_]*(\.[0-9_]+)?([eE][+-]?[0-9]+)?n?", |lex| lex.slice())]
    #[regex(r"0[xX][0-9a-fA-F_]+", |lex| lex.slice())]
    Number(&'src str),

    // Symbols
    #[token("=>")]
    Arrow,

    #[token("...")]
    Ellipsis,

    #[token("{")]
    LBrace,

    #[token("}")]
    RBrace,

    #[token("(")]
    LParen,

    #[token(")")]
    RParen,

    #[token("[")]
    LBracket,

    #[token("]")]
    RBracket,

    #[token("<")]
    LAngle,

    #[token(">")]
    RAngle,

    #[token(":")]
    Colon,

    #[token(";")]
    Semicolon,

    #[token(",")]
    Comma,

    #[token(".")]
    Dot,

    #[token("?")]
    Question,

    #[token("=")]
    Equals,

    #[token("|")]
    Pipe,

    #[token("&")]
    Ampersand,

    #[token("!")]
    Bang,

    #[token("+")]
    Plus,

    #[token("-")]
    Minus,

    #[token("*")]
    Star,

    #[token("/")]
    Slash,

    #[token("%")]
    Percent,

    #[token("@")]
    At,

    #[token("#")]
    Hash,

    #[token("~")]
    Tilde,

    #[token("^")]
    Caret,
}

impl<'src> Token<'src> {
    /// True for `/** ... */` comments (but not the empty `/**/`)
    pub fn is_doc_comment(&self) -> bool {
        matches!(self, Token::Comment(text) if text.starts_with("/**") && text.len() > 4)
    }

    pub fn is_ident(&self, keyword: &str) -> bool {
        matches!(self, Token::Ident(text) if *text == keyword)
    }
}

impl<'src> fmt::Display for Token<'src> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::Comment(_) => write!(f, "comment"),
            Token::Ident(s) => write!(f, "identifier '{}'", s),
            Token::String(s) => write!(f, "string {}", s),
            Token::Template(_) => write!(f, "template literal"),
            Token::Number(n) => write!(f, "number {}", n),
            Token::Arrow => write!(f, "=>"),
            Token::Ellipsis => write!(f, "..."),
            Token::LBrace => write!(f, "{{"),
            Token::RBrace => write!(f, "}}"),
            Token::LParen => write!(f, "("),
            Token::RParen => write!(f, ")"),
            Token::LBracket => write!(f, "["),
            Token::RBracket => write!(f, "]"),
            Token::LAngle => write!(f, "<"),
            Token::RAngle => write!(f, ">"),
            Token::Colon => write!(f, ":"),
            Token::Semicolon => write!(f, ";"),
            Token::Comma => write!(f, ","),
            Token::Dot => write!(f, "."),
            Token::Question => write!(f, "?"),
            Token::Equals => write!(f, "="),
            Token::Pipe => write!(f, "|"),
            Token::Ampersand => write!(f, "&"),
            Token::Bang => write!(f, "!"),
            Token::Plus => write!(f, "+"),
            Token::Minus => write!(f, "-"),
            Token::Star => write!(f, "*"),
            Token::Slash => write!(f, "/"),
            Token::Percent => write!(f, "%"),
            Token::At => write!(f, "@"),
            Token::Hash => write!(f, "#"),
            Token::Tilde => write!(f, "~"),
            Token::Caret => write!(f, "^"),
        }
    }
}

/// Consume a block comment through its closing `*/`; unterminated comments fail to lex
fn block_comment<'src>(lex: &mut Lexer<'src, Token<'src>>) -> Option<&'src str> {
    let end = lex.remainder().find("*/")?;
    lex.bump(end + 2);
    Some(lex.slice())
}

/// Tokenize a source string, failing on the first input that is not a token
pub fn tokenize(source: &str) -> ParseResult<Vec<(Token, std::ops::Range<usize>)>> {
    let mut tokens = Vec::new();

    for (result, span) in Token::lexer(source).spanned() {
        match result {
            Ok(token) => tokens.push((token, span)),
            Err(()) => {
                let text = &source[span.clone()];
                let message = if text.starts_with("/*") {
                    "unterminated block comment".to_string()
                } else {
                    format!("unexpected character {:?}", text.chars().next().unwrap_or_default())
                };
                return Err(ParseError::invalid_syntax(Span::new(span.start, span.end), message));
            }
        }
    }

    Ok(tokens)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identifiers_and_keywords() {
        let source = "interface Props extends Base $slots _private";
        let tokens = tokenize(source).unwrap();

        assert_eq!(tokens[0].0, Token::Ident("interface"));
        assert_eq!(tokens[1].0, Token::Ident("Props"));
        assert_eq!(tokens[2].0, Token::Ident("extends"));
        assert_eq!(tokens[3].0, Token::Ident("Base"));
        assert_eq!(tokens[4].0, Token::Ident("$slots"));
        assert_eq!(tokens[5].0, Token::Ident("_private"));
    }

    #[test]
    fn test_strings() {
        let source = r#""hello world" 'single' "escaped \"quote\"" `tmpl ${x}`"#;
        let tokens = tokenize(source).unwrap();

        assert_eq!(tokens[0].0, Token::String("\"hello world\""));
        assert_eq!(tokens[1].0, Token::String("'single'"));
        assert!(matches!(tokens[2].0, Token::String(_)));
        assert!(matches!(tokens[3].0, Token::Template(_)));
    }

    #[test]
    fn test_numbers() {
        let source = "42 3.14 1e10 0xFF 10n";
        let tokens = tokenize(source).unwrap();

        assert_eq!(tokens[0].0, Token::Number("42"));
        assert_eq!(tokens[1].0, Token::Number("3.14"));
        assert_eq!(tokens[2].0, Token::Number("1e10"));
        assert_eq!(tokens[3].0, Token::Number("0xFF"));
        assert_eq!(tokens[4].0, Token::Number("10n"));
    }

    #[test]
    fn test_arrow_and_spread() {
        let tokens = tokenize("(...args) => [a]").unwrap();
        let kinds: Vec<_> = tokens.iter().map(|(t, _)| *t).collect();

        assert_eq!(
            kinds,
            vec![
                Token::LParen,
                Token::Ellipsis,
                Token::Ident("args"),
                Token::RParen,
                Token::Arrow,
                Token::LBracket,
                Token::Ident("a"),
                Token::RBracket,
            ]
        );
    }

    #[test]
    fn test_comments() {
        let source = r#"
            // line comment
            /** doc comment */
            /* plain comment */
            /**/
            foo
        "#;
        let tokens = tokenize(source).unwrap();

        assert_eq!(tokens.len(), 4);
        assert!(tokens[0].0.is_doc_comment());
        assert!(!tokens[1].0.is_doc_comment());
        assert!(!tokens[2].0.is_doc_comment());
        assert_eq!(tokens[3].0, Token::Ident("foo"));
        assert_eq!(tokens[0].0, Token::Comment("/** doc comment */"));
        assert_eq!(tokens[2].0, Token::Comment("/**/"));
    }

    #[test]
    fn test_comment_spans_end_after_closing_delimiter() {
        let tokens = tokenize("/** a * b */ foo").unwrap();

        assert_eq!(tokens, vec![(Token::Comment("/** a * b */"), 0..12), (Token::Ident("foo"), 13..16)]);
        assert!(!tokens.iter().any(|(t, _)| *t == Token::Slash));
    }

    #[test]
    fn test_lexer_errors_are_reported() {
        let error = tokenize("const a = 1 /* open").unwrap_err();
        assert!(matches!(&error, ParseError::InvalidSyntax { message, .. } if message.contains("unterminated")));
        assert_eq!(error.span().start, 12);

        let error = tokenize("const \\ = 1").unwrap_err();
        assert!(matches!(error, ParseError::InvalidSyntax { .. }));
    }

    #[test]
    fn test_nested_generics_do_not_merge() {
        let tokens = tokenize("Array<Array<string>>").unwrap();
        let closing = tokens.iter().filter(|(t, _)| *t == Token::RAngle).count();
        assert_eq!(closing, 2);
    }
}
