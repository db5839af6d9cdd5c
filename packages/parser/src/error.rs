//! Error types for the component script parser

use crate::ast::Span;
use thiserror::Error;

/// Result type for parsing operations
pub type ParseResult<T> = Result<T, ParseError>;

/// Parse error with location and context
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ParseError {
    #[error("Unexpected token at {}..{}: expected {expected}, found {found}", span.start, span.end)]
    UnexpectedToken {
        span: Span,
        expected: String,
        found: String,
    },

    #[error("Unexpected end of input at {pos}: expected {expected}")]
    UnexpectedEof { pos: usize, expected: String },

    #[error("Invalid syntax at {}..{}: {message}", span.start, span.end)]
    InvalidSyntax { span: Span, message: String },
}

impl ParseError {
    pub fn unexpected_token(
        span: Span,
        expected: impl Into<String>,
        found: impl Into<String>,
    ) -> Self {
        Self::UnexpectedToken {
            span,
            expected: expected.into(),
            found: found.into(),
        }
    }

    pub fn unexpected_eof(pos: usize, expected: impl Into<String>) -> Self {
        Self::UnexpectedEof {
            pos,
            expected: expected.into(),
        }
    }

    pub fn invalid_syntax(span: Span, message: impl Into<String>) -> Self {
        Self::InvalidSyntax {
            span,
            message: message.into(),
        }
    }

    pub fn span(&self) -> Span {
        match self {
            ParseError::UnexpectedToken { span, .. } | ParseError::InvalidSyntax { span, .. } => {
                *span
            }
            ParseError::UnexpectedEof { pos, .. } => Span::new(*pos, *pos),
        }
    }

    /// Shift the error location by a base offset (script blocks inside a larger file)
    pub fn offset(self, base: usize) -> Self {
        match self {
            ParseError::UnexpectedToken {
                span,
                expected,
                found,
            } => ParseError::UnexpectedToken {
                span: span.offset(base),
                expected,
                found,
            },
            ParseError::UnexpectedEof { pos, expected } => ParseError::UnexpectedEof {
                pos: pos + base,
                expected,
            },
            ParseError::InvalidSyntax { span, message } => ParseError::InvalidSyntax {
                span: span.offset(base),
                message,
            },
        }
    }
}

/// Pretty-print an error with source context using ariadne
#[cfg(feature = "pretty-errors")]
pub fn format_error(error: &ParseError, filename: &str, source: &str) -> String {
    use ariadne::{Color, Label, Report, ReportKind, Source};

    let span = error.span();
    let start = span.start.min(source.len());
    let end = span.end.clamp(start, source.len());

    let label = match error {
        ParseError::UnexpectedToken { expected, .. } | ParseError::UnexpectedEof { expected, .. } => {
            format!("expected {}", expected)
        }
        ParseError::InvalidSyntax { message, .. } => message.clone(),
    };

    let report = Report::build(ReportKind::Error, filename, start)
        .with_message(error.to_string())
        .with_label(
            Label::new((filename, start..end))
                .with_color(Color::Red)
                .with_message(label),
        )
        .finish();

    let mut output = Vec::new();
    if report
        .write((filename, Source::from(source)), &mut output)
        .is_err()
    {
        return error.to_string();
    }

    String::from_utf8(output).unwrap_or_else(|_| error.to_string())
}

/// Plain fallback when ariadne is disabled
#[cfg(not(feature = "pretty-errors"))]
pub fn format_error(error: &ParseError, filename: &str, _source: &str) -> String {
    format!("{}: {}", filename, error)
}
