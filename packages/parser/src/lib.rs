pub mod ast;
pub mod error;
pub mod jsdoc;
pub mod parser;
pub mod sfc;
pub mod tokenizer;

pub use ast::{DocComment, DocTag, Module, Span};
pub use error::{format_error, ParseError, ParseResult};
pub use jsdoc::parse_doc_comment;
pub use parser::{parse_module, unescape, unescape_string, Parser};
pub use sfc::{parse_sfc, ScriptBlock, SfcDescriptor};
pub use tokenizer::{tokenize, Token};
