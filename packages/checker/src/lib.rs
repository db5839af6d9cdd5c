//! # Component Meta Checker
//!
//! A small structural type checker for component scripts. It loads script and
//! single-file component sources on demand, resolves names across relative
//! imports, and lowers type annotations into an arena of resolved types that
//! the metadata engine queries.
//!
//! ## Features
//!
//! - **Declaration merging**: interfaces with the same name merge their members
//! - **Generic instantiation**: type arguments bound with defaults, cached per argument list
//! - **Union reduction**: flattening, literal absorption and `true | false` → `boolean`
//! - **Value types**: `typeof`, `as const` tuples, enums and class instance types
//! - **Display**: types print the way the TypeScript language service shows them
//!
//! ## Example
//!
//! ```rust
//! use component_meta_checker::{CompilerOptions, Program};
//! use component_meta_common::MemoryFileSystem;
//! use std::path::Path;
//! use std::sync::Arc;
//!
//! let fs = MemoryFileSystem::new()
//!     .with_file("/src/props.ts", "export interface Props { size?: 'small' | 'large' }");
//! let mut program = Program::new(Arc::new(fs), CompilerOptions::default());
//! let file = program.load(Path::new("/src/props.ts")).unwrap();
//!
//! let props = program.resolve_type(file, "Props").unwrap();
//! # let _ = props;
//! ```

pub mod error;
pub mod lower;
pub mod options;
pub mod printer;
pub mod program;
pub mod scope;
pub mod types;

pub use error::{CheckError, CheckResult};
pub use lower::{parse_number, InferMode};
pub use options::CompilerOptions;
pub use printer::{print_literal, print_number, quote_string, TypePrinter};
pub use program::{
    has_source_extension, FileId, ItemRef, Program, ScriptUnit, Site, SourceFile, TypeTarget,
    ValueRef, ValueSymbol, RESOLVE_EXTENSIONS,
};
pub use types::{
    AliasName, Declaration, EnumType, IndexSignature, Intrinsic, LiteralType, Member, ObjectType,
    Param, Signature, TupleElement, TypeArena, TypeId, TypeKind, UnionType,
};
