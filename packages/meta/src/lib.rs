//! # Component Meta
//!
//! Extracts a machine-readable description of a component's public interface:
//! its props with documentation, defaults and a recursive schema of each prop's
//! type, plus the events it emits and the slots it renders.
//!
//! ## Features
//!
//! - **Authoring styles**: `<script setup>` macros, options objects, functional and class components
//! - **Schemas**: unions, arrays, tuples and objects expand recursively; recursive types terminate
//! - **Defaults**: literal defaults and zero-argument factories render canonically
//! - **Projects**: tsconfig-style configs with `extends` chains and include/exclude globs
//!
//! ## Example
//!
//! ```rust
//! use component_meta::{ComponentMetaChecker, MetaCheckerOptions};
//! use component_meta_common::MemoryFileSystem;
//! use std::path::Path;
//! use std::sync::Arc;
//!
//! let fs = MemoryFileSystem::new().with_file(
//!     "/src/Button.vue",
//!     "<script setup lang=\"ts\">\ndefineProps<{ label: string }>()\n</script>\n",
//! );
//! let checker = ComponentMetaChecker::for_single_file_with_fs(Arc::new(fs), MetaCheckerOptions::default()).unwrap();
//!
//! let meta = checker.get_component_meta(Path::new("/src/Button.vue")).unwrap();
//! assert_eq!(meta.props[0].name, "label");
//! assert_eq!(meta.props[0].type_, "string");
//! ```

pub mod adapter;
pub mod checker;
pub mod classifier;
pub mod config;
pub mod defaults;
pub mod error;
pub mod events;
pub mod merger;
pub mod options;
pub mod schema;
pub mod slots;
pub mod types;

pub use adapter::{PropertySymbol, TypeChecker, TypeShape};
pub use checker::ComponentMetaChecker;
pub use classifier::{Classification, Classifier};
pub use config::{ProjectConfig, DEFAULT_CONFIG_NAME};
pub use defaults::{render_literal, ComponentDefaults, DefaultEntry};
pub use error::{ConfigError, MetaError, MetaResult};
pub use events::{extract_events, EmitsDecl};
pub use merger::build_property;
pub use options::{MetaCheckerOptions, NewLine, PrinterOptions, SchemaOption};
pub use schema::{normalize, SchemaContext, SchemaNode};
pub use slots::extract_slots;
pub use types::{ComponentKind, ComponentMeta, EventMeta, PropertyMeta, SlotMeta, GLOBAL_ATTRIBUTES};
