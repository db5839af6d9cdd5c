use component_meta_checker::CheckError;
use component_meta_common::CommonError;
use std::path::PathBuf;
use thiserror::Error;

/// Errors that fail a whole metadata query
#[derive(Error, Debug)]
pub enum MetaError {
    #[error("File '{}' is not included in the project", .0.display())]
    NotInProject(PathBuf),

    #[error("'{}' has no export named '{export}'", path.display())]
    UnknownExport { path: PathBuf, export: String },

    #[error("Invalid checker options: {0}")]
    InvalidOptions(String),

    #[error(transparent)]
    Check(#[from] CheckError),

    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// Errors raised while reading a project configuration
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Cannot read config '{}': {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: CommonError,
    },

    #[error("Malformed config '{}': {source}", path.display())]
    Json5 {
        path: PathBuf,
        #[source]
        source: json5::Error,
    },

    #[error("Invalid config '{}': {source}", path.display())]
    Invalid {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Config '{}' extends itself", .0.display())]
    ExtendsCycle(PathBuf),

    #[error("Invalid glob '{pattern}': {source}")]
    InvalidGlob {
        pattern: String,
        #[source]
        source: glob::PatternError,
    },

    #[error("Cannot list project files under '{}': {source}", root.display())]
    Walk {
        root: PathBuf,
        #[source]
        source: CommonError,
    },
}

pub type MetaResult<T> = Result<T, MetaError>;
