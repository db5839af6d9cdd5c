use component_meta_common::CommonError;
use component_meta_parser::ParseError;
use std::path::PathBuf;
use thiserror::Error;

/// Errors that stop a program from loading a source file
#[derive(Error, Debug)]
pub enum CheckError {
    #[error("Cannot read '{}': {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: CommonError,
    },

    #[error("Syntax error in '{}': {error}", path.display())]
    Syntax {
        path: PathBuf,
        error: ParseError,
        /// Rendered report with source context
        report: String,
    },

    #[error("Unsupported source file: {}", .0.display())]
    UnsupportedFile(PathBuf),
}

impl CheckError {
    pub fn path(&self) -> &PathBuf {
        match self {
            CheckError::Read { path, .. }
            | CheckError::Syntax { path, .. }
            | CheckError::UnsupportedFile(path) => path,
        }
    }
}

pub type CheckResult<T> = Result<T, CheckError>;
