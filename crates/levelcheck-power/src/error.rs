//! Errors for power-file parsing and declaration lookup.

use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum PowerError {
    #[error("malformed power declaration on line {line}: {text:?}")]
    MalformedLine { line: usize, text: String },

    #[error("unresolved symbolic voltage {name:?} referenced on line {line}")]
    UnresolvedVoltageReference { line: usize, name: String },
}

pub type Result<T> = std::result::Result<T, PowerError>;
