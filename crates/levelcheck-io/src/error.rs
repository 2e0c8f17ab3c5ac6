//! Errors for the ambient file readers. Every variant is "structural,
//! fatal" in the distilled spec's §7 taxonomy except `UnknownFuseDevice`,
//! which the fuse-file reader downgrades to a `log::warn!` and continues
//! (§7 "structural, recoverable").

use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum IoError {
    #[error("{path}:{line}: malformed model declaration: {text:?}")]
    MalformedModelLine { path: String, line: usize, text: String },

    #[error("{path}:{line}: malformed power declaration: {text:?}")]
    MalformedPowerLine { path: String, line: usize, text: String },

    #[error("{path}:{line}: malformed netlist line: {text:?}")]
    MalformedNetlistLine { path: String, line: usize, text: String },

    #[error(
        "{path}:{line}: {construct:?} is not supported by the bundled flat-netlist reader \
         (requires a full SPICE front end)"
    )]
    UnsupportedConstruct { path: String, line: usize, construct: String },

    #[error("{path}:{line}: device block for {circuit:?} was never closed with .ENDS")]
    UnterminatedSubcircuit { path: String, line: usize, circuit: String },

    #[error("{path}:{line}: .ENDS outside of any .SUBCKT block")]
    UnmatchedEnds { path: String, line: usize },

    #[error(transparent)]
    Circuit(#[from] levelcheck_circuit::CircuitError),
}

pub type Result<T> = std::result::Result<T, IoError>;
