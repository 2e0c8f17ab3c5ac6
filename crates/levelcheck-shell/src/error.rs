//! Operator errors (§7): mistakes typed at the shell prompt. Always caught
//! at the dispatch boundary in [`crate::shell::Shell::execute_line`] and
//! reported via the report sink; never unwind past it.

use levelcheck_core::Stage;

pub type Result<T> = std::result::Result<T, OperatorError>;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum OperatorError {
    #[error("unrecognized command {0:?} (try \"help\")")]
    UnknownCommand(String),
    #[error("{command} requires an argument")]
    MissingArgument { command: String },
    #[error("{command} is only valid from {required:?} onward (currently {current:?})")]
    StageTooEarly { command: String, required: Stage, current: Stage },
    #[error("no subcircuit, net, or instance named {0:?} here")]
    NotFound(String),
    #[error("{0}")]
    Navigation(String),
    #[error("could not read {path:?}: {reason}")]
    Io { path: String, reason: String },
    #[error("{0:?} is not a number")]
    NotANumber(String),
}
