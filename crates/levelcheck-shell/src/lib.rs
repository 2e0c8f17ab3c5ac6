//! The interactive hierarchy-navigation shell (C11): a read-eval-print loop
//! over an already-elaborated netlist. Stage-restricted commands (`setpower`,
//! `setmodel`, `setfuse`) and pipeline-advancing commands (`rerun`,
//! `continue`, `skip`, `noerror`) are parsed and stage-gated here but their
//! actual effect — reloading a file, re-running a pass — is reported back to
//! the caller as an [`Outcome`] rather than performed in this crate: the
//! shell owns navigation and query, the CLI driver (A5) owns the pipeline.

pub mod command;
pub mod context;
pub mod error;
pub mod input;
pub mod outcome;
pub mod shell;

pub use command::Command;
pub use context::ShellContext;
pub use error::{OperatorError, Result};
pub use input::{FileInput, InputSource, InputStack, ScriptedInput, TerminalInput};
pub use outcome::{Outcome, ReloadKind};
pub use shell::Shell;
