//! What [`crate::shell::Shell::execute_line`] hands back to its caller.
//! Navigation and query commands are fully handled inside the shell and
//! always return [`Outcome::Continue`]; commands that mutate run-wide state
//! or advance the pipeline are parsed and stage-gated here but their actual
//! effect belongs to the CLI driver (A5), which owns the elaboration,
//! propagation, and rule-checking passes.

/// Which file a `setpower`/`setmodel`/`setfuse` command names.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReloadKind {
    Power,
    Model,
    Fuse,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    /// Stay in the loop; nothing for the caller to do.
    Continue,
    /// Reload the named file and re-run the pipeline from `STAGE_START`.
    Reload { kind: ReloadKind, path: String },
    /// Re-execute the current stage (`rerun`).
    Rerun,
    /// Advance `n` stages, or to completion when `n` is `None` (`continue`/`c`).
    Advance(Option<u32>),
    /// Skip the device or net currently under the operator's attention
    /// without recording a finding against it (`skip`).
    Skip,
    /// Suppress further reporting of the current error category for the
    /// rest of this run (`noerror`).
    SuppressCurrentCategory,
    /// End the session (`quit`/`q`/`exit`).
    Quit,
}
