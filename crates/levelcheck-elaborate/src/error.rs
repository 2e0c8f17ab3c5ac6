//! Errors raised while flattening a circuit library into a global instance
//! tree. All structural and fatal: the top-level driver aborts the run.

use levelcheck_core::TextId;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ElaborationError {
    #[error("subcircuit instance {instance:?} in {circuit:?} references unresolved target {target:?}")]
    UnresolvedSubcircuit { circuit: TextId, instance: TextId, target: TextId },

    #[error(
        "instance {instance:?} of {target:?} connects {found} ports, expected {expected}"
    )]
    PortCountMismatch { instance: TextId, target: TextId, expected: usize, found: usize },

    #[error("no circuit named {name:?} found for the top-level instance")]
    UnknownTopCircuit { name: TextId },
}

pub type Result<T> = std::result::Result<T, ElaborationError>;
