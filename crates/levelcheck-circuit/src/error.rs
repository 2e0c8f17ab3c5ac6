//! Errors for circuit-definition construction.

use levelcheck_core::TextId;
use thiserror::Error;

/// Errors raised while building a [`crate::Circuit`] or
/// [`crate::CircuitLibrary`]. These are all "structural, fatal" in the
/// taxonomy sense: they abort the current run rather than accumulate.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CircuitError {
    /// Two devices or subcircuit instances in the same circuit share a name.
    #[error("duplicate instance {name:?} in circuit {circuit:?}")]
    DuplicateInstance { circuit: TextId, name: TextId },

    /// A port was added after the port list was sealed (i.e. after the
    /// first internal signal or device was registered).
    #[error("cannot add port {port:?} to circuit {circuit:?}: ports already sealed")]
    PortsAlreadySealed { circuit: TextId, port: TextId },

    /// A circuit with this name was already registered in the library.
    #[error("duplicate circuit definition {name:?}")]
    DuplicateCircuit { name: TextId },
}

pub type Result<T> = std::result::Result<T, CircuitError>;
