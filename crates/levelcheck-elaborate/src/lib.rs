//! Hierarchical circuit elaboration (C5): flattens a
//! [`levelcheck_circuit::CircuitLibrary`] into one global net/device/
//! instance id space, detecting structurally parallel instances so the
//! propagator and checker can skip redundant duplicates.

pub mod elaborator;
pub mod error;
pub mod instance;

pub use elaborator::{Elaboration, Elaborator};
pub use error::{ElaborationError, Result};
pub use instance::Instance;
