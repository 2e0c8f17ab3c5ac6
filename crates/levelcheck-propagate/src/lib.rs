//! Voltage propagation (C8/C9): resistance-priority event queues, per-device
//! conduction rules, and the five-pass engine that turns an elaborated
//! netlist plus a power specification into committed min/sim/max voltages
//! and leak bounds for every net.

pub mod device_rule;
pub mod engine;
pub mod event;
pub mod gate_state;
pub mod power_lookup;
pub mod queue;
pub mod sinks;
pub mod state;

pub use device_rule::{conduction_edges, ConductMode};
pub use engine::PropagationEngine;
pub use event::{Event, QueueKind};
pub use gate_state::{mos_gate_state, GateState};
pub use power_lookup::{resolve as resolve_power_reference, VoltageKind};
pub use queue::EventQueue;
pub use sinks::{MemorySinkHandles, SharedBuffer, Sinks};
pub use state::PropagationState;
