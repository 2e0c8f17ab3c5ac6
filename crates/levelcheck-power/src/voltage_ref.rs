//! A voltage value as written in a power-file line: either a bare literal
//! (`1.8`) or a symbolic reference to another declaration's voltage
//! (`VDD_CORE`), resolved once the whole power file is loaded since
//! references may appear before their target is declared.

use levelcheck_core::Voltage;

#[derive(Debug, Clone, PartialEq)]
pub enum VoltageRef {
    Literal(Voltage),
    Symbolic(String),
}

impl VoltageRef {
    pub fn literal(volts: f64) -> Self {
        VoltageRef::Literal(Voltage::from_volts(volts))
    }

    pub fn symbolic(name: impl Into<String>) -> Self {
        VoltageRef::Symbolic(name.into())
    }

    /// Resolve to a concrete voltage, recursing through symbolic references
    /// via `lookup`. `lookup` returns the referenced declaration's voltage
    /// of the same kind (min/sim/max), or `None` if the name is unknown.
    pub fn resolve(&self, lookup: &impl Fn(&str) -> Option<Voltage>) -> Option<Voltage> {
        match self {
            VoltageRef::Literal(v) => Some(*v),
            VoltageRef::Symbolic(name) => lookup(name),
        }
    }
}
