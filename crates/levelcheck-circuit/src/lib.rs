//! Parsed, not-yet-elaborated circuit definitions (C2).
//!
//! A [`Circuit`] is one subcircuit definition as read from a netlist: its
//! ports, local nets, devices, and nested subcircuit instances, all indexed
//! by [`levelcheck_core::TextId`] names rather than resolved global ids.
//! A later elaboration pass flattens a [`CircuitLibrary`] into a single
//! global netlist graph.

pub mod circuit;
pub mod device;
pub mod error;
pub mod net;

pub use circuit::Circuit;
pub use device::{Device, SubcircuitInstance};
pub use error::{CircuitError, Result};
pub use net::LocalNetId;

use indexmap::IndexMap;
use levelcheck_core::{CircuitId, TextId};

/// All subcircuit definitions parsed from one netlist source, keyed by name
/// in first-seen order (`IndexMap`, so iteration order matches input order
/// for reproducible diagnostics).
#[derive(Debug, Default)]
pub struct CircuitLibrary {
    circuits: IndexMap<TextId, Circuit>,
}

impl CircuitLibrary {
    pub fn new() -> Self {
        Self { circuits: IndexMap::new() }
    }

    pub fn register_circuit(&mut self, circuit: Circuit) -> Result<()> {
        let name = circuit.name;
        if self.circuits.contains_key(&name) {
            return Err(CircuitError::DuplicateCircuit { name });
        }
        self.circuits.insert(name, circuit);
        Ok(())
    }

    pub fn find(&self, name: TextId) -> Option<&Circuit> {
        self.circuits.get(&name)
    }

    pub fn find_mut(&mut self, name: TextId) -> Option<&mut Circuit> {
        self.circuits.get_mut(&name)
    }

    pub fn contains(&self, name: TextId) -> bool {
        self.circuits.contains_key(&name)
    }

    pub fn len(&self) -> usize {
        self.circuits.len()
    }

    pub fn is_empty(&self) -> bool {
        self.circuits.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&TextId, &Circuit)> {
        self.circuits.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = (&TextId, &mut Circuit)> {
        self.circuits.iter_mut()
    }

    pub fn names(&self) -> impl Iterator<Item = &TextId> {
        self.circuits.keys()
    }

    /// Stable index-derived id for a registered circuit; stable because
    /// `IndexMap` never reorders on lookup or mutation of existing entries.
    pub fn circuit_id(&self, name: TextId) -> Option<CircuitId> {
        self.circuits.get_index_of(&name).map(CircuitId::from)
    }

    pub fn circuit_by_id(&self, id: CircuitId) -> Option<&Circuit> {
        self.circuits.get_index(id.as_usize()).map(|(_, circuit)| circuit)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use levelcheck_core::Interner;

    #[test]
    fn registers_and_finds_by_name() {
        let mut interner = Interner::new();
        let name = interner.intern("INV");
        let mut lib = CircuitLibrary::new();
        lib.register_circuit(Circuit::new(name)).unwrap();
        assert!(lib.contains(name));
        assert_eq!(lib.find(name).unwrap().name, name);
    }

    #[test]
    fn rejects_duplicate_registration() {
        let mut interner = Interner::new();
        let name = interner.intern("INV");
        let mut lib = CircuitLibrary::new();
        lib.register_circuit(Circuit::new(name)).unwrap();
        let err = lib.register_circuit(Circuit::new(name)).unwrap_err();
        assert_eq!(err, CircuitError::DuplicateCircuit { name });
    }

    #[test]
    fn circuit_id_is_stable_index() {
        let mut interner = Interner::new();
        let a = interner.intern("A");
        let b = interner.intern("B");
        let mut lib = CircuitLibrary::new();
        lib.register_circuit(Circuit::new(a)).unwrap();
        lib.register_circuit(Circuit::new(b)).unwrap();

        let id_a = lib.circuit_id(a).unwrap();
        let id_b = lib.circuit_id(b).unwrap();
        assert_ne!(id_a, id_b);
        assert_eq!(lib.circuit_by_id(id_a).unwrap().name, a);
        assert_eq!(lib.circuit_by_id(id_b).unwrap().name, b);
    }

    #[test]
    fn iteration_preserves_insertion_order() {
        let mut interner = Interner::new();
        let a = interner.intern("A");
        let b = interner.intern("B");
        let mut lib = CircuitLibrary::new();
        lib.register_circuit(Circuit::new(b)).unwrap();
        lib.register_circuit(Circuit::new(a)).unwrap();
        let order: Vec<TextId> = lib.names().copied().collect();
        assert_eq!(order, vec![b, a]);
    }
}
