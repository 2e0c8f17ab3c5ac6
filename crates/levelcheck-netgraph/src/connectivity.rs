//! Per-net gate/source/drain/bulk fan-out (C6), built once post-elaboration
//! by walking every non-parallel device and folding resistor/capacitor
//! shorts into the equivalent-net union-find.

use std::collections::HashMap;

use levelcheck_circuit::CircuitLibrary;
use levelcheck_core::{DeviceId, DeviceType, NetId};
use levelcheck_elaborate::Elaboration;

use crate::equivalence::EquivalenceClasses;
use crate::link::LinkedModels;
use crate::view::{device_view, iter_devices, Terminals};

/// A device terminal role, used to classify which fan-out list a device
/// lands in at a given net.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Terminal {
    Gate,
    Source,
    Drain,
    Bulk,
}

/// Read-only connectivity and equivalent-net structure. No operation on a
/// built index is fallible (distilled spec §4.2).
#[derive(Debug)]
pub struct ConnectivityIndex {
    equivalence: EquivalenceClasses,
    gate: HashMap<NetId, Vec<DeviceId>>,
    source: HashMap<NetId, Vec<DeviceId>>,
    drain: HashMap<NetId, Vec<DeviceId>>,
    bulk: HashMap<NetId, Vec<DeviceId>>,
}

impl ConnectivityIndex {
    pub fn build(elaboration: &Elaboration, library: &CircuitLibrary, linked: &LinkedModels) -> Self {
        let mut equivalence = EquivalenceClasses::identity(elaboration.net_count());

        // Pass 1: merge zero-resistance resistor/capacitor endpoints.
        for device_id in iter_devices(elaboration, library) {
            let view = device_view(elaboration, library, linked, device_id);
            let is_short = matches!(view.device_type, DeviceType::Resistor | DeviceType::Capacitor)
                && view.profile.resistance == levelcheck_core::Resistance::ZERO;
            if is_short {
                if let Terminals::TwoTerminal { a, b } = view.terminals {
                    equivalence.union(a, b);
                }
            }
        }

        let mut index = Self {
            equivalence,
            gate: HashMap::new(),
            source: HashMap::new(),
            drain: HashMap::new(),
            bulk: HashMap::new(),
        };

        // Pass 2: fan-out lists, keyed by representative net.
        for device_id in iter_devices(elaboration, library) {
            let view = device_view(elaboration, library, linked, device_id);
            match view.terminals {
                Terminals::Mos { drain, gate, source, bulk } => {
                    index.push(Terminal::Drain, drain, device_id);
                    index.push(Terminal::Gate, gate, device_id);
                    index.push(Terminal::Source, source, device_id);
                    index.push(Terminal::Bulk, bulk, device_id);
                }
                Terminals::TwoTerminal { a, b } => {
                    index.push(Terminal::Drain, a, device_id);
                    index.push(Terminal::Source, b, device_id);
                }
            }
        }
        index
    }

    fn push(&mut self, terminal: Terminal, net: NetId, device: DeviceId) {
        let net = self.equivalence.equivalent(net);
        let list = match terminal {
            Terminal::Gate => &mut self.gate,
            Terminal::Source => &mut self.source,
            Terminal::Drain => &mut self.drain,
            Terminal::Bulk => &mut self.bulk,
        };
        list.entry(net).or_default().push(device);
    }

    pub fn equivalent_net(&self, net: NetId) -> NetId {
        self.equivalence.equivalent(net)
    }

    fn list(&self, terminal: Terminal, net: NetId) -> &[DeviceId] {
        let net = self.equivalent_net(net);
        let map = match terminal {
            Terminal::Gate => &self.gate,
            Terminal::Source => &self.source,
            Terminal::Drain => &self.drain,
            Terminal::Bulk => &self.bulk,
        };
        map.get(&net).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn gates(&self, net: NetId) -> &[DeviceId] {
        self.list(Terminal::Gate, net)
    }

    pub fn sources(&self, net: NetId) -> &[DeviceId] {
        self.list(Terminal::Source, net)
    }

    pub fn drains(&self, net: NetId) -> &[DeviceId] {
        self.list(Terminal::Drain, net)
    }

    pub fn bulks(&self, net: NetId) -> &[DeviceId] {
        self.list(Terminal::Bulk, net)
    }

    pub fn gate_count(&self, net: NetId) -> usize {
        self.gates(net).len()
    }

    pub fn source_count(&self, net: NetId) -> usize {
        self.sources(net).len()
    }

    pub fn drain_count(&self, net: NetId) -> usize {
        self.drains(net).len()
    }

    pub fn bulk_count(&self, net: NetId) -> usize {
        self.bulks(net).len()
    }

    /// Every device touching `net` in any terminal role, deduplicated.
    pub fn all_devices(&self, net: NetId) -> Vec<DeviceId> {
        let mut devices: Vec<DeviceId> = self
            .gates(net)
            .iter()
            .chain(self.sources(net))
            .chain(self.drains(net))
            .chain(self.bulks(net))
            .copied()
            .collect();
        devices.sort_by_key(|d| d.as_u32());
        devices.dedup();
        devices
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use levelcheck_circuit::{Circuit, Device, SubcircuitInstance};
    use levelcheck_core::{Interner, TextId};
    use levelcheck_elaborate::Elaborator;
    use levelcheck_model::ModelLibrary;

    fn inverter_library() -> (CircuitLibrary, Interner, TextId) {
        let mut interner = Interner::new();
        let mut lib = CircuitLibrary::new();

        let inv_name = interner.intern("INV");
        let mut inv = Circuit::new(inv_name);
        let vdd = interner.intern("VDD");
        let gnd = interner.intern("GND");
        let inp = interner.intern("IN");
        let out = interner.intern("OUT");
        inv.add_port(vdd).unwrap();
        inv.add_port(gnd).unwrap();
        inv.add_port(inp).unwrap();
        inv.add_port(out).unwrap();

        let m1 = interner.intern("M1");
        let pmod = interner.intern("PMOD");
        let d = inv.get_or_create_signal(vdd);
        let g = inv.get_or_create_signal(inp);
        let s = inv.get_or_create_signal(out);
        let b = inv.get_or_create_signal(vdd);
        inv.add_device(Device::new(m1, DeviceType::Pmos, pmod, "", vec![s, g, d, b])).unwrap();

        let m2 = interner.intern("M2");
        let nmod = interner.intern("NMOD");
        let d2 = inv.get_or_create_signal(out);
        let g2 = inv.get_or_create_signal(inp);
        let s2 = inv.get_or_create_signal(gnd);
        let b2 = inv.get_or_create_signal(gnd);
        inv.add_device(Device::new(m2, DeviceType::Nmos, nmod, "", vec![d2, g2, s2, b2])).unwrap();
        lib.register_circuit(inv).unwrap();

        let top_name = interner.intern("TOP");
        let mut top = Circuit::new(top_name);
        let tvdd = top.get_or_create_signal(vdd);
        let tgnd = top.get_or_create_signal(gnd);
        let a = interner.intern("A");
        let ta = top.get_or_create_signal(a);
        let z = interner.intern("Z");
        let tz = top.get_or_create_signal(z);
        let x1 = interner.intern("X1");
        top.add_instance(SubcircuitInstance::new(x1, inv_name, vec![tvdd, tgnd, ta, tz])).unwrap();
        lib.register_circuit(top).unwrap();

        (lib, interner, top_name)
    }

    #[test]
    fn gate_net_has_both_transistors_fanned_out() {
        use levelcheck_core::DeviceType;
        let (lib, interner, top_name) = inverter_library();
        let elaboration = Elaborator::elaborate(&lib, top_name, &levelcheck_core::RunOptions::default()).unwrap();
        let models = ModelLibrary::new();
        let linked = LinkedModels::link(&lib, &models, &interner);
        let index = ConnectivityIndex::build(&elaboration, &lib, &linked);

        let top = elaboration.instance(elaboration.top);
        let a_net = top.local_to_global_net[2]; // port order: VDD GND IN OUT -> index 2 is IN
        assert_eq!(index.gate_count(a_net), 2);
        for device in index.gates(a_net) {
            let view = device_view(&elaboration, &lib, &linked, *device);
            assert!(view.device_type == DeviceType::Nmos || view.device_type == DeviceType::Pmos);
        }
    }

    #[test]
    fn zero_resistance_resistor_shorts_endpoints() {
        let mut interner = Interner::new();
        let mut lib = CircuitLibrary::new();
        let name = interner.intern("TOP");
        let mut circuit = Circuit::new(name);
        let a = interner.intern("A");
        let b = interner.intern("B");
        let r1 = interner.intern("R1");
        let rmod = interner.intern("RSHORT");
        let sig = vec![circuit.get_or_create_signal(a), circuit.get_or_create_signal(b)];
        circuit.add_device(Device::new(r1, DeviceType::Resistor, rmod, "0", sig)).unwrap();
        lib.register_circuit(circuit).unwrap();

        let elaboration = Elaborator::elaborate(&lib, name, &levelcheck_core::RunOptions::default()).unwrap();
        let models = ModelLibrary::new();
        let linked = LinkedModels::link(&lib, &models, &interner);
        let index = ConnectivityIndex::build(&elaboration, &lib, &linked);

        let top = elaboration.instance(elaboration.top);
        let net_a = top.local_to_global_net[0];
        let net_b = top.local_to_global_net[1];
        assert_eq!(index.equivalent_net(net_a), index.equivalent_net(net_b));
    }
}
