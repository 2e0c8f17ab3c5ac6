//! Reads an elaborated device back out in terms of global net ids and its
//! resolved electrical profile. Every crate downstream of elaboration
//! (connectivity, propagation, checking) walks devices through this one
//! translation rather than re-deriving `local_to_global_net` bookkeeping.

use levelcheck_circuit::CircuitLibrary;
use levelcheck_core::{DeviceId, DeviceType, NetId, TextId};
use levelcheck_elaborate::Elaboration;

use crate::link::{DeviceProfile, LinkedModels};

/// A device's terminals as global net ids, shaped by its device type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Terminals {
    Mos { drain: NetId, gate: NetId, source: NetId, bulk: NetId },
    TwoTerminal { a: NetId, b: NetId },
}

/// An elaborated device, resolved to global net ids and its model profile.
#[derive(Debug, Clone)]
pub struct DeviceView<'a> {
    pub device_id: DeviceId,
    pub name: TextId,
    pub device_type: DeviceType,
    pub terminals: Terminals,
    pub profile: &'a DeviceProfile,
}

/// Iterate every global device id owned by a non-parallel instance. Parallel
/// duplicates are skipped (distilled spec §4.2: "computed once post-
/// elaboration by walking every non-parallel device").
pub fn iter_devices<'a>(
    elaboration: &'a Elaboration,
    library: &'a CircuitLibrary,
) -> impl Iterator<Item = DeviceId> + 'a {
    elaboration.instances().iter().flat_map(move |instance| {
        let count = if instance.is_parallel_duplicate() {
            0
        } else {
            library.circuit_by_id(instance.master).expect("valid circuit id").device_count()
        };
        let first = instance.first_device.as_u32();
        (0..count as u32).map(move |offset| DeviceId::new(first + offset))
    })
}

/// Resolve one device id to its [`DeviceView`].
pub fn device_view<'a>(
    elaboration: &Elaboration,
    library: &CircuitLibrary,
    linked: &'a LinkedModels,
    device_id: DeviceId,
) -> DeviceView<'a> {
    let instance_id = elaboration.device_parent(device_id);
    let instance = elaboration.instance(instance_id);
    let circuit = library.circuit_by_id(instance.master).expect("valid circuit id");
    let local_index = (device_id.as_u32() - instance.first_device.as_u32()) as usize;
    let device = &circuit.devices()[local_index];
    let profile = linked
        .profile(instance.master, local_index)
        .expect("every template device was linked");

    let global = |local: levelcheck_circuit::LocalNetId| instance.local_to_global_net[local.as_usize()];
    let terminals = if device.device_type.is_mos() {
        Terminals::Mos {
            drain: global(device.drain().unwrap()),
            gate: global(device.gate().unwrap()),
            source: global(device.source().unwrap()),
            bulk: global(device.bulk().unwrap()),
        }
    } else {
        let (a, b) = device.terminals();
        Terminals::TwoTerminal { a: global(a), b: global(b) }
    };

    DeviceView { device_id, name: device.name, device_type: device.device_type, terminals, profile }
}

/// The leaf signal name a global net was allocated under: the circuit-local
/// port or internal-signal name of the instance that owns it. Used to match
/// a net against power-file signal patterns (which name leaf signals, not
/// flattened hierarchy paths).
pub fn net_name(elaboration: &Elaboration, library: &CircuitLibrary, net: NetId) -> TextId {
    let instance_id = elaboration.net_parent(net);
    let instance = elaboration.instance(instance_id);
    let circuit = library.circuit_by_id(instance.master).expect("valid circuit id");
    let owned_index = (net.as_u32() - instance.first_net.as_u32()) as usize;
    if instance_id == elaboration.top {
        if owned_index < circuit.port_count() {
            circuit.ports()[owned_index]
        } else {
            circuit.internal_signals()[owned_index - circuit.port_count()]
        }
    } else {
        circuit.internal_signals()[owned_index]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use levelcheck_circuit::{Circuit, Device, SubcircuitInstance};
    use levelcheck_core::Interner;
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
        let nmod = interner.intern("NMOD");
        let d = inv.get_or_create_signal(out);
        let g = inv.get_or_create_signal(inp);
        let s = inv.get_or_create_signal(gnd);
        let b = inv.get_or_create_signal(gnd);
        inv.add_device(Device::new(m1, DeviceType::Nmos, nmod, "", vec![d, g, s, b])).unwrap();
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
    fn device_view_resolves_mos_terminals_through_instance() {
        use levelcheck_core::DeviceType;
        let (lib, interner, top_name) = inverter_library();
        let elaboration = Elaborator::elaborate(&lib, top_name, &levelcheck_core::RunOptions::default()).unwrap();
        let models = ModelLibrary::new();
        let linked = LinkedModels::link(&lib, &models, &interner);

        let device_ids: Vec<_> = iter_devices(&elaboration, &lib).collect();
        assert_eq!(device_ids.len(), 1);
        let view = device_view(&elaboration, &lib, &linked, device_ids[0]);
        assert_eq!(view.device_type, DeviceType::Nmos);
        match view.terminals {
            Terminals::Mos { drain, gate, .. } => {
                let drain_name = net_name(&elaboration, &lib, drain);
                let gate_name = net_name(&elaboration, &lib, gate);
                assert_eq!(interner.resolve(drain_name), "Z");
                assert_eq!(interner.resolve(gate_name), "A");
            }
            Terminals::TwoTerminal { .. } => panic!("expected MOS terminals"),
        }
    }

    #[test]
    fn net_name_resolves_top_ports_and_internals() {
        let (lib, interner, top_name) = inverter_library();
        let elaboration = Elaborator::elaborate(&lib, top_name, &levelcheck_core::RunOptions::default()).unwrap();
        let top = elaboration.instance(elaboration.top);
        let vdd_net = top.local_to_global_net[0];
        let name = net_name(&elaboration, &lib, vdd_net);
        assert_eq!(interner.resolve(name), "VDD");
    }
}
