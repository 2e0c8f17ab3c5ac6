//! The propagation engine (C9): orchestrates the five sequential passes
//! over the min/max/sim event queues, writing the committed and leak
//! voltage bounds and the five virtual-net maps into a [`PropagationState`].

use std::io::Write;
use std::sync::atomic::{AtomicBool, Ordering};

use levelcheck_circuit::CircuitLibrary;
use levelcheck_core::{DeviceId, DeviceType, NetId, Resistance, TextId, Voltage};
use levelcheck_elaborate::Elaboration;
use levelcheck_model::ModelLibrary;
use levelcheck_netgraph::{
    device_view, iter_devices, net_name, ConnectivityIndex, LinkedModels, Terminals, VirtualNetMap,
};
use levelcheck_power::PowerSpec;

use crate::device_rule::conduction_edges;
use crate::gate_state::{mos_gate_state, GateState};
use crate::power_lookup::{self, VoltageKind};
use crate::queue::EventQueue;
use crate::sinks::Sinks;
use crate::state::PropagationState;

/// Whether a linear (non-sim) pass tightens a net's bound upward (min
/// passes: the strongest proven lower guarantee so far) or downward (max
/// passes: the strongest proven upper guarantee so far), matching the
/// distilled spec §4.5 update rule text literally.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Direction {
    TightenUp,
    TightenDown,
}

impl Direction {
    fn improves(self, current: Voltage, candidate: Voltage) -> bool {
        match self {
            Direction::TightenUp => candidate > current,
            Direction::TightenDown => candidate < current,
        }
    }
}

pub struct PropagationEngine;

impl PropagationEngine {
    /// Run the full five-pass protocol with no cancellation support.
    pub fn run(
        elaboration: &Elaboration,
        library: &CircuitLibrary,
        models: &ModelLibrary,
        linked: &LinkedModels,
        connectivity: &ConnectivityIndex,
        power: &PowerSpec,
        interner: &levelcheck_core::Interner,
        sinks: &mut Sinks,
    ) -> PropagationState {
        let _ = models;
        Self::run_cancellable(elaboration, library, linked, connectivity, power, interner, sinks, &AtomicBool::new(false))
    }

    /// Run the full five-pass protocol, checking `interrupted` between
    /// event dequeues (distilled spec §5 cancellation discipline).
    pub fn run_cancellable(
        elaboration: &Elaboration,
        library: &CircuitLibrary,
        linked: &LinkedModels,
        connectivity: &ConnectivityIndex,
        power: &PowerSpec,
        interner: &levelcheck_core::Interner,
        sinks: &mut Sinks,
        interrupted: &AtomicBool,
    ) -> PropagationState {
        let net_count = elaboration.net_count();
        let device_count = elaboration.device_count();
        let mut state = PropagationState::new(net_count, device_count);
        mark_pumped_nets(elaboration, library, linked, &mut state.pumped);

        // Pass 1: seed min/max, queue the devices on every declared supply
        // net for the deferred post-sim drain in pass 4.
        let mut min_queue = EventQueue::new();
        let mut max_queue = EventQueue::new();
        seed_kind(power, elaboration, library, connectivity, interner, VoltageKind::Min, &mut state.min_voltage, &mut min_queue);
        seed_kind(power, elaboration, library, connectivity, interner, VoltageKind::Max, &mut state.max_voltage, &mut max_queue);

        // Pass 2: min-leak / max-leak, own seeding and queues, run to
        // completion now in `Leak` mode (every device conducts).
        let mut min_leak_queue = EventQueue::new();
        seed_kind(power, elaboration, library, connectivity, interner, VoltageKind::Min, &mut state.min_leak_voltage, &mut min_leak_queue);
        let mut cancelled = linear_pass(
            elaboration, library, linked, connectivity,
            ConductMode::Leak, Direction::TightenUp, None,
            &mut state.min_leak_voltage, &mut state.min_leak_net,
            min_leak_queue, "min-leak", sinks, interrupted,
        );

        let mut max_leak_queue = EventQueue::new();
        seed_kind(power, elaboration, library, connectivity, interner, VoltageKind::Max, &mut state.max_leak_voltage, &mut max_leak_queue);
        cancelled |= linear_pass(
            elaboration, library, linked, connectivity,
            ConductMode::Leak, Direction::TightenDown, None,
            &mut state.max_leak_voltage, &mut state.max_leak_net,
            max_leak_queue, "max-leak", sinks, interrupted,
        );

        // Pass 3: first sim pass, establishing both the sim voltages and
        // the per-device gate-conduction verdict the post-sim passes gate
        // on.
        let mut sim_queue = EventQueue::new();
        seed_kind(power, elaboration, library, connectivity, interner, VoltageKind::Sim, &mut state.sim_voltage, &mut sim_queue);
        cancelled |= sim_pass(
            elaboration, library, linked, connectivity,
            &mut state.sim_voltage, &mut state.sim_net, &mut state.gate_states,
            sim_queue, sinks, interrupted,
        );

        // Pass 4: drain the min/max queues seeded in pass 1, now gated by
        // the sim state just established, cutting off non-conducting
        // paths.
        cancelled |= linear_pass(
            elaboration, library, linked, connectivity,
            ConductMode::Gated, Direction::TightenUp, Some(&state.gate_states),
            &mut state.min_voltage, &mut state.min_net,
            min_queue, "min", sinks, interrupted,
        );
        cancelled |= linear_pass(
            elaboration, library, linked, connectivity,
            ConductMode::Gated, Direction::TightenDown, Some(&state.gate_states),
            &mut state.max_voltage, &mut state.max_net,
            max_queue, "max", sinks, interrupted,
        );

        // Pass 5: resistance refinement over the now-committed sim paths.
        resistance_refinement(elaboration, library, linked, connectivity, &state.sim_voltage, &state.gate_states, &mut state.sim_net);

        state.cancelled = cancelled;
        let _ = writeln!(sinks.report, "! propagation complete ({} nets, {} devices)", net_count, device_count);
        state
    }
}

use crate::device_rule::ConductMode;

/// Seed every net matched by a power declaration carrying a voltage of
/// `kind`, writing the resolved value and enqueuing its attached devices at
/// zero resistance. First declaration to reach a given representative net
/// wins; later (weaker-precedence) declarations on a shorted sibling net
/// are not overwritten.
fn seed_kind(
    power: &PowerSpec,
    elaboration: &Elaboration,
    library: &CircuitLibrary,
    connectivity: &ConnectivityIndex,
    interner: &levelcheck_core::Interner,
    kind: VoltageKind,
    voltage: &mut [Voltage],
    queue: &mut EventQueue,
) {
    for index in 0..elaboration.net_count() {
        let net = NetId::new(index as u32);
        let signal: TextId = net_name(elaboration, library, net);
        let Some(decl) = power.find_for_signal(interner.resolve(signal)) else { continue };
        let reference = match kind {
            VoltageKind::Min => decl.min.as_ref(),
            VoltageKind::Sim => decl.sim.as_ref(),
            VoltageKind::Max => decl.max.as_ref(),
        };
        let Some(reference) = reference else { continue };
        let Some(value) = power_lookup::resolve(power, kind, reference) else { continue };

        let rep = connectivity.equivalent_net(net);
        if voltage[rep.as_usize()].is_known() {
            continue;
        }
        voltage[rep.as_usize()] = value;
        for device in connectivity.all_devices(rep) {
            queue.push(device, Resistance::ZERO);
        }
    }
}

fn mark_pumped_nets(elaboration: &Elaboration, library: &CircuitLibrary, linked: &LinkedModels, pumped: &mut [bool]) {
    for device in iter_devices(elaboration, library) {
        let view = device_view(elaboration, library, linked, device);
        if view.device_type == DeviceType::Capacitor {
            if let Terminals::TwoTerminal { a, b } = view.terminals {
                pumped[a.as_usize()] = true;
                pumped[b.as_usize()] = true;
            }
        }
    }
}

/// Drain `queue` applying device conduction rules, tightening `voltage`
/// (and installing edges into `net_map`) per `direction`, under `mode`.
#[allow(clippy::too_many_arguments)]
fn linear_pass(
    elaboration: &Elaboration,
    library: &CircuitLibrary,
    linked: &LinkedModels,
    connectivity: &ConnectivityIndex,
    mode: ConductMode,
    direction: Direction,
    gate_states: Option<&[Option<GateState>]>,
    voltage: &mut [Voltage],
    net_map: &mut VirtualNetMap,
    mut queue: EventQueue,
    label: &str,
    sinks: &mut Sinks,
    interrupted: &AtomicBool,
) -> bool {
    let mut processed = 0u64;
    let mut updates = 0u64;
    loop {
        if interrupted.load(Ordering::Relaxed) {
            log::warn!("{label} pass cancelled after {processed} events");
            return true;
        }
        let Some((device, _resistance)) = queue.pop() else { break };
        processed += 1;
        let view = device_view(elaboration, library, linked, device);
        let mos_state = if view.device_type.is_mos() {
            match mode {
                ConductMode::Leak => Some(GateState::On),
                ConductMode::Gated => gate_states.and_then(|states| states[device.as_usize()]),
            }
        } else {
            None
        };
        let edges = conduction_edges(view.device_type, view.terminals, view.profile.resistance, mos_state);
        for (updated, driver, edge_resistance) in edges {
            let updated = connectivity.equivalent_net(updated);
            let driver = connectivity.equivalent_net(driver);
            if updated == driver {
                continue;
            }
            let candidate = voltage[driver.as_usize()];
            if !candidate.is_known() {
                continue;
            }
            let current = voltage[updated.as_usize()];
            let should_install = !current.is_known() || direction.improves(current, candidate);
            if !should_install {
                continue;
            }
            voltage[updated.as_usize()] = candidate;
            net_map.install(updated, driver, edge_resistance);
            updates += 1;
            let accumulated = net_map.resistance(updated);
            for next_device in connectivity.all_devices(updated) {
                queue.push(next_device, accumulated);
            }
        }
    }
    log::debug!("{label} pass: {processed} events processed, {updates} bounds tightened");
    let _ = writeln!(sinks.report, "! {label} pass complete: {processed} events, {updates} updates");
    false
}

/// The first sim pass: establishes a sim voltage (once only, per net) and
/// the per-device gate-conduction verdict that the post-sim min/max passes
/// and the rule checker both read.
#[allow(clippy::too_many_arguments)]
fn sim_pass(
    elaboration: &Elaboration,
    library: &CircuitLibrary,
    linked: &LinkedModels,
    connectivity: &ConnectivityIndex,
    sim_voltage: &mut [Voltage],
    sim_net: &mut VirtualNetMap,
    gate_states: &mut [Option<GateState>],
    mut queue: EventQueue,
    sinks: &mut Sinks,
    interrupted: &AtomicBool,
) -> bool {
    let mut processed = 0u64;
    let mut updates = 0u64;
    loop {
        if interrupted.load(Ordering::Relaxed) {
            log::warn!("sim pass cancelled after {processed} events");
            return true;
        }
        let Some((device, _resistance)) = queue.pop() else { break };
        processed += 1;
        let view = device_view(elaboration, library, linked, device);

        let mos_state = if view.device_type.is_mos() {
            let Terminals::Mos { gate, source, drain, .. } = view.terminals else { unreachable!() };
            let gate = connectivity.equivalent_net(gate);
            let source = connectivity.equivalent_net(source);
            let drain = connectivity.equivalent_net(drain);
            let state = mos_gate_state(
                view.device_type.is_nmos_family(),
                sim_voltage[gate.as_usize()],
                sim_voltage[source.as_usize()],
                sim_voltage[drain.as_usize()],
                view.profile.vth,
            );
            gate_states[device.as_usize()] = Some(state);
            Some(state)
        } else {
            None
        };

        let edges = conduction_edges(view.device_type, view.terminals, view.profile.resistance, mos_state);
        for (updated, driver, edge_resistance) in edges {
            let updated = connectivity.equivalent_net(updated);
            let driver = connectivity.equivalent_net(driver);
            if updated == driver || sim_voltage[updated.as_usize()].is_known() {
                continue;
            }
            let candidate = sim_voltage[driver.as_usize()];
            if !candidate.is_known() {
                continue;
            }
            sim_voltage[updated.as_usize()] = candidate;
            sim_net.install(updated, driver, edge_resistance);
            updates += 1;
            let accumulated = sim_net.resistance(updated);
            for next_device in connectivity.all_devices(updated) {
                queue.push(next_device, accumulated);
            }
        }
    }
    log::debug!("sim pass: {processed} events processed, {updates} nets committed");
    let _ = writeln!(sinks.report, "! sim pass complete: {processed} events, {updates} updates");
    false
}

/// Pass 5: re-walk only devices known (from the sim pass) to conduct, to
/// tighten `sim_net`'s accumulated resistance figures for error-magnitude
/// estimates, independent of the arrival order the main sim pass saw.
fn resistance_refinement(
    elaboration: &Elaboration,
    library: &CircuitLibrary,
    linked: &LinkedModels,
    connectivity: &ConnectivityIndex,
    sim_voltage: &[Voltage],
    gate_states: &[Option<GateState>],
    sim_net: &mut VirtualNetMap,
) {
    let mut queue = EventQueue::new();
    for index in 0..sim_voltage.len() {
        let net = NetId::new(index as u32);
        if sim_voltage[index].is_known() && !sim_net.has_edge(net) {
            for device in connectivity.all_devices(net) {
                queue.push(device, Resistance::ZERO);
            }
        }
    }
    while let Some((device, _)) = queue.pop() {
        let view = device_view(elaboration, library, linked, device);
        let mos_state = if view.device_type.is_mos() { gate_states[device.as_usize()] } else { None };
        let edges = conduction_edges(view.device_type, view.terminals, view.profile.resistance, mos_state);
        for (updated, driver, edge_resistance) in edges {
            let updated = connectivity.equivalent_net(updated);
            let driver = connectivity.equivalent_net(driver);
            if updated == driver || !sim_voltage[driver.as_usize()].is_known() {
                continue;
            }
            let candidate_resistance = edge_resistance.saturating_add(sim_net.resistance(driver));
            let improves = !sim_net.has_edge(updated) || candidate_resistance < sim_net.resistance(updated);
            if improves {
                sim_net.install(updated, driver, edge_resistance);
                for next_device in connectivity.all_devices(updated) {
                    queue.push(next_device, sim_net.resistance(updated));
                }
            }
        }
    }
}

#[allow(unused)]
fn device_id_of(_: DeviceId) {}

#[cfg(test)]
mod tests {
    use super::*;
    use levelcheck_circuit::{Circuit, Device, SubcircuitInstance};
    use levelcheck_core::{DeviceType, FamilyId, Interner};
    use levelcheck_elaborate::Elaborator;
    use levelcheck_model::model::Model as ModelType;
    use levelcheck_model::VoltageLimit;
    use levelcheck_power::{PowerDeclaration, SignalPattern, VoltageRef};

    fn inverter_setup() -> (
        Elaboration,
        CircuitLibrary,
        LinkedModels,
        ConnectivityIndex,
        PowerSpec,
        Interner,
    ) {
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
        let ta = top.get_or_create_signal(inp);
        let tz = top.get_or_create_signal(out);
        let x1 = interner.intern("X1");
        top.add_instance(SubcircuitInstance::new(x1, inv_name, vec![tvdd, tgnd, ta, tz])).unwrap();
        lib.register_circuit(top).unwrap();

        let mut models = ModelLibrary::new();
        let mut pmos_model = ModelType::new(DeviceType::Pmos, "pmos");
        pmos_model.max_vgs = VoltageLimit::new("1.5", Voltage::from_volts(1.5));
        pmos_model.vth = Some(Voltage::from_volts(0.4));
        models.add_model("PMOD", pmos_model);
        let mut nmos_model = ModelType::new(DeviceType::Nmos, "nmos");
        nmos_model.max_vgs = VoltageLimit::new("1.5", Voltage::from_volts(1.5));
        nmos_model.vth = Some(Voltage::from_volts(0.4));
        models.add_model("NMOD", nmos_model);

        let elaboration = Elaborator::elaborate(&lib, top_name, &levelcheck_core::RunOptions::default()).unwrap();
        let linked = LinkedModels::link(&lib, &models, &interner);
        let connectivity = ConnectivityIndex::build(&elaboration, &lib, &linked);

        let mut power = PowerSpec::new();
        power.push(
            PowerDeclaration::new(SignalPattern::new("VDD"), FamilyId::new(0))
                .with_min(VoltageRef::literal(1.2))
                .with_sim(VoltageRef::literal(1.2))
                .with_max(VoltageRef::literal(1.2)),
        );
        power.push(
            PowerDeclaration::new(SignalPattern::new("GND"), FamilyId::new(1))
                .with_min(VoltageRef::literal(0.0))
                .with_sim(VoltageRef::literal(0.0))
                .with_max(VoltageRef::literal(0.0)),
        );
        power.push(
            PowerDeclaration::new(SignalPattern::new("A"), FamilyId::new(2)).with_sim(VoltageRef::literal(0.0)),
        );

        (elaboration, lib, linked, connectivity, power, interner)
    }

    #[test]
    fn inverter_pulls_output_high_when_input_is_low() {
        let (elaboration, lib, linked, connectivity, power, interner) = inverter_setup();
        let mut sinks = Sinks::null();
        let state = PropagationEngine::run(&elaboration, &lib, &ModelLibrary::new(), &linked, &connectivity, &power, &interner, &mut sinks);

        let top = elaboration.instance(elaboration.top);
        let out_net = top.local_to_global_net[3];
        let out_net = connectivity.equivalent_net(out_net);
        assert_eq!(state.sim(out_net), Voltage::from_volts(1.2));
        assert!(!state.cancelled);
    }

    #[test]
    fn voltage_order_holds_everywhere_after_propagation() {
        let (elaboration, lib, linked, connectivity, power, interner) = inverter_setup();
        let mut sinks = Sinks::null();
        let state = PropagationEngine::run(&elaboration, &lib, &ModelLibrary::new(), &linked, &connectivity, &power, &interner, &mut sinks);
        for index in 0..elaboration.net_count() {
            assert!(state.voltage_order_holds(NetId::new(index as u32)));
        }
    }

    #[test]
    fn cancellation_flag_stops_a_pass_early() {
        let (elaboration, lib, linked, connectivity, power, interner) = inverter_setup();
        let mut sinks = Sinks::null();
        let interrupted = AtomicBool::new(true);
        let state = PropagationEngine::run_cancellable(
            &elaboration, &lib, &linked, &connectivity, &power, &interner, &mut sinks, &interrupted,
        );
        assert!(state.cancelled);
    }
}
