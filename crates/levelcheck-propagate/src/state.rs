//! The mutable state touched by a propagation run: per-net min/sim/max
//! voltages (committed and leak variants), the five virtual-net maps (C7),
//! the capacitor-pumped flag used by the Vds pumping-capacitor exemption,
//! and the per-device conduction verdict the first sim pass establishes.

use levelcheck_core::{DeviceId, NetId, Voltage};
use levelcheck_netgraph::VirtualNetMap;

use crate::gate_state::GateState;

/// All state a propagation pass reads or mutates, for one elaborated
/// netlist. Read-only once [`crate::engine::PropagationEngine::run`]
/// returns (distilled spec §3: "mutate only during propagation").
pub struct PropagationState {
    pub min_voltage: Vec<Voltage>,
    pub max_voltage: Vec<Voltage>,
    pub sim_voltage: Vec<Voltage>,
    pub min_leak_voltage: Vec<Voltage>,
    pub max_leak_voltage: Vec<Voltage>,

    /// Set for a net that sits on both terminals of a capacitor that swings
    /// together (the pumping-capacitor exemption input, distilled spec
    /// §4.6).
    pub pumped: Vec<bool>,

    pub min_net: VirtualNetMap,
    pub max_net: VirtualNetMap,
    pub sim_net: VirtualNetMap,
    pub min_leak_net: VirtualNetMap,
    pub max_leak_net: VirtualNetMap,

    /// The first-sim-pass verdict for every MOS/LDD device, `None` for
    /// device ids that are never evaluated as a channel (wrong type) or
    /// whose gate voltage never resolved enough to decide. The rule checker
    /// reads this to distinguish "device is definitely off" (no finding)
    /// from "device state unknown" (possible floating-gate finding).
    pub gate_states: Vec<Option<GateState>>,

    pub cancelled: bool,
}

impl PropagationState {
    pub fn new(net_count: usize, device_count: usize) -> Self {
        Self {
            min_voltage: vec![Voltage::UNKNOWN; net_count],
            max_voltage: vec![Voltage::UNKNOWN; net_count],
            sim_voltage: vec![Voltage::UNKNOWN; net_count],
            min_leak_voltage: vec![Voltage::UNKNOWN; net_count],
            max_leak_voltage: vec![Voltage::UNKNOWN; net_count],
            pumped: vec![false; net_count],
            min_net: VirtualNetMap::new(net_count),
            max_net: VirtualNetMap::new(net_count),
            sim_net: VirtualNetMap::new(net_count),
            min_leak_net: VirtualNetMap::new(net_count),
            max_leak_net: VirtualNetMap::new(net_count),
            gate_states: vec![None; device_count],
            cancelled: false,
        }
    }

    pub fn min(&self, net: NetId) -> Voltage {
        self.min_voltage[net.as_usize()]
    }

    pub fn max(&self, net: NetId) -> Voltage {
        self.max_voltage[net.as_usize()]
    }

    pub fn sim(&self, net: NetId) -> Voltage {
        self.sim_voltage[net.as_usize()]
    }

    pub fn min_leak(&self, net: NetId) -> Voltage {
        self.min_leak_voltage[net.as_usize()]
    }

    pub fn max_leak(&self, net: NetId) -> Voltage {
        self.max_leak_voltage[net.as_usize()]
    }

    pub fn gate_state(&self, device: DeviceId) -> Option<GateState> {
        self.gate_states[device.as_usize()]
    }

    /// `Voltage ordering` invariant check (distilled spec §8): true unless
    /// min/sim/max are all known and out of order.
    pub fn voltage_order_holds(&self, net: NetId) -> bool {
        let (min, sim, max) = (self.min(net), self.sim(net), self.max(net));
        if min.is_known() && sim.is_known() && max.is_known() {
            min <= sim && sim <= max
        } else {
            true
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_state_is_all_unknown() {
        let state = PropagationState::new(3, 1);
        assert!(!state.min(NetId::new(0)).is_known());
        assert!(!state.pumped[0]);
        assert!(state.gate_state(DeviceId::new(0)).is_none());
    }

    #[test]
    fn voltage_order_holds_trivially_when_partially_known() {
        let mut state = PropagationState::new(1, 0);
        state.min_voltage[0] = Voltage::from_volts(0.0);
        assert!(state.voltage_order_holds(NetId::new(0)));
    }

    #[test]
    fn voltage_order_violation_is_detected() {
        let mut state = PropagationState::new(1, 0);
        state.min_voltage[0] = Voltage::from_volts(1.0);
        state.sim_voltage[0] = Voltage::from_volts(0.5);
        state.max_voltage[0] = Voltage::from_volts(2.0);
        assert!(!state.voltage_order_holds(NetId::new(0)));
    }
}
