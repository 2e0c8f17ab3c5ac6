//! Per-device-type propagation rules (distilled spec §4.5): which terminal
//! pairs conduct, and in which direction, for a given device and pass mode.

use levelcheck_core::{DeviceType, NetId, Resistance};
use levelcheck_netgraph::Terminals;

use crate::gate_state::GateState;

/// Whether the current pass evaluates MOS conduction optimistically (every
/// device that *could* conduct, for the leak passes) or against the
/// already-known sim state (for the post-sim min/max passes and the sim
/// pass itself).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConductMode {
    /// Min-leak/max-leak passes: a MOS/LDD channel always conducts,
    /// regardless of gate voltage (distilled spec: "propagate bounds
    /// through every conducting device, not only always-on").
    Leak,
    /// First-sim and post-sim min/max passes: a MOS/LDD channel conducts
    /// only when [`crate::gate_state::mos_gate_state`] resolves to `On`.
    Gated,
}

/// The conduction edges for one device, given its resolved terminals and
/// whether (for MOS/LDD) the channel is currently conducting. Two-terminal
/// device types never consult `mos_state` (it's `None` for them).
pub fn conduction_edges(
    device_type: DeviceType,
    terminals: Terminals,
    resistance: Resistance,
    mos_state: Option<GateState>,
) -> Vec<(NetId, NetId, Resistance)> {
    match (device_type, terminals) {
        (DeviceType::Resistor, Terminals::TwoTerminal { a, b })
        | (DeviceType::SwitchOn, Terminals::TwoTerminal { a, b })
        | (DeviceType::FuseOn, Terminals::TwoTerminal { a, b }) => {
            vec![(a, b, resistance), (b, a, resistance)]
        }
        (DeviceType::SwitchOff, _) | (DeviceType::FuseOff, _) | (DeviceType::Capacitor, _) => {
            Vec::new()
        }
        // Diode terminals are modeled anode=a, cathode=b (distilled spec
        // §3); forward conduction only, anode drives cathode.
        (DeviceType::Diode, Terminals::TwoTerminal { a, b }) => vec![(b, a, Resistance::ZERO)],
        (DeviceType::Nmos, Terminals::Mos { drain, source, .. })
        | (DeviceType::Pmos, Terminals::Mos { drain, source, .. })
        | (DeviceType::Lddn, Terminals::Mos { drain, source, .. })
        | (DeviceType::Lddp, Terminals::Mos { drain, source, .. }) => {
            if mos_state == Some(GateState::On) {
                vec![(drain, source, resistance), (source, drain, resistance)]
            } else {
                Vec::new()
            }
        }
        (DeviceType::Subcircuit, _) => Vec::new(),
        _ => Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resistor_conducts_both_directions() {
        let edges = conduction_edges(
            DeviceType::Resistor,
            Terminals::TwoTerminal { a: NetId::new(0), b: NetId::new(1) },
            Resistance(100.0),
            None,
        );
        assert_eq!(edges.len(), 2);
        assert!(edges.contains(&(NetId::new(0), NetId::new(1), Resistance(100.0))));
        assert!(edges.contains(&(NetId::new(1), NetId::new(0), Resistance(100.0))));
    }

    #[test]
    fn fuse_off_never_conducts() {
        let edges = conduction_edges(
            DeviceType::FuseOff,
            Terminals::TwoTerminal { a: NetId::new(0), b: NetId::new(1) },
            Resistance::ZERO,
            None,
        );
        assert!(edges.is_empty());
    }

    #[test]
    fn diode_is_one_way_anode_to_cathode() {
        let edges = conduction_edges(
            DeviceType::Diode,
            Terminals::TwoTerminal { a: NetId::new(0), b: NetId::new(1) },
            Resistance::ZERO,
            None,
        );
        assert_eq!(edges, vec![(NetId::new(1), NetId::new(0), Resistance::ZERO)]);
    }

    #[test]
    fn mos_conducts_only_when_gate_state_on() {
        let terminals = Terminals::Mos {
            drain: NetId::new(0),
            gate: NetId::new(1),
            source: NetId::new(2),
            bulk: NetId::new(3),
        };
        let off = conduction_edges(DeviceType::Nmos, terminals, Resistance(50.0), Some(GateState::Off));
        assert!(off.is_empty());
        let on = conduction_edges(DeviceType::Nmos, terminals, Resistance(50.0), Some(GateState::On));
        assert_eq!(on.len(), 2);
    }
}
