//! The read-only bundle every checker in [`crate::checks`] walks: the
//! elaborated hierarchy, linked device models, connectivity index, power
//! spec, propagated voltage state, and the tunable thresholds from
//! [`RunOptions`]. Rule checking never mutates any of this (distilled spec
//! §3: "rule checking is read-only").

use levelcheck_circuit::CircuitLibrary;
use levelcheck_core::{CircuitId, DeviceId, Interner, NetId, RunOptions};
use levelcheck_elaborate::Elaboration;
use levelcheck_netgraph::{device_view, net_name, ConnectivityIndex, DeviceView, LinkedModels};
use levelcheck_power::PowerSpec;
use levelcheck_propagate::PropagationState;

pub struct CheckContext<'a> {
    pub elaboration: &'a Elaboration,
    pub library: &'a CircuitLibrary,
    pub linked: &'a LinkedModels,
    pub connectivity: &'a ConnectivityIndex,
    pub power: &'a PowerSpec,
    pub state: &'a PropagationState,
    pub interner: &'a Interner,
    pub options: &'a RunOptions,
}

impl<'a> CheckContext<'a> {
    pub fn view(&self, device: DeviceId) -> DeviceView<'a> {
        device_view(self.elaboration, self.library, self.linked, device)
    }

    pub fn equiv(&self, net: NetId) -> NetId {
        self.connectivity.equivalent_net(net)
    }

    /// The leaf signal name a net was declared under, for power-pattern
    /// matching and diagnostics.
    pub fn net_signal(&self, net: NetId) -> &'a str {
        let name = net_name(self.elaboration, self.library, net);
        self.interner.resolve(name)
    }

    pub fn device_name(&self, device: DeviceId) -> &'a str {
        self.interner.resolve(self.view(device).name)
    }

    pub fn are_relatives(&self, a: NetId, b: NetId) -> bool {
        self.power.are_relatives(self.net_signal(a), self.net_signal(b))
    }

    /// The subcircuit a device was instantiated from, for per-subcircuit
    /// error-count summaries.
    pub fn device_circuit(&self, device: DeviceId) -> CircuitId {
        let instance_id = self.elaboration.device_parent(device);
        self.elaboration.instance(instance_id).master
    }

    /// The subcircuit that owns `net`, for findings that implicate a net
    /// rather than a device (the expected-voltage checker).
    pub fn net_circuit(&self, net: NetId) -> CircuitId {
        let instance_id = self.elaboration.net_parent(net);
        self.elaboration.instance(instance_id).master
    }

    pub fn circuit_name(&self, circuit: CircuitId) -> &'a str {
        let name = self.library.circuit_by_id(circuit).expect("valid circuit id").name;
        self.interner.resolve(name)
    }

    /// One connection-snapshot line for `device`, of the form
    /// `M1 (NMOS): D=OUT@1.200 G=IN@0.000 S=GND@0.000 B=GND@0.000`.
    pub fn snapshot(&self, device: DeviceId) -> String {
        let view = self.view(device);
        let name = self.interner.resolve(view.name);
        match view.terminals {
            levelcheck_netgraph::Terminals::Mos { drain, gate, source, bulk } => format!(
                "{name} ({:?}): D={}@{} G={}@{} S={}@{} B={}@{}",
                view.device_type,
                self.net_signal(drain),
                self.state.sim(self.equiv(drain)),
                self.net_signal(gate),
                self.state.sim(self.equiv(gate)),
                self.net_signal(source),
                self.state.sim(self.equiv(source)),
                self.net_signal(bulk),
                self.state.sim(self.equiv(bulk)),
            ),
            levelcheck_netgraph::Terminals::TwoTerminal { a, b } => format!(
                "{name} ({:?}): A={}@{} B={}@{}",
                view.device_type,
                self.net_signal(a),
                self.state.sim(self.equiv(a)),
                self.net_signal(b),
                self.state.sim(self.equiv(b)),
            ),
        }
    }
}
