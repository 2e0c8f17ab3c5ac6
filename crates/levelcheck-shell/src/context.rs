//! The read-only pipeline bundle the shell queries, plus the shell's own
//! mutable navigation and display state (current instance, hierarchy
//! delimiter, search limit, name-display toggle). Modeled directly on
//! [`levelcheck_check::CheckContext`], which bundles the same five
//! structures for the rule checker; the shell adds the bits a human
//! operator needs that a checker never does.

use levelcheck_circuit::CircuitLibrary;
use levelcheck_core::{CircuitId, DeviceId, InstanceId, Interner, NetId, RunOptions, Stage, TextId};
use levelcheck_elaborate::Elaboration;
use levelcheck_model::ModelLibrary;
use levelcheck_netgraph::{device_view, net_name, ConnectivityIndex, DeviceView, LinkedModels, Terminals};
use levelcheck_power::PowerSpec;
use levelcheck_propagate::PropagationState;

use crate::error::{OperatorError, Result};

pub struct ShellContext<'a> {
    pub elaboration: &'a Elaboration,
    pub library: &'a CircuitLibrary,
    pub models: &'a ModelLibrary,
    pub linked: &'a LinkedModels,
    pub connectivity: &'a ConnectivityIndex,
    pub power: &'a PowerSpec,
    pub state: Option<&'a PropagationState>,
    pub interner: &'a Interner,
    pub options: &'a RunOptions,
    pub stage: Stage,

    pub current: InstanceId,
    pub delimiter: String,
    /// Maximum number of matches `findsubcircuit`/`findnet` report; `0` is
    /// unlimited.
    pub search_limit: u32,
    /// Whether net/device listings show the interned leaf name alongside
    /// the numeric id (`togglename`).
    pub show_names: bool,
}

impl<'a> ShellContext<'a> {
    pub fn new(
        elaboration: &'a Elaboration,
        library: &'a CircuitLibrary,
        models: &'a ModelLibrary,
        linked: &'a LinkedModels,
        connectivity: &'a ConnectivityIndex,
        power: &'a PowerSpec,
        state: Option<&'a PropagationState>,
        interner: &'a Interner,
        options: &'a RunOptions,
        stage: Stage,
    ) -> Self {
        Self {
            elaboration,
            library,
            models,
            linked,
            connectivity,
            power,
            state,
            interner,
            options,
            stage,
            current: elaboration.top,
            delimiter: "/".to_string(),
            search_limit: 20,
            show_names: true,
        }
    }

    pub fn resolve_name(&self, id: TextId) -> &'a str {
        self.interner.resolve(id)
    }

    pub fn view(&self, device: DeviceId) -> DeviceView<'a> {
        device_view(self.elaboration, self.library, self.linked, device)
    }

    pub fn net_signal(&self, net: NetId) -> &'a str {
        let name = net_name(self.elaboration, self.library, net);
        self.interner.resolve(name)
    }

    pub fn device_name(&self, device: DeviceId) -> &'a str {
        self.interner.resolve(self.view(device).name)
    }

    pub fn circuit_name(&self, circuit: CircuitId) -> &'a str {
        let name = self.library.circuit_by_id(circuit).expect("valid circuit id").name;
        self.interner.resolve(name)
    }

    /// The declared name of a non-top instance: the name its parent's
    /// subcircuit-instance line gave it. Every child's position in
    /// `parent.children` lines up with its position in the parent master
    /// circuit's `instances()` list (both built in the same declaration
    /// order during elaboration).
    pub fn instance_label(&self, id: InstanceId) -> TextId {
        if id == self.elaboration.top {
            return self.circuit_of(id);
        }
        let parent_id = self.elaboration.instance(id).parent;
        let parent = self.elaboration.instance(parent_id);
        let index = parent
            .children
            .iter()
            .position(|&child| child == id)
            .expect("every non-top instance is some parent's child");
        let parent_circuit = self.library.circuit_by_id(parent.master).expect("valid circuit id");
        parent_circuit.instances()[index].name
    }

    fn circuit_of(&self, id: InstanceId) -> TextId {
        self.library.circuit_by_id(self.elaboration.instance(id).master).expect("valid circuit id").name
    }

    /// The full hierarchy path to `id`, root first, joined by `delimiter`.
    pub fn full_path(&self, id: InstanceId) -> String {
        let mut labels = Vec::new();
        let mut cursor = id;
        loop {
            labels.push(self.interner.resolve(self.instance_label(cursor)).to_string());
            if cursor == self.elaboration.top {
                break;
            }
            cursor = self.elaboration.instance(cursor).parent;
        }
        labels.reverse();
        labels.join(&self.delimiter)
    }

    /// Resolve one path segment against `parent`'s children: exact label
    /// match first, then the first case-insensitive prefix match (the
    /// original tool's abbreviated-name navigation convenience).
    pub fn child_by_name(&self, parent: InstanceId, name: &str) -> Option<InstanceId> {
        let children = &self.elaboration.instance(parent).children;
        if let Some(&exact) = children.iter().find(|&&c| self.interner.resolve(self.instance_label(c)) == name) {
            return Some(exact);
        }
        let lower = name.to_ascii_lowercase();
        children
            .iter()
            .copied()
            .find(|&c| self.interner.resolve(self.instance_label(c)).to_ascii_lowercase().starts_with(&lower))
    }

    /// Resolve a `goto`/`cd`-style path: `..` walks to the parent, a
    /// leading delimiter starts from the top instance, anything else
    /// resolves relative to `self.current`.
    pub fn resolve_path(&self, path: &str) -> Result<InstanceId> {
        if path.is_empty() {
            return Ok(self.current);
        }
        let mut cursor = if path.starts_with(&self.delimiter) { self.elaboration.top } else { self.current };
        for segment in path.split(&self.delimiter as &str) {
            if segment.is_empty() {
                continue;
            }
            if segment == ".." {
                if cursor != self.elaboration.top {
                    cursor = self.elaboration.instance(cursor).parent;
                }
                continue;
            }
            cursor = self
                .child_by_name(cursor, segment)
                .ok_or_else(|| OperatorError::NotFound(segment.to_string()))?;
        }
        Ok(cursor)
    }

    /// One connection-snapshot line for `device`: `M1 (NMOS): D=OUT@1.200
    /// G=IN@0.000 S=GND@0.000 B=GND@0.000`, or just terminal names when no
    /// propagation state is available yet.
    pub fn snapshot(&self, device: DeviceId) -> String {
        let view = self.view(device);
        let name = self.interner.resolve(view.name);
        let volt = |net: NetId| match self.state {
            Some(state) => format!("{}@{}", self.net_signal(net), state.sim(self.equiv(net))),
            None => self.net_signal(net).to_string(),
        };
        match view.terminals {
            Terminals::Mos { drain, gate, source, bulk } => {
                format!("{name} ({:?}): D={} G={} S={} B={}", view.device_type, volt(drain), volt(gate), volt(source), volt(bulk))
            }
            Terminals::TwoTerminal { a, b } => {
                format!("{name} ({:?}): A={} B={}", view.device_type, volt(a), volt(b))
            }
        }
    }

    pub fn equiv(&self, net: NetId) -> NetId {
        self.connectivity.equivalent_net(net)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use levelcheck_circuit::{Circuit, Device, SubcircuitInstance};
    use levelcheck_core::{DeviceType, RunOptions};
    use levelcheck_elaborate::Elaborator;

    fn fixture() -> (CircuitLibrary, Interner, TextId) {
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
    fn goto_resolves_a_child_instance_by_name() {
        let (lib, interner, top_name) = fixture();
        let options = RunOptions::default();
        let elaboration = Elaborator::elaborate(&lib, top_name, &options).unwrap();
        let models = ModelLibrary::new();
        let linked = LinkedModels::link(&lib, &models, &interner);
        let connectivity = ConnectivityIndex::build(&elaboration, &lib, &linked);
        let power = PowerSpec::new();
        let ctx = ShellContext::new(
            &elaboration, &lib, &models, &linked, &connectivity, &power, None, &interner, &options,
            Stage::Start,
        );

        let child = ctx.resolve_path("X1").unwrap();
        assert_ne!(child, elaboration.top);
        assert_eq!(ctx.full_path(child), "TOP/X1");
    }

    #[test]
    fn goto_unknown_child_reports_not_found() {
        let (lib, interner, top_name) = fixture();
        let options = RunOptions::default();
        let elaboration = Elaborator::elaborate(&lib, top_name, &options).unwrap();
        let models = ModelLibrary::new();
        let linked = LinkedModels::link(&lib, &models, &interner);
        let connectivity = ConnectivityIndex::build(&elaboration, &lib, &linked);
        let power = PowerSpec::new();
        let ctx = ShellContext::new(
            &elaboration, &lib, &models, &linked, &connectivity, &power, None, &interner, &options,
            Stage::Start,
        );

        let err = ctx.resolve_path("NOSUCH").unwrap_err();
        assert_eq!(err, OperatorError::NotFound("NOSUCH".to_string()));
    }

    #[test]
    fn dotdot_from_top_stays_at_top() {
        let (lib, interner, top_name) = fixture();
        let options = RunOptions::default();
        let elaboration = Elaborator::elaborate(&lib, top_name, &options).unwrap();
        let models = ModelLibrary::new();
        let linked = LinkedModels::link(&lib, &models, &interner);
        let connectivity = ConnectivityIndex::build(&elaboration, &lib, &linked);
        let power = PowerSpec::new();
        let ctx = ShellContext::new(
            &elaboration, &lib, &models, &linked, &connectivity, &power, None, &interner, &options,
            Stage::Start,
        );

        assert_eq!(ctx.resolve_path("..").unwrap(), elaboration.top);
    }
}
