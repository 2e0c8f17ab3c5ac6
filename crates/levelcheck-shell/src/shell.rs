//! The interactive operator loop (C11): reads a [`Command`] from an
//! [`InputStack`], dispatches it against a [`ShellContext`], and reports an
//! [`Outcome`] back to the CLI driver that owns the pipeline's lifecycle.
//! Navigation and query commands never leave this module; only
//! pipeline-mutating commands produce anything other than
//! [`Outcome::Continue`].

use std::fs;
use std::io;

use levelcheck_core::{DeviceId, InstanceId, NetId};
use levelcheck_netgraph::{iter_devices, Terminals};

use crate::command::{self, Command};
use crate::context::ShellContext;
use crate::error::{OperatorError, Result};
use crate::input::InputStack;
use crate::outcome::{Outcome, ReloadKind};

/// Ties the input stack, a [`ShellContext`], and command dispatch into one
/// read-eval-report loop.
pub struct Shell<'a> {
    pub input: InputStack,
    pub ctx: ShellContext<'a>,
    pub prompt: String,
    /// Destination for `debug`'s configuration/netlist/power-snapshot
    /// triple; discarded by default, pointed at a real file by the CLI
    /// driver via [`Shell::set_debug_sink`].
    pub debug: Box<dyn io::Write>,
}

impl<'a> Shell<'a> {
    pub fn new(input: InputStack, ctx: ShellContext<'a>) -> Self {
        Self { input, ctx, prompt: "levelcheck> ".to_string(), debug: Box::new(io::sink()) }
    }

    /// Point the `debug` command's output at a real sink (the CLI driver
    /// hands this the pipeline's `Sinks::debug` writer).
    pub fn set_debug_sink(&mut self, debug: Box<dyn io::Write>) {
        self.debug = debug;
    }

    /// Drive the loop until input runs out, `quit` is typed, or a command
    /// reports an [`Outcome`] the caller must act on (anything but
    /// `Continue`). Every line's report/error text goes to `report_out`.
    pub fn run(&mut self, report_out: &mut dyn std::io::Write) -> Outcome {
        loop {
            let prompt = self.prompt.clone();
            let Some(line) = self.input.next_line(&prompt) else {
                return Outcome::Quit;
            };
            match self.execute_line(&line, report_out) {
                Outcome::Continue => continue,
                other => return other,
            }
        }
    }

    /// Parse and dispatch one line, reporting any error to `out` and
    /// returning `Outcome::Continue` rather than propagating it (matching
    /// the original tool's "bad command, try again" loop).
    pub fn execute_line(&mut self, line: &str, out: &mut dyn std::io::Write) -> Outcome {
        let parsed = match command::parse(line) {
            Ok(parsed) => parsed,
            Err(err) => {
                let _ = writeln!(out, "{err}");
                return Outcome::Continue;
            }
        };
        let Some(cmd) = parsed else {
            return Outcome::Continue;
        };
        match self.dispatch(cmd, out) {
            Ok(outcome) => outcome,
            Err(err) => {
                let _ = writeln!(out, "{err}");
                Outcome::Continue
            }
        }
    }

    fn dispatch(&mut self, cmd: Command, out: &mut dyn std::io::Write) -> Result<Outcome> {
        let required = cmd.minimum_stage();
        if !self.ctx.stage.at_least(required) {
            return Err(OperatorError::StageTooEarly {
                command: cmd.verb().to_string(),
                required,
                current: self.ctx.stage,
            });
        }

        match cmd {
            Command::FindSubcircuit(pattern) => self.find_subcircuit(&pattern, out),
            Command::FindNet(pattern) => self.find_net(&pattern, out),
            Command::Goto(path) => self.goto(&path, out),
            Command::CurrentHierarchy => {
                writeln!(out, "{}", self.ctx.full_path(self.ctx.current)).ok();
                Ok(Outcome::Continue)
            }
            Command::PrintHierarchy => self.print_hierarchy(out),
            Command::PrintDevice(name) => self.print_device(&name, out),
            Command::PrintNet(name) => self.print_net(&name, out),
            Command::ListNet(filter) => self.list_net(filter.as_deref(), out),
            Command::ListDevice(filter) => self.list_device(filter.as_deref(), out),
            Command::ListInstance(filter) => self.list_instance(filter.as_deref(), out),
            Command::GetNet(name) => self.get_net(&name, out),
            Command::GetDevice(name) => self.get_device(&name, out),
            Command::GetInstance(name) => self.get_instance(&name, out),
            Command::ExpandNet(name) => self.expand_net(&name, out),
            Command::DumpFuse => self.dump_fuse(out),
            Command::DumpAnalogNets => self.dump_analog_nets(out),
            Command::DumpUnknownLogicalNets => self.dump_unknown_logical_nets(out),
            Command::TraceInverter(name) => self.trace_inverter(&name, out),
            Command::PrintCdl => self.print_cdl(out),
            Command::PrintEnvironment => self.print_environment(out),
            Command::ToggleName => {
                self.ctx.show_names = !self.ctx.show_names;
                writeln!(out, "names {}", if self.ctx.show_names { "on" } else { "off" }).ok();
                Ok(Outcome::Continue)
            }
            Command::SetPower(path) => Ok(Outcome::Reload { kind: ReloadKind::Power, path }),
            Command::SetModel(path) => Ok(Outcome::Reload { kind: ReloadKind::Model, path }),
            Command::SetFuse(path) => Ok(Outcome::Reload { kind: ReloadKind::Fuse, path }),
            Command::SearchLimit(value) => {
                match value {
                    Some(n) => self.ctx.search_limit = n,
                    None => {
                        writeln!(out, "{}", self.ctx.search_limit).ok();
                    }
                }
                Ok(Outcome::Continue)
            }
            Command::HierarchyDelimiter(value) => {
                match value {
                    Some(d) => self.ctx.delimiter = d,
                    None => {
                        writeln!(out, "{}", self.ctx.delimiter).ok();
                    }
                }
                Ok(Outcome::Continue)
            }
            Command::PrintPower(signal) => self.print_power(&signal, out),
            Command::PrintModel(key) => self.print_model(&key, out),
            Command::Source(path) => self.source(&path),
            Command::Debug(inst, cell) => self.debug(&inst, &cell),
            Command::NoError => Ok(Outcome::SuppressCurrentCategory),
            Command::Skip => Ok(Outcome::Skip),
            Command::Rerun => Ok(Outcome::Rerun),
            Command::Continue(n) => Ok(Outcome::Advance(n)),
            Command::Help => {
                self.print_help(out);
                Ok(Outcome::Continue)
            }
            Command::Quit => Ok(Outcome::Quit),
        }
    }

    fn goto(&mut self, path: &str, out: &mut dyn std::io::Write) -> Result<Outcome> {
        let target = self.ctx.resolve_path(path)?;
        self.ctx.current = target;
        writeln!(out, "{}", self.ctx.full_path(target)).ok();
        Ok(Outcome::Continue)
    }

    fn print_hierarchy(&self, out: &mut dyn std::io::Write) -> Result<Outcome> {
        self.print_hierarchy_from(self.ctx.current, 0, out);
        Ok(Outcome::Continue)
    }

    fn print_hierarchy_from(&self, id: levelcheck_core::InstanceId, depth: usize, out: &mut dyn std::io::Write) {
        let label = self.ctx.resolve_name(self.ctx.instance_label(id));
        writeln!(out, "{}{}", "  ".repeat(depth), label).ok();
        for &child in &self.ctx.elaboration.instance(id).children {
            self.print_hierarchy_from(child, depth + 1, out);
        }
    }

    /// Every net declared by the circuit template underlying `self.current`,
    /// matching the original tool's "list is local scope only" convention.
    fn local_nets(&self) -> Vec<NetId> {
        let instance = self.ctx.elaboration.instance(self.ctx.current);
        (0..instance.owned_net_count)
            .map(|offset| NetId::new(instance.first_net.as_u32() + offset))
            .collect()
    }

    fn local_devices(&self) -> Vec<DeviceId> {
        let instance = self.ctx.elaboration.instance(self.ctx.current);
        if instance.is_parallel_duplicate() {
            return Vec::new();
        }
        let circuit = self.ctx.library.circuit_by_id(instance.master).expect("valid circuit id");
        (0..circuit.device_count() as u32)
            .map(|offset| DeviceId::new(instance.first_device.as_u32() + offset))
            .collect()
    }

    fn list_net(&self, filter: Option<&str>, out: &mut dyn std::io::Write) -> Result<Outcome> {
        for net in self.local_nets() {
            let name = self.ctx.net_signal(net);
            if filter.is_none_or(|f| name.contains(f)) {
                writeln!(out, "{name}").ok();
            }
        }
        Ok(Outcome::Continue)
    }

    fn list_device(&self, filter: Option<&str>, out: &mut dyn std::io::Write) -> Result<Outcome> {
        for device in self.local_devices() {
            let name = self.ctx.device_name(device);
            if filter.is_none_or(|f| name.contains(f)) {
                writeln!(out, "{name}").ok();
            }
        }
        Ok(Outcome::Continue)
    }

    fn list_instance(&self, filter: Option<&str>, out: &mut dyn std::io::Write) -> Result<Outcome> {
        for &child in &self.ctx.elaboration.instance(self.ctx.current).children {
            let name = self.ctx.resolve_name(self.ctx.instance_label(child));
            if filter.is_none_or(|f| name.contains(f)) {
                writeln!(out, "{name}").ok();
            }
        }
        Ok(Outcome::Continue)
    }

    fn find_net(&self, pattern: &str, out: &mut dyn std::io::Write) -> Result<Outcome> {
        let mut found = 0u32;
        'search: for net_id in 0..self.ctx.elaboration.net_count() as u32 {
            let net = NetId::new(net_id);
            if self.ctx.net_signal(net).contains(pattern) {
                let owner = self.ctx.elaboration.net_parent(net);
                writeln!(out, "{} ({})", self.ctx.net_signal(net), self.ctx.full_path(owner)).ok();
                found += 1;
                if self.ctx.search_limit != 0 && found >= self.ctx.search_limit {
                    writeln!(out, "... search limit reached").ok();
                    break 'search;
                }
            }
        }
        Ok(Outcome::Continue)
    }

    fn find_subcircuit(&self, pattern: &str, out: &mut dyn std::io::Write) -> Result<Outcome> {
        let mut found = 0u32;
        for name in self.ctx.library.names() {
            let text = self.ctx.resolve_name(*name);
            if text.contains(pattern) {
                writeln!(out, "{text}").ok();
                found += 1;
                if self.ctx.search_limit != 0 && found >= self.ctx.search_limit {
                    writeln!(out, "... search limit reached").ok();
                    break;
                }
            }
        }
        Ok(Outcome::Continue)
    }

    fn get_net(&self, name: &str, out: &mut dyn std::io::Write) -> Result<Outcome> {
        let net = self.find_local_net(name).ok_or_else(|| OperatorError::NotFound(name.to_string()))?;
        writeln!(out, "{}", self.describe_net(net)).ok();
        Ok(Outcome::Continue)
    }

    fn print_net(&self, name: &str, out: &mut dyn std::io::Write) -> Result<Outcome> {
        let net = self.find_local_net(name).ok_or_else(|| OperatorError::NotFound(name.to_string()))?;
        writeln!(out, "{}", self.describe_net(net)).ok();
        let equiv = self.ctx.equiv(net);
        for &device in self.ctx.connectivity.gates(equiv) {
            writeln!(out, "  gate: {}", self.ctx.snapshot(device)).ok();
        }
        for &device in self.ctx.connectivity.sources(equiv) {
            writeln!(out, "  source: {}", self.ctx.snapshot(device)).ok();
        }
        for &device in self.ctx.connectivity.drains(equiv) {
            writeln!(out, "  drain: {}", self.ctx.snapshot(device)).ok();
        }
        for &device in self.ctx.connectivity.bulks(equiv) {
            writeln!(out, "  bulk: {}", self.ctx.snapshot(device)).ok();
        }
        Ok(Outcome::Continue)
    }

    fn describe_net(&self, net: NetId) -> String {
        let name = self.ctx.net_signal(net);
        match self.ctx.state {
            Some(state) => {
                let equiv = self.ctx.equiv(net);
                format!(
                    "{name}: min={} sim={} max={}",
                    state.min(equiv),
                    state.sim(equiv),
                    state.max(equiv)
                )
            }
            None => name.to_string(),
        }
    }

    fn find_local_net(&self, name: &str) -> Option<NetId> {
        self.local_nets().into_iter().find(|&net| self.ctx.net_signal(net) == name)
    }

    fn find_local_device(&self, name: &str) -> Option<DeviceId> {
        self.local_devices().into_iter().find(|&device| self.ctx.device_name(device) == name)
    }

    fn get_device(&self, name: &str, out: &mut dyn std::io::Write) -> Result<Outcome> {
        let device = self.find_local_device(name).ok_or_else(|| OperatorError::NotFound(name.to_string()))?;
        writeln!(out, "{}", self.ctx.snapshot(device)).ok();
        Ok(Outcome::Continue)
    }

    fn print_device(&self, name: &str, out: &mut dyn std::io::Write) -> Result<Outcome> {
        let device = self.find_local_device(name).ok_or_else(|| OperatorError::NotFound(name.to_string()))?;
        let view = self.ctx.view(device);
        writeln!(out, "{}", self.ctx.snapshot(device)).ok();
        writeln!(
            out,
            "  model: vth={:?} max_vds={} max_vgs={} max_vbs={} max_vbg={} matched={}",
            view.profile.vth,
            view.profile.max_vds,
            view.profile.max_vgs,
            view.profile.max_vbs,
            view.profile.max_vbg,
            view.profile.model_matched,
        )
        .ok();
        Ok(Outcome::Continue)
    }

    fn get_instance(&self, name: &str, out: &mut dyn std::io::Write) -> Result<Outcome> {
        let target = self.ctx.child_by_name(self.ctx.current, name).ok_or_else(|| OperatorError::NotFound(name.to_string()))?;
        writeln!(out, "{}", self.ctx.full_path(target)).ok();
        Ok(Outcome::Continue)
    }

    fn expand_net(&self, name: &str, out: &mut dyn std::io::Write) -> Result<Outcome> {
        let net = self.find_local_net(name).ok_or_else(|| OperatorError::NotFound(name.to_string()))?;
        let state = self.ctx.state.ok_or_else(|| OperatorError::Navigation("no propagation state yet".to_string()))?;
        for (label, map) in [
            ("min", &state.min_net),
            ("max", &state.max_net),
            ("sim", &state.sim_net),
            ("min_leak", &state.min_leak_net),
            ("max_leak", &state.max_leak_net),
        ] {
            let final_net = map.final_net(net);
            writeln!(
                out,
                "  {label}: -> {} (r={})",
                self.ctx.net_signal(final_net),
                map.resistance(net),
            )
            .ok();
        }
        Ok(Outcome::Continue)
    }

    fn dump_fuse(&self, out: &mut dyn std::io::Write) -> Result<Outcome> {
        for device in iter_devices(self.ctx.elaboration, self.ctx.library) {
            let view = self.ctx.view(device);
            if view.device_type.is_fuse() {
                writeln!(out, "{} ({:?})", self.ctx.resolve_name(view.name), view.device_type).ok();
            }
        }
        Ok(Outcome::Continue)
    }

    /// Nets whose committed bounds have resolved to a continuous range
    /// rather than a single rail level — the shell's heuristic for "this is
    /// an analog net", since the checker itself only ever asks "is this
    /// voltage in bounds", not "is this net digital".
    fn dump_analog_nets(&self, out: &mut dyn std::io::Write) -> Result<Outcome> {
        let state = self.ctx.state.ok_or_else(|| OperatorError::Navigation("no propagation state yet".to_string()))?;
        for net_id in 0..self.ctx.elaboration.net_count() as u32 {
            let net = NetId::new(net_id);
            let (min, max) = (state.min(net), state.max(net));
            if min.is_known() && max.is_known() && min != max {
                writeln!(out, "{} [{min}, {max}]", self.ctx.net_signal(net)).ok();
            }
        }
        Ok(Outcome::Continue)
    }

    /// Nets the sim pass never pinned to a committed value: the same
    /// condition the floating-input checker treats as "possibly
    /// high-impedance" (SPEC_FULL §4.6).
    fn dump_unknown_logical_nets(&self, out: &mut dyn std::io::Write) -> Result<Outcome> {
        let state = self.ctx.state.ok_or_else(|| OperatorError::Navigation("no propagation state yet".to_string()))?;
        for net_id in 0..self.ctx.elaboration.net_count() as u32 {
            let net = NetId::new(net_id);
            if !state.sim(net).is_known() {
                writeln!(out, "{}", self.ctx.net_signal(net)).ok();
            }
        }
        Ok(Outcome::Continue)
    }

    /// A coarse CMOS-inverter-pair heuristic: report a PMOS and NMOS in the
    /// current scope that share both gate and drain nets.
    fn trace_inverter(&self, name: &str, out: &mut dyn std::io::Write) -> Result<Outcome> {
        let net = self.find_local_net(name).ok_or_else(|| OperatorError::NotFound(name.to_string()))?;
        let equiv = self.ctx.equiv(net);
        let mut pmos = None;
        let mut nmos = None;
        for &device in self.ctx.connectivity.gates(equiv) {
            let view = self.ctx.view(device);
            match view.terminals {
                Terminals::Mos { .. } if view.device_type.is_pmos_family() => pmos = Some(device),
                Terminals::Mos { .. } if view.device_type.is_nmos_family() => nmos = Some(device),
                _ => {}
            }
        }
        match (pmos, nmos) {
            (Some(p), Some(n)) => {
                writeln!(out, "pull-up: {}", self.ctx.snapshot(p)).ok();
                writeln!(out, "pull-down: {}", self.ctx.snapshot(n)).ok();
            }
            _ => {
                writeln!(out, "no complementary inverter pair found at gate {name}").ok();
            }
        }
        Ok(Outcome::Continue)
    }

    fn print_cdl(&self, out: &mut dyn std::io::Write) -> Result<Outcome> {
        let instance = self.ctx.elaboration.instance(self.ctx.current);
        let circuit = self.ctx.library.circuit_by_id(instance.master).expect("valid circuit id");
        writeln!(out, ".SUBCKT {} {}", self.ctx.resolve_name(circuit.name), self.ports_line(circuit)).ok();
        for device in self.local_devices() {
            writeln!(out, "{}", self.ctx.snapshot(device)).ok();
        }
        writeln!(out, ".ENDS").ok();
        Ok(Outcome::Continue)
    }

    fn ports_line(&self, circuit: &levelcheck_circuit::Circuit) -> String {
        circuit.ports().iter().map(|&p| self.ctx.resolve_name(p)).collect::<Vec<_>>().join(" ")
    }

    fn print_environment(&self, out: &mut dyn std::io::Write) -> Result<Outcome> {
        writeln!(out, "stage: {}", self.ctx.stage.name()).ok();
        writeln!(out, "current: {}", self.ctx.full_path(self.ctx.current)).ok();
        writeln!(out, "searchlimit: {}", self.ctx.search_limit).ok();
        writeln!(out, "hierarchydelimiter: {}", self.ctx.delimiter).ok();
        writeln!(out, "names: {}", if self.ctx.show_names { "on" } else { "off" }).ok();
        writeln!(
            out,
            "options: gate_error_threshold={} bias_error_threshold={} circuit_error_limit={}",
            self.ctx.options.gate_error_threshold,
            self.ctx.options.bias_error_threshold,
            self.ctx.options.circuit_error_limit,
        )
        .ok();
        Ok(Outcome::Continue)
    }

    fn print_power(&self, signal: &str, out: &mut dyn std::io::Write) -> Result<Outcome> {
        let decl = self.ctx.power.find_for_signal(signal).ok_or_else(|| OperatorError::NotFound(signal.to_string()))?;
        writeln!(
            out,
            "{}: min={:?} sim={:?} max={:?} family={:?} flags={:?}",
            decl.pattern.as_str(),
            decl.min,
            decl.sim,
            decl.max,
            decl.family,
            decl.flags,
        )
        .ok();
        Ok(Outcome::Continue)
    }

    fn print_model(&self, key: &str, out: &mut dyn std::io::Write) -> Result<Outcome> {
        let variants = self.ctx.models.variants(key);
        if variants.is_empty() {
            return Err(OperatorError::NotFound(key.to_string()));
        }
        for variant in variants {
            writeln!(
                out,
                "{key} ({:?}): max_vds={} max_vgs={} max_vbs={} max_vbg={} vth={:?}",
                variant.device_type,
                variant.max_vds.limit,
                variant.max_vgs.limit,
                variant.max_vbs.limit,
                variant.max_vbg.limit,
                variant.vth,
            )
            .ok();
        }
        Ok(Outcome::Continue)
    }

    /// `source <file>` is handled directly: it only pushes lines onto this
    /// session's own input stack, never touches the pipeline.
    fn source(&mut self, path: &str) -> Result<Outcome> {
        let contents = fs::read_to_string(path).map_err(|e| OperatorError::Io { path: path.to_string(), reason: e.to_string() })?;
        self.input.push_source(&contents);
        Ok(Outcome::Continue)
    }

    /// `debug <instance> <cell>` writes a self-contained configuration +
    /// reduced-netlist + power-snapshot triple for one instance to the
    /// debug sink, matching the original tool's developer-facing dump
    /// command (SPEC_FULL §4.7/§6a, round-trip property in §8). This crate
    /// keeps the debug sink reference on the shell rather than in
    /// `ShellContext`, since writing to it is the one query-side effect
    /// that still needs `&mut`.
    fn debug(&mut self, inst: &str, cell: &str) -> Result<Outcome> {
        let target = self.ctx.resolve_path(inst)?;
        let label = self.ctx.resolve_name(self.ctx.instance_label(target));
        if label != cell && !label.eq_ignore_ascii_case(cell) {
            return Err(OperatorError::NotFound(format!("{inst} is not an instance of {cell}")));
        }
        self.write_debug_snapshot(target);
        Ok(Outcome::Continue)
    }

    /// Writes the reduced-netlist, power-snapshot, and configuration
    /// sections for `target`'s master circuit to `self.debug`, restricted
    /// to the voltage state this instance currently carries.
    fn write_debug_snapshot(&mut self, target: InstanceId) {
        let instance = self.ctx.elaboration.instance(target);
        let circuit = self.ctx.library.circuit_by_id(instance.master).expect("valid circuit id");
        let interner = self.ctx.interner;

        writeln!(self.debug, "* debug snapshot: {}", self.ctx.full_path(target)).ok();

        writeln!(self.debug, "* -- reduced netlist --").ok();
        let port_names: Vec<&str> = circuit.ports().iter().map(|&p| interner.resolve(p)).collect();
        writeln!(self.debug, ".SUBCKT {} {}", interner.resolve(circuit.name), port_names.join(" ")).ok();
        for device in circuit.devices() {
            let signal_names: Vec<&str> = device
                .signals
                .iter()
                .map(|&local| interner.resolve(local_net_name(circuit, local)))
                .collect();
            writeln!(
                self.debug,
                "{} {} {} {}",
                interner.resolve(device.name),
                signal_names.join(" "),
                interner.resolve(device.model_name),
                device.parameters,
            )
            .ok();
        }
        writeln!(self.debug, ".ENDS").ok();

        writeln!(self.debug, "* -- power snapshot --").ok();
        let local_names = circuit.ports().iter().chain(circuit.internal_signals().iter());
        for (local, &name) in local_names.enumerate() {
            let Some(global) = instance.global_net(local) else { continue };
            let rep = self.ctx.equiv(global);
            let label = interner.resolve(name);
            match self.ctx.state {
                Some(state) => {
                    writeln!(self.debug, "{label} min@{} sim@{} max@{}", state.min(rep), state.sim(rep), state.max(rep)).ok();
                }
                None => {
                    writeln!(self.debug, "{label} open").ok();
                }
            };
        }

        writeln!(self.debug, "* -- configuration --").ok();
        let options = self.ctx.options;
        writeln!(self.debug, "gate_error_threshold={}", options.gate_error_threshold).ok();
        writeln!(self.debug, "bias_error_threshold={}", options.bias_error_threshold).ok();
        writeln!(self.debug, "forward_error_threshold={}", options.forward_error_threshold).ok();
        writeln!(self.debug, "leak_error_threshold={}", options.leak_error_threshold).ok();
        writeln!(self.debug, "leak_limit={}", options.leak_limit).ok();
        writeln!(self.debug, "circuit_error_limit={}", options.circuit_error_limit).ok();
        writeln!(self.debug, "leak_overvoltage={}", options.leak_overvoltage).ok();
        writeln!(self.debug, "vth_equal_exemption={}", options.vth_equal_exemption).ok();
        writeln!(self.debug, "min_vth_gate_exemption={}", options.min_vth_gate_exemption).ok();
        writeln!(self.debug, "port_limit={}", options.port_limit).ok();
    }

    fn print_help(&self, out: &mut dyn std::io::Write) {
        writeln!(out, "commands: findsubcircuit findnet goto currenthierarchy printhierarchy").ok();
        writeln!(out, "          printdevice printnet listnet listdevice listinstance").ok();
        writeln!(out, "          getnet getdevice getinstance expandnet dumpfuse").ok();
        writeln!(out, "          dumpanalognets dumpunknownlogicalnets traceinverter").ok();
        writeln!(out, "          printcdl printenvironment togglename setpower setmodel").ok();
        writeln!(out, "          setfuse searchlimit hierarchydelimiter printpower printmodel").ok();
        writeln!(out, "          source debug noerror skip rerun continue quit").ok();
    }
}

/// Resolve a circuit-local net id to its declared name: ports occupy the
/// low ids, internal signals follow, matching `LocalNetId`'s own doc
/// comment.
fn local_net_name(circuit: &levelcheck_circuit::Circuit, local: levelcheck_circuit::LocalNetId) -> levelcheck_core::TextId {
    let index = local.as_usize();
    let ports = circuit.ports();
    if index < ports.len() {
        ports[index]
    } else {
        circuit.internal_signals()[index - ports.len()]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use levelcheck_circuit::{Circuit, CircuitLibrary, Device, SubcircuitInstance};
    use levelcheck_core::{DeviceType, Interner, RunOptions, Stage, TextId};
    use levelcheck_elaborate::Elaborator;
    use levelcheck_model::ModelLibrary;
    use levelcheck_netgraph::{ConnectivityIndex, LinkedModels};
    use levelcheck_power::PowerSpec;

    use crate::input::ScriptedInput;

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
    fn goto_then_currenthierarchy_reports_new_path() {
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
        let input = InputStack::new(Box::new(ScriptedInput::new(["goto X1", "pwd", "quit"])));
        let mut shell = Shell::new(input, ctx);
        let mut buf = Vec::new();
        let outcome = shell.run(&mut buf);
        let text = String::from_utf8(buf).unwrap();
        assert_eq!(outcome, Outcome::Quit);
        assert!(text.contains("TOP/X1"));
    }

    #[test]
    fn debug_writes_netlist_power_and_config_triple_to_sink() {
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
        let input = InputStack::new(Box::new(ScriptedInput::new(["debug X1 X1", "quit"])));
        let mut shell = Shell::new(input, ctx);
        let debug_buf = levelcheck_propagate::SharedBuffer::default();
        shell.set_debug_sink(Box::new(debug_buf.clone()));
        let mut report_buf = Vec::new();
        shell.run(&mut report_buf);
        let text = debug_buf.contents();
        assert!(text.contains(".SUBCKT INV"));
        assert!(text.contains("M1"));
        assert!(text.contains(".ENDS"));
        assert!(text.contains("VDD open"));
        assert!(text.contains("-- configuration --"));
        assert!(text.contains("gate_error_threshold="));
    }

    #[test]
    fn debug_rejects_mismatched_cell_name() {
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
        let input = InputStack::new(Box::new(ScriptedInput::new(["debug X1 WRONGCELL"])));
        let mut shell = Shell::new(input, ctx);
        let mut buf = Vec::new();
        shell.run(&mut buf);
        let text = String::from_utf8(buf).unwrap();
        assert!(text.contains("not an instance of"));
    }

    #[test]
    fn setpower_returns_reload_outcome_without_mutating_pipeline() {
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
        let input = InputStack::new(Box::new(ScriptedInput::new(["setpower new.pwr"])));
        let mut shell = Shell::new(input, ctx);
        let mut buf = Vec::new();
        let outcome = shell.run(&mut buf);
        assert_eq!(outcome, Outcome::Reload { kind: ReloadKind::Power, path: "new.pwr".to_string() });
    }

    #[test]
    fn stage_gated_command_is_rejected_before_first_minmax() {
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
        let input = InputStack::new(Box::new(ScriptedInput::new(["dumpanalognets", "quit"])));
        let mut shell = Shell::new(input, ctx);
        let mut buf = Vec::new();
        shell.run(&mut buf);
        let text = String::from_utf8(buf).unwrap();
        assert!(text.contains("only valid from"));
    }

    #[test]
    fn unknown_command_reports_and_continues() {
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
        let input = InputStack::new(Box::new(ScriptedInput::new(["frobnicate", "quit"])));
        let mut shell = Shell::new(input, ctx);
        let mut buf = Vec::new();
        let outcome = shell.run(&mut buf);
        assert_eq!(outcome, Outcome::Quit);
        assert!(String::from_utf8(buf).unwrap().contains("unrecognized command"));
    }
}
