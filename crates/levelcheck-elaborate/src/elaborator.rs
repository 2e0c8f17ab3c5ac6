//! Hierarchy elaboration (C5): flattens a [`levelcheck_circuit::CircuitLibrary`]
//! into one global id space, assigning every net, device, and subcircuit
//! instance a flat id, and detecting structurally parallel instances so the
//! propagator and checkers can skip redundant duplicates.

use std::collections::HashMap;

use levelcheck_circuit::CircuitLibrary;
use levelcheck_core::{CircuitId, DeviceId, InstanceId, NetId, RunOptions, TextId};

use crate::error::{ElaborationError, Result};
use crate::instance::Instance;

/// The flattened result of elaborating a circuit library against one top
/// circuit: every [`Instance`], and the parent-instance lookup for every
/// global net and device id.
#[derive(Debug)]
pub struct Elaboration {
    pub top: InstanceId,
    instances: Vec<Instance>,
    net_parent: Vec<InstanceId>,
    device_parent: Vec<InstanceId>,
    instances_by_circuit: HashMap<CircuitId, Vec<InstanceId>>,
}

impl Elaboration {
    pub fn instance(&self, id: InstanceId) -> &Instance {
        &self.instances[id.as_usize()]
    }

    pub fn instance_count(&self) -> usize {
        self.instances.len()
    }

    pub fn net_count(&self) -> usize {
        self.net_parent.len()
    }

    pub fn device_count(&self) -> usize {
        self.device_parent.len()
    }

    pub fn net_parent(&self, net: NetId) -> InstanceId {
        self.net_parent[net.as_usize()]
    }

    pub fn device_parent(&self, device: DeviceId) -> InstanceId {
        self.device_parent[device.as_usize()]
    }

    pub fn instances_of(&self, circuit: CircuitId) -> &[InstanceId] {
        self.instances_by_circuit.get(&circuit).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn instances(&self) -> &[Instance] {
        &self.instances
    }

    /// Global device id owned by `instance` at `local_index` within its
    /// master circuit's device list.
    pub fn global_device(&self, instance: InstanceId, local_index: u32) -> DeviceId {
        let owner = self.instance(instance);
        debug_assert!(!owner.is_parallel_duplicate());
        DeviceId::new(owner.first_device.as_u32() + local_index)
    }
}

struct Builder<'a> {
    library: &'a CircuitLibrary,
    options: &'a RunOptions,
    instances: Vec<Instance>,
    net_parent: Vec<InstanceId>,
    device_parent: Vec<InstanceId>,
    instances_by_circuit: HashMap<CircuitId, Vec<InstanceId>>,
    /// Dedup key: (parent instance, master circuit, port-bound global nets)
    /// to canonical instance id, scoped per parent so instances of the same
    /// circuit under different parents are never conflated.
    dedup: HashMap<(InstanceId, CircuitId, Vec<NetId>), InstanceId>,
    net_counter: u32,
    device_counter: u32,
}

impl<'a> Builder<'a> {
    fn new(library: &'a CircuitLibrary, options: &'a RunOptions) -> Self {
        Self {
            library,
            options,
            instances: Vec::new(),
            net_parent: Vec::new(),
            device_parent: Vec::new(),
            instances_by_circuit: HashMap::new(),
            dedup: HashMap::new(),
            net_counter: 0,
            device_counter: 0,
        }
    }

    /// Whether an instance bound to `port_count` ports is eligible for
    /// parallel-instance deduplication under the configured `port_limit`
    /// (`0` disables the optimization entirely, per [`RunOptions`]).
    fn dedup_eligible(&self, port_count: usize) -> bool {
        self.options.port_limit != 0 && port_count as u32 <= self.options.port_limit
    }

    /// Reserve the next instance id, build its contents, then push it so
    /// children created during recursion see a correct parent id.
    fn elaborate_instance(
        &mut self,
        master: CircuitId,
        parent: InstanceId,
        port_bindings: Option<Vec<NetId>>,
        forced_twin: Option<InstanceId>,
    ) -> Result<InstanceId> {
        let my_id = InstanceId::new(self.instances.len() as u32);
        let circuit = self
            .library
            .circuit_by_id(master)
            .expect("circuit id produced by this library must resolve in it");
        let is_top = port_bindings.is_none();

        if let Some(twin_id) = forced_twin {
            let (twin_local_to_global, twin_first_net, twin_first_device) = {
                let twin = self.instance(twin_id);
                (twin.local_to_global_net.clone(), twin.first_net, twin.first_device)
            };
            let instance = Instance {
                master,
                parent,
                first_net: twin_first_net,
                first_device: twin_first_device,
                owned_net_count: 0,
                local_to_global_net: twin_local_to_global,
                children: Vec::new(),
                parallel_of: Some(twin_id),
                parallel_count: 0,
            };
            self.instances.push(instance);
            self.instances_by_circuit.entry(master).or_default().push(my_id);
            let children = self.elaborate_children(my_id, master, Some(twin_id))?;
            self.instances[my_id.as_usize()].children = children;
            return Ok(my_id);
        }

        if let Some(bindings) = &port_bindings {
            let key = (parent, master, bindings.clone());
            if self.dedup_eligible(bindings.len()) && self.dedup.contains_key(&key) {
                let &canonical_id = self.dedup.get(&key).expect("just checked");
                let (canon_local, canon_first_net, canon_first_device) = {
                    let canon = self.instance(canonical_id);
                    (canon.local_to_global_net.clone(), canon.first_net, canon.first_device)
                };
                let instance = Instance {
                    master,
                    parent,
                    first_net: canon_first_net,
                    first_device: canon_first_device,
                    owned_net_count: 0,
                    local_to_global_net: canon_local,
                    children: Vec::new(),
                    parallel_of: Some(canonical_id),
                    parallel_count: 0,
                };
                self.instances.push(instance);
                self.instances_by_circuit.entry(master).or_default().push(my_id);
                self.instances[canonical_id.as_usize()].parallel_count += 1;
                let children = self.elaborate_children(my_id, master, Some(canonical_id))?;
                self.instances[my_id.as_usize()].children = children;
                return Ok(my_id);
            }
        }

        let port_count = circuit.port_count();
        let local_net_count = circuit.local_net_count();
        let mut local_to_global = vec![NetId::new(0); local_net_count];

        let first_net = NetId::new(self.net_counter);
        if is_top {
            for slot in local_to_global.iter_mut() {
                let net = NetId::new(self.net_counter);
                self.net_counter += 1;
                self.net_parent.push(my_id);
                *slot = net;
            }
        } else {
            let bindings = port_bindings.as_ref().expect("non-top instance has bindings");
            if bindings.len() != port_count {
                return Err(ElaborationError::PortCountMismatch {
                    instance: circuit.name,
                    target: circuit.name,
                    expected: port_count,
                    found: bindings.len(),
                });
            }
            local_to_global[..port_count].copy_from_slice(bindings);
            for slot in local_to_global[port_count..].iter_mut() {
                let net = NetId::new(self.net_counter);
                self.net_counter += 1;
                self.net_parent.push(my_id);
                *slot = net;
            }
        }
        let owned_net_count = (self.net_counter - first_net.as_u32()) as u32;

        let first_device = DeviceId::new(self.device_counter);
        for _ in circuit.devices() {
            self.device_parent.push(my_id);
            self.device_counter += 1;
        }

        let instance = Instance {
            master,
            parent,
            first_net,
            first_device,
            owned_net_count,
            local_to_global_net: local_to_global,
            children: Vec::new(),
            parallel_of: None,
            parallel_count: 1,
        };
        self.instances.push(instance);
        self.instances_by_circuit.entry(master).or_default().push(my_id);
        if let Some(bindings) = port_bindings {
            if self.dedup_eligible(bindings.len()) {
                self.dedup.insert((parent, master, bindings), my_id);
            }
        }

        let children = self.elaborate_children(my_id, master, None)?;
        self.instances[my_id.as_usize()].children = children;
        Ok(my_id)
    }

    /// Recurse into every subcircuit instance declared in `master`, for an
    /// instance already pushed as `parent_instance`. `forced_twin`, when
    /// set, propagates the parallel-duplicate relationship one level down:
    /// child `k` of a duplicate shares child `k` of its twin.
    fn elaborate_children(
        &mut self,
        parent_instance: InstanceId,
        master: CircuitId,
        forced_twin: Option<InstanceId>,
    ) -> Result<Vec<InstanceId>> {
        let circuit = self.library.circuit_by_id(master).expect("valid circuit id");
        let sub_instances = circuit.instances().to_vec();
        let parent_local_to_global = self.instance(parent_instance).local_to_global_net.clone();
        let twin_children = forced_twin.map(|twin| self.instance(twin).children.clone());

        let mut children = Vec::with_capacity(sub_instances.len());
        for (index, sub) in sub_instances.iter().enumerate() {
            let target = self.library.circuit_id(sub.target_circuit).ok_or_else(|| {
                ElaborationError::UnresolvedSubcircuit {
                    circuit: circuit.name,
                    instance: sub.name,
                    target: sub.target_circuit,
                }
            })?;
            let target_circuit = self.library.circuit_by_id(target).expect("valid circuit id");
            if sub.connections.len() != target_circuit.port_count() {
                return Err(ElaborationError::PortCountMismatch {
                    instance: sub.name,
                    target: sub.target_circuit,
                    expected: target_circuit.port_count(),
                    found: sub.connections.len(),
                });
            }
            let bindings: Vec<NetId> = sub
                .connections
                .iter()
                .map(|local| parent_local_to_global[local.as_usize()])
                .collect();
            let child_twin = twin_children.as_ref().map(|twins| twins[index]);
            let child_id =
                self.elaborate_instance(target, parent_instance, Some(bindings), child_twin)?;
            children.push(child_id);
        }
        Ok(children)
    }

    fn instance(&self, id: InstanceId) -> &Instance {
        &self.instances[id.as_usize()]
    }

    fn finish(self, top: InstanceId) -> Elaboration {
        Elaboration {
            top,
            instances: self.instances,
            net_parent: self.net_parent,
            device_parent: self.device_parent,
            instances_by_circuit: self.instances_by_circuit,
        }
    }
}

/// Entry point: elaborate `library` starting from the circuit named
/// `top_name`.
pub struct Elaborator;

impl Elaborator {
    pub fn elaborate(library: &CircuitLibrary, top_name: TextId, options: &RunOptions) -> Result<Elaboration> {
        let top_id = library
            .circuit_id(top_name)
            .ok_or(ElaborationError::UnknownTopCircuit { name: top_name })?;
        let mut builder = Builder::new(library, options);
        let top_instance = builder.elaborate_instance(top_id, InstanceId::TOP, None, None)?;
        log::info!(
            "elaborated {} instances, {} nets, {} devices",
            builder.instances.len(),
            builder.net_counter,
            builder.device_counter,
        );
        Ok(builder.finish(top_instance))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use levelcheck_circuit::{Circuit, Device, SubcircuitInstance};
    use levelcheck_core::{DeviceType, Interner};

    fn build_inverter_library() -> (CircuitLibrary, Interner, TextId, TextId) {
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
        inv.add_device(Device::new(m1, DeviceType::Pmos, pmod, "", vec![s, g, d, b]))
            .unwrap();

        let m2 = interner.intern("M2");
        let nmod = interner.intern("NMOD");
        let d2 = inv.get_or_create_signal(out);
        let g2 = inv.get_or_create_signal(inp);
        let s2 = inv.get_or_create_signal(gnd);
        let b2 = inv.get_or_create_signal(gnd);
        inv.add_device(Device::new(m2, DeviceType::Nmos, nmod, "", vec![d2, g2, s2, b2]))
            .unwrap();

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
        top.add_instance(SubcircuitInstance::new(x1, inv_name, vec![tvdd, tgnd, ta, tz]))
            .unwrap();

        lib.register_circuit(top).unwrap();

        (lib, interner, top_name, inv_name)
    }

    #[test]
    fn elaborates_single_level_hierarchy() {
        let (lib, _interner, top_name, inv_name) = build_inverter_library();
        let elaboration = Elaborator::elaborate(&lib, top_name, &levelcheck_core::RunOptions::default()).unwrap();

        assert_eq!(elaboration.instance_count(), 2);
        let top = elaboration.instance(elaboration.top);
        assert_eq!(top.children.len(), 1);
        let child = elaboration.instance(top.children[0]);
        assert!(!child.is_parallel_duplicate());
        assert_eq!(elaboration.device_count(), 2);

        let inv_id = lib.circuit_id(inv_name).unwrap();
        assert_eq!(elaboration.instances_of(inv_id), &[top.children[0]]);
    }

    #[test]
    fn every_net_has_exactly_one_owning_instance() {
        let (lib, _interner, top_name, _inv_name) = build_inverter_library();
        let elaboration = Elaborator::elaborate(&lib, top_name, &levelcheck_core::RunOptions::default()).unwrap();

        for net_index in 0..elaboration.net_count() {
            let net = NetId::new(net_index as u32);
            let owner = elaboration.instance(elaboration.net_parent(net));
            assert!(owner.owns_net(net));
        }
    }

    #[test]
    fn parallel_instances_share_net_mapping() {
        let (mut lib, mut interner, top_name, inv_name) = {
            let (lib, interner, top_name, inv_name) = build_inverter_library();
            (lib, interner, top_name, inv_name)
        };

        let top = lib.find_mut(top_name).unwrap();
        let vdd = interner.get("VDD").unwrap();
        let gnd = interner.get("GND").unwrap();
        let a = interner.get("A").unwrap();
        let z = interner.get("Z").unwrap();
        let tvdd = top.get_or_create_signal(vdd);
        let tgnd = top.get_or_create_signal(gnd);
        let ta = top.get_or_create_signal(a);
        let tz = top.get_or_create_signal(z);
        let x2 = interner.intern("X2");
        top.add_instance(SubcircuitInstance::new(x2, inv_name, vec![tvdd, tgnd, ta, tz]))
            .unwrap();

        let elaboration = Elaborator::elaborate(&lib, top_name, &levelcheck_core::RunOptions::default()).unwrap();
        let top_instance = elaboration.instance(elaboration.top);
        assert_eq!(top_instance.children.len(), 2);

        let first = elaboration.instance(top_instance.children[0]);
        let second = elaboration.instance(top_instance.children[1]);
        assert!(!first.is_parallel_duplicate());
        assert!(second.is_parallel_duplicate());
        assert_eq!(second.parallel_of, Some(top_instance.children[0]));
        assert_eq!(second.local_to_global_net, first.local_to_global_net);
    }

    #[test]
    fn unresolved_subcircuit_target_is_reported() {
        let mut interner = Interner::new();
        let mut lib = CircuitLibrary::new();
        let top_name = interner.intern("TOP");
        let mut top = Circuit::new(top_name);
        let a = interner.intern("A");
        let ta = top.get_or_create_signal(a);
        let missing = interner.intern("MISSING");
        let x1 = interner.intern("X1");
        top.add_instance(SubcircuitInstance::new(x1, missing, vec![ta])).unwrap();
        lib.register_circuit(top).unwrap();

        let err = Elaborator::elaborate(&lib, top_name, &levelcheck_core::RunOptions::default()).unwrap_err();
        assert_eq!(
            err,
            ElaborationError::UnresolvedSubcircuit { circuit: top_name, instance: x1, target: missing }
        );
    }
}
