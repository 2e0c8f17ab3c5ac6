//! Circuit definitions (C2): named subcircuits with ports, internal nets,
//! a device list, and a subcircuit-instance list. Immutable once parsing of
//! that circuit completes.

use std::collections::HashMap;
use std::collections::HashSet;

use levelcheck_core::TextId;

use crate::device::{Device, SubcircuitInstance};
use crate::error::{CircuitError, Result};
use crate::net::LocalNetId;

/// A parsed (not-yet-elaborated) subcircuit definition.
#[derive(Debug, Clone)]
pub struct Circuit {
    pub name: TextId,
    ports: Vec<TextId>,
    internal_signals: Vec<TextId>,
    signal_ids: HashMap<TextId, LocalNetId>,
    devices: Vec<Device>,
    instances: Vec<SubcircuitInstance>,
    instance_names: HashSet<TextId>,
    ports_sealed: bool,
}

impl Circuit {
    pub fn new(name: TextId) -> Self {
        Self {
            name,
            ports: Vec::new(),
            internal_signals: Vec::new(),
            signal_ids: HashMap::new(),
            devices: Vec::new(),
            instances: Vec::new(),
            instance_names: HashSet::new(),
            ports_sealed: false,
        }
    }

    /// Declare a port. Invariant: port count never changes after the first
    /// internal signal, device, or instance is registered.
    pub fn add_port(&mut self, name: TextId) -> Result<LocalNetId> {
        if self.ports_sealed {
            return Err(CircuitError::PortsAlreadySealed { circuit: self.name, port: name });
        }
        if let Some(&existing) = self.signal_ids.get(&name) {
            return Ok(existing);
        }
        let id = LocalNetId::new(self.ports.len() as u32);
        self.ports.push(name);
        self.signal_ids.insert(name, id);
        Ok(id)
    }

    /// Resolve a signal name to a local net id, allocating a fresh internal
    /// net id (and sealing the port list) if this is the first reference.
    pub fn get_or_create_signal(&mut self, name: TextId) -> LocalNetId {
        self.ports_sealed = true;
        if let Some(&existing) = self.signal_ids.get(&name) {
            return existing;
        }
        let id = LocalNetId::new((self.ports.len() + self.internal_signals.len()) as u32);
        self.internal_signals.push(name);
        self.signal_ids.insert(name, id);
        id
    }

    pub fn add_device(&mut self, device: Device) -> Result<()> {
        self.ports_sealed = true;
        if !self.instance_names.insert(device.name) {
            return Err(CircuitError::DuplicateInstance { circuit: self.name, name: device.name });
        }
        self.devices.push(device);
        Ok(())
    }

    pub fn add_instance(&mut self, instance: SubcircuitInstance) -> Result<()> {
        self.ports_sealed = true;
        if !self.instance_names.insert(instance.name) {
            return Err(CircuitError::DuplicateInstance { circuit: self.name, name: instance.name });
        }
        self.instances.push(instance);
        Ok(())
    }

    pub fn ports(&self) -> &[TextId] {
        &self.ports
    }

    pub fn internal_signals(&self) -> &[TextId] {
        &self.internal_signals
    }

    pub fn devices(&self) -> &[Device] {
        &self.devices
    }

    /// Mutable device access, for a fuse-override pass to flip a device's
    /// resolved `device_type` between `.ENDS` and elaboration.
    pub fn devices_mut(&mut self) -> &mut [Device] {
        &mut self.devices
    }

    pub fn instances(&self) -> &[SubcircuitInstance] {
        &self.instances
    }

    pub fn port_count(&self) -> usize {
        self.ports.len()
    }

    pub fn internal_count(&self) -> usize {
        self.internal_signals.len()
    }

    /// Total local net count: ports followed by internals.
    pub fn local_net_count(&self) -> usize {
        self.ports.len() + self.internal_signals.len()
    }

    pub fn device_count(&self) -> usize {
        self.devices.len()
    }

    pub fn instance_count(&self) -> usize {
        self.instances.len()
    }

    pub fn local_net_id(&self, name: TextId) -> Option<LocalNetId> {
        self.signal_ids.get(&name).copied()
    }
}
