//! A single elaborated subcircuit instance: one node in the flattened
//! instance tree, owning the base indices into the global net/device/
//! instance arrays that everything it (recursively) contains falls under.

use levelcheck_core::{CircuitId, DeviceId, InstanceId, NetId};

#[derive(Debug, Clone)]
pub struct Instance {
    pub master: CircuitId,
    pub parent: InstanceId,

    pub first_net: NetId,
    pub first_device: DeviceId,

    /// Number of global net ids this instance itself owns, starting at
    /// `first_net`: the internal-signal count for an ordinary instance, the
    /// full local net count for the top instance (which has no parent to
    /// alias its ports to), or zero for a parallel duplicate.
    pub owned_net_count: u32,

    /// Local net id (port, then internal) to global net id, sized to the
    /// master circuit's local net count. A parallel duplicate holds a clone
    /// of its canonical twin's map rather than assigning any ids of its own.
    pub local_to_global_net: Vec<NetId>,

    /// Direct subcircuit-instance children, in the master circuit's
    /// instance-declaration order.
    pub children: Vec<InstanceId>,

    /// Set for a structurally-identical duplicate of an earlier sibling
    /// (or, recursively, a descendant of one): `Some(canonical)` points at
    /// the instance whose nets and devices this one shares. `None` means
    /// this instance is itself canonical.
    pub parallel_of: Option<InstanceId>,

    /// Count of duplicates collapsed onto this instance, including itself.
    /// Only meaningful when `parallel_of` is `None`.
    pub parallel_count: u32,
}

impl Instance {
    pub fn is_parallel_duplicate(&self) -> bool {
        self.parallel_of.is_some()
    }

    pub fn global_net(&self, local: usize) -> Option<NetId> {
        self.local_to_global_net.get(local).copied()
    }

    pub fn owns_net(&self, net: NetId) -> bool {
        let first = self.first_net.as_u32();
        let net = net.as_u32();
        net >= first && net < first + self.owned_net_count
    }
}
