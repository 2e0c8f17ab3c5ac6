//! A single device model: per-terminal-pair voltage limits, the threshold
//! voltage, a resistance expression, and the conditions that select this
//! model among the several sharing one base key.

use levelcheck_core::{CircuitId, DeviceType, Voltage};

use crate::condition::ConditionList;
use crate::parameter_map::ParameterMap;

/// A voltage limit as declared in the model card: the original textual
/// definition (kept for diagnostics, since it may reference a named
/// constant rather than a bare literal) alongside the resolved value.
#[derive(Debug, Clone)]
pub struct VoltageLimit {
    pub definition: String,
    pub limit: Voltage,
}

impl VoltageLimit {
    pub fn new(definition: impl Into<String>, limit: Voltage) -> Self {
        Self { definition: definition.into(), limit }
    }

    pub fn unknown() -> Self {
        Self { definition: String::new(), limit: Voltage::UNKNOWN }
    }

    pub fn is_known(&self) -> bool {
        self.limit.is_known()
    }
}

impl Default for VoltageLimit {
    fn default() -> Self {
        Self::unknown()
    }
}

/// A reference to a template device within a not-yet-elaborated circuit:
/// the circuit it lives in, and its position in that circuit's device list.
/// Elaboration turns each `(circuit, index)` pair into one global
/// `DeviceId` per instance of that circuit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TemplateDeviceRef {
    pub circuit: CircuitId,
    pub device_index: u32,
}

/// One selectable variant of a model key: a base device type plus the
/// per-terminal-pair voltage limits and electrical properties that apply
/// when a device's parameters satisfy `conditions`.
#[derive(Debug, Clone)]
pub struct Model {
    pub device_type: DeviceType,
    pub base_type: String,
    pub conditions: ConditionList,

    pub max_vds: VoltageLimit,
    pub max_vgs: VoltageLimit,
    pub max_vbs: VoltageLimit,
    pub max_vbg: VoltageLimit,
    pub vth: Option<Voltage>,

    /// Resistance expression, e.g. `"100"` ohms/square or a geometry-driven
    /// formula string; left unevaluated here since it may depend on `W`/`L`
    /// parameters the netgraph resolves per-device.
    pub resistance_definition: String,

    pub is_ldd: bool,

    /// Anode/cathode terminal-index pairs for diode-connected MOS devices
    /// (terminal indices into the device's own signal list, not net ids).
    pub diode_terminal_pairs: Vec<(u8, u8)>,

    pub devices: Vec<TemplateDeviceRef>,

    pub definition: String,
}

impl Model {
    pub fn new(device_type: DeviceType, base_type: impl Into<String>) -> Self {
        Self {
            device_type,
            base_type: base_type.into(),
            conditions: ConditionList::default(),
            max_vds: VoltageLimit::unknown(),
            max_vgs: VoltageLimit::unknown(),
            max_vbs: VoltageLimit::unknown(),
            max_vbg: VoltageLimit::unknown(),
            vth: None,
            resistance_definition: String::new(),
            is_ldd: false,
            diode_terminal_pairs: Vec::new(),
            devices: Vec::new(),
            definition: String::new(),
        }
    }

    pub fn matches(&self, parameters: &ParameterMap) -> bool {
        self.conditions.matches(parameters)
    }

    pub fn register_device(&mut self, circuit: CircuitId, device_index: u32) {
        self.devices.push(TemplateDeviceRef { circuit, device_index });
    }

    pub fn device_count(&self) -> usize {
        self.devices.len()
    }
}
