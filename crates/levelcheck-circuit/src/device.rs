//! Devices and subcircuit instances within one circuit definition.

use levelcheck_core::{DeviceType, TextId};

use crate::net::LocalNetId;

/// A single transistor, diode, resistor, capacitor, fuse, or switch
/// instance, local to one [`crate::Circuit`].
///
/// The model is not resolved here: `model_name` is the raw text the netlist
/// used to reference a model key, matched against the model library
/// (levelcheck-model) in a separate linking pass once both libraries are
/// loaded, because model conditions may depend on the device's own
/// parameter string.
#[derive(Debug, Clone)]
pub struct Device {
    pub name: TextId,
    pub device_type: DeviceType,
    pub model_name: TextId,
    /// Raw, unparsed parameter string (e.g. `"W=1u L=0.15u"`), carried
    /// through for condition matching and diagnostics.
    pub parameters: String,
    /// Local net ids, positional per `device_type` (e.g. for MOS:
    /// drain, gate, source, bulk).
    pub signals: Vec<LocalNetId>,
}

impl Device {
    pub fn new(
        name: TextId,
        device_type: DeviceType,
        model_name: TextId,
        parameters: impl Into<String>,
        signals: Vec<LocalNetId>,
    ) -> Self {
        Self {
            name,
            device_type,
            model_name,
            parameters: parameters.into(),
            signals,
        }
    }

    pub fn drain(&self) -> Option<LocalNetId> {
        self.device_type.is_mos().then(|| self.signals[0])
    }

    pub fn gate(&self) -> Option<LocalNetId> {
        self.device_type.is_mos().then(|| self.signals[1])
    }

    pub fn source(&self) -> Option<LocalNetId> {
        self.device_type.is_mos().then(|| self.signals[2])
    }

    pub fn bulk(&self) -> Option<LocalNetId> {
        self.device_type.is_mos().then(|| self.signals[3])
    }

    /// Anode/cathode for diodes, or the two terminals of any two-terminal
    /// device (resistor, capacitor, fuse, switch).
    pub fn terminals(&self) -> (LocalNetId, LocalNetId) {
        (self.signals[0], self.signals[1])
    }
}

/// A use of a subcircuit at a specific place in a [`crate::Circuit`].
#[derive(Debug, Clone)]
pub struct SubcircuitInstance {
    pub name: TextId,
    pub target_circuit: TextId,
    /// Actual-parameter net list, positional against the target circuit's
    /// declared port list.
    pub connections: Vec<LocalNetId>,
}

impl SubcircuitInstance {
    pub fn new(name: TextId, target_circuit: TextId, connections: Vec<LocalNetId>) -> Self {
        Self { name, target_circuit, connections }
    }

    pub fn port_count(&self) -> usize {
        self.connections.len()
    }
}
