//! Resolves every template device in a [`levelcheck_circuit::CircuitLibrary`]
//! against the [`levelcheck_model::ModelLibrary`], producing a per-device
//! electrical profile that is independent of any particular elaborated
//! instance. The elaborator's `local_to_global_net` map is what turns a
//! profile's local terminal ids into global ones per instance.

use indexmap::IndexMap;
use levelcheck_circuit::CircuitLibrary;
use levelcheck_core::{CircuitId, DeviceType, Interner, Resistance, Voltage};
use levelcheck_model::{Model, ModelLibrary, ParameterMap};

/// The electrical facts about one template device: voltage limits,
/// threshold voltage, resistance, and diode topology, resolved once by
/// matching the device's model key and parameter string against the model
/// library.
#[derive(Debug, Clone)]
pub struct DeviceProfile {
    pub device_type: DeviceType,
    pub max_vds: Voltage,
    pub max_vgs: Voltage,
    pub max_vbs: Voltage,
    pub max_vbg: Voltage,
    pub vth: Option<Voltage>,
    pub resistance: Resistance,
    pub is_ldd: bool,
    pub diode_terminal_pairs: Vec<(u8, u8)>,
    /// `false` if no model variant in the library matched this device's key
    /// and parameters. Propagation treats an unmatched device as open;
    /// the checker reports it separately rather than silently ignoring it.
    pub model_matched: bool,
}

impl DeviceProfile {
    fn unmatched(device_type: DeviceType) -> Self {
        Self {
            device_type,
            max_vds: Voltage::UNKNOWN,
            max_vgs: Voltage::UNKNOWN,
            max_vbs: Voltage::UNKNOWN,
            max_vbg: Voltage::UNKNOWN,
            vth: None,
            resistance: Resistance::ZERO,
            is_ldd: device_type.is_ldd(),
            diode_terminal_pairs: Vec::new(),
            model_matched: false,
        }
    }

    fn from_model(device_type: DeviceType, model: &Model) -> Self {
        Self {
            device_type,
            max_vds: model.max_vds.limit,
            max_vgs: model.max_vgs.limit,
            max_vbs: model.max_vbs.limit,
            max_vbg: model.max_vbg.limit,
            vth: model.vth,
            resistance: resolve_resistance(&model.resistance_definition),
            is_ldd: model.is_ldd,
            diode_terminal_pairs: model.diode_terminal_pairs.clone(),
            model_matched: true,
        }
    }
}

/// The model's resistance field is a free-form expression in the source
/// grammar (§6); this bundled linker only evaluates the literal-numeric
/// case and otherwise treats the device as zero-resistance (a short),
/// which is the common case for fuses and always-on switches.
fn resolve_resistance(definition: &str) -> Resistance {
    levelcheck_model::parse_scaled_number(definition)
        .map(Resistance)
        .unwrap_or(Resistance::ZERO)
}

/// All resolved template-device profiles, keyed by circuit and then by the
/// device's position in [`levelcheck_circuit::Circuit::devices`].
#[derive(Debug, Default)]
pub struct LinkedModels {
    profiles: IndexMap<CircuitId, Vec<DeviceProfile>>,
}

impl LinkedModels {
    pub fn link(library: &CircuitLibrary, models: &ModelLibrary, interner: &Interner) -> Self {
        let mut profiles = IndexMap::new();
        for (&name, circuit) in library.iter() {
            let id = library.circuit_id(name).expect("circuit registered under its own name");
            let mut device_profiles = Vec::with_capacity(circuit.device_count());
            for device in circuit.devices() {
                let key = interner.resolve(device.model_name);
                let params = ParameterMap::parse(&device.parameters);
                let profile = match models.find_model(key, &params) {
                    Some(model) => DeviceProfile::from_model(device.device_type, model),
                    None => DeviceProfile::unmatched(device.device_type),
                };
                device_profiles.push(profile);
            }
            profiles.insert(id, device_profiles);
        }
        Self { profiles }
    }

    pub fn profile(&self, circuit: CircuitId, local_device_index: usize) -> Option<&DeviceProfile> {
        self.profiles.get(&circuit)?.get(local_device_index)
    }
}
