//! Shared primitives for the levelcheck voltage-level checker: text
//! interning, dense id newtypes, the voltage/resistance scale, device type
//! tags, and pipeline stage identifiers.

pub mod device_type;
pub mod ids;
pub mod interner;
pub mod options;
pub mod stage;
pub mod voltage;

pub use device_type::DeviceType;
pub use ids::{CircuitId, DeviceId, FamilyId, InstanceId, ModelId, NetId};
pub use interner::{Interner, TextId};
pub use options::RunOptions;
pub use stage::Stage;
pub use voltage::{Resistance, Voltage, VOLTAGE_SCALE};
