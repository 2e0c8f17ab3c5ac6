//! Device models (C3): voltage limits, threshold voltage, resistance
//! definitions, and the condition-based matching that selects among the
//! several model variants sharing one base key.

pub mod condition;
pub mod error;
pub mod library;
pub mod model;
pub mod parameter_map;

pub use condition::{Comparator, Condition, ConditionList};
pub use error::{ModelError, Result};
pub use library::ModelLibrary;
pub use model::{Model, TemplateDeviceRef, VoltageLimit};
pub use parameter_map::{parse_scaled_number, ParameterMap};
