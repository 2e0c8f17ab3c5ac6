//! Optional TOML overrides for [`RunOptions`] (A4), loaded once at startup.
//! Every field is optional; anything left unset keeps the built-in default.

use anyhow::{Context, Result};
use levelcheck_core::{RunOptions, Voltage};
use serde::Deserialize;

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConfigFile {
    gate_error_threshold: Option<f64>,
    bias_error_threshold: Option<f64>,
    forward_error_threshold: Option<f64>,
    leak_error_threshold: Option<f64>,
    leak_limit: Option<f64>,
    circuit_error_limit: Option<u32>,
    leak_overvoltage: Option<bool>,
    vth_equal_exemption: Option<bool>,
    min_vth_gate_exemption: Option<bool>,
    port_limit: Option<u32>,
}

impl ConfigFile {
    pub fn load(path: &std::path::Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading config file {}", path.display()))?;
        toml::from_str(&text).with_context(|| format!("parsing config file {}", path.display()))
    }

    /// Apply the overrides this file declared onto a default-initialized
    /// [`RunOptions`].
    pub fn apply(&self, options: &mut RunOptions) {
        if let Some(v) = self.gate_error_threshold {
            options.gate_error_threshold = Voltage::from_volts(v);
        }
        if let Some(v) = self.bias_error_threshold {
            options.bias_error_threshold = Voltage::from_volts(v);
        }
        if let Some(v) = self.forward_error_threshold {
            options.forward_error_threshold = Voltage::from_volts(v);
        }
        if let Some(v) = self.leak_error_threshold {
            options.leak_error_threshold = Voltage::from_volts(v);
        }
        if let Some(v) = self.leak_limit {
            options.leak_limit = v;
        }
        if let Some(v) = self.circuit_error_limit {
            options.circuit_error_limit = v;
        }
        if let Some(v) = self.leak_overvoltage {
            options.leak_overvoltage = v;
        }
        if let Some(v) = self.vth_equal_exemption {
            options.vth_equal_exemption = v;
        }
        if let Some(v) = self.min_vth_gate_exemption {
            options.min_vth_gate_exemption = v;
        }
        if let Some(v) = self.port_limit {
            options.port_limit = v;
        }
    }
}
