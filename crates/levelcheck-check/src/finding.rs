//! The in-memory counterpart of an "error record" (distilled spec §3):
//! what a checker function returns before it is formatted to the error
//! stream. Every checker in [`crate::checks`] returns `Vec<Finding>`
//! rather than writing directly, so tests can assert on structured output
//! without scraping text (SPEC_FULL §3).

use levelcheck_core::{DeviceId, NetId};

/// The category tag a [`Finding`] carries, matching the distilled spec's
/// §4.6 table one-to-one. `Display` produces the tag text used in the
/// error-stream header line (e.g. scenario 2's `Overvoltage Error:Gate vs
/// Source/Drain:`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    FusePath,
    VoltageConflict,
    OvervoltageVbg,
    OvervoltageVbs,
    OvervoltageVds,
    OvervoltageVgs,
    GateVsSourceDrain,
    UnrelatedPower,
    SourceVsBulk,
    ForwardDiode,
    PossibleLeak,
    FloatingInput,
    ExpectedVoltage,
    LddDirection,
}

impl Category {
    /// The tag line printed ahead of a category's device snapshots in the
    /// error stream, matching the distilled spec's naming
    /// (`Overvoltage Error:Gate vs Source/Drain:`, etc.).
    pub fn header(self) -> &'static str {
        match self {
            Category::FusePath => "Fuse Error:",
            Category::VoltageConflict => "Voltage Conflict Error:MOS Diode:",
            Category::OvervoltageVbg => "Overvoltage Error:Bulk vs Gate:",
            Category::OvervoltageVbs => "Overvoltage Error:Bulk vs Source:",
            Category::OvervoltageVds => "Overvoltage Error:Drain vs Source:",
            Category::OvervoltageVgs => "Overvoltage Error:Gate vs Source/Drain:",
            Category::GateVsSourceDrain => "Gate Error:Gate vs Source/Drain:",
            Category::UnrelatedPower => "Warning:Unrelated Power:",
            Category::SourceVsBulk => "Bias Error:Source/Drain vs Bulk:",
            Category::ForwardDiode => "Forward Diode Error:",
            Category::PossibleLeak => "Leak Error:Possible Leakage:",
            Category::FloatingInput => "Hi-Z Input Error:",
            Category::ExpectedVoltage => "Expected Voltage Error:",
            Category::LddDirection => "LDD Direction Error:",
        }
    }

    /// The short machine tag used in tests and one-line summaries, mirroring
    /// the distilled spec's in-text tokens (`OVERVOLTAGE_VGS`,
    /// `FORWARD_DIODE`, `HIZ_INPUT`, `EXPECTED_VOLTAGE`, ...).
    pub fn tag(self) -> &'static str {
        match self {
            Category::FusePath => "FUSE_ERROR",
            Category::VoltageConflict => "VOLTAGE_CONFLICT",
            Category::OvervoltageVbg => "OVERVOLTAGE_VBG",
            Category::OvervoltageVbs => "OVERVOLTAGE_VBS",
            Category::OvervoltageVds => "OVERVOLTAGE_VDS",
            Category::OvervoltageVgs => "OVERVOLTAGE_VGS",
            Category::GateVsSourceDrain => "GATE_SOURCE_ERROR",
            Category::UnrelatedPower => "UNRELATED_POWER",
            Category::SourceVsBulk => "BIAS_ERROR",
            Category::ForwardDiode => "FORWARD_DIODE",
            Category::PossibleLeak => "LEAK_ERROR",
            Category::FloatingInput => "HIZ_INPUT",
            Category::ExpectedVoltage => "EXPECTED_VOLTAGE",
            Category::LddDirection => "LDD_DIRECTION",
        }
    }

    /// Every category, in the distilled spec §4.6 table order; the
    /// orchestrator in [`crate::checker::RuleChecker`] runs them in this
    /// order so error-stream output is reproducible run to run.
    pub const ALL: [Category; 14] = [
        Category::FusePath,
        Category::VoltageConflict,
        Category::OvervoltageVbg,
        Category::OvervoltageVbs,
        Category::OvervoltageVds,
        Category::OvervoltageVgs,
        Category::GateVsSourceDrain,
        Category::UnrelatedPower,
        Category::SourceVsBulk,
        Category::ForwardDiode,
        Category::PossibleLeak,
        Category::FloatingInput,
        Category::ExpectedVoltage,
        Category::LddDirection,
    ];
}

/// One emitted finding: a category, the device and/or net it implicates,
/// an explanation, and the device-connection snapshot lines printed
/// underneath it in the error stream.
#[derive(Debug, Clone)]
pub struct Finding {
    pub category: Category,
    pub device: Option<DeviceId>,
    pub net: Option<NetId>,
    pub message: String,
    pub connections: Vec<String>,
    /// Set on the overvoltage checkers' "(logic ok)" variant (distilled
    /// spec §4.6): the hard min/max check passed but the leak-voltage maps
    /// still show the violation, only reported when `leak_overvoltage` is
    /// set.
    pub logic_ok: bool,
    /// Estimated leak current in amps, carried through from the possible-
    /// leak and MOS-diode voltage-conflict checkers.
    pub estimated_current: Option<f64>,
    /// Set by the floating-input checker: the implicated device's channel
    /// was not evaluated during the sim pass because its gate never
    /// resolved to a committed voltage (distilled spec scenario 4, "the
    /// device with that gate is marked SIM_INACTIVE").
    pub sim_inactive: bool,
}

impl Finding {
    pub fn new(category: Category, message: impl Into<String>) -> Self {
        Self {
            category,
            device: None,
            net: None,
            message: message.into(),
            connections: Vec::new(),
            logic_ok: false,
            estimated_current: None,
            sim_inactive: false,
        }
    }

    pub fn with_device(mut self, device: DeviceId) -> Self {
        self.device = Some(device);
        self
    }

    pub fn with_net(mut self, net: NetId) -> Self {
        self.net = Some(net);
        self
    }

    pub fn with_connections(mut self, connections: Vec<String>) -> Self {
        self.connections = connections;
        self
    }

    pub fn logic_ok(mut self) -> Self {
        self.logic_ok = true;
        self
    }

    pub fn with_estimated_current(mut self, current: f64) -> Self {
        self.estimated_current = Some(current);
        self
    }

    pub fn sim_inactive(mut self) -> Self {
        self.sim_inactive = true;
        self
    }
}
