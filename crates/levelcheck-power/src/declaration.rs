//! One power-file line: a signal pattern plus the voltage intent and type
//! flags that apply to every net it matches.

use levelcheck_core::FamilyId;

use crate::flags::PowerFlags;
use crate::pattern::SignalPattern;
use crate::voltage_ref::VoltageRef;

/// The declared-vs-propagated check target: an expected min/sim/max triplet,
/// or an explicit "open" (the net must end up floating / HIZ).
#[derive(Debug, Clone, PartialEq)]
pub enum ExpectedVoltage {
    Open,
    Triplet {
        min: Option<VoltageRef>,
        sim: Option<VoltageRef>,
        max: Option<VoltageRef>,
    },
}

#[derive(Debug, Clone)]
pub struct PowerDeclaration {
    pub pattern: SignalPattern,
    pub min: Option<VoltageRef>,
    pub sim: Option<VoltageRef>,
    pub max: Option<VoltageRef>,
    pub family: FamilyId,
    pub flags: PowerFlags,
    pub expected: Option<ExpectedVoltage>,
    /// An alias name this declaration is also known by, for expected-voltage
    /// matching against either the canonical pattern or the alias.
    pub alias: Option<String>,
}

impl PowerDeclaration {
    pub fn new(pattern: SignalPattern, family: FamilyId) -> Self {
        Self {
            pattern,
            min: None,
            max: None,
            sim: None,
            family,
            flags: PowerFlags::empty(),
            expected: None,
            alias: None,
        }
    }

    pub fn with_min(mut self, min: VoltageRef) -> Self {
        self.min = Some(min);
        self
    }

    pub fn with_sim(mut self, sim: VoltageRef) -> Self {
        self.sim = Some(sim);
        self
    }

    pub fn with_max(mut self, max: VoltageRef) -> Self {
        self.max = Some(max);
        self
    }

    pub fn with_flags(mut self, flags: PowerFlags) -> Self {
        self.flags |= flags;
        self
    }

    pub fn with_expected(mut self, expected: ExpectedVoltage) -> Self {
        self.expected = Some(expected);
        self.flags |= PowerFlags::EXPECTED;
        self
    }

    pub fn with_alias(mut self, alias: impl Into<String>) -> Self {
        self.alias = Some(alias.into());
        self
    }

    pub fn matches_signal(&self, signal: &str) -> bool {
        self.pattern.matches(signal) || self.alias.as_deref() == Some(signal)
    }

    pub fn is_relative(&self, other: &PowerDeclaration) -> bool {
        self.family == other.family
    }
}
