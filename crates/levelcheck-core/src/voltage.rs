//! Voltage labels: a signed, fixed-point value scaled by [`VOLTAGE_SCALE`],
//! plus the [`Voltage::UNKNOWN`] sentinel used throughout propagation for
//! "no bound established yet".

use std::fmt;
use std::ops::{Add, Sub};

/// Millivolt scale: one stored unit equals 1mV. Chosen so that device
/// thresholds (tenths and hundredths of a volt) round-trip exactly through
/// integer arithmetic, matching the original tool's fixed-point voltage type.
pub const VOLTAGE_SCALE: i64 = 1000;

/// A voltage label, or [`Voltage::UNKNOWN`] if no bound has been
/// established for the net/terminal yet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Voltage(i64);

impl Voltage {
    /// Sentinel meaning "not yet known". Deliberately far outside any
    /// realistic device voltage so min/max comparisons never confuse it
    /// with a real bound by accident; call sites must check
    /// [`Voltage::is_known`] rather than relying on ordering against it.
    pub const UNKNOWN: Voltage = Voltage(i64::MIN);

    pub const ZERO: Voltage = Voltage(0);

    /// Construct from whole/fractional volts.
    pub fn from_volts(volts: f64) -> Self {
        Voltage((volts * VOLTAGE_SCALE as f64).round() as i64)
    }

    /// Construct from a pre-scaled millivolt value.
    pub const fn from_millivolts(mv: i64) -> Self {
        Voltage(mv)
    }

    pub fn is_known(self) -> bool {
        self != Self::UNKNOWN
    }

    pub fn as_volts(self) -> f64 {
        self.0 as f64 / VOLTAGE_SCALE as f64
    }

    pub const fn as_millivolts(self) -> i64 {
        self.0
    }

    /// Absolute value; `UNKNOWN` stays `UNKNOWN`.
    pub fn abs(self) -> Voltage {
        if !self.is_known() {
            return self;
        }
        Voltage(self.0.abs())
    }

    /// `Some(self - other)` iff both operands are known.
    pub fn checked_diff(self, other: Voltage) -> Option<Voltage> {
        if self.is_known() && other.is_known() {
            Some(Voltage(self.0 - other.0))
        } else {
            None
        }
    }
}

impl Add for Voltage {
    type Output = Voltage;
    fn add(self, rhs: Voltage) -> Voltage {
        if !self.is_known() || !rhs.is_known() {
            return Voltage::UNKNOWN;
        }
        Voltage(self.0 + rhs.0)
    }
}

impl Sub for Voltage {
    type Output = Voltage;
    fn sub(self, rhs: Voltage) -> Voltage {
        if !self.is_known() || !rhs.is_known() {
            return Voltage::UNKNOWN;
        }
        Voltage(self.0 - rhs.0)
    }
}

impl fmt::Display for Voltage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if !self.is_known() {
            write!(f, "?")
        } else {
            write!(f, "{:.3}", self.as_volts())
        }
    }
}

/// A resistance in ohms, used to order the event queues (C8) and to
/// accumulate edge weights in the virtual-net maps (C7).
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub struct Resistance(pub f64);

impl Resistance {
    pub const ZERO: Resistance = Resistance(0.0);

    pub fn saturating_add(self, rhs: Resistance) -> Resistance {
        Resistance(self.0 + rhs.0)
    }
}

impl Eq for Resistance {}

impl Ord for Resistance {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.0.partial_cmp(&other.0).unwrap_or(std::cmp::Ordering::Equal)
    }
}
