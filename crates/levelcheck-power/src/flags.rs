//! The power declaration's type bitset: a net can simultaneously be e.g.
//! a declared supply *and* high-impedance *and* a relation reference, so
//! these are flags rather than an enum.

use bitflags::bitflags;

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct PowerFlags: u32 {
        /// Declared supply/ground net.
        const POWER = 1 << 0;
        /// Declared primary input net.
        const INPUT = 1 << 1;
        /// High-impedance: may float, suppress some leak/floating checks.
        const HIZ = 1 << 2;
        /// Participates in relation-family checks without itself being a
        /// supply (e.g. a reference/bias net).
        const REFERENCE = 1 << 3;
        /// Treated as a resistor-backed net for bias-path comparisons.
        const RESISTOR = 1 << 4;
        /// Min voltage is propagator-calculated, not user-declared.
        const MIN_CALCULATED = 1 << 5;
        /// Sim voltage is propagator-calculated, not user-declared.
        const SIM_CALCULATED = 1 << 6;
        /// Max voltage is propagator-calculated, not user-declared.
        const MAX_CALCULATED = 1 << 7;
        /// An explicit user override that takes precedence over whatever
        /// the propagator would otherwise compute for this net.
        const INTERNAL_OVERRIDE = 1 << 8;
        /// Carries an expected-voltage triplet checked post-propagation.
        const EXPECTED = 1 << 9;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flags_compose() {
        let f = PowerFlags::POWER | PowerFlags::HIZ;
        assert!(f.contains(PowerFlags::POWER));
        assert!(f.contains(PowerFlags::HIZ));
        assert!(!f.contains(PowerFlags::INPUT));
    }

    #[test]
    fn calculated_flags_are_distinct_bits() {
        assert_ne!(PowerFlags::MIN_CALCULATED, PowerFlags::SIM_CALCULATED);
        assert_ne!(PowerFlags::SIM_CALCULATED, PowerFlags::MAX_CALCULATED);
    }
}
