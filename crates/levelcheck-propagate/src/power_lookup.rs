//! Resolves a power-file voltage reference (literal or symbolic) against a
//! loaded [`PowerSpec`], following symbolic chains iteratively with a
//! bounded hop count so a typo'd self-reference can't hang the seed pass.

use levelcheck_core::Voltage;
use levelcheck_power::{PowerSpec, VoltageRef};

const MAX_SYMBOLIC_HOPS: u32 = 16;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VoltageKind {
    Min,
    Sim,
    Max,
}

fn declared(spec: &PowerSpec, signal: &str, kind: VoltageKind) -> Option<VoltageRef> {
    let decl = spec.find_for_signal(signal)?;
    match kind {
        VoltageKind::Min => decl.min.clone(),
        VoltageKind::Sim => decl.sim.clone(),
        VoltageKind::Max => decl.max.clone(),
    }
}

/// Resolve `reference` (which may itself be symbolic) to a concrete
/// voltage, by repeatedly following [`VoltageRef::Symbolic`] names back
/// into `spec` until a literal is found, an unknown name is hit, or the hop
/// budget is exhausted.
pub fn resolve(spec: &PowerSpec, kind: VoltageKind, reference: &VoltageRef) -> Option<Voltage> {
    let mut current = reference.clone();
    for _ in 0..MAX_SYMBOLIC_HOPS {
        match current {
            VoltageRef::Literal(v) => return Some(v),
            VoltageRef::Symbolic(name) => match declared(spec, &name, kind) {
                Some(next) => current = next,
                None => return None,
            },
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use levelcheck_core::FamilyId;
    use levelcheck_power::{PowerDeclaration, SignalPattern};

    #[test]
    fn literal_resolves_directly() {
        let spec = PowerSpec::new();
        let value = resolve(&spec, VoltageKind::Min, &VoltageRef::literal(1.2));
        assert_eq!(value, Some(Voltage::from_volts(1.2)));
    }

    #[test]
    fn symbolic_chain_follows_to_literal() {
        let mut spec = PowerSpec::new();
        spec.push(
            PowerDeclaration::new(SignalPattern::new("VDD_CORE"), FamilyId::new(0))
                .with_sim(VoltageRef::literal(1.2)),
        );
        let value = resolve(&spec, VoltageKind::Sim, &VoltageRef::symbolic("VDD_CORE"));
        assert_eq!(value, Some(Voltage::from_volts(1.2)));
    }

    #[test]
    fn unknown_symbolic_reference_is_none() {
        let spec = PowerSpec::new();
        let value = resolve(&spec, VoltageKind::Max, &VoltageRef::symbolic("MISSING"));
        assert_eq!(value, None);
    }
}
