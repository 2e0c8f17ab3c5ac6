//! All power declarations from one power file, with signal lookup and
//! family-relation queries.

use levelcheck_core::FamilyId;

use crate::declaration::PowerDeclaration;

/// The full power-intent specification: an ordered list of declarations,
/// first-match-wins on signal lookup (mirroring the line-by-line precedence
/// of the source file, most-specific-first by convention).
#[derive(Debug, Default)]
pub struct PowerSpec {
    declarations: Vec<PowerDeclaration>,
}

impl PowerSpec {
    pub fn new() -> Self {
        Self { declarations: Vec::new() }
    }

    pub fn push(&mut self, declaration: PowerDeclaration) {
        self.declarations.push(declaration);
    }

    pub fn find_for_signal(&self, signal: &str) -> Option<&PowerDeclaration> {
        self.declarations.iter().find(|d| d.matches_signal(signal))
    }

    pub fn are_relatives(&self, a: &str, b: &str) -> bool {
        match (self.find_for_signal(a), self.find_for_signal(b)) {
            (Some(da), Some(db)) => da.is_relative(db),
            _ => false,
        }
    }

    pub fn family_members(&self, family: FamilyId) -> impl Iterator<Item = &PowerDeclaration> {
        self.declarations.iter().filter(move |d| d.family == family)
    }

    pub fn iter(&self) -> impl Iterator<Item = &PowerDeclaration> {
        self.declarations.iter()
    }

    pub fn len(&self) -> usize {
        self.declarations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.declarations.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pattern::SignalPattern;

    #[test]
    fn lookup_returns_first_matching_declaration() {
        let mut spec = PowerSpec::new();
        spec.push(PowerDeclaration::new(SignalPattern::new("VDD*"), FamilyId::new(0)));
        spec.push(PowerDeclaration::new(SignalPattern::new("VDDCORE"), FamilyId::new(1)));

        let found = spec.find_for_signal("VDDCORE").unwrap();
        assert_eq!(found.family, FamilyId::new(0));
    }

    #[test]
    fn relatives_share_family_across_patterns() {
        let mut spec = PowerSpec::new();
        spec.push(PowerDeclaration::new(SignalPattern::new("VDD"), FamilyId::new(5)));
        spec.push(PowerDeclaration::new(SignalPattern::new("VDDIO"), FamilyId::new(5)));
        spec.push(PowerDeclaration::new(SignalPattern::new("VBAT"), FamilyId::new(6)));

        assert!(spec.are_relatives("VDD", "VDDIO"));
        assert!(!spec.are_relatives("VDD", "VBAT"));
        assert!(!spec.are_relatives("VDD", "UNKNOWN_NET"));
    }
}
