//! Model-selection conditions: a model only applies to a device whose
//! parameter map satisfies every condition in its list, e.g. `L<0.5u` or
//! `nf=2`. Conditions are how one base model key (e.g. a single `.model`
//! card) fans out into several [`crate::Model`] entries distinguished by
//! geometry.

use std::fmt;

use crate::parameter_map::{parse_scaled_number, ParameterMap};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Comparator {
    Lt,
    Le,
    Gt,
    Ge,
    Eq,
    Ne,
}

impl Comparator {
    fn apply(self, lhs: f64, rhs: f64) -> bool {
        match self {
            Comparator::Lt => lhs < rhs,
            Comparator::Le => lhs <= rhs,
            Comparator::Gt => lhs > rhs,
            Comparator::Ge => lhs >= rhs,
            Comparator::Eq => (lhs - rhs).abs() < f64::EPSILON,
            Comparator::Ne => (lhs - rhs).abs() >= f64::EPSILON,
        }
    }
}

impl fmt::Display for Comparator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Comparator::Lt => "<",
            Comparator::Le => "<=",
            Comparator::Gt => ">",
            Comparator::Ge => ">=",
            Comparator::Eq => "=",
            Comparator::Ne => "!=",
        };
        write!(f, "{s}")
    }
}

/// A single `key<op><value>` clause, e.g. `L<0.5u`.
#[derive(Debug, Clone)]
pub struct Condition {
    pub key: String,
    pub comparator: Comparator,
    pub value: f64,
}

impl Condition {
    /// Parse a single clause. Longer operators (`<=`, `>=`, `!=`) are tried
    /// before their one-character prefixes.
    pub fn parse(clause: &str) -> Option<Condition> {
        const OPERATORS: &[(&str, Comparator)] = &[
            ("<=", Comparator::Le),
            (">=", Comparator::Ge),
            ("!=", Comparator::Ne),
            ("<", Comparator::Lt),
            (">", Comparator::Gt),
            ("=", Comparator::Eq),
        ];
        for (token, comparator) in OPERATORS {
            if let Some(idx) = clause.find(token) {
                let key = clause[..idx].trim().to_ascii_uppercase();
                let value = parse_scaled_number(clause[idx + token.len()..].trim())?;
                if key.is_empty() {
                    return None;
                }
                return Some(Condition { key, comparator: *comparator, value });
            }
        }
        None
    }

    pub fn matches(&self, parameters: &ParameterMap) -> bool {
        match parameters.get_numeric(&self.key) {
            Some(actual) => self.comparator.apply(actual, self.value),
            None => false,
        }
    }
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}{}", self.key, self.comparator, self.value)
    }
}

/// A space-separated list of [`Condition`]s; a device matches only if every
/// clause matches (conjunction), matching the all-or-nothing semantics of
/// model-selection conditions.
#[derive(Debug, Clone, Default)]
pub struct ConditionList {
    conditions: Vec<Condition>,
}

impl ConditionList {
    pub fn parse(text: &str) -> Self {
        let conditions = text
            .split_whitespace()
            .filter_map(Condition::parse)
            .collect();
        Self { conditions }
    }

    pub fn matches(&self, parameters: &ParameterMap) -> bool {
        self.conditions.iter().all(|c| c.matches(parameters))
    }

    pub fn is_empty(&self) -> bool {
        self.conditions.is_empty()
    }

    pub fn len(&self) -> usize {
        self.conditions.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_each_operator() {
        assert!(matches!(Condition::parse("L<0.5u").unwrap().comparator, Comparator::Lt));
        assert!(matches!(Condition::parse("L<=0.5u").unwrap().comparator, Comparator::Le));
        assert!(matches!(Condition::parse("nf>=2").unwrap().comparator, Comparator::Ge));
        assert!(matches!(Condition::parse("nf!=2").unwrap().comparator, Comparator::Ne));
        assert!(matches!(Condition::parse("W=1u").unwrap().comparator, Comparator::Eq));
    }

    #[test]
    fn empty_condition_list_always_matches() {
        let list = ConditionList::parse("");
        let params = ParameterMap::parse("W=1u");
        assert!(list.matches(&params));
    }

    #[test]
    fn conjunction_requires_all_clauses() {
        let list = ConditionList::parse("L<0.5u nf=2");
        let matching = ParameterMap::parse("L=0.15u nf=2");
        let non_matching = ParameterMap::parse("L=0.15u nf=1");
        assert!(list.matches(&matching));
        assert!(!list.matches(&non_matching));
    }

    #[test]
    fn missing_parameter_fails_match() {
        let list = ConditionList::parse("nf=2");
        let params = ParameterMap::parse("L=0.15u");
        assert!(!list.matches(&params));
    }
}
