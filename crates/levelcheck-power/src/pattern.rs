//! Signal-pattern matching for power declarations: a power-file line names
//! a net pattern, not a single net, so that e.g. `VDD*` covers every
//! `VDD`, `VDD1`, `VDDCORE` net a hierarchy happens to produce.

/// A `*`-glob pattern over a signal name. Only `*` is special; every other
/// character matches literally. `?` is not supported, matching the line
/// format's own minimal grammar.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignalPattern {
    raw: String,
}

impl SignalPattern {
    pub fn new(raw: impl Into<String>) -> Self {
        Self { raw: raw.into() }
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }

    pub fn is_literal(&self) -> bool {
        !self.raw.contains('*')
    }

    pub fn matches(&self, signal: &str) -> bool {
        glob_match(&self.raw, signal)
    }
}

fn glob_match(pattern: &str, text: &str) -> bool {
    let pattern: Vec<char> = pattern.chars().collect();
    let text: Vec<char> = text.chars().collect();
    match_from(&pattern, &text)
}

fn match_from(pattern: &[char], text: &[char]) -> bool {
    match pattern.split_first() {
        None => text.is_empty(),
        Some((&'*', rest)) => {
            if match_from(rest, text) {
                return true;
            }
            !text.is_empty() && match_from(pattern, &text[1..])
        }
        Some((&c, rest)) => match text.split_first() {
            Some((&t, trest)) if t == c => match_from(rest, trest),
            _ => false,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn literal_pattern_matches_exact_only() {
        let p = SignalPattern::new("VDD");
        assert!(p.is_literal());
        assert!(p.matches("VDD"));
        assert!(!p.matches("VDD1"));
    }

    #[test]
    fn star_suffix_matches_prefix_family() {
        let p = SignalPattern::new("VDD*");
        assert!(!p.is_literal());
        assert!(p.matches("VDD"));
        assert!(p.matches("VDD1"));
        assert!(p.matches("VDDCORE"));
        assert!(!p.matches("AVDD"));
    }

    #[test]
    fn star_in_middle_matches_any_infix() {
        let p = SignalPattern::new("VDD*CORE");
        assert!(p.matches("VDDCORE"));
        assert!(p.matches("VDD_1_CORE"));
        assert!(!p.matches("VDDCOR"));
    }
}
