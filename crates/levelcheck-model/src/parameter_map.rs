//! Parsing of a device's raw `key=value ...` parameter string into a map,
//! plus the tiny expression evaluator conditions and resistance definitions
//! are checked against.

use std::collections::HashMap;

/// A parsed `W=1u L=0.15u nf=2` style parameter string.
#[derive(Debug, Clone, Default)]
pub struct ParameterMap {
    values: HashMap<String, String>,
}

impl ParameterMap {
    pub fn parse(parameters: &str) -> Self {
        let mut values = HashMap::new();
        for token in parameters.split_whitespace() {
            if let Some((key, value)) = token.split_once('=') {
                values.insert(key.to_ascii_uppercase(), value.to_string());
            }
        }
        Self { values }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(&key.to_ascii_uppercase()).map(String::as_str)
    }

    pub fn get_numeric(&self, key: &str) -> Option<f64> {
        parse_scaled_number(self.get(key)?)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.values.contains_key(&key.to_ascii_uppercase())
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Parse a SPICE-style scaled numeric literal: `1.5u`, `2.2K`, `100n`, `1meg`.
/// Returns `None` for non-numeric text.
pub fn parse_scaled_number(text: &str) -> Option<f64> {
    let text = text.trim();
    if text.is_empty() {
        return None;
    }
    let split_at = text
        .find(|c: char| !(c.is_ascii_digit() || c == '.' || c == '-' || c == '+' || c == 'e' || c == 'E'))
        .unwrap_or(text.len());
    let (number, suffix) = text.split_at(split_at);
    let base: f64 = number.parse().ok()?;
    let scale = match suffix.to_ascii_lowercase().as_str() {
        "" => 1.0,
        "t" => 1e12,
        "g" => 1e9,
        "meg" => 1e6,
        "k" => 1e3,
        "m" => 1e-3,
        "u" => 1e-6,
        "n" => 1e-9,
        "p" => 1e-12,
        "f" => 1e-15,
        _ => return None,
    };
    Some(base * scale)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_key_value_pairs_case_insensitively() {
        let map = ParameterMap::parse("W=1u L=0.15u nf=2");
        assert_eq!(map.get("w"), Some("1u"));
        assert_eq!(map.get_numeric("L"), Some(0.15e-6));
        assert_eq!(map.get_numeric("nf"), Some(2.0));
    }

    #[test]
    fn scaled_suffixes_resolve() {
        assert_eq!(parse_scaled_number("1.5k"), Some(1500.0));
        assert_eq!(parse_scaled_number("2meg"), Some(2_000_000.0));
        assert_eq!(parse_scaled_number("100n"), Some(100e-9));
        assert_eq!(parse_scaled_number("bogus"), None);
    }

    #[test]
    fn missing_key_is_none() {
        let map = ParameterMap::parse("W=1u");
        assert_eq!(map.get("L"), None);
        assert!(!map.contains("L"));
    }
}
