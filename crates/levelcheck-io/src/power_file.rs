//! Power-file reader (distilled spec §6): one declaration per non-comment
//! line, `#define NAME value` macro expansion, and family tags that make
//! two declarations relatives. Grammar (after macro expansion), one
//! declaration per line:
//!
//! ```text
//! <pattern> [family=<name>] [alias=<name>]
//!           (min@<value> | sim@<value> | max@<value> | power | input | hiz | reference)*
//!           [expected (open | (min@<value>|sim@<value>|max@<value>)+)]
//! ```
//!
//! `<value>` is a literal (`1.8`, `1.5u`) or a bare symbolic name resolved
//! against another declaration's voltage of the same kind once the whole
//! file is loaded.

use std::collections::HashMap;

use levelcheck_core::FamilyId;
use levelcheck_power::{ExpectedVoltage, PowerDeclaration, PowerFlags, PowerSpec, SignalPattern, VoltageRef};

use crate::error::{IoError, Result};

/// Parse a power file's contents into a [`PowerSpec`]. `path` is only used
/// to annotate diagnostics.
pub fn read_power_file(path: &str, contents: &str) -> Result<PowerSpec> {
    let mut macros: HashMap<String, String> = HashMap::new();
    let mut families: HashMap<String, FamilyId> = HashMap::new();
    let mut next_family = 0u32;
    let mut spec = PowerSpec::new();

    for (index, raw_line) in contents.lines().enumerate() {
        let line_no = index + 1;
        let line = strip_comment(raw_line).trim();
        if line.is_empty() {
            continue;
        }
        if let Some(rest) = line.strip_prefix("#define") {
            let mut parts = rest.split_whitespace();
            let name = parts.next().ok_or_else(|| malformed(path, line_no, line))?;
            let value = parts.next().ok_or_else(|| malformed(path, line_no, line))?;
            macros.insert(name.to_string(), value.to_string());
            continue;
        }

        let expanded = expand_macros(line, &macros);
        let declaration = parse_line(path, line_no, &expanded, &mut families, &mut next_family)?;
        spec.push(declaration);
    }

    Ok(spec)
}

fn malformed(path: &str, line: usize, text: &str) -> IoError {
    IoError::MalformedPowerLine { path: path.to_string(), line, text: text.to_string() }
}

fn strip_comment(line: &str) -> &str {
    match line.find('#') {
        Some(idx) => &line[..idx],
        None => line,
    }
}

/// Whole-token textual substitution: a token is replaced if it matches a
/// macro name exactly, or if the text following an `@` within a token does.
fn expand_macros(line: &str, macros: &HashMap<String, String>) -> String {
    line.split_whitespace()
        .map(|token| {
            if let Some(value) = macros.get(token) {
                return value.clone();
            }
            if let Some((prefix, suffix)) = token.split_once('@') {
                if let Some(value) = macros.get(suffix) {
                    return format!("{prefix}@{value}");
                }
            }
            token.to_string()
        })
        .collect::<Vec<_>>()
        .join(" ")
}

fn parse_value_ref(text: &str) -> VoltageRef {
    match levelcheck_model::parse_scaled_number(text) {
        Some(volts) => VoltageRef::literal(volts),
        None => VoltageRef::symbolic(text),
    }
}

fn parse_line(
    path: &str,
    line_no: usize,
    line: &str,
    families: &mut HashMap<String, FamilyId>,
    next_family: &mut u32,
) -> Result<PowerDeclaration> {
    let mut tokens = line.split_whitespace();
    let pattern = tokens.next().ok_or_else(|| malformed(path, line_no, line))?;

    let mut family_name: Option<String> = None;
    let mut alias: Option<String> = None;
    let mut min = None;
    let mut sim = None;
    let mut max = None;
    let mut flags = PowerFlags::empty();
    let mut expected: Option<ExpectedVoltage> = None;

    let remaining: Vec<&str> = tokens.collect();
    let mut index = 0;
    while index < remaining.len() {
        let token = remaining[index];
        if let Some(name) = token.strip_prefix("family=") {
            family_name = Some(name.to_string());
        } else if let Some(name) = token.strip_prefix("alias=") {
            alias = Some(name.to_string());
        } else if let Some(value) = token.strip_prefix("min@") {
            min = Some(parse_value_ref(value));
        } else if let Some(value) = token.strip_prefix("sim@") {
            sim = Some(parse_value_ref(value));
        } else if let Some(value) = token.strip_prefix("max@") {
            max = Some(parse_value_ref(value));
        } else {
            match token.to_ascii_lowercase().as_str() {
                "power" => flags |= PowerFlags::POWER,
                "input" => flags |= PowerFlags::INPUT,
                "hiz" => flags |= PowerFlags::HIZ,
                "reference" => flags |= PowerFlags::REFERENCE,
                "resistor" => flags |= PowerFlags::RESISTOR,
                "override" => flags |= PowerFlags::INTERNAL_OVERRIDE,
                "open" => expected = Some(ExpectedVoltage::Open),
                "expected" => {
                    let (parsed, consumed) = parse_expected(&remaining[index + 1..]);
                    expected = Some(parsed);
                    index += consumed;
                }
                _ => return Err(malformed(path, line_no, line)),
            }
        }
        index += 1;
    }

    let family = match family_name {
        Some(name) => *families.entry(name).or_insert_with(|| {
            let id = FamilyId::new(*next_family);
            *next_family += 1;
            id
        }),
        None => {
            let id = FamilyId::new(*next_family);
            *next_family += 1;
            id
        }
    };

    let mut declaration = PowerDeclaration::new(SignalPattern::new(pattern), family).with_flags(flags);
    if let Some(min) = min {
        declaration = declaration.with_min(min);
    }
    if let Some(sim) = sim {
        declaration = declaration.with_sim(sim);
    }
    if let Some(max) = max {
        declaration = declaration.with_max(max);
    }
    if let Some(alias) = alias {
        declaration = declaration.with_alias(alias);
    }
    if let Some(expected) = expected {
        declaration = declaration.with_expected(expected);
    }

    Ok(declaration)
}

/// Parse the tail of an `expected` clause: either the bare keyword `open`,
/// or one or more `min@/sim@/max@` value refs. Returns the parsed value and
/// how many tokens it consumed.
fn parse_expected(tail: &[&str]) -> (ExpectedVoltage, usize) {
    if tail.first() == Some(&"open") {
        return (ExpectedVoltage::Open, 1);
    }
    let mut min = None;
    let mut sim = None;
    let mut max = None;
    let mut consumed = 0;
    for token in tail {
        if let Some(value) = token.strip_prefix("min@") {
            min = Some(parse_value_ref(value));
        } else if let Some(value) = token.strip_prefix("sim@") {
            sim = Some(parse_value_ref(value));
        } else if let Some(value) = token.strip_prefix("max@") {
            max = Some(parse_value_ref(value));
        } else {
            break;
        }
        consumed += 1;
    }
    (ExpectedVoltage::Triplet { min, sim, max }, consumed)
}
