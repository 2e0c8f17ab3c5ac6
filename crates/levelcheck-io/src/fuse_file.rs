//! Fuse-override file reader (distilled spec §6): `deviceName
//! fuse_on|fuse_off` lines, `#`-comments. A line naming a device that is
//! not a fuse model in the current model library is logged as a warning
//! and otherwise ignored (distilled spec §9 Open Question: "the override
//! is ignored and the model type is unchanged").

use std::collections::HashMap;

use levelcheck_core::DeviceType;

use crate::error::{IoError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FuseOverride {
    On,
    Off,
}

impl FuseOverride {
    fn as_device_type(self) -> DeviceType {
        match self {
            FuseOverride::On => DeviceType::FuseOn,
            FuseOverride::Off => DeviceType::FuseOff,
        }
    }
}

/// All overrides parsed from one fuse file, keyed by device name.
#[derive(Debug, Default)]
pub struct FuseOverrides {
    overrides: HashMap<String, FuseOverride>,
}

impl FuseOverrides {
    pub fn parse(path: &str, contents: &str) -> Result<Self> {
        let mut overrides = HashMap::new();
        for (index, raw_line) in contents.lines().enumerate() {
            let line_no = index + 1;
            let line = strip_comment(raw_line).trim();
            if line.is_empty() {
                continue;
            }
            let mut parts = line.split_whitespace();
            let name = parts.next().ok_or_else(|| malformed(path, line_no, line))?;
            let state = parts.next().ok_or_else(|| malformed(path, line_no, line))?;
            if parts.next().is_some() {
                return Err(malformed(path, line_no, line));
            }
            let state = match state.to_ascii_lowercase().as_str() {
                "fuse_on" => FuseOverride::On,
                "fuse_off" => FuseOverride::Off,
                _ => return Err(malformed(path, line_no, line)),
            };
            overrides.insert(name.to_string(), state);
        }
        Ok(Self { overrides })
    }

    pub fn is_empty(&self) -> bool {
        self.overrides.is_empty()
    }

    pub fn len(&self) -> usize {
        self.overrides.len()
    }

    /// Resolve the effective device type for a device named `name` whose
    /// model-declared type is `declared`. Overrides apply only to devices
    /// already typed as `FUSE_ON`/`FUSE_OFF`; a line naming any other
    /// device is logged and the declared type passes through unchanged.
    pub fn resolve(&self, name: &str, declared: DeviceType) -> DeviceType {
        match self.overrides.get(name) {
            Some(&state) if declared.is_fuse() => state.as_device_type(),
            Some(_) => {
                log::warn!("fuse override for {name:?} ignored: not a fuse device ({declared:?})");
                declared
            }
            None => declared,
        }
    }
}

fn malformed(path: &str, line: usize, text: &str) -> IoError {
    IoError::MalformedNetlistLine { path: path.to_string(), line, text: text.to_string() }
}

fn strip_comment(line: &str) -> &str {
    match line.find('#') {
        Some(idx) => &line[..idx],
        None => line,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_on_and_off_lines() {
        let contents = "F1 fuse_off\nF2 fuse_on\n# comment\n\n";
        let overrides = FuseOverrides::parse("f.fuse", contents).unwrap();
        assert_eq!(overrides.len(), 2);
        assert_eq!(overrides.resolve("F1", DeviceType::FuseOn), DeviceType::FuseOff);
        assert_eq!(overrides.resolve("F2", DeviceType::FuseOff), DeviceType::FuseOn);
    }

    #[test]
    fn override_on_non_fuse_device_is_ignored() {
        let overrides = FuseOverrides::parse("f.fuse", "M1 fuse_on\n").unwrap();
        assert_eq!(overrides.resolve("M1", DeviceType::Nmos), DeviceType::Nmos);
    }

    #[test]
    fn unrecognized_state_is_malformed() {
        let err = FuseOverrides::parse("f.fuse", "F1 maybe\n").unwrap_err();
        assert!(matches!(err, IoError::MalformedNetlistLine { .. }));
    }
}
