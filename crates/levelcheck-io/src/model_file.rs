//! Model-file reader: one `modelKey: field=value ...` block per non-blank,
//! non-`#`-comment line (distilled spec §6). Multiple lines sharing a
//! `modelKey` accumulate into that key's variant list (`condition=` is what
//! lets [`levelcheck_model::ModelLibrary::find_model`] disambiguate them),
//! matching the original tool's `CModelListMap`.

use levelcheck_core::DeviceType;
use levelcheck_model::{Model, ModelLibrary, VoltageLimit};

use crate::error::{IoError, Result};

/// Parse a model file's contents into a [`ModelLibrary`]. `path` is only
/// used to annotate diagnostics.
pub fn read_model_file(path: &str, contents: &str) -> Result<ModelLibrary> {
    let mut library = ModelLibrary::new();
    for (index, raw_line) in contents.lines().enumerate() {
        let line_no = index + 1;
        let line = strip_comment(raw_line).trim();
        if line.is_empty() {
            continue;
        }
        let (key, model) = parse_line(path, line_no, line)?;
        library.add_model(key, model);
    }
    Ok(library)
}

fn strip_comment(line: &str) -> &str {
    match line.find('#') {
        Some(idx) => &line[..idx],
        None => line,
    }
}

fn parse_line(path: &str, line_no: usize, line: &str) -> Result<(String, Model)> {
    let (key, rest) = line.split_once(':').ok_or_else(|| IoError::MalformedModelLine {
        path: path.to_string(),
        line: line_no,
        text: line.to_string(),
    })?;
    let key = key.trim().to_string();
    if key.is_empty() {
        return Err(IoError::MalformedModelLine { path: path.to_string(), line: line_no, text: line.to_string() });
    }

    let mut device_type: Option<DeviceType> = None;
    let mut base_type = String::new();
    let mut max_vds = VoltageLimit::unknown();
    let mut max_vgs = VoltageLimit::unknown();
    let mut max_vbs = VoltageLimit::unknown();
    let mut max_vbg = VoltageLimit::unknown();
    let mut vth = None;
    let mut resistance_definition = String::new();
    let mut condition_text = String::new();

    for field in rest.split_whitespace() {
        let (field_key, value) = field.split_once('=').ok_or_else(|| IoError::MalformedModelLine {
            path: path.to_string(),
            line: line_no,
            text: line.to_string(),
        })?;
        match field_key.to_ascii_lowercase().as_str() {
            "type" => {
                base_type = value.to_string();
                device_type = Some(parse_device_type(value).ok_or_else(|| IoError::MalformedModelLine {
                    path: path.to_string(),
                    line: line_no,
                    text: line.to_string(),
                })?);
            }
            "vth" => vth = levelcheck_model::parse_scaled_number(value).map(levelcheck_core::Voltage::from_volts),
            "vds" => max_vds = VoltageLimit::new(value, parse_voltage(value)),
            "vgs" => max_vgs = VoltageLimit::new(value, parse_voltage(value)),
            "vbs" => max_vbs = VoltageLimit::new(value, parse_voltage(value)),
            "vbg" => max_vbg = VoltageLimit::new(value, parse_voltage(value)),
            "resistance" => resistance_definition = value.to_string(),
            "condition" => condition_text = value.replace(',', " "),
            _ => log::warn!("{path}:{line_no}: ignoring unknown model field {field_key:?}"),
        }
    }

    let device_type = device_type.ok_or_else(|| IoError::MalformedModelLine {
        path: path.to_string(),
        line: line_no,
        text: line.to_string(),
    })?;

    let mut model = Model::new(device_type, base_type);
    model.max_vds = max_vds;
    model.max_vgs = max_vgs;
    model.max_vbs = max_vbs;
    model.max_vbg = max_vbg;
    model.vth = vth;
    model.resistance_definition = resistance_definition;
    model.is_ldd = device_type.is_ldd();
    model.conditions = levelcheck_model::ConditionList::parse(&condition_text);
    model.definition = line.to_string();
    if device_type == DeviceType::Diode {
        model.diode_terminal_pairs = vec![(0, 1)];
    }

    Ok((key, model))
}

fn parse_voltage(value: &str) -> levelcheck_core::Voltage {
    levelcheck_model::parse_scaled_number(value)
        .map(levelcheck_core::Voltage::from_volts)
        .unwrap_or(levelcheck_core::Voltage::UNKNOWN)
}

fn parse_device_type(value: &str) -> Option<DeviceType> {
    Some(match value.to_ascii_uppercase().as_str() {
        "NMOS" => DeviceType::Nmos,
        "PMOS" => DeviceType::Pmos,
        "LDDN" => DeviceType::Lddn,
        "LDDP" => DeviceType::Lddp,
        "DIODE" => DeviceType::Diode,
        "RESISTOR" => DeviceType::Resistor,
        "CAPACITOR" => DeviceType::Capacitor,
        "FUSE_ON" => DeviceType::FuseOn,
        "FUSE_OFF" => DeviceType::FuseOff,
        "SWITCH_ON" => DeviceType::SwitchOn,
        "SWITCH_OFF" => DeviceType::SwitchOff,
        _ => return None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_a_basic_nmos_model() {
        let contents = "nmod: type=NMOS Vth=0.4 Vgs=1.8 Vds=1.8 Vbs=1.8 Vbg=3.3 resistance=0\n";
        let library = read_model_file("nmos.model", contents).unwrap();
        let params = levelcheck_model::ParameterMap::parse("");
        let model = library.find_model("nmod", &params).unwrap();
        assert_eq!(model.device_type, DeviceType::Nmos);
        assert_eq!(model.max_vgs.limit, levelcheck_core::Voltage::from_volts(1.8));
        assert_eq!(model.vth, Some(levelcheck_core::Voltage::from_volts(0.4)));
    }

    #[test]
    fn comments_and_blank_lines_are_skipped() {
        let contents = "# a comment\n\n   \nnmod: type=NMOS\n";
        let library = read_model_file("x.model", contents).unwrap();
        assert_eq!(library.len(), 1);
    }

    #[test]
    fn multiple_variants_accumulate_under_one_key() {
        let contents = "nmod: type=NMOS condition=L<0.2u Vgs=1.0\nnmod: type=NMOS Vgs=1.8\n";
        let library = read_model_file("x.model", contents).unwrap();
        assert_eq!(library.variants("nmod").len(), 2);
        let thin = levelcheck_model::ParameterMap::parse("L=0.15u");
        let thick = levelcheck_model::ParameterMap::parse("L=0.5u");
        assert_eq!(library.find_model("nmod", &thin).unwrap().max_vgs.limit, levelcheck_core::Voltage::from_volts(1.0));
        assert_eq!(library.find_model("nmod", &thick).unwrap().max_vgs.limit, levelcheck_core::Voltage::from_volts(1.8));
    }

    #[test]
    fn missing_colon_is_malformed() {
        let err = read_model_file("x.model", "nmod type=NMOS\n").unwrap_err();
        assert!(matches!(err, IoError::MalformedModelLine { .. }));
    }

    #[test]
    fn diode_model_gets_default_terminal_pair() {
        let library = read_model_file("x.model", "dio: type=DIODE\n").unwrap();
        let params = levelcheck_model::ParameterMap::parse("");
        let model = library.find_model("dio", &params).unwrap();
        assert_eq!(model.diode_terminal_pairs, vec![(0, 1)]);
    }
}
