//! Flat netlist reader (SPEC_FULL §6a): a deliberately small subset of
//! SPICE syntax — `.SUBCKT`/`.ENDS` blocks, device lines, and subcircuit
//! instance lines prefixed `X` by SPICE element-type convention — enough
//! to build a [`levelcheck_circuit::CircuitLibrary`] for this workspace's
//! own tests and examples. Anything requiring expression evaluation,
//! `.PARAM`, or `.include` is out of scope (§1) and rejected with
//! [`IoError::UnsupportedConstruct`].

use levelcheck_circuit::{Circuit, CircuitLibrary, Device, SubcircuitInstance};
use levelcheck_core::{DeviceType, Interner};

use crate::error::{IoError, Result};

/// Parse a flat netlist's contents into a [`CircuitLibrary`], interning
/// every circuit/signal/device/model name through `interner`.
pub fn read_netlist_file(path: &str, contents: &str, interner: &mut Interner) -> Result<CircuitLibrary> {
    let mut library = CircuitLibrary::new();
    let mut current: Option<Circuit> = None;
    let mut opened_at = 0usize;

    for (index, raw_line) in contents.lines().enumerate() {
        let line_no = index + 1;
        let line = strip_comment(raw_line).trim();
        if line.is_empty() {
            continue;
        }

        let upper_first_word = line.split_whitespace().next().unwrap_or("").to_ascii_uppercase();
        match upper_first_word.as_str() {
            ".SUBCKT" => {
                if current.is_some() {
                    return Err(IoError::MalformedNetlistLine {
                        path: path.to_string(),
                        line: line_no,
                        text: line.to_string(),
                    });
                }
                let mut tokens = line.split_whitespace();
                tokens.next();
                let name = tokens.next().ok_or_else(|| malformed(path, line_no, line))?;
                let name_id = interner.intern(name);
                let mut circuit = Circuit::new(name_id);
                for port in tokens {
                    let port_id = interner.intern(port);
                    circuit.add_port(port_id)?;
                }
                opened_at = line_no;
                current = Some(circuit);
                continue;
            }
            ".ENDS" => {
                let circuit = current.take().ok_or(IoError::UnmatchedEnds {
                    path: path.to_string(),
                    line: line_no,
                })?;
                library.register_circuit(circuit)?;
                continue;
            }
            ".PARAM" | ".INCLUDE" | ".LIB" | ".GLOBAL" => {
                return Err(IoError::UnsupportedConstruct {
                    path: path.to_string(),
                    line: line_no,
                    construct: upper_first_word,
                });
            }
            _ => {}
        }

        let circuit = current.as_mut().ok_or_else(|| IoError::MalformedNetlistLine {
            path: path.to_string(),
            line: line_no,
            text: line.to_string(),
        })?;
        parse_body_line(path, line_no, line, circuit, interner)?;
    }

    if let Some(circuit) = current {
        let name = interner.resolve(circuit.name).to_string();
        return Err(IoError::UnterminatedSubcircuit { path: path.to_string(), line: opened_at, circuit: name });
    }

    Ok(library)
}

fn parse_body_line(
    path: &str,
    line_no: usize,
    line: &str,
    circuit: &mut Circuit,
    interner: &mut Interner,
) -> Result<()> {
    let mut tokens = line.split_whitespace();
    let name = tokens.next().ok_or_else(|| malformed(path, line_no, line))?;
    let name_id = interner.intern(name);

    if name.starts_with(['x', 'X']) {
        let target = tokens.next().ok_or_else(|| malformed(path, line_no, line))?;
        let target_id = interner.intern(target);
        let mut connections = Vec::new();
        for net in tokens {
            let net_id = interner.intern(net);
            connections.push(circuit.get_or_create_signal(net_id));
        }
        circuit.add_instance(SubcircuitInstance::new(name_id, target_id, connections))?;
        return Ok(());
    }

    let type_token = tokens.next().ok_or_else(|| malformed(path, line_no, line))?;
    let device_type = parse_device_type(type_token).ok_or_else(|| malformed(path, line_no, line))?;
    let terminal_count = device_type.terminal_count().expect("netlist line is never SUBCIRCUIT here");

    let mut signals = Vec::with_capacity(terminal_count);
    for _ in 0..terminal_count {
        let net = tokens.next().ok_or_else(|| malformed(path, line_no, line))?;
        let net_id = interner.intern(net);
        signals.push(circuit.get_or_create_signal(net_id));
    }
    let model_key = tokens.next().ok_or_else(|| malformed(path, line_no, line))?;
    let model_id = interner.intern(model_key);
    let parameters: Vec<&str> = tokens.collect();

    circuit.add_device(Device::new(name_id, device_type, model_id, parameters.join(" "), signals))?;
    Ok(())
}

fn parse_device_type(token: &str) -> Option<DeviceType> {
    Some(match token.to_ascii_uppercase().as_str() {
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
    fn parses_a_single_level_inverter() {
        let contents = "\
.SUBCKT INV VDD GND IN OUT
M1 PMOS VDD IN OUT VDD PMOD W=1u
M2 NMOS OUT IN GND GND NMOD W=1u
.ENDS
.SUBCKT TOP
XI1 INV VDD GND A Z
.ENDS
";
        let mut interner = Interner::new();
        let library = read_netlist_file("inv.net", contents, &mut interner).unwrap();
        assert_eq!(library.len(), 2);

        let inv_name = interner.get("INV").unwrap();
        let inv = library.find(inv_name).unwrap();
        assert_eq!(inv.port_count(), 4);
        assert_eq!(inv.device_count(), 2);

        let top_name = interner.get("TOP").unwrap();
        let top = library.find(top_name).unwrap();
        assert_eq!(top.instance_count(), 1);
        assert_eq!(top.instances()[0].port_count(), 4);
    }

    #[test]
    fn unterminated_subckt_is_reported() {
        let contents = ".SUBCKT INV A B\nM1 NMOS A B A B nmod\n";
        let mut interner = Interner::new();
        let err = read_netlist_file("x.net", contents, &mut interner).unwrap_err();
        assert!(matches!(err, IoError::UnterminatedSubcircuit { .. }));
    }

    #[test]
    fn unmatched_ends_is_reported() {
        let mut interner = Interner::new();
        let err = read_netlist_file("x.net", ".ENDS\n", &mut interner).unwrap_err();
        assert!(matches!(err, IoError::UnmatchedEnds { .. }));
    }

    #[test]
    fn dot_param_is_rejected_as_unsupported() {
        let mut interner = Interner::new();
        let err = read_netlist_file("x.net", ".PARAM X=1\n", &mut interner).unwrap_err();
        assert!(matches!(err, IoError::UnsupportedConstruct { .. }));
    }

    #[test]
    fn device_line_outside_subckt_is_malformed() {
        let mut interner = Interner::new();
        let err = read_netlist_file("x.net", "M1 NMOS A B A B nmod\n", &mut interner).unwrap_err();
        assert!(matches!(err, IoError::MalformedNetlistLine { .. }));
    }
}
