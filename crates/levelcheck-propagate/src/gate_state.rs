//! MOS gate-conduction state: given a gate voltage and the known terminal
//! voltages, is the channel definitely on, definitely off, or indeterminate
//! (distilled spec §4.5, first sim pass and post-sim min/max passes).

use levelcheck_core::Voltage;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateState {
    On,
    Off,
    Indeterminate,
}

/// Evaluate channel conduction for one MOS/LDD family device. `is_nmos_family`
/// selects the polarity (NMOS/LDDN conduct above Vth, PMOS/LDDP conduct
/// below -Vth relative to the higher-potential terminal). Conservative: if
/// neither terminal voltage is known the state is `Indeterminate`, never
/// guessed as `On`.
pub fn mos_gate_state(
    is_nmos_family: bool,
    gate: Voltage,
    source: Voltage,
    drain: Voltage,
    vth: Option<Voltage>,
) -> GateState {
    if !gate.is_known() {
        return GateState::Indeterminate;
    }
    let vth = vth.unwrap_or(Voltage::ZERO);

    let reference = match (source.is_known(), drain.is_known()) {
        (true, true) => {
            if is_nmos_family {
                source.min(drain)
            } else {
                source.max(drain)
            }
        }
        (true, false) => source,
        (false, true) => drain,
        (false, false) => return GateState::Indeterminate,
    };

    let diff = if is_nmos_family { gate.checked_diff(reference) } else { reference.checked_diff(gate) };
    let Some(diff) = diff else {
        return GateState::Indeterminate;
    };
    if diff > vth {
        GateState::On
    } else {
        GateState::Off
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nmos_conducts_when_gate_clears_threshold() {
        let gate = Voltage::from_volts(1.2);
        let source = Voltage::from_volts(0.0);
        let vth = Some(Voltage::from_volts(0.4));
        assert_eq!(mos_gate_state(true, gate, source, Voltage::UNKNOWN, vth), GateState::On);
    }

    #[test]
    fn nmos_off_when_gate_below_threshold() {
        let gate = Voltage::from_volts(0.2);
        let source = Voltage::from_volts(0.0);
        let vth = Some(Voltage::from_volts(0.4));
        assert_eq!(mos_gate_state(true, gate, source, Voltage::UNKNOWN, vth), GateState::Off);
    }

    #[test]
    fn pmos_conducts_when_gate_pulled_low() {
        let gate = Voltage::from_volts(0.0);
        let source = Voltage::from_volts(1.2);
        let vth = Some(Voltage::from_volts(0.4));
        assert_eq!(mos_gate_state(false, gate, source, Voltage::UNKNOWN, vth), GateState::On);
    }

    #[test]
    fn unknown_gate_voltage_is_indeterminate() {
        assert_eq!(
            mos_gate_state(true, Voltage::UNKNOWN, Voltage::from_volts(0.0), Voltage::UNKNOWN, None),
            GateState::Indeterminate
        );
    }

    #[test]
    fn unknown_terminals_are_indeterminate_not_on() {
        assert_eq!(
            mos_gate_state(true, Voltage::from_volts(1.2), Voltage::UNKNOWN, Voltage::UNKNOWN, None),
            GateState::Indeterminate
        );
    }
}
