//! Gate-vs-source/drain differential checker (distilled spec §4.6): not a
//! model-limit overvoltage check, but a general "does this gate swing too
//! far from its channel" heuristic, gated by `gate_error_threshold` and a
//! pair of MOS-diode exemptions.

use levelcheck_core::{DeviceId, Voltage};
use levelcheck_netgraph::Terminals;
use levelcheck_propagate::GateState;

use crate::context::CheckContext;
use crate::finding::{Category, Finding};

fn near(a: Voltage, b: Voltage) -> bool {
    match a.checked_diff(b) {
        Some(diff) => diff.abs() <= Voltage::from_millivolts(1),
        None => false,
    }
}

/// Whether `gate`'s voltage exactly matches `reference + vth` (the
/// min-Vth-gate exemption: a deliberate level-shifted gate drive, not a
/// design error).
fn min_vth_gate_exempt(gate: Voltage, source: Voltage, drain: Voltage, vth: Option<Voltage>) -> bool {
    let Some(vth) = vth else { return false };
    if !gate.is_known() {
        return false;
    }
    let reference = match (source.is_known(), drain.is_known()) {
        (true, true) => source.min(drain),
        (true, false) => source,
        (false, true) => drain,
        (false, false) => return false,
    };
    near(gate, reference + vth)
}

fn vth_equal_exempt(gate: Voltage, other: Voltage, vth: Option<Voltage>) -> bool {
    let Some(vth) = vth else { return false };
    match gate.checked_diff(other) {
        Some(diff) => near(diff, vth) || near(diff.abs(), vth),
        None => false,
    }
}

pub fn check(ctx: &CheckContext) -> Vec<Finding> {
    let mut findings = Vec::new();
    for index in 0..ctx.elaboration.device_count() {
        let device = DeviceId::new(index as u32);
        let view = ctx.view(device);
        if !view.device_type.is_mos() {
            continue;
        }
        let Terminals::Mos { gate, source, drain, .. } = view.terminals else { continue };
        let (gate, source, drain) = (ctx.equiv(gate), ctx.equiv(source), ctx.equiv(drain));

        // Always-fully-on devices (e.g. a gate tied directly to the rail
        // it switches) are exempt: there is no switching transient to
        // stress the gate oxide differently from steady state.
        if ctx.state.gate_state(device) == Some(GateState::On)
            && ctx.state.min(gate) == ctx.state.max(gate)
            && ctx.state.min(gate).is_known()
        {
            continue;
        }

        let gate_sim = ctx.state.sim(gate);
        let source_sim = ctx.state.sim(source);
        let drain_sim = ctx.state.sim(drain);
        if !gate_sim.is_known() {
            continue;
        }

        for (other_label, other) in [("source", source), ("drain", drain)] {
            let other_sim = if other_label == "source" { source_sim } else { drain_sim };
            let Some(diff) = gate_sim.checked_diff(other_sim) else { continue };
            if diff.abs() <= ctx.options.gate_error_threshold {
                continue;
            }

            if !ctx.are_relatives(gate, other) {
                findings.push(
                    Finding::new(
                        Category::UnrelatedPower,
                        format!(
                            "{} gate and {other_label} are from unrelated power families ({} vs {})",
                            ctx.device_name(device),
                            ctx.net_signal(gate),
                            ctx.net_signal(other),
                        ),
                    )
                    .with_device(device)
                    .with_connections(vec![ctx.snapshot(device)]),
                );
                continue;
            }

            let vth = view.profile.vth;
            if ctx.options.vth_equal_exemption && vth_equal_exempt(gate_sim, other_sim, vth) {
                continue;
            }
            if ctx.options.min_vth_gate_exemption && min_vth_gate_exempt(gate_sim, source_sim, drain_sim, vth) {
                continue;
            }

            findings.push(
                Finding::new(
                    Category::GateVsSourceDrain,
                    format!(
                        "{} gate-{other_label} differential {} exceeds threshold {} ({}={} {other_label}={})",
                        ctx.device_name(device),
                        diff.abs(),
                        ctx.options.gate_error_threshold,
                        ctx.net_signal(gate),
                        gate_sim,
                        other_sim,
                    ),
                )
                .with_device(device)
                .with_connections(vec![ctx.snapshot(device)]),
            );
        }
    }
    findings
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn vth_equal_exemption_matches_diode_connected_pattern() {
        let vth = Some(Voltage::from_volts(0.4));
        assert!(vth_equal_exempt(Voltage::from_volts(1.2), Voltage::from_volts(0.8), vth));
        assert!(!vth_equal_exempt(Voltage::from_volts(1.2), Voltage::from_volts(0.0), vth));
    }

    #[test]
    fn min_vth_gate_exemption_matches_level_shifted_drive() {
        let vth = Some(Voltage::from_volts(0.4));
        let gate = Voltage::from_volts(0.4);
        assert!(min_vth_gate_exempt(gate, Voltage::from_volts(0.0), Voltage::from_volts(1.2), vth));
    }
}
