//! MOS-diode voltage-conflict checker (distilled spec §4.6): a device
//! whose model declares one or more terminal pairs as diode-connected
//! (typically gate tied to drain) gets its own conflict check distinct
//! from the ordinary forward-diode checker, since the "anode"/"cathode"
//! here are MOS terminals with their own min/max voltage bounds rather
//! than a standalone two-terminal diode.

use levelcheck_core::{DeviceId, Voltage};
use levelcheck_netgraph::Terminals;

use crate::context::CheckContext;
use crate::finding::{Category, Finding};

pub fn check(ctx: &CheckContext) -> Vec<Finding> {
    let mut findings = Vec::new();
    for index in 0..ctx.elaboration.device_count() {
        let device = DeviceId::new(index as u32);
        let view = ctx.view(device);
        if !view.device_type.is_mos() || view.profile.diode_terminal_pairs.is_empty() {
            continue;
        }
        let Terminals::Mos { drain, gate, source, bulk } = view.terminals else { continue };
        let terminals = [drain, gate, source, bulk];

        for &(anode_idx, cathode_idx) in &view.profile.diode_terminal_pairs {
            let anode = ctx.equiv(terminals[anode_idx as usize]);
            let cathode = ctx.equiv(terminals[cathode_idx as usize]);

            let Some(diff) = ctx.state.min(anode).checked_diff(ctx.state.max(cathode)) else { continue };
            if diff <= Voltage::ZERO {
                continue;
            }

            let resistance = view.profile.resistance.0.max(f64::MIN_POSITIVE);
            let current = diff.as_volts() / resistance;

            findings.push(
                Finding::new(
                    Category::VoltageConflict,
                    format!(
                        "{} MOS-diode conflict: {}@min{} exceeds {}@max{} by {} (~{:.3e} A)",
                        ctx.device_name(device),
                        ctx.net_signal(anode),
                        ctx.state.min(anode),
                        ctx.net_signal(cathode),
                        ctx.state.max(cathode),
                        diff,
                        current,
                    ),
                )
                .with_device(device)
                .with_connections(vec![ctx.snapshot(device)])
                .with_estimated_current(current),
            );
        }
    }
    findings
}
