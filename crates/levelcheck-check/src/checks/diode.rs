//! Forward-biased diode checker (distilled spec §4.6, scenario 3):
//! anode's driving voltage exceeds cathode's driving voltage by more than
//! `forward_error_threshold`. Per the original (`CCvcDb_error.cc`), this is
//! always an error once the threshold is crossed; unrelated anode/cathode
//! supply families is an *additional* trigger, never a suppressor, so it is
//! not gated on `are_relatives` here.

use levelcheck_core::{DeviceId, DeviceType};
use levelcheck_netgraph::Terminals;

use crate::context::CheckContext;
use crate::finding::{Category, Finding};

pub fn check(ctx: &CheckContext) -> Vec<Finding> {
    let mut findings = Vec::new();
    for index in 0..ctx.elaboration.device_count() {
        let device = DeviceId::new(index as u32);
        let view = ctx.view(device);
        if view.device_type != DeviceType::Diode {
            continue;
        }
        let Terminals::TwoTerminal { a: anode, b: cathode } = view.terminals else { continue };
        let (anode, cathode) = (ctx.equiv(anode), ctx.equiv(cathode));

        let anode_drive = ctx.state.max(anode);
        let cathode_drive = ctx.state.min(cathode);
        let Some(diff) = anode_drive.checked_diff(cathode_drive) else { continue };
        if diff <= ctx.options.forward_error_threshold {
            continue;
        }

        findings.push(
            Finding::new(
                Category::ForwardDiode,
                format!(
                    "{} forward-biased: anode {}@{} exceeds cathode {}@{} by {} (threshold {})",
                    ctx.device_name(device),
                    ctx.net_signal(anode),
                    anode_drive,
                    ctx.net_signal(cathode),
                    cathode_drive,
                    diff,
                    ctx.options.forward_error_threshold,
                ),
            )
            .with_device(device)
            .with_connections(vec![ctx.snapshot(device)]),
        );
    }
    findings
}
