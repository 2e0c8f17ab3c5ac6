//! LDD direction checker (distilled spec §4.6): a lightly-doped-drain
//! device only gets its drain-junction protection on the terminal actually
//! wired as "drain". If the circuit drives current the other way — the
//! source terminal ends up at the more extreme potential — the
//! unprotected junction sees the stress the LDD implant was meant to
//! absorb. Skipped when the gate is guaranteed off, since a device that
//! never conducts never stresses either junction.

use levelcheck_core::DeviceId;
use levelcheck_netgraph::Terminals;
use levelcheck_propagate::GateState;

use crate::context::CheckContext;
use crate::finding::{Category, Finding};

pub fn check(ctx: &CheckContext) -> Vec<Finding> {
    let mut findings = Vec::new();
    for index in 0..ctx.elaboration.device_count() {
        let device = DeviceId::new(index as u32);
        let view = ctx.view(device);
        if !view.device_type.is_ldd() {
            continue;
        }
        if ctx.state.gate_state(device) == Some(GateState::Off) {
            continue;
        }
        let Terminals::Mos { drain, source, .. } = view.terminals else { continue };
        let (drain, source) = (ctx.equiv(drain), ctx.equiv(source));

        let violated = if view.device_type.is_nmos_family() {
            // LDDN: drain must stay at or above the source across the full
            // propagated range.
            ctx.state.max(source).checked_diff(ctx.state.min(drain)).map(|d| d > levelcheck_core::Voltage::ZERO)
        } else {
            // LDDP: drain must stay at or below the source.
            ctx.state.min(source).checked_diff(ctx.state.max(drain)).map(|d| d < levelcheck_core::Voltage::ZERO)
        };
        let Some(true) = violated else { continue };

        findings.push(
            Finding::new(
                Category::LddDirection,
                format!(
                    "{} conducts against its LDD direction: drain {}@[{}, {}] source {}@[{}, {}]",
                    ctx.device_name(device),
                    ctx.net_signal(drain),
                    ctx.state.min(drain),
                    ctx.state.max(drain),
                    ctx.net_signal(source),
                    ctx.state.min(source),
                    ctx.state.max(source),
                ),
            )
            .with_device(device)
            .with_connections(vec![ctx.snapshot(device)]),
        );
    }
    findings
}
