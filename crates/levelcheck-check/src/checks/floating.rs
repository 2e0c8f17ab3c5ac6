//! Floating-input checker (distilled spec §4.6, scenario 4): a gate net
//! with no committed sim voltage and no declared input intent, driven by
//! nothing a source/drain population or an `INPUT` declaration accounts
//! for. Runs in two passes: the first finds gates with literally no
//! conducting driver (primary floats); the second finds gates driven only
//! by the output of a device whose own gate was a primary float, which is
//! just as unresolved even though it has a nonempty driver list.

use std::collections::HashSet;

use levelcheck_core::{DeviceId, NetId};
use levelcheck_netgraph::Terminals;
use levelcheck_power::PowerFlags;

use crate::context::CheckContext;
use crate::finding::{Category, Finding};

fn has_input_declaration(ctx: &CheckContext, net: NetId) -> bool {
    ctx.power
        .find_for_signal(ctx.net_signal(net))
        .map(|d| d.flags.contains(PowerFlags::INPUT))
        .unwrap_or(false)
}

fn gate_net(ctx: &CheckContext, device: DeviceId) -> Option<NetId> {
    match ctx.view(device).terminals {
        Terminals::Mos { gate, .. } => Some(ctx.equiv(gate)),
        Terminals::TwoTerminal { .. } => None,
    }
}

fn finding_for(ctx: &CheckContext, device: DeviceId, gate: NetId) -> Finding {
    Finding::new(
        Category::FloatingInput,
        format!(
            "{} gate {} has no committed drive and no declared input",
            ctx.device_name(device),
            ctx.net_signal(gate),
        ),
    )
    .with_device(device)
    .with_net(gate)
    .with_connections(vec![ctx.snapshot(device)])
    .sim_inactive()
}

pub fn check(ctx: &CheckContext) -> Vec<Finding> {
    let mut findings = Vec::new();
    let mut primary: HashSet<NetId> = HashSet::new();

    for index in 0..ctx.elaboration.device_count() {
        let device = DeviceId::new(index as u32);
        let Some(gate) = gate_net(ctx, device) else { continue };
        if ctx.state.sim(gate).is_known() || has_input_declaration(ctx, gate) {
            continue;
        }
        if ctx.connectivity.source_count(gate) == 0 && ctx.connectivity.drain_count(gate) == 0 {
            primary.insert(gate);
        }
    }
    for &gate in &primary {
        for &device in ctx.connectivity.gates(gate) {
            findings.push(finding_for(ctx, device, gate));
        }
    }

    for index in 0..ctx.elaboration.device_count() {
        let device = DeviceId::new(index as u32);
        let Some(gate) = gate_net(ctx, device) else { continue };
        if primary.contains(&gate) {
            continue;
        }
        if ctx.state.sim(gate).is_known() || has_input_declaration(ctx, gate) {
            continue;
        }
        let drivers: Vec<DeviceId> = ctx
            .connectivity
            .drains(gate)
            .iter()
            .chain(ctx.connectivity.sources(gate))
            .copied()
            .collect();
        if drivers.is_empty() {
            continue;
        }
        let all_driven_by_primary_float = drivers.iter().all(|&driver| match gate_net(ctx, driver) {
            Some(driver_gate) => primary.contains(&driver_gate),
            None => false,
        });
        if all_driven_by_primary_float {
            findings.push(finding_for(ctx, device, gate));
        }
    }

    findings
}
