//! Source/drain-vs-bulk bias checker (distilled spec §4.6): a device's
//! bulk terminal should track its source/drain within `bias_error_threshold`
//! unless a resistor-chain drop accounts for the difference. A HIZ bulk
//! triggers a stricter check that skips the resistance exemption.

use levelcheck_core::DeviceId;
use levelcheck_netgraph::Terminals;
use levelcheck_power::PowerFlags;

use crate::context::CheckContext;
use crate::finding::{Category, Finding};

fn power_flags(ctx: &CheckContext, net_signal: &str) -> PowerFlags {
    ctx.power.find_for_signal(net_signal).map(|d| d.flags).unwrap_or_default()
}

pub fn check(ctx: &CheckContext) -> Vec<Finding> {
    let mut findings = Vec::new();
    for index in 0..ctx.elaboration.device_count() {
        let device = DeviceId::new(index as u32);
        let view = ctx.view(device);
        if !view.device_type.is_mos() {
            continue;
        }
        let Terminals::Mos { source, drain, bulk, .. } = view.terminals else { continue };
        let (source, drain, bulk) = (ctx.equiv(source), ctx.equiv(drain), ctx.equiv(bulk));

        let bulk_sim = ctx.state.sim(bulk);
        if !bulk_sim.is_known() {
            continue;
        }

        let channel = if ctx.state.sim(source).is_known() { source } else { drain };
        let channel_sim = ctx.state.sim(channel);
        let Some(diff) = bulk_sim.checked_diff(channel_sim) else { continue };
        if diff.abs() <= ctx.options.bias_error_threshold {
            continue;
        }

        let hiz_bulk = power_flags(ctx, ctx.net_signal(bulk)).contains(PowerFlags::HIZ);

        // A resistor-chain drop between the bulk's committed driver and the
        // channel's committed driver legitimately accounts for a
        // difference within the threshold multiple; skip unless the bulk
        // is declared HIZ, which forbids the exemption (distilled spec:
        // "HIZ bulk triggers stricter relation check").
        if !hiz_bulk && ctx.state.sim_net.resistance(bulk).0 > 0.0 {
            continue;
        }

        findings.push(
            Finding::new(
                Category::SourceVsBulk,
                format!(
                    "{} bulk-channel differential {} exceeds threshold {} (bulk={}@{} channel={}@{})",
                    ctx.device_name(device),
                    diff.abs(),
                    ctx.options.bias_error_threshold,
                    ctx.net_signal(bulk),
                    bulk_sim,
                    ctx.net_signal(channel),
                    channel_sim,
                ),
            )
            .with_device(device)
            .with_connections(vec![ctx.snapshot(device)]),
        );
    }
    findings
}
