//! Fuse-path checker (distilled spec §4.6): a fuse device lying on a
//! declared power path is worth flagging in either state — `fuse_on`
//! (currently a short) could leave the downstream net floating once it is
//! blown, while `fuse_off` (currently open) could be leaving a net that
//! needs the power it would carry permanently unusable.

use levelcheck_core::{DeviceId, DeviceType};
use levelcheck_netgraph::Terminals;
use levelcheck_power::PowerFlags;

use crate::context::CheckContext;
use crate::finding::{Category, Finding};

fn is_power_net(ctx: &CheckContext, net: levelcheck_core::NetId) -> bool {
    ctx.power
        .find_for_signal(ctx.net_signal(net))
        .map(|d| d.flags.contains(PowerFlags::POWER))
        .unwrap_or(false)
}

pub fn check(ctx: &CheckContext) -> Vec<Finding> {
    let mut findings = Vec::new();
    for index in 0..ctx.elaboration.device_count() {
        let device = DeviceId::new(index as u32);
        let view = ctx.view(device);
        if !view.device_type.is_fuse() {
            continue;
        }
        let Terminals::TwoTerminal { a, b } = view.terminals else { continue };
        let (a, b) = (ctx.equiv(a), ctx.equiv(b));
        if !is_power_net(ctx, a) && !is_power_net(ctx, b) {
            continue;
        }

        let message = match view.device_type {
            DeviceType::FuseOn => format!(
                "{} shorts declared power path {} - {}; possibly floating once cut",
                ctx.device_name(device),
                ctx.net_signal(a),
                ctx.net_signal(b),
            ),
            DeviceType::FuseOff => format!(
                "{} opens declared power path {} - {}; possibly unusable while blown",
                ctx.device_name(device),
                ctx.net_signal(a),
                ctx.net_signal(b),
            ),
            _ => unreachable!("is_fuse() only matches FuseOn/FuseOff"),
        };

        findings.push(
            Finding::new(Category::FusePath, message)
                .with_device(device)
                .with_connections(vec![ctx.snapshot(device)]),
        );
    }
    findings
}
