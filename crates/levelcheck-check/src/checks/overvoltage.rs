//! The four per-terminal-pair overvoltage checkers (distilled spec §4.6):
//! Vbg, Vbs, Vds, Vgs. Each is "the worst combination of valid min/max
//! terminal voltages" against the device model's limit for that pair, with
//! a pumping-capacitor exemption on Vds and an optional "(logic ok)"
//! secondary variant evaluated against the leak-voltage maps.

use levelcheck_core::{DeviceId, NetId, Voltage};
use levelcheck_netgraph::Terminals;

use crate::context::CheckContext;
use crate::finding::{Category, Finding};

/// The worst-case (maximum magnitude) voltage differential `a - b` over
/// every combination of `a`'s and `b`'s known min/max bounds. When `pumped`
/// is set (both terminals swing together, e.g. a pumping capacitor's
/// plates), only the min-min and max-max combinations are considered —
/// the distilled spec's Vds pumping-capacitor exemption.
fn worst_diff(a_min: Voltage, a_max: Voltage, b_min: Voltage, b_max: Voltage, pumped: bool) -> Option<Voltage> {
    let mut candidates = Vec::with_capacity(4);
    let mut consider = |a: Voltage, b: Voltage| {
        if let Some(diff) = a.checked_diff(b) {
            candidates.push(diff);
        }
    };
    if pumped {
        consider(a_min, b_min);
        consider(a_max, b_max);
    } else {
        consider(a_min, b_min);
        consider(a_min, b_max);
        consider(a_max, b_min);
        consider(a_max, b_max);
    }
    candidates.into_iter().max_by_key(|v| v.abs())
}

struct Pair {
    a: NetId,
    b: NetId,
    pumped: bool,
}

fn terminal_pair(ctx: &CheckContext, device: DeviceId, kind: Category) -> Option<Pair> {
    let view = ctx.view(device);
    let Terminals::Mos { drain, gate, source, bulk } = view.terminals else { return None };
    let (drain, gate, source, bulk) = (ctx.equiv(drain), ctx.equiv(gate), ctx.equiv(source), ctx.equiv(bulk));
    match kind {
        Category::OvervoltageVgs => Some(Pair { a: gate, b: source, pumped: false }),
        Category::OvervoltageVds => {
            let pumped = ctx.state.pumped[drain.as_usize()] && ctx.state.pumped[source.as_usize()];
            Some(Pair { a: drain, b: source, pumped })
        }
        Category::OvervoltageVbs => Some(Pair { a: bulk, b: source, pumped: false }),
        Category::OvervoltageVbg => Some(Pair { a: bulk, b: gate, pumped: false }),
        _ => None,
    }
}

fn model_limit(ctx: &CheckContext, device: DeviceId, kind: Category) -> Voltage {
    let profile = ctx.view(device).profile;
    match kind {
        Category::OvervoltageVgs => profile.max_vgs,
        Category::OvervoltageVds => profile.max_vds,
        Category::OvervoltageVbs => profile.max_vbs,
        Category::OvervoltageVbg => profile.max_vbg,
        _ => Voltage::UNKNOWN,
    }
}

/// Run one of the four overvoltage checkers over every MOS/LDD device.
pub fn check(ctx: &CheckContext, kind: Category) -> Vec<Finding> {
    let mut findings = Vec::new();
    for index in 0..ctx.elaboration.device_count() {
        let device = DeviceId::new(index as u32);
        let view = ctx.view(device);
        if !view.device_type.is_mos() {
            continue;
        }
        let limit = model_limit(ctx, device, kind);
        if !limit.is_known() {
            continue;
        }
        let Some(pair) = terminal_pair(ctx, device, kind) else { continue };

        let hard = worst_diff(
            ctx.state.min(pair.a),
            ctx.state.max(pair.a),
            ctx.state.min(pair.b),
            ctx.state.max(pair.b),
            pair.pumped,
        );
        if let Some(diff) = hard {
            if diff.abs() > limit {
                findings.push(
                    Finding::new(
                        kind,
                        format!(
                            "{} exceeds {} limit {} on {} (worst-case {})",
                            kind.tag(),
                            kind.tag(),
                            limit,
                            ctx.device_name(device),
                            diff.abs(),
                        ),
                    )
                    .with_device(device)
                    .with_connections(vec![ctx.snapshot(device)]),
                );
                continue;
            }
        }

        if !ctx.options.leak_overvoltage {
            continue;
        }
        let leak_a_min = ctx.state.min_leak(pair.a);
        let leak_a_max = ctx.state.max_leak(pair.a);
        let leak_b_min = ctx.state.min_leak(pair.b);
        let leak_b_max = ctx.state.max_leak(pair.b);
        if let Some(diff) = worst_diff(leak_a_min, leak_a_max, leak_b_min, leak_b_max, pair.pumped) {
            if diff.abs() > limit {
                findings.push(
                    Finding::new(
                        kind,
                        format!(
                            "{} exceeds {} limit {} on {} via leak path only (logic ok, worst-case {})",
                            kind.tag(),
                            kind.tag(),
                            limit,
                            ctx.device_name(device),
                            diff.abs(),
                        ),
                    )
                    .with_device(device)
                    .with_connections(vec![ctx.snapshot(device)])
                    .logic_ok(),
                );
            }
        }
    }
    findings
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn worst_diff_picks_largest_magnitude_combo() {
        let diff = worst_diff(
            Voltage::from_volts(0.0),
            Voltage::from_volts(3.3),
            Voltage::from_volts(0.0),
            Voltage::from_volts(1.0),
            false,
        )
        .unwrap();
        assert_eq!(diff.abs(), Voltage::from_volts(3.3));
    }

    #[test]
    fn pumped_pair_only_considers_min_min_and_max_max() {
        let diff = worst_diff(
            Voltage::from_volts(0.0),
            Voltage::from_volts(5.0),
            Voltage::from_volts(0.0),
            Voltage::from_volts(5.0),
            true,
        )
        .unwrap();
        assert_eq!(diff.abs(), Voltage::from_volts(0.0));
    }

    #[test]
    fn unknown_terminal_is_excluded_from_candidates() {
        let diff = worst_diff(Voltage::UNKNOWN, Voltage::from_volts(3.3), Voltage::UNKNOWN, Voltage::UNKNOWN, false);
        assert!(diff.is_none());
    }
}
