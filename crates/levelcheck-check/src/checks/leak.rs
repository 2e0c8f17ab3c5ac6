//! Possible-leak checker (distilled spec §4.6): a MOS/LDD device the first
//! sim pass decided is definitely off still shows a meaningfully different
//! leak-voltage bound on one of its channel terminals. That means current
//! could leak through the "off" device; whether it is worth reporting
//! depends on both a voltage-differential threshold and an estimated
//! current limit, since a leak across a very large resistance is harmless.

use levelcheck_core::DeviceId;
use levelcheck_netgraph::Terminals;
use levelcheck_power::PowerFlags;
use levelcheck_propagate::GateState;

use crate::context::CheckContext;
use crate::finding::{Category, Finding};

pub fn check(ctx: &CheckContext) -> Vec<Finding> {
    let mut findings = Vec::new();
    for index in 0..ctx.elaboration.device_count() {
        let device = DeviceId::new(index as u32);
        let view = ctx.view(device);
        if !view.device_type.is_mos() {
            continue;
        }
        if ctx.state.gate_state(device) != Some(GateState::Off) {
            continue;
        }
        let Terminals::Mos { source, drain, .. } = view.terminals else { continue };

        for channel in [source, drain] {
            let channel = ctx.equiv(channel);
            let signal = ctx.net_signal(channel);
            let flags =
                ctx.power.find_for_signal(signal).map(|d| d.flags).unwrap_or_default();
            if flags.contains(PowerFlags::HIZ) || flags.contains(PowerFlags::INTERNAL_OVERRIDE) {
                continue;
            }

            let sim = ctx.state.sim(channel);
            if !sim.is_known() {
                continue;
            }
            let leak_min = ctx.state.min_leak(channel);
            let leak_max = ctx.state.max_leak(channel);
            let diff = [leak_min, leak_max]
                .into_iter()
                .filter_map(|leak| sim.checked_diff(leak))
                .max_by_key(|d| d.abs());
            let Some(diff) = diff else { continue };
            if diff.abs() <= ctx.options.leak_error_threshold {
                continue;
            }

            let resistance = view.profile.resistance.0.max(f64::MIN_POSITIVE);
            let current = diff.abs().as_volts() / resistance;
            if current < ctx.options.leak_limit {
                continue;
            }

            findings.push(
                Finding::new(
                    Category::PossibleLeak,
                    format!(
                        "{} possible leak through off device on {signal}: sim {sim} vs leak bound differs by {} (~{:.3e} A)",
                        ctx.device_name(device),
                        diff.abs(),
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
