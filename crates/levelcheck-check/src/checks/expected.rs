//! Expected-voltage checker (distilled spec §4.6, scenario 5): a power
//! declaration can carry an expected min/sim/max triplet, or declare that
//! the signal should end up open (floating), checked against what
//! propagation actually committed.

use levelcheck_core::{NetId, Voltage};
use levelcheck_power::{ExpectedVoltage, VoltageRef};
use levelcheck_propagate::{resolve_power_reference, VoltageKind};

use crate::context::CheckContext;
use crate::finding::{Category, Finding};

const TOLERANCE: Voltage = Voltage::from_millivolts(1);

fn mismatch(expected: Option<Voltage>, actual: Voltage) -> bool {
    match expected {
        Some(expected) => match actual.checked_diff(expected) {
            Some(diff) => diff.abs() > TOLERANCE,
            None => true,
        },
        None => false,
    }
}

fn resolve(ctx: &CheckContext, kind: VoltageKind, reference: &Option<VoltageRef>) -> Option<Voltage> {
    let reference = reference.as_ref()?;
    resolve_power_reference(ctx.power, kind, reference)
}

pub fn check(ctx: &CheckContext) -> Vec<Finding> {
    let mut findings = Vec::new();
    for index in 0..ctx.elaboration.net_count() {
        let net = ctx.equiv(NetId::new(index as u32));
        let signal = ctx.net_signal(net);
        let Some(decl) = ctx.power.find_for_signal(signal) else { continue };
        let Some(expected) = &decl.expected else { continue };

        match expected {
            ExpectedVoltage::Open => {
                let sim = ctx.state.sim(net);
                if sim.is_known() {
                    findings.push(Finding::new(
                        Category::ExpectedVoltage,
                        format!("Expected {signal} = open but found {signal}@{sim}"),
                    ).with_net(net));
                }
            }
            ExpectedVoltage::Triplet { min, sim, max } => {
                let actual_min = ctx.state.min(net);
                let actual_sim = ctx.state.sim(net);
                let actual_max = ctx.state.max(net);
                let expected_min = resolve(ctx, VoltageKind::Min, min);
                let expected_sim = resolve(ctx, VoltageKind::Sim, sim);
                let expected_max = resolve(ctx, VoltageKind::Max, max);

                if mismatch(expected_min, actual_min)
                    || mismatch(expected_sim, actual_sim)
                    || mismatch(expected_max, actual_max)
                {
                    findings.push(
                        Finding::new(
                            Category::ExpectedVoltage,
                            format!(
                                "Expected {signal} = {}/{}/{} but found {}/{}/{}",
                                format_expected(expected_min),
                                format_expected(expected_sim),
                                format_expected(expected_max),
                                actual_min,
                                actual_sim,
                                actual_max,
                            ),
                        )
                        .with_net(net),
                    );
                }
            }
        }
    }
    findings
}

fn format_expected(value: Option<Voltage>) -> String {
    match value {
        Some(v) => v.to_string(),
        None => "?".to_string(),
    }
}
