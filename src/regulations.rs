//! Regulation reference text
//!
//! Human-readable descriptions of each rule for dashboards and grid
//! explanations. Purely informational: evaluation uses `PolicyWindow`
//! numbers only, never anything in this module.

use serde::Serialize;

use crate::types::{Violation, ViolationType, WeeklyCycle};

#[derive(Debug, Clone, Serialize)]
pub struct RuleReference {
    pub violation_type: ViolationType,
    pub title: &'static str,
    pub citation: &'static str,
    pub summary: &'static str,
    pub corrective_action: &'static str,
}

pub fn rule_reference(violation_type: ViolationType) -> RuleReference {
    match violation_type {
        ViolationType::Driving11Hour => RuleReference {
            violation_type,
            title: "11-hour driving limit",
            citation: "49 CFR 395.3(a)(3)",
            summary: "A driver may drive at most 11 hours after 10 consecutive hours off duty.",
            corrective_action: "Stop driving now and take 10 consecutive hours off duty.",
        },
        ViolationType::OnDuty14Hour => RuleReference {
            violation_type,
            title: "14-hour duty limit",
            citation: "49 CFR 395.3(a)(2)",
            summary: "A driver may not drive beyond 14 hours on duty following 10 consecutive hours off duty.",
            corrective_action: "Stop driving now; only off-duty time restores the duty window.",
        },
        ViolationType::Break30Minute => RuleReference {
            violation_type,
            title: "30-minute break",
            citation: "49 CFR 395.3(a)(3)(ii)",
            summary: "Driving is not permitted after 8 cumulative hours of driving without a 30-minute interruption.",
            corrective_action: "Take a 30-minute non-driving break before driving again.",
        },
        ViolationType::Weekly60Hour => RuleReference {
            violation_type,
            title: "60-hour / 7-day limit",
            citation: "49 CFR 395.3(b)(1)",
            summary: "A driver may not drive after 60 hours on duty in any 7 consecutive days.",
            corrective_action: "Remove from driving until hours roll off or a 34-hour restart is completed.",
        },
        ViolationType::Weekly70Hour => RuleReference {
            violation_type,
            title: "70-hour / 8-day limit",
            citation: "49 CFR 395.3(b)(2)",
            summary: "A driver may not drive after 70 hours on duty in any 8 consecutive days.",
            corrective_action: "Remove from driving until hours roll off or a 34-hour restart is completed.",
        },
    }
}

pub fn all_rules() -> Vec<RuleReference> {
    [
        ViolationType::Weekly60Hour,
        ViolationType::Weekly70Hour,
        ViolationType::Driving11Hour,
        ViolationType::OnDuty14Hour,
        ViolationType::Break30Minute,
    ]
    .into_iter()
    .map(rule_reference)
    .collect()
}

/// One-line explanation of an active violation.
pub fn explain(violation: &Violation) -> String {
    let r = rule_reference(violation.violation_type);
    format!(
        "{} exceeded: {:.1}h against {:.1}h ({:+.1}h, {:?}). {}",
        r.title,
        violation.observed_value,
        violation.limit_value,
        violation.margin,
        violation.severity,
        r.corrective_action
    )
}

pub const RESTART_SUMMARY: &str =
    "A 34-hour off-duty period including two 1:00-5:00 AM periods restarts the weekly cycle.";

// ============================================================================
// Grid reasons
// ============================================================================

pub fn restart_reason() -> String {
    format!("Restart completed; earlier hours drop out of the cycle. {RESTART_SUMMARY}")
}

pub fn cycle_over_reason(cycle: WeeklyCycle, total_hours: f64, limit_hours: f64) -> String {
    format!(
        "Cycle total {total_hours:.1}h is over the {} limit of {limit_hours:.1}h. {}",
        cycle.label(),
        rule_reference(cycle.violation_type()).corrective_action
    )
}

pub fn cycle_near_reason(cycle: WeeklyCycle, available_hours: f64) -> String {
    format!(
        "Only {available_hours:.1}h left under the {} limit.",
        cycle.label()
    )
}

pub fn break_reason(driving_since_rest_hours: f64) -> String {
    format!(
        "{driving_since_rest_hours:.1}h driven since the last rest. {}",
        rule_reference(ViolationType::Break30Minute).corrective_action
    )
}
