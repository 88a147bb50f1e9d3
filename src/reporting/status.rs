//! Dashboard status badge

use crate::hos::{hours_to_minutes, PolicyWindow};
use crate::types::{ComplianceStatus, DriverMetrics, Violation};

/// `VIOLATION` if anything is active, `AT_RISK` when close to a limit, else `OK`.
pub fn compliance_status(
    metrics: &DriverMetrics,
    violations: &[Violation],
    policy: &PolicyWindow,
) -> ComplianceStatus {
    if !violations.is_empty() {
        return ComplianceStatus::Violation;
    }
    let a = &policy.advisory;
    let near = |available_hours: f64, threshold_minutes: i64| {
        hours_to_minutes(available_hours) < threshold_minutes
    };
    if metrics.next_break_required
        || near(metrics.weekly_hours_available, a.at_risk_weekly_minutes)
        || near(metrics.driving_hours_available, a.at_risk_driving_minutes)
        || near(metrics.on_duty_hours_available, a.at_risk_on_duty_minutes)
    {
        ComplianceStatus::AtRisk
    } else {
        ComplianceStatus::Ok
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hos::evaluate;
    use crate::types::{DutySegment, DutyStatus};
    use chrono::{TimeZone, Utc};

    fn t(day: u32, hour: u32) -> chrono::DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, day, hour, 0, 0).unwrap()
    }

    #[test]
    fn test_fresh_driver_ok() {
        let p = PolicyWindow::default();
        let (m, v) = evaluate("D1", &[], t(2, 12), &p).unwrap();
        assert_eq!(compliance_status(&m, &v, &p), ComplianceStatus::Ok);
    }

    #[test]
    fn test_low_driving_capacity_at_risk() {
        let p = PolicyWindow::default();
        let segs = vec![
            DutySegment::new("D1", t(2, 6), t(2, 10), DutyStatus::Driving),
            DutySegment::new("D1", t(2, 10), t(2, 11), DutyStatus::OnDutyNotDriving),
            DutySegment::new("D1", t(2, 11), t(2, 17), DutyStatus::Driving),
        ];
        let (m, v) = evaluate("D1", &segs, t(2, 17), &p).unwrap();
        assert!(v.is_empty());
        assert_eq!(compliance_status(&m, &v, &p), ComplianceStatus::AtRisk);
    }

    #[test]
    fn test_violation_badge() {
        let p = PolicyWindow::default();
        let segs = vec![DutySegment::new("D1", t(2, 6), t(2, 15), DutyStatus::Driving)];
        let (m, v) = evaluate("D1", &segs, t(2, 15), &p).unwrap();
        assert!(!v.is_empty());
        assert_eq!(compliance_status(&m, &v, &p), ComplianceStatus::Violation);
    }
}
