//! Resolved limit constants for one carrier.
//!
//! `PolicyWindow` is the validated, minute-based form of the `[weekly]`,
//! `[limits]`, `[thresholds]` and `[fleet]` config sections. Every engine
//! function takes it by reference; nothing in the engine reads config globals.

use chrono_tz::Tz;
use serde::Serialize;

use super::HosError;
use crate::types::WeeklyCycle;

/// Round fractional hours to whole minutes.
#[allow(clippy::cast_possible_truncation)]
pub fn hours_to_minutes(hours: f64) -> i64 {
    (hours * 60.0).round() as i64
}

/// Dashboard and fleet classification thresholds. Not regulatory limits.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AdvisoryThresholds {
    /// Weekly violations over the limit by more than this are CRITICAL
    pub weekly_critical_margin_minutes: i64,
    /// Driving since the last daily rest at or above this sets `next_break_required`
    pub break_warning_minutes: i64,
    pub at_risk_weekly_minutes: i64,
    pub at_risk_driving_minutes: i64,
    pub at_risk_on_duty_minutes: i64,
    pub fleet_limited_weekly_minutes: i64,
    pub fleet_rest_weekly_minutes: i64,
    pub fleet_rest_driving_minutes: i64,
}

impl Default for AdvisoryThresholds {
    fn default() -> Self {
        Self {
            weekly_critical_margin_minutes: 5 * 60,
            break_warning_minutes: 7 * 60 + 30,
            at_risk_weekly_minutes: 10 * 60,
            at_risk_driving_minutes: 2 * 60,
            at_risk_on_duty_minutes: 2 * 60,
            fleet_limited_weekly_minutes: 20 * 60,
            fleet_rest_weekly_minutes: 10 * 60,
            fleet_rest_driving_minutes: 2 * 60,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PolicyWindow {
    pub weekly_cycle: WeeklyCycle,
    pub weekly_limit_minutes: i64,
    pub driving_limit_minutes: i64,
    pub on_duty_limit_minutes: i64,
    pub break_after_driving_minutes: i64,
    pub break_minutes: i64,
    pub daily_reset_minutes: i64,
    pub restart_minutes: i64,
    /// Local hour the restart night period starts (inclusive)
    pub restart_night_start_hour: u32,
    /// Local hour the restart night period ends (exclusive)
    pub restart_night_end_hour: u32,
    pub restart_nights_required: u32,
    /// Home-terminal time zone used for the restart night periods and grid days
    #[serde(serialize_with = "serialize_tz")]
    pub time_zone: Tz,
    pub advisory: AdvisoryThresholds,
}

fn serialize_tz<S: serde::Serializer>(tz: &Tz, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_str(tz.name())
}

impl Default for PolicyWindow {
    fn default() -> Self {
        Self::federal(WeeklyCycle::Sixty7, chrono_tz::America::New_York)
    }
}

impl PolicyWindow {
    /// Federal property-carrying limits for the given cycle.
    pub fn federal(cycle: WeeklyCycle, time_zone: Tz) -> Self {
        let weekly_hours = match cycle {
            WeeklyCycle::Sixty7 => 60,
            WeeklyCycle::Seventy8 => 70,
        };
        Self {
            weekly_cycle: cycle,
            weekly_limit_minutes: weekly_hours * 60,
            driving_limit_minutes: 11 * 60,
            on_duty_limit_minutes: 14 * 60,
            break_after_driving_minutes: 8 * 60,
            break_minutes: 30,
            daily_reset_minutes: 10 * 60,
            restart_minutes: 34 * 60,
            restart_night_start_hour: 1,
            restart_night_end_hour: 5,
            restart_nights_required: 2,
            time_zone,
            advisory: AdvisoryThresholds::default(),
        }
    }

    pub fn weekly_window_days(&self) -> i64 {
        self.weekly_cycle.days()
    }

    /// Reject limit sets the engine cannot evaluate meaningfully.
    pub fn validate(&self) -> Result<(), HosError> {
        let positive = [
            ("weekly_limit", self.weekly_limit_minutes),
            ("driving_limit", self.driving_limit_minutes),
            ("on_duty_limit", self.on_duty_limit_minutes),
            ("break_after_driving", self.break_after_driving_minutes),
            ("break", self.break_minutes),
            ("daily_reset", self.daily_reset_minutes),
            ("restart", self.restart_minutes),
        ];
        for (name, minutes) in positive {
            if minutes <= 0 {
                return Err(HosError::InvalidPolicy(format!(
                    "{name} must be positive (got {minutes} minutes)"
                )));
            }
        }
        if self.driving_limit_minutes > self.on_duty_limit_minutes {
            return Err(HosError::InvalidPolicy(format!(
                "driving limit ({}m) cannot exceed on-duty limit ({}m)",
                self.driving_limit_minutes, self.on_duty_limit_minutes
            )));
        }
        if self.restart_minutes < self.daily_reset_minutes {
            return Err(HosError::InvalidPolicy(format!(
                "restart ({}m) must be at least the daily reset ({}m)",
                self.restart_minutes, self.daily_reset_minutes
            )));
        }
        if self.restart_night_start_hour >= self.restart_night_end_hour
            || self.restart_night_end_hour > 23
        {
            return Err(HosError::InvalidPolicy(format!(
                "restart night period {}:00-{}:00 must be a same-day range",
                self.restart_night_start_hour, self.restart_night_end_hour
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_federal_defaults_validate() {
        assert!(PolicyWindow::default().validate().is_ok());
        let p = PolicyWindow::federal(WeeklyCycle::Seventy8, chrono_tz::UTC);
        assert_eq!(p.weekly_limit_minutes, 70 * 60);
        assert_eq!(p.weekly_window_days(), 8);
        assert!(p.validate().is_ok());
    }

    #[test]
    fn test_hours_to_minutes_rounds() {
        assert_eq!(hours_to_minutes(7.5), 450);
        assert_eq!(hours_to_minutes(0.5), 30);
        assert_eq!(hours_to_minutes(1.0 / 60.0 * 0.6), 1);
    }

    #[test]
    fn test_inverted_night_period_rejected() {
        let mut p = PolicyWindow::default();
        p.restart_night_start_hour = 5;
        p.restart_night_end_hour = 1;
        assert!(matches!(p.validate(), Err(HosError::InvalidPolicy(_))));
    }

    #[test]
    fn test_driving_over_on_duty_rejected() {
        let mut p = PolicyWindow::default();
        p.driving_limit_minutes = 15 * 60;
        assert!(matches!(p.validate(), Err(HosError::InvalidPolicy(_))));
    }
}
