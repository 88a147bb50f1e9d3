//! Duty model: statuses, segments, attendance records, planned segments

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

// ============================================================================
// Duty Status
// ============================================================================

/// FMCSA duty status categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DutyStatus {
    OffDuty,
    SleeperBerth,
    Driving,
    OnDutyNotDriving,
}

impl DutyStatus {
    /// Driving and on-duty-not-driving both count toward the 14h and weekly limits.
    pub fn is_on_duty(self) -> bool {
        matches!(self, Self::Driving | Self::OnDutyNotDriving)
    }

    /// Off-duty and sleeper-berth time both count as rest.
    pub fn is_rest(self) -> bool {
        !self.is_on_duty()
    }

    pub fn is_driving(self) -> bool {
        self == Self::Driving
    }

    pub fn code(self) -> &'static str {
        match self {
            Self::OffDuty => "OFF",
            Self::SleeperBerth => "SB",
            Self::Driving => "D",
            Self::OnDutyNotDriving => "ON",
        }
    }
}

impl std::fmt::Display for DutyStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::OffDuty => "off duty",
            Self::SleeperBerth => "sleeper berth",
            Self::Driving => "driving",
            Self::OnDutyNotDriving => "on duty (not driving)",
        };
        f.write_str(s)
    }
}

// ============================================================================
// Duty Segment
// ============================================================================

/// A contiguous interval `[start, end)` of a single duty status for one driver.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DutySegment {
    pub driver_id: String,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub status: DutyStatus,
}

impl DutySegment {
    pub fn new(
        driver_id: impl Into<String>,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        status: DutyStatus,
    ) -> Self {
        Self {
            driver_id: driver_id.into(),
            start,
            end,
            status,
        }
    }

    pub fn duration(&self) -> Duration {
        self.end - self.start
    }

    pub fn minutes(&self) -> i64 {
        self.duration().num_minutes()
    }

    /// Time this segment spends inside `[from, to)`, at full precision.
    pub fn overlap(&self, from: DateTime<Utc>, to: DateTime<Utc>) -> Duration {
        let lo = self.start.max(from);
        let hi = self.end.min(to);
        if hi > lo {
            hi - lo
        } else {
            Duration::zero()
        }
    }
}

// ============================================================================
// Attendance Records (Segment Builder input)
// ============================================================================

/// What kind of work an attendance record represents.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkKind {
    /// Route work; the timecard does not distinguish driving from loading.
    #[default]
    Driving,
    /// Depot, loading or training time that is on duty but not behind the wheel.
    OnDuty,
}

impl WorkKind {
    pub fn status(self) -> DutyStatus {
        match self {
            Self::Driving => DutyStatus::Driving,
            Self::OnDuty => DutyStatus::OnDutyNotDriving,
        }
    }
}

/// One clock-in/clock-out pair from the timecard system.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttendanceRecord {
    pub driver_id: String,
    pub clock_in: DateTime<Utc>,
    pub clock_out: DateTime<Utc>,
    #[serde(default)]
    pub break_start: Option<DateTime<Utc>>,
    #[serde(default)]
    pub break_end: Option<DateTime<Utc>>,
    #[serde(default)]
    pub kind: WorkKind,
}

impl AttendanceRecord {
    pub fn new(driver_id: impl Into<String>, clock_in: DateTime<Utc>, clock_out: DateTime<Utc>) -> Self {
        Self {
            driver_id: driver_id.into(),
            clock_in,
            clock_out,
            break_start: None,
            break_end: None,
            kind: WorkKind::Driving,
        }
    }

    #[must_use]
    pub fn with_break(mut self, start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        self.break_start = Some(start);
        self.break_end = Some(end);
        self
    }

    #[must_use]
    pub fn with_kind(mut self, kind: WorkKind) -> Self {
        self.kind = kind;
        self
    }
}

// ============================================================================
// Planned Segments (Predictor input)
// ============================================================================

/// A future duty interval from the schedule; not yet tied to a driver.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlannedSegment {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub status: DutyStatus,
}

impl PlannedSegment {
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>, status: DutyStatus) -> Self {
        Self { start, end, status }
    }

    pub fn for_driver(&self, driver_id: &str) -> DutySegment {
        DutySegment::new(driver_id, self.start, self.end, self.status)
    }
}
