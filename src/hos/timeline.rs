//! Gap-filled duty timeline ending at an evaluation instant

use chrono::{DateTime, Utc};

use crate::types::{DutySegment, DutyStatus};

/// A maximal run of time during which a predicate on duty status holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Span {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl Span {
    pub fn minutes(&self) -> i64 {
        (self.end - self.start).num_minutes()
    }
}

/// Contiguous duty history from the first recorded segment up to `until`.
///
/// Built from normalised segments. Uncovered time between segments and after
/// the last segment is filled as `OffDuty`; segments are clipped at `until`.
#[derive(Debug, Clone)]
pub struct Timeline {
    segments: Vec<DutySegment>,
    until: DateTime<Utc>,
}

impl Timeline {
    pub fn new(driver_id: &str, segments: &[DutySegment], until: DateTime<Utc>) -> Self {
        let mut filled: Vec<DutySegment> = Vec::with_capacity(segments.len() + 1);
        let mut cursor: Option<DateTime<Utc>> = None;

        for seg in segments {
            if seg.start >= until {
                break;
            }
            if let Some(c) = cursor {
                if seg.start > c {
                    filled.push(DutySegment::new(driver_id, c, seg.start, DutyStatus::OffDuty));
                }
            }
            let end = seg.end.min(until);
            filled.push(DutySegment::new(driver_id, seg.start, end, seg.status));
            cursor = Some(end);
        }
        if let Some(c) = cursor {
            if c < until {
                filled.push(DutySegment::new(driver_id, c, until, DutyStatus::OffDuty));
            }
        }

        Self {
            segments: filled,
            until,
        }
    }

    pub fn until(&self) -> DateTime<Utc> {
        self.until
    }

    pub fn segments(&self) -> &[DutySegment] {
        &self.segments
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    pub fn start(&self) -> Option<DateTime<Utc>> {
        self.segments.first().map(|s| s.start)
    }

    /// Merge consecutive segments whose status satisfies `pred`.
    pub fn spans_where(&self, pred: impl Fn(DutyStatus) -> bool) -> Vec<Span> {
        let mut spans: Vec<Span> = Vec::new();
        for seg in &self.segments {
            if !pred(seg.status) {
                continue;
            }
            match spans.last_mut() {
                Some(last) if last.end == seg.start => last.end = seg.end,
                _ => spans.push(Span {
                    start: seg.start,
                    end: seg.end,
                }),
            }
        }
        spans
    }

    /// Off-duty and sleeper-berth runs.
    pub fn rest_spans(&self) -> Vec<Span> {
        self.spans_where(DutyStatus::is_rest)
    }

    /// Runs of any status other than driving.
    pub fn non_driving_spans(&self) -> Vec<Span> {
        self.spans_where(|s| !s.is_driving())
    }

    /// Minutes in `[from, to)` spent in a status satisfying `pred`.
    ///
    /// Overlaps are summed in seconds and the total is rounded up to whole
    /// minutes, so partial minutes count against a limit.
    pub fn minutes_where(
        &self,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
        pred: impl Fn(DutyStatus) -> bool,
    ) -> i64 {
        let seconds: i64 = self
            .segments
            .iter()
            .filter(|s| pred(s.status))
            .map(|s| s.overlap(from, to).num_seconds())
            .sum();
        (seconds + 59).div_euclid(60)
    }

    pub fn on_duty_minutes(&self, from: DateTime<Utc>, to: DateTime<Utc>) -> i64 {
        self.minutes_where(from, to, DutyStatus::is_on_duty)
    }

    pub fn driving_minutes(&self, from: DateTime<Utc>, to: DateTime<Utc>) -> i64 {
        self.minutes_where(from, to, DutyStatus::is_driving)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn t(day: u32, hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, day, hour, 0, 0).unwrap()
    }

    #[test]
    fn test_gaps_and_tail_filled_off_duty() {
        let segs = vec![
            DutySegment::new("D1", t(2, 8), t(2, 10), DutyStatus::Driving),
            DutySegment::new("D1", t(2, 12), t(2, 14), DutyStatus::Driving),
        ];
        let tl = Timeline::new("D1", &segs, t(2, 20));
        let statuses: Vec<_> = tl.segments().iter().map(|s| s.status).collect();
        assert_eq!(
            statuses,
            vec![
                DutyStatus::Driving,
                DutyStatus::OffDuty,
                DutyStatus::Driving,
                DutyStatus::OffDuty
            ]
        );
        assert_eq!(tl.segments().last().unwrap().end, t(2, 20));
    }

    #[test]
    fn test_clipped_at_until() {
        let segs = vec![
            DutySegment::new("D1", t(2, 8), t(2, 18), DutyStatus::Driving),
            DutySegment::new("D1", t(2, 19), t(2, 21), DutyStatus::Driving),
        ];
        let tl = Timeline::new("D1", &segs, t(2, 12));
        assert_eq!(tl.segments().len(), 1);
        assert_eq!(tl.driving_minutes(t(2, 0), t(2, 23)), 4 * 60);
    }

    #[test]
    fn test_rest_spans_merge_off_and_sleeper() {
        let segs = vec![
            DutySegment::new("D1", t(2, 8), t(2, 10), DutyStatus::Driving),
            DutySegment::new("D1", t(2, 10), t(2, 14), DutyStatus::OffDuty),
            DutySegment::new("D1", t(2, 14), t(2, 20), DutyStatus::SleeperBerth),
            DutySegment::new("D1", t(2, 20), t(2, 22), DutyStatus::OnDutyNotDriving),
        ];
        let tl = Timeline::new("D1", &segs, t(2, 22));
        let rest = tl.rest_spans();
        assert_eq!(rest.len(), 1);
        assert_eq!(rest[0].minutes(), 10 * 60);
        let non_driving = tl.non_driving_spans();
        assert_eq!(non_driving.len(), 1);
        assert_eq!(non_driving[0].minutes(), 12 * 60);
    }

    #[test]
    fn test_sub_minute_pieces_are_not_dropped() {
        let mut segs = Vec::new();
        let mut cursor = t(2, 6);
        for _ in 0..60 {
            let drive_end = cursor + chrono::Duration::seconds(11 * 60 + 50);
            let work_end = drive_end + chrono::Duration::seconds(40);
            segs.push(DutySegment::new("D1", cursor, drive_end, DutyStatus::Driving));
            segs.push(DutySegment::new("D1", drive_end, work_end, DutyStatus::OnDutyNotDriving));
            cursor = work_end;
        }
        let tl = Timeline::new("D1", &segs, cursor);
        // 60 x 710s = 42600s = 710 minutes exactly
        assert_eq!(tl.driving_minutes(t(2, 0), cursor), 710);
        // 60 x 750s = 45000s = 750 minutes exactly
        assert_eq!(tl.on_duty_minutes(t(2, 0), cursor), 750);
    }

    #[test]
    fn test_partial_minute_rounds_up() {
        let end = t(2, 8) + chrono::Duration::seconds(1);
        let segs = vec![DutySegment::new("D1", t(2, 6), end, DutyStatus::Driving)];
        let tl = Timeline::new("D1", &segs, end);
        assert_eq!(tl.driving_minutes(t(2, 0), end), 121);
    }

    #[test]
    fn test_empty_history() {
        let tl = Timeline::new("D1", &[], t(2, 12));
        assert!(tl.is_empty());
        assert_eq!(tl.on_duty_minutes(t(1, 0), t(2, 12)), 0);
        assert!(tl.start().is_none());
    }
}
