//! 34-hour restart detection
//!
//! A rest span qualifies when it lasts at least `restart_minutes` and fully
//! contains the local night period (01:00-05:00 by default) on at least
//! `restart_nights_required` different calendar nights. Night periods are
//! evaluated in the policy's home-terminal time zone.

use chrono::{DateTime, NaiveDate, TimeZone, Utc};

use super::policy::PolicyWindow;
use super::timeline::{Span, Timeline};

/// UTC bounds of the night period on local date `date`, if it exists locally.
fn night_period(date: NaiveDate, policy: &PolicyWindow) -> Option<(DateTime<Utc>, DateTime<Utc>)> {
    let tz = policy.time_zone;
    let start_local = date.and_hms_opt(policy.restart_night_start_hour, 0, 0)?;
    let end_local = date.and_hms_opt(policy.restart_night_end_hour, 0, 0)?;
    let start = tz.from_local_datetime(&start_local).earliest()?;
    let end = tz.from_local_datetime(&end_local).latest()?;
    Some((start.with_timezone(&Utc), end.with_timezone(&Utc)))
}

/// Number of distinct local nights whose full night period lies inside the span.
pub fn nights_within(span: Span, policy: &PolicyWindow) -> u32 {
    let tz = policy.time_zone;
    let first = span.start.with_timezone(&tz).date_naive();
    let last = span.end.with_timezone(&tz).date_naive();

    let mut count = 0;
    let mut date = first;
    while date <= last {
        if let Some((start, end)) = night_period(date, policy) {
            if start >= span.start && end <= span.end {
                count += 1;
            }
        }
        match date.succ_opt() {
            Some(next) => date = next,
            None => break,
        }
    }
    count
}

pub fn is_qualifying_restart(span: Span, policy: &PolicyWindow) -> bool {
    span.minutes() >= policy.restart_minutes
        && nights_within(span, policy) >= policy.restart_nights_required
}

/// End instants of every qualifying restart, oldest first.
///
/// A restart still in progress at the timeline end counts once it already
/// satisfies both conditions; its end is the timeline end.
pub fn qualifying_restarts(timeline: &Timeline, policy: &PolicyWindow) -> Vec<DateTime<Utc>> {
    timeline
        .rest_spans()
        .into_iter()
        .filter(|span| is_qualifying_restart(*span, policy))
        .map(|span| span.end)
        .collect()
}

/// The most recent qualifying restart governs.
pub fn last_qualifying_restart(timeline: &Timeline, policy: &PolicyWindow) -> Option<DateTime<Utc>> {
    timeline
        .rest_spans()
        .into_iter()
        .rev()
        .find(|span| is_qualifying_restart(*span, policy))
        .map(|span| span.end)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{DutySegment, DutyStatus, WeeklyCycle};

    fn utc_policy() -> PolicyWindow {
        PolicyWindow::federal(WeeklyCycle::Sixty7, chrono_tz::UTC)
    }

    fn t(day: u32, hour: u32, min: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, day, hour, min, 0).unwrap()
    }

    fn span(start: DateTime<Utc>, end: DateTime<Utc>) -> Span {
        Span { start, end }
    }

    #[test]
    fn test_34h10m_with_two_nights_qualifies() {
        // Fri 18:00 -> Sun 04:10 does not contain Sunday's full 01-05 period
        assert!(!is_qualifying_restart(span(t(6, 18, 0), t(8, 4, 10)), &utc_policy()));
        // Fri 20:00 -> Sun 06:10 contains Sat 01-05 and Sun 01-05
        let s = span(t(6, 20, 0), t(8, 6, 10));
        assert_eq!(s.minutes(), 34 * 60 + 10);
        assert_eq!(nights_within(s, &utc_policy()), 2);
        assert!(is_qualifying_restart(s, &utc_policy()));
    }

    #[test]
    fn test_long_span_with_one_night_fails() {
        // 34h starting 06:00 covers only one 01-05 period
        let s = span(t(6, 6, 0), t(7, 16, 0));
        assert_eq!(s.minutes(), 34 * 60);
        assert_eq!(nights_within(s, &utc_policy()), 1);
        assert!(!is_qualifying_restart(s, &utc_policy()));
    }

    #[test]
    fn test_short_span_with_two_nights_fails() {
        // 28h span containing two nights is below 34h
        let s = span(t(6, 0, 30), t(7, 5, 0));
        assert_eq!(nights_within(s, &utc_policy()), 2);
        assert!(!is_qualifying_restart(s, &utc_policy()));
    }

    #[test]
    fn test_night_periods_follow_local_time_zone() {
        let chicago = PolicyWindow::federal(WeeklyCycle::Sixty7, chrono_tz::America::Chicago);
        // 01:00-05:00 CDT is 06:00-10:00 UTC. A span ending 08:00 UTC on the
        // second morning misses the second local night.
        let s = span(t(20, 20, 0), t(22, 8, 0));
        assert_eq!(nights_within(s, &utc_policy()), 2);
        assert_eq!(nights_within(s, &chicago), 1);
    }

    #[test]
    fn test_most_recent_restart_governs() {
        let p = utc_policy();
        let segs = vec![
            DutySegment::new("D1", t(1, 20, 0), t(3, 8, 0), DutyStatus::OffDuty),
            DutySegment::new("D1", t(3, 8, 0), t(4, 18, 0), DutyStatus::Driving),
            DutySegment::new("D1", t(4, 18, 0), t(6, 8, 0), DutyStatus::SleeperBerth),
            DutySegment::new("D1", t(6, 8, 0), t(6, 18, 0), DutyStatus::Driving),
        ];
        let tl = Timeline::new("D1", &segs, t(6, 18, 0));
        assert_eq!(qualifying_restarts(&tl, &p), vec![t(3, 8, 0), t(6, 8, 0)]);
        assert_eq!(last_qualifying_restart(&tl, &p), Some(t(6, 8, 0)));
    }

    #[test]
    fn test_restart_in_progress_counts() {
        let p = utc_policy();
        let segs = vec![
            DutySegment::new("D1", t(1, 8, 0), t(1, 18, 0), DutyStatus::Driving),
            DutySegment::new("D1", t(1, 18, 0), t(1, 19, 0), DutyStatus::OffDuty),
        ];
        // Off duty from 18:00 on the 1st through 12:00 on the 3rd (implicit)
        let tl = Timeline::new("D1", &segs, t(3, 12, 0));
        assert_eq!(last_qualifying_restart(&tl, &p), Some(t(3, 12, 0)));
    }
}
