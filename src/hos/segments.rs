//! Segment builder and normaliser
//!
//! Turns timecard attendance records into an ordered, non-overlapping
//! duty history, and checks caller-supplied segment lists against the same
//! invariants before anything is summed.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};

use super::HosError;
use crate::types::{AttendanceRecord, DutySegment, DutyStatus};

/// Build a driver's duty history from attendance records.
///
/// Each record becomes a worked segment, split by its break if one is
/// recorded. Gaps between records become `OffDuty`. Records may arrive in
/// any order but must all belong to one driver and must not overlap.
pub fn build_segments(records: &[AttendanceRecord]) -> Result<Vec<DutySegment>, HosError> {
    let Some(first) = records.first() else {
        return Ok(Vec::new());
    };
    let pieces = record_pieces(records, true)?;
    normalize_segments(&first.driver_id, &pieces)
}

/// Worked and break pieces for each record, with `OffDuty` between records
/// when `fill_gaps` is set.
fn record_pieces(records: &[AttendanceRecord], fill_gaps: bool) -> Result<Vec<DutySegment>, HosError> {
    let Some(first) = records.first() else {
        return Ok(Vec::new());
    };
    let driver_id = first.driver_id.as_str();

    let mut sorted: Vec<&AttendanceRecord> = records.iter().collect();
    sorted.sort_by_key(|r| r.clock_in);

    let mut pieces: Vec<DutySegment> = Vec::with_capacity(sorted.len() * 2);
    let mut prev_out: Option<DateTime<Utc>> = None;

    for record in sorted {
        if record.driver_id != driver_id {
            return Err(HosError::malformed(
                driver_id,
                format!("record for driver '{}' found in this history", record.driver_id),
            ));
        }
        if record.clock_out <= record.clock_in {
            return Err(HosError::malformed(
                driver_id,
                format!(
                    "clock-out {} is not after clock-in {}",
                    record.clock_out, record.clock_in
                ),
            ));
        }
        if let Some(prev) = prev_out {
            if record.clock_in < prev {
                return Err(HosError::malformed(
                    driver_id,
                    format!("record starting {} overlaps previous record ending {prev}", record.clock_in),
                ));
            }
            if fill_gaps && record.clock_in > prev {
                pieces.push(DutySegment::new(driver_id, prev, record.clock_in, DutyStatus::OffDuty));
            }
        }

        let work = record.kind.status();
        match (record.break_start, record.break_end) {
            (None, None) => {
                pieces.push(DutySegment::new(driver_id, record.clock_in, record.clock_out, work));
            }
            (Some(bs), Some(be)) => {
                if be <= bs || bs < record.clock_in || be > record.clock_out {
                    return Err(HosError::malformed(
                        driver_id,
                        format!(
                            "break {bs} - {be} is inverted or outside shift {} - {}",
                            record.clock_in, record.clock_out
                        ),
                    ));
                }
                if bs > record.clock_in {
                    pieces.push(DutySegment::new(driver_id, record.clock_in, bs, work));
                }
                pieces.push(DutySegment::new(driver_id, bs, be, DutyStatus::OffDuty));
                if record.clock_out > be {
                    pieces.push(DutySegment::new(driver_id, be, record.clock_out, work));
                }
            }
            _ => {
                return Err(HosError::malformed(
                    driver_id,
                    format!("break on shift starting {} has only one bound", record.clock_in),
                ));
            }
        }
        prev_out = Some(record.clock_out);
    }

    Ok(pieces)
}

/// Sort, validate and coalesce a driver's segments.
///
/// Rejects zero-length or inverted segments, overlaps, and segments tagged
/// with another driver. Touching segments with the same status are merged so
/// that every boundary in the result is a status change.
pub fn normalize_segments(
    driver_id: &str,
    segments: &[DutySegment],
) -> Result<Vec<DutySegment>, HosError> {
    let mut sorted: Vec<&DutySegment> = segments.iter().collect();
    sorted.sort_by_key(|s| (s.start, s.end));

    let mut out: Vec<DutySegment> = Vec::with_capacity(sorted.len());
    for seg in sorted {
        if seg.driver_id != driver_id {
            return Err(HosError::malformed(
                driver_id,
                format!("segment for driver '{}' found in this history", seg.driver_id),
            ));
        }
        if seg.end <= seg.start {
            return Err(HosError::malformed(
                driver_id,
                format!("{} segment {} - {} has no positive duration", seg.status, seg.start, seg.end),
            ));
        }
        if let Some(last) = out.last_mut() {
            if seg.start < last.end {
                return Err(HosError::malformed(
                    driver_id,
                    format!(
                        "{} segment starting {} overlaps {} segment ending {}",
                        seg.status, seg.start, last.status, last.end
                    ),
                ));
            }
            if seg.start == last.end && seg.status == last.status {
                last.end = seg.end;
                continue;
            }
        }
        out.push(seg.clone());
    }
    Ok(out)
}

/// Combine record-derived and directly supplied segments into one history.
///
/// Time between records is left open here so supplied segments can cover it;
/// the timeline treats whatever stays uncovered as off duty.
pub fn history_segments(
    driver_id: &str,
    segments: &[DutySegment],
    records: &[AttendanceRecord],
) -> Result<Vec<DutySegment>, HosError> {
    if records.is_empty() {
        return normalize_segments(driver_id, segments);
    }
    if let Some(stray) = records.iter().find(|r| r.driver_id != driver_id) {
        return Err(HosError::malformed(
            driver_id,
            format!("record for driver '{}' found in this history", stray.driver_id),
        ));
    }
    let mut all = record_pieces(records, false)?;
    all.extend(segments.iter().cloned());
    normalize_segments(driver_id, &all)
}

/// Split a mixed attendance export into per-driver record lists.
pub fn group_by_driver(records: &[AttendanceRecord]) -> BTreeMap<String, Vec<AttendanceRecord>> {
    let mut grouped: BTreeMap<String, Vec<AttendanceRecord>> = BTreeMap::new();
    for r in records {
        grouped.entry(r.driver_id.clone()).or_default().push(r.clone());
    }
    grouped
}
