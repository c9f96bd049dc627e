//! Alternative slot proposals for an entry that needs to move.

use crate::conflicts::intervals_overlap;
use crate::schedule::{ClockTime, ScheduleEntry, SchoolDay};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Suggestion {
    pub day: SchoolDay,
    pub start_time: ClockTime,
    pub end_time: ClockTime,
}

/// Candidate grid and limits for a suggestion search.
#[derive(Debug, Clone, Copy)]
pub struct SlotSearch<'a> {
    pub time_slots: &'a [ClockTime],
    pub days: &'a [SchoolDay],
    pub duration_minutes: u16,
    pub limit: usize,
}

fn slot_is_free(
    entry: &ScheduleEntry,
    all_entries: &[ScheduleEntry],
    day: SchoolDay,
    start: ClockTime,
    end: ClockTime,
) -> bool {
    !all_entries.iter().any(|other| {
        other.id != entry.id
            && other.day == day
            && intervals_overlap(start, end, other.start_time, other.end_time)
    })
}

/// Proposes up to `search.limit` slots that overlap no other entry.
///
/// Same-day slots from the hourly grid come first (fixed duration), then the
/// entry's current time range on every other day.
pub fn suggest_slots(
    entry: &ScheduleEntry,
    all_entries: &[ScheduleEntry],
    search: &SlotSearch<'_>,
) -> Vec<Suggestion> {
    let mut out: Vec<Suggestion> = Vec::new();
    if search.limit == 0 {
        return out;
    }

    for &start in search.time_slots {
        let Some(end) = start.plus_minutes(search.duration_minutes) else {
            continue;
        };
        if start == entry.start_time && end == entry.end_time {
            continue;
        }
        if slot_is_free(entry, all_entries, entry.day, start, end) {
            out.push(Suggestion {
                day: entry.day,
                start_time: start,
                end_time: end,
            });
            if out.len() >= search.limit {
                return out;
            }
        }
    }

    for &day in search.days.iter().filter(|d| **d != entry.day) {
        if slot_is_free(entry, all_entries, day, entry.start_time, entry.end_time) {
            out.push(Suggestion {
                day,
                start_time: entry.start_time,
                end_time: entry.end_time,
            });
            if out.len() >= search.limit {
                break;
            }
        }
    }
    out
}
