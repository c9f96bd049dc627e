//! Pairwise time-overlap detection over a snapshot of schedule entries.

use crate::schedule::{ClockTime, ScheduleEntry};
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ConflictKind {
    TimeOverlap,
    InstructorConflict,
    RoomConflict,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConflictInfo {
    #[serde(rename = "type")]
    pub kind: ConflictKind,
    pub message: String,
    /// Ids of the two entries involved, in list order.
    pub affected_entries: [String; 2],
}

impl ConflictInfo {
    pub fn involves(&self, entry_id: &str) -> bool {
        self.affected_entries.iter().any(|id| id == entry_id)
    }

    /// True if this conflict is about the given unordered pair.
    pub fn matches_pair(&self, a: &str, b: &str) -> bool {
        let [x, y] = &self.affected_entries;
        (x == a && y == b) || (x == b && y == a)
    }
}

/// Open-interval overlap: back-to-back slots do not collide.
pub fn intervals_overlap(
    start_a: ClockTime,
    end_a: ClockTime,
    start_b: ClockTime,
    end_b: ClockTime,
) -> bool {
    start_a < end_b && end_a > start_b
}

/// Same day and overlapping time ranges.
pub fn entries_overlap(a: &ScheduleEntry, b: &ScheduleEntry) -> bool {
    a.day == b.day && intervals_overlap(a.start_time, a.end_time, b.start_time, b.end_time)
}

fn overlapping_pairs(entries: &[ScheduleEntry]) -> impl Iterator<Item = (&ScheduleEntry, &ScheduleEntry)> {
    entries.iter().enumerate().flat_map(move |(i, a)| {
        entries[i + 1..]
            .iter()
            .filter(move |b| entries_overlap(a, b))
            .map(move |b| (a, b))
    })
}

/// Every unordered pair of same-day entries whose time ranges overlap, reported once.
pub fn detect_conflicts(entries: &[ScheduleEntry]) -> Vec<ConflictInfo> {
    overlapping_pairs(entries)
        .map(|(a, b)| ConflictInfo {
            kind: ConflictKind::TimeOverlap,
            message: format!(
                "{} ({}-{}) overlaps with {} ({}-{}) on {}",
                a.course_name, a.start_time, a.end_time, b.course_name, b.start_time, b.end_time, a.day
            ),
            affected_entries: [a.id.clone(), b.id.clone()],
        })
        .collect()
}

/// Identity of a physical room: trimmed and case-folded. Blank names are no room.
pub fn room_key(raw: &str) -> Option<String> {
    let t = raw.trim();
    (!t.is_empty()).then(|| t.to_ascii_lowercase())
}

fn same_room(a: &ScheduleEntry, b: &ScheduleEntry) -> bool {
    match (
        a.classroom.as_deref().and_then(room_key),
        b.classroom.as_deref().and_then(room_key),
    ) {
        (Some(x), Some(y)) => x == y,
        _ => false,
    }
}

/// Overlapping pairs that double-book an instructor or a physical room.
///
/// A pair that shares both is reported twice, once per kind.
pub fn detect_resource_conflicts(entries: &[ScheduleEntry]) -> Vec<ConflictInfo> {
    let mut out = Vec::new();
    for (a, b) in overlapping_pairs(entries) {
        if !a.instructor_id.is_empty() && a.instructor_id == b.instructor_id {
            out.push(ConflictInfo {
                kind: ConflictKind::InstructorConflict,
                message: format!(
                    "{} is booked for {} and {} at the same time on {}",
                    a.instructor_name, a.course_name, b.course_name, a.day
                ),
                affected_entries: [a.id.clone(), b.id.clone()],
            });
        }
        if same_room(a, b) {
            out.push(ConflictInfo {
                kind: ConflictKind::RoomConflict,
                message: format!(
                    "Room {} is double-booked for {} and {} on {}",
                    a.location_label(),
                    a.course_name,
                    b.course_name,
                    a.day
                ),
                affected_entries: [a.id.clone(), b.id.clone()],
            });
        }
    }
    out
}
