//! Aggregates over a timetable snapshot for the reports view.

use crate::conflicts::{detect_conflicts, detect_resource_conflicts, room_key, ConflictKind};
use crate::schedule::{ExamEntry, Instructor, ScheduleEntry, SchoolDay};
use serde::Serialize;
use std::cmp::Ordering;
use std::collections::{BTreeMap, HashMap};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum WorkloadBand {
    High,
    Medium,
    Low,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WorkloadThresholds {
    pub high_hours: f64,
    pub medium_hours: f64,
}

impl WorkloadThresholds {
    pub fn band(&self, hours: f64) -> WorkloadBand {
        if hours > self.high_hours {
            WorkloadBand::High
        } else if hours > self.medium_hours {
            WorkloadBand::Medium
        } else {
            WorkloadBand::Low
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkloadRow {
    pub instructor_id: String,
    pub instructor_name: String,
    pub class_count: usize,
    pub exam_count: usize,
    pub total_hours: f64,
    pub band: WorkloadBand,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomRow {
    pub room: String,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SlotRow {
    pub slot: String,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DayRow {
    pub day: SchoolDay,
    pub class_count: usize,
    pub exam_count: usize,
    pub total: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConflictAnalysis {
    pub total_entries: usize,
    pub time_overlaps: usize,
    pub instructor_conflicts: usize,
    pub room_conflicts: usize,
}

#[derive(Default)]
struct WorkloadAcc {
    name: String,
    class_count: usize,
    exam_count: usize,
    minutes: u32,
}

/// Per-instructor class count, invigilation count and weekly hours, heaviest first.
///
/// Instructors referenced by entries or exams but missing from `instructors`
/// are still reported, under their cached name.
pub fn compute_workload(
    entries: &[ScheduleEntry],
    exams: &[ExamEntry],
    instructors: &[Instructor],
    thresholds: WorkloadThresholds,
) -> Vec<WorkloadRow> {
    let mut order: Vec<String> = Vec::new();
    let mut acc: HashMap<String, WorkloadAcc> = HashMap::new();

    let mut slot = |id: &str, name: &str| -> Option<String> {
        if id.is_empty() {
            return None;
        }
        if !acc.contains_key(id) {
            order.push(id.to_string());
            acc.insert(
                id.to_string(),
                WorkloadAcc {
                    name: name.to_string(),
                    ..WorkloadAcc::default()
                },
            );
        }
        Some(id.to_string())
    };

    let mut keys: Vec<(Option<String>, u16, bool)> = Vec::new();
    for i in instructors {
        slot(&i.id, &i.name);
    }
    for e in entries {
        keys.push((slot(&e.instructor_id, &e.instructor_name), e.duration_minutes(), false));
    }
    for x in exams {
        keys.push((slot(&x.invigilator_id, &x.invigilator_name), 0, true));
    }

    for (id, minutes, is_exam) in keys {
        let Some(a) = id.and_then(|id| acc.get_mut(&id)) else {
            continue;
        };
        if is_exam {
            a.exam_count += 1;
        } else {
            a.class_count += 1;
            a.minutes += u32::from(minutes);
        }
    }

    let mut rows: Vec<WorkloadRow> = order
        .into_iter()
        .filter_map(|id| {
            let a = acc.remove(&id)?;
            let total_hours = f64::from(a.minutes) / 60.0;
            Some(WorkloadRow {
                instructor_id: id,
                instructor_name: a.name,
                class_count: a.class_count,
                exam_count: a.exam_count,
                total_hours,
                band: thresholds.band(total_hours),
            })
        })
        .collect();
    rows.sort_by(|a, b| {
        b.total_hours
            .partial_cmp(&a.total_hours)
            .unwrap_or(Ordering::Equal)
            .then_with(|| a.instructor_name.cmp(&b.instructor_name))
            .then_with(|| a.instructor_id.cmp(&b.instructor_id))
    });
    rows
}

/// Entries per non-empty classroom, busiest first.
///
/// Rooms are grouped the way room conflicts are detected; the label is the
/// first spelling seen.
pub fn compute_room_utilization(entries: &[ScheduleEntry]) -> Vec<RoomRow> {
    let mut counts: BTreeMap<String, (&str, usize)> = BTreeMap::new();
    for raw in entries.iter().filter_map(|e| e.classroom.as_deref()) {
        let Some(key) = room_key(raw) else {
            continue;
        };
        counts.entry(key).or_insert((raw.trim(), 0)).1 += 1;
    }
    let mut rows: Vec<RoomRow> = counts
        .into_values()
        .map(|(label, count)| RoomRow {
            room: label.to_string(),
            count,
        })
        .collect();
    // Stable sort keeps ties in room-name order.
    rows.sort_by(|a, b| b.count.cmp(&a.count));
    rows
}

/// Entries bucketed by start hour ("09:00"), in label order.
pub fn compute_time_slot_distribution(entries: &[ScheduleEntry]) -> Vec<SlotRow> {
    let mut counts: BTreeMap<String, usize> = BTreeMap::new();
    for e in entries {
        *counts
            .entry(format!("{:02}:00", e.start_time.hour()))
            .or_default() += 1;
    }
    counts
        .into_iter()
        .map(|(slot, count)| SlotRow { slot, count })
        .collect()
}

/// Class sessions plus exams per teaching day. Exams on Sunday are not counted.
pub fn compute_day_distribution(entries: &[ScheduleEntry], exams: &[ExamEntry]) -> Vec<DayRow> {
    SchoolDay::ALL
        .into_iter()
        .map(|day| {
            let class_count = entries.iter().filter(|e| e.day == day).count();
            let exam_count = exams
                .iter()
                .filter(|x| x.school_day() == Some(day))
                .count();
            DayRow {
                day,
                class_count,
                exam_count,
                total: class_count + exam_count,
            }
        })
        .collect()
}

pub fn compute_conflict_analysis(entries: &[ScheduleEntry]) -> ConflictAnalysis {
    let resources = detect_resource_conflicts(entries);
    let count_kind = |k: ConflictKind| resources.iter().filter(|c| c.kind == k).count();
    ConflictAnalysis {
        total_entries: entries.len(),
        time_overlaps: detect_conflicts(entries).len(),
        instructor_conflicts: count_kind(ConflictKind::InstructorConflict),
        room_conflicts: count_kind(ConflictKind::RoomConflict),
    }
}
