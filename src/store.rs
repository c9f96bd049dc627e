//! In-memory owner of the timetable. Every mutation re-runs conflict detection
//! before returning, so `conflicts()` always matches `entries()`.

use crate::conflicts::{detect_conflicts, ConflictInfo};
use crate::error::{Result, ScheduleError};
use crate::notifications::NotificationFeed;
use crate::resolution::apply_resolution;
use crate::schedule::{
    EntryPatch, EntryStatus, ExamEntry, ExamStatus, Instructor, NewEntry, NewExam, ScheduleEntry,
    SchoolDay,
};
use std::collections::HashSet;
use tracing::{debug, info};
use uuid::Uuid;

#[derive(Debug, Clone, Default)]
pub struct EntryFilter {
    pub day: Option<SchoolDay>,
    pub semester: Option<String>,
    pub level: Option<String>,
    pub instructor_id: Option<String>,
}

impl EntryFilter {
    fn keeps(&self, e: &ScheduleEntry) -> bool {
        self.day.map_or(true, |d| e.day == d)
            && self.semester.as_ref().map_or(true, |s| &e.semester == s)
            && self.level.as_ref().map_or(true, |l| &e.level == l)
            && self
                .instructor_id
                .as_ref()
                .map_or(true, |i| &e.instructor_id == i)
    }
}

#[derive(Debug, Default)]
pub struct ScheduleStore {
    entries: Vec<ScheduleEntry>,
    exams: Vec<ExamEntry>,
    instructors: Vec<Instructor>,
    conflicts: Vec<ConflictInfo>,
    pub notifications: NotificationFeed,
}

fn assign_id(requested: Option<String>) -> String {
    requested
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| Uuid::new_v4().to_string())
}

impl ScheduleStore {
    pub fn entries(&self) -> &[ScheduleEntry] {
        &self.entries
    }

    pub fn exams(&self) -> &[ExamEntry] {
        &self.exams
    }

    pub fn instructors(&self) -> &[Instructor] {
        &self.instructors
    }

    pub fn conflicts(&self) -> &[ConflictInfo] {
        &self.conflicts
    }

    pub fn entry(&self, id: &str) -> Option<&ScheduleEntry> {
        self.entries.iter().find(|e| e.id == id)
    }

    pub fn list_entries(&self, filter: &EntryFilter) -> Vec<&ScheduleEntry> {
        self.entries.iter().filter(|e| filter.keeps(e)).collect()
    }

    /// Each teaching day in order with its sessions sorted by start time.
    pub fn week_grid(&self) -> Vec<(SchoolDay, Vec<&ScheduleEntry>)> {
        SchoolDay::ALL
            .into_iter()
            .map(|day| {
                let mut items: Vec<&ScheduleEntry> =
                    self.entries.iter().filter(|e| e.day == day).collect();
                items.sort_by_key(|e| (e.start_time, e.end_time));
                (day, items)
            })
            .collect()
    }

    /// Re-detects conflicts and relabels statuses. Pending entries keep their status.
    fn recompute(&mut self) {
        self.conflicts = detect_conflicts(&self.entries);
        let involved: HashSet<&str> = self
            .conflicts
            .iter()
            .flat_map(|c| c.affected_entries.iter().map(String::as_str))
            .collect();
        let mut relabeled: Vec<(usize, EntryStatus)> = Vec::new();
        for (i, e) in self.entries.iter().enumerate() {
            let hit = involved.contains(e.id.as_str());
            match e.status {
                EntryStatus::Active if hit => relabeled.push((i, EntryStatus::Conflict)),
                EntryStatus::Conflict if !hit => relabeled.push((i, EntryStatus::Active)),
                _ => {}
            }
        }
        for (i, status) in relabeled {
            self.entries[i].status = status;
        }
        debug!(
            entries = self.entries.len(),
            conflicts = self.conflicts.len(),
            "conflicts recomputed"
        );
    }

    /// Replaces the whole snapshot. Nothing changes if any record is invalid.
    pub fn replace_all(
        &mut self,
        entries: Vec<NewEntry>,
        exams: Vec<NewExam>,
        instructors: Vec<Instructor>,
    ) -> Result<()> {
        let mut next_entries = Vec::with_capacity(entries.len());
        let mut seen = HashSet::new();
        for input in entries {
            let id = assign_id(input.id.clone());
            if !seen.insert(id.clone()) {
                return Err(ScheduleError::DuplicateId { kind: "entry", id });
            }
            next_entries.push(input.into_entry(id)?);
        }
        let mut next_exams = Vec::with_capacity(exams.len());
        let mut seen = HashSet::new();
        for input in exams {
            let id = assign_id(input.id.clone());
            if !seen.insert(id.clone()) {
                return Err(ScheduleError::DuplicateId { kind: "exam", id });
            }
            next_exams.push(input.into_exam(id)?);
        }
        let mut seen = HashSet::new();
        for i in &instructors {
            if !seen.insert(i.id.as_str()) {
                return Err(ScheduleError::DuplicateId {
                    kind: "instructor",
                    id: i.id.clone(),
                });
            }
        }

        self.entries = next_entries;
        self.exams = next_exams;
        self.instructors = instructors;
        self.recompute();
        info!(
            entries = self.entries.len(),
            exams = self.exams.len(),
            conflicts = self.conflicts.len(),
            "timetable loaded"
        );
        Ok(())
    }

    pub fn add_entry(&mut self, input: NewEntry) -> Result<String> {
        let id = assign_id(input.id.clone());
        if self.entry(&id).is_some() {
            return Err(ScheduleError::DuplicateId { kind: "entry", id });
        }
        let entry = input.into_entry(id.clone())?;
        self.entries.push(entry);
        self.recompute();
        info!(entry_id = %id, conflicts = self.conflicts.len(), "entry added");
        Ok(id)
    }

    pub fn update_entry(&mut self, id: &str, patch: &EntryPatch) -> Result<&ScheduleEntry> {
        let idx = self
            .entries
            .iter()
            .position(|e| e.id == id)
            .ok_or_else(|| ScheduleError::not_found("entry", id))?;
        self.entries[idx] = patch.apply(&self.entries[idx])?;
        self.recompute();
        info!(entry_id = %id, conflicts = self.conflicts.len(), "entry updated");
        Ok(&self.entries[idx])
    }

    pub fn remove_entry(&mut self, id: &str) -> Result<()> {
        let before = self.entries.len();
        self.entries.retain(|e| e.id != id);
        if self.entries.len() == before {
            return Err(ScheduleError::not_found("entry", id));
        }
        self.recompute();
        info!(entry_id = %id, conflicts = self.conflicts.len(), "entry removed");
        Ok(())
    }

    /// Merges a resolution patch and forces the entry back to active before
    /// re-detecting.
    pub fn resolve_entry(&mut self, id: &str, patch: &EntryPatch) -> Result<()> {
        if self.entry(id).is_none() {
            return Err(ScheduleError::not_found("entry", id));
        }
        self.entries = apply_resolution(&self.entries, id, patch)?;
        self.recompute();
        info!(entry_id = %id, conflicts = self.conflicts.len(), "entry resolved");
        Ok(())
    }

    pub fn add_exam(&mut self, input: NewExam) -> Result<String> {
        let id = assign_id(input.id.clone());
        if self.exams.iter().any(|x| x.id == id) {
            return Err(ScheduleError::DuplicateId { kind: "exam", id });
        }
        let exam = input.into_exam(id.clone())?;
        self.exams.push(exam);
        info!(exam_id = %id, "exam added");
        Ok(id)
    }

    pub fn set_exam_status(&mut self, id: &str, status: ExamStatus) -> Result<&ExamEntry> {
        let exam = self
            .exams
            .iter_mut()
            .find(|x| x.id == id)
            .ok_or_else(|| ScheduleError::not_found("exam", id))?;
        exam.status = status;
        info!(exam_id = %id, ?status, "exam status changed");
        Ok(&*exam)
    }

    pub fn remove_exam(&mut self, id: &str) -> Result<()> {
        let before = self.exams.len();
        self.exams.retain(|x| x.id != id);
        if self.exams.len() == before {
            return Err(ScheduleError::not_found("exam", id));
        }
        info!(exam_id = %id, "exam removed");
        Ok(())
    }

    /// Inserts or replaces by id. Cached names on entries are not touched.
    pub fn upsert_instructor(&mut self, instructor: Instructor) -> Result<bool> {
        if instructor.id.trim().is_empty() {
            return Err(ScheduleError::InvalidInput("instructor id must not be empty".into()));
        }
        match self.instructors.iter_mut().find(|i| i.id == instructor.id) {
            Some(existing) => {
                *existing = instructor;
                Ok(false)
            }
            None => {
                info!(instructor_id = %instructor.id, "instructor added");
                self.instructors.push(instructor);
                Ok(true)
            }
        }
    }
}
