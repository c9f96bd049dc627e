//! Operator-driven conflict resolution: pick a conflict, pick one of its
//! entries, draft a new slot (by hand or from a suggestion), then apply.

use crate::conflicts::ConflictInfo;
use crate::error::{Result, ScheduleError};
use crate::schedule::{ClockTime, EntryPatch, EntryStatus, Instructor, ScheduleEntry, SchoolDay};
use crate::suggest::Suggestion;
use serde::Serialize;
use serde_json::{Map, Value};
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum WorkflowError {
    #[error("no conflict is selected")]
    NotResolving,

    #[error("entry {id} is not part of the selected conflict")]
    EntryNotInConflict { id: String },

    #[error("select an entry first")]
    NoEntrySelected,
}

/// Fields the operator wants to change. `None` means "leave as is".
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolutionDraft {
    pub new_day: Option<SchoolDay>,
    pub new_start_time: Option<ClockTime>,
    pub new_end_time: Option<ClockTime>,
    pub new_instructor_id: Option<String>,
    pub new_classroom: Option<String>,
}

fn opt_text(v: &Value, key: &str) -> Result<Option<String>> {
    if v.is_null() {
        return Ok(None);
    }
    let s = v
        .as_str()
        .ok_or_else(|| ScheduleError::InvalidInput(format!("{} must be string or null", key)))?
        .trim();
    Ok((!s.is_empty()).then(|| s.to_string()))
}

impl ResolutionDraft {
    /// Merges form input. Null or blank values clear a field.
    pub fn merge_json(&mut self, input: &Map<String, Value>) -> Result<()> {
        let mut next = self.clone();
        for (k, v) in input {
            let text = opt_text(v, k)?;
            match k.as_str() {
                "newDay" => next.new_day = text.as_deref().map(SchoolDay::parse).transpose()?,
                "newStartTime" => {
                    next.new_start_time = text.as_deref().map(ClockTime::parse).transpose()?
                }
                "newEndTime" => {
                    next.new_end_time = text.as_deref().map(ClockTime::parse).transpose()?
                }
                "newInstructorId" => next.new_instructor_id = text,
                "newClassroom" => next.new_classroom = text,
                _ => {
                    return Err(ScheduleError::InvalidInput(format!(
                        "unknown draft field: {}",
                        k
                    )))
                }
            }
        }
        *self = next;
        Ok(())
    }

    /// Builds a patch holding only the fields that differ from `current`.
    ///
    /// A new instructor id carries the instructor's name alongside. An id
    /// missing from `instructors` is rejected so the cached name never goes
    /// stale.
    pub fn to_patch(
        &self,
        current: Option<&ScheduleEntry>,
        instructors: &[Instructor],
    ) -> Result<EntryPatch> {
        let mut patch = EntryPatch::default();
        if let Some(day) = self.new_day {
            if current.map_or(true, |e| e.day != day) {
                patch.day = Some(day);
            }
        }
        if let Some(t) = self.new_start_time {
            if current.map_or(true, |e| e.start_time != t) {
                patch.start_time = Some(t);
            }
        }
        if let Some(t) = self.new_end_time {
            if current.map_or(true, |e| e.end_time != t) {
                patch.end_time = Some(t);
            }
        }
        if let Some(id) = &self.new_instructor_id {
            if current.map_or(true, |e| &e.instructor_id != id) {
                let instructor = instructors
                    .iter()
                    .find(|i| &i.id == id)
                    .ok_or_else(|| ScheduleError::not_found("instructor", id.as_str()))?;
                patch.instructor_id = Some(id.clone());
                patch.instructor_name = Some(instructor.name.clone());
            }
        }
        if let Some(room) = &self.new_classroom {
            if current.map_or(true, |e| e.classroom.as_ref() != Some(room)) {
                patch.classroom = Some(room.clone());
            }
        }
        Ok(patch)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "state", rename_all = "camelCase")]
pub enum WorkflowState {
    Browsing,
    Resolving {
        conflict: ConflictInfo,
        #[serde(rename = "selectedEntryId")]
        selected_entry: Option<String>,
        draft: ResolutionDraft,
    },
}

#[derive(Debug)]
pub struct ResolutionWorkflow {
    state: WorkflowState,
}

impl Default for ResolutionWorkflow {
    fn default() -> Self {
        Self {
            state: WorkflowState::Browsing,
        }
    }
}

impl ResolutionWorkflow {
    pub fn state(&self) -> &WorkflowState {
        &self.state
    }

    /// Enters Resolving with an empty draft, replacing any previous selection.
    pub fn select_conflict(&mut self, conflict: ConflictInfo) {
        debug!(entries = ?conflict.affected_entries, "resolution: conflict selected");
        self.state = WorkflowState::Resolving {
            conflict,
            selected_entry: None,
            draft: ResolutionDraft::default(),
        };
    }

    /// Picks the entry to move. Switching to the other entry starts a fresh draft.
    pub fn select_entry(&mut self, entry_id: &str) -> Result<()> {
        let WorkflowState::Resolving {
            conflict,
            selected_entry,
            draft,
        } = &mut self.state
        else {
            return Err(WorkflowError::NotResolving.into());
        };
        if !conflict.involves(entry_id) {
            return Err(WorkflowError::EntryNotInConflict {
                id: entry_id.to_string(),
            }
            .into());
        }
        if selected_entry.as_deref() != Some(entry_id) {
            *draft = ResolutionDraft::default();
        }
        *selected_entry = Some(entry_id.to_string());
        debug!(entry_id, "resolution: entry selected");
        Ok(())
    }

    fn draft_mut(&mut self) -> std::result::Result<&mut ResolutionDraft, WorkflowError> {
        match &mut self.state {
            WorkflowState::Browsing => Err(WorkflowError::NotResolving),
            WorkflowState::Resolving {
                selected_entry: None,
                ..
            } => Err(WorkflowError::NoEntrySelected),
            WorkflowState::Resolving { draft, .. } => Ok(draft),
        }
    }

    pub fn edit_draft(&mut self, input: &Map<String, Value>) -> Result<()> {
        self.draft_mut()?.merge_json(input)
    }

    /// Copies day and times from the suggestion; instructor and room stay.
    pub fn apply_suggestion(&mut self, s: &Suggestion) -> Result<()> {
        let draft = self.draft_mut()?;
        draft.new_day = Some(s.day);
        draft.new_start_time = Some(s.start_time);
        draft.new_end_time = Some(s.end_time);
        Ok(())
    }

    /// Turns the draft into `(entryId, patch)` and returns to Browsing.
    ///
    /// With no entry selected this is a no-op and the state is kept. A draft
    /// naming an unknown instructor, or one that would leave the entry with an
    /// inverted time range, is rejected and the state is kept as well.
    pub fn resolve(
        &mut self,
        entries: &[ScheduleEntry],
        instructors: &[Instructor],
    ) -> Result<Option<(String, EntryPatch)>> {
        let WorkflowState::Resolving {
            selected_entry: Some(entry_id),
            draft,
            ..
        } = &self.state
        else {
            return Ok(None);
        };
        let current = entries.iter().find(|e| &e.id == entry_id);
        let patch = draft.to_patch(current, instructors)?;
        if let Some(e) = current {
            patch.apply(e)?;
        }
        let out = (entry_id.clone(), patch);
        self.state = WorkflowState::Browsing;
        Ok(Some(out))
    }

    pub fn cancel(&mut self) {
        self.state = WorkflowState::Browsing;
    }
}

/// Returns a copy of `entries` with the patch merged into `entry_id` and its
/// status reset to active. An unknown id returns the list unchanged.
pub fn apply_resolution(
    entries: &[ScheduleEntry],
    entry_id: &str,
    patch: &EntryPatch,
) -> Result<Vec<ScheduleEntry>> {
    entries
        .iter()
        .map(|e| {
            if e.id != entry_id {
                return Ok(e.clone());
            }
            let mut next = patch.apply(e)?;
            next.status = EntryStatus::Active;
            Ok(next)
        })
        .collect()
}
