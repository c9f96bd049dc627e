//! Timetable records: class sessions, exams and instructors.

use crate::error::{Result, ScheduleError};
use chrono::{Datelike, NaiveDate, NaiveTime, Timelike, Weekday};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

/// Wall-clock time of day, stored as minutes since midnight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ClockTime(u16);

impl ClockTime {
    pub const MINUTES_PER_DAY: u16 = 24 * 60;

    pub fn parse(raw: &str) -> Result<Self> {
        let t = raw.trim();
        let parsed = NaiveTime::parse_from_str(t, "%H:%M").map_err(|_| {
            ScheduleError::InvalidTimeFormat {
                value: raw.to_string(),
            }
        })?;
        Ok(Self((parsed.hour() * 60 + parsed.minute()) as u16))
    }

    pub fn from_minutes(minutes: u16) -> Option<Self> {
        (minutes < Self::MINUTES_PER_DAY).then_some(Self(minutes))
    }

    pub fn minutes(self) -> u16 {
        self.0
    }

    pub fn hour(self) -> u16 {
        self.0 / 60
    }

    /// Adds minutes, returning `None` if the result runs past midnight.
    pub fn plus_minutes(self, minutes: u16) -> Option<Self> {
        Self::from_minutes(self.0.checked_add(minutes)?)
    }
}

impl fmt::Display for ClockTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}", self.0 / 60, self.0 % 60)
    }
}

impl TryFrom<String> for ClockTime {
    type Error = ScheduleError;

    fn try_from(value: String) -> Result<Self> {
        Self::parse(&value)
    }
}

impl From<ClockTime> for String {
    fn from(value: ClockTime) -> Self {
        value.to_string()
    }
}

/// Teaching days. Sunday has no sessions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum SchoolDay {
    Monday,
    Tuesday,
    Wednesday,
    Thursday,
    Friday,
    Saturday,
}

impl SchoolDay {
    pub const ALL: [SchoolDay; 6] = [
        SchoolDay::Monday,
        SchoolDay::Tuesday,
        SchoolDay::Wednesday,
        SchoolDay::Thursday,
        SchoolDay::Friday,
        SchoolDay::Saturday,
    ];

    pub fn parse(raw: &str) -> Result<Self> {
        let t = raw.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|d| d.as_str().to_ascii_lowercase() == t)
            .ok_or_else(|| ScheduleError::InvalidDay {
                value: raw.to_string(),
            })
    }

    pub fn as_str(self) -> &'static str {
        match self {
            SchoolDay::Monday => "Monday",
            SchoolDay::Tuesday => "Tuesday",
            SchoolDay::Wednesday => "Wednesday",
            SchoolDay::Thursday => "Thursday",
            SchoolDay::Friday => "Friday",
            SchoolDay::Saturday => "Saturday",
        }
    }

    pub fn from_weekday(w: Weekday) -> Option<Self> {
        match w {
            Weekday::Mon => Some(SchoolDay::Monday),
            Weekday::Tue => Some(SchoolDay::Tuesday),
            Weekday::Wed => Some(SchoolDay::Wednesday),
            Weekday::Thu => Some(SchoolDay::Thursday),
            Weekday::Fri => Some(SchoolDay::Friday),
            Weekday::Sat => Some(SchoolDay::Saturday),
            Weekday::Sun => None,
        }
    }
}

impl fmt::Display for SchoolDay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<String> for SchoolDay {
    type Error = ScheduleError;

    fn try_from(value: String) -> Result<Self> {
        Self::parse(&value)
    }
}

impl From<SchoolDay> for String {
    fn from(value: SchoolDay) -> Self {
        value.as_str().to_string()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryStatus {
    Active,
    Pending,
    Conflict,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExamStatus {
    Scheduled,
    Pending,
    Approved,
    Rejected,
}

impl ExamStatus {
    pub fn parse(raw: &str) -> Result<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "scheduled" => Ok(ExamStatus::Scheduled),
            "pending" => Ok(ExamStatus::Pending),
            "approved" => Ok(ExamStatus::Approved),
            "rejected" => Ok(ExamStatus::Rejected),
            _ => Err(ScheduleError::InvalidInput(
                "status must be one of: scheduled, pending, approved, rejected".into(),
            )),
        }
    }
}

/// One weekly recurring class session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleEntry {
    pub id: String,
    pub course_id: String,
    pub course_name: String,
    pub instructor_id: String,
    /// Snapshot of the instructor's name when assigned; not re-synced on rename.
    pub instructor_name: String,
    pub day: SchoolDay,
    pub start_time: ClockTime,
    pub end_time: ClockTime,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub classroom: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub virtual_link: Option<String>,
    #[serde(default)]
    pub semester: String,
    #[serde(default)]
    pub level: String,
    pub status: EntryStatus,
}

impl ScheduleEntry {
    pub fn duration_minutes(&self) -> u16 {
        self.end_time.minutes().saturating_sub(self.start_time.minutes())
    }

    pub fn duration_hours(&self) -> f64 {
        f64::from(self.duration_minutes()) / 60.0
    }

    pub fn location_label(&self) -> &str {
        self.classroom
            .as_deref()
            .or(self.virtual_link.as_deref())
            .unwrap_or("TBD")
    }
}

fn non_empty(v: Option<String>) -> Option<String> {
    v.map(|s| s.trim().to_string()).filter(|s| !s.is_empty())
}

fn check_range(start: ClockTime, end: ClockTime) -> Result<()> {
    if start >= end {
        return Err(ScheduleError::InvalidTimeRange {
            start: start.to_string(),
            end: end.to_string(),
        });
    }
    Ok(())
}

/// Unvalidated entry fields as they arrive from a caller.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct NewEntry {
    pub id: Option<String>,
    pub course_id: String,
    pub course_name: String,
    pub instructor_id: String,
    pub instructor_name: String,
    pub day: String,
    pub start_time: String,
    pub end_time: String,
    pub classroom: Option<String>,
    pub virtual_link: Option<String>,
    pub semester: String,
    pub level: String,
    pub status: Option<EntryStatus>,
}

impl NewEntry {
    pub fn into_entry(self, id: String) -> Result<ScheduleEntry> {
        let day = SchoolDay::parse(&self.day)?;
        let start_time = ClockTime::parse(&self.start_time)?;
        let end_time = ClockTime::parse(&self.end_time)?;
        check_range(start_time, end_time)?;
        Ok(ScheduleEntry {
            id,
            course_id: self.course_id,
            course_name: self.course_name,
            instructor_id: self.instructor_id,
            instructor_name: self.instructor_name,
            day,
            start_time,
            end_time,
            classroom: non_empty(self.classroom),
            virtual_link: non_empty(self.virtual_link),
            semester: self.semester,
            level: self.level,
            status: self.status.unwrap_or(EntryStatus::Active),
        })
    }
}

/// Partial update of a schedule entry. Absent fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EntryPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub course_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub course_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub instructor_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub instructor_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub day: Option<SchoolDay>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_time: Option<ClockTime>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_time: Option<ClockTime>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub classroom: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub virtual_link: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub semester: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub level: Option<String>,
}

impl EntryPatch {
    pub fn is_empty(&self) -> bool {
        *self == EntryPatch::default()
    }

    pub fn from_json(patch: &Map<String, Value>) -> Result<Self> {
        let mut out = EntryPatch::default();
        for (k, v) in patch {
            let s = v.as_str().ok_or_else(|| {
                ScheduleError::InvalidInput(format!("patch.{} must be string", k))
            })?;
            match k.as_str() {
                "courseId" => out.course_id = Some(s.to_string()),
                "courseName" => out.course_name = Some(s.to_string()),
                "instructorId" => out.instructor_id = Some(s.to_string()),
                "instructorName" => out.instructor_name = Some(s.to_string()),
                "day" => out.day = Some(SchoolDay::parse(s)?),
                "startTime" => out.start_time = Some(ClockTime::parse(s)?),
                "endTime" => out.end_time = Some(ClockTime::parse(s)?),
                // Empty string clears the location.
                "classroom" => out.classroom = Some(s.trim().to_string()),
                "virtualLink" => out.virtual_link = Some(s.trim().to_string()),
                "semester" => out.semester = Some(s.to_string()),
                "level" => out.level = Some(s.to_string()),
                _ => {
                    return Err(ScheduleError::InvalidInput(format!(
                        "unknown patch field: {}",
                        k
                    )))
                }
            }
        }
        Ok(out)
    }

    /// Returns the patched entry; the original is left as is.
    pub fn apply(&self, entry: &ScheduleEntry) -> Result<ScheduleEntry> {
        let mut next = entry.clone();
        if let Some(v) = &self.course_id {
            next.course_id = v.clone();
        }
        if let Some(v) = &self.course_name {
            next.course_name = v.clone();
        }
        if let Some(v) = &self.instructor_id {
            next.instructor_id = v.clone();
        }
        if let Some(v) = &self.instructor_name {
            next.instructor_name = v.clone();
        }
        if let Some(v) = self.day {
            next.day = v;
        }
        if let Some(v) = self.start_time {
            next.start_time = v;
        }
        if let Some(v) = self.end_time {
            next.end_time = v;
        }
        if let Some(v) = &self.classroom {
            next.classroom = non_empty(Some(v.clone()));
        }
        if let Some(v) = &self.virtual_link {
            next.virtual_link = non_empty(Some(v.clone()));
        }
        if let Some(v) = &self.semester {
            next.semester = v.clone();
        }
        if let Some(v) = &self.level {
            next.level = v.clone();
        }
        check_range(next.start_time, next.end_time)?;
        Ok(next)
    }
}

/// A scheduled exam sitting. Not part of overlap detection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExamEntry {
    pub id: String,
    pub course_id: String,
    pub course_name: String,
    pub exam_date: NaiveDate,
    pub start_time: ClockTime,
    pub end_time: ClockTime,
    pub venue: String,
    pub is_online: bool,
    pub invigilator_id: String,
    pub invigilator_name: String,
    pub status: ExamStatus,
}

impl ExamEntry {
    pub fn school_day(&self) -> Option<SchoolDay> {
        SchoolDay::from_weekday(self.exam_date.weekday())
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct NewExam {
    pub id: Option<String>,
    pub course_id: String,
    pub course_name: String,
    pub exam_date: String,
    pub start_time: String,
    pub end_time: String,
    pub venue: String,
    pub is_online: bool,
    pub invigilator_id: String,
    pub invigilator_name: String,
    pub status: Option<String>,
}

impl NewExam {
    pub fn into_exam(self, id: String) -> Result<ExamEntry> {
        let exam_date = NaiveDate::parse_from_str(self.exam_date.trim(), "%Y-%m-%d").map_err(
            |_| ScheduleError::InvalidDate {
                value: self.exam_date.clone(),
            },
        )?;
        let start_time = ClockTime::parse(&self.start_time)?;
        let end_time = ClockTime::parse(&self.end_time)?;
        check_range(start_time, end_time)?;
        let status = match self.status.as_deref() {
            Some(s) => ExamStatus::parse(s)?,
            None => ExamStatus::Scheduled,
        };
        Ok(ExamEntry {
            id,
            course_id: self.course_id,
            course_name: self.course_name,
            exam_date,
            start_time,
            end_time,
            venue: self.venue,
            is_online: self.is_online,
            invigilator_id: self.invigilator_id,
            invigilator_name: self.invigilator_name,
            status,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Instructor {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub department: String,
    /// Course ids taught.
    #[serde(default)]
    pub courses: Vec<String>,
}

#[cfg(test)]
pub(crate) mod fixtures {
    use super::*;

    pub fn entry(id: &str, day: &str, start: &str, end: &str) -> ScheduleEntry {
        NewEntry {
            course_id: format!("C-{}", id),
            course_name: format!("Course {}", id),
            instructor_id: format!("I-{}", id),
            instructor_name: format!("Instructor {}", id),
            day: day.to_string(),
            start_time: start.to_string(),
            end_time: end.to_string(),
            ..NewEntry::default()
        }
        .into_entry(id.to_string())
        .expect("valid fixture entry")
    }

    pub fn entry_for(
        id: &str,
        instructor: &str,
        room: Option<&str>,
        day: &str,
        start: &str,
        end: &str,
    ) -> ScheduleEntry {
        let mut e = entry(id, day, start, end);
        e.instructor_id = instructor.to_string();
        e.instructor_name = format!("Name {}", instructor);
        e.classroom = room.map(|r| r.to_string());
        e
    }
}
