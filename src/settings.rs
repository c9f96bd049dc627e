//! Runtime settings: suggestion grid and workload thresholds.

use crate::schedule::{ClockTime, SchoolDay};
use crate::suggest::SlotSearch;
use anyhow::Context;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::path::Path;

pub const CONFIG_ENV: &str = "TIMETABLED_CONFIG";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Settings {
    pub time_slots: Vec<ClockTime>,
    pub days: Vec<SchoolDay>,
    pub suggested_duration_minutes: u16,
    pub max_suggestions: usize,
    pub workload_high_hours: f64,
    pub workload_medium_hours: f64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            time_slots: (8..=18)
                .filter_map(|h| ClockTime::from_minutes(h * 60))
                .collect(),
            days: SchoolDay::ALL.to_vec(),
            suggested_duration_minutes: 90,
            max_suggestions: 3,
            workload_high_hours: 20.0,
            workload_medium_hours: 15.0,
        }
    }
}

fn parse_u64_range(v: &Value, key: &str, min: u64, max: u64) -> Result<u64, String> {
    let n = v
        .as_u64()
        .ok_or_else(|| format!("{} must be a non-negative integer", key))?;
    if !(min..=max).contains(&n) {
        return Err(format!("{} must be in {}..={}", key, min, max));
    }
    Ok(n)
}

fn parse_hours(v: &Value, key: &str) -> Result<f64, String> {
    let n = v.as_f64().ok_or_else(|| format!("{} must be a number", key))?;
    if !(0.0..=168.0).contains(&n) {
        return Err(format!("{} must be in 0..=168", key));
    }
    Ok(n)
}

fn parse_str_list<T>(
    v: &Value,
    key: &str,
    parse: impl Fn(&str) -> crate::error::Result<T>,
) -> Result<Vec<T>, String> {
    let arr = v
        .as_array()
        .ok_or_else(|| format!("{} must be an array of strings", key))?;
    if arr.is_empty() {
        return Err(format!("{} must not be empty", key));
    }
    arr.iter()
        .map(|item| {
            let s = item
                .as_str()
                .ok_or_else(|| format!("{} must be an array of strings", key))?;
            parse(s).map_err(|e| format!("{}: {}", key, e))
        })
        .collect()
}

impl Settings {
    /// Reads settings from the file named by `TIMETABLED_CONFIG`, if set.
    pub fn from_env() -> anyhow::Result<Self> {
        match std::env::var_os(CONFIG_ENV) {
            Some(path) => Self::load(Path::new(&path)),
            None => Ok(Self::default()),
        }
    }

    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("read settings file {}", path.display()))?;
        let mut settings: Settings = serde_json::from_str(&text)
            .with_context(|| format!("parse settings file {}", path.display()))?;
        settings.normalize();
        settings.validate().map_err(anyhow::Error::msg)?;
        Ok(settings)
    }

    /// Sorts and dedups the slot grid and day list. Suggestion order follows them.
    fn normalize(&mut self) {
        self.time_slots.sort();
        self.time_slots.dedup();
        self.days.sort();
        self.days.dedup();
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.time_slots.is_empty() {
            return Err("timeSlots must not be empty".into());
        }
        if self.days.is_empty() {
            return Err("days must not be empty".into());
        }
        if !(15..=240).contains(&self.suggested_duration_minutes) {
            return Err("suggestedDurationMinutes must be in 15..=240".into());
        }
        if !(1..=10).contains(&self.max_suggestions) {
            return Err("maxSuggestions must be in 1..=10".into());
        }
        if self.workload_medium_hours < 0.0 || self.workload_medium_hours > self.workload_high_hours
        {
            return Err("workload thresholds must satisfy 0 <= medium <= high".into());
        }
        Ok(())
    }

    /// Applies a camelCase patch. On error nothing is changed.
    pub fn merge_patch(&mut self, patch: &Map<String, Value>) -> Result<(), String> {
        let mut next = self.clone();
        for (k, v) in patch {
            match k.as_str() {
                "timeSlots" => next.time_slots = parse_str_list(v, k, ClockTime::parse)?,
                "days" => next.days = parse_str_list(v, k, SchoolDay::parse)?,
                "suggestedDurationMinutes" => {
                    next.suggested_duration_minutes = parse_u64_range(v, k, 15, 240)? as u16;
                }
                "maxSuggestions" => {
                    next.max_suggestions = parse_u64_range(v, k, 1, 10)? as usize;
                }
                "workloadHighHours" => next.workload_high_hours = parse_hours(v, k)?,
                "workloadMediumHours" => next.workload_medium_hours = parse_hours(v, k)?,
                _ => return Err(format!("unknown settings field: {}", k)),
            }
        }
        next.normalize();
        next.validate()?;
        *self = next;
        Ok(())
    }

    pub fn slot_search(&self) -> SlotSearch<'_> {
        SlotSearch {
            time_slots: &self.time_slots,
            days: &self.days,
            duration_minutes: self.suggested_duration_minutes,
            limit: self.max_suggestions,
        }
    }
}
