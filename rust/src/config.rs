//! Configuration types for grid rendering and config editing.

use chrono::{Datelike, Local, NaiveDate};
use pyo3::prelude::*;

use crate::models::Day;
use crate::time::ClockTime;

/// Placeholder shown for absent course/faculty/room names.
pub const DEFAULT_PLACEHOLDER: &str = "—";

/// Presentation options for projecting entries onto a grid.
#[pyclass]
#[derive(Clone, Debug)]
pub struct GridOptions {
    /// Use three-letter day labels
    #[pyo3(get, set)]
    pub compact: bool,
    /// Text rendered for absent or empty names
    #[pyo3(get, set)]
    pub placeholder: String,
    /// Verbosity level: 0=silent, 1=summary, 2=detail, 3=debug
    #[pyo3(get, set)]
    pub verbosity: u8,
    /// Date whose weekday row is highlighted (None = no highlight)
    #[pyo3(get, set)]
    pub today: Option<NaiveDate>,
}

impl Default for GridOptions {
    fn default() -> Self {
        Self {
            compact: false,
            placeholder: DEFAULT_PLACEHOLDER.to_string(),
            verbosity: 0,
            today: None,
        }
    }
}

impl GridOptions {
    /// Default options highlighting the current local weekday.
    ///
    /// This is the only place the engine reads the wall clock, and it only
    /// affects the cosmetic highlight.
    pub fn with_local_today() -> Self {
        Self {
            today: Some(Local::now().date_naive()),
            ..Self::default()
        }
    }

    /// The weekday to highlight, if any.
    pub fn today_day(&self) -> Option<Day> {
        self.today.map(|date| Day::from(date.weekday()))
    }

    /// Row label for a day under these options.
    pub fn day_label(&self, day: Day) -> &'static str {
        if self.compact {
            day.short_name()
        } else {
            day.name()
        }
    }
}

#[pymethods]
impl GridOptions {
    #[new]
    #[pyo3(signature = (compact=None, placeholder=None, verbosity=None, today=None))]
    fn new(
        compact: Option<bool>,
        placeholder: Option<String>,
        verbosity: Option<u8>,
        today: Option<NaiveDate>,
    ) -> Self {
        let defaults = Self::default();
        Self {
            compact: compact.unwrap_or(defaults.compact),
            placeholder: placeholder.unwrap_or(defaults.placeholder),
            verbosity: verbosity.unwrap_or(defaults.verbosity),
            today,
        }
    }

    fn __repr__(&self) -> String {
        format!(
            "GridOptions(compact={}, placeholder={:?}, verbosity={}, today={:?})",
            self.compact, self.placeholder, self.verbosity, self.today
        )
    }
}

/// Bounds enforced by the config editor before a config is saved.
///
/// The resolver itself assumes none of these.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EditorLimits {
    pub min_periods_per_day: u32,
    pub max_periods_per_day: u32,
    pub min_period_minutes: u32,
    pub max_period_minutes: u32,
    pub min_break_minutes: u32,
    pub max_break_minutes: u32,
    pub max_name_len: usize,
}

impl Default for EditorLimits {
    fn default() -> Self {
        Self {
            min_periods_per_day: 1,
            max_periods_per_day: 12,
            min_period_minutes: 15,
            max_period_minutes: 120,
            min_break_minutes: 5,
            max_break_minutes: 120,
            max_name_len: 100,
        }
    }
}

/// Initial values for a new draft config and for newly added breaks.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EditorDefaults {
    pub name: String,
    pub start_time: ClockTime,
    pub period_duration_minutes: u32,
    pub periods_per_day: u32,
    pub working_days: Vec<Day>,
    pub break_name: String,
    pub break_duration_minutes: u32,
    /// Anchor of the first break added to a draft without breaks.
    pub first_break_after: u32,
    /// Distance from the previous break's anchor when suggesting the next one.
    pub break_anchor_step: u32,
}

impl Default for EditorDefaults {
    fn default() -> Self {
        Self {
            name: "Default Schedule".to_string(),
            start_time: ClockTime::from_minutes(9 * 60),
            period_duration_minutes: 60,
            periods_per_day: 8,
            working_days: Day::ALL[..5].to_vec(),
            break_name: "Break".to_string(),
            break_duration_minutes: 15,
            first_break_after: 2,
            break_anchor_step: 2,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_today_day_from_date() {
        // 2025-01-06 is a Monday
        let options = GridOptions {
            today: NaiveDate::from_ymd_opt(2025, 1, 6),
            ..GridOptions::default()
        };
        assert_eq!(options.today_day(), Some(Day::Monday));
        assert_eq!(GridOptions::default().today_day(), None);
    }

    #[test]
    fn test_day_label_compact() {
        let options = GridOptions {
            compact: true,
            ..GridOptions::default()
        };
        assert_eq!(options.day_label(Day::Thursday), "Thu");
        assert_eq!(GridOptions::default().day_label(Day::Thursday), "Thursday");
    }

    #[test]
    fn test_editor_defaults_weekdays() {
        let defaults = EditorDefaults::default();
        assert_eq!(defaults.working_days.first(), Some(&Day::Monday));
        assert_eq!(defaults.working_days.last(), Some(&Day::Friday));
        assert_eq!(defaults.start_time.format_24h(), "09:00");
    }
}
