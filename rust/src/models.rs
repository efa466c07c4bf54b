//! Core data types: schedule configs, breaks, working days and timetable entries.

use chrono::Weekday;
use pyo3::prelude::*;
use serde::{Deserialize, Serialize};

use crate::time::ClockTime;

/// A day of the week. Declaration order is Monday first.
#[pyclass(eq, eq_int)]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String")]
pub enum Day {
    Monday,
    Tuesday,
    Wednesday,
    Thursday,
    Friday,
    Saturday,
    Sunday,
}

impl Day {
    pub const ALL: [Day; 7] = [
        Day::Monday,
        Day::Tuesday,
        Day::Wednesday,
        Day::Thursday,
        Day::Friday,
        Day::Saturday,
        Day::Sunday,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Day::Monday => "Monday",
            Day::Tuesday => "Tuesday",
            Day::Wednesday => "Wednesday",
            Day::Thursday => "Thursday",
            Day::Friday => "Friday",
            Day::Saturday => "Saturday",
            Day::Sunday => "Sunday",
        }
    }

    /// Three-letter label used by compact grids.
    pub fn short_name(self) -> &'static str {
        &self.name()[..3]
    }

    /// The day whose full name is exactly `s` (`"Monday"`, not `"mon"`).
    pub fn from_name(s: &str) -> Option<Day> {
        Day::ALL.into_iter().find(|d| d.name() == s)
    }

    /// Parse a day name, full or abbreviated, case-insensitive.
    pub fn parse(s: &str) -> Option<Day> {
        s.trim().parse::<Weekday>().ok().map(Day::from)
    }

    pub fn weekday(self) -> Weekday {
        match self {
            Day::Monday => Weekday::Mon,
            Day::Tuesday => Weekday::Tue,
            Day::Wednesday => Weekday::Wed,
            Day::Thursday => Weekday::Thu,
            Day::Friday => Weekday::Fri,
            Day::Saturday => Weekday::Sat,
            Day::Sunday => Weekday::Sun,
        }
    }
}

impl From<Weekday> for Day {
    fn from(weekday: Weekday) -> Self {
        Day::ALL[weekday.num_days_from_monday() as usize]
    }
}

impl TryFrom<String> for Day {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Day::parse(&value).ok_or_else(|| format!("unknown day name: {:?}", value))
    }
}

impl std::fmt::Display for Day {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// A named pause inserted immediately after a teaching period.
#[pyclass]
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BreakSlot {
    /// The break starts when this period (1-based) ends.
    #[pyo3(get, set)]
    pub after_period: u32,
    #[pyo3(get, set)]
    pub duration_minutes: u32,
    #[pyo3(get, set)]
    pub name: String,
}

impl BreakSlot {
    pub fn new(after_period: u32, duration_minutes: u32, name: impl Into<String>) -> Self {
        Self {
            after_period,
            duration_minutes,
            name: name.into(),
        }
    }
}

#[pymethods]
impl BreakSlot {
    #[new]
    #[pyo3(signature = (after_period, duration_minutes, name="Break".to_string()))]
    fn py_new(after_period: u32, duration_minutes: u32, name: String) -> Self {
        Self::new(after_period, duration_minutes, name)
    }

    fn __repr__(&self) -> String {
        format!(
            "BreakSlot(after_period={}, duration_minutes={}, name={:?})",
            self.after_period, self.duration_minutes, self.name
        )
    }
}

/// The declared timing parameters for one schedule, global or per-semester.
///
/// Breaks are unique by `after_period` and working days are unique; both
/// collections are only reachable through methods that keep that true.
#[pyclass]
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ScheduleConfig {
    /// Absent for an unsaved draft.
    #[pyo3(get, set)]
    pub id: Option<String>,
    /// Absent for the global default config.
    #[pyo3(get, set)]
    pub semester_id: Option<String>,
    #[pyo3(get, set)]
    pub name: String,
    /// Start of period 1.
    #[pyo3(get, set)]
    pub start_time: ClockTime,
    #[pyo3(get, set)]
    pub period_duration_minutes: u32,
    #[pyo3(get, set)]
    pub periods_per_day: u32,
    #[pyo3(get)]
    breaks: Vec<BreakSlot>,
    /// Insertion order is display order.
    #[pyo3(get)]
    working_days: Vec<Day>,
}

impl ScheduleConfig {
    pub fn new(
        name: impl Into<String>,
        start_time: ClockTime,
        period_duration_minutes: u32,
        periods_per_day: u32,
    ) -> Self {
        Self {
            id: None,
            semester_id: None,
            name: name.into(),
            start_time,
            period_duration_minutes,
            periods_per_day,
            breaks: Vec::new(),
            working_days: Vec::new(),
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn with_semester(mut self, semester_id: impl Into<String>) -> Self {
        self.semester_id = Some(semester_id.into());
        self
    }

    pub fn with_breaks(mut self, breaks: impl IntoIterator<Item = BreakSlot>) -> Self {
        self.set_breaks(breaks);
        self
    }

    pub fn with_working_days(mut self, days: impl IntoIterator<Item = Day>) -> Self {
        self.set_working_days(days);
        self
    }

    pub fn breaks(&self) -> &[BreakSlot] {
        &self.breaks
    }

    pub fn working_days(&self) -> &[Day] {
        &self.working_days
    }

    /// The break anchored after `period`, if any.
    pub fn break_after(&self, period: u32) -> Option<&BreakSlot> {
        self.breaks.iter().find(|b| b.after_period == period)
    }

    /// Insert a break. A break already anchored at the same period is
    /// replaced in place and returned (last write wins).
    pub fn upsert_break(&mut self, slot: BreakSlot) -> Option<BreakSlot> {
        match self
            .breaks
            .iter_mut()
            .find(|b| b.after_period == slot.after_period)
        {
            Some(existing) => Some(std::mem::replace(existing, slot)),
            None => {
                self.breaks.push(slot);
                None
            }
        }
    }

    pub fn remove_break(&mut self, after_period: u32) -> Option<BreakSlot> {
        let idx = self
            .breaks
            .iter()
            .position(|b| b.after_period == after_period)?;
        Some(self.breaks.remove(idx))
    }

    /// Replace all breaks. Returns how many inputs were collapsed onto an
    /// anchor that appeared earlier in the list.
    pub fn set_breaks(&mut self, breaks: impl IntoIterator<Item = BreakSlot>) -> usize {
        self.breaks.clear();
        breaks
            .into_iter()
            .filter_map(|slot| self.upsert_break(slot))
            .count()
    }

    /// Replace the working days, keeping the first occurrence of each day.
    pub fn set_working_days(&mut self, days: impl IntoIterator<Item = Day>) {
        self.working_days.clear();
        for day in days {
            if !self.working_days.contains(&day) {
                self.working_days.push(day);
            }
        }
    }

    /// Whether timetable generation can be attempted with this config.
    pub fn is_generation_ready(&self) -> bool {
        !self.working_days.is_empty() && self.periods_per_day > 0
    }

    /// True for the default config that applies when no semester-specific one exists.
    pub fn is_global(&self) -> bool {
        self.semester_id.is_none()
    }
}

#[pymethods]
impl ScheduleConfig {
    #[new]
    #[pyo3(signature = (
        name,
        start_time,
        period_duration_minutes,
        periods_per_day,
        breaks=Vec::new(),
        working_days=Vec::new(),
        id=None,
        semester_id=None
    ))]
    #[allow(clippy::too_many_arguments)]
    fn py_new(
        name: String,
        start_time: ClockTime,
        period_duration_minutes: u32,
        periods_per_day: u32,
        breaks: Vec<BreakSlot>,
        working_days: Vec<Day>,
        id: Option<String>,
        semester_id: Option<String>,
    ) -> Self {
        let mut config = Self::new(name, start_time, period_duration_minutes, periods_per_day)
            .with_breaks(breaks)
            .with_working_days(working_days);
        config.id = id;
        config.semester_id = semester_id;
        config
    }

    #[pyo3(name = "upsert_break")]
    fn py_upsert_break(&mut self, slot: BreakSlot) -> Option<BreakSlot> {
        self.upsert_break(slot)
    }

    #[pyo3(name = "remove_break")]
    fn py_remove_break(&mut self, after_period: u32) -> Option<BreakSlot> {
        self.remove_break(after_period)
    }

    #[pyo3(name = "set_breaks")]
    fn py_set_breaks(&mut self, breaks: Vec<BreakSlot>) -> usize {
        self.set_breaks(breaks)
    }

    #[pyo3(name = "set_working_days")]
    fn py_set_working_days(&mut self, days: Vec<Day>) {
        self.set_working_days(days)
    }

    #[pyo3(name = "is_generation_ready")]
    fn py_is_generation_ready(&self) -> bool {
        self.is_generation_ready()
    }

    fn __repr__(&self) -> String {
        format!(
            "ScheduleConfig(name={:?}, start={}, period_minutes={}, periods={}, breaks={}, days={})",
            self.name,
            self.start_time.format_24h(),
            self.period_duration_minutes,
            self.periods_per_day,
            self.breaks.len(),
            self.working_days.len()
        )
    }
}

/// One generated assignment of a course/faculty/room to a day and period.
///
/// Produced by the generation backend; the engine only reads these. `day` is
/// kept as received so that stale or unknown day names can be detected and
/// dropped at projection time.
#[pyclass]
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimetableEntry {
    #[pyo3(get, set)]
    pub entry_id: Option<String>,
    #[pyo3(get, set)]
    pub day: String,
    #[pyo3(get, set)]
    pub period: i32,
    #[pyo3(get, set)]
    pub course_id: Option<String>,
    #[pyo3(get, set)]
    pub course_name: Option<String>,
    #[pyo3(get, set)]
    pub faculty_id: Option<String>,
    #[pyo3(get, set)]
    pub faculty_name: Option<String>,
    #[pyo3(get, set)]
    pub room_id: Option<String>,
    #[pyo3(get, set)]
    pub room_name: Option<String>,
    #[pyo3(get, set)]
    pub batch_id: Option<String>,
}

impl TimetableEntry {
    pub fn new(day: impl Into<String>, period: i32) -> Self {
        Self {
            day: day.into(),
            period,
            ..Self::default()
        }
    }

    pub fn with_names(
        mut self,
        course_name: Option<&str>,
        faculty_name: Option<&str>,
        room_name: Option<&str>,
    ) -> Self {
        self.course_name = course_name.map(str::to_string);
        self.faculty_name = faculty_name.map(str::to_string);
        self.room_name = room_name.map(str::to_string);
        self
    }

    /// The entry's day, if `day` is exactly a full day name.
    ///
    /// Entries are placed by exact name equality, so `"mon"` or `"MONDAY"`
    /// match no row.
    pub fn parsed_day(&self) -> Option<Day> {
        Day::from_name(&self.day)
    }

    /// The entry's period as an index, if it is a plausible 1-based period.
    pub fn period_index(&self) -> Option<u32> {
        u32::try_from(self.period).ok().filter(|&p| p > 0)
    }
}

#[pymethods]
impl TimetableEntry {
    #[new]
    #[pyo3(signature = (day, period, course_name=None, faculty_name=None, room_name=None))]
    fn py_new(
        day: String,
        period: i32,
        course_name: Option<String>,
        faculty_name: Option<String>,
        room_name: Option<String>,
    ) -> Self {
        Self {
            course_name,
            faculty_name,
            room_name,
            ..Self::new(day, period)
        }
    }

    fn __repr__(&self) -> String {
        format!(
            "TimetableEntry(day={:?}, period={}, course={:?})",
            self.day, self.period, self.course_name
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base() -> ScheduleConfig {
        ScheduleConfig::new("Default Schedule", ClockTime::from_hm(9, 0).unwrap(), 60, 8)
    }

    #[test]
    fn test_day_parse_variants() {
        assert_eq!(Day::parse("Monday"), Some(Day::Monday));
        assert_eq!(Day::parse(" tue "), Some(Day::Tuesday));
        assert_eq!(Day::parse("SUNDAY"), Some(Day::Sunday));
        assert_eq!(Day::parse("Funday"), None);
        assert_eq!(Day::Wednesday.short_name(), "Wed");
    }

    #[test]
    fn test_entry_day_requires_exact_name() {
        assert_eq!(TimetableEntry::new("Friday", 1).parsed_day(), Some(Day::Friday));
        assert_eq!(TimetableEntry::new("fri", 1).parsed_day(), None);
        assert_eq!(TimetableEntry::new("FRIDAY", 1).parsed_day(), None);
        assert_eq!(TimetableEntry::new(" Friday", 1).parsed_day(), None);
    }

    #[test]
    fn test_day_weekday_roundtrip() {
        for day in Day::ALL {
            assert_eq!(Day::from(day.weekday()), day);
        }
    }

    #[test]
    fn test_upsert_break_replaces_same_anchor() {
        let mut config = base();
        assert!(config.upsert_break(BreakSlot::new(2, 15, "Tea")).is_none());
        let replaced = config.upsert_break(BreakSlot::new(2, 45, "Lunch"));

        assert_eq!(replaced, Some(BreakSlot::new(2, 15, "Tea")));
        assert_eq!(config.breaks().len(), 1);
        assert_eq!(config.break_after(2).unwrap().name, "Lunch");
    }

    #[test]
    fn test_set_breaks_counts_collapsed() {
        let mut config = base();
        let collapsed = config.set_breaks(vec![
            BreakSlot::new(2, 15, "Tea"),
            BreakSlot::new(4, 45, "Lunch"),
            BreakSlot::new(2, 10, "Short"),
        ]);

        assert_eq!(collapsed, 1);
        assert_eq!(config.breaks().len(), 2);
        assert_eq!(config.break_after(2).unwrap().duration_minutes, 10);
    }

    #[test]
    fn test_remove_break() {
        let mut config = base().with_breaks(vec![BreakSlot::new(3, 30, "Lunch")]);
        assert!(config.remove_break(5).is_none());
        assert_eq!(config.remove_break(3).unwrap().name, "Lunch");
        assert!(config.breaks().is_empty());
    }

    #[test]
    fn test_working_days_dedupe_keeps_order() {
        let config = base().with_working_days(vec![
            Day::Wednesday,
            Day::Monday,
            Day::Wednesday,
            Day::Friday,
        ]);
        assert_eq!(
            config.working_days(),
            &[Day::Wednesday, Day::Monday, Day::Friday]
        );
    }

    #[test]
    fn test_generation_ready() {
        assert!(!base().is_generation_ready());
        assert!(base().with_working_days(vec![Day::Monday]).is_generation_ready());

        let mut empty = base().with_working_days(vec![Day::Monday]);
        empty.periods_per_day = 0;
        assert!(!empty.is_generation_ready());
    }

    #[test]
    fn test_entry_period_index() {
        assert_eq!(TimetableEntry::new("Monday", 3).period_index(), Some(3));
        assert_eq!(TimetableEntry::new("Monday", 0).period_index(), None);
        assert_eq!(TimetableEntry::new("Monday", -2).period_index(), None);
    }
}
