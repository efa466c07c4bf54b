//! Config editor support: draft state, live preview and save-time validation.
//!
//! A draft holds raw form values that may be incomplete or invalid while the
//! user types. [`preview`] never fails on a draft; [`DraftConfig::validate`]
//! is the strict gate before a config is persisted. Both build the preview
//! from the same resolver the grid uses.

use rustc_hash::FxHashSet;
use thiserror::Error;

use crate::columns::{build_columns, ColumnPlan};
use crate::config::{EditorDefaults, EditorLimits};
use crate::models::{BreakSlot, Day, ScheduleConfig};
use crate::time::{ClockTime, TimeParseError};

/// Structural problems with a schedule config.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Schedule name must not be empty")]
    EmptyName,
    #[error("Schedule name must be at most {max} characters")]
    NameTooLong { max: usize },
    #[error(transparent)]
    InvalidStartTime(#[from] TimeParseError),
    #[error("{field} must be positive")]
    NotPositive { field: &'static str },
    #[error("Period duration must be in {min}..={max} minutes, got {value}")]
    PeriodDurationOutOfRange { value: i64, min: u32, max: u32 },
    #[error("Periods per day must be in {min}..={max}, got {value}")]
    PeriodsPerDayOutOfRange { value: i64, min: u32, max: u32 },
    #[error("Break {name:?} must follow a period in 1..={periods_per_day}, got {after_period}")]
    BreakAnchorOutOfRange {
        name: String,
        after_period: i64,
        periods_per_day: u32,
    },
    #[error("Break {name:?} duration must be in {min}..={max} minutes, got {value}")]
    BreakDurationOutOfRange {
        name: String,
        value: i64,
        min: u32,
        max: u32,
    },
    #[error("More than one break after period {0}")]
    DuplicateBreakAnchor(u32),
    #[error("Unknown working day: {0:?}")]
    UnknownDay(String),
    #[error("At least one working day is required")]
    NoWorkingDays,
}

/// A break row as typed into the editor.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DraftBreak {
    pub after_period: i64,
    pub duration_minutes: i64,
    pub name: String,
}

impl From<&BreakSlot> for DraftBreak {
    fn from(slot: &BreakSlot) -> Self {
        Self {
            after_period: i64::from(slot.after_period),
            duration_minutes: i64::from(slot.duration_minutes),
            name: slot.name.clone(),
        }
    }
}

/// Raw editor form state. Any field may be invalid mid-edit.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DraftConfig {
    pub id: Option<String>,
    pub semester_id: Option<String>,
    pub name: String,
    /// `HH:MM` as typed.
    pub start_time: String,
    pub period_duration_minutes: i64,
    pub periods_per_day: i64,
    pub breaks: Vec<DraftBreak>,
    pub working_days: Vec<String>,
}

impl Default for DraftConfig {
    fn default() -> Self {
        Self::from_defaults(&EditorDefaults::default())
    }
}

impl DraftConfig {
    pub fn from_defaults(defaults: &EditorDefaults) -> Self {
        Self {
            id: None,
            semester_id: None,
            name: defaults.name.clone(),
            start_time: defaults.start_time.format_24h(),
            period_duration_minutes: i64::from(defaults.period_duration_minutes),
            periods_per_day: i64::from(defaults.periods_per_day),
            breaks: Vec::new(),
            working_days: day_names(&defaults.working_days),
        }
    }

    /// Start editing an existing config. A config without working days is
    /// opened with the default working days selected.
    pub fn from_config(config: &ScheduleConfig, defaults: &EditorDefaults) -> Self {
        let days = if config.working_days().is_empty() {
            &defaults.working_days[..]
        } else {
            config.working_days()
        };
        Self {
            id: config.id.clone(),
            semester_id: config.semester_id.clone(),
            name: config.name.clone(),
            start_time: config.start_time.format_24h(),
            period_duration_minutes: i64::from(config.period_duration_minutes),
            periods_per_day: i64::from(config.periods_per_day),
            breaks: config.breaks().iter().map(DraftBreak::from).collect(),
            working_days: day_names(days),
        }
    }

    /// Anchor for the next added break.
    ///
    /// Previous anchor plus the configured step (the first break goes after
    /// `first_break_after`), clamped into `1..=periods_per_day`. If that
    /// anchor is taken, the nearest free anchor above, then below, is used.
    /// `None` when the draft has no periods or every anchor already has a break.
    pub fn suggest_break_anchor(&self, defaults: &EditorDefaults) -> Option<u32> {
        let periods = u32::try_from(self.periods_per_day).ok().filter(|&p| p > 0)?;
        let taken: FxHashSet<i64> = self.breaks.iter().map(|b| b.after_period).collect();

        let wanted = match self.breaks.last() {
            Some(last) => last
                .after_period
                .saturating_add(i64::from(defaults.break_anchor_step)),
            None => i64::from(defaults.first_break_after),
        }
        .clamp(1, i64::from(periods)) as u32;

        (wanted..=periods)
            .chain((1..wanted).rev())
            .find(|&anchor| !taken.contains(&i64::from(anchor)))
    }

    /// Append a break at the suggested anchor. Returns false when no anchor is free.
    pub fn add_break(&mut self, defaults: &EditorDefaults) -> bool {
        match self.suggest_break_anchor(defaults) {
            Some(anchor) => {
                self.breaks.push(DraftBreak {
                    after_period: i64::from(anchor),
                    duration_minutes: i64::from(defaults.break_duration_minutes),
                    name: defaults.break_name.clone(),
                });
                true
            }
            None => false,
        }
    }

    pub fn remove_break(&mut self, index: usize) -> Option<DraftBreak> {
        (index < self.breaks.len()).then(|| self.breaks.remove(index))
    }

    pub fn update_break(&mut self, index: usize, updated: DraftBreak) -> bool {
        match self.breaks.get_mut(index) {
            Some(existing) => {
                *existing = updated;
                true
            }
            None => false,
        }
    }

    /// Select or deselect a working day. Newly selected days go last.
    pub fn toggle_day(&mut self, day: Day) {
        let before = self.working_days.len();
        self.working_days.retain(|name| Day::parse(name) != Some(day));
        if self.working_days.len() == before {
            self.working_days.push(day.name().to_string());
        }
    }

    /// Best-effort config for previewing. Never fails.
    ///
    /// An unparseable start time or a non-positive period duration or count
    /// yields zero periods. The period count is kept as typed up to
    /// [`PREVIEW_PERIOD_CEILING`]. Breaks with a non-positive anchor or
    /// duration are skipped, and duplicate anchors collapse onto the last one,
    /// as in [`ScheduleConfig::set_breaks`].
    pub fn lenient_config(&self) -> ScheduleConfig {
        let start = ClockTime::parse_24h(&self.start_time).ok();
        let duration = positive_u32(self.period_duration_minutes);
        let periods = match (start, duration) {
            (Some(_), Some(_)) => positive_u32(self.periods_per_day)
                .map_or(0, |p| p.min(PREVIEW_PERIOD_CEILING)),
            _ => 0,
        };

        let breaks = self.breaks.iter().filter_map(|b| {
            Some(BreakSlot::new(
                positive_u32(b.after_period)?,
                positive_u32(b.duration_minutes)?,
                b.name.clone(),
            ))
        });
        let days = self.working_days.iter().filter_map(|name| Day::parse(name));

        let mut config = ScheduleConfig::new(
            self.name.clone(),
            start.unwrap_or(ClockTime::MIDNIGHT),
            duration.unwrap_or(0),
            periods,
        )
        .with_breaks(breaks)
        .with_working_days(days);
        config.id = self.id.clone();
        config.semester_id = self.semester_id.clone();
        config
    }

    /// Strict validation before persisting. Returns the first problem found.
    pub fn validate(&self, limits: &EditorLimits) -> Result<ScheduleConfig, ConfigError> {
        let name = self.name.trim();
        if name.is_empty() {
            return Err(ConfigError::EmptyName);
        }
        if name.chars().count() > limits.max_name_len {
            return Err(ConfigError::NameTooLong {
                max: limits.max_name_len,
            });
        }

        let start_time = ClockTime::parse_24h(&self.start_time)?;
        let period_duration = in_range(
            self.period_duration_minutes,
            limits.min_period_minutes,
            limits.max_period_minutes,
        )
        .ok_or(ConfigError::PeriodDurationOutOfRange {
            value: self.period_duration_minutes,
            min: limits.min_period_minutes,
            max: limits.max_period_minutes,
        })?;
        let periods = in_range(
            self.periods_per_day,
            limits.min_periods_per_day,
            limits.max_periods_per_day,
        )
        .ok_or(ConfigError::PeriodsPerDayOutOfRange {
            value: self.periods_per_day,
            min: limits.min_periods_per_day,
            max: limits.max_periods_per_day,
        })?;

        let mut days = Vec::with_capacity(self.working_days.len());
        for raw in &self.working_days {
            days.push(Day::parse(raw).ok_or_else(|| ConfigError::UnknownDay(raw.clone()))?);
        }
        if days.is_empty() {
            return Err(ConfigError::NoWorkingDays);
        }

        let mut breaks = Vec::with_capacity(self.breaks.len());
        let mut seen: FxHashSet<u32> = FxHashSet::default();
        for b in &self.breaks {
            let anchor = in_range(b.after_period, 1, periods).ok_or_else(|| {
                ConfigError::BreakAnchorOutOfRange {
                    name: b.name.clone(),
                    after_period: b.after_period,
                    periods_per_day: periods,
                }
            })?;
            let duration = in_range(
                b.duration_minutes,
                limits.min_break_minutes,
                limits.max_break_minutes,
            )
            .ok_or_else(|| ConfigError::BreakDurationOutOfRange {
                name: b.name.clone(),
                value: b.duration_minutes,
                min: limits.min_break_minutes,
                max: limits.max_break_minutes,
            })?;
            if !seen.insert(anchor) {
                return Err(ConfigError::DuplicateBreakAnchor(anchor));
            }
            breaks.push(BreakSlot::new(anchor, duration, b.name.trim()));
        }

        let mut config = ScheduleConfig::new(name, start_time, period_duration, periods)
            .with_breaks(breaks)
            .with_working_days(days);
        config.id = self.id.clone();
        config.semester_id = self.semester_id.clone();
        Ok(config)
    }
}

fn day_names(days: &[Day]) -> Vec<String> {
    days.iter().map(|d| d.name().to_string()).collect()
}

fn positive_u32(value: i64) -> Option<u32> {
    u32::try_from(value).ok().filter(|&v| v > 0)
}

fn in_range(value: i64, min: u32, max: u32) -> Option<u32> {
    u32::try_from(value)
        .ok()
        .filter(|v| (min..=max).contains(v))
}

/// Upper bound on previewed periods, far above any real day.
pub const PREVIEW_PERIOD_CEILING: u32 = 1_000;

/// Live preview of a draft.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Preview {
    pub plan: ColumnPlan,
    pub working_days: Vec<Day>,
    /// The typed period count exceeded [`PREVIEW_PERIOD_CEILING`].
    pub truncated: bool,
}

impl Preview {
    /// `H:MM AM/PM` end of the day, or `None` when there is nothing to show.
    pub fn day_end_label(&self) -> Option<String> {
        (!self.plan.is_empty()).then(|| self.plan.day_end().format_12h())
    }
}

/// Render a draft the same way the grid would render the saved config.
///
/// Editor limits are not applied here; they only gate [`DraftConfig::validate`].
pub fn preview(draft: &DraftConfig) -> Preview {
    let config = draft.lenient_config();
    Preview {
        plan: build_columns(&config),
        working_days: config.working_days().to_vec(),
        truncated: draft.periods_per_day > i64::from(PREVIEW_PERIOD_CEILING),
    }
}
