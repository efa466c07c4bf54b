//! Grid projection: timetable entries placed onto a column plan per working day.
//!
//! The projector is a pure view. It never resolves conflicts: for each
//! `(day, period)` the first matching entry in input order wins, later ones
//! are reported as shadowed. Entries that match no row or period column
//! (stale data from an edited config) are reported as dropped.

use rustc_hash::FxHashMap;
use std::collections::hash_map::Entry;

use crate::columns::ColumnPlan;
use crate::config::GridOptions;
use crate::models::{Day, TimetableEntry};
use crate::time::ClockTime;
use crate::{log_debug, log_detail, log_summary};

/// One grid cell.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Cell {
    Occupied(TimetableEntry),
    Empty,
}

impl Cell {
    pub fn entry(&self) -> Option<&TimetableEntry> {
        match self {
            Cell::Occupied(entry) => Some(entry),
            Cell::Empty => None,
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, Cell::Empty)
    }
}

/// Display strings for an occupied cell.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CellText {
    pub course: String,
    /// Empty in compact mode.
    pub faculty: String,
    pub room: String,
}

impl CellText {
    pub fn for_entry(entry: &TimetableEntry, options: &GridOptions) -> Self {
        let course = non_empty(entry.course_name.as_deref())
            .unwrap_or(options.placeholder.as_str())
            .to_string();
        let faculty = if options.compact {
            String::new()
        } else {
            non_empty(entry.faculty_name.as_deref())
                .unwrap_or_default()
                .to_string()
        };
        let room = non_empty(entry.room_name.as_deref())
            .unwrap_or_default()
            .to_string();
        Self {
            course,
            faculty,
            room,
        }
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|s| !s.trim().is_empty())
}

/// One working-day row of the grid.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GridRow {
    pub day: Day,
    pub label: &'static str,
    /// Presentation only; has no effect on times.
    pub is_today: bool,
    /// One cell per plan column. Break columns are always empty.
    pub cells: Vec<Cell>,
}

/// A day-by-column matrix ready for rendering.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Grid {
    plan: ColumnPlan,
    rows: Vec<GridRow>,
    dropped: Vec<TimetableEntry>,
    shadowed: Vec<TimetableEntry>,
}

impl Grid {
    pub fn plan(&self) -> &ColumnPlan {
        &self.plan
    }

    pub fn rows(&self) -> &[GridRow] {
        &self.rows
    }

    /// Entries that matched no row or period column.
    pub fn dropped(&self) -> &[TimetableEntry] {
        &self.dropped
    }

    /// Entries hidden behind an earlier entry at the same `(day, period)`.
    pub fn shadowed(&self) -> &[TimetableEntry] {
        &self.shadowed
    }

    pub fn row(&self, day: Day) -> Option<&GridRow> {
        self.rows.iter().find(|r| r.day == day)
    }

    /// The cell at `(day, period)`, if both exist in the grid.
    pub fn cell(&self, day: Day, period: u32) -> Option<&Cell> {
        let col = self.plan.position_of_period(period)?;
        self.row(day).map(|row| &row.cells[col])
    }

    pub fn occupied_count(&self) -> usize {
        self.rows
            .iter()
            .flat_map(|r| r.cells.iter())
            .filter(|c| !c.is_empty())
            .count()
    }
}

/// Place entries onto a column plan, one row per working day.
///
/// # Arguments
/// * `plan` - Column plan built from the schedule config
/// * `working_days` - Row order; repeated days are rendered once
/// * `entries` - Finished entries from the generation backend
/// * `options` - Presentation options (labels, highlight, verbosity)
///
/// # Returns
/// * A grid with `working_days.len()` rows of `plan.len()` cells. Never fails;
///   stale entries end up in [`Grid::dropped`].
pub fn project(
    plan: &ColumnPlan,
    working_days: &[Day],
    entries: &[TimetableEntry],
    options: &GridOptions,
) -> Grid {
    let verbosity = options.verbosity;

    let mut days: Vec<Day> = Vec::with_capacity(working_days.len());
    for &day in working_days {
        if !days.contains(&day) {
            days.push(day);
        }
    }

    let row_of: FxHashMap<Day, usize> = days.iter().enumerate().map(|(i, &d)| (d, i)).collect();
    let column_of: FxHashMap<u32, usize> = plan
        .columns()
        .iter()
        .enumerate()
        .filter_map(|(i, c)| c.period_index().map(|p| (p, i)))
        .collect();
    log_debug!(
        verbosity,
        "Indexed {} rows and {} period columns",
        row_of.len(),
        column_of.len()
    );

    let mut placed: FxHashMap<(usize, usize), usize> = FxHashMap::default();
    let mut dropped = Vec::new();
    let mut shadowed = Vec::new();

    for (idx, entry) in entries.iter().enumerate() {
        let row = entry.parsed_day().and_then(|d| row_of.get(&d).copied());
        let col = entry
            .period_index()
            .and_then(|p| column_of.get(&p).copied());

        let Some(key) = row.zip(col) else {
            log_summary!(
                verbosity,
                "Dropping stale entry: day={:?} period={}",
                entry.day,
                entry.period
            );
            dropped.push(entry.clone());
            continue;
        };

        match placed.entry(key) {
            Entry::Vacant(slot) => {
                log_detail!(
                    verbosity,
                    "Placed entry {} at {} P{}",
                    idx,
                    entry.day,
                    entry.period
                );
                slot.insert(idx);
            }
            Entry::Occupied(first) => {
                log_summary!(
                    verbosity,
                    "Duplicate entry at {} P{}: keeping entry {}, hiding entry {}",
                    entry.day,
                    entry.period,
                    first.get(),
                    idx
                );
                shadowed.push(entry.clone());
            }
        }
    }

    let today = options.today_day();
    let rows = days
        .iter()
        .enumerate()
        .map(|(row, &day)| GridRow {
            day,
            label: options.day_label(day),
            is_today: today == Some(day),
            cells: (0..plan.len())
                .map(|col| match placed.get(&(row, col)) {
                    Some(&i) => Cell::Occupied(entries[i].clone()),
                    None => Cell::Empty,
                })
                .collect(),
        })
        .collect();

    Grid {
        plan: plan.clone(),
        rows,
        dropped,
        shadowed,
    }
}

/// An entry for one day with its resolved wall-clock times.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ScheduledClass {
    pub entry: TimetableEntry,
    pub start: ClockTime,
    pub end: ClockTime,
}

/// The "today" view: entries on `day` ordered by period, with times.
///
/// Uses the same first-wins rule as [`project`] for duplicate periods and
/// skips entries whose period is not in the plan.
pub fn todays_classes(plan: &ColumnPlan, entries: &[TimetableEntry], day: Day) -> Vec<ScheduledClass> {
    let mut by_period: FxHashMap<u32, &TimetableEntry> = FxHashMap::default();
    for entry in entries.iter().filter(|e| e.parsed_day() == Some(day)) {
        if let Some(period) = entry.period_index() {
            by_period.entry(period).or_insert(entry);
        }
    }

    let mut classes: Vec<(u32, ScheduledClass)> = by_period
        .into_iter()
        .filter_map(|(period, entry)| {
            plan.period(period).map(|col| {
                (
                    period,
                    ScheduledClass {
                        entry: entry.clone(),
                        start: col.start(),
                        end: col.end(),
                    },
                )
            })
        })
        .collect();
    classes.sort_by_key(|(period, _)| *period);
    classes.into_iter().map(|(_, class)| class).collect()
}
