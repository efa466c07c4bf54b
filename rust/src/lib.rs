//! Rust implementation of the timetable engine: period times, column plans and grid projection.
//!
//! This module resolves a schedule config into wall-clock periods and breaks,
//! and projects generated timetable entries onto a day-by-column grid.

// Allow clippy warning triggered by PyO3 macro expansion
#![allow(clippy::useless_conversion)]

use pyo3::exceptions::PyValueError;
use pyo3::prelude::*;

pub mod columns;
mod config;
pub mod editor;
pub mod export;
pub mod grid;
pub mod logging;
mod models;
pub mod resolver;
pub mod source;
pub mod time;
pub mod wire;

pub use columns::{Column, ColumnPlan};
pub use config::{EditorDefaults, EditorLimits, GridOptions, DEFAULT_PLACEHOLDER};
pub use editor::{ConfigError, DraftBreak, DraftConfig, Preview, PREVIEW_PERIOD_CEILING};
pub use export::{export_json, export_rows, ExportRow};
pub use grid::{project, Cell, CellText, Grid, GridRow, ScheduledClass};
pub use models::{BreakSlot, Day, ScheduleConfig, TimetableEntry};
pub use resolver::{resolve, resolve_all, BreakTime, PeriodTime, ResolvedSchedule, Slot};
pub use source::{
    load_timetable_grid, request_generation, select_config, ActorContext, InMemorySource,
    ScheduleSource, SourceError,
};
pub use time::{ClockTime, TimeParseError};
pub use wire::{GenerateRequest, GenerationOutcome, WireError};

fn value_error(e: impl std::fmt::Display) -> PyErr {
    PyValueError::new_err(e.to_string())
}

/// A displayable column (PyO3 wrapper).
#[pyclass(name = "Column")]
#[derive(Clone, Debug)]
pub struct PyColumn {
    #[pyo3(get)]
    pub is_break: bool,
    /// Period index, `None` for breaks
    #[pyo3(get)]
    pub period: Option<u32>,
    #[pyo3(get)]
    pub label: String,
    #[pyo3(get)]
    pub start: ClockTime,
    #[pyo3(get)]
    pub end: ClockTime,
    #[pyo3(get)]
    pub time_range: String,
}

impl From<&Column> for PyColumn {
    fn from(column: &Column) -> Self {
        Self {
            is_break: column.is_break(),
            period: column.period_index(),
            label: column.label(),
            start: column.start(),
            end: column.end(),
            time_range: column.time_range_label(),
        }
    }
}

#[pymethods]
impl PyColumn {
    fn __repr__(&self) -> String {
        format!("Column({}, {})", self.label, self.time_range)
    }
}

/// One grid cell with its display text (PyO3 wrapper).
#[pyclass(name = "GridCell")]
#[derive(Clone, Debug)]
pub struct PyGridCell {
    #[pyo3(get)]
    pub is_break: bool,
    #[pyo3(get)]
    pub entry: Option<TimetableEntry>,
    #[pyo3(get)]
    pub course: String,
    #[pyo3(get)]
    pub faculty: String,
    #[pyo3(get)]
    pub room: String,
}

#[pymethods]
impl PyGridCell {
    #[getter]
    fn occupied(&self) -> bool {
        self.entry.is_some()
    }

    fn __repr__(&self) -> String {
        if self.is_break {
            "GridCell(break)".to_string()
        } else if self.entry.is_some() {
            format!("GridCell({:?})", self.course)
        } else {
            "GridCell(empty)".to_string()
        }
    }
}

/// One working-day row of the grid (PyO3 wrapper).
#[pyclass(name = "GridRow")]
#[derive(Clone, Debug)]
pub struct PyGridRow {
    #[pyo3(get)]
    pub day: Day,
    #[pyo3(get)]
    pub label: String,
    #[pyo3(get)]
    pub is_today: bool,
    #[pyo3(get)]
    pub cells: Vec<PyGridCell>,
}

#[pymethods]
impl PyGridRow {
    fn __repr__(&self) -> String {
        format!("GridRow({}, cells={})", self.label, self.cells.len())
    }
}

/// A projected grid (PyO3 wrapper).
#[pyclass(name = "Grid")]
#[derive(Clone, Debug)]
pub struct PyGrid {
    #[pyo3(get)]
    pub columns: Vec<PyColumn>,
    #[pyo3(get)]
    pub rows: Vec<PyGridRow>,
    /// Entries matching no row or period column
    #[pyo3(get)]
    pub dropped: Vec<TimetableEntry>,
    /// Entries hidden behind an earlier entry at the same day and period
    #[pyo3(get)]
    pub shadowed: Vec<TimetableEntry>,
}

impl PyGrid {
    fn from_grid(grid: &Grid, options: &GridOptions) -> Self {
        let plan_columns = grid.plan().columns();
        let rows = grid
            .rows()
            .iter()
            .map(|row| PyGridRow {
                day: row.day,
                label: row.label.to_string(),
                is_today: row.is_today,
                cells: row
                    .cells
                    .iter()
                    .zip(plan_columns)
                    .map(|(cell, column)| {
                        let text = cell.entry().map(|e| CellText::for_entry(e, options));
                        PyGridCell {
                            is_break: column.is_break(),
                            entry: cell.entry().cloned(),
                            course: text.as_ref().map(|t| t.course.clone()).unwrap_or_default(),
                            faculty: text.as_ref().map(|t| t.faculty.clone()).unwrap_or_default(),
                            room: text.map(|t| t.room).unwrap_or_default(),
                        }
                    })
                    .collect(),
            })
            .collect();

        Self {
            columns: plan_columns.iter().map(PyColumn::from).collect(),
            rows,
            dropped: grid.dropped().to_vec(),
            shadowed: grid.shadowed().to_vec(),
        }
    }
}

#[pymethods]
impl PyGrid {
    fn __repr__(&self) -> String {
        format!(
            "Grid(rows={}, columns={}, dropped={}, shadowed={})",
            self.rows.len(),
            self.columns.len(),
            self.dropped.len(),
            self.shadowed.len()
        )
    }
}

/// Live preview of a draft config (PyO3 wrapper).
#[pyclass(name = "Preview")]
#[derive(Clone, Debug)]
pub struct PyPreview {
    #[pyo3(get)]
    pub columns: Vec<PyColumn>,
    #[pyo3(get)]
    pub working_days: Vec<Day>,
    #[pyo3(get)]
    pub day_end: Option<String>,
    /// The requested period count was cut to the preview ceiling
    #[pyo3(get)]
    pub truncated: bool,
}

#[pymethods]
impl PyPreview {
    fn __repr__(&self) -> String {
        format!(
            "Preview(columns={}, days={}, day_end={:?}, truncated={})",
            self.columns.len(),
            self.working_days.len(),
            self.day_end,
            self.truncated
        )
    }
}

/// Resolve every period and break of a config.
///
/// # Returns
/// * `(periods, breaks, day_end)` where periods are `(index, start, end)` and
///   breaks are `(slot, start, end)`, both in chronological order
#[pyfunction(name = "resolve_all")]
#[allow(clippy::type_complexity)]
fn py_resolve_all(
    config: &ScheduleConfig,
) -> (
    Vec<(u32, ClockTime, ClockTime)>,
    Vec<(BreakSlot, ClockTime, ClockTime)>,
    ClockTime,
) {
    let resolved = resolve_all(config);
    (
        resolved
            .periods
            .into_iter()
            .map(|p| (p.period, p.start, p.end))
            .collect(),
        resolved
            .breaks
            .into_iter()
            .map(|b| (b.slot, b.start, b.end))
            .collect(),
        resolved.day_end,
    )
}

/// Start and end of one period, or `None` when it is outside the config.
#[pyfunction(name = "resolve_period")]
fn py_resolve_period(config: &ScheduleConfig, period: u32) -> Option<(ClockTime, ClockTime)> {
    resolve(config, period).map(|p| (p.start, p.end))
}

#[pyfunction(name = "build_columns")]
fn py_build_columns(config: &ScheduleConfig) -> Vec<PyColumn> {
    columns::build_columns(config)
        .columns()
        .iter()
        .map(PyColumn::from)
        .collect()
}

/// Project timetable entries onto the grid of a config.
///
/// # Arguments
/// * `config` - Schedule config providing columns and working days
/// * `entries` - Generated timetable entries
/// * `options` - Presentation options (defaults if omitted)
///
/// # Returns
/// * Grid with one row per working day. Stale and duplicate entries are
///   reported in `dropped` and `shadowed`.
#[pyfunction(name = "project_grid")]
#[pyo3(signature = (config, entries, options=None))]
fn py_project_grid(
    config: &ScheduleConfig,
    entries: Vec<TimetableEntry>,
    options: Option<GridOptions>,
) -> PyGrid {
    let options = options.unwrap_or_default();
    let grid = project(
        &columns::build_columns(config),
        config.working_days(),
        &entries,
        &options,
    );
    PyGrid::from_grid(&grid, &options)
}

/// Entries on one day, ordered by period, as `(entry, start, end)`.
#[pyfunction(name = "todays_classes")]
fn py_todays_classes(
    config: &ScheduleConfig,
    entries: Vec<TimetableEntry>,
    day: Day,
) -> Vec<(TimetableEntry, ClockTime, ClockTime)> {
    grid::todays_classes(&columns::build_columns(config), &entries, day)
        .into_iter()
        .map(|c| (c.entry, c.start, c.end))
        .collect()
}

/// Export occupied cells as JSON rows (Day, Period, Start, End, Course, Faculty, Room).
#[pyfunction(name = "export_json")]
#[pyo3(signature = (config, entries, options=None))]
fn py_export_json(
    config: &ScheduleConfig,
    entries: Vec<TimetableEntry>,
    options: Option<GridOptions>,
) -> PyResult<String> {
    let options = options.unwrap_or_default();
    let grid = project(
        &columns::build_columns(config),
        config.working_days(),
        &entries,
        &options,
    );
    export_json(&grid, &options).map_err(value_error)
}

#[allow(clippy::too_many_arguments)]
fn draft_from_args(
    name: String,
    start_time: String,
    period_duration_minutes: i64,
    periods_per_day: i64,
    breaks: Vec<(i64, i64, String)>,
    working_days: Vec<String>,
) -> DraftConfig {
    DraftConfig {
        name,
        start_time,
        period_duration_minutes,
        periods_per_day,
        breaks: breaks
            .into_iter()
            .map(|(after_period, duration_minutes, name)| DraftBreak {
                after_period,
                duration_minutes,
                name,
            })
            .collect(),
        working_days,
        ..DraftConfig::default()
    }
}

/// Preview a draft config with the editor's lenient rules.
///
/// Breaks are `(after_period, duration_minutes, name)` tuples. Never raises.
#[pyfunction(name = "preview_draft")]
#[pyo3(signature = (name, start_time, period_duration_minutes, periods_per_day, breaks=Vec::new(), working_days=Vec::new()))]
fn py_preview_draft(
    name: String,
    start_time: String,
    period_duration_minutes: i64,
    periods_per_day: i64,
    breaks: Vec<(i64, i64, String)>,
    working_days: Vec<String>,
) -> PyPreview {
    let draft = draft_from_args(
        name,
        start_time,
        period_duration_minutes,
        periods_per_day,
        breaks,
        working_days,
    );
    let preview = editor::preview(&draft);
    PyPreview {
        columns: preview.plan.columns().iter().map(PyColumn::from).collect(),
        day_end: preview.day_end_label(),
        working_days: preview.working_days,
        truncated: preview.truncated,
    }
}

/// Validate a draft config before saving.
///
/// # Raises
/// * ValueError describing the first invalid field
#[pyfunction(name = "validate_draft")]
#[pyo3(signature = (name, start_time, period_duration_minutes, periods_per_day, breaks=Vec::new(), working_days=Vec::new()))]
fn py_validate_draft(
    name: String,
    start_time: String,
    period_duration_minutes: i64,
    periods_per_day: i64,
    breaks: Vec<(i64, i64, String)>,
    working_days: Vec<String>,
) -> PyResult<ScheduleConfig> {
    draft_from_args(
        name,
        start_time,
        period_duration_minutes,
        periods_per_day,
        breaks,
        working_days,
    )
    .validate(&EditorLimits::default())
    .map_err(value_error)
}

/// Format a time as `H:MM AM/PM`, or `HH:MM` when `use_24h` is set.
#[pyfunction(name = "format_time")]
#[pyo3(signature = (time, use_24h=false))]
fn py_format_time(time: ClockTime, use_24h: bool) -> String {
    if use_24h {
        time.format_24h()
    } else {
        time.format_12h()
    }
}

/// Parse `HH:MM`, `HH:MM:SS` or `H:MM AM/PM`.
#[pyfunction(name = "parse_time")]
fn py_parse_time(s: &str) -> PyResult<ClockTime> {
    ClockTime::parse_24h(s)
        .or_else(|_| ClockTime::parse_12h(s))
        .map_err(value_error)
}

/// Decode a schedule config from its JSON wire form.
///
/// # Raises
/// * ValueError if the JSON is malformed or a field is invalid
#[pyfunction(name = "decode_schedule_config")]
#[pyo3(signature = (json, verbosity=0))]
fn py_decode_schedule_config(json: &str, verbosity: u8) -> PyResult<ScheduleConfig> {
    wire::decode_schedule_config(json, verbosity).map_err(value_error)
}

#[pyfunction(name = "encode_schedule_config")]
fn py_encode_schedule_config(config: &ScheduleConfig) -> PyResult<String> {
    wire::encode_schedule_config(config).map_err(value_error)
}

/// Decode a JSON array of timetable entries.
#[pyfunction(name = "decode_entries")]
fn py_decode_entries(json: &str) -> PyResult<Vec<TimetableEntry>> {
    wire::decode_entries(json).map_err(value_error)
}

/// The timetable_engine Python module.
#[pymodule]
fn timetable_engine(m: &Bound<'_, PyModule>) -> PyResult<()> {
    // Core data types
    m.add_class::<ClockTime>()?;
    m.add_class::<Day>()?;
    m.add_class::<BreakSlot>()?;
    m.add_class::<ScheduleConfig>()?;
    m.add_class::<TimetableEntry>()?;

    // Result types
    m.add_class::<PyColumn>()?;
    m.add_class::<PyGridCell>()?;
    m.add_class::<PyGridRow>()?;
    m.add_class::<PyGrid>()?;
    m.add_class::<PyPreview>()?;

    // Config types
    m.add_class::<GridOptions>()?;

    // Algorithms
    m.add_function(wrap_pyfunction!(py_resolve_all, m)?)?;
    m.add_function(wrap_pyfunction!(py_resolve_period, m)?)?;
    m.add_function(wrap_pyfunction!(py_build_columns, m)?)?;
    m.add_function(wrap_pyfunction!(py_project_grid, m)?)?;
    m.add_function(wrap_pyfunction!(py_todays_classes, m)?)?;
    m.add_function(wrap_pyfunction!(py_export_json, m)?)?;
    m.add_function(wrap_pyfunction!(py_preview_draft, m)?)?;
    m.add_function(wrap_pyfunction!(py_validate_draft, m)?)?;

    // Boundary helpers
    m.add_function(wrap_pyfunction!(py_format_time, m)?)?;
    m.add_function(wrap_pyfunction!(py_parse_time, m)?)?;
    m.add_function(wrap_pyfunction!(py_decode_schedule_config, m)?)?;
    m.add_function(wrap_pyfunction!(py_encode_schedule_config, m)?)?;
    m.add_function(wrap_pyfunction!(py_decode_entries, m)?)?;

    Ok(())
}
