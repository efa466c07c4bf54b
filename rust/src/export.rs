//! Flat export of a projected grid: one row per occupied cell.

use serde::Serialize;

use crate::config::GridOptions;
use crate::grid::{CellText, Grid};

/// One exported row (Day, Period, Start, End, Course, Faculty, Room).
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ExportRow {
    pub day: String,
    pub period: u32,
    pub start: String,
    pub end: String,
    pub course: String,
    pub faculty: String,
    pub room: String,
}

/// Export occupied cells in grid order (row by row, left to right).
///
/// Times use the display form. Compact mode is ignored: exports always carry
/// full day names and faculty.
pub fn export_rows(grid: &Grid, options: &GridOptions) -> Vec<ExportRow> {
    let full = GridOptions {
        compact: false,
        ..options.clone()
    };
    let columns = grid.plan().columns();

    grid.rows()
        .iter()
        .flat_map(|row| {
            row.cells
                .iter()
                .zip(columns)
                .filter_map(|(cell, column)| Some((cell.entry()?, column.period_index()?, column)))
                .map(|(entry, period, column)| {
                    let text = CellText::for_entry(entry, &full);
                    ExportRow {
                        day: row.day.name().to_string(),
                        period,
                        start: column.start().format_12h(),
                        end: column.end().format_12h(),
                        course: text.course,
                        faculty: text.faculty,
                        room: text.room,
                    }
                })
                .collect::<Vec<_>>()
        })
        .collect()
}

/// Export rows as a JSON array.
pub fn export_json(grid: &Grid, options: &GridOptions) -> serde_json::Result<String> {
    serde_json::to_string(&export_rows(grid, options))
}
