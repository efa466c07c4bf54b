//! Column plan: the ordered period and break columns of a schedule.
//!
//! Both the grid and the editor preview render from a [`ColumnPlan`], so
//! they cannot disagree about times for the same config.

use crate::models::{BreakSlot, ScheduleConfig};
use crate::resolver::{sweep, Slot};
use crate::time::ClockTime;

/// One displayable column.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Column {
    Period {
        index: u32,
        start: ClockTime,
        end: ClockTime,
    },
    Break {
        slot: BreakSlot,
        start: ClockTime,
        end: ClockTime,
    },
}

impl Column {
    pub fn start(&self) -> ClockTime {
        match self {
            Column::Period { start, .. } | Column::Break { start, .. } => *start,
        }
    }

    pub fn end(&self) -> ClockTime {
        match self {
            Column::Period { end, .. } | Column::Break { end, .. } => *end,
        }
    }

    /// The period index for period columns, `None` for breaks.
    pub fn period_index(&self) -> Option<u32> {
        match self {
            Column::Period { index, .. } => Some(*index),
            Column::Break { .. } => None,
        }
    }

    pub fn is_break(&self) -> bool {
        matches!(self, Column::Break { .. })
    }

    /// Header label: `P{n}` for periods, the break's name for breaks.
    pub fn label(&self) -> String {
        match self {
            Column::Period { index, .. } => format!("P{}", index),
            Column::Break { slot, .. } => slot.name.clone(),
        }
    }

    /// `9:00 AM - 10:00 AM`
    pub fn time_range_label(&self) -> String {
        format!("{} - {}", self.start(), self.end())
    }
}

impl From<Slot> for Column {
    fn from(slot: Slot) -> Self {
        match slot {
            Slot::Period(p) => Column::Period {
                index: p.period,
                start: p.start,
                end: p.end,
            },
            Slot::Break(b) => Column::Break {
                slot: b.slot,
                start: b.start,
                end: b.end,
            },
        }
    }
}

/// Ordered columns of one schedule, plus the computed day end time.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ColumnPlan {
    columns: Vec<Column>,
    day_end: ClockTime,
}

impl ColumnPlan {
    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn day_end(&self) -> ClockTime {
        self.day_end
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    pub fn period_count(&self) -> usize {
        self.columns.iter().filter(|c| !c.is_break()).count()
    }

    /// Position of the column for a 1-based period.
    pub fn position_of_period(&self, period: u32) -> Option<usize> {
        self.columns
            .iter()
            .position(|c| c.period_index() == Some(period))
    }

    /// The period column for a 1-based period.
    pub fn period(&self, period: u32) -> Option<&Column> {
        self.position_of_period(period).map(|idx| &self.columns[idx])
    }
}

/// Expand a config into its column plan, in temporal order.
///
/// A break column always directly follows its anchor period's column.
pub fn build_columns(config: &ScheduleConfig) -> ColumnPlan {
    let mut sweeper = sweep(config);
    let columns: Vec<Column> = sweeper.by_ref().map(Column::from).collect();
    ColumnPlan {
        columns,
        day_end: sweeper.clock(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resolver::resolve_all;

    fn t(hour: u32, minute: u32) -> ClockTime {
        ClockTime::from_hm(hour, minute).unwrap()
    }

    fn config(periods: u32, breaks: Vec<BreakSlot>) -> ScheduleConfig {
        ScheduleConfig::new("Test", t(9, 0), 60, periods).with_breaks(breaks)
    }

    #[test]
    fn test_labels_in_order() {
        let plan = build_columns(&config(4, vec![BreakSlot::new(2, 15, "Tea")]));
        let labels: Vec<String> = plan.columns().iter().map(Column::label).collect();

        assert_eq!(labels, vec!["P1", "P2", "Tea", "P3", "P4"]);
        assert_eq!(plan.period_count(), 4);
        assert_eq!(plan.day_end(), t(13, 15));
    }

    #[test]
    fn test_empty_plan_for_zero_periods() {
        let plan = build_columns(&config(0, vec![BreakSlot::new(2, 15, "Tea")]));
        assert!(plan.is_empty());
        assert_eq!(plan.day_end(), t(9, 0));
    }

    #[test]
    fn test_break_never_precedes_anchor_nor_follows_break() {
        let breaks = vec![
            BreakSlot::new(1, 10, "A"),
            BreakSlot::new(2, 10, "B"),
            BreakSlot::new(5, 30, "C"),
            BreakSlot::new(9, 30, "Out of range"),
        ];
        let plan = build_columns(&config(5, breaks));
        let cols = plan.columns();

        assert!(!cols[0].is_break());
        for (i, col) in cols.iter().enumerate() {
            if let Column::Break { slot, .. } = col {
                assert_eq!(cols[i - 1].period_index(), Some(slot.after_period));
            }
        }
        for pair in cols.windows(2) {
            assert!(!(pair[0].is_break() && pair[1].is_break()));
        }
        assert_eq!(plan.len(), 8);
    }

    #[test]
    fn test_columns_agree_with_resolver() {
        let cfg = config(6, vec![BreakSlot::new(3, 45, "Lunch")]);
        let plan = build_columns(&cfg);
        let resolved = resolve_all(&cfg);

        for p in &resolved.periods {
            let col = plan.period(p.period).unwrap();
            assert_eq!((col.start(), col.end()), (p.start, p.end));
        }
        assert_eq!(plan.day_end(), resolved.day_end);
    }

    #[test]
    fn test_time_range_label() {
        let plan = build_columns(&config(1, vec![]));
        assert_eq!(plan.columns()[0].time_range_label(), "9:00 AM - 10:00 AM");
        assert_eq!(plan.position_of_period(1), Some(0));
        assert_eq!(plan.position_of_period(2), None);
    }
}
