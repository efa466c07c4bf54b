//! Period-time resolution: one forward sweep over a schedule config.
//!
//! This is the only place in the crate that does period/break arithmetic.
//! The column plan, the grid and the editor preview all consume [`Sweep`].

use rustc_hash::FxHashMap;

use crate::models::{BreakSlot, ScheduleConfig};
use crate::time::ClockTime;

/// Wall-clock bounds of one teaching period.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PeriodTime {
    /// 1-based period index.
    pub period: u32,
    pub start: ClockTime,
    pub end: ClockTime,
}

/// Wall-clock bounds of a break that the sweep actually reached.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BreakTime {
    pub slot: BreakSlot,
    pub start: ClockTime,
    pub end: ClockTime,
}

/// One item of the sweep, in temporal order.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Slot {
    Period(PeriodTime),
    Break(BreakTime),
}

impl Slot {
    pub fn start(&self) -> ClockTime {
        match self {
            Slot::Period(p) => p.start,
            Slot::Break(b) => b.start,
        }
    }

    pub fn end(&self) -> ClockTime {
        match self {
            Slot::Period(p) => p.end,
            Slot::Break(b) => b.end,
        }
    }
}

/// Every resolved period and realized break of a config, plus the day end.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ResolvedSchedule {
    pub periods: Vec<PeriodTime>,
    pub breaks: Vec<BreakTime>,
    /// Clock value after the last period (and its trailing break, if any).
    pub day_end: ClockTime,
}

/// Iterator over the periods and breaks of a config, in temporal order.
///
/// The clock starts at `start_time`. Each period advances it by the period
/// duration. A break anchored after the period just emitted is yielded next
/// and advances the clock by its own duration. Breaks anchored outside
/// `1..=periods_per_day` are never reached.
pub struct Sweep<'a> {
    config: &'a ScheduleConfig,
    breaks_by_anchor: FxHashMap<u32, &'a BreakSlot>,
    clock: ClockTime,
    next_period: u32,
    pending_break: Option<&'a BreakSlot>,
}

impl<'a> Sweep<'a> {
    pub fn new(config: &'a ScheduleConfig) -> Self {
        // Later entries overwrite earlier ones at the same anchor.
        let breaks_by_anchor: FxHashMap<u32, &BreakSlot> = config
            .breaks()
            .iter()
            .map(|slot| (slot.after_period, slot))
            .collect();

        Self {
            config,
            breaks_by_anchor,
            clock: config.start_time,
            next_period: 1,
            pending_break: None,
        }
    }

    /// Current clock value. After exhaustion this is the day end time.
    pub fn clock(&self) -> ClockTime {
        self.clock
    }
}

impl Iterator for Sweep<'_> {
    type Item = Slot;

    fn next(&mut self) -> Option<Slot> {
        if let Some(slot) = self.pending_break.take() {
            let start = self.clock;
            self.clock = start.plus_minutes(slot.duration_minutes);
            return Some(Slot::Break(BreakTime {
                slot: slot.clone(),
                start,
                end: self.clock,
            }));
        }

        if self.next_period > self.config.periods_per_day {
            return None;
        }

        let period = self.next_period;
        let start = self.clock;
        self.clock = start.plus_minutes(self.config.period_duration_minutes);
        self.next_period += 1;
        self.pending_break = self.breaks_by_anchor.get(&period).copied();

        Some(Slot::Period(PeriodTime {
            period,
            start,
            end: self.clock,
        }))
    }
}

/// Start a sweep over `config`.
pub fn sweep(config: &ScheduleConfig) -> Sweep<'_> {
    Sweep::new(config)
}

/// Resolve every period and break of a config in one pass.
///
/// # Returns
/// * Exactly `periods_per_day` periods, each `period_duration_minutes` long
/// * The breaks that were reached, in temporal order
/// * The day end time (equal to `start_time` when there are no periods)
pub fn resolve_all(config: &ScheduleConfig) -> ResolvedSchedule {
    let mut sweeper = sweep(config);
    let mut periods = Vec::with_capacity(config.periods_per_day as usize);
    let mut breaks = Vec::new();

    for slot in sweeper.by_ref() {
        match slot {
            Slot::Period(p) => periods.push(p),
            Slot::Break(b) => breaks.push(b),
        }
    }

    ResolvedSchedule {
        periods,
        breaks,
        day_end: sweeper.clock(),
    }
}

/// Resolve a single 1-based period. `None` when the index is outside
/// `1..=periods_per_day`.
pub fn resolve(config: &ScheduleConfig, period: u32) -> Option<PeriodTime> {
    if period == 0 || period > config.periods_per_day {
        return None;
    }
    sweep(config).find_map(|slot| match slot {
        Slot::Period(p) if p.period == period => Some(p),
        _ => None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn t(hour: u32, minute: u32) -> ClockTime {
        ClockTime::from_hm(hour, minute).unwrap()
    }

    fn config(periods: u32, duration: u32, breaks: Vec<BreakSlot>) -> ScheduleConfig {
        ScheduleConfig::new("Test", t(9, 0), duration, periods).with_breaks(breaks)
    }

    fn bounds(resolved: &ResolvedSchedule) -> Vec<(ClockTime, ClockTime)> {
        resolved.periods.iter().map(|p| (p.start, p.end)).collect()
    }

    #[test]
    fn test_four_periods_no_breaks() {
        let resolved = resolve_all(&config(4, 60, vec![]));

        assert_eq!(
            bounds(&resolved),
            vec![
                (t(9, 0), t(10, 0)),
                (t(10, 0), t(11, 0)),
                (t(11, 0), t(12, 0)),
                (t(12, 0), t(13, 0)),
            ]
        );
        assert!(resolved.breaks.is_empty());
        assert_eq!(resolved.day_end, t(13, 0));
    }

    #[test]
    fn test_tea_break_after_second_period() {
        let resolved = resolve_all(&config(4, 60, vec![BreakSlot::new(2, 15, "Tea")]));

        assert_eq!(
            bounds(&resolved),
            vec![
                (t(9, 0), t(10, 0)),
                (t(10, 0), t(11, 0)),
                (t(11, 15), t(12, 15)),
                (t(12, 15), t(13, 15)),
            ]
        );
        assert_eq!(resolved.breaks.len(), 1);
        assert_eq!(resolved.breaks[0].slot.name, "Tea");
        assert_eq!(resolved.breaks[0].start, t(11, 0));
        assert_eq!(resolved.breaks[0].end, t(11, 15));
        assert_eq!(resolved.day_end, t(13, 15));
    }

    #[test]
    fn test_zero_periods_is_empty() {
        let resolved = resolve_all(&config(0, 60, vec![BreakSlot::new(1, 15, "Tea")]));

        assert!(resolved.periods.is_empty());
        assert!(resolved.breaks.is_empty());
        assert_eq!(resolved.day_end, t(9, 0));
    }

    #[test]
    fn test_break_beyond_last_period_is_inert() {
        let resolved = resolve_all(&config(3, 50, vec![BreakSlot::new(7, 30, "Never")]));

        assert!(resolved.breaks.is_empty());
        assert_eq!(resolved.day_end, t(11, 30));
    }

    #[test]
    fn test_break_after_last_period_extends_day_end() {
        let resolved = resolve_all(&config(2, 60, vec![BreakSlot::new(2, 20, "Wrap-up")]));

        assert_eq!(resolved.breaks.len(), 1);
        assert_eq!(resolved.day_end, t(11, 20));
    }

    #[test]
    fn test_period_durations_and_gaps() {
        let breaks = vec![
            BreakSlot::new(2, 15, "Tea"),
            BreakSlot::new(4, 45, "Lunch"),
            BreakSlot::new(6, 10, "Short"),
        ];
        let cfg = config(8, 55, breaks);
        let resolved = resolve_all(&cfg);

        assert_eq!(resolved.periods.len(), 8);
        for p in &resolved.periods {
            assert_eq!(p.start.minutes_until(p.end), 55);
        }
        for pair in resolved.periods.windows(2) {
            let gap = pair[0].end.minutes_until(pair[1].start);
            let expected = cfg
                .break_after(pair[0].period)
                .map_or(0, |b| b.duration_minutes);
            assert_eq!(gap, expected, "gap after period {}", pair[0].period);
        }
    }

    #[test]
    fn test_resolve_single_matches_resolve_all() {
        let cfg = config(6, 45, vec![BreakSlot::new(3, 30, "Lunch")]);
        let all = resolve_all(&cfg);

        for p in &all.periods {
            assert_eq!(resolve(&cfg, p.period).as_ref(), Some(p));
        }
        assert_eq!(resolve(&cfg, 0), None);
        assert_eq!(resolve(&cfg, 7), None);
    }

    #[test]
    fn test_resolve_all_is_idempotent() {
        let cfg = config(5, 40, vec![BreakSlot::new(1, 5, "A"), BreakSlot::new(3, 25, "B")]);
        assert_eq!(resolve_all(&cfg), resolve_all(&cfg));
    }

    #[test]
    fn test_sweep_orders_break_after_anchor() {
        let cfg = config(3, 60, vec![BreakSlot::new(1, 10, "Tea")]);
        let slots: Vec<Slot> = sweep(&cfg).collect();

        assert_eq!(slots.len(), 4);
        assert!(matches!(&slots[0], Slot::Period(p) if p.period == 1));
        assert!(matches!(&slots[1], Slot::Break(b) if b.slot.after_period == 1));
        assert!(matches!(&slots[2], Slot::Period(p) if p.period == 2));
        assert_eq!(slots[1].start(), slots[0].end());
        assert_eq!(slots[2].start(), slots[1].end());
    }
}
