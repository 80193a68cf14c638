//! # Slot Search
//!
//! Finds fixed-size booking slots that do not collide with any busy interval.
//!
//! The search runs over a day-aligned window. In dynamic mode the window spans
//! from midnight UTC of the earliest busy start to the last millisecond of the
//! UTC day holding the latest busy boundary; in fixed-day mode it covers one
//! civil day in the display zone. Candidates are laid on a grid of
//! `granularity` steps starting either at the window start or at the rounded
//! reference instant, whichever is later.

use std::num::NonZeroU32;

use chrono::{DateTime, NaiveDate, TimeDelta, Utc};
use chrono_tz::Tz;

use crate::errors::{TimeError, TimeResult};
use crate::time;

const DEFAULT_GRANULARITY_MINUTES: NonZeroU32 = NonZeroU32::new(10).unwrap();
const DEFAULT_ROUNDING_MINUTES: NonZeroU32 = NonZeroU32::new(10).unwrap();
const DEFAULT_MAX_WINDOW_DAYS: NonZeroU32 = NonZeroU32::new(31).unwrap();

/// A half-open busy range `[start, end)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Interval {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl Interval {
    /// Builds an interval, rejecting empty or inverted ranges.
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> TimeResult<Self> {
        if start >= end {
            return Err(TimeError::Validation(format!(
                "Busy time must start before it ends (start: {start}, end: {end})"
            )));
        }
        Ok(Self { start, end })
    }

    /// Whether `[from, to)` shares any instant with this interval.
    pub fn overlaps(&self, from: DateTime<Utc>, to: DateTime<Utc>) -> bool {
        from < self.end && to > self.start
    }
}

/// Which boundary of the latest busy interval closes the dynamic window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WindowEndSource {
    #[default]
    IntervalEnd,
    IntervalStart,
}

/// How the search window is chosen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SearchWindow {
    /// Derived from the busy intervals themselves.
    #[default]
    Dynamic,
    /// One civil day in the display zone, last slot starting one step before
    /// the following midnight.
    FixedDay(NaiveDate),
}

#[derive(Debug, Clone, PartialEq)]
pub struct SlotOptions {
    pub granularity_minutes: NonZeroU32,
    pub rounding_minutes: NonZeroU32,
    pub window_end_source: WindowEndSource,
    pub window: SearchWindow,
    /// Discard the earliest available slot as too soon to book.
    pub drop_first_available: bool,
    /// Take the window bounds from the first and last intervals as given
    /// instead of scanning for the true extremes.
    pub trust_input_order: bool,
    pub display_zone: Tz,
    /// Longest search window accepted, in days.
    pub max_window_days: NonZeroU32,
}

impl Default for SlotOptions {
    fn default() -> Self {
        Self {
            granularity_minutes: DEFAULT_GRANULARITY_MINUTES,
            rounding_minutes: DEFAULT_ROUNDING_MINUTES,
            window_end_source: WindowEndSource::default(),
            window: SearchWindow::default(),
            drop_first_available: true,
            trust_input_order: false,
            display_zone: chrono_tz::America::New_York,
            max_window_days: DEFAULT_MAX_WINDOW_DAYS,
        }
    }
}

impl SlotOptions {
    fn granularity(&self) -> TimeDelta {
        TimeDelta::minutes(i64::from(self.granularity_minutes.get()))
    }

    fn max_window(&self) -> TimeDelta {
        TimeDelta::days(i64::from(self.max_window_days.get()))
    }
}

/// Outcome of a slot search.
#[derive(Debug, Clone, PartialEq)]
pub enum SlotSearch {
    /// Available slot starts in ascending order, in the display zone.
    Available(Vec<DateTime<Tz>>),
    NoBusyTimes,
    /// Every candidate collided with a busy interval. `anchored` records
    /// whether a reference instant bounded the search.
    NoSlotsAvailable { anchored: bool },
}

impl SlotSearch {
    pub fn slots(&self) -> &[DateTime<Tz>] {
        match self {
            SlotSearch::Available(slots) => slots,
            _ => &[],
        }
    }
}

/// Resolved `[start, end]` bounds of the candidate grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WindowBounds {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl WindowBounds {
    /// Window end, pulled in so the window never exceeds `limit`.
    fn clamped_end(&self, limit: TimeDelta) -> DateTime<Utc> {
        self.start
            .checked_add_signed(limit)
            .map_or(self.end, |latest| self.end.min(latest))
    }
}

/// Rejects busy lists whose search window is longer than
/// `options.max_window_days`.
pub fn check_window_span(busy: &[Interval], options: &SlotOptions) -> TimeResult<()> {
    let Some(window) = search_window(busy, options) else {
        return Ok(());
    };
    let span = window.end - window.start;
    if span > options.max_window() {
        return Err(TimeError::Validation(format!(
            "Busy times span {} days, the search is limited to {} days",
            span.num_days() + 1,
            options.max_window_days
        )));
    }
    Ok(())
}

/// Computes the search window. Dynamic windows need at least one interval
/// and yield `None` for an empty list.
pub fn search_window(busy: &[Interval], options: &SlotOptions) -> Option<WindowBounds> {
    if let SearchWindow::FixedDay(day) = options.window {
        let start = time::local_midnight(day, options.display_zone);
        let next = day
            .succ_opt()
            .map(|next| time::local_midnight(next, options.display_zone))
            .unwrap_or(start + TimeDelta::days(1));
        return Some(WindowBounds {
            start,
            end: next - options.granularity(),
        });
    }

    let latest_boundary = |interval: &Interval| match options.window_end_source {
        WindowEndSource::IntervalEnd => interval.end,
        WindowEndSource::IntervalStart => interval.start,
    };

    let (earliest, latest) = if options.trust_input_order {
        (busy.first()?.start, latest_boundary(busy.last()?))
    } else {
        (
            busy.iter().map(|interval| interval.start).min()?,
            busy.iter().map(latest_boundary).max()?,
        )
    };

    Some(WindowBounds {
        start: time::start_of_day(earliest),
        end: time::end_of_day(latest),
    })
}

/// Finds the available slots among `busy`.
///
/// When `reference` is given it is rounded down to the configured boundary in
/// the display zone and no candidate earlier than it is produced. Windows
/// longer than `options.max_window_days` are cut short; use
/// [`check_window_span`] to reject them instead.
pub fn find_available_slots(
    busy: &[Interval],
    reference: Option<DateTime<Utc>>,
    options: &SlotOptions,
) -> SlotSearch {
    if busy.is_empty() {
        return SlotSearch::NoBusyTimes;
    }
    let Some(window) = search_window(busy, options) else {
        return SlotSearch::NoBusyTimes;
    };

    let step = options.granularity();
    let window_end = window.clamped_end(options.max_window());
    let mut candidate = match reference {
        Some(now) => {
            time::round_down(now, options.rounding_minutes, options.display_zone).max(window.start)
        }
        None => window.start,
    };

    let mut available = Vec::new();
    while candidate <= window_end {
        let Some(slot_end) = candidate.checked_add_signed(step) else {
            break;
        };
        if !busy.iter().any(|interval| interval.overlaps(candidate, slot_end)) {
            available.push(candidate.with_timezone(&options.display_zone));
        }
        candidate = slot_end;
    }

    if options.drop_first_available && !available.is_empty() {
        available.remove(0);
    }

    if available.is_empty() {
        SlotSearch::NoSlotsAvailable {
            anchored: reference.is_some(),
        }
    } else {
        SlotSearch::Available(available)
    }
}
