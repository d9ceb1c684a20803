//! Desk clock: the single source of "today".
//!
//! RULE: Nothing in the core reads the wall clock directly.
//! Operations that depend on the date ask the injected clock.

use chrono::{Local, NaiveDate};

pub trait DeskClock: Send {
    fn today(&self) -> NaiveDate;
}

/// Local calendar date of the machine running the desk.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl DeskClock for SystemClock {
    fn today(&self) -> NaiveDate {
        Local::now().date_naive()
    }
}

/// A clock pinned to one date. Used by tests and by `--today` on the runner.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedClock {
    date: NaiveDate,
}

impl FixedClock {
    pub fn new(date: NaiveDate) -> Self {
        Self { date }
    }
}

impl DeskClock for FixedClock {
    fn today(&self) -> NaiveDate {
        self.date
    }
}
