//! Task trait and registry.
//!
//! RULE: Every batch correction pass implements DeskTask.
//! `Desk::run_tasks` calls run() on each registered task
//! in registration order. Tasks never call one another.

use crate::{error::DeskResult, event::DeskEvent, repository::DeskRepository};
use chrono::NaiveDate;
use std::any::Any;

/// The contract every task must fulfill.
pub trait DeskTask: Send {
    /// Unique stable name for this task.
    fn name(&self) -> &'static str;

    /// Called once per scheduled run.
    ///
    /// - `today`: the date the run is evaluated against
    /// - `repo`:  the storage the task reads and corrects
    ///
    /// Returns summary events for the caller to report.
    fn run(&mut self, today: NaiveDate, repo: &dyn DeskRepository) -> DeskResult<Vec<DeskEvent>>;

    /// For downcasting in tests and tooling only.
    fn as_any(&self) -> &dyn Any;
}
