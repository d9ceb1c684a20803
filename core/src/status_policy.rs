//! Overdue policy. Promotes placements whose scheduled date has passed.
//!
//! RULES:
//!   - A placement is promoted only if it has a scheduled date strictly
//!     before today and is not Published, Done or already Overdue.
//!   - The sweep only ever writes `Overdue`. It never moves a placement
//!     out of Overdue and never touches any other field.
//!   - Running the sweep twice with the same `today` changes nothing the
//!     second time.

use crate::{
    catalog::PlacementStatus,
    error::DeskResult,
    event::{Actor, DeskEvent, EventLogEntry},
    model::{PlacementFilter, PlacementRecord},
    repository::DeskRepository,
    task::DeskTask,
    types::EntityId,
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Statuses the sweep must never overwrite.
pub const OVERDUE_PROTECTED: [PlacementStatus; 2] =
    [PlacementStatus::Published, PlacementStatus::Done];

pub fn is_overdue_eligible(p: &PlacementRecord, today: NaiveDate) -> bool {
    let Some(scheduled) = p.scheduled_date else {
        return false;
    };
    scheduled < today
        && !OVERDUE_PROTECTED.contains(&p.status)
        && p.status != PlacementStatus::Overdue
}

/// Pure half of the sweep: the placements that need promotion,
/// each already moved to `Overdue`. Input order is preserved.
pub fn promote_overdue<'a, I>(placements: I, today: NaiveDate) -> Vec<PlacementRecord>
where
    I: IntoIterator<Item = &'a PlacementRecord>,
{
    placements
        .into_iter()
        .filter(|p| is_overdue_eligible(p, today))
        .map(|p| PlacementRecord {
            status: PlacementStatus::Overdue,
            ..p.clone()
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SweepReport {
    pub today:         NaiveDate,
    /// Ascending.
    pub placement_ids: Vec<EntityId>,
}

impl SweepReport {
    pub fn changed(&self) -> usize {
        self.placement_ids.len()
    }
}

/// Run the sweep against storage: read every placement, then persist the
/// promotions and one event per change in a single atomic write.
pub fn sweep_overdue<R>(repo: &R, today: NaiveDate) -> DeskResult<SweepReport>
where
    R: DeskRepository + ?Sized,
{
    let placements = repo.placements(&PlacementFilter::all())?;
    let promoted = promote_overdue(&placements, today);

    let mut placement_ids: Vec<EntityId> = promoted.iter().map(|p| p.id).collect();
    placement_ids.sort_unstable();

    if placement_ids.is_empty() {
        log::debug!("Overdue sweep for {today}: nothing to promote");
        return Ok(SweepReport { today, placement_ids });
    }

    let mut events = Vec::with_capacity(placement_ids.len());
    for p in &placements {
        if placement_ids.binary_search(&p.id).is_ok() {
            let event = DeskEvent::PlacementStatusChanged {
                placement_id: p.id,
                from: p.status,
                to: PlacementStatus::Overdue,
                actor: Actor::Sweep,
            };
            events.push(EventLogEntry::new(today, &event)?);
        }
    }
    repo.mark_overdue(&placement_ids, &events)?;

    log::info!(
        "Overdue sweep for {today}: {} placement(s) promoted",
        placement_ids.len()
    );
    Ok(SweepReport { today, placement_ids })
}

/// The sweep as a standalone task, for callers that run it on a schedule
/// rather than ahead of a read.
#[derive(Debug, Default)]
pub struct OverdueSweep {
    last_report: Option<SweepReport>,
}

impl OverdueSweep {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn last_report(&self) -> Option<&SweepReport> {
        self.last_report.as_ref()
    }
}

impl DeskTask for OverdueSweep {
    fn name(&self) -> &'static str {
        "overdue_sweep"
    }

    fn run(&mut self, today: NaiveDate, repo: &dyn DeskRepository) -> DeskResult<Vec<DeskEvent>> {
        let report = sweep_overdue(repo, today)?;
        let events = vec![DeskEvent::OverdueSweepCompleted {
            today,
            changed: report.changed(),
        }];
        self.last_report = Some(report);
        Ok(events)
    }

    fn as_any(&self) -> &dyn std::any::Any {
        self
    }
}
