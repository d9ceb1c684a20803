//! Editing rules for manager-initiated placement changes.
//!
//! The sweep does not go through these rules; it has its own policy
//! in `status_policy`.

use crate::{
    catalog::PlacementStatus,
    error::{DeskError, DeskResult},
    model::{NewPlacement, PlacementRecord, PlacementUpdate},
};

/// Closed placements: only the status may still change.
pub const STATUS_ONLY: [PlacementStatus; 2] = [PlacementStatus::Declined, PlacementStatus::Done];

/// Once payment is under way the agreed fee is frozen.
pub const FEE_LOCKED: [PlacementStatus; 5] = [
    PlacementStatus::WaitingPayment,
    PlacementStatus::PaidWaitingPublication,
    PlacementStatus::Published,
    PlacementStatus::Overdue,
    PlacementStatus::Done,
];

/// Statuses that only make sense with a fee and a date on record.
pub const NEEDS_FEE_AND_DATE: [PlacementStatus; 3] = [
    PlacementStatus::Agreed,
    PlacementStatus::WaitingPayment,
    PlacementStatus::PaidWaitingPublication,
];

fn reject_manual_overdue(status: Option<PlacementStatus>) -> DeskResult<()> {
    if status == Some(PlacementStatus::Overdue) {
        return Err(DeskError::rule(
            "overdue is set by the overdue sweep, not by hand",
        ));
    }
    Ok(())
}

fn require_fee_and_date(
    status: PlacementStatus,
    has_fee: bool,
    has_date: bool,
) -> DeskResult<()> {
    if !NEEDS_FEE_AND_DATE.contains(&status) {
        return Ok(());
    }
    if !has_fee {
        return Err(DeskError::rule(format!("fee is required for {status} placements")));
    }
    if !has_date {
        return Err(DeskError::rule(format!(
            "scheduled date is required for {status} placements"
        )));
    }
    Ok(())
}

pub fn check_create(p: &NewPlacement) -> DeskResult<()> {
    reject_manual_overdue(p.status)?;
    require_fee_and_date(
        p.status.unwrap_or_default(),
        p.fee.is_some(),
        p.scheduled_date.is_some(),
    )
}

pub fn check_update(current: &PlacementRecord, update: &PlacementUpdate) -> DeskResult<()> {
    reject_manual_overdue(update.status)?;

    if STATUS_ONLY.contains(&current.status) && update.touches_non_status_fields() {
        return Err(DeskError::rule(format!(
            "placement {} is {} and only its status can change",
            current.id, current.status
        )));
    }

    if update.fee.is_some() && FEE_LOCKED.contains(&current.status) {
        return Err(DeskError::rule(format!(
            "fee of placement {} is locked once payment has started",
            current.id
        )));
    }

    let next = update.status.unwrap_or(current.status);
    require_fee_and_date(
        next,
        update.fee.or(current.fee).is_some(),
        update.scheduled_date.or(current.scheduled_date).is_some(),
    )
}

pub fn check_delete(current: &PlacementRecord) -> DeskResult<()> {
    if current.status != PlacementStatus::Planning {
        return Err(DeskError::rule(format!(
            "only planning placements can be deleted; placement {} is {}",
            current.id, current.status
        )));
    }
    Ok(())
}
