//! The desk's audit trail.
//!
//! RULE: Every placement status change is recorded as an event,
//! whether a manager made it or the overdue sweep did.

use crate::{catalog::PlacementStatus, model::PlacementRecord, types::EntityId};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Who caused a status change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Actor {
    Manager,
    Sweep,
}

/// Variants are added over time, never removed or reordered.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum DeskEvent {
    PlacementCreated {
        placement_id: EntityId,
        campaign_id:  EntityId,
        status:       PlacementStatus,
    },
    PlacementStatusChanged {
        placement_id: EntityId,
        from:         PlacementStatus,
        to:           PlacementStatus,
        actor:        Actor,
    },
    PlacementDeleted {
        placement_id: EntityId,
    },
    OverdueSweepCompleted {
        today:   NaiveDate,
        changed: usize,
    },
}

impl DeskEvent {
    pub fn placement_created(p: &PlacementRecord) -> Self {
        DeskEvent::PlacementCreated {
            placement_id: p.id,
            campaign_id:  p.campaign_id,
            status:       p.status,
        }
    }

    /// Stable name for the event_type column.
    pub fn type_name(&self) -> &'static str {
        match self {
            DeskEvent::PlacementCreated { .. }       => "placement_created",
            DeskEvent::PlacementStatusChanged { .. } => "placement_status_changed",
            DeskEvent::PlacementDeleted { .. }       => "placement_deleted",
            DeskEvent::OverdueSweepCompleted { .. }  => "overdue_sweep_completed",
        }
    }

    /// The placement this event concerns, if any.
    pub fn placement_id(&self) -> Option<EntityId> {
        match self {
            DeskEvent::PlacementCreated { placement_id, .. }
            | DeskEvent::PlacementStatusChanged { placement_id, .. }
            | DeskEvent::PlacementDeleted { placement_id } => Some(*placement_id),
            DeskEvent::OverdueSweepCompleted { .. } => None,
        }
    }
}

/// A persisted event log row.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventLogEntry {
    pub id:           Option<i64>,
    pub recorded_on:  NaiveDate,
    pub placement_id: Option<EntityId>,
    pub event_type:   String,
    pub payload:      String, // JSON-serialized DeskEvent
}

impl EventLogEntry {
    pub fn new(recorded_on: NaiveDate, event: &DeskEvent) -> serde_json::Result<Self> {
        Ok(Self {
            id: None,
            recorded_on,
            placement_id: event.placement_id(),
            event_type: event.type_name().to_string(),
            payload: serde_json::to_string(event)?,
        })
    }

    pub fn event(&self) -> serde_json::Result<DeskEvent> {
        serde_json::from_str(&self.payload)
    }
}
