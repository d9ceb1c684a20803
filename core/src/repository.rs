//! Storage seam.
//!
//! RULE: Desk operations reach storage only through `DeskRepository`.
//! `DeskStore` (SQLite) is the production implementation,
//! `MemoryStore` the in-process one used by tests and tooling.
//!
//! RULE: A placement write and the event-log entries describing it are
//! one unit. Methods that take `events` persist both or neither.

use crate::{
    error::DeskResult,
    event::EventLogEntry,
    model::{
        BloggerRecord, CampaignFilter, CampaignRecord, CommentFilter, CommentRecord,
        CounterpartyRecord, NewBlogger, NewCampaign, NewComment, NewCounterparty, NewPlacement,
        NewPricePreset, NewUser, PlacementFilter, PlacementRecord, PricePresetRecord, UserRecord,
    },
    types::EntityId,
};
use chrono::NaiveDate;

pub trait DeskRepository: Send {
    // ── Directory ─────────────────────────────────
    fn insert_blogger(&self, b: &NewBlogger) -> DeskResult<BloggerRecord>;
    fn blogger(&self, id: EntityId) -> DeskResult<Option<BloggerRecord>>;
    fn blogger_by_url(&self, url: &str) -> DeskResult<Option<BloggerRecord>>;
    /// Newest first.
    fn bloggers(&self) -> DeskResult<Vec<BloggerRecord>>;

    fn insert_counterparty(&self, c: &NewCounterparty) -> DeskResult<CounterpartyRecord>;
    fn counterparty(&self, id: EntityId) -> DeskResult<Option<CounterpartyRecord>>;
    /// Newest first.
    fn counterparties(&self) -> DeskResult<Vec<CounterpartyRecord>>;

    /// Replace the blogger's counterparty links with `counterparty_ids`.
    fn replace_blogger_counterparties(
        &self,
        blogger_id: EntityId,
        counterparty_ids: &[EntityId],
    ) -> DeskResult<()>;
    /// Ascending.
    fn blogger_counterparty_ids(&self, blogger_id: EntityId) -> DeskResult<Vec<EntityId>>;

    fn insert_user(&self, u: &NewUser) -> DeskResult<UserRecord>;
    fn user(&self, id: EntityId) -> DeskResult<Option<UserRecord>>;
    fn user_by_email(&self, email: &str) -> DeskResult<Option<UserRecord>>;
    fn users(&self) -> DeskResult<Vec<UserRecord>>;
    fn save_user(&self, u: &UserRecord) -> DeskResult<()>;

    // ── Price presets ─────────────────────────────
    fn insert_price_preset(&self, p: &NewPricePreset) -> DeskResult<PricePresetRecord>;
    fn price_preset(&self, id: EntityId) -> DeskResult<Option<PricePresetRecord>>;
    /// Newest first; all bloggers when `blogger_id` is `None`.
    fn price_presets(&self, blogger_id: Option<EntityId>) -> DeskResult<Vec<PricePresetRecord>>;
    fn save_price_preset(&self, p: &PricePresetRecord) -> DeskResult<()>;
    fn delete_price_preset(&self, id: EntityId) -> DeskResult<()>;

    // ── Comments ──────────────────────────────────
    fn insert_comment(&self, c: &NewComment, created_on: NaiveDate) -> DeskResult<CommentRecord>;
    /// Newest first.
    fn comments(&self, filter: &CommentFilter) -> DeskResult<Vec<CommentRecord>>;

    // ── Campaigns ─────────────────────────────────
    fn insert_campaign(&self, c: &NewCampaign) -> DeskResult<CampaignRecord>;
    fn campaign(&self, id: EntityId) -> DeskResult<Option<CampaignRecord>>;
    /// Newest first.
    fn campaigns(&self, filter: &CampaignFilter) -> DeskResult<Vec<CampaignRecord>>;
    fn save_campaign(&self, c: &CampaignRecord) -> DeskResult<()>;

    // ── Placements ────────────────────────────────
    /// Insert the placement and its `placement_created` entry, atomically.
    fn insert_placement(&self, p: &NewPlacement, recorded_on: NaiveDate) -> DeskResult<PlacementRecord>;
    fn placement(&self, id: EntityId) -> DeskResult<Option<PlacementRecord>>;
    /// Newest first.
    fn placements(&self, filter: &PlacementFilter) -> DeskResult<Vec<PlacementRecord>>;
    fn save_placement(&self, p: &PlacementRecord, events: &[EventLogEntry]) -> DeskResult<()>;
    fn delete_placement(&self, id: EntityId, events: &[EventLogEntry]) -> DeskResult<()>;

    /// Set every listed placement to `Overdue` and append `events`, in one
    /// atomic write. Returns the number of rows written.
    fn mark_overdue(&self, ids: &[EntityId], events: &[EventLogEntry]) -> DeskResult<usize>;

    // ── Event log ─────────────────────────────────
    fn append_event(&self, entry: &EventLogEntry) -> DeskResult<()>;
    /// Oldest first.
    fn events_for_placement(&self, placement_id: EntityId) -> DeskResult<Vec<EventLogEntry>>;
}
