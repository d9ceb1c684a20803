//! SQLite persistence layer.
//!
//! RULE: Only the store talks to the database.
//! Desk operations call store methods through `DeskRepository`;
//! they never execute SQL directly.

use crate::{
    error::{DeskError, DeskResult},
    event::EventLogEntry,
    model::{
        BloggerRecord, CampaignFilter, CampaignRecord, CommentFilter, CommentRecord,
        CounterpartyRecord, NewBlogger, NewCampaign, NewComment, NewCounterparty, NewPlacement,
        NewPricePreset, NewUser, PlacementFilter, PlacementRecord, PricePresetRecord, UserRecord,
    },
    repository::DeskRepository,
    types::EntityId,
};
use chrono::NaiveDate;
use rusqlite::{params, types::Type, Connection};

mod campaign;
mod comment;
mod directory;
mod placement;
mod preset;

/// Read a non-negative count column.
fn count(row: &rusqlite::Row<'_>, idx: usize) -> rusqlite::Result<Option<u64>> {
    row.get::<_, Option<i64>>(idx)?
        .map(|v| {
            u64::try_from(v).map_err(|e| {
                rusqlite::Error::FromSqlConversionFailure(idx, Type::Integer, Box::new(e))
            })
        })
        .transpose()
}

/// SQLite integers are signed; counts past `i64::MAX` cannot be stored.
fn to_sql_count(v: Option<u64>) -> DeskResult<Option<i64>> {
    v.map(|n| {
        i64::try_from(n).map_err(|_| DeskError::InvalidValue {
            field: "count",
            value: n.to_string(),
        })
    })
    .transpose()
}

/// Append one event-log row on `conn`, which may be an open transaction.
fn insert_event(conn: &Connection, entry: &EventLogEntry) -> DeskResult<()> {
    conn.execute(
        "INSERT INTO event_log (recorded_on, placement_id, event_type, payload)
         VALUES (?1, ?2, ?3, ?4)",
        params![
            entry.recorded_on,
            entry.placement_id,
            entry.event_type,
            entry.payload,
        ],
    )?;
    Ok(())
}

pub struct DeskStore {
    conn: Connection,
    path: Option<String>, // None for :memory:, Some(path) for file
}

impl DeskStore {
    pub fn open(path: &str) -> DeskResult<Self> {
        if let Some(parent) = std::path::Path::new(path).parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let conn = Connection::open_with_flags(
            path,
            rusqlite::OpenFlags::SQLITE_OPEN_READ_WRITE
                | rusqlite::OpenFlags::SQLITE_OPEN_CREATE
                | rusqlite::OpenFlags::SQLITE_OPEN_URI,
        )?;
        // WAL mode only for real files (shared-memory and :memory: ignore it).
        let _ = conn.execute_batch("PRAGMA journal_mode=WAL;");
        conn.execute_batch("PRAGMA foreign_keys=ON;")?;
        log::debug!("Opened desk store at {path}");
        Ok(Self {
            conn,
            path: Some(path.to_string()),
        })
    }

    /// Open an in-memory database (used in tests).
    pub fn in_memory() -> DeskResult<Self> {
        let conn = Connection::open(":memory:")?;
        conn.execute_batch("PRAGMA foreign_keys=ON;")?;
        Ok(Self { conn, path: None })
    }

    /// Backing file, or `None` for an in-memory store.
    pub fn path(&self) -> Option<&str> {
        self.path.as_deref()
    }

    /// Apply all schema migrations in order.
    pub fn migrate(&self) -> DeskResult<()> {
        self.conn
            .execute_batch(include_str!("../../../migrations/001_directory.sql"))?;
        self.conn
            .execute_batch(include_str!("../../../migrations/002_campaigns.sql"))?;
        self.conn
            .execute_batch(include_str!("../../../migrations/003_event_log.sql"))?;
        self.conn
            .execute_batch(include_str!("../../../migrations/004_presets_comments.sql"))?;
        Ok(())
    }

    // ── Event log ──────────────────────────────────────────────

    pub fn append_event(&self, entry: &EventLogEntry) -> DeskResult<()> {
        insert_event(&self.conn, entry)
    }

    pub fn events_for_placement(&self, placement_id: EntityId) -> DeskResult<Vec<EventLogEntry>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, recorded_on, placement_id, event_type, payload
             FROM event_log WHERE placement_id = ?1
             ORDER BY id ASC",
        )?;
        let entries = stmt
            .query_map(params![placement_id], |row| {
                Ok(EventLogEntry {
                    id: Some(row.get(0)?),
                    recorded_on: row.get(1)?,
                    placement_id: row.get(2)?,
                    event_type: row.get(3)?,
                    payload: row.get(4)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(entries)
    }

    pub fn event_count(&self) -> DeskResult<i64> {
        let n = self
            .conn
            .query_row("SELECT COUNT(*) FROM event_log", [], |row| row.get(0))?;
        Ok(n)
    }
}

impl DeskRepository for DeskStore {
    fn insert_blogger(&self, b: &NewBlogger) -> DeskResult<BloggerRecord> {
        DeskStore::insert_blogger(self, b)
    }

    fn blogger(&self, id: EntityId) -> DeskResult<Option<BloggerRecord>> {
        DeskStore::blogger(self, id)
    }

    fn blogger_by_url(&self, url: &str) -> DeskResult<Option<BloggerRecord>> {
        DeskStore::blogger_by_url(self, url)
    }

    fn bloggers(&self) -> DeskResult<Vec<BloggerRecord>> {
        DeskStore::bloggers(self)
    }

    fn insert_counterparty(&self, c: &NewCounterparty) -> DeskResult<CounterpartyRecord> {
        DeskStore::insert_counterparty(self, c)
    }

    fn counterparty(&self, id: EntityId) -> DeskResult<Option<CounterpartyRecord>> {
        DeskStore::counterparty(self, id)
    }

    fn counterparties(&self) -> DeskResult<Vec<CounterpartyRecord>> {
        DeskStore::counterparties(self)
    }

    fn replace_blogger_counterparties(
        &self,
        blogger_id: EntityId,
        counterparty_ids: &[EntityId],
    ) -> DeskResult<()> {
        DeskStore::replace_blogger_counterparties(self, blogger_id, counterparty_ids)
    }

    fn blogger_counterparty_ids(&self, blogger_id: EntityId) -> DeskResult<Vec<EntityId>> {
        DeskStore::blogger_counterparty_ids(self, blogger_id)
    }

    fn insert_user(&self, u: &NewUser) -> DeskResult<UserRecord> {
        DeskStore::insert_user(self, u)
    }

    fn user_by_email(&self, email: &str) -> DeskResult<Option<UserRecord>> {
        DeskStore::user_by_email(self, email)
    }

    fn user(&self, id: EntityId) -> DeskResult<Option<UserRecord>> {
        DeskStore::user(self, id)
    }

    fn users(&self) -> DeskResult<Vec<UserRecord>> {
        DeskStore::users(self)
    }

    fn save_user(&self, u: &UserRecord) -> DeskResult<()> {
        DeskStore::save_user(self, u)
    }

    fn insert_price_preset(&self, p: &NewPricePreset) -> DeskResult<PricePresetRecord> {
        DeskStore::insert_price_preset(self, p)
    }

    fn price_preset(&self, id: EntityId) -> DeskResult<Option<PricePresetRecord>> {
        DeskStore::price_preset(self, id)
    }

    fn price_presets(&self, blogger_id: Option<EntityId>) -> DeskResult<Vec<PricePresetRecord>> {
        DeskStore::price_presets(self, blogger_id)
    }

    fn save_price_preset(&self, p: &PricePresetRecord) -> DeskResult<()> {
        DeskStore::save_price_preset(self, p)
    }

    fn delete_price_preset(&self, id: EntityId) -> DeskResult<()> {
        DeskStore::delete_price_preset(self, id)
    }

    fn insert_comment(&self, c: &NewComment, created_on: NaiveDate) -> DeskResult<CommentRecord> {
        DeskStore::insert_comment(self, c, created_on)
    }

    fn comments(&self, filter: &CommentFilter) -> DeskResult<Vec<CommentRecord>> {
        DeskStore::comments(self, filter)
    }

    fn insert_campaign(&self, c: &NewCampaign) -> DeskResult<CampaignRecord> {
        DeskStore::insert_campaign(self, c)
    }

    fn campaign(&self, id: EntityId) -> DeskResult<Option<CampaignRecord>> {
        DeskStore::campaign(self, id)
    }

    fn campaigns(&self, filter: &CampaignFilter) -> DeskResult<Vec<CampaignRecord>> {
        DeskStore::campaigns(self, filter)
    }

    fn save_campaign(&self, c: &CampaignRecord) -> DeskResult<()> {
        DeskStore::save_campaign(self, c)
    }

    fn insert_placement(&self, p: &NewPlacement, recorded_on: NaiveDate) -> DeskResult<PlacementRecord> {
        DeskStore::insert_placement(self, p, recorded_on)
    }

    fn placement(&self, id: EntityId) -> DeskResult<Option<PlacementRecord>> {
        DeskStore::placement(self, id)
    }

    fn placements(&self, filter: &PlacementFilter) -> DeskResult<Vec<PlacementRecord>> {
        DeskStore::placements(self, filter)
    }

    fn save_placement(&self, p: &PlacementRecord, events: &[EventLogEntry]) -> DeskResult<()> {
        DeskStore::save_placement(self, p, events)
    }

    fn delete_placement(&self, id: EntityId, events: &[EventLogEntry]) -> DeskResult<()> {
        DeskStore::delete_placement(self, id, events)
    }

    fn mark_overdue(&self, ids: &[EntityId], events: &[EventLogEntry]) -> DeskResult<usize> {
        DeskStore::mark_overdue(self, ids, events)
    }

    fn append_event(&self, entry: &EventLogEntry) -> DeskResult<()> {
        DeskStore::append_event(self, entry)
    }

    fn events_for_placement(&self, placement_id: EntityId) -> DeskResult<Vec<EventLogEntry>> {
        DeskStore::events_for_placement(self, placement_id)
    }
}
