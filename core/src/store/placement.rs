use super::{count, insert_event, to_sql_count, DeskStore};
use crate::{
    catalog::PlacementStatus,
    error::DeskResult,
    event::{DeskEvent, EventLogEntry},
    model::{NewPlacement, PlacementFilter, PlacementRecord},
    types::EntityId,
};
use chrono::NaiveDate;
use rusqlite::{params, OptionalExtension};

const PLACEMENT_COLUMNS: &str =
    "id, campaign_id, blogger_id, counterparty_id, scheduled_date, status, fee,
     views, likes, comments, shares, engagement_rate, link, placement_type,
     pricing_model, payment_terms, tracking_link, ad_token";

// Helper function for mapping placement rows
fn placement_row_mapper(row: &rusqlite::Row<'_>) -> rusqlite::Result<PlacementRecord> {
    Ok(PlacementRecord {
        id: row.get(0)?,
        campaign_id: row.get(1)?,
        blogger_id: row.get(2)?,
        counterparty_id: row.get(3)?,
        scheduled_date: row.get(4)?,
        status: row.get(5)?,
        fee: row.get(6)?,
        views: count(row, 7)?,
        likes: count(row, 8)?,
        comments: count(row, 9)?,
        shares: count(row, 10)?,
        engagement_rate: row.get(11)?,
        link: row.get(12)?,
        placement_type: row.get(13)?,
        pricing_model: row.get(14)?,
        payment_terms: row.get(15)?,
        tracking_link: row.get(16)?,
        ad_token: row.get(17)?,
    })
}

impl DeskStore {
    // ── Placement ──────────────────────────────────────────────────

    pub fn insert_placement(
        &self,
        p: &NewPlacement,
        recorded_on: NaiveDate,
    ) -> DeskResult<PlacementRecord> {
        let tx = self.conn.unchecked_transaction()?;
        tx.execute(
            "INSERT INTO placement (
                campaign_id, blogger_id, counterparty_id, scheduled_date, status, fee,
                views, likes, comments, shares, engagement_rate, link, placement_type,
                pricing_model, payment_terms, tracking_link, ad_token
             ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16, ?17)",
            params![
                p.campaign_id,
                p.blogger_id,
                p.counterparty_id,
                p.scheduled_date,
                p.status.unwrap_or_default(),
                p.fee,
                to_sql_count(p.views)?,
                to_sql_count(p.likes)?,
                to_sql_count(p.comments)?,
                to_sql_count(p.shares)?,
                p.engagement_rate,
                p.link.as_deref(),
                p.placement_type,
                p.pricing_model,
                p.payment_terms,
                p.tracking_link.as_deref(),
                p.ad_token.as_deref(),
            ],
        )?;
        let record = p.to_record(tx.last_insert_rowid());
        let entry = EventLogEntry::new(recorded_on, &DeskEvent::placement_created(&record))?;
        insert_event(&tx, &entry)?;
        tx.commit()?;
        Ok(record)
    }

    pub fn placement(&self, id: EntityId) -> DeskResult<Option<PlacementRecord>> {
        self.conn
            .query_row(
                &format!("SELECT {PLACEMENT_COLUMNS} FROM placement WHERE id = ?1"),
                params![id],
                placement_row_mapper,
            )
            .optional()
            .map_err(Into::into)
    }

    pub fn placements(&self, filter: &PlacementFilter) -> DeskResult<Vec<PlacementRecord>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {PLACEMENT_COLUMNS} FROM placement
             WHERE (?1 IS NULL OR status = ?1)
               AND (?2 IS NULL OR campaign_id = ?2)
             ORDER BY id DESC"
        ))?;
        let rows = stmt.query_map(
            params![filter.status, filter.campaign_id],
            placement_row_mapper,
        )?;
        rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
    }

    pub fn save_placement(&self, p: &PlacementRecord, events: &[EventLogEntry]) -> DeskResult<()> {
        let tx = self.conn.unchecked_transaction()?;
        tx.execute(
            "UPDATE placement SET
                blogger_id = ?1, counterparty_id = ?2, scheduled_date = ?3, status = ?4,
                fee = ?5, views = ?6, likes = ?7, comments = ?8, shares = ?9,
                engagement_rate = ?10, link = ?11, placement_type = ?12,
                pricing_model = ?13, payment_terms = ?14, tracking_link = ?15,
                ad_token = ?16
             WHERE id = ?17",
            params![
                p.blogger_id,
                p.counterparty_id,
                p.scheduled_date,
                p.status,
                p.fee,
                to_sql_count(p.views)?,
                to_sql_count(p.likes)?,
                to_sql_count(p.comments)?,
                to_sql_count(p.shares)?,
                p.engagement_rate,
                p.link.as_deref(),
                p.placement_type,
                p.pricing_model,
                p.payment_terms,
                p.tracking_link.as_deref(),
                p.ad_token.as_deref(),
                p.id,
            ],
        )?;
        for entry in events {
            insert_event(&tx, entry)?;
        }
        tx.commit()?;
        Ok(())
    }

    pub fn delete_placement(&self, id: EntityId, events: &[EventLogEntry]) -> DeskResult<()> {
        let tx = self.conn.unchecked_transaction()?;
        tx.execute("DELETE FROM placement WHERE id = ?1", params![id])?;
        for entry in events {
            insert_event(&tx, entry)?;
        }
        tx.commit()?;
        Ok(())
    }

    /// All-or-nothing: every listed row is marked and every event appended,
    /// or nothing is written.
    pub fn mark_overdue(&self, ids: &[EntityId], events: &[EventLogEntry]) -> DeskResult<usize> {
        if ids.is_empty() {
            return Ok(0);
        }
        let tx = self.conn.unchecked_transaction()?;
        let mut written = 0;
        {
            let mut stmt = tx.prepare("UPDATE placement SET status = ?1 WHERE id = ?2")?;
            for id in ids {
                written += stmt.execute(params![PlacementStatus::Overdue, id])?;
            }
        }
        for entry in events {
            insert_event(&tx, entry)?;
        }
        tx.commit()?;
        Ok(written)
    }
}
