use super::DeskStore;
use crate::{
    error::DeskResult,
    model::{CampaignFilter, CampaignRecord, NewCampaign},
    types::EntityId,
};
use rusqlite::{params, OptionalExtension};

// Helper function for mapping campaign rows
fn campaign_row_mapper(row: &rusqlite::Row<'_>) -> rusqlite::Result<CampaignRecord> {
    Ok(CampaignRecord {
        id: row.get(0)?,
        name: row.get(1)?,
        product: row.get(2)?,
        goal_type: row.get(3)?,
        budget: row.get(4)?,
        status: row.get(5)?,
        start_date: row.get(6)?,
        end_date: row.get(7)?,
    })
}

impl DeskStore {
    // ── Campaign ───────────────────────────────────────────────────

    pub fn insert_campaign(&self, c: &NewCampaign) -> DeskResult<CampaignRecord> {
        let status = c.status.unwrap_or_default();
        self.conn.execute(
            "INSERT INTO campaign (
                name, product, goal_type, budget, status, start_date, end_date
             ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                &c.name,
                c.product.as_deref(),
                c.goal_type,
                c.budget,
                status,
                c.start_date,
                c.end_date,
            ],
        )?;
        Ok(CampaignRecord {
            id: self.conn.last_insert_rowid(),
            name: c.name.clone(),
            product: c.product.clone(),
            goal_type: c.goal_type,
            budget: c.budget,
            status,
            start_date: c.start_date,
            end_date: c.end_date,
        })
    }

    pub fn campaign(&self, id: EntityId) -> DeskResult<Option<CampaignRecord>> {
        self.conn
            .query_row(
                "SELECT id, name, product, goal_type, budget, status, start_date, end_date
                 FROM campaign WHERE id = ?1",
                params![id],
                campaign_row_mapper,
            )
            .optional()
            .map_err(Into::into)
    }

    pub fn campaigns(&self, filter: &CampaignFilter) -> DeskResult<Vec<CampaignRecord>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, name, product, goal_type, budget, status, start_date, end_date
             FROM campaign
             WHERE (?1 IS NULL OR status = ?1)
               AND (?2 IS NULL OR product = ?2)
             ORDER BY id DESC",
        )?;
        let rows = stmt.query_map(
            params![filter.status, filter.product.as_deref()],
            campaign_row_mapper,
        )?;
        rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
    }

    pub fn save_campaign(&self, c: &CampaignRecord) -> DeskResult<()> {
        self.conn.execute(
            "UPDATE campaign SET name = ?1, product = ?2, goal_type = ?3, budget = ?4,
                    status = ?5, start_date = ?6, end_date = ?7
             WHERE id = ?8",
            params![
                &c.name,
                c.product.as_deref(),
                c.goal_type,
                c.budget,
                c.status,
                c.start_date,
                c.end_date,
                c.id,
            ],
        )?;
        Ok(())
    }
}
