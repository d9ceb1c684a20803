use super::DeskStore;
use crate::{
    error::DeskResult,
    model::{NewPricePreset, PricePresetRecord},
    types::EntityId,
};
use rusqlite::{params, OptionalExtension};

fn preset_row_mapper(row: &rusqlite::Row<'_>) -> rusqlite::Result<PricePresetRecord> {
    Ok(PricePresetRecord {
        id: row.get(0)?,
        blogger_id: row.get(1)?,
        title: row.get(2)?,
        description: row.get(3)?,
        cost: row.get(4)?,
    })
}

impl DeskStore {
    // ── Price preset ───────────────────────────────────────────────

    pub fn insert_price_preset(&self, p: &NewPricePreset) -> DeskResult<PricePresetRecord> {
        self.conn.execute(
            "INSERT INTO price_preset (blogger_id, title, description, cost)
             VALUES (?1, ?2, ?3, ?4)",
            params![p.blogger_id, &p.title, p.description.as_deref(), p.cost],
        )?;
        Ok(PricePresetRecord {
            id: self.conn.last_insert_rowid(),
            blogger_id: p.blogger_id,
            title: p.title.clone(),
            description: p.description.clone(),
            cost: p.cost,
        })
    }

    pub fn price_preset(&self, id: EntityId) -> DeskResult<Option<PricePresetRecord>> {
        self.conn
            .query_row(
                "SELECT id, blogger_id, title, description, cost
                 FROM price_preset WHERE id = ?1",
                params![id],
                preset_row_mapper,
            )
            .optional()
            .map_err(Into::into)
    }

    pub fn price_presets(&self, blogger_id: Option<EntityId>) -> DeskResult<Vec<PricePresetRecord>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, blogger_id, title, description, cost
             FROM price_preset
             WHERE (?1 IS NULL OR blogger_id = ?1)
             ORDER BY id DESC",
        )?;
        let rows = stmt.query_map(params![blogger_id], preset_row_mapper)?;
        rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
    }

    pub fn save_price_preset(&self, p: &PricePresetRecord) -> DeskResult<()> {
        self.conn.execute(
            "UPDATE price_preset SET blogger_id = ?1, title = ?2, description = ?3, cost = ?4
             WHERE id = ?5",
            params![p.blogger_id, &p.title, p.description.as_deref(), p.cost, p.id],
        )?;
        Ok(())
    }

    pub fn delete_price_preset(&self, id: EntityId) -> DeskResult<()> {
        self.conn
            .execute("DELETE FROM price_preset WHERE id = ?1", params![id])?;
        Ok(())
    }
}
