use super::DeskStore;
use crate::{
    error::DeskResult,
    model::{CommentFilter, CommentRecord, NewComment},
};
use chrono::NaiveDate;
use rusqlite::params;

fn comment_row_mapper(row: &rusqlite::Row<'_>) -> rusqlite::Result<CommentRecord> {
    Ok(CommentRecord {
        id: row.get(0)?,
        body: row.get(1)?,
        author_id: row.get(2)?,
        blogger_id: row.get(3)?,
        counterparty_id: row.get(4)?,
        placement_id: row.get(5)?,
        created_on: row.get(6)?,
    })
}

impl DeskStore {
    // ── Comment ────────────────────────────────────────────────────

    pub fn insert_comment(&self, c: &NewComment, created_on: NaiveDate) -> DeskResult<CommentRecord> {
        self.conn.execute(
            "INSERT INTO comment (
                body, author_id, blogger_id, counterparty_id, placement_id, created_on
             ) VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                &c.body,
                c.author_id,
                c.blogger_id,
                c.counterparty_id,
                c.placement_id,
                created_on,
            ],
        )?;
        Ok(CommentRecord {
            id: self.conn.last_insert_rowid(),
            body: c.body.clone(),
            author_id: c.author_id,
            blogger_id: c.blogger_id,
            counterparty_id: c.counterparty_id,
            placement_id: c.placement_id,
            created_on,
        })
    }

    pub fn comments(&self, filter: &CommentFilter) -> DeskResult<Vec<CommentRecord>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, body, author_id, blogger_id, counterparty_id, placement_id, created_on
             FROM comment
             WHERE (?1 IS NULL OR blogger_id = ?1)
               AND (?2 IS NULL OR counterparty_id = ?2)
               AND (?3 IS NULL OR placement_id = ?3)
             ORDER BY id DESC",
        )?;
        let rows = stmt.query_map(
            params![filter.blogger_id, filter.counterparty_id, filter.placement_id],
            comment_row_mapper,
        )?;
        rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
    }
}
