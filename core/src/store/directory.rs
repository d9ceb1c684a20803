use super::{count, to_sql_count, DeskStore};
use crate::{
    error::DeskResult,
    model::{BloggerRecord, CounterpartyRecord, NewBlogger, NewCounterparty, NewUser, UserRecord},
    types::EntityId,
};
use rusqlite::{params, OptionalExtension};

const BLOGGER_COLUMNS: &str =
    "id, name, url, network, subscribers, avg_reach, contact_type, contact_value";

fn blogger_row_mapper(row: &rusqlite::Row<'_>) -> rusqlite::Result<BloggerRecord> {
    Ok(BloggerRecord {
        id: row.get(0)?,
        name: row.get(1)?,
        url: row.get(2)?,
        network: row.get(3)?,
        subscribers: count(row, 4)?,
        avg_reach: count(row, 5)?,
        contact_type: row.get(6)?,
        contact_value: row.get(7)?,
    })
}

const COUNTERPARTY_COLUMNS: &str =
    "id, name, kind, tax_id, relationship_type, payment_details, notes";

fn counterparty_row_mapper(row: &rusqlite::Row<'_>) -> rusqlite::Result<CounterpartyRecord> {
    Ok(CounterpartyRecord {
        id: row.get(0)?,
        name: row.get(1)?,
        kind: row.get(2)?,
        tax_id: row.get(3)?,
        relationship_type: row.get(4)?,
        payment_details: row.get(5)?,
        notes: row.get(6)?,
    })
}

fn user_row_mapper(row: &rusqlite::Row<'_>) -> rusqlite::Result<UserRecord> {
    Ok(UserRecord {
        id: row.get(0)?,
        name: row.get(1)?,
        email: row.get(2)?,
        role: row.get(3)?,
        status: row.get(4)?,
    })
}

impl DeskStore {
    // ── Blogger ────────────────────────────────────────────────────

    pub fn insert_blogger(&self, b: &NewBlogger) -> DeskResult<BloggerRecord> {
        self.conn.execute(
            "INSERT INTO blogger (
                name, url, network, subscribers, avg_reach, contact_type, contact_value
             ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                &b.name,
                &b.url,
                b.network,
                to_sql_count(b.subscribers)?,
                to_sql_count(b.avg_reach)?,
                b.contact_type,
                b.contact_value.as_deref(),
            ],
        )?;
        Ok(BloggerRecord {
            id: self.conn.last_insert_rowid(),
            name: b.name.clone(),
            url: b.url.clone(),
            network: b.network,
            subscribers: b.subscribers,
            avg_reach: b.avg_reach,
            contact_type: b.contact_type,
            contact_value: b.contact_value.clone(),
        })
    }

    pub fn blogger(&self, id: EntityId) -> DeskResult<Option<BloggerRecord>> {
        self.conn
            .query_row(
                &format!("SELECT {BLOGGER_COLUMNS} FROM blogger WHERE id = ?1"),
                params![id],
                blogger_row_mapper,
            )
            .optional()
            .map_err(Into::into)
    }

    pub fn blogger_by_url(&self, url: &str) -> DeskResult<Option<BloggerRecord>> {
        self.conn
            .query_row(
                &format!("SELECT {BLOGGER_COLUMNS} FROM blogger WHERE url = ?1"),
                params![url],
                blogger_row_mapper,
            )
            .optional()
            .map_err(Into::into)
    }

    pub fn bloggers(&self) -> DeskResult<Vec<BloggerRecord>> {
        let mut stmt = self
            .conn
            .prepare(&format!("SELECT {BLOGGER_COLUMNS} FROM blogger ORDER BY id DESC"))?;
        let rows = stmt.query_map([], blogger_row_mapper)?;
        rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
    }

    // ── Counterparty ───────────────────────────────────────────────

    pub fn insert_counterparty(&self, c: &NewCounterparty) -> DeskResult<CounterpartyRecord> {
        self.conn.execute(
            "INSERT INTO counterparty (
                name, kind, tax_id, relationship_type, payment_details, notes
             ) VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                &c.name,
                c.kind,
                c.tax_id.as_deref(),
                c.relationship_type,
                c.payment_details.as_deref(),
                c.notes.as_deref(),
            ],
        )?;
        Ok(CounterpartyRecord {
            id: self.conn.last_insert_rowid(),
            name: c.name.clone(),
            kind: c.kind,
            tax_id: c.tax_id.clone(),
            relationship_type: c.relationship_type,
            payment_details: c.payment_details.clone(),
            notes: c.notes.clone(),
        })
    }

    pub fn counterparty(&self, id: EntityId) -> DeskResult<Option<CounterpartyRecord>> {
        self.conn
            .query_row(
                &format!("SELECT {COUNTERPARTY_COLUMNS} FROM counterparty WHERE id = ?1"),
                params![id],
                counterparty_row_mapper,
            )
            .optional()
            .map_err(Into::into)
    }

    pub fn counterparties(&self) -> DeskResult<Vec<CounterpartyRecord>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {COUNTERPARTY_COLUMNS} FROM counterparty ORDER BY id DESC"
        ))?;
        let rows = stmt.query_map([], counterparty_row_mapper)?;
        rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
    }

    // ── Blogger ↔ counterparty links ──────────────────────────────

    pub fn replace_blogger_counterparties(
        &self,
        blogger_id: EntityId,
        counterparty_ids: &[EntityId],
    ) -> DeskResult<()> {
        let tx = self.conn.unchecked_transaction()?;
        tx.execute(
            "DELETE FROM blogger_counterparty WHERE blogger_id = ?1",
            params![blogger_id],
        )?;
        {
            let mut stmt = tx.prepare(
                "INSERT OR IGNORE INTO blogger_counterparty (blogger_id, counterparty_id)
                 VALUES (?1, ?2)",
            )?;
            for id in counterparty_ids {
                stmt.execute(params![blogger_id, id])?;
            }
        }
        tx.commit()?;
        Ok(())
    }

    pub fn blogger_counterparty_ids(&self, blogger_id: EntityId) -> DeskResult<Vec<EntityId>> {
        let mut stmt = self.conn.prepare(
            "SELECT counterparty_id FROM blogger_counterparty
             WHERE blogger_id = ?1 ORDER BY counterparty_id ASC",
        )?;
        let rows = stmt.query_map(params![blogger_id], |row| row.get(0))?;
        rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
    }

    // ── User ───────────────────────────────────────────────────────

    pub fn insert_user(&self, u: &NewUser) -> DeskResult<UserRecord> {
        let status = crate::catalog::UserStatus::Invited;
        self.conn.execute(
            "INSERT INTO app_user (name, email, role, status) VALUES (?1, ?2, ?3, ?4)",
            params![&u.name, &u.email, u.role, status],
        )?;
        Ok(UserRecord {
            id: self.conn.last_insert_rowid(),
            name: u.name.clone(),
            email: u.email.clone(),
            role: u.role,
            status,
        })
    }

    pub fn user(&self, id: EntityId) -> DeskResult<Option<UserRecord>> {
        self.conn
            .query_row(
                "SELECT id, name, email, role, status FROM app_user WHERE id = ?1",
                params![id],
                user_row_mapper,
            )
            .optional()
            .map_err(Into::into)
    }

    pub fn user_by_email(&self, email: &str) -> DeskResult<Option<UserRecord>> {
        self.conn
            .query_row(
                "SELECT id, name, email, role, status FROM app_user WHERE email = ?1",
                params![email],
                user_row_mapper,
            )
            .optional()
            .map_err(Into::into)
    }

    pub fn users(&self) -> DeskResult<Vec<UserRecord>> {
        let mut stmt = self
            .conn
            .prepare("SELECT id, name, email, role, status FROM app_user ORDER BY id ASC")?;
        let rows = stmt.query_map([], user_row_mapper)?;
        rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
    }

    pub fn save_user(&self, u: &UserRecord) -> DeskResult<()> {
        self.conn.execute(
            "UPDATE app_user SET name = ?1, role = ?2, status = ?3 WHERE id = ?4",
            params![&u.name, u.role, u.status, u.id],
        )?;
        Ok(())
    }
}
