//! Durable intent records for employee delete cascades.
//!
//! # Responsibility
//! - Record that a cascade started before any counterpart is touched.
//! - Expose unfinished cascades so they can be re-run.
//!
//! # Invariants
//! - At most one open intent exists per employee; opening again reuses it.
//! - An intent is completed only after the employee document is gone.

use crate::model::EntityId;
use crate::repo::document_store::{StoreError, StoreResult};
use crate::repo::sqlite_store::SqliteDocumentStore;
use rusqlite::{params, OptionalExtension};
use uuid::Uuid;

/// Stable identifier of one cascade intent.
pub type IntentId = Uuid;

/// One recorded cascade.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CascadeIntent {
    pub intent_id: IntentId,
    pub employee_id: EntityId,
    /// Epoch milliseconds.
    pub created_at: i64,
}

/// Journal of delete cascades.
pub trait CascadeJournal {
    /// Opens an intent for `employee_id`, or returns the one still pending.
    fn open_intent(&self, employee_id: EntityId) -> StoreResult<CascadeIntent>;
    /// Marks an intent as finished.
    fn complete_intent(&self, intent_id: IntentId) -> StoreResult<()>;
    /// Lists unfinished intents, oldest first.
    fn pending_intents(&self) -> StoreResult<Vec<CascadeIntent>>;
}

impl CascadeJournal for SqliteDocumentStore<'_> {
    fn open_intent(&self, employee_id: EntityId) -> StoreResult<CascadeIntent> {
        let conn = self.conn();
        let existing: Option<(String, i64)> = conn
            .query_row(
                "SELECT intent_uuid, created_at
                 FROM cascade_journal
                 WHERE employee_id = ?1
                   AND completed_at IS NULL
                 ORDER BY created_at ASC
                 LIMIT 1;",
                [employee_id],
                |row| Ok((row.get(0)?, row.get(1)?)),
            )
            .optional()?;

        if let Some((uuid_text, created_at)) = existing {
            return Ok(CascadeIntent {
                intent_id: parse_intent_id(&uuid_text)?,
                employee_id,
                created_at,
            });
        }

        let intent_id = Uuid::new_v4();
        conn.execute(
            "INSERT INTO cascade_journal (intent_uuid, employee_id) VALUES (?1, ?2);",
            params![intent_id.to_string(), employee_id],
        )?;
        let created_at: i64 = conn.query_row(
            "SELECT created_at FROM cascade_journal WHERE intent_uuid = ?1;",
            [intent_id.to_string()],
            |row| row.get(0),
        )?;

        Ok(CascadeIntent {
            intent_id,
            employee_id,
            created_at,
        })
    }

    fn complete_intent(&self, intent_id: IntentId) -> StoreResult<()> {
        let changed = self.conn().execute(
            "UPDATE cascade_journal
             SET completed_at = (strftime('%s', 'now') * 1000)
             WHERE intent_uuid = ?1
               AND completed_at IS NULL;",
            [intent_id.to_string()],
        )?;
        if changed == 0 {
            return Err(StoreError::UnknownIntent(intent_id));
        }
        Ok(())
    }

    fn pending_intents(&self) -> StoreResult<Vec<CascadeIntent>> {
        let mut stmt = self.conn().prepare(
            "SELECT intent_uuid, employee_id, created_at
             FROM cascade_journal
             WHERE completed_at IS NULL
             ORDER BY created_at ASC, intent_uuid ASC;",
        )?;
        let mut rows = stmt.query([])?;
        let mut intents = Vec::new();
        while let Some(row) = rows.next()? {
            let uuid_text: String = row.get("intent_uuid")?;
            intents.push(CascadeIntent {
                intent_id: parse_intent_id(&uuid_text)?,
                employee_id: row.get("employee_id")?,
                created_at: row.get("created_at")?,
            });
        }
        Ok(intents)
    }
}

fn parse_intent_id(value: &str) -> StoreResult<IntentId> {
    Uuid::parse_str(value).map_err(|_| {
        StoreError::InvalidData(format!(
            "invalid uuid value `{value}` in cascade_journal.intent_uuid"
        ))
    })
}
