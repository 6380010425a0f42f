//! SQLite-backed document store.
//!
//! # Responsibility
//! - Persist documents as JSON bodies keyed by `(collection, id)`.
//! - Issue ids from a store-native counter.
//!
//! # Invariants
//! - Ids are issued inside one immediate transaction and never reused, even
//!   after the document that held them is deleted.
//! - Decoded documents must carry the id of the row they were read from.

use crate::model::{Document, EntityId, EntityKind};
use crate::repo::document_store::{
    DocumentStore, StoreError, StoreResult, Versioned, DEFAULT_WRITE_ATTEMPTS,
};
use crate::repo::field_path::{field_matches, parse_field_path};
use log::debug;
use rusqlite::{params, Connection, OptionalExtension, Transaction, TransactionBehavior};
use serde_json::Value;

const REQUIRED_TABLES: [&str; 3] = ["documents", "id_counters", "cascade_journal"];

/// Document store over a migrated SQLite connection.
pub struct SqliteDocumentStore<'conn> {
    conn: &'conn Connection,
    write_attempts: u32,
}

impl<'conn> SqliteDocumentStore<'conn> {
    /// Constructs a store from a migrated/ready connection.
    pub fn try_new(conn: &'conn Connection) -> StoreResult<Self> {
        ensure_store_connection_ready(conn)?;
        Ok(Self {
            conn,
            write_attempts: DEFAULT_WRITE_ATTEMPTS,
        })
    }

    /// Overrides compare-and-set attempts. Values below one are raised to one.
    pub fn with_write_attempts(mut self, attempts: u32) -> Self {
        self.write_attempts = attempts.max(1);
        self
    }

    pub(crate) fn conn(&self) -> &'conn Connection {
        self.conn
    }
}

impl DocumentStore for SqliteDocumentStore<'_> {
    fn load<D: Document>(&self, id: EntityId) -> StoreResult<Option<Versioned<D>>> {
        let row: Option<(i64, String)> = self
            .conn
            .query_row(
                "SELECT version, body
                 FROM documents
                 WHERE collection = ?1
                   AND id = ?2;",
                params![D::KIND.collection(), id],
                |row| Ok((row.get("version")?, row.get("body")?)),
            )
            .optional()?;

        let Some((version, body)) = row else {
            return Ok(None);
        };
        let document = decode_body::<D>(id, &body)?;
        Ok(Some(Versioned {
            document,
            version: parse_version(D::KIND, id, version)?,
        }))
    }

    fn find_all<D: Document>(&self) -> StoreResult<Vec<D>> {
        let mut documents = Vec::new();
        for (id, body) in self.collection_rows(D::KIND)? {
            documents.push(decode_body::<D>(id, &body)?);
        }
        Ok(documents)
    }

    fn find_by_field<D: Document>(&self, field: &str, value: EntityId) -> StoreResult<Vec<D>> {
        let segments =
            parse_field_path(field).ok_or_else(|| StoreError::InvalidFieldPath(field.to_string()))?;

        let mut documents = Vec::new();
        for (id, body) in self.collection_rows(D::KIND)? {
            let raw: Value = serde_json::from_str(&body).map_err(|source| {
                StoreError::Serialization {
                    kind: D::KIND,
                    source,
                }
            })?;
            if field_matches(&raw, &segments, value) {
                documents.push(decode_value::<D>(id, raw)?);
            }
        }
        Ok(documents)
    }

    fn upsert<D: Document>(&self, document: &D) -> StoreResult<u64> {
        let id = checked_id::<D>(document)?;
        let body = encode_body(document)?;
        self.conn.execute(
            "INSERT INTO documents (collection, id, version, body)
             VALUES (?1, ?2, 1, ?3)
             ON CONFLICT (collection, id) DO UPDATE SET
                body = excluded.body,
                version = documents.version + 1,
                updated_at = (strftime('%s', 'now') * 1000);",
            params![D::KIND.collection(), id, body],
        )?;
        let version: i64 = self.conn.query_row(
            "SELECT version FROM documents WHERE collection = ?1 AND id = ?2;",
            params![D::KIND.collection(), id],
            |row| row.get(0),
        )?;
        debug!(
            "event=store_upsert module=repo status=ok kind={} id={} version={}",
            D::KIND,
            id,
            version
        );
        parse_version(D::KIND, id, version)
    }

    fn replace<D: Document>(&self, document: &D, expected_version: u64) -> StoreResult<u64> {
        let id = checked_id::<D>(document)?;
        let body = encode_body(document)?;
        let expected = i64::try_from(expected_version).map_err(|_| {
            StoreError::InvalidData(format!("version {expected_version} exceeds storage range"))
        })?;

        let changed = self.conn.execute(
            "UPDATE documents
             SET
                body = ?3,
                version = version + 1,
                updated_at = (strftime('%s', 'now') * 1000)
             WHERE collection = ?1
               AND id = ?2
               AND version = ?4;",
            params![D::KIND.collection(), id, body, expected],
        )?;

        if changed == 0 {
            return Err(StoreError::Conflict {
                kind: D::KIND,
                id,
                expected_version,
            });
        }
        Ok(expected_version + 1)
    }

    fn delete<D: Document>(&self, id: EntityId) -> StoreResult<bool> {
        let changed = self.conn.execute(
            "DELETE FROM documents WHERE collection = ?1 AND id = ?2;",
            params![D::KIND.collection(), id],
        )?;
        Ok(changed > 0)
    }

    fn next_id(&self, kind: EntityKind) -> StoreResult<EntityId> {
        let collection = kind.collection();
        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)?;
        tx.execute(
            "INSERT OR IGNORE INTO id_counters (collection, value) VALUES (?1, 0);",
            [collection],
        )?;
        // Documents written with explicit ids still push the counter forward.
        tx.execute(
            "UPDATE id_counters
             SET value = MAX(
                value,
                (SELECT COALESCE(MAX(id), 0) FROM documents WHERE collection = ?1)
             ) + 1
             WHERE collection = ?1;",
            [collection],
        )?;
        let issued: EntityId = tx.query_row(
            "SELECT value FROM id_counters WHERE collection = ?1;",
            [collection],
            |row| row.get(0),
        )?;
        tx.commit()?;
        Ok(issued)
    }

    fn write_attempts(&self) -> u32 {
        self.write_attempts
    }
}

impl SqliteDocumentStore<'_> {
    fn collection_rows(&self, kind: EntityKind) -> StoreResult<Vec<(EntityId, String)>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, body
             FROM documents
             WHERE collection = ?1
             ORDER BY id ASC;",
        )?;
        let mut rows = stmt.query([kind.collection()])?;
        let mut items = Vec::new();
        while let Some(row) = rows.next()? {
            items.push((row.get("id")?, row.get("body")?));
        }
        Ok(items)
    }
}

fn checked_id<D: Document>(document: &D) -> StoreResult<EntityId> {
    let id = document.id();
    if id <= 0 {
        return Err(StoreError::InvalidId { kind: D::KIND, id });
    }
    Ok(id)
}

fn encode_body<D: Document>(document: &D) -> StoreResult<String> {
    serde_json::to_string(document).map_err(|source| StoreError::Serialization {
        kind: D::KIND,
        source,
    })
}

fn decode_body<D: Document>(id: EntityId, body: &str) -> StoreResult<D> {
    let value: Value = serde_json::from_str(body).map_err(|source| StoreError::Serialization {
        kind: D::KIND,
        source,
    })?;
    decode_value(id, value)
}

fn decode_value<D: Document>(id: EntityId, value: Value) -> StoreResult<D> {
    let document: D = serde_json::from_value(value).map_err(|source| StoreError::Serialization {
        kind: D::KIND,
        source,
    })?;
    if document.id() != id {
        return Err(StoreError::InvalidData(format!(
            "{} row {id} holds body with id {}",
            D::KIND,
            document.id()
        )));
    }
    Ok(document)
}

fn parse_version(kind: EntityKind, id: EntityId, value: i64) -> StoreResult<u64> {
    u64::try_from(value).map_err(|_| {
        StoreError::InvalidData(format!("invalid version `{value}` for {kind} {id}"))
    })
}

fn ensure_store_connection_ready(conn: &Connection) -> StoreResult<()> {
    for table in REQUIRED_TABLES {
        if !table_exists(conn, table)? {
            return Err(StoreError::MissingRequiredTable(table));
        }
    }
    Ok(())
}

fn table_exists(conn: &Connection, table: &str) -> StoreResult<bool> {
    let exists: i64 = conn.query_row(
        "SELECT EXISTS(
            SELECT 1
            FROM sqlite_master
            WHERE type = 'table' AND name = ?1
        );",
        [table],
        |row| row.get(0),
    )?;
    Ok(exists == 1)
}
