//! SQLite-backed local document store
//!
//! Stores each document as a JSON body in a single table. Updates run inside
//! one immediate transaction, which is what makes combined set+append updates
//! atomic across connections and processes.

use std::path::Path;
use std::sync::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use chrono::Utc;
use log::debug;
use rusqlite::{Connection, OptionalExtension, TransactionBehavior, params};

use super::{Document, DocumentStore, Fields, Query, Update};
use crate::error::{Result, StoreError};

/// Schema version, stored in `user_version`
const SCHEMA_VERSION: i32 = 1;

/// Length of generated document ids
const ID_LEN: usize = 20;

const ID_ALPHABET: &[u8] = b"0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz";

static ID_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Local document store in a single SQLite file
pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    /// Open or create a store at `path`, creating parent directories.
    pub fn open(path: &Path) -> std::result::Result<Self, StoreError> {
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent).map_err(|e| {
                StoreError::Database(format!("Failed to create store directory: {}", e))
            })?;
        }
        let conn = Connection::open(path)?;
        Self::init(conn)
    }

    /// Open a throwaway in-memory store (for testing)
    #[cfg(test)]
    pub fn open_in_memory() -> std::result::Result<Self, StoreError> {
        Self::init(Connection::open_in_memory()?)
    }

    fn init(conn: Connection) -> std::result::Result<Self, StoreError> {
        let version: i32 = conn
            .pragma_query_value(None, "user_version", |r| r.get(0))
            .unwrap_or(0);
        if version != 0 && version != SCHEMA_VERSION {
            return Err(StoreError::Database(format!(
                "Unsupported store schema version {} (expected {})",
                version, SCHEMA_VERSION
            )));
        }

        conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS documents (
                collection TEXT NOT NULL,
                id TEXT NOT NULL,
                body TEXT NOT NULL,
                created_at INTEGER NOT NULL,
                PRIMARY KEY (collection, id)
            );
            "#,
        )?;
        conn.pragma_update(None, "user_version", SCHEMA_VERSION)?;
        conn.busy_timeout(std::time::Duration::from_secs(5))?;

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn lock(&self) -> std::result::Result<std::sync::MutexGuard<'_, Connection>, StoreError> {
        self.conn
            .lock()
            .map_err(|_| StoreError::Database("Store connection lock poisoned".to_string()))
    }
}

/// Generate a 20-character alphanumeric document id.
fn generate_id() -> String {
    let nanos = Utc::now().timestamp_nanos_opt().unwrap_or_default() as u64;
    let count = ID_COUNTER.fetch_add(1, Ordering::Relaxed);
    // splitmix64 over time and counter, refreshed per character
    let mut state = nanos ^ count.wrapping_mul(0x9E37_79B9_7F4A_7C15);
    let mut id = String::with_capacity(ID_LEN);
    for _ in 0..ID_LEN {
        state = state.wrapping_add(0x9E37_79B9_7F4A_7C15);
        let mut z = state;
        z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
        z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
        z ^= z >> 31;
        id.push(ID_ALPHABET[(z % ID_ALPHABET.len() as u64) as usize] as char);
    }
    id
}

fn parse_body(id: &str, body: &str) -> std::result::Result<Fields, StoreError> {
    serde_json::from_str(body).map_err(|e| {
        StoreError::InvalidResponse(format!("Corrupt document {}: {}", id, e))
    })
}

#[async_trait]
impl DocumentStore for SqliteStore {
    async fn list(&self, collection: &str, query: &Query) -> Result<Vec<Document>> {
        debug!("sqlite: list {} ({:?})", collection, query);
        let conn = self.lock()?;
        let mut stmt = conn
            .prepare("SELECT id, body FROM documents WHERE collection = ?1 ORDER BY created_at, id")
            .map_err(StoreError::from)?;
        let rows = stmt
            .query_map(params![collection], |row| {
                Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
            })
            .map_err(StoreError::from)?;

        let mut docs = Vec::new();
        for row in rows {
            let (id, body) = row.map_err(StoreError::from)?;
            let fields = parse_body(&id, &body)?;
            if query.matches(&fields) {
                docs.push(Document { id, fields });
            }
        }
        query.sort(&mut docs);
        Ok(docs)
    }

    async fn get(&self, collection: &str, id: &str) -> Result<Option<Document>> {
        debug!("sqlite: get {}/{}", collection, id);
        let conn = self.lock()?;
        let body: Option<String> = conn
            .query_row(
                "SELECT body FROM documents WHERE collection = ?1 AND id = ?2",
                params![collection, id],
                |row| row.get(0),
            )
            .optional()
            .map_err(StoreError::from)?;

        match body {
            Some(body) => Ok(Some(Document {
                id: id.to_string(),
                fields: parse_body(id, &body)?,
            })),
            None => Ok(None),
        }
    }

    async fn create(&self, collection: &str, fields: Fields) -> Result<String> {
        let id = generate_id();
        debug!("sqlite: create {}/{}", collection, id);
        let body = serde_json::to_string(&fields)?;
        let conn = self.lock()?;
        conn.execute(
            "INSERT INTO documents (collection, id, body, created_at) VALUES (?1, ?2, ?3, ?4)",
            params![collection, id, body, Utc::now().timestamp_millis()],
        )
        .map_err(StoreError::from)?;
        Ok(id)
    }

    async fn update(&self, collection: &str, id: &str, update: &Update) -> Result<()> {
        debug!("sqlite: update {}/{} ({} ops)", collection, id, update.ops.len());
        let mut conn = self.lock()?;
        let tx = conn
            .transaction_with_behavior(TransactionBehavior::Immediate)
            .map_err(StoreError::from)?;

        let body: Option<String> = tx
            .query_row(
                "SELECT body FROM documents WHERE collection = ?1 AND id = ?2",
                params![collection, id],
                |row| row.get(0),
            )
            .optional()
            .map_err(StoreError::from)?;
        let body = body.ok_or_else(|| StoreError::NotFound(format!("{}/{}", collection, id)))?;

        let mut fields = parse_body(id, &body)?;
        update.apply_to(&mut fields);
        let body = serde_json::to_string(&fields)?;

        tx.execute(
            "UPDATE documents SET body = ?3 WHERE collection = ?1 AND id = ?2",
            params![collection, id, body],
        )
        .map_err(StoreError::from)?;
        tx.commit().map_err(StoreError::from)?;
        Ok(())
    }
}
