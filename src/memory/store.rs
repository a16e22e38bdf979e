//! Durable session storage.
//!
//! The trace memory itself is a plain in-process value; this module gives it
//! a persistence seam. [`SessionStore`] is the contract — get/set of
//! objective, note and the ordered trace, keyed by a session id — and
//! [`SqliteSessionStore`] implements it over SQLite. The core treats a store
//! purely as a value source/sink; connection lifecycle belongs to the caller.

use anyhow::{Context, Result};
use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;
use uuid::Uuid;

/// Embedding post-processing hook, applied once before a vector is stored.
/// Identity by default; inject a normalizer when the embedding model needs
/// one.
pub type NormalizeFn = fn(Vec<f32>) -> Vec<f32>;

fn identity_norm(vector: Vec<f32>) -> Vec<f32> {
    vector
}

/// Value source/sink for one agent session's objective, note and trace.
pub trait SessionStore {
    fn set_objective(&self, session: &str, objective: &str) -> Result<()>;
    fn objective(&self, session: &str) -> Result<Option<String>>;

    fn set_note(&self, session: &str, note: &str) -> Result<()>;
    fn note(&self, session: &str) -> Result<Option<String>>;

    /// Append one action description to the end of the session's trace.
    fn append_trace(&self, session: &str, description: &str) -> Result<()>;

    /// The full trace in insertion order.
    fn trace(&self, session: &str) -> Result<Vec<String>>;

    /// Drop every trace entry past the first `keep` (persistence side of a
    /// revert).
    fn truncate_trace(&self, session: &str, keep: usize) -> Result<()>;

    fn clear_trace(&self, session: &str) -> Result<()>;
}

/// SQLite-backed [`SessionStore`].
pub struct SqliteSessionStore {
    conn: Connection,
    normalize: NormalizeFn,
}

impl SqliteSessionStore {
    /// Open (or create) a store at `path`.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let conn = Connection::open(path.as_ref())
            .with_context(|| format!("Failed to open session store at {:?}", path.as_ref()))?;
        Self::with_connection(conn)
    }

    /// Fully in-memory store, mostly useful in tests.
    pub fn open_in_memory() -> Result<Self> {
        Self::with_connection(Connection::open_in_memory()?)
    }

    fn with_connection(conn: Connection) -> Result<Self> {
        conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS sessions (
                 id         TEXT PRIMARY KEY,
                 objective  TEXT NOT NULL DEFAULT 'N/A',
                 note       TEXT NOT NULL DEFAULT 'N/A',
                 updated_at TEXT NOT NULL
             );
             CREATE TABLE IF NOT EXISTS trace_entries (
                 session_id  TEXT NOT NULL,
                 seq         INTEGER NOT NULL,
                 description TEXT NOT NULL,
                 embedding   TEXT,
                 created_at  TEXT NOT NULL,
                 PRIMARY KEY (session_id, seq)
             );",
        )?;
        Ok(Self {
            conn,
            normalize: identity_norm,
        })
    }

    /// Replace the embedding post-processing hook.
    pub fn with_normalize(mut self, normalize: NormalizeFn) -> Self {
        self.normalize = normalize;
        self
    }

    /// Create a new session row and return its id.
    pub fn create_session(&self) -> Result<String> {
        let id = Uuid::new_v4().to_string();
        self.conn.execute(
            "INSERT INTO sessions (id, updated_at) VALUES (?1, ?2)",
            params![id, Utc::now().to_rfc3339()],
        )?;
        tracing::debug!(session = %id, "created session");
        Ok(id)
    }

    /// Append a trace entry together with its embedding vector. The
    /// normalize hook runs before serialization.
    pub fn append_trace_with_embedding(
        &self,
        session: &str,
        description: &str,
        embedding: Vec<f32>,
    ) -> Result<()> {
        let normalized = (self.normalize)(embedding);
        let serialized = serde_json::to_string(&normalized)?;
        self.insert_entry(session, description, Some(serialized))
    }

    /// Stored embeddings in trace order; `None` where an entry had none.
    pub fn trace_embeddings(&self, session: &str) -> Result<Vec<Option<Vec<f32>>>> {
        let mut stmt = self.conn.prepare(
            "SELECT embedding FROM trace_entries WHERE session_id = ?1 ORDER BY seq ASC",
        )?;
        let rows = stmt
            .query_map([session], |row| row.get::<_, Option<String>>(0))?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        rows.into_iter()
            .map(|raw| {
                raw.map(|json| serde_json::from_str(&json).context("corrupt embedding column"))
                    .transpose()
            })
            .collect()
    }

    fn insert_entry(
        &self,
        session: &str,
        description: &str,
        embedding: Option<String>,
    ) -> Result<()> {
        self.conn.execute(
            "INSERT INTO trace_entries (session_id, seq, description, embedding, created_at)
             VALUES (
                 ?1,
                 (SELECT COALESCE(MAX(seq) + 1, 0) FROM trace_entries WHERE session_id = ?1),
                 ?2, ?3, ?4
             )",
            params![session, description, embedding, Utc::now().to_rfc3339()],
        )?;
        Ok(())
    }

    fn set_session_field(&self, session: &str, field: &str, value: &str) -> Result<()> {
        // `field` is one of our own column names, never caller input.
        let sql = format!(
            "INSERT INTO sessions (id, {field}, updated_at) VALUES (?1, ?2, ?3)
             ON CONFLICT(id) DO UPDATE SET {field} = ?2, updated_at = ?3"
        );
        self.conn
            .execute(&sql, params![session, value, Utc::now().to_rfc3339()])?;
        Ok(())
    }

    fn session_field(&self, session: &str, field: &str) -> Result<Option<String>> {
        let sql = format!("SELECT {field} FROM sessions WHERE id = ?1");
        Ok(self
            .conn
            .query_row(&sql, [session], |row| row.get(0))
            .optional()?)
    }
}

impl SessionStore for SqliteSessionStore {
    fn set_objective(&self, session: &str, objective: &str) -> Result<()> {
        self.set_session_field(session, "objective", objective)
    }

    fn objective(&self, session: &str) -> Result<Option<String>> {
        self.session_field(session, "objective")
    }

    fn set_note(&self, session: &str, note: &str) -> Result<()> {
        self.set_session_field(session, "note", note)
    }

    fn note(&self, session: &str) -> Result<Option<String>> {
        self.session_field(session, "note")
    }

    fn append_trace(&self, session: &str, description: &str) -> Result<()> {
        self.insert_entry(session, description, None)
    }

    fn trace(&self, session: &str) -> Result<Vec<String>> {
        let mut stmt = self.conn.prepare(
            "SELECT description FROM trace_entries WHERE session_id = ?1 ORDER BY seq ASC",
        )?;
        let entries = stmt
            .query_map([session], |row| row.get(0))?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(entries)
    }

    fn truncate_trace(&self, session: &str, keep: usize) -> Result<()> {
        self.conn.execute(
            "DELETE FROM trace_entries WHERE session_id = ?1 AND seq NOT IN (
                 SELECT seq FROM trace_entries WHERE session_id = ?1
                 ORDER BY seq ASC LIMIT ?2
             )",
            params![session, keep],
        )?;
        Ok(())
    }

    fn clear_trace(&self, session: &str) -> Result<()> {
        self.conn.execute(
            "DELETE FROM trace_entries WHERE session_id = ?1",
            [session],
        )?;
        Ok(())
    }
}
