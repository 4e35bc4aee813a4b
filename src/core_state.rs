//! Shared application state for the HTTP server.
//!
//! `CoreState` is wrapped in `Arc` at startup and handed to every handler.
//! Handlers open their own SQLite connection per request inside
//! `spawn_blocking`; the state only holds paths, configuration and the
//! in-memory audit buffer.

use std::path::PathBuf;
use std::sync::{Arc, Mutex, MutexGuard};

use crate::config::{AppConfig, ImportConfig};
use crate::db;
use crate::models::AuditLog;
use crate::pipeline::import::{AuditSink, ImportTables, WorkbookReader};

// ═══════════════════════════════════════════════════════════
// CoreState
// ═══════════════════════════════════════════════════════════

pub struct CoreState {
    /// SQLite database holding patients and the audit trail.
    pub db_path: PathBuf,
    pub import: ImportConfig,
    tables: Arc<ImportTables>,
    audit: AuditLogger,
    /// Held for the whole of a persisting import.
    import_lock: Mutex<()>,
}

impl CoreState {
    pub fn new(db_path: PathBuf, import: ImportConfig, tables: ImportTables) -> Self {
        Self {
            db_path,
            import,
            tables: Arc::new(tables),
            audit: AuditLogger::new(),
            import_lock: Mutex::new(()),
        }
    }

    /// State for the clinic workbook layout.
    pub fn from_config(config: &AppConfig) -> Self {
        Self::new(
            config.db_path.clone(),
            config.import.clone(),
            ImportTables::standard(),
        )
    }

    /// Open a connection to the configured database, running migrations.
    pub fn open_db(&self) -> Result<rusqlite::Connection, CoreError> {
        db::open_database(&self.db_path).map_err(CoreError::Database)
    }

    pub fn reader(&self) -> WorkbookReader {
        WorkbookReader::new(Arc::clone(&self.tables))
    }

    /// Serialize persisting imports within this process. Batches and the
    /// shared audit buffer of one upload never interleave with another's.
    /// A poisoned lock is taken over: it guards no data.
    pub fn lock_imports(&self) -> MutexGuard<'_, ()> {
        self.import_lock
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn audit(&self) -> &AuditLogger {
        &self.audit
    }

    /// Write buffered audit entries. Failures are logged and the entries
    /// dropped: the audit trail never fails the operation it describes.
    pub fn flush_audit(&self, conn: &rusqlite::Connection) {
        if let Err(e) = self.audit.flush_to_db(conn) {
            tracing::warn!("Audit flush failed: {e}");
        }
    }
}

// ═══════════════════════════════════════════════════════════
// Error types
// ═══════════════════════════════════════════════════════════

/// Errors from CoreState operations.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Database error: {0}")]
    Database(#[from] db::DatabaseError),
    #[error("Background task failed: {0}")]
    TaskJoin(String),
}

// ═══════════════════════════════════════════════════════════
// Audit logger
// ═══════════════════════════════════════════════════════════

/// In-memory audit log buffer. Entries are flushed to SQLite on
/// explicit flush, after each import.
pub struct AuditLogger {
    buffer: Mutex<Vec<AuditLog>>,
}

impl AuditLogger {
    pub fn new() -> Self {
        Self {
            buffer: Mutex::new(Vec::new()),
        }
    }

    /// Get all buffered entries (for testing or manual flush).
    pub fn entries(&self) -> Vec<AuditLog> {
        self.buffer
            .lock()
            .map(|buf| buf.clone())
            .unwrap_or_default()
    }

    /// Drain all buffered entries (for flush to SQLite).
    pub fn drain(&self) -> Vec<AuditLog> {
        self.buffer
            .lock()
            .map(|mut buf| buf.drain(..).collect())
            .unwrap_or_default()
    }

    /// Current buffer size.
    pub fn buffer_len(&self) -> usize {
        self.buffer.lock().map(|buf| buf.len()).unwrap_or(0)
    }

    /// Flush buffered entries to SQLite in one transaction.
    pub fn flush_to_db(&self, conn: &rusqlite::Connection) -> Result<usize, CoreError> {
        let entries = self.drain();
        if entries.is_empty() {
            return Ok(0);
        }

        let tx = conn
            .unchecked_transaction()
            .map_err(|e| CoreError::Database(db::DatabaseError::Sqlite(e)))?;
        db::repository::insert_audit_entries(&tx, &entries)?;
        tx.commit()
            .map_err(|e| CoreError::Database(db::DatabaseError::Sqlite(e)))?;

        let count = entries.len();
        tracing::debug!(count, "Flushed audit entries to database");
        Ok(count)
    }
}

impl AuditSink for AuditLogger {
    fn record(&self, entry: AuditLog) {
        match self.buffer.lock() {
            Ok(mut buf) => buf.push(entry),
            Err(_) => tracing::error!(
                entity = %entry.entity,
                action = %entry.action,
                "Audit buffer poisoned, entry dropped"
            ),
        }
    }
}

impl Default for AuditLogger {
    fn default() -> Self {
        Self::new()
    }
}

// ═══════════════════════════════════════════════════════════
// Tests
// ═══════════════════════════════════════════════════════════
