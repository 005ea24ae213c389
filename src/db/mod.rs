//! Database module for Agora.
//!
//! This module provides SQLite database connectivity and migration management.

mod schema;
mod user;
mod user_repository;

pub use schema::MIGRATIONS;
pub use user::{NewUser, User};
pub use user_repository::UserRepository;

use std::path::Path;

use rusqlite::{Connection, Transaction};
use tracing::{debug, info};

use crate::Result;

/// Database wrapper for managing SQLite connections and migrations.
pub struct Database {
    conn: Connection,
}

impl Database {
    /// Open a database connection at the specified path.
    ///
    /// If the database file doesn't exist, it will be created.
    /// Migrations are automatically applied.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        info!("Opening database at {:?}", path);

        // Create parent directories if they don't exist
        if let Some(parent) = path.parent() {
            if !parent.exists() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let conn = Connection::open(path)?;
        Self::configure_connection(&conn)?;

        let mut db = Self { conn };
        db.migrate()?;

        Ok(db)
    }

    /// Open an in-memory database for testing.
    pub fn open_in_memory() -> Result<Self> {
        debug!("Opening in-memory database");
        let conn = Connection::open_in_memory()?;
        Self::configure_connection(&conn)?;

        let mut db = Self { conn };
        db.migrate()?;

        Ok(db)
    }

    /// Configure the connection with recommended settings.
    fn configure_connection(conn: &Connection) -> Result<()> {
        // Enable foreign key constraints
        conn.execute_batch("PRAGMA foreign_keys = ON")?;
        // journal_mode returns the mode as a result, so we use query_row
        let _: String = conn.query_row("PRAGMA journal_mode = WAL", [], |row| row.get(0))?;
        // Set busy timeout to 5 seconds (returns timeout value, so use query_row)
        let _: i64 = conn.query_row("PRAGMA busy_timeout = 5000", [], |row| row.get(0))?;
        Ok(())
    }

    /// Get a reference to the underlying connection.
    pub fn conn(&self) -> &Connection {
        &self.conn
    }

    /// Begin a new transaction.
    pub fn transaction(&mut self) -> Result<Transaction<'_>> {
        Ok(self.conn.transaction()?)
    }

    /// Get the current schema version.
    pub fn schema_version(&self) -> Result<i64> {
        // Check if schema_version table exists
        let table_exists: bool = self.conn.query_row(
            "SELECT EXISTS(SELECT 1 FROM sqlite_master WHERE type='table' AND name='schema_version')",
            [],
            |row| row.get(0),
        )?;

        if !table_exists {
            return Ok(0);
        }

        let version: i64 = self
            .conn
            .query_row(
                "SELECT COALESCE(MAX(version), 0) FROM schema_version",
                [],
                |row| row.get(0),
            )
            .unwrap_or(0);

        Ok(version)
    }

    /// Apply pending migrations.
    pub fn migrate(&mut self) -> Result<()> {
        let current_version = self.schema_version()?;
        let migrations = MIGRATIONS;

        if current_version as usize >= migrations.len() {
            debug!("Database is up to date (version {})", current_version);
            return Ok(());
        }

        info!(
            "Migrating database from version {} to {}",
            current_version,
            migrations.len()
        );

        // Ensure schema_version table exists
        self.conn.execute(
            "CREATE TABLE IF NOT EXISTS schema_version (
                version     INTEGER PRIMARY KEY,
                applied_at  TEXT NOT NULL DEFAULT (datetime('now'))
            )",
            [],
        )?;

        // Apply each pending migration in a transaction
        for (i, migration) in migrations.iter().enumerate().skip(current_version as usize) {
            let version = (i + 1) as i64;
            info!("Applying migration v{}", version);

            let tx = self.conn.transaction()?;

            tx.execute_batch(migration)?;
            tx.execute("INSERT INTO schema_version (version) VALUES (?)", [version])?;

            tx.commit()?;
            debug!("Migration v{} applied successfully", version);
        }

        info!(
            "Database migration complete (now at version {})",
            migrations.len()
        );
        Ok(())
    }

    /// Check if a table exists.
    pub fn table_exists(&self, table_name: &str) -> Result<bool> {
        let exists: bool = self.conn.query_row(
            "SELECT EXISTS(SELECT 1 FROM sqlite_master WHERE type='table' AND name=?)",
            [table_name],
            |row| row.get(0),
        )?;
        Ok(exists)
    }
}

impl std::fmt::Debug for Database {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Database").finish()
    }
}
