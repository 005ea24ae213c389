//! Moderation records for Agora.
//!
//! Reports flag a post (thread or reply) for moderator attention; likes
//! record appreciation. Both feed derived counter caches on the post.

use rusqlite::{params, Connection, Row};

use crate::{AgoraError, Result};

/// Report entity: a flag raised against a post.
#[derive(Debug, Clone)]
pub struct Report {
    /// Unique report ID.
    pub id: i64,
    /// ID of the flagged post.
    pub post_id: i64,
    /// ID of the reporting user.
    pub user_id: i64,
    /// Report creation timestamp.
    pub created_at: String,
}

/// Like entity: a user's appreciation of a post.
#[derive(Debug, Clone)]
pub struct Like {
    /// Unique like ID.
    pub id: i64,
    /// ID of the liked post.
    pub post_id: i64,
    /// ID of the liking user.
    pub user_id: i64,
    /// Like creation timestamp.
    pub created_at: String,
}

/// Repository for report records.
pub struct ReportRepository<'a> {
    conn: &'a Connection,
}

impl<'a> ReportRepository<'a> {
    /// Create a new ReportRepository with the given connection reference.
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    /// Record a report against a post.
    pub fn create(&self, post_id: i64, user_id: i64) -> Result<Report> {
        self.conn.execute(
            "INSERT INTO reports (post_id, user_id) VALUES (?, ?)",
            params![post_id, user_id],
        )?;

        let id = self.conn.last_insert_rowid();
        self.get_by_id(id)?
            .ok_or_else(|| AgoraError::NotFound("report".to_string()))
    }

    /// Get a report by ID.
    pub fn get_by_id(&self, id: i64) -> Result<Option<Report>> {
        let result = self.conn.query_row(
            "SELECT id, post_id, user_id, created_at FROM reports WHERE id = ?",
            [id],
            row_to_report,
        );

        match result {
            Ok(report) => Ok(Some(report)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// List reports for a post.
    pub fn list_by_post(&self, post_id: i64) -> Result<Vec<Report>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, post_id, user_id, created_at FROM reports WHERE post_id = ? ORDER BY id",
        )?;

        let reports = stmt
            .query_map([post_id], row_to_report)?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        Ok(reports)
    }

    /// Delete all reports referencing a post. Returns the number deleted.
    pub fn delete_by_post(&self, post_id: i64) -> Result<usize> {
        let affected = self
            .conn
            .execute("DELETE FROM reports WHERE post_id = ?", [post_id])?;
        Ok(affected)
    }

    /// Recompute the derived reports_count on a post from the live set.
    pub fn refresh_count(&self, post_id: i64) -> Result<()> {
        self.conn.execute(
            "UPDATE posts
             SET reports_count = (SELECT COUNT(*) FROM reports WHERE post_id = ?1)
             WHERE id = ?1",
            [post_id],
        )?;
        Ok(())
    }
}

/// Repository for like records.
pub struct LikeRepository<'a> {
    conn: &'a Connection,
}

impl<'a> LikeRepository<'a> {
    /// Create a new LikeRepository with the given connection reference.
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    /// Record a like on a post.
    pub fn create(&self, post_id: i64, user_id: i64) -> Result<Like> {
        self.conn.execute(
            "INSERT INTO likes (post_id, user_id) VALUES (?, ?)",
            params![post_id, user_id],
        )?;

        let id = self.conn.last_insert_rowid();
        let result = self.conn.query_row(
            "SELECT id, post_id, user_id, created_at FROM likes WHERE id = ?",
            [id],
            row_to_like,
        );

        match result {
            Ok(like) => Ok(like),
            Err(e) => Err(e.into()),
        }
    }

    /// Check if a user has already liked a post.
    pub fn exists(&self, post_id: i64, user_id: i64) -> Result<bool> {
        let exists: bool = self.conn.query_row(
            "SELECT EXISTS(SELECT 1 FROM likes WHERE post_id = ? AND user_id = ?)",
            params![post_id, user_id],
            |row| row.get(0),
        )?;
        Ok(exists)
    }

    /// Remove a user's like from a post. Returns true if one was removed.
    pub fn delete(&self, post_id: i64, user_id: i64) -> Result<bool> {
        let affected = self.conn.execute(
            "DELETE FROM likes WHERE post_id = ? AND user_id = ?",
            params![post_id, user_id],
        )?;
        Ok(affected > 0)
    }

    /// Delete all likes referencing a post. Returns the number deleted.
    pub fn delete_by_post(&self, post_id: i64) -> Result<usize> {
        let affected = self
            .conn
            .execute("DELETE FROM likes WHERE post_id = ?", [post_id])?;
        Ok(affected)
    }

    /// Recompute the derived likes_count on a post from the live set.
    pub fn refresh_count(&self, post_id: i64) -> Result<()> {
        self.conn.execute(
            "UPDATE posts
             SET likes_count = (SELECT COUNT(*) FROM likes WHERE post_id = ?1)
             WHERE id = ?1",
            [post_id],
        )?;
        Ok(())
    }
}

fn row_to_report(row: &Row<'_>) -> rusqlite::Result<Report> {
    Ok(Report {
        id: row.get(0)?,
        post_id: row.get(1)?,
        user_id: row.get(2)?,
        created_at: row.get(3)?,
    })
}

fn row_to_like(row: &Row<'_>) -> rusqlite::Result<Like> {
    Ok(Like {
        id: row.get(0)?,
        post_id: row.get(1)?,
        user_id: row.get(2)?,
        created_at: row.get(3)?,
    })
}
