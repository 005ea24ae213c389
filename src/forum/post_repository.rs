//! Post repository for Agora.
//!
//! Raw access to the shared posts table, without the thread/reply
//! discrimination the typed repositories apply. This is the layer that
//! sees threads and replies as one record type.

use rusqlite::{Connection, Row};

use super::post::Post;
use crate::Result;

pub(crate) const POST_COLUMNS: &str = "id, category_id, user_id, parent_id, title, slug, message,
     is_sticky, is_locked, is_visible, replies_count, reports_count, likes_count,
     last_reply_id, last_reply_created, created_at, modified_at";

/// Repository for raw post access across threads and replies.
pub struct PostRepository<'a> {
    conn: &'a Connection,
}

impl<'a> PostRepository<'a> {
    /// Create a new PostRepository with the given connection reference.
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    /// Get a post by ID, thread or reply alike.
    pub fn get_by_id(&self, id: i64) -> Result<Option<Post>> {
        let sql = format!("SELECT {POST_COLUMNS} FROM posts WHERE id = ?");
        let result = self.conn.query_row(&sql, [id], row_to_post);

        match result {
            Ok(post) => Ok(Some(post)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// The most recently created post (thread or reply) in a category,
    /// or None when the category has no posts.
    pub fn latest_in_category(&self, category_id: i64) -> Result<Option<Post>> {
        let sql =
            format!("SELECT {POST_COLUMNS} FROM posts WHERE category_id = ? ORDER BY id DESC LIMIT 1");
        let result = self.conn.query_row(&sql, [category_id], row_to_post);

        match result {
            Ok(post) => Ok(Some(post)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Delete a post row by ID.
    ///
    /// Returns true if a post was deleted, false if not found. The caller
    /// is responsible for cascading dependents and refreshing counters.
    pub fn delete(&self, id: i64) -> Result<bool> {
        let affected = self.conn.execute("DELETE FROM posts WHERE id = ?", [id])?;
        Ok(affected > 0)
    }
}

/// Convert a database row to a Post struct.
pub(crate) fn row_to_post(row: &Row<'_>) -> rusqlite::Result<Post> {
    Ok(Post {
        id: row.get(0)?,
        category_id: row.get(1)?,
        user_id: row.get(2)?,
        parent_id: row.get(3)?,
        title: row.get(4)?,
        slug: row.get(5)?,
        message: row.get(6)?,
        is_sticky: row.get(7)?,
        is_locked: row.get(8)?,
        is_visible: row.get(9)?,
        replies_count: row.get(10)?,
        reports_count: row.get(11)?,
        likes_count: row.get(12)?,
        last_reply_id: row.get(13)?,
        last_reply_created: row.get(14)?,
        created_at: row.get(15)?,
        modified_at: row.get(16)?,
    })
}
