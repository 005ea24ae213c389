//! Reply repository for Agora.
//!
//! Typed view over the shared posts table restricted to records with a
//! parent thread.

use rusqlite::{params, Connection, Row};

use super::reply::{NewReply, Reply, ReplyUpdate};
use super::scope::{compose_where, Scope};
use crate::{AgoraError, Result};

const REPLY_COLUMNS: &str = "id, category_id, user_id, parent_id, message, is_visible,
     reports_count, likes_count, created_at, modified_at";

/// Repository for reply CRUD operations.
pub struct ReplyRepository<'a> {
    conn: &'a Connection,
}

impl<'a> ReplyRepository<'a> {
    /// Create a new ReplyRepository with the given connection reference.
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    /// Insert a new reply row.
    ///
    /// The category is the parent thread's category, passed in by the
    /// consistency manager so the denormalized copy starts in sync.
    pub fn create(&self, new_reply: &NewReply, category_id: i64) -> Result<Reply> {
        self.conn.execute(
            "INSERT INTO posts (category_id, user_id, parent_id, message)
             VALUES (?, ?, ?, ?)",
            params![
                category_id,
                new_reply.user_id,
                new_reply.thread_id,
                &new_reply.message,
            ],
        )?;

        let id = self.conn.last_insert_rowid();
        self.get_by_id(id)?
            .ok_or_else(|| AgoraError::NotFound("reply".to_string()))
    }

    /// Get a reply by ID.
    ///
    /// Returns None for missing ids and for ids that belong to threads.
    pub fn get_by_id(&self, id: i64) -> Result<Option<Reply>> {
        let sql = format!("SELECT {REPLY_COLUMNS} FROM posts WHERE id = ? AND parent_id IS NOT NULL");
        let result = self.conn.query_row(&sql, [id], row_to_reply);

        match result {
            Ok(reply) => Ok(Some(reply)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Update a reply by ID.
    ///
    /// Only fields that are set in the update will be modified.
    /// Returns the updated reply, or None if not found.
    pub fn update(&self, id: i64, update: &ReplyUpdate) -> Result<Option<Reply>> {
        if update.is_empty() {
            return self.get_by_id(id);
        }

        let mut fields = Vec::new();
        let mut values: Vec<Box<dyn rusqlite::ToSql>> = Vec::new();

        if let Some(ref message) = update.message {
            fields.push("message = ?");
            values.push(Box::new(message.clone()));
        }
        if let Some(is_visible) = update.is_visible {
            fields.push("is_visible = ?");
            values.push(Box::new(is_visible));
        }
        fields.push("modified_at = datetime('now')");

        let sql = format!(
            "UPDATE posts SET {} WHERE id = ? AND parent_id IS NOT NULL",
            fields.join(", ")
        );
        values.push(Box::new(id));

        let params: Vec<&dyn rusqlite::ToSql> = values.iter().map(|v| v.as_ref()).collect();
        let affected = self.conn.execute(&sql, params.as_slice())?;

        if affected == 0 {
            return Ok(None);
        }

        self.get_by_id(id)
    }

    /// Move a reply to another category.
    ///
    /// Individual single-row save used by category propagation, so each
    /// propagated reply passes through its own save and hooks.
    pub fn set_category(&self, id: i64, category_id: i64) -> Result<Reply> {
        let affected = self.conn.execute(
            "UPDATE posts SET category_id = ?, modified_at = datetime('now')
             WHERE id = ? AND parent_id IS NOT NULL",
            params![category_id, id],
        )?;

        if affected == 0 {
            return Err(AgoraError::NotFound("reply".to_string()));
        }

        self.get_by_id(id)?
            .ok_or_else(|| AgoraError::NotFound("reply".to_string()))
    }

    /// Delete a reply row by ID.
    ///
    /// Returns true if a reply was deleted, false if not found. Reports,
    /// likes and counter refresh are the consistency manager's job.
    pub fn delete(&self, id: i64) -> Result<bool> {
        let affected = self.conn.execute(
            "DELETE FROM posts WHERE id = ? AND parent_id IS NOT NULL",
            [id],
        )?;
        Ok(affected > 0)
    }

    /// List replies of a thread in creation order.
    pub fn list_by_thread(&self, thread_id: i64, scope: Scope) -> Result<Vec<Reply>> {
        let sql = format!(
            "SELECT {REPLY_COLUMNS} FROM posts{} ORDER BY id",
            compose_where(&[Some("parent_id = ?"), scope.visibility_clause()])
        );
        let mut stmt = self.conn.prepare(&sql)?;

        let replies = stmt
            .query_map([thread_id], row_to_reply)?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        Ok(replies)
    }

    /// The first reply of a thread that has at least one report, if any.
    pub fn first_reported(&self, thread_id: i64) -> Result<Option<Reply>> {
        let sql = format!(
            "SELECT {REPLY_COLUMNS} FROM posts
             WHERE parent_id = ? AND reports_count > 0 ORDER BY id LIMIT 1"
        );
        let result = self.conn.query_row(&sql, [thread_id], row_to_reply);

        match result {
            Ok(reply) => Ok(Some(reply)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// A user's first reply in a thread, if any.
    pub fn first_by_thread_and_user(&self, thread_id: i64, user_id: i64) -> Result<Option<Reply>> {
        let sql = format!(
            "SELECT {REPLY_COLUMNS} FROM posts
             WHERE parent_id = ? AND user_id = ? ORDER BY id LIMIT 1"
        );
        let result = self
            .conn
            .query_row(&sql, params![thread_id, user_id], row_to_reply);

        match result {
            Ok(reply) => Ok(Some(reply)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }
}

/// Convert a database row to a Reply struct.
fn row_to_reply(row: &Row<'_>) -> rusqlite::Result<Reply> {
    Ok(Reply {
        id: row.get(0)?,
        category_id: row.get(1)?,
        user_id: row.get(2)?,
        parent_id: row.get(3)?,
        message: row.get(4)?,
        is_visible: row.get(5)?,
        reports_count: row.get(6)?,
        likes_count: row.get(7)?,
        created_at: row.get(8)?,
        modified_at: row.get(9)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::Database;

    fn setup_db() -> (Database, i64) {
        let db = Database::open_in_memory().unwrap();
        db.conn()
            .execute(
                "INSERT INTO categories (title, slug) VALUES ('General', 'general')",
                [],
            )
            .unwrap();
        db.conn()
            .execute("INSERT INTO users (username) VALUES ('alice')", [])
            .unwrap();
        db.conn()
            .execute("INSERT INTO users (username) VALUES ('bob')", [])
            .unwrap();
        db.conn()
            .execute(
                "INSERT INTO posts (category_id, user_id, title, slug, message)
                 VALUES (1, 1, 'T', 't', 'm')",
                [],
            )
            .unwrap();
        let thread_id = db.conn().last_insert_rowid();
        (db, thread_id)
    }

    #[test]
    fn test_create_reply() {
        let (db, thread_id) = setup_db();
        let repo = ReplyRepository::new(db.conn());

        let reply = repo.create(&NewReply::new(thread_id, 2, "Hello"), 1).unwrap();
        assert_eq!(reply.parent_id, thread_id);
        assert_eq!(reply.category_id, 1);
        assert_eq!(reply.user_id, 2);
        assert_eq!(reply.message, "Hello");
    }

    #[test]
    fn test_get_by_id_excludes_threads() {
        let (db, thread_id) = setup_db();
        let repo = ReplyRepository::new(db.conn());

        let reply = repo.create(&NewReply::new(thread_id, 2, "r"), 1).unwrap();
        assert!(repo.get_by_id(reply.id).unwrap().is_some());
        // A thread id never resolves through the reply view
        assert!(repo.get_by_id(thread_id).unwrap().is_none());
    }

    #[test]
    fn test_update_reply() {
        let (db, thread_id) = setup_db();
        let repo = ReplyRepository::new(db.conn());

        let reply = repo.create(&NewReply::new(thread_id, 2, "r"), 1).unwrap();
        let updated = repo
            .update(reply.id, &ReplyUpdate::new().message("edited"))
            .unwrap()
            .unwrap();
        assert_eq!(updated.message, "edited");
    }

    #[test]
    fn test_set_category() {
        let (db, thread_id) = setup_db();
        db.conn()
            .execute(
                "INSERT INTO categories (title, slug) VALUES ('Other', 'other')",
                [],
            )
            .unwrap();
        let repo = ReplyRepository::new(db.conn());

        let reply = repo.create(&NewReply::new(thread_id, 2, "r"), 1).unwrap();
        let moved = repo.set_category(reply.id, 2).unwrap();
        assert_eq!(moved.category_id, 2);
    }

    #[test]
    fn test_set_category_missing_reply() {
        let (db, _) = setup_db();
        let repo = ReplyRepository::new(db.conn());

        let result = repo.set_category(999, 1);
        assert!(matches!(result, Err(AgoraError::NotFound(_))));
    }

    #[test]
    fn test_delete_reply() {
        let (db, thread_id) = setup_db();
        let repo = ReplyRepository::new(db.conn());

        let reply = repo.create(&NewReply::new(thread_id, 2, "r"), 1).unwrap();
        assert!(repo.delete(reply.id).unwrap());
        assert!(!repo.delete(reply.id).unwrap());
        // Threads cannot be deleted through the reply view
        assert!(!repo.delete(thread_id).unwrap());
    }

    #[test]
    fn test_list_by_thread() {
        let (db, thread_id) = setup_db();
        let repo = ReplyRepository::new(db.conn());

        repo.create(&NewReply::new(thread_id, 1, "first"), 1).unwrap();
        repo.create(&NewReply::new(thread_id, 2, "second"), 1).unwrap();

        let replies = repo.list_by_thread(thread_id, Scope::Admin).unwrap();
        assert_eq!(replies.len(), 2);
        assert_eq!(replies[0].message, "first");
        assert_eq!(replies[1].message, "second");
    }

    #[test]
    fn test_list_by_thread_visibility() {
        let (db, thread_id) = setup_db();
        let repo = ReplyRepository::new(db.conn());

        let reply = repo.create(&NewReply::new(thread_id, 1, "r"), 1).unwrap();
        repo.update(reply.id, &ReplyUpdate::new().visible(false))
            .unwrap();

        assert!(repo.list_by_thread(thread_id, Scope::Public).unwrap().is_empty());
        assert_eq!(repo.list_by_thread(thread_id, Scope::Admin).unwrap().len(), 1);
    }

    #[test]
    fn test_first_reported() {
        let (db, thread_id) = setup_db();
        let repo = ReplyRepository::new(db.conn());

        let r1 = repo.create(&NewReply::new(thread_id, 1, "fine"), 1).unwrap();
        let r2 = repo.create(&NewReply::new(thread_id, 2, "bad"), 1).unwrap();
        assert!(repo.first_reported(thread_id).unwrap().is_none());

        db.conn()
            .execute("UPDATE posts SET reports_count = 1 WHERE id = ?", [r2.id])
            .unwrap();

        let reported = repo.first_reported(thread_id).unwrap().unwrap();
        assert_eq!(reported.id, r2.id);
        assert_ne!(reported.id, r1.id);
    }

    #[test]
    fn test_first_by_thread_and_user() {
        let (db, thread_id) = setup_db();
        let repo = ReplyRepository::new(db.conn());

        repo.create(&NewReply::new(thread_id, 1, "by alice"), 1).unwrap();
        let by_bob = repo.create(&NewReply::new(thread_id, 2, "by bob"), 1).unwrap();

        let found = repo.first_by_thread_and_user(thread_id, 2).unwrap().unwrap();
        assert_eq!(found.id, by_bob.id);

        assert!(repo.first_by_thread_and_user(thread_id, 999).unwrap().is_none());
    }
}
