//! Thread repository for Agora.
//!
//! Typed view over the shared posts table restricted to parentless
//! records. Every query here composes the parent_id IS NULL restriction
//! unless the caller explicitly opts into seeing replies.

use rusqlite::{params, Connection, Row};

use super::post_repository::POST_COLUMNS;
use super::scope::{compose_where, FindOptions, DEFAULT_THREAD_ORDER};
use super::thread::{NewThread, Thread, ThreadUpdate};
use crate::{AgoraError, Result};

/// Repository for thread CRUD operations and finders.
pub struct ThreadRepository<'a> {
    conn: &'a Connection,
}

impl<'a> ThreadRepository<'a> {
    /// Create a new ThreadRepository with the given connection reference.
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    /// Insert a new thread row.
    ///
    /// The slug must already be assigned; validation and the after-save
    /// hooks are the consistency manager's job. Returns the created
    /// thread with the assigned ID.
    pub fn create(&self, new_thread: &NewThread, slug: &str) -> Result<Thread> {
        self.conn.execute(
            "INSERT INTO posts (category_id, user_id, title, slug, message)
             VALUES (?, ?, ?, ?, ?)",
            params![
                new_thread.category_id,
                new_thread.user_id,
                &new_thread.title,
                slug,
                &new_thread.message,
            ],
        )?;

        let id = self.conn.last_insert_rowid();
        self.get_by_id(id)?
            .ok_or_else(|| AgoraError::NotFound("thread".to_string()))
    }

    /// Get a thread by ID.
    ///
    /// Returns None for missing ids and for ids that belong to replies.
    pub fn get_by_id(&self, id: i64) -> Result<Option<Thread>> {
        let sql = format!("SELECT {POST_COLUMNS} FROM posts WHERE id = ? AND parent_id IS NULL");
        let result = self.conn.query_row(&sql, [id], row_to_thread);

        match result {
            Ok(thread) => Ok(Some(thread)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Update a thread by ID.
    ///
    /// Only fields that are set in the update will be modified; the
    /// modification timestamp is always touched. Returns the updated
    /// thread, or None if not found.
    pub fn update(&self, id: i64, update: &ThreadUpdate) -> Result<Option<Thread>> {
        if update.is_empty() {
            return self.get_by_id(id);
        }

        let mut fields = Vec::new();
        let mut values: Vec<Box<dyn rusqlite::ToSql>> = Vec::new();

        if let Some(ref title) = update.title {
            fields.push("title = ?");
            values.push(Box::new(title.clone()));
        }
        if let Some(ref message) = update.message {
            fields.push("message = ?");
            values.push(Box::new(message.clone()));
        }
        if let Some(category_id) = update.category_id {
            fields.push("category_id = ?");
            values.push(Box::new(category_id));
        }
        if let Some(is_sticky) = update.is_sticky {
            fields.push("is_sticky = ?");
            values.push(Box::new(is_sticky));
        }
        if let Some(is_locked) = update.is_locked {
            fields.push("is_locked = ?");
            values.push(Box::new(is_locked));
        }
        if let Some(is_visible) = update.is_visible {
            fields.push("is_visible = ?");
            values.push(Box::new(is_visible));
        }
        fields.push("modified_at = datetime('now')");

        let sql = format!(
            "UPDATE posts SET {} WHERE id = ? AND parent_id IS NULL",
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

    /// Point a thread's last-reply reference at a post.
    ///
    /// Single-field write used by the after-save hooks; a freshly created
    /// thread points at itself.
    pub fn set_last_reply(&self, id: i64, last_reply_id: i64) -> Result<()> {
        self.conn.execute(
            "UPDATE posts SET
                last_reply_id = ?2,
                last_reply_created = (SELECT created_at FROM posts WHERE id = ?2)
             WHERE id = ?1 AND parent_id IS NULL",
            params![id, last_reply_id],
        )?;
        Ok(())
    }

    /// Recompute a thread's reply-derived fields from the live reply set.
    ///
    /// replies_count is the live count; the last-reply reference points
    /// at the most recent reply, or back at the thread itself when no
    /// replies remain.
    pub fn refresh_reply_counters(&self, id: i64) -> Result<()> {
        self.conn.execute(
            "UPDATE posts SET
                replies_count = (SELECT COUNT(*) FROM posts r WHERE r.parent_id = ?1),
                last_reply_id = COALESCE(
                    (SELECT id FROM posts r WHERE r.parent_id = ?1 ORDER BY id DESC LIMIT 1),
                    ?1
                ),
                last_reply_created = COALESCE(
                    (SELECT created_at FROM posts r WHERE r.parent_id = ?1 ORDER BY id DESC LIMIT 1),
                    created_at
                )
             WHERE id = ?1 AND parent_id IS NULL",
            [id],
        )?;
        Ok(())
    }

    /// Delete a thread row by ID.
    ///
    /// Returns true if a thread was deleted, false if not found. The
    /// cascade to replies, reports and likes is the consistency
    /// manager's job.
    pub fn delete(&self, id: i64) -> Result<bool> {
        let affected = self.conn.execute(
            "DELETE FROM posts WHERE id = ? AND parent_id IS NULL",
            [id],
        )?;
        Ok(affected > 0)
    }

    /// List threads in a category, sticky first, then most recent
    /// activity first.
    pub fn list_by_category(&self, category_id: i64, options: &FindOptions) -> Result<Vec<Thread>> {
        let thread_only = if options.include_replies {
            None
        } else {
            Some("parent_id IS NULL")
        };
        let sql = format!(
            "SELECT {POST_COLUMNS} FROM posts{} GROUP BY id ORDER BY {DEFAULT_THREAD_ORDER}",
            compose_where(&[
                Some("category_id = ?"),
                thread_only,
                options.scope.visibility_clause(),
            ])
        );
        let mut stmt = self.conn.prepare(&sql)?;

        let threads = stmt
            .query_map([category_id], row_to_thread)?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        Ok(threads)
    }

    /// List threads a user has started or participated in.
    pub fn list_by_user(&self, user_id: i64, options: &FindOptions) -> Result<Vec<Thread>> {
        let sql = format!(
            "SELECT {POST_COLUMNS} FROM posts{} GROUP BY id ORDER BY {DEFAULT_THREAD_ORDER}",
            compose_where(&[
                Some("parent_id IS NULL"),
                Some(
                    "(user_id = ?1 OR EXISTS (
                        SELECT 1 FROM posts r WHERE r.parent_id = posts.id AND r.user_id = ?1
                    ))"
                ),
                options.scope.visibility_clause(),
            ])
        );
        let mut stmt = self.conn.prepare(&sql)?;

        let threads = stmt
            .query_map([user_id], row_to_thread)?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        Ok(threads)
    }
}

/// Convert a database row to a Thread struct.
///
/// Nullable columns of the shared table are defaulted so that reply rows
/// surfaced through the include-replies escape hatch still map.
fn row_to_thread(row: &Row<'_>) -> rusqlite::Result<Thread> {
    let id: i64 = row.get(0)?;
    let created_at: String = row.get(15)?;
    Ok(Thread {
        id,
        category_id: row.get(1)?,
        user_id: row.get(2)?,
        title: row.get::<_, Option<String>>(4)?.unwrap_or_default(),
        slug: row.get::<_, Option<String>>(5)?.unwrap_or_default(),
        message: row.get(6)?,
        is_sticky: row.get(7)?,
        is_locked: row.get(8)?,
        is_visible: row.get(9)?,
        replies_count: row.get(10)?,
        reports_count: row.get(11)?,
        likes_count: row.get(12)?,
        last_reply_id: row.get::<_, Option<i64>>(13)?.unwrap_or(id),
        last_reply_created: row
            .get::<_, Option<String>>(14)?
            .unwrap_or_else(|| created_at.clone()),
        created_at,
        modified_at: row.get(16)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::Database;
    use crate::forum::scope::Scope;

    fn setup_db() -> Database {
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
        db
    }

    fn create_thread(db: &Database, title: &str, slug: &str) -> Thread {
        let repo = ThreadRepository::new(db.conn());
        repo.create(&NewThread::new(1, 1, title, "message"), slug)
            .unwrap()
    }

    fn insert_reply(db: &Database, thread_id: i64, user_id: i64) -> i64 {
        db.conn()
            .execute(
                "INSERT INTO posts (category_id, user_id, parent_id, message)
                 VALUES (1, ?, ?, 'r')",
                params![user_id, thread_id],
            )
            .unwrap();
        db.conn().last_insert_rowid()
    }

    #[test]
    fn test_create_thread() {
        let db = setup_db();
        let thread = create_thread(&db, "Test Thread", "test-thread");

        assert_eq!(thread.category_id, 1);
        assert_eq!(thread.title, "Test Thread");
        assert_eq!(thread.slug, "test-thread");
        assert_eq!(thread.replies_count, 0);
        assert!(!thread.is_sticky);
        assert!(thread.is_visible);
    }

    #[test]
    fn test_get_by_id_excludes_replies() {
        let db = setup_db();
        let thread = create_thread(&db, "T", "t");
        let reply_id = insert_reply(&db, thread.id, 2);

        let repo = ThreadRepository::new(db.conn());
        assert!(repo.get_by_id(thread.id).unwrap().is_some());
        // A reply id never resolves through the thread view
        assert!(repo.get_by_id(reply_id).unwrap().is_none());
        assert!(repo.get_by_id(999).unwrap().is_none());
    }

    #[test]
    fn test_update_thread() {
        let db = setup_db();
        let thread = create_thread(&db, "Original", "original");

        let repo = ThreadRepository::new(db.conn());
        let updated = repo
            .update(thread.id, &ThreadUpdate::new().title("Updated").sticky(true))
            .unwrap()
            .unwrap();

        assert_eq!(updated.title, "Updated");
        assert!(updated.is_sticky);
    }

    #[test]
    fn test_update_empty() {
        let db = setup_db();
        let thread = create_thread(&db, "T", "t");

        let repo = ThreadRepository::new(db.conn());
        let result = repo.update(thread.id, &ThreadUpdate::new()).unwrap();
        assert_eq!(result.unwrap().title, "T");
    }

    #[test]
    fn test_update_nonexistent_thread() {
        let db = setup_db();
        let repo = ThreadRepository::new(db.conn());

        let result = repo.update(999, &ThreadUpdate::new().title("X")).unwrap();
        assert!(result.is_none());
    }

    #[test]
    fn test_set_last_reply_self_reference() {
        let db = setup_db();
        let thread = create_thread(&db, "T", "t");

        let repo = ThreadRepository::new(db.conn());
        repo.set_last_reply(thread.id, thread.id).unwrap();

        let thread = repo.get_by_id(thread.id).unwrap().unwrap();
        assert_eq!(thread.last_reply_id, thread.id);
        assert_eq!(thread.last_reply_created, thread.created_at);
    }

    #[test]
    fn test_refresh_reply_counters() {
        let db = setup_db();
        let thread = create_thread(&db, "T", "t");
        let repo = ThreadRepository::new(db.conn());
        repo.set_last_reply(thread.id, thread.id).unwrap();

        let r1 = insert_reply(&db, thread.id, 2);
        let r2 = insert_reply(&db, thread.id, 2);
        repo.refresh_reply_counters(thread.id).unwrap();

        let thread = repo.get_by_id(thread.id).unwrap().unwrap();
        assert_eq!(thread.replies_count, 2);
        assert_eq!(thread.last_reply_id, r2);
        assert_ne!(thread.last_reply_id, r1);

        // Removing all replies points the thread back at itself
        db.conn()
            .execute("DELETE FROM posts WHERE parent_id = ?", [thread.id])
            .unwrap();
        repo.refresh_reply_counters(thread.id).unwrap();

        let thread = repo.get_by_id(thread.id).unwrap().unwrap();
        assert_eq!(thread.replies_count, 0);
        assert_eq!(thread.last_reply_id, thread.id);
    }

    #[test]
    fn test_delete_thread() {
        let db = setup_db();
        let thread = create_thread(&db, "T", "t");

        let repo = ThreadRepository::new(db.conn());
        assert!(repo.delete(thread.id).unwrap());
        assert!(repo.get_by_id(thread.id).unwrap().is_none());
        assert!(!repo.delete(thread.id).unwrap());
    }

    #[test]
    fn test_list_by_category_excludes_replies_by_default() {
        let db = setup_db();
        let thread = create_thread(&db, "T", "t");
        insert_reply(&db, thread.id, 2);

        let repo = ThreadRepository::new(db.conn());
        let threads = repo.list_by_category(1, &FindOptions::public()).unwrap();
        assert_eq!(threads.len(), 1);
        assert_eq!(threads[0].id, thread.id);

        let all = repo
            .list_by_category(1, &FindOptions::admin().include_replies())
            .unwrap();
        assert_eq!(all.len(), 2);
    }

    #[test]
    fn test_list_by_category_visibility() {
        let db = setup_db();
        create_thread(&db, "Visible", "visible");
        let hidden = create_thread(&db, "Hidden", "hidden");

        let repo = ThreadRepository::new(db.conn());
        repo.update(hidden.id, &ThreadUpdate::new().visible(false))
            .unwrap();

        let public = repo.list_by_category(1, &FindOptions::public()).unwrap();
        assert_eq!(public.len(), 1);
        assert_eq!(public[0].title, "Visible");

        let admin = repo.list_by_category(1, &FindOptions::admin()).unwrap();
        assert_eq!(admin.len(), 2);
    }

    #[test]
    fn test_list_by_category_ordering() {
        let db = setup_db();
        let repo = ThreadRepository::new(db.conn());

        let a = create_thread(&db, "A", "a");
        let b = create_thread(&db, "B", "b");
        let c = create_thread(&db, "C", "c");

        // B is sticky with the oldest activity; C has the most recent
        db.conn()
            .execute(
                "UPDATE posts SET is_sticky = 1, last_reply_created = '2024-01-01 00:00:00' WHERE id = ?",
                [b.id],
            )
            .unwrap();
        db.conn()
            .execute(
                "UPDATE posts SET last_reply_created = '2024-01-02 00:00:00' WHERE id = ?",
                [a.id],
            )
            .unwrap();
        db.conn()
            .execute(
                "UPDATE posts SET last_reply_created = '2024-01-03 00:00:00' WHERE id = ?",
                [c.id],
            )
            .unwrap();

        let threads = repo.list_by_category(1, &FindOptions::public()).unwrap();
        let ids: Vec<i64> = threads.iter().map(|t| t.id).collect();
        assert_eq!(ids, vec![b.id, c.id, a.id]);
    }

    #[test]
    fn test_list_by_user() {
        let db = setup_db();
        let repo = ThreadRepository::new(db.conn());

        // alice starts one thread; bob starts another; alice replies to bob's
        let by_alice = create_thread(&db, "Alice's", "alices");
        db.conn()
            .execute(
                "INSERT INTO posts (category_id, user_id, title, slug, message)
                 VALUES (1, 2, 'Bob''s', 'bobs', 'm')",
                [],
            )
            .unwrap();
        let by_bob = db.conn().last_insert_rowid();
        insert_reply(&db, by_bob, 1);

        let threads = repo.list_by_user(1, &FindOptions::public()).unwrap();
        let mut ids: Vec<i64> = threads.iter().map(|t| t.id).collect();
        ids.sort_unstable();
        assert_eq!(ids, vec![by_alice.id, by_bob]);

        // One row per thread even with multiple replies by the same user
        insert_reply(&db, by_bob, 1);
        let threads = repo.list_by_user(1, &FindOptions::public()).unwrap();
        assert_eq!(threads.len(), 2);
    }
}
