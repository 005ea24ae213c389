//! Forum service for Agora.
//!
//! This is the consistency layer between the persistence layer and the
//! rest of the application: every create, update and delete of a thread
//! or reply runs through an explicit pipeline of validation, save and
//! after-save hooks so that derived fields (counter caches, last-reply
//! and last-post pointers, denormalized category references) stay
//! correct without callers having to remember to maintain them.

use rusqlite::Connection;
use tracing::{debug, info};

use crate::config::ForumConfig;
use crate::db::{Database, UserRepository};
use crate::{AgoraError, Result};

use super::category::{Category, NewCategory};
use super::category_repository::CategoryRepository;
use super::moderation::{Like, LikeRepository, Report, ReportRepository};
use super::post_repository::PostRepository;
use super::reply::{NewReply, Reply};
use super::reply_repository::ReplyRepository;
use super::scope::{FindOptions, Scope};
use super::slug;
use super::thread::{NewThread, Thread, ThreadListing, ThreadUpdate};
use super::thread_repository::ThreadRepository;

/// High-level forum operations with built-in consistency maintenance.
pub struct ForumService<'a> {
    db: &'a mut Database,
    config: ForumConfig,
}

impl<'a> ForumService<'a> {
    /// Create a new ForumService over the given database.
    ///
    /// The configuration is passed in explicitly; the service performs
    /// no ambient configuration lookup.
    pub fn new(db: &'a mut Database, config: ForumConfig) -> Self {
        Self { db, config }
    }

    // ── Categories ──────────────────────────────────────────────────────

    /// Create a category.
    pub fn create_category(&mut self, new_category: &NewCategory) -> Result<Category> {
        self.validate_title(&new_category.title)?;

        let category = CategoryRepository::new(self.db.conn()).create(new_category)?;
        info!("Created category {} ({})", category.id, category.title);
        Ok(category)
    }

    /// Get a category by ID within a scope.
    pub fn get_category(&self, id: i64, scope: Scope) -> Result<Category> {
        let category = CategoryRepository::new(self.db.conn())
            .get_by_id(id)?
            .ok_or_else(|| AgoraError::NotFound("category".to_string()))?;

        if !scope.is_admin() && !category.is_visible {
            return Err(AgoraError::NotFound("category".to_string()));
        }

        Ok(category)
    }

    /// List categories in display order within a scope.
    pub fn list_categories(&self, scope: Scope) -> Result<Vec<Category>> {
        CategoryRepository::new(self.db.conn()).list(scope)
    }

    // ── Threads ─────────────────────────────────────────────────────────

    /// Create a thread.
    ///
    /// Pipeline: validate, assign slug, insert, then the after-save hook
    /// points the thread's last-reply reference at itself and refreshes
    /// the category and user counter caches.
    pub fn create_thread(&mut self, new_thread: &NewThread) -> Result<Thread> {
        self.validate_title(&new_thread.title)?;
        self.validate_message(&new_thread.message)?;
        self.require_category(new_thread.category_id)?;
        self.require_user(new_thread.user_id)?;

        let maintain_user_counts = self.config.maintain_user_posts_count;
        let tx = self.db.transaction()?;
        let thread = {
            let threads = ThreadRepository::new(&tx);
            let slug = slug::unique_slug(&tx, new_thread.category_id, &new_thread.title)?;
            let thread = threads.create(new_thread, &slug)?;

            // A thread with no replies is its own latest activity. This is
            // a second write: the id is not known until after the insert.
            threads.set_last_reply(thread.id, thread.id)?;

            CategoryRepository::new(&tx).refresh_counters(thread.category_id)?;
            if maintain_user_counts {
                UserRepository::new(&tx).refresh_posts_count(thread.user_id)?;
            }

            threads
                .get_by_id(thread.id)?
                .ok_or_else(|| AgoraError::NotFound("thread".to_string()))?
        };
        tx.commit()?;

        info!(
            "Created thread {} ({}) in category {}",
            thread.id, thread.slug, thread.category_id
        );
        Ok(thread)
    }

    /// Update a thread.
    ///
    /// When the update moves the thread to another category, the new
    /// category is propagated to every reply with an individual save, so
    /// each propagated reply passes through the reply after-save hooks.
    /// The whole propagation runs in one transaction: a single failed
    /// reply save rolls back the thread update and every sibling.
    pub fn update_thread(&mut self, id: i64, update: &ThreadUpdate) -> Result<Thread> {
        if let Some(ref title) = update.title {
            self.validate_title(title)?;
        }
        if let Some(ref message) = update.message {
            self.validate_message(message)?;
        }
        if let Some(category_id) = update.category_id {
            self.require_category(category_id)?;
        }

        let before = ThreadRepository::new(self.db.conn())
            .get_by_id(id)?
            .ok_or_else(|| AgoraError::NotFound("thread".to_string()))?;

        let maintain_user_counts = self.config.maintain_user_posts_count;
        let tx = self.db.transaction()?;
        let thread = {
            let threads = ThreadRepository::new(&tx);
            let thread = threads
                .update(id, update)?
                .ok_or_else(|| AgoraError::NotFound("thread".to_string()))?;

            if thread.category_id != before.category_id {
                debug!(
                    "Propagating category {} to replies of thread {}",
                    thread.category_id, id
                );
                let replies = ReplyRepository::new(&tx);
                for reply in replies.list_by_thread(id, Scope::Admin)? {
                    let moved = replies.set_category(reply.id, thread.category_id)?;
                    Self::after_reply_saved(&tx, &moved, maintain_user_counts)?;
                }
                CategoryRepository::new(&tx).refresh_counters(before.category_id)?;
            }

            // Visibility and category changes both affect the category's
            // derived counts
            CategoryRepository::new(&tx).refresh_counters(thread.category_id)?;

            threads
                .get_by_id(id)?
                .ok_or_else(|| AgoraError::NotFound("thread".to_string()))?
        };
        tx.commit()?;

        Ok(thread)
    }

    /// Delete a thread and everything that hangs off it.
    ///
    /// Each child reply is deleted individually through the same hooks as
    /// a direct reply deletion, then the thread's own reports and likes,
    /// then the thread row. Counters reflect the live set afterwards.
    pub fn delete_thread(&mut self, id: i64) -> Result<()> {
        let thread = ThreadRepository::new(self.db.conn())
            .get_by_id(id)?
            .ok_or_else(|| AgoraError::NotFound("thread".to_string()))?;

        let maintain_user_counts = self.config.maintain_user_posts_count;
        let tx = self.db.transaction()?;
        {
            let replies = ReplyRepository::new(&tx);
            for reply in replies.list_by_thread(id, Scope::Admin)? {
                Self::delete_reply_row(&tx, &reply)?;
                Self::after_reply_removed(&tx, &reply, maintain_user_counts)?;
            }

            ReportRepository::new(&tx).delete_by_post(id)?;
            LikeRepository::new(&tx).delete_by_post(id)?;
            ThreadRepository::new(&tx).delete(id)?;

            CategoryRepository::new(&tx).refresh_counters(thread.category_id)?;
            if maintain_user_counts {
                UserRepository::new(&tx).refresh_posts_count(thread.user_id)?;
            }
        }
        tx.commit()?;

        info!("Deleted thread {} and its replies", id);
        Ok(())
    }

    // ── Replies ─────────────────────────────────────────────────────────

    /// Create a reply to a thread.
    ///
    /// The reply's category is copied from the parent thread, so the
    /// denormalized reference starts in sync. Locked threads reject new
    /// replies.
    pub fn create_reply(&mut self, new_reply: &NewReply) -> Result<Reply> {
        self.validate_message(&new_reply.message)?;
        self.require_user(new_reply.user_id)?;

        let thread = ThreadRepository::new(self.db.conn())
            .get_by_id(new_reply.thread_id)?
            .ok_or_else(|| {
                AgoraError::Validation("thread does not exist".to_string())
            })?;
        if thread.is_locked {
            return Err(AgoraError::Validation("thread is locked".to_string()));
        }

        let maintain_user_counts = self.config.maintain_user_posts_count;
        let tx = self.db.transaction()?;
        let reply = {
            let reply = ReplyRepository::new(&tx).create(new_reply, thread.category_id)?;
            Self::after_reply_saved(&tx, &reply, maintain_user_counts)?;
            reply
        };
        tx.commit()?;

        info!("Created reply {} in thread {}", reply.id, reply.parent_id);
        Ok(reply)
    }

    /// Delete a reply.
    pub fn delete_reply(&mut self, id: i64) -> Result<()> {
        let reply = ReplyRepository::new(self.db.conn())
            .get_by_id(id)?
            .ok_or_else(|| AgoraError::NotFound("reply".to_string()))?;

        let maintain_user_counts = self.config.maintain_user_posts_count;
        let tx = self.db.transaction()?;
        {
            Self::delete_reply_row(&tx, &reply)?;
            Self::after_reply_removed(&tx, &reply, maintain_user_counts)?;
        }
        tx.commit()?;

        info!("Deleted reply {} from thread {}", id, reply.parent_id);
        Ok(())
    }

    // ── Finders ─────────────────────────────────────────────────────────

    /// Find threads by category, with author, last reply (and its
    /// author) and any reported reply eagerly attached.
    ///
    /// Fails with InvalidInput when the category id is absent; no query
    /// is performed in that case.
    pub fn find_by_category(
        &self,
        category_id: Option<i64>,
        options: &FindOptions,
    ) -> Result<Vec<ThreadListing>> {
        let category_id = category_id
            .ok_or_else(|| AgoraError::InvalidInput("category_id is required".to_string()))?;

        let conn = self.db.conn();
        let threads = ThreadRepository::new(conn).list_by_category(category_id, options)?;
        threads
            .into_iter()
            .map(|thread| Self::build_listing(conn, thread, None, false))
            .collect()
    }

    /// Find threads a user has started or participated in, with author,
    /// category, last reply (and its author), any reported reply and the
    /// user's own reply eagerly attached.
    ///
    /// Fails with InvalidInput when the user id is absent; no query is
    /// performed in that case.
    pub fn find_by_user(
        &self,
        user_id: Option<i64>,
        options: &FindOptions,
    ) -> Result<Vec<ThreadListing>> {
        let user_id =
            user_id.ok_or_else(|| AgoraError::InvalidInput("user_id is required".to_string()))?;

        let conn = self.db.conn();
        let threads = ThreadRepository::new(conn).list_by_user(user_id, options)?;
        threads
            .into_iter()
            .map(|thread| Self::build_listing(conn, thread, Some(user_id), true))
            .collect()
    }

    /// Find a thread for editing by category and slug.
    ///
    /// Fails with InvalidInput when either argument is absent; no query
    /// is performed in that case.
    pub fn find_for_edit(&self, category_id: Option<i64>, slug: Option<&str>) -> Result<Thread> {
        let category_id = category_id
            .ok_or_else(|| AgoraError::InvalidInput("category_id is required".to_string()))?;
        let slug =
            slug.ok_or_else(|| AgoraError::InvalidInput("slug is required".to_string()))?;

        let conn = self.db.conn();
        let id = slug::resolve(conn, category_id, slug)?
            .ok_or_else(|| AgoraError::NotFound("thread".to_string()))?;
        ThreadRepository::new(conn)
            .get_by_id(id)?
            .ok_or_else(|| AgoraError::NotFound("thread".to_string()))
    }

    // ── Moderation ──────────────────────────────────────────────────────

    /// Report a post (thread or reply). The post's reports_count is
    /// recomputed from the live report set.
    pub fn report_post(&mut self, post_id: i64, user_id: i64) -> Result<Report> {
        self.require_user(user_id)?;
        self.require_post(post_id)?;

        let conn = self.db.conn();
        let reports = ReportRepository::new(conn);
        let report = reports.create(post_id, user_id)?;
        reports.refresh_count(post_id)?;

        info!("Post {} reported by user {}", post_id, user_id);
        Ok(report)
    }

    /// Like a post. A user likes a post at most once.
    pub fn like_post(&mut self, post_id: i64, user_id: i64) -> Result<Like> {
        self.require_user(user_id)?;
        self.require_post(post_id)?;

        let conn = self.db.conn();
        let likes = LikeRepository::new(conn);
        if likes.exists(post_id, user_id)? {
            return Err(AgoraError::Validation("post already liked".to_string()));
        }
        let like = likes.create(post_id, user_id)?;
        likes.refresh_count(post_id)?;

        Ok(like)
    }

    /// Remove a user's like from a post.
    pub fn unlike_post(&mut self, post_id: i64, user_id: i64) -> Result<()> {
        let conn = self.db.conn();
        let likes = LikeRepository::new(conn);
        if !likes.delete(post_id, user_id)? {
            return Err(AgoraError::NotFound("like".to_string()));
        }
        likes.refresh_count(post_id)?;
        Ok(())
    }

    // ── Hooks ───────────────────────────────────────────────────────────

    /// After-save hook for replies: recompute the parent thread's
    /// reply-derived fields, the category's counter caches and, when
    /// enabled, the author's posts_count.
    fn after_reply_saved(conn: &Connection, reply: &Reply, maintain_user_counts: bool) -> Result<()> {
        ThreadRepository::new(conn).refresh_reply_counters(reply.parent_id)?;
        CategoryRepository::new(conn).refresh_counters(reply.category_id)?;
        if maintain_user_counts {
            UserRepository::new(conn).refresh_posts_count(reply.user_id)?;
        }
        Ok(())
    }

    /// After-remove hook for replies: identical recomputation; counters
    /// are derived from the live set, so removal is not a decrement.
    fn after_reply_removed(
        conn: &Connection,
        reply: &Reply,
        maintain_user_counts: bool,
    ) -> Result<()> {
        Self::after_reply_saved(conn, reply, maintain_user_counts)
    }

    /// Delete a reply row together with the moderation records
    /// referencing it.
    fn delete_reply_row(conn: &Connection, reply: &Reply) -> Result<()> {
        ReportRepository::new(conn).delete_by_post(reply.id)?;
        LikeRepository::new(conn).delete_by_post(reply.id)?;
        ReplyRepository::new(conn).delete(reply.id)?;
        Ok(())
    }

    // ── Validation ──────────────────────────────────────────────────────

    fn validate_title(&self, title: &str) -> Result<()> {
        if title.trim().is_empty() {
            return Err(AgoraError::Validation("title must not be empty".to_string()));
        }
        let char_count = title.chars().count();
        if char_count > self.config.max_title_length {
            return Err(AgoraError::Validation(format!(
                "title too long (max {} characters)",
                self.config.max_title_length
            )));
        }
        Ok(())
    }

    fn validate_message(&self, message: &str) -> Result<()> {
        if message.trim().is_empty() {
            return Err(AgoraError::Validation(
                "message must not be empty".to_string(),
            ));
        }
        let char_count = message.chars().count();
        if char_count > self.config.max_message_length {
            return Err(AgoraError::Validation(format!(
                "message too long (max {} characters)",
                self.config.max_message_length
            )));
        }
        Ok(())
    }

    fn require_category(&self, category_id: i64) -> Result<()> {
        if !CategoryRepository::new(self.db.conn()).exists(category_id)? {
            return Err(AgoraError::Validation(
                "category does not exist".to_string(),
            ));
        }
        Ok(())
    }

    fn require_user(&self, user_id: i64) -> Result<()> {
        if !UserRepository::new(self.db.conn()).exists(user_id)? {
            return Err(AgoraError::Validation("user does not exist".to_string()));
        }
        Ok(())
    }

    fn require_post(&self, post_id: i64) -> Result<()> {
        if PostRepository::new(self.db.conn()).get_by_id(post_id)?.is_none() {
            return Err(AgoraError::NotFound("post".to_string()));
        }
        Ok(())
    }

    /// Assemble a listing row for a thread, eagerly attaching related
    /// records.
    fn build_listing(
        conn: &Connection,
        thread: Thread,
        user_reply_for: Option<i64>,
        with_category: bool,
    ) -> Result<ThreadListing> {
        let users = UserRepository::new(conn);
        let author = users
            .get_by_id(thread.user_id)?
            .ok_or_else(|| AgoraError::NotFound("user".to_string()))?;

        let last_reply = PostRepository::new(conn).get_by_id(thread.last_reply_id)?;
        let last_reply_author = match &last_reply {
            Some(post) => users.get_by_id(post.user_id)?,
            None => None,
        };

        let replies = ReplyRepository::new(conn);
        let reported_reply = replies.first_reported(thread.id)?;
        let user_reply = match user_reply_for {
            Some(user_id) => replies.first_by_thread_and_user(thread.id, user_id)?,
            None => None,
        };

        let category = if with_category {
            CategoryRepository::new(conn).get_by_id(thread.category_id)?
        } else {
            None
        };

        Ok(ThreadListing {
            thread,
            author,
            category,
            last_reply,
            last_reply_author,
            reported_reply,
            user_reply,
        })
    }
}
