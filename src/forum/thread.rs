//! Thread model for Agora.
//!
//! A thread is the typed view of a post with no parent: the root of a
//! discussion within a category.

use crate::db::User;

use super::category::Category;
use super::post::Post;
use super::reply::Reply;

/// Thread entity: a parentless post, the root of a discussion.
#[derive(Debug, Clone)]
pub struct Thread {
    /// Unique thread ID (shared with the underlying post record).
    pub id: i64,
    /// ID of the category this thread belongs to.
    pub category_id: i64,
    /// ID of the authoring user.
    pub user_id: i64,
    /// Thread title.
    pub title: String,
    /// URL-friendly identifier, unique within the category.
    pub slug: String,
    /// Message body.
    pub message: String,
    /// Whether the thread is pinned above others in listings.
    pub is_sticky: bool,
    /// Whether the thread is closed to new replies.
    pub is_locked: bool,
    /// Whether the thread is visible to unprivileged callers.
    pub is_visible: bool,
    /// Number of replies. Derived counter cache.
    pub replies_count: i64,
    /// Number of reports referencing this thread. Derived counter cache.
    pub reports_count: i64,
    /// Number of likes referencing this thread. Derived counter cache.
    pub likes_count: i64,
    /// Most recent activity: the latest reply, or the thread itself when
    /// it has no replies. Derived.
    pub last_reply_id: i64,
    /// Creation timestamp of the post referenced by last_reply_id.
    pub last_reply_created: String,
    /// Creation timestamp.
    pub created_at: String,
    /// Last modification timestamp.
    pub modified_at: String,
}

/// Data for creating a new thread.
#[derive(Debug, Clone)]
pub struct NewThread {
    /// ID of the category to create the thread in.
    pub category_id: i64,
    /// ID of the user creating the thread.
    pub user_id: i64,
    /// Thread title.
    pub title: String,
    /// Message body.
    pub message: String,
}

impl NewThread {
    /// Create a new thread with required fields.
    pub fn new(
        category_id: i64,
        user_id: i64,
        title: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            category_id,
            user_id,
            title: title.into(),
            message: message.into(),
        }
    }
}

/// Data for updating an existing thread.
#[derive(Debug, Clone, Default)]
pub struct ThreadUpdate {
    /// New title.
    pub title: Option<String>,
    /// New message body.
    pub message: Option<String>,
    /// Move the thread to another category.
    pub category_id: Option<i64>,
    /// New sticky flag.
    pub is_sticky: Option<bool>,
    /// New locked flag.
    pub is_locked: Option<bool>,
    /// New visibility flag.
    pub is_visible: Option<bool>,
}

impl ThreadUpdate {
    /// Create an empty update.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set new title.
    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Set new message body.
    pub fn message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    /// Move the thread to another category.
    pub fn category(mut self, category_id: i64) -> Self {
        self.category_id = Some(category_id);
        self
    }

    /// Set the sticky flag.
    pub fn sticky(mut self, is_sticky: bool) -> Self {
        self.is_sticky = Some(is_sticky);
        self
    }

    /// Set the locked flag.
    pub fn locked(mut self, is_locked: bool) -> Self {
        self.is_locked = Some(is_locked);
        self
    }

    /// Set the visibility flag.
    pub fn visible(mut self, is_visible: bool) -> Self {
        self.is_visible = Some(is_visible);
        self
    }

    /// Check if any fields are set.
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.message.is_none()
            && self.category_id.is_none()
            && self.is_sticky.is_none()
            && self.is_locked.is_none()
            && self.is_visible.is_none()
    }
}

/// A thread with its related records eagerly attached, as returned by
/// the listing finders.
#[derive(Debug, Clone)]
pub struct ThreadListing {
    /// The thread itself.
    pub thread: Thread,
    /// The thread's author.
    pub author: User,
    /// The thread's category (attached by the by-user finder).
    pub category: Option<Category>,
    /// The post holding the most recent activity: the latest reply, or
    /// the thread's own post record when it has no replies.
    pub last_reply: Option<Post>,
    /// Author of the last reply.
    pub last_reply_author: Option<User>,
    /// A reply of this thread that has at least one report, if any.
    pub reported_reply: Option<Reply>,
    /// The queried user's own reply in this thread (attached by the
    /// by-user finder).
    pub user_reply: Option<Reply>,
}
