//! Reply model for Agora.
//!
//! A reply is the typed view of a post whose parent_id points at a
//! thread. Its category_id is a denormalized copy of the parent thread's
//! category, kept in sync by the consistency layer.

/// Reply entity: a post belonging to a thread.
#[derive(Debug, Clone)]
pub struct Reply {
    /// Unique reply ID (shared with the underlying post record).
    pub id: i64,
    /// Category of the parent thread (denormalized, kept in sync).
    pub category_id: i64,
    /// ID of the authoring user.
    pub user_id: i64,
    /// ID of the parent thread.
    pub parent_id: i64,
    /// Message body.
    pub message: String,
    /// Whether the reply is visible to unprivileged callers.
    pub is_visible: bool,
    /// Number of reports referencing this reply. Derived counter cache.
    pub reports_count: i64,
    /// Number of likes referencing this reply. Derived counter cache.
    pub likes_count: i64,
    /// Creation timestamp.
    pub created_at: String,
    /// Last modification timestamp.
    pub modified_at: String,
}

/// Data for creating a new reply.
#[derive(Debug, Clone)]
pub struct NewReply {
    /// ID of the thread to reply to.
    pub thread_id: i64,
    /// ID of the user creating the reply.
    pub user_id: i64,
    /// Message body.
    pub message: String,
}

impl NewReply {
    /// Create a new reply with required fields.
    pub fn new(thread_id: i64, user_id: i64, message: impl Into<String>) -> Self {
        Self {
            thread_id,
            user_id,
            message: message.into(),
        }
    }
}

/// Data for updating an existing reply.
#[derive(Debug, Clone, Default)]
pub struct ReplyUpdate {
    /// New message body.
    pub message: Option<String>,
    /// New visibility flag.
    pub is_visible: Option<bool>,
}

impl ReplyUpdate {
    /// Create an empty update.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set new message body.
    pub fn message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    /// Set the visibility flag.
    pub fn visible(mut self, is_visible: bool) -> Self {
        self.is_visible = Some(is_visible);
        self
    }

    /// Check if any fields are set.
    pub fn is_empty(&self) -> bool {
        self.message.is_none() && self.is_visible.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_reply() {
        let reply = NewReply::new(7, 3, "Nice post");
        assert_eq!(reply.thread_id, 7);
        assert_eq!(reply.user_id, 3);
        assert_eq!(reply.message, "Nice post");
    }

    #[test]
    fn test_reply_update_empty() {
        let update = ReplyUpdate::new();
        assert!(update.is_empty());
    }

    #[test]
    fn test_reply_update_message() {
        let update = ReplyUpdate::new().message("Edited");
        assert_eq!(update.message, Some("Edited".to_string()));
        assert!(!update.is_empty());
    }
}
