//! Post model for Agora.
//!
//! Threads and replies share one physical record type. A post with no
//! parent is a thread; a post whose parent_id points at a thread is a
//! reply to it. The discrimination lives at the data-access boundary,
//! never in an inheritance hierarchy.

/// Post entity: the shared record underlying both threads and replies.
#[derive(Debug, Clone)]
pub struct Post {
    /// Unique post ID.
    pub id: i64,
    /// ID of the category this post belongs to.
    pub category_id: i64,
    /// ID of the authoring user.
    pub user_id: i64,
    /// Parent thread ID (None for threads, Some for replies).
    pub parent_id: Option<i64>,
    /// Title (set for threads, None for replies).
    pub title: Option<String>,
    /// URL-friendly identifier (threads only, unique within category).
    pub slug: Option<String>,
    /// Message body.
    pub message: String,
    /// Whether the post is pinned above others in listings.
    pub is_sticky: bool,
    /// Whether the post is closed to new replies.
    pub is_locked: bool,
    /// Whether the post is visible to unprivileged callers.
    pub is_visible: bool,
    /// Number of replies (threads only). Derived counter cache.
    pub replies_count: i64,
    /// Number of reports referencing this post. Derived counter cache.
    pub reports_count: i64,
    /// Number of likes referencing this post. Derived counter cache.
    pub likes_count: i64,
    /// Most recent activity on this post: the latest reply, or the post
    /// itself when it has no replies (threads only). Derived.
    pub last_reply_id: Option<i64>,
    /// Creation timestamp of the post referenced by last_reply_id.
    pub last_reply_created: Option<String>,
    /// Creation timestamp.
    pub created_at: String,
    /// Last modification timestamp.
    pub modified_at: String,
}

impl Post {
    /// Check if this post is a thread (no parent).
    pub fn is_thread(&self) -> bool {
        self.parent_id.is_none()
    }

    /// Check if this post is a reply to a thread.
    pub fn is_reply(&self) -> bool {
        self.parent_id.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_post(parent_id: Option<i64>) -> Post {
        Post {
            id: 1,
            category_id: 1,
            user_id: 1,
            parent_id,
            title: None,
            slug: None,
            message: "hello".to_string(),
            is_sticky: false,
            is_locked: false,
            is_visible: true,
            replies_count: 0,
            reports_count: 0,
            likes_count: 0,
            last_reply_id: None,
            last_reply_created: None,
            created_at: "2024-01-01 00:00:00".to_string(),
            modified_at: "2024-01-01 00:00:00".to_string(),
        }
    }

    #[test]
    fn test_post_is_thread() {
        let post = sample_post(None);
        assert!(post.is_thread());
        assert!(!post.is_reply());
    }

    #[test]
    fn test_post_is_reply() {
        let post = sample_post(Some(7));
        assert!(post.is_reply());
        assert!(!post.is_thread());
    }
}
