//! User model for Agora.
//!
//! The forum is a pluggable module; users belong to the host application.
//! This is the minimal collaborator record the forum needs: an identity to
//! attribute posts to and a derived posts_count counter cache.

/// User entity representing a forum participant.
#[derive(Debug, Clone)]
pub struct User {
    /// Unique user ID.
    pub id: i64,
    /// Username (unique).
    pub username: String,
    /// Number of posts (threads and replies) authored by this user.
    /// Derived; recomputed after qualifying saves, never authored directly.
    pub posts_count: i64,
    /// Account creation timestamp.
    pub created_at: String,
}

/// Data for creating a new user.
#[derive(Debug, Clone)]
pub struct NewUser {
    /// Username.
    pub username: String,
}

impl NewUser {
    /// Create a new user with required fields.
    pub fn new(username: impl Into<String>) -> Self {
        Self {
            username: username.into(),
        }
    }
}
