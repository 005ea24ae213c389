//! User repository for Agora.
//!
//! This module provides CRUD operations for users in the database.

use rusqlite::{Connection, Row};

use super::user::{NewUser, User};
use crate::{AgoraError, Result};

/// Repository for user CRUD operations.
pub struct UserRepository<'a> {
    conn: &'a Connection,
}

impl<'a> UserRepository<'a> {
    /// Create a new UserRepository with the given connection reference.
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    /// Create a new user in the database.
    ///
    /// Returns the created user with the assigned ID.
    pub fn create(&self, new_user: &NewUser) -> Result<User> {
        self.conn.execute(
            "INSERT INTO users (username) VALUES (?)",
            [&new_user.username],
        )?;

        let id = self.conn.last_insert_rowid();
        self.get_by_id(id)?
            .ok_or_else(|| AgoraError::NotFound("user".to_string()))
    }

    /// Get a user by ID.
    pub fn get_by_id(&self, id: i64) -> Result<Option<User>> {
        let result = self.conn.query_row(
            "SELECT id, username, posts_count, created_at FROM users WHERE id = ?",
            [id],
            Self::row_to_user,
        );

        match result {
            Ok(user) => Ok(Some(user)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Get a user by username.
    pub fn get_by_username(&self, username: &str) -> Result<Option<User>> {
        let result = self.conn.query_row(
            "SELECT id, username, posts_count, created_at FROM users WHERE username = ?",
            [username],
            Self::row_to_user,
        );

        match result {
            Ok(user) => Ok(Some(user)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Check if a user exists.
    pub fn exists(&self, id: i64) -> Result<bool> {
        let exists: bool = self.conn.query_row(
            "SELECT EXISTS(SELECT 1 FROM users WHERE id = ?)",
            [id],
            |row| row.get(0),
        )?;
        Ok(exists)
    }

    /// Recompute the derived posts_count for a user from the live post set.
    ///
    /// Counts every post (thread or reply) authored by the user, including
    /// invisible ones.
    pub fn refresh_posts_count(&self, id: i64) -> Result<()> {
        self.conn.execute(
            "UPDATE users
             SET posts_count = (SELECT COUNT(*) FROM posts WHERE user_id = ?1)
             WHERE id = ?1",
            [id],
        )?;
        Ok(())
    }

    /// Convert a database row to a User struct.
    fn row_to_user(row: &Row<'_>) -> rusqlite::Result<User> {
        Ok(User {
            id: row.get(0)?,
            username: row.get(1)?,
            posts_count: row.get(2)?,
            created_at: row.get(3)?,
        })
    }
}
