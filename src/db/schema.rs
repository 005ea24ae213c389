//! Database schema and migrations for Agora.
//!
//! This module contains all database migrations that will be applied
//! sequentially when the database is first opened or upgraded.

/// Database migrations.
///
/// Each migration is a SQL script that will be executed in order.
/// The schema_version table tracks which migrations have been applied.
pub const MIGRATIONS: &[&str] = &[
    // v1: Users table (collaborator stand-in for the host application's user model)
    r#"
-- Users table; posts_count is derived and recomputed, never authored
CREATE TABLE users (
    id          INTEGER PRIMARY KEY AUTOINCREMENT,
    username    TEXT NOT NULL UNIQUE,
    posts_count INTEGER NOT NULL DEFAULT 0,
    created_at  TEXT NOT NULL DEFAULT (datetime('now'))
);

CREATE INDEX idx_users_username ON users(username);
"#,
    // v2: Categories table
    r#"
-- Categories; threads_count and last_post_id are derived counter caches
CREATE TABLE categories (
    id            INTEGER PRIMARY KEY AUTOINCREMENT,
    title         TEXT NOT NULL,
    slug          TEXT NOT NULL UNIQUE,
    description   TEXT,
    is_visible    INTEGER NOT NULL DEFAULT 1,
    sort_order    INTEGER NOT NULL DEFAULT 0,
    threads_count INTEGER NOT NULL DEFAULT 0,
    last_post_id  INTEGER,
    created_at    TEXT NOT NULL DEFAULT (datetime('now')),
    modified_at   TEXT NOT NULL DEFAULT (datetime('now'))
);

CREATE INDEX idx_categories_sort_order ON categories(sort_order);
CREATE INDEX idx_categories_is_visible ON categories(is_visible);
"#,
    // v3: Posts table shared by threads and replies.
    // parent_id IS NULL => thread; parent_id set => reply to that thread.
    r#"
CREATE TABLE posts (
    id                 INTEGER PRIMARY KEY AUTOINCREMENT,
    category_id        INTEGER NOT NULL REFERENCES categories(id),
    user_id            INTEGER NOT NULL REFERENCES users(id),
    parent_id          INTEGER REFERENCES posts(id),
    title              TEXT,
    slug               TEXT,
    message            TEXT NOT NULL,
    is_sticky          INTEGER NOT NULL DEFAULT 0,
    is_locked          INTEGER NOT NULL DEFAULT 0,
    is_visible         INTEGER NOT NULL DEFAULT 1,
    replies_count      INTEGER NOT NULL DEFAULT 0,
    reports_count      INTEGER NOT NULL DEFAULT 0,
    likes_count        INTEGER NOT NULL DEFAULT 0,
    last_reply_id      INTEGER REFERENCES posts(id) ON DELETE SET NULL,
    last_reply_created TEXT,
    created_at         TEXT NOT NULL DEFAULT (datetime('now')),
    modified_at        TEXT NOT NULL DEFAULT (datetime('now'))
);

CREATE INDEX idx_posts_category_id ON posts(category_id);
CREATE INDEX idx_posts_parent_id ON posts(parent_id);
CREATE INDEX idx_posts_user_id ON posts(user_id);
CREATE INDEX idx_posts_last_reply_created ON posts(last_reply_created);
-- Slug is unique within a category (threads only; replies carry no slug)
CREATE UNIQUE INDEX idx_posts_category_slug ON posts(category_id, slug) WHERE slug IS NOT NULL;
"#,
    // v4: Make the category last-post pointer self-healing on post deletion
    r#"
CREATE TRIGGER trg_categories_last_post_cleared
AFTER DELETE ON posts
BEGIN
    UPDATE categories SET last_post_id = NULL WHERE last_post_id = OLD.id;
END;
"#,
    // v5: Reports and likes (moderation records referencing posts)
    r#"
CREATE TABLE reports (
    id          INTEGER PRIMARY KEY AUTOINCREMENT,
    post_id     INTEGER NOT NULL REFERENCES posts(id),
    user_id     INTEGER NOT NULL REFERENCES users(id),
    created_at  TEXT NOT NULL DEFAULT (datetime('now'))
);

CREATE INDEX idx_reports_post_id ON reports(post_id);

CREATE TABLE likes (
    id          INTEGER PRIMARY KEY AUTOINCREMENT,
    post_id     INTEGER NOT NULL REFERENCES posts(id),
    user_id     INTEGER NOT NULL REFERENCES users(id),
    created_at  TEXT NOT NULL DEFAULT (datetime('now')),
    UNIQUE(post_id, user_id)
);

CREATE INDEX idx_likes_post_id ON likes(post_id);
"#,
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_migrations_not_empty() {
        assert!(!MIGRATIONS.is_empty());
    }

    #[test]
    fn test_first_migration_contains_users_table() {
        let first = MIGRATIONS[0];
        assert!(first.contains("CREATE TABLE users"));
        assert!(first.contains("username"));
        assert!(first.contains("posts_count"));
    }

    #[test]
    fn test_posts_table_shared_by_threads_and_replies() {
        let posts = MIGRATIONS[2];
        assert!(posts.contains("CREATE TABLE posts"));
        assert!(posts.contains("parent_id"));
        assert!(posts.contains("last_reply_id"));
        assert!(posts.contains("is_sticky"));
    }

    #[test]
    fn test_slug_unique_within_category() {
        let posts = MIGRATIONS[2];
        assert!(posts.contains("idx_posts_category_slug"));
        assert!(posts.contains("posts(category_id, slug)"));
    }

    #[test]
    fn test_moderation_tables_present() {
        let moderation = MIGRATIONS[4];
        assert!(moderation.contains("CREATE TABLE reports"));
        assert!(moderation.contains("CREATE TABLE likes"));
        assert!(moderation.contains("UNIQUE(post_id, user_id)"));
    }
}
