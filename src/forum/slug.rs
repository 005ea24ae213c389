//! Slug assignment and lookup for Agora.
//!
//! Threads are addressed by a human-readable identifier derived from the
//! title, unique within their category. Collisions are resolved with a
//! numeric suffix.

use rusqlite::{params, Connection};

use crate::Result;

/// Derive a slug from a title: lowercase, alphanumeric runs joined by
/// hyphens. Falls back to "post" when the title has no usable characters.
pub fn slugify(title: &str) -> String {
    let mut slug = String::with_capacity(title.len());
    let mut last_was_hyphen = true;

    for c in title.chars() {
        if c.is_ascii_alphanumeric() {
            slug.extend(c.to_lowercase());
            last_was_hyphen = false;
        } else if !last_was_hyphen {
            slug.push('-');
            last_was_hyphen = true;
        }
    }

    let slug = slug.trim_end_matches('-').to_string();
    if slug.is_empty() {
        "post".to_string()
    } else {
        slug
    }
}

/// Assign a slug for a new thread title, unique within the category.
///
/// Probes the base slug first, then "-2", "-3", ... until a free one is
/// found.
pub fn unique_slug(conn: &Connection, category_id: i64, title: &str) -> Result<String> {
    let base = slugify(title);

    let mut candidate = base.clone();
    let mut suffix = 2;
    while slug_taken(conn, category_id, &candidate)? {
        candidate = format!("{base}-{suffix}");
        suffix += 1;
    }

    Ok(candidate)
}

/// Resolve a slug to a thread id within a category.
pub fn resolve(conn: &Connection, category_id: i64, slug: &str) -> Result<Option<i64>> {
    let result = conn.query_row(
        "SELECT id FROM posts WHERE category_id = ? AND slug = ? AND parent_id IS NULL",
        params![category_id, slug],
        |row| row.get(0),
    );

    match result {
        Ok(id) => Ok(Some(id)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

fn slug_taken(conn: &Connection, category_id: i64, slug: &str) -> Result<bool> {
    let taken: bool = conn.query_row(
        "SELECT EXISTS(SELECT 1 FROM posts WHERE category_id = ? AND slug = ?)",
        params![category_id, slug],
        |row| row.get(0),
    )?;
    Ok(taken)
}
