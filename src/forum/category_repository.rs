//! Category repository for Agora.
//!
//! This module provides CRUD operations for categories in the database,
//! including recomputation of the derived counter caches.

use rusqlite::{Connection, Row};

use super::category::{Category, CategoryUpdate, NewCategory};
use super::scope::{compose_where, Scope};
use crate::forum::slug;
use crate::{AgoraError, Result};

const CATEGORY_COLUMNS: &str = "id, title, slug, description, is_visible, sort_order,
     threads_count, last_post_id, created_at, modified_at";

/// Repository for category CRUD operations.
pub struct CategoryRepository<'a> {
    conn: &'a Connection,
}

impl<'a> CategoryRepository<'a> {
    /// Create a new CategoryRepository with the given connection reference.
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    /// Create a new category in the database.
    ///
    /// Returns the created category with the assigned ID.
    pub fn create(&self, new_category: &NewCategory) -> Result<Category> {
        let slug = slug::slugify(&new_category.title);
        self.conn.execute(
            "INSERT INTO categories (title, slug, description, is_visible, sort_order)
             VALUES (?, ?, ?, ?, ?)",
            rusqlite::params![
                &new_category.title,
                slug,
                &new_category.description,
                new_category.is_visible,
                new_category.sort_order,
            ],
        )?;

        let id = self.conn.last_insert_rowid();
        self.get_by_id(id)?
            .ok_or_else(|| AgoraError::NotFound("category".to_string()))
    }

    /// Get a category by ID.
    pub fn get_by_id(&self, id: i64) -> Result<Option<Category>> {
        let sql = format!("SELECT {CATEGORY_COLUMNS} FROM categories WHERE id = ?");
        let result = self.conn.query_row(&sql, [id], Self::row_to_category);

        match result {
            Ok(category) => Ok(Some(category)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Check if a category exists.
    pub fn exists(&self, id: i64) -> Result<bool> {
        let exists: bool = self.conn.query_row(
            "SELECT EXISTS(SELECT 1 FROM categories WHERE id = ?)",
            [id],
            |row| row.get(0),
        )?;
        Ok(exists)
    }

    /// List categories ordered by their ordering rank.
    pub fn list(&self, scope: Scope) -> Result<Vec<Category>> {
        let sql = format!(
            "SELECT {CATEGORY_COLUMNS} FROM categories{} ORDER BY sort_order, id",
            compose_where(&[scope.visibility_clause()])
        );
        let mut stmt = self.conn.prepare(&sql)?;

        let categories = stmt
            .query_map([], Self::row_to_category)?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        Ok(categories)
    }

    /// Update a category by ID.
    ///
    /// Only fields that are set in the update will be modified.
    /// Returns the updated category, or None if not found.
    pub fn update(&self, id: i64, update: &CategoryUpdate) -> Result<Option<Category>> {
        if update.is_empty() {
            return self.get_by_id(id);
        }

        let mut fields = Vec::new();
        let mut values: Vec<Box<dyn rusqlite::ToSql>> = Vec::new();

        if let Some(ref title) = update.title {
            fields.push("title = ?");
            values.push(Box::new(title.clone()));
        }
        if let Some(ref description) = update.description {
            fields.push("description = ?");
            values.push(Box::new(description.clone()));
        }
        if let Some(is_visible) = update.is_visible {
            fields.push("is_visible = ?");
            values.push(Box::new(is_visible));
        }
        if let Some(sort_order) = update.sort_order {
            fields.push("sort_order = ?");
            values.push(Box::new(sort_order));
        }
        fields.push("modified_at = datetime('now')");

        let sql = format!("UPDATE categories SET {} WHERE id = ?", fields.join(", "));
        values.push(Box::new(id));

        let params: Vec<&dyn rusqlite::ToSql> = values.iter().map(|v| v.as_ref()).collect();
        let affected = self.conn.execute(&sql, params.as_slice())?;

        if affected == 0 {
            return Ok(None);
        }

        self.get_by_id(id)
    }

    /// Delete a category by ID.
    ///
    /// Returns true if a category was deleted, false if not found.
    pub fn delete(&self, id: i64) -> Result<bool> {
        let affected = self
            .conn
            .execute("DELETE FROM categories WHERE id = ?", [id])?;
        Ok(affected > 0)
    }

    /// Recompute the derived counter caches for a category.
    ///
    /// threads_count is the live count of visible threads in the category;
    /// last_post_id is the most recently created post (thread or reply,
    /// any visibility) in the category, or NULL when there is none.
    pub fn refresh_counters(&self, id: i64) -> Result<()> {
        self.conn.execute(
            "UPDATE categories SET
                threads_count = (
                    SELECT COUNT(*) FROM posts
                    WHERE category_id = ?1 AND parent_id IS NULL AND is_visible = 1
                ),
                last_post_id = (
                    SELECT id FROM posts WHERE category_id = ?1 ORDER BY id DESC LIMIT 1
                )
             WHERE id = ?1",
            [id],
        )?;
        Ok(())
    }

    /// Convert a database row to a Category struct.
    fn row_to_category(row: &Row<'_>) -> rusqlite::Result<Category> {
        Ok(Category {
            id: row.get(0)?,
            title: row.get(1)?,
            slug: row.get(2)?,
            description: row.get(3)?,
            is_visible: row.get(4)?,
            sort_order: row.get(5)?,
            threads_count: row.get(6)?,
            last_post_id: row.get(7)?,
            created_at: row.get(8)?,
            modified_at: row.get(9)?,
        })
    }
}
