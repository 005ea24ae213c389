//! Category model for Agora.
//!
//! Categories are the top-level grouping of the forum; each thread belongs
//! to exactly one category.

/// Category entity representing a forum category.
#[derive(Debug, Clone)]
pub struct Category {
    /// Unique category ID.
    pub id: i64,
    /// Category title.
    pub title: String,
    /// URL-friendly identifier (unique).
    pub slug: String,
    /// Category description.
    pub description: Option<String>,
    /// Whether the category is visible to unprivileged callers.
    pub is_visible: bool,
    /// Ordering rank for display.
    pub sort_order: i64,
    /// Number of visible threads in this category. Derived counter cache.
    pub threads_count: i64,
    /// Most recently created post (thread or reply) in this category.
    /// Derived; None if the category has no posts.
    pub last_post_id: Option<i64>,
    /// Category creation timestamp.
    pub created_at: String,
    /// Last modification timestamp.
    pub modified_at: String,
}

/// Data for creating a new category.
#[derive(Debug, Clone)]
pub struct NewCategory {
    /// Category title.
    pub title: String,
    /// Category description.
    pub description: Option<String>,
    /// Whether the category is visible (defaults to true).
    pub is_visible: bool,
    /// Ordering rank for display (defaults to 0).
    pub sort_order: i64,
}

impl NewCategory {
    /// Create a new category with minimal required fields.
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: None,
            is_visible: true,
            sort_order: 0,
        }
    }

    /// Set the description.
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Set visibility.
    pub fn visible(mut self, is_visible: bool) -> Self {
        self.is_visible = is_visible;
        self
    }

    /// Set the ordering rank.
    pub fn sort_order(mut self, sort_order: i64) -> Self {
        self.sort_order = sort_order;
        self
    }
}

/// Data for updating an existing category.
#[derive(Debug, Clone, Default)]
pub struct CategoryUpdate {
    /// New title.
    pub title: Option<String>,
    /// New description.
    pub description: Option<Option<String>>,
    /// New visibility flag.
    pub is_visible: Option<bool>,
    /// New ordering rank.
    pub sort_order: Option<i64>,
}

impl CategoryUpdate {
    /// Create an empty update.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set new title.
    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Set new description.
    pub fn description(mut self, description: Option<String>) -> Self {
        self.description = Some(description);
        self
    }

    /// Set new visibility flag.
    pub fn visible(mut self, is_visible: bool) -> Self {
        self.is_visible = Some(is_visible);
        self
    }

    /// Set new ordering rank.
    pub fn sort_order(mut self, sort_order: i64) -> Self {
        self.sort_order = Some(sort_order);
        self
    }

    /// Check if any fields are set.
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.description.is_none()
            && self.is_visible.is_none()
            && self.sort_order.is_none()
    }
}
