//! Query scoping for Agora.
//!
//! Visibility filtering and the default thread ordering are expressed as
//! small decorator functions composed into the repositories' WHERE and
//! ORDER BY clauses, rather than attached dynamically per table.

/// Caller context for queries.
///
/// Public callers only see visible records; administrative callers see
/// everything. Invisible records are never deleted, merely excluded from
/// public queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Scope {
    /// Unprivileged context: restricted to visible records.
    #[default]
    Public,
    /// Administrative context: no visibility restriction.
    Admin,
}

impl Scope {
    /// Check if this scope is administrative.
    pub fn is_admin(&self) -> bool {
        matches!(self, Scope::Admin)
    }

    /// The visibility restriction for this scope, as a WHERE fragment,
    /// or None when the scope imposes none.
    pub fn visibility_clause(&self) -> Option<&'static str> {
        match self {
            Scope::Public => Some("is_visible = 1"),
            Scope::Admin => None,
        }
    }
}

/// Options controlling how thread queries are composed.
#[derive(Debug, Clone, Copy, Default)]
pub struct FindOptions {
    /// Caller context.
    pub scope: Scope,
    /// Include replies in the result set.
    ///
    /// Threads and replies share one table; by default every thread query
    /// is restricted to parentless records so replies never masquerade as
    /// threads. This is the explicit opt-out.
    pub include_replies: bool,
}

impl FindOptions {
    /// Options for an unprivileged caller.
    pub fn public() -> Self {
        Self {
            scope: Scope::Public,
            include_replies: false,
        }
    }

    /// Options for an administrative caller.
    pub fn admin() -> Self {
        Self {
            scope: Scope::Admin,
            include_replies: false,
        }
    }

    /// Opt into including replies in the result set.
    pub fn include_replies(mut self) -> Self {
        self.include_replies = true;
        self
    }
}

/// Default listing order for threads: sticky threads first, then most
/// recent activity first. The trailing id sort makes ordering
/// deterministic when activity timestamps tie.
pub const DEFAULT_THREAD_ORDER: &str = "is_sticky DESC, last_reply_created DESC, id DESC";

/// Compose WHERE clause fragments into a single SQL WHERE clause.
///
/// Returns an empty string when no fragments apply.
pub fn compose_where(fragments: &[Option<&str>]) -> String {
    let active: Vec<&str> = fragments.iter().filter_map(|f| *f).collect();
    if active.is_empty() {
        String::new()
    } else {
        format!(" WHERE {}", active.join(" AND "))
    }
}
