//! Agora: a discussion forum engine with built-in data consistency.
//!
//! Agora models a classic forum (categories containing threads, threads
//! containing replies) on SQLite and keeps the denormalized state that
//! makes forum listings cheap, correct on every write: counter caches,
//! last-activity pointers, slugs and the category reference each reply
//! carries.
//!
//! Threads and replies share one posts table. A post with no parent is
//! a thread; a post with a parent is a reply. [`ForumService`] is the
//! main entry point: every create, update and delete runs through its
//! pipeline of validation, save and after-save hooks, so derived fields
//! are recomputed from the live data rather than incrementally adjusted.
//!
//! # Example
//!
//! ```no_run
//! use agora::{Database, ForumConfig, ForumService, NewThread};
//!
//! # fn main() -> agora::Result<()> {
//! let mut db = Database::open("data/forum.db")?;
//! let mut forum = ForumService::new(&mut db, ForumConfig::default());
//!
//! let thread = forum.create_thread(&NewThread::new(1, 1, "Welcome", "First post"))?;
//! assert_eq!(thread.last_reply_id, thread.id);
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod db;
pub mod error;
pub mod forum;
pub mod logging;

pub use config::{Config, DatabaseConfig, ForumConfig, LoggingConfig};
pub use db::{Database, NewUser, User, UserRepository};
pub use error::{AgoraError, Result};
pub use forum::{
    Category, CategoryRepository, CategoryUpdate, FindOptions, ForumService, Like, NewCategory,
    NewReply, NewThread, Post, Reply, ReplyUpdate, Report, Scope, Thread, ThreadListing,
    ThreadRepository, ThreadUpdate,
};
