//! Forum domain for Agora.
//!
//! Threads and replies share one underlying posts table; a parentless
//! post is a thread, a post with a parent is a reply. The typed models
//! and repositories in this module keep the two apart, and
//! [`ForumService`] ties them together with the consistency pipeline
//! that maintains the derived fields.

pub mod category;
pub mod category_repository;
pub mod moderation;
pub mod post;
pub mod post_repository;
pub mod reply;
pub mod reply_repository;
pub mod scope;
pub mod service;
pub mod slug;
pub mod thread;
pub mod thread_repository;

pub use category::{Category, CategoryUpdate, NewCategory};
pub use category_repository::CategoryRepository;
pub use moderation::{Like, LikeRepository, Report, ReportRepository};
pub use post::Post;
pub use post_repository::PostRepository;
pub use reply::{NewReply, Reply, ReplyUpdate};
pub use reply_repository::ReplyRepository;
pub use scope::{FindOptions, Scope, DEFAULT_THREAD_ORDER};
pub use service::ForumService;
pub use thread::{NewThread, Thread, ThreadListing, ThreadUpdate};
pub use thread_repository::ThreadRepository;
