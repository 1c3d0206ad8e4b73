//! Pinboard API access and the local tag cache

pub mod api;
pub mod cache;
pub mod error;
pub mod models;

pub use api::{BookmarkSource, PinboardClient};
pub use cache::{RefreshOutcome, RefreshPolicy, TagCache, TagCount};
pub use error::{PinboardError, PinboardResult};
pub use models::{NewPost, Post};
