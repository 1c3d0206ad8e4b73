//! CLI commands

pub mod auth;
pub mod bookmarks;
pub mod post;
pub mod settings;
pub mod tags;
pub mod update;
pub mod utils;
