//! pinboard-tags library
//!
//! Core functionality for the Pinboard tag-suggestion Alfred workflow:
//! locating the workflow's directories, persisting settings, keeping a
//! local cache of Pinboard bookmarks and rendering Alfred's XML feedback.

pub mod alfred;
pub mod commands;
pub mod config;
pub mod pinboard;
pub mod utils;
