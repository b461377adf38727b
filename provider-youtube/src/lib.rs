//! # YouTube Provider
//!
//! Finds a playable music video for a free-text query using the YouTube
//! Data API v3 `search.list` endpoint, restricted to the Music category.

pub mod connector;
pub mod error;
pub mod types;

pub use connector::YouTubeConnector;
pub use error::{Result, YouTubeError};
