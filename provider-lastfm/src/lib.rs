//! # Last.fm Provider
//!
//! Implements the tagging and similarity contracts on top of the Last.fm
//! web service (`artist.getTopTags`, `track.getSimilar`).
//!
//! ## Overview
//!
//! This module provides:
//! - Artist top tags for taste aggregation
//! - Similar tracks for recommendation seeding
//! - Client-side request spacing to stay within Last.fm rate limits
//! - Mapping of Last.fm's in-body error codes onto typed errors

pub mod connector;
pub mod error;
pub mod types;

pub use connector::LastFmConnector;
pub use error::{LastFmError, Result};
