//! # Spotify Provider
//!
//! Implements the catalog-facing contracts against the Spotify Web API.
//!
//! ## Overview
//!
//! This module provides:
//! - Track search (catalog resolution)
//! - Saved-tracks "contains" check (liked status)
//! - The listener's top tracks (taste seeds)
//! - The currently playing track
//!
//! Every call is authorized with the listener's OAuth access token, which
//! is passed per request and never stored.

pub mod connector;
pub mod error;
pub mod types;

pub use connector::SpotifyConnector;
pub use error::{Result, SpotifyError};
