//! # Discovery Core
//!
//! Taste analysis and "more like this" recommendations on top of remote
//! music services.
//!
//! ## Overview
//!
//! - [`TagAggregator`] ranks the tags of a listener's seed tracks
//! - [`CatalogResolver`] maps a (title, artist) pair to a catalog entry
//! - [`LikedStatusBatcher`] annotates catalog entries with liked flags
//! - [`SimilarityResolutionPipeline`] chains the three into recommendations
//! - [`DiscoveryService`] wires them together with the listener helpers
//!
//! Every remote call is bounded by the configured call timeout. Soft
//! failures are absorbed close to where they occur and logged at `warn`;
//! only failures that make a result meaningless reach the caller as
//! [`DiscoveryError`].

mod deadline;

pub mod error;
pub mod liked;
pub mod resolver;
pub mod service;
pub mod similar;
pub mod taste;

pub use error::{DiscoveryError, Result};
pub use liked::LikedStatusBatcher;
pub use resolver::CatalogResolver;
pub use service::DiscoveryService;
pub use similar::SimilarityResolutionPipeline;
pub use taste::{TagAggregator, TagTally};
