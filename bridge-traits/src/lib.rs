//! # Host Bridge Traits
//!
//! Abstraction traits that decouple the discovery core from concrete
//! transports and third-party services.
//!
//! ## Overview
//!
//! This crate defines the contract between the core library and the
//! implementations that talk to the outside world. Each trait represents a
//! capability the core requires but that is supplied by another crate (or by
//! a test double).
//!
//! ## Traits
//!
//! ### Transport
//! - [`HttpClient`](http::HttpClient) - Async HTTP with retry and timeouts
//!
//! ### Remote music services
//! - [`TaggingServiceClient`](music::TaggingServiceClient) - Artist top tags
//! - [`SimilarityServiceClient`](music::SimilarityServiceClient) - Similar tracks
//! - [`SearchServiceClient`](music::SearchServiceClient) - Catalog track search
//! - [`LikeCheckServiceClient`](music::LikeCheckServiceClient) - Batched liked check
//! - [`TopTracksClient`](music::TopTracksClient) - Listener top tracks
//! - [`NowPlayingClient`](music::NowPlayingClient) - Currently playing track
//! - [`VideoSearchClient`](music::VideoSearchClient) - Music video lookup
//!
//! ## Implementations
//!
//! | Trait | Implementation Crate |
//! |-------|---------------------|
//! | `HttpClient` | `bridge-desktop` |
//! | Tagging, Similarity | `provider-lastfm` |
//! | Search, LikeCheck, TopTracks, NowPlaying | `provider-spotify` |
//! | VideoSearch | `provider-youtube` |
//!
//! ## Error Handling
//!
//! All bridge traits use the [`BridgeError`](error::BridgeError) type. Connector
//! crates keep their own richer error enums and convert at the trait boundary.
//!
//! ## Thread Safety
//!
//! All bridge traits require `Send + Sync` bounds so a single client can be
//! shared across concurrently running pipeline invocations.

pub mod error;
pub mod http;
pub mod music;

pub use error::BridgeError;

// Re-export commonly used types
pub use http::{HttpClient, HttpMethod, HttpRequest, HttpResponse, RetryPolicy};
pub use music::{
    AccessToken, CatalogCandidate, EnrichedTrack, LikeCheckServiceClient, NowPlaying,
    NowPlayingClient, SearchServiceClient, SeedTrack, SimilarCandidate, SimilarityServiceClient,
    Tag, TaggingServiceClient, TimeRange, TopTracksClient, VideoMatch, VideoSearchClient,
};
