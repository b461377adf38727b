//! # Core Runtime Module
//!
//! Provides foundational runtime infrastructure for the taste discovery core:
//! - Logging and tracing infrastructure
//! - Configuration management
//!
//! ## Overview
//!
//! This crate contains the runtime utilities that other modules depend on.
//! It establishes the configuration surface (pipeline limits, timeouts,
//! service credentials) and the logging conventions used throughout the
//! workspace.

pub mod config;
pub mod error;
pub mod logging;

pub use config::{CoreConfig, DiscoveryConfig, FeatureFlags, ServiceApiConfig};
pub use error::{Error, Result};
