//! Core types for the tool registry.
//!
//! This module provides foundational types used throughout the system:
//! - **IDs**: The strongly-typed `ToolId`
//! - **Errors**: Application error types with thiserror derives
//! - **Config**: Configuration for the store, HTTP client, and mapper

mod config;
mod errors;
mod ids;

pub use config::{Config, HttpConfig, MappingConfig, ObservabilityConfig, StoreConfig};
pub use errors::{Error, Result};
pub use ids::ToolId;
