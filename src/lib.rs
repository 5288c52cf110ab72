//! # Toolgate - Declarative HTTP Tool Registry
//!
//! Operators declare external HTTP integrations as data and Toolgate exposes
//! each active one as a named, described capability an agent runtime can call:
//! - Tool record store (SQLite) with an idempotent built-in seed set
//! - Credential injection for bearer, API-key, and basic schemes
//! - Generic request execution (query string for GET, JSON body otherwise)
//! - Declarative response mapping with silent degradation
//! - Connectivity probes persisted back to the store
//!
//! ## Architecture
//!
//! ```text
//!   ToolStore ──► Capability ──► RequestExecutor ──► ResponseMapper ──► text
//!       ▲                              │
//!       └──── ConnectivityProber ◄─────┘
//! ```
//!
//! [`ToolRegistry`] wires these together around one explicitly opened store.

// Enforce strict safety at compile time
#![deny(unsafe_code)]
#![warn(missing_debug_implementations)]
#![warn(rust_2018_idioms)]

pub mod store;
pub mod tools;
pub mod types;

// Internal utilities
pub mod observability;

pub use store::ToolStore;
pub use tools::{Capability, ToolDefinition, ToolRegistry};
pub use types::{Config, Error, Result, ToolId};
