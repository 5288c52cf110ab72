//! Tool infrastructure - definitions, credentials, execution, mapping,
//! probing, and capability export.
//!
//! Tools are data: an operator declares the endpoint, verb, auth scheme,
//! documented parameters, and response mapping, and the generic pipeline
//! here turns that record into an invocable capability.

pub mod auth;
pub mod capability;
pub mod definition;
pub mod executor;
pub mod mapping;
pub mod probe;
pub mod registry;

pub use auth::{build_auth_headers, merge_headers};
pub use capability::{describe, export, Capability};
pub use definition::{
    Authentication, FieldMapping, FieldType, ParamDef, ParamType, ResponseMapping, TestStatus,
    ToolDefinition, ToolKind,
};
pub use executor::{RawResponse, RequestExecutor};
pub use mapping::{MappedResult, MappingError, ResponseMapper};
pub use probe::{ConnectivityProber, ProbeResult};
pub use registry::ToolRegistry;
