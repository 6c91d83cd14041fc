//! Request handlers for API endpoints
//!
//! Handlers extract and validate parameters, call the directory service and
//! serialize its result. Errors render through `crate::Error`.

pub mod metrics;
pub mod search;

pub use metrics::*;
pub use search::*;
