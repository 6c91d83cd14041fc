//! careway - federated healthcare provider directory search
//!
//! - Per-kind matchers over practitioners, clinics, pharmacies, labs and ambulances
//! - Geo proximity, inverted-index text and substring fallback strategies
//! - Concurrent fan-out with a configurable failure policy
//! - Typeahead suggestions and a known-locations index

pub mod api;
pub mod config;
pub mod db;
pub mod error;
pub mod logging;
pub mod metrics;
pub mod request_context;
pub mod search;
pub mod services;
pub mod state;

pub use config::Config;
pub use error::{Error, Result};
pub use state::AppState;
