//! Federated directory search core
//!
//! - `token` / `location`: pure predicate helpers
//! - `category`: free-text category resolution
//! - `planner`: strategy selection
//! - `matcher`: per-kind matchers
//! - `aggregate`: concurrent fan-out and the response envelope
//! - `typeahead` / `locations`: lightweight lookups

pub mod aggregate;
pub mod category;
pub mod location;
pub mod locations;
pub mod matcher;
pub mod planner;
pub mod token;
pub mod typeahead;

pub use aggregate::{AggregateOutcome, AggregateResponse, NoResultsResponse, ResultAggregator};
pub use category::CategoryResolver;
pub use locations::list_known_locations;
pub use matcher::{standard_matchers, KindMatcher, MatchPage};
pub use planner::{QueryPlan, SearchFilters, SearchRequest, Strategy};
pub use typeahead::{Suggestion, TypeaheadService};
