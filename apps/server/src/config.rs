//! Service configuration
//!
//! Layering (lowest to highest precedence):
//! 1. Built-in defaults
//! 2. `careway.toml` in the working directory, or the file named by `CAREWAY_CONFIG`
//! 3. Environment variables prefixed with `CAREWAY__`, using `__` between sections
//!    (e.g. `CAREWAY__DATABASE__URL`, `CAREWAY__SEARCH__FAILURE_POLICY=degrade`)
//!
//! A `.env` file is loaded first so local development can keep settings there.

use careway_models::EntityKind;
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub logging: LoggingConfig,
    pub search: SearchConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub cors_origins: Vec<String>,
    pub max_request_body_size: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            cors_origins: Vec::new(),
            max_request_body_size: 64 * 1024,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StoreBackend {
    Postgres,
    Memory,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    pub backend: StoreBackend,
    pub url: Option<String>,
    pub pool_min_size: u32,
    pub pool_max_size: u32,
    pub pool_timeout_seconds: u64,
    /// Applied to every pooled connection; the search core itself never times out.
    pub statement_timeout_seconds: u64,
    pub run_migrations: bool,
    /// JSON fixture (`{"categories": [...], "entities": [...]}`) for the memory backend.
    pub seed_file: Option<String>,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            backend: StoreBackend::Postgres,
            url: None,
            pool_min_size: 1,
            pool_max_size: 10,
            pool_timeout_seconds: 10,
            statement_timeout_seconds: 5,
            run_migrations: true,
            seed_file: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub json: bool,
    pub file_enabled: bool,
    pub file_directory: String,
    pub file_prefix: String,
    /// daily | hourly | minutely | never
    pub file_rotation: String,
    pub opentelemetry_enabled: bool,
    pub otlp_endpoint: String,
    pub otlp_timeout_seconds: u64,
    pub trace_sample_ratio: f64,
    pub service_name: String,
    pub service_version: Option<String>,
    pub deployment_environment: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
            file_enabled: false,
            file_directory: "logs".to_string(),
            file_prefix: "careway".to_string(),
            file_rotation: "daily".to_string(),
            opentelemetry_enabled: false,
            otlp_endpoint: "http://localhost:4317".to_string(),
            otlp_timeout_seconds: 10,
            trace_sample_ratio: 1.0,
            service_name: "careway".to_string(),
            service_version: None,
            deployment_environment: "development".to_string(),
        }
    }
}

/// What the aggregator does when one kind's store query fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailurePolicy {
    /// Any failing kind fails the whole request.
    FailFast,
    /// Failing kinds are reported as unavailable; the rest are returned.
    Degrade,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    pub default_page_size: usize,
    pub max_page_size: usize,
    pub max_distance_km: f64,
    /// Candidate multiplier for proximity searches that also filter by text.
    pub overfetch_factor: usize,
    pub failure_policy: FailurePolicy,
    /// Reject free text combined with coordinates or a place name.
    pub reject_text_with_geography: bool,
    /// Kinds only visible to staff and admin callers, as request selectors.
    #[serde(with = "kind_selectors")]
    pub restricted_kinds: Vec<EntityKind>,
    pub typeahead: TypeaheadConfig,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            default_page_size: 20,
            max_page_size: 100,
            max_distance_km: 25.0,
            overfetch_factor: 5,
            failure_policy: FailurePolicy::FailFast,
            reject_text_with_geography: true,
            restricted_kinds: Vec::new(),
            typeahead: TypeaheadConfig::default(),
        }
    }
}

/// Kinds are written the way callers write them (`labs`, `ambulances`).
mod kind_selectors {
    use careway_models::EntityKind;
    use serde::{de::Error as _, Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(
        kinds: &[EntityKind],
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(kinds.iter().map(EntityKind::selector))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Vec<EntityKind>, D::Error> {
        Vec::<String>::deserialize(deserializer)?
            .iter()
            .map(|raw| EntityKind::from_selector(raw).map_err(D::Error::custom))
            .collect()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TypeaheadConfig {
    pub max_total: usize,
    pub max_per_kind: usize,
    pub default_categories: usize,
}

impl Default for TypeaheadConfig {
    fn default() -> Self {
        Self {
            max_total: 15,
            max_per_kind: 10,
            default_categories: 10,
        }
    }
}

impl Config {
    /// Load configuration from defaults, optional file and environment.
    pub fn load() -> Result<Self, config::ConfigError> {
        let _ = dotenvy::dotenv();

        let file = std::env::var("CAREWAY_CONFIG").unwrap_or_else(|_| "careway".to_string());

        config::Config::builder()
            .add_source(config::Config::try_from(&Config::default())?)
            .add_source(config::File::with_name(&file).required(false))
            .add_source(
                config::Environment::with_prefix("CAREWAY")
                    .prefix_separator("__")
                    .separator("__")
                    .list_separator(",")
                    .with_list_parse_key("server.cors_origins")
                    .with_list_parse_key("search.restricted_kinds")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()
    }

    /// Reject settings the service cannot run with.
    pub fn validate(&self) -> Result<(), String> {
        let search = &self.search;
        if search.default_page_size == 0 || search.max_page_size == 0 {
            return Err("search page sizes must be positive".to_string());
        }
        if search.default_page_size > search.max_page_size {
            return Err(format!(
                "search.default_page_size ({}) exceeds search.max_page_size ({})",
                search.default_page_size, search.max_page_size
            ));
        }
        if !(search.max_distance_km.is_finite() && search.max_distance_km > 0.0) {
            return Err("search.max_distance_km must be a positive number".to_string());
        }
        if search.overfetch_factor == 0 {
            return Err("search.overfetch_factor must be at least 1".to_string());
        }
        if search.typeahead.max_total == 0 {
            return Err("search.typeahead.max_total must be positive".to_string());
        }
        if self.database.backend == StoreBackend::Postgres
            && self.database.url.as_deref().map_or(true, str::is_empty)
        {
            return Err("database.url is required for the postgres backend".to_string());
        }
        if self.database.pool_max_size < self.database.pool_min_size {
            return Err("database.pool_max_size is smaller than pool_min_size".to_string());
        }
        Ok(())
    }

    pub fn socket_addr(&self) -> Result<SocketAddr, std::net::AddrParseError> {
        format!("{}:{}", self.server.host, self.server.port).parse()
    }
}
