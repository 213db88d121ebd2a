//! Application configuration. Data paths, source selection, knobs.

use serde::Deserialize;

/// Default World Bank indicator year.
pub const DEFAULT_INDICATOR_YEAR: i32 = 2023;

/// Default per-request timeout for HTTP source adapters, in seconds.
/// A request past the deadline counts as failed for the refresh cycle.
pub const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 10;

/// Default minimum examples per class required after label derivation.
pub const DEFAULT_MIN_CLASS_EXAMPLES: usize = 3;

#[derive(Debug, Deserialize, Default)]
pub struct AppConfig {
    /// Base directory for the SQLite store and exports. Defaults to ./data.
    pub data_dir: Option<String>,

    /// Directory holding the source CSV drops (movies.csv, genres.csv, ...).
    /// Defaults to the data directory.
    #[serde(default)]
    pub csv_dir: Option<String>,

    /// Path of the persisted model artifact. Defaults to ./ml/hit_predictor.json.
    #[serde(default)]
    pub model_path: Option<String>,

    /// Year to fetch World Bank indicators for. Read from FILMLENS_INDICATOR_YEAR.
    #[serde(default)]
    pub indicator_year: Option<i32>,

    /// Enables the World Bank HTTP source instead of world_bank_data.csv.
    /// Read from FILMLENS_WORLD_BANK.
    #[serde(default)]
    pub world_bank: Option<bool>,

    /// GeoNames username. When set, the language market is fetched over HTTP
    /// instead of language_market.csv. Read from FILMLENS_GEONAMES_USER.
    #[serde(default)]
    pub geonames_user: Option<String>,

    /// Per-request timeout for HTTP sources in seconds. Read from FILMLENS_HTTP_TIMEOUT_SECS.
    #[serde(default)]
    pub http_timeout_secs: Option<u64>,

    /// Minimum examples per class for training. Read from FILMLENS_MIN_CLASS_EXAMPLES.
    #[serde(default)]
    pub min_class_examples: Option<usize>,
}

impl AppConfig {
    pub fn load() -> Result<Self, config::ConfigError> {
        dotenv::dotenv().ok();
        let mut c = config::Config::builder();
        c = c.add_source(config::Environment::with_prefix("FILMLENS"));
        if let Ok(path) = std::env::var("FILMLENS_CONFIG") {
            c = c.add_source(config::File::with_name(&path));
        }
        c.build()?.try_deserialize()
    }

    /// Base directory for the store. Defaults to ./data.
    pub fn data_dir_or_default(&self) -> String {
        self.data_dir.clone().unwrap_or_else(|| "./data".to_string())
    }

    /// Directory the CSV sources are read from. Defaults to the data directory.
    pub fn csv_dir_or_default(&self) -> String {
        self.csv_dir.clone().unwrap_or_else(|| self.data_dir_or_default())
    }

    /// Model artifact path. Defaults to ./ml/hit_predictor.json.
    pub fn model_path_or_default(&self) -> String {
        self.model_path
            .clone()
            .unwrap_or_else(|| "./ml/hit_predictor.json".to_string())
    }

    /// World Bank indicator year. Defaults to 2023.
    pub fn indicator_year_or_default(&self) -> i32 {
        self.indicator_year.unwrap_or(DEFAULT_INDICATOR_YEAR)
    }

    /// HTTP source timeout. Defaults to 10 seconds.
    pub fn http_timeout_secs_or_default(&self) -> u64 {
        self.http_timeout_secs.unwrap_or(DEFAULT_HTTP_TIMEOUT_SECS)
    }

    /// Per-class training floor. Defaults to 3.
    pub fn min_class_examples_or_default(&self) -> usize {
        self.min_class_examples.unwrap_or(DEFAULT_MIN_CLASS_EXAMPLES)
    }

    /// Returns true if the live World Bank source is enabled.
    pub fn is_world_bank_enabled(&self) -> bool {
        self.world_bank.unwrap_or(false)
    }

    /// Returns the GeoNames username if the live market source is configured.
    pub fn geonames_user(&self) -> Option<String> {
        self.geonames_user
            .clone()
            .or_else(|| std::env::var("FILMLENS_GEONAMES_USER").ok())
            .filter(|u| !u.trim().is_empty())
    }

    /// Returns true if the live GeoNames market source is configured.
    pub fn is_geonames_configured(&self) -> bool {
        self.geonames_user().is_some()
    }
}
