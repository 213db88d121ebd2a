//! Domain entities. Pure data structures for the core business.
//!
//! No SQL/HTTP types here — these are mapped from adapters.

use serde::{Deserialize, Serialize};

/// A single film record from the catalog source.
///
/// `budget`/`revenue` are `None` when the source carried no figure; rows with
/// a missing side are excluded from ratio-based aggregates. Negative amounts
/// never reach this type — validation rejects them at ingestion.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Movie {
    pub movie_id: i64,
    pub title: String,
    /// ISO `YYYY-MM-DD` date string, as delivered by the catalog. `None` when absent.
    pub release_date: Option<String>,
    pub budget: Option<f64>,
    pub revenue: Option<f64>,
    /// Primary spoken language of the film (usually an ISO-639-1 code).
    /// Distinct from the language-market rows: this is the film's own field.
    pub language: Option<String>,
}

/// (movie, genre label) association. A movie may carry any number of genres.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenreTag {
    pub movie_id: i64,
    pub genre: String,
}

/// (movie, actor name) association.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CastCredit {
    pub movie_id: i64,
    pub actor: String,
}

/// One (language, country) market row: how many people in `country` speak
/// `language`. Many-to-many: a language spans countries, a country hosts
/// several languages.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LanguageMarketEntry {
    /// ISO-639-1 language code ("en", "ko", ...).
    pub language_code: String,
    /// English language name ("English", "Korean", ...).
    pub language: String,
    /// Country name as delivered by the market source (free text).
    pub country: String,
    /// Reconciled ISO-3166 alpha-3 code. `None` = unresolved; the row is then
    /// excluded from GDP-weighted joins, never coerced to a zero economy.
    pub country_code: Option<String>,
    pub capital: Option<String>,
    /// Speaker population in the country. Never negative.
    pub population: i64,
}

/// Per-country macro indicators keyed by ISO-3166 alpha-3 code.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CountryEconomy {
    pub iso_code: String,
    /// GDP in current US$. `None` when the indicator had no value.
    pub gdp: Option<f64>,
    /// Population figure backing the GDP indicator.
    pub population_gdp: Option<i64>,
}

/// Aggregate output value. `NotComputable` marks a guarded denominator
/// (zero or missing data) and is distinct from an observed numeric zero.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Metric {
    Value(f64),
    NotComputable,
}

impl Metric {
    /// Guarded ratio: `None`/zero denominators yield `NotComputable`.
    pub fn ratio(numerator: f64, denominator: f64) -> Self {
        if denominator > 0.0 {
            Metric::Value(numerator / denominator)
        } else {
            Metric::NotComputable
        }
    }

    pub fn value(&self) -> Option<f64> {
        match self {
            Metric::Value(v) => Some(*v),
            Metric::NotComputable => None,
        }
    }
}

impl std::fmt::Display for Metric {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Metric::Value(v) => write!(f, "{:.2}", v),
            Metric::NotComputable => write!(f, "n/a"),
        }
    }
}

/// Reconciler verdict for a raw country/language string.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Resolution {
    /// Canonical code (ISO-3166 alpha-3 for countries, ISO-639-1 for languages).
    Canonical(String),
    /// No confident mapping. Callers exclude the record from code-dependent
    /// joins and report the miss; guessing is not allowed.
    Unresolved,
}

impl Resolution {
    pub fn canonical(&self) -> Option<&str> {
        match self {
            Resolution::Canonical(code) => Some(code),
            Resolution::Unresolved => None,
        }
    }
}
