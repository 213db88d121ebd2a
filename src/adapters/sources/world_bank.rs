//! World Bank adapter. Implements EconomySource via the indicator REST API.
//!
//! Fetches GDP (NY.GDP.MKTP.CD) and population (SP.POP.TOTL) for every known
//! country code for a configured year. Each request carries a hard timeout;
//! a country that fails or times out is reported and skipped, never retried
//! within the cycle.

use crate::domain::ingest::RawEconomyRecord;
use crate::domain::{reconcile, DomainError};
use crate::ports::EconomySource;
use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;
use tracing::warn;

const GDP_API: &str = "https://api.worldbank.org/v2/country/{code}/indicator/NY.GDP.MKTP.CD?format=json";
const POP_API: &str = "https://api.worldbank.org/v2/country/{code}/indicator/SP.POP.TOTL?format=json";

/// Pause between indicator requests to stay under the API rate limits.
const REQUEST_DELAY: Duration = Duration::from_millis(50);

/// World Bank API adapter.
pub struct WorldBankAdapter {
    client: reqwest::Client,
    year: i32,
}

impl WorldBankAdapter {
    /// Create the adapter with a per-request timeout. A request past the
    /// deadline counts as failed for this refresh cycle.
    pub fn new(year: i32, timeout: Duration) -> Result<Self, DomainError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| DomainError::Source(format!("build HTTP client: {}", e)))?;
        Ok(Self { client, year })
    }

    /// Fetch the indicator value for one country and the configured year.
    /// The API answers `[metadata, [entries]]`; entries carry `date` (year
    /// string) and a nullable `value`.
    async fn fetch_latest_value(&self, api: &str, code: &str) -> Result<Option<f64>, DomainError> {
        let url = api.replace("{code}", code);
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| DomainError::Source(format!("{}: {}", code, e)))?;
        if !response.status().is_success() {
            return Err(DomainError::Source(format!(
                "{}: HTTP {}",
                code,
                response.status()
            )));
        }
        let payload: serde_json::Value = response
            .json()
            .await
            .map_err(|e| DomainError::Source(format!("{}: {}", code, e)))?;

        let Some(entries) = payload.get(1).and_then(|v| v.as_array()) else {
            return Ok(None);
        };
        for entry in entries {
            let year_matches = entry
                .get("date")
                .and_then(|d| d.as_str())
                .and_then(|d| d.parse::<i32>().ok())
                == Some(self.year);
            if year_matches {
                if let Some(value) = entry.get("value").and_then(|v| v.as_f64()) {
                    return Ok(Some(value));
                }
            }
        }
        Ok(None)
    }
}

#[async_trait::async_trait]
impl EconomySource for WorldBankAdapter {
    async fn fetch_economies(&self) -> Result<Vec<RawEconomyRecord>, DomainError> {
        let codes = reconcile::known_country_codes();
        let bar = ProgressBar::new(codes.len() as u64);
        bar.set_style(
            ProgressStyle::with_template("{msg} [{bar:40}] {pos}/{len}")
                .unwrap_or_else(|_| ProgressStyle::default_bar()),
        );
        bar.set_message("Fetching GDP & population");

        let mut records = Vec::new();
        let mut failures = 0usize;
        for code in codes.iter().copied() {
            let gdp = match self.fetch_latest_value(GDP_API, code).await {
                Ok(v) => v,
                Err(e) => {
                    failures += 1;
                    warn!(code, error = %e, "GDP fetch failed, skipping country");
                    bar.inc(1);
                    continue;
                }
            };
            tokio::time::sleep(REQUEST_DELAY).await;
            let population = match self.fetch_latest_value(POP_API, code).await {
                Ok(v) => v,
                Err(e) => {
                    failures += 1;
                    warn!(code, error = %e, "population fetch failed, skipping country");
                    bar.inc(1);
                    continue;
                }
            };
            tokio::time::sleep(REQUEST_DELAY).await;

            // Keep the row when at least one indicator came back.
            if gdp.is_some() || population.is_some() {
                records.push(RawEconomyRecord {
                    iso_code: Some(code.to_string()),
                    gdp,
                    population_gdp: population.map(|p| p as i64),
                });
            }
            bar.inc(1);
        }
        bar.finish_and_clear();

        if records.is_empty() {
            return Err(DomainError::Source(format!(
                "World Bank fetch produced no rows ({} failures)",
                failures
            )));
        }
        if failures > 0 {
            warn!(failures, fetched = records.len(), "World Bank fetch finished with failures");
        }
        Ok(records)
    }
}
