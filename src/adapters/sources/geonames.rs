//! GeoNames adapter. Implements MarketSource via the countryInfoJSON API.
//!
//! One API call returns every country with its spoken languages (a
//! comma-separated code list) and total population; the adapter fans each
//! country out into one raw market row per language. Malformed entries are
//! skipped and reported.

use crate::domain::ingest::RawMarketRecord;
use crate::domain::DomainError;
use crate::ports::MarketSource;
use serde::Deserialize;
use std::time::Duration;
use tracing::{info, warn};

const COUNTRY_INFO_URL: &str = "http://api.geonames.org/countryInfoJSON";

#[derive(Debug, Deserialize)]
struct CountryInfoResponse {
    #[serde(default)]
    geonames: Vec<CountryEntry>,
}

/// GeoNames delivers population as a string and languages as "en-US,haw".
#[derive(Debug, Deserialize)]
struct CountryEntry {
    #[serde(rename = "countryName", default)]
    country_name: Option<String>,
    #[serde(default)]
    capital: Option<String>,
    #[serde(default)]
    population: Option<String>,
    #[serde(default)]
    languages: Option<String>,
}

/// GeoNames countryInfo adapter. Requires a registered (free) username.
pub struct GeoNamesAdapter {
    client: reqwest::Client,
    username: String,
}

impl GeoNamesAdapter {
    pub fn new(username: String, timeout: Duration) -> Result<Self, DomainError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| DomainError::Source(format!("build HTTP client: {}", e)))?;
        Ok(Self { client, username })
    }

    fn entry_to_rows(entry: &CountryEntry) -> Option<Vec<RawMarketRecord>> {
        let country = entry.country_name.as_deref()?.trim();
        let languages = entry.languages.as_deref()?.trim();
        if country.is_empty() || languages.is_empty() {
            return None;
        }
        let population = entry
            .population
            .as_deref()
            .and_then(|p| p.trim().parse::<i64>().ok())?;

        let rows = languages
            .split(',')
            .map(str::trim)
            .filter(|code| !code.is_empty())
            .map(|code| RawMarketRecord {
                country: Some(country.to_string()),
                capital: entry.capital.clone(),
                language_code: Some(code.to_string()),
                language: None,
                population: Some(population),
            })
            .collect::<Vec<_>>();
        (!rows.is_empty()).then_some(rows)
    }
}

#[async_trait::async_trait]
impl MarketSource for GeoNamesAdapter {
    async fn fetch_market(&self) -> Result<Vec<RawMarketRecord>, DomainError> {
        let response = self
            .client
            .get(COUNTRY_INFO_URL)
            .query(&[("username", self.username.as_str())])
            .send()
            .await
            .map_err(|e| DomainError::Source(format!("GeoNames request failed: {}", e)))?;
        if !response.status().is_success() {
            return Err(DomainError::Source(format!(
                "GeoNames API error: HTTP {}",
                response.status()
            )));
        }
        let payload: CountryInfoResponse = response
            .json()
            .await
            .map_err(|e| DomainError::Source(format!("GeoNames payload: {}", e)))?;

        let mut records = Vec::new();
        let mut skipped = 0usize;
        for entry in &payload.geonames {
            match Self::entry_to_rows(entry) {
                Some(rows) => records.extend(rows),
                None => {
                    skipped += 1;
                    warn!(country = ?entry.country_name, "skipping malformed GeoNames entry");
                }
            }
        }
        info!(
            countries = payload.geonames.len(),
            rows = records.len(),
            skipped,
            "GeoNames market fetched"
        );
        Ok(records)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(name: Option<&str>, languages: Option<&str>, population: Option<&str>) -> CountryEntry {
        CountryEntry {
            country_name: name.map(String::from),
            capital: Some("Capital".into()),
            population: population.map(String::from),
            languages: languages.map(String::from),
        }
    }

    #[test]
    fn test_entry_fans_out_per_language() {
        let rows =
            GeoNamesAdapter::entry_to_rows(&entry(Some("Belgium"), Some("nl-BE,fr-BE,de-BE"), Some("11400000")))
                .unwrap();
        assert_eq!(rows.len(), 3);
        assert!(rows.iter().all(|r| r.country.as_deref() == Some("Belgium")));
        assert!(rows.iter().all(|r| r.population == Some(11_400_000)));
        assert_eq!(rows[0].language_code.as_deref(), Some("nl-BE"));
    }

    #[test]
    fn test_entry_without_languages_is_skipped() {
        assert!(GeoNamesAdapter::entry_to_rows(&entry(Some("Nowhere"), None, Some("5"))).is_none());
        assert!(GeoNamesAdapter::entry_to_rows(&entry(Some("Nowhere"), Some(" "), Some("5"))).is_none());
    }

    #[test]
    fn test_entry_with_bad_population_is_skipped() {
        assert!(
            GeoNamesAdapter::entry_to_rows(&entry(Some("Nowhere"), Some("en"), Some("many"))).is_none()
        );
        assert!(GeoNamesAdapter::entry_to_rows(&entry(Some("Nowhere"), Some("en"), None)).is_none());
    }
}
