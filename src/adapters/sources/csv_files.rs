//! CSV file sources. The offline counterpart of the HTTP adapters: each
//! reads one exported table from the data directory using the csv crate.
//!
//! Row-level parse failures are skipped and reported; validation of the
//! surviving raw records happens in the refresh use case.

use crate::domain::ingest::{
    RawCastRecord, RawEconomyRecord, RawGenreRecord, RawMarketRecord, RawMovieRecord,
};
use crate::domain::DomainError;
use crate::ports::{CatalogSource, EconomySource, MarketSource};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::warn;

#[derive(Debug, Deserialize)]
struct MovieRow {
    movie_id: Option<i64>,
    title: Option<String>,
    #[serde(default)]
    release_date: Option<String>,
    #[serde(default)]
    budget: Option<f64>,
    #[serde(default)]
    revenue: Option<f64>,
    #[serde(default)]
    language: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GenreRow {
    movie_id: Option<i64>,
    genre: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CastRow {
    movie_id: Option<i64>,
    actor: Option<String>,
}

#[derive(Debug, Deserialize)]
struct MarketRow {
    country: Option<String>,
    #[serde(default)]
    capital: Option<String>,
    #[serde(default)]
    language_code: Option<String>,
    #[serde(default)]
    language: Option<String>,
    #[serde(default)]
    population: Option<i64>,
}

#[derive(Debug, Deserialize)]
struct EconomyRow {
    iso_code: Option<String>,
    #[serde(default)]
    gdp: Option<f64>,
    #[serde(default)]
    population_gdp: Option<i64>,
}

/// Read and deserialize one CSV file; unparseable rows are skipped with a
/// warning, a missing file is a source error (the refresh cycle skips the
/// table and reports it).
async fn read_rows<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>, DomainError> {
    let content = tokio::fs::read_to_string(path)
        .await
        .map_err(|e| DomainError::Source(format!("read {}: {}", path.display(), e)))?;
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(content.as_bytes());
    let mut rows = Vec::new();
    let mut skipped = 0usize;
    for record in reader.deserialize::<T>() {
        match record {
            Ok(row) => rows.push(row),
            Err(e) => {
                skipped += 1;
                warn!(path = %path.display(), error = %e, "skipping unparseable CSV row");
            }
        }
    }
    if skipped > 0 {
        warn!(path = %path.display(), skipped, "CSV rows skipped during parse");
    }
    Ok(rows)
}

/// Film catalog from movies.csv / genres.csv / cast.csv.
pub struct CsvCatalogSource {
    data_dir: PathBuf,
}

impl CsvCatalogSource {
    pub fn new(data_dir: impl AsRef<Path>) -> Self {
        Self {
            data_dir: data_dir.as_ref().to_path_buf(),
        }
    }
}

#[async_trait::async_trait]
impl CatalogSource for CsvCatalogSource {
    async fn fetch_movies(&self) -> Result<Vec<RawMovieRecord>, DomainError> {
        let rows: Vec<MovieRow> = read_rows(&self.data_dir.join("movies.csv")).await?;
        Ok(rows
            .into_iter()
            .map(|r| RawMovieRecord {
                movie_id: r.movie_id,
                title: r.title,
                release_date: r.release_date,
                budget: r.budget,
                revenue: r.revenue,
                language: r.language,
            })
            .collect())
    }

    async fn fetch_genres(&self) -> Result<Vec<RawGenreRecord>, DomainError> {
        let rows: Vec<GenreRow> = read_rows(&self.data_dir.join("genres.csv")).await?;
        Ok(rows
            .into_iter()
            .map(|r| RawGenreRecord {
                movie_id: r.movie_id,
                genre: r.genre,
            })
            .collect())
    }

    async fn fetch_cast(&self) -> Result<Vec<RawCastRecord>, DomainError> {
        let rows: Vec<CastRow> = read_rows(&self.data_dir.join("cast.csv")).await?;
        Ok(rows
            .into_iter()
            .map(|r| RawCastRecord {
                movie_id: r.movie_id,
                actor: r.actor,
            })
            .collect())
    }
}

/// Language market from language_market.csv.
pub struct CsvMarketSource {
    data_dir: PathBuf,
}

impl CsvMarketSource {
    pub fn new(data_dir: impl AsRef<Path>) -> Self {
        Self {
            data_dir: data_dir.as_ref().to_path_buf(),
        }
    }
}

#[async_trait::async_trait]
impl MarketSource for CsvMarketSource {
    async fn fetch_market(&self) -> Result<Vec<RawMarketRecord>, DomainError> {
        let rows: Vec<MarketRow> = read_rows(&self.data_dir.join("language_market.csv")).await?;
        Ok(rows
            .into_iter()
            .map(|r| RawMarketRecord {
                country: r.country,
                capital: r.capital,
                language_code: r.language_code,
                language: r.language,
                population: r.population,
            })
            .collect())
    }
}

/// Country economics from world_bank_data.csv (a previous fetch cycle's
/// cache, or a hand-maintained export).
pub struct CsvEconomySource {
    data_dir: PathBuf,
}

impl CsvEconomySource {
    pub fn new(data_dir: impl AsRef<Path>) -> Self {
        Self {
            data_dir: data_dir.as_ref().to_path_buf(),
        }
    }
}

#[async_trait::async_trait]
impl EconomySource for CsvEconomySource {
    async fn fetch_economies(&self) -> Result<Vec<RawEconomyRecord>, DomainError> {
        let rows: Vec<EconomyRow> = read_rows(&self.data_dir.join("world_bank_data.csv")).await?;
        Ok(rows
            .into_iter()
            .map(|r| RawEconomyRecord {
                iso_code: r.iso_code,
                gdp: r.gdp,
                population_gdp: r.population_gdp,
            })
            .collect())
    }
}
