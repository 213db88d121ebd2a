//! Outbound ports. Application calls into infrastructure.
//!
//! Implemented by adapters.

use crate::domain::aggregate::GenreRevenueRow;
use crate::domain::classifier::HitPredictor;
use crate::domain::ingest::{
    RawCastRecord, RawEconomyRecord, RawGenreRecord, RawMarketRecord, RawMovieRecord,
};
use crate::domain::{CastCredit, CountryEconomy, DomainError, GenreTag, LanguageMarketEntry, Movie};

/// Film catalog source (CSV drop from the metadata provider). Returns raw
/// rows; validation and reconciliation happen in the refresh use case.
#[async_trait::async_trait]
pub trait CatalogSource: Send + Sync {
    async fn fetch_movies(&self) -> Result<Vec<RawMovieRecord>, DomainError>;
    async fn fetch_genres(&self) -> Result<Vec<RawGenreRecord>, DomainError>;
    async fn fetch_cast(&self) -> Result<Vec<RawCastRecord>, DomainError>;
}

/// Language-market source: which languages are spoken where, by how many.
#[async_trait::async_trait]
pub trait MarketSource: Send + Sync {
    async fn fetch_market(&self) -> Result<Vec<RawMarketRecord>, DomainError>;
}

/// Macro-indicator source: GDP and population per country.
#[async_trait::async_trait]
pub trait EconomySource: Send + Sync {
    async fn fetch_economies(&self) -> Result<Vec<RawEconomyRecord>, DomainError>;
}

/// Entity store. Writes are idempotent upserts by natural key: re-running
/// ingestion for the same source data never duplicates rows.
#[async_trait::async_trait]
pub trait StorePort: Send + Sync {
    async fn upsert_movies(&self, movies: &[Movie]) -> Result<(), DomainError>;
    async fn upsert_genres(&self, tags: &[GenreTag]) -> Result<(), DomainError>;
    async fn upsert_cast(&self, credits: &[CastCredit]) -> Result<(), DomainError>;
    async fn upsert_market(&self, entries: &[LanguageMarketEntry]) -> Result<(), DomainError>;
    async fn upsert_economies(&self, economies: &[CountryEconomy]) -> Result<(), DomainError>;

    /// Full movie table.
    async fn get_movies(&self) -> Result<Vec<Movie>, DomainError>;

    /// Genre/movie join rows for the revenue-by-genre aggregate.
    async fn get_genre_revenue(&self) -> Result<Vec<GenreRevenueRow>, DomainError>;

    /// All language-market rows, reconciled codes included.
    async fn get_market(&self) -> Result<Vec<LanguageMarketEntry>, DomainError>;

    /// All country-economy rows.
    async fn get_economies(&self) -> Result<Vec<CountryEconomy>, DomainError>;
}

/// Persisted model artifact: the fitted scaler + linear model bundle.
/// Loaded once per process and reused across inference calls.
#[async_trait::async_trait]
pub trait ModelStorePort: Send + Sync {
    async fn save(&self, predictor: &HitPredictor) -> Result<(), DomainError>;

    /// Cached load; `None` when no model has been trained yet.
    async fn load(&self) -> Result<Option<HitPredictor>, DomainError>;
}
