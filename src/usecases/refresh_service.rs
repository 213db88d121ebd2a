//! Main refresh logic: fetch from sources -> validate -> reconcile -> upsert.
//!
//! - Partial-failure tolerant: a malformed record is rejected and counted,
//!   the rest of the batch continues; a failed source skips its tables for
//!   this cycle and the others still refresh.
//! - Unresolved country identifiers are counted and reported, and the rows
//!   kept with a NULL code (excluded from economy joins, not zero-filled).
//! - Runs to completion before any aggregation or training reads begin.

use crate::domain::ingest::{self, RawCastRecord, RawGenreRecord, RawMovieRecord};
use crate::domain::{CastCredit, DomainError, GenreTag, Movie};
use crate::ports::{CatalogSource, EconomySource, MarketSource, StorePort};
use std::collections::{BTreeSet, HashSet};
use std::sync::Arc;
use tracing::{info, warn};

/// Refresh service. Coordinates the three sources and the entity store.
pub struct RefreshService {
    catalog: Arc<dyn CatalogSource>,
    market: Arc<dyn MarketSource>,
    economy: Arc<dyn EconomySource>,
    store: Arc<dyn StorePort>,
}

/// Result of one refresh cycle.
#[derive(Debug, Default)]
pub struct RefreshStats {
    pub movies_ingested: usize,
    pub genres_ingested: usize,
    pub cast_ingested: usize,
    pub market_ingested: usize,
    pub economies_ingested: usize,
    /// Malformed records rejected across all tables.
    pub rejected: usize,
    /// Market rows whose country did not resolve to a canonical code.
    pub unresolved_countries: usize,
    /// Sources that failed outright this cycle (their tables were skipped).
    pub sources_failed: usize,
}

impl RefreshService {
    pub fn new(
        catalog: Arc<dyn CatalogSource>,
        market: Arc<dyn MarketSource>,
        economy: Arc<dyn EconomySource>,
        store: Arc<dyn StorePort>,
    ) -> Self {
        Self {
            catalog,
            market,
            economy,
            store,
        }
    }

    /// Run one full refresh cycle. Idempotent: re-running for the same source
    /// data yields the same final store content.
    pub async fn refresh(&self) -> Result<RefreshStats, DomainError> {
        let mut stats = RefreshStats::default();

        match self.catalog.fetch_movies().await {
            Ok(raw_movies) => self.ingest_catalog(raw_movies, &mut stats).await?,
            Err(e) => {
                stats.sources_failed += 1;
                warn!(error = %e, "catalog source failed, skipping movie tables this cycle");
            }
        }

        match self.market.fetch_market().await {
            Ok(raw_market) => self.ingest_market(raw_market, &mut stats).await?,
            Err(e) => {
                stats.sources_failed += 1;
                warn!(error = %e, "market source failed, skipping language_market this cycle");
            }
        }

        match self.economy.fetch_economies().await {
            Ok(raw_economies) => self.ingest_economies(raw_economies, &mut stats).await?,
            Err(e) => {
                stats.sources_failed += 1;
                warn!(error = %e, "economy source failed, skipping world_bank_data this cycle");
            }
        }

        info!(
            movies = stats.movies_ingested,
            genres = stats.genres_ingested,
            cast = stats.cast_ingested,
            market = stats.market_ingested,
            economies = stats.economies_ingested,
            rejected = stats.rejected,
            unresolved_countries = stats.unresolved_countries,
            sources_failed = stats.sources_failed,
            "refresh complete"
        );
        Ok(stats)
    }

    /// Movies plus their genre/cast associations. Associations are validated
    /// against the movie ids of this batch, so a dangling row never lands.
    async fn ingest_catalog(
        &self,
        raw_movies: Vec<RawMovieRecord>,
        stats: &mut RefreshStats,
    ) -> Result<(), DomainError> {
        let mut movies: Vec<Movie> = Vec::with_capacity(raw_movies.len());
        for raw in raw_movies {
            match ingest::movie_from_raw(raw) {
                Ok(movie) => movies.push(movie),
                Err(e) => {
                    stats.rejected += 1;
                    warn!(error = %e, "rejected movie record");
                }
            }
        }
        let known_ids: HashSet<i64> = movies.iter().map(|m| m.movie_id).collect();
        self.store.upsert_movies(&movies).await?;
        stats.movies_ingested = movies.len();

        let raw_genres: Vec<RawGenreRecord> = match self.catalog.fetch_genres().await {
            Ok(rows) => rows,
            Err(e) => {
                stats.sources_failed += 1;
                warn!(error = %e, "genre fetch failed, skipping genres this cycle");
                Vec::new()
            }
        };
        let mut genres: Vec<GenreTag> = Vec::with_capacity(raw_genres.len());
        for raw in raw_genres {
            match ingest::genre_from_raw(raw, &known_ids) {
                Ok(tag) => genres.push(tag),
                Err(e) => {
                    stats.rejected += 1;
                    warn!(error = %e, "rejected genre record");
                }
            }
        }
        self.store.upsert_genres(&genres).await?;
        stats.genres_ingested = genres.len();

        let raw_cast: Vec<RawCastRecord> = match self.catalog.fetch_cast().await {
            Ok(rows) => rows,
            Err(e) => {
                stats.sources_failed += 1;
                warn!(error = %e, "cast fetch failed, skipping cast this cycle");
                Vec::new()
            }
        };
        let mut credits: Vec<CastCredit> = Vec::with_capacity(raw_cast.len());
        for raw in raw_cast {
            match ingest::cast_from_raw(raw, &known_ids) {
                Ok(credit) => credits.push(credit),
                Err(e) => {
                    stats.rejected += 1;
                    warn!(error = %e, "rejected cast record");
                }
            }
        }
        self.store.upsert_cast(&credits).await?;
        stats.cast_ingested = credits.len();
        Ok(())
    }

    async fn ingest_market(
        &self,
        raw_market: Vec<crate::domain::ingest::RawMarketRecord>,
        stats: &mut RefreshStats,
    ) -> Result<(), DomainError> {
        let mut entries = Vec::with_capacity(raw_market.len());
        let mut unresolved_names: BTreeSet<String> = BTreeSet::new();
        for raw in raw_market {
            match ingest::market_from_raw(raw) {
                Ok(entry) => {
                    if entry.country_code.is_none() {
                        stats.unresolved_countries += 1;
                        unresolved_names.insert(entry.country.clone());
                    }
                    entries.push(entry);
                }
                Err(e) => {
                    stats.rejected += 1;
                    warn!(error = %e, "rejected market record");
                }
            }
        }
        if !unresolved_names.is_empty() {
            warn!(
                count = stats.unresolved_countries,
                countries = ?unresolved_names,
                "market rows with unresolved country identifiers (excluded from economy joins)"
            );
        }
        self.store.upsert_market(&entries).await?;
        stats.market_ingested = entries.len();
        Ok(())
    }

    async fn ingest_economies(
        &self,
        raw_economies: Vec<crate::domain::ingest::RawEconomyRecord>,
        stats: &mut RefreshStats,
    ) -> Result<(), DomainError> {
        let mut economies = Vec::with_capacity(raw_economies.len());
        for raw in raw_economies {
            match ingest::economy_from_raw(raw) {
                Ok(economy) => economies.push(economy),
                Err(e) => {
                    stats.rejected += 1;
                    warn!(error = %e, "rejected economy record");
                }
            }
        }
        self.store.upsert_economies(&economies).await?;
        stats.economies_ingested = economies.len();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::persistence::sqlite_store::SqliteStore;
    use crate::domain::ingest::{RawEconomyRecord, RawMarketRecord};

    struct FakeCatalog {
        fail: bool,
    }

    #[async_trait::async_trait]
    impl CatalogSource for FakeCatalog {
        async fn fetch_movies(&self) -> Result<Vec<RawMovieRecord>, DomainError> {
            if self.fail {
                return Err(DomainError::Source("catalog offline".into()));
            }
            Ok(vec![
                RawMovieRecord {
                    movie_id: Some(1),
                    title: Some("Summer Hit".into()),
                    release_date: Some("2023-07-21".into()),
                    budget: Some(1_000_000.0),
                    revenue: Some(50_000_000.0),
                    language: Some("ko".into()),
                },
                RawMovieRecord {
                    movie_id: Some(2),
                    title: Some("Broken".into()),
                    budget: Some(-10.0),
                    ..Default::default()
                },
            ])
        }

        async fn fetch_genres(&self) -> Result<Vec<RawGenreRecord>, DomainError> {
            Ok(vec![
                RawGenreRecord { movie_id: Some(1), genre: Some("Action".into()) },
                // Dangling: movie 2 was rejected, so this must be too.
                RawGenreRecord { movie_id: Some(2), genre: Some("Drama".into()) },
            ])
        }

        async fn fetch_cast(&self) -> Result<Vec<RawCastRecord>, DomainError> {
            Ok(vec![RawCastRecord {
                movie_id: Some(1),
                actor: Some("Lee Byung-hun".into()),
            }])
        }
    }

    struct FakeMarket;

    #[async_trait::async_trait]
    impl MarketSource for FakeMarket {
        async fn fetch_market(&self) -> Result<Vec<RawMarketRecord>, DomainError> {
            Ok(vec![
                RawMarketRecord {
                    country: Some("Korea".into()),
                    capital: Some("Seoul".into()),
                    language_code: Some("ko".into()),
                    population: Some(50_000_000),
                    ..Default::default()
                },
                RawMarketRecord {
                    country: Some("Atlantis".into()),
                    language_code: Some("en".into()),
                    population: Some(1_000),
                    ..Default::default()
                },
            ])
        }
    }

    struct FakeEconomy;

    #[async_trait::async_trait]
    impl EconomySource for FakeEconomy {
        async fn fetch_economies(&self) -> Result<Vec<RawEconomyRecord>, DomainError> {
            Ok(vec![RawEconomyRecord {
                iso_code: Some("KOR".into()),
                gdp: Some(1.8e12),
                population_gdp: Some(51_000_000),
            }])
        }
    }

    async fn service(dir: &std::path::Path, catalog_fails: bool) -> (RefreshService, Arc<SqliteStore>) {
        let store = Arc::new(SqliteStore::connect(dir).await.unwrap());
        let service = RefreshService::new(
            Arc::new(FakeCatalog { fail: catalog_fails }),
            Arc::new(FakeMarket),
            Arc::new(FakeEconomy),
            Arc::clone(&store) as Arc<dyn StorePort>,
        );
        (service, store)
    }

    #[tokio::test]
    async fn test_refresh_validates_and_reconciles() {
        let dir = tempfile::tempdir().unwrap();
        let (service, store) = service(dir.path(), false).await;

        let stats = service.refresh().await.unwrap();
        assert_eq!(stats.movies_ingested, 1);
        assert_eq!(stats.genres_ingested, 1);
        assert_eq!(stats.cast_ingested, 1);
        assert_eq!(stats.market_ingested, 2);
        assert_eq!(stats.economies_ingested, 1);
        // One bad movie + one dangling genre row.
        assert_eq!(stats.rejected, 2);
        assert_eq!(stats.unresolved_countries, 1);
        assert_eq!(stats.sources_failed, 0);

        let market = store.get_market().await.unwrap();
        let korea = market.iter().find(|e| e.country == "Korea").unwrap();
        assert_eq!(korea.country_code.as_deref(), Some("KOR"));
        let atlantis = market.iter().find(|e| e.country == "Atlantis").unwrap();
        assert!(atlantis.country_code.is_none());
    }

    #[tokio::test]
    async fn test_refresh_twice_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let (service, store) = service(dir.path(), false).await;

        service.refresh().await.unwrap();
        let first_movies = store.get_movies().await.unwrap();
        let first_market = store.get_market().await.unwrap();

        service.refresh().await.unwrap();
        let second_movies = store.get_movies().await.unwrap();
        let second_market = store.get_market().await.unwrap();

        assert_eq!(first_movies.len(), second_movies.len());
        assert_eq!(first_market.len(), second_market.len());
    }

    #[tokio::test]
    async fn test_failed_source_skips_only_its_tables() {
        let dir = tempfile::tempdir().unwrap();
        let (service, store) = service(dir.path(), true).await;

        let stats = service.refresh().await.unwrap();
        assert_eq!(stats.sources_failed, 1);
        assert_eq!(stats.movies_ingested, 0);
        // Market and economy still refreshed.
        assert_eq!(stats.market_ingested, 2);
        assert_eq!(stats.economies_ingested, 1);
        assert!(store.get_movies().await.unwrap().is_empty());
        assert_eq!(store.get_economies().await.unwrap().len(), 1);
    }
}
