//! Analytics service. Read-only derived views over the entity store.
//!
//! Fetches current rows and delegates to the pure aggregation functions;
//! every report is a deterministic function of store content. Safe to run in
//! any order with training after a refresh completes.

use crate::adapters::export::movies_to_csv;
use crate::domain::aggregate::{self, AudienceReach, LanguageRollup};
use crate::domain::{DomainError, Metric};
use crate::ports::StorePort;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::fs;
use tracing::info;

/// Everything the presentation layer consumes in one pass: each aggregate is
/// a mapping from group key to a [`Metric`] (or an explicit rollup struct).
#[derive(Debug)]
pub struct AggregateReport {
    pub revenue_by_genre: BTreeMap<String, Metric>,
    pub revenue_by_month: BTreeMap<u32, Metric>,
    pub revenue_by_language: BTreeMap<String, Metric>,
    pub revenue_per_million_speakers: BTreeMap<String, Metric>,
    pub language_rollup: BTreeMap<String, LanguageRollup>,
    pub gdp_population: Vec<(String, f64, i64)>,
    pub audience_reach: Vec<AudienceReach>,
}

/// Aggregation engine facade over the store.
pub struct AnalyticsService {
    store: Arc<dyn StorePort>,
}

impl AnalyticsService {
    pub fn new(store: Arc<dyn StorePort>) -> Self {
        Self { store }
    }

    /// Compute all derived views from current store content.
    pub async fn aggregates(&self) -> Result<AggregateReport, DomainError> {
        let movies = self.store.get_movies().await?;
        let genre_rows = self.store.get_genre_revenue().await?;
        let market = self.store.get_market().await?;
        let economies = self.store.get_economies().await?;

        let report = AggregateReport {
            revenue_by_genre: aggregate::revenue_by_genre(&genre_rows),
            revenue_by_month: aggregate::revenue_by_month(&movies),
            revenue_by_language: aggregate::revenue_by_language(&movies),
            revenue_per_million_speakers: aggregate::revenue_per_million_speakers(&movies, &market),
            language_rollup: aggregate::language_rollup(&market, &economies),
            gdp_population: aggregate::gdp_population(&economies),
            audience_reach: aggregate::audience_reach(&movies, &market),
        };
        info!(
            movies = movies.len(),
            genres = report.revenue_by_genre.len(),
            languages = report.revenue_by_language.len(),
            "aggregates computed"
        );
        Ok(report)
    }

    /// Export the movie table as CSV next to the data directory.
    pub async fn export_movies(&self, path: impl AsRef<Path>) -> Result<PathBuf, DomainError> {
        let movies = self.store.get_movies().await?;
        let csv = movies_to_csv(&movies)
            .map_err(|e| DomainError::Store(format!("CSV export failed: {}", e)))?;
        let path = path.as_ref().to_path_buf();
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .await
                .map_err(|e| DomainError::Store(format!("create export dir: {}", e)))?;
        }
        fs::write(&path, csv)
            .await
            .map_err(|e| DomainError::Store(format!("write export: {}", e)))?;
        info!(path = %path.display(), count = movies.len(), "movie table exported");
        Ok(path)
    }
}
