//! Training service. Orchestrates the hit-predictor lifecycle.
//!
//! Flow: read the movie table -> engineer features (release month, ratio
//! labels) -> select the label cutoff from the ratio distribution -> fit
//! scaler + model on the training split -> evaluate on the holdout ->
//! persist the artifact. Prediction loads the cached artifact and never
//! refits. Fail-fast on invalid inference input; a failed training run never
//! takes the process down.

use crate::domain::aggregate::release_month;
use crate::domain::classifier::{
    select_hit_threshold, HitPredictor, Prediction, PredictionInput, TrainingRow,
};
use crate::domain::{DomainError, Metric, Movie};
use crate::ports::{ModelStorePort, StorePort};
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};
use tracing::{info, warn};

/// Every 5th engineered row is held out for evaluation (deterministic 80/20).
const HOLDOUT_EVERY: usize = 5;

/// Summary of one training run.
#[derive(Debug)]
pub struct TrainingReport {
    /// Revenue/budget cutoff the labels were derived with.
    pub label_threshold: f64,
    pub hits: usize,
    pub flops: usize,
    pub trained_on: usize,
    /// Accuracy on the held-out split; `NotComputable` when the holdout is empty.
    pub holdout_accuracy: Metric,
}

/// Training/prediction service over the store and the model artifact.
pub struct TrainingService {
    store: Arc<dyn StorePort>,
    models: Arc<dyn ModelStorePort>,
    /// Minimum examples required of each class after label derivation.
    min_class: usize,
}

impl TrainingService {
    pub fn new(store: Arc<dyn StorePort>, models: Arc<dyn ModelStorePort>, min_class: usize) -> Self {
        Self {
            store,
            models,
            min_class,
        }
    }

    /// Engineer training rows from the movie table. A movie contributes only
    /// when budget (positive), revenue, and a parseable release date are all
    /// present — missing sides are excluded, not defaulted.
    fn engineer(movies: &[Movie]) -> Vec<TrainingRow> {
        let mut rows = Vec::new();
        let mut excluded = 0usize;
        for movie in movies {
            let (Some(budget), Some(revenue)) = (movie.budget, movie.revenue) else {
                excluded += 1;
                continue;
            };
            if budget <= 0.0 {
                excluded += 1;
                continue;
            }
            let Some(month) = movie.release_date.as_deref().and_then(release_month) else {
                excluded += 1;
                continue;
            };
            rows.push(TrainingRow {
                budget,
                release_month: month,
                revenue,
            });
        }
        if excluded > 0 {
            info!(excluded, usable = rows.len(), "movies excluded from training set");
        }
        rows
    }

    /// Train a fresh model from current store content and persist it.
    pub async fn train(&self) -> Result<TrainingReport, DomainError> {
        let movies = self.store.get_movies().await?;
        let rows = Self::engineer(&movies);

        let ratios: Vec<f64> = rows.iter().map(TrainingRow::ratio).collect();
        let label_threshold = select_hit_threshold(&ratios, self.min_class)?;
        let labels: Vec<bool> = ratios.iter().map(|&r| r > label_threshold).collect();
        let hits = labels.iter().filter(|&&l| l).count();
        let flops = labels.len() - hits;
        info!(
            label_threshold,
            hits, flops, "label cutoff selected from ratio distribution"
        );

        let mut train_rows = Vec::new();
        let mut train_labels = Vec::new();
        let mut test_rows = Vec::new();
        let mut test_labels = Vec::new();
        for (i, (row, label)) in rows.into_iter().zip(labels).enumerate() {
            if (i + 1) % HOLDOUT_EVERY == 0 {
                test_rows.push(row);
                test_labels.push(label);
            } else {
                train_rows.push(row);
                train_labels.push(label);
            }
        }

        // The holdout may have swallowed one side of a small class.
        if !train_labels.iter().any(|&l| l) || !train_labels.iter().any(|&l| !l) {
            return Err(DomainError::TrainingDataInsufficient(
                "training split lost one class to the holdout".into(),
            ));
        }

        let trained_at = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_secs() as i64;
        let predictor = HitPredictor::fit(&train_rows, &train_labels, label_threshold, trained_at);

        let holdout_accuracy = if test_rows.is_empty() {
            Metric::NotComputable
        } else {
            Metric::Value(predictor.accuracy(&test_rows, &test_labels))
        };

        self.models.save(&predictor).await?;
        info!(
            trained_on = train_rows.len(),
            holdout = test_rows.len(),
            accuracy = %holdout_accuracy,
            "model trained and persisted"
        );

        Ok(TrainingReport {
            label_threshold,
            hits,
            flops,
            trained_on: train_rows.len(),
            holdout_accuracy,
        })
    }

    /// Score one input with the persisted model. Input is validated first;
    /// a missing artifact is reported, not a crash.
    pub async fn predict(&self, input: PredictionInput) -> Result<Prediction, DomainError> {
        input.validate()?;
        let Some(predictor) = self.models.load().await? else {
            warn!("prediction requested before any training run");
            return Err(DomainError::ModelStore(
                "no trained model artifact; run training first".into(),
            ));
        };
        predictor.predict(&input)
    }
}
