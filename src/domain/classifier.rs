//! Hit classifier: two-feature logistic regression with standardization.
//!
//! Lifecycle is Untrained -> Trained -> re-Trained on demand; no incremental
//! states. Training derives labels from the revenue/budget ratio with a
//! dynamically selected cutoff (class-imbalance correction), fits a scaler
//! once on the training split and reuses the identical transform at inference.
//! Two distinct thresholds live here and must not be confused:
//! the label-derivation cutoff (picked from [`HIT_THRESHOLD_LADDER`]) and the
//! fixed 0.5 probability cutoff applied to inference output.

use crate::domain::DomainError;
use serde::{Deserialize, Serialize};

/// Feature order the scaler and model are fit on. Inference assembles its
/// vector by these names, from the artifact, so a reordered or renamed
/// feature can never silently shift a column.
pub const FEATURE_NAMES: [&str; 2] = ["budget", "release_month"];

/// Candidate cutoffs for "hit" = revenue > cutoff * budget, tried in order.
/// Flops vastly outnumber hits at strict cutoffs; walking the ladder finds
/// the strictest cutoff that still yields a usable class balance.
pub const HIT_THRESHOLD_LADDER: [f64; 4] = [2.0, 1.5, 1.0, 0.8];

/// Probability above which an inference is labeled a hit. Independent of the
/// label-derivation cutoff used at training time.
pub const PROBABILITY_CUTOFF: f64 = 0.5;

const EPOCHS: usize = 500;
const LEARNING_RATE: f64 = 0.1;

/// One engineered training example.
#[derive(Debug, Clone)]
pub struct TrainingRow {
    pub budget: f64,
    pub release_month: u32,
    pub revenue: f64,
}

impl TrainingRow {
    pub fn ratio(&self) -> f64 {
        self.revenue / self.budget
    }

    fn features(&self) -> Vec<f64> {
        vec![self.budget, f64::from(self.release_month)]
    }
}

/// Inference input. Validated before it touches the model.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PredictionInput {
    pub budget: f64,
    pub release_month: u32,
}

impl PredictionInput {
    pub fn validate(&self) -> Result<(), DomainError> {
        if !self.budget.is_finite() || self.budget <= 0.0 {
            return Err(DomainError::Validation(format!(
                "budget must be a positive amount, got {}",
                self.budget
            )));
        }
        if !(1..=12).contains(&self.release_month) {
            return Err(DomainError::Validation(format!(
                "release month must be 1-12, got {}",
                self.release_month
            )));
        }
        Ok(())
    }

    fn named_features(&self) -> [(&'static str, f64); 2] {
        [
            ("budget", self.budget),
            ("release_month", f64::from(self.release_month)),
        ]
    }
}

/// Inference output: probability of "hit" in [0,1] plus the derived label.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Prediction {
    pub probability: f64,
    pub is_hit: bool,
}

/// Pick the label cutoff from the training ratio distribution: the first
/// ladder entry that leaves at least `min_class` examples in BOTH classes.
/// Degenerate distributions (no cutoff balances the classes) fail the
/// training run with `TrainingDataInsufficient`.
pub fn select_hit_threshold(ratios: &[f64], min_class: usize) -> Result<f64, DomainError> {
    for &cutoff in &HIT_THRESHOLD_LADDER {
        let hits = ratios.iter().filter(|&&r| r > cutoff).count();
        let flops = ratios.len() - hits;
        if hits >= min_class && flops >= min_class {
            return Ok(cutoff);
        }
    }
    Err(DomainError::TrainingDataInsufficient(format!(
        "no cutoff in {:?} yields {} examples of both classes over {} ratios",
        HIT_THRESHOLD_LADDER,
        min_class,
        ratios.len()
    )))
}

/// Per-feature standardization: z = (x - mean) / std. Fit once on training
/// data; the fitted transform is persisted and reused verbatim at inference.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StandardScaler {
    pub mean: Vec<f64>,
    pub std: Vec<f64>,
}

impl StandardScaler {
    pub fn fit(rows: &[Vec<f64>]) -> Self {
        let dims = rows.first().map(Vec::len).unwrap_or(0);
        let n = rows.len().max(1) as f64;
        let mut mean = vec![0.0; dims];
        for row in rows {
            for (m, x) in mean.iter_mut().zip(row) {
                *m += x / n;
            }
        }
        let mut std = vec![0.0; dims];
        for row in rows {
            for ((s, x), m) in std.iter_mut().zip(row).zip(&mean) {
                *s += (x - m).powi(2) / n;
            }
        }
        for s in &mut std {
            *s = s.sqrt();
            // A constant feature scales by 1 instead of dividing by zero.
            if *s == 0.0 {
                *s = 1.0;
            }
        }
        Self { mean, std }
    }

    pub fn transform(&self, features: &[f64]) -> Vec<f64> {
        features
            .iter()
            .zip(self.mean.iter().zip(&self.std))
            .map(|(x, (m, s))| (x - m) / s)
            .collect()
    }
}

/// Linear decision boundary trained by batch gradient descent on the
/// standardized features. Deterministic: zero-initialized, fixed epochs and
/// learning rate, no RNG.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LogisticModel {
    pub weights: Vec<f64>,
    pub bias: f64,
}

fn sigmoid(z: f64) -> f64 {
    1.0 / (1.0 + (-z).exp())
}

impl LogisticModel {
    pub fn fit(rows: &[Vec<f64>], labels: &[bool]) -> Self {
        let dims = rows.first().map(Vec::len).unwrap_or(0);
        let n = rows.len().max(1) as f64;
        let mut weights = vec![0.0; dims];
        let mut bias = 0.0;

        for _ in 0..EPOCHS {
            let mut grad_w = vec![0.0; dims];
            let mut grad_b = 0.0;
            for (row, &label) in rows.iter().zip(labels) {
                let y = if label { 1.0 } else { 0.0 };
                let error = sigmoid(Self::linear(&weights, bias, row)) - y;
                for (g, x) in grad_w.iter_mut().zip(row) {
                    *g += error * x;
                }
                grad_b += error;
            }
            for (w, g) in weights.iter_mut().zip(&grad_w) {
                *w -= LEARNING_RATE * g / n;
            }
            bias -= LEARNING_RATE * grad_b / n;
        }

        Self { weights, bias }
    }

    fn linear(weights: &[f64], bias: f64, features: &[f64]) -> f64 {
        weights.iter().zip(features).map(|(w, x)| w * x).sum::<f64>() + bias
    }

    pub fn predict_proba(&self, features: &[f64]) -> f64 {
        sigmoid(Self::linear(&self.weights, self.bias, features))
    }
}

/// The persisted model artifact: fitted scaler + fitted boundary + the
/// feature names they were fit on + the label cutoff that produced the
/// training labels. Loaded once per process and reused across inferences.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HitPredictor {
    pub scaler: StandardScaler,
    pub model: LogisticModel,
    pub feature_names: Vec<String>,
    /// Revenue/budget cutoff the training labels were derived with. Recorded
    /// for observability; inference uses [`PROBABILITY_CUTOFF`] instead.
    pub label_threshold: f64,
    /// Unix seconds of the training run.
    pub trained_at: i64,
}

impl HitPredictor {
    /// Fit scaler and model on engineered rows with their derived labels.
    pub fn fit(rows: &[TrainingRow], labels: &[bool], label_threshold: f64, trained_at: i64) -> Self {
        let features: Vec<Vec<f64>> = rows.iter().map(TrainingRow::features).collect();
        let scaler = StandardScaler::fit(&features);
        let scaled: Vec<Vec<f64>> = features.iter().map(|f| scaler.transform(f)).collect();
        let model = LogisticModel::fit(&scaled, labels);
        Self {
            scaler,
            model,
            feature_names: FEATURE_NAMES.iter().map(|s| s.to_string()).collect(),
            label_threshold,
            trained_at,
        }
    }

    /// Score validated input. The feature vector is assembled by name in the
    /// order stored in the artifact, so inference can never feed columns in a
    /// different order than the fit saw them.
    pub fn predict(&self, input: &PredictionInput) -> Result<Prediction, DomainError> {
        input.validate()?;
        let named = input.named_features();
        let mut features = Vec::with_capacity(self.feature_names.len());
        for name in &self.feature_names {
            let value = named
                .iter()
                .find(|(n, _)| *n == name.as_str())
                .map(|(_, v)| *v)
                .ok_or_else(|| {
                    DomainError::ModelStore(format!("artifact expects unknown feature '{}'", name))
                })?;
            features.push(value);
        }
        let probability = self.model.predict_proba(&self.scaler.transform(&features));
        Ok(Prediction {
            probability,
            is_hit: probability >= PROBABILITY_CUTOFF,
        })
    }

    /// Held-out accuracy at the probability cutoff.
    pub fn accuracy(&self, rows: &[TrainingRow], labels: &[bool]) -> f64 {
        if rows.is_empty() {
            return 0.0;
        }
        let correct = rows
            .iter()
            .zip(labels)
            .filter(|&(row, &label)| {
                let scaled = self.scaler.transform(&row.features());
                (self.model.predict_proba(&scaled) >= PROBABILITY_CUTOFF) == label
            })
            .count();
        correct as f64 / rows.len() as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(budget: f64, month: u32, revenue: f64) -> TrainingRow {
        TrainingRow {
            budget,
            release_month: month,
            revenue,
        }
    }

    /// Synthetic set with clear structure: big-budget films triple their
    /// money, small ones lose it.
    fn training_set() -> (Vec<TrainingRow>, Vec<bool>) {
        let mut rows = Vec::new();
        for i in 0..20u32 {
            let month = (i % 12) + 1;
            rows.push(row(100_000_000.0 + f64::from(i) * 1e6, month, 320_000_000.0));
            rows.push(row(1_000_000.0 + f64::from(i) * 1e4, month, 400_000.0));
        }
        let labels = rows.iter().map(|r| r.ratio() > 2.0).collect();
        (rows, labels)
    }

    #[test]
    fn test_threshold_ladder_picks_strictest_balanced() {
        // 5 clear hits (ratio 3.0) and 5 clear flops (ratio 0.4): 2.0 works.
        let mut ratios = vec![3.0; 5];
        ratios.extend(vec![0.4; 5]);
        assert_eq!(select_hit_threshold(&ratios, 3).unwrap(), 2.0);
    }

    #[test]
    fn test_threshold_ladder_falls_back() {
        // Nothing clears 2.0 or 1.5, but 1.2x earners are hits at 1.0.
        let mut ratios = vec![1.2; 5];
        ratios.extend(vec![0.3; 5]);
        assert_eq!(select_hit_threshold(&ratios, 3).unwrap(), 1.0);
    }

    #[test]
    fn test_threshold_partitions_when_variance_exists() {
        let (rows, _) = training_set();
        let ratios: Vec<f64> = rows.iter().map(TrainingRow::ratio).collect();
        let cutoff = select_hit_threshold(&ratios, 3).unwrap();
        let hits = ratios.iter().filter(|&&r| r > cutoff).count();
        assert!(hits >= 3);
        assert!(ratios.len() - hits >= 3);
    }

    #[test]
    fn test_threshold_degenerate_distribution_fails() {
        // All flops: no cutoff can produce a second class.
        let ratios = vec![0.1; 50];
        let err = select_hit_threshold(&ratios, 3).unwrap_err();
        assert!(matches!(err, DomainError::TrainingDataInsufficient(_)));
        assert!(select_hit_threshold(&[], 1).is_err());
    }

    #[test]
    fn test_scaler_standardizes() {
        let rows = vec![vec![1.0, 10.0], vec![3.0, 10.0], vec![5.0, 10.0]];
        let scaler = StandardScaler::fit(&rows);
        assert_eq!(scaler.mean[0], 3.0);
        let z = scaler.transform(&[3.0, 10.0]);
        assert!(z[0].abs() < 1e-12);
        // Constant feature: unit std, not a division fault.
        assert_eq!(scaler.std[1], 1.0);
        assert!(z[1].abs() < 1e-12);
    }

    #[test]
    fn test_logistic_learns_separable_data() {
        let (rows, labels) = training_set();
        let predictor = HitPredictor::fit(&rows, &labels, 2.0, 0);
        assert!(predictor.accuracy(&rows, &labels) > 0.9);

        let hit = predictor
            .predict(&PredictionInput { budget: 150_000_000.0, release_month: 7 })
            .unwrap();
        let flop = predictor
            .predict(&PredictionInput { budget: 500_000.0, release_month: 2 })
            .unwrap();
        assert!(hit.probability > flop.probability);
        assert!((0.0..=1.0).contains(&hit.probability));
        assert!((0.0..=1.0).contains(&flop.probability));
    }

    #[test]
    fn test_predict_rejects_invalid_input() {
        let (rows, labels) = training_set();
        let predictor = HitPredictor::fit(&rows, &labels, 2.0, 0);

        let err = predictor
            .predict(&PredictionInput { budget: -100.0, release_month: 7 })
            .unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));

        let err = predictor
            .predict(&PredictionInput { budget: 1_000_000.0, release_month: 13 })
            .unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));

        let err = predictor
            .predict(&PredictionInput { budget: 1_000_000.0, release_month: 0 })
            .unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
    }

    #[test]
    fn test_prediction_follows_stored_feature_order() {
        let (rows, labels) = training_set();
        let mut predictor = HitPredictor::fit(&rows, &labels, 2.0, 0);
        let input = PredictionInput { budget: 150_000_000.0, release_month: 7 };
        let baseline = predictor.predict(&input).unwrap();

        // Swapping both names and fitted columns must not change the score:
        // assembly follows the names persisted in the artifact.
        predictor.feature_names.reverse();
        predictor.scaler.mean.reverse();
        predictor.scaler.std.reverse();
        predictor.model.weights.reverse();
        let swapped = predictor.predict(&input).unwrap();
        assert!((baseline.probability - swapped.probability).abs() < 1e-12);
    }

    #[test]
    fn test_artifact_round_trips_through_json() {
        let (rows, labels) = training_set();
        let predictor = HitPredictor::fit(&rows, &labels, 2.0, 1_700_000_000);
        let json = serde_json::to_string(&predictor).unwrap();
        let restored: HitPredictor = serde_json::from_str(&json).unwrap();
        assert_eq!(restored.scaler, predictor.scaler);
        assert_eq!(restored.model, predictor.model);
        assert_eq!(restored.label_threshold, 2.0);

        let input = PredictionInput { budget: 150_000_000.0, release_month: 7 };
        let a = predictor.predict(&input).unwrap();
        let b = restored.predict(&input).unwrap();
        assert_eq!(a.probability, b.probability);
    }
}
