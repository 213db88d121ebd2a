//! Implements InputPort. Inquire-based interactive prompts.
//!
//! Main menu -> Refresh / Aggregates / Train / Predict / Export. Service
//! errors are printed and the loop continues; only prompt failures abort.

use crate::domain::classifier::PredictionInput;
use crate::domain::{DomainError, Metric};
use crate::ports::InputPort;
use crate::usecases::analytics_service::AggregateReport;
use crate::usecases::{AnalyticsService, RefreshService, TrainingService};
use async_trait::async_trait;
use inquire::{Select, Text};
use std::path::PathBuf;
use std::sync::Arc;

const MENU_REFRESH: &str = "Refresh store from sources";
const MENU_AGGREGATES: &str = "Show aggregates";
const MENU_TRAIN: &str = "Train hit predictor";
const MENU_PREDICT: &str = "Predict hit probability";
const MENU_EXPORT: &str = "Export movie table (CSV)";
const MENU_EXIT: &str = "Exit";

/// TUI adapter. Inquire prompts over the three services.
pub struct TuiInputPort {
    refresh_service: Arc<RefreshService>,
    analytics_service: Arc<AnalyticsService>,
    training_service: Arc<TrainingService>,
    export_dir: PathBuf,
}

impl TuiInputPort {
    pub fn new(
        refresh_service: Arc<RefreshService>,
        analytics_service: Arc<AnalyticsService>,
        training_service: Arc<TrainingService>,
        export_dir: PathBuf,
    ) -> Self {
        Self {
            refresh_service,
            analytics_service,
            training_service,
            export_dir,
        }
    }

    async fn run_refresh(&self) {
        match self.refresh_service.refresh().await {
            Ok(stats) => {
                println!(
                    "Refreshed: {} movies, {} genres, {} cast, {} market rows, {} economies",
                    stats.movies_ingested,
                    stats.genres_ingested,
                    stats.cast_ingested,
                    stats.market_ingested,
                    stats.economies_ingested
                );
                if stats.rejected > 0 {
                    println!("Rejected {} malformed records (see log)", stats.rejected);
                }
                if stats.unresolved_countries > 0 {
                    println!(
                        "{} market rows with unresolved countries (excluded from economy joins)",
                        stats.unresolved_countries
                    );
                }
                if stats.sources_failed > 0 {
                    println!("{} sources failed this cycle (tables skipped)", stats.sources_failed);
                }
            }
            Err(e) => println!("Refresh failed: {}", e),
        }
    }

    async fn run_aggregates(&self) {
        match self.analytics_service.aggregates().await {
            Ok(report) => print_report(&report),
            Err(e) => println!("Aggregation failed: {}", e),
        }
    }

    async fn run_train(&self) {
        match self.training_service.train().await {
            Ok(report) => {
                println!(
                    "Trained on {} movies (cutoff: revenue > {} x budget; {} hits / {} flops)",
                    report.trained_on, report.label_threshold, report.hits, report.flops
                );
                match report.holdout_accuracy {
                    Metric::Value(a) => println!("Holdout accuracy: {:.1}%", a * 100.0),
                    Metric::NotComputable => println!("Holdout accuracy: n/a (no holdout rows)"),
                }
            }
            Err(e) => println!("Training failed: {}", e),
        }
    }

    async fn run_predict(&self) -> Result<(), DomainError> {
        let budget_text = Text::new("Budget ($):")
            .with_default("50000000")
            .prompt()
            .map_err(|e| DomainError::Input(e.to_string()))?;
        let Ok(budget) = budget_text.trim().parse::<f64>() else {
            println!("Not a number: {}", budget_text);
            return Ok(());
        };

        let months: Vec<String> = (1..=12).map(|m| m.to_string()).collect();
        let month_text = Select::new("Release month:", months)
            .prompt()
            .map_err(|e| DomainError::Input(e.to_string()))?;
        let Ok(release_month) = month_text.parse::<u32>() else {
            println!("Not a month: {}", month_text);
            return Ok(());
        };

        match self
            .training_service
            .predict(PredictionInput { budget, release_month })
            .await
        {
            Ok(prediction) => println!(
                "{} ({:.1}% confidence)",
                if prediction.is_hit { "HIT" } else { "FLOP" },
                prediction.probability * 100.0
            ),
            Err(e) => println!("Prediction rejected: {}", e),
        }
        Ok(())
    }

    async fn run_export(&self) {
        let path = self.export_dir.join("movies.csv");
        match self.analytics_service.export_movies(&path).await {
            Ok(path) => println!("Movie table exported to {}", path.display()),
            Err(e) => println!("Export failed: {}", e),
        }
    }
}

fn print_report(report: &AggregateReport) {
    println!("\n=== Average revenue by genre ===");
    for (genre, metric) in &report.revenue_by_genre {
        println!("{:<24} {:>18}", genre, metric.to_string());
    }

    println!("\n=== Average revenue by release month ===");
    for (month, metric) in &report.revenue_by_month {
        println!("{:<24} {:>18}", month, metric.to_string());
    }

    println!("\n=== Total revenue by language ===");
    for (language, metric) in &report.revenue_by_language {
        println!("{:<24} {:>18}", language, metric.to_string());
    }

    println!("\n=== Revenue per million speakers ===");
    for (language, metric) in &report.revenue_per_million_speakers {
        println!("{:<24} {:>18}", language, metric.to_string());
    }

    println!("\n=== Language markets (resolved countries only) ===");
    for (code, rollup) in &report.language_rollup {
        println!(
            "{:<8} {:<16} pop {:>14}  avg GDP {:>18}  countries {:>3}",
            code,
            rollup.language,
            rollup.total_population,
            rollup.avg_gdp.to_string(),
            rollup.countries
        );
    }

    println!("\n=== GDP vs population ===");
    for (code, gdp, population) in &report.gdp_population {
        println!("{:<8} GDP {:>20.0}  population {:>14}", code, gdp, population);
    }

    println!("\n=== Top audience reach ===");
    for reach in report.audience_reach.iter().take(10) {
        println!(
            "{:<32} {:<6} speakers {:>14}  rev/million {:>14}",
            reach.title,
            reach.language_code,
            reach.population,
            reach.revenue_per_million.to_string()
        );
    }
    println!();
}

#[async_trait]
impl InputPort for TuiInputPort {
    async fn run(&self) -> Result<(), DomainError> {
        loop {
            let options = vec![
                MENU_REFRESH,
                MENU_AGGREGATES,
                MENU_TRAIN,
                MENU_PREDICT,
                MENU_EXPORT,
                MENU_EXIT,
            ];
            let choice = Select::new("What next?", options)
                .prompt()
                .map_err(|e| DomainError::Input(e.to_string()))?;

            match choice {
                MENU_REFRESH => self.run_refresh().await,
                MENU_AGGREGATES => self.run_aggregates().await,
                MENU_TRAIN => self.run_train().await,
                MENU_PREDICT => self.run_predict().await?,
                MENU_EXPORT => self.run_export().await,
                _ => return Ok(()),
            }
        }
    }
}
