//! Wiring & DI. Entry point: bootstrap adapters, inject into services, run UI.
//! No business logic here; refresh/aggregation/training live in the services.

use dotenv::dotenv;
use filmlens::adapters::persistence::{ModelJson, SqliteStore};
use filmlens::adapters::sources::{
    CsvCatalogSource, CsvEconomySource, CsvMarketSource, GeoNamesAdapter, WorldBankAdapter,
};
use filmlens::adapters::ui::tui::TuiInputPort;
use filmlens::ports::{
    CatalogSource, EconomySource, InputPort, MarketSource, ModelStorePort, StorePort,
};
use filmlens::usecases::{AnalyticsService, RefreshService, TrainingService};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cwd = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
    let env_loaded = dotenv();
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with(tracing_subscriber::fmt::layer())
        .init();

    match &env_loaded {
        Ok(path) => info!(path = %path.display(), "loaded .env"),
        Err(_) => info!(cwd = %cwd.display(), "no .env found (check CWD)"),
    }

    filmlens::adapters::ui::init_ui();

    let cfg = filmlens::shared::config::AppConfig::load().unwrap_or_default();
    let data_dir = PathBuf::from(cfg.data_dir_or_default());
    let data_dir_abs = data_dir.canonicalize().unwrap_or_else(|_| data_dir.clone());
    info!(path = %data_dir_abs.display(), "data directory");
    let csv_dir = PathBuf::from(cfg.csv_dir_or_default());
    let http_timeout = Duration::from_secs(cfg.http_timeout_secs_or_default());

    // --- Entity store (SQLite, WAL) ---
    let store: Arc<dyn StorePort> = Arc::new(
        SqliteStore::connect(&data_dir)
            .await
            .map_err(|e| anyhow::anyhow!("SQLite connect failed: {}", e))?,
    );

    // --- Sources: live HTTP feeds when configured, CSV drops otherwise ---
    let catalog: Arc<dyn CatalogSource> = Arc::new(CsvCatalogSource::new(&csv_dir));

    let market: Arc<dyn MarketSource> = if let Some(username) = cfg.geonames_user() {
        info!(username = %username, "language market source: GeoNames API");
        Arc::new(
            GeoNamesAdapter::new(username, http_timeout)
                .map_err(|e| anyhow::anyhow!("{}", e))?,
        )
    } else {
        warn!("FILMLENS_GEONAMES_USER not set, reading language_market.csv");
        Arc::new(CsvMarketSource::new(&csv_dir))
    };

    let economy: Arc<dyn EconomySource> = if cfg.is_world_bank_enabled() {
        info!(
            year = cfg.indicator_year_or_default(),
            "economy source: World Bank API"
        );
        Arc::new(
            WorldBankAdapter::new(cfg.indicator_year_or_default(), http_timeout)
                .map_err(|e| anyhow::anyhow!("{}", e))?,
        )
    } else {
        warn!("FILMLENS_WORLD_BANK not enabled, reading world_bank_data.csv");
        Arc::new(CsvEconomySource::new(&csv_dir))
    };

    // --- Model artifact store ---
    let models: Arc<dyn ModelStorePort> =
        Arc::new(ModelJson::new(cfg.model_path_or_default()));

    // --- Services ---
    let refresh_service = Arc::new(RefreshService::new(
        catalog,
        market,
        economy,
        Arc::clone(&store),
    ));
    let analytics_service = Arc::new(AnalyticsService::new(Arc::clone(&store)));
    let training_service = Arc::new(TrainingService::new(
        Arc::clone(&store),
        models,
        cfg.min_class_examples_or_default(),
    ));

    let input_port: Arc<dyn InputPort> = Arc::new(TuiInputPort::new(
        refresh_service,
        analytics_service,
        training_service,
        data_dir.join("exports"),
    ));

    // --- Run (main menu -> Refresh / Aggregates / Train / Predict / Export) ---
    input_port
        .run()
        .await
        .map_err(|e| anyhow::anyhow!("{}", e))?;

    Ok(())
}
