//! Application use cases. Orchestrate domain logic via ports.

pub mod analytics_service;
pub mod refresh_service;
pub mod training_service;

pub use analytics_service::AnalyticsService;
pub use refresh_service::RefreshService;
pub use training_service::TrainingService;
