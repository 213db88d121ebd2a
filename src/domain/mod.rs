//! Core domain layer. No external I/O dependencies.
//!
//! Entities and business rules live here. Dependencies flow inward.

pub mod aggregate;
pub mod classifier;
pub mod entities;
pub mod errors;
pub mod ingest;
pub mod reconcile;

pub use entities::{
    CastCredit, CountryEconomy, GenreTag, LanguageMarketEntry, Metric, Movie, Resolution,
};
pub use errors::DomainError;
