//! Infrastructure adapters. Implement outbound ports.
//!
//! Persistence, source feeds, export, terminal UI. Map errors to DomainError.

pub mod export;
pub mod persistence;
pub mod sources;
pub mod ui;
