//! # Soletrack Sync Library
//!
//! Core functionality for the soletrack market-data sync service: the job
//! queue, provider adapters, status derivation, and the HTTP surface.

pub mod adapters;
pub mod config;
pub mod db;
pub mod error;
pub mod handlers;
pub mod models;
pub mod repositories;
pub mod server;
pub mod sync;
pub mod telemetry;
pub use migration;
