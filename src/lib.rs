pub mod backfill;
pub mod config;
pub mod errors;
pub mod filter;
pub mod metrics;
pub mod models;
pub mod patch;
pub mod projector;
pub mod upstream;
pub mod web;
