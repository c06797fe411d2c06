// Library root: re-exports all modules so integration tests and external
// consumers can access the crate's public API.

pub mod app;
pub mod config;
pub mod db;
pub mod enrich;
pub mod percentile;
pub mod source;
pub mod statcast;
pub mod sword;
