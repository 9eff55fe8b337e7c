//! Incoming box stock for a footwear warehouse: spreadsheet import,
//! per-entry validation, date-window listing and per-SKU box rollups.

pub mod config;
pub mod errors;
pub mod models;
pub mod repositories;
pub mod repository;
pub mod services;
