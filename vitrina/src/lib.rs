pub mod api;
pub mod config;
pub mod db;
pub mod error;
pub mod marketplace;
pub mod models;
pub mod services;
