pub mod access;
pub mod auth;
pub mod favorites;
pub(crate) mod health;
pub mod marketplace;
pub mod purchases;
pub mod reports;
pub mod users;

pub use health::health_check;
