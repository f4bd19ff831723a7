//! v1 API Data Transfer Objects.
//!
//! Request bodies and query strings for the v1 REST API, validated with
//! `validator`. Responses reuse the domain models in `src/models/` where the
//! wire shape already matches.

pub mod access;
pub mod auth;
pub mod common;
pub mod favorites;
pub mod marketplace;
pub mod purchases;
pub mod users;

pub use access::*;
pub use auth::*;
pub use common::*;
pub use favorites::*;
pub use marketplace::*;
pub use purchases::*;
pub use users::*;
