mod auth;
mod hydration;
mod reports;
mod session_reaper;

#[cfg(test)]
pub(crate) mod test_support;

pub use auth::{
    hash_password, validate_password, verify_password, AuthService, NewUser, MIN_PASSWORD_LEN,
};
pub use hydration::HydrationEngine;
pub use reports::{
    average_rating, PartialRatingsPolicy, ReportService, PARTIAL_RATINGS_POLICY, TOP_LIMIT,
};
pub use session_reaper::SessionReaper;
