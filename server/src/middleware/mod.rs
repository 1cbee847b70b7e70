pub mod auth;
pub mod locale;

pub use auth::require_admin;
