//! Demo web front end and typed client for a ledger-backed vehicle trading
//! workflow: registration, transfer between owners and bank settlement.

pub mod api;
pub mod config;
pub mod error;
pub mod fingerprint;
pub mod logging;
pub mod naming;
pub mod random;
pub mod router;
pub mod transport;
pub mod types;
pub mod validate;
pub mod views;

pub use api::ApiClient;
pub use error::ApiError;
pub use transport::ClientConfig;
