pub mod api;
pub mod config;
pub mod credentials;
pub mod export;

#[cfg(test)]
pub mod tests;

// Re-export the pieces a host needs to wire an export together.
pub use api::client::{ClientError, KoinlyApi, KoinlyClient, PER_PAGE};
pub use api::models::Transaction;
pub use config::Config;
pub use credentials::{CookieJar, CredentialProvider, API_KEY_COOKIE, PORTFOLIO_COOKIE};
pub use export::sink::{ExportSink, FileSink, SinkError};
pub use export::{export_wallet, gather_export, ExportError, ExportResult, ExportSummary};
