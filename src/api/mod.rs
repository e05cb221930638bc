pub mod client;
pub mod models;

pub use client::{ClientError, KoinlyApi, KoinlyClient, PER_PAGE};
pub use models::Transaction;
