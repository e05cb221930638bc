pub mod csv;
pub mod fetcher;
pub mod sink;

use crate::api::client::{ClientError, KoinlyApi};
use crate::api::models::{self, Transaction};
use crate::export::sink::{ExportSink, SinkError};
use std::path::PathBuf;
use thiserror::Error;
use tracing::{error, warn};

#[derive(Error, Debug)]
pub enum ExportError {
    #[error("transaction fetch failed: {0}")]
    Client(#[from] ClientError),

    #[error("CSV encoding failed: {0}")]
    Csv(#[from] ::csv::Error),

    #[error("CSV buffer finalize failed: {0}")]
    Buffer(#[from] std::io::Error),

    #[error(transparent)]
    Sink(#[from] SinkError),
}

/// Everything one CSV run aggregates before serialization. Built fresh per
/// invocation, never persisted.
#[derive(Debug, Default)]
pub struct ExportResult {
    pub wallet_name: String,
    pub base_currency: String,
    pub transactions: Vec<Transaction>,
    /// Set when the transaction fetch failed outright and the export is
    /// degrading to a headers-only CSV.
    pub fetch_failed: bool,
}

/// What the CLI reports after a run.
#[derive(Debug)]
pub struct ExportSummary {
    pub file_name: String,
    pub path: PathBuf,
    pub wallet_name: String,
    pub rows: usize,
    pub fetch_failed: bool,
}

/// Gather everything needed for the CSV. Session and wallet lookups are
/// best-effort: a failing session means an empty base currency, a failing
/// wallet lookup means a generic display name. A failing transaction fetch
/// degrades to zero rows rather than aborting, so the caller can still
/// deliver a headers-only file.
pub async fn gather_export<A>(api: &A, wallet_id: &str) -> ExportResult
where
    A: KoinlyApi + ?Sized,
{
    let base_currency = match api.fetch_session().await {
        Ok(session) => models::base_currency(&session),
        Err(e) => {
            warn!("Could not fetch session; proceeding with empty base currency: {}", e);
            String::new()
        }
    };

    let wallet_name = match api.fetch_wallet(wallet_id).await {
        Ok(body) => {
            models::wallet_name(&body).unwrap_or_else(|| format!("Wallet {}", wallet_id))
        }
        Err(e) => {
            warn!("Could not fetch wallet details; proceeding with generic name: {}", e);
            format!("Wallet {}", wallet_id)
        }
    };

    let (transactions, fetch_failed) = match fetcher::fetch_all_transactions(api, wallet_id).await {
        Ok(transactions) => (transactions, false),
        Err(e) => {
            error!("Transaction fetch failed for wallet {}: {}", wallet_id, e);
            (Vec::new(), true)
        }
    };

    ExportResult {
        wallet_name,
        base_currency,
        transactions,
        fetch_failed,
    }
}

/// Full pipeline for one wallet: gather, serialize, deliver.
pub async fn export_wallet<A, S>(
    api: &A,
    sink: &S,
    wallet_id: &str,
) -> Result<ExportSummary, ExportError>
where
    A: KoinlyApi + ?Sized,
    S: ExportSink + ?Sized,
{
    let result = gather_export(api, wallet_id).await;

    let export = csv::build_export(&result.wallet_name, &result.base_currency, &result.transactions)?;
    let path = sink.deliver(&export.file_name, &export.bytes)?;

    Ok(ExportSummary {
        file_name: export.file_name,
        path,
        wallet_name: result.wallet_name,
        rows: result.transactions.len(),
        fetch_failed: result.fetch_failed,
    })
}
