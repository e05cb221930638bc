use crate::api::client::{ClientError, KoinlyApi};
use crate::api::models::Transaction;
use futures::future;
use serde_json::Value;
use tracing::{debug, info, warn};

/// Fetch every page of a wallet's transaction history and flatten the result.
///
/// Page 1 is fetched alone to learn the total page count; pages 2..N are then
/// issued concurrently and merged by page index, so completion order never
/// affects output order. A failing or unusable subsequent page is logged and
/// contributes zero rows. Only a page-1 failure propagates; the caller
/// decides whether that aborts the export.
pub async fn fetch_all_transactions<A>(api: &A, wallet_id: &str) -> Result<Vec<Transaction>, ClientError>
where
    A: KoinlyApi + ?Sized,
{
    let first = api.fetch_page(wallet_id, 1).await?;
    let total = total_pages(&first);
    debug!("Wallet {}: {} page(s) of transactions", wallet_id, total);

    let mut transactions = page_transactions(&first);

    if total > 1 {
        let pending: Vec<_> = (2..=total)
            .map(|page| api.fetch_page(wallet_id, page))
            .collect();

        // join_all yields results in request order regardless of which
        // request completes first.
        for (offset, result) in future::join_all(pending).await.into_iter().enumerate() {
            match result {
                Ok(body) => transactions.extend(page_transactions(&body)),
                Err(e) => warn!("Treating page {} as empty: {}", offset as u32 + 2, e),
            }
        }
    }

    info!(
        "Collected {} transaction(s) across {} page(s) for wallet {}",
        transactions.len(),
        total,
        wallet_id
    );

    Ok(transactions)
}

/// Total page count from a first-page response. Missing, non-numeric, or
/// otherwise malformed metadata resolves to 1. A numeric string counts as
/// numeric, matching the coercion the upstream web client applies.
fn total_pages(body: &Value) -> u32 {
    let resolved = body
        .pointer("/meta/page/total_pages")
        .and_then(|raw| match raw {
            Value::Number(n) => n.as_u64(),
            Value::String(s) => s.trim().parse().ok(),
            _ => None,
        })
        .and_then(|n| u32::try_from(n).ok());

    match resolved {
        Some(n) if n >= 1 => n,
        _ => 1,
    }
}

/// Transactions of a single page body. A body that is not an object, or
/// whose `transactions` field is not an array, contributes zero rows; an
/// individual element that does not deserialize is skipped.
fn page_transactions(body: &Value) -> Vec<Transaction> {
    let items = match body.get("transactions").and_then(Value::as_array) {
        Some(items) => items,
        None => {
            warn!("Page body has no usable transactions array; contributing zero rows");
            return Vec::new();
        }
    };

    items
        .iter()
        .filter_map(|item| match serde_json::from_value(item.clone()) {
            Ok(tx) => Some(tx),
            Err(e) => {
                warn!("Skipping malformed transaction record: {}", e);
                None
            }
        })
        .collect()
}
