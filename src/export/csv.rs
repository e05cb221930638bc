use crate::api::models::Transaction;
use crate::export::ExportError;
use std::io;

/// Column order is fixed; spreadsheet templates downstream rely on it.
pub const HEADINGS: [&str; 18] = [
    "Date",
    "Sent Amount",
    "Sent Currency",
    "Received Amount",
    "Received Currency",
    "Fee Amount",
    "Fee Currency",
    "Net Worth Amount",
    "Net Worth Currency",
    "Label",
    "Description",
    "TxHash",
    "contract_address",
    "from.currency.token_address",
    "from.wallet.display_address",
    "to.currency.token_address",
    "to.wallet.display_address",
    "fee_value",
];

/// File-name stand-in when the wallet name is blank or sanitizes to nothing.
pub const FILE_NAME_FALLBACK: &str = "Transactions";

const MAX_FILE_NAME_LEN: usize = 150;

/// BOM so spreadsheet consumers detect UTF-8.
const BOM: &str = "\u{feff}";

/// A finished export: sanitized file name plus the full CSV bytes.
#[derive(Debug, Clone)]
pub struct CsvExport {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

/// Serialize transactions into CSV text.
///
/// Every cell, headers included, is double-quoted with embedded quotes
/// doubled; CR/LF and lone CR inside a cell are normalized to a single
/// newline, which is legal inside a quoted cell. The Net Worth Currency
/// column carries the portfolio base currency in every row.
pub fn build_export(
    display_name: &str,
    base_currency: &str,
    transactions: &[Transaction],
) -> Result<CsvExport, ExportError> {
    let mut out = Vec::new();
    out.extend_from_slice(BOM.as_bytes());

    let mut writer = ::csv::WriterBuilder::new()
        .quote_style(::csv::QuoteStyle::Always)
        .terminator(::csv::Terminator::Any(b'\n'))
        .from_writer(out);

    writer.write_record(HEADINGS)?;
    for tx in transactions {
        let cells = record(tx, base_currency);
        writer.write_record(cells.iter().map(|cell| normalize_newlines(cell)))?;
    }

    let mut bytes = writer
        .into_inner()
        .map_err(|e| io::Error::other(e.to_string()))?;

    // Rows are joined by newlines, not terminated by them.
    if bytes.last() == Some(&b'\n') {
        bytes.pop();
    }

    let file_name = format!("{} - Transactions.csv", sanitize_file_name(display_name));

    Ok(CsvExport { file_name, bytes })
}

/// Make a wallet name safe to use as a file name on any common filesystem:
/// reserved and control characters become spaces, whitespace runs collapse,
/// and the result is trimmed and truncated.
pub fn sanitize_file_name(name: &str) -> String {
    if name.trim().is_empty() {
        return FILE_NAME_FALLBACK.to_string();
    }

    let replaced: String = name
        .chars()
        .map(|c| match c {
            '\\' | '/' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => ' ',
            c if c.is_control() => ' ',
            c => c,
        })
        .collect();

    let collapsed = replaced.split_whitespace().collect::<Vec<_>>().join(" ");
    let truncated: String = collapsed.chars().take(MAX_FILE_NAME_LEN).collect();
    let truncated = truncated.trim_end().to_string();

    if truncated.is_empty() {
        FILE_NAME_FALLBACK.to_string()
    } else {
        truncated
    }
}

fn normalize_newlines(cell: &str) -> String {
    cell.replace("\r\n", "\n").replace('\r', "\n")
}

fn record(tx: &Transaction, base_currency: &str) -> [String; 18] {
    [
        tx.date_cell(),
        tx.sent_amount(),
        tx.sent_currency(),
        tx.received_amount(),
        tx.received_currency(),
        tx.fee_amount(),
        tx.fee_currency(),
        tx.net_worth_amount(),
        base_currency.to_string(),
        tx.label(),
        tx.description_cell(),
        tx.txhash_cell(),
        tx.contract_address_cell(),
        tx.sent_token_address(),
        tx.sent_display_address(),
        tx.received_token_address(),
        tx.received_display_address(),
        tx.fee_value_cell(),
    ]
}
