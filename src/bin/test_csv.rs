// Manual check for the CSV serializer: builds a couple of records by hand
// and prints the resulting file name and content.

use koinly_export::export::csv::{build_export, sanitize_file_name};
use koinly_export::Transaction;
use serde_json::json;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let transactions: Vec<Transaction> = vec![
        serde_json::from_value(json!({
            "date": "2024-01-02 03:04:05 UTC",
            "from": { "amount": "0.5", "currency": { "symbol": "BTC" } },
            "to": { "amount": 21000, "currency": { "symbol": "EUR" } },
            "type": "exchange",
            "description": "line one\r\nline \"two\"",
            "txhash": "0xabc",
        }))?,
        serde_json::from_value(json!({}))?,
    ];

    let export = build_export("Demo / Wallet", "EUR", &transactions)?;

    println!("file name: {}", export.file_name);
    println!("sanitize(\"A/B:C*D\") = {:?}", sanitize_file_name("A/B:C*D"));
    println!("--- content ({} bytes) ---", export.bytes.len());
    println!("{}", String::from_utf8_lossy(&export.bytes));

    Ok(())
}
