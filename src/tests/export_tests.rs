//! tests/export_tests.rs - Paginated fetch loop and end-to-end export pipeline

#[cfg(test)]
mod tests {
    use crate::{
        api::client::{ClientError, KoinlyApi},
        export::{self, fetcher, sink::{ExportSink, SinkError}},
    };
    use async_trait::async_trait;
    use serde_json::{json, Value};
    use std::collections::HashMap;
    use std::path::PathBuf;
    use std::sync::Mutex;
    use std::time::Duration;

    /// Any constructible error will do for a simulated fetch failure.
    fn fetch_error() -> ClientError {
        ClientError::BaseUrl(url::Url::parse("::").unwrap_err())
    }

    fn tx(description: &str) -> Value {
        json!({ "description": description })
    }

    fn page_of(descriptions: &[&str], total_pages: Option<Value>) -> Value {
        let transactions: Vec<Value> = descriptions.iter().map(|d| tx(d)).collect();
        match total_pages {
            Some(total) => json!({
                "transactions": transactions,
                "meta": { "page": { "total_pages": total } },
            }),
            None => json!({ "transactions": transactions }),
        }
    }

    /// Canned Koinly API. A missing entry simulates a failed request; a
    /// per-page delay scrambles completion order to exercise the merge.
    struct MockApi {
        session: Option<Value>,
        wallet: Option<Value>,
        pages: HashMap<u32, Value>,
        delays_ms: HashMap<u32, u64>,
        page_calls: Mutex<Vec<u32>>,
    }

    impl MockApi {
        fn new() -> Self {
            Self {
                session: None,
                wallet: None,
                pages: HashMap::new(),
                delays_ms: HashMap::new(),
                page_calls: Mutex::new(Vec::new()),
            }
        }

        fn with_session(mut self, session: Value) -> Self {
            self.session = Some(session);
            self
        }

        fn with_wallet(mut self, wallet: Value) -> Self {
            self.wallet = Some(wallet);
            self
        }

        fn with_page(mut self, page: u32, body: Value) -> Self {
            self.pages.insert(page, body);
            self
        }

        fn with_delay(mut self, page: u32, millis: u64) -> Self {
            self.delays_ms.insert(page, millis);
            self
        }

        fn calls(&self) -> Vec<u32> {
            self.page_calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl KoinlyApi for MockApi {
        async fn fetch_session(&self) -> Result<Value, ClientError> {
            self.session.clone().ok_or_else(fetch_error)
        }

        async fn fetch_wallet(&self, _wallet_id: &str) -> Result<Value, ClientError> {
            self.wallet.clone().ok_or_else(fetch_error)
        }

        async fn fetch_page(&self, _wallet_id: &str, page: u32) -> Result<Value, ClientError> {
            if let Some(delay) = self.delays_ms.get(&page) {
                tokio::time::sleep(Duration::from_millis(*delay)).await;
            }
            self.page_calls.lock().unwrap().push(page);
            self.pages.get(&page).cloned().ok_or_else(fetch_error)
        }
    }

    /// Capture sink so end-to-end tests can inspect the delivered bytes.
    #[derive(Default)]
    struct MemorySink {
        delivered: Mutex<Option<(String, Vec<u8>)>>,
    }

    impl MemorySink {
        fn take(&self) -> (String, Vec<u8>) {
            self.delivered.lock().unwrap().take().expect("nothing delivered")
        }
    }

    impl ExportSink for MemorySink {
        fn deliver(&self, file_name: &str, bytes: &[u8]) -> Result<PathBuf, SinkError> {
            *self.delivered.lock().unwrap() = Some((file_name.to_string(), bytes.to_vec()));
            Ok(PathBuf::from(file_name))
        }
    }

    /// Strip the BOM and parse delivered CSV bytes back into records.
    fn parse_csv(bytes: &[u8]) -> (Vec<String>, Vec<Vec<String>>) {
        assert_eq!(&bytes[..3], "\u{feff}".as_bytes(), "missing UTF-8 BOM");
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .from_reader(&bytes[3..]);
        let headers: Vec<String> = reader
            .headers()
            .unwrap()
            .iter()
            .map(|h| h.to_string())
            .collect();
        let records: Vec<Vec<String>> = reader
            .records()
            .map(|r| r.unwrap().iter().map(|c| c.to_string()).collect())
            .collect();
        (headers, records)
    }

    fn descriptions(transactions: &[crate::Transaction]) -> Vec<String> {
        transactions.iter().map(|t| t.description_cell()).collect()
    }

    #[tokio::test]
    async fn test_malformed_total_pages_resolves_to_one_request() {
        let malformed_metas = vec![
            page_of(&["only"], None),
            json!({ "transactions": [], "meta": {} }),
            json!({ "transactions": [], "meta": { "page": {} } }),
            page_of(&[], Some(json!("abc"))),
            page_of(&[], Some(json!(null))),
            page_of(&[], Some(json!([2, 3]))),
            page_of(&[], Some(json!({ "count": 4 }))),
            page_of(&[], Some(json!(0))),
            page_of(&[], Some(json!(-3))),
        ];

        for body in malformed_metas {
            let api = MockApi::new().with_page(1, body);
            let result = fetcher::fetch_all_transactions(&api, "42").await.unwrap();
            assert_eq!(api.calls(), vec![1], "expected a single page request");
            assert!(result.len() <= 1);
        }
    }

    #[tokio::test]
    async fn test_numeric_string_total_pages_is_honored() {
        let api = MockApi::new()
            .with_page(1, page_of(&["p1"], Some(json!("3"))))
            .with_page(2, page_of(&["p2"], None))
            .with_page(3, page_of(&["p3"], None));

        let result = fetcher::fetch_all_transactions(&api, "42").await.unwrap();

        assert_eq!(api.calls().len(), 3);
        assert_eq!(descriptions(&result), vec!["p1", "p2", "p3"]);
    }

    #[tokio::test]
    async fn test_merge_order_is_by_page_not_completion() {
        // Later pages complete first; the merged sequence must still be
        // page-ascending, then in-page order.
        let api = MockApi::new()
            .with_page(1, page_of(&["p1-a", "p1-b"], Some(json!(4))))
            .with_page(2, page_of(&["p2-a", "p2-b"], None))
            .with_page(3, page_of(&["p3-a", "p3-b"], None))
            .with_page(4, page_of(&["p4-a", "p4-b"], None))
            .with_delay(2, 40)
            .with_delay(3, 20)
            .with_delay(4, 0);

        let result = fetcher::fetch_all_transactions(&api, "42").await.unwrap();

        assert_eq!(api.calls().len(), 4);
        assert_eq!(
            descriptions(&result),
            vec!["p1-a", "p1-b", "p2-a", "p2-b", "p3-a", "p3-b", "p4-a", "p4-b"]
        );
    }

    #[tokio::test]
    async fn test_failing_subsequent_page_is_treated_as_empty() {
        // Page 2 has no canned body and therefore fails; pages 1 and 3
        // still contribute their rows.
        let api = MockApi::new()
            .with_page(1, page_of(&["p1"], Some(json!(3))))
            .with_page(3, page_of(&["p3"], None));

        let result = fetcher::fetch_all_transactions(&api, "42").await.unwrap();

        assert_eq!(api.calls().len(), 3);
        assert_eq!(descriptions(&result), vec!["p1", "p3"]);
    }

    #[tokio::test]
    async fn test_unusable_page_body_contributes_zero_rows() {
        let api = MockApi::new()
            .with_page(1, page_of(&["p1"], Some(json!(3))))
            .with_page(2, json!({ "transactions": "nope" }))
            .with_page(3, json!(42));

        let result = fetcher::fetch_all_transactions(&api, "42").await.unwrap();

        assert_eq!(descriptions(&result), vec!["p1"]);
    }

    #[tokio::test]
    async fn test_malformed_transaction_element_is_skipped() {
        let body = json!({
            "transactions": [tx("good"), "not an object", tx("also good")],
        });
        let api = MockApi::new().with_page(1, body);

        let result = fetcher::fetch_all_transactions(&api, "42").await.unwrap();

        assert_eq!(descriptions(&result), vec!["good", "also good"]);
    }

    #[tokio::test]
    async fn test_first_page_failure_propagates() {
        let api = MockApi::new();

        let result = fetcher::fetch_all_transactions(&api, "42").await;

        assert!(result.is_err());
        assert_eq!(api.calls(), vec![1]);
    }

    #[tokio::test]
    async fn test_export_with_failed_session_uses_empty_base_currency() {
        // Session lookup fails, wallet lookup answers with a flat shape.
        let api = MockApi::new()
            .with_wallet(json!({ "name": "Main" }))
            .with_page(1, page_of(&["a", "b"], Some(json!(1))));
        let sink = MemorySink::default();

        let summary = export::export_wallet(&api, &sink, "42").await.unwrap();

        assert_eq!(summary.file_name, "Main - Transactions.csv");
        assert_eq!(summary.rows, 2);
        assert!(!summary.fetch_failed);

        let (file_name, bytes) = sink.take();
        assert_eq!(file_name, "Main - Transactions.csv");
        let (headers, records) = parse_csv(&bytes);
        assert_eq!(headers.len(), 18);
        assert_eq!(records.len(), 2);
        for record in &records {
            assert_eq!(record[8], "", "base currency column should be empty");
        }
    }

    #[tokio::test]
    async fn test_export_total_fetch_failure_delivers_headers_only() {
        let api = MockApi::new();
        let sink = MemorySink::default();

        let summary = export::export_wallet(&api, &sink, "42").await.unwrap();

        assert_eq!(summary.file_name, "Wallet 42 - Transactions.csv");
        assert_eq!(summary.rows, 0);
        assert!(summary.fetch_failed);

        let (_, bytes) = sink.take();
        let (headers, records) = parse_csv(&bytes);
        assert_eq!(headers.len(), 18);
        assert!(records.is_empty());
    }

    #[tokio::test]
    async fn test_export_accepts_nested_wallet_shape_and_session_currency() {
        let api = MockApi::new()
            .with_session(json!({
                "portfolios": [{ "base_currency": { "symbol": "EUR" } }],
            }))
            .with_wallet(json!({ "wallet": { "name": "Nested" } }))
            .with_page(1, page_of(&["a"], Some(json!(1))));
        let sink = MemorySink::default();

        let summary = export::export_wallet(&api, &sink, "7").await.unwrap();

        assert_eq!(summary.file_name, "Nested - Transactions.csv");

        let (_, bytes) = sink.take();
        let (_, records) = parse_csv(&bytes);
        assert_eq!(records[0][8], "EUR");
    }

    #[tokio::test]
    async fn test_file_sink_writes_into_target_directory() {
        let dir = tempfile::tempdir().unwrap();
        let sink = crate::FileSink::new(dir.path().join("exports"));

        let path = sink.deliver("out.csv", b"payload").unwrap();

        assert_eq!(path, dir.path().join("exports").join("out.csv"));
        assert_eq!(std::fs::read(&path).unwrap(), b"payload");
    }
}
