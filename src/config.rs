// Configuration covers:
// - Koinly API base URL
// - Output directory for generated CSV files
// - Raw session cookie string (credentials for the API)

use dotenv::dotenv;
use std::env;

#[derive(Debug, Clone)]
pub struct Config {
    pub api_base_url: String,
    pub export_dir: String,
    pub cookie: String,
}

impl Config {
    pub fn from_env() -> Self {
        dotenv().ok();

        let api_base_url = env::var("KOINLY_API_URL")
            .unwrap_or_else(|_| "https://api.koinly.io/api".to_string());
        let export_dir = env::var("KOINLY_EXPORT_DIR").unwrap_or_else(|_| ".".to_string());
        let cookie = env::var("KOINLY_COOKIE").unwrap_or_default();

        Self {
            api_base_url,
            export_dir,
            cookie,
        }
    }
}
