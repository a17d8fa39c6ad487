use dotenvy::dotenv;
use std::env;

pub struct Config {
    pub log_filter: String,
    pub account_path: String,
}

impl Config {
    /// Reads `.env` if present, then the environment.
    pub fn from_env() -> Self {
        dotenv().ok();

        Config {
            log_filter: env::var("CONTACTSD_LOG").unwrap_or_else(|_| "info".to_string()),
            account_path: env::var("CONTACTSD_ACCOUNT")
                .unwrap_or_else(|_| "local/demo/account".to_string()),
        }
    }
}
