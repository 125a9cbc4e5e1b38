use std::env;

use crate::models::{DEFAULT_PER_PAGE, Pagination, clamp_positive};

/// Local API used when `CONSOLE_API_URL` is not set outside production.
pub const LOCAL_API_URL: &str = "http://localhost:8000/api";

/// AppConfig
///
/// The console's configuration, loaded once at startup and shared read-only through
/// `ConsoleState`.
#[derive(Clone, Debug)]
pub struct AppConfig {
    // Runtime environment marker. Selects the log format.
    pub env: Env,
    // Base URL every list resource is fetched from (`{api_base_url}/{resource}`).
    pub api_base_url: String,
    // Page size a list view starts with when its URL does not carry `per_page`.
    pub default_per_page: u32,
}

#[derive(Clone, PartialEq, Debug)]
pub enum Env {
    Local,
    Production,
}

impl Default for AppConfig {
    /// Non-panicking configuration for tests; no environment variables are read.
    fn default() -> Self {
        Self {
            env: Env::Local,
            api_base_url: LOCAL_API_URL.to_string(),
            default_per_page: DEFAULT_PER_PAGE,
        }
    }
}

impl AppConfig {
    /// load
    ///
    /// Reads the configuration from the environment (after `dotenv`).
    ///
    /// # Panics
    /// Panics in production when `CONSOLE_API_URL` is missing, so the console never starts
    /// pointed at a developer API.
    pub fn load() -> Self {
        let env = match env::var("APP_ENV").as_deref() {
            Ok("production") => Env::Production,
            _ => Env::Local,
        };

        let api_base_url = match env {
            Env::Production => env::var("CONSOLE_API_URL")
                .expect("FATAL: CONSOLE_API_URL must be set in production."),
            Env::Local => {
                env::var("CONSOLE_API_URL").unwrap_or_else(|_| LOCAL_API_URL.to_string())
            }
        };

        // Invalid values fall back to the default rather than aborting startup.
        let default_per_page = env::var("CONSOLE_DEFAULT_PER_PAGE")
            .ok()
            .and_then(|raw| raw.trim().parse::<i64>().ok())
            .map(clamp_positive)
            .unwrap_or(DEFAULT_PER_PAGE);

        Self {
            env,
            api_base_url,
            default_per_page,
        }
    }

    /// The pagination a freshly mounted list view starts from.
    pub fn default_pagination(&self) -> Pagination {
        Pagination {
            per_page: self.default_per_page,
            ..Pagination::default()
        }
    }
}
