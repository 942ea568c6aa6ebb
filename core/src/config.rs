//! Client configuration loaded from the environment.

use std::env;

/// Production origin of the ListSplit service.
pub const DEFAULT_BASE_URL: &str = "https://listsplit.rsh-cnc.eu/";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Origin every endpoint is resolved against.
    pub base_url: String,
}

impl Config {
    /// Load configuration from `.env` and the process environment.
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();

        let base_url = env::var("LISTSPLIT_BASE_URL")
            .ok()
            .filter(|url| !url.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());

        Self { base_url }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_env_config() {
        env::remove_var("LISTSPLIT_BASE_URL");
        assert_eq!(Config::from_env().base_url, DEFAULT_BASE_URL);

        env::set_var("LISTSPLIT_BASE_URL", "http://127.0.0.1:3000/");
        assert_eq!(Config::from_env().base_url, "http://127.0.0.1:3000/");

        env::set_var("LISTSPLIT_BASE_URL", "  ");
        assert_eq!(Config::from_env().base_url, DEFAULT_BASE_URL);
        env::remove_var("LISTSPLIT_BASE_URL");
    }
}
