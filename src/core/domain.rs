use std::env;
use std::str::FromStr;
use serde::{Deserialize, Serialize};

// Identifiable defines common traits that can be shared by persistent objects
pub trait Identifiable : Sync + Send {
    fn id(&self) -> i64;
    fn version(&self) -> i64;
}


// Configuration abstracts config options for library system
#[derive(Debug, PartialEq, Serialize, Deserialize, Clone)]
pub struct Configuration {
    pub branch_id: String,
    pub database_url: String,
    pub max_connections: u32,
    pub busy_timeout_ms: u64,
    pub book_loan_days: i64,
    pub listen_addr: String,
}

impl Configuration {
    pub fn new(branch_id: &str) -> Self {
        Configuration {
            branch_id: branch_id.to_string(),
            database_url: "sqlite://library.sqlite".to_string(),
            max_connections: 8,
            busy_timeout_ms: 5_000,
            book_loan_days: 15,
            listen_addr: "0.0.0.0:3000".to_string(),
        }
    }

    // defaults overridden by LMS_* environment variables
    pub fn from_env(branch_id: &str) -> Self {
        Configuration::from_lookup(branch_id, |name| env::var(name).ok())
    }

    pub(crate) fn from_lookup<F: Fn(&str) -> Option<String>>(branch_id: &str, lookup: F) -> Self {
        let mut config = Configuration::new(branch_id);
        if let Some(url) = lookup("LMS_DATABASE_URL") {
            config.database_url = url;
        }
        config.max_connections = parse_or(&lookup, "LMS_MAX_CONNECTIONS", config.max_connections);
        config.busy_timeout_ms = parse_or(&lookup, "LMS_BUSY_TIMEOUT_MS", config.busy_timeout_ms);
        config.book_loan_days = parse_or(&lookup, "LMS_BOOK_LOAN_DAYS", config.book_loan_days);
        if let Some(addr) = lookup("LMS_LISTEN_ADDR") {
            config.listen_addr = addr;
        }
        config
    }
}

fn parse_or<T: FromStr, F: Fn(&str) -> Option<String>>(lookup: &F, name: &str, default: T) -> T {
    match lookup(name) {
        Some(val) => val.parse::<T>().unwrap_or_else(|_| {
            tracing::warn!(variable = name, value = val.as_str(), "ignoring unparsable configuration value");
            default
        }),
        None => default,
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use crate::core::domain::Configuration;

    #[tokio::test]
    async fn test_should_build_config() {
        let config = Configuration::new("test");
        assert_eq!("test", config.branch_id.as_str());
        assert_eq!(15, config.book_loan_days);
        assert_eq!(5_000, config.busy_timeout_ms);
        assert!(config.max_connections > 1);
    }

    #[tokio::test]
    async fn test_should_override_config_from_lookup() {
        let vars = HashMap::from([
            ("LMS_BOOK_LOAN_DAYS", "21"),
            ("LMS_MAX_CONNECTIONS", "not-a-number"),
            ("LMS_LISTEN_ADDR", "127.0.0.1:8080"),
        ]);
        let config = Configuration::from_lookup("test", |name| vars.get(name).map(|v| v.to_string()));
        assert_eq!(21, config.book_loan_days);
        assert_eq!("127.0.0.1:8080", config.listen_addr.as_str());
        assert_eq!(Configuration::new("test").max_connections, config.max_connections);
        assert_eq!(Configuration::new("test").database_url, config.database_url);
    }
}
