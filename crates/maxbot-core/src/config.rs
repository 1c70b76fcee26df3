use std::{env, fs, path::Path, time::Duration};

use crate::client::DEFAULT_BASE_URL;
use crate::{errors::Error, Result};

/// Process configuration for a long-poll runner, loaded from the
/// environment (with an optional `.env` file that never overrides already
/// set variables).
#[derive(Clone, Debug)]
pub struct Config {
    pub access_token: String,
    pub base_url: String,
    /// Default HTTP timeout for plain (non long-poll) calls.
    pub request_timeout: Duration,
    pub poll_limit: u32,
    /// Seconds the server may hold a long poll.
    pub poll_timeout_secs: u32,
    /// Update kinds to subscribe to; empty means all.
    pub poll_types: Vec<String>,
}

impl Config {
    pub fn load() -> Result<Self> {
        load_dotenv_if_present(Path::new(".env"));

        let access_token = env_str("MAX_ACCESS_TOKEN").unwrap_or_default();
        if access_token.trim().is_empty() {
            return Err(Error::Config(
                "MAX_ACCESS_TOKEN environment variable is required".to_string(),
            ));
        }

        let base_url = env_str("MAX_BASE_URL").unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
        let request_timeout = Duration::from_millis(env_u64("MAX_TIMEOUT_MS").unwrap_or(10_000));
        let poll_limit = env_u32("MAX_POLL_LIMIT").unwrap_or(100).clamp(1, 1000);
        let poll_timeout_secs = env_u32("MAX_POLL_TIMEOUT").unwrap_or(30);
        let poll_types = parse_csv(env_str("MAX_POLL_TYPES"));

        Ok(Self {
            access_token,
            base_url,
            request_timeout,
            poll_limit,
            poll_timeout_secs,
            poll_types,
        })
    }
}

fn load_dotenv_if_present(path: &Path) {
    let Ok(contents) = fs::read_to_string(path) else {
        return;
    };

    for raw in contents.lines() {
        let line = raw.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let Some((k, v)) = line.split_once('=') else {
            continue;
        };

        let key = k.trim();
        if key.is_empty() {
            continue;
        }
        if env::var_os(key).is_some() {
            continue; // do not override existing env
        }

        let mut val = v.trim().to_string();
        // Strip optional surrounding quotes.
        if val.len() >= 2
            && ((val.starts_with('"') && val.ends_with('"'))
                || (val.starts_with('\'') && val.ends_with('\'')))
        {
            val = val[1..val.len() - 1].to_string();
        }

        env::set_var(key, val);
    }
}

fn env_str(key: &str) -> Option<String> {
    env::var(key).ok()
}

fn env_u64(key: &str) -> Option<u64> {
    env_str(key).and_then(|s| s.trim().parse::<u64>().ok())
}

fn env_u32(key: &str) -> Option<u32> {
    env_str(key).and_then(|s| s.trim().parse::<u32>().ok())
}

fn parse_csv(v: Option<String>) -> Vec<String> {
    v.unwrap_or_default()
        .split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}
