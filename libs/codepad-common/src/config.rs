// Runtime configuration, read from the environment with local defaults

use tracing::warn;

use crate::templates::language_for_file_name;

pub const DEFAULT_COMPILER_URL: &str = "http://127.0.0.1:3000/api/compile";
pub const DEFAULT_UPSTREAM_URL: &str =
    "http://educode-alb-public-23525038.ap-south-1.elb.amazonaws.com/student/compile-external";
pub const DEFAULT_PROXY_ADDR: &str = "0.0.0.0:3000";
pub const DEFAULT_FILE_NAME: &str = "main.js";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Endpoint the session dispatches compile requests to
    pub compiler_url: String,
    /// Remote service the proxy relays to
    pub upstream_url: String,
    pub proxy_addr: String,
    /// Name of the file a fresh session opens with
    pub default_file_name: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            compiler_url: DEFAULT_COMPILER_URL.to_string(),
            upstream_url: DEFAULT_UPSTREAM_URL.to_string(),
            proxy_addr: DEFAULT_PROXY_ADDR.to_string(),
            default_file_name: DEFAULT_FILE_NAME.to_string(),
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary key lookup; blank values count as unset
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str, default: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
                .unwrap_or_else(|| default.to_string())
        };

        let mut default_file_name = get("CODEPAD_DEFAULT_FILE", DEFAULT_FILE_NAME);
        if let Err(e) = language_for_file_name(&default_file_name) {
            warn!(error = %e, "Ignoring CODEPAD_DEFAULT_FILE, using {}", DEFAULT_FILE_NAME);
            default_file_name = DEFAULT_FILE_NAME.to_string();
        }

        Self {
            compiler_url: get("CODEPAD_COMPILER_URL", DEFAULT_COMPILER_URL),
            upstream_url: get("CODEPAD_UPSTREAM_URL", DEFAULT_UPSTREAM_URL),
            proxy_addr: get("CODEPAD_PROXY_ADDR", DEFAULT_PROXY_ADDR),
            default_file_name,
        }
    }
}
