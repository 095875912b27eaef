use std::env;

use crate::guard::DEFAULT_MAX_REDIRECTS;

/// AppConfig
///
/// Holds the navigation service's configuration. Immutable once loaded and shared with
/// handlers and extractors through `FromRef`.
#[derive(Clone, Debug)]
pub struct AppConfig {
    // Runtime environment marker. Controls the local role bypass and log format.
    pub env: Env,
    // Socket address the HTTP server binds to.
    pub bind_addr: String,
    // Redirect entries followed per navigation before giving up.
    pub max_redirects: usize,
}

/// Env
///
/// Local enables the `x-dev-role` bypass and human-readable logs; Production disables
/// the bypass and logs JSON.
#[derive(Clone, PartialEq, Debug)]
pub enum Env {
    Local,
    Production,
}

impl Default for AppConfig {
    /// Non-panicking configuration for test state scaffolding.
    fn default() -> Self {
        Self {
            env: Env::Local,
            bind_addr: "127.0.0.1:3000".to_string(),
            max_redirects: DEFAULT_MAX_REDIRECTS,
        }
    }
}

impl AppConfig {
    /// load
    ///
    /// Reads the configuration from environment variables at startup.
    ///
    /// # Panics
    /// Panics if `MAX_REDIRECTS` is set but is not a positive integer, so the service
    /// never starts with a redirect limit nobody asked for.
    pub fn load() -> Self {
        let env = match env::var("APP_ENV").as_deref() {
            Ok("production") => Env::Production,
            _ => Env::Local,
        };

        let bind_addr = env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:3000".to_string());

        let max_redirects = match env::var("MAX_REDIRECTS") {
            Ok(raw) => raw
                .parse::<usize>()
                .ok()
                .filter(|limit| *limit > 0)
                .expect("FATAL: MAX_REDIRECTS must be a positive integer."),
            Err(_) => DEFAULT_MAX_REDIRECTS,
        };

        Self { env, bind_addr, max_redirects }
    }
}
