use std::str::FromStr;

/// HTTP server settings, read once at startup.
///
/// | Env Var                 | Default                 |
/// |-------------------------|-------------------------|
/// | `HOST`                  | `0.0.0.0`               |
/// | `PORT`                  | `3000`                  |
/// | `CORS_ORIGINS`          | `http://localhost:5173` |
/// | `REQUEST_TIMEOUT_SECS`  | `30`                    |
/// | `SHUTDOWN_TIMEOUT_SECS` | `30`                    |
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Comma-separated in `CORS_ORIGINS`; blank entries are dropped.
    pub cors_origins: Vec<String>,
    /// Report creation renders the PDF inside the request, so this bounds
    /// the slowest report as well.
    pub request_timeout_secs: u64,
    /// Grace period for the pipeline consumers after the listener closes.
    pub shutdown_timeout_secs: u64,
}

impl ServerConfig {
    /// Panics on an unparseable number so a bad deployment fails at boot.
    pub fn from_env() -> Self {
        Self {
            host: std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into()),
            port: parsed_env("PORT", 3000),
            cors_origins: std::env::var("CORS_ORIGINS")
                .unwrap_or_else(|_| "http://localhost:5173".into())
                .split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect(),
            request_timeout_secs: parsed_env("REQUEST_TIMEOUT_SECS", 30),
            shutdown_timeout_secs: parsed_env("SHUTDOWN_TIMEOUT_SECS", 30),
        }
    }
}

fn parsed_env<T>(name: &str, default: T) -> T
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match std::env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse()
            .unwrap_or_else(|e| panic!("{name} has an invalid value '{raw}': {e}")),
        Err(_) => default,
    }
}
