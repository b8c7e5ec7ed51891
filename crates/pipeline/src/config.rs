//! Environment configuration for the pipeline's external collaborators.
//!
//! Every struct has a `from_env()` constructor with documented defaults.
//! `.env` loading is done once by the binary.

use std::path::PathBuf;
use std::time::Duration;

use veille_core::report::parse_recipients;

const DEFAULT_NEWS_BASE_URL: &str = "https://newsapi.org";
const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 30;
const DEFAULT_GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
const DEFAULT_GEMINI_MODEL: &str = "gemini-2.0-flash";
const DEFAULT_CLASSIFIER_LANGUAGE: &str = "fr";
const DEFAULT_CLASSIFIER_ORGANISATION: &str = "an African (specifically Cameroonian) bank";
const DEFAULT_REPORTS_DIR: &str = "./reports";
const DEFAULT_REPORT_FONT_DIR: &str = "./fonts";
const DEFAULT_REPORT_FONT_FAMILY: &str = "LiberationSans";

fn env_or(name: &str, default: &str) -> String {
    std::env::var(name)
        .ok()
        .filter(|v| !v.trim().is_empty())
        .unwrap_or_else(|| default.to_string())
}

fn http_timeout() -> Duration {
    let secs = std::env::var("HTTP_TIMEOUT_SECS")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(DEFAULT_HTTP_TIMEOUT_SECS);
    Duration::from_secs(secs)
}

/// News service settings.
///
/// | Variable            | Default               |
/// |---------------------|-----------------------|
/// | `NEWS_API_KEY`      | none (fetches fail)   |
/// | `NEWS_API_BASE_URL` | `https://newsapi.org` |
/// | `HTTP_TIMEOUT_SECS` | `30`                  |
#[derive(Debug, Clone)]
pub struct NewsConfig {
    pub api_key: Option<String>,
    pub base_url: String,
    pub timeout: Duration,
}

impl NewsConfig {
    pub fn from_env() -> Self {
        Self {
            api_key: std::env::var("NEWS_API_KEY").ok(),
            base_url: env_or("NEWS_API_BASE_URL", DEFAULT_NEWS_BASE_URL),
            timeout: http_timeout(),
        }
    }
}

/// Text-generation service settings.
///
/// | Variable          | Default                                            |
/// |-------------------|----------------------------------------------------|
/// | `GEMINI_API_KEY`  | none (every call fails, classifier falls back)     |
/// | `GEMINI_MODEL`    | `gemini-2.0-flash`                                 |
/// | `GEMINI_BASE_URL` | `https://generativelanguage.googleapis.com/v1beta` |
#[derive(Debug, Clone)]
pub struct GeminiConfig {
    pub api_key: Option<String>,
    pub model: String,
    pub base_url: String,
    pub timeout: Duration,
}

impl GeminiConfig {
    pub fn from_env() -> Self {
        Self {
            api_key: std::env::var("GEMINI_API_KEY").ok(),
            model: env_or("GEMINI_MODEL", DEFAULT_GEMINI_MODEL),
            base_url: env_or("GEMINI_BASE_URL", DEFAULT_GEMINI_BASE_URL),
            timeout: http_timeout(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ClassifierConfig {
    /// Language the recommendations are written in (`CLASSIFIER_LANGUAGE`).
    pub language: String,
    /// Who the analyst works for (`CLASSIFIER_ORGANISATION`).
    pub organisation: String,
}

impl ClassifierConfig {
    pub fn from_env() -> Self {
        Self {
            language: env_or("CLASSIFIER_LANGUAGE", DEFAULT_CLASSIFIER_LANGUAGE),
            organisation: env_or("CLASSIFIER_ORGANISATION", DEFAULT_CLASSIFIER_ORGANISATION),
        }
    }
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            language: DEFAULT_CLASSIFIER_LANGUAGE.to_string(),
            organisation: DEFAULT_CLASSIFIER_ORGANISATION.to_string(),
        }
    }
}

/// Who receives high-severity alert emails (`ALERT_RECIPIENTS`,
/// comma-separated).
#[derive(Debug, Clone, Default)]
pub struct NotifierConfig {
    pub recipients: Vec<String>,
}

impl NotifierConfig {
    pub fn from_env() -> Self {
        Self {
            recipients: std::env::var("ALERT_RECIPIENTS")
                .map(|raw| parse_recipients(&raw))
                .unwrap_or_default(),
        }
    }
}

/// Report output settings.
///
/// | Variable             | Default          |
/// |----------------------|------------------|
/// | `REPORTS_DIR`        | `./reports`      |
/// | `REPORT_FONT_DIR`    | `./fonts`        |
/// | `REPORT_FONT_FAMILY` | `LiberationSans` |
#[derive(Debug, Clone)]
pub struct ReportConfig {
    pub reports_dir: PathBuf,
    pub font_dir: PathBuf,
    pub font_family: String,
}

impl ReportConfig {
    pub fn from_env() -> Self {
        Self {
            reports_dir: PathBuf::from(env_or("REPORTS_DIR", DEFAULT_REPORTS_DIR)),
            font_dir: PathBuf::from(env_or("REPORT_FONT_DIR", DEFAULT_REPORT_FONT_DIR)),
            font_family: env_or("REPORT_FONT_FAMILY", DEFAULT_REPORT_FONT_FAMILY),
        }
    }
}
