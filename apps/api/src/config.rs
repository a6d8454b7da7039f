use std::path::PathBuf;
use std::str::FromStr;

use anyhow::{bail, Context, Result};

/// One year; anything longer is a typo, and chrono overflows well above it.
const MAX_SESSION_IDLE_TIMEOUT_SECS: i64 = 365 * 24 * 3600;

/// Application configuration loaded from environment variables.
/// Only parse errors are fatal; every value has a default.
#[derive(Debug, Clone)]
pub struct Config {
    /// Gemini credential. When unset every analysis fails with a model error.
    pub google_api_key: Option<String>,
    pub gemini_model: String,
    pub gemini_api_base: String,
    /// Directory holding the pdfium shared library; falls back to the system library.
    pub pdfium_library_path: Option<PathBuf>,
    pub render_dpi: f32,
    pub jpeg_quality: u8,
    pub max_upload_bytes: usize,
    pub session_idle_timeout_secs: i64,
    pub port: u16,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        let jpeg_quality: u8 = parse_env("JPEG_QUALITY", 85)?;
        if !(1..=100).contains(&jpeg_quality) {
            bail!("JPEG_QUALITY must be between 1 and 100, got {jpeg_quality}");
        }

        Ok(Config {
            google_api_key: optional_env("GOOGLE_API_KEY"),
            gemini_model: optional_env("GEMINI_MODEL")
                .unwrap_or_else(|| "gemini-1.5-flash".to_string()),
            gemini_api_base: optional_env("GEMINI_API_BASE")
                .unwrap_or_else(|| "https://generativelanguage.googleapis.com".to_string()),
            pdfium_library_path: optional_env("PDFIUM_LIBRARY_PATH").map(PathBuf::from),
            render_dpi: parse_env("RENDER_DPI", 150.0)?,
            jpeg_quality,
            max_upload_bytes: parse_env("MAX_UPLOAD_BYTES", 200 * 1024 * 1024)?,
            session_idle_timeout_secs: check_idle_timeout(parse_env(
                "SESSION_IDLE_TIMEOUT_SECS",
                3600,
            )?)?,
            port: parse_env("PORT", 8080)?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
        })
    }
}

/// Returns the variable's value, treating blank values as unset.
fn optional_env(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn check_idle_timeout(secs: i64) -> Result<i64> {
    if !(1..=MAX_SESSION_IDLE_TIMEOUT_SECS).contains(&secs) {
        bail!(
            "SESSION_IDLE_TIMEOUT_SECS must be between 1 and {MAX_SESSION_IDLE_TIMEOUT_SECS}, got {secs}"
        );
    }
    Ok(secs)
}

fn parse_env<T>(key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match optional_env(key) {
        Some(raw) => parse_value(key, &raw),
        None => Ok(default),
    }
}

fn parse_value<T>(key: &str, raw: &str) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    raw.parse::<T>()
        .with_context(|| format!("{key} has an invalid value '{raw}'"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_value_port() {
        let port: u16 = parse_value("PORT", "9000").unwrap();
        assert_eq!(port, 9000);
    }

    #[test]
    fn test_parse_value_reports_key() {
        let err = parse_value::<u16>("PORT", "eighty").unwrap_err();
        assert!(err.to_string().contains("PORT"));
    }

    #[test]
    fn test_idle_timeout_range() {
        assert_eq!(check_idle_timeout(3600).unwrap(), 3600);
        assert!(check_idle_timeout(0).is_err());
        assert!(check_idle_timeout(-60).is_err());
        assert!(check_idle_timeout(1_000_000_000_000_000).is_err());
    }
}
