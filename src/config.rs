use anyhow::{Context, Result};
use std::env;
use std::path::PathBuf;
use std::time::Duration;

const DEFAULT_API_BASE: &str = "https://sheets.googleapis.com/v4";
const DEFAULT_TEACHER_RANGE: &str = "Sheet1!A2:D";
const DEFAULT_TIMEOUT_SECS: u64 = 30;
const DEFAULT_LOG_FILE: &str = "attendance.log";

#[derive(Debug, Clone)]
pub struct Config {
    pub api_key: String,
    pub api_base: String,
    pub teacher_sheet_id: String,
    pub teacher_range: String,
    pub append_url: String,
    pub request_timeout: Duration,
    pub classes_file: Option<PathBuf>,
    pub log_file: PathBuf,
}

impl Config {
    pub fn load() -> Result<Self> {
        // Load .env file if it exists
        dotenv::dotenv().ok();
        Self::from_env()
    }

    #[cfg_attr(not(feature = "cli"), allow(dead_code))]
    pub fn load_from(env_file: &std::path::Path) -> Result<Self> {
        dotenv::from_path(env_file)
            .with_context(|| format!("Failed to read {}", env_file.display()))?;
        Self::from_env()
    }

    fn from_env() -> Result<Self> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Build the config from a variable lookup.
    fn from_lookup(get: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let optional = |name: &str| get(name).filter(|v| !v.trim().is_empty());

        let api_key = required(&get, "SHEETS_API_KEY")?;
        let teacher_sheet_id = required(&get, "TEACHER_SHEET_ID")?;
        let append_url = required(&get, "APPEND_URL")?;

        let timeout_secs = match get("REQUEST_TIMEOUT_SECS") {
            Some(raw) => raw
                .trim()
                .parse::<u64>()
                .with_context(|| format!("REQUEST_TIMEOUT_SECS is not a number: {}", raw))?,
            None => DEFAULT_TIMEOUT_SECS,
        };
        if timeout_secs == 0 {
            anyhow::bail!("REQUEST_TIMEOUT_SECS must be greater than zero");
        }

        Ok(Config {
            api_key,
            api_base: optional("SHEETS_API_BASE")
                .unwrap_or_else(|| DEFAULT_API_BASE.to_string())
                .trim_end_matches('/')
                .to_string(),
            teacher_sheet_id,
            teacher_range: optional("TEACHER_RANGE")
                .unwrap_or_else(|| DEFAULT_TEACHER_RANGE.to_string()),
            append_url,
            request_timeout: Duration::from_secs(timeout_secs),
            classes_file: optional("CLASSES_FILE").map(PathBuf::from),
            log_file: optional("ATTENDANCE_LOG")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_LOG_FILE)),
        })
    }
}

fn required(get: &impl Fn(&str) -> Option<String>, name: &str) -> Result<String> {
    let value = get(name)
        .with_context(|| format!("{} not found. Please set it in .env file or environment", name))?;

    if value.trim().is_empty() {
        anyhow::bail!("{} is empty", name);
    }

    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn load(vars: &[(&str, &str)]) -> Result<Config> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|name| vars.get(name).cloned())
    }

    const BASE: [(&str, &str); 3] = [
        ("SHEETS_API_KEY", "key"),
        ("TEACHER_SHEET_ID", "teachers"),
        ("APPEND_URL", "https://script.example.test/exec"),
    ];

    fn with(extra: &[(&'static str, &'static str)]) -> Vec<(&'static str, &'static str)> {
        BASE.iter().chain(extra.iter()).copied().collect()
    }

    #[test]
    fn test_defaults() {
        let config = load(&BASE).unwrap();
        assert_eq!(config.request_timeout, Duration::from_secs(30));
        assert_eq!(config.api_base, DEFAULT_API_BASE);
        assert_eq!(config.teacher_range, "Sheet1!A2:D");
        assert_eq!(config.log_file, PathBuf::from("attendance.log"));
        assert!(config.classes_file.is_none());
    }

    #[test]
    fn test_overrides() {
        let config = load(&with(&[
            ("REQUEST_TIMEOUT_SECS", " 5 "),
            ("SHEETS_API_BASE", "http://localhost:8080/v4/"),
            ("CLASSES_FILE", "classes.yaml"),
        ]))
        .unwrap();
        assert_eq!(config.request_timeout, Duration::from_secs(5));
        assert_eq!(config.api_base, "http://localhost:8080/v4");
        assert_eq!(config.classes_file, Some(PathBuf::from("classes.yaml")));
    }

    #[test]
    fn test_zero_timeout_rejected() {
        let err = load(&with(&[("REQUEST_TIMEOUT_SECS", "0")])).unwrap_err();
        assert!(err.to_string().contains("greater than zero"));
    }

    #[test]
    fn test_non_numeric_timeout_rejected() {
        let err = load(&with(&[("REQUEST_TIMEOUT_SECS", "abc")])).unwrap_err();
        assert!(err.to_string().contains("not a number"));
    }

    #[test]
    fn test_empty_required_key_rejected() {
        let err = load(&[
            ("SHEETS_API_KEY", "  "),
            ("TEACHER_SHEET_ID", "teachers"),
            ("APPEND_URL", "https://script.example.test/exec"),
        ])
        .unwrap_err();
        assert_eq!(err.to_string(), "SHEETS_API_KEY is empty");
    }

    #[test]
    fn test_missing_required_key_rejected() {
        let err = load(&[("SHEETS_API_KEY", "key")]).unwrap_err();
        assert!(err.to_string().starts_with("TEACHER_SHEET_ID not found"));
    }
}
