use crate::api::RosterStore;
use crate::config::Config;
use crate::models::{AppendRequest, AppendResponse, AttendanceRecord, ValueRange};
use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, USER_AGENT};
use std::time::Duration;

/// Spreadsheet-backed roster store.
///
/// Reads go through the sheets values API with a read-only key; the append
/// goes to a script web app that owns write access to the attendance log.
#[derive(Clone)]
pub struct SheetsClient {
    client: reqwest::Client,
    api_base: String,
    api_key: String,
    teacher_sheet_id: String,
    teacher_range: String,
    append_url: String,
}

impl SheetsClient {
    pub fn new(config: &Config) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .connect_timeout(Duration::from_secs(10).min(config.request_timeout))
            .default_headers(Self::build_headers())
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            client,
            api_base: config.api_base.clone(),
            api_key: config.api_key.clone(),
            teacher_sheet_id: config.teacher_sheet_id.clone(),
            teacher_range: config.teacher_range.clone(),
            append_url: config.append_url.clone(),
        })
    }

    fn build_headers() -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        headers.insert(USER_AGENT, HeaderValue::from_static("class-attendance"));
        headers
    }

    fn values_url(&self, sheet_id: &str, range: &str) -> String {
        format!(
            "{}/spreadsheets/{}/values/{}",
            self.api_base, sheet_id, range
        )
    }

    async fn get_values(&self, sheet_id: &str, range: &str) -> Result<Vec<Vec<String>>> {
        let url = self.values_url(sheet_id, range);
        let response = self
            .client
            .get(&url)
            .query(&[("key", self.api_key.as_str())])
            .send()
            .await
            .with_context(|| format!("Failed to send request to {}", url))?;

        let status = response.status();
        let response_text = response
            .text()
            .await
            .context("Failed to get response text")?;

        if !status.is_success() {
            anyhow::bail!(
                "Sheet read failed with status {} for range {}\nResponse body: {}",
                status,
                range,
                response_text
            );
        }

        let body: ValueRange = serde_json::from_str(&response_text).with_context(|| {
            format!(
                "Failed to parse sheet values for {}. Response body (first 500 chars): {}",
                range,
                &response_text.chars().take(500).collect::<String>()
            )
        })?;

        Ok(body.values)
    }
}

#[async_trait]
impl RosterStore for SheetsClient {
    async fn teacher_rows(&self) -> Result<Vec<Vec<String>>> {
        self.get_values(&self.teacher_sheet_id, &self.teacher_range)
            .await
            .context("Failed to fetch teacher list")
    }

    async fn student_rows(&self, sheet_id: &str, range: &str) -> Result<Vec<Vec<String>>> {
        self.get_values(sheet_id, range)
            .await
            .with_context(|| format!("Failed to fetch students for {}", range))
    }

    async fn append_attendance(&self, records: &[AttendanceRecord]) -> Result<AppendResponse> {
        let response = self
            .client
            .post(&self.append_url)
            .json(&AppendRequest::submit_attendance(records))
            .send()
            .await
            .context("Failed to send attendance records")?;

        let status = response.status();
        let response_text = response
            .text()
            .await
            .context("Failed to get response text")?;

        if !status.is_success() {
            anyhow::bail!(
                "Attendance submission failed with status {}\nResponse body: {}",
                status,
                response_text
            );
        }

        serde_json::from_str(&response_text).with_context(|| {
            format!(
                "Failed to parse submission response. Response body (first 500 chars): {}",
                &response_text.chars().take(500).collect::<String>()
            )
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::ClassCatalog;
    use crate::error::AttendanceError;
    use crate::roster;
    use crate::session::Session;
    use std::path::PathBuf;
    use tokio::net::TcpListener;

    fn config() -> Config {
        Config {
            api_key: "key".to_string(),
            api_base: "https://sheets.example.test/v4".to_string(),
            teacher_sheet_id: "teachers".to_string(),
            teacher_range: "Sheet1!A2:D".to_string(),
            append_url: "https://script.example.test/exec".to_string(),
            request_timeout: Duration::from_secs(5),
            classes_file: None,
            log_file: PathBuf::from("attendance.log"),
        }
    }

    #[test]
    fn test_values_url() {
        let client = SheetsClient::new(&config()).unwrap();
        assert_eq!(
            client.values_url("abc123", "Class1!A2:B"),
            "https://sheets.example.test/v4/spreadsheets/abc123/values/Class1!A2:B"
        );
    }

    /// Accepts connections and never answers them.
    async fn stalled_server() -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let mut held = Vec::new();
            while let Ok((stream, _)) = listener.accept().await {
                held.push(stream);
            }
        });
        format!("http://{}", addr)
    }

    #[tokio::test]
    async fn test_roster_timeout_is_fetch_error() {
        let mut config = config();
        config.api_base = stalled_server().await;
        config.request_timeout = Duration::from_secs(1);
        let client = SheetsClient::new(&config).unwrap();
        let catalog = ClassCatalog::from_yaml(
            r#"
- id: "1"
  name: Class1
  sheet_id: sheet-1
"#,
        )
        .unwrap();

        let started = std::time::Instant::now();
        let err = roster::load_roster(&client, &catalog, "1").await.unwrap_err();
        assert!(matches!(err, AttendanceError::Fetch(_)), "got {:?}", err);
        assert!(started.elapsed() < Duration::from_secs(10));
    }

    #[tokio::test]
    async fn test_login_timeout_is_rejected() {
        let mut config = config();
        config.api_base = stalled_server().await;
        config.request_timeout = Duration::from_secs(1);
        let client = SheetsClient::new(&config).unwrap();

        let mut session = Session::new();
        assert!(!session.login(&client, "alice", "secret").await);
        assert!(!session.is_authenticated());
    }
}
