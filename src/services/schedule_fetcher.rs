use anyhow::{Context, Result};
use reqwest::Client;
use std::time::Duration;

use crate::models::ScheduleResponse;

pub const RAYS_SCHEDULE_URL: &str =
    "https://site.api.espn.com/apis/site/v2/sports/baseball/mlb/teams/tb/schedule";

pub const DEFAULT_TIMEOUT_SECS: u64 = 10;

#[derive(Debug, Clone)]
pub struct FetchConfig {
    pub schedule_url: String,
    pub timeout: Duration,
    /// Skip TLS certificate verification. Off unless explicitly requested.
    pub accept_invalid_certs: bool,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            schedule_url: RAYS_SCHEDULE_URL.to_string(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            accept_invalid_certs: false,
        }
    }
}

// ── ScheduleFetcher ──────────────────────────────────────────────────────────

pub struct ScheduleFetcher {
    client: Client,
    schedule_url: String,
}

impl ScheduleFetcher {
    pub fn new(config: FetchConfig) -> Result<Self> {
        if config.accept_invalid_certs {
            tracing::warn!("TLS certificate verification disabled for {}", config.schedule_url);
        }

        let client = Client::builder()
            .timeout(config.timeout)
            .danger_accept_invalid_certs(config.accept_invalid_certs)
            .build()
            .context("failed to build http client")?;

        Ok(Self {
            client,
            schedule_url: config.schedule_url,
        })
    }

    /// One GET, no retry. Non-2xx responses are not treated specially: the
    /// body is handed to the JSON parser like any other.
    pub async fn fetch_schedule_body(&self) -> Result<String> {
        tracing::info!("Fetching schedule from {}…", self.schedule_url);

        let response = self.client
            .get(&self.schedule_url)
            .send().await
            .context("schedule request failed")?;

        let status = response.status();
        if !status.is_success() {
            tracing::warn!("Schedule endpoint answered {}", status);
        }

        let body = response.text().await
            .context("failed to read schedule response body")?;

        tracing::debug!("Schedule body: {} bytes", body.len());
        Ok(body)
    }
}

pub fn parse_schedule(body: &str) -> Result<ScheduleResponse> {
    let schedule: ScheduleResponse = serde_json::from_str(body)
        .context("invalid schedule JSON")?;
    tracing::debug!("Parsed {} events", schedule.events.len());
    Ok(schedule)
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    /// Serve a single canned HTTP response on localhost and return its URL.
    pub(crate) async fn serve_once(status_line: &'static str, body: String) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut buf = [0u8; 4096];
            let _ = socket.read(&mut buf).await;
            let response = format!(
                "HTTP/1.1 {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                status_line,
                body.len(),
                body
            );
            socket.write_all(response.as_bytes()).await.unwrap();
            socket.shutdown().await.ok();
        });

        format!("http://{}/apis/site/v2/sports/baseball/mlb/teams/tb/schedule", addr)
    }

    pub(crate) fn local_config(url: String) -> FetchConfig {
        FetchConfig {
            schedule_url: url,
            timeout: Duration::from_secs(5),
            accept_invalid_certs: false,
        }
    }

    #[test]
    fn test_default_config_verifies_certs() {
        let config = FetchConfig::default();
        assert_eq!(config.schedule_url, RAYS_SCHEDULE_URL);
        assert!(!config.accept_invalid_certs);
        assert_eq!(config.timeout, Duration::from_secs(DEFAULT_TIMEOUT_SECS));
    }

    #[test]
    fn test_parse_schedule_rejects_garbage() {
        assert!(parse_schedule("<html>oops</html>").is_err());
        assert!(parse_schedule("{}").unwrap().events.is_empty());
    }

    #[tokio::test]
    async fn test_fetch_schedule_from_local_server() {
        let url = serve_once("200 OK", r#"{"events":[{"date":"2025-06-01T17:10Z"}]}"#.to_string()).await;
        let fetcher = ScheduleFetcher::new(local_config(url)).unwrap();

        let schedule = parse_schedule(&fetcher.fetch_schedule_body().await.unwrap()).unwrap();
        assert_eq!(schedule.events.len(), 1);
        assert_eq!(schedule.events[0]["date"], "2025-06-01T17:10Z");
    }

    #[tokio::test]
    async fn test_non_success_status_still_parsed() {
        let url = serve_once("404 Not Found", r#"{"code":404}"#.to_string()).await;
        let fetcher = ScheduleFetcher::new(local_config(url)).unwrap();

        let schedule = parse_schedule(&fetcher.fetch_schedule_body().await.unwrap()).unwrap();
        assert!(schedule.events.is_empty());
    }

    #[tokio::test]
    async fn test_connection_refused_is_error() {
        // Grab a free port, then close it so nothing is listening there.
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let fetcher = ScheduleFetcher::new(local_config(format!("http://{}/schedule", addr))).unwrap();
        let err = fetcher.fetch_schedule_body().await.unwrap_err();
        assert!(format!("{:#}", err).starts_with("schedule request failed"));
    }
}
