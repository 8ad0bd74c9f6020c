//! Commands that drive a running simulator over HTTP

use crate::api::{ProbeResponse, SetHealthResponse, SetReadinessResponse, StatusResponse};
use crate::cli::output::{
    format_probe_json, format_probe_table, format_status_json, format_status_table, status_icon,
    ProbeTally,
};
use crate::cli::{ProbeArgs, SetHealthArgs, SetReadinessArgs, StatusArgs};
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use std::time::Duration;
use thiserror::Error;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Errors talking to a running simulator
#[derive(Debug, Error)]
pub enum RemoteError {
    #[error("request to {url} failed: {message}")]
    Request { url: String, message: String },

    #[error("unexpected HTTP status {status} from {url}")]
    UnexpectedStatus { url: String, status: u16 },

    #[error("invalid response from {url}: {message}")]
    InvalidResponse { url: String, message: String },
}

/// Thin client for the simulator's HTTP API
pub struct RemoteClient {
    client: reqwest::Client,
    base_url: String,
}

impl RemoteClient {
    pub fn new(base_url: &str) -> Result<Self, RemoteError> {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| RemoteError::Request {
                url: base_url.to_string(),
                message: e.to_string(),
            })?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// `GET /status`
    pub async fn status(&self) -> Result<StatusResponse, RemoteError> {
        let url = self.url("/status");
        let response = self.send(self.client.get(&url), &url).await?;
        decode(response, &url, &[StatusCode::OK]).await
    }

    /// `GET /health`; a 503 is a valid answer, not an error.
    pub async fn probe(&self) -> Result<ProbeResponse, RemoteError> {
        let url = self.url("/health");
        let response = self.send(self.client.get(&url), &url).await?;
        decode(
            response,
            &url,
            &[StatusCode::OK, StatusCode::SERVICE_UNAVAILABLE],
        )
        .await
    }

    /// `POST /set_health?healthy=..`
    pub async fn set_health(&self, healthy: &str) -> Result<SetHealthResponse, RemoteError> {
        let url = self.url("/set_health");
        let request = self.client.post(&url).query(&[("healthy", healthy)]);
        let response = self.send(request, &url).await?;
        decode(response, &url, &[StatusCode::OK]).await
    }

    /// `POST /set_readiness?percent=..`
    pub async fn set_readiness(
        &self,
        percent: &str,
    ) -> Result<SetReadinessResponse, RemoteError> {
        let url = self.url("/set_readiness");
        let request = self.client.post(&url).query(&[("percent", percent)]);
        let response = self.send(request, &url).await?;
        decode(response, &url, &[StatusCode::OK]).await
    }

    async fn send(
        &self,
        request: reqwest::RequestBuilder,
        url: &str,
    ) -> Result<reqwest::Response, RemoteError> {
        request.send().await.map_err(|e| RemoteError::Request {
            url: url.to_string(),
            message: e.to_string(),
        })
    }
}

async fn decode<T: DeserializeOwned>(
    response: reqwest::Response,
    url: &str,
    accepted: &[StatusCode],
) -> Result<T, RemoteError> {
    let status = response.status();
    if !accepted.contains(&status) {
        return Err(RemoteError::UnexpectedStatus {
            url: url.to_string(),
            status: status.as_u16(),
        });
    }

    response
        .json::<T>()
        .await
        .map_err(|e| RemoteError::InvalidResponse {
            url: url.to_string(),
            message: e.to_string(),
        })
}

/// Handle `healthsim status` command
pub async fn handle_status(args: &StatusArgs) -> Result<String, Box<dyn std::error::Error>> {
    let client = RemoteClient::new(&args.remote.url)?;
    let status = client.status().await?;

    if args.json {
        Ok(format_status_json(&status)?)
    } else {
        Ok(format_status_table(&status))
    }
}

/// Handle `healthsim probe` command
pub async fn handle_probe(args: &ProbeArgs) -> Result<String, Box<dyn std::error::Error>> {
    let client = RemoteClient::new(&args.remote.url)?;

    if args.count <= 1 && !args.json {
        let response = client.probe().await?;
        let detail = match response.reason {
            Some(reason) => format!("{} ({})", response.status_code(), reason),
            None => response.status_code().to_string(),
        };
        return Ok(format!(
            "{} {} from {}",
            status_icon(response.status),
            detail,
            response.metadata.instance
        ));
    }

    let mut tally = ProbeTally::default();
    for _ in 0..args.count.max(1) {
        tally.record(client.probe().await?);
    }

    if args.json {
        Ok(format_probe_json(&tally)?)
    } else {
        Ok(format_probe_table(&tally))
    }
}

/// Handle `healthsim set-health` command
pub async fn handle_set_health(
    args: &SetHealthArgs,
) -> Result<String, Box<dyn std::error::Error>> {
    let client = RemoteClient::new(&args.remote.url)?;
    let response = client.set_health(&args.healthy).await?;
    Ok(format!("✓ {}", response.message))
}

/// Handle `healthsim set-readiness` command
pub async fn handle_set_readiness(
    args: &SetReadinessArgs,
) -> Result<String, Box<dyn std::error::Error>> {
    let client = RemoteClient::new(&args.remote.url)?;
    let response = client.set_readiness(&args.percent).await?;
    Ok(format!("✓ {}", response.message))
}
