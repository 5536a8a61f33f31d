//! `HttpTransport`: a [`RemoteTransport`] over a plain JSON REST API —
//! request building, header setup, and status-code-driven error mapping,
//! kept generic over any cloud-hosted simulator or hardware vendor rather
//! than tied to one provider's wire format.

use std::time::Duration;

use reqwest::blocking::Client;
use reqwest::{header, StatusCode};
use serde::{Deserialize, Serialize};
use serde_json::json;

use qcore_hal::{JobResult, JobState};
use qcore_types::{CoreResult, DeviceName, ErrorKind};

use crate::transport::{RemoteDevice, RemoteStatus, RemoteTransport};

const USER_AGENT: &str = "qcore-adapter-remote";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);
const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// A blocking HTTP client against a generic "list devices / submit job /
/// poll job / cancel job" REST surface.
pub struct HttpTransport {
    client: Client,
    base_url: String,
}

impl HttpTransport {
    /// Build a transport bound to `base_url`, authenticating every request
    /// with a bearer token built from `credentials` (opaque pass-through).
    pub fn new(base_url: impl Into<String>, credentials: &qcore_hal::Credentials) -> CoreResult<Self> {
        let token = String::from_utf8_lossy(&credentials.0).into_owned();

        let mut headers = header::HeaderMap::new();
        headers.insert(
            header::AUTHORIZATION,
            header::HeaderValue::from_str(&format!("Bearer {token}"))
                .map_err(|_| ErrorKind::ProviderUnauthorized)?,
        );
        headers.insert(header::CONTENT_TYPE, header::HeaderValue::from_static("application/json"));
        headers.insert(header::ACCEPT, header::HeaderValue::from_static("application/json"));

        let client = Client::builder()
            .user_agent(USER_AGENT)
            .default_headers(headers)
            .timeout(REQUEST_TIMEOUT)
            .connect_timeout(CONNECT_TIMEOUT)
            .build()
            .map_err(|e| {
                tracing::warn!(error = %e, "failed to build remote transport client");
                ErrorKind::ProviderUnavailable { retryable: true }
            })?;

        Ok(Self {
            client,
            base_url: base_url.into(),
        })
    }

    fn map_transport_error(e: &reqwest::Error) -> ErrorKind {
        if e.is_timeout() || e.is_connect() {
            ErrorKind::ProviderUnavailable { retryable: true }
        } else {
            ErrorKind::ProviderUnavailable { retryable: false }
        }
    }

    fn map_status_error(status: StatusCode, retry_after: Option<Duration>, body: &str) -> ErrorKind {
        match status {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => ErrorKind::ProviderUnauthorized,
            StatusCode::TOO_MANY_REQUESTS => ErrorKind::ProviderThrottled {
                retry_after: retry_after.unwrap_or(Duration::from_secs(1)),
            },
            StatusCode::BAD_REQUEST | StatusCode::UNPROCESSABLE_ENTITY => ErrorKind::UnsupportedGate(body.to_string()),
            StatusCode::NOT_FOUND => ErrorKind::InvalidArgument(format!("remote resource not found: {body}")),
            _ if status.is_server_error() => ErrorKind::ProviderUnavailable { retryable: true },
            _ => ErrorKind::ProviderUnavailable { retryable: false },
        }
    }
}

#[derive(Debug, Serialize)]
struct SubmitRequest<'a> {
    device: &'a str,
    shots: u32,
    circuit: &'a [u8],
}

#[derive(Debug, Deserialize)]
struct SubmitResponse {
    job_id: String,
}

#[derive(Debug, Deserialize)]
struct StatusResponse {
    state: String,
    counts: Option<qcore_types::Counts>,
    shots_executed: Option<u32>,
    execution_time_ms: Option<u64>,
    #[serde(default)]
    device_offline: bool,
}

#[derive(Debug, Deserialize)]
struct CancelResponse {
    cancelled: bool,
}

impl RemoteTransport for HttpTransport {
    fn list_devices(&self) -> CoreResult<Vec<RemoteDevice>> {
        let response = self
            .client
            .get(format!("{}/devices", self.base_url))
            .send()
            .map_err(|e| Self::map_transport_error(&e))?;

        let status = response.status();
        if !status.is_success() {
            let retry_after = retry_after_header(&response);
            let body = response.text().unwrap_or_default();
            return Err(Self::map_status_error(status, retry_after, &body));
        }
        response
            .json::<Vec<RemoteDevice>>()
            .map_err(|_| ErrorKind::ProviderUnavailable { retryable: false })
    }

    fn submit_job(&self, device: &DeviceName, circuit_payload: &[u8], shots: u32) -> CoreResult<String> {
        let body = SubmitRequest {
            device: &device.0,
            shots,
            circuit: circuit_payload,
        };
        let response = self
            .client
            .post(format!("{}/devices/{}/jobs", self.base_url, device.0))
            .json(&body)
            .send()
            .map_err(|e| Self::map_transport_error(&e))?;

        let status = response.status();
        if !status.is_success() {
            let retry_after = retry_after_header(&response);
            let body = response.text().unwrap_or_default();
            return Err(Self::map_status_error(status, retry_after, &body));
        }
        let parsed: SubmitResponse =
            response.json().map_err(|_| ErrorKind::ProviderUnavailable { retryable: false })?;
        Ok(parsed.job_id)
    }

    fn job_status(&self, remote_job_id: &str) -> CoreResult<RemoteStatus> {
        let response = self
            .client
            .get(format!("{}/jobs/{}", self.base_url, remote_job_id))
            .send()
            .map_err(|e| Self::map_transport_error(&e))?;

        let status = response.status();
        if !status.is_success() {
            let retry_after = retry_after_header(&response);
            let body = response.text().unwrap_or_default();
            return Err(Self::map_status_error(status, retry_after, &body));
        }
        let parsed: StatusResponse =
            response.json().map_err(|_| ErrorKind::ProviderUnavailable { retryable: false })?;

        if parsed.device_offline {
            return Err(ErrorKind::DeviceOffline(remote_job_id.to_string()));
        }

        let state = parse_job_state(&parsed.state);
        let result = if state == JobState::Completed {
            Some(JobResult {
                counts: parsed.counts.unwrap_or_default(),
                shots_executed: parsed.shots_executed.unwrap_or(0),
                execution_time_ms: parsed.execution_time_ms.unwrap_or(0),
                raw_metadata: None,
            })
        } else {
            None
        };
        Ok(RemoteStatus { state, result })
    }

    fn cancel_job(&self, remote_job_id: &str) -> CoreResult<bool> {
        let response = self
            .client
            .post(format!("{}/jobs/{}/cancel", self.base_url, remote_job_id))
            .json(&json!({}))
            .send()
            .map_err(|e| Self::map_transport_error(&e))?;

        let status = response.status();
        if !status.is_success() {
            let retry_after = retry_after_header(&response);
            let body = response.text().unwrap_or_default();
            return Err(Self::map_status_error(status, retry_after, &body));
        }
        let parsed: CancelResponse =
            response.json().map_err(|_| ErrorKind::ProviderUnavailable { retryable: false })?;
        Ok(parsed.cancelled)
    }
}

fn retry_after_header(response: &reqwest::blocking::Response) -> Option<Duration> {
    response
        .headers()
        .get(header::RETRY_AFTER)
        .and_then(|v| v.to_str().ok())
        .and_then(|s| s.parse::<u64>().ok())
        .map(Duration::from_secs)
}

fn parse_job_state(state: &str) -> JobState {
    match state.to_ascii_lowercase().as_str() {
        "pending" => JobState::Pending,
        "queued" => JobState::Queued,
        "running" => JobState::Running,
        "completed" => JobState::Completed,
        "cancelled" | "canceled" => JobState::Cancelled,
        _ => JobState::Failed,
    }
}
