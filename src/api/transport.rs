//! HTTP transport for the Scenario API.
//!
//! [`Transport`] is the seam between the typed API client and the network.
//! [`HttpTransport`] is the real implementation on top of
//! `reqwest::blocking`; tests substitute scripted transports.

use std::time::Duration;

use serde_json::Value;

use crate::config::Credentials;
use crate::error::{ErrorCode, Result, SpriteError};

/// Raw request/response operations used by [`super::ScenarioApi`].
///
/// `path` arguments are relative to the API base URL; `fetch_bytes` takes an
/// absolute URL and sends no credentials.
pub trait Transport {
    /// Sends an authenticated JSON `POST` and returns the decoded JSON body.
    fn post_json(&self, path: &str, body: &Value) -> Result<Value>;

    /// Sends an authenticated `GET` and returns the decoded JSON body.
    fn get_json(&self, path: &str) -> Result<Value>;

    /// Downloads raw bytes with a plain `GET`.
    fn fetch_bytes(&self, url: &str) -> Result<Vec<u8>>;
}

impl<T: Transport + ?Sized> Transport for &T {
    fn post_json(&self, path: &str, body: &Value) -> Result<Value> {
        (**self).post_json(path, body)
    }

    fn get_json(&self, path: &str) -> Result<Value> {
        (**self).get_json(path)
    }

    fn fetch_bytes(&self, url: &str) -> Result<Vec<u8>> {
        (**self).fetch_bytes(url)
    }
}

/// Blocking HTTP transport with HTTP Basic authorization.
pub struct HttpTransport {
    client: reqwest::blocking::Client,
    base_url: String,
    credentials: Credentials,
}

impl HttpTransport {
    /// Builds a transport for `base_url` using the given credentials.
    ///
    /// `request_timeout` bounds each individual HTTP request, not the
    /// overall job.
    pub fn new(
        base_url: impl Into<String>,
        credentials: Credentials,
        request_timeout: Duration,
    ) -> Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .timeout(request_timeout)
            .build()
            .map_err(|e| SpriteError::transport("Failed to create HTTP client", e))?;

        let base_url: String = base_url.into();
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            credentials,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    fn authorized(
        &self,
        builder: reqwest::blocking::RequestBuilder,
    ) -> reqwest::blocking::RequestBuilder {
        builder.basic_auth(
            self.credentials.api_key(),
            Some(self.credentials.api_secret()),
        )
    }

    /// Asset downloads go to CDN URLs and carry no credentials.
    fn download_request(&self, url: &str) -> reqwest::blocking::RequestBuilder {
        self.client.get(url)
    }
}

impl Transport for HttpTransport {
    fn post_json(&self, path: &str, body: &Value) -> Result<Value> {
        let url = self.endpoint(path);
        tracing::debug!(%url, "POST");

        let response = self
            .authorized(self.client.post(&url))
            .json(body)
            .send()
            .map_err(|e| SpriteError::transport(format!("POST {} failed: {}", url, e), e))?;

        read_json(response, &url)
    }

    fn get_json(&self, path: &str) -> Result<Value> {
        let url = self.endpoint(path);
        tracing::trace!(%url, "GET");

        let response = self
            .authorized(self.client.get(&url))
            .send()
            .map_err(|e| SpriteError::transport(format!("GET {} failed: {}", url, e), e))?;

        read_json(response, &url)
    }

    fn fetch_bytes(&self, url: &str) -> Result<Vec<u8>> {
        tracing::debug!(%url, "downloading asset");

        let response = self
            .download_request(url)
            .send()
            .map_err(|e| SpriteError::transport(format!("GET {} failed: {}", url, e), e))?;

        let response = ensure_success(response, url)?;
        let bytes = response.bytes().map_err(|e| {
            SpriteError::transport(format!("Failed to read body from {}: {}", url, e), e)
        })?;

        Ok(bytes.to_vec())
    }
}

/// Returns the response unchanged on 2xx, otherwise a transport error with
/// the status code and body text.
fn ensure_success(
    response: reqwest::blocking::Response,
    url: &str,
) -> Result<reqwest::blocking::Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response
        .text()
        .unwrap_or_else(|_| "<unreadable body>".to_string());
    Err(SpriteError::http_status(status.as_u16(), url, &body))
}

fn read_json(response: reqwest::blocking::Response, url: &str) -> Result<Value> {
    let response = ensure_success(response, url)?;
    let text = response.text().map_err(|e| {
        SpriteError::transport(format!("Failed to read body from {}: {}", url, e), e)
    })?;

    serde_json::from_str(&text).map_err(|e| {
        SpriteError::with_source(
            ErrorCode::Protocol,
            format!("Response from {} is not valid JSON", url),
            e,
        )
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn transport(base: &str) -> HttpTransport {
        HttpTransport::new(
            base,
            Credentials::new("key", "secret"),
            Duration::from_secs(5),
        )
        .unwrap()
    }

    #[test]
    fn endpoint_joins_without_double_slash() {
        let t = transport("https://api.cloud.scenario.com/v1/");
        assert_eq!(t.base_url(), "https://api.cloud.scenario.com/v1");
        assert_eq!(
            t.endpoint("/jobs/job_1"),
            "https://api.cloud.scenario.com/v1/jobs/job_1"
        );
        assert_eq!(
            t.endpoint("generate/img2img"),
            "https://api.cloud.scenario.com/v1/generate/img2img"
        );
    }

    #[test]
    fn api_requests_carry_basic_auth() {
        let t = transport("https://api.cloud.scenario.com/v1");
        let request = t
            .authorized(t.client.get(t.endpoint("/jobs/job_1")))
            .build()
            .unwrap();

        let header = request.headers().get(reqwest::header::AUTHORIZATION).unwrap();
        assert_eq!(header.to_str().unwrap(), "Basic a2V5OnNlY3JldA==");
    }

    #[test]
    fn downloads_carry_no_credentials() {
        let t = transport("https://api.cloud.scenario.com/v1");
        let request = t.download_request("https://cdn.scenario.com/U.png").build().unwrap();

        assert!(request.headers().get(reqwest::header::AUTHORIZATION).is_none());
        assert_eq!(request.url().as_str(), "https://cdn.scenario.com/U.png");
    }

    #[test]
    fn unreachable_host_is_transport_error() {
        let t = transport("http://127.0.0.1:9");
        let err = t.get_json("/jobs/job_1").unwrap_err();
        assert_eq!(err.code, ErrorCode::Transport);
    }
}
