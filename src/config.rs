use std::time::Duration;

use reqwest::Url;

use crate::error::{Result, StsError};

/// Configuration for the STS client.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// STS API endpoint URL.
    pub endpoint: String,

    /// Default deadline for a whole request, used when a call does not set its own.
    pub timeout: Duration,

    /// API version (always "2015-04-01").
    pub(crate) api_version: &'static str,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            endpoint: "https://sts.aliyuncs.com".to_string(),
            timeout: Duration::from_secs(30),
            api_version: "2015-04-01",
        }
    }
}

impl ClientConfig {
    /// Creates a new configuration with a custom endpoint.
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    /// Sets the default request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Returns the value of the signed `host` header for this endpoint.
    ///
    /// Includes the port only when it differs from the scheme's default.
    /// Requests are always signed for `/`, so an endpoint carrying a path,
    /// query or fragment is rejected.
    pub fn host(&self) -> Result<String> {
        let url = Url::parse(&self.endpoint).map_err(|e| {
            StsError::Config(format!("invalid endpoint '{}': {}", self.endpoint, e))
        })?;
        if url.path() != "/" || url.query().is_some() || url.fragment().is_some() {
            return Err(StsError::Config(format!(
                "endpoint '{}' must not carry a path, query or fragment",
                self.endpoint
            )));
        }
        let host = url.host_str().ok_or_else(|| {
            StsError::Config(format!("endpoint '{}' has no host", self.endpoint))
        })?;
        Ok(match url.port() {
            Some(port) => format!("{}:{}", host, port),
            None => host.to_string(),
        })
    }
}

/// Per-call options.
#[derive(Debug, Clone, Default)]
pub struct RequestOptions {
    /// Deadline for this call; the client's configured timeout applies when `None`.
    pub timeout: Option<Duration>,
}

impl RequestOptions {
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub(crate) fn effective_timeout(&self, config: &ClientConfig) -> Duration {
        self.timeout.unwrap_or(config.timeout)
    }
}
