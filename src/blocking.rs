//! Synchronous (blocking) client for the Alibaba Cloud STS API.
//!
//! This module is only available when the `blocking` feature is enabled.
//! It mirrors the async [`crate::client::Client`] API using `reqwest::blocking`,
//! which suits CLI tools and scripts that have no async runtime.
//!
//! # Example
//!
//! ```no_run
//! use acs_sts::blocking::Client;
//! use acs_sts::{AssumeRoleRequest, Credential};
//!
//! fn main() -> acs_sts::Result<()> {
//!     let client = Client::new(Credential::new("id", "secret"))?;
//!
//!     let request = AssumeRoleRequest::builder()
//!         .role_arn("acs:ram::123456789012:role/example")
//!         .role_session_name("session")
//!         .build();
//!
//!     let resp = client.assume_role(request)?;
//!     println!("AK: {}", resp.credentials.access_key_id);
//!     Ok(())
//! }
//! ```

use serde::de::DeserializeOwned;
use tracing::debug;

use crate::client::{ASSUME_ROLE_ACTION, AssumeRoleRequest};
use crate::config::{ClientConfig, RequestOptions};
use crate::credential::{Credential, CredentialProvider, EnvProvider};
use crate::error::{Result, StsError};
use crate::exec::{handle_response, map_transport_error};
use crate::request::{SigningContext, build_signed_request};
use crate::response::AssumeRoleResponse;

/// Synchronous client for the Alibaba Cloud STS API.
#[derive(Debug)]
pub struct Client {
    http: reqwest::blocking::Client,
    config: ClientConfig,
    credential: Credential,
}

impl Client {
    /// Creates a new blocking client with an explicit credential.
    pub fn new(credential: Credential) -> Result<Self> {
        Self::with_config(credential, ClientConfig::default())
    }

    /// Creates a new blocking client with custom configuration.
    pub fn with_config(credential: Credential, config: ClientConfig) -> Result<Self> {
        config.host()?;
        let http = reqwest::blocking::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| StsError::Config(format!("Failed to build HTTP client: {}", e)))?;
        Ok(Self {
            http,
            config,
            credential,
        })
    }

    /// Creates a new blocking client from the `ALIBABA_CLOUD_ACCESS_KEY_*` environment variables.
    pub fn from_env() -> Result<Self> {
        let credential = EnvProvider::default().resolve()?;
        Self::new(credential)
    }

    /// Assumes a RAM role and obtains temporary security credentials.
    pub fn assume_role(&self, request: AssumeRoleRequest) -> Result<AssumeRoleResponse> {
        self.assume_role_with_options(request, RequestOptions::default())
    }

    /// Like [`Client::assume_role`], with a per-call deadline.
    pub fn assume_role_with_options(
        &self,
        request: AssumeRoleRequest,
        options: RequestOptions,
    ) -> Result<AssumeRoleResponse> {
        request.validate()?;
        let owned = request.to_params()?;
        let params: Vec<(&str, &str)> = owned.iter().map(|(k, v)| (*k, v.as_str())).collect();
        self.execute(ASSUME_ROLE_ACTION, &params, &options)
    }

    fn execute<T: DeserializeOwned>(
        &self,
        action: &str,
        params: &[(&str, &str)],
        options: &RequestOptions,
    ) -> Result<T> {
        let ctx = SigningContext::new();
        let signed = build_signed_request(action, params, &self.credential, &self.config, &ctx)?;
        let timeout = options.effective_timeout(&self.config);

        debug!(action, endpoint = %self.config.endpoint, nonce = %ctx.nonce, "Sending STS request");

        let mut builder = self
            .http
            .post(&self.config.endpoint)
            .timeout(timeout)
            .body(signed.body);
        for (name, value) in &signed.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }

        let response = builder.send().map_err(|e| map_transport_error(e, timeout))?;
        let status = response.status();
        let text = response.text().map_err(|e| map_transport_error(e, timeout))?;

        debug!(action, status = status.as_u16(), "Received STS response");
        handle_response(status, text)
    }
}
