use serde::de::DeserializeOwned;
use tracing::debug;

use crate::config::{ClientConfig, RequestOptions};
use crate::credential::{Credential, CredentialProvider, EnvProvider};
use crate::error::{Result, StsError};
use crate::exec::{handle_response, map_transport_error};
use crate::policy::Policy;
use crate::request::{
    SigningContext, build_signed_request, validate_external_id, validate_role_arn,
    validate_session_name,
};
use crate::response::AssumeRoleResponse;

pub(crate) const ASSUME_ROLE_ACTION: &str = "AssumeRole";

/// Token lifetime requested when none is given.
pub const DEFAULT_DURATION_SECONDS: u64 = 3600;
/// Shortest token lifetime the API accepts.
pub const MIN_DURATION_SECONDS: u64 = 900;

/// Request parameters for the AssumeRole API.
#[derive(Debug, Clone)]
pub struct AssumeRoleRequest {
    /// ARN of the RAM role to assume.
    pub role_arn: String,
    /// Custom session name for audit logs.
    pub role_session_name: String,
    /// Additional policy to further restrict permissions.
    pub policy: Option<Policy>,
    /// Token validity duration in seconds (min: 900, default: 3600).
    pub duration_seconds: Option<u64>,
    /// External ID for cross-account role assumption.
    pub external_id: Option<String>,
}

impl AssumeRoleRequest {
    /// Starts a builder.
    pub fn builder() -> AssumeRoleRequestBuilder {
        AssumeRoleRequestBuilder::default()
    }

    /// Checks every field locally, before anything is signed or sent.
    pub fn validate(&self) -> Result<()> {
        validate_role_arn(&self.role_arn)?;
        validate_session_name(&self.role_session_name)?;
        if let Some(duration) = self.duration_seconds
            && duration < MIN_DURATION_SECONDS
        {
            return Err(StsError::Validation(format!(
                "DurationSeconds {} is below the minimum of {}",
                duration, MIN_DURATION_SECONDS
            )));
        }
        if let Some(ref external_id) = self.external_id {
            validate_external_id(external_id)?;
        }
        Ok(())
    }

    pub(crate) fn to_params(&self) -> Result<Vec<(&'static str, String)>> {
        let mut params = vec![
            ("RoleArn", self.role_arn.clone()),
            ("RoleSessionName", self.role_session_name.clone()),
            (
                "DurationSeconds",
                self.duration_seconds
                    .unwrap_or(DEFAULT_DURATION_SECONDS)
                    .to_string(),
            ),
        ];
        if let Some(ref policy) = self.policy {
            params.push(("Policy", policy.to_json()?));
        }
        if let Some(ref external_id) = self.external_id {
            params.push(("ExternalId", external_id.clone()));
        }
        Ok(params)
    }
}

/// Builder for [`AssumeRoleRequest`].
#[derive(Debug, Default)]
pub struct AssumeRoleRequestBuilder {
    role_arn: String,
    role_session_name: String,
    policy: Option<Policy>,
    duration_seconds: Option<u64>,
    external_id: Option<String>,
}

impl AssumeRoleRequestBuilder {
    pub fn role_arn(mut self, role_arn: impl Into<String>) -> Self {
        self.role_arn = role_arn.into();
        self
    }

    pub fn role_session_name(mut self, name: impl Into<String>) -> Self {
        self.role_session_name = name.into();
        self
    }

    pub fn policy(mut self, policy: Policy) -> Self {
        self.policy = Some(policy);
        self
    }

    pub fn duration_seconds(mut self, seconds: u64) -> Self {
        self.duration_seconds = Some(seconds);
        self
    }

    pub fn external_id(mut self, external_id: impl Into<String>) -> Self {
        self.external_id = Some(external_id.into());
        self
    }

    pub fn build(self) -> AssumeRoleRequest {
        AssumeRoleRequest {
            role_arn: self.role_arn,
            role_session_name: self.role_session_name,
            policy: self.policy,
            duration_seconds: self.duration_seconds,
            external_id: self.external_id,
        }
    }
}

/// Async client for the Alibaba Cloud STS API.
///
/// Every call makes exactly one HTTP attempt; retries are left to the caller
/// (see [`StsError::is_retryable`]).
#[derive(Debug)]
pub struct Client {
    http: reqwest::Client,
    config: ClientConfig,
    credential: Credential,
}

impl Client {
    /// Creates a new client with an explicit credential.
    pub fn new(credential: Credential) -> Result<Self> {
        Self::with_config(credential, ClientConfig::default())
    }

    /// Creates a new client with an explicit credential and custom configuration.
    pub fn with_config(credential: Credential, config: ClientConfig) -> Result<Self> {
        config.host()?;
        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| StsError::Config(format!("Failed to build HTTP client: {}", e)))?;
        Ok(Self {
            http,
            config,
            credential,
        })
    }

    /// Creates a new client from the `ALIBABA_CLOUD_ACCESS_KEY_*` environment variables.
    pub fn from_env() -> Result<Self> {
        let credential = EnvProvider::default().resolve()?;
        Self::new(credential)
    }

    /// Assumes a RAM role and obtains temporary security credentials.
    pub async fn assume_role(&self, request: AssumeRoleRequest) -> Result<AssumeRoleResponse> {
        self.assume_role_with_options(request, RequestOptions::default())
            .await
    }

    /// Like [`Client::assume_role`], with a per-call deadline.
    pub async fn assume_role_with_options(
        &self,
        request: AssumeRoleRequest,
        options: RequestOptions,
    ) -> Result<AssumeRoleResponse> {
        request.validate()?;
        let owned = request.to_params()?;
        let params: Vec<(&str, &str)> = owned.iter().map(|(k, v)| (*k, v.as_str())).collect();
        self.execute(ASSUME_ROLE_ACTION, &params, &options).await
    }

    async fn execute<T: DeserializeOwned>(
        &self,
        action: &str,
        params: &[(&str, &str)],
        options: &RequestOptions,
    ) -> Result<T> {
        let ctx = SigningContext::new();
        let signed = build_signed_request(action, params, &self.credential, &self.config, &ctx)?;
        let timeout = options.effective_timeout(&self.config);

        debug!(
            action,
            endpoint = %self.config.endpoint,
            nonce = %ctx.nonce,
            timeout = ?timeout,
            "Sending STS request"
        );

        let mut builder = self
            .http
            .post(&self.config.endpoint)
            .timeout(timeout)
            .body(signed.body);
        for (name, value) in &signed.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }

        let response = builder
            .send()
            .await
            .map_err(|e| map_transport_error(e, timeout))?;
        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| map_transport_error(e, timeout))?;

        debug!(action, status = status.as_u16(), "Received STS response");
        handle_response(status, text)
    }
}
