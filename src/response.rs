use serde::Deserialize;

/// Temporary security credentials returned by STS.
///
/// The `Debug` implementation redacts `access_key_secret` and `security_token`
/// to prevent accidental credential leakage in logs.
#[derive(Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Credentials {
    pub access_key_id: String,
    pub access_key_secret: String,
    pub security_token: String,
    pub expiration: String,
}

impl Credentials {
    /// Checks if the credentials have expired.
    ///
    /// An unparseable expiration counts as expired.
    pub fn is_expired(&self) -> bool {
        match chrono::DateTime::parse_from_rfc3339(&self.expiration) {
            Ok(exp_time) => chrono::Utc::now() >= exp_time.with_timezone(&chrono::Utc),
            Err(_) => true,
        }
    }

    /// Returns the remaining time until expiration.
    ///
    /// Returns `None` if the expiration cannot be parsed or has already passed.
    pub fn time_to_expiry(&self) -> Option<std::time::Duration> {
        let exp_time = chrono::DateTime::parse_from_rfc3339(&self.expiration).ok()?;
        let diff = exp_time.with_timezone(&chrono::Utc) - chrono::Utc::now();
        diff.to_std().ok().filter(|d| !d.is_zero())
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("access_key_id", &self.access_key_id)
            .field("access_key_secret", &"****")
            .field("security_token", &"****")
            .field("expiration", &self.expiration)
            .finish()
    }
}

/// Response from the AssumeRole API.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct AssumeRoleResponse {
    pub request_id: String,
    pub assumed_role_user: AssumedRoleUser,
    pub credentials: Credentials,
}

/// Information about the assumed role identity.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct AssumedRoleUser {
    pub arn: String,
    pub assumed_role_id: String,
}

/// Alibaba Cloud API error response body.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub(crate) struct ApiErrorResponse {
    pub request_id: Option<String>,
    pub host_id: Option<String>,
    pub code: String,
    pub message: String,
    pub recommend: Option<String>,
}
