use std::env;
use std::fmt;

use crate::error::{Result, StsError};

/// Environment variable holding the access key ID.
pub const ACCESS_KEY_ID_ENV: &str = "ALIBABA_CLOUD_ACCESS_KEY_ID";
/// Environment variable holding the access key secret.
pub const ACCESS_KEY_SECRET_ENV: &str = "ALIBABA_CLOUD_ACCESS_KEY_SECRET";

/// An access key secret.
///
/// Only used locally to key the request HMAC. It has no `Display` or
/// `Serialize` implementation and its `Debug` output is redacted.
#[derive(Clone, PartialEq, Eq)]
pub struct AccessKeySecret(String);

impl AccessKeySecret {
    pub fn new(secret: impl Into<String>) -> Self {
        Self(secret.into())
    }

    /// Returns the raw secret.
    pub fn expose(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Debug for AccessKeySecret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("****")
    }
}

impl From<String> for AccessKeySecret {
    fn from(secret: String) -> Self {
        Self(secret)
    }
}

impl From<&str> for AccessKeySecret {
    fn from(secret: &str) -> Self {
        Self(secret.to_string())
    }
}

/// Alibaba Cloud AccessKey credential.
#[derive(Clone, Debug)]
pub struct Credential {
    pub access_key_id: String,
    pub access_key_secret: AccessKeySecret,
}

impl Credential {
    pub fn new(access_key_id: impl Into<String>, access_key_secret: impl Into<String>) -> Self {
        Self {
            access_key_id: access_key_id.into(),
            access_key_secret: AccessKeySecret::new(access_key_secret),
        }
    }
}

/// Resolves a [`Credential`] from a specific source.
pub trait CredentialProvider {
    /// Attempt to resolve a credential from this provider.
    fn resolve(&self) -> Result<Credential>;
}

/// Provides a credential from explicitly specified values.
#[derive(Debug)]
pub struct StaticProvider {
    credential: Credential,
}

impl StaticProvider {
    pub fn new(access_key_id: impl Into<String>, access_key_secret: impl Into<String>) -> Self {
        Self {
            credential: Credential::new(access_key_id, access_key_secret),
        }
    }
}

impl CredentialProvider for StaticProvider {
    fn resolve(&self) -> Result<Credential> {
        Ok(self.credential.clone())
    }
}

/// Provides a credential from environment variables.
///
/// Reads [`ACCESS_KEY_ID_ENV`] and [`ACCESS_KEY_SECRET_ENV`] unless other
/// variable names are given.
#[derive(Debug)]
pub struct EnvProvider {
    id_var: String,
    secret_var: String,
}

impl Default for EnvProvider {
    fn default() -> Self {
        Self::with_vars(ACCESS_KEY_ID_ENV, ACCESS_KEY_SECRET_ENV)
    }
}

impl EnvProvider {
    /// Reads the credential from custom variable names.
    pub fn with_vars(id_var: impl Into<String>, secret_var: impl Into<String>) -> Self {
        Self {
            id_var: id_var.into(),
            secret_var: secret_var.into(),
        }
    }

    fn read(&self, name: &str) -> Result<String> {
        let value =
            env::var(name).map_err(|_| StsError::Credential(format!("{} not set", name)))?;
        if value.is_empty() {
            return Err(StsError::Credential(format!("{} is empty", name)));
        }
        Ok(value)
    }
}

impl CredentialProvider for EnvProvider {
    fn resolve(&self) -> Result<Credential> {
        let id = self.read(&self.id_var)?;
        let secret = self.read(&self.secret_var)?;
        Ok(Credential::new(id, secret))
    }
}
