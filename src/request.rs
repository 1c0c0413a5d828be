//! Request building and signing logic for the STS API.

use std::collections::BTreeMap;
use std::sync::OnceLock;

use regex::Regex;

use crate::canonical::{CanonicalRequest, Method, encode_form, hash_hex};
use crate::config::ClientConfig;
use crate::credential::Credential;
use crate::error::{Result, StsError};
use crate::sign::sign;

pub(crate) const HEADER_HOST: &str = "host";
pub(crate) const HEADER_ACTION: &str = "x-acs-action";
pub(crate) const HEADER_VERSION: &str = "x-acs-version";
pub(crate) const HEADER_DATE: &str = "x-acs-date";
pub(crate) const HEADER_NONCE: &str = "x-acs-signature-nonce";
pub(crate) const HEADER_CONTENT_SHA256: &str = "x-acs-content-sha256";
pub(crate) const HEADER_AUTHORIZATION: &str = "authorization";
pub(crate) const HEADER_CONTENT_TYPE: &str = "content-type";

pub(crate) const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";

/// `x-acs-date` layout: ISO 8601, UTC, second precision.
const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%SZ";

static ROLE_ARN_REGEX: OnceLock<Regex> = OnceLock::new();
static SESSION_NAME_REGEX: OnceLock<Regex> = OnceLock::new();
static EXTERNAL_ID_REGEX: OnceLock<Regex> = OnceLock::new();

/// `acs:ram::{12-16 digit account id}:role/{1-64 char role name}`
fn role_arn_regex() -> &'static Regex {
    ROLE_ARN_REGEX.get_or_init(|| {
        Regex::new(r"^acs:ram::\d{12,16}:role/[a-zA-Z0-9\-_./]{1,64}$")
            .expect("Invalid ROLE_ARN_REGEX pattern")
    })
}

fn session_name_regex() -> &'static Regex {
    SESSION_NAME_REGEX.get_or_init(|| {
        Regex::new(r"^[A-Za-z0-9.@_\-]{2,64}$").expect("Invalid SESSION_NAME_REGEX pattern")
    })
}

fn external_id_regex() -> &'static Regex {
    EXTERNAL_ID_REGEX.get_or_init(|| {
        Regex::new(r"^[A-Za-z0-9_=,.@:/\-]{2,1224}$").expect("Invalid EXTERNAL_ID_REGEX pattern")
    })
}

pub(crate) fn validate_role_arn(arn: &str) -> Result<()> {
    if !role_arn_regex().is_match(arn) {
        return Err(StsError::Validation(format!(
            "Invalid RoleArn format '{}'. Expected: acs:ram::{{12-16 digit account id}}:role/{{1-64 char role name}}",
            arn
        )));
    }
    Ok(())
}

pub(crate) fn validate_session_name(name: &str) -> Result<()> {
    if !session_name_regex().is_match(name) {
        return Err(StsError::Validation(format!(
            "Invalid RoleSessionName '{}'. Expected 2-64 characters from [A-Za-z0-9.@_-]",
            name
        )));
    }
    Ok(())
}

pub(crate) fn validate_external_id(id: &str) -> Result<()> {
    if !external_id_regex().is_match(id) {
        return Err(StsError::Validation(format!(
            "Invalid ExternalId '{}'. Expected 2-1224 characters from [A-Za-z0-9_=,.@:/-]",
            id
        )));
    }
    Ok(())
}

/// Per-request signing inputs that change on every call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct SigningContext {
    pub timestamp: String,
    pub nonce: String,
}

impl SigningContext {
    /// Takes the current UTC time and a fresh random nonce.
    pub fn new() -> Self {
        Self {
            timestamp: chrono::Utc::now().format(TIMESTAMP_FORMAT).to_string(),
            nonce: uuid::Uuid::new_v4().to_string(),
        }
    }

    /// Pins both values, for reproducible signatures.
    #[cfg(test)]
    pub fn fixed(timestamp: impl Into<String>, nonce: impl Into<String>) -> Self {
        Self {
            timestamp: timestamp.into(),
            nonce: nonce.into(),
        }
    }
}

/// Outgoing headers and body of a signed request.
#[derive(Debug, Clone)]
pub(crate) struct SignedRequest {
    pub headers: BTreeMap<String, String>,
    pub body: String,
}

impl SignedRequest {
    /// Signs an arbitrary request.
    ///
    /// Adds `host`, `x-acs-date`, `x-acs-signature-nonce` and
    /// `x-acs-content-sha256` to `headers`, signs all of them and attaches
    /// the `authorization` header. A non-empty body is sent as a
    /// form.
    #[allow(clippy::too_many_arguments)]
    pub fn build(
        method: Method,
        path: &str,
        query: &[(&str, &str)],
        headers: &[(&str, &str)],
        body: String,
        host: &str,
        credential: &Credential,
        ctx: &SigningContext,
    ) -> Result<Self> {
        let mut all_headers: BTreeMap<String, String> = headers
            .iter()
            .map(|(k, v)| (k.to_ascii_lowercase(), v.to_string()))
            .collect();
        all_headers.insert(HEADER_HOST.to_string(), host.to_string());
        all_headers.insert(HEADER_DATE.to_string(), ctx.timestamp.clone());
        all_headers.insert(HEADER_NONCE.to_string(), ctx.nonce.clone());
        all_headers.insert(HEADER_CONTENT_SHA256.to_string(), hash_hex(body.as_bytes()));

        let header_pairs: Vec<(&str, &str)> = all_headers
            .iter()
            .map(|(k, v)| (k.as_str(), v.as_str()))
            .collect();
        let canonical =
            CanonicalRequest::new(method, path, query, &header_pairs, body.as_bytes())?;

        let authorization = sign(&canonical, credential)?;
        all_headers.insert(HEADER_AUTHORIZATION.to_string(), authorization);
        if !body.is_empty() {
            all_headers
                .entry(HEADER_CONTENT_TYPE.to_string())
                .or_insert_with(|| FORM_CONTENT_TYPE.to_string());
        }

        Ok(Self {
            headers: all_headers,
            body,
        })
    }
}

/// Builds the signed `POST /` for an RPC-style action with form parameters.
pub(crate) fn build_signed_request(
    action: &str,
    params: &[(&str, &str)],
    credential: &Credential,
    config: &ClientConfig,
    ctx: &SigningContext,
) -> Result<SignedRequest> {
    let host = config.host()?;
    SignedRequest::build(
        Method::Post,
        "/",
        &[],
        &[(HEADER_ACTION, action), (HEADER_VERSION, config.api_version)],
        encode_form(params),
        &host,
        credential,
        ctx,
    )
}
