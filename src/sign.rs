use hmac::{Hmac, Mac};
use sha2::Sha256;
use tracing::debug;

use crate::canonical::{CanonicalRequest, hash_hex};
use crate::credential::{AccessKeySecret, Credential};
use crate::error::{Result, StsError};

type HmacSha256 = Hmac<Sha256>;

/// Signature algorithm tag, as expected verbatim by the server.
pub const ALGORITHM: &str = "ACS3-HMAC-SHA256";

/// Builds the string to sign: the algorithm tag and the hex SHA-256 of the
/// canonical request text, separated by a newline.
pub fn string_to_sign(canonical: &CanonicalRequest) -> String {
    let canonical_text = canonical.to_canonical_string();
    debug!(canonical_request = %canonical_text, "Built canonical request");
    format!("{}\n{}", ALGORITHM, hash_hex(canonical_text.as_bytes()))
}

/// HMAC-SHA256 of `string_to_sign` keyed by the raw secret bytes, hex-encoded.
///
/// Empty inputs are not rejected; they simply produce their own signature.
pub fn compute_signature(string_to_sign: &str, secret: &AccessKeySecret) -> Result<String> {
    let mut mac = HmacSha256::new_from_slice(secret.expose().as_bytes())
        .map_err(|e| StsError::Signature(format!("HMAC key error: {}", e)))?;
    mac.update(string_to_sign.as_bytes());
    Ok(hex::encode(mac.finalize().into_bytes()))
}

/// Formats the `Authorization` header value.
pub fn authorization_header(access_key_id: &str, signed_headers: &str, signature: &str) -> String {
    format!(
        "{} Credential={},SignedHeaders={},Signature={}",
        ALGORITHM, access_key_id, signed_headers, signature
    )
}

/// Signs a canonical request and returns the `Authorization` header value.
pub fn sign(canonical: &CanonicalRequest, credential: &Credential) -> Result<String> {
    let string_to_sign = string_to_sign(canonical);
    debug!(string_to_sign = %string_to_sign, "Built string to sign");
    let signature = compute_signature(&string_to_sign, &credential.access_key_secret)?;
    Ok(authorization_header(
        &credential.access_key_id,
        canonical.signed_headers(),
        &signature,
    ))
}
