//! Canonical request construction for ACS3-HMAC-SHA256.
//!
//! The canonical request is the exact text both sides hash before signing:
//!
//! ```text
//! HTTPRequestMethod\n
//! CanonicalURI\n
//! CanonicalQueryString\n
//! CanonicalHeaders\n
//! SignedHeaders\n
//! HashedRequestPayload
//! ```
//!
//! `CanonicalHeaders` ends with its own newline, so an empty line always
//! separates it from `SignedHeaders`. Every input mapping is re-sorted here;
//! caller ordering never leaks into the output.

use std::collections::BTreeMap;
use std::fmt;

use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};
use sha2::{Digest, Sha256};

use crate::error::{Result, StsError};

/// Headers with this prefix (compared case-insensitively) are always signed.
pub const SIGNING_HEADER_PREFIX: &str = "x-acs-";

/// Hex SHA-256 of the empty byte sequence.
pub const EMPTY_PAYLOAD_SHA256: &str =
    "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855";

/// Everything except RFC 3986 unreserved characters gets encoded.
const ENCODE_SET: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~');

/// HTTP verbs accepted by the signing protocol.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    Get,
    Post,
    Put,
    Delete,
    Head,
    Patch,
    Options,
}

impl Method {
    /// Returns the upper-case wire form of the verb.
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Put => "PUT",
            Method::Delete => "DELETE",
            Method::Head => "HEAD",
            Method::Patch => "PATCH",
            Method::Options => "OPTIONS",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Percent-encodes a string per RFC 3986.
///
/// Unreserved characters (A-Z, a-z, 0-9, '-', '.', '_', '~') are NOT encoded.
/// All other bytes are encoded as `%XX` (uppercase hex), so spaces become
/// `%20` rather than `+`.
pub fn percent_encode(s: &str) -> String {
    utf8_percent_encode(s, ENCODE_SET).to_string()
}

/// Lower-case hex SHA-256 of `bytes`.
pub fn hash_hex(bytes: &[u8]) -> String {
    hex::encode(Sha256::digest(bytes))
}

/// Builds the canonical query string.
///
/// Pairs are sorted by key, then value, comparing raw bytes. Each side is
/// percent-encoded; an empty value still produces `key=`.
pub fn canonical_query_string(params: &[(&str, &str)]) -> String {
    let mut sorted: Vec<(&str, &str)> = params.to_vec();
    sorted.sort_unstable();
    encode_pairs(&sorted)
}

/// Encodes form parameters as an `application/x-www-form-urlencoded` body.
///
/// Parameters keep the caller's order; the body is covered by its hash, not
/// by its layout.
pub fn encode_form(params: &[(&str, &str)]) -> String {
    encode_pairs(params)
}

fn encode_pairs(params: &[(&str, &str)]) -> String {
    params
        .iter()
        .map(|(k, v)| format!("{}={}", percent_encode(k), percent_encode(v)))
        .collect::<Vec<_>>()
        .join("&")
}

/// Returns `true` if a header participates in the signature.
pub fn is_signed_header(name: &str) -> bool {
    let name = name.trim();
    name.eq_ignore_ascii_case("host")
        || name
            .get(..SIGNING_HEADER_PREFIX.len())
            .is_some_and(|prefix| prefix.eq_ignore_ascii_case(SIGNING_HEADER_PREFIX))
}

/// Builds the canonical header block and the signed header names.
///
/// Only `host` and `x-acs-*` headers are selected. Names are lower-cased,
/// values trimmed, and repeated names are joined with commas. Each entry is
/// rendered as `name:value\n`; the names are joined with `;`.
pub fn canonical_headers(headers: &[(&str, &str)]) -> Result<(String, String)> {
    let mut selected: BTreeMap<String, String> = BTreeMap::new();
    for (name, value) in headers {
        if !is_signed_header(name) {
            continue;
        }
        let lower_name = name.trim().to_ascii_lowercase();
        let trimmed_value = value.trim();
        if contains_line_break(&lower_name) || contains_line_break(trimmed_value) {
            return Err(StsError::Encoding(format!(
                "header '{}' contains a line break",
                lower_name
            )));
        }
        selected
            .entry(lower_name)
            .and_modify(|existing| {
                existing.push(',');
                existing.push_str(trimmed_value);
            })
            .or_insert_with(|| trimmed_value.to_string());
    }

    let block: String = selected
        .iter()
        .map(|(name, value)| format!("{name}:{value}\n"))
        .collect();
    let names = selected.keys().map(String::as_str).collect::<Vec<_>>().join(";");
    Ok((block, names))
}

fn contains_line_break(s: &str) -> bool {
    s.contains(['\r', '\n'])
}

fn validate_path(path: &str) -> Result<()> {
    if !path.starts_with('/') {
        return Err(StsError::Encoding(format!(
            "request path '{}' must start with '/'",
            path
        )));
    }
    if path.contains(['?', '#']) || contains_line_break(path) {
        return Err(StsError::Encoding(format!(
            "request path '{}' must not carry a query, fragment or line break",
            path
        )));
    }
    Ok(())
}

/// The deterministic textual form of one HTTP request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CanonicalRequest {
    method: Method,
    uri: String,
    canonical_query_string: String,
    canonical_headers: String,
    signed_headers: String,
    payload_hash: String,
}

impl CanonicalRequest {
    /// Canonicalizes a request.
    ///
    /// `headers` is the full outgoing header set; unsigned headers are
    /// dropped here. `body` is the exact payload that will be sent.
    ///
    /// # Errors
    ///
    /// Returns [`StsError::Encoding`] if the path is not an absolute path
    /// without query or fragment, or a signed header contains a line break.
    pub fn new(
        method: Method,
        path: &str,
        query: &[(&str, &str)],
        headers: &[(&str, &str)],
        body: &[u8],
    ) -> Result<Self> {
        validate_path(path)?;
        let (canonical_headers, signed_headers) = canonical_headers(headers)?;
        Ok(Self {
            method,
            uri: path.to_string(),
            canonical_query_string: canonical_query_string(query),
            canonical_headers,
            signed_headers,
            payload_hash: hash_hex(body),
        })
    }

    pub fn method(&self) -> Method {
        self.method
    }

    pub fn uri(&self) -> &str {
        &self.uri
    }

    pub fn canonical_query_string(&self) -> &str {
        &self.canonical_query_string
    }

    /// The `name:value\n` block of signed headers.
    pub fn canonical_headers(&self) -> &str {
        &self.canonical_headers
    }

    /// Semicolon-joined, sorted names of the headers covered by the signature.
    pub fn signed_headers(&self) -> &str {
        &self.signed_headers
    }

    /// Lower-case hex SHA-256 of the request body.
    pub fn payload_hash(&self) -> &str {
        &self.payload_hash
    }

    /// Renders the canonical request text.
    pub fn to_canonical_string(&self) -> String {
        format!(
            "{}\n{}\n{}\n{}\n{}\n{}",
            self.method,
            self.uri,
            self.canonical_query_string,
            self.canonical_headers,
            self.signed_headers,
            self.payload_hash
        )
    }
}
