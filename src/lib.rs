//! Alibaba Cloud STS client with ACS3-HMAC-SHA256 request signing.
//!
//! The crate exchanges a long-lived AccessKey for short-lived, scoped session
//! credentials through the `AssumeRole` API. Requests are signed with the
//! V3 signature protocol:
//!
//! - [`canonical`] turns a request into its deterministic canonical text.
//! - [`sign`] hashes that text, computes the HMAC-SHA256 signature and
//!   formats the `Authorization` header.
//! - [`Client`] (and [`blocking::Client`] behind the `blocking` feature)
//!   sends exactly one signed request per call and maps the response into
//!   [`AssumeRoleResponse`] or [`StsError`].
//!
//! # Quick Start (async)
//!
//! ```no_run
//! use acs_sts::{AssumeRoleRequest, Client, Credential};
//!
//! # async fn example() -> acs_sts::Result<()> {
//! let client = Client::new(Credential::new(
//!     "your-access-key-id",
//!     "your-access-key-secret",
//! ))?;
//!
//! let resp = client
//!     .assume_role(
//!         AssumeRoleRequest::builder()
//!             .role_arn("acs:ram::123456789012:role/example")
//!             .role_session_name("session")
//!             .duration_seconds(3600)
//!             .build(),
//!     )
//!     .await?;
//!
//! println!("Temporary AK: {}", resp.credentials.access_key_id);
//! # Ok(())
//! # }
//! ```

pub mod canonical;
pub mod client;
pub mod config;
pub mod credential;
pub mod error;
pub mod policy;
pub mod response;
pub mod sign;

#[cfg(feature = "blocking")]
pub mod blocking;

mod exec;
mod request;

pub use canonical::{CanonicalRequest, Method};
pub use client::{AssumeRoleRequest, AssumeRoleRequestBuilder, Client};
pub use config::{ClientConfig, RequestOptions};
pub use credential::{AccessKeySecret, Credential, CredentialProvider, EnvProvider, StaticProvider};
pub use error::{Result, StsError};
pub use policy::{Effect, OneOrMany, Policy, Statement};
pub use response::{AssumeRoleResponse, AssumedRoleUser, Credentials};

// Compile-time assertions: key types must be Send + Sync for use across threads.
const _: () = {
    const fn assert_send_sync<T: Send + Sync>() {}
    let _ = assert_send_sync::<Client>;
    let _ = assert_send_sync::<StsError>;
    let _ = assert_send_sync::<Credential>;
    let _ = assert_send_sync::<CanonicalRequest>;
};
