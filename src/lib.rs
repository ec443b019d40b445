//! A blocking S3 client built around SigV4 signing and typed operations.
//!
//! ## Quick start
//!
//! ```no_run
//! # fn demo() -> Result<(), s3core::Error> {
//! use s3core::{Client, Endpoint, StaticProvider, api::DeleteBucketTagsArgs};
//!
//! let endpoint = Endpoint::builder("play.min.io").region("us-east-1").build()?;
//! let client = Client::new(endpoint, StaticProvider::new("ACCESS_KEY", "SECRET_KEY"));
//!
//! let response = client.delete_bucket_tags(&DeleteBucketTagsArgs::new("my-bucket"));
//! if response.is_success() {
//!     println!("tags removed");
//! } else if let Some(err) = response.error() {
//!     eprintln!("unable to delete bucket tags: {err}");
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ## Design
//!
//! Every call returns a [`Response`] instead of panicking or retrying on its
//! own. Retries of transient HTTP failures are a policy of the transport.

#[cfg(all(
    feature = "rustls",
    feature = "native-tls",
    not(feature = "allow-both-tls")
))]
compile_error!("Enable only one of: rustls, native-tls.");

/// Typed operations and their responses.
pub mod api;
/// Credential sources.
pub mod credentials;
/// AWS Signature Version 4.
pub mod signer;
/// HTTP transport seam and the default `ureq` transport.
pub mod transport;
/// Operation outputs and shared value types.
pub mod types;

mod auth;
mod client;
mod endpoint;
mod error;
mod util;

pub use api::{Operation, Response};
pub use auth::{AddressingStyle, Credentials, Region};
pub use client::{Client, ClientBuilder};
pub use credentials::{
    ChainedProvider, CredentialsProvider, DynCredentialsProvider, EnvProvider, ProfileProvider,
    RefreshingProvider, StaticProvider,
};
pub use endpoint::{Endpoint, EndpointBuilder};
pub use error::{Error, ErrorKind, Result};
pub use transport::{HttpRequest, HttpResponse, RetryConfig, Transport, UreqTransport};
