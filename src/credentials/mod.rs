//! Credential sources.
//!
//! Every source implements [`CredentialsProvider`]. The client calls
//! [`CredentialsProvider::retrieve`] once per request and never caches the
//! result itself, so expiry handling belongs to the provider.

use std::{fmt, sync::Arc};

use crate::{auth::Credentials, error::Error};

mod env;
mod profile;
mod refreshing;

pub use env::{EnvProvider, EnvVarSet};
pub use profile::ProfileProvider;
pub use refreshing::RefreshingProvider;

/// A source of [`Credentials`].
pub trait CredentialsProvider: Send + Sync + fmt::Debug {
    /// Returns credentials valid at call time, or an [`Error::Credential`].
    fn retrieve(&self) -> Result<Credentials, Error>;
}

/// Shared, type-erased provider handle.
pub type DynCredentialsProvider = Arc<dyn CredentialsProvider>;

impl<P> CredentialsProvider for Arc<P>
where
    P: CredentialsProvider + ?Sized,
{
    fn retrieve(&self) -> Result<Credentials, Error> {
        (**self).retrieve()
    }
}

/// Always returns the same credentials.
#[derive(Clone, Debug)]
pub struct StaticProvider {
    credentials: Credentials,
}

impl StaticProvider {
    /// Builds a provider from an access key and a secret key.
    ///
    /// Keys are checked on every [`retrieve`](CredentialsProvider::retrieve),
    /// so an empty key surfaces as a credential error on each call.
    pub fn new(access_key_id: impl Into<String>, secret_access_key: impl Into<String>) -> Self {
        Self {
            credentials: Credentials {
                access_key_id: access_key_id.into(),
                secret_access_key: secret_access_key.into(),
                session_token: None,
                expires_at: None,
            },
        }
    }

    pub fn with_session_token(mut self, session_token: impl Into<String>) -> Self {
        self.credentials.session_token = Some(session_token.into());
        self
    }

    pub fn from_credentials(credentials: Credentials) -> Self {
        Self { credentials }
    }
}

impl CredentialsProvider for StaticProvider {
    fn retrieve(&self) -> Result<Credentials, Error> {
        self.credentials.check()?;
        Ok(self.credentials.clone())
    }
}

/// Tries each provider in order and returns the first credentials found.
#[derive(Clone, Debug, Default)]
pub struct ChainedProvider {
    providers: Vec<DynCredentialsProvider>,
}

impl ChainedProvider {
    pub fn new(providers: Vec<DynCredentialsProvider>) -> Self {
        Self { providers }
    }

    /// Appends a provider to the end of the chain.
    pub fn with(mut self, provider: impl CredentialsProvider + 'static) -> Self {
        self.providers.push(Arc::new(provider));
        self
    }

    /// The usual lookup order: AWS env vars, MinIO env vars, then the shared profile.
    pub fn default_chain() -> Self {
        Self::default()
            .with(EnvProvider::aws())
            .with(EnvProvider::minio())
            .with(ProfileProvider::from_env())
    }
}

impl CredentialsProvider for ChainedProvider {
    fn retrieve(&self) -> Result<Credentials, Error> {
        let mut last = None;
        for provider in &self.providers {
            match provider.retrieve() {
                Ok(creds) => return Ok(creds),
                Err(err) => {
                    #[cfg(feature = "tracing")]
                    tracing::debug!(error = %err, "credentials provider in chain failed");
                    last = Some(err);
                }
            }
        }

        match last {
            Some(err) => Err(Error::credential(format!(
                "no provider in chain supplied credentials; last error: {err}"
            ))),
            None => Err(Error::credential("credentials provider chain is empty")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ErrorKind;

    #[derive(Debug)]
    struct Failing;

    impl CredentialsProvider for Failing {
        fn retrieve(&self) -> Result<Credentials, Error> {
            Err(Error::credential("nothing here"))
        }
    }

    #[test]
    fn static_provider_returns_same_credentials() {
        let provider = StaticProvider::new("AKID", "SECRET");
        let a = provider.retrieve().unwrap();
        let b = provider.retrieve().unwrap();
        assert_eq!(a.access_key_id, b.access_key_id);
        assert_eq!(a.secret_access_key, "SECRET");
    }

    #[test]
    fn static_provider_with_empty_secret_fails_every_time() {
        let provider = StaticProvider::new("AKID", "");
        for _ in 0..3 {
            let err = provider.retrieve().unwrap_err();
            assert_eq!(err.kind(), ErrorKind::Credential);
        }
    }

    #[test]
    fn chain_returns_first_success() {
        let chain = ChainedProvider::default()
            .with(Failing)
            .with(StaticProvider::new("SECOND", "SECRET"))
            .with(StaticProvider::new("THIRD", "SECRET"));
        assert_eq!(chain.retrieve().unwrap().access_key_id, "SECOND");
    }

    #[test]
    fn chain_reports_last_failure() {
        let chain = ChainedProvider::default()
            .with(StaticProvider::new("", "x"))
            .with(Failing);
        let err = chain.retrieve().unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Credential);
        assert!(err.message().contains("nothing here"));

        let empty = ChainedProvider::default().retrieve().unwrap_err();
        assert_eq!(empty.message(), "credentials provider chain is empty");
    }
}
