use std::{
    fmt,
    sync::{Mutex, RwLock},
    time::Duration,
};

use time::OffsetDateTime;

use crate::{
    auth::Credentials,
    credentials::CredentialsProvider,
    error::{Error, ErrorKind},
};

/// Caches credentials from a fetch function and fetches again once they expire.
///
/// Only one fetch runs at a time. Callers that arrive while a fetch is in
/// flight wait for it and reuse its result.
pub struct RefreshingProvider<F> {
    fetch: F,
    refresh_window: Duration,
    cached: RwLock<Option<Credentials>>,
    refresh: Mutex<()>,
}

impl<F> RefreshingProvider<F>
where
    F: Fn() -> Result<Credentials, Error> + Send + Sync,
{
    pub fn new(fetch: F) -> Self {
        Self {
            fetch,
            refresh_window: Duration::ZERO,
            cached: RwLock::new(None),
            refresh: Mutex::new(()),
        }
    }

    /// Treats credentials as expired this long before their expiry instant.
    pub fn refresh_window(mut self, window: Duration) -> Self {
        self.refresh_window = window;
        self
    }

    fn cached_if_fresh(&self, now: OffsetDateTime) -> Result<Option<Credentials>, Error> {
        let guard = self
            .cached
            .read()
            .map_err(|_| Error::credential("credentials cache lock poisoned"))?;
        Ok(guard
            .as_ref()
            .filter(|c| !c.expires_within(now, self.refresh_window))
            .cloned())
    }
}

impl<F> CredentialsProvider for RefreshingProvider<F>
where
    F: Fn() -> Result<Credentials, Error> + Send + Sync,
{
    fn retrieve(&self) -> Result<Credentials, Error> {
        if let Some(creds) = self.cached_if_fresh(OffsetDateTime::now_utc())? {
            return Ok(creds);
        }

        let _refreshing = self
            .refresh
            .lock()
            .map_err(|_| Error::credential("credentials refresh lock poisoned"))?;

        // Another caller may have refreshed while this one waited.
        let now = OffsetDateTime::now_utc();
        if let Some(creds) = self.cached_if_fresh(now)? {
            return Ok(creds);
        }

        #[cfg(feature = "tracing")]
        tracing::debug!("refreshing credentials");

        let fresh = (self.fetch)().map_err(|err| match err.kind() {
            ErrorKind::Credential => err,
            _ => Error::credential_from("credentials refresh failed", err),
        })?;
        if fresh.is_expired_at(now) {
            return Err(Error::credential("refreshed credentials are already expired"));
        }
        fresh.check()?;

        let mut cached = self
            .cached
            .write()
            .map_err(|_| Error::credential("credentials cache lock poisoned"))?;
        *cached = Some(fresh.clone());
        Ok(fresh)
    }
}

impl<F> fmt::Debug for RefreshingProvider<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RefreshingProvider")
            .field("refresh_window", &self.refresh_window)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{
        Arc,
        atomic::{AtomicUsize, Ordering},
    };

    fn creds_expiring_in(secs: i64) -> Credentials {
        Credentials::new("AKID", "SECRET")
            .unwrap()
            .with_expires_at(OffsetDateTime::now_utc() + time::Duration::seconds(secs))
    }

    #[test]
    fn caches_until_expiry() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();
        let provider = RefreshingProvider::new(move || {
            counter.fetch_add(1, Ordering::SeqCst);
            Ok(creds_expiring_in(3600))
        });

        provider.retrieve().unwrap();
        provider.retrieve().unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn refetches_inside_refresh_window() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();
        let provider = RefreshingProvider::new(move || {
            counter.fetch_add(1, Ordering::SeqCst);
            Ok(creds_expiring_in(30))
        })
        .refresh_window(Duration::from_secs(60));

        provider.retrieve().unwrap();
        provider.retrieve().unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn failed_refresh_is_a_credential_error() {
        let provider =
            RefreshingProvider::new(|| Err(Error::transport("connection refused", None)));
        let err = provider.retrieve().unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Credential);
        assert!(err.message().contains("connection refused"));
    }

    #[test]
    fn already_expired_refresh_is_rejected() {
        let provider = RefreshingProvider::new(|| Ok(creds_expiring_in(-10)));
        let err = provider.retrieve().unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Credential);
    }

    #[test]
    fn concurrent_callers_share_one_refresh() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();
        let provider = Arc::new(RefreshingProvider::new(move || {
            counter.fetch_add(1, Ordering::SeqCst);
            std::thread::sleep(Duration::from_millis(50));
            Ok(creds_expiring_in(3600))
        }));

        let handles = (0..8)
            .map(|_| {
                let provider = provider.clone();
                std::thread::spawn(move || provider.retrieve().map(|c| c.access_key_id))
            })
            .collect::<Vec<_>>();

        for handle in handles {
            assert_eq!(handle.join().unwrap().unwrap(), "AKID");
        }
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
