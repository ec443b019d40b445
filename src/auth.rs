use std::{fmt, time::Duration};

use time::OffsetDateTime;

use crate::error::Error;

/// Signing region, e.g. `us-east-1`.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct Region(String);

impl Region {
    pub fn new(value: impl Into<String>) -> Result<Self, Error> {
        let value = value.into();
        if value.trim().is_empty() {
            return Err(Error::configuration("region must not be empty"));
        }
        Ok(Self(value))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Region").field(&self.0).finish()
    }
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<&str> for Region {
    type Error = Error;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// Access key, secret key, and optional session token used to sign requests.
///
/// Fields are public so callers can move credentials in and out of their own
/// stores; the signer still rejects empty keys.
#[derive(Clone)]
pub struct Credentials {
    pub access_key_id: String,
    pub secret_access_key: String,
    pub session_token: Option<String>,
    pub expires_at: Option<OffsetDateTime>,
}

impl Credentials {
    pub fn new(
        access_key_id: impl Into<String>,
        secret_access_key: impl Into<String>,
    ) -> Result<Self, Error> {
        let creds = Self {
            access_key_id: access_key_id.into(),
            secret_access_key: secret_access_key.into(),
            session_token: None,
            expires_at: None,
        };
        creds.check()?;
        Ok(creds)
    }

    pub fn with_session_token(mut self, session_token: impl Into<String>) -> Result<Self, Error> {
        let session_token = session_token.into();
        if session_token.trim().is_empty() {
            return Err(Error::credential("session_token must not be empty"));
        }
        self.session_token = Some(session_token);
        Ok(self)
    }

    pub fn with_expires_at(mut self, expires_at: OffsetDateTime) -> Self {
        self.expires_at = Some(expires_at);
        self
    }

    /// Returns true once `now` has reached the expiry instant.
    pub fn is_expired_at(&self, now: OffsetDateTime) -> bool {
        self.expires_within(now, Duration::ZERO)
    }

    /// Returns true if the credentials expire before `now + window`.
    pub fn expires_within(&self, now: OffsetDateTime, window: Duration) -> bool {
        match self.expires_at {
            Some(expires_at) => now + window >= expires_at,
            None => false,
        }
    }

    /// Checks that both keys are present and the credentials are not expired.
    pub(crate) fn check(&self) -> Result<(), Error> {
        if self.access_key_id.trim().is_empty() {
            return Err(Error::credential("access_key_id must not be empty"));
        }
        if self.secret_access_key.trim().is_empty() {
            return Err(Error::credential("secret_access_key must not be empty"));
        }
        if self.is_expired_at(OffsetDateTime::now_utc()) {
            return Err(Error::credential("credentials are expired"));
        }
        Ok(())
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field(
                "access_key_id",
                &crate::util::redact::redact_value(&self.access_key_id),
            )
            .field("secret_access_key", &"<redacted>")
            .field(
                "session_token",
                &self
                    .session_token
                    .as_ref()
                    .map(|v| crate::util::redact::redact_value(v)),
            )
            .field("expires_at", &self.expires_at)
            .finish()
    }
}

/// Where the bucket name goes in a request URL.
#[non_exhaustive]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AddressingStyle {
    /// `https://host/bucket/key`
    Path,
    /// `https://bucket.host/key`
    VirtualHosted,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_empty_keys() {
        assert!(Credentials::new("", "secret").is_err());
        let err = Credentials::new("AKID", "  ").unwrap_err();
        assert_eq!(err.kind(), crate::ErrorKind::Credential);
    }

    #[test]
    fn expiry_is_inclusive() {
        let at = OffsetDateTime::from_unix_timestamp(1_700_000_000).unwrap();
        let creds = Credentials::new("AKID", "SECRET").unwrap().with_expires_at(at);

        assert!(!creds.is_expired_at(at - Duration::from_secs(1)));
        assert!(creds.is_expired_at(at));
        assert!(creds.expires_within(at - Duration::from_secs(5), Duration::from_secs(10)));
    }

    #[test]
    fn debug_output_redacts_secrets() {
        let creds = Credentials::new("AKIDEXAMPLE1234", "wJalrXUtnFEMI/K7MDENG")
            .unwrap()
            .with_session_token("session-token-value")
            .unwrap();
        let out = format!("{creds:?}");
        assert!(!out.contains("wJalrXUtnFEMI"));
        assert!(!out.contains("session-token-value"));
        assert!(out.contains("AKID...1234"));
    }

    #[test]
    fn region_rejects_blank() {
        assert!(Region::new(" ").is_err());
        assert_eq!(Region::try_from("eu-west-1").unwrap().as_str(), "eu-west-1");
    }
}
