use time::{OffsetDateTime, format_description::well_known::Rfc3339};

use crate::{auth::Credentials, credentials::CredentialsProvider, error::Error};

/// Which family of environment variables to read.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EnvVarSet {
    /// `AWS_ACCESS_KEY_ID`, `AWS_SECRET_ACCESS_KEY`, `AWS_SESSION_TOKEN`.
    Aws,
    /// `MINIO_ACCESS_KEY` / `MINIO_ROOT_USER`, `MINIO_SECRET_KEY` / `MINIO_ROOT_PASSWORD`.
    Minio,
}

impl EnvVarSet {
    fn access_key_names(self) -> &'static [&'static str] {
        match self {
            Self::Aws => &["AWS_ACCESS_KEY_ID", "AWS_ACCESS_KEY"],
            Self::Minio => &["MINIO_ACCESS_KEY", "MINIO_ROOT_USER"],
        }
    }

    fn secret_key_names(self) -> &'static [&'static str] {
        match self {
            Self::Aws => &["AWS_SECRET_ACCESS_KEY", "AWS_SECRET_KEY"],
            Self::Minio => &["MINIO_SECRET_KEY", "MINIO_ROOT_PASSWORD"],
        }
    }

    fn session_token_name(self) -> Option<&'static str> {
        match self {
            Self::Aws => Some("AWS_SESSION_TOKEN"),
            Self::Minio => None,
        }
    }
}

/// Reads credentials from the process environment on every call.
#[derive(Clone, Copy, Debug)]
pub struct EnvProvider {
    vars: EnvVarSet,
}

impl EnvProvider {
    pub fn aws() -> Self {
        Self {
            vars: EnvVarSet::Aws,
        }
    }

    pub fn minio() -> Self {
        Self {
            vars: EnvVarSet::Minio,
        }
    }
}

impl CredentialsProvider for EnvProvider {
    fn retrieve(&self) -> Result<Credentials, Error> {
        load(self.vars, |name| std::env::var(name).ok())
    }
}

fn load<L>(vars: EnvVarSet, lookup: L) -> Result<Credentials, Error>
where
    L: Fn(&str) -> Option<String>,
{
    let access_key_id = first_set(&lookup, vars.access_key_names()).ok_or_else(|| {
        Error::credential(format!("missing {}", vars.access_key_names().join(" or ")))
    })?;
    let secret_access_key = first_set(&lookup, vars.secret_key_names()).ok_or_else(|| {
        Error::credential(format!("missing {}", vars.secret_key_names().join(" or ")))
    })?;

    let mut creds = Credentials::new(access_key_id, secret_access_key)?;
    if let Some(token) = vars
        .session_token_name()
        .and_then(|name| first_set(&lookup, &[name]))
    {
        creds = creds.with_session_token(token)?;
    }
    if vars == EnvVarSet::Aws
        && let Some(expiration) = first_set(&lookup, &["AWS_CREDENTIAL_EXPIRATION"])
    {
        let expires_at = OffsetDateTime::parse(&expiration, &Rfc3339).map_err(|_| {
            Error::credential("AWS_CREDENTIAL_EXPIRATION is not an RFC 3339 timestamp")
        })?;
        creds = creds.with_expires_at(expires_at);
        creds.check()?;
    }

    Ok(creds)
}

fn first_set<L>(lookup: &L, names: &[&str]) -> Option<String>
where
    L: Fn(&str) -> Option<String>,
{
    names
        .iter()
        .filter_map(|name| lookup(name))
        .map(|v| v.trim().to_string())
        .find(|v| !v.is_empty())
}
