use std::{
    collections::HashMap,
    path::{Path, PathBuf},
};

use crate::{auth::Credentials, credentials::CredentialsProvider, error::Error};

type IniSections = HashMap<String, HashMap<String, String>>;

/// Reads a named profile from the shared AWS credentials and config files.
///
/// The files are read on every call so rotated keys are picked up without a
/// restart.
#[derive(Clone, Debug)]
pub struct ProfileProvider {
    profile: String,
    credentials_file: Option<PathBuf>,
    config_file: Option<PathBuf>,
}

impl ProfileProvider {
    pub fn new(profile: impl Into<String>) -> Self {
        Self {
            profile: profile.into(),
            credentials_file: None,
            config_file: None,
        }
    }

    /// Uses `AWS_PROFILE`, then `AWS_DEFAULT_PROFILE`, then `default`.
    pub fn from_env() -> Self {
        Self::new(profile_from_env())
    }

    /// Overrides the credentials file location.
    pub fn credentials_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.credentials_file = Some(path.into());
        self
    }

    /// Overrides the config file location.
    pub fn config_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.config_file = Some(path.into());
        self
    }

    fn load(&self) -> Result<Credentials, Error> {
        let creds_path = match &self.credentials_file {
            Some(path) => path.clone(),
            None => credentials_path()?,
        };
        let creds_ini = read_ini_file(&creds_path)?;
        let config_ini = match self.config_file.clone().map(Ok).unwrap_or_else(config_path) {
            Ok(path) if path.exists() => read_ini_file(&path)?,
            _ => HashMap::new(),
        };
        credentials_from_sections(&self.profile, &creds_ini, &config_ini)
    }
}

impl CredentialsProvider for ProfileProvider {
    fn retrieve(&self) -> Result<Credentials, Error> {
        self.load()
    }
}

fn profile_from_env() -> String {
    std::env::var("AWS_PROFILE")
        .or_else(|_| std::env::var("AWS_DEFAULT_PROFILE"))
        .unwrap_or_else(|_| "default".to_string())
}

fn credentials_from_sections(
    profile: &str,
    creds_ini: &IniSections,
    config_ini: &IniSections,
) -> Result<Credentials, Error> {
    let config_section = if profile == "default" {
        "default".to_string()
    } else {
        format!("profile {profile}")
    };

    let access_key_id = lookup_access_key(creds_ini, profile)
        .or_else(|| lookup_access_key(config_ini, &config_section))
        .ok_or_else(|| {
            Error::credential(format!("missing aws_access_key_id in profile {profile}"))
        })?;
    let secret_access_key = lookup_secret_key(creds_ini, profile)
        .or_else(|| lookup_secret_key(config_ini, &config_section))
        .ok_or_else(|| {
            Error::credential(format!(
                "missing aws_secret_access_key in profile {profile}"
            ))
        })?;

    let session_token = lookup(creds_ini, profile, "aws_session_token")
        .or_else(|| lookup(config_ini, &config_section, "aws_session_token"));

    let mut creds = Credentials::new(access_key_id, secret_access_key)?;
    if let Some(token) = session_token {
        creds = creds.with_session_token(token)?;
    }

    Ok(creds)
}

fn home_dir() -> Option<PathBuf> {
    std::env::var_os("HOME")
        .or_else(|| std::env::var_os("USERPROFILE"))
        .map(PathBuf::from)
}

fn default_aws_dir() -> Result<PathBuf, Error> {
    let home = home_dir().ok_or_else(|| Error::credential("cannot determine home dir"))?;
    Ok(home.join(".aws"))
}

fn credentials_path() -> Result<PathBuf, Error> {
    if let Some(path) = std::env::var_os("AWS_SHARED_CREDENTIALS_FILE") {
        return Ok(PathBuf::from(path));
    }
    Ok(default_aws_dir()?.join("credentials"))
}

fn config_path() -> Result<PathBuf, Error> {
    if let Some(path) = std::env::var_os("AWS_CONFIG_FILE") {
        return Ok(PathBuf::from(path));
    }
    Ok(default_aws_dir()?.join("config"))
}

fn read_ini_file(path: &Path) -> Result<IniSections, Error> {
    let contents = std::fs::read_to_string(path).map_err(|e| Error::Credential {
        message: format!("failed to read AWS profile file {}", path.display()),
        source: Some(Box::new(e)),
    })?;
    Ok(parse_ini(&contents))
}

fn parse_ini(contents: &str) -> IniSections {
    let mut sections = IniSections::new();
    let mut current: Option<String> = None;

    for raw in contents.lines() {
        let line = raw.trim();
        if line.is_empty() || line.starts_with('#') || line.starts_with(';') {
            continue;
        }

        if let Some(name) = line.strip_prefix('[').and_then(|l| l.strip_suffix(']')) {
            let name = name.trim();
            current = (!name.is_empty()).then(|| name.to_string());
            continue;
        }

        let Some(section) = current.as_ref() else {
            continue;
        };

        let Some((k, v)) = line.split_once('=').or_else(|| line.split_once(':')) else {
            continue;
        };

        let key = k.trim().to_ascii_lowercase();
        if key.is_empty() {
            continue;
        }

        sections
            .entry(section.clone())
            .or_default()
            .insert(key, v.trim().to_string());
    }

    sections
}

fn lookup(map: &IniSections, section: &str, key: &str) -> Option<String> {
    map.get(section)
        .and_then(|s| s.get(key))
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn lookup_access_key(map: &IniSections, section: &str) -> Option<String> {
    lookup(map, section, "aws_access_key_id").or_else(|| lookup(map, section, "aws_access_key"))
}

fn lookup_secret_key(map: &IniSections, section: &str) -> Option<String> {
    lookup(map, section, "aws_secret_access_key").or_else(|| lookup(map, section, "aws_secret_key"))
}

#[cfg(test)]
mod tests {
    use super::*;

    const CREDENTIALS: &str = r#"
; comment
[default]
aws_access_key_id = AKID
aws_secret_access_key= SECRET
aws_session_token: TOKEN

[ci]
aws_access_key_id = CIKEY
"#;

    const CONFIG: &str = r#"
[profile ci]
aws_secret_key : CISECRET
region = eu-west-1
"#;

    #[test]
    fn resolves_default_profile() {
        let creds =
            credentials_from_sections("default", &parse_ini(CREDENTIALS), &IniSections::new())
                .unwrap();
        assert_eq!(creds.access_key_id, "AKID");
        assert_eq!(creds.secret_access_key, "SECRET");
        assert_eq!(creds.session_token.as_deref(), Some("TOKEN"));
    }

    #[test]
    fn named_profile_falls_back_to_config_file() {
        let creds =
            credentials_from_sections("ci", &parse_ini(CREDENTIALS), &parse_ini(CONFIG)).unwrap();
        assert_eq!(creds.access_key_id, "CIKEY");
        assert_eq!(creds.secret_access_key, "CISECRET");
        assert!(creds.session_token.is_none());
    }

    #[test]
    fn missing_profile_is_a_credential_error() {
        let err = credentials_from_sections("nope", &parse_ini(CREDENTIALS), &IniSections::new())
            .unwrap_err();
        assert_eq!(err.kind(), crate::ErrorKind::Credential);
    }

    #[test]
    fn unreadable_file_is_a_credential_error() {
        let provider = ProfileProvider::new("default")
            .credentials_file("/nonexistent/aws/credentials")
            .config_file("/nonexistent/aws/config");
        let err = provider.retrieve().unwrap_err();
        assert_eq!(err.kind(), crate::ErrorKind::Credential);
    }
}
