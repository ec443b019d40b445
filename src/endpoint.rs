//! Endpoint resolution: scheme, host, port, region, and addressing style.

use std::net::IpAddr;

use url::Url;

use crate::{
    auth::{AddressingStyle, Region},
    error::{Error, Result},
};

/// A resolved connection target.
///
/// Built once and shared by every [`Client`](crate::Client) call.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Endpoint {
    url: Url,
    region: Region,
    addressing: AddressingStyle,
}

impl Endpoint {
    /// Resolves `host` (`host`, `host:port`, or `http(s)://host[:port]`) using
    /// the known-provider rules. Fails if no region can be derived.
    pub fn new(host: impl AsRef<str>) -> Result<Self> {
        Self::builder(host).build()
    }

    pub fn builder(host: impl AsRef<str>) -> EndpointBuilder {
        EndpointBuilder {
            input: host.as_ref().trim().to_string(),
            secure: None,
            region: None,
            addressing: None,
        }
    }

    /// AWS S3 in `region`.
    pub fn aws(region: impl AsRef<str>) -> Result<Self> {
        let region = region.as_ref().trim();
        if region.is_empty() {
            return Err(Error::configuration("region must not be empty"));
        }

        let suffix = if region.starts_with("cn-") {
            "amazonaws.com.cn"
        } else {
            "amazonaws.com"
        };

        let host = if region == "us-east-1" {
            "s3.amazonaws.com".to_string()
        } else {
            format!("s3.{region}.{suffix}")
        };

        Self::builder(host).region(region).build()
    }

    /// Cloudflare R2 for `account_id`.
    pub fn cloudflare_r2(account_id: impl AsRef<str>) -> Result<Self> {
        let account_id = account_id.as_ref().trim();
        if account_id.is_empty() {
            return Err(Error::configuration("account_id must not be empty"));
        }
        Self::new(format!("{account_id}.r2.cloudflarestorage.com"))
    }

    /// Local MinIO on the default port.
    pub fn minio_local() -> Result<Self> {
        Self::builder("http://127.0.0.1:9000")
            .region("us-east-1")
            .build()
    }

    /// Base URL without bucket or key.
    pub fn url(&self) -> &Url {
        &self.url
    }

    pub fn scheme(&self) -> &str {
        self.url.scheme()
    }

    pub fn host(&self) -> &str {
        self.url.host_str().unwrap_or_default()
    }

    /// Explicit port, if the endpoint uses a non-default one.
    pub fn port(&self) -> Option<u16> {
        self.url.port()
    }

    pub fn is_secure(&self) -> bool {
        self.url.scheme() == "https"
    }

    pub fn region(&self) -> &Region {
        &self.region
    }

    pub fn addressing_style(&self) -> AddressingStyle {
        self.addressing
    }
}

/// Builder for [`Endpoint`].
#[derive(Clone, Debug)]
pub struct EndpointBuilder {
    input: String,
    secure: Option<bool>,
    region: Option<String>,
    addressing: Option<AddressingStyle>,
}

impl EndpointBuilder {
    /// Selects https (default) or http when the input has no scheme.
    pub fn secure(mut self, secure: bool) -> Self {
        self.secure = Some(secure);
        self
    }

    /// Sets the signing region, overriding any derived one.
    pub fn region(mut self, region: impl Into<String>) -> Self {
        self.region = Some(region.into());
        self
    }

    /// Overrides the derived addressing style.
    pub fn addressing_style(mut self, style: AddressingStyle) -> Self {
        self.addressing = Some(style);
        self
    }

    pub fn build(self) -> Result<Endpoint> {
        if self.input.is_empty() {
            return Err(Error::configuration("endpoint host must not be empty"));
        }

        let url = match self.input.split_once("://") {
            Some((scheme, _)) => {
                if let Some(secure) = self.secure
                    && secure != (scheme.eq_ignore_ascii_case("https"))
                {
                    return Err(Error::configuration(
                        "endpoint scheme conflicts with the secure setting",
                    ));
                }
                Url::parse(&self.input)
            }
            None => {
                let scheme = if self.secure.unwrap_or(true) {
                    "https"
                } else {
                    "http"
                };
                Url::parse(&format!("{scheme}://{}", self.input))
            }
        }
        .map_err(|_| Error::configuration("endpoint must be a valid host or absolute URL"))?;

        if url.scheme() != "http" && url.scheme() != "https" {
            return Err(Error::configuration(
                "endpoint scheme must be http or https",
            ));
        }
        let host = match url.host_str() {
            Some(host) if !host.is_empty() => host.to_ascii_lowercase(),
            _ => return Err(Error::configuration("endpoint must include host")),
        };
        if url.query().is_some() || url.fragment().is_some() {
            return Err(Error::configuration(
                "endpoint must not include query or fragment",
            ));
        }
        if url.path() != "/" && !url.path().is_empty() {
            return Err(Error::configuration("endpoint must not include a path"));
        }
        if !url.username().is_empty() || url.password().is_some() {
            return Err(Error::configuration("endpoint must not include user info"));
        }

        let known = classify_host(&host);
        let region = match (self.region, known.region) {
            (Some(explicit), _) => Region::new(explicit)?,
            (None, Some(derived)) => Region::new(derived)?,
            (None, None) => {
                return Err(Error::configuration(format!(
                    "region is required for endpoint {host}"
                )));
            }
        };

        Ok(Endpoint {
            url,
            region,
            addressing: self.addressing.unwrap_or(known.addressing),
        })
    }
}

struct KnownHost {
    region: Option<String>,
    addressing: AddressingStyle,
}

impl KnownHost {
    fn path(region: Option<String>) -> Self {
        Self {
            region,
            addressing: AddressingStyle::Path,
        }
    }

    fn virtual_hosted(region: Option<String>) -> Self {
        Self {
            region,
            addressing: AddressingStyle::VirtualHosted,
        }
    }
}

fn classify_host(host: &str) -> KnownHost {
    if host == "localhost" || host.trim_matches(['[', ']']).parse::<IpAddr>().is_ok() {
        return KnownHost::path(None);
    }

    if host.ends_with(".r2.cloudflarestorage.com") {
        return KnownHost::path(Some("auto".to_string()));
    }

    let aws_prefix = host
        .strip_suffix(".amazonaws.com")
        .or_else(|| host.strip_suffix(".amazonaws.com.cn"));
    let Some(prefix) = aws_prefix else {
        return KnownHost::path(None);
    };

    if prefix == "s3" || prefix == "s3-external-1" {
        return KnownHost::virtual_hosted(Some("us-east-1".to_string()));
    }
    if prefix == "s3-accelerate" || prefix == "s3-accelerate.dualstack" {
        return KnownHost::virtual_hosted(None);
    }

    let region = prefix
        .strip_prefix("s3.dualstack.")
        .or_else(|| prefix.strip_prefix("s3."))
        .or_else(|| prefix.strip_prefix("s3-"))
        .filter(|r| !r.is_empty() && !r.contains('.'))
        .map(str::to_string);

    match region {
        Some(region) => KnownHost::virtual_hosted(Some(region)),
        None => KnownHost::path(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ErrorKind;

    #[test]
    fn aws_global_endpoint_implies_us_east_1_virtual_hosted() {
        let ep = Endpoint::new("s3.amazonaws.com").unwrap();
        assert_eq!(ep.region().as_str(), "us-east-1");
        assert_eq!(ep.addressing_style(), AddressingStyle::VirtualHosted);
        assert_eq!(ep.url().as_str(), "https://s3.amazonaws.com/");
        assert!(ep.is_secure());
    }

    #[test]
    fn aws_regional_endpoints_derive_region() {
        for (host, region) in [
            ("s3.eu-west-1.amazonaws.com", "eu-west-1"),
            ("s3-ap-southeast-1.amazonaws.com", "ap-southeast-1"),
            ("s3.dualstack.us-west-2.amazonaws.com", "us-west-2"),
            ("s3.cn-north-1.amazonaws.com.cn", "cn-north-1"),
        ] {
            let ep = Endpoint::new(host).unwrap();
            assert_eq!(ep.region().as_str(), region, "{host}");
            assert_eq!(ep.addressing_style(), AddressingStyle::VirtualHosted);
        }
    }

    #[test]
    fn unknown_host_requires_region() {
        let err = Endpoint::new("play.min.io").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Configuration);

        let ep = Endpoint::builder("play.min.io")
            .region("us-east-1")
            .build()
            .unwrap();
        assert_eq!(ep.addressing_style(), AddressingStyle::Path);
        assert_eq!(ep.host(), "play.min.io");
    }

    #[test]
    fn explicit_region_overrides_derived() {
        let ep = Endpoint::builder("s3.amazonaws.com")
            .region("us-west-1")
            .build()
            .unwrap();
        assert_eq!(ep.region().as_str(), "us-west-1");
    }

    #[test]
    fn parses_host_port_and_scheme() {
        let ep = Endpoint::builder("localhost:9000")
            .secure(false)
            .region("us-east-1")
            .build()
            .unwrap();
        assert_eq!(ep.scheme(), "http");
        assert_eq!(ep.port(), Some(9000));
        assert_eq!(ep.addressing_style(), AddressingStyle::Path);

        let ep = Endpoint::builder("http://127.0.0.1:9000")
            .region("us-east-1")
            .build()
            .unwrap();
        assert!(!ep.is_secure());
    }

    #[test]
    fn rejects_invalid_endpoints() {
        for input in ["", "ftp://example.com", "https://example.com/path", "https://e.com?x=1"] {
            let err = Endpoint::builder(input).region("r").build().unwrap_err();
            assert_eq!(err.kind(), ErrorKind::Configuration, "{input}");
        }

        let err = Endpoint::builder("https://example.com")
            .secure(false)
            .region("r")
            .build()
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Configuration);
    }

    #[test]
    fn presets() {
        let r2 = Endpoint::cloudflare_r2("123").unwrap();
        assert_eq!(r2.host(), "123.r2.cloudflarestorage.com");
        assert_eq!(r2.region().as_str(), "auto");
        assert_eq!(r2.addressing_style(), AddressingStyle::Path);

        let aws = Endpoint::aws("cn-north-1").unwrap();
        assert_eq!(aws.host(), "s3.cn-north-1.amazonaws.com.cn");

        let local = Endpoint::minio_local().unwrap();
        assert_eq!(local.url().as_str(), "http://127.0.0.1:9000/");
        assert_eq!(local.region().as_str(), "us-east-1");
    }
}
