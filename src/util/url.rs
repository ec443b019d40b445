use url::Url;

use crate::{auth::AddressingStyle, endpoint::Endpoint, error::Error};

/// Final request target plus the pieces the signer needs.
#[derive(Debug)]
pub(crate) struct ResolvedUrl {
    pub(crate) url: Url,
    pub(crate) canonical_uri: String,
    pub(crate) query: Vec<(String, String)>,
}

impl ResolvedUrl {
    /// Value for the `host` header; default ports are omitted.
    pub(crate) fn host_header(&self) -> Result<String, Error> {
        let host = self
            .url
            .host_str()
            .ok_or_else(|| Error::configuration("endpoint must include host"))?;
        Ok(match self.url.port() {
            Some(port) => format!("{host}:{port}"),
            None => host.to_string(),
        })
    }
}

pub(crate) fn resolve_url(
    endpoint: &Endpoint,
    bucket: Option<&str>,
    key: Option<&str>,
    query: &[(String, String)],
) -> Result<ResolvedUrl, Error> {
    let mut url = endpoint.url().clone();

    let query_string = crate::util::encode::canonical_query_string(query);
    url.set_query((!query_string.is_empty()).then_some(query_string.as_str()));

    let Some(bucket) = bucket else {
        url.set_path("/");
        return Ok(ResolvedUrl {
            url,
            canonical_uri: "/".to_string(),
            query: query.to_vec(),
        });
    };

    let raw_path = match resolve_addressing_style(endpoint, bucket) {
        AddressingStyle::VirtualHosted => {
            let host = format!("{bucket}.{}", endpoint.host());
            url.set_host(Some(&host))
                .map_err(|_| Error::configuration("invalid virtual-hosted bucket host"))?;
            match key {
                Some(key) if !key.is_empty() => format!("/{key}"),
                _ => "/".to_string(),
            }
        }
        AddressingStyle::Path => match key {
            Some(key) => format!("/{bucket}/{key}"),
            None => format!("/{bucket}"),
        },
    };

    let canonical_uri = crate::util::encode::uri_encode_path(&raw_path);
    url.set_path(&canonical_uri);
    if url.path() != canonical_uri {
        return Err(Error::invalid_argument(format!(
            "object key would be sent as {} instead of {canonical_uri}",
            url.path()
        )));
    }

    Ok(ResolvedUrl {
        url,
        canonical_uri,
        query: query.to_vec(),
    })
}

fn resolve_addressing_style(endpoint: &Endpoint, bucket: &str) -> AddressingStyle {
    match endpoint.addressing_style() {
        AddressingStyle::VirtualHosted
            if crate::api::validate::bucket_name(bucket).is_ok()
                && !(endpoint.is_secure() && bucket.contains('.')) =>
        {
            AddressingStyle::VirtualHosted
        }
        _ => AddressingStyle::Path,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn path_endpoint() -> Endpoint {
        Endpoint::builder("https://example.com")
            .region("us-east-1")
            .build()
            .unwrap()
    }

    #[test]
    fn path_style_encodes_key_once() {
        let resolved = resolve_url(&path_endpoint(), Some("my-bucket"), Some("a+b"), &[]).unwrap();
        assert_eq!(resolved.canonical_uri, "/my-bucket/a%2Bb");
        assert_eq!(resolved.url.as_str(), "https://example.com/my-bucket/a%2Bb");
        assert_eq!(resolved.host_header().unwrap(), "example.com");
    }

    #[test]
    fn virtual_hosted_moves_bucket_into_host() {
        let ep = Endpoint::new("s3.amazonaws.com").unwrap();
        let resolved = resolve_url(&ep, Some("mybucket"), Some("dir/a b"), &[]).unwrap();
        assert_eq!(resolved.url.host_str().unwrap(), "mybucket.s3.amazonaws.com");
        assert_eq!(resolved.canonical_uri, "/dir/a%20b");

        let bucket_only = resolve_url(&ep, Some("mybucket"), None, &[]).unwrap();
        assert_eq!(bucket_only.canonical_uri, "/");
    }

    #[test]
    fn dotted_bucket_on_https_falls_back_to_path_style() {
        let ep = Endpoint::new("s3.amazonaws.com").unwrap();
        let resolved = resolve_url(&ep, Some("bucket.with.dots"), Some("key"), &[]).unwrap();
        assert_eq!(resolved.url.host_str().unwrap(), "s3.amazonaws.com");
        assert_eq!(resolved.canonical_uri, "/bucket.with.dots/key");
    }

    #[test]
    fn service_level_request_targets_root() {
        let resolved = resolve_url(&path_endpoint(), None, None, &[]).unwrap();
        assert_eq!(resolved.canonical_uri, "/");
        assert!(resolved.url.query().is_none());
    }

    #[test]
    fn query_is_canonicalized_and_port_kept_in_host_header() {
        let ep = Endpoint::builder("localhost:9000")
            .secure(false)
            .region("us-east-1")
            .build()
            .unwrap();
        let resolved = resolve_url(
            &ep,
            Some("my-bucket"),
            None,
            &[
                ("tagging".to_string(), String::new()),
                ("a b".to_string(), "1".to_string()),
            ],
        )
        .unwrap();
        assert_eq!(resolved.url.query(), Some("a%20b=1&tagging="));
        assert_eq!(resolved.host_header().unwrap(), "localhost:9000");
    }

    #[test]
    fn non_dns_bucket_uses_path_style() {
        let ep = Endpoint::builder("http://s3.local")
            .region("us-east-1")
            .addressing_style(AddressingStyle::VirtualHosted)
            .build()
            .unwrap();
        let resolved = resolve_url(&ep, Some("Legacy_Bucket"), Some("k"), &[]).unwrap();
        assert_eq!(resolved.url.host_str().unwrap(), "s3.local");
        assert_eq!(resolved.canonical_uri, "/Legacy_Bucket/k");

        let dotted = resolve_url(&ep, Some("a.b.c"), None, &[]).unwrap();
        assert_eq!(dotted.url.host_str().unwrap(), "a.b.c.s3.local");
    }

    #[test]
    fn sent_path_matches_signed_path() {
        let ep = path_endpoint();
        for key in ["a/b.txt", "...", "a..b", "dir/.env", "sp ace/+plus"] {
            let resolved = resolve_url(&ep, Some("my-bucket"), Some(key), &[]).unwrap();
            assert_eq!(resolved.url.path(), resolved.canonical_uri, "{key}");
        }

        for key in ["a/../b.txt", "./x", ".."] {
            let err = resolve_url(&ep, Some("my-bucket"), Some(key), &[]).unwrap_err();
            assert_eq!(err.kind(), crate::ErrorKind::InvalidArgument, "{key}");
        }
    }
}
