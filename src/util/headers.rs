use http::{
    HeaderMap,
    header::{AsHeaderName, HeaderName},
};
use time::{OffsetDateTime, format_description::well_known::Rfc2822};

use crate::error::Error;

pub(crate) fn header_string<N>(headers: &HeaderMap, name: N) -> Option<String>
where
    N: AsHeaderName,
{
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
}

pub(crate) fn header_u64<N>(headers: &HeaderMap, name: N) -> Option<u64>
where
    N: AsHeaderName,
{
    header_string(headers, name).and_then(|v| v.trim().parse().ok())
}

/// Parses an HTTP-date such as `Last-Modified`.
pub(crate) fn header_http_date<N>(headers: &HeaderMap, name: N) -> Option<OffsetDateTime>
where
    N: AsHeaderName,
{
    // RFC 2822 parsing in `time` rejects the literal "GMT" zone name.
    let value = header_string(headers, name)?;
    let value = match value.trim().strip_suffix("GMT") {
        Some(rest) => format!("{rest}+0000"),
        None => value,
    };
    OffsetDateTime::parse(&value, &Rfc2822).ok()
}

/// `x-amz-meta-*` headers with the prefix stripped.
pub(crate) fn user_metadata(headers: &HeaderMap) -> Vec<(String, String)> {
    let mut out = headers
        .iter()
        .filter_map(|(name, value)| {
            let key = name.as_str().strip_prefix("x-amz-meta-")?;
            Some((key.to_string(), value.to_str().ok()?.to_string()))
        })
        .collect::<Vec<_>>();
    out.sort();
    out
}

/// Maps a user metadata key to its `x-amz-meta-*` header.
pub(crate) fn metadata_header_name(key: &str) -> Result<HeaderName, Error> {
    let key = key.trim();
    if key.is_empty() {
        return Err(Error::invalid_argument("metadata key must not be empty"));
    }

    HeaderName::from_bytes(format!("x-amz-meta-{}", key.to_ascii_lowercase()).as_bytes())
        .map_err(|_| Error::invalid_argument(format!("invalid metadata key {key:?}")))
}

pub(crate) fn copy_source_header_value(
    bucket: &str,
    key: &str,
    version_id: Option<&str>,
) -> String {
    let bucket = crate::util::encode::uri_encode(bucket);
    let key = crate::util::encode::uri_encode_path(key);

    match version_id {
        Some(v) => format!(
            "/{bucket}/{key}?versionId={}",
            crate::util::encode::uri_encode(v)
        ),
        None => format!("/{bucket}/{key}"),
    }
}
