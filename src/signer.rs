//! AWS Signature Version 4 for S3.
//!
//! [`sign`] is a pure function of its inputs: the same request, credentials,
//! region, and timestamp always produce the same headers.

use hmac::{Hmac, Mac as _};
use http::{HeaderMap, HeaderValue, Method};
use sha2::{Digest as _, Sha256};
use time::OffsetDateTime;
use url::Url;

use crate::{
    auth::{Credentials, Region},
    error::{Error, Result},
    types::PresignedRequest,
};

type HmacSha256 = Hmac<Sha256>;

/// Payload hash placeholder for requests whose body is not hashed.
pub const UNSIGNED_PAYLOAD: &str = "UNSIGNED-PAYLOAD";

const ALGORITHM: &str = "AWS4-HMAC-SHA256";
const SERVICE: &str = "s3";
const MAX_PRESIGN_SECS: u64 = 604_800;

/// The parts of an HTTP request that take part in the signature.
///
/// `headers` must already contain `host`. `canonical_uri` is the
/// percent-encoded path exactly as it will be sent.
#[derive(Clone, Copy, Debug)]
pub struct SigningRequest<'a> {
    pub method: &'a Method,
    pub canonical_uri: &'a str,
    pub query: &'a [(String, String)],
    pub headers: &'a HeaderMap,
    pub payload_hash: &'a str,
}

/// Lowercase hex SHA-256 of `body`.
pub fn payload_hash(body: &[u8]) -> String {
    sha256_hex(body)
}

/// Signs `request` and returns the headers to add to it: `x-amz-date`,
/// `x-amz-content-sha256`, `x-amz-security-token` (with a session token),
/// and `authorization`.
pub fn sign(
    request: &SigningRequest<'_>,
    credentials: &Credentials,
    region: &Region,
    now: OffsetDateTime,
) -> Result<HeaderMap> {
    check_credentials(credentials)?;
    if request.payload_hash.trim().is_empty() {
        return Err(Error::signing("payload hash must not be empty"));
    }
    if !request.headers.contains_key(http::header::HOST) {
        return Err(Error::signing("request is missing the host header"));
    }

    let mut added = HeaderMap::new();
    added.insert("x-amz-date", header_value(&amz_datetime(now), "x-amz-date")?);
    added.insert(
        "x-amz-content-sha256",
        header_value(request.payload_hash, "x-amz-content-sha256")?,
    );
    if let Some(token) = &credentials.session_token {
        added.insert(
            "x-amz-security-token",
            header_value(token, "x-amz-security-token")?,
        );
    }

    let mut signing_headers = request.headers.clone();
    for (name, value) in &added {
        signing_headers.insert(name.clone(), value.clone());
    }
    let (canonical_headers, signed_headers) = canonicalize_headers(&signing_headers)?;

    let canonical_request = canonical_request(
        request.method,
        request.canonical_uri,
        &crate::util::encode::canonical_query_string(request.query),
        &canonical_headers,
        &signed_headers,
        request.payload_hash,
    );
    let string_to_sign = string_to_sign(region, now, &canonical_request);
    let signature = signature(credentials, region, now, &string_to_sign)?;

    let authorization = format!(
        "{ALGORITHM} Credential={}/{}, SignedHeaders={signed_headers}, Signature={signature}",
        credentials.access_key_id,
        credential_scope(region, now),
    );
    added.insert(
        http::header::AUTHORIZATION,
        header_value(&authorization, "authorization")?,
    );

    Ok(added)
}

/// Builds a query-string authenticated URL valid for `expires_in`.
///
/// `url` is the request target with its path already percent-encoded. Any
/// query it carries is signed along with the `X-Amz-*` parameters.
pub fn presign(
    method: Method,
    mut url: Url,
    headers: &HeaderMap,
    credentials: &Credentials,
    region: &Region,
    now: OffsetDateTime,
    expires_in: std::time::Duration,
) -> Result<PresignedRequest> {
    let expires = expires_in.as_secs();
    if expires == 0 || expires > MAX_PRESIGN_SECS {
        return Err(Error::invalid_argument(format!(
            "presign expiry must be between 1 and {MAX_PRESIGN_SECS} seconds"
        )));
    }
    check_credentials(credentials)?;

    let canonical_uri = url.path().to_string();
    let mut query = url
        .query_pairs()
        .map(|(k, v)| (k.into_owned(), v.into_owned()))
        .collect::<Vec<_>>();

    let mut signing_headers = headers.clone();
    signing_headers.insert(
        http::header::HOST,
        header_value(&host_of(&url)?, "host")?,
    );
    let (canonical_headers, signed_headers) = canonicalize_headers(&signing_headers)?;

    query.extend([
        ("X-Amz-Algorithm".to_string(), ALGORITHM.to_string()),
        (
            "X-Amz-Credential".to_string(),
            format!(
                "{}/{}",
                credentials.access_key_id,
                credential_scope(region, now)
            ),
        ),
        ("X-Amz-Date".to_string(), amz_datetime(now)),
        ("X-Amz-Expires".to_string(), expires.to_string()),
        ("X-Amz-SignedHeaders".to_string(), signed_headers.clone()),
    ]);
    if let Some(token) = &credentials.session_token {
        query.push(("X-Amz-Security-Token".to_string(), token.clone()));
    }

    let canonical_request = canonical_request(
        &method,
        &canonical_uri,
        &crate::util::encode::canonical_query_string(&query),
        &canonical_headers,
        &signed_headers,
        UNSIGNED_PAYLOAD,
    );
    let string_to_sign = string_to_sign(region, now, &canonical_request);
    let signature = signature(credentials, region, now, &string_to_sign)?;

    query.push(("X-Amz-Signature".to_string(), signature));
    url.set_query(Some(&crate::util::encode::canonical_query_string(&query)));

    Ok(PresignedRequest {
        method,
        url,
        headers: headers.clone(),
    })
}

fn check_credentials(credentials: &Credentials) -> Result<()> {
    if credentials.access_key_id.trim().is_empty() {
        return Err(Error::signing("access key must not be empty"));
    }
    if credentials.secret_access_key.trim().is_empty() {
        return Err(Error::signing("secret key must not be empty"));
    }
    Ok(())
}

fn header_value(value: &str, name: &str) -> Result<HeaderValue> {
    HeaderValue::from_str(value).map_err(|_| Error::signing(format!("invalid {name} header value")))
}

fn host_of(url: &Url) -> Result<String> {
    let host = url
        .host_str()
        .ok_or_else(|| Error::signing("request url has no host"))?;
    Ok(match url.port() {
        Some(port) => format!("{host}:{port}"),
        None => host.to_string(),
    })
}

fn canonicalize_headers(headers: &HeaderMap) -> Result<(String, String)> {
    let mut pairs = Vec::with_capacity(headers.len());
    for name in headers.keys() {
        let name = name.as_str();
        if !should_sign_header(name) {
            continue;
        }
        // Repeated headers are joined with commas in arrival order.
        let values = headers
            .get_all(name)
            .iter()
            .map(|v| {
                v.to_str()
                    .map(normalize_header_value)
                    .map_err(|_| Error::signing(format!("header {name} is not valid text")))
            })
            .collect::<Result<Vec<_>>>()?;
        pairs.push((name.to_ascii_lowercase(), values.join(",")));
    }

    pairs.sort_by(|a, b| a.0.cmp(&b.0));

    let mut canonical_headers = String::new();
    let mut signed_headers = String::new();
    for (idx, (name, value)) in pairs.into_iter().enumerate() {
        canonical_headers.push_str(&name);
        canonical_headers.push(':');
        canonical_headers.push_str(&value);
        canonical_headers.push('\n');

        if idx > 0 {
            signed_headers.push(';');
        }
        signed_headers.push_str(&name);
    }

    Ok((canonical_headers, signed_headers))
}

fn should_sign_header(name: &str) -> bool {
    match name {
        "host"
        | "content-type"
        | "content-md5"
        | "range"
        | "if-match"
        | "if-none-match"
        | "if-modified-since"
        | "if-unmodified-since" => true,
        _ => name.starts_with("x-amz-"),
    }
}

fn normalize_header_value(value: &str) -> String {
    value.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn canonical_request(
    method: &Method,
    canonical_uri: &str,
    canonical_query_string: &str,
    canonical_headers: &str,
    signed_headers: &str,
    payload_hash: &str,
) -> String {
    format!(
        "{method}\n{canonical_uri}\n{canonical_query_string}\n{canonical_headers}\n{signed_headers}\n{payload_hash}"
    )
}

fn string_to_sign(region: &Region, now: OffsetDateTime, canonical_request: &str) -> String {
    format!(
        "{ALGORITHM}\n{}\n{}\n{}",
        amz_datetime(now),
        credential_scope(region, now),
        sha256_hex(canonical_request.as_bytes())
    )
}

fn signature(
    credentials: &Credentials,
    region: &Region,
    now: OffsetDateTime,
    string_to_sign: &str,
) -> Result<String> {
    let k_date = hmac_sha256(
        format!("AWS4{}", credentials.secret_access_key).as_bytes(),
        date_stamp(now).as_bytes(),
    )?;
    let k_region = hmac_sha256(&k_date, region.as_str().as_bytes())?;
    let k_service = hmac_sha256(&k_region, SERVICE.as_bytes())?;
    let k_signing = hmac_sha256(&k_service, b"aws4_request")?;
    let sig = hmac_sha256(&k_signing, string_to_sign.as_bytes())?;
    Ok(hex::encode(sig))
}

fn hmac_sha256(key: &[u8], data: &[u8]) -> Result<Vec<u8>> {
    let mut mac =
        HmacSha256::new_from_slice(key).map_err(|_| Error::signing("invalid HMAC key"))?;
    mac.update(data);
    Ok(mac.finalize().into_bytes().to_vec())
}

fn sha256_hex(data: &[u8]) -> String {
    hex::encode(Sha256::digest(data))
}

fn date_stamp(now: OffsetDateTime) -> String {
    let now = now.to_offset(time::UtcOffset::UTC);
    format!(
        "{:04}{:02}{:02}",
        now.year(),
        now.month() as u8,
        now.day()
    )
}

/// `YYYYMMDDTHHMMSSZ` in UTC.
pub(crate) fn amz_datetime(now: OffsetDateTime) -> String {
    let now = now.to_offset(time::UtcOffset::UTC);
    format!(
        "{:04}{:02}{:02}T{:02}{:02}{:02}Z",
        now.year(),
        now.month() as u8,
        now.day(),
        now.hour(),
        now.minute(),
        now.second()
    )
}

fn credential_scope(region: &Region, now: OffsetDateTime) -> String {
    format!(
        "{}/{}/{SERVICE}/aws4_request",
        date_stamp(now),
        region.as_str()
    )
}
