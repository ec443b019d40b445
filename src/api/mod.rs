//! Typed operations.
//!
//! Each operation is an `*Args` value implementing [`Operation`]. The set is
//! sealed: the crate decides how each one maps onto HTTP, callers decide
//! what to send. Every call returns a [`Response`], which carries either the
//! typed output or the [`Error`] that ended the call.

use bytes::Bytes;
use http::{HeaderMap, HeaderValue, Method, StatusCode, header::IntoHeaderName};

use crate::{
    endpoint::Endpoint,
    error::{Error, Result},
    transport::HttpResponse,
};

mod buckets;
mod objects;
pub(crate) mod validate;

pub use buckets::{
    BucketExistsArgs, BucketExistsResponse, DeleteBucketTagsArgs, DeleteBucketTagsResponse,
    GetBucketTagsArgs, GetBucketTagsResponse, GetBucketVersioningArgs,
    GetBucketVersioningResponse, ListBucketsArgs, ListBucketsResponse, MakeBucketArgs,
    MakeBucketResponse, RemoveBucketArgs, RemoveBucketResponse, SetBucketTagsArgs,
    SetBucketTagsResponse, SetBucketVersioningArgs, SetBucketVersioningResponse,
};
pub use objects::{
    CopyObjectArgs, CopyObjectResponse, DeleteObjectTagsArgs, DeleteObjectTagsResponse,
    GetObjectArgs, GetObjectResponse, GetObjectTagsArgs, GetObjectTagsResponse, ListObjectsArgs,
    ListObjectsResponse, PresignedObjectUrlArgs, PresignedObjectUrlResponse, PutObjectArgs,
    PutObjectResponse, RemoveObjectArgs, RemoveObjectResponse, SetObjectTagsArgs,
    SetObjectTagsResponse, StatObjectArgs, StatObjectResponse,
};

mod sealed {
    pub trait Sealed {}
}

/// A storage operation: argument validation plus its HTTP mapping.
///
/// Implemented only by the `*Args` types in this module.
pub trait Operation: sealed::Sealed + Send + Sync {
    /// Typed result of a successful call.
    type Output;

    /// Operation name used in logs and spans.
    const NAME: &'static str;

    /// Checks the arguments without touching the network.
    fn validate(&self) -> Result<()>;

    /// Describes the HTTP request for these (already validated) arguments.
    fn request(&self, endpoint: &Endpoint) -> Result<OperationRequest>;

    /// Turns a 2xx response into the typed output.
    fn parse(&self, response: HttpResponse) -> Result<Self::Output>;

    /// Gives the operation a chance to treat a service error as success.
    fn recover(&self, error: Error) -> Result<Self::Output> {
        Err(error)
    }
}

/// The unsigned request an operation asks the client to send.
#[derive(Clone, Debug)]
pub struct OperationRequest {
    pub method: Method,
    pub bucket: Option<String>,
    pub object: Option<String>,
    pub query: Vec<(String, String)>,
    pub headers: HeaderMap,
    pub body: Bytes,
}

impl OperationRequest {
    /// Starts a request carrying the caller's extra headers and query params.
    pub(crate) fn new(
        method: Method,
        bucket: Option<&str>,
        object: Option<&str>,
        extra_headers: &HeaderMap,
        extra_query_params: &[(String, String)],
    ) -> Self {
        Self {
            method,
            bucket: bucket.map(str::to_string),
            object: object.map(str::to_string),
            query: extra_query_params.to_vec(),
            headers: extra_headers.clone(),
            body: Bytes::new(),
        }
    }

    pub(crate) fn query(mut self, key: &str, value: impl Into<String>) -> Self {
        self.query.push((key.to_string(), value.into()));
        self
    }

    pub(crate) fn query_opt(self, key: &str, value: Option<&str>) -> Self {
        match value {
            Some(value) => self.query(key, value),
            None => self,
        }
    }

    /// Sets a header, replacing any caller-supplied value of the same name.
    pub(crate) fn header<K: IntoHeaderName>(mut self, name: K, value: HeaderValue) -> Self {
        self.headers.insert(name, value);
        self
    }

    pub(crate) fn text_header<K: IntoHeaderName>(self, name: K, value: &str) -> Result<Self> {
        let value = HeaderValue::from_str(value)
            .map_err(|_| Error::invalid_argument(format!("invalid header value {value:?}")))?;
        Ok(self.header(name, value))
    }

    /// Attaches an XML document with its `Content-MD5`.
    pub(crate) fn xml_body(self, body: Bytes) -> Result<Self> {
        let md5 = crate::util::md5::content_md5_header_value(&body)?;
        let mut request = self
            .header(
                http::header::CONTENT_TYPE,
                HeaderValue::from_static("application/xml"),
            )
            .header("content-md5", md5);
        request.body = body;
        Ok(request)
    }

    pub(crate) fn body(mut self, body: Bytes) -> Self {
        self.body = body;
        self
    }
}

/// Outcome of one call.
///
/// Exactly one of [`output`](Self::output) and [`error`](Self::error) is
/// present. Status and headers are those of the final HTTP response, when the
/// call got that far.
#[derive(Debug)]
pub struct Response<T> {
    outcome: Result<T>,
    status: Option<StatusCode>,
    headers: HeaderMap,
}

impl<T> Response<T> {
    pub(crate) fn new(outcome: Result<T>, status: Option<StatusCode>, headers: HeaderMap) -> Self {
        Self {
            outcome,
            status,
            headers,
        }
    }

    /// A call that ended before any HTTP response was received.
    pub(crate) fn failed(error: Error) -> Self {
        Self::new(Err(error), None, HeaderMap::new())
    }

    pub fn is_success(&self) -> bool {
        self.outcome.is_ok()
    }

    pub fn error(&self) -> Option<&Error> {
        self.outcome.as_ref().err()
    }

    pub fn output(&self) -> Option<&T> {
        self.outcome.as_ref().ok()
    }

    pub fn status(&self) -> Option<StatusCode> {
        self.status
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// `x-amz-request-id` of the response, or the one in the error document.
    pub fn request_id(&self) -> Option<&str> {
        self.headers
            .get("x-amz-request-id")
            .and_then(|v| v.to_str().ok())
            .or_else(|| self.error().and_then(Error::request_id))
    }

    pub fn into_result(self) -> Result<T> {
        self.outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ErrorKind;

    #[test]
    fn success_and_error_are_exclusive() {
        let ok = Response::new(Ok(7), Some(StatusCode::OK), HeaderMap::new());
        assert!(ok.is_success());
        assert!(ok.error().is_none());
        assert_eq!(ok.output(), Some(&7));

        let failed = Response::<u32>::failed(Error::invalid_argument("bad bucket"));
        assert!(!failed.is_success());
        assert_eq!(failed.error().map(Error::kind), Some(ErrorKind::InvalidArgument));
        assert!(failed.output().is_none());
        assert!(failed.status().is_none());
    }

    #[test]
    fn request_id_prefers_response_header() {
        let mut headers = HeaderMap::new();
        headers.insert("x-amz-request-id", HeaderValue::from_static("req-1"));
        let resp = Response::new(Ok(()), Some(StatusCode::NO_CONTENT), headers);
        assert_eq!(resp.request_id(), Some("req-1"));
    }

    #[test]
    fn caller_headers_and_params_are_kept() {
        let mut extra = HeaderMap::new();
        extra.insert("x-amz-request-payer", HeaderValue::from_static("requester"));
        let req = OperationRequest::new(
            Method::GET,
            Some("b"),
            None,
            &extra,
            &[("x-id".to_string(), "1".to_string())],
        )
        .query("tagging", "");

        assert_eq!(req.headers.get("x-amz-request-payer").unwrap(), "requester");
        assert_eq!(
            req.query,
            vec![
                ("x-id".to_string(), "1".to_string()),
                ("tagging".to_string(), String::new())
            ]
        );
    }

    #[test]
    fn xml_body_sets_content_headers() {
        let req = OperationRequest::new(Method::PUT, Some("b"), None, &HeaderMap::new(), &[])
            .xml_body(Bytes::from_static(b""))
            .unwrap();
        assert_eq!(req.headers.get("content-md5").unwrap(), "1B2M2Y8AsgTpgAmY7PhCfg==");
        assert_eq!(
            req.headers.get(http::header::CONTENT_TYPE).unwrap(),
            "application/xml"
        );
    }
}
