//! The call orchestrator.
//!
//! A [`Client`] owns the endpoint, the credentials provider, and the
//! transport. Each call validates its arguments, signs a fresh request, and
//! wraps whatever happened in a [`Response`].

use std::{borrow::Cow, sync::Arc, time::Duration};

use http::{HeaderValue, StatusCode};
use time::OffsetDateTime;

use crate::{
    api::{Operation, OperationRequest, Response},
    auth::Credentials,
    credentials::{ChainedProvider, CredentialsProvider, DynCredentialsProvider},
    endpoint::Endpoint,
    error::{Error, Result},
    signer::{self, SigningRequest},
    transport::{HttpRequest, HttpResponse, RetryConfig, Transport, UreqTransport},
    util::{headers::header_string, text::truncate_snippet, url::resolve_url, xml},
};

const MAX_ERROR_SNIPPET: usize = 4096;

/// Blocking S3 client. Cheap to clone and safe to share across threads.
#[derive(Clone, Debug)]
pub struct Client {
    inner: Arc<Inner>,
}

#[derive(Debug)]
struct Inner {
    endpoint: Endpoint,
    provider: DynCredentialsProvider,
    transport: Arc<dyn Transport>,
}

/// Builder for [`Client`].
#[derive(Debug)]
pub struct ClientBuilder {
    endpoint: Endpoint,
    provider: Option<DynCredentialsProvider>,
    transport: Option<Arc<dyn Transport>>,
    retry: RetryConfig,
    timeout: Option<Duration>,
    user_agent: Option<String>,
}

impl Client {
    /// Client with the default transport.
    pub fn new(endpoint: Endpoint, provider: impl CredentialsProvider + 'static) -> Self {
        Self::builder(endpoint).provider(provider).build()
    }

    pub fn builder(endpoint: Endpoint) -> ClientBuilder {
        ClientBuilder {
            endpoint,
            provider: None,
            transport: None,
            retry: RetryConfig::default(),
            timeout: None,
            user_agent: None,
        }
    }

    pub fn endpoint(&self) -> &Endpoint {
        &self.inner.endpoint
    }

    /// Runs one operation end to end.
    ///
    /// The per-operation methods (`delete_bucket_tags`, `put_object`, ...)
    /// forward here.
    pub fn execute<O: Operation>(&self, args: &O) -> Response<O::Output> {
        #[cfg(feature = "tracing")]
        let span = tracing::info_span!(
            "s3.request",
            operation = O::NAME,
            method = tracing::field::Empty,
            bucket = tracing::field::Empty,
            key = tracing::field::Empty,
            host = self.inner.endpoint.host(),
        );
        #[cfg(feature = "tracing")]
        let _guard = span.enter();

        if let Err(err) = args.validate() {
            return failed("validate", err);
        }
        let request = match args.request(&self.inner.endpoint) {
            Ok(request) => request,
            Err(err) => return failed("build", err),
        };

        #[cfg(feature = "tracing")]
        {
            span.record("method", request.method.as_str());
            span.record("bucket", request.bucket.as_deref().unwrap_or(""));
            span.record("key", request.object.as_deref().unwrap_or(""));
        }

        let bucket = request.bucket.clone();
        let object = request.object.clone();
        let (http_request, resource) = match self.sign(request) {
            Ok(prepared) => prepared,
            Err(err) => return failed("sign", err),
        };

        let response = match self.inner.transport.send(http_request) {
            Ok(response) => response,
            Err(err) => return failed("dispatch", err),
        };

        let status = response.status;
        let headers = response.headers.clone();
        let outcome = if status.is_success() {
            args.parse(response)
        } else {
            let err = service_error(
                &response,
                bucket.as_deref(),
                object.as_deref(),
                Some(&resource),
            );
            args.recover(err)
        };

        #[cfg(feature = "tracing")]
        if let Err(err) = &outcome {
            tracing::debug!(status = status.as_u16(), error = %err, "s3 request failed");
        }

        Response::new(outcome, Some(status), headers)
    }

    /// Credentials for one call. Any provider failure is reported as a
    /// credential error.
    pub(crate) fn retrieve_credentials(&self) -> Result<Credentials> {
        let credentials = self
            .inner
            .provider
            .retrieve()
            .map_err(|err| Error::credential_from("credentials provider failed", err))?;
        credentials.check()?;
        Ok(credentials)
    }

    /// Resolves the target, fetches credentials, and signs. Returns the
    /// request and its path for error reporting.
    fn sign(&self, request: OperationRequest) -> Result<(HttpRequest, String)> {
        let OperationRequest {
            method,
            bucket,
            object,
            query,
            mut headers,
            body,
        } = request;

        let resolved = resolve_url(
            &self.inner.endpoint,
            bucket.as_deref(),
            object.as_deref(),
            &query,
        )?;
        let credentials = self.retrieve_credentials()?;

        let host = resolved.host_header()?;
        headers.insert(
            http::header::HOST,
            HeaderValue::from_str(&host)
                .map_err(|_| Error::configuration(format!("invalid host {host:?}")))?,
        );
        let payload_hash = signer::payload_hash(&body);
        let added = signer::sign(
            &SigningRequest {
                method: &method,
                canonical_uri: &resolved.canonical_uri,
                query: &resolved.query,
                headers: &headers,
                payload_hash: &payload_hash,
            },
            &credentials,
            self.inner.endpoint.region(),
            OffsetDateTime::now_utc(),
        )?;
        headers.extend(added);

        Ok((
            HttpRequest {
                method,
                url: resolved.url,
                headers,
                body,
            },
            resolved.canonical_uri,
        ))
    }
}

fn failed<T>(stage: &'static str, err: Error) -> Response<T> {
    #[cfg(feature = "tracing")]
    tracing::debug!(stage, error = %err, "s3 request failed");
    #[cfg(not(feature = "tracing"))]
    let _ = stage;

    Response::failed(err)
}

/// Builds a service error from a response, filling gaps in the error
/// document from the status and the request.
pub(crate) fn service_error(
    response: &HttpResponse,
    bucket: Option<&str>,
    object: Option<&str>,
    resource: Option<&str>,
) -> Error {
    let status = response.status;
    let parsed = xml::parse_error_xml(&response.body).unwrap_or_default();
    let non_empty = |value: Option<String>| value.filter(|v| !v.trim().is_empty());

    let body_snippet = if response.body.is_empty() {
        None
    } else {
        let text = String::from_utf8_lossy(&response.body);
        Some(truncate_snippet(&text, MAX_ERROR_SNIPPET))
    };

    Error::Service {
        status,
        code: non_empty(parsed.code)
            .unwrap_or_else(|| status_code(status, bucket, object).to_string()),
        message: non_empty(parsed.message)
            .unwrap_or_else(|| status_message(status, bucket, object).into_owned()),
        resource: non_empty(parsed.resource).or_else(|| resource.map(str::to_string)),
        request_id: non_empty(parsed.request_id)
            .or_else(|| header_string(&response.headers, "x-amz-request-id")),
        host_id: non_empty(parsed.host_id)
            .or_else(|| header_string(&response.headers, "x-amz-id-2")),
        bucket: non_empty(parsed.bucket_name).or_else(|| bucket.map(str::to_string)),
        object: non_empty(parsed.key).or_else(|| object.map(str::to_string)),
        body_snippet,
    }
}

fn status_code(status: StatusCode, bucket: Option<&str>, object: Option<&str>) -> &'static str {
    match status.as_u16() {
        404 if object.is_some() => "NoSuchKey",
        404 if bucket.is_some() => "NoSuchBucket",
        404 => "ResourceNotFound",
        403 => "AccessDenied",
        400 => "BadRequest",
        301 => "PermanentRedirect",
        307 => "Redirect",
        405 | 501 => "MethodNotAllowed",
        409 => "ResourceConflict",
        _ => "ServerError",
    }
}

fn status_message(
    status: StatusCode,
    bucket: Option<&str>,
    object: Option<&str>,
) -> Cow<'static, str> {
    match status.as_u16() {
        404 if object.is_some() => "Object does not exist".into(),
        404 if bucket.is_some() => "Bucket does not exist".into(),
        404 => "Request resource not found".into(),
        403 => "Access denied".into(),
        400 => "Bad request".into(),
        301 => "Moved permanently".into(),
        307 => "Redirected".into(),
        405 | 501 => "Method not allowed".into(),
        409 => "Resource conflict".into(),
        _ => format!("Server failed with HTTP status code {}", status.as_u16()).into(),
    }
}

impl ClientBuilder {
    /// Credential source. Defaults to [`ChainedProvider::default_chain`].
    pub fn provider(mut self, provider: impl CredentialsProvider + 'static) -> Self {
        self.provider = Some(Arc::new(provider));
        self
    }

    /// Replaces the default [`UreqTransport`]. The retry, timeout, and user
    /// agent settings only apply to the default transport.
    pub fn transport(mut self, transport: impl Transport + 'static) -> Self {
        self.transport = Some(Arc::new(transport));
        self
    }

    /// Overall deadline for each HTTP attempt, from connect to the last body
    /// byte. Every retry starts a fresh deadline.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn max_attempts(mut self, max_attempts: u32) -> Self {
        self.retry.max_attempts = max_attempts.max(1);
        self
    }

    pub fn base_retry_delay(mut self, delay: Duration) -> Self {
        self.retry.base_delay = delay;
        self
    }

    pub fn max_retry_delay(mut self, delay: Duration) -> Self {
        self.retry.max_delay = delay;
        self
    }

    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = Some(user_agent.into());
        self
    }

    pub fn build(self) -> Client {
        let provider: DynCredentialsProvider = match self.provider {
            Some(provider) => provider,
            None => Arc::new(ChainedProvider::default_chain()),
        };
        let transport: Arc<dyn Transport> = match self.transport {
            Some(transport) => transport,
            None => Arc::new(UreqTransport::new(
                self.retry,
                self.user_agent,
                self.timeout,
            )),
        };

        Client {
            inner: Arc::new(Inner {
                endpoint: self.endpoint,
                provider,
                transport,
            }),
        }
    }
}
