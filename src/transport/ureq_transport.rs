use std::time::Duration;

#[cfg(feature = "metrics")]
use std::time::Instant;

use bytes::Bytes;
use http::{HeaderMap, Method, StatusCode};
use url::Url;

use crate::{
    error::{Error, Result},
    transport::{HttpRequest, HttpResponse, RetryConfig, Transport, backoff_delay},
};

#[cfg(feature = "rustls")]
fn install_crypto_provider() {
    static INSTALLED: std::sync::Once = std::sync::Once::new();
    INSTALLED.call_once(|| {
        if rustls::crypto::CryptoProvider::get_default().is_none() {
            // Another thread may have installed one in the meantime.
            let _ = rustls::crypto::ring::default_provider().install_default();
        }
    });
}

/// Blocking [`Transport`] on a pooled `ureq` agent.
///
/// Retries 429, 5xx, and connection-level failures with capped, jittered
/// exponential backoff. Every attempt carries the same signed headers.
pub struct UreqTransport {
    agent: ureq::Agent,
    retry: RetryConfig,
    timeout: Option<Duration>,
    user_agent: String,
}

impl UreqTransport {
    pub fn new(
        retry: RetryConfig,
        user_agent: Option<String>,
        timeout: Option<Duration>,
    ) -> Self {
        #[cfg(feature = "rustls")]
        install_crypto_provider();

        let config = ureq::Agent::config_builder()
            .http_status_as_error(false)
            .build();

        Self {
            agent: ureq::Agent::new_with_config(config),
            retry: RetryConfig {
                max_attempts: retry.max_attempts.max(1),
                ..retry
            },
            timeout,
            user_agent: user_agent.unwrap_or_else(default_user_agent),
        }
    }

    fn call_once(
        &self,
        request: &HttpRequest,
    ) -> std::result::Result<ureq::http::Response<ureq::Body>, CallError> {
        let url = request.url.as_str();
        let headers = &request.headers;
        let body = request.body.as_ref();

        let result = match request.method.as_str() {
            "GET" => {
                ensure_empty_body(body)?;
                self.prepare(self.agent.get(url), headers)?.call()
            }
            "HEAD" => {
                ensure_empty_body(body)?;
                self.prepare(self.agent.head(url), headers)?.call()
            }
            "DELETE" => {
                ensure_empty_body(body)?;
                self.prepare(self.agent.delete(url), headers)?.call()
            }
            "PUT" => {
                let req = self.prepare(self.agent.put(url), headers)?;
                if body.is_empty() {
                    req.send_empty()
                } else {
                    req.send(body)
                }
            }
            "POST" => {
                let req = self.prepare(self.agent.post(url), headers)?;
                if body.is_empty() {
                    req.send_empty()
                } else {
                    req.send(body)
                }
            }
            other => {
                return Err(CallError::Fatal(Error::invalid_argument(format!(
                    "unsupported HTTP method {other}"
                ))));
            }
        };

        result.map_err(CallError::Http)
    }

    fn prepare<B>(
        &self,
        mut req: ureq::RequestBuilder<B>,
        headers: &HeaderMap,
    ) -> std::result::Result<ureq::RequestBuilder<B>, CallError> {
        req = req.header(http::header::USER_AGENT, self.user_agent.as_str());
        for (name, value) in headers {
            let value = value.to_str().map_err(|_| {
                Error::invalid_argument(format!("header {name} is not valid text"))
            })?;
            req = req.header(name.as_str(), value);
        }

        if let Some(timeout) = self.timeout {
            req = req.config().timeout_global(Some(timeout)).build();
        }

        Ok(req)
    }
}

enum CallError {
    Http(ureq::Error),
    Fatal(Error),
}

impl From<Error> for CallError {
    fn from(err: Error) -> Self {
        Self::Fatal(err)
    }
}

impl Transport for UreqTransport {
    fn send(&self, request: HttpRequest) -> Result<HttpResponse> {
        let max_attempts = self.retry.max_attempts;
        let method = &request.method;

        for attempt in 1..=max_attempts {
            #[cfg(feature = "metrics")]
            metrics::counter!("s3_http_attempts_total", "method" => method_label(method))
                .increment(1);
            #[cfg(feature = "tracing")]
            let _guard = tracing::debug_span!(
                "s3.http",
                method = %method,
                host = request.url.host_str().unwrap_or(""),
                path = request.url.path(),
                attempt,
            )
            .entered();
            #[cfg(feature = "metrics")]
            let start = Instant::now();

            let resp = match self.call_once(&request) {
                Ok(resp) => resp,
                Err(CallError::Fatal(err)) => return Err(err),
                Err(CallError::Http(err)) => {
                    if attempt < max_attempts && should_retry_error(&err) {
                        #[cfg(feature = "metrics")]
                        metrics::counter!(
                            "s3_http_retries_total",
                            "method" => method_label(method),
                            "reason" => "transport"
                        )
                        .increment(1);
                        #[cfg(feature = "tracing")]
                        tracing::debug!(error = %err, "retrying after transport error");

                        std::thread::sleep(backoff_delay(self.retry, attempt));
                        continue;
                    }

                    #[cfg(feature = "metrics")]
                    metrics::counter!(
                        "s3_http_errors_total",
                        "method" => method_label(method),
                        "kind" => "transport"
                    )
                    .increment(1);

                    return Err(Error::transport(
                        format!("request failed: {}", request_context(method, &request.url)),
                        Some(Box::new(err)),
                    ));
                }
            };

            #[cfg(feature = "metrics")]
            {
                metrics::counter!(
                    "s3_http_responses_total",
                    "method" => method_label(method),
                    "class" => status_class(resp.status()),
                )
                .increment(1);
                metrics::histogram!(
                    "s3_http_request_duration_seconds",
                    "method" => method_label(method),
                )
                .record(start.elapsed().as_secs_f64());
            }

            if should_retry_status(resp.status()) && attempt < max_attempts {
                #[cfg(feature = "metrics")]
                metrics::counter!(
                    "s3_http_retries_total",
                    "method" => method_label(method),
                    "reason" => "status"
                )
                .increment(1);
                #[cfg(feature = "tracing")]
                tracing::debug!(status = %resp.status(), "retrying after response status");

                let delay = retry_delay(self.retry, attempt, resp.status(), resp.headers());
                std::thread::sleep(delay);
                continue;
            }

            return buffer_response(resp, method, &request.url);
        }

        Err(Error::transport(
            format!(
                "request failed after retries: {}",
                request_context(method, &request.url)
            ),
            None,
        ))
    }
}

impl std::fmt::Debug for UreqTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UreqTransport")
            .field("retry", &self.retry)
            .field("timeout", &self.timeout)
            .field("user_agent", &self.user_agent)
            .finish_non_exhaustive()
    }
}

fn buffer_response(
    resp: ureq::http::Response<ureq::Body>,
    method: &Method,
    url: &Url,
) -> Result<HttpResponse> {
    let (parts, mut body) = resp.into_parts();
    let bytes = body
        .with_config()
        .limit(u64::MAX)
        .read_to_vec()
        .map_err(|e| {
            Error::transport(
                format!("failed to read response body: {}", request_context(method, url)),
                Some(Box::new(e)),
            )
        })?;

    Ok(HttpResponse {
        status: parts.status,
        headers: parts.headers,
        body: Bytes::from(bytes),
    })
}

fn retry_delay(
    config: RetryConfig,
    attempt: u32,
    status: StatusCode,
    headers: &HeaderMap,
) -> Duration {
    if status == StatusCode::TOO_MANY_REQUESTS
        && let Some(retry_after) =
            crate::util::headers::header_u64(headers, http::header::RETRY_AFTER)
    {
        return Duration::from_secs(retry_after).min(config.max_delay);
    }
    backoff_delay(config, attempt)
}

fn should_retry_status(status: StatusCode) -> bool {
    status == StatusCode::TOO_MANY_REQUESTS || status.is_server_error()
}

fn should_retry_error(err: &ureq::Error) -> bool {
    matches!(
        err,
        ureq::Error::Timeout(_)
            | ureq::Error::Protocol(_)
            | ureq::Error::Io(_)
            | ureq::Error::HostNotFound
            | ureq::Error::ConnectionFailed
    )
}

fn request_context(method: &Method, url: &Url) -> String {
    match (url.host_str(), url.port()) {
        (Some(host), Some(port)) => format!("{method} {host}:{port}{}", url.path()),
        (Some(host), None) => format!("{method} {host}{}", url.path()),
        (None, _) => format!("{method} {}", url.path()),
    }
}

fn ensure_empty_body(body: &[u8]) -> Result<()> {
    if body.is_empty() {
        Ok(())
    } else {
        Err(Error::invalid_argument(
            "this HTTP method does not accept a request body",
        ))
    }
}

#[cfg(feature = "metrics")]
fn status_class(status: StatusCode) -> &'static str {
    if status.is_informational() {
        "1xx"
    } else if status.is_success() {
        "2xx"
    } else if status.is_redirection() {
        "3xx"
    } else if status.is_client_error() {
        "4xx"
    } else if status.is_server_error() {
        "5xx"
    } else {
        "other"
    }
}

#[cfg(feature = "metrics")]
fn method_label(method: &Method) -> &'static str {
    match method.as_str() {
        "GET" => "GET",
        "PUT" => "PUT",
        "HEAD" => "HEAD",
        "DELETE" => "DELETE",
        "POST" => "POST",
        _ => "OTHER",
    }
}

fn default_user_agent() -> String {
    format!("s3core/{}", env!("CARGO_PKG_VERSION"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::{
        io::{ErrorKind, Read, Write},
        net::TcpListener,
        sync::{
            Arc,
            atomic::{AtomicUsize, Ordering},
        },
        time::Instant,
    };

    /// Answers each accepted connection with the next canned response.
    fn serve(
        responses: Vec<&'static [u8]>,
    ) -> (Url, Arc<AtomicUsize>, std::thread::JoinHandle<()>) {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        listener.set_nonblocking(true).unwrap();
        let addr = listener.local_addr().unwrap();
        let accepted = Arc::new(AtomicUsize::new(0));
        let counter = accepted.clone();

        let handle = std::thread::spawn(move || {
            let deadline = Instant::now() + Duration::from_secs(5);
            let mut remaining = responses.into_iter();
            while Instant::now() < deadline {
                match listener.accept() {
                    Ok((mut stream, _)) => {
                        counter.fetch_add(1, Ordering::SeqCst);
                        let _ = stream.set_nonblocking(false);
                        let _ = stream.set_read_timeout(Some(Duration::from_secs(1)));
                        let mut request = Vec::new();
                        let mut buf = [0u8; 1024];
                        while !request.windows(4).any(|w| w == b"\r\n\r\n") {
                            match stream.read(&mut buf) {
                                Ok(0) | Err(_) => break,
                                Ok(n) => request.extend_from_slice(&buf[..n]),
                            }
                        }
                        let Some(response) = remaining.next() else {
                            break;
                        };
                        let _ = stream.write_all(response);
                        let _ = stream.flush();
                        if remaining.len() == 0 {
                            break;
                        }
                    }
                    Err(err) if err.kind() == ErrorKind::WouldBlock => {
                        std::thread::sleep(Duration::from_millis(10));
                    }
                    Err(_) => break,
                }
            }
        });

        let url = Url::parse(&format!("http://{addr}/my-bucket?tagging=")).unwrap();
        (url, accepted, handle)
    }

    fn request(url: Url) -> HttpRequest {
        HttpRequest {
            method: Method::DELETE,
            url,
            headers: HeaderMap::new(),
            body: Bytes::new(),
        }
    }

    fn fast_retry(max_attempts: u32) -> RetryConfig {
        RetryConfig {
            max_attempts,
            base_delay: Duration::from_millis(1),
            max_delay: Duration::from_millis(5),
        }
    }

    #[test]
    fn http_error_status_is_a_response_not_an_error() {
        let (url, _, handle) = serve(vec![
            b"HTTP/1.1 404 Not Found\r\nContent-Length: 5\r\nConnection: close\r\n\r\nnope!",
        ]);
        let transport = UreqTransport::new(fast_retry(1), None, Some(Duration::from_secs(5)));

        let resp = transport.send(request(url)).unwrap();
        handle.join().unwrap();
        assert_eq!(resp.status, StatusCode::NOT_FOUND);
        assert_eq!(resp.body, Bytes::from_static(b"nope!"));
    }

    #[test]
    fn retries_server_errors() {
        let (url, accepted, handle) = serve(vec![
            b"HTTP/1.1 503 Service Unavailable\r\nContent-Length: 0\r\nConnection: close\r\n\r\n",
            b"HTTP/1.1 204 No Content\r\nConnection: close\r\n\r\n",
        ]);
        let transport = UreqTransport::new(fast_retry(3), None, Some(Duration::from_secs(5)));

        let resp = transport.send(request(url)).unwrap();
        handle.join().unwrap();
        assert_eq!(resp.status, StatusCode::NO_CONTENT);
        assert_eq!(accepted.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn refused_connection_is_a_transport_error() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let transport = UreqTransport::new(fast_retry(1), None, Some(Duration::from_secs(2)));
        let url = Url::parse(&format!("http://{addr}/")).unwrap();
        let err = transport.send(request(url)).unwrap_err();
        assert_eq!(err.kind(), crate::ErrorKind::Transport);
    }

    #[test]
    fn get_with_body_is_rejected_locally() {
        let transport = UreqTransport::new(fast_retry(1), None, None);
        let mut req = request(Url::parse("http://127.0.0.1:9/").unwrap());
        req.method = Method::GET;
        req.body = Bytes::from_static(b"x");
        let err = transport.send(req).unwrap_err();
        assert_eq!(err.kind(), crate::ErrorKind::InvalidArgument);
    }

    #[test]
    fn non_text_header_is_rejected_not_dropped() {
        let transport = UreqTransport::new(fast_retry(3), None, None);
        let mut req = request(Url::parse("http://127.0.0.1:9/").unwrap());
        req.headers.insert(
            "x-amz-meta-name",
            http::HeaderValue::from_bytes(b"caf\xc3\xa9").unwrap(),
        );
        let err = transport.send(req).unwrap_err();
        assert_eq!(err.kind(), crate::ErrorKind::InvalidArgument);
        assert!(err.to_string().contains("x-amz-meta-name"));
    }

    #[test]
    fn retry_after_is_capped() {
        let mut headers = HeaderMap::new();
        headers.insert(http::header::RETRY_AFTER, http::HeaderValue::from_static("30"));
        let delay = retry_delay(fast_retry(3), 1, StatusCode::TOO_MANY_REQUESTS, &headers);
        assert_eq!(delay, Duration::from_millis(5));
    }
}
