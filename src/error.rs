use std::{error::Error as StdError, fmt};

use http::StatusCode;

/// Library result type.
pub type Result<T> = std::result::Result<T, Error>;

/// Coarse classification of an [`Error`].
#[non_exhaustive]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Arguments failed local validation; nothing was sent.
    InvalidArgument,
    /// Endpoint or region could not be resolved.
    Configuration,
    /// No usable credentials could be obtained.
    Credential,
    /// The request could not be signed.
    Signing,
    /// Network-level failure reported by the transport.
    Transport,
    /// The service answered with a non-success status.
    Service,
    /// A success payload could not be decoded.
    Decode,
}

/// Error type for argument validation, signing, transport, and service responses.
#[non_exhaustive]
pub enum Error {
    /// Arguments failed local validation.
    InvalidArgument { message: String },

    /// Endpoint, region, or client configuration is unusable.
    Configuration { message: String },

    /// The credentials provider could not supply usable credentials.
    Credential {
        message: String,
        source: Option<Box<dyn StdError + Send + Sync + 'static>>,
    },

    /// Request signing failed.
    Signing { message: String },

    /// Transport-level failure (connect, TLS, timeout, IO).
    Transport {
        message: String,
        source: Option<Box<dyn StdError + Send + Sync + 'static>>,
    },

    /// Service returned an error response.
    Service {
        status: StatusCode,
        code: String,
        message: String,
        resource: Option<String>,
        request_id: Option<String>,
        host_id: Option<String>,
        bucket: Option<String>,
        object: Option<String>,
        body_snippet: Option<String>,
    },

    /// Response decode or parse failure.
    Decode {
        message: String,
        source: Option<Box<dyn StdError + Send + Sync + 'static>>,
    },
}

impl fmt::Debug for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidArgument { message } => f
                .debug_struct("InvalidArgument")
                .field("message", message)
                .finish(),
            Self::Configuration { message } => f
                .debug_struct("Configuration")
                .field("message", message)
                .finish(),
            Self::Credential { message, source } => f
                .debug_struct("Credential")
                .field("message", message)
                .field("source", source)
                .finish(),
            Self::Signing { message } => {
                f.debug_struct("Signing").field("message", message).finish()
            }
            Self::Transport { message, source } => f
                .debug_struct("Transport")
                .field("message", message)
                .field("source", source)
                .finish(),
            Self::Service {
                status,
                code,
                message,
                resource,
                request_id,
                host_id,
                bucket,
                object,
                body_snippet,
            } => f
                .debug_struct("Service")
                .field("status", status)
                .field("code", code)
                .field("message", message)
                .field("resource", resource)
                .field("request_id", request_id)
                .field("host_id", host_id)
                .field("bucket", bucket)
                .field("object", object)
                .field("body_snippet", body_snippet)
                .finish(),
            Self::Decode { message, source } => f
                .debug_struct("Decode")
                .field("message", message)
                .field("source", source)
                .finish(),
        }
    }
}

fn non_empty(message: impl Into<String>, fallback: &str) -> String {
    let message = message.into();
    if message.trim().is_empty() {
        fallback.to_string()
    } else {
        message
    }
}

impl Error {
    /// Creates an invalid argument error.
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::InvalidArgument {
            message: non_empty(message, "invalid argument"),
        }
    }

    /// Creates a configuration error.
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: non_empty(message, "invalid configuration"),
        }
    }

    /// Creates a credential error without a source.
    pub fn credential(message: impl Into<String>) -> Self {
        Self::Credential {
            message: non_empty(message, "credentials unavailable"),
            source: None,
        }
    }

    /// Creates a credential error wrapping the failure that caused it.
    ///
    /// An error that is already a credential error is returned unchanged.
    pub fn credential_from(message: impl Into<String>, cause: Error) -> Self {
        if cause.kind() == ErrorKind::Credential {
            return cause;
        }
        let message = non_empty(message, "credentials unavailable");
        Self::Credential {
            message: format!("{message}: {cause}"),
            source: Some(Box::new(cause)),
        }
    }

    /// Creates a signing error.
    pub fn signing(message: impl Into<String>) -> Self {
        Self::Signing {
            message: non_empty(message, "signing failed"),
        }
    }

    /// Creates a transport error with optional source.
    pub fn transport(
        message: impl Into<String>,
        source: Option<Box<dyn StdError + Send + Sync + 'static>>,
    ) -> Self {
        Self::Transport {
            message: non_empty(message, "transport failure"),
            source,
        }
    }

    /// Creates a decode error with optional source.
    pub fn decode(
        message: impl Into<String>,
        source: Option<Box<dyn StdError + Send + Sync + 'static>>,
    ) -> Self {
        Self::Decode {
            message: non_empty(message, "decode failure"),
            source,
        }
    }

    /// Returns the error classification.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidArgument { .. } => ErrorKind::InvalidArgument,
            Self::Configuration { .. } => ErrorKind::Configuration,
            Self::Credential { .. } => ErrorKind::Credential,
            Self::Signing { .. } => ErrorKind::Signing,
            Self::Transport { .. } => ErrorKind::Transport,
            Self::Service { .. } => ErrorKind::Service,
            Self::Decode { .. } => ErrorKind::Decode,
        }
    }

    /// Returns the service error code, e.g. `NoSuchBucket`.
    pub fn code(&self) -> Option<&str> {
        match self {
            Self::Service { code, .. } => Some(code.as_str()),
            _ => None,
        }
    }

    /// Returns the human-readable message.
    pub fn message(&self) -> &str {
        match self {
            Self::InvalidArgument { message }
            | Self::Configuration { message }
            | Self::Credential { message, .. }
            | Self::Signing { message }
            | Self::Transport { message, .. }
            | Self::Service { message, .. }
            | Self::Decode { message, .. } => message.as_str(),
        }
    }

    /// Returns an HTTP status when available.
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            Self::Service { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Returns the resource the service reported the error against.
    pub fn resource(&self) -> Option<&str> {
        match self {
            Self::Service { resource, .. } => resource.as_deref(),
            _ => None,
        }
    }

    /// Returns the request id if reported by the service.
    pub fn request_id(&self) -> Option<&str> {
        match self {
            Self::Service { request_id, .. } => request_id.as_deref(),
            _ => None,
        }
    }

    /// Returns true if repeating the same call may succeed.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Service { status, .. } => {
                status.is_server_error() || *status == StatusCode::TOO_MANY_REQUESTS
            }
            Self::Transport { .. } => true,
            Self::InvalidArgument { .. }
            | Self::Configuration { .. }
            | Self::Credential { .. }
            | Self::Signing { .. }
            | Self::Decode { .. } => false,
        }
    }
}

fn format_optional_field(label: &str, value: &Option<String>) -> String {
    match value.as_deref() {
        Some(v) if !v.is_empty() => format!(" {label}={v}"),
        _ => String::new(),
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidArgument { message } => write!(f, "invalid argument: {message}"),
            Self::Configuration { message } => write!(f, "invalid configuration: {message}"),
            Self::Credential { message, .. } => write!(f, "credential error: {message}"),
            Self::Signing { message } => write!(f, "signing error: {message}"),
            Self::Transport { message, .. } => write!(f, "transport error: {message}"),
            Self::Service {
                status,
                code,
                message,
                resource,
                request_id,
                ..
            } => {
                let resource = format_optional_field("resource", resource);
                let request_id = format_optional_field("request_id", request_id);
                write!(
                    f,
                    "service error: {code}: {message} (status={}{resource}{request_id})",
                    status.as_u16()
                )
            }
            Self::Decode { message, .. } => write!(f, "decode error: {message}"),
        }
    }
}

impl StdError for Error {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        match self {
            Self::Credential { source, .. }
            | Self::Transport { source, .. }
            | Self::Decode { source, .. } => {
                source.as_deref().map(|e| e as &(dyn StdError + 'static))
            }
            Self::InvalidArgument { .. }
            | Self::Configuration { .. }
            | Self::Signing { .. }
            | Self::Service { .. } => None,
        }
    }
}
