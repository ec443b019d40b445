#![allow(dead_code)]

use std::{
    env,
    sync::{
        Arc, Mutex,
        atomic::{AtomicUsize, Ordering},
    },
    time::{SystemTime, UNIX_EPOCH},
};

use http::StatusCode;
use s3core::{
    Client, CredentialsProvider, Endpoint, Error, HttpRequest, HttpResponse, StaticProvider,
    Transport,
};

static BUCKET_COUNTER: AtomicUsize = AtomicUsize::new(0);

pub(crate) const ACCESS_KEY: &str = "AKIDEXAMPLE";
pub(crate) const SECRET_KEY: &str = "wJalrXUtnFEMI/K7MDENG+bPxRfiCYEXAMPLEKEY";

type Responder = fn(&HttpRequest) -> Result<HttpResponse, Error>;

/// Records every request and answers with a scripted response.
#[derive(Debug)]
pub(crate) struct FakeTransport {
    calls: AtomicUsize,
    requests: Mutex<Vec<HttpRequest>>,
    respond: Responder,
}

impl FakeTransport {
    pub(crate) fn new(respond: Responder) -> Arc<Self> {
        Arc::new(Self {
            calls: AtomicUsize::new(0),
            requests: Mutex::new(Vec::new()),
            respond,
        })
    }

    pub(crate) fn with_status(status: StatusCode) -> Arc<Self> {
        match status.as_u16() {
            200 => Self::new(|_| Ok(HttpResponse::new(StatusCode::OK))),
            204 => Self::new(|_| Ok(HttpResponse::new(StatusCode::NO_CONTENT))),
            404 => Self::new(|_| Ok(HttpResponse::new(StatusCode::NOT_FOUND))),
            other => panic!("no canned response for {other}"),
        }
    }

    pub(crate) fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub(crate) fn requests(&self) -> Vec<HttpRequest> {
        self.requests.lock().unwrap().clone()
    }
}

impl Transport for FakeTransport {
    fn send(&self, request: HttpRequest) -> Result<HttpResponse, Error> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let response = (self.respond)(&request);
        self.requests.lock().unwrap().push(request);
        response
    }
}

pub(crate) fn local_endpoint() -> Endpoint {
    Endpoint::builder("http://localhost:9000")
        .region("us-east-1")
        .build()
        .unwrap()
}

pub(crate) fn client_with(
    transport: &Arc<FakeTransport>,
    provider: impl CredentialsProvider + 'static,
) -> Client {
    Client::builder(local_endpoint())
        .provider(provider)
        .transport(Arc::clone(transport))
        .build()
}

pub(crate) fn static_client(transport: &Arc<FakeTransport>) -> Client {
    client_with(transport, StaticProvider::new(ACCESS_KEY, SECRET_KEY))
}

/// Live server settings from `S3_TEST_ENDPOINT` and `S3_TEST_REGION`.
pub(crate) struct LiveConfig {
    pub(crate) endpoint: Endpoint,
}

pub(crate) fn load_live_config() -> Result<Option<LiveConfig>, Error> {
    let Ok(endpoint) = env::var("S3_TEST_ENDPOINT") else {
        return Ok(None);
    };
    let region = env::var("S3_TEST_REGION").unwrap_or_else(|_| "us-east-1".to_string());

    Ok(Some(LiveConfig {
        endpoint: Endpoint::builder(endpoint).region(region).build()?,
    }))
}

pub(crate) fn unique_bucket(prefix: &str) -> String {
    let now = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis();
    let n = BUCKET_COUNTER.fetch_add(1, Ordering::Relaxed);
    format!("{prefix}{now}-{n}")
}
