use std::{hint::black_box, time::Duration};

use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use http::{HeaderMap, HeaderValue, Method};
use s3core::{
    AddressingStyle, Client, Credentials, Endpoint, Region, StaticProvider,
    api::PresignedObjectUrlArgs,
    signer::{self, SigningRequest},
};
use time::OffsetDateTime;

fn client(addressing: AddressingStyle) -> Client {
    let endpoint = Endpoint::builder("https://s3.example.com")
        .region("us-east-1")
        .addressing_style(addressing)
        .build()
        .expect("endpoint must be valid");

    Client::new(
        endpoint,
        StaticProvider::new("AKIDEXAMPLE", "wJalrXUtnFEMI/K7MDENG+bPxRfiCYEXAMPLEKEY"),
    )
}

fn bench_sign(c: &mut Criterion) {
    let credentials = Credentials::new("AKIDEXAMPLE", "wJalrXUtnFEMI/K7MDENG+bPxRfiCYEXAMPLEKEY")
        .expect("static credentials must be valid");
    let region = Region::new("us-east-1").expect("region must be valid");
    let now = OffsetDateTime::now_utc();

    let mut headers = HeaderMap::new();
    headers.insert("host", HeaderValue::from_static("my-bucket.s3.amazonaws.com"));
    headers.insert("range", HeaderValue::from_static("bytes=0-9"));
    let query = vec![("tagging".to_string(), String::new())];

    let mut group = c.benchmark_group("sign");
    group.measurement_time(Duration::from_secs(3));

    for size in [0usize, 4 * 1024, 1024 * 1024] {
        let body = vec![0u8; size];
        group.bench_function(BenchmarkId::new("payload", size), |b| {
            b.iter(|| {
                let payload_hash = signer::payload_hash(black_box(&body));
                let signed = signer::sign(
                    &SigningRequest {
                        method: &Method::PUT,
                        canonical_uri: "/a/b/c/object.txt",
                        query: &query,
                        headers: &headers,
                        payload_hash: &payload_hash,
                    },
                    &credentials,
                    &region,
                    now,
                )
                .expect("sign must succeed");
                black_box(signed);
            });
        });
    }

    group.finish();
}

fn bench_presign(c: &mut Criterion) {
    let client_path = client(AddressingStyle::Path);
    let client_virtual = client(AddressingStyle::VirtualHosted);

    let mut group = c.benchmark_group("presign");
    group.measurement_time(Duration::from_secs(3));

    for (label, client) in [("path", &client_path), ("virtual", &client_virtual)] {
        let args = PresignedObjectUrlArgs::new("my-bucket", "a/b/c/object.txt", Method::GET)
            .expiry(Duration::from_secs(900));
        group.bench_function(BenchmarkId::new("get", label), |b| {
            b.iter(|| {
                let response = client.presigned_object_url(black_box(&args));
                black_box(response.into_result().expect("presign must succeed"));
            });
        });
    }

    group.finish();
}

fn bench_endpoint(c: &mut Criterion) {
    let mut group = c.benchmark_group("endpoint");
    group.measurement_time(Duration::from_secs(3));

    for host in [
        "s3.eu-west-1.amazonaws.com",
        "https://account.r2.cloudflarestorage.com",
    ] {
        group.bench_function(BenchmarkId::new("resolve", host), |b| {
            b.iter(|| {
                let endpoint = Endpoint::new(black_box(host)).expect("endpoint must resolve");
                black_box(endpoint);
            });
        });
    }

    group.finish();
}

criterion_group!(benches, bench_sign, bench_presign, bench_endpoint);
criterion_main!(benches);
