mod common;

use std::thread;

use http::{HeaderMap, StatusCode};
use s3core::{
    Credentials, Region,
    api::{DeleteBucketTagsArgs, PutObjectArgs},
    signer::{self, SigningRequest},
};
use time::PrimitiveDateTime;

use common::{ACCESS_KEY, FakeTransport, SECRET_KEY, static_client};

/// Headers the client added for signing, minus the signature itself.
fn signed_input(request: &s3core::HttpRequest) -> HeaderMap {
    let mut headers = HeaderMap::new();
    for (name, value) in &request.headers {
        let keep = match name.as_str() {
            "x-amz-date" | "x-amz-content-sha256" | "authorization" => false,
            "host" | "content-type" | "content-md5" => true,
            other => other.starts_with("x-amz-"),
        };
        if keep {
            headers.append(name.clone(), value.clone());
        }
    }
    headers
}

#[test]
fn shared_client_signs_every_request_correctly() {
    let transport = FakeTransport::with_status(StatusCode::OK);
    let client = static_client(&transport);

    let handles = (0..8)
        .map(|i| {
            let client = client.clone();
            thread::spawn(move || {
                for j in 0..10 {
                    let response = if j % 2 == 0 {
                        client
                            .delete_bucket_tags(&DeleteBucketTagsArgs::new(format!("bucket-{i}")))
                            .is_success()
                    } else {
                        client
                            .put_object(&PutObjectArgs::new(
                                format!("bucket-{i}"),
                                format!("key-{j}"),
                                format!("payload {i} {j}"),
                            ))
                            .is_success()
                    };
                    assert!(response);
                }
            })
        })
        .collect::<Vec<_>>();
    for handle in handles {
        handle.join().unwrap();
    }

    let requests = transport.requests();
    assert_eq!(requests.len(), 80);

    let credentials = Credentials::new(ACCESS_KEY, SECRET_KEY).unwrap();
    let region = Region::new("us-east-1").unwrap();
    let amz_date =
        time::format_description::parse("[year][month][day]T[hour][minute][second]Z").unwrap();
    for request in &requests {
        let date = request.headers.get("x-amz-date").unwrap().to_str().unwrap();
        let now = PrimitiveDateTime::parse(date, &amz_date).unwrap().assume_utc();

        let query = request
            .url
            .query_pairs()
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect::<Vec<_>>();
        let payload_hash = signer::payload_hash(&request.body);
        let expected = signer::sign(
            &SigningRequest {
                method: &request.method,
                canonical_uri: request.url.path(),
                query: &query,
                headers: &signed_input(request),
                payload_hash: &payload_hash,
            },
            &credentials,
            &region,
            now,
        )
        .unwrap();

        assert_eq!(
            request.headers.get("authorization"),
            expected.get("authorization"),
            "{}",
            request.url
        );
    }
}
