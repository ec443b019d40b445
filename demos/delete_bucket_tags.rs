//! Removes every tag from a bucket.
//!
//! ```text
//! MINIO_ACCESS_KEY=... MINIO_SECRET_KEY=... \
//!     cargo run --example delete_bucket_tags -- play.min.io my-bucket
//! ```
//!
//! Credentials come from the default provider chain: AWS variables, MinIO
//! variables, then the shared AWS profile.

use std::{env, process::ExitCode};

use s3core::{Client, Endpoint, api::DeleteBucketTagsArgs};

fn main() -> ExitCode {
    let mut args = env::args().skip(1);
    let host = args.next().unwrap_or_else(|| "play.min.io".to_string());
    let bucket = args.next().unwrap_or_else(|| "my-bucket".to_string());
    let region = env::var("S3_REGION").unwrap_or_else(|_| "us-east-1".to_string());

    let endpoint = match Endpoint::builder(&host).region(region).build() {
        Ok(endpoint) => endpoint,
        Err(err) => {
            eprintln!("invalid endpoint {host}: {err}");
            return ExitCode::FAILURE;
        }
    };
    let client = Client::builder(endpoint).build();

    let response = client.delete_bucket_tags(&DeleteBucketTagsArgs::new(bucket.as_str()));
    match response.error() {
        None => {
            println!("bucket tags of {bucket} is deleted successfully");
            ExitCode::SUCCESS
        }
        Some(err) => {
            eprintln!("unable to delete bucket tags; {err}");
            ExitCode::FAILURE
        }
    }
}
