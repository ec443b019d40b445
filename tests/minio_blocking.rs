//! Runs against a real server when `S3_TEST_ENDPOINT` is set, using
//! credentials from the default provider chain.

mod common;

use s3core::{
    Client, Error,
    api::{
        BucketExistsArgs, DeleteBucketTagsArgs, GetBucketTagsArgs, GetObjectArgs,
        GetObjectTagsArgs, ListObjectsArgs, MakeBucketArgs, PutObjectArgs, RemoveBucketArgs,
        RemoveObjectArgs, SetBucketTagsArgs, SetObjectTagsArgs, StatObjectArgs,
    },
    types::TagSet,
};

use common::{load_live_config, unique_bucket};

fn with_bucket<F>(client: &Client, f: F) -> Result<(), Error>
where
    F: FnOnce(&str) -> Result<(), Error>,
{
    let bucket = unique_bucket("s3core-it-");
    client.make_bucket(&MakeBucketArgs::new(&bucket)).into_result()?;

    let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| f(&bucket)));
    let cleanup = cleanup(client, &bucket);

    match result {
        Ok(Ok(())) => cleanup,
        Ok(Err(err)) => Err(err),
        Err(panic) => std::panic::resume_unwind(panic),
    }
}

fn cleanup(client: &Client, bucket: &str) -> Result<(), Error> {
    let listing = client
        .list_objects(&ListObjectsArgs::new(bucket))
        .into_result()?;
    for object in listing.contents {
        client
            .remove_object(&RemoveObjectArgs::new(bucket, object.key))
            .into_result()?;
    }
    client
        .remove_bucket(&RemoveBucketArgs::new(bucket))
        .into_result()
        .map(|_| ())
}

#[test]
fn minio_bucket_tags_roundtrip() -> Result<(), Error> {
    let Some(cfg) = load_live_config()? else {
        return Ok(());
    };
    let client = Client::builder(cfg.endpoint).build();

    with_bucket(&client, |bucket| {
        let exists = client
            .bucket_exists(&BucketExistsArgs::new(bucket))
            .into_result()?;
        assert!(exists.exists);

        let tags = TagSet::new().with("Project", "Project One").with("User", "jsmith");
        client
            .set_bucket_tags(&SetBucketTagsArgs::new(bucket, tags.clone()))
            .into_result()?;
        let got = client
            .get_bucket_tags(&GetBucketTagsArgs::new(bucket))
            .into_result()?;
        assert_eq!(got.tags.get("User"), Some("jsmith"));

        let response = client.delete_bucket_tags(&DeleteBucketTagsArgs::new(bucket));
        assert!(response.is_success(), "{:?}", response.error());

        let got = client
            .get_bucket_tags(&GetBucketTagsArgs::new(bucket))
            .into_result()?;
        assert!(got.tags.is_empty());
        Ok(())
    })
}

#[test]
fn minio_object_roundtrip() -> Result<(), Error> {
    let Some(cfg) = load_live_config()? else {
        return Ok(());
    };
    let client = Client::builder(cfg.endpoint).build();

    with_bucket(&client, |bucket| {
        let key = "dir/hello world.txt";
        client
            .put_object(
                &PutObjectArgs::new(bucket, key, "hello")
                    .content_type("text/plain")
                    .metadata("owner", "alice"),
            )
            .into_result()?;

        let stat = client
            .stat_object(&StatObjectArgs::new(bucket, key))
            .into_result()?;
        assert_eq!(stat.size, Some(5));
        assert_eq!(
            stat.user_metadata,
            vec![("owner".to_string(), "alice".to_string())]
        );

        let part = client
            .get_object(&GetObjectArgs::new(bucket, key).range(1, Some(3)))
            .into_result()?;
        assert_eq!(&part.body[..], b"ell");

        client
            .set_object_tags(&SetObjectTagsArgs::new(
                bucket,
                key,
                TagSet::new().with("env", "test"),
            ))
            .into_result()?;
        let tags = client
            .get_object_tags(&GetObjectTagsArgs::new(bucket, key))
            .into_result()?;
        assert_eq!(tags.tags.get("env"), Some("test"));

        let listing = client
            .list_objects(&ListObjectsArgs::new(bucket).prefix("dir/"))
            .into_result()?;
        assert_eq!(listing.contents.len(), 1);
        assert_eq!(listing.contents[0].key, key);
        Ok(())
    })
}
