//! Bucket operations.

use http::{HeaderMap, HeaderValue, Method, StatusCode};

use super::{OperationRequest, Response, sealed, validate};
use crate::{
    client::Client,
    endpoint::Endpoint,
    error::{Error, Result},
    transport::HttpResponse,
    types::{
        BucketExistsOutput, BucketVersioning, DeleteBucketTagsOutput, GetBucketTagsOutput,
        ListBucketsOutput, MakeBucketOutput, RemoveBucketOutput, SetBucketTagsOutput,
        SetBucketVersioningOutput, TagSet,
    },
    util::{headers::header_string, xml},
};

const DEFAULT_REGION: &str = "us-east-1";

pub type ListBucketsResponse = Response<ListBucketsOutput>;
pub type BucketExistsResponse = Response<BucketExistsOutput>;
pub type MakeBucketResponse = Response<MakeBucketOutput>;
pub type RemoveBucketResponse = Response<RemoveBucketOutput>;
pub type GetBucketTagsResponse = Response<GetBucketTagsOutput>;
pub type SetBucketTagsResponse = Response<SetBucketTagsOutput>;
pub type DeleteBucketTagsResponse = Response<DeleteBucketTagsOutput>;
pub type GetBucketVersioningResponse = Response<BucketVersioning>;
pub type SetBucketVersioningResponse = Response<SetBucketVersioningOutput>;

fn bucket_request(
    method: Method,
    bucket: &str,
    extra_headers: &HeaderMap,
    extra_query_params: &[(String, String)],
) -> OperationRequest {
    OperationRequest::new(method, Some(bucket), None, extra_headers, extra_query_params)
}

/// Recovers `404 NoSuchTagSet`, which the service returns for an untagged
/// resource.
pub(super) fn recover_missing_tags(error: Error) -> Result<TagSet> {
    if error.status() == Some(StatusCode::NOT_FOUND) && error.code() == Some("NoSuchTagSet") {
        return Ok(TagSet::new());
    }
    Err(error)
}

/// Lists all buckets owned by the caller.
#[derive(Clone, Debug, Default)]
pub struct ListBucketsArgs {
    pub extra_headers: HeaderMap,
    pub extra_query_params: Vec<(String, String)>,
}

impl ListBucketsArgs {
    pub fn new() -> Self {
        Self::default()
    }
}

impl sealed::Sealed for ListBucketsArgs {}

impl super::Operation for ListBucketsArgs {
    type Output = ListBucketsOutput;
    const NAME: &'static str = "list_buckets";

    fn validate(&self) -> Result<()> {
        Ok(())
    }

    fn request(&self, _endpoint: &Endpoint) -> Result<OperationRequest> {
        Ok(OperationRequest::new(
            Method::GET,
            None,
            None,
            &self.extra_headers,
            &self.extra_query_params,
        ))
    }

    fn parse(&self, response: HttpResponse) -> Result<Self::Output> {
        xml::parse_list_buckets(&response.body)
    }
}

/// Checks whether a bucket exists and is reachable with the current credentials.
#[derive(Clone, Debug, Default)]
pub struct BucketExistsArgs {
    pub bucket: String,
    pub extra_headers: HeaderMap,
    pub extra_query_params: Vec<(String, String)>,
}

impl BucketExistsArgs {
    pub fn new(bucket: impl Into<String>) -> Self {
        Self {
            bucket: bucket.into(),
            ..Self::default()
        }
    }
}

impl sealed::Sealed for BucketExistsArgs {}

impl super::Operation for BucketExistsArgs {
    type Output = BucketExistsOutput;
    const NAME: &'static str = "bucket_exists";

    fn validate(&self) -> Result<()> {
        validate::bucket_name(&self.bucket)
    }

    fn request(&self, _endpoint: &Endpoint) -> Result<OperationRequest> {
        Ok(bucket_request(
            Method::HEAD,
            &self.bucket,
            &self.extra_headers,
            &self.extra_query_params,
        ))
    }

    fn parse(&self, response: HttpResponse) -> Result<Self::Output> {
        Ok(BucketExistsOutput {
            bucket: self.bucket.clone(),
            exists: true,
            region: header_string(&response.headers, "x-amz-bucket-region"),
        })
    }

    fn recover(&self, error: Error) -> Result<Self::Output> {
        if error.status() == Some(StatusCode::NOT_FOUND) {
            return Ok(BucketExistsOutput {
                bucket: self.bucket.clone(),
                exists: false,
                region: None,
            });
        }
        Err(error)
    }
}

/// Creates a bucket.
#[derive(Clone, Debug, Default)]
pub struct MakeBucketArgs {
    pub bucket: String,
    /// Location constraint. Defaults to the endpoint region and must match it
    /// when given.
    pub region: Option<String>,
    pub object_lock: bool,
    pub extra_headers: HeaderMap,
    pub extra_query_params: Vec<(String, String)>,
}

impl MakeBucketArgs {
    pub fn new(bucket: impl Into<String>) -> Self {
        Self {
            bucket: bucket.into(),
            ..Self::default()
        }
    }

    pub fn region(mut self, region: impl Into<String>) -> Self {
        self.region = Some(region.into());
        self
    }

    pub fn object_lock(mut self, enabled: bool) -> Self {
        self.object_lock = enabled;
        self
    }
}

impl sealed::Sealed for MakeBucketArgs {}

impl super::Operation for MakeBucketArgs {
    type Output = MakeBucketOutput;
    const NAME: &'static str = "make_bucket";

    fn validate(&self) -> Result<()> {
        validate::bucket_name(&self.bucket)?;
        if let Some(region) = &self.region
            && region.trim().is_empty()
        {
            return Err(Error::invalid_argument("region must not be empty"));
        }
        Ok(())
    }

    fn request(&self, endpoint: &Endpoint) -> Result<OperationRequest> {
        let endpoint_region = endpoint.region().as_str();
        let region = match self.region.as_deref() {
            Some(region) if region != endpoint_region => {
                return Err(Error::invalid_argument(format!(
                    "region {region:?} does not match endpoint region {endpoint_region:?}"
                )));
            }
            Some(region) => region,
            None => endpoint_region,
        };

        let mut request = bucket_request(
            Method::PUT,
            &self.bucket,
            &self.extra_headers,
            &self.extra_query_params,
        );
        if self.object_lock {
            request = request.header(
                "x-amz-bucket-object-lock-enabled",
                HeaderValue::from_static("true"),
            );
        }
        if region != DEFAULT_REGION {
            request = request.xml_body(xml::encode_create_bucket_configuration(region)?)?;
        }
        Ok(request)
    }

    fn parse(&self, response: HttpResponse) -> Result<Self::Output> {
        Ok(MakeBucketOutput {
            bucket: self.bucket.clone(),
            location: header_string(&response.headers, http::header::LOCATION),
        })
    }
}

/// Deletes an empty bucket.
#[derive(Clone, Debug, Default)]
pub struct RemoveBucketArgs {
    pub bucket: String,
    pub extra_headers: HeaderMap,
    pub extra_query_params: Vec<(String, String)>,
}

impl RemoveBucketArgs {
    pub fn new(bucket: impl Into<String>) -> Self {
        Self {
            bucket: bucket.into(),
            ..Self::default()
        }
    }
}

impl sealed::Sealed for RemoveBucketArgs {}

impl super::Operation for RemoveBucketArgs {
    type Output = RemoveBucketOutput;
    const NAME: &'static str = "remove_bucket";

    fn validate(&self) -> Result<()> {
        validate::bucket_name(&self.bucket)
    }

    fn request(&self, _endpoint: &Endpoint) -> Result<OperationRequest> {
        Ok(bucket_request(
            Method::DELETE,
            &self.bucket,
            &self.extra_headers,
            &self.extra_query_params,
        ))
    }

    fn parse(&self, _response: HttpResponse) -> Result<Self::Output> {
        Ok(RemoveBucketOutput {
            bucket: self.bucket.clone(),
        })
    }
}

/// Reads the tag set of a bucket.
#[derive(Clone, Debug, Default)]
pub struct GetBucketTagsArgs {
    pub bucket: String,
    pub extra_headers: HeaderMap,
    pub extra_query_params: Vec<(String, String)>,
}

impl GetBucketTagsArgs {
    pub fn new(bucket: impl Into<String>) -> Self {
        Self {
            bucket: bucket.into(),
            ..Self::default()
        }
    }
}

impl sealed::Sealed for GetBucketTagsArgs {}

impl super::Operation for GetBucketTagsArgs {
    type Output = GetBucketTagsOutput;
    const NAME: &'static str = "get_bucket_tags";

    fn validate(&self) -> Result<()> {
        validate::bucket_name(&self.bucket)
    }

    fn request(&self, _endpoint: &Endpoint) -> Result<OperationRequest> {
        Ok(bucket_request(
            Method::GET,
            &self.bucket,
            &self.extra_headers,
            &self.extra_query_params,
        )
        .query("tagging", ""))
    }

    fn parse(&self, response: HttpResponse) -> Result<Self::Output> {
        Ok(GetBucketTagsOutput {
            bucket: self.bucket.clone(),
            tags: xml::parse_tagging(&response.body)?,
        })
    }

    fn recover(&self, error: Error) -> Result<Self::Output> {
        Ok(GetBucketTagsOutput {
            bucket: self.bucket.clone(),
            tags: recover_missing_tags(error)?,
        })
    }
}

/// Replaces the tag set of a bucket.
#[derive(Clone, Debug, Default)]
pub struct SetBucketTagsArgs {
    pub bucket: String,
    pub tags: TagSet,
    pub extra_headers: HeaderMap,
    pub extra_query_params: Vec<(String, String)>,
}

impl SetBucketTagsArgs {
    pub fn new(bucket: impl Into<String>, tags: TagSet) -> Self {
        Self {
            bucket: bucket.into(),
            tags,
            ..Self::default()
        }
    }
}

impl sealed::Sealed for SetBucketTagsArgs {}

impl super::Operation for SetBucketTagsArgs {
    type Output = SetBucketTagsOutput;
    const NAME: &'static str = "set_bucket_tags";

    fn validate(&self) -> Result<()> {
        validate::bucket_name(&self.bucket)?;
        validate::tags(&self.tags, validate::MAX_BUCKET_TAGS)
    }

    fn request(&self, _endpoint: &Endpoint) -> Result<OperationRequest> {
        bucket_request(
            Method::PUT,
            &self.bucket,
            &self.extra_headers,
            &self.extra_query_params,
        )
        .query("tagging", "")
        .xml_body(xml::encode_tagging(&self.tags)?)
    }

    fn parse(&self, _response: HttpResponse) -> Result<Self::Output> {
        Ok(SetBucketTagsOutput {
            bucket: self.bucket.clone(),
        })
    }
}

/// Removes every tag from a bucket.
#[derive(Clone, Debug, Default)]
pub struct DeleteBucketTagsArgs {
    pub bucket: String,
    pub extra_headers: HeaderMap,
    pub extra_query_params: Vec<(String, String)>,
}

impl DeleteBucketTagsArgs {
    pub fn new(bucket: impl Into<String>) -> Self {
        Self {
            bucket: bucket.into(),
            ..Self::default()
        }
    }
}

impl sealed::Sealed for DeleteBucketTagsArgs {}

impl super::Operation for DeleteBucketTagsArgs {
    type Output = DeleteBucketTagsOutput;
    const NAME: &'static str = "delete_bucket_tags";

    fn validate(&self) -> Result<()> {
        validate::bucket_name(&self.bucket)
    }

    fn request(&self, _endpoint: &Endpoint) -> Result<OperationRequest> {
        Ok(bucket_request(
            Method::DELETE,
            &self.bucket,
            &self.extra_headers,
            &self.extra_query_params,
        )
        .query("tagging", ""))
    }

    fn parse(&self, _response: HttpResponse) -> Result<Self::Output> {
        Ok(DeleteBucketTagsOutput {
            bucket: self.bucket.clone(),
        })
    }
}

#[derive(Clone, Debug, Default)]
pub struct GetBucketVersioningArgs {
    pub bucket: String,
    pub extra_headers: HeaderMap,
    pub extra_query_params: Vec<(String, String)>,
}

impl GetBucketVersioningArgs {
    pub fn new(bucket: impl Into<String>) -> Self {
        Self {
            bucket: bucket.into(),
            ..Self::default()
        }
    }
}

impl sealed::Sealed for GetBucketVersioningArgs {}

impl super::Operation for GetBucketVersioningArgs {
    type Output = BucketVersioning;
    const NAME: &'static str = "get_bucket_versioning";

    fn validate(&self) -> Result<()> {
        validate::bucket_name(&self.bucket)
    }

    fn request(&self, _endpoint: &Endpoint) -> Result<OperationRequest> {
        Ok(bucket_request(
            Method::GET,
            &self.bucket,
            &self.extra_headers,
            &self.extra_query_params,
        )
        .query("versioning", ""))
    }

    fn parse(&self, response: HttpResponse) -> Result<Self::Output> {
        xml::parse_bucket_versioning(&response.body)
    }
}

#[derive(Clone, Debug, Default)]
pub struct SetBucketVersioningArgs {
    pub bucket: String,
    pub configuration: BucketVersioning,
    pub extra_headers: HeaderMap,
    pub extra_query_params: Vec<(String, String)>,
}

impl SetBucketVersioningArgs {
    pub fn new(bucket: impl Into<String>, configuration: BucketVersioning) -> Self {
        Self {
            bucket: bucket.into(),
            configuration,
            ..Self::default()
        }
    }
}

impl sealed::Sealed for SetBucketVersioningArgs {}

impl super::Operation for SetBucketVersioningArgs {
    type Output = SetBucketVersioningOutput;
    const NAME: &'static str = "set_bucket_versioning";

    fn validate(&self) -> Result<()> {
        validate::bucket_name(&self.bucket)?;
        if self.configuration.status.is_none() {
            return Err(Error::invalid_argument("versioning status is required"));
        }
        Ok(())
    }

    fn request(&self, _endpoint: &Endpoint) -> Result<OperationRequest> {
        bucket_request(
            Method::PUT,
            &self.bucket,
            &self.extra_headers,
            &self.extra_query_params,
        )
        .query("versioning", "")
        .xml_body(xml::encode_bucket_versioning(&self.configuration)?)
    }

    fn parse(&self, _response: HttpResponse) -> Result<Self::Output> {
        Ok(SetBucketVersioningOutput {
            bucket: self.bucket.clone(),
        })
    }
}

impl Client {
    pub fn list_buckets(&self, args: &ListBucketsArgs) -> ListBucketsResponse {
        self.execute(args)
    }

    /// A missing bucket is a successful call with `exists == false`.
    pub fn bucket_exists(&self, args: &BucketExistsArgs) -> BucketExistsResponse {
        self.execute(args)
    }

    pub fn make_bucket(&self, args: &MakeBucketArgs) -> MakeBucketResponse {
        self.execute(args)
    }

    pub fn remove_bucket(&self, args: &RemoveBucketArgs) -> RemoveBucketResponse {
        self.execute(args)
    }

    /// An untagged bucket yields an empty tag set.
    pub fn get_bucket_tags(&self, args: &GetBucketTagsArgs) -> GetBucketTagsResponse {
        self.execute(args)
    }

    pub fn set_bucket_tags(&self, args: &SetBucketTagsArgs) -> SetBucketTagsResponse {
        self.execute(args)
    }

    pub fn delete_bucket_tags(&self, args: &DeleteBucketTagsArgs) -> DeleteBucketTagsResponse {
        self.execute(args)
    }

    pub fn get_bucket_versioning(
        &self,
        args: &GetBucketVersioningArgs,
    ) -> GetBucketVersioningResponse {
        self.execute(args)
    }

    pub fn set_bucket_versioning(
        &self,
        args: &SetBucketVersioningArgs,
    ) -> SetBucketVersioningResponse {
        self.execute(args)
    }
}
