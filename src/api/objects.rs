//! Object operations.

use std::time::Duration;

use bytes::Bytes;
use http::{HeaderMap, HeaderValue, Method};
use time::OffsetDateTime;

use super::{OperationRequest, Response, buckets::recover_missing_tags, sealed, validate};
use crate::{
    client::{Client, service_error},
    endpoint::Endpoint,
    error::{Error, Result},
    signer,
    transport::HttpResponse,
    types::{
        CopyObjectOutput, DeleteObjectTagsOutput, GetObjectOutput, GetObjectTagsOutput,
        ListObjectsOutput, PresignedRequest, PutObjectOutput, RemoveObjectOutput,
        SetObjectTagsOutput, StatObjectOutput, TagSet,
    },
    util::{
        headers::{
            copy_source_header_value, header_http_date, header_string, header_u64,
            metadata_header_name, user_metadata,
        },
        url::resolve_url,
        xml,
    },
};

const DEFAULT_CONTENT_TYPE: &str = "application/octet-stream";
const MAX_LIST_KEYS: u32 = 1000;
const DEFAULT_PRESIGN_EXPIRY: Duration = Duration::from_secs(604_800);

pub type StatObjectResponse = Response<StatObjectOutput>;
pub type GetObjectResponse = Response<GetObjectOutput>;
pub type PutObjectResponse = Response<PutObjectOutput>;
pub type RemoveObjectResponse = Response<RemoveObjectOutput>;
pub type CopyObjectResponse = Response<CopyObjectOutput>;
pub type ListObjectsResponse = Response<ListObjectsOutput>;
pub type GetObjectTagsResponse = Response<GetObjectTagsOutput>;
pub type SetObjectTagsResponse = Response<SetObjectTagsOutput>;
pub type DeleteObjectTagsResponse = Response<DeleteObjectTagsOutput>;
pub type PresignedObjectUrlResponse = Response<PresignedRequest>;

fn validate_object(bucket: &str, object: &str, version_id: Option<&str>) -> Result<()> {
    validate::bucket_name(bucket)?;
    validate::object_name(object)?;
    validate::version_id(version_id)
}

fn object_request(
    method: Method,
    bucket: &str,
    object: &str,
    version_id: Option<&str>,
    extra_headers: &HeaderMap,
    extra_query_params: &[(String, String)],
) -> OperationRequest {
    OperationRequest::new(
        method,
        Some(bucket),
        Some(object),
        extra_headers,
        extra_query_params,
    )
    .query_opt("versionId", version_id)
}

fn version_id(headers: &HeaderMap, requested: Option<&str>) -> Option<String> {
    header_string(headers, "x-amz-version-id").or_else(|| requested.map(str::to_string))
}

fn delete_marker(headers: &HeaderMap) -> bool {
    header_string(headers, "x-amz-delete-marker").is_some_and(|v| v.eq_ignore_ascii_case("true"))
}

/// Reads object metadata without the body.
#[derive(Clone, Debug, Default)]
pub struct StatObjectArgs {
    pub bucket: String,
    pub object: String,
    pub version_id: Option<String>,
    pub extra_headers: HeaderMap,
    pub extra_query_params: Vec<(String, String)>,
}

impl StatObjectArgs {
    pub fn new(bucket: impl Into<String>, object: impl Into<String>) -> Self {
        Self {
            bucket: bucket.into(),
            object: object.into(),
            ..Self::default()
        }
    }

    pub fn version_id(mut self, version_id: impl Into<String>) -> Self {
        self.version_id = Some(version_id.into());
        self
    }
}

impl sealed::Sealed for StatObjectArgs {}

impl super::Operation for StatObjectArgs {
    type Output = StatObjectOutput;
    const NAME: &'static str = "stat_object";

    fn validate(&self) -> Result<()> {
        validate_object(&self.bucket, &self.object, self.version_id.as_deref())
    }

    fn request(&self, _endpoint: &Endpoint) -> Result<OperationRequest> {
        Ok(object_request(
            Method::HEAD,
            &self.bucket,
            &self.object,
            self.version_id.as_deref(),
            &self.extra_headers,
            &self.extra_query_params,
        ))
    }

    fn parse(&self, response: HttpResponse) -> Result<Self::Output> {
        let headers = &response.headers;
        Ok(StatObjectOutput {
            bucket: self.bucket.clone(),
            object: self.object.clone(),
            version_id: version_id(headers, self.version_id.as_deref()),
            etag: header_string(headers, http::header::ETAG),
            size: header_u64(headers, http::header::CONTENT_LENGTH),
            content_type: header_string(headers, http::header::CONTENT_TYPE),
            last_modified: header_http_date(headers, http::header::LAST_MODIFIED),
            delete_marker: delete_marker(headers),
            user_metadata: user_metadata(headers),
        })
    }
}

/// Downloads an object, optionally a byte range of it.
#[derive(Clone, Debug, Default)]
pub struct GetObjectArgs {
    pub bucket: String,
    pub object: String,
    pub version_id: Option<String>,
    /// First byte to return.
    pub offset: Option<u64>,
    /// Number of bytes to return. Zero is rejected.
    pub length: Option<u64>,
    pub extra_headers: HeaderMap,
    pub extra_query_params: Vec<(String, String)>,
}

impl GetObjectArgs {
    pub fn new(bucket: impl Into<String>, object: impl Into<String>) -> Self {
        Self {
            bucket: bucket.into(),
            object: object.into(),
            ..Self::default()
        }
    }

    pub fn version_id(mut self, version_id: impl Into<String>) -> Self {
        self.version_id = Some(version_id.into());
        self
    }

    pub fn range(mut self, offset: u64, length: Option<u64>) -> Self {
        self.offset = Some(offset);
        self.length = length;
        self
    }

    fn range_header(&self) -> Result<Option<String>> {
        let start = self.offset.unwrap_or(0);
        match (self.offset, self.length) {
            (None, None) => Ok(None),
            (_, Some(0)) => Err(Error::invalid_argument("range length must be positive")),
            (_, Some(length)) => {
                let end = start
                    .checked_add(length - 1)
                    .ok_or_else(|| Error::invalid_argument("range end overflows u64"))?;
                Ok(Some(format!("bytes={start}-{end}")))
            }
            (Some(_), None) => Ok(Some(format!("bytes={start}-"))),
        }
    }
}

impl sealed::Sealed for GetObjectArgs {}

impl super::Operation for GetObjectArgs {
    type Output = GetObjectOutput;
    const NAME: &'static str = "get_object";

    fn validate(&self) -> Result<()> {
        validate_object(&self.bucket, &self.object, self.version_id.as_deref())?;
        self.range_header().map(|_| ())
    }

    fn request(&self, _endpoint: &Endpoint) -> Result<OperationRequest> {
        let request = object_request(
            Method::GET,
            &self.bucket,
            &self.object,
            self.version_id.as_deref(),
            &self.extra_headers,
            &self.extra_query_params,
        );
        match self.range_header()? {
            Some(range) => request.text_header(http::header::RANGE, &range),
            None => Ok(request),
        }
    }

    fn parse(&self, response: HttpResponse) -> Result<Self::Output> {
        let headers = &response.headers;
        Ok(GetObjectOutput {
            bucket: self.bucket.clone(),
            object: self.object.clone(),
            version_id: version_id(headers, self.version_id.as_deref()),
            etag: header_string(headers, http::header::ETAG),
            content_type: header_string(headers, http::header::CONTENT_TYPE),
            content_range: header_string(headers, http::header::CONTENT_RANGE),
            body: response.body,
        })
    }
}

/// Uploads an object in a single request.
#[derive(Clone, Debug, Default)]
pub struct PutObjectArgs {
    pub bucket: String,
    pub object: String,
    pub data: Bytes,
    /// Defaults to `application/octet-stream`.
    pub content_type: Option<String>,
    /// Sent as `x-amz-meta-<key>` headers.
    pub user_metadata: Vec<(String, String)>,
    pub extra_headers: HeaderMap,
    pub extra_query_params: Vec<(String, String)>,
}

impl PutObjectArgs {
    pub fn new(
        bucket: impl Into<String>,
        object: impl Into<String>,
        data: impl Into<Bytes>,
    ) -> Self {
        Self {
            bucket: bucket.into(),
            object: object.into(),
            data: data.into(),
            ..Self::default()
        }
    }

    pub fn content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = Some(content_type.into());
        self
    }

    pub fn metadata(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.user_metadata.push((key.into(), value.into()));
        self
    }
}

impl sealed::Sealed for PutObjectArgs {}

impl super::Operation for PutObjectArgs {
    type Output = PutObjectOutput;
    const NAME: &'static str = "put_object";

    fn validate(&self) -> Result<()> {
        validate_object(&self.bucket, &self.object, None)?;
        for (key, value) in &self.user_metadata {
            metadata_header_name(key)?;
            HeaderValue::from_str(value).map_err(|_| {
                Error::invalid_argument(format!("invalid value for metadata key {key:?}"))
            })?;
        }
        Ok(())
    }

    fn request(&self, _endpoint: &Endpoint) -> Result<OperationRequest> {
        let mut request = object_request(
            Method::PUT,
            &self.bucket,
            &self.object,
            None,
            &self.extra_headers,
            &self.extra_query_params,
        )
        .text_header(
            http::header::CONTENT_TYPE,
            self.content_type.as_deref().unwrap_or(DEFAULT_CONTENT_TYPE),
        )?;
        for (key, value) in &self.user_metadata {
            request = request.text_header(metadata_header_name(key)?, value)?;
        }
        Ok(request.body(self.data.clone()))
    }

    fn parse(&self, response: HttpResponse) -> Result<Self::Output> {
        Ok(PutObjectOutput {
            bucket: self.bucket.clone(),
            object: self.object.clone(),
            etag: header_string(&response.headers, http::header::ETAG),
            version_id: header_string(&response.headers, "x-amz-version-id"),
        })
    }
}

/// Deletes an object or one version of it.
#[derive(Clone, Debug, Default)]
pub struct RemoveObjectArgs {
    pub bucket: String,
    pub object: String,
    pub version_id: Option<String>,
    pub extra_headers: HeaderMap,
    pub extra_query_params: Vec<(String, String)>,
}

impl RemoveObjectArgs {
    pub fn new(bucket: impl Into<String>, object: impl Into<String>) -> Self {
        Self {
            bucket: bucket.into(),
            object: object.into(),
            ..Self::default()
        }
    }

    pub fn version_id(mut self, version_id: impl Into<String>) -> Self {
        self.version_id = Some(version_id.into());
        self
    }
}

impl sealed::Sealed for RemoveObjectArgs {}

impl super::Operation for RemoveObjectArgs {
    type Output = RemoveObjectOutput;
    const NAME: &'static str = "remove_object";

    fn validate(&self) -> Result<()> {
        validate_object(&self.bucket, &self.object, self.version_id.as_deref())
    }

    fn request(&self, _endpoint: &Endpoint) -> Result<OperationRequest> {
        Ok(object_request(
            Method::DELETE,
            &self.bucket,
            &self.object,
            self.version_id.as_deref(),
            &self.extra_headers,
            &self.extra_query_params,
        ))
    }

    fn parse(&self, response: HttpResponse) -> Result<Self::Output> {
        Ok(RemoveObjectOutput {
            bucket: self.bucket.clone(),
            object: self.object.clone(),
            version_id: version_id(&response.headers, self.version_id.as_deref()),
            delete_marker: delete_marker(&response.headers),
        })
    }
}

/// Server-side copy of an object.
#[derive(Clone, Debug, Default)]
pub struct CopyObjectArgs {
    pub bucket: String,
    pub object: String,
    pub source_bucket: String,
    pub source_object: String,
    pub source_version_id: Option<String>,
    pub extra_headers: HeaderMap,
    pub extra_query_params: Vec<(String, String)>,
}

impl CopyObjectArgs {
    pub fn new(
        bucket: impl Into<String>,
        object: impl Into<String>,
        source_bucket: impl Into<String>,
        source_object: impl Into<String>,
    ) -> Self {
        Self {
            bucket: bucket.into(),
            object: object.into(),
            source_bucket: source_bucket.into(),
            source_object: source_object.into(),
            ..Self::default()
        }
    }

    pub fn source_version_id(mut self, version_id: impl Into<String>) -> Self {
        self.source_version_id = Some(version_id.into());
        self
    }
}

impl sealed::Sealed for CopyObjectArgs {}

impl super::Operation for CopyObjectArgs {
    type Output = CopyObjectOutput;
    const NAME: &'static str = "copy_object";

    fn validate(&self) -> Result<()> {
        validate_object(&self.bucket, &self.object, None)?;
        validate_object(
            &self.source_bucket,
            &self.source_object,
            self.source_version_id.as_deref(),
        )
    }

    fn request(&self, _endpoint: &Endpoint) -> Result<OperationRequest> {
        object_request(
            Method::PUT,
            &self.bucket,
            &self.object,
            None,
            &self.extra_headers,
            &self.extra_query_params,
        )
        .text_header(
            "x-amz-copy-source",
            &copy_source_header_value(
                &self.source_bucket,
                &self.source_object,
                self.source_version_id.as_deref(),
            ),
        )
    }

    fn parse(&self, response: HttpResponse) -> Result<Self::Output> {
        // A copy can fail after the 200 status line has been sent.
        if xml::parse_error_xml(&response.body).is_some() {
            return Err(service_error(
                &response,
                Some(&self.bucket),
                Some(&self.object),
                None,
            ));
        }

        let result = xml::parse_copy_object(&response.body)?;
        Ok(CopyObjectOutput {
            bucket: self.bucket.clone(),
            object: self.object.clone(),
            etag: result.etag,
            last_modified: result.last_modified,
            version_id: header_string(&response.headers, "x-amz-version-id"),
        })
    }
}

/// Lists objects with ListObjectsV2. One call returns one page.
#[derive(Clone, Debug, Default)]
pub struct ListObjectsArgs {
    pub bucket: String,
    pub prefix: Option<String>,
    pub delimiter: Option<String>,
    /// 1 to 1000.
    pub max_keys: Option<u32>,
    pub continuation_token: Option<String>,
    pub start_after: Option<String>,
    pub fetch_owner: bool,
    pub extra_headers: HeaderMap,
    pub extra_query_params: Vec<(String, String)>,
}

impl ListObjectsArgs {
    pub fn new(bucket: impl Into<String>) -> Self {
        Self {
            bucket: bucket.into(),
            ..Self::default()
        }
    }

    pub fn prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = Some(prefix.into());
        self
    }

    pub fn delimiter(mut self, delimiter: impl Into<String>) -> Self {
        self.delimiter = Some(delimiter.into());
        self
    }

    pub fn max_keys(mut self, max_keys: u32) -> Self {
        self.max_keys = Some(max_keys);
        self
    }

    pub fn continuation_token(mut self, token: impl Into<String>) -> Self {
        self.continuation_token = Some(token.into());
        self
    }

    pub fn start_after(mut self, key: impl Into<String>) -> Self {
        self.start_after = Some(key.into());
        self
    }
}

impl sealed::Sealed for ListObjectsArgs {}

impl super::Operation for ListObjectsArgs {
    type Output = ListObjectsOutput;
    const NAME: &'static str = "list_objects";

    fn validate(&self) -> Result<()> {
        validate::bucket_name(&self.bucket)?;
        if let Some(max_keys) = self.max_keys
            && !(1..=MAX_LIST_KEYS).contains(&max_keys)
        {
            return Err(Error::invalid_argument(format!(
                "max_keys must be between 1 and {MAX_LIST_KEYS}"
            )));
        }
        Ok(())
    }

    fn request(&self, _endpoint: &Endpoint) -> Result<OperationRequest> {
        let mut request = OperationRequest::new(
            Method::GET,
            Some(&self.bucket),
            None,
            &self.extra_headers,
            &self.extra_query_params,
        )
        .query("list-type", "2")
        .query_opt("prefix", self.prefix.as_deref())
        .query_opt("delimiter", self.delimiter.as_deref())
        .query_opt("continuation-token", self.continuation_token.as_deref())
        .query_opt("start-after", self.start_after.as_deref());
        if let Some(max_keys) = self.max_keys {
            request = request.query("max-keys", max_keys.to_string());
        }
        if self.fetch_owner {
            request = request.query("fetch-owner", "true");
        }
        Ok(request)
    }

    fn parse(&self, response: HttpResponse) -> Result<Self::Output> {
        xml::parse_list_objects_v2(&response.body)
    }
}

/// Reads the tag set of an object.
#[derive(Clone, Debug, Default)]
pub struct GetObjectTagsArgs {
    pub bucket: String,
    pub object: String,
    pub version_id: Option<String>,
    pub extra_headers: HeaderMap,
    pub extra_query_params: Vec<(String, String)>,
}

impl GetObjectTagsArgs {
    pub fn new(bucket: impl Into<String>, object: impl Into<String>) -> Self {
        Self {
            bucket: bucket.into(),
            object: object.into(),
            ..Self::default()
        }
    }

    pub fn version_id(mut self, version_id: impl Into<String>) -> Self {
        self.version_id = Some(version_id.into());
        self
    }
}

impl sealed::Sealed for GetObjectTagsArgs {}

impl super::Operation for GetObjectTagsArgs {
    type Output = GetObjectTagsOutput;
    const NAME: &'static str = "get_object_tags";

    fn validate(&self) -> Result<()> {
        validate_object(&self.bucket, &self.object, self.version_id.as_deref())
    }

    fn request(&self, _endpoint: &Endpoint) -> Result<OperationRequest> {
        Ok(object_request(
            Method::GET,
            &self.bucket,
            &self.object,
            self.version_id.as_deref(),
            &self.extra_headers,
            &self.extra_query_params,
        )
        .query("tagging", ""))
    }

    fn parse(&self, response: HttpResponse) -> Result<Self::Output> {
        Ok(GetObjectTagsOutput {
            bucket: self.bucket.clone(),
            object: self.object.clone(),
            version_id: version_id(&response.headers, self.version_id.as_deref()),
            tags: xml::parse_tagging(&response.body)?,
        })
    }

    fn recover(&self, error: Error) -> Result<Self::Output> {
        Ok(GetObjectTagsOutput {
            bucket: self.bucket.clone(),
            object: self.object.clone(),
            version_id: self.version_id.clone(),
            tags: recover_missing_tags(error)?,
        })
    }
}

/// Replaces the tag set of an object.
#[derive(Clone, Debug, Default)]
pub struct SetObjectTagsArgs {
    pub bucket: String,
    pub object: String,
    pub version_id: Option<String>,
    pub tags: TagSet,
    pub extra_headers: HeaderMap,
    pub extra_query_params: Vec<(String, String)>,
}

impl SetObjectTagsArgs {
    pub fn new(bucket: impl Into<String>, object: impl Into<String>, tags: TagSet) -> Self {
        Self {
            bucket: bucket.into(),
            object: object.into(),
            tags,
            ..Self::default()
        }
    }

    pub fn version_id(mut self, version_id: impl Into<String>) -> Self {
        self.version_id = Some(version_id.into());
        self
    }
}

impl sealed::Sealed for SetObjectTagsArgs {}

impl super::Operation for SetObjectTagsArgs {
    type Output = SetObjectTagsOutput;
    const NAME: &'static str = "set_object_tags";

    fn validate(&self) -> Result<()> {
        validate_object(&self.bucket, &self.object, self.version_id.as_deref())?;
        validate::tags(&self.tags, validate::MAX_OBJECT_TAGS)
    }

    fn request(&self, _endpoint: &Endpoint) -> Result<OperationRequest> {
        object_request(
            Method::PUT,
            &self.bucket,
            &self.object,
            self.version_id.as_deref(),
            &self.extra_headers,
            &self.extra_query_params,
        )
        .query("tagging", "")
        .xml_body(xml::encode_tagging(&self.tags)?)
    }

    fn parse(&self, response: HttpResponse) -> Result<Self::Output> {
        Ok(SetObjectTagsOutput {
            bucket: self.bucket.clone(),
            object: self.object.clone(),
            version_id: version_id(&response.headers, self.version_id.as_deref()),
        })
    }
}

/// Removes every tag from an object.
#[derive(Clone, Debug, Default)]
pub struct DeleteObjectTagsArgs {
    pub bucket: String,
    pub object: String,
    pub version_id: Option<String>,
    pub extra_headers: HeaderMap,
    pub extra_query_params: Vec<(String, String)>,
}

impl DeleteObjectTagsArgs {
    pub fn new(bucket: impl Into<String>, object: impl Into<String>) -> Self {
        Self {
            bucket: bucket.into(),
            object: object.into(),
            ..Self::default()
        }
    }

    pub fn version_id(mut self, version_id: impl Into<String>) -> Self {
        self.version_id = Some(version_id.into());
        self
    }
}

impl sealed::Sealed for DeleteObjectTagsArgs {}

impl super::Operation for DeleteObjectTagsArgs {
    type Output = DeleteObjectTagsOutput;
    const NAME: &'static str = "delete_object_tags";

    fn validate(&self) -> Result<()> {
        validate_object(&self.bucket, &self.object, self.version_id.as_deref())
    }

    fn request(&self, _endpoint: &Endpoint) -> Result<OperationRequest> {
        Ok(object_request(
            Method::DELETE,
            &self.bucket,
            &self.object,
            self.version_id.as_deref(),
            &self.extra_headers,
            &self.extra_query_params,
        )
        .query("tagging", ""))
    }

    fn parse(&self, response: HttpResponse) -> Result<Self::Output> {
        Ok(DeleteObjectTagsOutput {
            bucket: self.bucket.clone(),
            object: self.object.clone(),
            version_id: version_id(&response.headers, self.version_id.as_deref()),
        })
    }
}

/// Arguments for a presigned object URL. Nothing is sent over the network.
#[derive(Clone, Debug)]
pub struct PresignedObjectUrlArgs {
    pub bucket: String,
    pub object: String,
    pub method: Method,
    /// 1 second to 7 days. Defaults to 7 days.
    pub expiry: Duration,
    pub version_id: Option<String>,
    pub extra_query_params: Vec<(String, String)>,
}

impl PresignedObjectUrlArgs {
    pub fn new(bucket: impl Into<String>, object: impl Into<String>, method: Method) -> Self {
        Self {
            bucket: bucket.into(),
            object: object.into(),
            method,
            expiry: DEFAULT_PRESIGN_EXPIRY,
            version_id: None,
            extra_query_params: Vec::new(),
        }
    }

    pub fn expiry(mut self, expiry: Duration) -> Self {
        self.expiry = expiry;
        self
    }

    pub fn version_id(mut self, version_id: impl Into<String>) -> Self {
        self.version_id = Some(version_id.into());
        self
    }

    fn validate(&self) -> Result<()> {
        validate_object(&self.bucket, &self.object, self.version_id.as_deref())
    }

    fn presign(
        &self,
        endpoint: &Endpoint,
        credentials: &crate::auth::Credentials,
        now: OffsetDateTime,
    ) -> Result<PresignedRequest> {
        let mut query = self.extra_query_params.clone();
        if let Some(version_id) = &self.version_id {
            query.push(("versionId".to_string(), version_id.clone()));
        }
        let resolved = resolve_url(endpoint, Some(&self.bucket), Some(&self.object), &query)?;
        signer::presign(
            self.method.clone(),
            resolved.url,
            &HeaderMap::new(),
            credentials,
            endpoint.region(),
            now,
            self.expiry,
        )
    }
}

impl Client {
    pub fn stat_object(&self, args: &StatObjectArgs) -> StatObjectResponse {
        self.execute(args)
    }

    pub fn get_object(&self, args: &GetObjectArgs) -> GetObjectResponse {
        self.execute(args)
    }

    pub fn put_object(&self, args: &PutObjectArgs) -> PutObjectResponse {
        self.execute(args)
    }

    pub fn remove_object(&self, args: &RemoveObjectArgs) -> RemoveObjectResponse {
        self.execute(args)
    }

    pub fn copy_object(&self, args: &CopyObjectArgs) -> CopyObjectResponse {
        self.execute(args)
    }

    pub fn list_objects(&self, args: &ListObjectsArgs) -> ListObjectsResponse {
        self.execute(args)
    }

    /// An untagged object yields an empty tag set.
    pub fn get_object_tags(&self, args: &GetObjectTagsArgs) -> GetObjectTagsResponse {
        self.execute(args)
    }

    pub fn set_object_tags(&self, args: &SetObjectTagsArgs) -> SetObjectTagsResponse {
        self.execute(args)
    }

    pub fn delete_object_tags(&self, args: &DeleteObjectTagsArgs) -> DeleteObjectTagsResponse {
        self.execute(args)
    }

    /// Builds a presigned URL for `args`. The transport is never called, so
    /// the response has no status.
    pub fn presigned_object_url(
        &self,
        args: &PresignedObjectUrlArgs,
    ) -> PresignedObjectUrlResponse {
        let presigned = args.validate().and_then(|()| {
            let credentials = self.retrieve_credentials()?;
            args.presign(self.endpoint(), &credentials, OffsetDateTime::now_utc())
        });
        match presigned {
            Ok(presigned) => Response::new(Ok(presigned), None, HeaderMap::new()),
            Err(err) => Response::failed(err),
        }
    }
}
