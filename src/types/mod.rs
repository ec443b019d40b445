//! Operation outputs and the XML documents exchanged with the service.

use bytes::Bytes;
use http::{HeaderMap, Method};
use serde::Deserialize;
use time::OffsetDateTime;
use url::Url;

/// Fully resolved presigned request.
#[derive(Clone, Debug)]
pub struct PresignedRequest {
    /// HTTP method to use.
    pub method: Method,
    /// Fully signed request URL.
    pub url: Url,
    /// Headers that must accompany the request.
    pub headers: HeaderMap,
}

/// Tag key/value pair.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Tag {
    pub key: String,
    pub value: String,
}

impl Tag {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }
}

/// Ordered set of tags attached to a bucket or object.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TagSet {
    pub tags: Vec<Tag>,
}

impl TagSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a tag; duplicate keys are rejected when the request is validated.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.tags.push(Tag::new(key, value));
        self
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.tags
            .iter()
            .find(|t| t.key == key)
            .map(|t| t.value.as_str())
    }

    pub fn len(&self) -> usize {
        self.tags.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tags.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Tag> {
        self.tags.iter()
    }
}

impl<K, V> FromIterator<(K, V)> for TagSet
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            tags: iter.into_iter().map(|(k, v)| Tag::new(k, v)).collect(),
        }
    }
}

/// Output from `delete_bucket_tags`.
#[derive(Clone, Debug)]
pub struct DeleteBucketTagsOutput {
    pub bucket: String,
}

/// Output from `get_bucket_tags`. A bucket without tags yields an empty set.
#[derive(Clone, Debug)]
pub struct GetBucketTagsOutput {
    pub bucket: String,
    pub tags: TagSet,
}

/// Output from `set_bucket_tags`.
#[derive(Clone, Debug)]
pub struct SetBucketTagsOutput {
    pub bucket: String,
}

/// Output from `list_buckets`.
#[derive(Clone, Debug)]
pub struct ListBucketsOutput {
    /// Owner information, if provided.
    pub owner: Option<BucketOwner>,
    /// Buckets returned in the response.
    pub buckets: Vec<Bucket>,
}

/// Bucket owner metadata.
#[derive(Clone, Debug)]
pub struct BucketOwner {
    pub id: Option<String>,
    pub display_name: Option<String>,
}

/// Bucket listing entry.
#[derive(Clone, Debug)]
pub struct Bucket {
    pub name: String,
    /// Creation date as reported by the service.
    pub creation_date: Option<String>,
}

/// Output from `bucket_exists`.
#[derive(Clone, Debug)]
pub struct BucketExistsOutput {
    pub bucket: String,
    pub exists: bool,
    /// Value of `x-amz-bucket-region`, if the service sent it.
    pub region: Option<String>,
}

/// Output from `make_bucket`.
#[derive(Clone, Debug)]
pub struct MakeBucketOutput {
    pub bucket: String,
    /// `Location` header, if provided.
    pub location: Option<String>,
}

/// Output from `remove_bucket`.
#[derive(Clone, Debug)]
pub struct RemoveBucketOutput {
    pub bucket: String,
}

/// Bucket versioning state. Both fields are absent for a bucket that never
/// had versioning configured.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct BucketVersioning {
    pub status: Option<VersioningStatus>,
    pub mfa_delete: Option<MfaDelete>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum VersioningStatus {
    Enabled,
    Suspended,
}

impl VersioningStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Enabled => "Enabled",
            Self::Suspended => "Suspended",
        }
    }

    pub(crate) fn parse(value: &str) -> Option<Self> {
        match value {
            "Enabled" => Some(Self::Enabled),
            "Suspended" => Some(Self::Suspended),
            _ => None,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MfaDelete {
    Enabled,
    Disabled,
}

impl MfaDelete {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Enabled => "Enabled",
            Self::Disabled => "Disabled",
        }
    }

    pub(crate) fn parse(value: &str) -> Option<Self> {
        match value {
            "Enabled" => Some(Self::Enabled),
            "Disabled" => Some(Self::Disabled),
            _ => None,
        }
    }
}

/// Output from `set_bucket_versioning`.
#[derive(Clone, Debug)]
pub struct SetBucketVersioningOutput {
    pub bucket: String,
}

/// Output from `stat_object`.
#[derive(Clone, Debug)]
pub struct StatObjectOutput {
    pub bucket: String,
    pub object: String,
    pub version_id: Option<String>,
    pub etag: Option<String>,
    pub size: Option<u64>,
    pub content_type: Option<String>,
    pub last_modified: Option<OffsetDateTime>,
    pub delete_marker: bool,
    /// `x-amz-meta-*` headers with the prefix removed, sorted by key.
    pub user_metadata: Vec<(String, String)>,
}

/// Output from `get_object`. The body is fully buffered.
#[derive(Clone, Debug)]
pub struct GetObjectOutput {
    pub bucket: String,
    pub object: String,
    pub version_id: Option<String>,
    pub etag: Option<String>,
    pub content_type: Option<String>,
    pub content_range: Option<String>,
    pub body: Bytes,
}

/// Output from `put_object`.
#[derive(Clone, Debug)]
pub struct PutObjectOutput {
    pub bucket: String,
    pub object: String,
    pub etag: Option<String>,
    pub version_id: Option<String>,
}

/// Output from `remove_object`.
#[derive(Clone, Debug)]
pub struct RemoveObjectOutput {
    pub bucket: String,
    pub object: String,
    pub version_id: Option<String>,
    pub delete_marker: bool,
}

/// Output from `copy_object`.
#[derive(Clone, Debug)]
pub struct CopyObjectOutput {
    pub bucket: String,
    pub object: String,
    pub etag: Option<String>,
    pub last_modified: Option<String>,
    pub version_id: Option<String>,
}

/// Output from `list_objects` (ListObjectsV2).
#[derive(Clone, Debug)]
pub struct ListObjectsOutput {
    pub name: String,
    pub prefix: Option<String>,
    pub delimiter: Option<String>,
    pub is_truncated: bool,
    pub key_count: Option<u32>,
    pub max_keys: Option<u32>,
    pub continuation_token: Option<String>,
    /// Pass back as `continuation_token` to fetch the next page.
    pub next_continuation_token: Option<String>,
    pub contents: Vec<Object>,
    /// Grouped prefixes when a delimiter was used.
    pub common_prefixes: Vec<String>,
}

/// Object entry in a listing.
#[derive(Clone, Debug)]
pub struct Object {
    pub key: String,
    pub size: u64,
    pub etag: Option<String>,
    pub last_modified: Option<String>,
    pub storage_class: Option<String>,
}

/// Output from `get_object_tags`.
#[derive(Clone, Debug)]
pub struct GetObjectTagsOutput {
    pub bucket: String,
    pub object: String,
    pub version_id: Option<String>,
    pub tags: TagSet,
}

/// Output from `set_object_tags`.
#[derive(Clone, Debug)]
pub struct SetObjectTagsOutput {
    pub bucket: String,
    pub object: String,
    pub version_id: Option<String>,
}

/// Output from `delete_object_tags`.
#[derive(Clone, Debug)]
pub struct DeleteObjectTagsOutput {
    pub bucket: String,
    pub object: String,
    pub version_id: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct XmlError {
    #[serde(rename = "Code")]
    pub(crate) code: Option<String>,
    #[serde(rename = "Message")]
    pub(crate) message: Option<String>,
    #[serde(rename = "Resource")]
    pub(crate) resource: Option<String>,
    #[serde(rename = "RequestId")]
    pub(crate) request_id: Option<String>,
    #[serde(rename = "HostId")]
    pub(crate) host_id: Option<String>,
    #[serde(rename = "BucketName")]
    pub(crate) bucket_name: Option<String>,
    #[serde(rename = "Key")]
    pub(crate) key: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct XmlListBucketResult {
    #[serde(rename = "Name")]
    pub(crate) name: String,
    #[serde(rename = "Prefix")]
    pub(crate) prefix: Option<String>,
    #[serde(rename = "Delimiter")]
    pub(crate) delimiter: Option<String>,
    #[serde(rename = "IsTruncated")]
    pub(crate) is_truncated: Option<bool>,
    #[serde(rename = "KeyCount")]
    pub(crate) key_count: Option<u32>,
    #[serde(rename = "MaxKeys")]
    pub(crate) max_keys: Option<u32>,
    #[serde(rename = "ContinuationToken")]
    pub(crate) continuation_token: Option<String>,
    #[serde(rename = "NextContinuationToken")]
    pub(crate) next_continuation_token: Option<String>,
    #[serde(rename = "Contents", default)]
    pub(crate) contents: Vec<XmlObject>,
    #[serde(rename = "CommonPrefixes", default)]
    pub(crate) common_prefixes: Vec<XmlCommonPrefixes>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct XmlObject {
    #[serde(rename = "Key")]
    pub(crate) key: String,
    #[serde(rename = "LastModified")]
    pub(crate) last_modified: Option<String>,
    #[serde(rename = "ETag")]
    pub(crate) etag: Option<String>,
    #[serde(rename = "Size")]
    pub(crate) size: u64,
    #[serde(rename = "StorageClass")]
    pub(crate) storage_class: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct XmlCommonPrefixes {
    #[serde(rename = "Prefix")]
    pub(crate) prefix: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct XmlCopyObjectResult {
    #[serde(rename = "ETag")]
    pub(crate) etag: Option<String>,
    #[serde(rename = "LastModified")]
    pub(crate) last_modified: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct XmlListAllMyBucketsResult {
    #[serde(rename = "Owner")]
    pub(crate) owner: Option<XmlOwner>,
    #[serde(rename = "Buckets")]
    pub(crate) buckets: Option<XmlBuckets>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct XmlOwner {
    #[serde(rename = "ID")]
    pub(crate) id: Option<String>,
    #[serde(rename = "DisplayName")]
    pub(crate) display_name: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct XmlBuckets {
    #[serde(rename = "Bucket", default)]
    pub(crate) buckets: Vec<XmlBucket>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct XmlBucket {
    #[serde(rename = "Name")]
    pub(crate) name: String,
    #[serde(rename = "CreationDate")]
    pub(crate) creation_date: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct XmlVersioningConfiguration {
    #[serde(rename = "Status")]
    pub(crate) status: Option<String>,
    #[serde(rename = "MfaDelete")]
    pub(crate) mfa_delete: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct XmlTagging {
    #[serde(rename = "TagSet")]
    pub(crate) tag_set: Option<XmlTagSet>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct XmlTagSet {
    #[serde(rename = "Tag", default)]
    pub(crate) tags: Vec<XmlTag>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct XmlTag {
    #[serde(rename = "Key")]
    pub(crate) key: String,
    #[serde(rename = "Value", default)]
    pub(crate) value: String,
}

impl From<XmlListBucketResult> for ListObjectsOutput {
    fn from(value: XmlListBucketResult) -> Self {
        Self {
            name: value.name,
            prefix: value.prefix,
            delimiter: value.delimiter,
            is_truncated: value.is_truncated.unwrap_or(false),
            key_count: value.key_count,
            max_keys: value.max_keys,
            continuation_token: value.continuation_token,
            next_continuation_token: value.next_continuation_token,
            contents: value
                .contents
                .into_iter()
                .map(|o| Object {
                    key: o.key,
                    size: o.size,
                    etag: o.etag,
                    last_modified: o.last_modified,
                    storage_class: o.storage_class,
                })
                .collect(),
            common_prefixes: value
                .common_prefixes
                .into_iter()
                .map(|p| p.prefix)
                .collect(),
        }
    }
}

impl From<XmlListAllMyBucketsResult> for ListBucketsOutput {
    fn from(value: XmlListAllMyBucketsResult) -> Self {
        Self {
            owner: value.owner.map(|o| BucketOwner {
                id: o.id,
                display_name: o.display_name,
            }),
            buckets: value
                .buckets
                .map(|b| {
                    b.buckets
                        .into_iter()
                        .map(|bucket| Bucket {
                            name: bucket.name,
                            creation_date: bucket.creation_date,
                        })
                        .collect()
                })
                .unwrap_or_default(),
        }
    }
}

impl From<XmlTagging> for TagSet {
    fn from(value: XmlTagging) -> Self {
        value
            .tag_set
            .map(|ts| ts.tags.into_iter().map(|t| (t.key, t.value)).collect())
            .unwrap_or_default()
    }
}

impl From<XmlVersioningConfiguration> for BucketVersioning {
    fn from(value: XmlVersioningConfiguration) -> Self {
        Self {
            status: value.status.as_deref().and_then(VersioningStatus::parse),
            mfa_delete: value.mfa_delete.as_deref().and_then(MfaDelete::parse),
        }
    }
}
