use bytes::Bytes;
use serde::{Serialize, de::DeserializeOwned};

use crate::{error::Error, types};

const S3_XMLNS: &str = "http://s3.amazonaws.com/doc/2006-03-01/";

fn decode<T: DeserializeOwned>(body: &[u8], what: &str) -> Result<T, Error> {
    let text = std::str::from_utf8(body).map_err(|e| {
        Error::decode(
            format!("{what} XML response is not valid UTF-8"),
            Some(Box::new(e)),
        )
    })?;
    quick_xml::de::from_str::<T>(text).map_err(|e| {
        Error::decode(
            format!("failed to parse {what} XML response"),
            Some(Box::new(e)),
        )
    })
}

fn encode<T: Serialize>(value: &T, what: &str) -> Result<Bytes, Error> {
    let xml = quick_xml::se::to_string(value).map_err(|e| {
        Error::invalid_argument(format!("failed to encode {what} XML: {e}"))
    })?;
    Ok(Bytes::from(xml))
}

/// Parses an S3 `<Error>` document. Returns `None` for empty or non-XML bodies.
pub(crate) fn parse_error_xml(body: &[u8]) -> Option<types::XmlError> {
    let text = std::str::from_utf8(body).ok()?;
    if text.trim().is_empty() {
        return None;
    }

    quick_xml::de::from_str::<types::XmlError>(text)
        .ok()
        .filter(|e| e.code.is_some() || e.message.is_some())
}

pub(crate) fn parse_list_buckets(body: &[u8]) -> Result<types::ListBucketsOutput, Error> {
    decode::<types::XmlListAllMyBucketsResult>(body, "ListBuckets").map(Into::into)
}

pub(crate) fn parse_list_objects_v2(body: &[u8]) -> Result<types::ListObjectsOutput, Error> {
    decode::<types::XmlListBucketResult>(body, "ListObjectsV2").map(Into::into)
}

pub(crate) fn parse_tagging(body: &[u8]) -> Result<types::TagSet, Error> {
    decode::<types::XmlTagging>(body, "Tagging").map(Into::into)
}

pub(crate) fn parse_bucket_versioning(body: &[u8]) -> Result<types::BucketVersioning, Error> {
    decode::<types::XmlVersioningConfiguration>(body, "VersioningConfiguration").map(Into::into)
}

pub(crate) fn parse_copy_object(body: &[u8]) -> Result<types::XmlCopyObjectResult, Error> {
    decode(body, "CopyObjectResult")
}

pub(crate) fn encode_tagging(tags: &types::TagSet) -> Result<Bytes, Error> {
    #[derive(Serialize)]
    #[serde(rename = "Tagging")]
    struct XmlOut<'a> {
        #[serde(rename = "@xmlns")]
        xmlns: &'static str,
        #[serde(rename = "TagSet")]
        tag_set: XmlTagSet<'a>,
    }

    #[derive(Serialize)]
    struct XmlTagSet<'a> {
        #[serde(rename = "Tag")]
        tags: Vec<XmlTag<'a>>,
    }

    #[derive(Serialize)]
    struct XmlTag<'a> {
        #[serde(rename = "Key")]
        key: &'a str,
        #[serde(rename = "Value")]
        value: &'a str,
    }

    encode(
        &XmlOut {
            xmlns: S3_XMLNS,
            tag_set: XmlTagSet {
                tags: tags
                    .iter()
                    .map(|t| XmlTag {
                        key: &t.key,
                        value: &t.value,
                    })
                    .collect(),
            },
        },
        "Tagging",
    )
}

pub(crate) fn encode_create_bucket_configuration(region: &str) -> Result<Bytes, Error> {
    #[derive(Serialize)]
    #[serde(rename = "CreateBucketConfiguration")]
    struct XmlOut<'a> {
        #[serde(rename = "@xmlns")]
        xmlns: &'static str,
        #[serde(rename = "LocationConstraint")]
        location_constraint: &'a str,
    }

    encode(
        &XmlOut {
            xmlns: S3_XMLNS,
            location_constraint: region,
        },
        "CreateBucketConfiguration",
    )
}

pub(crate) fn encode_bucket_versioning(
    configuration: &types::BucketVersioning,
) -> Result<Bytes, Error> {
    #[derive(Serialize)]
    #[serde(rename = "VersioningConfiguration")]
    struct XmlOut {
        #[serde(rename = "@xmlns")]
        xmlns: &'static str,
        #[serde(rename = "Status", skip_serializing_if = "Option::is_none")]
        status: Option<&'static str>,
        #[serde(rename = "MfaDelete", skip_serializing_if = "Option::is_none")]
        mfa_delete: Option<&'static str>,
    }

    encode(
        &XmlOut {
            xmlns: S3_XMLNS,
            status: configuration.status.map(types::VersioningStatus::as_str),
            mfa_delete: configuration.mfa_delete.map(types::MfaDelete::as_str),
        },
        "VersioningConfiguration",
    )
}
