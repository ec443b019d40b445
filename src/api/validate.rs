use std::{collections::HashSet, net::Ipv4Addr};

use crate::{
    error::{Error, Result},
    types::TagSet,
};

pub(crate) const MAX_BUCKET_TAGS: usize = 50;
pub(crate) const MAX_OBJECT_TAGS: usize = 10;
const MAX_OBJECT_NAME_BYTES: usize = 1024;
const MAX_TAG_KEY_CHARS: usize = 128;
const MAX_TAG_VALUE_CHARS: usize = 256;

/// S3 bucket naming rules. A valid name is also usable as a DNS label.
pub(crate) fn bucket_name(bucket: &str) -> Result<()> {
    let invalid = |reason: &str| -> Result<()> {
        Err(Error::invalid_argument(format!(
            "bucket name {bucket:?} {reason}"
        )))
    };

    if bucket.is_empty() {
        return Err(Error::invalid_argument("bucket name must not be empty"));
    }
    if !(3..=63).contains(&bucket.len()) {
        return invalid("must be between 3 and 63 characters long");
    }
    if !bucket
        .bytes()
        .all(|b| matches!(b, b'a'..=b'z' | b'0'..=b'9' | b'-' | b'.'))
    {
        return invalid("may only contain lowercase letters, digits, '.', and '-'");
    }

    let alnum = |b: u8| b.is_ascii_lowercase() || b.is_ascii_digit();
    let bytes = bucket.as_bytes();
    if !alnum(bytes[0]) || !alnum(bytes[bytes.len() - 1]) {
        return invalid("must start and end with a letter or digit");
    }
    if bucket.contains("..") || bucket.contains(".-") || bucket.contains("-.") {
        return invalid("must not contain '..', '.-', or '-.'");
    }
    if bucket.parse::<Ipv4Addr>().is_ok() {
        return invalid("must not be formatted as an IP address");
    }

    Ok(())
}

pub(crate) fn object_name(object: &str) -> Result<()> {
    if object.is_empty() {
        return Err(Error::invalid_argument("object name must not be empty"));
    }
    if object.len() > MAX_OBJECT_NAME_BYTES {
        return Err(Error::invalid_argument(format!(
            "object name must be at most {MAX_OBJECT_NAME_BYTES} bytes"
        )));
    }
    // URL normalization would rewrite these, so the signed path would not be the sent one.
    if object.split('/').any(|segment| segment == "." || segment == "..") {
        return Err(Error::invalid_argument(
            "object name must not contain '.' or '..' path segments",
        ));
    }
    Ok(())
}

pub(crate) fn tags(tags: &TagSet, max: usize) -> Result<()> {
    if tags.len() > max {
        return Err(Error::invalid_argument(format!(
            "at most {max} tags are allowed, got {}",
            tags.len()
        )));
    }

    let mut seen = HashSet::with_capacity(tags.len());
    for tag in tags.iter() {
        let key_chars = tag.key.chars().count();
        if key_chars == 0 || key_chars > MAX_TAG_KEY_CHARS {
            return Err(Error::invalid_argument(format!(
                "tag key {:?} must be 1 to {MAX_TAG_KEY_CHARS} characters",
                tag.key
            )));
        }
        if tag.value.chars().count() > MAX_TAG_VALUE_CHARS {
            return Err(Error::invalid_argument(format!(
                "value of tag {:?} must be at most {MAX_TAG_VALUE_CHARS} characters",
                tag.key
            )));
        }
        if !seen.insert(tag.key.as_str()) {
            return Err(Error::invalid_argument(format!(
                "duplicate tag key {:?}",
                tag.key
            )));
        }
    }

    Ok(())
}

/// Treats `Some("")` as a caller mistake rather than "no version".
pub(crate) fn version_id(version_id: Option<&str>) -> Result<()> {
    match version_id {
        Some(v) if v.trim().is_empty() => {
            Err(Error::invalid_argument("version id must not be empty"))
        }
        _ => Ok(()),
    }
}
