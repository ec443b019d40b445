use base64::Engine as _;
use http::HeaderValue;

use crate::error::{Error, Result};

/// Base64 MD5 digest for the `Content-MD5` header.
pub(crate) fn content_md5_header_value(bytes: &[u8]) -> Result<HeaderValue> {
    use md5::Digest as _;

    let digest = md5::Md5::digest(bytes);
    let value = base64::engine::general_purpose::STANDARD.encode(digest);
    HeaderValue::from_str(&value).map_err(|_| Error::invalid_argument("invalid Content-MD5 value"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn digest_is_base64_encoded() {
        assert_eq!(content_md5_header_value(b"").unwrap(), "1B2M2Y8AsgTpgAmY7PhCfg==");
        assert_eq!(
            content_md5_header_value(b"hello").unwrap(),
            "XUFAKrxLKna5cZ2REBfFkg=="
        );
    }
}
