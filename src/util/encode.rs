const HEX_UPPER: &[u8; 16] = b"0123456789ABCDEF";

fn is_unreserved(byte: u8) -> bool {
    byte.is_ascii_alphanumeric() || matches!(byte, b'-' | b'_' | b'.' | b'~')
}

/// RFC 3986 encoding as SigV4 expects it; `/` is encoded.
pub(crate) fn uri_encode(input: &str) -> String {
    encode_into(input, false)
}

/// Same as [`uri_encode`] but keeps `/` so object keys stay hierarchical.
pub(crate) fn uri_encode_path(input: &str) -> String {
    encode_into(input, true)
}

fn encode_into(input: &str, keep_slash: bool) -> String {
    let mut out = String::with_capacity(input.len() + input.len() / 2);
    for &b in input.as_bytes() {
        if is_unreserved(b) || (keep_slash && b == b'/') {
            out.push(b as char);
        } else {
            out.push('%');
            out.push(HEX_UPPER[usize::from(b >> 4)] as char);
            out.push(HEX_UPPER[usize::from(b & 0x0F)] as char);
        }
    }
    out
}

/// Encodes each pair, then sorts by encoded key and encoded value.
pub(crate) fn canonical_query_string(params: &[(String, String)]) -> String {
    let mut pairs = params
        .iter()
        .map(|(k, v)| (uri_encode(k), uri_encode(v)))
        .collect::<Vec<_>>();
    pairs.sort_unstable();

    pairs
        .iter()
        .map(|(k, v)| format!("{k}={v}"))
        .collect::<Vec<_>>()
        .join("&")
}
