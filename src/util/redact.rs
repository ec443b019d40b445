const REDACTED: &str = "<redacted>";

/// Keeps the first and last four characters of long values.
pub(crate) fn redact_value(value: &str) -> String {
    let chars = value.trim().chars().collect::<Vec<_>>();
    if chars.len() <= 8 {
        return REDACTED.to_string();
    }

    let head = chars[..4].iter().collect::<String>();
    let tail = chars[chars.len() - 4..].iter().collect::<String>();
    format!("{head}...{tail}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_values_are_fully_hidden() {
        assert_eq!(redact_value(""), REDACTED);
        assert_eq!(redact_value("   "), REDACTED);
        assert_eq!(redact_value("12345678"), REDACTED);
        assert_eq!(redact_value("123456789"), "1234...6789");
    }
}
