use url::Url;

/// Whether the value is an absolute `http` or `https` URL.
#[must_use]
pub fn validate_http_url(value: &str) -> bool {
    Url::parse(value).is_ok_and(|url| matches!(url.scheme(), "http" | "https"))
}

#[cfg(test)]
mod tests {
    use super::validate_http_url;

    #[test]
    fn only_http_schemes() {
        assert!(validate_http_url("http://localhost:8000"));
        assert!(validate_http_url("https://api.example.com/v1/"));
        assert!(!validate_http_url("ftp://example.com"));
        assert!(!validate_http_url("localhost:8000/"));
        assert!(!validate_http_url("not a url"));
    }
}
