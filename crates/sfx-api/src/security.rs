//! Input validation and sanitization.

use url::Url;

/// Maximum URL length.
pub const MAX_URL_LENGTH: usize = 2048;

/// Maximum prompt length (characters).
pub const MAX_PROMPT_LENGTH: usize = 5000;

/// Validate a caller-supplied video URL.
///
/// Must be an absolute `http` or `https` URL with a host. Returns the trimmed
/// URL on success.
pub fn validate_video_url(url: &str) -> Result<String, String> {
    if url.len() > MAX_URL_LENGTH {
        return Err(format!("URL exceeds maximum length of {} characters", MAX_URL_LENGTH));
    }

    let url = url.trim();
    if url.is_empty() {
        return Err("URL cannot be empty".to_string());
    }

    let parsed = Url::parse(url).map_err(|e| format!("Invalid URL format: {}", e))?;

    match parsed.scheme() {
        "http" | "https" => {}
        scheme => {
            return Err(format!(
                "Invalid protocol '{}'. Only HTTP and HTTPS are allowed.",
                scheme
            ))
        }
    }

    if parsed.host_str().is_none() {
        return Err("URL must have a valid host".to_string());
    }

    Ok(url.to_string())
}

/// Strip control characters (except newline and tab) and cap the length.
pub fn sanitize_prompt(input: &str) -> String {
    input
        .chars()
        .filter(|c| !c.is_control() || *c == '\n' || *c == '\t')
        .take(MAX_PROMPT_LENGTH)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accepts_http_and_https() {
        assert_eq!(
            validate_video_url("  https://example.com/v.mp4 ").unwrap(),
            "https://example.com/v.mp4"
        );
        assert!(validate_video_url("http://127.0.0.1:8080/clip.mp4").is_ok());
    }

    #[test]
    fn test_rejects_other_schemes() {
        assert!(validate_video_url("ftp://example.com/v.mp4").is_err());
        assert!(validate_video_url("file:///etc/passwd").is_err());
    }

    #[test]
    fn test_rejects_garbage() {
        assert!(validate_video_url("").is_err());
        assert!(validate_video_url("not a url").is_err());
        assert!(validate_video_url(&format!("https://example.com/{}", "a".repeat(MAX_URL_LENGTH))).is_err());
    }

    #[test]
    fn test_sanitize_prompt() {
        assert_eq!(sanitize_prompt("make it\u{0007} stormy\n"), "make it stormy\n");
        assert_eq!(sanitize_prompt(&"x".repeat(MAX_PROMPT_LENGTH + 10)).len(), MAX_PROMPT_LENGTH);
    }
}
