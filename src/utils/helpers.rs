//! Helper functions and utilities
//!
//! This module contains common helper functions used throughout the application.

use url::Url;

/// Truncate text to a maximum number of characters with ellipsis.
/// Counts characters, not bytes, so multi-byte scripts never split.
pub fn truncate_text(text: &str, max_length: usize) -> String {
    if text.chars().count() <= max_length {
        text.to_string()
    } else {
        let cut: String = text.chars().take(max_length.saturating_sub(3)).collect();
        format!("{}...", cut)
    }
}

/// Extract the first HTTP(S) URL from free-form text
pub fn extract_first_url(text: &str) -> Option<Url> {
    text.split_whitespace()
        .filter(|word| word.starts_with("http://") || word.starts_with("https://"))
        .find_map(|word| Url::parse(word).ok())
}

/// Strip a leading "www." from a hostname
pub fn strip_www(host: &str) -> &str {
    host.strip_prefix("www.").unwrap_or(host)
}

/// Sanitize filename for safe storage
pub fn sanitize_filename(filename: &str) -> String {
    filename
        .chars()
        .map(|c| {
            if c.is_alphanumeric() || c == '.' || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect()
}

/// Convert bytes to human readable format
pub fn format_bytes(bytes: u64) -> String {
    const UNITS: &[&str] = &["B", "KB", "MB", "GB", "TB"];
    let mut size = bytes as f64;
    let mut unit_index = 0;

    while size >= 1024.0 && unit_index < UNITS.len() - 1 {
        size /= 1024.0;
        unit_index += 1;
    }

    if unit_index == 0 {
        format!("{} {}", bytes, UNITS[unit_index])
    } else {
        format!("{:.1} {}", size, UNITS[unit_index])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_text() {
        assert_eq!(truncate_text("hello", 10), "hello");
        assert_eq!(truncate_text("hello world", 8), "hello...");
    }

    #[test]
    fn test_extract_first_url() {
        let url = extract_first_url("check this https://youtube.com/watch?v=abc out");
        assert_eq!(url.unwrap().host_str(), Some("youtube.com"));
        assert!(extract_first_url("no links here").is_none());
    }

    #[test]
    fn test_strip_www() {
        assert_eq!(strip_www("www.tiktok.com"), "tiktok.com");
        assert_eq!(strip_www("tiktok.com"), "tiktok.com");
    }

    #[test]
    fn test_format_bytes() {
        assert_eq!(format_bytes(1024), "1.0 KB");
        assert_eq!(format_bytes(1048576), "1.0 MB");
        assert_eq!(format_bytes(500), "500 B");
    }

    #[test]
    fn test_sanitize_filename() {
        assert_eq!(sanitize_filename("my video (1).mp4"), "my_video__1_.mp4");
    }
}
