//! Utility functions for string handling and file system checks.
//!
//! Helpers used across the pipeline:
//! - Filename-safe slugs for per-niche artifact names
//! - String truncation for logging response bodies
//! - File system validation for the results directory

use std::error::Error;
use std::fs as stdfs;
use tokio::fs;
use tracing::{info, instrument};

/// Make a niche keyword safe for use in artifact file names.
///
/// Matches the naming convention of the historical result archive: spaces
/// become underscores, everything else is kept verbatim.
///
/// # Examples
///
/// ```ignore
/// assert_eq!(file_slug("Restaurant Italien"), "Restaurant_Italien");
/// ```
pub fn file_slug(s: &str) -> String {
    s.replace(' ', "_")
}

/// Truncate a string for logging purposes.
///
/// Long strings (typically HTTP response bodies) are cut to at most `max`
/// characters with an ellipsis and byte count indicator appended. The cut
/// lands on a character boundary, so accented text in API error messages
/// cannot split a code point.
pub fn truncate_for_log(s: &str, max: usize) -> String {
    match s.char_indices().nth(max) {
        None => s.to_string(),
        Some((idx, _)) => format!("{}…(+{} bytes)", &s[..idx], s.len() - idx),
    }
}

/// Ensure a directory exists and is writable.
///
/// Creates the directory if it doesn't exist, then performs a write test
/// by creating and immediately deleting a probe file.
///
/// # Errors
///
/// Returns an error if the directory cannot be created or is not writable
/// (permission denied, read-only filesystem, etc.).
#[instrument(level = "info", skip_all, fields(path = %path))]
pub async fn ensure_writable_dir(path: &str) -> Result<(), Box<dyn Error>> {
    if let Err(e) = fs::create_dir_all(path).await {
        return Err(Box::new(e));
    }
    // Try a small sync write using std fs (simpler error surface)
    let probe_path = format!("{}/..__probe_write__", path.trim_end_matches('/'));
    match stdfs::File::create(&probe_path) {
        Ok(_) => {
            let _ = stdfs::remove_file(&probe_path);
            info!("Directory is writable");
            Ok(())
        }
        Err(e) => Err(Box::new(e)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_slug() {
        assert_eq!(file_slug("Restaurant"), "Restaurant");
        assert_eq!(file_slug("Restaurant Italien"), "Restaurant_Italien");
        assert_eq!(file_slug("a b c"), "a_b_c");
    }

    #[test]
    fn test_truncate_for_log_short_string() {
        assert_eq!(truncate_for_log("Hello, world!", 100), "Hello, world!");
    }

    #[test]
    fn test_truncate_for_log_long_string() {
        let s = "a".repeat(500);
        let result = truncate_for_log(&s, 100);
        assert!(result.starts_with(&"a".repeat(100)));
        assert!(result.contains("…(+400 bytes)"));
    }

    #[test]
    fn test_truncate_for_log_multibyte_boundary() {
        // é is two bytes in UTF-8; truncation must not split it.
        let s = "é".repeat(10);
        let result = truncate_for_log(&s, 4);
        assert!(result.starts_with("éééé"));
        assert!(result.contains("(+12 bytes)"));
    }

    #[tokio::test]
    async fn test_ensure_writable_dir_creates_missing() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("a/b");
        ensure_writable_dir(nested.to_str().unwrap()).await.unwrap();
        assert!(nested.is_dir());
    }
}
