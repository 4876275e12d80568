//! Common utility functions used across the pipeline

use std::path::Path;

/// Sanitize filename to be safe for all operating systems.
/// Converts the filename to lowercase and replaces special characters with underscores.
pub fn sanitize_filename(input: &str) -> String {
    let invalid_chars = ['/', '\\', ':', '*', '?', '"', '<', '>', '|', ' ', '\t'];
    let mut result = input.to_lowercase();
    for c in invalid_chars {
        result = result.replace(c, "_");
    }
    result
}

/// Check if a file exists and has valid content (non-zero size)
pub async fn check_file_exists_and_valid(path: &Path) -> bool {
    if let Ok(metadata) = tokio::fs::metadata(path).await {
        if metadata.is_file() && metadata.len() > 0 {
            return true;
        }
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_filename() {
        assert_eq!(sanitize_filename("Speaker One"), "speaker_one");
        assert_eq!(sanitize_filename("UPPERCASE"), "uppercase");
        assert_eq!(sanitize_filename("path/to/file"), "path_to_file");
        assert_eq!(sanitize_filename("name:with*chars?"), "name_with_chars_");
    }

    #[tokio::test]
    async fn test_missing_file_is_invalid() {
        assert!(!check_file_exists_and_valid(Path::new("/nonexistent/audio.mp3")).await);
    }

    #[tokio::test]
    async fn test_empty_file_is_invalid() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("empty.mp3");
        tokio::fs::write(&path, b"").await.unwrap();
        assert!(!check_file_exists_and_valid(&path).await);
    }

    #[tokio::test]
    async fn test_non_empty_file_is_valid() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("audio.mp3");
        tokio::fs::write(&path, b"data").await.unwrap();
        assert!(check_file_exists_and_valid(&path).await);
    }
}
