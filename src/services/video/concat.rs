//! Join muxed segments into a single video, in the exact order given.
//!
//! Uses the ffmpeg concat demuxer with an intermediate manifest; the
//! manifest is removed after use regardless of outcome. Order is the
//! contract: the narrative depends on it.

use crate::errors::{AppError, AppResult};
use std::io::Write;
use std::path::{Path, PathBuf};
use tokio::process::Command;

/// Записать манифест со списком файлов для concat-демьюксера.
/// Пути приводятся к абсолютным, порядок сохраняется.
fn write_manifest(segments: &[PathBuf], dir: &Path) -> AppResult<PathBuf> {
    let manifest_path = dir.join("concat_list.txt");
    let mut manifest = std::fs::File::create(&manifest_path)?;

    for segment in segments {
        let absolute = segment
            .canonicalize()
            .unwrap_or_else(|_| segment.clone());
        writeln!(manifest, "file '{}'", absolute.display())?;
    }

    Ok(manifest_path)
}

async fn run_concat(manifest: &Path, output: &Path) -> AppResult<()> {
    let result = Command::new("ffmpeg")
        .args([
            "-f",
            "concat",
            "-safe",
            "0",
            "-i",
        ])
        .arg(manifest)
        .args(["-c", "copy", "-y"])
        .arg(output)
        .output()
        .await
        .map_err(|e| AppError::Concat(format!("failed to spawn ffmpeg: {}", e)))?;

    if !result.status.success() {
        let stderr = String::from_utf8_lossy(&result.stderr);
        let tail: Vec<&str> = stderr.lines().rev().take(5).collect();
        log::error!(
            "ffmpeg concat failed: {}",
            tail.iter().rev().cloned().collect::<Vec<_>>().join(" | ")
        );
        return Err(AppError::Concat(format!(
            "ffmpeg exited with {} while concatenating segments",
            result.status
        )));
    }

    Ok(())
}

/// Concatenate `segments` into `output` without re-encoding.
///
/// Failure is reported, not retried; recovery policy lives in the
/// orchestrator.
pub async fn concatenate(
    segments: &[PathBuf],
    manifest_dir: &Path,
    output: &Path,
) -> AppResult<()> {
    if segments.is_empty() {
        return Err(AppError::Concat("no segments to concatenate".to_string()));
    }

    let manifest = write_manifest(segments, manifest_dir)?;
    let result = run_concat(&manifest, output).await;

    // Манифест — одноразовый артефакт
    if let Err(e) = std::fs::remove_file(&manifest) {
        log::warn!("Failed to remove concat manifest {}: {}", manifest.display(), e);
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_manifest_preserves_order() {
        let dir = TempDir::new().unwrap();
        let segments: Vec<PathBuf> = ["b.mp4", "a.mp4", "c.mp4"]
            .iter()
            .map(|name| {
                let path = dir.path().join(name);
                std::fs::write(&path, b"x").unwrap();
                path
            })
            .collect();

        let manifest = write_manifest(&segments, dir.path()).unwrap();
        let contents = std::fs::read_to_string(&manifest).unwrap();
        let lines: Vec<&str> = contents.lines().collect();

        assert_eq!(lines.len(), 3);
        assert!(lines[0].contains("b.mp4"));
        assert!(lines[1].contains("a.mp4"));
        assert!(lines[2].contains("c.mp4"));
    }

    #[test]
    fn test_manifest_lines_are_quoted_file_directives() {
        let dir = TempDir::new().unwrap();
        let segment = dir.path().join("segment_line1.mp4");
        std::fs::write(&segment, b"x").unwrap();

        let manifest = write_manifest(&[segment], dir.path()).unwrap();
        let contents = std::fs::read_to_string(&manifest).unwrap();

        assert!(contents.starts_with("file '"));
        assert!(contents.trim_end().ends_with("'"));
    }

    #[test]
    fn test_manifest_paths_are_absolute() {
        let dir = TempDir::new().unwrap();
        let segment = dir.path().join("segment_line1.mp4");
        std::fs::write(&segment, b"x").unwrap();

        let manifest = write_manifest(&[segment], dir.path()).unwrap();
        let contents = std::fs::read_to_string(&manifest).unwrap();
        let quoted = contents
            .trim_end()
            .trim_start_matches("file '")
            .trim_end_matches('\'');

        assert!(Path::new(quoted).is_absolute());
    }

    #[tokio::test]
    async fn test_empty_segment_list_is_an_error() {
        let dir = TempDir::new().unwrap();
        let output = dir.path().join("out.mp4");
        let result = concatenate(&[], dir.path(), &output).await;
        assert!(matches!(result, Err(AppError::Concat(_))));
    }
}
