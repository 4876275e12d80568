//! Определение длительности медиафайла через ffprobe.

use std::path::Path;
use std::process::Command;

/// Получить длительность медиафайла в секундах.
///
/// Мягкий отказ: если длительность определить не удалось (нет файла,
/// повреждённый контейнер, отсутствует ffprobe), возвращается `0.0` —
/// дальше по конвейеру это означает "видео не требует удлинения".
pub fn media_duration(path: &Path) -> f64 {
    let output = match Command::new("ffprobe")
        .args([
            "-v",
            "error",
            "-show_entries",
            "format=duration",
            "-of",
            "default=noprint_wrappers=1:nokey=1",
        ])
        .arg(path)
        .output()
    {
        Ok(output) => output,
        Err(e) => {
            log::warn!("ffprobe failed to start for {}: {}", path.display(), e);
            return 0.0;
        }
    };

    if !output.status.success() {
        log::warn!(
            "ffprobe exited with {} for {}",
            output.status,
            path.display()
        );
        return 0.0;
    }

    let duration_str = String::from_utf8_lossy(&output.stdout);
    match duration_str.trim().parse::<f64>() {
        Ok(duration) if duration >= 0.0 => duration,
        Ok(duration) => {
            log::warn!(
                "ffprobe reported negative duration {} for {}",
                duration,
                path.display()
            );
            0.0
        }
        Err(_) => {
            log::warn!(
                "failed to parse ffprobe duration '{}' for {}",
                duration_str.trim(),
                path.display()
            );
            0.0
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_probes_as_zero() {
        // Независимо от наличия ffprobe в системе результат один
        let duration = media_duration(Path::new("/nonexistent/clip.mp4"));
        assert_eq!(duration, 0.0);
    }
}
