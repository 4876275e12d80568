//! Моковый синтез речи: тихий аудиофайл вместо обращения к сервису.
//!
//! Длительность выводится из длины текста (примерно 3 символа в секунду),
//! контейнер тот же, что у настоящего синтеза, чтобы дальше по конвейеру
//! ветвление не требовалось.

use crate::errors::AppResult;
use std::path::Path;
use tokio::process::Command;

/// Длительность мокового аудио в миллисекундах: 333 мс на символ,
/// но не меньше одной секунды
pub fn mock_duration_ms(text: &str) -> u64 {
    (text.chars().count() as u64 * 333).max(1000)
}

fn silence_args(duration_secs: &str, output: &Path) -> Vec<String> {
    vec![
        "-f".to_string(),
        "lavfi".to_string(),
        "-i".to_string(),
        "anullsrc=r=44100:cl=mono".to_string(),
        "-t".to_string(),
        duration_secs.to_string(),
        "-q:a".to_string(),
        "9".to_string(),
        "-acodec".to_string(),
        "libmp3lame".to_string(),
        "-y".to_string(),
        output.to_string_lossy().to_string(),
    ]
}

/// Записать тихий MP3 указанной длительности.
///
/// Без ffmpeg в системе (или при его сбое) пишется пустой файл-заглушка:
/// проба длительности на нём вернёт 0 по мягкому пути отказа.
pub async fn write_silent_clip(duration_ms: u64, output: &Path) -> AppResult<()> {
    if which::which("ffmpeg").is_err() {
        log::warn!(
            "ffmpeg not available, writing empty placeholder {}",
            output.display()
        );
        tokio::fs::write(output, b"").await?;
        return Ok(());
    }

    let duration_secs = format!("{:.3}", duration_ms as f64 / 1000.0);
    let result = Command::new("ffmpeg")
        .args(silence_args(&duration_secs, output))
        .output()
        .await;

    match result {
        Ok(out) if out.status.success() => {
            log::debug!(
                "Generated {}s of silence at {}",
                duration_secs,
                output.display()
            );
            Ok(())
        }
        Ok(out) => {
            log::warn!(
                "ffmpeg failed to generate silence (status {}), writing empty placeholder",
                out.status
            );
            tokio::fs::write(output, b"").await?;
            Ok(())
        }
        Err(e) => {
            log::warn!(
                "ffmpeg could not be spawned ({}), writing empty placeholder",
                e
            );
            tokio::fs::write(output, b"").await?;
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_duration_floor_is_one_second() {
        assert_eq!(mock_duration_ms(""), 1000);
        assert_eq!(mock_duration_ms("A"), 1000);
        assert_eq!(mock_duration_ms("AB"), 1000);
    }

    #[test]
    fn test_duration_is_monotonic_in_text_length() {
        let short = mock_duration_ms("Nobody knows testing better.");
        let long = mock_duration_ms("Nobody knows testing better than anyone else around here.");
        assert!(long > short);
    }

    #[test]
    fn test_duration_rate() {
        // 10 символов по 333 мс
        let text = "0123456789";
        assert_eq!(mock_duration_ms(text), 3330);
    }

    #[test]
    fn test_silence_args_shape() {
        let args = silence_args("3.330", Path::new("/tmp/out.mp3"));
        assert_eq!(args[0], "-f");
        assert_eq!(args[1], "lavfi");
        assert!(args.contains(&"anullsrc=r=44100:cl=mono".to_string()));
        assert!(args.contains(&"3.330".to_string()));
        assert_eq!(args.last().unwrap(), "/tmp/out.mp3");
    }
}
