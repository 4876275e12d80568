//! Combine one fixed video clip with one voice line into a muxed segment.
//!
//! The visual track is reconciled with the audio duration: when the audio
//! runs longer, the clip's last frame is held for the difference so the
//! visual length matches the audio exactly; otherwise the video stream is
//! copied as-is and the output stops at audio end.

use crate::errors::{AppError, AppResult};
use crate::services::probe::media_duration;
use std::path::Path;
use tokio::process::Command;

fn mux_args(
    video: &Path,
    audio: &Path,
    output: &Path,
    video_duration: f64,
    audio_duration: f64,
) -> Vec<String> {
    let mut args = vec![
        "-y".to_string(),
        "-i".to_string(),
        video.to_string_lossy().to_string(),
        "-i".to_string(),
        audio.to_string_lossy().to_string(),
    ];

    if audio_duration > video_duration {
        // Frame-hold extension: clone the last frame for the delta so the
        // visual track covers the whole audio
        let delta = audio_duration - video_duration;
        args.extend(
            [
                "-filter_complex".to_string(),
                format!("[0:v]tpad=stop_mode=clone:stop_duration={:.3}[v]", delta),
                "-map".to_string(),
                "[v]".to_string(),
                "-map".to_string(),
                "1:a".to_string(),
                "-c:v".to_string(),
                "libx264".to_string(),
                "-pix_fmt".to_string(),
                "yuv420p".to_string(),
                "-c:a".to_string(),
                "aac".to_string(),
            ],
        );
    } else {
        args.extend(
            [
                "-map".to_string(),
                "0:v".to_string(),
                "-map".to_string(),
                "1:a".to_string(),
                "-c:v".to_string(),
                "copy".to_string(),
                "-c:a".to_string(),
                "aac".to_string(),
                "-shortest".to_string(),
            ],
        );
    }

    args.push(output.to_string_lossy().to_string());
    args
}

/// Mux a video asset with an audio artifact into `output`.
///
/// Reports failure to the caller; retrying is not this function's job.
/// Neither input file is mutated.
pub async fn mux_segment(video: &Path, audio: &Path, output: &Path) -> AppResult<()> {
    let video_duration = media_duration(video);
    let audio_duration = media_duration(audio);

    log::info!(
        "Muxing {} ({:.2}s) with {} ({:.2}s)",
        video.display(),
        video_duration,
        audio.display(),
        audio_duration
    );

    let args = mux_args(video, audio, output, video_duration, audio_duration);
    log::debug!("ffmpeg {}", args.join(" "));

    let result = Command::new("ffmpeg")
        .args(&args)
        .output()
        .await
        .map_err(|e| AppError::Mux(format!("failed to spawn ffmpeg: {}", e)))?;

    if !result.status.success() {
        let stderr = String::from_utf8_lossy(&result.stderr);
        let tail: Vec<&str> = stderr.lines().rev().take(5).collect();
        log::error!(
            "ffmpeg mux failed for {}: {}",
            video.display(),
            tail.iter().rev().cloned().collect::<Vec<_>>().join(" | ")
        );
        return Err(AppError::Mux(format!(
            "ffmpeg exited with {} while muxing {}",
            result.status,
            video.display()
        )));
    }

    Ok(())
}
