//! Генерация цветных клипов-заглушек для недостающих видеофрагментов.
//!
//! Каждой реплике из настроенного порядка соответствует фиксированный
//! файл `clips/<line>.mp4`; отсутствующие рендерятся из lavfi-источника.

use crate::config::PipelineConfig;
use crate::errors::AppResult;
use crate::utils::common::check_file_exists_and_valid;
use std::path::{Path, PathBuf};
use tokio::process::Command;

const PALETTE: [&str; 4] = ["red", "blue", "orange", "teal"];
const CLIP_SECONDS: u32 = 6;

fn color_clip_args(color: &str, seconds: u32, output: &Path) -> Vec<String> {
    vec![
        "-f".to_string(),
        "lavfi".to_string(),
        "-i".to_string(),
        format!("color=c={}:s=640x360:d={}", color, seconds),
        "-r".to_string(),
        "24".to_string(),
        "-c:v".to_string(),
        "libx264".to_string(),
        "-pix_fmt".to_string(),
        "yuv420p".to_string(),
        "-y".to_string(),
        output.to_string_lossy().to_string(),
    ]
}

/// Создать заглушки для всех реплик без готового клипа.
/// Возвращает пути созданных файлов.
pub async fn ensure_placeholder_clips(config: &PipelineConfig) -> AppResult<Vec<PathBuf>> {
    let mut created = Vec::new();

    for (index, line_id) in config.line_order.iter().enumerate() {
        let path = config.clip_asset(line_id);
        if check_file_exists_and_valid(&path).await {
            log::debug!("Clip {} already exists, skipping", path.display());
            continue;
        }

        let color = PALETTE[index % PALETTE.len()];
        log::info!("Rendering placeholder clip {} ({})", path.display(), color);

        let result = Command::new("ffmpeg")
            .args(color_clip_args(color, CLIP_SECONDS, &path))
            .output()
            .await
            .map_err(|e| anyhow::anyhow!("failed to spawn ffmpeg: {}", e))?;

        if !result.status.success() {
            return Err(anyhow::anyhow!(
                "ffmpeg exited with {} while rendering {}",
                result.status,
                path.display()
            )
            .into());
        }

        created.push(path);
    }

    Ok(created)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_color_clip_args_shape() {
        let args = color_clip_args("red", 6, Path::new("/clips/line1.mp4"));
        assert_eq!(args[0], "-f");
        assert_eq!(args[1], "lavfi");
        assert!(args.contains(&"color=c=red:s=640x360:d=6".to_string()));
        assert_eq!(args.last().unwrap(), "/clips/line1.mp4");
    }

    #[test]
    fn test_palette_cycles() {
        assert_eq!(PALETTE[0 % PALETTE.len()], "red");
        assert_eq!(PALETTE[4 % PALETTE.len()], "red");
        assert_eq!(PALETTE[5 % PALETTE.len()], "blue");
    }
}
