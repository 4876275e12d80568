//! Синтез речи для реплик сценария.
//!
//! Удалённый синтез с ограниченным числом попыток и гарантированной
//! деградацией до мокового тихого аудио: сбой синтеза никогда не фатален
//! для вызывающей стороны.

pub mod fish;
pub mod mock;

use crate::config::PipelineConfig;
use crate::errors::{AppError, AppResult};
use crate::models::AudioArtifact;
use crate::utils::common::sanitize_filename;
use futures::future::join_all;
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::sync::Semaphore;
use uuid::Uuid;

/// Исход одной попытки удалённого синтеза
#[derive(Debug)]
pub enum Attempt {
    /// Попытка удалась
    Success(AudioArtifact),
    /// Попытка не удалась, попытки ещё остались
    Retry { reason: String },
    /// Попытки исчерпаны, дальше — моковый синтез
    ExhaustedFallback { reason: String },
}

/// Классифицировать результат попытки по номеру и лимиту.
///
/// Ожидаемые исходы (ошибка провайдера, неправдоподобный файл) не
/// раскручивают стек: решение о повторе — явное значение, не исключение.
fn classify_attempt(
    attempt: u32,
    max_retries: u32,
    result: Result<AudioArtifact, String>,
) -> Attempt {
    match result {
        Ok(artifact) => Attempt::Success(artifact),
        Err(reason) if attempt < max_retries => Attempt::Retry { reason },
        Err(reason) => Attempt::ExhaustedFallback { reason },
    }
}

/// Обрезать текст до лимита: первые `max_len - 3` символа плюс многоточие.
/// Текст в пределах лимита возвращается без изменений.
pub fn truncate_for_tts(text: &str, max_len: usize) -> String {
    if text.chars().count() <= max_len {
        return text.to_string();
    }
    log::warn!(
        "Text too long ({} chars), truncating to {}",
        text.chars().count(),
        max_len
    );
    let mut truncated: String = text.chars().take(max_len.saturating_sub(3)).collect();
    truncated.push_str("...");
    truncated
}

/// Уникальное имя аудиофайла для персонажа
fn artifact_filename(character: &str) -> String {
    let file_id = Uuid::new_v4().simple().to_string();
    format!("{}_{}.mp3", sanitize_filename(character), &file_id[..8])
}

/// Синтезатор речи, привязанный к конфигурации конвейера
#[derive(Clone)]
pub struct Synthesizer {
    config: Arc<PipelineConfig>,
}

impl Synthesizer {
    pub fn new(config: Arc<PipelineConfig>) -> Self {
        Self { config }
    }

    /// Синтезировать одну реплику персонажа.
    ///
    /// Без API ключа или голосовой модели сразу используется моковый путь.
    /// Удалённый путь повторяется до `max_retries` раз; после исчерпания
    /// попыток результатом становится моковое аудио, не ошибка.
    pub async fn synthesize(
        &self,
        character: &str,
        text: &str,
        api_key: Option<&str>,
    ) -> AppResult<AudioArtifact> {
        let (api_key, voice_id) = match (api_key, self.config.voice_id(character)) {
            (Some(key), Some(voice_id)) if !key.trim().is_empty() => (key, voice_id),
            _ => {
                log::warn!(
                    "No speech credentials or voice model for '{}', using mock synthesis",
                    character
                );
                return self.synthesize_mock(character, text).await;
            }
        };

        // Усечение касается только удалённого пути: провайдер не принимает
        // длинные реплики; исчерпание попыток озвучивает уже усечённый текст
        let text = truncate_for_tts(text, self.config.max_text_len);

        let max_retries = self.config.max_retries.max(1);
        let mut attempt = 1;
        loop {
            log::info!(
                "Generating speech for {}: '{}' (attempt {}/{})",
                character,
                text,
                attempt,
                max_retries
            );
            let result = self.attempt_remote(character, &text, api_key, voice_id).await;
            match classify_attempt(attempt, max_retries, result) {
                Attempt::Success(artifact) => {
                    log::info!("Speech audio saved to {}", artifact.path.display());
                    return Ok(artifact);
                }
                Attempt::Retry { reason } => {
                    log::warn!("Speech attempt {} failed, retrying: {}", attempt, reason);
                    attempt += 1;
                }
                Attempt::ExhaustedFallback { reason } => {
                    log::warn!(
                        "All speech generation attempts failed ({}), using mock synthesis",
                        reason
                    );
                    break;
                }
            }
        }

        self.synthesize_mock(character, &text).await
    }

    /// Одна попытка удалённого синтеза с проверкой правдоподобия.
    async fn attempt_remote(
        &self,
        character: &str,
        text: &str,
        api_key: &str,
        voice_id: &str,
    ) -> Result<AudioArtifact, String> {
        let filename = artifact_filename(character);
        let output = self.config.voices_dir().join(&filename);

        let size = fish::request_speech(
            &self.config.speech_api_url,
            api_key,
            voice_id,
            text,
            self.config.speaking_rate,
            &output,
        )
        .await
        .map_err(|e| e.to_string())?;

        // Проверка правдоподобия: слишком большой файл для короткой фразы
        // означает сбой провайдера, такой результат отбрасывается
        if size > self.config.suspect_size_bytes
            && text.chars().count() < self.config.short_text_len
        {
            if let Err(e) = tokio::fs::remove_file(&output).await {
                log::warn!("Failed to remove suspect audio {}: {}", output.display(), e);
            }
            return Err(format!(
                "generated audio is suspiciously large ({} bytes) for a short phrase",
                size
            ));
        }

        Ok(AudioArtifact {
            url: format!("/voices/{}", filename),
            path: output,
        })
    }

    /// Моковый синтез: тихий файл с длительностью по длине текста.
    pub async fn synthesize_mock(&self, character: &str, text: &str) -> AppResult<AudioArtifact> {
        let filename = artifact_filename(character);
        let output = self.config.voices_dir().join(&filename);

        mock::write_silent_clip(mock::mock_duration_ms(text), &output).await?;
        log::info!(
            "Generated mock speech audio for '{}' at {}",
            text,
            output.display()
        );

        Ok(AudioArtifact {
            url: format!("/voices/{}", filename),
            path: output,
        })
    }

    /// Синтезировать все реплики сценария.
    ///
    /// Реплики независимы и обрабатываются с ограниченным параллелизмом;
    /// результат — карта реплика -> site-relative путь аудиофайла.
    pub async fn synthesize_all(
        &self,
        script: &BTreeMap<String, String>,
        api_key: Option<&str>,
    ) -> AppResult<BTreeMap<String, String>> {
        let semaphore = Arc::new(Semaphore::new(self.config.max_concurrent_requests.max(1)));
        let api_key: Option<Arc<str>> = api_key.map(Arc::from);

        let mut tasks = Vec::new();
        for (line_id, text) in script {
            let synthesizer = self.clone();
            let semaphore = semaphore.clone();
            let api_key = api_key.clone();
            let line_id = line_id.clone();
            let text = text.clone();

            tasks.push(tokio::spawn(async move {
                let _permit = semaphore.acquire().await.unwrap();
                let character = synthesizer.config.character_for(&line_id).to_string();
                let result = synthesizer
                    .synthesize(&character, &text, api_key.as_deref())
                    .await;
                (line_id, result)
            }));
        }

        let mut artifacts = BTreeMap::new();
        for joined in join_all(tasks).await {
            let (line_id, result) = joined
                .map_err(|e| AppError::Synthesis(format!("synthesis task failed: {}", e)))?;
            artifacts.insert(line_id, result?.url);
        }

        Ok(artifacts)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn artifact() -> AudioArtifact {
        AudioArtifact {
            url: "/voices/speaker_a_12345678.mp3".to_string(),
            path: PathBuf::from("static/voices/speaker_a_12345678.mp3"),
        }
    }

    #[test]
    fn test_truncate_keeps_short_text() {
        let text = "a".repeat(200);
        assert_eq!(truncate_for_tts(&text, 200), text);
    }

    #[test]
    fn test_truncate_long_text_to_exact_limit() {
        let text = "a".repeat(201);
        let truncated = truncate_for_tts(&text, 200);
        assert_eq!(truncated.chars().count(), 200);
        assert!(truncated.ends_with("..."));
        assert_eq!(&truncated[..197], &"a".repeat(197));
    }

    #[test]
    fn test_truncate_never_splits_multibyte() {
        // Кириллица: по символам, не по байтам
        let text = "ё".repeat(250);
        let truncated = truncate_for_tts(&text, 200);
        assert_eq!(truncated.chars().count(), 200);
        assert!(truncated.ends_with("..."));
    }

    #[test]
    fn test_classify_success() {
        match classify_attempt(1, 2, Ok(artifact())) {
            Attempt::Success(_) => {}
            other => panic!("expected Success, got {:?}", other),
        }
    }

    #[test]
    fn test_classify_retry_when_attempts_remain() {
        match classify_attempt(1, 2, Err("provider error".to_string())) {
            Attempt::Retry { reason } => assert_eq!(reason, "provider error"),
            other => panic!("expected Retry, got {:?}", other),
        }
    }

    #[test]
    fn test_classify_exhausted_on_last_attempt() {
        match classify_attempt(2, 2, Err("still failing".to_string())) {
            Attempt::ExhaustedFallback { reason } => assert_eq!(reason, "still failing"),
            other => panic!("expected ExhaustedFallback, got {:?}", other),
        }
    }

    #[test]
    fn test_artifact_filenames_are_unique() {
        let first = artifact_filename("speaker_a");
        let second = artifact_filename("speaker_a");
        assert_ne!(first, second);
        assert!(first.starts_with("speaker_a_"));
        assert!(first.ends_with(".mp3"));
    }

    #[test]
    fn test_artifact_filename_sanitizes_character() {
        let name = artifact_filename("Speaker One");
        assert!(name.starts_with("speaker_one_"));
    }

    #[tokio::test]
    async fn test_batch_without_credentials_resolves_every_line_via_mock() {
        let dir = tempfile::TempDir::new().unwrap();
        let mut config = PipelineConfig::default();
        config.static_dir = dir.path().to_path_buf();
        config.ensure_dirs().unwrap();
        let voices_dir = config.voices_dir();
        let synthesizer = Synthesizer::new(Arc::new(config));

        let script: BTreeMap<String, String> = [
            ("line1", "A"),
            ("line2", "B"),
            ("line3", "C"),
            ("line4", "D"),
        ]
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();

        let artifacts = synthesizer.synthesize_all(&script, None).await.unwrap();

        assert_eq!(artifacts.len(), 4);
        let distinct: std::collections::HashSet<&String> = artifacts.values().collect();
        assert_eq!(distinct.len(), 4);
        for url in artifacts.values() {
            assert!(url.starts_with("/voices/"));
            let on_disk = voices_dir.join(url.trim_start_matches("/voices/"));
            assert!(on_disk.exists(), "artifact missing: {}", on_disk.display());
        }
    }
}
