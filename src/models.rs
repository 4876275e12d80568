//! Структуры данных для входа и выхода конвейера.
//!
//! Эти структуры составляют единственный машиночитаемый контракт с вызывающей
//! стороной: на stdout печатается ровно один JSON-документ.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::path::PathBuf;

/// Запрос пакетного синтеза речи
#[derive(Debug, Clone, Deserialize)]
pub struct SynthRequest {
    /// Сценарий: реплика -> текст
    pub script: BTreeMap<String, String>,
    /// API ключ сервиса синтеза (опционально)
    #[serde(rename = "apiKey")]
    pub api_key: Option<String>,
}

/// Запрос сборки ремикса
#[derive(Debug, Clone, Deserialize)]
pub struct RemixRequest {
    /// Идентификатор ремикса, используется только в именах файлов
    #[serde(rename = "remixId")]
    pub remix_id: String,
    /// Готовые аудиофайлы: реплика -> путь (абсолютный или site-relative)
    #[serde(rename = "audioFiles", default)]
    pub audio_files: Option<HashMap<String, String>>,
    /// Сценарий для полного прогона (синтез + сборка), если аудио ещё нет
    #[serde(default)]
    pub script: Option<BTreeMap<String, String>>,
    #[serde(rename = "apiKey", default)]
    pub api_key: Option<String>,
}

/// Результат сборки ремикса
#[derive(Debug, Clone, Serialize)]
pub struct RemixOutcome {
    /// Site-relative путь к итоговому видео; заполняется всегда,
    /// даже при сбое (см. fallback)
    #[serde(rename = "videoUrl")]
    pub video_url: String,
    /// Причина сбоя или деградации
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Реплики, фрагменты которых не вошли в результат
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub dropped: Vec<String>,
}

impl RemixOutcome {
    pub fn success(video_url: String) -> Self {
        Self {
            video_url,
            error: None,
            dropped: Vec::new(),
        }
    }

    pub fn degraded(video_url: String, error: String, dropped: Vec<String>) -> Self {
        Self {
            video_url,
            error: Some(error),
            dropped,
        }
    }
}

/// Сгенерированный или моковый аудиофайл
#[derive(Debug, Clone)]
pub struct AudioArtifact {
    /// Site-relative ссылка для вызывающей стороны
    pub url: String,
    /// Абсолютный путь на диске
    pub path: PathBuf,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_synth_request_from_json() {
        let raw = r#"{"script": {"line1": "Hello", "line2": "World"}, "apiKey": "key"}"#;
        let request: SynthRequest = serde_json::from_str(raw).unwrap();
        assert_eq!(request.script.len(), 2);
        assert_eq!(request.api_key.as_deref(), Some("key"));
    }

    #[test]
    fn test_remix_request_accepts_audio_files() {
        let raw = r#"{"remixId": "42", "audioFiles": {"line1": "/voices/a.mp3"}}"#;
        let request: RemixRequest = serde_json::from_str(raw).unwrap();
        assert_eq!(request.remix_id, "42");
        assert!(request.audio_files.is_some());
        assert!(request.script.is_none());
    }

    #[test]
    fn test_remix_request_accepts_script() {
        let raw = r#"{"remixId": "42", "script": {"line1": "Hi"}}"#;
        let request: RemixRequest = serde_json::from_str(raw).unwrap();
        assert!(request.audio_files.is_none());
        assert!(request.script.is_some());
    }

    #[test]
    fn test_outcome_omits_empty_fields() {
        let outcome = RemixOutcome::success("/videos/remix_42.mp4".to_string());
        let json = serde_json::to_string(&outcome).unwrap();
        assert_eq!(json, r#"{"videoUrl":"/videos/remix_42.mp4"}"#);
    }

    #[test]
    fn test_outcome_keeps_error_and_dropped() {
        let outcome = RemixOutcome::degraded(
            "/videos/remix_42.mp4".to_string(),
            "segment line2 failed".to_string(),
            vec!["line2".to_string()],
        );
        let json = serde_json::to_string(&outcome).unwrap();
        assert!(json.contains("\"error\""));
        assert!(json.contains("\"dropped\":[\"line2\"]"));
    }
}
