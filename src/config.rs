//! Модуль конфигурации конвейера voxmix
//!
//! Этот модуль содержит структуру настроек: раскладку статических директорий,
//! порядок реплик, соответствие реплик персонажам и голосовым моделям.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;

/// Конфигурация конвейера сборки ремикса
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Корневая директория статических файлов
    pub static_dir: PathBuf,
    /// Порядок реплик в итоговом видео (значим для конкатенации)
    pub line_order: Vec<String>,
    /// Соответствие реплики персонажу (несколько реплик могут делить персонажа)
    pub characters: HashMap<String, String>,
    /// Соответствие персонажа идентификатору голосовой модели
    pub voices: HashMap<String, String>,
    /// Базовый URL сервиса синтеза речи
    pub speech_api_url: String,
    /// Максимальное число попыток удалённого синтеза
    pub max_retries: u32,
    /// Максимальная длина текста реплики (символов)
    pub max_text_len: usize,
    /// Порог "короткого" текста для проверки правдоподобия (символов)
    pub short_text_len: usize,
    /// Порог подозрительного размера аудиофайла (байт)
    pub suspect_size_bytes: u64,
    /// Темп речи для удалённого синтеза
    pub speaking_rate: f32,
    /// Максимальное количество одновременных запросов к API
    pub max_concurrent_requests: usize,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        let mut characters = HashMap::new();
        characters.insert("line1".to_string(), "speaker_a".to_string());
        characters.insert("line2".to_string(), "speaker_b".to_string());
        characters.insert("line3".to_string(), "speaker_a".to_string());
        characters.insert("line4".to_string(), "speaker_c".to_string());

        let mut voices = HashMap::new();
        voices.insert(
            "speaker_a".to_string(),
            "4f1c9a77d2be4e0583a61f30c85d12aa".to_string(),
        );
        voices.insert(
            "speaker_b".to_string(),
            "b93e4d0a216f47d89c5b7e024fa8c311".to_string(),
        );
        voices.insert(
            "speaker_c".to_string(),
            "7da02c5e98b14f6fb3d41a9c60e2f584".to_string(),
        );

        Self {
            static_dir: PathBuf::from("static"),
            line_order: vec![
                "line1".to_string(),
                "line2".to_string(),
                "line3".to_string(),
                "line4".to_string(),
            ],
            characters,
            voices,
            speech_api_url: "https://api.fish.audio".to_string(),
            max_retries: 2,
            max_text_len: 200,
            short_text_len: 100,
            suspect_size_bytes: 200_000,
            speaking_rate: 1.5,
            max_concurrent_requests: 4,
        }
    }
}

impl PipelineConfig {
    /// Создать конфигурацию с учётом переменных окружения
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Ok(dir) = std::env::var("VOXMIX_STATIC_DIR") {
            config.static_dir = PathBuf::from(dir);
        }
        if let Ok(url) = std::env::var("VOXMIX_SPEECH_API_URL") {
            config.speech_api_url = url;
        }
        config
    }

    /// Директория сгенерированных аудиофайлов
    pub fn voices_dir(&self) -> PathBuf {
        self.static_dir.join("voices")
    }

    /// Директория итоговых видео
    pub fn videos_dir(&self) -> PathBuf {
        self.static_dir.join("videos")
    }

    /// Директория фиксированных видеофрагментов
    pub fn clips_dir(&self) -> PathBuf {
        self.static_dir.join("clips")
    }

    /// Рабочая директория для временных файлов заданий
    pub fn scratch_dir(&self) -> PathBuf {
        self.static_dir.join("tmp")
    }

    /// Путь к фиксированному видеофрагменту для реплики
    pub fn clip_asset(&self, line_id: &str) -> PathBuf {
        self.clips_dir().join(format!("{}.mp4", line_id))
    }

    /// Персонаж для реплики; реплика без записи в карте считается
    /// собственным персонажем
    pub fn character_for<'a>(&'a self, line_id: &'a str) -> &'a str {
        self.characters
            .get(line_id)
            .map(String::as_str)
            .unwrap_or(line_id)
    }

    /// Идентификатор голосовой модели персонажа, если задан
    pub fn voice_id(&self, character: &str) -> Option<&str> {
        self.voices.get(character).map(String::as_str)
    }

    /// Создать все выходные директории, если их ещё нет
    pub fn ensure_dirs(&self) -> std::io::Result<()> {
        for dir in [
            self.voices_dir(),
            self.videos_dir(),
            self.clips_dir(),
            self.scratch_dir(),
        ] {
            std::fs::create_dir_all(&dir)?;
        }
        Ok(())
    }
}
