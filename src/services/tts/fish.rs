//! Клиент удалённого сервиса синтеза речи.
//!
//! Потоковая загрузка аудиоответа сразу в файл, без буферизации в памяти.

use crate::errors::{AppError, AppResult};
use once_cell::sync::Lazy;
use reqwest::Client;
use serde::Serialize;
use std::path::Path;
use tokio::fs::File;
use tokio::io::AsyncWriteExt;

// HTTP client instance shared across requests
static HTTP_CLIENT: Lazy<Client> = Lazy::new(|| {
    Client::builder()
        .timeout(std::time::Duration::from_secs(300))
        .build()
        .expect("Failed to create HTTP client")
});

#[derive(Debug, Serialize)]
struct SpeechRequest<'a> {
    text: &'a str,
    reference_id: &'a str,
    format: &'a str,
    speaking_rate: f32,
}

/// Запросить синтез речи и сохранить аудиопоток в файл.
///
/// Возвращает размер записанного файла в байтах. Любая ошибка сети,
/// статуса или записи — ошибка попытки; решение о повторе принимает
/// вызывающая сторона.
pub async fn request_speech(
    api_url: &str,
    api_key: &str,
    voice_id: &str,
    text: &str,
    speaking_rate: f32,
    output: &Path,
) -> AppResult<u64> {
    let url = format!("{}/v1/tts", api_url.trim_end_matches('/'));
    let body = SpeechRequest {
        text,
        reference_id: voice_id,
        format: "mp3",
        speaking_rate,
    };

    log::debug!("Sending speech request for voice {} to {}", voice_id, url);
    let mut response = HTTP_CLIENT
        .post(&url)
        .header("Authorization", format!("Bearer {}", api_key))
        .json(&body)
        .send()
        .await?;

    let status = response.status();
    if !status.is_success() {
        let error_text = response
            .text()
            .await
            .unwrap_or_else(|_| "Unknown error".to_string());
        return Err(AppError::Synthesis(format!(
            "speech API request failed with status {}: {}",
            status, error_text
        )));
    }

    let mut file = File::create(output).await?;
    let mut written: u64 = 0;
    while let Some(chunk) = response.chunk().await? {
        file.write_all(&chunk).await?;
        written += chunk.len() as u64;
    }
    file.flush().await?;

    if written == 0 {
        return Err(AppError::Synthesis(
            "speech API returned an empty audio stream".to_string(),
        ));
    }

    log::debug!("Saved {} bytes of speech audio to {}", written, output.display());
    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_speech_request_serialization() {
        let request = SpeechRequest {
            text: "Hello",
            reference_id: "abc123",
            format: "mp3",
            speaking_rate: 1.5,
        };
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["text"], "Hello");
        assert_eq!(json["reference_id"], "abc123");
        assert_eq!(json["format"], "mp3");
    }
}
