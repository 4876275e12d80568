//! CLI-вход конвейера voxmix.
//!
//! Три режима, каждый принимает один JSON-аргумент и печатает на stdout
//! ровно один JSON-документ; вся диагностика — в stderr.

use serde::Serialize;
use std::sync::Arc;
use voxmix::config::PipelineConfig;
use voxmix::errors::AppError;
use voxmix::models::{RemixOutcome, RemixRequest, SynthRequest};
use voxmix::services::remix::{fallback_video_url, RemixJob};
use voxmix::services::tts::Synthesizer;
use voxmix::services::video::bootstrap::ensure_placeholder_clips;
use voxmix::utils::logger;

#[derive(Serialize)]
struct ErrorResult {
    error: String,
}

#[derive(Serialize)]
struct BootstrapResult {
    created: Vec<String>,
}

/// Напечатать результат на stdout. Успешный канал несёт только
/// целиком сериализованный документ, без частичного вывода.
fn emit<T: Serialize>(value: &T) {
    match serde_json::to_string(value) {
        Ok(json) => println!("{}", json),
        Err(e) => {
            log::error!("Failed to encode result: {}", e);
            println!(r#"{{"error":"failed to encode result"}}"#);
        }
    }
}

fn emit_error(message: impl Into<String>) -> i32 {
    emit(&ErrorResult {
        error: message.into(),
    });
    1
}

fn parse_input<'a, T: serde::Deserialize<'a>>(raw: Option<&'a String>) -> Result<T, String> {
    let raw = raw.ok_or("Missing JSON input argument")?;
    serde_json::from_str(raw).map_err(|e| format!("Invalid JSON input: {}", e))
}

async fn synth_mode(raw: Option<&String>) -> i32 {
    let request: SynthRequest = match parse_input(raw) {
        Ok(request) => request,
        Err(e) => {
            eprintln!("Usage: voxmix synth '{{\"script\": {{...}}, \"apiKey\": \"...\"}}'");
            return emit_error(e);
        }
    };

    if request.script.is_empty() {
        return emit_error("Missing 'script' field in input");
    }

    let config = Arc::new(PipelineConfig::from_env());
    if let Err(e) = config.ensure_dirs() {
        return emit_error(format!("failed to prepare output directories: {}", e));
    }

    let synthesizer = Synthesizer::new(config);
    match synthesizer
        .synthesize_all(&request.script, request.api_key.as_deref())
        .await
    {
        Ok(artifacts) => {
            emit(&artifacts);
            0
        }
        Err(e) => emit_error(e.to_string()),
    }
}

async fn remix_mode(raw: Option<&String>) -> i32 {
    let request: RemixRequest = match parse_input(raw) {
        Ok(request) => request,
        Err(e) => {
            eprintln!(
                "Usage: voxmix remix '{{\"remixId\": \"123\", \"audioFiles\": {{...}}}}'"
            );
            return emit_error(e);
        }
    };

    let config = Arc::new(PipelineConfig::from_env());
    let job = RemixJob::new(config, &request.remix_id);

    let result = match (request.audio_files, request.script) {
        (Some(audio_files), _) => job.assemble(audio_files).await,
        (None, Some(script)) => job.run_full(&script, request.api_key.as_deref()).await,
        (None, None) => Err(AppError::Configuration(
            "either 'audioFiles' or 'script' must be provided".to_string(),
        )),
    };

    match result {
        Ok(outcome) => {
            emit(&outcome);
            0
        }
        Err(e) => {
            // Вызывающая сторона всегда получает путь, даже при провале
            let outcome = RemixOutcome::degraded(
                fallback_video_url(&request.remix_id),
                e.to_string(),
                Vec::new(),
            );
            emit(&outcome);
            1
        }
    }
}

async fn bootstrap_mode() -> i32 {
    let config = PipelineConfig::from_env();
    if let Err(e) = config.ensure_dirs() {
        return emit_error(format!("failed to prepare directories: {}", e));
    }

    match ensure_placeholder_clips(&config).await {
        Ok(created) => {
            emit(&BootstrapResult {
                created: created
                    .iter()
                    .map(|p| p.to_string_lossy().to_string())
                    .collect(),
            });
            0
        }
        Err(e) => emit_error(e.to_string()),
    }
}

#[tokio::main]
async fn main() {
    logger::init_logger();

    let args: Vec<String> = std::env::args().collect();
    let code = match args.get(1).map(String::as_str) {
        Some("synth") => synth_mode(args.get(2)).await,
        Some("remix") => remix_mode(args.get(2)).await,
        Some("bootstrap") => bootstrap_mode().await,
        _ => {
            eprintln!("Usage: voxmix <synth|remix|bootstrap> ['<json>']");
            emit_error("Missing or unknown mode")
        }
    };

    std::process::exit(code);
}
