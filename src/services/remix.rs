//! Remix orchestration: drives one remix job from script or prepared audio
//! to the final concatenated video.
//!
//! A per-segment mux failure is not immediately fatal; the job degrades to
//! the first successful segment rather than failing outright. Only a job
//! with zero usable segments (or missing inputs) fails.

use crate::config::PipelineConfig;
use crate::errors::{AppError, AppResult};
use crate::models::RemixOutcome;
use crate::services::tts::Synthesizer;
use crate::services::video::concat::concatenate;
use crate::services::video::mux::mux_segment;
use crate::utils::common::check_file_exists_and_valid;
use path_clean::PathClean;
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;
use tempfile::TempDir;

/// Состояния задания сборки ремикса
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobState {
    Init,
    Synthesizing,
    Muxing,
    Concatenating,
    Done,
    Error,
}

impl fmt::Display for JobState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            JobState::Init => "INIT",
            JobState::Synthesizing => "SYNTHESIZING",
            JobState::Muxing => "MUXING",
            JobState::Concatenating => "CONCATENATING",
            JobState::Done => "DONE",
            JobState::Error => "ERROR",
        };
        write!(f, "{}", name)
    }
}

/// Решение после стадии мьюксинга
#[derive(Debug, PartialEq, Eq)]
enum MuxDecision {
    /// Все фрагменты готовы, можно конкатенировать
    Concatenate,
    /// Часть фрагментов потеряна: выдаём первый успешный
    CopyFirst,
    /// Ни одного фрагмента: задание провалено
    Fail,
}

fn decide(total: usize, succeeded: usize) -> MuxDecision {
    if succeeded == 0 {
        MuxDecision::Fail
    } else if succeeded == total {
        MuxDecision::Concatenate
    } else {
        MuxDecision::CopyFirst
    }
}

/// Site-relative ссылка на итоговое видео; используется и как
/// best-effort fallback при провале задания
pub fn fallback_video_url(remix_id: &str) -> String {
    format!("/videos/{}", output_filename(remix_id))
}

fn output_filename(remix_id: &str) -> String {
    format!("remix_{}.mp4", remix_id)
}

/// Привести site-relative путь аудиофайла к пути на диске.
/// Абсолютные и прочие пути проходят без изменений (но чистятся).
fn resolve_audio_path(static_dir: &Path, raw: &str) -> PathBuf {
    if let Some(stripped) = raw.strip_prefix("/voices/") {
        static_dir.join("voices").join(stripped).clean()
    } else {
        PathBuf::from(raw).clean()
    }
}

/// Одно задание сборки ремикса
pub struct RemixJob {
    config: Arc<PipelineConfig>,
    remix_id: String,
    state: JobState,
}

impl RemixJob {
    pub fn new(config: Arc<PipelineConfig>, remix_id: impl Into<String>) -> Self {
        Self {
            config,
            remix_id: remix_id.into(),
            state: JobState::Init,
        }
    }

    fn enter(&mut self, state: JobState) {
        log::info!("[remix {}] {} -> {}", self.remix_id, self.state, state);
        self.state = state;
    }

    /// Полный прогон: синтез всех реплик, затем сборка.
    pub async fn run_full(
        mut self,
        script: &BTreeMap<String, String>,
        api_key: Option<&str>,
    ) -> AppResult<RemixOutcome> {
        self.enter(JobState::Synthesizing);
        let synthesizer = Synthesizer::new(self.config.clone());
        self.config.ensure_dirs()?;
        let audio_files = synthesizer.synthesize_all(script, api_key).await?;
        self.assemble(audio_files.into_iter().collect()).await
    }

    /// Сборка ремикса из готовых аудиофайлов.
    pub async fn assemble(
        mut self,
        audio_files: HashMap<String, String>,
    ) -> AppResult<RemixOutcome> {
        let started = Instant::now();
        log::info!("Starting video processing for remix {}", self.remix_id);
        self.config.ensure_dirs()?;

        // Отсутствующий вход фатален для всего задания: без аудио
        // частичный прогон не предпринимается
        let resolved = self.resolve_inputs(&audio_files).await?;

        let scratch = tempfile::Builder::new()
            .prefix(&format!("remix_{}_", self.remix_id))
            .tempdir_in(self.config.scratch_dir())?;

        let result = self.assemble_in(&scratch, &resolved).await;

        // Рабочая директория убирается на любом исходе; неудача уборки
        // не меняет результат задания
        if let Err(e) = scratch.close() {
            log::warn!("Failed to remove job scratch dir: {}", e);
        }

        match &result {
            Ok(_) => {
                self.enter(JobState::Done);
                log::info!(
                    "Video processing completed in {:.2} seconds",
                    started.elapsed().as_secs_f64()
                );
            }
            Err(e) => {
                self.enter(JobState::Error);
                log::error!("Remix {} failed: {}", self.remix_id, e);
            }
        }

        result
    }

    /// Нормализация путей и проверка обязательных входов.
    async fn resolve_inputs(
        &self,
        audio_files: &HashMap<String, String>,
    ) -> AppResult<HashMap<String, PathBuf>> {
        let mut resolved = HashMap::new();

        for line_id in &self.config.line_order {
            let raw = audio_files.get(line_id).ok_or_else(|| {
                AppError::MissingInput(format!("no audio supplied for line '{}'", line_id))
            })?;
            let audio_path = resolve_audio_path(&self.config.static_dir, raw);
            if !check_file_exists_and_valid(&audio_path).await {
                return Err(AppError::MissingInput(format!(
                    "audio file not found: {}",
                    audio_path.display()
                )));
            }

            let clip = self.config.clip_asset(line_id);
            if !check_file_exists_and_valid(&clip).await {
                return Err(AppError::MissingInput(format!(
                    "video segment not found: {}",
                    clip.display()
                )));
            }

            resolved.insert(line_id.clone(), audio_path);
        }

        Ok(resolved)
    }

    async fn assemble_in(
        &mut self,
        scratch: &TempDir,
        audio: &HashMap<String, PathBuf>,
    ) -> AppResult<RemixOutcome> {
        self.enter(JobState::Muxing);

        let mut muxed: Vec<(String, PathBuf)> = Vec::new();
        let mut dropped: Vec<String> = Vec::new();

        for line_id in &self.config.line_order {
            let clip = self.config.clip_asset(line_id);
            let segment = scratch.path().join(format!("segment_{}.mp4", line_id));

            match mux_segment(&clip, &audio[line_id], &segment).await {
                Ok(()) => {
                    log::info!("Muxed segment for line '{}'", line_id);
                    muxed.push((line_id.clone(), segment));
                }
                Err(e) => {
                    log::error!("Mux failed for line '{}': {}", line_id, e);
                    dropped.push(line_id.clone());
                }
            }
        }

        let total = self.config.line_order.len();
        let output_path = self.config.videos_dir().join(output_filename(&self.remix_id));
        let video_url = fallback_video_url(&self.remix_id);

        match decide(total, muxed.len()) {
            MuxDecision::Fail => Err(AppError::Mux(
                "no segments could be muxed".to_string(),
            )),
            MuxDecision::CopyFirst => {
                let (first_line, first_segment) = &muxed[0];
                log::warn!(
                    "{} of {} segments failed; output degraded to first successful segment '{}'",
                    dropped.len(),
                    total,
                    first_line
                );
                tokio::fs::copy(first_segment, &output_path).await?;
                Ok(RemixOutcome::degraded(
                    video_url,
                    format!("segments failed to mux: {}", dropped.join(", ")),
                    dropped,
                ))
            }
            MuxDecision::Concatenate => {
                self.enter(JobState::Concatenating);
                let segments: Vec<PathBuf> =
                    muxed.iter().map(|(_, path)| path.clone()).collect();

                match concatenate(&segments, scratch.path(), &output_path).await {
                    Ok(()) => Ok(RemixOutcome::success(video_url)),
                    Err(e) => {
                        log::error!(
                            "Concatenation failed, falling back to first segment: {}",
                            e
                        );
                        tokio::fs::copy(&muxed[0].1, &output_path).await?;
                        let dropped_after_first: Vec<String> =
                            self.config.line_order[1..].to_vec();
                        Ok(RemixOutcome::degraded(
                            video_url,
                            format!("concatenation failed: {}", e),
                            dropped_after_first,
                        ))
                    }
                }
            }
        }
    }
}
