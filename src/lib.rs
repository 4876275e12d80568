//! voxmix — сборка коротких ремикс-видео из фиксированных клипов
//! и синтезированных голосовых реплик.
//!
//! Конвейер: синтез речи для каждой реплики сценария (с повторами и
//! гарантированной деградацией до мокового аудио), мьюксинг каждого
//! фиксированного клипа с его аудио (с удержанием последнего кадра,
//! когда аудио длиннее), упорядоченная конкатенация в итоговый файл.

pub mod config;
pub mod errors;
pub mod models;
pub mod services;
pub mod utils;
