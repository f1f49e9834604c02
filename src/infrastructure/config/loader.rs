//! 설정 파일 탐색/병합 로더.

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::debug;

use crate::application::config::Settings;

pub const CONFIG_ENV: &str = "REPLINE_CONFIG";
pub const DEBUG_ENV: &str = "REPLINE_DEBUG";
pub const NO_COLOR_ENV: &str = "NO_COLOR";

#[derive(Debug, Clone, Default)]
pub struct LoadedSettings {
    pub settings: Settings,
    pub searched_paths: Vec<PathBuf>,
    pub loaded_paths: Vec<PathBuf>,
}

/// 사용자 + 프로젝트 + 명시 경로 순으로 병합 경로를 구성한다.
pub fn settings_paths() -> Vec<PathBuf> {
    // 낮은 우선순위 -> 높은 우선순위 순서로 병합됨.
    let mut paths = Vec::new();

    if let Some(base) = dirs::config_dir() {
        paths.push(base.join("repline").join("settings.json"));
    }

    paths.push(PathBuf::from(".repline/settings.json"));

    if let Ok(path) = env::var(CONFIG_ENV) {
        paths.push(Path::new(&path).to_path_buf());
    }

    dedup_paths(paths)
}

/// 주어진 경로를 순서대로 병합하고 환경변수 값으로 마지막에 덮어쓴다.
/// 없는 파일은 건너뛰고, 있는데 읽거나 해석할 수 없는 파일은 오류다.
pub fn load_settings_from(
    paths: &[PathBuf],
    env_lookup: impl Fn(&str) -> Option<String>,
) -> Result<LoadedSettings> {
    let mut merged = Settings::default();
    let mut loaded_paths = Vec::new();

    for path in paths {
        if !path.exists() {
            continue;
        }

        let raw = fs::read_to_string(path)
            .with_context(|| format!("failed to read settings at {}", path.display()))?;
        let parsed: Settings = serde_json::from_str(&raw)
            .with_context(|| format!("failed to parse JSON in {}", path.display()))?;
        merged.merge_from(parsed);
        loaded_paths.push(path.to_path_buf());
    }

    merged.merge_from(env_overrides(env_lookup));
    debug!(loaded = ?loaded_paths, "settings loaded");

    Ok(LoadedSettings {
        settings: merged,
        searched_paths: paths.to_vec(),
        loaded_paths,
    })
}

fn env_overrides(env_lookup: impl Fn(&str) -> Option<String>) -> Settings {
    let debug = env_lookup(DEBUG_ENV).map(|value| is_truthy(&value));
    // NO_COLOR는 값과 무관하게 비어 있지 않으면 켠다.
    let no_color = env_lookup(NO_COLOR_ENV)
        .filter(|value| !value.is_empty())
        .map(|_| true);
    Settings {
        debug,
        no_color,
        ..Settings::default()
    }
}

fn is_truthy(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}

fn dedup_paths(paths: Vec<PathBuf>) -> Vec<PathBuf> {
    let mut out = Vec::new();
    for p in paths {
        if !out.contains(&p) {
            out.push(p);
        }
    }
    out
}
