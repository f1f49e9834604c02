//! 실행 설정(JSON) 로딩/병합 모듈.
//! 여러 경로의 설정을 우선순위대로 병합한 뒤 환경변수로 덮어쓴다.

mod loader;

use anyhow::Result;

pub use loader::{LoadedSettings, load_settings_from, settings_paths};

/// 병합된 최종 설정을 로딩한다.
pub fn load_settings() -> Result<LoadedSettings> {
    load_settings_from(&settings_paths(), |key| std::env::var(key).ok())
}
