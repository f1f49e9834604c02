//! 프레임워크 실행 설정 스키마(순수 데이터).
//!
//! 주의: 파일/환경변수 접근은 `infrastructure`에서만 수행한다.

use serde::{Deserialize, Serialize};

use crate::domain::app::{AppParams, DEFAULT_TICK_MS};

pub const DEFAULT_PROMPT: &str = "> ";

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct Settings {
    /// Debug 로그 이벤트 출력 여부
    pub debug: Option<bool>,
    /// 색상 출력 비활성화
    pub no_color: Option<bool>,
    /// 표시 루프 틱 간격(ms)
    pub tick_ms: Option<u64>,
    /// REPL 입력 프롬프트 문자열
    pub prompt: Option<String>,
}

impl Settings {
    /// 후순위(나중 파일) 값으로 덮어쓰는 병합 규칙.
    pub fn merge_from(&mut self, other: Settings) {
        if other.debug.is_some() {
            self.debug = other.debug;
        }
        if other.no_color.is_some() {
            self.no_color = other.no_color;
        }
        if other.tick_ms.is_some() {
            self.tick_ms = other.tick_ms;
        }
        if other.prompt.is_some() {
            self.prompt = other.prompt;
        }
    }

    pub fn prompt(&self) -> &str {
        self.prompt.as_deref().unwrap_or(DEFAULT_PROMPT)
    }

    /// 실행 파라미터로 변환한다. 0 틱은 기본값으로 바꾼다.
    pub fn params(&self) -> AppParams {
        AppParams {
            debug: self.debug.unwrap_or(false),
            no_color: self.no_color.unwrap_or(false),
            tick_ms: self
                .tick_ms
                .filter(|ms| *ms > 0)
                .unwrap_or(DEFAULT_TICK_MS),
        }
    }
}
