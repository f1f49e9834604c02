//! 애플리케이션 정의(메타데이터 + 명령 트리 + 실행 파라미터).

use crate::domain::command::{Command, Commands};
use crate::domain::error::ReplError;

pub const DEFAULT_TICK_MS: u64 = 50;

/// 프레임워크 실행 파라미터.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppParams {
    /// Debug 로그 이벤트 출력 여부.
    pub debug: bool,
    /// 색상 출력 비활성화.
    pub no_color: bool,
    /// 표시 루프의 주기 틱 간격(ms).
    pub tick_ms: u64,
}

impl Default for AppParams {
    fn default() -> Self {
        Self {
            debug: false,
            no_color: false,
            tick_ms: DEFAULT_TICK_MS,
        }
    }
}

#[derive(Debug, Default)]
pub struct App {
    pub name: String,
    pub usage: String,
    pub authors: Vec<String>,
    /// "YEAR-YEAR author" 형식.
    pub copyright: String,
    pub license: String,
    pub commands: Commands,
    pub params: AppParams,
}

impl App {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn usage(mut self, usage: impl Into<String>) -> Self {
        self.usage = usage.into();
        self
    }

    pub fn author(mut self, author: impl Into<String>) -> Self {
        self.authors.push(author.into());
        self
    }

    pub fn copyright(mut self, copyright: impl Into<String>) -> Self {
        self.copyright = copyright.into();
        self
    }

    pub fn license(mut self, license: impl Into<String>) -> Self {
        self.license = license.into();
        self
    }

    pub fn command(mut self, command: Command) -> Self {
        self.commands.push(command);
        self
    }

    pub fn params(mut self, params: AppParams) -> Self {
        self.params = params;
        self
    }

    /// 입력을 받기 전 명령 트리 정의를 검증한다.
    pub fn validate(&self) -> Result<(), ReplError> {
        self.commands.validate()
    }
}
