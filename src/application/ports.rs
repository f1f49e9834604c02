//! 애플리케이션 계층이 의존하는 포트(추상 인터페이스) 모음.

use anyhow::Result;
use async_trait::async_trait;

use crate::domain::command::Command;
use crate::domain::interactive::{InteractiveResponse, Prompt};
use crate::domain::log::LogEvent;
use crate::domain::App;

/// 로그 이벤트를 받아 표시/저장하는 싱크 포트.
pub trait LogSink: Send + Sync {
    fn emit(&self, event: LogEvent);
}

/// 명령/애플리케이션 도움말 문자열을 만드는 포트.
pub trait HelpRenderer: Send + Sync {
    fn render_command(&self, command: &Command) -> Result<String>;
    fn render_app(&self, app: &App) -> Result<String>;
}

/// 대화형 입력 화면(select-one, input-text, input-int, input-file, confirm) 포트.
#[async_trait]
pub trait Presenter: Send + Sync {
    async fn present(&self, prompt: Prompt) -> InteractiveResponse;
}
