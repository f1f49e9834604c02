//! 입력 한 줄의 전체 실행 유스케이스.
//!
//! 해석 → 바인딩 → 훅 실행(정방향, 역방향) → 전체 트리 값 초기화 순서로 진행하고,
//! 결과를 종료 이벤트 하나(성공 또는 분류된 실패)로 싱크에 보낸다.
//!
//! 훅이 대화형 입력을 쓰면 호출 스레드가 블로킹되므로, 비동기 환경에서는
//! `spawn_blocking` 위에서 `execute`를 불러야 한다.

mod flow;
mod hooks;

use std::ops::{Deref, DerefMut};

use tracing::{debug, info};

use crate::application::bridge::InteractiveBridge;
use crate::application::context::{Cancellation, Invocation, Memory};
use crate::application::parser::{Schemas, parse_line};
use crate::application::ports::{HelpRenderer, LogSink};
use crate::domain::app::App;
use crate::domain::command::Commands;
use crate::domain::error::ReplError;
use crate::domain::log::{LogEvent, LogKind};

pub use flow::{create_command_flow, insert_data_in_command};
pub use hooks::{run_actions, run_end};

/// 실행이 성공했을 때 어떤 경로로 끝났는지.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunOutcome {
    Completed,
    /// `--help`로 훅 대신 도움말을 출력했다.
    Help(String),
}

pub struct RunCommandUseCase<'a> {
    pub sink: &'a dyn LogSink,
    pub help_renderer: &'a dyn HelpRenderer,
    pub bridge: &'a InteractiveBridge,
}

impl RunCommandUseCase<'_> {
    /// 한 줄을 실행한다. 성공/실패와 무관하게 종료 이벤트는 정확히 하나 나간다.
    pub fn execute(
        &self,
        app: &mut App,
        line: &str,
        cancel: Cancellation,
    ) -> Result<RunOutcome, ReplError> {
        let debug_mode = app.params.debug;
        let result = self.run(&mut app.commands, line, cancel, debug_mode);

        match &result {
            Ok(RunOutcome::Help(text)) => {
                self.sink
                    .emit(LogEvent::new(LogKind::Message, line, text.as_str()));
                self.sink.emit(LogEvent::success(line));
            }
            Ok(RunOutcome::Completed) => {
                info!(command = line, "command finished");
                self.sink.emit(LogEvent::success(line));
            }
            Err(err) => {
                debug!(command = line, kind = %err.kind(), error = %err, "command failed");
                self.sink.emit(LogEvent::failure(line, err));
            }
        }
        result
    }

    fn run(
        &self,
        commands: &mut Commands,
        line: &str,
        cancel: Cancellation,
        debug_mode: bool,
    ) -> Result<RunOutcome, ReplError> {
        // 어느 단계에서 끝나든 drop 시점에 트리 전체 값을 비운다.
        let mut tree = ResetGuard::new(commands);

        let ast = parse_line(&Schemas::from_commands(&tree), line)?;
        let flow = create_command_flow(&mut tree, &ast)?;

        if let Some(leaf) = flow.last()
            && leaf.help_requested()
        {
            let text = self.help_renderer.render_command(leaf)?;
            return Ok(RunOutcome::Help(text));
        }

        let invocation = Invocation::new(self.sink, self.bridge, cancel, debug_mode);
        let mut memory = Memory::new();
        run_actions(&flow, &ast, &invocation, &mut memory)?;
        run_end(&flow, &ast, &invocation, &mut memory)?;
        Ok(RunOutcome::Completed)
    }
}

/// 명령 트리를 빌려 두고, drop될 때 모든 플래그/인자 값을 초기화한다.
struct ResetGuard<'a> {
    commands: &'a mut Commands,
}

impl<'a> ResetGuard<'a> {
    fn new(commands: &'a mut Commands) -> Self {
        Self { commands }
    }
}

impl Deref for ResetGuard<'_> {
    type Target = Commands;

    fn deref(&self) -> &Commands {
        self.commands
    }
}

impl DerefMut for ResetGuard<'_> {
    fn deref_mut(&mut self) -> &mut Commands {
        self.commands
    }
}

impl Drop for ResetGuard<'_> {
    fn drop(&mut self) {
        self.commands.clear_values();
    }
}
