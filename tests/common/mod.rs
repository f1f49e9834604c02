#![allow(dead_code)]

use std::sync::Mutex;

use repline::application::bridge::InteractiveBridge;
use repline::application::context::Cancellation;
use repline::application::ports::LogSink;
use repline::application::usecases::run_command::{RunCommandUseCase, RunOutcome};
use repline::infrastructure::adapters::TextHelpRenderer;
use repline::{App, LogEvent, LogKind, ReplError};

#[derive(Default)]
pub struct Recorder(Mutex<Vec<LogEvent>>);

impl LogSink for Recorder {
    fn emit(&self, event: LogEvent) {
        self.0.lock().unwrap().push(event);
    }
}

impl Recorder {
    pub fn kinds(&self) -> Vec<LogKind> {
        self.0.lock().unwrap().iter().map(|event| event.kind).collect()
    }

    pub fn messages(&self) -> Vec<String> {
        self.0
            .lock()
            .unwrap()
            .iter()
            .map(|event| event.message.clone())
            .collect()
    }

    pub fn terminal_events(&self) -> usize {
        self.kinds().into_iter().filter(|kind| kind.is_terminal()).count()
    }
}

pub fn execute(
    app: &mut App,
    sink: &Recorder,
    bridge: &InteractiveBridge,
    line: &str,
) -> Result<RunOutcome, ReplError> {
    let renderer = TextHelpRenderer::plain();
    RunCommandUseCase {
        sink,
        help_renderer: &renderer,
        bridge,
    }
    .execute(app, line, Cancellation::new())
}

/// 트리 전체에 바인딩된 값이 하나도 없는지.
pub fn tree_is_clear(app: &App) -> bool {
    app.commands.commands_array().iter().all(|command| {
        command.flags.iter().all(|flag| flag.parsed_value().is_none())
            && command.arguments.iter().all(|arg| arg.value().is_empty())
    })
}
