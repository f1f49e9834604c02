//! 훅에 전달되는 실행 컨텍스트.
//!
//! 컨텍스트는 명령 하나, 해석된 AST, 실행 한 번 동안 공유되는 환경(`Invocation`)을
//! 묶는다. 메모리 맵은 같은 실행의 모든 훅이 함께 쓰고, 실행이 끝나면 버려진다.

mod cancel;
mod exec;

use std::collections::HashMap;
use std::fmt;
use std::time::{Duration, Instant};

use chrono::{DateTime, Local};
use serde::Serialize;
use serde_json::Value;
use tokio::runtime::Handle;

use crate::application::bridge::InteractiveBridge;
use crate::application::ports::LogSink;
use crate::domain::ast::Ast;
use crate::domain::command::Command;
use crate::domain::interactive::{
    ConfirmParams, InputFileParams, InputFileResult, InputIntParams, InputTextParams,
    InteractiveError, SelectOneParams, SelectOneResult,
};
use crate::domain::log::{LogEvent, LogKind};

pub use cancel::Cancellation;
pub use exec::ExecOutput;

/// 훅 사이에서 값을 넘기는 실행 단위 메모리.
pub type Memory = HashMap<String, Value>;

/// 실행 한 번 동안 모든 컨텍스트가 공유하는 환경.
pub struct Invocation<'a> {
    pub(crate) sink: &'a dyn LogSink,
    pub(crate) bridge: &'a InteractiveBridge,
    pub(crate) cancel: Cancellation,
    pub(crate) debug: bool,
    pub(crate) runtime: Option<Handle>,
    started_at: DateTime<Local>,
    started: Instant,
}

impl<'a> Invocation<'a> {
    pub fn new(
        sink: &'a dyn LogSink,
        bridge: &'a InteractiveBridge,
        cancel: Cancellation,
        debug: bool,
    ) -> Self {
        Self {
            sink,
            bridge,
            cancel,
            debug,
            runtime: Handle::try_current().ok(),
            started_at: Local::now(),
            started: Instant::now(),
        }
    }
}

pub struct Context<'a> {
    command: &'a Command,
    ast: &'a Ast,
    invocation: &'a Invocation<'a>,
    memory: &'a mut Memory,
}

impl<'a> Context<'a> {
    pub(crate) fn new(
        command: &'a Command,
        ast: &'a Ast,
        invocation: &'a Invocation<'a>,
        memory: &'a mut Memory,
    ) -> Self {
        Self {
            command,
            ast,
            invocation,
            memory,
        }
    }

    /// 이 컨텍스트가 묶인 명령 이름.
    pub fn name(&self) -> &str {
        &self.command.name
    }

    pub fn command(&self) -> &Command {
        self.command
    }

    /// 최상위부터 말단까지 해석된 명령 경로.
    pub fn command_name_tree(&self) -> &[String] {
        &self.ast.command_tree
    }

    /// 사용자가 입력한 원문 그대로.
    pub fn command_line(&self) -> &str {
        &self.ast.full_command
    }

    pub fn ast(&self) -> &Ast {
        self.ast
    }

    pub fn get_flag_int(&self, name: &str, default_value: i64) -> i64 {
        self.command.flags.get_flag_int(name, default_value)
    }

    pub fn get_flag_string(&self, name: &str, default_value: &str) -> String {
        self.command.flags.get_flag_string(name, default_value)
    }

    pub fn get_flag_int_array(&self, name: &str) -> Vec<i64> {
        self.command.flags.get_flag_int_array(name)
    }

    pub fn get_flag_string_array(&self, name: &str) -> Vec<String> {
        self.command.flags.get_flag_string_array(name)
    }

    pub fn get_flag_bool(&self, name: &str) -> bool {
        self.command.flags.get_flag_bool(name)
    }

    /// 이 명령에 바인딩된 위치 인자 값. 말단 명령만 값을 가진다.
    pub fn argument(&self, name: &str) -> Option<&str> {
        self.command.argument_value(name)
    }

    /// 이름이 붙지 않은 잉여분까지 포함한 위치 토큰 전체.
    pub fn args(&self) -> &[String] {
        &self.ast.args
    }

    pub fn start_time(&self) -> DateTime<Local> {
        self.invocation.started_at
    }

    pub fn elapsed(&self) -> Duration {
        self.invocation.started.elapsed()
    }

    // ---- 취소 ----

    pub fn cancel(&self) {
        self.invocation.cancel.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.invocation.cancel.is_cancelled()
    }

    /// 다른 스레드/태스크로 넘길 수 있는 취소 신호 복제본.
    pub fn cancellation(&self) -> Cancellation {
        self.invocation.cancel.clone()
    }

    pub async fn cancelled(&self) {
        self.invocation.cancel.cancelled().await;
    }

    // ---- 메모리 ----

    pub fn set(&mut self, key: impl Into<String>, value: impl Serialize) -> anyhow::Result<()> {
        let value = serde_json::to_value(value)?;
        self.memory.insert(key.into(), value);
        Ok(())
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.memory.get(key)
    }

    pub fn delete(&mut self, key: &str) -> Option<Value> {
        self.memory.remove(key)
    }

    pub fn get_string(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(Value::as_str)
    }

    pub fn get_int(&self, key: &str) -> Option<i64> {
        self.get(key).and_then(Value::as_i64)
    }

    // ---- 로그 ----

    pub fn print(&self, message: impl fmt::Display) {
        self.emit(LogKind::Message, message.to_string(), None);
    }

    /// `ctx.printf(format_args!("{} rows", n))`
    pub fn printf(&self, args: fmt::Arguments<'_>) {
        self.emit(LogKind::Message, args.to_string(), None);
    }

    /// 마크다운 원문을 그대로 보낸다. 렌더링은 싱크가 맡는다.
    pub fn print_markdown(&self, markdown: impl Into<String>) {
        self.emit(LogKind::Message, markdown.into(), None);
    }

    pub fn log(&self, message: impl fmt::Display) {
        self.emit(LogKind::Log, message.to_string(), None);
    }

    pub fn warn(&self, message: impl fmt::Display) {
        self.emit(LogKind::Warn, message.to_string(), None);
    }

    pub fn warnf(&self, args: fmt::Arguments<'_>) {
        self.emit(LogKind::Warn, args.to_string(), None);
    }

    pub fn error(&self, err: impl fmt::Display) {
        let text = err.to_string();
        self.emit(LogKind::Error, text.clone(), Some(text));
    }

    pub fn errorf(&self, args: fmt::Arguments<'_>) {
        let text = args.to_string();
        self.emit(LogKind::Error, text.clone(), Some(text));
    }

    /// 디버그 모드일 때만 내보낸다.
    pub fn debug(&self, message: impl fmt::Display) {
        if self.invocation.debug {
            self.emit(LogKind::Debug, message.to_string(), None);
        }
    }

    fn emit(&self, kind: LogKind, message: String, error: Option<String>) {
        let mut event = LogEvent::new(kind, self.ast.full_command.as_str(), message);
        event.error = error;
        self.invocation.sink.emit(event);
    }

    // ---- 대화형 입력 ----

    pub fn select_one(&self, params: SelectOneParams) -> Result<SelectOneResult, InteractiveError> {
        self.invocation.bridge.select_one(params)
    }

    pub fn input_text(&self, params: InputTextParams) -> Result<String, InteractiveError> {
        self.invocation.bridge.input_text(params)
    }

    pub fn input_int(&self, params: InputIntParams) -> Result<i64, InteractiveError> {
        self.invocation.bridge.input_int(params)
    }

    pub fn input_file(&self, params: InputFileParams) -> Result<InputFileResult, InteractiveError> {
        self.invocation.bridge.input_file(params)
    }

    pub fn confirm(&self, params: ConfirmParams) -> Result<bool, InteractiveError> {
        self.invocation.bridge.confirm(params)
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use std::sync::Mutex;

    use super::*;

    /// 이벤트를 모아 두는 테스트용 싱크.
    #[derive(Default)]
    pub struct RecordingSink(pub Mutex<Vec<LogEvent>>);

    impl RecordingSink {
        pub fn kinds(&self) -> Vec<LogKind> {
            self.0.lock().unwrap().iter().map(|e| e.kind).collect()
        }

        pub fn messages(&self) -> Vec<String> {
            self.0.lock().unwrap().iter().map(|e| e.message.clone()).collect()
        }
    }

    impl LogSink for RecordingSink {
        fn emit(&self, event: LogEvent) {
            self.0.lock().unwrap().push(event);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::testing::RecordingSink;
    use super::*;
    use crate::domain::argument::Argument;
    use crate::domain::flag::Flag;

    fn bound_command() -> Command {
        let mut command = Command::new("greet")
            .flag(Flag::string("name"))
            .flag(Flag::bool("loud"))
            .argument(Argument::new("target"));
        for flag in command.flags.iter_mut() {
            let raw = if flag.name() == "name" { "bob" } else { "true" };
            flag.parse(raw).unwrap();
        }
        command.arguments[0].set_value("world");
        command
    }

    fn ast() -> Ast {
        Ast {
            command: "greet".into(),
            full_command: "greet --name bob --loud world extra".into(),
            command_tree: vec!["greet".into()],
            args: vec!["world".into(), "extra".into()],
            ..Ast::default()
        }
    }

    #[test]
    fn exposes_bound_values_and_invocation_metadata() {
        let sink = RecordingSink::default();
        let bridge = InteractiveBridge::Disabled;
        let invocation = Invocation::new(&sink, &bridge, Cancellation::new(), false);
        let command = bound_command();
        let ast = ast();
        let mut memory = Memory::new();
        let ctx = Context::new(&command, &ast, &invocation, &mut memory);

        assert_eq!(ctx.name(), "greet");
        assert_eq!(ctx.command_name_tree(), ["greet"]);
        assert_eq!(ctx.command_line(), "greet --name bob --loud world extra");
        assert_eq!(ctx.get_flag_string("name", ""), "bob");
        assert!(ctx.get_flag_bool("loud"));
        assert_eq!(ctx.get_flag_int("name", 3), 3);
        assert_eq!(ctx.argument("target"), Some("world"));
        assert_eq!(ctx.args(), ["world", "extra"]);
        assert!(ctx.start_time() <= Local::now());
    }

    #[test]
    fn memory_holds_json_values() {
        let sink = RecordingSink::default();
        let bridge = InteractiveBridge::Disabled;
        let invocation = Invocation::new(&sink, &bridge, Cancellation::new(), false);
        let command = Command::new("x");
        let ast = Ast::default();
        let mut memory = Memory::new();
        {
            let mut ctx = Context::new(&command, &ast, &invocation, &mut memory);
            ctx.set("user", "alice").unwrap();
            ctx.set("count", 3).unwrap();
            ctx.set("tags", vec!["a", "b"]).unwrap();
            assert_eq!(ctx.get_string("user"), Some("alice"));
            assert_eq!(ctx.get_int("count"), Some(3));
            assert_eq!(ctx.get_int("user"), None);
            assert!(ctx.delete("tags").is_some());
            assert!(ctx.get("tags").is_none());
        }
        // 다음 컨텍스트도 같은 메모리를 본다.
        let ctx = Context::new(&command, &ast, &invocation, &mut memory);
        assert_eq!(ctx.get_string("user"), Some("alice"));
    }

    #[test]
    fn print_family_emits_classified_events() {
        let sink = RecordingSink::default();
        let bridge = InteractiveBridge::Disabled;
        let command = Command::new("x");
        let ast = ast();
        let mut memory = Memory::new();

        let quiet = Invocation::new(&sink, &bridge, Cancellation::new(), false);
        let ctx = Context::new(&command, &ast, &quiet, &mut memory);
        ctx.print("hello");
        ctx.printf(format_args!("{} rows", 3));
        ctx.warn("careful");
        ctx.error("broken");
        ctx.debug("hidden");
        assert_eq!(
            sink.kinds(),
            vec![LogKind::Message, LogKind::Message, LogKind::Warn, LogKind::Error]
        );
        assert_eq!(sink.messages()[1], "3 rows");

        let verbose = Invocation::new(&sink, &bridge, Cancellation::new(), true);
        let ctx = Context::new(&command, &ast, &verbose, &mut memory);
        ctx.debug("shown");
        assert_eq!(sink.kinds().last(), Some(&LogKind::Debug));
        let events = sink.0.lock().unwrap();
        assert!(events.iter().all(|e| e.command == ast.full_command));
        assert_eq!(events[3].error.as_deref(), Some("broken"));
    }

    #[test]
    fn cancel_is_visible_through_every_handle() {
        let sink = RecordingSink::default();
        let bridge = InteractiveBridge::Disabled;
        let token = Cancellation::new();
        let invocation = Invocation::new(&sink, &bridge, token.clone(), false);
        let command = Command::new("x");
        let ast = Ast::default();
        let mut memory = Memory::new();
        let ctx = Context::new(&command, &ast, &invocation, &mut memory);

        assert!(!ctx.is_cancelled());
        token.cancel();
        assert!(ctx.is_cancelled());
        assert!(ctx.cancellation().is_cancelled());
    }

    #[test]
    fn interactive_calls_fail_without_a_presenter() {
        let sink = RecordingSink::default();
        let bridge = InteractiveBridge::Disabled;
        let invocation = Invocation::new(&sink, &bridge, Cancellation::new(), false);
        let command = Command::new("x");
        let ast = Ast::default();
        let mut memory = Memory::new();
        let ctx = Context::new(&command, &ast, &invocation, &mut memory);
        assert!(matches!(
            ctx.confirm(ConfirmParams::default()),
            Err(InteractiveError::NotInteractive)
        ));
    }
}
