//! 사용자에게 보이는 로그 이벤트.
//! 코어는 분류와 발행만 하고, 렌더링은 로그 싱크가 맡는다.

use chrono::{DateTime, Local};

use crate::domain::error::{ErrorKind, ReplError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LogKind {
    CommandRunning,
    CommandSuccess,
    CommandFailure,
    CommandNotFound,
    CommandNotEnoughArguments,
    Panic,

    Message,
    Log,
    Debug,
    Warn,
    Error,
}

impl LogKind {
    /// 실행 한 번을 끝맺는 이벤트인지 여부.
    pub fn is_terminal(self) -> bool {
        self == LogKind::CommandSuccess || self.is_failure()
    }

    pub fn is_failure(self) -> bool {
        matches!(
            self,
            LogKind::CommandFailure
                | LogKind::CommandNotFound
                | LogKind::CommandNotEnoughArguments
                | LogKind::Panic
        )
    }

    /// 실행 오류를 실패 이벤트 종류로 분류한다.
    pub fn for_error(err: &ReplError) -> Self {
        match err.kind() {
            ErrorKind::UnknownCommand | ErrorKind::UnknownSubcommand => LogKind::CommandNotFound,
            ErrorKind::ArgumentNotFound => LogKind::CommandNotEnoughArguments,
            ErrorKind::CommandPanic => LogKind::Panic,
            _ => LogKind::CommandFailure,
        }
    }
}

#[derive(Debug, Clone)]
pub struct LogEvent {
    pub kind: LogKind,
    /// 이벤트를 만든 명령 줄 원문.
    pub command: String,
    pub message: String,
    pub error: Option<String>,
    pub time: DateTime<Local>,
}

impl LogEvent {
    pub fn new(kind: LogKind, command: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            kind,
            command: command.into(),
            message: message.into(),
            error: None,
            time: Local::now(),
        }
    }

    /// 실행 실패를 분류된 종료 이벤트 하나로 만든다.
    pub fn failure(command: impl Into<String>, err: &ReplError) -> Self {
        Self {
            kind: LogKind::for_error(err),
            command: command.into(),
            message: err.to_string(),
            error: Some(format!("{err:#}")),
            time: Local::now(),
        }
    }

    pub fn success(command: impl Into<String>) -> Self {
        let command = command.into();
        Self::new(LogKind::CommandSuccess, command.clone(), command)
    }
}
