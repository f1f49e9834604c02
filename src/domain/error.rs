//! 파서/실행 엔진이 노출하는 오류 타입.
//! 호출자는 메시지 문자열이 아니라 `ErrorKind`로 분기한다.

use std::fmt;

/// 명령 해석·실행 단계에서 발생하는 오류.
#[derive(Debug, thiserror::Error)]
pub enum ReplError {
    /// 입력 줄이 비어 있다.
    #[error("command empty")]
    CommandEmpty,

    /// 최상위 명령(또는 트리 전체)에서 이름을 찾지 못했다.
    #[error("unknown command: {0}")]
    UnknownCommand(String),

    /// 하위 명령이 있는 명령 뒤에 알 수 없는 토큰이 왔다.
    #[error("unknown subcommand: {0}")]
    UnknownSubcommand(String),

    /// 위치 인자 개수가 선언보다 적다.
    #[error("argument not found for command: {0}")]
    ArgumentNotFound(String),

    #[error("unclosed quotes")]
    UnclosedQuotes,

    #[error("incomplete escape sequence")]
    IncompleteEscape,

    /// 지원하지 않는 플래그 타입 태그.
    #[error("unknown flag type: {0}")]
    UnknownFlagType(String),

    /// 바인딩 시점의 플래그 값 변환/검증 실패.
    #[error("invalid value for flag --{flag}: {reason}")]
    InvalidFlagValue { flag: String, reason: String },

    /// 명령 트리 안에 같은 이름이 두 번 이상 등록됐다.
    #[error("duplicate command name: {0}")]
    DuplicateCommand(String),

    /// 훅 실행 중 복구된 panic.
    #[error("cmdpanic: {0}")]
    CommandPanic(String),

    /// before/action/after 훅이 돌려준 오류를 그대로 전달한다.
    #[error(transparent)]
    Hook(#[from] anyhow::Error),
}

/// `ReplError`의 필드 없는 분류값.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    CommandEmpty,
    UnknownCommand,
    UnknownSubcommand,
    ArgumentNotFound,
    UnclosedQuotes,
    IncompleteEscape,
    UnknownFlagType,
    InvalidFlagValue,
    DuplicateCommand,
    CommandPanic,
    Hook,
}

impl ReplError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ReplError::CommandEmpty => ErrorKind::CommandEmpty,
            ReplError::UnknownCommand(_) => ErrorKind::UnknownCommand,
            ReplError::UnknownSubcommand(_) => ErrorKind::UnknownSubcommand,
            ReplError::ArgumentNotFound(_) => ErrorKind::ArgumentNotFound,
            ReplError::UnclosedQuotes => ErrorKind::UnclosedQuotes,
            ReplError::IncompleteEscape => ErrorKind::IncompleteEscape,
            ReplError::UnknownFlagType(_) => ErrorKind::UnknownFlagType,
            ReplError::InvalidFlagValue { .. } => ErrorKind::InvalidFlagValue,
            ReplError::DuplicateCommand(_) => ErrorKind::DuplicateCommand,
            ReplError::CommandPanic(_) => ErrorKind::CommandPanic,
            ReplError::Hook(_) => ErrorKind::Hook,
        }
    }

    /// 명령/하위 명령을 찾지 못한 경우인지 여부.
    pub fn is_not_found(&self) -> bool {
        matches!(
            self.kind(),
            ErrorKind::UnknownCommand | ErrorKind::UnknownSubcommand
        )
    }

    /// 복구된 panic 페이로드를 오류로 변환한다.
    pub(crate) fn from_panic(payload: Box<dyn std::any::Any + Send>) -> Self {
        let message = if let Some(s) = payload.downcast_ref::<&str>() {
            (*s).to_string()
        } else if let Some(s) = payload.downcast_ref::<String>() {
            s.clone()
        } else if let Some(err) = payload.downcast_ref::<anyhow::Error>() {
            format!("{err:#}")
        } else {
            "unknown panic".to_string()
        };
        ReplError::CommandPanic(message)
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            ErrorKind::CommandEmpty => "command-empty",
            ErrorKind::UnknownCommand => "unknown-command",
            ErrorKind::UnknownSubcommand => "unknown-subcommand",
            ErrorKind::ArgumentNotFound => "argument-not-found",
            ErrorKind::UnclosedQuotes => "unclosed-quotes",
            ErrorKind::IncompleteEscape => "incomplete-escape",
            ErrorKind::UnknownFlagType => "unknown-flag-type",
            ErrorKind::InvalidFlagValue => "invalid-flag-value",
            ErrorKind::DuplicateCommand => "duplicate-command",
            ErrorKind::CommandPanic => "command-panic",
            ErrorKind::Hook => "hook",
        };
        f.write_str(label)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kinds_distinguish_not_found_from_other_failures() {
        assert!(ReplError::UnknownCommand("x".into()).is_not_found());
        assert!(ReplError::UnknownSubcommand("y".into()).is_not_found());
        assert!(!ReplError::ArgumentNotFound("z".into()).is_not_found());
        assert_eq!(
            ReplError::CommandPanic("boom".into()).kind(),
            ErrorKind::CommandPanic
        );
    }

    #[test]
    fn panic_payloads_keep_their_text() {
        let err = ReplError::from_panic(Box::new("static str"));
        assert_eq!(err.to_string(), "cmdpanic: static str");

        let err = ReplError::from_panic(Box::new(String::from("owned")));
        assert_eq!(err.to_string(), "cmdpanic: owned");

        let err = ReplError::from_panic(Box::new(42_u8));
        assert_eq!(err.to_string(), "cmdpanic: unknown panic");
    }

    #[test]
    fn hook_errors_pass_through_transparently() {
        let err: ReplError = anyhow::anyhow!("disk full").into();
        assert_eq!(err.kind(), ErrorKind::Hook);
        assert_eq!(err.to_string(), "disk full");
    }
}
