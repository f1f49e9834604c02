//! Domain layer
//! 명령 트리, 플래그 값, AST, 로그 이벤트, 대화형 요청 계약을 표현한다.

pub mod app;
pub mod argument;
pub mod ast;
pub mod command;
pub mod error;
pub mod flag;
pub mod interactive;
pub mod log;

pub use app::{App, AppParams};
pub use argument::Argument;
pub use ast::{Ast, AstArgument, AstFlag};
pub use command::{Command, Commands};
pub use error::{ErrorKind, ReplError};
pub use flag::{Flag, FlagType, FlagValue, Flags};
pub use log::{LogEvent, LogKind};
