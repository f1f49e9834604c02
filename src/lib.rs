//! repline library root.
//! 명령 트리를 정의하면 파싱, 훅 실행, 대화형 입력, REPL/one-shot 실행을 제공한다.
//! Clean Architecture 계층을 외부에 노출한다.

use anyhow::Result;

pub mod application;
pub mod domain;
pub mod infrastructure;
pub mod interface;

pub use application::bridge::InteractiveBridge;
pub use application::context::{Cancellation, Context, ExecOutput};
pub use domain::interactive::{
    ConfirmParams, InputFileParams, InputFileResult, InputIntParams, InputTextParams,
    InteractiveError, SelectItem, SelectOneParams, SelectOneResult,
};
pub use domain::{
    App, AppParams, Argument, Command, ErrorKind, Flag, FlagType, FlagValue, LogEvent, LogKind,
    ReplError,
};

use interface::cli::AppComposition;

/// 터미널 어댑터로 대화형 쉘을 돌린다. `exit`나 EOF에서 끝난다.
pub async fn run_repl(app: App) -> Result<()> {
    let composition = AppComposition::new(&app.params);
    interface::cli::run_repl(app, &composition, application::config::DEFAULT_PROMPT).await
}

/// 명령 한 줄(프로세스 인자 형태)을 실행한다. 성공하면 `true`.
pub async fn run_once(app: App, args: &[String]) -> Result<bool> {
    let composition = AppComposition::new(&app.params);
    interface::cli::run_once(app, &composition, args).await
}
