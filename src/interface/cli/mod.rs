//! CLI 인터페이스 모듈 묶음.
//! 인자 파싱/REPL/one-shot 실행/입력 UI/조립을 한 네임스페이스로 관리한다.

pub mod command;
pub mod composition;
pub mod demo;
pub mod oneshot;
pub mod repl;
pub mod repl_input;

pub use command::{Cli, CliAction, CliRequest};
pub use composition::AppComposition;
pub use oneshot::run_once;
pub use repl::run_repl;
