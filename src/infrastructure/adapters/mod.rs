//! 애플리케이션 포트를 실제 터미널/채널 구현체로 연결하는 어댑터 계층.

mod help_renderer;
mod log_sink;
pub mod prompt_validation;
mod scripted_presenter;
mod terminal_presenter;

pub use help_renderer::TextHelpRenderer;
pub use log_sink::{ChannelLogSink, ConsoleLogSink};
pub use scripted_presenter::ScriptedPresenter;
pub use terminal_presenter::TerminalPresenter;
