//! 애플리케이션 조립(composition root) 모듈.

use std::sync::Arc;

use crate::application::bridge::InteractiveBridge;
use crate::application::ports::{LogSink, Presenter};
use crate::application::usecases::run_command::RunCommandUseCase;
use crate::application::usecases::show_help::ShowHelpUseCase;
use crate::domain::app::AppParams;
use crate::infrastructure::adapters::{ConsoleLogSink, TerminalPresenter, TextHelpRenderer};

/// 실행 시점 의존성을 한 곳에서 조립하는 컨테이너.
/// 워커 스레드로 넘겨야 하는 어댑터는 `Arc`로 들고 있다.
pub struct AppComposition {
    console: Arc<ConsoleLogSink>,
    help_renderer: Arc<TextHelpRenderer>,
    presenter: Arc<dyn Presenter>,
}

impl AppComposition {
    /// 색상 설정을 반영해 터미널 어댑터로 조립한다.
    pub fn new(params: &AppParams) -> Self {
        Self::with_presenter(params, Arc::new(TerminalPresenter::new()))
    }

    /// 대화형 화면 어댑터를 외부에서 주입한다.
    pub fn with_presenter(params: &AppParams, presenter: Arc<dyn Presenter>) -> Self {
        let color = !params.no_color;
        Self {
            console: Arc::new(ConsoleLogSink::new(color)),
            help_renderer: Arc::new(TextHelpRenderer::new(color)),
            presenter,
        }
    }

    pub fn console(&self) -> Arc<ConsoleLogSink> {
        Arc::clone(&self.console)
    }

    pub fn help_renderer(&self) -> Arc<TextHelpRenderer> {
        Arc::clone(&self.help_renderer)
    }

    pub fn presenter(&self) -> Arc<dyn Presenter> {
        Arc::clone(&self.presenter)
    }

    /// 앱 도움말 유스케이스. 항상 콘솔로 바로 출력한다.
    pub fn show_help_usecase(&self) -> ShowHelpUseCase<'_> {
        ShowHelpUseCase {
            sink: self.console.as_ref(),
            help_renderer: self.help_renderer.as_ref(),
        }
    }
}

/// 한 줄 실행 유스케이스를 만든다. 워커 스레드 안에서 빌린 참조로 조립할 때 쓴다.
pub fn run_command_usecase<'a>(
    sink: &'a dyn LogSink,
    help_renderer: &'a TextHelpRenderer,
    bridge: &'a InteractiveBridge,
) -> RunCommandUseCase<'a> {
    RunCommandUseCase {
        sink,
        help_renderer,
        bridge,
    }
}
