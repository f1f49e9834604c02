//! 애플리케이션 도움말 출력 유스케이스.
//! 빈 줄/`help` 입력을 파서를 거치지 않고 처리한다.

use anyhow::Result;

use crate::application::ports::{HelpRenderer, LogSink};
use crate::domain::app::App;
use crate::domain::log::{LogEvent, LogKind};

pub struct ShowHelpUseCase<'a> {
    pub sink: &'a dyn LogSink,
    pub help_renderer: &'a dyn HelpRenderer,
}

impl ShowHelpUseCase<'_> {
    pub fn execute(&self, app: &App, line: &str) -> Result<()> {
        let text = self.help_renderer.render_app(app)?;
        self.sink.emit(LogEvent::new(LogKind::Message, line, text));
        Ok(())
    }
}
