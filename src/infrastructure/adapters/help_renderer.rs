//! 도움말 렌더러 포트 구현 어댑터.

use anyhow::Result;

use crate::application::ports::HelpRenderer;
use crate::domain::app::App;
use crate::domain::command::Command;
use crate::infrastructure::render::{Palette, render_app_help, render_command_help};

/// 텍스트 템플릿 도움말. `color`가 꺼져 있으면 ANSI 코드 없이 출력한다.
pub struct TextHelpRenderer {
    palette: Palette,
}

impl TextHelpRenderer {
    pub fn new(color: bool) -> Self {
        Self {
            palette: Palette::new(color),
        }
    }

    pub fn plain() -> Self {
        Self::new(false)
    }
}

impl HelpRenderer for TextHelpRenderer {
    fn render_command(&self, command: &Command) -> Result<String> {
        Ok(render_command_help(command, self.palette))
    }

    fn render_app(&self, app: &App) -> Result<String> {
        Ok(render_app_help(app, self.palette))
    }
}
