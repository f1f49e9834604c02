//! 로그 이벤트/도움말을 터미널 출력 문자열로 렌더링하는 모듈.

use crate::domain::app::App;
use crate::domain::command::Command;
use crate::domain::flag::{Flag, FlagType};
use crate::domain::log::{LogEvent, LogKind};

/// ANSI 색상 적용 여부를 들고 다니는 팔레트.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Palette {
    color: bool,
}

impl Palette {
    pub fn new(color: bool) -> Self {
        Self { color }
    }

    pub fn plain() -> Self {
        Self::new(false)
    }

    fn paint(&self, text: &str, ansi: &str) -> String {
        if self.color && !text.is_empty() {
            format!("\x1b[{ansi}m{text}\x1b[0m")
        } else {
            text.to_string()
        }
    }

    fn bold(&self, text: &str) -> String {
        self.paint(text, "1")
    }

    fn gray(&self, text: &str) -> String {
        self.paint(text, "90")
    }
}

/// 로그 이벤트 한 건을 한 줄(또는 여러 줄) 문자열로 만든다.
pub fn render_log_event(event: &LogEvent, palette: Palette) -> String {
    let arrow = palette.gray(">>");
    match event.kind {
        LogKind::CommandRunning => format!("⏳ {arrow} {}", event.command),
        LogKind::CommandSuccess => {
            format!("{} {arrow} {}", palette.paint("✔", "32"), event.command)
        }
        LogKind::CommandFailure => format!(
            "{} {arrow} {} {}",
            palette.paint("✖", "31"),
            event.command,
            palette.gray(&format!("({})", event.message))
        ),
        LogKind::CommandNotFound | LogKind::CommandNotEnoughArguments => format!(
            "{} {arrow} {} {}",
            palette.paint("✖", "33"),
            event.command,
            palette.gray(&format!("({})", event.message))
        ),
        LogKind::Panic => format!(
            "{}: {}",
            palette.paint("[PANIC]", "1;41;97"),
            palette.paint(&event.message, "31")
        ),
        LogKind::Message => event.message.clone(),
        LogKind::Log => format!("{}: {}", palette.paint("[LOG]", "36"), event.message),
        LogKind::Debug => format!("{}: {}", palette.paint("[DEBUG]", "35"), event.message),
        LogKind::Warn => format!("{}: {}", palette.paint("[WARN]", "33"), event.message),
        LogKind::Error => format!(
            "{}: {}",
            palette.paint("[ERROR]", "1;31"),
            palette.paint(&event.message, "31")
        ),
    }
}

/// 명령 도움말. 이름/설명, 하위 명령, 플래그, 인자 순서.
pub fn render_command_help(command: &Command, palette: Palette) -> String {
    let mut out = header(&command.name, &command.usage, palette);

    if !command.aliases.is_empty() {
        out.push_str(&format!("{}:\n  {}\n", palette.bold("Aliases"), command.aliases.join(", ")));
    }

    if !command.subcommands.is_empty() {
        out.push_str(&format!("{}:\n", palette.bold("Subcommands")));
        for sub in &command.subcommands {
            out.push_str(&format!("  {} - {}\n", palette.paint(&sub.name, "32"), sub.usage));
        }
    }

    if !command.flags.is_empty() {
        out.push_str(&format!("{}:\n", palette.bold("Flags")));
        for flag in &command.flags {
            out.push_str(&format!("  {}\n", render_flag(flag, palette)));
        }
    }

    if !command.arguments.is_empty() {
        out.push_str(&format!("{}:\n", palette.bold("Arguments")));
        for arg in &command.arguments {
            out.push_str(&format!("  {} - {}\n", palette.paint(&arg.name, "35"), arg.usage));
        }
    }

    out
}

/// 애플리케이션 도움말. 작성자, 라이선스, 최상위 명령 순서.
pub fn render_app_help(app: &App, palette: Palette) -> String {
    let mut out = header(&app.name, &app.usage, palette);

    if !app.authors.is_empty() {
        out.push_str(&format!("{}:\n  {}\n", palette.bold("Authors"), app.authors.join(", ")));
    }
    if !app.copyright.is_empty() {
        out.push_str(&format!("{}:\n  {}\n", palette.bold("Copyright"), app.copyright));
    }
    if !app.license.is_empty() {
        out.push_str(&format!("{}:\n  {}\n", palette.bold("License"), app.license));
    }
    if !app.commands.is_empty() {
        out.push_str(&format!("{}:\n", palette.bold("Subcommands")));
        for command in &app.commands {
            out.push_str(&format!(
                "  {} - {}\n",
                palette.paint(&command.name, "32"),
                command.usage
            ));
        }
    }

    out
}

fn header(name: &str, usage: &str, palette: Palette) -> String {
    format!("{} - {}\n\n", palette.bold(name), usage)
}

fn render_flag(flag: &Flag, palette: Palette) -> String {
    let alias = flag
        .alias_name()
        .map(|alias| format!("(-{})", palette.gray(alias)))
        .unwrap_or_default();
    // bool 플래그는 값 없이 쓰므로 타입을 표시하지 않는다.
    let value_type = match flag.value_type() {
        FlagType::Bool => String::new(),
        other => palette.paint(&format!("={other}"), "36"),
    };
    format!(
        "--{}{alias}{value_type} - {}",
        palette.paint(flag.name(), "34"),
        flag.usage_text()
    )
}
