//! 터미널 대화형 화면 포트 구현 어댑터.
//!
//! - TTY + 지원 터미널: crossterm raw 모드에서 화면을 그리고 키 입력을 받는다.
//! - non-TTY/dumb 터미널: 한 줄씩 읽는 대체 입력.
//!
//! 두 모드 모두 검증 규칙은 `prompt_validation`을 따른다. Esc/Ctrl+C는 `Cancelled`.

use std::io::{self, Write};

use async_trait::async_trait;
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::style::Color;

use super::prompt_validation::{Rejection, check_confirm, check_file, check_int, check_text};
use crate::application::ports::Presenter;
use crate::domain::interactive::{
    ConfirmParams, InteractiveError, InteractiveResponse, Prompt, PromptAnswer, SelectOneParams,
    SelectOneResult,
};
use crate::infrastructure::terminal::{
    Frame, LineBuffer, RawModeGuard, display_width, supports_interactive_input, trim_newline,
};

const INPUT_PREFIX: &str = "> ";

pub struct TerminalPresenter {
    interactive: bool,
}

impl Default for TerminalPresenter {
    fn default() -> Self {
        Self::new()
    }
}

impl TerminalPresenter {
    pub fn new() -> Self {
        Self {
            interactive: supports_interactive_input(),
        }
    }

    /// 항상 줄 입력 모드로 동작하게 한다.
    pub fn line_mode() -> Self {
        Self { interactive: false }
    }
}

#[async_trait]
impl Presenter for TerminalPresenter {
    async fn present(&self, prompt: Prompt) -> InteractiveResponse {
        let interactive = self.interactive;
        // 키 입력 대기는 블로킹이므로 런타임 워커를 점유하지 않게 옮긴다.
        tokio::task::spawn_blocking(move || {
            if interactive {
                present_raw(&prompt)
            } else {
                present_lines(&prompt)
            }
        })
        .await
        .unwrap_or_else(|err| Err(InteractiveError::Presenter(err.to_string())))
    }
}

fn io_error(err: impl std::fmt::Display) -> InteractiveError {
    InteractiveError::Presenter(err.to_string())
}

fn header(name: &str, description: &str) -> Vec<(Color, String)> {
    let mut lines = vec![(Color::Cyan, name.to_string())];
    if !description.is_empty() {
        lines.push((Color::DarkGrey, description.to_string()));
    }
    lines
}

// ---------------------------------------------------------------------------
// raw 모드 화면
// ---------------------------------------------------------------------------

fn present_raw(prompt: &Prompt) -> InteractiveResponse {
    let _guard = RawModeGuard::enter().map_err(io_error)?;
    let mut frame = Frame::default();

    let answer = match prompt {
        Prompt::SelectOne(params) => select_view(&mut frame, params).map(PromptAnswer::Selected),
        Prompt::Confirm(params) => confirm_view(&mut frame, params).map(PromptAnswer::Confirmed),
        Prompt::InputText(params) => line_view(
            &mut frame,
            header(&params.name, &params.description),
            &params.placeholder,
            params.is_password,
            |value| check_text(params, value),
        )
        .map(PromptAnswer::Text),
        Prompt::InputInt(params) => {
            let mut lines = header(&params.name, &params.description);
            lines.push((
                Color::DarkGrey,
                format!(">= {} | <= {}", params.min_value, params.max_value),
            ));
            line_view(&mut frame, lines, "", false, |value| check_int(params, value))
                .map(PromptAnswer::Int)
        }
        Prompt::InputFile(params) => {
            let mut lines = header(&params.name, &params.description);
            if !params.extensions.is_empty() {
                lines.push((Color::DarkGrey, params.extensions.join(", ")));
            }
            line_view(&mut frame, lines, "path/to/file", false, |value| {
                check_file(params, value)
            })
            .map(PromptAnswer::File)
        }
    };

    frame.clear().map_err(io_error)?;
    answer
}

enum KeyAction {
    Cancel,
    Key(KeyEvent),
    Ignore,
}

fn next_key() -> Result<KeyAction, InteractiveError> {
    match event::read().map_err(io_error)? {
        Event::Key(key) if key.kind == KeyEventKind::Press => {
            let ctrl_c =
                key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL);
            if ctrl_c || key.code == KeyCode::Esc {
                Ok(KeyAction::Cancel)
            } else {
                Ok(KeyAction::Key(key))
            }
        }
        _ => Ok(KeyAction::Ignore),
    }
}

fn line_view<T>(
    frame: &mut Frame,
    head: Vec<(Color, String)>,
    placeholder: &str,
    masked: bool,
    check: impl Fn(&str) -> Result<T, Rejection>,
) -> Result<T, InteractiveError> {
    let mut line = LineBuffer::default();
    let mut status: Option<String> = None;

    loop {
        let shown = if masked {
            "*".repeat(line.char_count())
        } else {
            line.as_str().to_string()
        };
        let cursor_col = display_width(INPUT_PREFIX)
            + if masked { line.cursor() } else { line.cursor_width() };

        let mut lines = head.clone();
        let input_row = lines.len();
        if shown.is_empty() && !placeholder.is_empty() {
            lines.push((Color::DarkGrey, format!("{INPUT_PREFIX}{placeholder}")));
        } else {
            lines.push((Color::White, format!("{INPUT_PREFIX}{shown}")));
        }
        if let Some(reason) = &status {
            lines.push((Color::Red, reason.clone()));
        }
        frame
            .draw(&lines, Some((input_row, cursor_col)))
            .map_err(io_error)?;

        let key = match next_key()? {
            KeyAction::Cancel => return Err(InteractiveError::Cancelled),
            KeyAction::Ignore => continue,
            KeyAction::Key(key) => key,
        };
        match key.code {
            KeyCode::Enter => match check(line.as_str()) {
                Ok(value) => return Ok(value),
                Err(reason) => status = Some(reason.to_string()),
            },
            KeyCode::Backspace => line.backspace(),
            KeyCode::Delete => line.delete(),
            KeyCode::Left => line.left(),
            KeyCode::Right => line.right(),
            KeyCode::Home => line.home(),
            KeyCode::End => line.end(),
            KeyCode::Char(ch)
                if !key.modifiers.contains(KeyModifiers::CONTROL)
                    && !key.modifiers.contains(KeyModifiers::ALT) =>
            {
                line.insert(ch);
                status = None;
            }
            _ => {}
        }
    }
}

fn select_view(
    frame: &mut Frame,
    params: &SelectOneParams,
) -> Result<SelectOneResult, InteractiveError> {
    if params.items.is_empty() {
        return Err(InteractiveError::Presenter("no items to select".into()));
    }
    let mut selected = 0usize;

    loop {
        let mut lines = header(&params.name, &params.description);
        for (idx, item) in params.items.iter().enumerate() {
            let (marker, color) = if idx == selected {
                (">", Color::Green)
            } else {
                (" ", Color::White)
            };
            let text = if item.description.is_empty() {
                format!("{marker} {}", item.name)
            } else {
                format!("{marker} {} - {}", item.name, item.description)
            };
            lines.push((color, text));
        }
        frame.draw(&lines, None).map_err(io_error)?;

        let key = match next_key()? {
            KeyAction::Cancel => return Err(InteractiveError::Cancelled),
            KeyAction::Ignore => continue,
            KeyAction::Key(key) => key,
        };
        match key.code {
            KeyCode::Up | KeyCode::Char('k') => selected = selected.saturating_sub(1),
            KeyCode::Down | KeyCode::Char('j') => {
                selected = (selected + 1).min(params.items.len() - 1)
            }
            KeyCode::Enter => {
                let item = params.items[selected].clone();
                return Ok(SelectOneResult {
                    selected_id: item.id.clone(),
                    selected_item: item,
                });
            }
            _ => {}
        }
    }
}

fn confirm_view(frame: &mut Frame, params: &ConfirmParams) -> Result<bool, InteractiveError> {
    let mut yes = false;

    loop {
        let mut lines = header(&params.name, &params.description);
        let choice = if yes { "[Yes]  No " } else { " Yes  [No]" };
        lines.push((Color::White, choice.to_string()));
        frame.draw(&lines, None).map_err(io_error)?;

        let key = match next_key()? {
            KeyAction::Cancel => return Err(InteractiveError::Cancelled),
            KeyAction::Ignore => continue,
            KeyAction::Key(key) => key,
        };
        match key.code {
            KeyCode::Left | KeyCode::Right | KeyCode::Tab => yes = !yes,
            KeyCode::Char('y') | KeyCode::Char('Y') => return Ok(true),
            KeyCode::Char('n') | KeyCode::Char('N') => return Ok(false),
            KeyCode::Enter => return Ok(yes),
            _ => {}
        }
    }
}

// ---------------------------------------------------------------------------
// 줄 입력 대체 모드
// ---------------------------------------------------------------------------

fn present_lines(prompt: &Prompt) -> InteractiveResponse {
    let mut out = io::stdout();
    let (name, description) = match prompt {
        Prompt::SelectOne(p) => (&p.name, &p.description),
        Prompt::InputText(p) => (&p.name, &p.description),
        Prompt::InputInt(p) => (&p.name, &p.description),
        Prompt::InputFile(p) => (&p.name, &p.description),
        Prompt::Confirm(p) => (&p.name, &p.description),
    };
    writeln!(out, "{name}").map_err(io_error)?;
    if !description.is_empty() {
        writeln!(out, "{description}").map_err(io_error)?;
    }

    match prompt {
        Prompt::SelectOne(params) => {
            for (idx, item) in params.items.iter().enumerate() {
                writeln!(out, "  {}) {}", idx + 1, item.name).map_err(io_error)?;
            }
            read_until_valid(|value| pick_item(params, value)).map(PromptAnswer::Selected)
        }
        Prompt::InputText(params) => {
            read_until_valid(|value| check_text(params, value).map_err(|r| r.to_string()))
                .map(PromptAnswer::Text)
        }
        Prompt::InputInt(params) => {
            read_until_valid(|value| check_int(params, value).map_err(|r| r.to_string()))
                .map(PromptAnswer::Int)
        }
        Prompt::InputFile(params) => {
            read_until_valid(|value| check_file(params, value).map_err(|r| r.to_string()))
                .map(PromptAnswer::File)
        }
        Prompt::Confirm(_) => read_until_valid(|value| {
            check_confirm(value).ok_or_else(|| "answer y or n".to_string())
        })
        .map(PromptAnswer::Confirmed),
    }
}

/// 1부터 시작하는 번호 또는 항목 id로 고른다.
fn pick_item(params: &SelectOneParams, value: &str) -> Result<SelectOneResult, String> {
    let value = value.trim();
    let by_number = value
        .parse::<usize>()
        .ok()
        .and_then(|n| n.checked_sub(1))
        .and_then(|idx| params.items.get(idx));
    let item = by_number
        .or_else(|| params.items.iter().find(|item| item.id == value))
        .ok_or_else(|| format!("no item `{value}`"))?;
    Ok(SelectOneResult {
        selected_id: item.id.clone(),
        selected_item: item.clone(),
    })
}

/// 입력이 끝나면(EOF) `Closed`.
fn read_until_valid<T>(check: impl Fn(&str) -> Result<T, String>) -> Result<T, InteractiveError> {
    let stdin = io::stdin();
    let mut out = io::stdout();
    loop {
        write!(out, "{INPUT_PREFIX}").map_err(io_error)?;
        out.flush().map_err(io_error)?;

        let mut raw = String::new();
        if stdin.read_line(&mut raw).map_err(io_error)? == 0 {
            return Err(InteractiveError::Closed);
        }
        match check(&trim_newline(raw)) {
            Ok(value) => return Ok(value),
            Err(reason) => writeln!(out, "! {reason}").map_err(io_error)?,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::interactive::SelectItem;

    fn params() -> SelectOneParams {
        SelectOneParams {
            name: "env".into(),
            description: String::new(),
            items: vec![
                SelectItem::new("dev", "Development"),
                SelectItem::new("prod", "Production"),
            ],
        }
    }

    #[test]
    fn pick_item_by_number_or_id() {
        assert_eq!(pick_item(&params(), "2").unwrap().selected_id, "prod");
        assert_eq!(pick_item(&params(), "dev").unwrap().selected_id, "dev");
        assert!(pick_item(&params(), "0").is_err());
        assert!(pick_item(&params(), "staging").is_err());
    }

    #[test]
    fn header_skips_empty_description() {
        assert_eq!(header("title", "").len(), 1);
        assert_eq!(header("title", "more").len(), 2);
    }
}
