//! crossterm 기반 터미널 공용 도구.
//! REPL 입력기와 대화형 프롬프트가 같은 raw 모드/표시 폭 계산을 쓴다.

use std::env;
use std::io::{self, IsTerminal, Write};

use anyhow::Result;
use crossterm::cursor;
use crossterm::execute;
use crossterm::style::{Color, ResetColor, SetForegroundColor};
use crossterm::terminal::{self, ClearType};
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

/// stdin/stdout이 모두 TTY이고 dumb 터미널이 아닐 때만 raw 모드 UI를 쓴다.
pub fn supports_interactive_input() -> bool {
    if !io::stdout().is_terminal() || !io::stdin().is_terminal() {
        return false;
    }
    if let Ok(term) = env::var("TERM")
        && term.eq_ignore_ascii_case("dumb")
    {
        return false;
    }
    true
}

/// 터미널 폭. 알 수 없으면 80.
pub fn terminal_width() -> usize {
    terminal::size()
        .map(|(w, _)| w as usize)
        .unwrap_or(80)
        .max(20)
}

pub fn display_width(text: &str) -> usize {
    UnicodeWidthStr::width(text)
}

fn char_display_width(ch: char) -> usize {
    UnicodeWidthChar::width(ch).unwrap_or(0)
}

/// 표시 폭 기준으로 뒤를 자르고 `...`를 붙인다.
pub fn clip_line_display(line: &str, max_width: usize) -> String {
    if max_width == 0 {
        return String::new();
    }
    if display_width(line) <= max_width {
        return line.to_string();
    }
    if max_width <= 3 {
        return ".".repeat(max_width);
    }

    let cap = max_width - 3;
    let mut out = String::new();
    let mut used = 0usize;
    for ch in line.chars() {
        let cw = char_display_width(ch);
        if used + cw > cap {
            break;
        }
        out.push(ch);
        used += cw;
    }
    out.push_str("...");
    out
}

/// 표시 폭 기준으로 앞을 자르고 끝부분만 남긴다. 긴 입력 줄 표시에 쓴다.
pub fn tail_with_ellipsis_display(text: &str, max_width: usize) -> String {
    if max_width == 0 {
        return String::new();
    }
    if display_width(text) <= max_width {
        return text.to_string();
    }
    if max_width <= 3 {
        return ".".repeat(max_width);
    }

    let target = max_width - 3;
    let mut tail = Vec::new();
    let mut used = 0usize;
    for ch in text.chars().rev() {
        let cw = char_display_width(ch);
        if used + cw > target {
            break;
        }
        tail.push(ch);
        used += cw;
    }
    let tail: String = tail.into_iter().rev().collect();
    format!("...{tail}")
}

pub fn trim_newline(mut s: String) -> String {
    while matches!(s.chars().last(), Some('\n' | '\r')) {
        s.pop();
    }
    s
}

/// 커서 위치를 문자 단위로 관리하는 한 줄 편집 버퍼.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LineBuffer {
    text: String,
    cursor: usize,
}

impl LineBuffer {
    pub fn new(initial: &str) -> Self {
        Self {
            text: initial.to_string(),
            cursor: initial.chars().count(),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    pub fn char_count(&self) -> usize {
        self.text.chars().count()
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// 내용을 통째로 바꾸고 커서를 끝으로 보낸다.
    pub fn replace(&mut self, text: &str) {
        self.text = text.to_string();
        self.cursor = self.char_count();
    }

    pub fn insert(&mut self, ch: char) {
        let at = self.byte_index(self.cursor);
        self.text.insert(at, ch);
        self.cursor += 1;
    }

    pub fn backspace(&mut self) {
        if self.cursor == 0 {
            return;
        }
        self.cursor -= 1;
        self.remove_at(self.cursor);
    }

    pub fn delete(&mut self) {
        if self.cursor < self.char_count() {
            self.remove_at(self.cursor);
        }
    }

    pub fn left(&mut self) {
        self.cursor = self.cursor.saturating_sub(1);
    }

    pub fn right(&mut self) {
        self.cursor = (self.cursor + 1).min(self.char_count());
    }

    pub fn home(&mut self) {
        self.cursor = 0;
    }

    pub fn end(&mut self) {
        self.cursor = self.char_count();
    }

    /// 커서 앞부분의 표시 폭.
    pub fn cursor_width(&self) -> usize {
        display_width(&self.text[..self.byte_index(self.cursor)])
    }

    fn remove_at(&mut self, char_idx: usize) {
        let start = self.byte_index(char_idx);
        let end = self.byte_index(char_idx + 1);
        if start < end {
            self.text.replace_range(start..end, "");
        }
    }

    fn byte_index(&self, char_idx: usize) -> usize {
        self.text
            .char_indices()
            .nth(char_idx)
            .map(|(idx, _)| idx)
            .unwrap_or(self.text.len())
    }
}

/// raw 모드 진입/복구 가드. drop 시 항상 원래 상태로 돌린다.
pub struct RawModeGuard;

impl RawModeGuard {
    pub fn enter() -> Result<Self> {
        terminal::enable_raw_mode()?;
        execute!(io::stdout(), cursor::Show)?;
        Ok(Self)
    }
}

impl Drop for RawModeGuard {
    fn drop(&mut self) {
        let mut stdout = io::stdout();
        let _ = execute!(stdout, cursor::Show, ResetColor);
        let _ = terminal::disable_raw_mode();
        let _ = stdout.flush();
    }
}

/// 여러 줄 블록을 제자리에서 다시 그린다.
/// 커서가 블록 시작에서 몇 줄 아래에 있는지 기억해 두고 다음 프레임 때 그만큼 올라간다.
#[derive(Debug, Default)]
pub struct Frame {
    cursor_row: usize,
}

impl Frame {
    /// `cursor`가 `(row, col)`이면 커서를 블록 안의 해당 위치에 둔다.
    pub fn draw(
        &mut self,
        lines: &[(Color, String)],
        cursor: Option<(usize, usize)>,
    ) -> Result<()> {
        let mut stdout = io::stdout();
        self.rewind(&mut stdout)?;
        execute!(stdout, terminal::Clear(ClearType::FromCursorDown))?;

        let width = terminal_width();
        for (color, line) in lines {
            execute!(stdout, SetForegroundColor(*color))?;
            write!(stdout, "{}\r\n", clip_line_display(line, width))?;
            execute!(stdout, ResetColor)?;
        }
        self.cursor_row = lines.len();

        if let Some((row, col)) = cursor
            && row < lines.len()
        {
            execute!(
                stdout,
                cursor::MoveUp((lines.len() - row) as u16),
                cursor::MoveToColumn(col.min(width.saturating_sub(1)) as u16)
            )?;
            self.cursor_row = row;
        }
        stdout.flush()?;
        Ok(())
    }

    /// 블록을 지우고 커서를 블록 시작 위치로 되돌린다.
    pub fn clear(&mut self) -> Result<()> {
        let mut stdout = io::stdout();
        self.rewind(&mut stdout)?;
        execute!(stdout, terminal::Clear(ClearType::FromCursorDown))?;
        stdout.flush()?;
        Ok(())
    }

    fn rewind(&mut self, stdout: &mut io::Stdout) -> Result<()> {
        if self.cursor_row > 0 {
            execute!(stdout, cursor::MoveUp(self.cursor_row as u16))?;
        }
        execute!(stdout, cursor::MoveToColumn(0))?;
        self.cursor_row = 0;
        Ok(())
    }
}
