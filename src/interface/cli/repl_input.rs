//! REPL 입력 처리기.
//! 입력 중 명령 트리를 따라 하위 명령/플래그 추천을 실시간으로 표시한다.

use std::io::{self, Write};

use anyhow::Result;
use crossterm::event::{self, Event, KeyCode, KeyEventKind, KeyModifiers};
use crossterm::style::Color;

use crate::domain::app::App;
use crate::domain::command::Commands;
use crate::infrastructure::terminal::{
    Frame, LineBuffer, RawModeGuard, display_width, supports_interactive_input,
    tail_with_ellipsis_display, terminal_width, trim_newline,
};

/// 한 번에 보여 주는 추천 최대 개수.
const MAX_SUGGESTIONS: usize = 6;
/// 앱 명령과 별개로 항상 받는 내장 명령.
const BUILTINS: [(&str, &str); 2] = [("help", "show application help"), ("exit", "leave the shell")];

/// 추천 계산용으로 명령 트리에서 이름/설명/플래그만 복사해 둔 색인.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandIndex {
    entries: Vec<IndexEntry>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
struct IndexEntry {
    name: String,
    usage: String,
    flags: Vec<String>,
    children: Vec<IndexEntry>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Suggestion {
    /// 추천을 고르면 바뀔 전체 입력.
    pub completed: String,
    pub label: String,
    pub description: String,
}

impl CommandIndex {
    pub fn from_app(app: &App) -> Self {
        let mut entries: Vec<IndexEntry> = BUILTINS
            .iter()
            .map(|(name, usage)| IndexEntry {
                name: name.to_string(),
                usage: usage.to_string(),
                ..IndexEntry::default()
            })
            .collect();
        entries.extend(index_commands(&app.commands));
        Self { entries }
    }

    /// 마지막(작성 중인) 단어를 기준으로 추천을 만든다.
    /// 앞 단어들이 가리키는 명령의 하위 명령과 플래그가 후보다.
    pub fn suggest(&self, input: &str) -> Vec<Suggestion> {
        let ends_with_space = input.ends_with(char::is_whitespace);
        let words: Vec<&str> = input.split_whitespace().collect();
        let (done, partial) = match (ends_with_space, words.split_last()) {
            (false, Some((last, rest))) => (rest, *last),
            _ => (words.as_slice(), ""),
        };
        if done.is_empty() && partial.is_empty() {
            return Vec::new();
        }

        let mut level = self.entries.as_slice();
        let mut current: Option<&IndexEntry> = None;
        for word in done {
            if word.starts_with('-') {
                continue;
            }
            match level.iter().find(|entry| entry.name == *word) {
                Some(entry) => {
                    current = Some(entry);
                    level = entry.children.as_slice();
                }
                // 위치 인자이거나 모르는 단어. 더 내려가지 않는다.
                None if current.is_some() => level = &[],
                None => return Vec::new(),
            }
        }

        let prefix = &input[..input.len() - partial.len()];
        let mut out = Vec::new();
        if partial.starts_with('-') {
            if let Some(entry) = current {
                for flag in &entry.flags {
                    let candidate = format!("--{flag}");
                    if candidate.starts_with(partial) && candidate != partial {
                        out.push(Suggestion {
                            completed: format!("{prefix}{candidate}"),
                            label: candidate,
                            description: String::new(),
                        });
                    }
                }
            }
        } else {
            for entry in level {
                if entry.name.starts_with(partial) && entry.name != partial {
                    out.push(Suggestion {
                        completed: format!("{prefix}{} ", entry.name),
                        label: entry.name.clone(),
                        description: entry.usage.clone(),
                    });
                }
            }
        }
        out.truncate(MAX_SUGGESTIONS);
        out
    }
}

fn index_commands(commands: &Commands) -> Vec<IndexEntry> {
    commands
        .iter()
        .map(|command| IndexEntry {
            name: command.name.clone(),
            usage: command.usage.clone(),
            flags: command.flags.iter().map(|flag| flag.name().to_string()).collect(),
            children: index_commands(&command.subcommands),
        })
        .collect()
}

/// REPL 한 줄 입력을 읽는다. 입력이 끝나면(EOF, Ctrl+D) `None`.
/// - TTY + 지원 터미널: 실시간 추천, Tab 완성, ↑↓ 기록
/// - non-TTY/미지원 터미널: 일반 라인 입력
pub fn read_repl_input(
    prompt: &str,
    index: &CommandIndex,
    history: &[String],
) -> Result<Option<String>> {
    if !supports_interactive_input() {
        return read_line_fallback(prompt);
    }
    match read_line_interactive(prompt, index, history) {
        Ok(line) => Ok(line),
        Err(_) => read_line_fallback(prompt),
    }
}

fn read_line_fallback(prompt: &str) -> Result<Option<String>> {
    print!("{prompt}");
    io::stdout().flush()?;

    let mut line = String::new();
    if io::stdin().read_line(&mut line)? == 0 {
        return Ok(None);
    }
    Ok(Some(trim_newline(line)))
}

fn read_line_interactive(
    prompt: &str,
    index: &CommandIndex,
    history: &[String],
) -> Result<Option<String>> {
    let _guard = RawModeGuard::enter()?;
    let mut frame = Frame::default();
    let mut line = LineBuffer::default();
    let mut selected = 0usize;
    // history.len()은 "작성 중인 새 줄"을 뜻한다.
    let mut history_pos = history.len();
    let mut draft = String::new();

    loop {
        let suggestions = index.suggest(line.as_str());
        if selected >= suggestions.len() {
            selected = suggestions.len().saturating_sub(1);
        }
        render(&mut frame, prompt, &line, &suggestions, selected)?;

        let key = match event::read()? {
            Event::Key(key) if key.kind == KeyEventKind::Press => key,
            Event::Paste(text) => {
                text.chars().filter(|ch| *ch != '\n').for_each(|ch| line.insert(ch));
                continue;
            }
            _ => continue,
        };
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);

        match key.code {
            KeyCode::Enter => {
                frame.clear()?;
                // 입력한 줄은 스크롤백에 남긴다.
                print!("{prompt}{}\r\n", line.as_str());
                io::stdout().flush()?;
                return Ok(Some(line.as_str().to_string()));
            }
            KeyCode::Tab => {
                if let Some(item) = suggestions.get(selected) {
                    line.replace(&item.completed);
                    selected = 0;
                }
            }
            KeyCode::Up if !suggestions.is_empty() && history_pos == history.len() => {
                selected = selected.saturating_sub(1);
            }
            KeyCode::Down if !suggestions.is_empty() && history_pos == history.len() => {
                selected = (selected + 1).min(suggestions.len() - 1);
            }
            KeyCode::Up => {
                if history_pos > 0 {
                    if history_pos == history.len() {
                        draft = line.as_str().to_string();
                    }
                    history_pos -= 1;
                    line.replace(&history[history_pos]);
                }
            }
            KeyCode::Down => {
                if history_pos < history.len() {
                    history_pos += 1;
                    let next = history.get(history_pos).map(String::as_str).unwrap_or(&draft);
                    line.replace(next);
                }
            }
            KeyCode::Backspace => line.backspace(),
            KeyCode::Delete => line.delete(),
            KeyCode::Left => line.left(),
            KeyCode::Right => line.right(),
            KeyCode::Home => line.home(),
            KeyCode::End => line.end(),
            KeyCode::Char('d') if ctrl => {
                frame.clear()?;
                return Ok(None);
            }
            KeyCode::Char('c') if ctrl => {
                // 작성 중인 줄만 버린다.
                line = LineBuffer::default();
                history_pos = history.len();
            }
            KeyCode::Char(ch) if !ctrl && !key.modifiers.contains(KeyModifiers::ALT) => {
                line.insert(ch);
                history_pos = history.len();
                selected = 0;
            }
            _ => {}
        }
    }
}

fn render(
    frame: &mut Frame,
    prompt: &str,
    line: &LineBuffer,
    suggestions: &[Suggestion],
    selected: usize,
) -> Result<()> {
    let width = terminal_width();
    let prompt_width = display_width(prompt);
    let available = width.saturating_sub(prompt_width + 1);

    let shown = tail_with_ellipsis_display(line.as_str(), available);
    // 잘린 상태에서는 커서를 보이는 끝에 맞춘다.
    let cursor_col = if display_width(line.as_str()) <= available {
        prompt_width + line.cursor_width()
    } else {
        prompt_width + display_width(&shown)
    };

    let mut lines = vec![(Color::Reset, format!("{prompt}{shown}"))];
    for (idx, item) in suggestions.iter().enumerate() {
        let (marker, color) = if idx == selected {
            (">", Color::Cyan)
        } else {
            (" ", Color::DarkGrey)
        };
        let text = if item.description.is_empty() {
            format!("  {marker} {}", item.label)
        } else {
            format!("  {marker} {:<12} {}", item.label, item.description)
        };
        lines.push((color, text));
    }
    frame.draw(&lines, Some((0, cursor_col)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::command::Command;
    use crate::domain::flag::Flag;

    fn index() -> CommandIndex {
        CommandIndex::from_app(
            &App::new("demo")
                .command(Command::new("hello").usage("Say hello").flag(Flag::string("name")))
                .command(
                    Command::new("db")
                        .usage("Database tools")
                        .flag(Flag::string("env"))
                        .subcommand(
                            Command::new("seed")
                                .usage("Seed a table")
                                .flag(Flag::int("rows")),
                        )
                        .subcommand(Command::new("status").usage("Show status")),
                ),
        )
    }

    fn labels(input: &str) -> Vec<String> {
        index()
            .suggest(input)
            .into_iter()
            .map(|item| item.label)
            .collect()
    }

    #[test]
    fn top_level_prefix_includes_builtins() {
        assert_eq!(labels("h"), vec!["help", "hello"]);
        assert_eq!(labels("e"), vec!["exit"]);
        assert!(labels("").is_empty());
    }

    #[test]
    fn subcommands_follow_the_typed_path() {
        assert_eq!(labels("db "), vec!["seed", "status"]);
        assert_eq!(labels("db s"), vec!["seed", "status"]);
        assert_eq!(labels("db st"), vec!["status"]);
        assert!(labels("nope ").is_empty());
    }

    #[test]
    fn flags_come_from_the_deepest_command() {
        assert_eq!(labels("db seed --r"), vec!["--rows"]);
        assert_eq!(labels("db --e"), vec!["--env"]);
        assert!(labels("db seed --rows").is_empty());
    }

    #[test]
    fn completion_replaces_only_the_last_word() {
        let items = index().suggest("db --env=prod se");
        assert_eq!(items[0].completed, "db --env=prod seed ");
    }
}
