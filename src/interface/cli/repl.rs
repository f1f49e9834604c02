//! 대화형 쉘(REPL) 인터페이스.
//!
//! 한 줄을 읽으면 블로킹 워커에서 실행 엔진을 돌리고, 현재 태스크는 표시 루프가 되어
//! 로그 이벤트 출력, 대화형 요청 처리, Ctrl+C 취소, 진행 표시 틱을 맡는다.
//! 워커가 끝나야 다음 줄을 읽으므로 실행은 항상 한 번에 하나다.

use std::io::{self, IsTerminal, Write};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use crossterm::cursor;
use crossterm::execute;
use crossterm::terminal::{self, ClearType};
use tokio::sync::mpsc;
use tokio::time::MissedTickBehavior;
use tracing::{debug, warn};

use crate::application::bridge::InteractiveBridge;
use crate::application::context::Cancellation;
use crate::application::ports::{LogSink, Presenter};
use crate::domain::app::App;
use crate::domain::interactive::InteractiveRequest;
use crate::domain::log::{LogEvent, LogKind};
use crate::infrastructure::adapters::{ChannelLogSink, ConsoleLogSink, TextHelpRenderer};
use crate::infrastructure::terminal::clip_line_display;
use crate::interface::cli::composition::{AppComposition, run_command_usecase};
use crate::interface::cli::repl_input::{CommandIndex, read_repl_input};

const SPINNER: [&str; 8] = ["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧"];
const BANNER_WIDTH: usize = 58;

/// 입력이 끝나거나(`exit`, EOF) 오류가 날 때까지 쉘을 돌린다.
pub async fn run_repl(app: App, composition: &AppComposition, prompt: &str) -> Result<()> {
    app.validate().context("invalid command tree")?;
    print_welcome(&app, !app.params.no_color);
    io::stdout().flush()?;

    let index = Arc::new(CommandIndex::from_app(&app));
    let mut shell = Shell::new(app, composition);
    let mut history: Vec<String> = Vec::new();

    loop {
        let Some(raw_input) = read_input(prompt, &index, &history).await? else {
            println!();
            break;
        };
        let input = raw_input.trim().to_string();

        match input.as_str() {
            "" => continue,
            "exit" => break,
            "help" => shell.show_help(composition)?,
            _ => shell.run_line(&input).await,
        }

        if history.last() != Some(&input) {
            history.push(input);
        }
    }

    Ok(())
}

async fn read_input(
    prompt: &str,
    index: &Arc<CommandIndex>,
    history: &[String],
) -> Result<Option<String>> {
    let prompt = prompt.to_string();
    let index = Arc::clone(index);
    let history = history.to_vec();
    tokio::task::spawn_blocking(move || read_repl_input(&prompt, &index, &history))
        .await
        .context("input reader stopped unexpectedly")?
}

/// 실행 사이에 유지되는 쉘 상태. 채널 수신측은 실행마다 새로 만들지 않는다.
struct Shell {
    app: Arc<Mutex<App>>,
    sink: Arc<ChannelLogSink>,
    logs: mpsc::UnboundedReceiver<LogEvent>,
    bridge: InteractiveBridge,
    requests: mpsc::UnboundedReceiver<InteractiveRequest>,
    console: Arc<ConsoleLogSink>,
    renderer: Arc<TextHelpRenderer>,
    presenter: Arc<dyn Presenter>,
    tick: Duration,
}

impl Shell {
    fn new(app: App, composition: &AppComposition) -> Self {
        let tick = Duration::from_millis(app.params.tick_ms.max(1));
        let (sink, logs) = ChannelLogSink::new();
        let (bridge, requests) = InteractiveBridge::embedded();
        Self {
            app: Arc::new(Mutex::new(app)),
            sink: Arc::new(sink),
            logs,
            bridge,
            requests,
            console: composition.console(),
            renderer: composition.help_renderer(),
            presenter: composition.presenter(),
            tick,
        }
    }

    fn show_help(&self, composition: &AppComposition) -> Result<()> {
        let app = self.app.lock().unwrap_or_else(PoisonError::into_inner);
        composition.show_help_usecase().execute(&app, "help")
    }

    /// 한 줄을 실행하고 워커가 끝날 때까지 표시 루프를 돈다.
    async fn run_line(&mut self, line: &str) {
        self.console
            .emit(LogEvent::new(LogKind::CommandRunning, line, line));

        let cancel = Cancellation::new();
        let worker = {
            let app = Arc::clone(&self.app);
            let sink = Arc::clone(&self.sink);
            let renderer = Arc::clone(&self.renderer);
            let bridge = self.bridge.clone();
            let cancel = cancel.clone();
            let line = line.to_string();
            tokio::task::spawn_blocking(move || {
                let mut app = app.lock().unwrap_or_else(PoisonError::into_inner);
                // 결과는 종료 이벤트로 이미 싱크에 나갔다.
                let _ = run_command_usecase(sink.as_ref(), renderer.as_ref(), &bridge)
                    .execute(&mut app, &line, cancel);
            })
        };
        tokio::pin!(worker);

        let Shell {
            logs,
            requests,
            console,
            presenter,
            tick,
            ..
        } = self;
        let (closed_tx, mut closed_rx) = mpsc::unbounded_channel::<()>();
        // 대화형 화면이 떠 있는 동안 온 로그는 화면이 닫힐 때까지 모아 둔다.
        let mut held: Vec<LogEvent> = Vec::new();
        let mut prompt_open = false;
        let mut status = StatusLine::new(line, io::stdout().is_terminal());
        let mut ticker = tokio::time::interval(*tick);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            tokio::select! {
                Some(event) = logs.recv() => {
                    if prompt_open {
                        held.push(event);
                    } else {
                        status.clear();
                        console.emit(event);
                    }
                }
                Some(request) = requests.recv(), if !prompt_open => {
                    status.clear();
                    prompt_open = true;
                    debug!(id = %request.id, kind = %request.kind(), "opening prompt");
                    let presenter = Arc::clone(presenter);
                    let closed = closed_tx.clone();
                    tokio::spawn(async move {
                        let answer = presenter.present(request.prompt.clone()).await;
                        if !request.respond(answer) {
                            debug!("prompt answer dropped; command already finished");
                        }
                        let _ = closed.send(());
                    });
                }
                Some(()) = closed_rx.recv() => {
                    prompt_open = false;
                    for event in held.drain(..) {
                        console.emit(event);
                    }
                }
                joined = &mut worker => {
                    status.clear();
                    if let Err(err) = joined {
                        warn!(error = %err, "command worker stopped unexpectedly");
                    }
                    break;
                }
                signal = tokio::signal::ctrl_c(), if !prompt_open => {
                    match signal {
                        Ok(()) => {
                            debug!(line, "ctrl-c received; cancelling command");
                            cancel.cancel();
                        }
                        Err(err) => warn!(error = %err, "cannot listen for ctrl-c"),
                    }
                }
                _ = ticker.tick(), if !prompt_open => status.tick(),
            }
        }

        // 워커가 끝난 뒤 남은 이벤트를 순서대로 내보낸다.
        for event in held.drain(..) {
            console.emit(event);
        }
        while let Ok(event) = logs.try_recv() {
            console.emit(event);
        }
    }
}

/// 실행 중 한 줄짜리 진행 표시. 로그를 찍기 전에는 항상 지운다.
struct StatusLine {
    label: String,
    enabled: bool,
    started: Instant,
    frame: usize,
    drawn: bool,
}

impl StatusLine {
    fn new(label: &str, enabled: bool) -> Self {
        Self {
            label: label.to_string(),
            enabled,
            started: Instant::now(),
            frame: 0,
            drawn: false,
        }
    }

    fn tick(&mut self) {
        if !self.enabled {
            return;
        }
        let spinner = SPINNER[self.frame % SPINNER.len()];
        self.frame += 1;
        let text = format!(
            "{spinner} {} {:.1}s",
            self.label,
            self.started.elapsed().as_secs_f32()
        );
        let width = terminal::size().map(|(w, _)| w as usize).unwrap_or(80);
        let mut stdout = io::stdout();
        let _ = execute!(
            stdout,
            cursor::MoveToColumn(0),
            terminal::Clear(ClearType::CurrentLine)
        );
        let _ = write!(stdout, "{}", clip_line_display(&text, width.saturating_sub(1)));
        let _ = stdout.flush();
        self.drawn = true;
    }

    fn clear(&mut self) {
        if !self.drawn {
            return;
        }
        let mut stdout = io::stdout();
        let _ = execute!(
            stdout,
            cursor::MoveToColumn(0),
            terminal::Clear(ClearType::CurrentLine)
        );
        let _ = stdout.flush();
        self.drawn = false;
    }
}

fn print_welcome(app: &App, color: bool) {
    let interactive = color && io::stdout().is_terminal();
    let border = format!("+{}+", "-".repeat(BANNER_WIDTH + 2));

    println!("{border}");
    println!("| {} |", paint(&box_line(&app.name), "1;36", interactive));
    if !app.usage.is_empty() {
        println!("| {} |", paint(&box_line(&app.usage), "2;37", interactive));
    }
    println!("{border}");
    for command in &app.commands {
        let line = box_line(&format!(" {:<10} {}", command.name, command.usage));
        println!("| {} |", paint(&line, "32", interactive));
    }
    println!("{border}");
    println!(
        "| {} |",
        box_line(" help · exit · Tab autocomplete · ↑↓ history · --help on any command")
    );
    println!("{border}");
    println!();
}

/// 배너 폭에 맞춰 자르고 채운다. 색은 채운 뒤에 입힌다.
fn box_line(text: &str) -> String {
    let clipped = clip_line_display(text, BANNER_WIDTH);
    let used = crate::infrastructure::terminal::display_width(&clipped);
    format!("{clipped}{}", " ".repeat(BANNER_WIDTH.saturating_sub(used)))
}

fn paint(text: &str, ansi: &str, interactive: bool) -> String {
    if interactive {
        format!("\x1b[{ansi}m{text}\x1b[0m")
    } else {
        text.to_string()
    }
}
