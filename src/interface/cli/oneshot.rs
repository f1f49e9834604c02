//! 프로세스 인자로 받은 명령 한 줄을 실행하고 끝나는 one-shot 실행기.
//!
//! 대화형 입력은 요청마다 표시 태스크를 새로 띄우는 one-shot 다리로 처리하고,
//! 로그는 콘솔 싱크로 즉시 출력한다.

use anyhow::{Context, Result};
use tokio::runtime::Handle;
use tracing::{debug, warn};

use crate::application::bridge::InteractiveBridge;
use crate::application::context::Cancellation;
use crate::domain::app::App;
use crate::interface::cli::composition::{AppComposition, run_command_usecase};

/// 실행 결과가 성공이면 `true`. 도움말 출력도 성공으로 본다.
pub async fn run_once(app: App, composition: &AppComposition, args: &[String]) -> Result<bool> {
    app.validate().context("invalid command tree")?;

    let line = shell_join(args);
    let trimmed = line.trim();
    if trimmed.is_empty() || trimmed == "help" {
        composition.show_help_usecase().execute(&app, trimmed)?;
        return Ok(true);
    }

    let console = composition.console();
    let renderer = composition.help_renderer();
    let bridge = InteractiveBridge::one_shot(composition.presenter(), Handle::current());
    let cancel = Cancellation::new();
    let worker_cancel = cancel.clone();
    debug!(line = %line, "one-shot run");

    let worker = tokio::task::spawn_blocking(move || {
        let mut app = app;
        run_command_usecase(console.as_ref(), renderer.as_ref(), &bridge)
            .execute(&mut app, &line, worker_cancel)
            .is_ok()
    });
    tokio::pin!(worker);

    loop {
        tokio::select! {
            joined = &mut worker => {
                return joined.context("command worker stopped unexpectedly");
            }
            signal = tokio::signal::ctrl_c() => {
                if let Err(err) = signal {
                    warn!(error = %err, "cannot listen for ctrl-c");
                    return (&mut worker).await.context("command worker stopped unexpectedly");
                }
                debug!("ctrl-c received; cancelling command");
                cancel.cancel();
            }
        }
    }
}

/// 인자 배열을 토크나이저가 다시 같은 토큰으로 나누는 한 줄로 합친다.
/// 빈 인자는 토큰이 되지 않으므로 사라진다.
pub fn shell_join(args: &[String]) -> String {
    args.iter()
        .map(|arg| quote_arg(arg))
        .collect::<Vec<_>>()
        .join(" ")
}

fn quote_arg(arg: &str) -> String {
    let needs_escape = arg
        .chars()
        .any(|ch| ch.is_whitespace() || matches!(ch, '"' | '\'' | '\\'));
    if !needs_escape {
        return arg.to_string();
    }
    let mut out = String::with_capacity(arg.len() + 4);
    for ch in arg.chars() {
        if ch.is_whitespace() || matches!(ch, '"' | '\'' | '\\') {
            out.push('\\');
        }
        out.push(ch);
    }
    out
}
