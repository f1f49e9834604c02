//! 훅에서 쓰는 하위 프로세스 실행 도우미.
//! 모든 실행은 현재 실행의 취소 신호에 묶이며, 취소되면 자식 프로세스를 죽인다.

use std::future::Future;
use std::process::{ExitStatus, Stdio};

use anyhow::{Context as _, Result, bail};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::process::Command as ProcessCommand;

use crate::domain::log::{LogEvent, LogKind};

use super::Context;

/// `exec`가 모은 출력.
#[derive(Debug, Clone)]
pub struct ExecOutput {
    pub status: ExitStatus,
    pub stdout: String,
    pub stderr: String,
}

impl Context<'_> {
    /// stdout/stderr를 모아 돌려준다. 0이 아닌 종료 코드는 stderr를 담은 오류다.
    pub fn exec(&self, program: &str, args: &[&str]) -> Result<ExecOutput> {
        let cancel = self.cancellation();
        let mut command = process_command(program, args);
        command.stdout(Stdio::piped()).stderr(Stdio::piped());

        self.block_on(async move {
            let child = command
                .spawn()
                .with_context(|| format!("failed to spawn '{program}'"))?;
            let output = tokio::select! {
                output = child.wait_with_output() => {
                    output.with_context(|| format!("'{program}' execution failed"))?
                }
                _ = cancel.cancelled() => bail!("'{program}' cancelled"),
            };

            let stdout = String::from_utf8_lossy(&output.stdout).into_owned();
            let stderr = String::from_utf8_lossy(&output.stderr).into_owned();
            if !output.status.success() {
                bail!(
                    "'{program}' exited with {}: {}",
                    output.status,
                    if stderr.trim().is_empty() {
                        "no stderr output"
                    } else {
                        stderr.trim()
                    }
                );
            }
            Ok::<_, anyhow::Error>(ExecOutput {
                status: output.status,
                stdout,
                stderr,
            })
        })?
    }

    /// stdout 줄은 `Log`, stderr 줄은 `Error` 이벤트로 흘려보낸다.
    /// 두 스트림은 동시에 읽으므로 스트림 사이 순서는 보장하지 않는다.
    pub fn exec_live(&self, program: &str, args: &[&str]) -> Result<()> {
        let cancel = self.cancellation();
        let sink = self.invocation.sink;
        let line = self.command_line();
        let mut command = process_command(program, args);
        command.stdout(Stdio::piped()).stderr(Stdio::piped());

        self.block_on(async move {
            let mut child = command
                .spawn()
                .with_context(|| format!("failed to spawn '{program}'"))?;
            let stdout = child.stdout.take().context("failed to open child stdout")?;
            let stderr = child.stderr.take().context("failed to open child stderr")?;

            let out_reader = async {
                let mut lines = BufReader::new(stdout).lines();
                while let Ok(Some(text)) = lines.next_line().await {
                    sink.emit(LogEvent::new(LogKind::Log, line, text));
                }
            };
            let err_reader = async {
                let mut lines = BufReader::new(stderr).lines();
                while let Ok(Some(text)) = lines.next_line().await {
                    let mut event = LogEvent::new(LogKind::Error, line, text.clone());
                    event.error = Some(text);
                    sink.emit(event);
                }
            };
            // child를 옮겨 두어야 취소 시 future와 함께 drop되며 프로세스가 죽는다.
            let wait = async move {
                tokio::select! {
                    status = child.wait() => {
                        status.with_context(|| format!("'{program}' execution failed"))
                    }
                    _ = cancel.cancelled() => bail!("'{program}' cancelled"),
                }
            };

            let (status, (), ()) = tokio::join!(wait, out_reader, err_reader);
            ensure_success(program, status?)
        })?
    }

    /// 출력은 버리고 종료 상태만 확인한다.
    pub fn exec_silent(&self, program: &str, args: &[&str]) -> Result<()> {
        let cancel = self.cancellation();
        let mut command = process_command(program, args);
        command.stdout(Stdio::null()).stderr(Stdio::null());

        self.block_on(async move {
            let mut child = command
                .spawn()
                .with_context(|| format!("failed to spawn '{program}'"))?;
            let status = tokio::select! {
                status = child.wait() => {
                    status.with_context(|| format!("'{program}' execution failed"))?
                }
                _ = cancel.cancelled() => bail!("'{program}' cancelled"),
            };
            ensure_success(program, status)
        })?
    }

    fn block_on<F: Future>(&self, future: F) -> Result<F::Output> {
        let runtime = self
            .invocation
            .runtime
            .as_ref()
            .context("subprocess helpers need a tokio runtime")?;
        Ok(runtime.block_on(future))
    }
}

fn process_command(program: &str, args: &[&str]) -> ProcessCommand {
    let mut command = ProcessCommand::new(program);
    command.args(args).stdin(Stdio::null()).kill_on_drop(true);
    command
}

fn ensure_success(program: &str, status: ExitStatus) -> Result<()> {
    if !status.success() {
        bail!("'{program}' exited with {status}");
    }
    Ok(())
}
