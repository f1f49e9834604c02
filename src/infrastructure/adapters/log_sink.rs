//! 로그 싱크 포트 구현 어댑터.

use std::io::{self, Write};
use std::sync::Mutex;

use tokio::sync::mpsc;
use tracing::debug;

use crate::application::ports::LogSink;
use crate::domain::log::LogEvent;
use crate::infrastructure::render::{Palette, render_log_event};

/// 이벤트를 즉시 stdout에 한 줄씩 출력하는 어댑터(one-shot 실행용).
pub struct ConsoleLogSink {
    palette: Palette,
    // 여러 워커 스레드의 출력이 한 줄 안에서 섞이지 않게 한다.
    lock: Mutex<()>,
}

impl ConsoleLogSink {
    pub fn new(color: bool) -> Self {
        Self {
            palette: Palette::new(color),
            lock: Mutex::new(()),
        }
    }

    pub fn palette(&self) -> Palette {
        self.palette
    }
}

impl LogSink for ConsoleLogSink {
    fn emit(&self, event: LogEvent) {
        let line = render_log_event(&event, self.palette);
        let _held = self.lock.lock();
        let mut out = io::stdout().lock();
        let _ = writeln!(out, "{line}");
        let _ = out.flush();
    }
}

/// 이벤트를 표시 루프로 넘기는 어댑터(embedded REPL용).
/// 수신측이 사라진 뒤의 이벤트는 버린다.
pub struct ChannelLogSink {
    tx: mpsc::UnboundedSender<LogEvent>,
}

impl ChannelLogSink {
    pub fn new() -> (Self, mpsc::UnboundedReceiver<LogEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }
}

impl LogSink for ChannelLogSink {
    fn emit(&self, event: LogEvent) {
        if let Err(err) = self.tx.send(event) {
            debug!(kind = ?err.0.kind, "log event dropped; display loop is gone");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::log::LogKind;

    #[test]
    fn channel_sink_forwards_in_order() {
        let (sink, mut rx) = ChannelLogSink::new();
        sink.emit(LogEvent::new(LogKind::Log, "a", "one"));
        sink.emit(LogEvent::success("a"));

        assert_eq!(rx.try_recv().unwrap().message, "one");
        assert_eq!(rx.try_recv().unwrap().kind, LogKind::CommandSuccess);
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn channel_sink_ignores_closed_receiver() {
        let (sink, rx) = ChannelLogSink::new();
        drop(rx);
        sink.emit(LogEvent::new(LogKind::Warn, "a", "nobody listens"));
    }
}
