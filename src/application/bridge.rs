//! 실행 중인 훅이 사용자 입력을 동기적으로 받아오는 다리.
//!
//! 훅은 블로킹 워커 스레드에서 돌기 때문에 응답을 `blocking_recv`로 기다린다.
//! 비동기 태스크 안에서 `request`를 부르면 tokio가 panic하므로, 엔진은 항상
//! `spawn_blocking` 위에서 실행해야 한다.
//!
//! 토폴로지:
//! - `Embedded`: 오래 사는 REPL 표시 루프가 공용 채널로 요청을 받는다.
//! - `OneShot`: 요청마다 표시 태스크를 새로 띄우고, 그 태스크가 끝났다는 신호까지
//!   기다린 뒤 돌아온다.
//! - `Disabled`: 모든 요청이 `NotInteractive`로 실패한다.

use std::fmt;
use std::sync::Arc;

use tokio::runtime::Handle;
use tokio::sync::{mpsc, oneshot};
use tracing::debug;

use crate::application::ports::Presenter;
use crate::domain::interactive::{
    ConfirmParams, InputFileParams, InputFileResult, InputIntParams, InputTextParams,
    InteractiveError, InteractiveRequest, InteractiveResponse, Prompt, PromptAnswer, PromptKind,
    SelectOneParams, SelectOneResult,
};

#[derive(Clone, Default)]
pub enum InteractiveBridge {
    Embedded {
        requests: mpsc::UnboundedSender<InteractiveRequest>,
    },
    OneShot {
        presenter: Arc<dyn Presenter>,
        runtime: Handle,
    },
    #[default]
    Disabled,
}

impl InteractiveBridge {
    /// 표시 루프가 소비할 요청 채널과 함께 embedded 다리를 만든다.
    pub fn embedded() -> (Self, mpsc::UnboundedReceiver<InteractiveRequest>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self::Embedded { requests: tx }, rx)
    }

    pub fn one_shot(presenter: Arc<dyn Presenter>, runtime: Handle) -> Self {
        Self::OneShot { presenter, runtime }
    }

    /// 요청 하나를 보내고 응답이 올 때까지 현재 스레드를 막는다.
    pub fn request(&self, prompt: Prompt) -> InteractiveResponse {
        match self {
            InteractiveBridge::Disabled => Err(InteractiveError::NotInteractive),
            InteractiveBridge::Embedded { requests } => {
                let (request, response) = InteractiveRequest::new(prompt);
                debug!(id = %request.id, kind = %request.kind(), "interactive request (embedded)");
                if requests.send(request).is_err() {
                    return Err(InteractiveError::Closed);
                }
                response.blocking_recv().unwrap_or(Err(InteractiveError::Closed))
            }
            InteractiveBridge::OneShot { presenter, runtime } => {
                let (request, response) = InteractiveRequest::new(prompt);
                let (close_tx, close_rx) = oneshot::channel::<()>();
                debug!(id = %request.id, kind = %request.kind(), "interactive request (one-shot)");

                let presenter = Arc::clone(presenter);
                runtime.spawn(async move {
                    let answer = presenter.present(request.prompt.clone()).await;
                    request.respond(answer);
                    let _ = close_tx.send(());
                });

                let answer = response.blocking_recv().unwrap_or(Err(InteractiveError::Closed));
                // 표시 세션이 완전히 끝난 뒤에 돌아간다.
                let _ = close_rx.blocking_recv();
                answer
            }
        }
    }

    pub fn select_one(&self, params: SelectOneParams) -> Result<SelectOneResult, InteractiveError> {
        match self.request(Prompt::SelectOne(params))? {
            PromptAnswer::Selected(result) => Ok(result),
            other => Err(unexpected(PromptKind::SelectOne, &other)),
        }
    }

    pub fn input_text(&self, params: InputTextParams) -> Result<String, InteractiveError> {
        match self.request(Prompt::InputText(params))? {
            PromptAnswer::Text(text) => Ok(text),
            other => Err(unexpected(PromptKind::InputText, &other)),
        }
    }

    pub fn input_int(&self, params: InputIntParams) -> Result<i64, InteractiveError> {
        match self.request(Prompt::InputInt(params))? {
            PromptAnswer::Int(value) => Ok(value),
            other => Err(unexpected(PromptKind::InputInt, &other)),
        }
    }

    pub fn input_file(&self, params: InputFileParams) -> Result<InputFileResult, InteractiveError> {
        match self.request(Prompt::InputFile(params))? {
            PromptAnswer::File(file) => Ok(file),
            other => Err(unexpected(PromptKind::InputFile, &other)),
        }
    }

    pub fn confirm(&self, params: ConfirmParams) -> Result<bool, InteractiveError> {
        match self.request(Prompt::Confirm(params))? {
            PromptAnswer::Confirmed(value) => Ok(value),
            other => Err(unexpected(PromptKind::Confirm, &other)),
        }
    }
}

fn unexpected(expected: PromptKind, answer: &PromptAnswer) -> InteractiveError {
    InteractiveError::UnexpectedAnswer {
        expected,
        actual: answer.kind(),
    }
}

impl fmt::Debug for InteractiveBridge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mode = match self {
            InteractiveBridge::Embedded { .. } => "embedded",
            InteractiveBridge::OneShot { .. } => "one-shot",
            InteractiveBridge::Disabled => "disabled",
        };
        f.debug_tuple("InteractiveBridge").field(&mode).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::interactive::SelectItem;
    use async_trait::async_trait;

    struct Fixed(PromptAnswer);

    #[async_trait]
    impl Presenter for Fixed {
        async fn present(&self, _prompt: Prompt) -> InteractiveResponse {
            Ok(self.0.clone())
        }
    }

    #[test]
    fn disabled_bridge_refuses_requests() {
        let bridge = InteractiveBridge::default();
        let err = bridge.confirm(ConfirmParams::default()).unwrap_err();
        assert!(matches!(err, InteractiveError::NotInteractive));
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn embedded_request_waits_for_the_presentation_loop() {
        let (bridge, mut requests) = InteractiveBridge::embedded();
        let loop_task = tokio::spawn(async move {
            let request = requests.recv().await.unwrap();
            assert_eq!(request.kind(), PromptKind::SelectOne);
            let item = SelectItem::new("b", "Beta");
            request.respond(Ok(PromptAnswer::Selected(SelectOneResult {
                selected_id: item.id.clone(),
                selected_item: item,
            })));
        });

        let picked = tokio::task::spawn_blocking(move || {
            bridge.select_one(SelectOneParams {
                name: "Pick".into(),
                items: vec![SelectItem::new("a", "Alpha"), SelectItem::new("b", "Beta")],
                ..Default::default()
            })
        })
        .await
        .unwrap()
        .unwrap();

        assert_eq!(picked.selected_id, "b");
        loop_task.await.unwrap();
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn dropped_request_surfaces_as_closed() {
        let (bridge, mut requests) = InteractiveBridge::embedded();
        tokio::spawn(async move {
            drop(requests.recv().await);
        });
        let err = tokio::task::spawn_blocking(move || bridge.input_text(InputTextParams::default()))
            .await
            .unwrap()
            .unwrap_err();
        assert!(matches!(err, InteractiveError::Closed));
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn one_shot_request_runs_its_own_presenter() {
        let bridge = InteractiveBridge::one_shot(
            Arc::new(Fixed(PromptAnswer::Int(7))),
            Handle::current(),
        );
        let value = tokio::task::spawn_blocking(move || bridge.input_int(InputIntParams::default()))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(value, 7);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn mismatched_answer_kind_is_reported() {
        let bridge = InteractiveBridge::one_shot(
            Arc::new(Fixed(PromptAnswer::Text("yes".into()))),
            Handle::current(),
        );
        let err = tokio::task::spawn_blocking(move || bridge.confirm(ConfirmParams::default()))
            .await
            .unwrap()
            .unwrap_err();
        assert!(matches!(
            err,
            InteractiveError::UnexpectedAnswer {
                expected: PromptKind::Confirm,
                actual: PromptKind::InputText
            }
        ));
    }
}
