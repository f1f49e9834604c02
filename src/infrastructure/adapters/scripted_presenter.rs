//! 미리 정해 둔 응답을 순서대로 돌려주는 표시 어댑터.
//! 터미널 없이 훅의 대화형 입력을 검증하는 테스트에서 쓴다.

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;

use crate::application::ports::Presenter;
use crate::domain::interactive::{InteractiveError, InteractiveResponse, Prompt, PromptKind};

#[derive(Default)]
pub struct ScriptedPresenter {
    answers: Mutex<VecDeque<InteractiveResponse>>,
    seen: Mutex<Vec<(PromptKind, String)>>,
}

impl ScriptedPresenter {
    pub fn new(answers: impl IntoIterator<Item = InteractiveResponse>) -> Self {
        Self {
            answers: Mutex::new(answers.into_iter().collect()),
            seen: Mutex::new(Vec::new()),
        }
    }

    pub fn push(&self, answer: InteractiveResponse) {
        if let Ok(mut answers) = self.answers.lock() {
            answers.push_back(answer);
        }
    }

    /// 지금까지 받은 요청의 (종류, 제목) 목록.
    pub fn prompts(&self) -> Vec<(PromptKind, String)> {
        self.seen.lock().map(|seen| seen.clone()).unwrap_or_default()
    }

    pub fn remaining(&self) -> usize {
        self.answers.lock().map(|answers| answers.len()).unwrap_or(0)
    }
}

#[async_trait]
impl Presenter for ScriptedPresenter {
    async fn present(&self, prompt: Prompt) -> InteractiveResponse {
        if let Ok(mut seen) = self.seen.lock() {
            seen.push((prompt.kind(), prompt.title().to_string()));
        }
        let next = self
            .answers
            .lock()
            .map_err(|err| InteractiveError::Presenter(err.to_string()))?
            .pop_front();
        // 준비된 응답이 떨어지면 입력이 끝난 것으로 본다.
        next.unwrap_or(Err(InteractiveError::Closed))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::interactive::{ConfirmParams, PromptAnswer};

    fn confirm(name: &str) -> Prompt {
        Prompt::Confirm(ConfirmParams {
            name: name.into(),
            description: String::new(),
        })
    }

    #[tokio::test]
    async fn answers_in_order_then_closes() {
        let presenter = ScriptedPresenter::new([Ok(PromptAnswer::Confirmed(true))]);
        presenter.push(Ok(PromptAnswer::Confirmed(false)));

        assert_eq!(
            presenter.present(confirm("first")).await.unwrap(),
            PromptAnswer::Confirmed(true)
        );
        assert_eq!(
            presenter.present(confirm("second")).await.unwrap(),
            PromptAnswer::Confirmed(false)
        );
        assert!(matches!(
            presenter.present(confirm("third")).await,
            Err(InteractiveError::Closed)
        ));
        assert_eq!(presenter.remaining(), 0);
        assert_eq!(
            presenter.prompts(),
            vec![
                (PromptKind::Confirm, "first".to_string()),
                (PromptKind::Confirm, "second".to_string()),
                (PromptKind::Confirm, "third".to_string()),
            ]
        );
    }
}
