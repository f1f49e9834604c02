//! 실행 중인 훅과 표시 계층 사이의 대화형 요청/응답 계약.
//!
//! 요청 하나에는 응답 하나만 보낼 수 있다. 응답 송신자는 `respond`가 소비하므로
//! 두 번 응답하는 코드는 컴파일되지 않는다.

use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

use tokio::sync::oneshot;
use uuid::Uuid;

/// 입력 문자열 검증기. `false`면 입력을 받아들이지 않는다.
pub type InputValidator = Arc<dyn Fn(&str) -> bool + Send + Sync>;

#[derive(Debug, thiserror::Error)]
pub enum InteractiveError {
    /// 사용자가 Esc/Ctrl+C로 입력을 취소했다.
    #[error("input cancelled by user")]
    Cancelled,

    /// 표시 계층이 응답 없이 요청을 버렸다.
    #[error("interactive session closed before answering")]
    Closed,

    /// 대화형 입력을 받을 수 없는 실행 환경.
    #[error("interactive input is not available in this mode")]
    NotInteractive,

    #[error("expected {expected} answer, got {actual}")]
    UnexpectedAnswer {
        expected: PromptKind,
        actual: PromptKind,
    },

    #[error("presenter failed: {0}")]
    Presenter(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PromptKind {
    SelectOne,
    InputText,
    InputInt,
    InputFile,
    Confirm,
}

impl fmt::Display for PromptKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            PromptKind::SelectOne => "select-one",
            PromptKind::InputText => "input-text",
            PromptKind::InputInt => "input-int",
            PromptKind::InputFile => "input-file",
            PromptKind::Confirm => "confirm",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SelectItem {
    pub id: String,
    pub name: String,
    pub description: String,
}

impl SelectItem {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            description: String::new(),
        }
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }
}

#[derive(Debug, Clone, Default)]
pub struct SelectOneParams {
    pub name: String,
    pub description: String,
    pub items: Vec<SelectItem>,
}

#[derive(Clone, Default)]
pub struct InputTextParams {
    pub name: String,
    pub description: String,
    pub placeholder: String,
    pub is_password: bool,
    pub validate: Option<InputValidator>,
    /// 0이면 길이 제한 없음.
    pub max_length: usize,
}

#[derive(Clone, Default)]
pub struct InputIntParams {
    pub name: String,
    pub description: String,
    /// 0이면 하한 없음.
    pub min_value: i64,
    /// 0이면 상한 없음.
    pub max_value: i64,
    pub validate: Option<InputValidator>,
}

#[derive(Debug, Clone, Default)]
pub struct InputFileParams {
    pub name: String,
    pub description: String,
    /// 허용 확장자(".json" 형식, 대소문자 무시). 비어 있으면 모두 허용.
    pub extensions: Vec<String>,
    /// KB 단위. 0이면 제한 없음.
    pub max_file_size_kb: u64,
    /// true면 파일 내용을 읽지 않고 경로만 돌려준다.
    pub do_not_output: bool,
}

#[derive(Debug, Clone, Default)]
pub struct ConfirmParams {
    pub name: String,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectOneResult {
    pub selected_id: String,
    pub selected_item: SelectItem,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InputFileResult {
    pub path: PathBuf,
    pub contents: Vec<u8>,
}

/// 요청 종류별 파라미터.
#[derive(Debug, Clone)]
pub enum Prompt {
    SelectOne(SelectOneParams),
    InputText(InputTextParams),
    InputInt(InputIntParams),
    InputFile(InputFileParams),
    Confirm(ConfirmParams),
}

impl Prompt {
    pub fn kind(&self) -> PromptKind {
        match self {
            Prompt::SelectOne(_) => PromptKind::SelectOne,
            Prompt::InputText(_) => PromptKind::InputText,
            Prompt::InputInt(_) => PromptKind::InputInt,
            Prompt::InputFile(_) => PromptKind::InputFile,
            Prompt::Confirm(_) => PromptKind::Confirm,
        }
    }

    pub fn title(&self) -> &str {
        match self {
            Prompt::SelectOne(p) => &p.name,
            Prompt::InputText(p) => &p.name,
            Prompt::InputInt(p) => &p.name,
            Prompt::InputFile(p) => &p.name,
            Prompt::Confirm(p) => &p.name,
        }
    }
}

/// 요청 종류별 결과값.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PromptAnswer {
    Selected(SelectOneResult),
    Text(String),
    Int(i64),
    File(InputFileResult),
    Confirmed(bool),
}

impl PromptAnswer {
    pub fn kind(&self) -> PromptKind {
        match self {
            PromptAnswer::Selected(_) => PromptKind::SelectOne,
            PromptAnswer::Text(_) => PromptKind::InputText,
            PromptAnswer::Int(_) => PromptKind::InputInt,
            PromptAnswer::File(_) => PromptKind::InputFile,
            PromptAnswer::Confirmed(_) => PromptKind::Confirm,
        }
    }
}

pub type InteractiveResponse = Result<PromptAnswer, InteractiveError>;

/// 훅이 표시 계층에 보내는 요청 한 건.
pub struct InteractiveRequest {
    pub id: String,
    pub prompt: Prompt,
    responder: oneshot::Sender<InteractiveResponse>,
}

impl InteractiveRequest {
    /// 새 id와 일회용 응답 채널을 만든다.
    pub fn new(prompt: Prompt) -> (Self, oneshot::Receiver<InteractiveResponse>) {
        let (tx, rx) = oneshot::channel();
        let request = Self {
            id: Uuid::new_v4().to_string(),
            prompt,
            responder: tx,
        };
        (request, rx)
    }

    pub fn kind(&self) -> PromptKind {
        self.prompt.kind()
    }

    /// 응답을 보낸다. 요청자가 이미 사라졌으면 `false`.
    pub fn respond(self, response: InteractiveResponse) -> bool {
        self.responder.send(response).is_ok()
    }
}

impl fmt::Debug for InteractiveRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InteractiveRequest")
            .field("id", &self.id)
            .field("prompt", &self.prompt)
            .finish()
    }
}

impl fmt::Debug for InputTextParams {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InputTextParams")
            .field("name", &self.name)
            .field("description", &self.description)
            .field("placeholder", &self.placeholder)
            .field("is_password", &self.is_password)
            .field("validate", &self.validate.is_some())
            .field("max_length", &self.max_length)
            .finish()
    }
}

impl fmt::Debug for InputIntParams {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InputIntParams")
            .field("name", &self.name)
            .field("description", &self.description)
            .field("min_value", &self.min_value)
            .field("max_value", &self.max_value)
            .field("validate", &self.validate.is_some())
            .finish()
    }
}
