//! 한 줄 입력을 해석한 결과(AST).
//! 파서와 실행 엔진 사이의 고정 계약이다.

use std::collections::HashMap;

use crate::domain::flag::FlagType;

/// AST 안에 기록된 플래그 발생 한 건.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AstFlag {
    pub flag_type: FlagType,
    pub value: String,
}

/// 말단 명령의 인자 정의 이름에 맞춰 묶인 위치 값.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AstArgument {
    pub name: String,
    pub value: String,
}

/// 명령 이름 → 플래그 이름 → 입력 순서대로 쌓인 발생 목록.
pub type AstFlags = HashMap<String, HashMap<String, Vec<AstFlag>>>;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Ast {
    /// 최상위 명령 이름.
    pub command: String,
    /// 사용자가 입력한 원문 그대로.
    pub full_command: String,
    /// 최상위부터 가장 안쪽 하위 명령까지의 경로.
    pub command_tree: Vec<String>,
    /// `command_tree`에서 최상위를 뺀 부분.
    pub subcommands: Vec<String>,
    pub arguments: Vec<AstArgument>,
    pub flags: AstFlags,
    /// 수집된 위치 토큰 전체(이름이 붙지 않은 잉여분 포함).
    pub args: Vec<String>,
}

impl Ast {
    /// 해석된 가장 안쪽 명령 이름.
    pub fn leaf(&self) -> &str {
        self.command_tree
            .last()
            .map(String::as_str)
            .unwrap_or(&self.command)
    }

    /// 특정 명령 범위에 기록된 플래그 발생 목록.
    pub fn flag_occurrences(&self, command: &str, flag: &str) -> Option<&[AstFlag]> {
        self.flags
            .get(command)
            .and_then(|flags| flags.get(flag))
            .map(Vec::as_slice)
    }

    pub fn argument(&self, name: &str) -> Option<&str> {
        self.arguments
            .iter()
            .find(|arg| arg.name == name)
            .map(|arg| arg.value.as_str())
    }
}
