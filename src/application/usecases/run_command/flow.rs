//! AST를 실제 명령 객체에 바인딩해 실행 흐름을 만든다.

use std::iter;

use tracing::debug;

use crate::domain::ast::Ast;
use crate::domain::command::{Command, Commands};
use crate::domain::error::ReplError;

/// 최상위 → 말단 순서의 실행 흐름을 만든다.
/// 중간에 하나라도 실패하면 부분 흐름 없이 첫 오류를 돌려준다.
pub fn create_command_flow<'c>(
    commands: &'c mut Commands,
    ast: &Ast,
) -> Result<Vec<&'c Command>, ReplError> {
    let path: Vec<&str> = iter::once(ast.command.as_str())
        .chain(ast.subcommands.iter().map(String::as_str))
        .collect();
    let leaf = path.len() - 1;

    for (depth, name) in path.iter().enumerate() {
        let command = commands.get_command_mut(name)?;
        insert_data_in_command(command, ast, depth == leaf)?;
    }

    let commands: &'c Commands = commands;
    let flow = path
        .iter()
        .map(|name| commands.get_command(name))
        .collect::<Result<Vec<_>, _>>()?;
    debug!(flow = ?path, "command flow ready");
    Ok(flow)
}

/// AST에 기록된 값을 명령 하나에 바인딩한다.
///
/// 같은 플래그가 여러 번 나오면 첫 번째 값만 쓴다. 이름으로 기록된 값을 별칭보다
/// 먼저 본다. 위치 인자는 말단 명령에만 바인딩한다.
pub fn insert_data_in_command(
    command: &mut Command,
    ast: &Ast,
    is_leaf: bool,
) -> Result<(), ReplError> {
    let scope = command.name.as_str();
    for flag in command.flags.iter_mut() {
        let occurrence = ast
            .flag_occurrences(scope, flag.name())
            .or_else(|| {
                flag.alias_name()
                    .and_then(|alias| ast.flag_occurrences(scope, alias))
            })
            .and_then(<[_]>::first);
        if let Some(occurrence) = occurrence {
            flag.parse(&occurrence.value)?;
        }
    }

    if !is_leaf {
        return Ok(());
    }

    for argument in command.arguments.iter_mut() {
        let value = ast
            .argument(&argument.name)
            .ok_or_else(|| ReplError::ArgumentNotFound(scope.to_string()))?;
        argument.set_value(value);
    }
    Ok(())
}
