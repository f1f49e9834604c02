//! 입력 줄 → AST 변환.
//! 토큰화 후 명령 스키마를 따라 경로를 해석하고, 플래그/위치 인자를 기록한다.

mod schema;
mod tokenizer;

use tracing::debug;

use crate::domain::ast::{Ast, AstArgument, AstFlag};
use crate::domain::error::ReplError;
use crate::domain::flag::FlagType;

pub use schema::{
    ArgsSchema, CommandSchema, FlagSchema, GLOBAL_FLAG_SCOPE, Schemas, create_args_schema,
    create_command_schema, create_flag_schema,
};
pub use tokenizer::tokenize;

/// 스키마 묶음으로 입력 줄을 해석한다.
pub fn parse_line(schemas: &Schemas<'_>, input: &str) -> Result<Ast, ReplError> {
    parse_command(&schemas.commands, &schemas.flags, &schemas.args, input)
}

pub fn parse_command(
    commands: &[CommandSchema],
    flag_schema: &FlagSchema,
    args_schema: &ArgsSchema<'_>,
    input: &str,
) -> Result<Ast, ReplError> {
    let tokens = tokenize(input)?;
    let Some(first) = tokens.first() else {
        return Err(ReplError::CommandEmpty);
    };

    let mut current = commands
        .iter()
        .find(|schema| &schema.name == first)
        .ok_or_else(|| ReplError::UnknownCommand(first.clone()))?;

    let mut ast = Ast {
        command: first.clone(),
        command_tree: vec![first.clone()],
        ..Ast::default()
    };
    let mut positional: Vec<String> = Vec::new();
    let mut in_args = false;
    let mut skip: Option<usize> = None;

    for i in 1..tokens.len() {
        if skip == Some(i) {
            continue;
        }
        let token = &tokens[i];

        if token == "--" {
            in_args = true;
            continue;
        }
        if in_args {
            positional.push(token.clone());
            continue;
        }

        if token.starts_with('-') {
            let scope = current.name.as_str();
            let (name, value) = match token.split_once('=') {
                Some((left, right)) => (left.trim_start_matches('-'), right.to_string()),
                None => {
                    let name = token.trim_start_matches('-');
                    let next = tokens.get(i + 1);
                    let presence_only = lookup_flag_type(flag_schema, scope, name)
                        == FlagType::Bool
                        || next.is_none_or(|next| next.starts_with('-'));
                    if presence_only {
                        (name, "true".to_string())
                    } else {
                        skip = Some(i + 1);
                        (name, tokens[i + 1].clone())
                    }
                }
            };

            let flag_type = lookup_flag_type(flag_schema, scope, name);
            ast.flags
                .entry(scope.to_string())
                .or_default()
                .entry(name.to_string())
                .or_default()
                .push(AstFlag { flag_type, value });
            continue;
        }

        // 자식이 없는 명령 뒤의 토큰은 모두 위치 인자다.
        if current.subcommands.is_empty() {
            positional.push(token.clone());
            continue;
        }

        current = current
            .subcommands
            .iter()
            .find(|schema| &schema.name == token)
            .ok_or_else(|| ReplError::UnknownSubcommand(token.clone()))?;
        ast.command_tree.push(token.clone());
        ast.subcommands.push(token.clone());
    }

    let leaf = current.name.as_str();
    let expected = args_schema.get(leaf).copied().unwrap_or_default();
    if positional.len() < expected.len() {
        return Err(ReplError::ArgumentNotFound(leaf.to_string()));
    }
    ast.arguments = expected
        .iter()
        .zip(&positional)
        .map(|(def, value)| AstArgument {
            name: def.name.clone(),
            value: value.clone(),
        })
        .collect();
    ast.args = positional;
    ast.full_command = input.to_string();

    debug!(
        command = %ast.command,
        path = ?ast.command_tree,
        args = ast.args.len(),
        "parsed command line"
    );
    Ok(ast)
}

/// 현재 명령 범위 → `global` 범위 순으로 찾고, 모두 없으면 `Int`.
/// 명령 범위에서 `Int`로 선언된 플래그도 `global` 조회를 한 번 더 거친다.
fn lookup_flag_type(schema: &FlagSchema, scope: &str, name: &str) -> FlagType {
    let scoped = schema
        .get(scope)
        .and_then(|flags| flags.get(name))
        .copied()
        .unwrap_or_default();
    if scoped != FlagType::Int {
        return scoped;
    }

    let global = schema
        .get(GLOBAL_FLAG_SCOPE)
        .and_then(|flags| flags.get(name))
        .copied();
    if global.is_none() && !schema.get(scope).is_some_and(|flags| flags.contains_key(name)) {
        debug!(flag = name, scope, "unknown flag, treating as int");
    }
    global.unwrap_or_default()
}
