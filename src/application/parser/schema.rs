//! 명령 트리에서 파서용 읽기 전용 스키마를 뽑아낸다.

use std::collections::HashMap;

use crate::domain::argument::Argument;
use crate::domain::command::Commands;
use crate::domain::flag::FlagType;

/// 전역 플래그용 예약 범위 이름.
pub const GLOBAL_FLAG_SCOPE: &str = "global";

/// 명령 이름 → 플래그 이름(별칭 포함) → 선언 타입.
pub type FlagSchema = HashMap<String, HashMap<String, FlagType>>;

/// 명령 이름 → 살아 있는 인자 정의 슬라이스.
pub type ArgsSchema<'a> = HashMap<String, &'a [Argument]>;

/// 이름과 자식 모양만 가진 트리.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandSchema {
    pub name: String,
    pub subcommands: Vec<CommandSchema>,
}

/// 파서가 받는 세 가지 스키마 묶음.
#[derive(Debug, Default)]
pub struct Schemas<'a> {
    pub commands: Vec<CommandSchema>,
    pub flags: FlagSchema,
    pub args: ArgsSchema<'a>,
}

impl<'a> Schemas<'a> {
    pub fn from_commands(commands: &'a Commands) -> Self {
        Self {
            commands: create_command_schema(commands),
            flags: create_flag_schema(commands),
            args: create_args_schema(commands),
        }
    }
}

pub fn create_flag_schema(commands: &Commands) -> FlagSchema {
    let mut schema = FlagSchema::new();
    fill_flag_schema(commands, &mut schema);
    schema
}

fn fill_flag_schema(commands: &Commands, schema: &mut FlagSchema) {
    for command in commands {
        let entry = schema.entry(command.name.clone()).or_default();
        for flag in &command.flags {
            entry.insert(flag.name().to_string(), flag.value_type());
            if let Some(alias) = flag.alias_name() {
                entry
                    .entry(alias.to_string())
                    .or_insert(flag.value_type());
            }
        }
        fill_flag_schema(&command.subcommands, schema);
    }
}

pub fn create_args_schema(commands: &Commands) -> ArgsSchema<'_> {
    let mut schema = ArgsSchema::new();
    fill_args_schema(commands, &mut schema);
    schema
}

fn fill_args_schema<'a>(commands: &'a Commands, schema: &mut ArgsSchema<'a>) {
    for command in commands {
        schema.insert(command.name.clone(), command.arguments.as_slice());
        fill_args_schema(&command.subcommands, schema);
    }
}

pub fn create_command_schema(commands: &Commands) -> Vec<CommandSchema> {
    commands
        .iter()
        .map(|command| CommandSchema {
            name: command.name.clone(),
            subcommands: create_command_schema(&command.subcommands),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::command::Command;
    use crate::domain::flag::Flag;

    fn tree() -> Commands {
        vec![
            Command::new("db")
                .flag(Flag::bool("verbose").alias("v"))
                .subcommand(
                    Command::new("insert")
                        .flag(Flag::int_array("ids"))
                        .argument(Argument::new("file")),
                ),
            Command::new("ping"),
        ]
        .into()
    }

    #[test]
    fn flag_schema_covers_nested_commands_and_aliases() {
        let commands = tree();
        let schema = create_flag_schema(&commands);
        assert_eq!(schema["db"]["verbose"], FlagType::Bool);
        assert_eq!(schema["db"]["v"], FlagType::Bool);
        assert_eq!(schema["insert"]["ids"], FlagType::IntArray);
        assert!(schema["ping"].is_empty());
    }

    #[test]
    fn args_schema_borrows_live_definitions() {
        let commands = tree();
        let schema = create_args_schema(&commands);
        let insert = commands.get_command("insert").unwrap();
        assert!(std::ptr::eq(schema["insert"], insert.arguments.as_slice()));
        assert!(schema["db"].is_empty());
    }

    #[test]
    fn command_schema_mirrors_shape() {
        let commands = tree();
        let schema = create_command_schema(&commands);
        assert_eq!(schema.len(), 2);
        assert_eq!(schema[0].name, "db");
        assert_eq!(schema[0].subcommands[0].name, "insert");
        assert!(schema[0].subcommands[0].subcommands.is_empty());
        assert!(create_command_schema(&Commands::new()).is_empty());
    }
}
