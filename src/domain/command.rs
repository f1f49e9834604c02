//! 명령 트리 정의와 조회.
//!
//! 트리 구조는 애플리케이션 정의 시점에 고정된다. 실행 중에는 플래그/인자 값만
//! 바뀌고, 실행이 끝나면 `clear_values`로 전체 트리의 값을 비운다.

use std::collections::HashSet;
use std::fmt;

use crate::application::context::Context;
use crate::domain::argument::Argument;
use crate::domain::error::ReplError;
use crate::domain::flag::{Flag, FlagValue, Flags};

/// 실행 전 훅. `Ok(false)`면 같은 명령의 action만 건너뛴다.
pub type BeforeHook = Box<dyn Fn(&mut Context<'_>) -> anyhow::Result<bool> + Send + Sync>;

/// action/after 훅.
pub type ActionHook = Box<dyn Fn(&mut Context<'_>) -> anyhow::Result<()> + Send + Sync>;

/// 트리의 노드 하나.
pub struct Command {
    pub name: String,
    pub usage: String,
    pub aliases: Vec<String>,
    pub flags: Flags,
    pub arguments: Vec<Argument>,
    pub subcommands: Commands,
    pub(crate) before: Option<BeforeHook>,
    pub(crate) action: Option<ActionHook>,
    pub(crate) after: Option<ActionHook>,
}

impl Command {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            usage: String::new(),
            aliases: Vec::new(),
            flags: Flags::new(),
            arguments: Vec::new(),
            subcommands: Commands::new(),
            before: None,
            action: None,
            after: None,
        }
    }

    pub fn usage(mut self, usage: impl Into<String>) -> Self {
        self.usage = usage.into();
        self
    }

    pub fn alias(mut self, alias: impl Into<String>) -> Self {
        self.aliases.push(alias.into());
        self
    }

    pub fn flag(mut self, flag: Flag) -> Self {
        self.flags.push(flag);
        self
    }

    pub fn argument(mut self, argument: Argument) -> Self {
        self.arguments.push(argument);
        self
    }

    pub fn subcommand(mut self, command: Command) -> Self {
        self.subcommands.push(command);
        self
    }

    pub fn before<F>(mut self, hook: F) -> Self
    where
        F: Fn(&mut Context<'_>) -> anyhow::Result<bool> + Send + Sync + 'static,
    {
        self.before = Some(Box::new(hook));
        self
    }

    pub fn action<F>(mut self, hook: F) -> Self
    where
        F: Fn(&mut Context<'_>) -> anyhow::Result<()> + Send + Sync + 'static,
    {
        self.action = Some(Box::new(hook));
        self
    }

    pub fn after<F>(mut self, hook: F) -> Self
    where
        F: Fn(&mut Context<'_>) -> anyhow::Result<()> + Send + Sync + 'static,
    {
        self.after = Some(Box::new(hook));
        self
    }

    /// 이름이 `help`인 불리언 플래그가 참으로 바인딩됐는지 확인한다.
    pub fn help_requested(&self) -> bool {
        self.flags.iter().any(|flag| {
            flag.name() == "help" && flag.parsed_value() == Some(&FlagValue::Bool(true))
        })
    }

    pub fn argument_value(&self, name: &str) -> Option<&str> {
        self.arguments
            .iter()
            .find(|arg| arg.name == name)
            .map(Argument::value)
    }

    fn clear_values(&mut self) {
        self.flags.clear_all();
        self.arguments.iter_mut().for_each(Argument::clear);
        self.subcommands.clear_values();
    }
}

impl fmt::Debug for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Command")
            .field("name", &self.name)
            .field("aliases", &self.aliases)
            .field("flags", &self.flags)
            .field("arguments", &self.arguments)
            .field("subcommands", &self.subcommands)
            .field("before", &self.before.is_some())
            .field("action", &self.action.is_some())
            .field("after", &self.after.is_some())
            .finish()
    }
}

/// 형제 명령 목록.
#[derive(Debug, Default)]
pub struct Commands(Vec<Command>);

impl Commands {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, command: Command) {
        self.0.push(command);
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Command> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// 평탄화된 전체 트리에서 첫 번째로 이름이 일치하는 명령을 찾는다.
    pub fn get_command(&self, name: &str) -> Result<&Command, ReplError> {
        self.commands_array()
            .into_iter()
            .find(|command| command.name == name)
            .ok_or_else(|| ReplError::UnknownCommand(name.to_string()))
    }

    /// `get_command`와 같은 순서로 찾되 가변 참조를 돌려준다.
    pub fn get_command_mut(&mut self, name: &str) -> Result<&mut Command, ReplError> {
        let path = self
            .flattened_paths()
            .into_iter()
            .find(|path| self.at_path(path).is_some_and(|cmd| cmd.name == name))
            .ok_or_else(|| ReplError::UnknownCommand(name.to_string()))?;
        self.at_path_mut(&path)
            .ok_or_else(|| ReplError::UnknownCommand(name.to_string()))
    }

    /// 최상위 명령 전체 뒤에, 각 최상위 명령의 자손을 전위 순회 순서로 잇는다.
    pub fn commands_array(&self) -> Vec<&Command> {
        self.flattened_paths()
            .iter()
            .filter_map(|path| self.at_path(path))
            .collect()
    }

    /// 최상위 형제 중에서만 찾는다. 없으면 정의 오류이므로 panic한다.
    pub fn must_get_command(&self, name: &str) -> &Command {
        match self.0.iter().find(|command| command.name == name) {
            Some(command) => command,
            None => panic!("unknown command: {name}"),
        }
    }

    /// 트리 전체에서 중복된 명령 이름을 거부한다.
    pub fn validate(&self) -> Result<(), ReplError> {
        let mut seen = HashSet::new();
        for command in self.commands_array() {
            if !seen.insert(command.name.as_str()) {
                return Err(ReplError::DuplicateCommand(command.name.clone()));
            }
        }
        Ok(())
    }

    /// 실행 경로와 무관하게 트리 전체의 플래그/인자 값을 비운다.
    pub fn clear_values(&mut self) {
        self.0.iter_mut().for_each(Command::clear_values);
    }

    fn flattened_paths(&self) -> Vec<Vec<usize>> {
        let mut paths: Vec<Vec<usize>> = (0..self.0.len()).map(|i| vec![i]).collect();
        for (i, command) in self.0.iter().enumerate() {
            collect_descendant_paths(&command.subcommands, &[i], &mut paths);
        }
        paths
    }

    fn at_path(&self, path: &[usize]) -> Option<&Command> {
        let (first, rest) = path.split_first()?;
        let mut current = self.0.get(*first)?;
        for idx in rest {
            current = current.subcommands.0.get(*idx)?;
        }
        Some(current)
    }

    fn at_path_mut(&mut self, path: &[usize]) -> Option<&mut Command> {
        let (first, rest) = path.split_first()?;
        let mut current = self.0.get_mut(*first)?;
        for idx in rest {
            current = current.subcommands.0.get_mut(*idx)?;
        }
        Some(current)
    }
}

fn collect_descendant_paths(children: &Commands, prefix: &[usize], out: &mut Vec<Vec<usize>>) {
    for (i, child) in children.0.iter().enumerate() {
        let mut path = prefix.to_vec();
        path.push(i);
        out.push(path.clone());
        collect_descendant_paths(&child.subcommands, &path, out);
    }
}

impl From<Vec<Command>> for Commands {
    fn from(commands: Vec<Command>) -> Self {
        Self(commands)
    }
}

impl FromIterator<Command> for Commands {
    fn from_iter<I: IntoIterator<Item = Command>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl<'a> IntoIterator for &'a Commands {
    type Item = &'a Command;
    type IntoIter = std::slice::Iter<'a, Command>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_tree() -> Commands {
        vec![
            Command::new("db")
                .subcommand(
                    Command::new("migrate")
                        .subcommand(Command::new("up"))
                        .subcommand(Command::new("down")),
                )
                .subcommand(Command::new("seed")),
            Command::new("deploy").subcommand(Command::new("rollback")),
        ]
        .into()
    }

    fn names(commands: &[&Command]) -> Vec<String> {
        commands.iter().map(|c| c.name.clone()).collect()
    }

    #[test]
    fn commands_array_lists_top_level_then_preorder_descendants() {
        let tree = sample_tree();
        assert_eq!(
            names(&tree.commands_array()),
            vec!["db", "deploy", "migrate", "up", "down", "seed", "rollback"]
        );
    }

    #[test]
    fn get_command_searches_every_depth() {
        let tree = sample_tree();
        assert_eq!(tree.get_command("down").unwrap().name, "down");
        assert_eq!(tree.get_command("rollback").unwrap().name, "rollback");
        let err = tree.get_command("nope").unwrap_err();
        assert!(matches!(err, ReplError::UnknownCommand(ref n) if n == "nope"));
    }

    #[test]
    fn get_command_mut_reaches_nested_command() {
        let mut tree: Commands = vec![
            Command::new("db").subcommand(Command::new("seed").flag(Flag::int("rows"))),
        ]
        .into();
        tree.get_command_mut("seed")
            .unwrap()
            .flags
            .iter_mut()
            .next()
            .unwrap()
            .parse("10")
            .unwrap();
        assert_eq!(tree.get_command("seed").unwrap().flags.get_flag_int("rows", 0), 10);
    }

    #[test]
    fn first_match_wins_for_duplicate_names() {
        let tree: Commands = vec![
            Command::new("a").subcommand(Command::new("x").usage("nested")),
            Command::new("x").usage("top"),
        ]
        .into();
        assert_eq!(tree.get_command("x").unwrap().usage, "top");
        assert!(matches!(
            tree.validate(),
            Err(ReplError::DuplicateCommand(ref n)) if n == "x"
        ));
        assert!(sample_tree().validate().is_ok());
    }

    #[test]
    fn nested_command_with_parent_name_resolves_to_parent() {
        let tree: Commands = vec![Command::new("x").usage("outer").subcommand(
            Command::new("x").usage("inner"),
        )]
        .into();
        assert_eq!(names(&tree.commands_array()), vec!["x", "x"]);
        assert_eq!(tree.get_command("x").unwrap().usage, "outer");
    }

    #[test]
    fn must_get_command_only_looks_at_top_level() {
        let tree = sample_tree();
        assert_eq!(tree.must_get_command("deploy").name, "deploy");
        let result = std::panic::catch_unwind(|| {
            sample_tree().must_get_command("migrate").name.clone()
        });
        assert!(result.is_err());
    }

    #[test]
    fn clear_values_resets_the_whole_tree() {
        let mut tree: Commands = vec![
            Command::new("a").flag(Flag::string("s")).subcommand(
                Command::new("b")
                    .flag(Flag::bool("v"))
                    .argument(Argument::new("file")),
            ),
        ]
        .into();
        {
            let b = tree.get_command_mut("b").unwrap();
            b.flags.iter_mut().for_each(|f| {
                f.parse("true").unwrap();
            });
            b.arguments[0].set_value("x.txt");
        }
        tree.get_command_mut("a")
            .unwrap()
            .flags
            .iter_mut()
            .for_each(|f| {
                f.parse("hi").unwrap();
            });

        tree.clear_values();

        for command in tree.commands_array() {
            assert!(command.flags.iter().all(|f| f.parsed_value().is_none()));
            assert!(command.arguments.iter().all(|a| a.value().is_empty()));
        }
    }
}
