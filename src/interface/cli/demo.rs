//! 바이너리가 띄우는 데모 명령 트리.
//! 프레임워크 기능(훅 순서, 플래그 타입, 대화형 입력, 하위 프로세스, 취소, panic 복구)을
//! 명령 하나씩으로 보여 준다.

use std::thread;
use std::time::Duration;

use anyhow::{Context as _, bail};

use crate::application::context::Context;
use crate::domain::app::{App, AppParams};
use crate::domain::argument::Argument;
use crate::domain::command::Command;
use crate::domain::flag::{Flag, FlagValue};
use crate::domain::interactive::{
    ConfirmParams, InputFileParams, InputIntParams, InputTextParams, SelectItem, SelectOneParams,
};

pub fn demo_app(params: AppParams) -> App {
    App::new("repline")
        .usage("Interactive command shell demo")
        .author("repline contributors")
        .license("MIT")
        .params(params)
        .command(hello())
        .command(flow())
        .command(db())
        .command(tags())
        .command(ask())
        .command(upload())
        .command(sh())
        .command(sleep())
        .command(crash())
}

fn hello() -> Command {
    Command::new("hello")
        .usage("Say hello")
        .alias("hi")
        .flag(Flag::help())
        .flag(Flag::string("name").alias("n").usage("Who to greet"))
        .flag(
            Flag::int("times")
                .alias("t")
                .usage("Repeat count (1-10)")
                .validator(|value| match value {
                    FlagValue::Int(n) if (1..=10).contains(n) => Ok(()),
                    _ => Err("must be between 1 and 10".into()),
                }),
        )
        .flag(Flag::bool("upper").alias("u").usage("Shout"))
        .action(|ctx| {
            let name = ctx.get_flag_string("name", "world");
            let mut greeting = format!("Hello, {name}!");
            if ctx.get_flag_bool("upper") {
                greeting = greeting.to_uppercase();
            }
            for _ in 0..ctx.get_flag_int("times", 1) {
                ctx.print(&greeting);
            }
            Ok(())
        })
}

/// 3단 명령으로 before/action/after 실행 순서를 보여 준다.
fn flow() -> Command {
    let leaf = Command::new("leaf")
        .usage("Innermost step")
        .flag(Flag::help())
        .before(|ctx| {
            ctx.log("leaf before");
            Ok(true)
        })
        .action(|ctx| {
            let token = ctx.get_string("token").unwrap_or("missing").to_string();
            ctx.printf(format_args!("leaf action sees token={token}"));
            Ok(())
        })
        .after(stage("after"));

    let middle = Command::new("middle")
        .usage("Middle step; --skip turns its action off")
        .flag(Flag::help())
        .flag(Flag::bool("skip").usage("Skip this action"))
        .before(|ctx| {
            ctx.log("middle before");
            Ok(!ctx.get_flag_bool("skip"))
        })
        .action(stage("action"))
        .after(stage("after"))
        .subcommand(leaf);

    Command::new("flow")
        .usage("Show hook order across three levels")
        .flag(Flag::help())
        .before(|ctx| {
            ctx.set("token", "abc123")?;
            ctx.log("flow before");
            Ok(true)
        })
        .action(stage("action"))
        .after(|ctx| {
            ctx.printf(format_args!("flow done in {:?}", ctx.elapsed()));
            Ok(())
        })
        .subcommand(middle)
}

fn stage(label: &'static str) -> impl Fn(&mut Context<'_>) -> anyhow::Result<()> + Send + Sync + 'static {
    move |ctx| {
        ctx.log(format_args!("{} {label}", ctx.name()));
        Ok(())
    }
}

fn db() -> Command {
    let seed = Command::new("seed")
        .usage("Insert fake rows into a table")
        .flag(Flag::help())
        .flag(
            Flag::int("rows")
                .alias("r")
                .usage("Row count")
                .validator(|value| match value {
                    FlagValue::Int(n) if *n > 0 => Ok(()),
                    _ => Err("must be positive".into()),
                }),
        )
        .flag(Flag::bool("dry-run").usage("Only print the plan"))
        .argument(Argument::new("table").usage("Target table"))
        .action(|ctx| {
            let table = ctx.argument("table").unwrap_or_default().to_string();
            let rows = ctx.get_flag_int("rows", 10);
            let env = ctx.get_string("env").unwrap_or("dev").to_string();
            if ctx.get_flag_bool("dry-run") {
                ctx.printf(format_args!("would insert {rows} rows into {env}.{table}"));
            } else {
                ctx.printf(format_args!("inserted {rows} rows into {env}.{table}"));
            }
            Ok(())
        });

    let status = Command::new("status")
        .usage("Show connection status")
        .flag(Flag::help())
        .action(|ctx| {
            let env = ctx.get_string("env").unwrap_or("dev").to_string();
            ctx.printf(format_args!("connected to {env}"));
            Ok(())
        });

    Command::new("db")
        .usage("Database helpers")
        .flag(Flag::help())
        .flag(Flag::string("env").alias("e").usage("Target environment"))
        .before(|ctx| {
            let env = ctx.get_flag_string("env", "dev");
            if env == "prod" {
                ctx.warn("running against prod");
            }
            ctx.set("env", env)?;
            Ok(true)
        })
        .subcommand(seed)
        .subcommand(status)
}

fn tags() -> Command {
    Command::new("tags")
        .usage("Parse comma separated array flags")
        .flag(Flag::help())
        .flag(Flag::string_array("tag").usage("Comma separated tags"))
        .flag(Flag::int_array("id").usage("Comma separated ids"))
        .action(|ctx| {
            let tags = ctx.get_flag_string_array("tag");
            let ids = ctx.get_flag_int_array("id");
            ctx.printf(format_args!("tags={tags:?} ids={ids:?} rest={:?}", ctx.args()));
            Ok(())
        })
}

fn ask() -> Command {
    Command::new("ask")
        .usage("Walk through every interactive prompt")
        .flag(Flag::help())
        .action(|ctx| {
            let env = ctx.select_one(SelectOneParams {
                name: "Environment".into(),
                description: "Where should this run?".into(),
                items: vec![
                    SelectItem::new("dev", "Development").description("local containers"),
                    SelectItem::new("stage", "Staging"),
                    SelectItem::new("prod", "Production").description("be careful"),
                ],
            })?;
            let name = ctx.input_text(InputTextParams {
                name: "Your name".into(),
                placeholder: "anonymous".into(),
                max_length: 20,
                ..InputTextParams::default()
            })?;
            let age = ctx.input_int(InputIntParams {
                name: "Your age".into(),
                min_value: 1,
                max_value: 150,
                ..InputIntParams::default()
            })?;
            let confirmed = ctx.confirm(ConfirmParams {
                name: "Save answers?".into(),
                description: String::new(),
            })?;

            if confirmed {
                ctx.printf(format_args!(
                    "{name} ({age}) picked {}",
                    env.selected_item.name
                ));
            } else {
                ctx.warn("answers discarded");
            }
            Ok(())
        })
}

fn upload() -> Command {
    Command::new("upload")
        .usage("Pick a file and report its size")
        .flag(Flag::help())
        .flag(Flag::bool("path-only").usage("Do not read the file"))
        .action(|ctx| {
            let file = ctx.input_file(InputFileParams {
                name: "File to upload".into(),
                description: "json or txt, up to 512 KB".into(),
                extensions: vec![".json".into(), ".txt".into()],
                max_file_size_kb: 512,
                do_not_output: ctx.get_flag_bool("path-only"),
            })?;
            ctx.printf(format_args!(
                "{} ({} bytes read)",
                file.path.display(),
                file.contents.len()
            ));
            Ok(())
        })
}

fn sh() -> Command {
    Command::new("sh")
        .usage("Run a program and stream its output (use `sh -- ls -la` for program flags)")
        .flag(Flag::help())
        .argument(Argument::new("program").usage("Program to run"))
        .action(|ctx| {
            let args = ctx.args().to_vec();
            let Some((program, rest)) = args.split_first() else {
                bail!("program is required");
            };
            let rest: Vec<&str> = rest.iter().map(String::as_str).collect();
            ctx.exec_live(program, &rest)
                .with_context(|| format!("sh {program}"))
        })
}

/// Ctrl+C로 취소할 수 있는 긴 작업.
fn sleep() -> Command {
    Command::new("sleep")
        .usage("Wait a while; Ctrl+C cancels")
        .flag(Flag::help())
        .flag(Flag::int("seconds").alias("s").usage("How long to wait"))
        .action(|ctx| {
            let total = Duration::from_secs(ctx.get_flag_int("seconds", 3).max(0) as u64);
            let step = Duration::from_millis(100);
            while ctx.elapsed() < total {
                if ctx.is_cancelled() {
                    bail!("cancelled after {:?}", ctx.elapsed());
                }
                thread::sleep(step);
            }
            ctx.printf(format_args!("slept {:?}", total));
            Ok(())
        })
}

fn crash() -> Command {
    Command::new("crash")
        .usage("Panic inside an action to show recovery")
        .flag(Flag::help())
        .action(|_| panic!("demo panic from crash command"))
}
