//! 실행 흐름 위에서 before/action/after 훅을 돌린다.

use std::cell::Cell;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Once;

use tracing::{debug, warn};

use crate::application::context::{Context, Invocation, Memory};
use crate::domain::ast::Ast;
use crate::domain::command::Command;
use crate::domain::error::ReplError;

/// 최상위 → 말단으로 before/action을 실행한다. 첫 오류에서 멈춘다.
pub fn run_actions(
    flow: &[&Command],
    ast: &Ast,
    invocation: &Invocation<'_>,
    memory: &mut Memory,
) -> Result<(), ReplError> {
    for command in flow {
        let mut ctx = Context::new(command, ast, invocation, memory);

        let proceed = match &command.before {
            Some(before) => guarded(&command.name, "before", || before(&mut ctx))?,
            None => true,
        };
        if !proceed {
            debug!(command = %command.name, "before hook skipped action");
            continue;
        }
        if let Some(action) = &command.action {
            guarded(&command.name, "action", || action(&mut ctx))?;
        }
    }
    Ok(())
}

/// 말단 → 최상위로 after를 실행한다.
pub fn run_end(
    flow: &[&Command],
    ast: &Ast,
    invocation: &Invocation<'_>,
    memory: &mut Memory,
) -> Result<(), ReplError> {
    for command in flow.iter().rev() {
        let Some(after) = &command.after else {
            continue;
        };
        let mut ctx = Context::new(command, ast, invocation, memory);
        guarded(&command.name, "after", || after(&mut ctx))?;
    }
    Ok(())
}

thread_local! {
    static IN_HOOK: Cell<bool> = const { Cell::new(false) };
}

static QUIET_HOOK_PANICS: Once = Once::new();

/// 훅 안에서 난 panic은 기본 panic 훅(stderr 출력)을 건너뛴다.
/// 그 밖의 panic은 이전에 설치된 훅으로 넘긴다.
fn install_quiet_panic_hook() {
    QUIET_HOOK_PANICS.call_once(|| {
        let previous = panic::take_hook();
        panic::set_hook(Box::new(move |info| {
            if !inside_hook() {
                previous(info);
            }
        }));
    });
}

/// 현재 스레드가 훅을 실행 중인지 표시한다. unwind 중에도 drop에서 되돌린다.
struct HookScope {
    outer: bool,
}

impl HookScope {
    fn enter() -> Self {
        Self {
            outer: IN_HOOK.with(|flag| flag.replace(true)),
        }
    }
}

impl Drop for HookScope {
    fn drop(&mut self) {
        IN_HOOK.with(|flag| flag.set(self.outer));
    }
}

fn inside_hook() -> bool {
    IN_HOOK.with(Cell::get)
}

/// 훅 호출 한 번. panic은 `CommandPanic`으로 바꿔 엔진 밖으로 새지 않게 한다.
fn guarded<T>(
    command: &str,
    stage: &str,
    call: impl FnOnce() -> anyhow::Result<T>,
) -> Result<T, ReplError> {
    install_quiet_panic_hook();
    let caught = {
        let _scope = HookScope::enter();
        panic::catch_unwind(AssertUnwindSafe(call))
    };
    match caught {
        Ok(result) => result.map_err(ReplError::from),
        Err(payload) => {
            let err = ReplError::from_panic(payload);
            warn!(command, stage, error = %err, "recovered panic in hook");
            Err(err)
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use super::*;
    use crate::application::bridge::InteractiveBridge;
    use crate::application::context::Cancellation;
    use crate::application::context::testing::RecordingSink;
    use crate::domain::error::ErrorKind;

    type Trace = Arc<Mutex<Vec<String>>>;

    fn traced(name: &str, trace: &Trace, proceed: bool) -> Command {
        let (b, a, f) = (trace.clone(), trace.clone(), trace.clone());
        let (nb, na, nf) = (
            format!("{name}.before"),
            format!("{name}.action"),
            format!("{name}.after"),
        );
        Command::new(name)
            .before(move |_| {
                b.lock().unwrap().push(nb.clone());
                Ok(proceed)
            })
            .action(move |_| {
                a.lock().unwrap().push(na.clone());
                Ok(())
            })
            .after(move |_| {
                f.lock().unwrap().push(nf.clone());
                Ok(())
            })
    }

    fn run_both(flow: &[&Command]) -> Result<(), ReplError> {
        let sink = RecordingSink::default();
        let bridge = InteractiveBridge::Disabled;
        let invocation = Invocation::new(&sink, &bridge, Cancellation::new(), false);
        let ast = Ast::default();
        let mut memory = Memory::new();
        run_actions(flow, &ast, &invocation, &mut memory)?;
        run_end(flow, &ast, &invocation, &mut memory)
    }

    #[test]
    fn forward_then_reverse_order() {
        let trace = Trace::default();
        let root = traced("root", &trace, true);
        let leaf = traced("leaf", &trace, true);
        run_both(&[&root, &leaf]).unwrap();
        assert_eq!(
            *trace.lock().unwrap(),
            vec![
                "root.before",
                "root.action",
                "leaf.before",
                "leaf.action",
                "leaf.after",
                "root.after"
            ]
        );
    }

    #[test]
    fn before_false_skips_only_that_action() {
        let trace = Trace::default();
        let root = traced("root", &trace, false);
        let leaf = traced("leaf", &trace, true);
        run_both(&[&root, &leaf]).unwrap();
        let trace = trace.lock().unwrap();
        assert!(!trace.contains(&"root.action".to_string()));
        assert!(trace.contains(&"leaf.action".to_string()));
        assert!(trace.contains(&"root.after".to_string()));
    }

    #[test]
    fn panics_become_command_panic_errors() {
        let command = Command::new("boom").action(|_| panic!("kaboom"));
        let err = run_both(&[&command]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::CommandPanic);
        assert_eq!(err.to_string(), "cmdpanic: kaboom");
    }

    #[test]
    fn after_errors_stop_the_reverse_pass() {
        let trace = Trace::default();
        let root = traced("root", &trace, true);
        let leaf = Command::new("leaf").after(|_| anyhow::bail!("cleanup failed"));
        let err = run_both(&[&root, &leaf]).unwrap_err();
        assert_eq!(err.to_string(), "cleanup failed");
        assert!(!trace.lock().unwrap().contains(&"root.after".to_string()));
    }

    #[test]
    fn hooks_share_invocation_memory() {
        let seen = Arc::new(Mutex::new(None));
        let sink_seen = seen.clone();
        let root = Command::new("root").action(|ctx| ctx.set("token", "abc"));
        let leaf = Command::new("leaf").action(move |ctx| {
            *sink_seen.lock().unwrap() = ctx.get_string("token").map(str::to_string);
            Ok(())
        });
        run_both(&[&root, &leaf]).unwrap();
        assert_eq!(seen.lock().unwrap().as_deref(), Some("abc"));
    }

    #[test]
    fn hook_scope_covers_only_the_guarded_call() {
        assert!(!inside_hook());
        assert!(guarded("scope", "action", || Ok(inside_hook())).unwrap());
        assert!(!inside_hook());

        let err = guarded::<()>("boom", "action", || panic!("quiet")).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::CommandPanic);
        assert!(!inside_hook());
    }
}
