//! 데모 바이너리를 one-shot 모드로 띄워 출력 채널을 확인한다.

use std::process::{Command, Output};

fn run_repline(args: &[&str]) -> Output {
    let dir = tempfile::tempdir().unwrap();
    Command::new(env!("CARGO_BIN_EXE_repline"))
        .current_dir(dir.path())
        .env_remove("REPLINE_CONFIG")
        .env_remove("RUST_LOG")
        .args(args)
        .output()
        .expect("failed to execute repline")
}

#[test]
fn recovered_hook_panic_is_reported_only_through_the_log_sink() {
    let output = run_repline(&["--no-color", "crash"]);
    let stdout = String::from_utf8_lossy(&output.stdout);
    let stderr = String::from_utf8_lossy(&output.stderr);

    assert_eq!(output.status.code(), Some(1));
    assert!(stdout.contains("[PANIC]"), "{stdout}");
    assert!(stdout.contains("demo panic from crash command"), "{stdout}");
    assert!(!stderr.contains("panicked at"), "{stderr}");
    assert!(!stderr.contains("stack backtrace"), "{stderr}");
}

#[test]
fn successful_command_exits_zero() {
    let output = run_repline(&["--no-color", "hello", "--name", "bob"]);
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));
    assert!(String::from_utf8_lossy(&output.stdout).contains("Hello, bob!"));
}
