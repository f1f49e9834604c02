//! `repline` 데모 바이너리 진입점.

use repline::infrastructure::config::load_settings;
use repline::interface::cli::demo::demo_app;
use repline::interface::cli::{AppComposition, Cli, CliAction, run_once, run_repl};

#[tokio::main]
async fn main() {
    // 진단 로그는 stderr로만 보내 REPL 화면과 섞이지 않게 한다.
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "warn".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let request = Cli::parse_request();

    let loaded = match load_settings() {
        Ok(loaded) => loaded,
        Err(err) => {
            eprintln!("error: {err:#}");
            std::process::exit(2);
        }
    };
    tracing::debug!(loaded = ?loaded.loaded_paths, "settings loaded");

    let settings = loaded.settings;
    let mut params = settings.params();
    // CLI 플래그가 모든 설정보다 우선한다.
    params.debug |= request.debug;
    params.no_color |= request.no_color;

    let composition = AppComposition::new(&params);
    let app = demo_app(params);

    match request.action {
        CliAction::Interactive => {
            if let Err(err) = run_repl(app, &composition, settings.prompt()).await {
                eprintln!("error: {err:#}");
                std::process::exit(1);
            }
        }
        CliAction::Once(args) => match run_once(app, &composition, &args).await {
            Ok(true) => {}
            Ok(false) => std::process::exit(1),
            Err(err) => {
                eprintln!("error: {err:#}");
                std::process::exit(1);
            }
        },
    }
}
