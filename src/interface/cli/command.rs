//! CLI 인자 파싱 모듈.

use clap::Parser;

#[derive(Debug, Parser)]
#[command(name = "repline")]
#[command(about = "Interactive command shell; pass a command line to run it once and exit")]
pub struct Cli {
    /// Show debug log events from commands
    #[arg(long)]
    debug: bool,

    /// Disable ANSI colors
    #[arg(long)]
    no_color: bool,

    /// Command line to run once (e.g. `repline db seed users --rows 10`)
    #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
    command: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CliAction {
    Interactive,
    Once(Vec<String>),
}

/// 파싱 결과. 플래그는 설정 파일/환경변수보다 우선한다.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CliRequest {
    pub action: CliAction,
    pub debug: bool,
    pub no_color: bool,
}

impl Cli {
    pub fn parse_request() -> CliRequest {
        Cli::parse().into_request()
    }

    pub fn try_parse_request<I, T>(args: I) -> Result<CliRequest, clap::Error>
    where
        I: IntoIterator<Item = T>,
        T: Into<std::ffi::OsString> + Clone,
    {
        Cli::try_parse_from(args).map(Cli::into_request)
    }

    fn into_request(self) -> CliRequest {
        let action = if self.command.is_empty() {
            CliAction::Interactive
        } else {
            CliAction::Once(self.command)
        };
        CliRequest {
            action,
            debug: self.debug,
            no_color: self.no_color,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_command_starts_the_shell() {
        let request = Cli::try_parse_request(["repline", "--no-color"]).unwrap();
        assert_eq!(request.action, CliAction::Interactive);
        assert!(request.no_color);
        assert!(!request.debug);
    }

    #[test]
    fn trailing_words_keep_their_own_flags() {
        let request =
            Cli::try_parse_request(["repline", "--debug", "db", "seed", "--rows", "5"]).unwrap();
        assert!(request.debug);
        assert_eq!(
            request.action,
            CliAction::Once(vec![
                "db".into(),
                "seed".into(),
                "--rows".into(),
                "5".into()
            ])
        );
    }
}
