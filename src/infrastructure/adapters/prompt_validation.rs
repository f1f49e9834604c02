//! 프롬프트 입력값 검증.
//! 터미널 화면과 줄 입력 대체 모드가 같은 규칙을 공유한다.

use std::fs;
use std::path::{self, Path};

use crate::domain::interactive::{InputFileParams, InputFileResult, InputIntParams, InputTextParams};

const KILOBYTE: u64 = 1024;

/// 입력을 거절한 이유. 화면 상태줄에 그대로 표시한다.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Rejection {
    #[error("input is longer than {0} characters")]
    TooLong(usize),

    #[error("input rejected by validator")]
    Validator,

    #[error("not a whole number")]
    NotANumber,

    #[error("value must be >= {0}")]
    BelowMin(i64),

    #[error("value must be <= {0}")]
    AboveMax(i64),

    #[error("cannot resolve full path")]
    FullPath,

    #[error("file not found")]
    FileNotFound,

    #[error("file extension not allowed (expected {0})")]
    Extension(String),

    #[error("file is {actual} KB, limit is {limit} KB")]
    TooLarge { actual: u64, limit: u64 },

    #[error("cannot read file")]
    Read,
}

pub fn check_text(params: &InputTextParams, value: &str) -> Result<String, Rejection> {
    if params.max_length > 0 && value.chars().count() > params.max_length {
        return Err(Rejection::TooLong(params.max_length));
    }
    if let Some(validate) = &params.validate
        && !validate(value)
    {
        return Err(Rejection::Validator);
    }
    Ok(value.to_string())
}

/// 0인 하한/상한은 검사하지 않는다.
pub fn check_int(params: &InputIntParams, value: &str) -> Result<i64, Rejection> {
    let parsed: i64 = value.trim().parse().map_err(|_| Rejection::NotANumber)?;
    if params.min_value != 0 && parsed < params.min_value {
        return Err(Rejection::BelowMin(params.min_value));
    }
    if params.max_value != 0 && parsed > params.max_value {
        return Err(Rejection::AboveMax(params.max_value));
    }
    if let Some(validate) = &params.validate
        && !validate(value)
    {
        return Err(Rejection::Validator);
    }
    Ok(parsed)
}

/// 경로를 절대 경로로 바꾸고 존재/확장자/크기를 확인한 뒤 필요하면 내용을 읽는다.
pub fn check_file(params: &InputFileParams, value: &str) -> Result<InputFileResult, Rejection> {
    let abs = path::absolute(Path::new(value.trim())).map_err(|_| Rejection::FullPath)?;
    let meta = fs::metadata(&abs).map_err(|_| Rejection::FileNotFound)?;
    if meta.is_dir() {
        return Err(Rejection::FileNotFound);
    }

    if !params.extensions.is_empty() {
        let ext = abs
            .extension()
            .map(|ext| format!(".{}", ext.to_string_lossy().to_lowercase()))
            .unwrap_or_default();
        let allowed = params
            .extensions
            .iter()
            .any(|allowed| allowed.to_lowercase() == ext);
        if !allowed {
            return Err(Rejection::Extension(params.extensions.join(", ")));
        }
    }

    if params.max_file_size_kb > 0 {
        let actual = meta.len() / KILOBYTE;
        if actual > params.max_file_size_kb {
            return Err(Rejection::TooLarge {
                actual,
                limit: params.max_file_size_kb,
            });
        }
    }

    let contents = if params.do_not_output {
        Vec::new()
    } else {
        fs::read(&abs).map_err(|_| Rejection::Read)?
    };
    Ok(InputFileResult {
        path: abs,
        contents,
    })
}

/// y/yes/n/no만 받는다(대소문자 무시).
pub fn check_confirm(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "y" | "yes" => Some(true),
        "n" | "no" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;
    use std::sync::Arc;

    use super::*;

    #[test]
    fn text_respects_length_and_validator() {
        let params = InputTextParams {
            max_length: 3,
            validate: Some(Arc::new(|s: &str| !s.contains('x'))),
            ..InputTextParams::default()
        };
        assert_eq!(check_text(&params, "abc"), Ok("abc".into()));
        assert_eq!(check_text(&params, "abcd"), Err(Rejection::TooLong(3)));
        assert_eq!(check_text(&params, "ax"), Err(Rejection::Validator));
        // 한글도 글자 수로 센다.
        assert!(check_text(&params, "한글임").is_ok());
    }

    #[test]
    fn int_bounds_of_zero_are_open() {
        let open = InputIntParams::default();
        assert_eq!(check_int(&open, "-50"), Ok(-50));
        assert_eq!(check_int(&open, "4.5"), Err(Rejection::NotANumber));

        let bounded = InputIntParams {
            min_value: 1,
            max_value: 10,
            ..InputIntParams::default()
        };
        assert_eq!(check_int(&bounded, "0"), Err(Rejection::BelowMin(1)));
        assert_eq!(check_int(&bounded, "11"), Err(Rejection::AboveMax(10)));
        assert_eq!(check_int(&bounded, "10"), Ok(10));
    }

    #[test]
    fn file_checks_extension_case_insensitively_and_reads_contents() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("data.JSON");
        fs::File::create(&path)
            .unwrap()
            .write_all(b"{\"ok\":true}")
            .unwrap();

        let params = InputFileParams {
            extensions: vec![".json".into()],
            ..InputFileParams::default()
        };
        let result = check_file(&params, path.to_str().unwrap()).unwrap();
        assert_eq!(result.contents, b"{\"ok\":true}");
        assert!(result.path.is_absolute());

        let wrong = InputFileParams {
            extensions: vec![".yaml".into()],
            ..InputFileParams::default()
        };
        assert!(matches!(
            check_file(&wrong, path.to_str().unwrap()),
            Err(Rejection::Extension(_))
        ));
    }

    #[test]
    fn file_rejects_directories_missing_files_and_large_files() {
        let dir = tempfile::tempdir().unwrap();
        let params = InputFileParams::default();
        assert_eq!(
            check_file(&params, dir.path().to_str().unwrap()),
            Err(Rejection::FileNotFound)
        );
        assert_eq!(
            check_file(&params, dir.path().join("nope").to_str().unwrap()),
            Err(Rejection::FileNotFound)
        );

        let big = dir.path().join("big.bin");
        fs::write(&big, vec![0u8; 3 * 1024]).unwrap();
        let limited = InputFileParams {
            max_file_size_kb: 2,
            do_not_output: true,
            ..InputFileParams::default()
        };
        assert_eq!(
            check_file(&limited, big.to_str().unwrap()),
            Err(Rejection::TooLarge { actual: 3, limit: 2 })
        );

        let roomy = InputFileParams {
            max_file_size_kb: 4,
            do_not_output: true,
            ..InputFileParams::default()
        };
        let result = check_file(&roomy, big.to_str().unwrap()).unwrap();
        assert!(result.contents.is_empty());
    }

    #[test]
    fn confirm_accepts_yes_and_no_only() {
        assert_eq!(check_confirm("Y"), Some(true));
        assert_eq!(check_confirm(" no "), Some(false));
        assert_eq!(check_confirm("maybe"), None);
    }
}
