//! 입력 줄을 셸 스타일 토큰으로 나누는 렉서.
//!
//! 지원 규칙: 큰/작은따옴표 묶음, 백슬래시 다음 한 글자 그대로 넣기, 따옴표 밖
//! 유니코드 공백으로 토큰 구분. `\n` 같은 이름 있는 escape는 없다.

use crate::domain::error::ReplError;

pub fn tokenize(input: &str) -> Result<Vec<String>, ReplError> {
    let mut tokens = Vec::new();
    let mut current = String::new();
    let mut quote: Option<char> = None;
    let mut escape = false;

    for ch in input.chars() {
        if escape {
            current.push(ch);
            escape = false;
            continue;
        }

        match ch {
            '\\' => escape = true,
            '"' | '\'' => match quote {
                Some(open) if open == ch => quote = None,
                // 다른 종류의 따옴표는 데이터로 취급한다.
                Some(_) => current.push(ch),
                None => quote = Some(ch),
            },
            c if c.is_whitespace() && quote.is_none() => {
                if !current.is_empty() {
                    tokens.push(std::mem::take(&mut current));
                }
            }
            c => current.push(c),
        }
    }

    if quote.is_some() {
        return Err(ReplError::UnclosedQuotes);
    }
    if escape {
        return Err(ReplError::IncompleteEscape);
    }
    if !current.is_empty() {
        tokens.push(current);
    }

    Ok(tokens)
}
