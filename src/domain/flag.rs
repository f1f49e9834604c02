//! 플래그 정의와 타입이 지정된 값 저장소.
//!
//! 플래그 하나는 선언 타입(`FlagType`)과 마지막으로 파싱된 값(`FlagValue`)을 가진다.
//! 값은 실행마다 바인딩되고 실행이 끝나면 `clear`로 초기 상태로 되돌린다.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use crate::domain::error::ReplError;

/// 플래그 선언 타입. 스키마에서 찾지 못한 플래그는 기본값 `Int`로 취급된다.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum FlagType {
    #[default]
    Int,
    String,
    IntArray,
    StringArray,
    Bool,
}

impl FlagType {
    /// 정규 타입 태그.
    pub fn tag(self) -> &'static str {
        match self {
            FlagType::Int => "int",
            FlagType::String => "string",
            FlagType::IntArray => "[]int",
            FlagType::StringArray => "[]string",
            FlagType::Bool => "bool",
        }
    }
}

impl fmt::Display for FlagType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

impl FromStr for FlagType {
    type Err = ReplError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "int" => Ok(FlagType::Int),
            "string" => Ok(FlagType::String),
            "[]int" => Ok(FlagType::IntArray),
            "[]string" => Ok(FlagType::StringArray),
            "bool" => Ok(FlagType::Bool),
            other => Err(ReplError::UnknownFlagType(other.to_string())),
        }
    }
}

/// 파싱이 끝난 플래그 값.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FlagValue {
    Int(i64),
    String(String),
    IntArray(Vec<i64>),
    StringArray(Vec<String>),
    Bool(bool),
}

impl FlagValue {
    pub fn flag_type(&self) -> FlagType {
        match self {
            FlagValue::Int(_) => FlagType::Int,
            FlagValue::String(_) => FlagType::String,
            FlagValue::IntArray(_) => FlagType::IntArray,
            FlagValue::StringArray(_) => FlagType::StringArray,
            FlagValue::Bool(_) => FlagType::Bool,
        }
    }
}

/// 사용자 정의 파서. 설정되면 기본 변환 규칙을 완전히 대체한다.
pub type FlagParser = Arc<dyn Fn(&str) -> anyhow::Result<FlagValue> + Send + Sync>;

/// 파싱 성공 후 실행되는 검증기. `Err`의 문자열이 실패 사유가 된다.
pub type FlagValidator = Arc<dyn Fn(&FlagValue) -> Result<(), String> + Send + Sync>;

/// 명령에 선언되는 플래그.
#[derive(Clone)]
pub struct Flag {
    name: String,
    alias: Option<String>,
    usage: String,
    value_type: FlagType,
    parser: Option<FlagParser>,
    validator: Option<FlagValidator>,
    raw: String,
    value: Option<FlagValue>,
}

impl Flag {
    pub fn new(name: impl Into<String>, value_type: FlagType) -> Self {
        Self {
            name: name.into(),
            alias: None,
            usage: String::new(),
            value_type,
            parser: None,
            validator: None,
            raw: String::new(),
            value: None,
        }
    }

    pub fn int(name: impl Into<String>) -> Self {
        Self::new(name, FlagType::Int)
    }

    pub fn string(name: impl Into<String>) -> Self {
        Self::new(name, FlagType::String)
    }

    pub fn bool(name: impl Into<String>) -> Self {
        Self::new(name, FlagType::Bool)
    }

    pub fn int_array(name: impl Into<String>) -> Self {
        Self::new(name, FlagType::IntArray)
    }

    pub fn string_array(name: impl Into<String>) -> Self {
        Self::new(name, FlagType::StringArray)
    }

    /// `--help`/`-h` 불리언 플래그. 실행 엔진이 도움말 단락 처리에 사용한다.
    pub fn help() -> Self {
        Self::bool("help").alias("h").usage("Show help for this command")
    }

    pub fn alias(mut self, alias: impl Into<String>) -> Self {
        self.alias = Some(alias.into());
        self
    }

    pub fn usage(mut self, usage: impl Into<String>) -> Self {
        self.usage = usage.into();
        self
    }

    pub fn parser<F>(mut self, parser: F) -> Self
    where
        F: Fn(&str) -> anyhow::Result<FlagValue> + Send + Sync + 'static,
    {
        self.parser = Some(Arc::new(parser));
        self
    }

    pub fn validator<F>(mut self, validator: F) -> Self
    where
        F: Fn(&FlagValue) -> Result<(), String> + Send + Sync + 'static,
    {
        self.validator = Some(Arc::new(validator));
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn alias_name(&self) -> Option<&str> {
        self.alias.as_deref()
    }

    pub fn usage_text(&self) -> &str {
        &self.usage
    }

    pub fn value_type(&self) -> FlagType {
        self.value_type
    }

    /// 마지막으로 받은 원문 값. 값이 없으면 빈 문자열.
    pub fn raw_value(&self) -> &str {
        &self.raw
    }

    pub fn has_value(&self) -> bool {
        self.value.is_some()
    }

    /// 이름 또는 별칭이 일치하는지 확인한다.
    pub fn matches(&self, key: &str) -> bool {
        self.name == key || self.alias.as_deref() == Some(key)
    }

    /// 원문 값을 선언 타입으로 변환해 저장한다.
    /// 실패하면 기존 상태를 건드리지 않는다.
    pub fn parse(&mut self, raw: &str) -> Result<&FlagValue, ReplError> {
        let parsed = match &self.parser {
            Some(parser) => {
                let value = parser(raw).map_err(|err| self.invalid(format!("{err:#}")))?;
                if value.flag_type() != self.value_type {
                    return Err(self.invalid(format!(
                        "parser returned {} for a {} flag",
                        value.flag_type(),
                        self.value_type
                    )));
                }
                value
            }
            None => self.parse_builtin(raw)?,
        };

        if let Some(validator) = &self.validator {
            validator(&parsed).map_err(|reason| self.invalid(reason))?;
        }

        self.raw = raw.to_string();
        Ok(self.value.insert(parsed))
    }

    fn parse_builtin(&self, raw: &str) -> Result<FlagValue, ReplError> {
        match self.value_type {
            FlagType::Int => raw
                .parse::<i64>()
                .map(FlagValue::Int)
                .map_err(|err| self.invalid(format!("{raw:?}: {err}"))),
            FlagType::String => Ok(FlagValue::String(raw.to_string())),
            // "true" 문자열만 참이다. "TRUE"나 "1"은 거짓으로 본다.
            FlagType::Bool => Ok(FlagValue::Bool(raw == "true")),
            FlagType::IntArray => raw
                .split(',')
                .map(|part| {
                    let part = part.trim();
                    part.parse::<i64>()
                        .map_err(|err| self.invalid(format!("{part:?}: {err}")))
                })
                .collect::<Result<Vec<_>, _>>()
                .map(FlagValue::IntArray),
            FlagType::StringArray => Ok(FlagValue::StringArray(
                raw.split(',').map(|part| part.trim().to_string()).collect(),
            )),
        }
    }

    fn invalid(&self, reason: String) -> ReplError {
        ReplError::InvalidFlagValue {
            flag: self.name.clone(),
            reason,
        }
    }

    /// 파싱된 값. `parse` 이후 `clear` 전까지만 존재한다.
    pub fn parsed_value(&self) -> Option<&FlagValue> {
        self.value.as_ref()
    }

    pub fn clear(&mut self) {
        self.raw.clear();
        self.value = None;
    }
}

impl fmt::Debug for Flag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Flag")
            .field("name", &self.name)
            .field("alias", &self.alias)
            .field("value_type", &self.value_type)
            .field("custom_parser", &self.parser.is_some())
            .field("raw", &self.raw)
            .field("value", &self.value)
            .finish()
    }
}

/// 명령 하나에 선언된 플래그 목록.
#[derive(Debug, Clone, Default)]
pub struct Flags(Vec<Flag>);

impl Flags {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, flag: Flag) {
        self.0.push(flag);
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Flag> {
        self.0.iter()
    }

    pub fn iter_mut(&mut self) -> std::slice::IterMut<'_, Flag> {
        self.0.iter_mut()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// 이름과 선언 타입이 모두 일치하는 플래그의 값을 찾는다.
    fn typed_value(&self, name: &str, value_type: FlagType) -> Option<&FlagValue> {
        self.0
            .iter()
            .find(|flag| flag.name == name && flag.value_type == value_type)
            .and_then(Flag::parsed_value)
    }

    pub fn get_flag_int(&self, name: &str, default_value: i64) -> i64 {
        match self.typed_value(name, FlagType::Int) {
            Some(FlagValue::Int(v)) => *v,
            _ => default_value,
        }
    }

    pub fn get_flag_string(&self, name: &str, default_value: &str) -> String {
        match self.typed_value(name, FlagType::String) {
            Some(FlagValue::String(v)) => v.clone(),
            _ => default_value.to_string(),
        }
    }

    pub fn get_flag_int_array(&self, name: &str) -> Vec<i64> {
        match self.typed_value(name, FlagType::IntArray) {
            Some(FlagValue::IntArray(v)) => v.clone(),
            _ => Vec::new(),
        }
    }

    pub fn get_flag_string_array(&self, name: &str) -> Vec<String> {
        match self.typed_value(name, FlagType::StringArray) {
            Some(FlagValue::StringArray(v)) => v.clone(),
            _ => Vec::new(),
        }
    }

    pub fn get_flag_bool(&self, name: &str) -> bool {
        matches!(
            self.typed_value(name, FlagType::Bool),
            Some(FlagValue::Bool(true))
        )
    }

    pub fn clear_all(&mut self) {
        self.0.iter_mut().for_each(Flag::clear);
    }
}

impl From<Vec<Flag>> for Flags {
    fn from(flags: Vec<Flag>) -> Self {
        Self(flags)
    }
}

impl FromIterator<Flag> for Flags {
    fn from_iter<I: IntoIterator<Item = Flag>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl<'a> IntoIterator for &'a Flags {
    type Item = &'a Flag;
    type IntoIter = std::slice::Iter<'a, Flag>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn int_flag_parses_base10_and_rejects_garbage() {
        let mut flag = Flag::int("count");
        assert_eq!(flag.parse("42").unwrap(), &FlagValue::Int(42));
        assert!(flag.has_value());

        let mut bad = Flag::int("count");
        let err = bad.parse("4x2").unwrap_err();
        assert!(matches!(err, ReplError::InvalidFlagValue { ref flag, .. } if flag == "count"));
        assert!(!bad.has_value());
        assert_eq!(bad.raw_value(), "");
    }

    #[test]
    fn bool_flag_is_true_only_for_literal_true() {
        for (raw, expected) in [("true", true), ("false", false), ("TRUE", false), ("1", false)] {
            let mut flag = Flag::bool("verbose");
            assert_eq!(flag.parse(raw).unwrap(), &FlagValue::Bool(expected), "raw={raw}");
        }
    }

    #[test]
    fn array_flags_split_on_commas_and_trim() {
        let mut ints = Flag::int_array("ids");
        assert_eq!(ints.parse("1, 2,3").unwrap(), &FlagValue::IntArray(vec![1, 2, 3]));

        let mut strings = Flag::string_array("tags");
        assert_eq!(
            strings.parse(" a ,b,  c").unwrap(),
            &FlagValue::StringArray(vec!["a".into(), "b".into(), "c".into()])
        );
    }

    #[test]
    fn int_array_fails_atomically() {
        let mut flag = Flag::int_array("ids");
        assert!(flag.parse("1,two,3").is_err());
        assert!(!flag.has_value());
        assert!(flag.parsed_value().is_none());
    }

    #[test]
    fn failed_reparse_keeps_previous_value() {
        let mut flag = Flag::int("port");
        flag.parse("8080").unwrap();
        assert!(flag.parse("http").is_err());
        assert_eq!(flag.parsed_value(), Some(&FlagValue::Int(8080)));
        assert_eq!(flag.raw_value(), "8080");
    }

    #[test]
    fn clear_is_idempotent() {
        let mut flag = Flag::string("name");
        flag.parse("bob").unwrap();
        flag.clear();
        flag.clear();
        assert!(flag.parsed_value().is_none());
        assert_eq!(flag.raw_value(), "");
    }

    #[test]
    fn custom_parser_replaces_builtin_rules() {
        let mut flag = Flag::int("size").parser(|raw| {
            let kb = raw
                .strip_suffix("k")
                .ok_or_else(|| anyhow::anyhow!("expected <n>k"))?;
            Ok(FlagValue::Int(kb.parse::<i64>()? * 1024))
        });
        assert_eq!(flag.parse("2k").unwrap(), &FlagValue::Int(2048));
        assert!(flag.parse("2048").is_err());
    }

    #[test]
    fn custom_parser_must_return_declared_type() {
        let mut flag = Flag::int("size").parser(|raw| Ok(FlagValue::String(raw.into())));
        let err = flag.parse("1").unwrap_err();
        assert!(err.to_string().contains("parser returned string for a int flag"));
        assert!(!flag.has_value());
    }

    #[test]
    fn validator_rejection_leaves_flag_empty() {
        let mut flag = Flag::int("port").validator(|value| match value {
            FlagValue::Int(p) if *p > 0 && *p < 65536 => Ok(()),
            _ => Err("port out of range".to_string()),
        });
        let err = flag.parse("70000").unwrap_err();
        assert!(err.to_string().contains("port out of range"));
        assert!(!flag.has_value());
        assert!(flag.parse("443").is_ok());
    }

    #[test]
    fn flag_type_tags_round_trip_and_unknown_tags_fail() {
        for ty in [
            FlagType::Int,
            FlagType::String,
            FlagType::IntArray,
            FlagType::StringArray,
            FlagType::Bool,
        ] {
            assert_eq!(ty.tag().parse::<FlagType>().unwrap(), ty);
        }
        let err = "float".parse::<FlagType>().unwrap_err();
        assert!(matches!(err, ReplError::UnknownFlagType(ref t) if t == "float"));
    }

    #[test]
    fn typed_getters_require_matching_name_and_type() {
        let mut flags: Flags = vec![
            Flag::int("count"),
            Flag::string("name"),
            Flag::bool("force"),
            Flag::int_array("ids"),
            Flag::string_array("tags"),
        ]
        .into();
        for flag in flags.iter_mut() {
            let raw = match flag.name() {
                "count" => "7",
                "name" => "alice",
                "force" => "true",
                "ids" => "1,2",
                _ => "x,y",
            };
            flag.parse(raw).unwrap();
        }

        assert_eq!(flags.get_flag_int("count", -1), 7);
        assert_eq!(flags.get_flag_int("name", -1), -1);
        assert_eq!(flags.get_flag_string("name", "?"), "alice");
        assert_eq!(flags.get_flag_string("missing", "?"), "?");
        assert!(flags.get_flag_bool("force"));
        assert!(!flags.get_flag_bool("count"));
        assert_eq!(flags.get_flag_int_array("ids"), vec![1, 2]);
        assert!(flags.get_flag_int_array("tags").is_empty());
        assert_eq!(flags.get_flag_string_array("tags"), vec!["x", "y"]);

        flags.clear_all();
        assert_eq!(flags.get_flag_int("count", -1), -1);
        assert!(!flags.get_flag_bool("force"));
    }

    #[test]
    fn help_flag_matches_name_and_alias() {
        let flag = Flag::help();
        assert!(flag.matches("help"));
        assert!(flag.matches("h"));
        assert!(!flag.matches("hel"));
        assert_eq!(flag.value_type(), FlagType::Bool);
    }
}
