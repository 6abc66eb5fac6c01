//! 출력 템플릿 치환
//!
//! 두 개의 독립된 치환 단계가 있습니다.
//!
//! - `${NAME}`: 환경변수. 규칙 로딩 시 한 번 치환되며, 누락된 변수는 모두 모아서 보고합니다.
//! - `%{field.path}`: 레코드 필드. 매칭된 레코드마다 치환되며, 값이 없거나 falsy이면
//!   [`KEY_NOT_FOUND`]로 대체됩니다.
//!
//! 필드 템플릿은 로딩 시 리터럴/필드 세그먼트로 미리 분해해 두므로
//! 매칭 경로에서는 정규식을 사용하지 않습니다.

use std::borrow::Cow;
use std::sync::LazyLock;

use regex::Regex;
use serde_json::Value;

use kayvee_core::types::Record;

use crate::field::FieldPath;

/// 필드 값을 찾지 못했을 때 치환되는 값
pub const KEY_NOT_FOUND: &str = "KEY_NOT_FOUND";

static ENV_TOKEN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\$\{(.+?)\}").expect("env token pattern is valid"));

static FIELD_TOKEN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"%\{(.+?)\}").expect("field token pattern is valid"));

/// 문자열의 `${NAME}` 토큰을 `lookup` 결과로 치환합니다.
///
/// 값을 찾지 못한 이름은 `missing`에 (중복 없이) 추가되고 빈 문자열로 치환됩니다.
pub fn substitute_env<F>(text: &str, lookup: &F, missing: &mut Vec<String>) -> String
where
    F: Fn(&str) -> Option<String>,
{
    ENV_TOKEN
        .replace_all(text, |caps: &regex::Captures<'_>| {
            let name = &caps[1];
            match lookup(name) {
                Some(value) => value,
                None => {
                    if !missing.iter().any(|m| m == name) {
                        missing.push(name.to_owned());
                    }
                    String::new()
                }
            }
        })
        .into_owned()
}

/// 출력 템플릿 전체(문자열과 문자열 배열 원소)에 환경변수 치환을 적용합니다.
///
/// 원본은 변경하지 않고 새 매핑을 만듭니다. 누락된 변수가 있으면 이름 목록을 반환합니다.
pub(crate) fn substitute_env_output<F>(output: &Record, lookup: &F) -> Result<Record, Vec<String>>
where
    F: Fn(&str) -> Option<String>,
{
    let mut missing = Vec::new();
    let mut substituted = Record::new();

    for (key, value) in output {
        let new_value = match value {
            Value::String(s) => Value::String(substitute_env(s, lookup, &mut missing)),
            Value::Array(items) => Value::Array(
                items
                    .iter()
                    .map(|item| match item {
                        Value::String(s) => Value::String(substitute_env(s, lookup, &mut missing)),
                        other => other.clone(),
                    })
                    .collect(),
            ),
            other => other.clone(),
        };
        substituted.insert(key.clone(), new_value);
    }

    if missing.is_empty() {
        Ok(substituted)
    } else {
        Err(missing)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Literal(String),
    Field(FieldPath),
}

/// `%{field}` 토큰이 미리 분해된 문자열 템플릿
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldTemplate {
    source: String,
    segments: Vec<Segment>,
}

impl FieldTemplate {
    /// 문자열을 리터럴/필드 세그먼트로 분해합니다.
    pub fn compile(text: &str) -> Self {
        let mut segments = Vec::new();
        let mut last = 0;

        for caps in FIELD_TOKEN.captures_iter(text) {
            let (Some(whole), Some(path)) = (caps.get(0), caps.get(1)) else {
                continue;
            };
            if whole.start() > last {
                segments.push(Segment::Literal(text[last..whole.start()].to_owned()));
            }
            segments.push(Segment::Field(FieldPath::parse(path.as_str())));
            last = whole.end();
        }
        if last < text.len() {
            segments.push(Segment::Literal(text[last..].to_owned()));
        }

        Self {
            source: text.to_owned(),
            segments,
        }
    }

    /// 필드 토큰을 포함하는지 확인합니다.
    pub fn has_fields(&self) -> bool {
        self.segments
            .iter()
            .any(|segment| matches!(segment, Segment::Field(_)))
    }

    /// 레코드 값으로 필드 토큰을 치환한 새 문자열을 만듭니다.
    pub fn render(&self, record: &Record) -> String {
        if !self.has_fields() {
            return self.source.clone();
        }

        let mut out = String::with_capacity(self.source.len());
        for segment in &self.segments {
            match segment {
                Segment::Literal(text) => out.push_str(text),
                Segment::Field(path) => out.push_str(&field_text(path.resolve(record))),
            }
        }
        out
    }
}

/// 치환될 필드 값의 문자열 표현
///
/// 문자열은 그대로, 그 외 값은 JSON 표기로 치환됩니다.
fn field_text(value: Option<&Value>) -> Cow<'_, str> {
    match value {
        Some(v) if is_falsy(v) => Cow::Borrowed(KEY_NOT_FOUND),
        Some(Value::String(s)) => Cow::Borrowed(s.as_str()),
        Some(other) => Cow::Owned(other.to_string()),
        None => Cow::Borrowed(KEY_NOT_FOUND),
    }
}

fn is_falsy(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(b) => !b,
        Value::Number(n) => n.as_f64() == Some(0.0),
        Value::String(s) => s.is_empty(),
        Value::Array(_) | Value::Object(_) => false,
    }
}

/// 컴파일된 출력 값
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum CompiledValue {
    /// 치환 없이 그대로 복사되는 값
    Literal(Value),
    /// 문자열 템플릿
    Text(FieldTemplate),
    /// 배열 (문자열 원소만 템플릿 처리)
    List(Vec<CompiledValue>),
}

impl CompiledValue {
    fn compile(value: &Value) -> Self {
        match value {
            Value::String(s) => Self::Text(FieldTemplate::compile(s)),
            Value::Array(items) => Self::List(
                items
                    .iter()
                    .map(|item| match item {
                        Value::String(s) => Self::Text(FieldTemplate::compile(s)),
                        other => Self::Literal(other.clone()),
                    })
                    .collect(),
            ),
            other => Self::Literal(other.clone()),
        }
    }

    fn render(&self, record: &Record) -> Value {
        match self {
            Self::Literal(value) => value.clone(),
            Self::Text(template) => Value::String(template.render(record)),
            Self::List(items) => Value::Array(items.iter().map(|i| i.render(record)).collect()),
        }
    }
}

/// 환경변수 치환이 끝난 출력 템플릿의 컴파일 결과
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct CompiledOutput {
    entries: Vec<(String, CompiledValue)>,
}

impl CompiledOutput {
    pub(crate) fn compile(output: &Record) -> Self {
        Self {
            entries: output
                .iter()
                .map(|(key, value)| (key.clone(), CompiledValue::compile(value)))
                .collect(),
        }
    }

    /// 매 호출마다 새 매핑을 만듭니다. 저장된 템플릿과 별칭을 공유하지 않습니다.
    pub(crate) fn render(&self, record: &Record) -> Record {
        let mut rendered = Record::new();
        for (key, value) in &self.entries {
            rendered.insert(key.clone(), value.render(record));
        }
        rendered
    }
}
