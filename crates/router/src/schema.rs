//! 라우팅 설정 스키마 검증
//!
//! 파싱된 설정 문서를 규칙 생성 전에 검증합니다.
//! 첫 번째 실패에서 멈추지 않고 모든 규칙을 검사하여 위반 사항을 모읍니다.
//! 각 메시지는 위치(`<rule>.matchers.<field>`, `<rule>.output.<key>`)로 시작합니다.
//!
//! # 출력 종류별 스키마
//!
//! | type            | 필수                                   | 선택          |
//! |-----------------|----------------------------------------|---------------|
//! | `metrics`       | `series`, `dimensions`                 | `value_field` |
//! | `alerts`        | `series`, `dimensions`, `stat_type`    | `value_field` |
//! | `analytics`     | `series`                               |               |
//! | `notifications` | `channel`, `icon`, `message`, `user`   |               |

use std::collections::HashSet;

use serde_json::{Map, Value};

use kayvee_core::types::Record;

use crate::error::RouterError;
use crate::rule::{MatchValue, OutputKind, RULE_KEY, TYPE_KEY};

/// 최상위 문서의 유일한 키
pub const ROUTES_KEY: &str = "routes";

/// 규칙 정의의 매처 키
pub const MATCHERS_KEY: &str = "matchers";

/// 규칙 정의의 출력 키
pub const OUTPUT_KEY: &str = "output";

/// `stat_type`에 허용되는 값
const STAT_TYPES: [&str; 2] = ["counter", "gauge"];

/// 출력 필드 값의 타입
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FieldType {
    /// 비어있지 않은 문자열
    Text,
    /// 문자열 배열
    TextList,
    /// `counter` 또는 `gauge`
    StatType,
}

/// 출력 종류별 키 정의
struct KindSchema {
    required: &'static [(&'static str, FieldType)],
    optional: &'static [(&'static str, FieldType)],
}

impl KindSchema {
    fn for_kind(kind: OutputKind) -> Self {
        match kind {
            OutputKind::Metrics => Self {
                required: &[("series", FieldType::Text), ("dimensions", FieldType::TextList)],
                optional: &[("value_field", FieldType::Text)],
            },
            OutputKind::Alerts => Self {
                required: &[
                    ("series", FieldType::Text),
                    ("dimensions", FieldType::TextList),
                    ("stat_type", FieldType::StatType),
                ],
                optional: &[("value_field", FieldType::Text)],
            },
            OutputKind::Analytics => Self {
                required: &[("series", FieldType::Text)],
                optional: &[],
            },
            OutputKind::Notifications => Self {
                required: &[
                    ("channel", FieldType::Text),
                    ("icon", FieldType::Text),
                    ("message", FieldType::Text),
                    ("user", FieldType::Text),
                ],
                optional: &[],
            },
        }
    }

    fn field_type(&self, key: &str) -> Option<FieldType> {
        self.required
            .iter()
            .chain(self.optional)
            .find(|(name, _)| *name == key)
            .map(|(_, ty)| *ty)
    }
}

/// 설정 문서 검증기
pub struct ConfigValidator;

impl ConfigValidator {
    /// 문서를 검증하고, 위반 사항이 있으면 모두 모아서 반환합니다.
    pub fn validate(document: &Value) -> Result<(), RouterError> {
        let errors = Self::collect_errors(document);
        if errors.is_empty() {
            Ok(())
        } else {
            Err(RouterError::ConfigValidation { errors })
        }
    }

    /// 문서의 모든 위반 사항을 수집합니다.
    pub fn collect_errors(document: &Value) -> Vec<String> {
        let mut errors = Vec::new();

        let Some(root) = document.as_object() else {
            errors.push(format!(
                "document: must be a mapping with a single '{ROUTES_KEY}' key"
            ));
            return errors;
        };

        for key in root.keys().filter(|k| k.as_str() != ROUTES_KEY) {
            errors.push(format!("document: unknown top-level key '{key}'"));
        }

        match root.get(ROUTES_KEY) {
            None => errors.push(format!("document: missing required key '{ROUTES_KEY}'")),
            Some(Value::Object(routes)) => {
                for (name, rule) in routes {
                    Self::check_rule(name, rule, &mut errors);
                }
            }
            Some(_) => errors.push(format!(
                "{ROUTES_KEY}: must be a mapping of rule name to rule definition"
            )),
        }

        errors
    }

    /// 환경변수 치환이 끝난 규칙 출력을 다시 검사합니다.
    ///
    /// `${VAR}`가 빈 값으로 치환되어 필수 문자열이 비게 되는 경우를 잡습니다.
    pub fn check_substituted_output(rule: &str, output: &Record) -> Vec<String> {
        let mut output = output.clone();
        output.remove(RULE_KEY);

        let mut errors = Vec::new();
        Self::check_output(rule, &Value::Object(output), &mut errors);
        errors
    }

    fn check_rule(name: &str, rule: &Value, errors: &mut Vec<String>) {
        if name.is_empty() {
            errors.push(format!("{ROUTES_KEY}: rule name must not be empty"));
        }

        let Some(rule) = rule.as_object() else {
            errors.push(format!(
                "{name}: rule must be a mapping with '{MATCHERS_KEY}' and '{OUTPUT_KEY}'"
            ));
            return;
        };

        for key in rule
            .keys()
            .filter(|k| k.as_str() != MATCHERS_KEY && k.as_str() != OUTPUT_KEY)
        {
            errors.push(format!("{name}: unknown key '{key}'"));
        }

        match rule.get(MATCHERS_KEY) {
            Some(matchers) => Self::check_matchers(name, matchers, errors),
            None => errors.push(format!("{name}: missing required key '{MATCHERS_KEY}'")),
        }

        match rule.get(OUTPUT_KEY) {
            Some(output) => Self::check_output(name, output, errors),
            None => errors.push(format!("{name}: missing required key '{OUTPUT_KEY}'")),
        }
    }

    fn check_matchers(rule: &str, matchers: &Value, errors: &mut Vec<String>) {
        let Some(matchers) = matchers.as_object() else {
            errors.push(format!(
                "{rule}.{MATCHERS_KEY}: must be a mapping of field to value list"
            ));
            return;
        };

        for (field, values) in matchers {
            let at = format!("{rule}.{MATCHERS_KEY}.{field}");
            if field.is_empty() {
                errors.push(format!("{rule}.{MATCHERS_KEY}: field path must not be empty"));
            }

            let Some(values) = values.as_array() else {
                errors.push(format!("{at}: must be a list of values"));
                continue;
            };
            if values.is_empty() {
                errors.push(format!("{at}: value list must not be empty"));
                continue;
            }

            let mut seen = HashSet::with_capacity(values.len());
            let mut has_wildcard = false;
            for value in values {
                let Some(parsed) = MatchValue::from_json(value) else {
                    errors.push(format!("{at}: {value} is not a string or boolean"));
                    continue;
                };
                if parsed == MatchValue::Text(String::new()) {
                    errors.push(format!("{at}: empty string is not a valid value"));
                    continue;
                }
                has_wildcard |= parsed == MatchValue::Wildcard;
                if !seen.insert(parsed) {
                    errors.push(format!("{at}: duplicate value {value}"));
                }
            }

            if has_wildcard && values.len() > 1 {
                errors.push(format!(
                    "{at}: wildcard matcher can't co-exist with other matchers"
                ));
            }
        }
    }

    fn check_output(rule: &str, output: &Value, errors: &mut Vec<String>) {
        let at = format!("{rule}.{OUTPUT_KEY}");
        let Some(output) = output.as_object() else {
            errors.push(format!("{at}: must be a mapping"));
            return;
        };

        let kind = match output.get(TYPE_KEY) {
            None => {
                errors.push(format!("{at}: missing required key '{TYPE_KEY}'"));
                return;
            }
            Some(Value::String(t)) => match t.parse::<OutputKind>() {
                Ok(kind) => kind,
                Err(_) => {
                    errors.push(format!(
                        "{at}.{TYPE_KEY}: '{t}' is not one of {}",
                        kind_names()
                    ));
                    return;
                }
            },
            Some(other) => {
                errors.push(format!(
                    "{at}.{TYPE_KEY}: {other} is not one of {}",
                    kind_names()
                ));
                return;
            }
        };

        let schema = KindSchema::for_kind(kind);

        for (key, _) in schema.required {
            if !output.contains_key(*key) {
                errors.push(format!(
                    "{at}: missing required key '{key}' for type '{kind}'"
                ));
            }
        }

        for (key, value) in output.iter().filter(|(k, _)| k.as_str() != TYPE_KEY) {
            match schema.field_type(key) {
                Some(ty) => check_field(&at, key, ty, value, errors),
                None => errors.push(format!("{at}: unknown key '{key}' for type '{kind}'")),
            }
        }
    }
}

fn check_field(at: &str, key: &str, ty: FieldType, value: &Value, errors: &mut Vec<String>) {
    match ty {
        FieldType::Text => {
            if !is_non_empty_str(value) {
                errors.push(format!("{at}.{key}: must be a non-empty string"));
            }
        }
        FieldType::TextList => match value.as_array() {
            Some(items) if items.iter().all(is_non_empty_str) => {}
            _ => errors.push(format!("{at}.{key}: must be a list of non-empty strings")),
        },
        FieldType::StatType => {
            if !value.as_str().is_some_and(|s| STAT_TYPES.contains(&s)) {
                errors.push(format!(
                    "{at}.{key}: must be one of {}",
                    STAT_TYPES.join(", ")
                ));
            }
        }
    }
}

fn is_non_empty_str(value: &Value) -> bool {
    value.as_str().is_some_and(|s| !s.is_empty())
}

fn kind_names() -> String {
    OutputKind::ALL
        .iter()
        .map(OutputKind::as_str)
        .collect::<Vec<_>>()
        .join(", ")
}

/// 검증을 통과한 문서에서 `routes` 매핑을 꺼냅니다.
pub(crate) fn routes(document: &Value) -> Option<&Map<String, Value>> {
    document.get(ROUTES_KEY).and_then(Value::as_object)
}
