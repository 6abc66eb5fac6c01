//! 필드 매칭 로직
//!
//! [`MatcherSpec`]은 필드 경로별 허용 값 목록이며, 규칙 생성 시 검증을 거쳐
//! [`FieldMatcher`] 목록으로 컴파일됩니다. 필드 간에는 AND로 결합됩니다.

use std::collections::HashSet;

use serde_json::Value;

use kayvee_core::types::Record;

use super::types::MatchValue;
use crate::error::RouterError;
use crate::field::FieldPath;

/// 필드 경로 -> 허용 값 목록 (선언 순서 유지)
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MatcherSpec {
    fields: Vec<(String, Vec<MatchValue>)>,
}

impl MatcherSpec {
    /// 빈 매처 (모든 레코드에 매칭)
    pub fn new() -> Self {
        Self::default()
    }

    /// 필드 조건을 추가합니다.
    pub fn field<V>(mut self, path: impl Into<String>, values: impl IntoIterator<Item = V>) -> Self
    where
        V: Into<MatchValue>,
    {
        self.fields
            .push((path.into(), values.into_iter().map(Into::into).collect()));
        self
    }

    /// 필드 조건 목록
    pub fn fields(&self) -> &[(String, Vec<MatchValue>)] {
        &self.fields
    }

    /// 조건이 없는지 확인합니다.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// 불변 조건을 검증하고 매칭용 구조로 컴파일합니다.
    ///
    /// - 값 목록은 비어있지 않아야 합니다.
    /// - 와일드카드는 다른 값과 함께 쓸 수 없습니다.
    /// - 중복 값과 빈 문자열은 허용되지 않습니다.
    pub(crate) fn compile(&self, rule: &str) -> Result<Vec<FieldMatcher>, RouterError> {
        let invalid = |field: &str, reason: String| RouterError::InvalidMatcher {
            rule: rule.to_owned(),
            field: field.to_owned(),
            reason,
        };

        let mut compiled = Vec::with_capacity(self.fields.len());
        for (path, values) in &self.fields {
            if path.is_empty() {
                return Err(invalid(path, "field path must not be empty".to_owned()));
            }
            if values.is_empty() {
                return Err(invalid(path, "value list must not be empty".to_owned()));
            }

            let has_wildcard = values.contains(&MatchValue::Wildcard);
            if has_wildcard && values.len() > 1 {
                return Err(invalid(
                    path,
                    "wildcard matcher can't co-exist with other matchers".to_owned(),
                ));
            }

            let mut seen = HashSet::with_capacity(values.len());
            for value in values {
                if *value == MatchValue::Text(String::new()) {
                    return Err(invalid(path, "empty string is not a valid value".to_owned()));
                }
                if !seen.insert(value) {
                    return Err(invalid(path, format!("duplicate value {value}")));
                }
            }

            compiled.push(FieldMatcher {
                path: FieldPath::parse(path.clone()),
                wildcard: has_wildcard,
                values: values.clone(),
            });
        }

        Ok(compiled)
    }
}

/// 컴파일된 단일 필드 조건
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldMatcher {
    path: FieldPath,
    wildcard: bool,
    values: Vec<MatchValue>,
}

impl FieldMatcher {
    /// 대상 필드 경로
    pub fn path(&self) -> &str {
        self.path.as_str()
    }

    /// 레코드의 필드 값이 조건을 만족하는지 평가합니다.
    ///
    /// 값이 없거나 `null`, 빈 문자열이면 와일드카드를 포함해 항상 실패합니다.
    pub fn matches(&self, record: &Record) -> bool {
        let Some(value) = self.path.resolve(record) else {
            return false;
        };

        match value {
            Value::Null => return false,
            Value::String(s) if s.is_empty() => return false,
            _ => {}
        }

        if self.wildcard {
            return true;
        }

        self.values.iter().any(|expected| expected.accepts(value))
    }
}
