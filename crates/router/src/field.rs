//! 필드 경로 해석
//!
//! 점(`.`)으로 구분된 필드 경로를 중첩 레코드에 대해 해석합니다.
//!
//! 해석 순서:
//! 1. 경로 전체와 같은 최상위 키가 있으면 그 값을 사용합니다 (`"a.b"`라는 키 포함).
//! 2. 없으면 `.`으로 분할하여 중첩 객체를 따라 내려갑니다.
//!
//! 중간 세그먼트가 없거나 객체가 아니면 결과는 "없음"(`None`)이며 에러가 아닙니다.

use serde_json::Value;

use kayvee_core::types::Record;

/// 미리 분할된 필드 경로
///
/// 규칙 로딩 시 한 번만 분할하여 매칭 시 재분할 비용을 없앱니다.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldPath {
    raw: String,
    segments: Vec<String>,
}

impl FieldPath {
    /// 경로 문자열을 분할합니다.
    pub fn parse(raw: impl Into<String>) -> Self {
        let raw = raw.into();
        let segments = if raw.contains('.') {
            raw.split('.').map(str::to_owned).collect()
        } else {
            Vec::new()
        };
        Self { raw, segments }
    }

    /// 원본 경로 문자열
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// 레코드에서 이 경로의 값을 찾습니다.
    pub fn resolve<'a>(&self, record: &'a Record) -> Option<&'a Value> {
        if let Some(value) = record.get(&self.raw) {
            return Some(value);
        }

        let (first, rest) = self.segments.split_first()?;
        let mut current = record.get(first)?;
        for segment in rest {
            current = current.as_object()?.get(segment)?;
        }
        Some(current)
    }
}

/// 레코드에서 필드 경로를 해석합니다.
pub fn resolve<'a>(record: &'a Record, path: &str) -> Option<&'a Value> {
    FieldPath::parse(path).resolve(record)
}
