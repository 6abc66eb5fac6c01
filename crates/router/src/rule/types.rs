//! 규칙 데이터 타입
//!
//! 매처 값과 출력 종류를 정의합니다.

use std::fmt;
use std::str::FromStr;

use serde::{Serialize, Serializer};
use serde_json::Value;

/// 와일드카드 매처 값
pub const WILDCARD: &str = "*";

/// 매처가 허용하는 값 하나
///
/// 설정 파일에서는 문자열 또는 불리언만 허용됩니다.
/// `"*"`는 와일드카드로 해석됩니다.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum MatchValue {
    /// 존재하고 비어있지 않은 모든 값
    Wildcard,
    /// 문자열 정확히 일치
    Text(String),
    /// 불리언 정확히 일치
    Flag(bool),
}

impl MatchValue {
    /// JSON 값을 매처 값으로 변환합니다. 허용되지 않는 타입이면 `None`.
    pub fn from_json(value: &Value) -> Option<Self> {
        match value {
            Value::String(s) if s == WILDCARD => Some(Self::Wildcard),
            Value::String(s) => Some(Self::Text(s.clone())),
            Value::Bool(b) => Some(Self::Flag(*b)),
            _ => None,
        }
    }

    /// 해석된 필드 값이 이 매처 값과 일치하는지 확인합니다 (타입 구분).
    pub fn accepts(&self, value: &Value) -> bool {
        match self {
            Self::Wildcard => true,
            Self::Text(expected) => value.as_str() == Some(expected.as_str()),
            Self::Flag(expected) => value.as_bool() == Some(*expected),
        }
    }
}

impl From<&str> for MatchValue {
    fn from(s: &str) -> Self {
        if s == WILDCARD {
            Self::Wildcard
        } else {
            Self::Text(s.to_owned())
        }
    }
}

impl From<bool> for MatchValue {
    fn from(b: bool) -> Self {
        Self::Flag(b)
    }
}

impl fmt::Display for MatchValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Wildcard => f.write_str(WILDCARD),
            Self::Text(s) => write!(f, "{s:?}"),
            Self::Flag(b) => write!(f, "{b}"),
        }
    }
}

impl Serialize for MatchValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Wildcard => serializer.serialize_str(WILDCARD),
            Self::Text(s) => serializer.serialize_str(s),
            Self::Flag(b) => serializer.serialize_bool(*b),
        }
    }
}

/// 출력 종류 -- 다운스트림 소비자 범주
///
/// 설정 파일의 `output.type` 값에 대응합니다.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OutputKind {
    Metrics,
    Alerts,
    Analytics,
    Notifications,
}

impl OutputKind {
    /// 허용되는 모든 종류
    pub const ALL: [OutputKind; 4] = [
        OutputKind::Metrics,
        OutputKind::Alerts,
        OutputKind::Analytics,
        OutputKind::Notifications,
    ];

    /// 설정 파일에서 사용하는 이름
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Metrics => "metrics",
            Self::Alerts => "alerts",
            Self::Analytics => "analytics",
            Self::Notifications => "notifications",
        }
    }

    /// 수치 시계열 종류인지 (`value_field` 기본값 적용 대상)
    pub fn is_numeric_series(&self) -> bool {
        matches!(self, Self::Metrics | Self::Alerts)
    }
}

impl fmt::Display for OutputKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OutputKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| format!("unknown output type: {s}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn from_json_accepts_strings_and_booleans() {
        assert_eq!(MatchValue::from_json(&json!("*")), Some(MatchValue::Wildcard));
        assert_eq!(
            MatchValue::from_json(&json!("hi")),
            Some(MatchValue::Text("hi".to_owned()))
        );
        assert_eq!(MatchValue::from_json(&json!(false)), Some(MatchValue::Flag(false)));
        assert_eq!(MatchValue::from_json(&json!(5)), None);
        assert_eq!(MatchValue::from_json(&json!([])), None);
        assert_eq!(MatchValue::from_json(&json!({})), None);
        assert_eq!(MatchValue::from_json(&Value::Null), None);
    }

    #[test]
    fn accepts_is_type_sensitive() {
        let text = MatchValue::from("true");
        assert!(text.accepts(&json!("true")));
        assert!(!text.accepts(&json!(true)));

        let flag = MatchValue::from(true);
        assert!(flag.accepts(&json!(true)));
        assert!(!flag.accepts(&json!("true")));
    }

    #[test]
    fn output_kind_parses_canonical_names_only() {
        assert_eq!("alerts".parse::<OutputKind>().unwrap(), OutputKind::Alerts);
        assert_eq!(
            "notifications".parse::<OutputKind>().unwrap(),
            OutputKind::Notifications
        );
        assert!("alert".parse::<OutputKind>().is_err());
        assert!("notification".parse::<OutputKind>().is_err());
    }

    #[test]
    fn numeric_series_kinds() {
        assert!(OutputKind::Metrics.is_numeric_series());
        assert!(OutputKind::Alerts.is_numeric_series());
        assert!(!OutputKind::Analytics.is_numeric_series());
    }
}
