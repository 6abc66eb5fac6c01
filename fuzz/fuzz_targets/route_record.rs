#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use serde_json::{Map, Value};

use kayvee_core::config::ServiceIdentity;
use kayvee_router::{MatchValue, MatcherSpec, Router, Rule};

/// 퍼저용 구조적 입력
#[derive(Arbitrary, Debug)]
struct FuzzInput {
    /// 규칙 목록 (최대 8개로 제한)
    rules: Vec<FuzzRule>,
    /// 라우팅 대상 레코드 필드
    record: Vec<(String, FuzzValue)>,
}

#[derive(Arbitrary, Debug)]
struct FuzzRule {
    matchers: Vec<(String, Vec<FuzzMatch>)>,
    series: String,
    dimensions: Vec<String>,
}

#[derive(Arbitrary, Debug)]
enum FuzzMatch {
    Wildcard,
    Text(String),
    Flag(bool),
}

#[derive(Arbitrary, Debug)]
enum FuzzValue {
    Null,
    Bool(bool),
    Int(i64),
    Text(String),
    Nested(String, String),
}

impl FuzzMatch {
    fn to_match_value(&self) -> MatchValue {
        match self {
            FuzzMatch::Wildcard => MatchValue::Wildcard,
            FuzzMatch::Text(s) => MatchValue::Text(s.clone()),
            FuzzMatch::Flag(b) => MatchValue::Flag(*b),
        }
    }
}

impl FuzzValue {
    fn to_json(&self) -> Value {
        match self {
            FuzzValue::Null => Value::Null,
            FuzzValue::Bool(b) => Value::Bool(*b),
            FuzzValue::Int(n) => Value::from(*n),
            FuzzValue::Text(s) => Value::String(s.clone()),
            FuzzValue::Nested(k, v) => {
                let mut inner = Map::new();
                inner.insert(k.clone(), Value::String(v.clone()));
                Value::Object(inner)
            }
        }
    }
}

fuzz_target!(|input: FuzzInput| {
    let no_env = |_: &str| -> Option<String> { None };

    let mut rules = Vec::new();
    for (i, fuzz_rule) in input.rules.iter().take(8).enumerate() {
        let mut spec = MatcherSpec::new();
        for (path, values) in fuzz_rule.matchers.iter().take(4) {
            spec = spec.field(path.as_str(), values.iter().map(FuzzMatch::to_match_value));
        }

        let mut output = Map::new();
        output.insert("type".to_owned(), Value::from("metrics"));
        output.insert("series".to_owned(), Value::from(fuzz_rule.series.as_str()));
        output.insert(
            "dimensions".to_owned(),
            Value::from(fuzz_rule.dimensions.clone()),
        );

        // 잘못된 매처 조합은 생성 단계에서 거부되어야 함 (크래시 없이)
        if let Ok(rule) = Rule::with_env(format!("rule-{i}"), spec, output, &no_env) {
            rules.push(rule);
        }
    }

    let expected = rules.len();
    let router = Router::with_identity(ServiceIdentity::default()).with_rules(rules);

    let mut record = Map::new();
    for (key, value) in input.record.iter().take(16) {
        record.insert(key.clone(), value.to_json());
    }

    let result = router.route(&record);
    assert!(result.routes.len() <= expected);
});
