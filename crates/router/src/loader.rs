//! 라우팅 설정 로더 -- kvconfig 텍스트/파일을 규칙 목록으로 변환합니다.
//!
//! 처리 순서: YAML 파싱 → 스키마 검증 → 규칙 생성(환경변수 치환 포함).
//! 한 단계라도 실패하면 규칙을 하나도 반환하지 않습니다.
//! 누락된 환경변수는 모든 규칙에서 모아서 한 번에 보고합니다.

use std::path::Path;

use serde_json::Value;

use crate::error::RouterError;
use crate::rule::{MatchValue, MatcherSpec, Rule};
use crate::schema::{self, ConfigValidator, MATCHERS_KEY, OUTPUT_KEY};

/// 설정 파일 최대 크기
pub const MAX_CONFIG_FILE_SIZE: u64 = 10 * 1024 * 1024; // 10MB

/// 문자열 설정의 출처 이름
pub const STRING_SOURCE: &str = "<string>";

/// 라우팅 설정 로더
pub struct ConfigLoader;

impl ConfigLoader {
    /// 설정 텍스트를 파싱하여 규칙 목록을 만듭니다 (프로세스 환경변수 사용).
    pub fn parse(text: &str, source_name: &str) -> Result<Vec<Rule>, RouterError> {
        Self::parse_with_env(text, source_name, &|key: &str| std::env::var(key).ok())
    }

    /// 주어진 조회 함수로 환경변수를 치환하며 설정 텍스트를 파싱합니다.
    ///
    /// # Errors
    /// - YAML/JSON 문법 오류: [`RouterError::ConfigParse`]
    /// - 스키마 위반: [`RouterError::ConfigValidation`]
    /// - 환경변수 누락: [`RouterError::MissingEnvironment`]
    pub fn parse_with_env<F>(
        text: &str,
        source_name: &str,
        lookup: &F,
    ) -> Result<Vec<Rule>, RouterError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let document: Value =
            serde_yaml::from_str(text).map_err(|e| RouterError::ConfigParse {
                source_name: source_name.to_owned(),
                reason: e.to_string(),
            })?;

        ConfigValidator::validate(&document)?;

        let Some(routes) = schema::routes(&document) else {
            return Ok(Vec::new());
        };

        let mut rules = Vec::with_capacity(routes.len());
        let mut missing: Vec<String> = Vec::new();

        for (name, definition) in routes {
            let spec = matcher_spec(definition.get(MATCHERS_KEY));
            let output = definition
                .get(OUTPUT_KEY)
                .and_then(Value::as_object)
                .cloned()
                .unwrap_or_default();

            match Rule::with_env(name.as_str(), spec, output, lookup) {
                Ok(rule) => rules.push(rule),
                Err(RouterError::MissingEnvironment { names }) => {
                    for n in names {
                        if !missing.contains(&n) {
                            missing.push(n);
                        }
                    }
                }
                Err(e) => return Err(e),
            }
        }

        if !missing.is_empty() {
            return Err(RouterError::MissingEnvironment { names: missing });
        }

        let errors: Vec<String> = rules
            .iter()
            .flat_map(|rule| {
                ConfigValidator::check_substituted_output(rule.name(), rule.output())
            })
            .collect();
        if !errors.is_empty() {
            return Err(RouterError::ConfigValidation { errors });
        }

        Ok(rules)
    }

    /// 설정 파일을 동기적으로 읽어 규칙 목록을 만듭니다.
    pub fn load_file_blocking(path: impl AsRef<Path>) -> Result<Vec<Rule>, RouterError> {
        let path = path.as_ref();

        let metadata = std::fs::metadata(path)
            .map_err(|e| load_error(path, "failed to read file metadata", e))?;
        check_size(path, metadata.len())?;

        let content = std::fs::read_to_string(path)
            .map_err(|e| load_error(path, "failed to read file", e))?;

        Self::parse(&content, &path.display().to_string())
    }

    /// 설정 파일을 비동기로 읽어 규칙 목록을 만듭니다.
    ///
    /// # Errors
    /// - 파일이 없거나 읽을 수 없는 경우: [`RouterError::ConfigLoad`]
    /// - 파일 크기가 `MAX_CONFIG_FILE_SIZE`를 초과하는 경우: [`RouterError::ConfigLoad`]
    /// - 그 외 [`ConfigLoader::parse`]의 모든 에러
    pub async fn load_file(path: impl AsRef<Path>) -> Result<Vec<Rule>, RouterError> {
        let path = path.as_ref();

        // 파일 크기 검증
        let metadata = tokio::fs::metadata(path)
            .await
            .map_err(|e| load_error(path, "failed to read file metadata", e))?;
        check_size(path, metadata.len())?;

        let content = tokio::fs::read_to_string(path)
            .await
            .map_err(|e| load_error(path, "failed to read file", e))?;

        Self::parse(&content, &path.display().to_string())
    }
}

/// 설정 텍스트를 규칙 목록으로 변환합니다. 라우터에는 설치하지 않습니다.
pub fn parse_config(text: &str, source_name: &str) -> Result<Vec<Rule>, RouterError> {
    ConfigLoader::parse(text, source_name)
}

fn matcher_spec(matchers: Option<&Value>) -> MatcherSpec {
    let mut spec = MatcherSpec::new();
    if let Some(Value::Object(fields)) = matchers {
        for (field, values) in fields {
            let values = values
                .as_array()
                .map(|items| items.iter().filter_map(MatchValue::from_json).collect::<Vec<_>>())
                .unwrap_or_default();
            spec = spec.field(field.as_str(), values);
        }
    }
    spec
}

fn check_size(path: &Path, len: u64) -> Result<(), RouterError> {
    if len > MAX_CONFIG_FILE_SIZE {
        return Err(RouterError::ConfigLoad {
            path: path.display().to_string(),
            reason: format!("file too large: {len} bytes (max: {MAX_CONFIG_FILE_SIZE})"),
        });
    }
    Ok(())
}

fn load_error(path: &Path, what: &str, err: std::io::Error) -> RouterError {
    RouterError::ConfigLoad {
        path: path.display().to_string(),
        reason: format!("{what}: {err}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn no_env(_: &str) -> Option<String> {
        None
    }

    fn env_of(pairs: &'static [(&'static str, &'static str)]) -> impl Fn(&str) -> Option<String> {
        move |key: &str| {
            pairs
                .iter()
                .find(|(k, _)| *k == key)
                .map(|(_, v)| (*v).to_owned())
        }
    }

    const TWO_RULES: &str = r##"
routes:
  rule-one:
    matchers:
      title: ["authorize-app"]
    output:
      type: "notifications"
      channel: "#team"
      icon: ":rocket:"
      message: "authorized %{foo.bar} in ${SCHOOL}"
      user: "@fishman"
  rule-two:
    matchers:
      foo.bar: ["multiple", "matches"]
      baz: ["whatever"]
    output:
      type: "alerts"
      series: "other-series"
      dimensions: ["baz"]
      stat_type: "gauge"
"##;

    #[test]
    fn parses_rules_in_document_order() {
        let rules =
            ConfigLoader::parse_with_env(TWO_RULES, "test", &env_of(&[("SCHOOL", "Hogwarts")]))
                .unwrap();
        assert_eq!(rules.len(), 2);
        assert_eq!(rules[0].name(), "rule-one");
        assert_eq!(rules[1].name(), "rule-two");
        assert_eq!(
            rules[0].output().get("message"),
            Some(&json!("authorized %{foo.bar} in Hogwarts"))
        );
        assert_eq!(rules[1].output().get("value_field"), Some(&json!("value")));
        assert_eq!(rules[1].matchers().fields().len(), 2);
    }

    #[test]
    fn accepts_json_documents() {
        let text = r#"{"routes": {"r": {"matchers": {"a": [true]}, "output": {"type": "analytics", "series": "s"}}}}"#;
        let rules = ConfigLoader::parse_with_env(text, "json", &no_env).unwrap();
        assert_eq!(rules.len(), 1);
    }

    #[test]
    fn empty_routes_yield_no_rules() {
        let rules = ConfigLoader::parse_with_env("routes: {}\n", "t", &no_env).unwrap();
        assert!(rules.is_empty());
    }

    #[test]
    fn syntax_error_reports_source() {
        let err = ConfigLoader::parse_with_env("routes: [unclosed", "cfg.yml", &no_env).unwrap_err();
        match err {
            RouterError::ConfigParse { source_name, .. } => assert_eq!(source_name, "cfg.yml"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn schema_error_is_returned_before_env_check() {
        let text = r#"
routes:
  bad:
    matchers:
      title: ["x", "x"]
    output:
      type: "analytics"
      series: "${NOPE}"
"#;
        let err = ConfigLoader::parse_with_env(text, "t", &no_env).unwrap_err();
        assert!(matches!(err, RouterError::ConfigValidation { .. }));
    }

    #[test]
    fn missing_env_names_are_merged_across_rules() {
        let text = r#"
routes:
  a:
    matchers: {}
    output:
      type: "analytics"
      series: "${ONE}.${TWO}"
  b:
    matchers: {}
    output:
      type: "metrics"
      series: "${TWO}"
      dimensions: ["${THREE}"]
"#;
        let err = ConfigLoader::parse_with_env(text, "t", &no_env).unwrap_err();
        match err {
            RouterError::MissingEnvironment { names } => {
                assert_eq!(names, vec!["ONE", "TWO", "THREE"]);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn empty_env_value_cannot_blank_a_required_field() {
        let text = r#"
routes:
  r:
    matchers: {}
    output:
      type: "metrics"
      series: "${EMPTY}"
      dimensions: ["${EMPTY}"]
"#;
        let err = ConfigLoader::parse_with_env(text, "t", &env_of(&[("EMPTY", "")])).unwrap_err();
        match err {
            RouterError::ConfigValidation { errors } => {
                assert_eq!(errors.len(), 2);
                assert!(errors[0].starts_with("r.output.series"));
                assert!(errors[1].starts_with("r.output.dimensions"));
            }
            other => panic!("unexpected error: {other}"),
        }

        let rules =
            ConfigLoader::parse_with_env(text, "t", &env_of(&[("EMPTY", "x")])).unwrap();
        assert_eq!(rules[0].output().get("series"), Some(&json!("x")));
    }

    #[test]
    fn blocking_file_load_reports_missing_file() {
        let err = ConfigLoader::load_file_blocking("/nonexistent/kvconfig.yml").unwrap_err();
        assert!(matches!(err, RouterError::ConfigLoad { .. }));
    }

    #[tokio::test]
    async fn async_file_load_reads_rules() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("kvconfig.yml");
        tokio::fs::write(
            &path,
            "routes:\n  r:\n    matchers: {}\n    output:\n      type: analytics\n      series: s\n",
        )
        .await
        .unwrap();

        let rules = ConfigLoader::load_file(&path).await.unwrap();
        assert_eq!(rules.len(), 1);
        assert_eq!(rules[0].name(), "r");
    }

    #[tokio::test]
    async fn async_file_load_rejects_missing_file() {
        let err = ConfigLoader::load_file("/nonexistent/kvconfig.yml").await.unwrap_err();
        assert!(err.to_string().contains("/nonexistent/kvconfig.yml"));
    }
}
