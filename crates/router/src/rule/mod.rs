//! 라우팅 규칙 -- 필드 매처와 출력 템플릿의 조합
//!
//! # 규칙 형식 (kvconfig.yml)
//! ```yaml
//! routes:
//!   login-alerts:
//!     matchers:
//!       title: ["login-failed"]
//!       user.role: ["admin"]
//!     output:
//!       type: "alerts"
//!       series: "auth.${DEPLOY_ENV}.login-failed"
//!       dimensions: ["%{user.id}"]
//!       stat_type: "counter"
//! ```
//!
//! # 아키텍처
//! - [`Rule`]: 이름, 컴파일된 매처, 출력 템플릿을 보관하는 불변 객체
//! - [`matcher`]: 필드별 허용 값 검증 및 매칭
//! - [`template`]: 환경변수/필드 토큰 치환
//! - [`types`]: 매처 값과 출력 종류

pub mod matcher;
pub mod template;
pub mod types;

pub use matcher::{FieldMatcher, MatcherSpec};
pub use template::{FieldTemplate, KEY_NOT_FOUND};
pub use types::{MatchValue, OutputKind, WILDCARD};

use serde_json::Value;

use kayvee_core::types::Record;

use crate::error::RouterError;
use template::CompiledOutput;

/// 출력에 항상 기록되는 규칙 이름 키
pub const RULE_KEY: &str = "rule";

/// 출력 종류를 지정하는 키
pub const TYPE_KEY: &str = "type";

/// 수치 시계열 출력의 값 필드 키
pub const VALUE_FIELD_KEY: &str = "value_field";

/// `value_field`가 없을 때 사용하는 기본값
pub const DEFAULT_VALUE_FIELD: &str = "value";

/// 라우팅 규칙
///
/// 설정 로딩 시 한 번 생성되며 이후 변경되지 않습니다.
///
/// # 사용 예시
/// ```ignore
/// let rule = Rule::new(
///     "rule-one",
///     MatcherSpec::new().field("title", ["hello", "hi"]),
///     output,
/// )?;
/// if rule.matches(&record) {
///     let rendered = rule.output_for(&record);
/// }
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Rule {
    name: String,
    spec: MatcherSpec,
    matchers: Vec<FieldMatcher>,
    output: Record,
    compiled: CompiledOutput,
}

impl Rule {
    /// 프로세스 환경변수로 `${VAR}` 토큰을 치환하여 규칙을 생성합니다.
    ///
    /// # Errors
    /// - 참조한 환경변수가 하나라도 없으면 [`RouterError::MissingEnvironment`]
    /// - 매처 값 목록이 불변 조건을 위반하면 [`RouterError::InvalidMatcher`]
    pub fn new(
        name: impl Into<String>,
        matchers: MatcherSpec,
        output: Record,
    ) -> Result<Self, RouterError> {
        Self::with_env(name, matchers, output, &|key: &str| std::env::var(key).ok())
    }

    /// 주어진 조회 함수로 환경변수를 치환하여 규칙을 생성합니다.
    pub fn with_env<F>(
        name: impl Into<String>,
        matchers: MatcherSpec,
        output: Record,
        lookup: &F,
    ) -> Result<Self, RouterError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let name = name.into();

        let mut output = template::substitute_env_output(&output, lookup)
            .map_err(|names| RouterError::MissingEnvironment { names })?;

        let compiled_matchers = matchers.compile(&name)?;

        let kind = output
            .get(TYPE_KEY)
            .and_then(Value::as_str)
            .and_then(|t| t.parse::<OutputKind>().ok());
        if kind.is_some_and(|k| k.is_numeric_series()) && !output.contains_key(VALUE_FIELD_KEY) {
            output.insert(
                VALUE_FIELD_KEY.to_owned(),
                Value::String(DEFAULT_VALUE_FIELD.to_owned()),
            );
        }

        output.insert(RULE_KEY.to_owned(), Value::String(name.clone()));

        let compiled = CompiledOutput::compile(&output);

        Ok(Self {
            name,
            spec: matchers,
            matchers: compiled_matchers,
            output,
            compiled,
        })
    }

    /// 규칙 이름
    pub fn name(&self) -> &str {
        &self.name
    }

    /// 선언된 매처 조건
    pub fn matchers(&self) -> &MatcherSpec {
        &self.spec
    }

    /// 환경변수 치환이 끝난 출력 템플릿 (`rule` 키 포함)
    pub fn output(&self) -> &Record {
        &self.output
    }

    /// 출력 종류 (`type` 키가 없거나 알 수 없는 값이면 `None`)
    pub fn kind(&self) -> Option<OutputKind> {
        self.output
            .get(TYPE_KEY)
            .and_then(Value::as_str)
            .and_then(|t| t.parse().ok())
    }

    /// 레코드가 모든 필드 조건을 만족하는지 평가합니다.
    ///
    /// 조건이 없는 규칙은 모든 레코드에 매칭됩니다.
    pub fn matches(&self, record: &Record) -> bool {
        self.matchers.iter().all(|m| m.matches(record))
    }

    /// 레코드 필드로 `%{field}` 토큰을 치환한 출력을 만듭니다.
    pub fn output_for(&self, record: &Record) -> Record {
        self.compiled.render(record)
    }
}
