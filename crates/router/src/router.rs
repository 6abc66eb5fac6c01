//! 라우터 -- 현재 규칙 목록으로 레코드를 평가합니다.
//!
//! 규칙 목록은 [`ArcSwap`]으로 보관됩니다. `route()`는 잠금 없이 현재 스냅샷을
//! 읽고, 설정 로딩은 새 목록을 완성한 뒤 한 번에 교체합니다.
//! 따라서 동시에 실행 중인 `route()`는 이전 목록 또는 새 목록 중 하나만 봅니다.
//! 로딩이 실패하면 기존 목록이 그대로 유지됩니다.

use std::fmt;
use std::path::Path;
use std::sync::Arc;

use arc_swap::ArcSwap;

use kayvee_core::config::ServiceIdentity;
use kayvee_core::metrics as m;
use kayvee_core::types::{Record, RoutingResult};

use crate::error::RouterError;
use crate::loader::{ConfigLoader, STRING_SOURCE};
use crate::rule::Rule;
use crate::sink::RouteSink;

/// 로그 라우터
///
/// # 사용 예시
/// ```ignore
/// let router = Router::new();
/// router.load_config("kvconfig.yml")?;
/// let result = router.route(&record);
/// for output in &result.routes {
///     println!("{}", output["rule"]);
/// }
/// ```
pub struct Router {
    rules: ArcSwap<Vec<Rule>>,
    identity: ServiceIdentity,
    sink: Option<Arc<dyn RouteSink>>,
}

impl Router {
    /// 규칙이 없는 라우터를 생성합니다.
    ///
    /// 팀/앱 이름은 `_TEAM_OWNER`, `_APP_NAME` 환경변수에서 한 번 읽습니다.
    pub fn new() -> Self {
        Self::with_identity(ServiceIdentity::from_env())
    }

    /// 주어진 팀/앱 이름으로 규칙이 없는 라우터를 생성합니다.
    pub fn with_identity(identity: ServiceIdentity) -> Self {
        Self {
            rules: ArcSwap::from_pointee(Vec::new()),
            identity,
            sink: None,
        }
    }

    /// 규칙 목록을 설정합니다 (빌더).
    pub fn with_rules(self, rules: Vec<Rule>) -> Self {
        self.install(rules, "<rules>");
        self
    }

    /// 출력 관찰자를 연결합니다 (빌더).
    pub fn with_sink(mut self, sink: Arc<dyn RouteSink>) -> Self {
        self.sink = Some(sink);
        self
    }

    /// 라우팅 결과에 기록되는 팀/앱 이름
    pub fn identity(&self) -> &ServiceIdentity {
        &self.identity
    }

    /// 설정 텍스트(YAML 또는 JSON)를 로드하여 규칙 목록을 교체합니다.
    ///
    /// # Errors
    /// 파싱, 스키마 검증, 환경변수 치환 중 하나라도 실패하면 에러를 반환하며
    /// 기존 규칙 목록은 변경되지 않습니다.
    pub fn load_config_str(&self, text: &str) -> Result<(), RouterError> {
        self.finish_load(ConfigLoader::parse(text, STRING_SOURCE), STRING_SOURCE)
    }

    /// 설정 파일을 동기적으로 읽어 규칙 목록을 교체합니다.
    pub fn load_config(&self, path: impl AsRef<Path>) -> Result<(), RouterError> {
        let path = path.as_ref();
        let source = path.display().to_string();
        self.finish_load(ConfigLoader::load_file_blocking(path), &source)
    }

    /// 설정 파일을 비동기로 읽어 규칙 목록을 교체합니다.
    pub async fn load_config_file(&self, path: impl AsRef<Path>) -> Result<(), RouterError> {
        let path = path.as_ref();
        let source = path.display().to_string();
        let result = ConfigLoader::load_file(path).await;
        self.finish_load(result, &source)
    }

    /// 현재 규칙 목록 스냅샷
    pub fn rules(&self) -> Arc<Vec<Rule>> {
        self.rules.load_full()
    }

    /// 현재 규칙 수
    pub fn rule_count(&self) -> usize {
        self.rules.load().len()
    }

    /// 레코드를 모든 규칙으로 평가하여 매칭된 출력을 규칙 순서대로 반환합니다.
    ///
    /// 실패하지 않으며, 레코드를 변경하지 않습니다.
    pub fn route(&self, record: &Record) -> RoutingResult {
        let rules = self.rules.load();

        let mut routes = Vec::new();
        for rule in rules.iter().filter(|rule| rule.matches(record)) {
            let output = rule.output_for(record);
            tracing::trace!(rule = rule.name(), "record matched");
            if let Some(sink) = &self.sink {
                sink.record_route(rule.name(), &output);
            }
            routes.push(output);
        }

        metrics::counter!(m::ROUTER_RECORDS_ROUTED_TOTAL).increment(1);
        if !routes.is_empty() {
            metrics::counter!(m::ROUTER_ROUTES_EMITTED_TOTAL).increment(routes.len() as u64);
        }

        RoutingResult::new(
            self.identity.team.clone(),
            self.identity.app.clone(),
            routes,
        )
    }

    fn finish_load(
        &self,
        result: Result<Vec<Rule>, RouterError>,
        source: &str,
    ) -> Result<(), RouterError> {
        match result {
            Ok(rules) => {
                metrics::counter!(m::ROUTER_CONFIG_LOADS_TOTAL, m::LABEL_RESULT => "success")
                    .increment(1);
                self.install(rules, source);
                Ok(())
            }
            Err(e) => {
                metrics::counter!(m::ROUTER_CONFIG_LOADS_TOTAL, m::LABEL_RESULT => "failure")
                    .increment(1);
                let errors = match &e {
                    RouterError::ConfigValidation { errors } => errors.len(),
                    RouterError::MissingEnvironment { names } => names.len(),
                    _ => 1,
                };
                tracing::warn!(source, errors, error = %e, "routing config rejected");
                Err(e)
            }
        }
    }

    fn install(&self, rules: Vec<Rule>, source: &str) {
        let count = rules.len();
        self.rules.store(Arc::new(rules));
        metrics::gauge!(m::ROUTER_RULES_LOADED).set(count as f64);
        tracing::info!(source, rules = count, "routing rules loaded");
    }
}

impl Default for Router {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Router {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Router")
            .field("rules", &self.rule_count())
            .field("identity", &self.identity)
            .field("sink", &self.sink.is_some())
            .finish()
    }
}
