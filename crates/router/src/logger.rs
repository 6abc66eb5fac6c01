//! 로거 -- 구조화 로그 레코드를 만들고 라우팅 메타데이터를 붙입니다.
//!
//! 레코드 조립 순서: `level` → 전역 필드 → 메타데이터(`title`, `value`, `type`) → 사용자 데이터.
//! 같은 키가 있으면 나중 단계가 이깁니다.
//! 명시적 라우터가 있으면 그 라우터로, 없으면 기본 라우터로 레코드를 평가하여
//! 결과를 `_kvmeta` 키에 기록합니다. 둘 다 없으면 `_kvmeta`를 붙이지 않습니다.

use std::sync::{Arc, Mutex};

use serde_json::Value;

use kayvee_core::config::ENV_TEAM_OWNER;
use kayvee_core::types::{Level, Record};

use crate::global;
use crate::router::Router;

/// 라우팅 결과가 기록되는 키
pub const KV_META_KEY: &str = "_kvmeta";

/// 최소 로그 레벨 환경변수
pub const ENV_LOG_LEVEL: &str = "KAYVEE_LOG_LEVEL";

/// 환경변수에서 읽는 전역 필드 (필드 이름, 환경변수)
const ENV_GLOBALS: [(&str, &str); 7] = [
    ("team", ENV_TEAM_OWNER),
    ("deploy_env", "_DEPLOY_ENV"),
    ("wf_id", "_EXECUTION_NAME"),
    ("pod-id", "_POD_ID"),
    ("pod-shortname", "_POD_SHORTNAME"),
    ("pod-region", "_POD_REGION"),
    ("pod-account", "_POD_ACCOUNT"),
];

/// 직렬화된 로그 한 줄을 받는 출력 대상
pub trait LogWriter: Send + Sync {
    /// JSON 한 줄을 기록합니다 (개행 문자 미포함).
    fn write_line(&self, line: &str);
}

/// 표준 에러로 기록하는 기본 출력 대상
#[derive(Debug, Default, Clone, Copy)]
pub struct StderrWriter;

impl LogWriter for StderrWriter {
    fn write_line(&self, line: &str) {
        eprintln!("{line}");
    }
}

/// 메모리에 줄을 모으는 출력 대상
#[derive(Debug, Default)]
pub struct BufferWriter {
    lines: Mutex<Vec<String>>,
}

impl BufferWriter {
    pub fn new() -> Self {
        Self::default()
    }

    /// 지금까지 기록된 줄
    pub fn lines(&self) -> Vec<String> {
        self.lines
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }
}

impl LogWriter for BufferWriter {
    fn write_line(&self, line: &str) {
        self.lines
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(line.to_owned());
    }
}

/// 구조화 로거
///
/// # 사용 예시
/// ```ignore
/// let logger = Logger::new("billing-worker");
/// logger.info_d("invoice-sent", data);
/// logger.counter_d("invoices", 1, Record::new());
/// ```
pub struct Logger {
    min_level: Level,
    globals: Record,
    router: Option<Arc<Router>>,
    writer: Arc<dyn LogWriter>,
}

impl Logger {
    /// `source` 이름으로 로거를 생성합니다.
    ///
    /// 최소 레벨은 `KAYVEE_LOG_LEVEL`에서 읽으며, 없거나 알 수 없는 값이면 `debug`입니다.
    /// 전역 필드는 배포 환경변수 중 설정된 것만 포함합니다.
    pub fn new(source: impl Into<String>) -> Self {
        let min_level = std::env::var(ENV_LOG_LEVEL)
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(Level::Debug);

        let mut globals = Record::new();
        globals.insert("source".to_owned(), Value::String(source.into()));
        for (field, env_key) in ENV_GLOBALS {
            if let Some(value) = std::env::var(env_key).ok().filter(|v| !v.is_empty()) {
                globals.insert(field.to_owned(), Value::String(value));
            }
        }

        Self {
            min_level,
            globals,
            router: None,
            writer: Arc::new(StderrWriter),
        }
    }

    /// 최소 레벨을 설정합니다 (빌더).
    pub fn with_level(mut self, level: Level) -> Self {
        self.min_level = level;
        self
    }

    /// 기본 라우터 대신 사용할 라우터를 설정합니다 (빌더).
    pub fn with_router(mut self, router: Arc<Router>) -> Self {
        self.router = Some(router);
        self
    }

    /// 출력 대상을 설정합니다 (빌더).
    pub fn with_writer(mut self, writer: Arc<dyn LogWriter>) -> Self {
        self.writer = writer;
        self
    }

    /// 모든 레코드에 붙는 전역 필드를 추가합니다 (빌더).
    pub fn with_global(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.globals.insert(key.into(), value.into());
        self
    }

    pub fn level(&self) -> Level {
        self.min_level
    }

    pub fn set_level(&mut self, level: Level) {
        self.min_level = level;
    }

    /// 전역 필드
    pub fn globals(&self) -> &Record {
        &self.globals
    }

    pub fn trace_d(&self, title: &str, data: Record) {
        self.log_with_level(Level::Trace, title_meta(title), data);
    }

    pub fn debug_d(&self, title: &str, data: Record) {
        self.log_with_level(Level::Debug, title_meta(title), data);
    }

    pub fn info_d(&self, title: &str, data: Record) {
        self.log_with_level(Level::Info, title_meta(title), data);
    }

    pub fn warn_d(&self, title: &str, data: Record) {
        self.log_with_level(Level::Warning, title_meta(title), data);
    }

    pub fn error_d(&self, title: &str, data: Record) {
        self.log_with_level(Level::Error, title_meta(title), data);
    }

    pub fn critical_d(&self, title: &str, data: Record) {
        self.log_with_level(Level::Critical, title_meta(title), data);
    }

    /// 카운터 메트릭 레코드를 `info` 레벨로 기록합니다.
    pub fn counter_d(&self, title: &str, value: i64, data: Record) {
        self.log_with_level(Level::Info, metric_meta(title, value.into(), "counter"), data);
    }

    /// 게이지 메트릭 레코드를 `info` 레벨로 기록합니다.
    pub fn gauge_d(&self, title: &str, value: f64, data: Record) {
        self.log_with_level(Level::Info, metric_meta(title, value.into(), "gauge"), data);
    }

    fn log_with_level(&self, level: Level, meta: Record, data: Record) {
        if level < self.min_level {
            return;
        }

        let mut record = self.assemble(level, meta, data);

        if let Some(router) = self.router.clone().or_else(global::default_router) {
            let result = router.route(&record);
            match serde_json::to_value(&result) {
                Ok(meta) => {
                    record.insert(KV_META_KEY.to_owned(), meta);
                }
                Err(e) => tracing::warn!(error = %e, "failed to encode routing metadata"),
            }
        }

        match serde_json::to_string(&record) {
            Ok(line) => self.writer.write_line(&line),
            Err(e) => tracing::warn!(error = %e, "failed to encode log record"),
        }
    }

    fn assemble(&self, level: Level, meta: Record, data: Record) -> Record {
        let mut record = Record::with_capacity(1 + self.globals.len() + meta.len() + data.len());
        record.insert("level".to_owned(), Value::String(level.as_str().to_owned()));
        for (key, value) in self.globals.iter().chain(&meta) {
            record.insert(key.clone(), value.clone());
        }
        record.extend(data);
        record
    }
}

fn title_meta(title: &str) -> Record {
    let mut meta = Record::new();
    meta.insert("title".to_owned(), Value::String(title.to_owned()));
    meta
}

fn metric_meta(title: &str, value: Value, kind: &str) -> Record {
    let mut meta = title_meta(title);
    meta.insert("value".to_owned(), value);
    meta.insert("type".to_owned(), Value::String(kind.to_owned()));
    meta
}
