//! 도메인 타입 -- 라우터와 로거가 공유하는 공통 타입
//!
//! 레코드는 `serde_json::Value`의 태그드 유니온(Null, Bool, Number, String,
//! Array, Object)을 그대로 사용합니다.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// 로그 레코드
///
/// 로거 façade가 로그 호출마다 생성하는 키/값 매핑입니다.
/// 라우터에 전달된 이후에는 변경되지 않습니다.
pub type Record = Map<String, Value>;

/// 라우팅 메타데이터에 기록되는 구현 언어 식별자
pub const KV_LANGUAGE: &str = "rust";

/// 라우팅 메타데이터에 기록되는 라이브러리 버전
pub const KV_VERSION: &str = env!("CARGO_PKG_VERSION");

/// 팀/앱 정보가 설정되지 않았을 때 사용하는 값
pub const UNSET: &str = "UNSET";

/// 라우팅 결과
///
/// `route()` 호출마다 새로 생성되며, 호출자가 소유합니다.
/// 로거 façade는 이 값을 `_kvmeta` 키로 레코드에 붙입니다.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoutingResult {
    /// 소유 팀
    pub team: String,
    /// 애플리케이션 식별자
    pub app: String,
    /// 라이브러리 버전
    pub kv_version: String,
    /// 구현 언어
    pub kv_language: String,
    /// 매칭된 규칙의 렌더링된 출력 (설정 순서 유지)
    pub routes: Vec<Record>,
}

impl RoutingResult {
    /// 팀/앱 정보와 렌더링된 출력 목록으로 결과를 생성합니다.
    pub fn new(team: impl Into<String>, app: impl Into<String>, routes: Vec<Record>) -> Self {
        Self {
            team: team.into(),
            app: app.into(),
            kv_version: KV_VERSION.to_owned(),
            kv_language: KV_LANGUAGE.to_owned(),
            routes,
        }
    }

    /// 매칭된 출력이 없는지 확인합니다.
    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }
}

/// 로그 레벨
///
/// 심각도 순서대로 정렬됩니다 (Trace < ... < Critical).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Level {
    Trace,
    Debug,
    Info,
    Warning,
    Error,
    Critical,
}

impl Level {
    /// 레코드에 기록되는 소문자 이름
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Trace => "trace",
            Self::Debug => "debug",
            Self::Info => "info",
            Self::Warning => "warning",
            Self::Error => "error",
            Self::Critical => "critical",
        }
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Level {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "trace" => Ok(Self::Trace),
            "debug" => Ok(Self::Debug),
            "info" => Ok(Self::Info),
            "warning" | "warn" => Ok(Self::Warning),
            "error" => Ok(Self::Error),
            "critical" => Ok(Self::Critical),
            other => Err(format!("unknown log level: {other}")),
        }
    }
}
