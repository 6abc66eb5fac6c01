//! kayvee 로그 라우터
//!
//! 구조화 로그 레코드를 선언적 규칙(kvconfig.yml)으로 평가하여,
//! 매칭된 규칙마다 하위 시스템(메트릭, 알림, 분석, 알림 채널)용 출력을 만듭니다.
//!
//! # 모듈 구성
//!
//! - [`field`]: 점 표기 필드 경로 해석
//! - [`rule`]: 매처, 출력 템플릿, 규칙
//! - [`schema`]: 설정 문서 스키마 검증
//! - [`loader`]: YAML/JSON 설정 텍스트 및 파일 로딩
//! - [`router`]: 규칙 목록 원자적 교체 및 레코드 평가
//! - [`sink`]: 방출된 출력 관찰 (테스트용 수집기)
//! - [`global`]: 프로세스 전역 기본 라우터
//! - [`logger`]: 라우팅 메타데이터를 붙이는 구조화 로거
//! - [`error`]: 도메인 에러 타입
//!
//! # 아키텍처
//!
//! ```text
//! kvconfig.yml -> ConfigLoader -> ConfigValidator -> Vec<Rule> -> Router (ArcSwap)
//!                                                                     |
//! Logger -> Record ----------------------------------------------> route() -> RoutingResult
//! ```

pub mod error;
pub mod field;
pub mod global;
pub mod loader;
pub mod logger;
pub mod router;
pub mod rule;
pub mod schema;
pub mod sink;

// --- 주요 타입 re-export ---

// 에러
pub use error::RouterError;

// 라우터
pub use router::Router;

// 로딩 및 검증
pub use loader::{ConfigLoader, MAX_CONFIG_FILE_SIZE, parse_config};
pub use schema::ConfigValidator;

// 규칙
pub use rule::{FieldTemplate, KEY_NOT_FOUND, MatchValue, MatcherSpec, OutputKind, Rule};

// 기본 라우터
pub use global::{clear_default_router, default_router, set_default_router, set_global_routing};

// 관찰자
pub use sink::{CaptureSink, RouteSink};

// 로거
pub use logger::{BufferWriter, KV_META_KEY, LogWriter, Logger, StderrWriter};

// 공용 타입
pub use kayvee_core::types::{Level, Record, RoutingResult};
