//! kayvee 공통 크레이트
//!
//! 라우터, 로거 façade, CLI가 공유하는 타입과 앰비언트 구성요소를 모읍니다.
//!
//! - [`types`]: 레코드, 라우팅 결과, 로그 레벨
//! - [`config`]: `kayvee.toml` 파싱 및 환경변수 오버라이드
//! - [`error`]: 최상위 에러 타입
//! - [`metrics`]: 메트릭 이름 상수

pub mod config;
pub mod error;
pub mod metrics;
pub mod types;

// --- 주요 타입 re-export ---

// 에러
pub use error::{ConfigError, KayveeError, RoutingError};

// 설정
pub use config::{KayveeConfig, ServiceIdentity};

// 도메인 타입
pub use types::{Level, Record, RoutingResult};
