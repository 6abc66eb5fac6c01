//! 에러 타입 -- 도메인별 에러 정의

/// kayvee 최상위 에러 타입
#[derive(Debug, thiserror::Error)]
pub enum KayveeError {
    /// 설정 관련 에러
    #[error("config error: {0}")]
    Config(#[from] ConfigError),

    /// 라우팅 설정 로딩 에러
    #[error("routing error: {0}")]
    Routing(#[from] RoutingError),

    /// I/O 에러
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// 설정 관련 에러
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// 설정 파일을 찾을 수 없음
    #[error("config file not found: {path}")]
    FileNotFound { path: String },

    /// 설정 파싱 실패
    #[error("failed to parse config: {reason}")]
    ParseFailed { reason: String },

    /// 유효하지 않은 설정 값
    #[error("invalid config value for '{field}': {reason}")]
    InvalidValue { field: String, reason: String },
}

/// 라우팅 규칙 로딩 에러
///
/// 라우터 크레이트의 상세 에러를 상위 레이어로 전달할 때 사용합니다.
#[derive(Debug, thiserror::Error)]
pub enum RoutingError {
    /// 라우팅 설정 로딩 실패 (파싱, 스키마, 환경변수)
    #[error("failed to load routing config: {0}")]
    LoadFailed(String),
}
