//! 라우터 에러 타입
//!
//! [`RouterError`]는 설정 로딩과 규칙 생성 과정의 모든 실패를 표현합니다.
//! `route()`는 에러 채널이 없으므로 여기에 해당하는 variant가 없습니다.
//! `From<RouterError> for KayveeError` 변환으로 상위 레이어에서 `?` 전파가 가능합니다.

use kayvee_core::error::{KayveeError, RoutingError};

/// 라우터 도메인 에러
#[derive(Debug, thiserror::Error)]
pub enum RouterError {
    /// 설정 텍스트가 YAML/JSON 문서로 파싱되지 않음
    #[error("config parse error: {source_name}: {reason}")]
    ConfigParse {
        /// 설정 출처 (파일 경로 또는 `<string>`)
        source_name: String,
        /// 파서 에러 메시지
        reason: String,
    },

    /// 스키마 검증 실패 (규칙 이름이 앞에 붙은 메시지 모음)
    #[error("config validation failed ({} error(s)): {}", .errors.len(), .errors.join("; "))]
    ConfigValidation {
        /// 모든 규칙에서 수집된 위반 사항
        errors: Vec<String>,
    },

    /// 출력 템플릿이 참조하는 환경변수가 설정되지 않음
    #[error("missing env var(s): {}", .names.join(", "))]
    MissingEnvironment {
        /// 누락된 환경변수 이름 (처음 발견된 순서, 중복 없음)
        names: Vec<String>,
    },

    /// 매처 값 목록이 불변 조건을 위반함
    #[error("invalid matcher values in {rule}.{field}: {reason}")]
    InvalidMatcher {
        /// 규칙 이름
        rule: String,
        /// 필드 경로
        field: String,
        /// 위반 사유
        reason: String,
    },

    /// 설정 파일을 읽을 수 없음
    #[error("config load error: {path}: {reason}")]
    ConfigLoad {
        /// 파일 경로
        path: String,
        /// 실패 사유
        reason: String,
    },
}

impl From<RouterError> for KayveeError {
    fn from(err: RouterError) -> Self {
        KayveeError::Routing(RoutingError::LoadFailed(err.to_string()))
    }
}
