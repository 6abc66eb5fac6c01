//! 설정 관리 -- kayvee.toml 파싱 및 런타임 설정
//!
//! [`KayveeConfig`]는 라우터와 CLI가 사용하는 설정을 담는 최상위 구조체입니다.
//!
//! # 설정 로딩 우선순위
//! 1. CLI 인자 (최고 우선)
//! 2. 환경변수 (`KAYVEE_GENERAL_LOG_LEVEL=debug`, `_TEAM_OWNER=eng` 형식)
//! 3. 설정 파일 (`kayvee.toml`)
//! 4. 기본값 (`Default` 구현)
//!
//! # 사용 예시
//! ```no_run
//! # async fn example() -> Result<(), kayvee_core::error::KayveeError> {
//! use kayvee_core::config::KayveeConfig;
//!
//! // 파일에서 로드 + 환경변수 오버라이드
//! let config = KayveeConfig::load("kayvee.toml").await?;
//!
//! // TOML 문자열에서 직접 파싱
//! let config = KayveeConfig::parse("[general]\nlog_level = \"debug\"")?;
//! # Ok(())
//! # }
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, KayveeError};
use crate::types::UNSET;

/// 팀 소유자 환경변수
pub const ENV_TEAM_OWNER: &str = "_TEAM_OWNER";

/// 애플리케이션 이름 환경변수
pub const ENV_APP_NAME: &str = "_APP_NAME";

/// kayvee 통합 설정
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct KayveeConfig {
    /// 일반 설정
    #[serde(default)]
    pub general: GeneralConfig,
    /// 라우터 설정
    #[serde(default)]
    pub router: RouterConfig,
}

impl KayveeConfig {
    /// TOML 파일에서 설정을 로드하고 환경변수 오버라이드를 적용합니다.
    pub async fn load(path: impl AsRef<Path>) -> Result<Self, KayveeError> {
        let mut config = Self::from_file(path).await?;
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// TOML 파일에서 설정을 로드합니다 (환경변수 오버라이드 없음).
    pub async fn from_file(path: impl AsRef<Path>) -> Result<Self, KayveeError> {
        let path = path.as_ref();
        let content = tokio::fs::read_to_string(path).await.map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                KayveeError::Config(ConfigError::FileNotFound {
                    path: path.display().to_string(),
                })
            } else {
                KayveeError::Io(e)
            }
        })?;
        let config = Self::parse(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// TOML 문자열에서 설정을 파싱합니다.
    pub fn parse(toml_str: &str) -> Result<Self, KayveeError> {
        toml::from_str(toml_str).map_err(|e| {
            KayveeError::Config(ConfigError::ParseFailed {
                reason: e.to_string(),
            })
        })
    }

    /// 환경변수로 설정값을 오버라이드합니다.
    ///
    /// 팀/앱 정보는 배포 환경이 주입하는 `_TEAM_OWNER`, `_APP_NAME`을 따릅니다.
    pub fn apply_env_overrides(&mut self) {
        override_string(&mut self.general.log_level, "KAYVEE_GENERAL_LOG_LEVEL");
        override_string(&mut self.general.log_format, "KAYVEE_GENERAL_LOG_FORMAT");
        override_string(&mut self.router.routes_path, "KAYVEE_ROUTER_ROUTES_PATH");
        override_string(&mut self.router.team, ENV_TEAM_OWNER);
        override_string(&mut self.router.app, ENV_APP_NAME);
    }

    /// 설정값의 유효성을 검증합니다.
    pub fn validate(&self) -> Result<(), KayveeError> {
        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.general.log_level.as_str()) {
            return Err(ConfigError::InvalidValue {
                field: "general.log_level".to_owned(),
                reason: format!("must be one of: {}", valid_levels.join(", ")),
            }
            .into());
        }

        let valid_formats = ["json", "pretty"];
        if !valid_formats.contains(&self.general.log_format.as_str()) {
            return Err(ConfigError::InvalidValue {
                field: "general.log_format".to_owned(),
                reason: format!("must be one of: {}", valid_formats.join(", ")),
            }
            .into());
        }

        if self.router.routes_path.is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "router.routes_path".to_owned(),
                reason: "routes path must not be empty".to_owned(),
            }
            .into());
        }

        Ok(())
    }

    /// 라우팅 결과에 기록될 팀/앱 정보를 반환합니다.
    pub fn identity(&self) -> ServiceIdentity {
        ServiceIdentity {
            team: non_empty_or_unset(&self.router.team),
            app: non_empty_or_unset(&self.router.app),
        }
    }
}

/// 일반 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// 로그 레벨 (trace, debug, info, warn, error)
    pub log_level: String,
    /// 로그 형식 (json, pretty)
    pub log_format: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_owned(),
            log_format: "json".to_owned(),
        }
    }
}

/// 라우터 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RouterConfig {
    /// 라우팅 규칙 파일 경로 (YAML)
    pub routes_path: String,
    /// 소유 팀
    pub team: String,
    /// 애플리케이션 식별자
    pub app: String,
}

impl Default for RouterConfig {
    fn default() -> Self {
        Self {
            routes_path: "kvconfig.yml".to_owned(),
            team: UNSET.to_owned(),
            app: UNSET.to_owned(),
        }
    }
}

/// 프로세스 식별 정보 (팀, 앱)
///
/// 라우팅 결과의 `team`/`app` 필드를 채웁니다.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceIdentity {
    pub team: String,
    pub app: String,
}

impl ServiceIdentity {
    /// 팀/앱 이름으로 생성합니다.
    pub fn new(team: impl Into<String>, app: impl Into<String>) -> Self {
        Self {
            team: team.into(),
            app: app.into(),
        }
    }

    /// 환경변수에서 팀/앱 정보를 읽습니다. 없으면 `"UNSET"`을 사용합니다.
    pub fn from_env() -> Self {
        let read = |key: &str| {
            std::env::var(key)
                .ok()
                .filter(|v| !v.is_empty())
                .unwrap_or_else(|| UNSET.to_owned())
        };
        Self {
            team: read(ENV_TEAM_OWNER),
            app: read(ENV_APP_NAME),
        }
    }
}

impl Default for ServiceIdentity {
    fn default() -> Self {
        Self::new(UNSET, UNSET)
    }
}

fn non_empty_or_unset(value: &str) -> String {
    if value.is_empty() {
        UNSET.to_owned()
    } else {
        value.to_owned()
    }
}

// --- 환경변수 오버라이드 헬퍼 ---

fn override_string(target: &mut String, env_key: &str) {
    if let Ok(val) = std::env::var(env_key) {
        *target = val;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    fn default_config_has_sane_values() {
        let config = KayveeConfig::default();
        assert_eq!(config.general.log_level, "info");
        assert_eq!(config.general.log_format, "json");
        assert_eq!(config.router.routes_path, "kvconfig.yml");
        assert_eq!(config.router.team, "UNSET");
    }

    #[test]
    fn default_config_passes_validation() {
        KayveeConfig::default().validate().unwrap();
    }

    #[test]
    fn from_str_partial_toml_merges_with_defaults() {
        let toml = r#"
[general]
log_level = "debug"

[router]
team = "platform"
"#;
        let config = KayveeConfig::parse(toml).unwrap();
        assert_eq!(config.general.log_level, "debug");
        // log_format은 기본값 유지
        assert_eq!(config.general.log_format, "json");
        assert_eq!(config.router.team, "platform");
        assert_eq!(config.router.app, "UNSET");
    }

    #[test]
    fn from_str_invalid_toml_returns_error() {
        let err = KayveeConfig::parse("invalid = [[[toml").unwrap_err();
        assert!(matches!(
            err,
            KayveeError::Config(ConfigError::ParseFailed { .. })
        ));
    }

    #[test]
    fn validate_rejects_invalid_log_format() {
        let mut config = KayveeConfig::default();
        config.general.log_format = "xml".to_owned();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("log_format"));
    }

    #[test]
    fn validate_rejects_empty_routes_path() {
        let mut config = KayveeConfig::default();
        config.router.routes_path = String::new();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("routes_path"));
    }

    #[test]
    fn identity_falls_back_to_unset_for_empty_values() {
        let mut config = KayveeConfig::default();
        config.router.team = String::new();
        config.router.app = "billing".to_owned();
        assert_eq!(config.identity(), ServiceIdentity::new("UNSET", "billing"));
    }

    #[test]
    #[serial]
    fn env_overrides_team_and_app() {
        // SAFETY: serial 테스트에서만 환경변수를 조작합니다.
        unsafe {
            std::env::set_var(ENV_TEAM_OWNER, "eng-infra");
            std::env::set_var(ENV_APP_NAME, "gateway");
        }
        let mut config = KayveeConfig::default();
        config.apply_env_overrides();
        assert_eq!(config.router.team, "eng-infra");
        assert_eq!(config.router.app, "gateway");
        assert_eq!(
            ServiceIdentity::from_env(),
            ServiceIdentity::new("eng-infra", "gateway")
        );
        unsafe {
            std::env::remove_var(ENV_TEAM_OWNER);
            std::env::remove_var(ENV_APP_NAME);
        }
    }

    #[test]
    #[serial]
    fn identity_from_env_without_vars_is_unset() {
        // SAFETY: serial 테스트에서만 환경변수를 조작합니다.
        unsafe {
            std::env::remove_var(ENV_TEAM_OWNER);
            std::env::remove_var(ENV_APP_NAME);
        }
        assert_eq!(ServiceIdentity::from_env(), ServiceIdentity::default());
    }

    #[tokio::test]
    async fn from_file_not_found() {
        let err = KayveeConfig::from_file("/nonexistent/path/kayvee.toml")
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            KayveeError::Config(ConfigError::FileNotFound { .. })
        ));
    }
}
