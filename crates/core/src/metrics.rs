//! 메트릭 상수 및 설명 등록
//!
//! 라우터가 기록하는 메트릭의 이름과 설명을 중앙에서 정의합니다.
//! 라이브러리는 `metrics` facade로만 기록하며 exporter는 설치하지 않습니다.
//!
//! # 네이밍 컨벤션
//!
//! - 접두어: `kayvee_router_`
//! - 접미어: `_total` (counter), 없음 (gauge)
//!
//! # 사용 예시
//!
//! ```ignore
//! metrics::counter!(kayvee_core::metrics::ROUTER_RECORDS_ROUTED_TOTAL).increment(1);
//! ```

// ─── 레이블 키 상수 ────────────────────────────────────────────────

/// 결과 레이블 키 (success, failure)
pub const LABEL_RESULT: &str = "result";

// ─── Router 메트릭 ─────────────────────────────────────────────────

/// Router: `route()`로 평가된 레코드 수 (counter)
pub const ROUTER_RECORDS_ROUTED_TOTAL: &str = "kayvee_router_records_routed_total";

/// Router: 매칭되어 생성된 출력 수 (counter)
pub const ROUTER_ROUTES_EMITTED_TOTAL: &str = "kayvee_router_routes_emitted_total";

/// Router: 설정 로딩 시도 수 (counter, label: result)
pub const ROUTER_CONFIG_LOADS_TOTAL: &str = "kayvee_router_config_loads_total";

/// Router: 현재 적용된 규칙 수 (gauge)
pub const ROUTER_RULES_LOADED: &str = "kayvee_router_rules_loaded";

/// 모든 메트릭의 설명을 등록합니다.
///
/// recorder 설치 직후 한 번 호출합니다.
pub fn describe_all() {
    use metrics::{describe_counter, describe_gauge};

    describe_counter!(
        ROUTER_RECORDS_ROUTED_TOTAL,
        "Total number of log records evaluated by the router"
    );
    describe_counter!(
        ROUTER_ROUTES_EMITTED_TOTAL,
        "Total number of rendered rule outputs attached to records"
    );
    describe_counter!(
        ROUTER_CONFIG_LOADS_TOTAL,
        "Routing configuration load attempts by result"
    );
    describe_gauge!(
        ROUTER_RULES_LOADED,
        "Number of routing rules currently installed"
    );
}
