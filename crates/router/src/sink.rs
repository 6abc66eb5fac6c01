//! 라우트 수집기
//!
//! [`RouteSink`]는 라우터가 방출한 출력을 관찰하는 확장 지점입니다.
//! 테스트에서는 [`CaptureSink`]를 라우터에 연결하여 규칙별로 어떤 출력이
//! 만들어졌는지 확인할 수 있습니다.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use kayvee_core::types::Record;

/// 라우터 출력 관찰자
///
/// `route()` 경로에서 동기적으로 호출되므로 구현은 짧게 끝나야 합니다.
pub trait RouteSink: Send + Sync {
    /// 규칙 하나가 매칭되어 출력이 만들어질 때마다 호출됩니다.
    fn record_route(&self, rule: &str, output: &Record);
}

/// 방출된 출력을 규칙 이름별로 모으는 수집기
#[derive(Debug, Default)]
pub struct CaptureSink {
    routes: Mutex<HashMap<String, Vec<Record>>>,
}

impl CaptureSink {
    /// 빈 수집기를 생성합니다.
    pub fn new() -> Self {
        Self::default()
    }

    /// 특정 규칙이 만든 출력 목록 (방출 순서)
    pub fn matches_for(&self, rule: &str) -> Vec<Record> {
        self.lock().get(rule).cloned().unwrap_or_default()
    }

    /// 수집된 전체 출력 수
    pub fn len(&self) -> usize {
        self.lock().values().map(Vec::len).sum()
    }

    /// 수집된 출력이 없는지 확인합니다.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// 수집된 출력을 모두 꺼내고 수집기를 비웁니다.
    pub fn take(&self) -> HashMap<String, Vec<Record>> {
        std::mem::take(&mut *self.lock())
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, Vec<Record>>> {
        // 다른 스레드의 패닉 후에도 수집된 데이터는 유효함
        self.routes.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl RouteSink for CaptureSink {
    fn record_route(&self, rule: &str, output: &Record) {
        self.lock()
            .entry(rule.to_owned())
            .or_default()
            .push(output.clone());
    }
}
