//! 프로세스 전역 기본 라우터
//!
//! 명시적 라우터가 없는 로거는 여기에 설치된 라우터를 사용합니다.
//! 설치/교체/해제는 원자적이며, 교체 직후 시작된 라우팅은 새 라우터를 봅니다.

use std::path::Path;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::error::RouterError;
use crate::router::Router;

static DEFAULT_ROUTER: RwLock<Option<Arc<Router>>> = RwLock::new(None);

fn read() -> RwLockReadGuard<'static, Option<Arc<Router>>> {
    DEFAULT_ROUTER
        .read()
        .unwrap_or_else(|poisoned| poisoned.into_inner())
}

fn write() -> RwLockWriteGuard<'static, Option<Arc<Router>>> {
    DEFAULT_ROUTER
        .write()
        .unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// 기본 라우터를 설치하고 이전 라우터를 반환합니다.
pub fn set_default_router(router: Arc<Router>) -> Option<Arc<Router>> {
    write().replace(router)
}

/// 현재 기본 라우터
pub fn default_router() -> Option<Arc<Router>> {
    read().clone()
}

/// 기본 라우터를 해제하고 이전 라우터를 반환합니다.
pub fn clear_default_router() -> Option<Arc<Router>> {
    write().take()
}

/// 설정 파일을 새 라우터로 로드하여 기본 라우터로 설치합니다.
///
/// 로딩이 실패하면 기존 기본 라우터는 그대로 유지됩니다.
pub fn set_global_routing(path: impl AsRef<Path>) -> Result<Arc<Router>, RouterError> {
    let router = Router::new();
    router.load_config(path)?;
    let router = Arc::new(router);
    set_default_router(Arc::clone(&router));
    Ok(router)
}
