//! Command handlers -- one module per subcommand

pub mod route;
pub mod validate;

use std::path::{Path, PathBuf};

use kayvee_core::config::KayveeConfig;

/// Resolve the routing config path: explicit argument first, then `router.routes_path`.
pub(crate) fn routes_path(explicit: Option<PathBuf>, config: &KayveeConfig) -> PathBuf {
    explicit.unwrap_or_else(|| Path::new(&config.router.routes_path).to_path_buf())
}
