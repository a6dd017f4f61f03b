//! 应用状态定义

use rule_engine::{RuleExecutor, RuleStore};
use std::sync::Arc;

/// Axum 应用共享状态
///
/// 规则存储本身是可克隆的共享句柄，执行器通过 Arc 在 handler 间共享。
#[derive(Clone, Default)]
pub struct AppState {
    pub store: RuleStore,
    pub executor: Arc<RuleExecutor>,
}

impl AppState {
    /// 创建新的应用状态
    pub fn new(store: RuleStore) -> Self {
        Self {
            store,
            executor: Arc::new(RuleExecutor::new()),
        }
    }
}
