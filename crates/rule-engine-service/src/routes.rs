//! 路由配置模块

use axum::{
    Router, middleware,
    routing::{get, post},
};
use rule_shared::observability::middleware as obs_middleware;

use crate::{handlers, state::AppState};

/// 构建规则相关的路由
pub fn rule_routes() -> Router<AppState> {
    Router::new()
        .route("/create_rule", post(handlers::rule::create_rule))
        .route("/update_rule", post(handlers::rule::update_rule))
        .route("/combine_rules", post(handlers::rule::combine_rules))
        .route("/evaluate_rule", post(handlers::rule::evaluate_rule))
        .route("/rules", get(handlers::rule::list_rules))
}

/// 构建完整应用路由
///
/// 包含健康检查、规则路由和可观测性中间件；CORS 由调用方按配置添加。
pub fn app(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::health::root))
        .route("/health", get(handlers::health::health_check))
        .merge(rule_routes())
        .layer(middleware::from_fn(obs_middleware::http_tracing))
        .layer(middleware::from_fn(obs_middleware::request_id))
        .with_state(state)
}
