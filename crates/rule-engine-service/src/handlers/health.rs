//! 健康检查

use axum::Json;

/// 根路径：返回服务名称
pub async fn root() -> &'static str {
    "Rule Engine Backend"
}

/// 存活检查：服务进程正常即返回 ok
pub async fn health_check() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "ok",
        "service": env!("CARGO_PKG_NAME")
    }))
}
