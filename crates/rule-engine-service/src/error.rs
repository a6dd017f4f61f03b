//! 规则服务错误类型定义

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use rule_engine::{ParseError, RuleError};
use serde_json::json;

/// 规则服务错误类型
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("参数验证失败: {0}")]
    Validation(String),

    #[error("无效的规则格式: {0}")]
    InvalidRule(#[from] ParseError),

    #[error("缺少必需属性: {0}")]
    MissingAttribute(String),

    #[error("规则不存在: {0}")]
    RuleNotFound(String),

    #[error("内部错误: {0}")]
    Internal(String),
}

impl ApiError {
    /// 返回对应的 HTTP 状态码
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::Validation(_) | Self::InvalidRule(_) | Self::MissingAttribute(_) => {
                StatusCode::BAD_REQUEST
            }
            Self::RuleNotFound(_) => StatusCode::NOT_FOUND,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// 返回错误码（用于 API 响应）
    ///
    /// 规则格式错误直接使用解析错误码，便于前端定位问题。
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Validation(_) => "VALIDATION_ERROR",
            Self::InvalidRule(e) => e.code(),
            Self::MissingAttribute(_) => "MISSING_ATTRIBUTE",
            Self::RuleNotFound(_) => "RULE_NOT_FOUND",
            Self::Internal(_) => "INTERNAL_ERROR",
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        // 内部错误只返回通用提示，详细信息仅记录日志
        let message = match &self {
            Self::Internal(e) => {
                tracing::error!(error = %e, "内部错误");
                "服务内部错误，请稍后重试".to_string()
            }
            other => other.to_string(),
        };

        let body = json!({
            "error": message,
            "code": self.error_code(),
        });

        (status, axum::Json(body)).into_response()
    }
}

/// 从规则引擎错误转换
impl From<RuleError> for ApiError {
    fn from(err: RuleError) -> Self {
        match err {
            RuleError::Parse(e) => Self::InvalidRule(e),
            RuleError::MissingAttribute(field) => Self::MissingAttribute(field),
            RuleError::RuleNotFound(id) => Self::RuleNotFound(id),
            other => Self::Internal(other.to_string()),
        }
    }
}

/// 从 validator 错误转换
impl From<validator::ValidationErrors> for ApiError {
    fn from(errors: validator::ValidationErrors) -> Self {
        Self::Validation(errors.to_string())
    }
}

pub type Result<T> = std::result::Result<T, ApiError>;
