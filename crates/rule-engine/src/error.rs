//! 规则引擎错误类型

use thiserror::Error;

/// 规则字符串解析错误
///
/// 均为结构性错误，调用方应直接拒绝整个请求，不做重试。
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("规则字符串不能为空")]
    EmptyInput,

    #[error("无效的规则: 括号内缺少子表达式")]
    UnexpectedCloseParen,

    #[error("无效的规则: 逻辑操作符 {0} 缺少操作数")]
    DanglingOperator(String),

    #[error("无效的条件格式: \"{0}\"")]
    InvalidConditionFormat(String),

    #[error("无效的规则: 多个表达式之间缺少逻辑操作符")]
    MalformedExpression,

    #[error("无效的规则: 规则字符串未生成有效的语法树")]
    EmptyRule,

    #[error("无效的规则: 括号不匹配")]
    UnbalancedParentheses,
}

impl ParseError {
    /// 获取错误码
    pub fn code(&self) -> &'static str {
        match self {
            Self::EmptyInput => "EMPTY_INPUT",
            Self::UnexpectedCloseParen => "UNEXPECTED_CLOSE_PAREN",
            Self::DanglingOperator(_) => "DANGLING_OPERATOR",
            Self::InvalidConditionFormat(_) => "INVALID_CONDITION_FORMAT",
            Self::MalformedExpression => "MALFORMED_EXPRESSION",
            Self::EmptyRule => "EMPTY_RULE",
            Self::UnbalancedParentheses => "UNBALANCED_PARENTHESES",
        }
    }
}

#[derive(Debug, Error)]
pub enum RuleError {
    #[error("规则解析失败: {0}")]
    Parse(#[from] ParseError),

    #[error("缺少必需属性: {0}")]
    MissingAttribute(String),

    #[error("规则未找到: {0}")]
    RuleNotFound(String),

    #[error("JSON 序列化错误: {0}")]
    JsonError(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, RuleError>;
