//! 请求 DTO 定义
//!
//! 字段均为可选，缺失时由 validator 报告为参数错误而非反序列化失败。

use serde::Deserialize;
use serde_json::Value;
use validator::Validate;

/// 创建规则请求
#[derive(Debug, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase", default)]
pub struct CreateRuleRequest {
    #[validate(
        required(message = "规则字符串不能为空"),
        length(min = 1, message = "规则字符串不能为空")
    )]
    pub rule: Option<String>,
}

/// 更新规则请求
#[derive(Debug, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase", default)]
pub struct UpdateRuleRequest {
    #[validate(
        required(message = "规则 ID 不能为空"),
        length(min = 1, message = "规则 ID 不能为空")
    )]
    pub rule_id: Option<String>,
    #[validate(
        required(message = "更新后的规则字符串不能为空"),
        length(min = 1, message = "更新后的规则字符串不能为空")
    )]
    pub updated_rule_string: Option<String>,
}

/// 合并规则请求
#[derive(Debug, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase", default)]
pub struct CombineRulesRequest {
    #[validate(
        required(message = "规则 ID 列表不能为空"),
        length(min = 1, message = "规则 ID 列表不能为空")
    )]
    pub rule_ids: Option<Vec<String>>,
}

/// 评估规则请求
#[derive(Debug, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase", default)]
pub struct EvaluateRuleRequest {
    #[validate(
        required(message = "规则 ID 不能为空"),
        length(min = 1, message = "规则 ID 不能为空")
    )]
    pub rule_id: Option<String>,
    /// 待评估的数据记录（字段名 -> 字符串或数值）
    #[validate(required(message = "待评估数据不能为空"))]
    pub data: Option<Value>,
}
