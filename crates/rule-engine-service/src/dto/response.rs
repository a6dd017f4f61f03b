//! 响应 DTO 定义

use rule_engine::{RuleNode, RuleRecord};
use serde::{Deserialize, Serialize};

/// 创建规则响应
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateRuleResponse {
    pub message: String,
    pub rule_id: String,
    pub ast: RuleNode,
}

/// 更新规则响应
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateRuleResponse {
    pub message: String,
    pub rule_id: String,
}

/// 合并规则响应
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CombineRulesResponse {
    pub message: String,
    pub rule_id: String,
    #[serde(rename = "combinedAST")]
    pub combined_ast: RuleNode,
}

/// 评估规则响应
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvaluateRuleResponse {
    pub result: bool,
}

/// 规则摘要（列表项）
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RuleSummary {
    pub id: String,
    pub rule_string: String,
}

impl From<RuleRecord> for RuleSummary {
    fn from(record: RuleRecord) -> Self {
        Self {
            id: record.id,
            rule_string: record.rule_string,
        }
    }
}

/// 规则列表响应
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RuleListResponse {
    pub rules: Vec<RuleSummary>,
}
