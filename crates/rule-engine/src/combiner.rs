//! 规则合并
//!
//! 将多棵语法树按顺序用 AND 左结合合并：`[a, b, c]` -> `AND(AND(a, b), c)`。

use crate::models::{RuleNode, RuleRecord};
use serde::Serialize;

/// 合并多棵语法树
///
/// 空序列返回 `None`，单棵树原样返回。只做结构合并，不检查字段。
pub fn combine(asts: impl IntoIterator<Item = RuleNode>) -> Option<RuleNode> {
    asts.into_iter().reduce(RuleNode::and)
}

/// 合并后的规则
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CombinedRule {
    pub ast: RuleNode,
    pub rule_string: String,
    /// 从合并后的语法树重新计算，而非拼接各规则记录中保存的字段
    pub used_attributes: Vec<String>,
}

/// 合并已存储的规则记录
pub fn combine_records<'a>(records: impl IntoIterator<Item = &'a RuleRecord>) -> Option<CombinedRule> {
    let (asts, descriptions): (Vec<RuleNode>, Vec<&str>) = records
        .into_iter()
        .map(|r| (r.ast.clone(), r.rule_string.as_str()))
        .unzip();

    let rule_string = format!("Combined Rule: {}", descriptions.join(" + "));
    let ast = combine(asts)?;

    Some(CombinedRule {
        used_attributes: ast.referenced_fields(),
        ast,
        rule_string,
    })
}
