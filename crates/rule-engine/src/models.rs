//! 规则引擎领域模型

use crate::evaluator::to_number;
use crate::operators::{LogicalOperator, Operator};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeSet;
use std::fmt;
use uuid::Uuid;

/// 语法树节点（条件或逻辑操作）
///
/// 序列化格式与规则文档一致：
/// `{"type":"operand","value":{...}}` / `{"type":"operator","operator":"AND","left":...,"right":...}`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RuleNode {
    Operand { value: Condition },
    Operator(LogicalNode),
}

impl RuleNode {
    pub fn condition(field: impl Into<String>, operator: Operator, value: impl Into<String>) -> Self {
        Self::Operand {
            value: Condition::new(field, operator, value),
        }
    }

    pub fn logical(operator: LogicalOperator, left: RuleNode, right: RuleNode) -> Self {
        Self::Operator(LogicalNode {
            operator,
            left: Box::new(left),
            right: Box::new(right),
        })
    }

    pub fn and(left: RuleNode, right: RuleNode) -> Self {
        Self::logical(LogicalOperator::And, left, right)
    }

    pub fn or(left: RuleNode, right: RuleNode) -> Self {
        Self::logical(LogicalOperator::Or, left, right)
    }

    /// 收集树中所有条件引用的字段（排序、去重）
    pub fn referenced_fields(&self) -> Vec<String> {
        let mut fields = BTreeSet::new();
        self.collect_fields(&mut fields);
        fields.into_iter().collect()
    }

    fn collect_fields(&self, fields: &mut BTreeSet<String>) {
        match self {
            Self::Operand { value } => {
                fields.insert(value.field.clone());
            }
            Self::Operator(node) => {
                node.left.collect_fields(fields);
                node.right.collect_fields(fields);
            }
        }
    }
}

impl fmt::Display for RuleNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Operand { value } => write!(f, "{}", value),
            Self::Operator(node) => {
                write!(f, "({} {} {})", node.left, node.operator, node.right)
            }
        }
    }
}

/// 条件节点
///
/// `value` 保存去掉引号后的字面文本，数值转换在求值时进行。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Condition {
    pub field: String,
    pub operator: Operator,
    pub value: String,
}

impl Condition {
    pub fn new(field: impl Into<String>, operator: Operator, value: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            operator,
            value: value.into(),
        }
    }
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let bare_word = !self.value.is_empty()
            && self
                .value
                .chars()
                .all(|c| c.is_alphanumeric() || c == '_' || c == '.');
        if bare_word && to_number(&self.value).is_some() {
            write!(f, "{} {} {}", self.field, self.operator, self.value)
        } else {
            write!(f, "{} {} '{}'", self.field, self.operator, self.value)
        }
    }
}

/// 逻辑操作节点，左右子树均已就绪
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogicalNode {
    pub operator: LogicalOperator,
    pub left: Box<RuleNode>,
    pub right: Box<RuleNode>,
}

/// 解析结果
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ParsedRule {
    pub ast: RuleNode,
    pub used_attributes: Vec<String>,
}

/// 已存储的规则记录
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RuleRecord {
    pub id: String,
    pub rule_string: String,
    pub ast: RuleNode,
    pub used_attributes: Vec<String>,
    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,
    #[serde(default = "Utc::now")]
    pub updated_at: DateTime<Utc>,
}

impl RuleRecord {
    pub fn new(rule_string: impl Into<String>, parsed: ParsedRule) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4().to_string(),
            rule_string: rule_string.into(),
            ast: parsed.ast,
            used_attributes: parsed.used_attributes,
            created_at: now,
            updated_at: now,
        }
    }
}

/// 评估上下文 - 待评估的数据记录（字段名 -> 字符串或数值）
#[derive(Debug, Clone, Default)]
pub struct EvaluationContext {
    data: Value,
}

impl EvaluationContext {
    pub fn new(data: Value) -> Self {
        Self { data }
    }

    /// 获取字段值；值为 null 的字段返回 `Some(Value::Null)`
    pub fn get_field(&self, field: &str) -> Option<&Value> {
        self.data.as_object()?.get(field)
    }

    /// 字段是否以键的形式存在（不论取值）
    pub fn contains(&self, field: &str) -> bool {
        self.data
            .as_object()
            .is_some_and(|map| map.contains_key(field))
    }

    /// 获取底层数据
    pub fn data(&self) -> &Value {
        &self.data
    }
}

/// 评估结果
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EvaluationResult {
    pub matched: bool,
    pub rule_id: String,
    pub matched_conditions: Vec<String>,
    pub evaluation_trace: Vec<String>,
    pub evaluation_time_ms: i64,
}

impl EvaluationResult {
    pub fn new(rule_id: String) -> Self {
        Self {
            matched: false,
            rule_id,
            matched_conditions: Vec::new(),
            evaluation_trace: Vec::new(),
            evaluation_time_ms: 0,
        }
    }
}
