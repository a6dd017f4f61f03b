//! 规则执行器
//!
//! 先校验数据记录包含规则引用的全部字段，再对语法树求值，返回匹配结果和评估追踪信息。
//! 求值不短路，追踪中会出现每个条件的结果。

use crate::error::Result;
use crate::evaluator::ConditionEvaluator;
use crate::models::{Condition, EvaluationContext, EvaluationResult, LogicalNode, RuleNode, RuleRecord};
use crate::validator::validate_attributes;
use std::time::Instant;
use tracing::debug;

/// 规则执行器
pub struct RuleExecutor {
    /// 是否记录详细评估追踪
    trace_enabled: bool,
}

impl RuleExecutor {
    pub fn new() -> Self {
        Self {
            trace_enabled: false,
        }
    }

    /// 启用评估追踪
    pub fn with_trace(mut self) -> Self {
        self.trace_enabled = true;
        self
    }

    /// 执行规则评估
    ///
    /// 数据记录缺少规则字段时返回 [`crate::RuleError::MissingAttribute`]。
    pub fn execute(&self, rule: &RuleRecord, context: &EvaluationContext) -> Result<EvaluationResult> {
        validate_attributes(context, rule.used_attributes.as_slice())?;

        let start = Instant::now();
        let mut result = EvaluationResult::new(rule.id.clone());

        let matched = self.evaluate_node(&rule.ast, context, &mut result, "root");

        result.matched = matched;
        result.evaluation_time_ms = start.elapsed().as_millis() as i64;

        debug!(
            rule_id = %rule.id,
            matched = result.matched,
            "规则评估完成"
        );
        Ok(result)
    }

    fn evaluate_node(
        &self,
        node: &RuleNode,
        context: &EvaluationContext,
        result: &mut EvaluationResult,
        path: &str,
    ) -> bool {
        match node {
            RuleNode::Operand { value } => self.evaluate_condition(value, context, result, path),
            RuleNode::Operator(group) => self.evaluate_group(group, context, result, path),
        }
    }

    fn evaluate_condition(
        &self,
        cond: &Condition,
        context: &EvaluationContext,
        result: &mut EvaluationResult,
        path: &str,
    ) -> bool {
        let field_value = context.get_field(&cond.field);
        let matched = ConditionEvaluator::evaluate(field_value, cond);

        if self.trace_enabled {
            result.evaluation_trace.push(format!(
                "{}: {} => {}",
                path,
                cond,
                if matched { "MATCHED" } else { "NOT_MATCHED" }
            ));
        }

        if matched {
            result.matched_conditions.push(format!("{}: {}", path, cond));
        }

        matched
    }

    /// 评估逻辑节点（左右子树都求值）
    fn evaluate_group(
        &self,
        group: &LogicalNode,
        context: &EvaluationContext,
        result: &mut EvaluationResult,
        path: &str,
    ) -> bool {
        let left = self.evaluate_node(&group.left, context, result, &format!("{}.left", path));
        let right = self.evaluate_node(&group.right, context, result, &format!("{}.right", path));
        let matched = group.operator.apply(left, right);

        if self.trace_enabled {
            result.evaluation_trace.push(format!(
                "{}: {}({}, {}) => {}",
                path, group.operator, left, right, matched
            ));
        }

        matched
    }
}

impl Default for RuleExecutor {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::RuleError;
    use crate::parser::parse;
    use serde_json::json;

    fn record(rule: &str) -> RuleRecord {
        RuleRecord::new(rule, parse(rule).unwrap())
    }

    fn employee() -> EvaluationContext {
        EvaluationContext::new(json!({
            "age": 35,
            "department": "Sales",
            "salary": 60000,
            "experience": 3
        }))
    }

    #[test]
    fn test_simple_condition_match() {
        let rule = record("age > 30");
        let result = RuleExecutor::new().execute(&rule, &employee()).unwrap();

        assert!(result.matched);
        assert_eq!(result.rule_id, rule.id);
        assert_eq!(result.matched_conditions, vec!["root: age > 30"]);
        assert!(result.evaluation_trace.is_empty());
    }

    #[test]
    fn test_simple_condition_not_match() {
        let rule = record("department = 'Marketing'");
        let result = RuleExecutor::new().execute(&rule, &employee()).unwrap();

        assert!(!result.matched);
        assert!(result.matched_conditions.is_empty());
    }

    #[test]
    fn test_no_short_circuit_in_trace() {
        // 左侧已不匹配，右侧仍然会被求值并记录
        let rule = record("age < 18 AND salary > 50000");
        let result = RuleExecutor::new()
            .with_trace()
            .execute(&rule, &employee())
            .unwrap();

        assert!(!result.matched);
        assert_eq!(
            result.evaluation_trace,
            vec![
                "root.left: age < 18 => NOT_MATCHED",
                "root.right: salary > 50000 => MATCHED",
                "root: AND(false, true) => false",
            ]
        );
        assert_eq!(result.matched_conditions, vec!["root.right: salary > 50000"]);
    }

    #[test]
    fn test_missing_attribute_rejected_before_evaluation() {
        let rule = record("age > 30 AND dept = 'Sales'");
        let context = EvaluationContext::new(json!({"age": 30}));

        let err = RuleExecutor::new().execute(&rule, &context).unwrap_err();
        assert!(matches!(err, RuleError::MissingAttribute(ref f) if f == "dept"));
    }

    #[test]
    fn test_nested_rule() {
        let rule = record(
            "((age > 30 AND department = 'Sales') OR (age < 25 AND department = 'Marketing')) \
             AND (salary > 50000 OR experience > 5)",
        );
        let result = RuleExecutor::new().execute(&rule, &employee()).unwrap();
        assert!(result.matched);

        let junior = EvaluationContext::new(json!({
            "age": 22,
            "department": "Marketing",
            "salary": 30000,
            "experience": 1
        }));
        let result = RuleExecutor::new().execute(&rule, &junior).unwrap();
        assert!(!result.matched);
    }
}
