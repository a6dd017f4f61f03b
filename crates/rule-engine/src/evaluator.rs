//! 语法树求值
//!
//! 求值策略是宽松的：类型不匹配、字段缺失或不支持的操作符一律返回 `false`，
//! 不会产生错误。字段是否存在需要在求值前用 [`crate::validator`] 校验。

use crate::models::{Condition, EvaluationContext, RuleNode};
use crate::operators::Operator;
use regex::Regex;
use serde_json::Value;
use std::sync::LazyLock;

/// 十进制数值字面量：可带符号、小数点和指数
static DECIMAL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[+-]?(\d+\.?\d*|\.\d+)([eE][+-]?\d+)?$").expect("数值正则表达式无效")
});

/// 对语法树求值
///
/// 逻辑节点的左右子树都会被求值（不短路）。求值是纯函数，相同输入总是得到相同结果。
pub fn evaluate(node: &RuleNode, context: &EvaluationContext) -> bool {
    match node {
        RuleNode::Operand { value } => {
            ConditionEvaluator::evaluate(context.get_field(&value.field), value)
        }
        RuleNode::Operator(group) => {
            let left = evaluate(&group.left, context);
            let right = evaluate(&group.right, context);
            group.operator.apply(left, right)
        }
    }
}

/// 条件评估器
pub struct ConditionEvaluator;

impl ConditionEvaluator {
    /// 评估单个条件
    ///
    /// - 字段为字符串：只支持 `=`，精确比较
    /// - 字段为数值且条件值可转为数值：按数值比较 `>`、`<`、`=`
    /// - 其他情况（含字段缺失、null、布尔）返回 `false`
    pub fn evaluate(field_value: Option<&Value>, condition: &Condition) -> bool {
        match field_value {
            Some(Value::String(s)) => Self::compare_str(s, condition),
            Some(Value::Number(n)) => match (n.as_f64(), to_number(&condition.value)) {
                (Some(field), Some(expected)) => {
                    Self::compare_f64(field, expected, condition.operator)
                }
                _ => false,
            },
            _ => false,
        }
    }

    fn compare_str(field: &str, condition: &Condition) -> bool {
        match condition.operator {
            Operator::Eq => field == condition.value,
            Operator::Gt | Operator::Lt => false,
        }
    }

    fn compare_f64(field: f64, expected: f64, operator: Operator) -> bool {
        match operator {
            Operator::Gt => field > expected,
            Operator::Lt => field < expected,
            Operator::Eq => field == expected,
        }
    }
}

/// 将条件值转换为数值，无法转换时返回 `None`
///
/// 转换规则：
/// - 去掉首尾空白，空串视为 `0`
/// - 十进制字面量，可带符号和指数，例如 `30`、`-1.5`、`.5`、`2e3`
/// - 无符号的 `0x`/`0b`/`0o` 前缀整数，例如 `0x1A`
/// - `Infinity`（可带符号），大小写必须一致；`inf`、`NaN` 等一律不是数值
pub(crate) fn to_number(value: &str) -> Option<f64> {
    let value = value.trim();
    if value.is_empty() {
        return Some(0.0);
    }

    match value {
        "Infinity" | "+Infinity" => return Some(f64::INFINITY),
        "-Infinity" => return Some(f64::NEG_INFINITY),
        _ => {}
    }

    let radix = match value.get(..2) {
        Some("0x" | "0X") => Some(16),
        Some("0b" | "0B") => Some(2),
        Some("0o" | "0O") => Some(8),
        _ => None,
    };
    if let Some(radix) = radix {
        return radix_integer(&value[2..], radix);
    }

    if DECIMAL.is_match(value) {
        value.parse::<f64>().ok()
    } else {
        None
    }
}

/// 按指定进制累加数字，超出 u64 范围的值同样按 f64 近似
fn radix_integer(digits: &str, radix: u32) -> Option<f64> {
    if digits.is_empty() {
        return None;
    }
    digits.chars().try_fold(0.0_f64, |acc, c| {
        c.to_digit(radix).map(|d| acc * f64::from(radix) + f64::from(d))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn age_over_30() -> RuleNode {
        RuleNode::condition("age", Operator::Gt, "30")
    }

    fn ctx(data: Value) -> EvaluationContext {
        EvaluationContext::new(data)
    }

    #[test]
    fn test_numeric_comparisons() {
        assert!(evaluate(&age_over_30(), &ctx(json!({"age": 35}))));
        assert!(!evaluate(&age_over_30(), &ctx(json!({"age": 20}))));
        assert!(!evaluate(&age_over_30(), &ctx(json!({"age": 30}))));

        let under = RuleNode::condition("age", Operator::Lt, "30");
        assert!(evaluate(&under, &ctx(json!({"age": 29.5}))));

        let exact = RuleNode::condition("age", Operator::Eq, "30");
        assert!(evaluate(&exact, &ctx(json!({"age": 30}))));
        assert!(evaluate(&exact, &ctx(json!({"age": 30.0}))));
    }

    #[test]
    fn test_string_equality_only() {
        let sales = RuleNode::condition("department", Operator::Eq, "Sales");
        assert!(evaluate(&sales, &ctx(json!({"department": "Sales"}))));
        assert!(!evaluate(&sales, &ctx(json!({"department": "sales"}))));

        let gt = RuleNode::condition("department", Operator::Gt, "A");
        assert!(!evaluate(&gt, &ctx(json!({"department": "Sales"}))));
    }

    #[test]
    fn test_numeric_string_field_takes_string_branch() {
        // 字段为字符串 "35"，条件为 `> 30`：字符串不支持 `>`
        assert!(!evaluate(&age_over_30(), &ctx(json!({"age": "35"}))));

        // 字符串相等仍然可用
        let exact = RuleNode::condition("age", Operator::Eq, "35");
        assert!(evaluate(&exact, &ctx(json!({"age": "35"}))));
    }

    #[test]
    fn test_type_mismatch_is_false() {
        let sales = RuleNode::condition("department", Operator::Eq, "Sales");
        assert!(!evaluate(&sales, &ctx(json!({"department": 42}))));
        assert!(!evaluate(&age_over_30(), &ctx(json!({"age": true}))));
        assert!(!evaluate(&age_over_30(), &ctx(json!({"age": null}))));
        assert!(!evaluate(&age_over_30(), &ctx(json!({"age": [40]}))));
    }

    #[test]
    fn test_missing_field_is_false() {
        assert!(!evaluate(&age_over_30(), &ctx(json!({}))));
        assert!(!evaluate(&age_over_30(), &ctx(json!(null))));
    }

    #[test]
    fn test_logical_nodes() {
        let tree = RuleNode::or(
            RuleNode::and(
                age_over_30(),
                RuleNode::condition("department", Operator::Eq, "Sales"),
            ),
            RuleNode::condition("experience", Operator::Gt, "5"),
        );

        assert!(evaluate(
            &tree,
            &ctx(json!({"age": 35, "department": "Sales", "experience": 1}))
        ));
        assert!(evaluate(
            &tree,
            &ctx(json!({"age": 20, "department": "Sales", "experience": 8}))
        ));
        assert!(!evaluate(
            &tree,
            &ctx(json!({"age": 20, "department": "Marketing", "experience": 2}))
        ));
    }

    #[test]
    fn test_non_numeric_condition_value_against_number() {
        let cond = Condition::new("age", Operator::Eq, "thirty");
        assert!(!ConditionEvaluator::evaluate(Some(&json!(30)), &cond));

        let nan = Condition::new("age", Operator::Eq, "NaN");
        assert!(!ConditionEvaluator::evaluate(Some(&json!(30)), &nan));
    }

    #[test]
    fn test_only_exact_infinity_spelling_is_numeric() {
        let data = ctx(json!({"score": 5}));

        for word in ["inf", "infinity", "INFINITY", "Inf"] {
            let cond = RuleNode::condition("score", Operator::Lt, word);
            assert!(!evaluate(&cond, &data), "{word} 不应被当作数值");
        }

        let below = RuleNode::condition("score", Operator::Lt, "Infinity");
        assert!(evaluate(&below, &data));
        let above = RuleNode::condition("score", Operator::Gt, "-Infinity");
        assert!(evaluate(&above, &data));
    }

    #[test]
    fn test_equality_is_exact() {
        let zero = RuleNode::condition("x", Operator::Eq, "0");
        assert!(!evaluate(&zero, &ctx(json!({"x": 1e-17}))));
        assert!(evaluate(&zero, &ctx(json!({"x": 0}))));
        assert!(evaluate(&zero, &ctx(json!({"x": -0.0}))));

        let sum = RuleNode::condition("x", Operator::Eq, "0.30000000000000004");
        assert!(evaluate(&sum, &ctx(json!({"x": 0.1 + 0.2}))));
        let tenths = RuleNode::condition("x", Operator::Eq, "0.3");
        assert!(!evaluate(&tenths, &ctx(json!({"x": 0.1 + 0.2}))));
    }

    #[test]
    fn test_prefixed_integer_values() {
        let hex = RuleNode::condition("x", Operator::Eq, "0x1A");
        assert!(evaluate(&hex, &ctx(json!({"x": 26}))));

        let bin = RuleNode::condition("x", Operator::Eq, "0b101");
        assert!(evaluate(&bin, &ctx(json!({"x": 5}))));

        let oct = RuleNode::condition("x", Operator::Gt, "0o7");
        assert!(evaluate(&oct, &ctx(json!({"x": 8}))));
        assert!(!evaluate(&oct, &ctx(json!({"x": 7}))));
    }

    #[test]
    fn test_to_number() {
        assert_eq!(to_number("30"), Some(30.0));
        assert_eq!(to_number(" 2.5 "), Some(2.5));
        assert_eq!(to_number("-1.5"), Some(-1.5));
        assert_eq!(to_number(".5"), Some(0.5));
        assert_eq!(to_number("5."), Some(5.0));
        assert_eq!(to_number("2e3"), Some(2000.0));
        assert_eq!(to_number(""), Some(0.0));
        assert_eq!(to_number("   "), Some(0.0));
        assert_eq!(to_number("0XfF"), Some(255.0));

        for text in ["0x", "0xG1", "-0x1A", "0x+1", "0b102", "1_000", "12abc", "nan", "e5", "."] {
            assert_eq!(to_number(text), None, "{text}");
        }
    }
}
