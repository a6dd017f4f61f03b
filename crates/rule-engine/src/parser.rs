//! 规则解析器
//!
//! 单遍移进-归约：维护一个括号帧栈和"当前节点"，逐个消费词法单元构建二叉语法树。
//! AND/OR 之间没有优先级，结合关系只由括号和从左到右的挂接顺序决定，
//! 例如 `a = 1 AND b = 2 OR c = 3` 解析为 `(a = 1 AND b = 2) OR c = 3`。

use crate::error::ParseError;
use crate::lexer::{self, Token};
use crate::models::{Condition, ParsedRule, RuleNode};
use crate::operators::{LogicalOperator, Operator};
use regex::Regex;
use std::collections::BTreeSet;
use std::sync::LazyLock;
use tracing::debug;

/// `<字段> <操作符> <值>`，值为裸单词（可带小数部分）或单引号字符串
static CONDITION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(\w+)\s*([<>=])\s*('[^']*'|\w+(?:\.\w+)?)$").expect("条件正则表达式无效")
});

/// 解析规则字符串
pub fn parse(rule_string: &str) -> Result<ParsedRule, ParseError> {
    let tokens = lexer::tokenize(rule_string)?;
    let parsed = parse_tokens(tokens)?;

    debug!(
        used_attributes = ?parsed.used_attributes,
        "规则解析完成: {}", parsed.ast
    );
    Ok(parsed)
}

/// 从词法单元序列构建语法树
pub fn parse_tokens(tokens: impl IntoIterator<Item = Token>) -> Result<ParsedRule, ParseError> {
    let mut parser = RuleParser::default();
    for token in tokens {
        parser.feed(token)?;
    }
    parser.finish()
}

/// 解析单个条件片段
pub fn parse_condition(fragment: &str) -> Result<Condition, ParseError> {
    let invalid = || ParseError::InvalidConditionFormat(fragment.to_string());

    let caps = CONDITION.captures(fragment).ok_or_else(invalid)?;
    let operator = Operator::from_symbol(&caps[2]).ok_or_else(invalid)?;
    let value = caps[3].trim_matches('\'');

    Ok(Condition::new(&caps[1], operator, value))
}

/// 构建中的节点
///
/// 可变状态只存在于解析器内部，返回给调用方的都是完整的 [`RuleNode`]。
enum Pending {
    Complete(RuleNode),
    /// 逻辑节点，右子树尚未挂接
    Awaiting {
        operator: LogicalOperator,
        left: RuleNode,
    },
}

/// 每个 `(` 都压入一帧，因此 `a = 1 AND ((b = 2) OR c = 3)` 中的括号组整体成为外层 AND 的右子树。
#[derive(Default)]
struct RuleParser {
    /// 每个 `(` 保存一帧：进入括号前的当前节点（可能为空）
    stack: Vec<Option<Pending>>,
    current: Option<Pending>,
    attributes: BTreeSet<String>,
}

impl RuleParser {
    fn feed(&mut self, token: Token) -> Result<(), ParseError> {
        match token {
            Token::OpenParen => {
                let saved = self.current.take();
                self.stack.push(saved);
                Ok(())
            }
            Token::CloseParen => self.close_group(),
            Token::Logical(operator) => self.start_operator(operator),
            Token::Fragment(text) => {
                let condition = parse_condition(&text)?;
                self.attributes.insert(condition.field.clone());
                self.attach(RuleNode::Operand { value: condition })
            }
        }
    }

    fn close_group(&mut self) -> Result<(), ParseError> {
        let group = match self.current.take() {
            None => return Err(ParseError::UnexpectedCloseParen),
            Some(Pending::Awaiting { operator, .. }) => {
                return Err(ParseError::DanglingOperator(operator.to_string()));
            }
            Some(Pending::Complete(node)) => node,
        };

        let saved = self.stack.pop().ok_or(ParseError::UnbalancedParentheses)?;
        self.current = Some(match saved {
            None => Pending::Complete(group),
            Some(Pending::Awaiting { operator, left }) => {
                Pending::Complete(RuleNode::logical(operator, left, group))
            }
            Some(Pending::Complete(_)) => return Err(ParseError::MalformedExpression),
        });
        Ok(())
    }

    fn start_operator(&mut self, operator: LogicalOperator) -> Result<(), ParseError> {
        match self.current.take() {
            None => Err(ParseError::DanglingOperator(operator.to_string())),
            Some(Pending::Awaiting { operator: previous, .. }) => {
                Err(ParseError::DanglingOperator(previous.to_string()))
            }
            Some(Pending::Complete(left)) => {
                self.current = Some(Pending::Awaiting { operator, left });
                Ok(())
            }
        }
    }

    /// 挂接一个条件：作为等待中逻辑节点的右子树，或作为新表达式的起点
    fn attach(&mut self, node: RuleNode) -> Result<(), ParseError> {
        self.current = Some(match self.current.take() {
            None => Pending::Complete(node),
            Some(Pending::Awaiting { operator, left }) => {
                Pending::Complete(RuleNode::logical(operator, left, node))
            }
            Some(Pending::Complete(_)) => return Err(ParseError::MalformedExpression),
        });
        Ok(())
    }

    fn finish(self) -> Result<ParsedRule, ParseError> {
        if !self.stack.is_empty() {
            return Err(ParseError::UnbalancedParentheses);
        }

        match self.current {
            None => Err(ParseError::EmptyRule),
            Some(Pending::Awaiting { operator, .. }) => {
                Err(ParseError::DanglingOperator(operator.to_string()))
            }
            Some(Pending::Complete(ast)) => Ok(ParsedRule {
                ast,
                used_attributes: self.attributes.into_iter().collect(),
            }),
        }
    }
}
