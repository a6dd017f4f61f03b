//! 规则字符串分词
//!
//! 按括号和独立单词 `AND`/`OR` 切分，其余内容作为原始条件片段交给解析器。

use crate::error::ParseError;
use crate::operators::LogicalOperator;
use regex::Regex;
use std::sync::LazyLock;

static DELIMITER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\(|\)|\bAND\b|\bOR\b").expect("分隔符正则表达式无效"));

/// 词法单元
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    OpenParen,
    CloseParen,
    Logical(LogicalOperator),
    /// 未经校验的条件片段（已去除首尾空白）
    Fragment(String),
}

/// 将规则字符串切分为词法单元
///
/// 空字符串或仅含空白的字符串返回 [`ParseError::EmptyInput`]。
pub fn tokenize(input: &str) -> Result<Vec<Token>, ParseError> {
    if input.trim().is_empty() {
        return Err(ParseError::EmptyInput);
    }

    let mut tokens = Vec::new();
    let mut last = 0;

    for m in DELIMITER.find_iter(input) {
        push_fragment(&mut tokens, &input[last..m.start()]);

        let token = match m.as_str() {
            "(" => Token::OpenParen,
            ")" => Token::CloseParen,
            keyword => match LogicalOperator::from_keyword(keyword) {
                Some(op) => Token::Logical(op),
                None => Token::Fragment(keyword.to_string()),
            },
        };
        tokens.push(token);
        last = m.end();
    }
    push_fragment(&mut tokens, &input[last..]);

    Ok(tokens)
}

fn push_fragment(tokens: &mut Vec<Token>, raw: &str) {
    let trimmed = raw.trim();
    if !trimmed.is_empty() {
        tokens.push(Token::Fragment(trimmed.to_string()));
    }
}
