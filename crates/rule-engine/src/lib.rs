//! 资格规则引擎
//!
//! 将 `age > 30 AND department = 'Sales'` 这类规则字符串解析为语法树，提供：
//! - 分词与单遍解析（AND/OR 无优先级，只按括号和从左到右结合）
//! - 多条规则按 AND 左结合合并
//! - 对数据记录求值（类型不匹配时静默返回 false）
//! - 求值前的字段存在性校验
//! - 线程安全的内存规则存储

pub mod combiner;
pub mod error;
pub mod evaluator;
pub mod executor;
pub mod lexer;
pub mod models;
pub mod operators;
pub mod parser;
pub mod store;
pub mod validator;

pub use combiner::{CombinedRule, combine, combine_records};
pub use error::{ParseError, Result, RuleError};
pub use evaluator::{ConditionEvaluator, evaluate};
pub use executor::RuleExecutor;
pub use lexer::{Token, tokenize};
pub use models::{
    Condition, EvaluationContext, EvaluationResult, LogicalNode, ParsedRule, RuleNode, RuleRecord,
};
pub use operators::{LogicalOperator, Operator};
pub use parser::parse;
pub use store::RuleStore;
pub use validator::validate_attributes;
