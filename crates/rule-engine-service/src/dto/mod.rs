//! 数据传输对象
//!
//! 请求与响应结构，字段统一使用 camelCase。

pub mod request;
pub mod response;

pub use request::{CombineRulesRequest, CreateRuleRequest, EvaluateRuleRequest, UpdateRuleRequest};
pub use response::{
    CombineRulesResponse, CreateRuleResponse, EvaluateRuleResponse, RuleListResponse, RuleSummary,
    UpdateRuleResponse,
};
