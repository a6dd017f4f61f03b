//! 规则 API 处理器
//!
//! 实现规则的创建、更新、合并、评估与列表查询。

use std::time::Instant;

use axum::{Json, extract::State};
use rule_engine::{EvaluationContext, ParsedRule, RuleRecord, combine_records, parse};
use rule_shared::observability::metrics;
use tracing::{debug, info, instrument, warn};
use validator::Validate;

use crate::{
    dto::{
        CombineRulesRequest, CombineRulesResponse, CreateRuleRequest, CreateRuleResponse,
        EvaluateRuleRequest, EvaluateRuleResponse, RuleListResponse, UpdateRuleRequest,
        UpdateRuleResponse,
    },
    error::{ApiError, Result},
    state::AppState,
};

/// 解析规则字符串，失败时记录指标
fn parse_rule(rule_string: &str) -> Result<ParsedRule> {
    parse(rule_string).map_err(|e| {
        warn!(rule = %rule_string, code = e.code(), "规则解析失败: {}", e);
        metrics::record_parse_failure(e.code());
        ApiError::from(e)
    })
}

/// 创建规则
///
/// POST /create_rule
#[instrument(skip(state, req))]
pub async fn create_rule(
    State(state): State<AppState>,
    Json(req): Json<CreateRuleRequest>,
) -> Result<Json<CreateRuleResponse>> {
    req.validate()?;
    let rule_string = req.rule.unwrap_or_default();

    let parsed = parse_rule(&rule_string)?;
    let ast = parsed.ast.clone();
    let rule_id = state.store.add(&rule_string, parsed);

    info!(rule_id = %rule_id, "规则创建成功");

    Ok(Json(CreateRuleResponse {
        message: "Rule created".to_string(),
        rule_id,
        ast,
    }))
}

/// 更新规则
///
/// POST /update_rule
#[instrument(skip(state, req))]
pub async fn update_rule(
    State(state): State<AppState>,
    Json(req): Json<UpdateRuleRequest>,
) -> Result<Json<UpdateRuleResponse>> {
    req.validate()?;
    let rule_id = req.rule_id.unwrap_or_default();
    let rule_string = req.updated_rule_string.unwrap_or_default();

    let parsed = parse_rule(&rule_string)?;
    state.store.update(&rule_id, &rule_string, parsed)?;

    info!(rule_id = %rule_id, "规则更新成功");

    Ok(Json(UpdateRuleResponse {
        message: "Rule updated successfully".to_string(),
        rule_id,
    }))
}

/// 合并规则
///
/// POST /combine_rules
///
/// 按请求顺序读取规则并用 AND 左结合合并，结果作为新规则保存。
#[instrument(skip(state, req))]
pub async fn combine_rules(
    State(state): State<AppState>,
    Json(req): Json<CombineRulesRequest>,
) -> Result<Json<CombineRulesResponse>> {
    req.validate()?;
    let rule_ids = req.rule_ids.unwrap_or_default();

    let records = rule_ids
        .iter()
        .map(|id| state.store.require(id))
        .collect::<rule_engine::Result<Vec<RuleRecord>>>()?;

    let combined = combine_records(&records)
        .ok_or_else(|| ApiError::Validation("规则 ID 列表不能为空".to_string()))?;
    let combined_ast = combined.ast.clone();
    let rule_id = state.store.add_combined(combined);

    info!(rule_id = %rule_id, sources = rule_ids.len(), "规则合并成功");

    Ok(Json(CombineRulesResponse {
        message: "Rules combined successfully".to_string(),
        rule_id,
        combined_ast,
    }))
}

/// 评估规则
///
/// POST /evaluate_rule
///
/// 数据记录必须包含规则引用的全部字段，否则返回 400。
#[instrument(skip(state, req))]
pub async fn evaluate_rule(
    State(state): State<AppState>,
    Json(req): Json<EvaluateRuleRequest>,
) -> Result<Json<EvaluateRuleResponse>> {
    req.validate()?;
    let rule_id = req.rule_id.unwrap_or_default();
    let context = EvaluationContext::new(req.data.unwrap_or_default());

    let record = state.store.require(&rule_id)?;
    debug!(rule_id = %rule_id, ast = %record.ast, data = %context.data(), "开始评估规则");

    let start = Instant::now();
    let result = state.executor.execute(&record, &context)?;
    metrics::record_rule_evaluation(result.matched, start.elapsed().as_secs_f64());

    debug!(
        rule_id = %rule_id,
        matched = result.matched,
        matched_conditions = ?result.matched_conditions,
        "规则评估完成"
    );

    Ok(Json(EvaluateRuleResponse {
        result: result.matched,
    }))
}

/// 获取全部规则
///
/// GET /rules
pub async fn list_rules(State(state): State<AppState>) -> Json<RuleListResponse> {
    let rules = state.store.list().into_iter().map(Into::into).collect();
    Json(RuleListResponse { rules })
}
