//! 属性校验
//!
//! 求值本身不检查字段是否存在，缺失的字段会让条件静默返回 `false`，
//! 因此评估前必须先确认数据记录包含规则引用的全部字段。

use crate::error::{Result, RuleError};
use crate::models::EvaluationContext;

/// 校验数据记录包含全部所需字段
///
/// 字段以键的形式存在即可，值为 null 也视为存在。
/// 缺失多个字段时按引用顺序全部列出，以 `, ` 分隔。
pub fn validate_attributes<S: AsRef<str>>(
    context: &EvaluationContext,
    used_attributes: &[S],
) -> Result<()> {
    let missing = missing_attributes(context, used_attributes);
    if missing.is_empty() {
        Ok(())
    } else {
        Err(RuleError::MissingAttribute(missing.join(", ")))
    }
}

/// 列出全部缺失字段
pub fn missing_attributes<'a, S: AsRef<str>>(
    context: &EvaluationContext,
    used_attributes: &'a [S],
) -> Vec<&'a str> {
    used_attributes
        .iter()
        .map(AsRef::as_ref)
        .filter(|attr| !context.contains(attr))
        .collect()
}
