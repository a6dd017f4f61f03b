//! 规则存储
//!
//! 使用 DashMap 提供线程安全的规则文档集合，以生成的 ID 为键。
//! 存储只保存完整的规则记录，更新时整体替换，从不修改已返回的语法树。
//! 每条记录首次保存时分配一个递增序号，列表按序号输出。

use crate::combiner::CombinedRule;
use crate::error::{Result, RuleError};
use crate::models::{ParsedRule, RuleRecord};
use chrono::Utc;
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::{info, instrument, warn};
use uuid::Uuid;

/// 带保存序号的规则记录
#[derive(Clone)]
struct StoredRule {
    seq: u64,
    record: RuleRecord,
}

/// 规则存储
#[derive(Clone, Default)]
pub struct RuleStore {
    rules: Arc<DashMap<String, StoredRule>>,
    next_seq: Arc<AtomicU64>,
}

impl RuleStore {
    /// 创建新的规则存储
    pub fn new() -> Self {
        Self::default()
    }

    /// 获取当前存储的规则数量
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// 检查存储是否为空
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// 保存新解析的规则，返回生成的 ID
    #[instrument(skip(self, parsed))]
    pub fn add(&self, rule_string: &str, parsed: ParsedRule) -> String {
        self.insert(RuleRecord::new(rule_string, parsed))
    }

    /// 保存合并后的规则，返回生成的 ID
    #[instrument(skip(self, combined), fields(rule_string = %combined.rule_string))]
    pub fn add_combined(&self, combined: CombinedRule) -> String {
        let now = Utc::now();
        self.insert(RuleRecord {
            id: Uuid::new_v4().to_string(),
            rule_string: combined.rule_string,
            ast: combined.ast,
            used_attributes: combined.used_attributes,
            created_at: now,
            updated_at: now,
        })
    }

    /// 保存完整的规则记录（覆盖同 ID 记录，保留其原有序号）
    pub fn insert(&self, record: RuleRecord) -> String {
        let rule_id = record.id.clone();
        match self.rules.entry(rule_id.clone()) {
            Entry::Occupied(mut entry) => entry.get_mut().record = record,
            Entry::Vacant(entry) => {
                let seq = self.next_seq.fetch_add(1, Ordering::Relaxed);
                entry.insert(StoredRule { seq, record });
            }
        }

        info!("规则已保存: {}", rule_id);
        rule_id
    }

    /// 用新解析的规则替换已有记录
    ///
    /// 语法树、规则字符串和引用字段一起替换，创建时间保留。
    #[instrument(skip(self, parsed))]
    pub fn update(&self, rule_id: &str, rule_string: &str, parsed: ParsedRule) -> Result<()> {
        let Some(mut stored) = self.rules.get_mut(rule_id) else {
            warn!("更新不存在的规则: {}", rule_id);
            return Err(RuleError::RuleNotFound(rule_id.to_string()));
        };

        let record = &mut stored.record;
        record.rule_string = rule_string.to_string();
        record.ast = parsed.ast;
        record.used_attributes = parsed.used_attributes;
        record.updated_at = Utc::now();

        info!("规则已更新: {}", rule_id);
        Ok(())
    }

    /// 获取规则
    pub fn get(&self, rule_id: &str) -> Option<RuleRecord> {
        self.rules.get(rule_id).map(|r| r.record.clone())
    }

    /// 获取规则，不存在时返回 [`RuleError::RuleNotFound`]
    pub fn require(&self, rule_id: &str) -> Result<RuleRecord> {
        self.get(rule_id)
            .ok_or_else(|| RuleError::RuleNotFound(rule_id.to_string()))
    }

    /// 检查规则是否存在
    pub fn contains(&self, rule_id: &str) -> bool {
        self.rules.contains_key(rule_id)
    }

    /// 获取所有规则，按首次保存的顺序排列；更新不改变位置
    pub fn list(&self) -> Vec<RuleRecord> {
        let mut stored: Vec<StoredRule> = self.rules.iter().map(|r| r.value().clone()).collect();
        stored.sort_by_key(|s| s.seq);
        stored.into_iter().map(|s| s.record).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::combiner::combine_records;
    use crate::parser::parse;

    fn add(store: &RuleStore, rule: &str) -> String {
        store.add(rule, parse(rule).unwrap())
    }

    #[test]
    fn test_add_and_get() {
        let store = RuleStore::new();
        let id = add(&store, "age > 30");

        assert_eq!(store.len(), 1);
        assert!(store.contains(&id));

        let record = store.get(&id).unwrap();
        assert_eq!(record.id, id);
        assert_eq!(record.rule_string, "age > 30");
        assert_eq!(record.used_attributes, vec!["age"]);
    }

    #[test]
    fn test_generated_ids_are_unique() {
        let store = RuleStore::new();
        let a = add(&store, "age > 30");
        let b = add(&store, "age > 30");
        assert_ne!(a, b);
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn test_get_nonexistent_rule() {
        let store = RuleStore::new();
        assert!(store.get("nonexistent").is_none());
        assert!(matches!(
            store.require("nonexistent"),
            Err(RuleError::RuleNotFound(ref id)) if id == "nonexistent"
        ));
    }

    #[test]
    fn test_update_replaces_ast_and_attributes() {
        let store = RuleStore::new();
        let id = add(&store, "age > 30");
        let created_at = store.get(&id).unwrap().created_at;

        let updated = "salary > 1000 AND dept = 'IT'";
        store.update(&id, updated, parse(updated).unwrap()).unwrap();

        let record = store.get(&id).unwrap();
        assert_eq!(record.rule_string, updated);
        assert_eq!(record.used_attributes, vec!["dept", "salary"]);
        assert_eq!(record.ast, parse(updated).unwrap().ast);
        assert_eq!(record.created_at, created_at);
        assert!(record.updated_at >= created_at);
    }

    #[test]
    fn test_update_nonexistent_rule() {
        let store = RuleStore::new();
        let result = store.update("missing", "age > 1", parse("age > 1").unwrap());
        assert!(matches!(result, Err(RuleError::RuleNotFound(_))));
        assert!(store.is_empty());
    }

    #[test]
    fn test_add_combined() {
        let store = RuleStore::new();
        let a = add(&store, "age > 30");
        let b = add(&store, "dept = 'Sales'");

        let records = [store.get(&a).unwrap(), store.get(&b).unwrap()];
        let combined = combine_records(&records).unwrap();
        let id = store.add_combined(combined);

        let record = store.get(&id).unwrap();
        assert_eq!(record.rule_string, "Combined Rule: age > 30 + dept = 'Sales'");
        assert_eq!(record.used_attributes, vec!["age", "dept"]);
        assert_eq!(store.len(), 3);
    }

    #[test]
    fn test_list_in_creation_order() {
        let store = RuleStore::new();
        let ids: Vec<String> = (0..5).map(|i| add(&store, &format!("f{} > {}", i, i))).collect();

        let listed: Vec<String> = store.list().into_iter().map(|r| r.id).collect();
        assert_eq!(listed, ids);
    }

    #[test]
    fn test_list_order_survives_update_and_reinsert() {
        let store = RuleStore::new();
        let first = add(&store, "a > 1");
        let second = add(&store, "b > 2");
        let third = add(&store, "c > 3");

        store.update(&first, "a > 10", parse("a > 10").unwrap()).unwrap();
        store.insert(store.get(&second).unwrap());

        let listed: Vec<String> = store.list().into_iter().map(|r| r.id).collect();
        assert_eq!(listed, vec![first.clone(), second, third]);
        assert_eq!(store.get(&first).unwrap().rule_string, "a > 10");
    }

    #[test]
    fn test_concurrent_access() {
        use std::thread;

        let store = RuleStore::new();
        let store_clone = store.clone();

        let handle = thread::spawn(move || {
            for i in 0..100 {
                add(&store_clone, &format!("a{} > {}", i, i));
            }
        });

        for i in 100..200 {
            add(&store, &format!("a{} > {}", i, i));
        }

        handle.join().unwrap();

        assert_eq!(store.len(), 200);
    }
}
