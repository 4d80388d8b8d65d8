// ==========================================
// 种植批次规则引擎 - 批次兼容性校验器
// ==========================================
// 职责: 合并兼容性(业务域/品种/阶段/隔离) + 拆分合法性
// 红线: 跨业务域合并一律禁止; 隔离批次不得合并/拆分
// ==========================================

use crate::config::RuleSet;
use crate::domain::{BatchSnapshot, BatchStatus, ValidationResult};
use std::collections::BTreeSet;
use std::sync::Arc;

#[derive(Debug, Clone)]
pub struct CompatibilityValidator {
    rule_set: Arc<RuleSet>,
}

impl CompatibilityValidator {
    pub fn new(rule_set: Arc<RuleSet>) -> Self {
        Self { rule_set }
    }

    /// 校验合并兼容性
    ///
    /// # 判定顺序
    /// 1. 批次数 < 2 → 阻断
    /// 2. 业务域不一致 → 阻断
    /// 3. 品种不一致 → 阻断
    /// 4. 阶段不一致 → 阻断(列出各阶段)
    /// 5. 存在隔离批次 → 阻断(给出数量)
    /// 6. 开始日期不一致 → 仅提示
    pub fn validate_merge(&self, batches: &[BatchSnapshot]) -> ValidationResult {
        let min_batches = self.rule_set.compatibility().min_merge_batches;
        if batches.len() < min_batches {
            return ValidationResult::invalid(format!(
                "Merge requires at least {} batches, got {}",
                min_batches,
                batches.len()
            ));
        }

        let Some(first) = batches.first() else {
            return ValidationResult::invalid("Merge requires at least one batch, got none");
        };

        if batches.iter().any(|b| b.domain_type != first.domain_type) {
            let domains: BTreeSet<String> =
                batches.iter().map(|b| b.domain_type.to_string()).collect();
            return ValidationResult::invalid(format!(
                "Cannot merge batches across domains ({}); cross-domain merges are not allowed",
                join(&domains)
            ));
        }

        if batches.iter().any(|b| b.cultivar_id != first.cultivar_id) {
            let cultivars: BTreeSet<String> = batches
                .iter()
                .map(|b| b.cultivar_id.clone().unwrap_or_else(|| "(none)".to_string()))
                .collect();
            return ValidationResult::invalid(format!(
                "Cannot merge batches with different cultivars ({}); all batches must share the same cultivar",
                join(&cultivars)
            ));
        }

        if batches.iter().any(|b| b.stage != first.stage) {
            let stages: BTreeSet<String> = batches.iter().map(|b| b.stage.clone()).collect();
            return ValidationResult::invalid(format!(
                "Cannot merge batches in different stages ({}); all batches must be in the same stage",
                join(&stages)
            ));
        }

        let quarantined = batches.iter().filter(|b| b.is_quarantined()).count();
        if quarantined > 0 {
            return ValidationResult::invalid(format!(
                "Cannot merge: {} batch(es) are under quarantine; release quarantine before merging",
                quarantined
            ));
        }

        let start_dates: BTreeSet<_> = batches.iter().map(|b| b.start_date).collect();
        if start_dates.len() > 1 {
            return ValidationResult::valid().with_warning(format!(
                "Batches have {} different start dates; merging may mix plants of different ages",
                start_dates.len()
            ));
        }

        ValidationResult::valid()
    }

    /// 校验拆分
    ///
    /// # 判定顺序
    /// 1. split_count < 2 → 阻断
    /// 2. split_count > 20 → 阻断(需分多次拆分)
    /// 3. 隔离批次 → 阻断
    /// 4. 已关闭批次 → 阻断
    pub fn validate_split(&self, batch: &BatchSnapshot, split_count: u32) -> ValidationResult {
        let limits = self.rule_set.compatibility();

        if split_count < limits.min_split_count {
            return ValidationResult::invalid(format!(
                "Split count must be at least {}, got {}",
                limits.min_split_count, split_count
            ));
        }

        if split_count > limits.max_split_count {
            return ValidationResult::invalid(format!(
                "Cannot split into more than {} batches at once (requested {}); perform multiple split operations instead",
                limits.max_split_count, split_count
            ));
        }

        if batch.is_quarantined() {
            return ValidationResult::invalid(format!(
                "Cannot split quarantined batch '{}'; release quarantine first",
                batch.id
            ));
        }

        if batch.status == BatchStatus::Closed {
            return ValidationResult::invalid(format!("Cannot split closed batch '{}'", batch.id));
        }

        ValidationResult::valid()
    }
}

fn join(values: &BTreeSet<String>) -> String {
    values.iter().cloned().collect::<Vec<_>>().join(", ")
}
