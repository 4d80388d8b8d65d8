// ==========================================
// 种植批次规则引擎 - 阶段流转校验器
// ==========================================
// 职责: 判定批次能否从当前阶段流转到目标阶段
// 红线: 无状态、无副作用; "今天"由调用方传入
// ==========================================

use crate::domain::{BatchSnapshot, Domain, ValidationResult};
use crate::engine::clock::days_between;
use crate::engine::stage_catalog::StageCatalog;
use chrono::NaiveDate;

// ==========================================
// StageTransitionValidator
// ==========================================
#[derive(Debug, Clone)]
pub struct StageTransitionValidator {
    catalog: StageCatalog,
}

impl StageTransitionValidator {
    pub fn new(catalog: StageCatalog) -> Self {
        Self { catalog }
    }

    pub fn catalog(&self) -> &StageCatalog {
        &self.catalog
    }

    /// 校验阶段流转
    ///
    /// # 判定顺序
    /// 1. 当前阶段无规则 → 放行 + 提示(自定义阶段不阻断操作员)
    /// 2. 目标阶段 ∉ allowed_next_stages → 阻断(优先于后续检查)
    /// 3. 提供批次快照时, 当前阶段的必填字段缺失 → 阻断(一次列出全部缺失字段)
    /// 4. 有开始日期时计算已进行天数:
    ///    - < min_duration_days → 阻断
    ///    - > max_duration_days → 仅提示
    ///
    /// # 参数
    /// - domain: 业务域
    /// - current_stage / next_stage: 阶段ID
    /// - batch: 批次快照(可选)
    /// - today: 当前日期
    pub fn validate(
        &self,
        domain: Domain,
        current_stage: &str,
        next_stage: &str,
        batch: Option<&BatchSnapshot>,
        today: NaiveDate,
    ) -> ValidationResult {
        // 规则 1: 无规则放行
        let Some(rule) = self.catalog.stage(domain, current_stage) else {
            return ValidationResult::valid().with_warning(format!(
                "No rules defined for this stage ('{}' in {} domain); transition allowed without checks",
                current_stage, domain
            ));
        };

        // 规则 2: 流转合法性
        if !rule.allows_next(next_stage) {
            let allowed = if rule.is_terminal() {
                "none (terminal stage)".to_string()
            } else {
                rule.allowed_next_stages.join(", ")
            };
            return ValidationResult::invalid(format!(
                "Invalid transition from '{}' to '{}'. Allowed next stages: {}",
                current_stage, next_stage, allowed
            ));
        }

        let Some(batch) = batch else {
            return ValidationResult::valid();
        };

        // 规则 3: 必填字段
        let missing: Vec<&str> = rule
            .required_fields
            .iter()
            .filter(|field| !batch.has_field(field))
            .map(String::as_str)
            .collect();

        if !missing.is_empty() {
            let mut error = format!(
                "Missing required fields for transition from '{}' to '{}': {}",
                current_stage,
                next_stage,
                missing.join(", ")
            );
            if let Some(message) = &rule.validation_message {
                error.push_str(". ");
                error.push_str(message);
            }
            return ValidationResult::invalid(error);
        }

        // 规则 4: 时长约束
        let Some(start_date) = batch.start_date else {
            return ValidationResult::valid();
        };
        let elapsed = days_between(start_date, today);

        if let Some(min) = rule.min_duration_days {
            if elapsed < min {
                return ValidationResult::invalid(format!(
                    "Batch has been active for {} days; at least {} days are required before leaving '{}'",
                    elapsed, min, current_stage
                ))
                .with_elapsed_days(elapsed);
            }
        }

        let mut result = ValidationResult::valid().with_elapsed_days(elapsed);
        if let Some(max) = rule.max_duration_days {
            if elapsed > max {
                result.push_warning(format!(
                    "Batch has been active for {} days, exceeding the recommended maximum of {} days for '{}'",
                    elapsed, max, current_stage
                ));
            }
        }

        result
    }
}
