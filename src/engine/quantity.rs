// ==========================================
// 种植批次规则引擎 - 数量校验器
// ==========================================
// 职责: 拆分/合并/报废/转移的数量下限(合并另有上限)
// 红线: 单位必须与规则单位完全一致, 不做单位换算
// ==========================================

use crate::config::RuleSet;
use crate::domain::{Domain, QuantityOperation, ValidationResult};
use std::sync::Arc;

#[derive(Debug, Clone)]
pub struct QuantityValidator {
    rule_set: Arc<RuleSet>,
}

impl QuantityValidator {
    pub fn new(rule_set: Arc<RuleSet>) -> Self {
        Self { rule_set }
    }

    /// 校验数量(操作名为字符串, 来自外部请求)
    ///
    /// # 返回
    /// - 未知操作 → 失败 "Unknown operation"
    /// - 其余同 validate_operation
    pub fn validate(
        &self,
        domain: Domain,
        operation: &str,
        quantity: f64,
        unit: &str,
    ) -> ValidationResult {
        match operation.parse::<QuantityOperation>() {
            Ok(op) => self.validate_operation(domain, op, quantity, unit),
            Err(e) => ValidationResult::invalid(e.to_string()),
        }
    }

    /// 校验数量
    ///
    /// # 判定顺序
    /// 1. 规则缺失 → 失败(未知操作)
    /// 2. 数量非有限数 → 失败
    /// 3. 单位不一致 → 失败
    /// 4. 低于下限 → 失败(附规则说明)
    /// 5. 高于上限(若有) → 失败
    /// 6. 通过, 附带匹配的规则
    pub fn validate_operation(
        &self,
        domain: Domain,
        operation: QuantityOperation,
        quantity: f64,
        unit: &str,
    ) -> ValidationResult {
        let Some(rule) = self.rule_set.quantity_rule(domain, operation) else {
            return ValidationResult::invalid(format!(
                "Unknown operation: no quantity rule for '{}' in {} domain",
                operation, domain
            ));
        };

        if !quantity.is_finite() {
            return ValidationResult::invalid(format!(
                "Quantity must be a finite number, got {}",
                quantity
            ));
        }

        if unit != rule.unit {
            return ValidationResult::invalid(format!(
                "Invalid unit '{}' for {}: expected '{}'",
                unit, operation, rule.unit
            ));
        }

        if quantity < rule.min_weight {
            return ValidationResult::invalid(format!(
                "Quantity {} {} is below the minimum of {} {} for {}. {}",
                quantity, unit, rule.min_weight, rule.unit, operation, rule.context_message
            ));
        }

        if let Some(max) = rule.max_weight {
            if quantity > max {
                return ValidationResult::invalid(format!(
                    "Quantity {} {} exceeds the maximum of {} {} for {}. {}",
                    quantity, unit, max, rule.unit, operation, rule.context_message
                ));
            }
        }

        ValidationResult::valid().with_rule(rule.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn validator() -> QuantityValidator {
        QuantityValidator::new(Arc::new(RuleSet::default()))
    }

    #[test]
    fn test_cannabis_merge_below_minimum() {
        let r = validator().validate(Domain::Cannabis, "merge", 0.05, "grams");
        assert!(!r.is_valid());
        assert!(r.error().unwrap().contains("below the minimum of 0.1"));
    }

    #[test]
    fn test_produce_merge_above_maximum() {
        let r = validator().validate(Domain::Produce, "merge", 1_000_000.0, "grams");
        assert!(!r.is_valid());
        assert!(r.error().unwrap().contains("907185"));
    }

    #[test]
    fn test_unit_mismatch_is_strict() {
        let r = validator().validate(Domain::Cannabis, "split", 5.0, "lbs");
        assert!(!r.is_valid());
        assert!(r.error().unwrap().contains("expected 'grams'"));

        // 大小写也必须一致
        let r = validator().validate(Domain::Cannabis, "split", 5.0, "Grams");
        assert!(!r.is_valid());
    }

    #[test]
    fn test_unknown_operation() {
        let r = validator().validate(Domain::Produce, "repackage", 10.0, "grams");
        assert!(!r.is_valid());
        assert!(r.error().unwrap().starts_with("Unknown operation"));
    }

    #[test]
    fn test_boundaries_are_inclusive() {
        let v = validator();
        assert!(v.validate(Domain::Cannabis, "waste", 0.1, "grams").is_valid());
        assert!(v.validate(Domain::Cannabis, "merge", 50_000.0, "grams").is_valid());
        assert!(!v.validate(Domain::Cannabis, "merge", 50_000.5, "grams").is_valid());
        assert!(v
            .validate_operation(Domain::Produce, QuantityOperation::Merge, 907_185.0, "grams")
            .is_valid());
    }

    #[test]
    fn test_non_finite_quantity_rejected() {
        let r = validator().validate(Domain::Produce, "waste", f64::NAN, "grams");
        assert!(!r.is_valid());
        let r = validator().validate(Domain::Produce, "waste", f64::INFINITY, "grams");
        assert!(!r.is_valid());
    }

    #[test]
    fn test_valid_quantity_attaches_rule() {
        let r = validator().validate(Domain::Produce, "transfer", 5.0, "grams");
        assert!(r.is_valid());
        let rule = r.rule().unwrap();
        assert_eq!(rule.min_weight, 5.0);
        assert_eq!(rule.max_weight, None);
        assert_eq!(rule.unit, "grams");
    }
}
