// ==========================================
// 种植批次规则引擎 - 日期/时间线校验器
// ==========================================
// 职责: 采收日期、包装日期、储存时长的合理性
// 红线: "晚于今天"与"早于前置日期"为阻断, 其余一律仅提示
// ==========================================

use crate::config::RuleSet;
use crate::domain::{Domain, ValidationResult};
use crate::engine::clock::days_between;
use chrono::NaiveDate;
use std::sync::Arc;

#[derive(Debug, Clone)]
pub struct TimelineValidator {
    rule_set: Arc<RuleSet>,
}

impl TimelineValidator {
    pub fn new(rule_set: Arc<RuleSet>) -> Self {
        Self { rule_set }
    }

    /// 校验采收日期
    ///
    /// # 规则
    /// 1. harvest_date > today → 阻断
    /// 2. harvest_date < start_date → 阻断
    /// 3. 周期 < short_cycle_days → 提示; 周期 > long_cycle_days → 提示
    pub fn validate_harvest_date(
        &self,
        domain: Domain,
        harvest_date: NaiveDate,
        start_date: Option<NaiveDate>,
        today: NaiveDate,
    ) -> ValidationResult {
        if harvest_date > today {
            return ValidationResult::invalid(format!(
                "Harvest date {} cannot be in the future (today is {})",
                harvest_date, today
            ));
        }

        let Some(start_date) = start_date else {
            return ValidationResult::valid();
        };

        if harvest_date < start_date {
            return ValidationResult::invalid(format!(
                "Harvest date {} cannot be before the batch start date {}",
                harvest_date, start_date
            ));
        }

        let thresholds = self.rule_set.timeline(domain);
        let cycle_days = days_between(start_date, harvest_date);
        let mut result = ValidationResult::valid().with_elapsed_days(cycle_days);

        if cycle_days < thresholds.short_cycle_days {
            result.push_warning(format!(
                "Unusually short {} cycle: {} days from start to harvest (typically at least {} days)",
                domain, cycle_days, thresholds.short_cycle_days
            ));
        } else if cycle_days > thresholds.long_cycle_days {
            result.push_warning(format!(
                "Unusually long {} cycle: {} days from start to harvest (typically at most {} days)",
                domain, cycle_days, thresholds.long_cycle_days
            ));
        }

        result
    }

    /// 校验包装日期
    ///
    /// # 规则
    /// 1. packaging_date > today → 阻断
    /// 2. 提供采收日期且 packaging_date < harvest_date → 阻断
    /// 3. 采收后超过 packaging_delay_warning_days 才包装 → 提示
    pub fn validate_packaging_date(
        &self,
        domain: Domain,
        packaging_date: NaiveDate,
        harvest_date: Option<NaiveDate>,
        today: NaiveDate,
    ) -> ValidationResult {
        if packaging_date > today {
            return ValidationResult::invalid(format!(
                "Packaging date {} cannot be in the future (today is {})",
                packaging_date, today
            ));
        }

        let Some(harvest_date) = harvest_date else {
            return ValidationResult::valid();
        };

        if packaging_date < harvest_date {
            return ValidationResult::invalid(format!(
                "Packaging date {} cannot be before the harvest date {}",
                packaging_date, harvest_date
            ));
        }

        let delay_days = days_between(harvest_date, packaging_date);
        let limit = self.rule_set.timeline(domain).packaging_delay_warning_days;
        let mut result = ValidationResult::valid().with_elapsed_days(delay_days);

        if delay_days > limit {
            result.push_warning(format!(
                "Packaging {} days after harvest exceeds {} days; verify product quality",
                delay_days, limit
            ));
        }

        result
    }

    /// 校验储存时长
    ///
    /// # 规则
    /// 1. max_shelf_life_days <= 0 → 阻断(输入非法)
    /// 2. entry_date > current_date → 阻断
    /// 3. 已储存天数 > max_shelf_life_days → 阻断
    /// 4. 已消耗比例 > shelf_life_warning_ratio → 提示
    pub fn validate_storage_duration(
        &self,
        domain: Domain,
        entry_date: NaiveDate,
        current_date: NaiveDate,
        max_shelf_life_days: i64,
    ) -> ValidationResult {
        if max_shelf_life_days <= 0 {
            return ValidationResult::invalid(format!(
                "Max shelf life must be a positive number of days, got {}",
                max_shelf_life_days
            ));
        }

        if entry_date > current_date {
            return ValidationResult::invalid(format!(
                "Storage entry date {} cannot be in the future (reference date is {})",
                entry_date, current_date
            ));
        }

        let stored_days = days_between(entry_date, current_date);
        if stored_days > max_shelf_life_days {
            return ValidationResult::invalid(format!(
                "Storage duration of {} days exceeds the maximum shelf life of {} days",
                stored_days, max_shelf_life_days
            ))
            .with_elapsed_days(stored_days);
        }

        let ratio = self.rule_set.timeline(domain).shelf_life_warning_ratio;
        let consumed = stored_days as f64 / max_shelf_life_days as f64;
        let mut result = ValidationResult::valid().with_elapsed_days(stored_days);

        if consumed > ratio {
            result.push_warning(format!(
                "{:.0}% of shelf life consumed ({} of {} days); prioritise this product",
                consumed * 100.0,
                stored_days,
                max_shelf_life_days
            ));
        }

        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn validator() -> TimelineValidator {
        TimelineValidator::new(Arc::new(RuleSet::default()))
    }

    #[test]
    fn test_harvest_in_future_blocks() {
        let r = validator().validate_harvest_date(
            Domain::Cannabis,
            d(2026, 7, 2),
            Some(d(2026, 3, 1)),
            d(2026, 7, 1),
        );
        assert!(!r.is_valid());
        assert!(r.error().unwrap().contains("future"));
    }

    #[test]
    fn test_harvest_before_start_blocks() {
        let r = validator().validate_harvest_date(
            Domain::Produce,
            d(2026, 2, 27),
            Some(d(2026, 3, 1)),
            d(2026, 7, 1),
        );
        assert!(!r.is_valid());
        assert!(r.error().unwrap().contains("before the batch start date"));
    }

    #[test]
    fn test_harvest_cycle_warnings_are_domain_specific() {
        let v = validator();
        let start = d(2026, 1, 1);

        // 40 天: 大麻过短, 农产品正常
        let harvest = d(2026, 2, 10);
        let r = v.validate_harvest_date(Domain::Cannabis, harvest, Some(start), d(2026, 12, 31));
        assert!(r.is_valid());
        assert!(r.warnings()[0].contains("Unusually short cannabis cycle"));
        assert_eq!(r.elapsed_days(), Some(40));

        let r = v.validate_harvest_date(Domain::Produce, harvest, Some(start), d(2026, 12, 31));
        assert!(r.is_valid());
        assert!(!r.has_warnings());

        // 150 天: 农产品过长, 大麻正常
        let harvest = d(2026, 5, 31);
        let r = v.validate_harvest_date(Domain::Produce, harvest, Some(start), d(2026, 12, 31));
        assert!(r.warnings()[0].contains("Unusually long produce cycle"));
        let r = v.validate_harvest_date(Domain::Cannabis, harvest, Some(start), d(2026, 12, 31));
        assert!(!r.has_warnings());
    }

    #[test]
    fn test_packaging_before_harvest_blocks() {
        let r = validator().validate_packaging_date(
            Domain::Cannabis,
            d(2026, 5, 1),
            Some(d(2026, 5, 2)),
            d(2026, 6, 1),
        );
        assert!(!r.is_valid());
        assert!(r.error().unwrap().contains("before the harvest date"));
    }

    #[test]
    fn test_packaging_late_warns() {
        let r = validator().validate_packaging_date(
            Domain::Produce,
            d(2026, 4, 1),
            Some(d(2026, 1, 1)),
            d(2026, 6, 1),
        );
        assert!(r.is_valid());
        assert!(r.warnings()[0].contains("90 days after harvest"));

        // 恰好 60 天不提示
        let r = validator().validate_packaging_date(
            Domain::Produce,
            d(2026, 3, 2),
            Some(d(2026, 1, 1)),
            d(2026, 6, 1),
        );
        assert_eq!(r.elapsed_days(), Some(60));
        assert!(!r.has_warnings());
    }

    #[test]
    fn test_packaging_in_future_blocks() {
        let r = validator().validate_packaging_date(Domain::Produce, d(2026, 6, 2), None, d(2026, 6, 1));
        assert!(!r.is_valid());
    }

    #[test]
    fn test_storage_expired_blocks() {
        let r = validator().validate_storage_duration(Domain::Produce, d(2026, 1, 1), d(2026, 1, 12), 10);
        assert!(!r.is_valid());
        assert!(r.error().unwrap().contains("11 days exceeds"));
    }

    #[test]
    fn test_storage_near_end_of_shelf_life_warns() {
        let v = validator();
        let r = v.validate_storage_duration(Domain::Produce, d(2026, 1, 1), d(2026, 1, 9), 10);
        assert!(r.is_valid());
        assert!(r.warnings()[0].starts_with("80% of shelf life consumed"));

        // 75% 不提示(需超过)
        let r = v.validate_storage_duration(Domain::Cannabis, d(2026, 1, 1), d(2026, 1, 31), 40);
        assert!(r.is_valid());
        assert!(!r.has_warnings());
    }

    #[test]
    fn test_storage_rejects_bad_input() {
        let v = validator();
        assert!(!v
            .validate_storage_duration(Domain::Produce, d(2026, 1, 1), d(2026, 1, 2), 0)
            .is_valid());
        assert!(!v
            .validate_storage_duration(Domain::Produce, d(2026, 1, 5), d(2026, 1, 2), 10)
            .is_valid());
    }
}
