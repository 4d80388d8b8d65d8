// ==========================================
// 种植批次规则引擎 - 容量校验器
// ==========================================
// 职责: 场地株数容量 / 面积容量校验
// 红线: 超出容量为阻断; 利用率偏高仅提示
// ==========================================

use crate::config::RuleSet;
use crate::domain::{CapacityConstraint, LocationSnapshot, ValidationResult};
use std::sync::Arc;

#[derive(Debug, Clone)]
pub struct CapacityValidator {
    rule_set: Arc<RuleSet>,
}

impl CapacityValidator {
    pub fn new(rule_set: Arc<RuleSet>) -> Self {
        Self { rule_set }
    }

    /// 校验株数容量
    ///
    /// # 规则
    /// - new_total = current + additional
    /// - new_total > capacity → 阻断, available = capacity - current(已超载时为负), utilization = 100
    /// - 否则 utilization = new_total / capacity * 100
    ///   - > near_capacity_percent(90) → 提示"接近满载"
    ///   - > approaching_capacity_percent(75) → 较弱提示
    pub fn validate_plant_capacity(
        &self,
        location: &LocationSnapshot,
        additional_plants: u32,
    ) -> ValidationResult {
        let capacity = f64::from(location.capacity);
        let current = f64::from(location.current_plant_count);
        let new_total = current + f64::from(additional_plants);

        if !location.can_add_plants(additional_plants) {
            // 已超载的场地 available 为负数(超出株数)
            let available = capacity - current;
            return ValidationResult::invalid(format!(
                "Location '{}' capacity exceeded: adding {} plants would bring the total to {} (capacity {}, available {})",
                location.name, additional_plants, new_total, location.capacity, available
            ))
            .with_available_capacity(available)
            .with_utilization_percent(100.0);
        }

        let utilization = utilization_percent(new_total, capacity);
        let thresholds = self.rule_set.capacity();
        let mut result = ValidationResult::valid()
            .with_available_capacity(capacity - new_total)
            .with_utilization_percent(utilization);

        if utilization > thresholds.near_capacity_percent {
            result.push_warning(format!(
                "Location '{}' is near capacity ({:.1}% utilized)",
                location.name, utilization
            ));
        } else if utilization > thresholds.approaching_capacity_percent {
            result.push_warning(format!(
                "Location '{}' is approaching capacity ({:.1}% utilized)",
                location.name, utilization
            ));
        }

        result
    }

    /// 校验面积容量
    ///
    /// # 规则
    /// - 场地未配置面积 → 放行 + 提示(不阻断)
    /// - 新增面积非有限数或为负 → 阻断
    /// - new_used > area → 阻断
    /// - utilization > near_capacity_percent(90) → 提示
    pub fn validate_area_capacity(
        &self,
        location: &LocationSnapshot,
        additional_area: f64,
    ) -> ValidationResult {
        let Some((area, used)) = location.area_capacity() else {
            return ValidationResult::valid().with_warning(format!(
                "Area tracking is not configured for location '{}'; area capacity was not checked",
                location.name
            ));
        };

        if !additional_area.is_finite() || additional_area < 0.0 {
            return ValidationResult::invalid(format!(
                "Additional area must be a non-negative number, got {}",
                additional_area
            ));
        }

        let new_used = used + additional_area;
        if new_used > area {
            let available = (area - used).max(0.0);
            return ValidationResult::invalid(format!(
                "Location '{}' area capacity exceeded: {} sq ft requested, {} sq ft available",
                location.name, additional_area, available
            ))
            .with_available_capacity(available)
            .with_utilization_percent(100.0);
        }

        let utilization = utilization_percent(new_used, area);
        let mut result = ValidationResult::valid()
            .with_available_capacity(area - new_used)
            .with_utilization_percent(utilization);

        if utilization > self.rule_set.capacity().near_capacity_percent {
            result.push_warning(format!(
                "Location '{}' area is near capacity ({:.1}% utilized)",
                location.name, utilization
            ));
        }

        result
    }
}

/// 利用率(%); 容量为 0 时: 无占用 → 0, 有占用 → 100
fn utilization_percent(used: f64, capacity: f64) -> f64 {
    if capacity <= 0.0 {
        return if used > 0.0 { 100.0 } else { 0.0 };
    }
    used * 100.0 / capacity
}
