// ==========================================
// 种植批次规则引擎 - 规则集
// ==========================================
// 职责: 阶段目录 / 数量规则 / 时间线与容量阈值的不可变配置
// 覆写: JSON 覆写按业务域合并到内置默认值之上
// 红线: 加载完成后只读, 通过 Arc 共享
// ==========================================

use crate::config::error::{ConfigError, ConfigResult};
use crate::config::stage_tables::{
    cannabis_quantity_rules, cannabis_stages, produce_quantity_rules, produce_stages,
};
use crate::domain::{Domain, QuantityOperation, QuantityRule, StageDefinition};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};

// ==========================================
// TimelineThresholds - 时间线阈值(按业务域)
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimelineThresholds {
    /// 种植周期过短提示(天)
    pub short_cycle_days: i64,
    /// 种植周期过长提示(天)
    pub long_cycle_days: i64,
    /// 采收后超过该天数才包装 → 提示
    pub packaging_delay_warning_days: i64,
    /// 储存期已消耗比例超过该值 → 提示 (0~1)
    pub shelf_life_warning_ratio: f64,
}

impl TimelineThresholds {
    pub fn defaults_for(domain: Domain) -> Self {
        match domain {
            Domain::Cannabis => Self {
                short_cycle_days: 60,
                long_cycle_days: 180,
                packaging_delay_warning_days: 60,
                shelf_life_warning_ratio: 0.75,
            },
            Domain::Produce => Self {
                short_cycle_days: 21,
                long_cycle_days: 120,
                packaging_delay_warning_days: 60,
                shelf_life_warning_ratio: 0.75,
            },
        }
    }
}

// ==========================================
// CapacityThresholds - 容量提示阈值(%)
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CapacityThresholds {
    pub near_capacity_percent: f64,
    /// 仅株数校验使用
    pub approaching_capacity_percent: f64,
}

impl Default for CapacityThresholds {
    fn default() -> Self {
        Self {
            near_capacity_percent: 90.0,
            approaching_capacity_percent: 75.0,
        }
    }
}

// ==========================================
// CompatibilityLimits - 合并/拆分边界
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CompatibilityLimits {
    pub min_merge_batches: usize,
    pub min_split_count: u32,
    pub max_split_count: u32,
}

impl Default for CompatibilityLimits {
    fn default() -> Self {
        Self {
            min_merge_batches: 2,
            min_split_count: 2,
            max_split_count: 20,
        }
    }
}

// ==========================================
// RuleSet - 规则集
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RuleSet {
    stages: BTreeMap<Domain, Vec<StageDefinition>>,
    quantity_rules: BTreeMap<Domain, BTreeMap<QuantityOperation, QuantityRule>>,
    timeline: BTreeMap<Domain, TimelineThresholds>,
    capacity: CapacityThresholds,
    compatibility: CompatibilityLimits,
}

impl Default for RuleSet {
    fn default() -> Self {
        let mut stages = BTreeMap::new();
        stages.insert(Domain::Cannabis, cannabis_stages());
        stages.insert(Domain::Produce, produce_stages());

        let mut quantity_rules = BTreeMap::new();
        quantity_rules.insert(Domain::Cannabis, cannabis_quantity_rules());
        quantity_rules.insert(Domain::Produce, produce_quantity_rules());

        let timeline = Domain::ALL
            .iter()
            .map(|d| (*d, TimelineThresholds::defaults_for(*d)))
            .collect();

        Self {
            stages,
            quantity_rules,
            timeline,
            capacity: CapacityThresholds::default(),
            compatibility: CompatibilityLimits::default(),
        }
    }
}

/// JSON 覆写文件结构(各段均可省略)
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
struct RuleSetOverride {
    #[serde(default)]
    stages: BTreeMap<Domain, Vec<StageDefinition>>,
    #[serde(default)]
    quantity_rules: BTreeMap<Domain, BTreeMap<QuantityOperation, QuantityRule>>,
    #[serde(default)]
    timeline: BTreeMap<Domain, TimelineOverride>,
    #[serde(default)]
    capacity: Option<CapacityThresholds>,
    #[serde(default)]
    compatibility: Option<CompatibilityLimits>,
}

/// 时间线阈值覆写(缺省字段沿用该业务域当前值)
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
struct TimelineOverride {
    short_cycle_days: Option<i64>,
    long_cycle_days: Option<i64>,
    packaging_delay_warning_days: Option<i64>,
    shelf_life_warning_ratio: Option<f64>,
}

impl TimelineOverride {
    fn apply(self, base: TimelineThresholds) -> TimelineThresholds {
        TimelineThresholds {
            short_cycle_days: self.short_cycle_days.unwrap_or(base.short_cycle_days),
            long_cycle_days: self.long_cycle_days.unwrap_or(base.long_cycle_days),
            packaging_delay_warning_days: self
                .packaging_delay_warning_days
                .unwrap_or(base.packaging_delay_warning_days),
            shelf_life_warning_ratio: self
                .shelf_life_warning_ratio
                .unwrap_or(base.shelf_life_warning_ratio),
        }
    }
}

impl RuleSet {
    /// 从 JSON 覆写构建规则集
    ///
    /// # 合并口径
    /// - stages: 按业务域整体替换该域的阶段目录
    /// - quantityRules: 按 (业务域, 操作) 替换
    /// - timeline: 按业务域逐字段覆写(缺省字段取该域默认值)
    /// - capacity / compatibility: 整段替换(段内缺省字段取默认值)
    ///
    /// # 返回
    /// - Ok(RuleSet): 合并并通过一致性校验
    /// - Err(ConfigError): 解析失败或规则不一致
    pub fn from_json_str(json: &str) -> ConfigResult<Self> {
        let overrides: RuleSetOverride = serde_json::from_str(json)?;
        let mut rule_set = RuleSet::default();

        for (domain, stages) in overrides.stages {
            rule_set.stages.insert(domain, stages);
        }
        for (domain, rules) in overrides.quantity_rules {
            rule_set
                .quantity_rules
                .entry(domain)
                .or_default()
                .extend(rules);
        }
        for (domain, timeline) in overrides.timeline {
            let merged = timeline.apply(rule_set.timeline(domain));
            rule_set.timeline.insert(domain, merged);
        }
        if let Some(capacity) = overrides.capacity {
            rule_set.capacity = capacity;
        }
        if let Some(compatibility) = overrides.compatibility {
            rule_set.compatibility = compatibility;
        }

        rule_set.validate()?;
        Ok(rule_set)
    }

    /// 替换某个业务域的阶段目录(测试/定制场景)
    pub fn with_stages(mut self, domain: Domain, stages: Vec<StageDefinition>) -> Self {
        self.stages.insert(domain, stages);
        self
    }

    pub fn with_quantity_rule(
        mut self,
        domain: Domain,
        operation: QuantityOperation,
        rule: QuantityRule,
    ) -> Self {
        self.quantity_rules
            .entry(domain)
            .or_default()
            .insert(operation, rule);
        self
    }

    pub fn with_timeline(mut self, domain: Domain, thresholds: TimelineThresholds) -> Self {
        self.timeline.insert(domain, thresholds);
        self
    }

    pub fn with_capacity(mut self, capacity: CapacityThresholds) -> Self {
        self.capacity = capacity;
        self
    }

    pub fn with_compatibility(mut self, compatibility: CompatibilityLimits) -> Self {
        self.compatibility = compatibility;
        self
    }

    // ===== 查询 =====

    /// 业务域的有序阶段列表(未配置时为空)
    pub fn stages(&self, domain: Domain) -> &[StageDefinition] {
        self.stages.get(&domain).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn quantity_rule(&self, domain: Domain, operation: QuantityOperation) -> Option<&QuantityRule> {
        self.quantity_rules.get(&domain)?.get(&operation)
    }

    pub fn timeline(&self, domain: Domain) -> TimelineThresholds {
        self.timeline
            .get(&domain)
            .copied()
            .unwrap_or_else(|| TimelineThresholds::defaults_for(domain))
    }

    pub fn capacity(&self) -> CapacityThresholds {
        self.capacity
    }

    pub fn compatibility(&self) -> CompatibilityLimits {
        self.compatibility
    }

    /// 结构一致性校验
    ///
    /// # 检查项
    /// 1. 阶段ID在域内唯一
    /// 2. 前驱/后继引用的阶段存在于同一业务域
    /// 3. min_duration ≤ max_duration, 且均不为负
    /// 4. 数量规则 min ≤ max, 均为有限非负数, 单位非空
    /// 5. 阈值取值合法
    pub fn validate(&self) -> ConfigResult<()> {
        for (domain, stages) in &self.stages {
            let issues = stage_structure_issues(stages);
            if !issues.is_empty() {
                return Err(ConfigError::InconsistentCatalog {
                    domain: *domain,
                    issues,
                });
            }
        }

        for (domain, rules) in &self.quantity_rules {
            for (operation, rule) in rules {
                let key = format!("quantityRules.{}.{}", domain, operation);
                if !rule.min_weight.is_finite() || rule.min_weight < 0.0 {
                    return Err(invalid_value(key, "minWeight must be a non-negative number"));
                }
                if let Some(max) = rule.max_weight {
                    if !max.is_finite() || max < rule.min_weight {
                        return Err(invalid_value(key, "maxWeight must be >= minWeight"));
                    }
                }
                if rule.unit.trim().is_empty() {
                    return Err(invalid_value(key, "unit must not be empty"));
                }
            }
        }

        for (domain, t) in &self.timeline {
            let key = format!("timeline.{}", domain);
            if t.short_cycle_days < 0 || t.long_cycle_days < t.short_cycle_days {
                return Err(invalid_value(key, "expected 0 <= shortCycleDays <= longCycleDays"));
            }
            if t.packaging_delay_warning_days < 0 {
                return Err(invalid_value(key, "packagingDelayWarningDays must be >= 0"));
            }
            if !(0.0..=1.0).contains(&t.shelf_life_warning_ratio) {
                return Err(invalid_value(key, "shelfLifeWarningRatio must be within 0..=1"));
            }
        }

        let c = self.capacity;
        if !(0.0..=100.0).contains(&c.approaching_capacity_percent)
            || !(0.0..=100.0).contains(&c.near_capacity_percent)
            || c.approaching_capacity_percent > c.near_capacity_percent
        {
            return Err(invalid_value(
                "capacity".to_string(),
                "expected 0 <= approachingCapacityPercent <= nearCapacityPercent <= 100",
            ));
        }

        let l = self.compatibility;
        if l.min_merge_batches < 2 || l.min_split_count < 2 || l.max_split_count < l.min_split_count {
            return Err(invalid_value(
                "compatibility".to_string(),
                "expected minMergeBatches >= 2 and 2 <= minSplitCount <= maxSplitCount",
            ));
        }

        Ok(())
    }
}

fn invalid_value(key: String, message: &str) -> ConfigError {
    ConfigError::InvalidValue {
        key,
        message: message.to_string(),
    }
}

/// 单个业务域阶段目录的结构问题列表
fn stage_structure_issues(stages: &[StageDefinition]) -> Vec<String> {
    let mut issues = Vec::new();
    let mut seen = HashSet::new();

    for def in stages {
        if !seen.insert(def.stage.as_str()) {
            issues.push(format!("duplicate stage '{}'", def.stage));
        }
    }

    for def in stages {
        for next in &def.allowed_next_stages {
            if !seen.contains(next.as_str()) {
                issues.push(format!("'{}' lists unknown next stage '{}'", def.stage, next));
            }
        }
        for prev in &def.allowed_previous_stages {
            if !seen.contains(prev.as_str()) {
                issues.push(format!("'{}' lists unknown previous stage '{}'", def.stage, prev));
            }
        }
        match (def.min_duration_days, def.max_duration_days) {
            (Some(min), _) if min < 0 => {
                issues.push(format!("'{}' has negative minDurationDays", def.stage));
            }
            (Some(min), Some(max)) if min > max => {
                issues.push(format!(
                    "'{}' has minDurationDays {} > maxDurationDays {}",
                    def.stage, min, max
                ));
            }
            _ => {}
        }
    }

    issues
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_rule_set_is_valid() {
        let rules = RuleSet::default();
        assert!(rules.validate().is_ok());
        assert_eq!(rules.stages(Domain::Cannabis).len(), 9);
        assert_eq!(rules.stages(Domain::Produce).len(), 14);
        assert_eq!(rules.compatibility().max_split_count, 20);
    }

    #[test]
    fn test_empty_override_equals_default() {
        let rules = RuleSet::from_json_str("{}").unwrap();
        assert_eq!(rules, RuleSet::default());
    }

    #[test]
    fn test_partial_override_merges_per_domain() {
        let json = r#"{
            "quantityRules": {
                "produce": {
                    "waste": {"minWeight": 10, "unit": "grams", "contextMessage": "Produce waste minimum is 10 grams"}
                }
            },
            "capacity": {"nearCapacityPercent": 95},
            "compatibility": {"maxSplitCount": 10}
        }"#;

        let rules = RuleSet::from_json_str(json).unwrap();

        let waste = rules
            .quantity_rule(Domain::Produce, QuantityOperation::Waste)
            .unwrap();
        assert_eq!(waste.min_weight, 10.0);

        // 未覆写的规则保持默认
        let merge = rules
            .quantity_rule(Domain::Produce, QuantityOperation::Merge)
            .unwrap();
        assert_eq!(merge.max_weight, Some(907_185.0));
        assert_eq!(
            rules
                .quantity_rule(Domain::Cannabis, QuantityOperation::Split)
                .unwrap()
                .min_weight,
            0.1
        );

        assert_eq!(rules.capacity().near_capacity_percent, 95.0);
        assert_eq!(rules.capacity().approaching_capacity_percent, 75.0);
        assert_eq!(rules.compatibility().max_split_count, 10);
        assert_eq!(rules.compatibility().min_split_count, 2);
    }

    #[test]
    fn test_override_rejects_dangling_stage_reference() {
        let json = r#"{
            "stages": {
                "cannabis": [
                    {"stage": "propagation", "allowedNextStages": ["cloning"]},
                    {"stage": "closed"}
                ]
            }
        }"#;

        match RuleSet::from_json_str(json) {
            Err(ConfigError::InconsistentCatalog { domain, issues }) => {
                assert_eq!(domain, Domain::Cannabis);
                assert!(issues[0].contains("cloning"));
            }
            other => panic!("Expected InconsistentCatalog, got {:?}", other),
        }
    }

    #[test]
    fn test_override_rejects_unknown_section() {
        let result = RuleSet::from_json_str(r#"{"stagez": {}}"#);
        assert!(matches!(result, Err(ConfigError::ParseError(_))));
    }

    #[test]
    fn test_override_rejects_inverted_quantity_bounds() {
        let json = r#"{
            "quantityRules": {
                "cannabis": {
                    "merge": {"minWeight": 10, "maxWeight": 5, "unit": "grams", "contextMessage": "x"}
                }
            }
        }"#;
        assert!(matches!(
            RuleSet::from_json_str(json),
            Err(ConfigError::InvalidValue { .. })
        ));
    }

    #[test]
    fn test_timeline_falls_back_to_domain_defaults() {
        let rules = RuleSet::default();
        assert_eq!(rules.timeline(Domain::Produce).short_cycle_days, 21);
        assert_eq!(rules.timeline(Domain::Cannabis).long_cycle_days, 180);
    }

    #[test]
    fn test_partial_timeline_override_keeps_other_fields() {
        let rules =
            RuleSet::from_json_str(r#"{"timeline": {"produce": {"shortCycleDays": 10}}}"#).unwrap();

        let produce = rules.timeline(Domain::Produce);
        assert_eq!(produce.short_cycle_days, 10);
        assert_eq!(produce.long_cycle_days, 120);
        assert_eq!(produce.packaging_delay_warning_days, 60);
        assert_eq!(produce.shelf_life_warning_ratio, 0.75);

        // 未覆写的业务域不受影响
        assert_eq!(rules.timeline(Domain::Cannabis), TimelineThresholds::defaults_for(Domain::Cannabis));
    }
}
