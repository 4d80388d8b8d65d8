// ==========================================
// 种植批次规则引擎 - 校验结论
// ==========================================
// 红线: error 存在 ⇔ is_valid = false (由构造函数保证)
// 红线: warnings 仅提示, 不影响 is_valid
// ==========================================

use crate::domain::rule::QuantityRule;
use serde::Serialize;

// ==========================================
// ValidationResult - 统一校验结论
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationResult {
    is_valid: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    warnings: Vec<String>,

    // ===== 校验器附加诊断 =====
    #[serde(skip_serializing_if = "Option::is_none")]
    available_capacity: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    utilization_percent: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    rule: Option<QuantityRule>,
    #[serde(skip_serializing_if = "Option::is_none")]
    elapsed_days: Option<i64>,
}

impl ValidationResult {
    /// 校验通过
    pub fn valid() -> Self {
        Self {
            is_valid: true,
            error: None,
            warnings: Vec::new(),
            available_capacity: None,
            utilization_percent: None,
            rule: None,
            elapsed_days: None,
        }
    }

    /// 校验失败(阻断)
    pub fn invalid(error: impl Into<String>) -> Self {
        Self {
            is_valid: false,
            error: Some(error.into()),
            ..Self::valid()
        }
    }

    pub fn with_warning(mut self, warning: impl Into<String>) -> Self {
        self.warnings.push(warning.into());
        self
    }

    pub fn with_warnings(mut self, warnings: impl IntoIterator<Item = String>) -> Self {
        self.warnings.extend(warnings);
        self
    }

    pub fn with_available_capacity(mut self, available: f64) -> Self {
        self.available_capacity = Some(available);
        self
    }

    pub fn with_utilization_percent(mut self, percent: f64) -> Self {
        self.utilization_percent = Some(percent);
        self
    }

    pub fn with_rule(mut self, rule: QuantityRule) -> Self {
        self.rule = Some(rule);
        self
    }

    pub fn with_elapsed_days(mut self, days: i64) -> Self {
        self.elapsed_days = Some(days);
        self
    }

    pub fn push_warning(&mut self, warning: impl Into<String>) {
        self.warnings.push(warning.into());
    }

    // ===== 读取 =====

    pub fn is_valid(&self) -> bool {
        self.is_valid
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn warnings(&self) -> &[String] {
        &self.warnings
    }

    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }

    pub fn available_capacity(&self) -> Option<f64> {
        self.available_capacity
    }

    pub fn utilization_percent(&self) -> Option<f64> {
        self.utilization_percent
    }

    pub fn rule(&self) -> Option<&QuantityRule> {
        self.rule.as_ref()
    }

    pub fn elapsed_days(&self) -> Option<i64> {
        self.elapsed_days
    }

    /// 合并两个校验器的结论
    ///
    /// # 规则
    /// - 任一失败 → 失败, 错误按顺序以 "; " 拼接
    /// - 警告按顺序追加
    /// - 诊断字段取先出现的值
    pub fn merge(self, other: ValidationResult) -> ValidationResult {
        let error = match (self.error, other.error) {
            (Some(a), Some(b)) => Some(format!("{}; {}", a, b)),
            (a, b) => a.or(b),
        };

        let mut warnings = self.warnings;
        warnings.extend(other.warnings);

        ValidationResult {
            is_valid: self.is_valid && other.is_valid,
            error,
            warnings,
            available_capacity: self.available_capacity.or(other.available_capacity),
            utilization_percent: self.utilization_percent.or(other.utilization_percent),
            rule: self.rule.or(other.rule),
            elapsed_days: self.elapsed_days.or(other.elapsed_days),
        }
    }

    /// 合并多个结论(空集合视为通过)
    pub fn merge_all(results: impl IntoIterator<Item = ValidationResult>) -> ValidationResult {
        results
            .into_iter()
            .fold(ValidationResult::valid(), ValidationResult::merge)
    }
}
