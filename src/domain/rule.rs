// ==========================================
// 种植批次规则引擎 - 规则记录
// ==========================================
// 职责: 阶段定义 / 数量规则(静态配置, 加载后只读)
// ==========================================

use serde::{Deserialize, Serialize};

// ==========================================
// StageDefinition - 阶段定义
// ==========================================
// 红线: 阶段ID只在所属业务域的目录内有意义
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StageDefinition {
    pub stage: String,

    // ===== 流转关系 =====
    #[serde(default)]
    pub allowed_next_stages: Vec<String>,
    /// 前驱阶段(仅作数据保留, 流转校验不使用)
    #[serde(default)]
    pub allowed_previous_stages: Vec<String>,

    // ===== 时长约束(天, 自批次开始日起算) =====
    /// 下限: 阻断
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_duration_days: Option<i64>,
    /// 上限: 仅提示
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_duration_days: Option<i64>,

    // ===== 离开本阶段前的必填字段 =====
    #[serde(default)]
    pub required_fields: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub validation_message: Option<String>,
}

impl StageDefinition {
    pub fn new(stage: &str) -> Self {
        Self {
            stage: stage.to_string(),
            allowed_next_stages: Vec::new(),
            allowed_previous_stages: Vec::new(),
            min_duration_days: None,
            max_duration_days: None,
            required_fields: Vec::new(),
            validation_message: None,
        }
    }

    pub fn next(mut self, stages: &[&str]) -> Self {
        self.allowed_next_stages = stages.iter().map(|s| s.to_string()).collect();
        self
    }

    pub fn previous(mut self, stages: &[&str]) -> Self {
        self.allowed_previous_stages = stages.iter().map(|s| s.to_string()).collect();
        self
    }

    pub fn duration(mut self, min_days: Option<i64>, max_days: Option<i64>) -> Self {
        self.min_duration_days = min_days;
        self.max_duration_days = max_days;
        self
    }

    pub fn requires(mut self, fields: &[&str], message: &str) -> Self {
        self.required_fields = fields.iter().map(|s| s.to_string()).collect();
        self.validation_message = Some(message.to_string());
        self
    }

    pub fn allows_next(&self, stage: &str) -> bool {
        self.allowed_next_stages.iter().any(|s| s == stage)
    }

    pub fn is_terminal(&self) -> bool {
        self.allowed_next_stages.is_empty()
    }
}

// ==========================================
// QuantityRule - 数量规则
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuantityRule {
    pub min_weight: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_weight: Option<f64>,
    pub unit: String,
    pub context_message: String,
}
