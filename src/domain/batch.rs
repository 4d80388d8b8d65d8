// ==========================================
// 种植批次规则引擎 - 批次快照
// ==========================================
// 职责: 校验所需的批次最小投影(只读)
// 红线: 校验器只读快照, 不修改快照
// ==========================================

use crate::domain::dates::deserialize_opt_iso_date;
use crate::domain::types::{BatchStatus, Domain, QuarantineStatus};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

// ==========================================
// BatchSnapshot - 批次快照
// ==========================================
// 用途: 阶段流转/合并/拆分校验的输入
// 扩展字段: 未建模的字段(如 harvestDate / metrcPackageTag)放在 fields 中,
//           由阶段的 requiredFields 按名称引用
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchSnapshot {
    // ===== 标识 =====
    pub id: String,
    pub domain_type: Domain,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cultivar_id: Option<String>,

    // ===== 生命周期 =====
    pub stage: String,
    #[serde(default)]
    pub status: BatchStatus,
    #[serde(default)]
    pub quarantine_status: QuarantineStatus,
    #[serde(
        default,
        deserialize_with = "deserialize_opt_iso_date",
        skip_serializing_if = "Option::is_none"
    )]
    pub start_date: Option<NaiveDate>,

    // ===== 数量 =====
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub plant_count: Option<u32>,

    // ===== 扩展字段 =====
    #[serde(flatten)]
    pub fields: BTreeMap<String, Value>,
}

impl BatchSnapshot {
    /// 创建最小批次快照(其余字段为空)
    pub fn new(id: impl Into<String>, domain_type: Domain, stage: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            domain_type,
            cultivar_id: None,
            stage: stage.into(),
            status: BatchStatus::Active,
            quarantine_status: QuarantineStatus::None,
            start_date: None,
            plant_count: None,
            fields: BTreeMap::new(),
        }
    }

    pub fn with_cultivar(mut self, cultivar_id: impl Into<String>) -> Self {
        self.cultivar_id = Some(cultivar_id.into());
        self
    }

    pub fn with_start_date(mut self, start_date: NaiveDate) -> Self {
        self.start_date = Some(start_date);
        self
    }

    pub fn with_plant_count(mut self, plant_count: u32) -> Self {
        self.plant_count = Some(plant_count);
        self
    }

    pub fn with_status(mut self, status: BatchStatus) -> Self {
        self.status = status;
        self
    }

    pub fn with_quarantine(mut self, quarantine_status: QuarantineStatus) -> Self {
        self.quarantine_status = quarantine_status;
        self
    }

    pub fn with_field(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.fields.insert(name.into(), value.into());
        self
    }

    /// 隔离中: 隔离状态为 quarantined, 或批次状态本身为 quarantined
    pub fn is_quarantined(&self) -> bool {
        self.quarantine_status == QuarantineStatus::Quarantined
            || self.status == BatchStatus::Quarantined
    }

    /// 按字段名读取值(建模字段优先, 其次扩展字段)
    ///
    /// # 参数
    /// - name: camelCase 字段名(与序列化名一致)
    pub fn field_value(&self, name: &str) -> Option<Value> {
        match name {
            "id" => Some(Value::String(self.id.clone())),
            "domainType" => Some(Value::String(self.domain_type.to_string())),
            "cultivarId" => self.cultivar_id.clone().map(Value::String),
            "stage" => Some(Value::String(self.stage.clone())),
            "status" => Some(Value::String(self.status.to_string())),
            "quarantineStatus" => Some(Value::String(self.quarantine_status.to_string())),
            "startDate" => self.start_date.map(|d| Value::String(d.to_string())),
            "plantCount" => self.plant_count.map(Value::from),
            _ => self.fields.get(name).cloned(),
        }
    }

    /// 字段是否"有值"
    ///
    /// # 规则
    /// - 缺失 / null / false / 0 / 空字符串 → 视为缺失
    /// - 数组与对象(即使为空) → 视为有值
    pub fn has_field(&self, name: &str) -> bool {
        self.field_value(name).as_ref().is_some_and(is_truthy)
    }
}

/// 值的真值判定(与上游表单层口径一致)
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|v| v != 0.0 && !v.is_nan()),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}
