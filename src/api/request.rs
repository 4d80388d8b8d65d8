// ==========================================
// 种植批次规则引擎 - 操作请求
// ==========================================
// 职责: 调用方提交的"拟执行操作"(JSON, 以 operation 字段区分)
// 红线: 请求只描述意图, 不携带任何规则; 规则一律来自 RuleSet
// ==========================================

use crate::api::error::{ApiError, ApiResult};
use crate::domain::dates::{deserialize_iso_date, deserialize_opt_iso_date};
use crate::domain::{parse_iso_date, BatchSnapshot, Domain, LocationSnapshot};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// 顶层日期字段(解析前预检, 以便给出字段级错误)
const DATE_FIELDS: [&str; 5] = [
    "harvestDate",
    "startDate",
    "packagingDate",
    "entryDate",
    "currentDate",
];

fn default_unit() -> String {
    "grams".to_string()
}

// ==========================================
// OperationRequest - 拟执行操作
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "operation", rename_all = "camelCase")]
pub enum OperationRequest {
    /// 阶段流转
    #[serde(rename_all = "camelCase")]
    StageTransition {
        domain: Domain,
        current_stage: String,
        next_stage: String,
        #[serde(default)]
        batch: Option<BatchSnapshot>,
    },

    /// 拆分: 拆分合法性 + 拆出数量(可选)
    #[serde(rename_all = "camelCase")]
    Split {
        batch: BatchSnapshot,
        split_count: u32,
        #[serde(default)]
        quantity: Option<f64>,
        #[serde(default = "default_unit")]
        unit: String,
    },

    /// 合并: 合并兼容性 + 合并总量(提供各批次数量时)
    #[serde(rename_all = "camelCase")]
    Merge {
        batches: Vec<BatchSnapshot>,
        #[serde(default)]
        quantities: Vec<f64>,
        #[serde(default = "default_unit")]
        unit: String,
    },

    /// 报废
    #[serde(rename_all = "camelCase")]
    Waste {
        batch: BatchSnapshot,
        quantity: f64,
        #[serde(default = "default_unit")]
        unit: String,
    },

    /// 转移: 数量(可选) + 隔离检查 + 目标场地容量(可选)
    #[serde(rename_all = "camelCase")]
    Transfer {
        batch: BatchSnapshot,
        #[serde(default)]
        quantity: Option<f64>,
        #[serde(default = "default_unit")]
        unit: String,
        #[serde(default)]
        destination: Option<LocationSnapshot>,
    },

    /// 场地加株
    #[serde(rename_all = "camelCase")]
    AddPlants {
        location: LocationSnapshot,
        plant_count: u32,
        #[serde(default)]
        area: Option<f64>,
    },

    /// 采收日期
    #[serde(rename_all = "camelCase")]
    HarvestDate {
        domain: Domain,
        #[serde(deserialize_with = "deserialize_iso_date")]
        harvest_date: NaiveDate,
        #[serde(default, deserialize_with = "deserialize_opt_iso_date")]
        start_date: Option<NaiveDate>,
    },

    /// 包装日期
    #[serde(rename_all = "camelCase")]
    PackagingDate {
        domain: Domain,
        #[serde(deserialize_with = "deserialize_iso_date")]
        packaging_date: NaiveDate,
        #[serde(default, deserialize_with = "deserialize_opt_iso_date")]
        harvest_date: Option<NaiveDate>,
    },

    /// 储存时长(currentDate 缺省为今天)
    #[serde(rename_all = "camelCase")]
    Storage {
        domain: Domain,
        #[serde(deserialize_with = "deserialize_iso_date")]
        entry_date: NaiveDate,
        #[serde(default, deserialize_with = "deserialize_opt_iso_date")]
        current_date: Option<NaiveDate>,
        max_shelf_life_days: i64,
    },
}

impl OperationRequest {
    /// 从 JSON 文本解析请求
    ///
    /// # 错误
    /// - 顶层 domain 不可识别 → ApiError::UnknownDomain
    /// - 顶层日期字段不是 ISO-8601 → ApiError::InvalidDate
    /// - 其余结构问题 → ApiError::InvalidInput
    pub fn from_json(json: &str) -> ApiResult<Self> {
        let value: Value = serde_json::from_str(json)?;
        precheck(&value)?;
        Ok(serde_json::from_value(value)?)
    }

    /// 操作名(与 JSON 中的 operation 一致, 用于日志)
    pub fn kind(&self) -> &'static str {
        match self {
            OperationRequest::StageTransition { .. } => "stageTransition",
            OperationRequest::Split { .. } => "split",
            OperationRequest::Merge { .. } => "merge",
            OperationRequest::Waste { .. } => "waste",
            OperationRequest::Transfer { .. } => "transfer",
            OperationRequest::AddPlants { .. } => "addPlants",
            OperationRequest::HarvestDate { .. } => "harvestDate",
            OperationRequest::PackagingDate { .. } => "packagingDate",
            OperationRequest::Storage { .. } => "storage",
        }
    }

    /// 请求涉及的业务域(场地加株不区分业务域; 合并取第一个批次)
    pub fn domain(&self) -> Option<Domain> {
        match self {
            OperationRequest::StageTransition { domain, .. }
            | OperationRequest::HarvestDate { domain, .. }
            | OperationRequest::PackagingDate { domain, .. }
            | OperationRequest::Storage { domain, .. } => Some(*domain),
            OperationRequest::Split { batch, .. }
            | OperationRequest::Waste { batch, .. }
            | OperationRequest::Transfer { batch, .. } => Some(batch.domain_type),
            OperationRequest::Merge { batches, .. } => batches.first().map(|b| b.domain_type),
            OperationRequest::AddPlants { .. } => None,
        }
    }
}

fn precheck(value: &Value) -> ApiResult<()> {
    let Some(object) = value.as_object() else {
        return Err(ApiError::InvalidInput(
            "request must be a JSON object".to_string(),
        ));
    };

    if let Some(Value::String(raw)) = object.get("domain") {
        raw.parse::<Domain>()?;
    }

    for field in DATE_FIELDS {
        if let Some(Value::String(raw)) = object.get(field) {
            if !raw.trim().is_empty() && parse_iso_date(raw).is_err() {
                return Err(ApiError::InvalidDate {
                    field: field.to_string(),
                    value: raw.clone(),
                });
            }
        }
    }

    Ok(())
}
