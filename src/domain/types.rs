// ==========================================
// 种植批次规则引擎 - 领域类型定义
// ==========================================
// 职责: 业务域、批次状态、隔离状态、数量操作类型
// 红线: 两个业务域的规则互不混用
// ==========================================

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

// ==========================================
// 业务域 (Domain)
// ==========================================
// 红线: 所有规则表都按业务域索引, 单次校验不得跨域
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Domain {
    Cannabis, // 大麻(受监管追溯)
    Produce,  // 普通农产品
}

impl Domain {
    /// 全部业务域(固定顺序)
    pub const ALL: [Domain; 2] = [Domain::Cannabis, Domain::Produce];

    pub fn as_str(&self) -> &'static str {
        match self {
            Domain::Cannabis => "cannabis",
            Domain::Produce => "produce",
        }
    }
}

impl fmt::Display for Domain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// 业务域解析失败
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Unknown domain: {0}")]
pub struct UnknownDomain(pub String);

impl FromStr for Domain {
    type Err = UnknownDomain;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "cannabis" => Ok(Domain::Cannabis),
            "produce" => Ok(Domain::Produce),
            other => Err(UnknownDomain(other.to_string())),
        }
    }
}

// ==========================================
// 批次状态 (Batch Status)
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BatchStatus {
    #[default]
    Active,      // 在产
    Quarantined, // 隔离中
    Completed,   // 已完成
    Closed,      // 已关闭
}

impl fmt::Display for BatchStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BatchStatus::Active => write!(f, "active"),
            BatchStatus::Quarantined => write!(f, "quarantined"),
            BatchStatus::Completed => write!(f, "completed"),
            BatchStatus::Closed => write!(f, "closed"),
        }
    }
}

// ==========================================
// 隔离状态 (Quarantine Status)
// ==========================================
// 红线: 隔离中的批次禁止合并/拆分/转移
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QuarantineStatus {
    #[default]
    None,        // 未隔离
    Quarantined, // 隔离中
    Released,    // 已解除
}

impl fmt::Display for QuarantineStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QuarantineStatus::None => write!(f, "none"),
            QuarantineStatus::Quarantined => write!(f, "quarantined"),
            QuarantineStatus::Released => write!(f, "released"),
        }
    }
}

// ==========================================
// 数量操作类型 (Quantity Operation)
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QuantityOperation {
    Split,    // 拆分
    Merge,    // 合并
    Waste,    // 报废
    Transfer, // 转移
}

impl QuantityOperation {
    pub const ALL: [QuantityOperation; 4] = [
        QuantityOperation::Split,
        QuantityOperation::Merge,
        QuantityOperation::Waste,
        QuantityOperation::Transfer,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            QuantityOperation::Split => "split",
            QuantityOperation::Merge => "merge",
            QuantityOperation::Waste => "waste",
            QuantityOperation::Transfer => "transfer",
        }
    }
}

impl fmt::Display for QuantityOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// 数量操作解析失败
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Unknown operation: {0}")]
pub struct UnknownOperation(pub String);

impl FromStr for QuantityOperation {
    type Err = UnknownOperation;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "split" => Ok(QuantityOperation::Split),
            "merge" => Ok(QuantityOperation::Merge),
            "waste" => Ok(QuantityOperation::Waste),
            "transfer" => Ok(QuantityOperation::Transfer),
            _ => Err(UnknownOperation(s.to_string())),
        }
    }
}
