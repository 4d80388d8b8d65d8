// ==========================================
// 种植批次规则引擎 - API层错误类型
// ==========================================
// 职责: 定义API层错误类型(非法输入 / 未知业务域 / 非法日期 / 配置错误)
// 红线: 规则违反不是错误, 一律以 ValidationResult 返回;
//       这里只承载"无法形成校验结论"的基础设施问题
// ==========================================

use crate::config::ConfigError;
use crate::domain::{UnknownDomain, ValidationResult};
use thiserror::Error;

/// API层错误类型
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("无效输入: {0}")]
    InvalidInput(String),

    #[error("未知业务域: {0}")]
    UnknownDomain(#[from] UnknownDomain),

    #[error("无效日期: field={field}, value={value}")]
    InvalidDate { field: String, value: String },

    #[error("配置错误: {0}")]
    Config(#[from] ConfigError),
}

impl From<serde_json::Error> for ApiError {
    fn from(err: serde_json::Error) -> Self {
        ApiError::InvalidInput(err.to_string())
    }
}

impl ApiError {
    /// 转为校验结论(用于"解析失败也要给出结论"的入口)
    pub fn into_verdict(self) -> ValidationResult {
        let message = match self {
            ApiError::InvalidInput(msg) => format!("Invalid request: {}", msg),
            ApiError::UnknownDomain(e) => e.to_string(),
            ApiError::InvalidDate { field, value } => {
                format!("Invalid date for '{}': '{}' is not an ISO-8601 date", field, value)
            }
            ApiError::Config(e) => format!("Rule configuration error: {}", e),
        };
        ValidationResult::invalid(message)
    }
}

/// Result 类型别名
pub type ApiResult<T> = Result<T, ApiError>;
