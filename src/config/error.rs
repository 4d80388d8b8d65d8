// ==========================================
// 种植批次规则引擎 - 配置层错误类型
// ==========================================
// 工具: thiserror 派生宏
// ==========================================

use crate::domain::Domain;
use thiserror::Error;

/// 配置层错误类型
#[derive(Error, Debug)]
pub enum ConfigError {
    // ===== 文件相关错误 =====
    #[error("规则文件不存在: {0}")]
    FileNotFound(String),

    #[error("规则文件读取失败 ({path}): {source}")]
    FileReadError {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("规则文件解析失败: {0}")]
    ParseError(#[from] serde_json::Error),

    // ===== 规则一致性错误 =====
    #[error("阶段目录不一致 (domain={domain}): {}", .issues.join("; "))]
    InconsistentCatalog { domain: Domain, issues: Vec<String> },

    #[error("规则值非法 (key: {key}): {message}")]
    InvalidValue { key: String, message: String },
}

/// Result 类型别名
pub type ConfigResult<T> = Result<T, ConfigError>;
