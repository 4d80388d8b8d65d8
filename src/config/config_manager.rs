// ==========================================
// 种植批次规则引擎 - 配置管理器
// ==========================================
// 职责: 规则文件定位、加载、缺省回退
// 存储: JSON 规则文件(可选), 否则使用内置规则表
// ==========================================

use crate::config::error::{ConfigError, ConfigResult};
use crate::config::rule_set::RuleSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;

// ==========================================
// 配置键(环境变量 / 目录名)
// ==========================================
pub mod config_keys {
    /// 显式指定规则文件路径
    pub const RULES_PATH_ENV: &str = "CULTIVATION_RULES_PATH";
    /// 日志输出格式(text/json)
    pub const LOG_FORMAT_ENV: &str = "CULTIVATION_LOG_FORMAT";
    /// 用户配置目录下的子目录名
    pub const CONFIG_DIR_NAME: &str = "cultivation-batch-rules";
    /// 规则文件名
    pub const RULES_FILE_NAME: &str = "rules.json";
}

// ==========================================
// RuleSource - 规则来源(用于日志可追溯)
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RuleSource {
    BuiltIn,
    File(PathBuf),
}

impl std::fmt::Display for RuleSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RuleSource::BuiltIn => write!(f, "built-in"),
            RuleSource::File(path) => write!(f, "{}", path.display()),
        }
    }
}

// ==========================================
// ConfigManager - 配置管理器
// ==========================================
pub struct ConfigManager {
    rule_set: Arc<RuleSet>,
    source: RuleSource,
}

impl ConfigManager {
    /// 使用内置规则表
    pub fn built_in() -> Self {
        Self {
            rule_set: Arc::new(RuleSet::default()),
            source: RuleSource::BuiltIn,
        }
    }

    /// 从指定 JSON 文件加载规则(覆写合并到内置规则)
    ///
    /// # 返回
    /// - Err(ConfigError::FileNotFound): 文件不存在
    /// - Err(ConfigError::ParseError / InconsistentCatalog / InvalidValue): 内容非法
    pub fn from_file(path: impl AsRef<Path>) -> ConfigResult<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(ConfigError::FileNotFound(path.display().to_string()));
        }

        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::FileReadError {
            path: path.display().to_string(),
            source,
        })?;
        let rule_set = RuleSet::from_json_str(&raw)?;

        tracing::info!(path = %path.display(), "规则文件加载成功");

        Ok(Self {
            rule_set: Arc::new(rule_set),
            source: RuleSource::File(path.to_path_buf()),
        })
    }

    /// 按优先级加载规则
    ///
    /// # 优先级
    /// 1. explicit_path(命令行参数)
    /// 2. 环境变量 CULTIVATION_RULES_PATH
    /// 3. 用户配置目录下的 rules.json(存在时)
    /// 4. 内置规则表
    pub fn load(explicit_path: Option<&Path>) -> ConfigResult<Self> {
        match resolve_rules_path(explicit_path) {
            Some(path) => Self::from_file(path),
            None => {
                tracing::debug!("未找到规则文件, 使用内置规则表");
                Ok(Self::built_in())
            }
        }
    }

    pub fn rule_set(&self) -> Arc<RuleSet> {
        Arc::clone(&self.rule_set)
    }

    pub fn source(&self) -> &RuleSource {
        &self.source
    }
}

/// 解析规则文件路径
///
/// 显式路径与环境变量路径即使不存在也会返回(由加载阶段报 FileNotFound);
/// 默认目录下的文件仅在存在时返回。
pub fn resolve_rules_path(explicit_path: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = explicit_path {
        return Some(path.to_path_buf());
    }

    if let Ok(path) = std::env::var(config_keys::RULES_PATH_ENV) {
        let trimmed = path.trim();
        if !trimmed.is_empty() {
            return Some(PathBuf::from(trimmed));
        }
    }

    default_rules_path().filter(|p| p.exists())
}

/// 默认规则文件位置: <config_dir>/cultivation-batch-rules/rules.json
pub fn default_rules_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| {
        dir.join(config_keys::CONFIG_DIR_NAME)
            .join(config_keys::RULES_FILE_NAME)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Domain, QuantityOperation};
    use std::io::Write;

    #[test]
    fn test_built_in_source() {
        let manager = ConfigManager::built_in();
        assert_eq!(manager.source(), &RuleSource::BuiltIn);
        assert_eq!(manager.rule_set().stages(Domain::Cannabis).len(), 9);
    }

    #[test]
    fn test_from_file_applies_overrides() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{"quantityRules": {{"cannabis": {{"transfer": {{"minWeight": 1.0, "unit": "grams", "contextMessage": "site policy"}}}}}}}}"#
        )
        .unwrap();

        let manager = ConfigManager::from_file(file.path()).unwrap();
        let rule_set = manager.rule_set();
        let rule = rule_set
            .quantity_rule(Domain::Cannabis, QuantityOperation::Transfer)
            .unwrap();
        assert_eq!(rule.min_weight, 1.0);
        assert_eq!(manager.source(), &RuleSource::File(file.path().to_path_buf()));
    }

    #[test]
    fn test_from_missing_file() {
        let result = ConfigManager::from_file("/definitely/not/here/rules.json");
        assert!(matches!(result, Err(ConfigError::FileNotFound(_))));
    }

    #[test]
    fn test_explicit_path_wins() {
        let explicit = PathBuf::from("/tmp/explicit-rules.json");
        assert_eq!(resolve_rules_path(Some(&explicit)), Some(explicit));
    }

    #[test]
    fn test_default_rules_path_layout() {
        if let Some(path) = default_rules_path() {
            assert!(path.ends_with("cultivation-batch-rules/rules.json"));
        }
    }
}
