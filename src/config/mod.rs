// ==========================================
// 种植批次规则引擎 - 配置层
// ==========================================
// 职责: 规则集(阶段目录/数量规则/阈值)的定义、加载与覆写
// 存储: 内置规则表 + 可选 JSON 覆写文件
// ==========================================

pub mod config_manager;
pub mod error;
pub mod rule_set;
pub mod stage_tables;

// 重导出核心配置类型
pub use config_manager::{config_keys, default_rules_path, resolve_rules_path, ConfigManager, RuleSource};
pub use error::{ConfigError, ConfigResult};
pub use rule_set::{CapacityThresholds, CompatibilityLimits, RuleSet, TimelineThresholds};
