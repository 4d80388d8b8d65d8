// ==========================================
// 种植批次规则引擎 - 核心库
// ==========================================
// 职责: 大麻/农产品批次的阶段流转、数量、日期、容量、兼容性校验
// 系统定位: 决策支持(只给结论, 不落库; 调用方决定是否提交)
// ==========================================

// ==========================================
// 模块声明
// ==========================================

// 领域层 - 类型、快照与校验结论
pub mod domain;

// 配置层 - 规则集
pub mod config;

// 引擎层 - 校验器
pub mod engine;

// API 层 - 校验门面
pub mod api;

// 日志系统
pub mod logging;

// ==========================================
// 重导出核心类型
// ==========================================

// 领域类型
pub use domain::{
    BatchSnapshot, BatchStatus, Domain, LocationSnapshot, QuantityOperation, QuantityRule,
    QuarantineStatus, StageDefinition, ValidationResult,
};

// 配置
pub use config::{ConfigError, ConfigManager, RuleSet};

// 引擎
pub use engine::{
    CapacityValidator, Clock, CompatibilityValidator, FixedClock, QuantityValidator,
    StageCatalog, StageTransitionValidator, SystemClock, TimelineValidator,
};

// API
pub use api::{ApiError, ApiResult, BatchValidationApi, OperationRequest};

// ==========================================
// 常量定义
// ==========================================

// 系统版本
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// 系统名称
pub const APP_NAME: &str = "种植批次规则引擎";
