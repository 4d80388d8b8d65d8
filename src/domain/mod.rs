// ==========================================
// 种植批次规则引擎 - 领域模型层
// ==========================================
// 职责: 定义业务域、快照、规则记录、校验结论
// 红线: 不含校验逻辑, 不含配置加载
// ==========================================

pub mod batch;
pub mod dates;
pub mod location;
pub mod rule;
pub mod types;
pub mod verdict;

// 重导出核心类型
pub use batch::{is_truthy, BatchSnapshot};
pub use dates::parse_iso_date;
pub use location::{CapacityConstraint, LocationSnapshot};
pub use rule::{QuantityRule, StageDefinition};
pub use types::{
    BatchStatus, Domain, QuantityOperation, QuarantineStatus, UnknownDomain, UnknownOperation,
};
pub use verdict::ValidationResult;
