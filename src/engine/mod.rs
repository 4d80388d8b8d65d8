// ==========================================
// 种植批次规则引擎 - 引擎层
// ==========================================
// 职责: 阶段目录 + 五个校验器(纯函数)
// 红线: 无 I/O, 无共享可变状态, 不读系统时钟; 每个结论必须带原因
// ==========================================

pub mod capacity;
pub mod clock;
pub mod compatibility;
pub mod quantity;
pub mod stage_catalog;
pub mod stage_transition;
pub mod timeline;

// 重导出核心引擎
pub use capacity::CapacityValidator;
pub use clock::{days_between, Clock, FixedClock, SystemClock};
pub use compatibility::CompatibilityValidator;
pub use quantity::QuantityValidator;
pub use stage_catalog::{StageCatalog, StagePosition, CLOSED_STAGE};
pub use stage_transition::StageTransitionValidator;
pub use timeline::TimelineValidator;
