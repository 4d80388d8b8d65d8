// ==========================================
// 种植批次规则引擎 - API 层
// ==========================================
// 职责: 校验门面 + 操作请求模型, 供宿主程序与命令行调用
// ==========================================

pub mod error;
pub mod request;
pub mod validation_api;

// 重导出核心类型
pub use error::{ApiError, ApiResult};
pub use request::OperationRequest;
pub use validation_api::BatchValidationApi;
