// ==========================================
// 供应商资质表导入系统 - API层
// ==========================================
// 职责: 组装导入器并对外提供同步调用入口
// ==========================================

pub mod error;
pub mod import_api;

pub use error::{ApiError, ApiResult};
pub use import_api::{ImportApi, ImportApiResponse, IMPORT_SUCCESS_MESSAGE};
