// ==========================================
// 供应商资质表导入系统 - 领域模型层
// ==========================================
// 职责: 定义供应商/评分实体与导入结果类型
// 红线: 不含数据访问逻辑,不含导入流程逻辑
// ==========================================

pub mod import_report;
pub mod score;
pub mod supplier;

// 重导出核心类型
pub use import_report::{ImportReport, RowFailure, RowOutcome, RowStage, SkipReason};
pub use score::{ScoreRecord, ScoreRecordId, SCORE_COLUMNS, SCORE_FIELD_COUNT};
pub use supplier::{
    NewSupplier, SupplierId, SupplierLookup, SupplierRecord, SUPPLIER_COLUMNS,
    SUPPLIER_FIELD_COUNT,
};
