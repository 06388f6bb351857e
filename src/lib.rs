// ==========================================
// 供应商资质表导入系统 - 核心库
// ==========================================
// 技术栈: Rust + SQLite + calamine
// 流程: 读取表格 → 按列拆分 → 按税号去重供应商 → 写入评分
// ==========================================

// ==========================================
// 模块声明
// ==========================================

// 领域层 - 实体与导入结果
pub mod domain;

// 数据仓储层 - 数据访问
pub mod repository;

// 导入层 - 外部数据
pub mod importer;

// 配置层 - 导入配置
pub mod config;

// 数据库基础设施（连接初始化/建表/事务）
pub mod db;

// 日志系统
pub mod logging;

// API 层 - 对外入口
pub mod api;

// 应用层 - 状态装配
pub mod app;

// ==========================================
// 重导出核心类型
// ==========================================

// 领域实体
pub use domain::{
    ImportReport, NewSupplier, RowOutcome, ScoreRecord, SupplierId, SupplierLookup,
    SupplierRecord,
};

// 导入
pub use importer::{ExcelSource, ImportError, SupplierImporter, TabularSource};

// API
pub use api::{ApiError, ImportApi};

// ==========================================
// 常量定义
// ==========================================

// 系统版本
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// 系统名称
pub const APP_NAME: &str = "供应商资质表导入系统";
