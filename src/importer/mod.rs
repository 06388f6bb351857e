// ==========================================
// 供应商资质表导入系统 - 导入层
// ==========================================
// 职责: 表格读取、列映射、供应商去重与评分落库
// 支持: Excel（.xls / .xlsx / .xlsm）
// ==========================================

// 模块声明
pub mod column_layout;
pub mod error;
pub mod field_mapper;
pub mod file_parser;
pub mod importer_trait;
pub mod number_format;
pub mod sheet_rows;
pub mod supplier_importer;
pub mod uploader;

// 重导出核心类型
pub use column_layout::{ColumnLayout, ColumnRange};
pub use error::{ImportError, ImportResult};
pub use file_parser::ExcelSource;
pub use number_format::CellNumberFormats;
pub use sheet_rows::{Row, SheetRows};
pub use supplier_importer::SupplierImporter;
pub use uploader::FileUploader;

// 重导出 Trait 接口
pub use importer_trait::TabularSource;
