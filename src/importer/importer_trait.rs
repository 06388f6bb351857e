// ==========================================
// 供应商资质表导入系统 - 导入接口 Trait
// ==========================================
// 职责: 定义表格数据源接口（不包含实现）
// ==========================================

use crate::importer::error::ImportResult;
use crate::importer::sheet_rows::SheetRows;
use std::path::Path;

// ==========================================
// TabularSource Trait
// ==========================================
// 用途: 打开表格文件，产出去掉表头后的数据行
// 实现者: ExcelSource
pub trait TabularSource {
    /// 读取文件第一个工作表
    ///
    /// # 返回
    /// - Ok(SheetRows): 惰性数据行序列（表头行已丢弃，单元格为显示值）
    /// - Err(ImportError::SourceFormat): 文件无法打开或不是受支持的表格
    fn read(&self, path: &Path) -> ImportResult<SheetRows>;
}
