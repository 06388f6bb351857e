// ==========================================
// 供应商资质表导入系统 - 列位置映射表
// ==========================================
// 表格布局（0 起列偏移）:
// | 偏移   | 含义                                           |
// |--------|------------------------------------------------|
// | 0..5   | 名称、税号、认证日期、状态、服务范围           |
// | 5..15  | 评分 n1..n10                                   |
// | 16..25 | 合格标记、人员类型、联系人、电话、邮箱、银行、 |
// |        | 支行、账号、FCPA                               |
// 第 15 列不参与映射。
// ==========================================

use crate::domain::score::SCORE_FIELD_COUNT;
use crate::domain::supplier::{NewSupplier, SUPPLIER_FIELD_COUNT};
use crate::importer::error::{ImportError, ImportResult};
use crate::importer::sheet_rows::Row;

/// 命名的半开列区间 [start, end)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnRange {
    pub name: &'static str,
    pub start: usize,
    pub end: usize,
}

impl ColumnRange {
    pub const fn new(name: &'static str, start: usize, end: usize) -> Self {
        Self { name, start, end }
    }

    pub const fn len(&self) -> usize {
        self.end - self.start
    }

    pub const fn is_empty(&self) -> bool {
        self.end <= self.start
    }

    /// 取行内实际存在的单元格（越界部分不补齐）
    pub fn slice<'a>(&self, row: &'a Row) -> &'a [String] {
        let cells = row.cells();
        let start = self.start.min(cells.len());
        let end = self.end.min(cells.len());
        &cells[start..end]
    }
}

/// 税号列
pub const TAX_ID_COLUMN: usize = 1;

/// 供应商身份段
pub const SUPPLIER_IDENTITY: ColumnRange = ColumnRange::new("supplier_identity", 0, 5);

/// 评分段
pub const SCORES: ColumnRange = ColumnRange::new("scores", 5, 15);

/// 供应商联系/银行段
pub const SUPPLIER_CONTACT: ColumnRange = ColumnRange::new("supplier_contact", 16, 25);

// ==========================================
// ColumnLayout - 行拆分规则
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnLayout {
    pub tax_id_column: usize,
    pub supplier_ranges: [ColumnRange; 2],
    pub score_range: ColumnRange,
}

impl Default for ColumnLayout {
    fn default() -> Self {
        Self::standard()
    }
}

impl ColumnLayout {
    /// 标准布局
    pub const fn standard() -> Self {
        Self {
            tax_id_column: TAX_ID_COLUMN,
            supplier_ranges: [SUPPLIER_IDENTITY, SUPPLIER_CONTACT],
            score_range: SCORES,
        }
    }

    /// 覆盖全部映射列所需的最小宽度
    pub fn required_width(&self) -> usize {
        self.supplier_ranges
            .iter()
            .chain(std::iter::once(&self.score_range))
            .map(|r| r.end)
            .chain(std::iter::once(self.tax_id_column + 1))
            .max()
            .unwrap_or(0)
    }

    /// 运行开始时校验表格宽度
    pub fn validate_width(&self, width: usize) -> ImportResult<()> {
        let required = self.required_width();
        if width < required {
            return Err(ImportError::LayoutMismatch {
                required,
                actual: width,
            });
        }
        Ok(())
    }

    /// 取税号（TRIM 后为空视为缺失）
    pub fn tax_id<'a>(&self, row: &'a Row) -> Option<&'a str> {
        row.cell(self.tax_id_column)
            .map(str::trim)
            .filter(|v| !v.is_empty())
    }

    /// 拼接供应商子记录：身份段 + 联系段；行宽不足的列以空串补齐
    pub fn supplier_fields(&self, row: &Row) -> ImportResult<NewSupplier> {
        let fields: Vec<String> = self
            .supplier_ranges
            .iter()
            .flat_map(|range| range.start..range.end)
            .map(|offset| row.cell(offset).unwrap_or_default().to_string())
            .collect();

        let actual = fields.len();
        let fields: [String; SUPPLIER_FIELD_COUNT] =
            fields.try_into().map_err(|_| ImportError::Validation {
                row: row.row_number(),
                message: format!(
                    "供应商字段数量错误: 期望 {}，实际 {}",
                    SUPPLIER_FIELD_COUNT, actual
                ),
            })?;

        Ok(NewSupplier::from_fields(fields))
    }

    /// 评分段单元格（只含行内实际存在的列）
    pub fn score_cells<'a>(&self, row: &'a Row) -> &'a [String] {
        self.score_range.slice(row)
    }

    /// 布局自检：供应商段合计 14 列、评分段 10 列
    pub fn is_consistent(&self) -> bool {
        let supplier_len: usize = self.supplier_ranges.iter().map(ColumnRange::len).sum();
        supplier_len == SUPPLIER_FIELD_COUNT && self.score_range.len() == SCORE_FIELD_COUNT
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn full_row() -> Row {
        Row::new(2, (0..25).map(|i| format!("c{}", i)).collect())
    }

    #[test]
    fn test_standard_layout_constants() {
        let layout = ColumnLayout::standard();
        assert!(layout.is_consistent());
        assert_eq!(layout.required_width(), 25);
        assert_eq!(layout.tax_id_column, 1);
        assert_eq!(SUPPLIER_IDENTITY.len(), 5);
        assert_eq!(SCORES.len(), 10);
        assert_eq!(SUPPLIER_CONTACT.len(), 9);
    }

    #[test]
    fn test_validate_width() {
        let layout = ColumnLayout::standard();
        assert!(layout.validate_width(25).is_ok());
        assert!(layout.validate_width(30).is_ok());
        assert!(matches!(
            layout.validate_width(24),
            Err(ImportError::LayoutMismatch {
                required: 25,
                actual: 24
            })
        ));
    }

    #[test]
    fn test_supplier_fields_skip_column_15() {
        let supplier = ColumnLayout::standard().supplier_fields(&full_row()).unwrap();
        assert_eq!(supplier.name, "c0");
        assert_eq!(supplier.tax_id, "c1");
        assert_eq!(supplier.service_scope, "c4");
        assert_eq!(supplier.qualified, "c16");
        assert_eq!(supplier.fcpa, "c24");
        assert!(!supplier.values().contains(&"c15"));
    }

    #[test]
    fn test_score_cells_range() {
        let row = full_row();
        let cells = ColumnLayout::standard().score_cells(&row);
        assert_eq!(cells.len(), 10);
        assert_eq!(cells[0], "c5");
        assert_eq!(cells[9], "c14");
    }

    #[test]
    fn test_short_row_pads_supplier_and_truncates_scores() {
        let row = Row::new(3, (0..12).map(|i| format!("c{}", i)).collect());
        let layout = ColumnLayout::standard();

        let supplier = layout.supplier_fields(&row).unwrap();
        assert_eq!(supplier.tax_id, "c1");
        assert_eq!(supplier.qualified, "");
        assert_eq!(layout.score_cells(&row).len(), 7);
    }

    #[test]
    fn test_tax_id_blank_is_missing() {
        let layout = ColumnLayout::standard();
        let blank = Row::new(2, vec!["ACME".into(), "   ".into()]);
        let short = Row::new(3, vec!["ACME".into()]);
        let present = Row::new(4, vec!["ACME".into(), " 111 ".into()]);

        assert_eq!(layout.tax_id(&blank), None);
        assert_eq!(layout.tax_id(&short), None);
        assert_eq!(layout.tax_id(&present), Some("111"));
    }

    #[test]
    fn test_tax_id_zero_is_present() {
        let layout = ColumnLayout::standard();
        let zero = Row::new(5, vec!["ACME".into(), "0".into()]);

        assert_eq!(layout.tax_id(&zero), Some("0"));
    }
}
