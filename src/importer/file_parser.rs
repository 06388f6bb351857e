// ==========================================
// 供应商资质表导入系统 - 表格文件解析器
// ==========================================
// 支持: calamine 可识别的工作簿（.xlsx/.xlsm/.xls/.xlsb/.ods）
// 规则:
// - 只读第一个工作表
// - 以 A1 为原点按绝对坐标取值，首行无条件视为表头
// - 单元格取“显示值”文本: 日期按配置格式输出；数值按单元格数字格式渲染
//   （xlsx/xlsm 读取 styles.xml；.xls 等无格式信息时整数不带小数点）
// ==========================================

use crate::importer::error::{ImportError, ImportResult};
use crate::importer::importer_trait::TabularSource;
use crate::importer::number_format::{render_number, CellNumberFormats};
use crate::importer::sheet_rows::{Row, SheetRows};
use calamine::{open_workbook_auto, Data, ExcelDateTime, Reader};
use chrono::format::{Item, StrftimeItems};
use chrono::Timelike;
use std::path::Path;
use tracing::{debug, warn};

// ==========================================
// ExcelSource - Excel 数据源
// ==========================================
#[derive(Debug, Clone)]
pub struct ExcelSource {
    date_format: String,
}

impl ExcelSource {
    /// 创建数据源
    ///
    /// # 参数
    /// - date_format: 日期单元格的显示格式（chrono 格式串，如 "%d/%m/%Y"）
    pub fn new(date_format: &str) -> ImportResult<Self> {
        if StrftimeItems::new(date_format).any(|item| matches!(item, Item::Error)) {
            return Err(ImportError::Config(format!(
                "日期格式串无效: {}",
                date_format
            )));
        }

        Ok(Self {
            date_format: date_format.to_string(),
        })
    }
}

impl TabularSource for ExcelSource {
    fn read(&self, path: &Path) -> ImportResult<SheetRows> {
        if !path.exists() {
            return Err(ImportError::SourceFormat(format!(
                "文件不存在: {}",
                path.display()
            )));
        }

        let mut workbook = open_workbook_auto(path)?;
        let range = workbook
            .worksheet_range_at(0)
            .ok_or_else(|| ImportError::SourceFormat("工作簿无工作表".to_string()))??;

        // 以 A1 为原点：空的首行/首列不改变列偏移
        let (height, width) = match range.end() {
            Some((row, col)) => (row as usize + 1, col as usize + 1),
            None => (0, 0),
        };
        let formats = load_number_formats(path);
        debug!(
            path = %path.display(),
            height,
            width,
            formatted_cells = !formats.is_empty(),
            "工作表已加载"
        );

        let date_format = self.date_format.clone();
        let rows = (1..height).map(move |r| {
            let cells = (0..width)
                .map(|c| {
                    let (r, c) = (r as u32, c as u32);
                    range
                        .get_value((r, c))
                        .map(|cell| {
                            format_cell(cell, &date_format, formats.code_at(r, c))
                                .trim()
                                .to_string()
                        })
                        .unwrap_or_default()
                })
                .collect();
            Row::new(r + 1, cells)
        });

        Ok(SheetRows::new(width, rows))
    }
}

/// 数字格式只存在于 OOXML 包中；读取失败不影响取值，回退为原始数值文本
fn load_number_formats(path: &Path) -> CellNumberFormats {
    let is_ooxml = path
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("xlsx") || ext.eq_ignore_ascii_case("xlsm"));
    if !is_ooxml {
        return CellNumberFormats::empty();
    }

    CellNumberFormats::load(path).unwrap_or_else(|e| {
        warn!(path = %path.display(), error = %e, "数字格式读取失败，按原始数值取值");
        CellNumberFormats::empty()
    })
}

/// 单元格显示值
///
/// # 参数
/// - cell: calamine 单元格
/// - date_format: 日期显示格式
/// - number_format: 单元格数字格式码（无或不支持时输出原始数值文本）
pub fn format_cell(cell: &Data, date_format: &str, number_format: Option<&str>) -> String {
    let render = |value: f64| number_format.and_then(|code| render_number(value, code));

    match cell {
        Data::Empty => String::new(),
        Data::String(s) => s.clone(),
        Data::Int(i) => render(*i as f64).unwrap_or_else(|| i.to_string()),
        Data::Float(f) => render(*f).unwrap_or_else(|| f.to_string()),
        Data::Bool(b) => (if *b { "TRUE" } else { "FALSE" }).to_string(),
        Data::DateTime(dt) => format_excel_datetime(dt, date_format),
        Data::DateTimeIso(s) | Data::DurationIso(s) => s.clone(),
        Data::Error(e) => e.to_string(),
    }
}

fn format_excel_datetime(dt: &ExcelDateTime, date_format: &str) -> String {
    if dt.is_duration() {
        if let Some(duration) = dt.as_duration() {
            let secs = duration.num_seconds();
            return format!("{:02}:{:02}:{:02}", secs / 3600, (secs % 3600) / 60, secs % 60);
        }
    }

    match dt.as_datetime() {
        Some(ndt) if ndt.hour() == 0 && ndt.minute() == 0 && ndt.second() == 0 => {
            ndt.format(date_format).to_string()
        }
        Some(ndt) => format!("{} {}", ndt.format(date_format), ndt.format("%H:%M:%S")),
        None => dt.as_f64().to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use calamine::{CellErrorType, ExcelDateTimeType};

    #[test]
    fn test_format_scalar_cells() {
        assert_eq!(format_cell(&Data::Empty, "%d/%m/%Y", None), "");
        assert_eq!(format_cell(&Data::String("ACME".into()), "%d/%m/%Y", None), "ACME");
        assert_eq!(format_cell(&Data::Int(42), "%d/%m/%Y", None), "42");
        assert_eq!(format_cell(&Data::Float(7.0), "%d/%m/%Y", None), "7");
        assert_eq!(format_cell(&Data::Float(8.5), "%d/%m/%Y", None), "8.5");
        assert_eq!(
            format_cell(&Data::Float(12345678000190.0), "%d/%m/%Y", None),
            "12345678000190"
        );
        assert_eq!(format_cell(&Data::Bool(true), "%d/%m/%Y", None), "TRUE");
        assert_eq!(
            format_cell(&Data::Error(CellErrorType::Div0), "%d/%m/%Y", None),
            "#DIV/0!"
        );
    }

    #[test]
    fn test_format_numeric_cell_uses_number_format() {
        assert_eq!(
            format_cell(&Data::Float(1234567890.0), "%d/%m/%Y", Some("00000000000")),
            "01234567890"
        );
        assert_eq!(
            format_cell(&Data::Int(7), "%d/%m/%Y", Some("0.00")),
            "7.00"
        );
        // 不支持的格式码回退为原始数值
        assert_eq!(
            format_cell(&Data::Float(8.5), "%d/%m/%Y", Some("0.0E+00")),
            "8.5"
        );
        // 文本单元格不受数字格式影响
        assert_eq!(
            format_cell(&Data::String("0042".into()), "%d/%m/%Y", Some("0")),
            "0042"
        );
    }

    #[test]
    fn test_format_date_cell_uses_display_format() {
        // 45292 = 2024-01-01（1900 日期系统）
        let date = ExcelDateTime::new(45292.0, ExcelDateTimeType::DateTime, false);
        assert_eq!(format_cell(&Data::DateTime(date), "%d/%m/%Y", None), "01/01/2024");
        assert_eq!(format_cell(&Data::DateTime(date), "%Y-%m-%d", None), "2024-01-01");

        let with_time = ExcelDateTime::new(45292.5, ExcelDateTimeType::DateTime, false);
        assert_eq!(
            format_cell(&Data::DateTime(with_time), "%d/%m/%Y", None),
            "01/01/2024 12:00:00"
        );
    }

    #[test]
    fn test_invalid_date_format_rejected() {
        assert!(matches!(
            ExcelSource::new("%Q%"),
            Err(ImportError::Config(_))
        ));
        assert!(ExcelSource::new("%d/%m/%Y").is_ok());
    }

    #[test]
    fn test_missing_file_is_source_format_error() {
        let source = ExcelSource::new("%d/%m/%Y").unwrap();
        let result = source.read(Path::new("non_existent.xlsx"));
        assert!(matches!(result, Err(ImportError::SourceFormat(_))));
    }

    #[test]
    fn test_non_spreadsheet_is_source_format_error() {
        use std::io::Write;

        let mut temp_file = tempfile::Builder::new().suffix(".xlsx").tempfile().unwrap();
        writeln!(temp_file, "not a workbook").unwrap();
        temp_file.flush().unwrap();

        let source = ExcelSource::new("%d/%m/%Y").unwrap();
        let result = source.read(temp_file.path());
        assert!(matches!(result, Err(ImportError::SourceFormat(_))));
    }
}
