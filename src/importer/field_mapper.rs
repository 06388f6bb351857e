// ==========================================
// 供应商资质表导入系统 - 评分字段映射
// ==========================================
// 职责: 评分单元格显示值 → 数值
// 规则: 空单元格 → 0；'.' 与 ',' 同时出现时，靠后的为小数点，另一个为千分位
//       （"1.234,5" / "1,234.5"）；仅有一个 ',' 时视为小数逗号（"8,5"）
// ==========================================

use crate::domain::score::SCORE_COLUMNS;
use crate::importer::error::{ImportError, ImportResult};

/// 解析单个评分单元格
///
/// # 返回
/// - Ok(f64): 解析成功（空值为 0）
/// - Err(String): 非数值文本
pub fn parse_score(value: &str) -> Result<f64, String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Ok(0.0);
    }

    let normalized = match (trimmed.rfind(','), trimmed.rfind('.')) {
        (Some(comma), Some(dot)) if comma > dot => trimmed.replace('.', "").replace(',', "."),
        (Some(_), Some(_)) => trimmed.replace(',', ""),
        (Some(_), None) if trimmed.matches(',').count() == 1 => trimmed.replace(',', "."),
        (Some(_), None) => trimmed.replace(',', ""),
        (None, _) => trimmed.to_string(),
    };

    normalized
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .ok_or_else(|| format!("无法解析为数值: {}", value))
}

/// 映射整段评分单元格（数量校验由 ScoreRepository 负责）
///
/// # 参数
/// - cells: 评分段单元格
/// - row_number: 表格行号（用于错误定位）
pub fn map_scores(cells: &[String], row_number: usize) -> ImportResult<Vec<f64>> {
    cells
        .iter()
        .enumerate()
        .map(|(idx, cell)| {
            parse_score(cell).map_err(|message| ImportError::Validation {
                row: row_number,
                message: format!(
                    "评分字段 {}: {}",
                    SCORE_COLUMNS.get(idx).copied().unwrap_or("?"),
                    message
                ),
            })
        })
        .collect()
}
