// ==========================================
// 供应商资质表导入系统 - 表格行序列
// ==========================================
// Row: 按位置排列的单元格显示值（不保留表头名）
// SheetRows: 惰性、有限、只能消费一次的数据行序列（已去掉表头行）
// ==========================================

use std::fmt;

// ==========================================
// Row - 单个数据行
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Row {
    row_number: usize, // 表格行号（1 起，表头为第 1 行）
    cells: Vec<String>,
}

impl Row {
    pub fn new(row_number: usize, cells: Vec<String>) -> Self {
        Self { row_number, cells }
    }

    pub fn row_number(&self) -> usize {
        self.row_number
    }

    /// 按列偏移取值（越界返回 None）
    pub fn cell(&self, offset: usize) -> Option<&str> {
        self.cells.get(offset).map(String::as_str)
    }

    pub fn cells(&self) -> &[String] {
        &self.cells
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }
}

// ==========================================
// SheetRows - 数据行序列
// ==========================================
pub struct SheetRows {
    width: usize,
    rows: Box<dyn Iterator<Item = Row>>,
}

impl SheetRows {
    /// 由已去掉表头的数据行迭代器构造
    ///
    /// # 参数
    /// - width: 表格使用区宽度（列数）
    /// - rows: 数据行迭代器
    pub fn new<I>(width: usize, rows: I) -> Self
    where
        I: Iterator<Item = Row> + 'static,
    {
        Self {
            width,
            rows: Box::new(rows),
        }
    }

    /// 由完整二维表构造（第一行无条件视为表头并丢弃）
    ///
    /// 单元格做 TRIM；宽度取所有行（含表头）的最大列数。
    pub fn from_grid(grid: Vec<Vec<String>>) -> Self {
        let width = grid.iter().map(Vec::len).max().unwrap_or(0);
        let rows = grid
            .into_iter()
            .enumerate()
            .skip(1)
            .map(|(idx, cells)| {
                let cells = cells.into_iter().map(|c| c.trim().to_string()).collect();
                Row::new(idx + 1, cells)
            });

        Self::new(width, rows)
    }

    /// 表格使用区宽度
    pub fn width(&self) -> usize {
        self.width
    }
}

impl Iterator for SheetRows {
    type Item = Row;

    fn next(&mut self) -> Option<Row> {
        self.rows.next()
    }
}

impl fmt::Debug for SheetRows {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SheetRows")
            .field("width", &self.width)
            .finish_non_exhaustive()
    }
}
