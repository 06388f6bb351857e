// ==========================================
// 供应商资质表导入系统 - 数字格式（显示值）
// ==========================================
// 职责:
// - 从 xlsx/xlsm 包内读取首个工作表各单元格的数字格式码
//   （xl/workbook.xml → rels → 工作表 XML 的 s 属性 → styles.xml cellXfs → numFmts/内置格式）
// - 按格式码把数值渲染为显示文本（税号掩码、补零、千分位、小数位、百分比）
// 不支持: 科学计数、分数、条件段、日期（日期由 calamine 识别为 DateTime 单独处理）
//         → 返回 None，调用方回退为原始数值文本
// ==========================================

use crate::importer::error::{ImportError, ImportResult};
use roxmltree::{Document, Node};
use std::collections::HashMap;
use std::fs::File;
use std::io::{Read, Seek};
use std::path::Path;
use zip::result::ZipError;
use zip::ZipArchive;

/// 首个工作表缺省部件名（rels 缺失时使用）
const DEFAULT_SHEET_PART: &str = "xl/worksheets/sheet1.xml";

// ==========================================
// CellNumberFormats - 单元格 → 格式码
// ==========================================
#[derive(Debug, Default)]
pub struct CellNumberFormats {
    cells: HashMap<(u32, u32), usize>, // (行, 列) 0 起 → cellXfs 下标
    xf_codes: Vec<Option<String>>,     // cellXfs 下标 → 可渲染的数字格式码
}

impl CellNumberFormats {
    /// 无格式信息（.xls/.ods 等非 OOXML 文件）
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// 读取 xlsx/xlsm 文件中首个工作表的单元格数字格式
    pub fn load(path: &Path) -> ImportResult<Self> {
        let file = File::open(path)
            .map_err(|e| ImportError::SourceFormat(format!("文件无法打开: {}", e)))?;
        let mut zip = ZipArchive::new(file)
            .map_err(|e| ImportError::SourceFormat(format!("xlsx 压缩包无法读取: {}", e)))?;

        let Some(styles) = read_part(&mut zip, "xl/styles.xml")? else {
            return Ok(Self::empty());
        };
        let xf_codes = parse_cell_xfs(&styles)?;
        if xf_codes.iter().all(Option::is_none) {
            return Ok(Self::empty());
        }

        let sheet_part = first_sheet_part(&mut zip)?;
        let Some(sheet) = read_part(&mut zip, &sheet_part)? else {
            return Err(ImportError::SourceFormat(format!(
                "工作表部件缺失: {}",
                sheet_part
            )));
        };

        let cells = parse_cell_styles(&sheet, &xf_codes)?;
        Ok(Self { cells, xf_codes })
    }

    /// 单元格的数字格式码（General/日期/不支持的格式返回 None）
    pub fn code_at(&self, row: u32, col: u32) -> Option<&str> {
        self.cells
            .get(&(row, col))
            .and_then(|&xf| self.xf_codes.get(xf))
            .and_then(|code| code.as_deref())
    }
}

fn read_part<R: Read + Seek>(zip: &mut ZipArchive<R>, name: &str) -> ImportResult<Option<String>> {
    let mut file = match zip.by_name(name) {
        Ok(file) => file,
        Err(ZipError::FileNotFound) => return Ok(None),
        Err(e) => {
            return Err(ImportError::SourceFormat(format!(
                "读取部件失败 ({}): {}",
                name, e
            )))
        }
    };

    let mut xml = String::new();
    file.read_to_string(&mut xml)
        .map_err(|e| ImportError::SourceFormat(format!("读取部件失败 ({}): {}", name, e)))?;
    Ok(Some(xml))
}

fn parse_xml(xml: &str) -> ImportResult<Document<'_>> {
    Document::parse(xml).map_err(|e| ImportError::SourceFormat(format!("XML 解析失败: {}", e)))
}

fn child<'a, 'input>(node: Node<'a, 'input>, name: &str) -> Option<Node<'a, 'input>> {
    node.children().find(|n| n.has_tag_name(name))
}

/// 带命名空间前缀的属性（如 r:id）按本地名匹配
fn local_attr<'a>(node: Node<'a, '_>, name: &str) -> Option<&'a str> {
    node.attributes()
        .find(|a| a.name() == name)
        .map(|a| a.value())
}

/// workbook.xml 中第一个 sheet 对应的工作表部件名
fn first_sheet_part<R: Read + Seek>(zip: &mut ZipArchive<R>) -> ImportResult<String> {
    let Some(workbook) = read_part(zip, "xl/workbook.xml")? else {
        return Ok(DEFAULT_SHEET_PART.to_string());
    };
    let doc = parse_xml(&workbook)?;
    let rel_id = doc
        .descendants()
        .find(|n| n.has_tag_name("sheet"))
        .and_then(|sheet| local_attr(sheet, "id"))
        .map(str::to_string);

    let (Some(rel_id), Some(rels)) = (rel_id, read_part(zip, "xl/_rels/workbook.xml.rels")?)
    else {
        return Ok(DEFAULT_SHEET_PART.to_string());
    };

    let rels_doc = parse_xml(&rels)?;
    let target = rels_doc
        .descendants()
        .filter(|n| n.has_tag_name("Relationship"))
        .find(|n| n.attribute("Id") == Some(rel_id.as_str()))
        .and_then(|n| n.attribute("Target"));

    Ok(match target {
        Some(target) if target.starts_with('/') => target.trim_start_matches('/').to_string(),
        Some(target) => format!("xl/{}", target),
        None => DEFAULT_SHEET_PART.to_string(),
    })
}

/// styles.xml → 每个 cellXfs 记录对应的可渲染格式码
fn parse_cell_xfs(styles: &str) -> ImportResult<Vec<Option<String>>> {
    let doc = parse_xml(styles)?;
    let root = doc.root_element();

    let custom: HashMap<u32, String> = child(root, "numFmts")
        .map(|num_fmts| {
            num_fmts
                .children()
                .filter(|n| n.has_tag_name("numFmt"))
                .filter_map(|n| {
                    let id = n.attribute("numFmtId")?.parse().ok()?;
                    Some((id, n.attribute("formatCode")?.to_string()))
                })
                .collect()
        })
        .unwrap_or_default();

    let xfs: Vec<Option<String>> = child(root, "cellXfs")
        .map(|cell_xfs| {
            cell_xfs
                .children()
                .filter(|n| n.has_tag_name("xf"))
                .map(|xf| {
                    let id: u32 = xf
                        .attribute("numFmtId")
                        .and_then(|v| v.parse().ok())
                        .unwrap_or(0);
                    custom
                        .get(&id)
                        .map(String::as_str)
                        .or_else(|| builtin_number_format(id))
                        .filter(|code| is_renderable(code))
                        .map(str::to_string)
                })
                .collect()
        })
        .unwrap_or_default();

    Ok(xfs)
}

/// 工作表 XML → 带可渲染格式的单元格坐标
fn parse_cell_styles(
    sheet: &str,
    xf_codes: &[Option<String>],
) -> ImportResult<HashMap<(u32, u32), usize>> {
    let doc = parse_xml(sheet)?;
    let mut cells = HashMap::new();

    let Some(sheet_data) = doc.descendants().find(|n| n.has_tag_name("sheetData")) else {
        return Ok(cells);
    };

    let mut row_idx: u32 = 0;
    for (n, row) in sheet_data
        .children()
        .filter(|n| n.has_tag_name("row"))
        .enumerate()
    {
        // r 缺省时沿用上一行 + 1
        row_idx = row
            .attribute("r")
            .and_then(|r| r.parse::<u32>().ok())
            .map(|r| r.saturating_sub(1))
            .unwrap_or(if n == 0 { 0 } else { row_idx + 1 });

        let mut col_idx: u32 = 0;
        for (m, cell) in row.children().filter(|n| n.has_tag_name("c")).enumerate() {
            col_idx = match cell.attribute("r").and_then(parse_cell_ref) {
                Some((r, c)) => {
                    row_idx = r;
                    c
                }
                None if m == 0 => 0,
                None => col_idx + 1,
            };

            let xf = cell
                .attribute("s")
                .and_then(|s| s.parse::<usize>().ok())
                .unwrap_or(0);
            if matches!(xf_codes.get(xf), Some(Some(_))) {
                cells.insert((row_idx, col_idx), xf);
            }
        }
    }

    Ok(cells)
}

/// "B12" → (11, 1)
fn parse_cell_ref(reference: &str) -> Option<(u32, u32)> {
    let split = reference.find(|c: char| c.is_ascii_digit())?;
    let (letters, digits) = reference.split_at(split);
    if letters.is_empty() {
        return None;
    }

    let mut col: u32 = 0;
    for c in letters.chars() {
        if !c.is_ascii_alphabetic() {
            return None;
        }
        col = col * 26 + (c.to_ascii_uppercase() as u32 - 'A' as u32 + 1);
    }
    let row: u32 = digits.parse().ok()?;
    Some((row.checked_sub(1)?, col - 1))
}

/// 内置数字格式（仅数值类；日期类由 calamine 处理）
fn builtin_number_format(id: u32) -> Option<&'static str> {
    match id {
        1 => Some("0"),
        2 => Some("0.00"),
        3 => Some("#,##0"),
        4 => Some("#,##0.00"),
        9 => Some("0%"),
        10 => Some("0.00%"),
        37 => Some("#,##0 ;(#,##0)"),
        38 => Some("#,##0 ;[Red](#,##0)"),
        39 => Some("#,##0.00;(#,##0.00)"),
        40 => Some("#,##0.00;[Red](#,##0.00)"),
        _ => None,
    }
}

fn is_renderable(code: &str) -> bool {
    !code.eq_ignore_ascii_case("general")
        && split_sections(code)
            .first()
            .and_then(|section| tokenize(section))
            .is_some_and(|tokens| tokens.iter().any(|t| matches!(t, Token::Digit(_))))
}

// ==========================================
// 格式码渲染
// ==========================================

#[derive(Debug, Clone, PartialEq)]
enum Token {
    Digit(char), // 0 / # / ?
    Point,
    Comma,
    Percent,
    Literal(String),
}

/// 按未转义、未加引号的 ';' 拆分正/负/零段
fn split_sections(code: &str) -> Vec<String> {
    let mut sections = Vec::new();
    let mut current = String::new();
    let mut chars = code.chars();
    let mut in_quote = false;

    while let Some(c) = chars.next() {
        match c {
            '"' => {
                in_quote = !in_quote;
                current.push(c);
            }
            '\\' if !in_quote => {
                current.push(c);
                if let Some(next) = chars.next() {
                    current.push(next);
                }
            }
            ';' if !in_quote => sections.push(std::mem::take(&mut current)),
            _ => current.push(c),
        }
    }

    sections.push(current);
    sections
}

fn tokenize(section: &str) -> Option<Vec<Token>> {
    let mut tokens = Vec::new();
    let mut chars = section.chars();

    while let Some(c) = chars.next() {
        match c {
            '0' | '#' | '?' => tokens.push(Token::Digit(c)),
            '.' => tokens.push(Token::Point),
            ',' => tokens.push(Token::Comma),
            '%' => tokens.push(Token::Percent),
            '"' => {
                let literal: String = chars.by_ref().take_while(|&c| c != '"').collect();
                tokens.push(Token::Literal(literal));
            }
            '\\' => tokens.push(Token::Literal(chars.next()?.to_string())),
            '_' => {
                chars.next();
                tokens.push(Token::Literal(" ".to_string()));
            }
            '*' => {
                chars.next();
            }
            '[' => {
                let content: String = chars.by_ref().take_while(|&c| c != ']').collect();
                if let Some(currency) = content.strip_prefix('$') {
                    // [$R$-416] → "R$"
                    let symbol = currency.split('-').next().unwrap_or_default();
                    tokens.push(Token::Literal(symbol.to_string()));
                } else if content.starts_with(['<', '>', '=']) {
                    return None;
                }
                // 颜色 [Red] 等忽略
            }
            '@' | '/' => return None,
            c if c.is_alphabetic() => return None,
            c => tokens.push(Token::Literal(c.to_string())),
        }
    }

    Some(tokens)
}

/// 按 Excel 数字格式码渲染数值
///
/// # 返回
/// - Some(String): 显示文本
/// - None: General、日期、科学计数、分数、文本格式等不支持的格式码
pub fn render_number(value: f64, code: &str) -> Option<String> {
    if !value.is_finite() || code.eq_ignore_ascii_case("general") {
        return None;
    }

    let sections = split_sections(code);
    let non_empty = |idx: usize| sections.get(idx).filter(|s| !s.is_empty());

    let (section, with_sign) = if value < 0.0 {
        match non_empty(1) {
            Some(negative) => (negative, false),
            None => (&sections[0], true),
        }
    } else if value == 0.0 {
        (non_empty(2).unwrap_or(&sections[0]), false)
    } else {
        (&sections[0], false)
    };

    let tokens = tokenize(section)?;
    let rendered = render_section(value.abs(), &tokens)?;

    if with_sign && rendered.chars().any(|c| c.is_ascii_digit() && c != '0') {
        Some(format!("-{}", rendered))
    } else {
        Some(rendered)
    }
}

fn render_section(value: f64, tokens: &[Token]) -> Option<String> {
    if !tokens.iter().any(|t| matches!(t, Token::Digit(_))) {
        return Some(
            tokens
                .iter()
                .filter_map(|t| match t {
                    Token::Literal(s) => Some(s.as_str()),
                    _ => None,
                })
                .collect(),
        );
    }

    let point = tokens.iter().position(|t| matches!(t, Token::Point));
    let (int_tokens, frac_tokens) = match point {
        Some(idx) => (&tokens[..idx], &tokens[idx + 1..]),
        None => (tokens, &tokens[..0]),
    };

    let first_digit = int_tokens.iter().position(|t| matches!(t, Token::Digit(_)));
    let last_digit = int_tokens.iter().rposition(|t| matches!(t, Token::Digit(_)));

    // 占位符之间的逗号 = 千分位；末尾逗号 = 除以 1000
    let (grouping, scale) = match (first_digit, last_digit) {
        (Some(first), Some(last)) => (
            int_tokens[first..last]
                .iter()
                .any(|t| matches!(t, Token::Comma)),
            int_tokens[last..]
                .iter()
                .filter(|t| matches!(t, Token::Comma))
                .count(),
        ),
        _ => (false, 0),
    };

    let percent = tokens.iter().filter(|t| matches!(t, Token::Percent)).count();
    let value = value * 100f64.powi(percent as i32) / 1000f64.powi(scale as i32);

    let frac_places = frac_tokens
        .iter()
        .filter(|t| matches!(t, Token::Digit(_)))
        .count();
    let fixed = format!("{:.*}", frac_places, value);
    let (int_digits, frac_digits) = fixed.split_once('.').unwrap_or((fixed.as_str(), ""));
    let int_digits = if int_digits == "0" { "" } else { int_digits };

    let mut out = if grouping {
        render_grouped_integer(int_tokens, int_digits)
    } else {
        render_integer(int_tokens, int_digits)
    };

    if point.is_some() {
        out.push('.');
        out.push_str(&render_fraction(frac_tokens, frac_digits));
    }

    Some(out)
}

/// 从右向左填充整数占位符；多余高位数字放在最左占位符前
fn render_integer(tokens: &[Token], digits: &str) -> String {
    let mut remaining: Vec<char> = digits.chars().collect();
    let first_digit = tokens.iter().position(|t| matches!(t, Token::Digit(_)));
    let mut pieces: Vec<String> = Vec::new();

    for (idx, token) in tokens.iter().enumerate().rev() {
        match token {
            Token::Digit(placeholder) => {
                match remaining.pop() {
                    Some(d) => pieces.push(d.to_string()),
                    None => match placeholder {
                        '0' => pieces.push("0".to_string()),
                        '?' => pieces.push(" ".to_string()),
                        _ => {}
                    },
                }
                if Some(idx) == first_digit && !remaining.is_empty() {
                    pieces.push(remaining.drain(..).collect());
                }
            }
            Token::Literal(s) => pieces.push(s.clone()),
            Token::Percent => pieces.push("%".to_string()),
            Token::Comma | Token::Point => {}
        }
    }

    pieces.reverse();
    pieces.concat()
}

/// 千分位格式: 前后字面量保留，数字段按三位分组
fn render_grouped_integer(tokens: &[Token], digits: &str) -> String {
    let min_digits = tokens
        .iter()
        .filter(|t| matches!(t, Token::Digit('0')))
        .count();
    let padded = format!("{:0>width$}", digits, width = min_digits);

    let mut grouped = String::new();
    for (idx, c) in padded.chars().enumerate() {
        if idx > 0 && (padded.len() - idx) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }

    let first = tokens.iter().position(|t| matches!(t, Token::Digit(_)));
    let last = tokens.iter().rposition(|t| matches!(t, Token::Digit(_)));
    let affix = |slice: &[Token]| -> String {
        slice
            .iter()
            .filter_map(|t| match t {
                Token::Literal(s) => Some(s.clone()),
                Token::Percent => Some("%".to_string()),
                _ => None,
            })
            .collect()
    };

    match (first, last) {
        (Some(first), Some(last)) => {
            format!("{}{}{}", affix(&tokens[..first]), grouped, affix(&tokens[last + 1..]))
        }
        _ => grouped,
    }
}

/// 从左向右填充小数占位符；末尾的 '#' 零省略、'?' 零显示为空格
fn render_fraction(tokens: &[Token], digits: &str) -> String {
    let mut digits = digits.chars();
    let mut pieces: Vec<(Option<char>, String)> = tokens
        .iter()
        .filter_map(|token| match token {
            Token::Digit(p) => Some((Some(*p), digits.next().unwrap_or('0').to_string())),
            Token::Literal(s) => Some((None, s.clone())),
            Token::Percent => Some((None, "%".to_string())),
            Token::Comma | Token::Point => None,
        })
        .collect();

    for (placeholder, text) in pieces.iter_mut().rev() {
        let Some(placeholder) = placeholder else {
            continue;
        };
        if text.as_str() != "0" {
            break;
        }
        match placeholder {
            '#' => text.clear(),
            '?' => *text = " ".to_string(),
            _ => break,
        }
    }

    pieces.into_iter().map(|(_, text)| text).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_padded_tax_id() {
        assert_eq!(
            render_number(1234567890.0, "00000000000").as_deref(),
            Some("01234567890")
        );
    }

    #[test]
    fn test_literal_masks() {
        assert_eq!(
            render_number(12345678000190.0, r"00\.000\.000\/0000\-00").as_deref(),
            Some("12.345.678/0001-90")
        );
        assert_eq!(
            render_number(1234567890.0, r"000\.000\.000\-00").as_deref(),
            Some("012.345.678-90")
        );
        assert_eq!(
            render_number(5.0, "\"Nota \"0").as_deref(),
            Some("Nota 5")
        );
    }

    #[test]
    fn test_decimals_grouping_and_percent() {
        assert_eq!(render_number(8.5, "0.00").as_deref(), Some("8.50"));
        assert_eq!(render_number(1234.5, "#,##0.00").as_deref(), Some("1,234.50"));
        assert_eq!(render_number(1234567.0, "#,##0").as_deref(), Some("1,234,567"));
        assert_eq!(render_number(0.25, "0%").as_deref(), Some("25%"));
        assert_eq!(render_number(0.5, "#.00").as_deref(), Some(".50"));
        assert_eq!(render_number(7.0, "0.##").as_deref(), Some("7."));
        assert_eq!(
            render_number(1234.5, "[$R$-416] #,##0.00").as_deref(),
            Some("R$ 1,234.50")
        );
    }

    #[test]
    fn test_negative_sections() {
        assert_eq!(render_number(-3.0, "0").as_deref(), Some("-3"));
        assert_eq!(render_number(-3.0, "0.00;(0.00)").as_deref(), Some("(3.00)"));
        assert_eq!(render_number(0.0, "0;-0;\"zero\"").as_deref(), Some("zero"));
    }

    #[test]
    fn test_unsupported_codes_fall_back() {
        assert_eq!(render_number(1.0, "General"), None);
        assert_eq!(render_number(1.0, "0.00E+00"), None);
        assert_eq!(render_number(45292.0, "dd/mm/yyyy"), None);
        assert_eq!(render_number(0.5, "# ?/?"), None);
        assert!(!is_renderable("@"));
        assert!(is_renderable("00000000000"));
    }

    #[test]
    fn test_parse_cell_ref() {
        assert_eq!(parse_cell_ref("A1"), Some((0, 0)));
        assert_eq!(parse_cell_ref("B12"), Some((11, 1)));
        assert_eq!(parse_cell_ref("AA3"), Some((2, 26)));
        assert_eq!(parse_cell_ref("12"), None);
    }

    #[test]
    fn test_parse_styles_and_sheet() {
        let styles = r#"<?xml version="1.0" encoding="UTF-8"?>
<styleSheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main">
  <numFmts count="2">
    <numFmt numFmtId="164" formatCode="00000000000"/>
    <numFmt numFmtId="165" formatCode="dd/mm/yyyy"/>
  </numFmts>
  <cellXfs count="4">
    <xf numFmtId="0"/>
    <xf numFmtId="164" applyNumberFormat="1"/>
    <xf numFmtId="165" applyNumberFormat="1"/>
    <xf numFmtId="4" applyNumberFormat="1"/>
  </cellXfs>
</styleSheet>"#;
        let xf_codes = parse_cell_xfs(styles).unwrap();
        assert_eq!(
            xf_codes,
            vec![
                None,
                Some("00000000000".to_string()),
                None,
                Some("#,##0.00".to_string())
            ]
        );

        let sheet = r#"<worksheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main">
  <sheetData>
    <row r="2"><c r="A2" t="s"><v>0</v></c><c r="B2" s="1"><v>1234567890</v></c><c r="C2" s="2"><v>45292</v></c></row>
    <row r="3"><c r="D3" s="3"><v>12.5</v></c></row>
  </sheetData>
</worksheet>"#;
        let cells = parse_cell_styles(sheet, &xf_codes).unwrap();
        let formats = CellNumberFormats { cells, xf_codes };

        assert_eq!(formats.code_at(1, 1), Some("00000000000"));
        assert_eq!(formats.code_at(1, 2), None);
        assert_eq!(formats.code_at(1, 0), None);
        assert_eq!(formats.code_at(2, 3), Some("#,##0.00"));
    }
}
