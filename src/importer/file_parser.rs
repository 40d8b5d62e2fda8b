// ==========================================
// 木工车间产量系统 - 文件解析器实现
// ==========================================
// 支持: Excel (.xlsx/.xls) / CSV (.csv)
// 说明: 仅读取第一张工作表；第一行为表头
// ==========================================

use crate::importer::error::{ImportError, ImportResult};
use crate::importer::importer_trait::{FileParser, ParsedSheet, RawRow};
use calamine::{Data, Range, Reader, Xls, Xlsx};
use csv::ReaderBuilder;
use std::collections::HashMap;
use std::io::Cursor;
use std::path::Path;

// ==========================================
// CSV Parser 实现
// ==========================================
pub struct CsvParser;

impl FileParser for CsvParser {
    fn parse_bytes(&self, bytes: &[u8]) -> ImportResult<ParsedSheet> {
        // 去掉 UTF-8 BOM（Excel 另存 CSV 时常见）
        let body = bytes.strip_prefix(b"\xEF\xBB\xBF").unwrap_or(bytes);

        let mut reader = ReaderBuilder::new()
            .has_headers(true)
            .flexible(true) // 允许行长度不一致
            .from_reader(body);

        // 读取表头
        let headers: Vec<String> = reader
            .headers()?
            .iter()
            .map(|h| h.trim().to_string())
            .collect();

        // 读取所有行
        let mut rows = Vec::new();
        for (idx, result) in reader.records().enumerate() {
            let record = result?;
            let cells: HashMap<String, String> = headers
                .iter()
                .cloned()
                .zip(record.iter().map(|v| v.trim().to_string()))
                .collect();

            // 跳过完全空白的行
            if cells.values().all(|v| v.is_empty()) {
                continue;
            }

            rows.push(RawRow {
                row_number: idx + 2,
                cells,
            });
        }

        Ok(ParsedSheet { headers, rows })
    }
}

// ==========================================
// Excel Parser 实现
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExcelKind {
    Xlsx,
    Xls,
}

pub struct ExcelParser {
    kind: ExcelKind,
}

impl ExcelParser {
    pub fn new(kind: ExcelKind) -> Self {
        Self { kind }
    }
}

impl FileParser for ExcelParser {
    fn parse_bytes(&self, bytes: &[u8]) -> ImportResult<ParsedSheet> {
        let range = match self.kind {
            ExcelKind::Xlsx => first_sheet_range::<Xlsx<Cursor<&[u8]>>>(bytes)?,
            ExcelKind::Xls => first_sheet_range::<Xls<Cursor<&[u8]>>>(bytes)?,
        };
        Ok(range_to_sheet(&range))
    }
}

/// 打开工作簿并读取第一张工作表
fn first_sheet_range<'a, R>(bytes: &'a [u8]) -> ImportResult<Range<Data>>
where
    R: Reader<Cursor<&'a [u8]>>,
    R::Error: std::fmt::Display,
{
    let mut workbook =
        R::new(Cursor::new(bytes)).map_err(|e| ImportError::ExcelParseError(e.to_string()))?;

    let sheet_name = workbook
        .sheet_names()
        .first()
        .cloned()
        .ok_or_else(|| ImportError::ExcelParseError("Excel 文件无工作表".to_string()))?;

    workbook
        .worksheet_range(&sheet_name)
        .map_err(|e| ImportError::ExcelParseError(e.to_string()))
}

/// 工作表区域 → 表头 + 行
fn range_to_sheet(range: &Range<Data>) -> ParsedSheet {
    let mut rows_iter = range.rows();
    let headers: Vec<String> = match rows_iter.next() {
        Some(header_row) => header_row.iter().map(|c| cell_to_string(c).trim().to_string()).collect(),
        None => return ParsedSheet::default(),
    };

    // 区域可能不从 A1 开始
    let first_row = range.start().map(|(r, _)| r as usize).unwrap_or(0);

    let mut rows = Vec::new();
    for (idx, data_row) in rows_iter.enumerate() {
        let mut cells = HashMap::new();
        for (col_idx, cell) in data_row.iter().enumerate() {
            if let Some(header) = headers.get(col_idx) {
                if header.is_empty() {
                    continue;
                }
                cells.insert(header.clone(), cell_to_string(cell).trim().to_string());
            }
        }

        // 跳过完全空白的行
        if cells.values().all(|v| v.is_empty()) {
            continue;
        }

        rows.push(RawRow {
            row_number: first_row + idx + 2,
            cells,
        });
    }

    ParsedSheet { headers, rows }
}

/// 单元格 → 文本
///
/// 整数值浮点不带小数；日期单元格输出 Excel 序列号（由映射层换算）
fn cell_to_string(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        Data::String(s) => s.clone(),
        Data::Float(n) => {
            if n.fract() == 0.0 && n.abs() < 1e15 {
                format!("{}", *n as i64)
            } else {
                format!("{}", n)
            }
        }
        Data::Int(n) => n.to_string(),
        Data::Bool(b) => b.to_string(),
        Data::DateTime(dt) => format!("{}", dt.as_f64()),
        Data::DateTimeIso(s) => s.clone(),
        Data::Error(_) => String::new(),
        other => other.to_string(),
    }
}

// ==========================================
// 通用文件解析器（根据扩展名自动选择）
// ==========================================
pub struct UniversalFileParser;

impl UniversalFileParser {
    /// 根据扩展名选择解析器
    pub fn for_path(path: &Path) -> ImportResult<Box<dyn FileParser>> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("")
            .to_lowercase();

        match ext.as_str() {
            "csv" => Ok(Box::new(CsvParser)),
            "xlsx" => Ok(Box::new(ExcelParser::new(ExcelKind::Xlsx))),
            "xls" => Ok(Box::new(ExcelParser::new(ExcelKind::Xls))),
            _ => Err(ImportError::UnsupportedFormat(ext)),
        }
    }

    /// 同步读取并解析文件
    pub fn parse<P: AsRef<Path>>(&self, file_path: P) -> ImportResult<ParsedSheet> {
        let path = file_path.as_ref();
        if !path.exists() {
            return Err(ImportError::FileNotFound(path.display().to_string()));
        }
        let parser = Self::for_path(path)?;
        let bytes = std::fs::read(path)?;
        parser.parse_bytes(&bytes)
    }
}
