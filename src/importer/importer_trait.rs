// ==========================================
// 木工车间产量系统 - 导入 Trait
// ==========================================
// 职责: 定义表格导入接口（不包含实现）
// ==========================================

use crate::domain::production::ProductionRecord;
use crate::importer::error::ImportResult;
use crate::importer::record_mapper::ImportReport;
use async_trait::async_trait;
use std::collections::HashMap;
use std::path::Path;

// ==========================================
// RawRow / ParsedSheet - 解析中间结构
// ==========================================

/// 原始行（列名 → 单元格文本）
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawRow {
    pub row_number: usize, // 表格中的行号（表头为第 1 行）
    pub cells: HashMap<String, String>,
}

impl RawRow {
    /// 按列名及别名取值，空白视为缺失
    pub fn get(&self, names: &[&str]) -> Option<&str> {
        names
            .iter()
            .filter_map(|name| self.cells.get(*name))
            .map(|v| v.trim())
            .find(|v| !v.is_empty())
    }
}

/// 第一张工作表（或 CSV 正文）的解析结果
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParsedSheet {
    pub headers: Vec<String>,
    pub rows: Vec<RawRow>,
}

// ==========================================
// FileParser Trait
// ==========================================
// 用途: 文件解析接口
// 实现者: CsvParser, ExcelParser
pub trait FileParser: Send + Sync {
    /// 解析文件内容为原始行
    ///
    /// # 参数
    /// - bytes: 文件完整内容
    ///
    /// # 返回
    /// - Ok(ParsedSheet): 表头与非空行
    /// - Err: 格式错误
    fn parse_bytes(&self, bytes: &[u8]) -> ImportResult<ParsedSheet>;
}

// ==========================================
// RecordImporter Trait
// ==========================================
// 用途: 表格 → 生产记录 主接口
// 实现者: SpreadsheetImporter
#[async_trait]
pub trait RecordImporter: Send + Sync {
    /// 读取并解析文件
    ///
    /// # 返回
    /// - Ok((records, report)): 全量解析成功后的记录与导入报告
    /// - Err: 文件不可读/格式错误（调用方不得修改现有记录）
    async fn import_file(
        &self,
        file_path: &Path,
    ) -> ImportResult<(Vec<ProductionRecord>, ImportReport)>;
}
