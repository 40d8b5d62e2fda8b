// ==========================================
// 木工车间产量系统 - 表格编解码层
// ==========================================
// 职责: 生产记录与表格文件之间的导入/导出
// 支持: Excel (.xlsx/.xls), CSV
// ==========================================

// 模块声明
pub mod error;
pub mod exporter;
pub mod file_parser;
pub mod importer_trait;
pub mod record_importer;
pub mod record_mapper;
pub mod schema;

// 重导出核心类型
pub use error::{ExportError, ExportResult, ImportError, ImportResult};
pub use exporter::{default_file_name, RecordExporter};
pub use file_parser::{CsvParser, ExcelParser, UniversalFileParser};
pub use record_importer::SpreadsheetImporter;
pub use record_mapper::{ImportReport, RecordMapper, SkipReason, SkippedRow};

// 重导出 Trait 接口
pub use importer_trait::{FileParser, RecordImporter};
