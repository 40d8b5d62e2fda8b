// ==========================================
// 木工车间产量系统 - API层错误类型
// ==========================================
// 职责: 定义API层错误类型，转换下层错误为用户可读的提示
// ==========================================

use crate::api::notice::Notice;
use crate::domain::types::MIN_DAILY_TARGET;
use crate::importer::error::{ExportError, ImportError};
use crate::repository::error::RepositoryError;
use thiserror::Error;

/// API层错误类型
#[derive(Error, Debug)]
pub enum ApiError {
    // ==========================================
    // 表单校验错误
    // ==========================================
    #[error("缺少日期")]
    MissingDate,

    #[error("日期无效: {0}")]
    InvalidDate(String),

    #[error("产量无效: {0}")]
    InvalidOutput(String),

    #[error("工时无效: {0}")]
    InvalidHours(String),

    #[error("目标值低于下限或无效: {0}")]
    TargetTooLow(String),

    #[error("未知机台: {0}")]
    UnknownMachine(String),

    // ==========================================
    // 业务错误
    // ==========================================
    #[error("记录不存在: {0}")]
    NotFound(String),

    // ==========================================
    // 文件错误
    // ==========================================
    #[error("文件导入失败: {0}")]
    ImportFailed(#[from] ImportError),

    #[error("文件导出失败: {0}")]
    ExportFailed(#[from] ExportError),

    // ==========================================
    // 数据访问错误
    // ==========================================
    #[error("数据库错误: {0}")]
    DatabaseError(String),

    #[error("数据库连接失败: {0}")]
    DatabaseConnectionError(String),

    #[error("数据验证失败: {0}")]
    ValidationError(String),
}

// ==========================================
// 从 RepositoryError 转换
// ==========================================
impl From<RepositoryError> for ApiError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::NotFound { id, .. } => ApiError::NotFound(id),
            RepositoryError::LockError(msg) => {
                ApiError::DatabaseConnectionError(format!("数据库锁获取失败: {}", msg))
            }
            RepositoryError::DatabaseQueryError(msg) => ApiError::DatabaseError(msg),
            RepositoryError::UniqueConstraintViolation(msg) => {
                ApiError::ValidationError(format!("唯一约束违反: {}", msg))
            }
            RepositoryError::ValidationError(msg) => ApiError::ValidationError(msg),
            RepositoryError::FieldValueError { field, message } => {
                ApiError::ValidationError(format!("字段{}错误: {}", field, message))
            }
        }
    }
}

impl ApiError {
    /// 转换为本地化提示
    pub fn to_notice(&self) -> Notice {
        match self {
            ApiError::MissingDate => Notice::error("validation.missing_date", &[]),
            ApiError::InvalidDate(v) => Notice::error("validation.invalid_date", &[("value", v.as_str())]),
            ApiError::InvalidOutput(v) => {
                Notice::error("validation.invalid_output", &[("value", v.as_str())])
            }
            ApiError::InvalidHours(v) => Notice::error("validation.invalid_hours", &[("value", v.as_str())]),
            ApiError::TargetTooLow(v) => Notice::error(
                "validation.target_too_low",
                &[("min", MIN_DAILY_TARGET.to_string().as_str()), ("value", v.as_str())],
            ),
            ApiError::UnknownMachine(m) => {
                Notice::error("validation.unknown_machine", &[("machine", m.as_str())])
            }
            ApiError::NotFound(id) => Notice::error("production.not_found", &[("id", id.as_str())]),
            ApiError::ImportFailed(e) => {
                Notice::error("import.failed", &[("reason", e.to_string().as_str())])
            }
            ApiError::ExportFailed(e) => {
                Notice::error("export.failed", &[("reason", e.to_string().as_str())])
            }
            ApiError::DatabaseError(msg) | ApiError::DatabaseConnectionError(msg) => {
                Notice::error("error.database", &[("reason", msg.as_str())])
            }
            ApiError::ValidationError(msg) => {
                Notice::error("error.internal", &[("reason", msg.as_str())])
            }
        }
    }
}

/// Result 类型别名
pub type ApiResult<T> = Result<T, ApiError>;
