// ==========================================
// 供应商资质表导入系统 - API层错误类型
// ==========================================
// 职责: 将导入层/仓储层错误转换为面向调用方的单一失败信息
// ==========================================

use crate::importer::ImportError;
use crate::repository::error::RepositoryError;
use thiserror::Error;

/// API层错误类型
#[derive(Error, Debug)]
pub enum ApiError {
    // ==========================================
    // 上传边界错误（核心流程尚未开始）
    // ==========================================
    #[error("上传失败: {0}")]
    UploadError(String),

    // ==========================================
    // 导入错误（整次导入失败）
    // ==========================================
    #[error("文件格式错误: {0}")]
    SourceFormatError(String),

    #[error("表格布局不符: {0}")]
    LayoutError(String),

    #[error("文件导入失败: {0}")]
    ImportError(String),

    // ==========================================
    // 数据访问/配置错误
    // ==========================================
    #[error("数据库错误: {0}")]
    DatabaseError(String),

    #[error("数据库连接失败: {0}")]
    DatabaseConnectionError(String),

    #[error("配置错误: {0}")]
    ConfigError(String),

    // ==========================================
    // 通用错误
    // ==========================================
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

// ==========================================
// 从 ImportError 转换
// ==========================================
impl From<ImportError> for ApiError {
    fn from(err: ImportError) -> Self {
        match err {
            ImportError::UnsupportedExtension { .. } | ImportError::UploadStorage(_) => {
                ApiError::UploadError(err.to_string())
            }
            ImportError::SourceFormat(msg) => ApiError::SourceFormatError(msg),
            ImportError::LayoutMismatch { .. } => ApiError::LayoutError(err.to_string()),
            ImportError::Database(msg) => ApiError::DatabaseError(msg),
            ImportError::Config(msg) => ApiError::ConfigError(msg),
            ImportError::Persistence(repo_err) => ApiError::from(repo_err),
            ImportError::Validation { .. } => ApiError::ImportError(err.to_string()),
            ImportError::Other(err) => ApiError::Other(err),
        }
    }
}

// ==========================================
// 从 RepositoryError 转换
// ==========================================
impl From<RepositoryError> for ApiError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::LockError(msg) => {
                ApiError::DatabaseConnectionError(format!("数据库锁获取失败: {}", msg))
            }
            RepositoryError::Other(err) => ApiError::Other(err),
            other => ApiError::DatabaseError(other.to_string()),
        }
    }
}

/// Result 类型别名
pub type ApiResult<T> = Result<T, ApiError>;
