// ==========================================
// 供应商资质表导入系统 - 导入模块错误类型
// ==========================================
// 工具: thiserror 派生宏
// 作用域:
// - 整次导入失败: SourceFormat / LayoutMismatch / Database / Config / 上传类
// - 行级失败（记录后继续）: Validation / Persistence
// ==========================================

use crate::repository::RepositoryError;
use thiserror::Error;

/// 导入模块错误类型
#[derive(Error, Debug)]
pub enum ImportError {
    // ===== 文件相关错误 =====
    #[error("表格文件无法读取: {0}")]
    SourceFormat(String),

    #[error("表格列宽不足: 需要至少 {required} 列，实际 {actual} 列")]
    LayoutMismatch { required: usize, actual: usize },

    // ===== 行级错误 =====
    #[error("数据校验失败 (行 {row}): {message}")]
    Validation { row: usize, message: String },

    #[error("持久化失败: {0}")]
    Persistence(#[from] RepositoryError),

    // ===== 上传错误 =====
    #[error("上传失败，仅允许 Excel 文件（{allowed}）: {file_name}")]
    UnsupportedExtension { file_name: String, allowed: String },

    #[error("上传文件保存失败: {0}")]
    UploadStorage(String),

    // ===== 运行环境错误 =====
    #[error("数据库不可用: {0}")]
    Database(String),

    #[error("配置错误: {0}")]
    Config(String),

    // ===== 通用错误 =====
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl ImportError {
    /// 是否为上传边界错误（核心流程尚未开始）
    pub fn is_upload(&self) -> bool {
        matches!(
            self,
            ImportError::UnsupportedExtension { .. } | ImportError::UploadStorage(_)
        )
    }
}

// 实现 From<calamine::Error>
impl From<calamine::Error> for ImportError {
    fn from(err: calamine::Error) -> Self {
        ImportError::SourceFormat(err.to_string())
    }
}

/// Result 类型别名
pub type ImportResult<T> = Result<T, ImportError>;
