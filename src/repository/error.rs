// ==========================================
// 供应商资质表导入系统 - 仓储层错误类型
// ==========================================
// 工具: thiserror 派生宏
// 分类: 校验错误（行形状不符）与持久化错误（存储不可达/约束违反）
// ==========================================

use thiserror::Error;

/// 仓储层错误类型
#[derive(Error, Debug)]
pub enum RepositoryError {
    // ===== 数据库错误 =====
    #[error("记录未找到: {entity} with id={id}")]
    NotFound { entity: String, id: String },

    #[error("数据库锁获取失败: {0}")]
    LockError(String),

    #[error("数据库事务失败: {0}")]
    DatabaseTransactionError(String),

    #[error("数据库查询失败: {0}")]
    DatabaseQueryError(String),

    #[error("唯一约束违反: {0}")]
    UniqueConstraintViolation(String),

    #[error("外键约束违反: {0}")]
    ForeignKeyViolation(String),

    #[error("约束违反: {0}")]
    ConstraintViolation(String),

    // ===== 数据形状错误 =====
    #[error("字段数量错误 (entity={entity}): 期望 {expected}，实际 {actual}")]
    FieldCountMismatch {
        entity: String,
        expected: usize,
        actual: usize,
    },

    // ===== 通用错误 =====
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl RepositoryError {
    /// 是否为校验类错误（行形状不符，未触达存储）
    pub fn is_validation(&self) -> bool {
        matches!(self, RepositoryError::FieldCountMismatch { .. })
    }
}

// 实现 From<rusqlite::Error>
impl From<rusqlite::Error> for RepositoryError {
    fn from(err: rusqlite::Error) -> Self {
        match err {
            rusqlite::Error::SqliteFailure(_, Some(msg)) => {
                if msg.contains("UNIQUE") {
                    RepositoryError::UniqueConstraintViolation(msg)
                } else if msg.contains("FOREIGN KEY") {
                    RepositoryError::ForeignKeyViolation(msg)
                } else if msg.contains("constraint") || msg.contains("NOT NULL") {
                    RepositoryError::ConstraintViolation(msg)
                } else {
                    RepositoryError::DatabaseQueryError(msg)
                }
            }
            rusqlite::Error::QueryReturnedNoRows => RepositoryError::NotFound {
                entity: "Unknown".to_string(),
                id: "Unknown".to_string(),
            },
            _ => RepositoryError::DatabaseQueryError(err.to_string()),
        }
    }
}

/// Result 类型别名
pub type RepositoryResult<T> = Result<T, RepositoryError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_validation() {
        assert!(RepositoryError::FieldCountMismatch {
            entity: "score_record".to_string(),
            expected: 10,
            actual: 9,
        }
        .is_validation());
        assert!(!RepositoryError::DatabaseQueryError("x".to_string()).is_validation());
    }

    #[test]
    fn test_from_sqlite_foreign_key_failure() {
        let err = rusqlite::Error::SqliteFailure(
            rusqlite::ffi::Error::new(787),
            Some("FOREIGN KEY constraint failed".to_string()),
        );
        assert!(matches!(
            RepositoryError::from(err),
            RepositoryError::ForeignKeyViolation(_)
        ));
    }
}
