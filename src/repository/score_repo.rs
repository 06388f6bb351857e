// ==========================================
// 供应商资质表导入系统 - 评分（Nota）仓储
// ==========================================
// 职责: score_record 表的插入与查询
// 约束: 一次插入 = 10 个评分字段 + 供应商外键，单条语句全写或全不写
// ==========================================

use crate::domain::score::{ScoreRecord, ScoreRecordId, SCORE_FIELD_COUNT};
use crate::domain::supplier::SupplierId;
use crate::repository::error::{RepositoryError, RepositoryResult};
use rusqlite::{params, Connection, Row};
use std::sync::{Arc, Mutex, MutexGuard};

pub struct ScoreRepository {
    conn: Arc<Mutex<Connection>>,
}

impl ScoreRepository {
    /// 从共享连接创建仓储实例
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn get_conn(&self) -> RepositoryResult<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    /// 插入一条评分记录
    ///
    /// # 参数
    /// - scores: 评分值，必须恰好 10 个
    /// - supplier_id: 已解析的供应商 id
    ///
    /// # 返回
    /// - Ok(ScoreRecordId): 新评分记录 id
    /// - Err(FieldCountMismatch): 字段数不为 10（未触达存储）
    /// - Err: 存储失败（含外键违反）
    pub fn insert(
        &self,
        scores: &[f64],
        supplier_id: SupplierId,
    ) -> RepositoryResult<ScoreRecordId> {
        let conn = self.get_conn()?;
        Self::insert_tx(&conn, scores, supplier_id)
    }

    /// 在调用方持有的连接/事务上插入评分记录
    pub fn insert_tx(
        conn: &Connection,
        scores: &[f64],
        supplier_id: SupplierId,
    ) -> RepositoryResult<ScoreRecordId> {
        let scores: &[f64; SCORE_FIELD_COUNT] =
            scores
                .try_into()
                .map_err(|_| RepositoryError::FieldCountMismatch {
                    entity: "score_record".to_string(),
                    expected: SCORE_FIELD_COUNT,
                    actual: scores.len(),
                })?;

        conn.execute(
            r#"
            INSERT INTO score_record (
                supplier_id, n1, n2, n3, n4, n5, n6, n7, n8, n9, n10
            ) VALUES (
                ?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11
            )
            "#,
            params![
                supplier_id.value(),
                scores[0],
                scores[1],
                scores[2],
                scores[3],
                scores[4],
                scores[5],
                scores[6],
                scores[7],
                scores[8],
                scores[9],
            ],
        )?;

        Ok(ScoreRecordId(conn.last_insert_rowid()))
    }

    /// 查询某供应商的全部评分（按插入顺序）
    pub fn list_by_supplier(&self, supplier_id: SupplierId) -> RepositoryResult<Vec<ScoreRecord>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(
            r#"
            SELECT id, supplier_id, n1, n2, n3, n4, n5, n6, n7, n8, n9, n10
            FROM score_record WHERE supplier_id = ?1 ORDER BY id
            "#,
        )?;

        let records = stmt
            .query_map(params![supplier_id.value()], Self::map_row)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(records)
    }

    /// 统计评分记录总数
    pub fn count(&self) -> RepositoryResult<usize> {
        let conn = self.get_conn()?;
        let count: i64 =
            conn.query_row("SELECT COUNT(*) FROM score_record", [], |row| row.get(0))?;
        Ok(count as usize)
    }

    fn map_row(row: &Row) -> rusqlite::Result<ScoreRecord> {
        let mut scores = [0.0; SCORE_FIELD_COUNT];
        for (idx, slot) in scores.iter_mut().enumerate() {
            *slot = row.get(idx + 2)?;
        }

        Ok(ScoreRecord {
            id: ScoreRecordId(row.get(0)?),
            supplier_id: SupplierId(row.get(1)?),
            scores,
        })
    }
}
