// ==========================================
// 供应商资质表导入系统 - 供应商仓储
// ==========================================
// 职责: supplier 表的查找与插入
// 红线: 不含去重决策，去重由导入流程基于 find_by_tax_id 完成
// ==========================================

use crate::domain::supplier::{
    NewSupplier, SupplierId, SupplierLookup, SupplierRecord, SUPPLIER_COLUMNS, SUPPLIER_FIELD_COUNT,
};
use crate::repository::error::{RepositoryError, RepositoryResult};
use rusqlite::{params, params_from_iter, Connection, OptionalExtension, Row};
use std::sync::{Arc, Mutex, MutexGuard};

// ==========================================
// SupplierRepository - 供应商仓储
// ==========================================
pub struct SupplierRepository {
    conn: Arc<Mutex<Connection>>,
}

impl SupplierRepository {
    /// 从共享连接创建仓储实例
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    /// 获取数据库连接
    fn get_conn(&self) -> RepositoryResult<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    /// 按税号精确查找供应商 id
    ///
    /// # 返回
    /// - Ok(SupplierLookup::Found(id)): 已存在（多条时取最早插入的一条）
    /// - Ok(SupplierLookup::NotFound): 不存在
    pub fn find_by_tax_id(&self, tax_id: &str) -> RepositoryResult<SupplierLookup> {
        let conn = self.get_conn()?;
        Self::find_by_tax_id_tx(&conn, tax_id)
    }

    /// 在调用方持有的连接/事务上按税号查找
    pub fn find_by_tax_id_tx(conn: &Connection, tax_id: &str) -> RepositoryResult<SupplierLookup> {
        let id: Option<i64> = conn
            .query_row(
                "SELECT id FROM supplier WHERE tax_id = ?1 ORDER BY id LIMIT 1",
                params![tax_id],
                |row| row.get(0),
            )
            .optional()?;

        Ok(SupplierLookup::from(id))
    }

    /// 插入供应商并返回存储层分配的 id
    ///
    /// # 返回
    /// - Ok(SupplierId): 新供应商 id
    /// - Err: 约束违反 / 连接异常（调用方按“跳过该行”处理）
    pub fn insert(&self, supplier: &NewSupplier) -> RepositoryResult<SupplierId> {
        let conn = self.get_conn()?;
        Self::insert_tx(&conn, supplier)
    }

    /// 在调用方持有的连接/事务上插入供应商
    pub fn insert_tx(conn: &Connection, supplier: &NewSupplier) -> RepositoryResult<SupplierId> {
        let placeholders: Vec<String> = (1..=SUPPLIER_FIELD_COUNT).map(|i| format!("?{}", i)).collect();
        let sql = format!(
            "INSERT INTO supplier ({}) VALUES ({})",
            SUPPLIER_COLUMNS.join(", "),
            placeholders.join(", ")
        );

        conn.execute(&sql, params_from_iter(supplier.values()))?;

        Ok(SupplierId(conn.last_insert_rowid()))
    }

    /// 按 id 读取供应商
    pub fn find_by_id(&self, id: SupplierId) -> RepositoryResult<Option<SupplierRecord>> {
        let conn = self.get_conn()?;
        let record = conn
            .query_row(
                r#"
                SELECT id, name, tax_id, homologation_date, status, service_scope,
                       qualified, person_type, contact_name, phone, email,
                       bank, branch, account, fcpa
                FROM supplier WHERE id = ?1
                "#,
                params![id.value()],
                Self::map_row,
            )
            .optional()?;

        Ok(record)
    }

    /// 统计供应商总数
    pub fn count(&self) -> RepositoryResult<usize> {
        let conn = self.get_conn()?;
        let count: i64 = conn.query_row("SELECT COUNT(*) FROM supplier", [], |row| row.get(0))?;
        Ok(count as usize)
    }

    fn map_row(row: &Row) -> rusqlite::Result<SupplierRecord> {
        Ok(SupplierRecord {
            id: SupplierId(row.get(0)?),
            fields: NewSupplier {
                name: row.get(1)?,
                tax_id: row.get(2)?,
                homologation_date: row.get(3)?,
                status: row.get(4)?,
                service_scope: row.get(5)?,
                qualified: row.get(6)?,
                person_type: row.get(7)?,
                contact_name: row.get(8)?,
                phone: row.get(9)?,
                email: row.get(10)?,
                bank: row.get(11)?,
                branch: row.get(12)?,
                account: row.get(13)?,
                fcpa: row.get(14)?,
            },
        })
    }
}
