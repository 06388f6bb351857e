// ==========================================
// 供应商资质表导入系统 - SQLite 连接初始化
// ==========================================
// 目标:
// - 统一所有 Connection::open 的 PRAGMA 行为（外键/busy_timeout）
// - 提供建表脚本（仅初始化，不做迁移）
// ==========================================

use rusqlite::Connection;
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// 默认 busy_timeout（毫秒）
pub const DEFAULT_BUSY_TIMEOUT_MS: u64 = 5_000;

/// 建表脚本
///
/// 说明：
/// - supplier.tax_id 的唯一性由导入流程保证，schema 仅建普通索引
/// - score_record 通过外键绑定 supplier，不允许悬空引用
pub const SCHEMA_SQL: &str = r#"
CREATE TABLE IF NOT EXISTS supplier (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL DEFAULT '',
    tax_id TEXT NOT NULL,
    homologation_date TEXT NOT NULL DEFAULT '',
    status TEXT NOT NULL DEFAULT '',
    service_scope TEXT NOT NULL DEFAULT '',
    qualified TEXT NOT NULL DEFAULT '',
    person_type TEXT NOT NULL DEFAULT '',
    contact_name TEXT NOT NULL DEFAULT '',
    phone TEXT NOT NULL DEFAULT '',
    email TEXT NOT NULL DEFAULT '',
    bank TEXT NOT NULL DEFAULT '',
    branch TEXT NOT NULL DEFAULT '',
    account TEXT NOT NULL DEFAULT '',
    fcpa TEXT NOT NULL DEFAULT ''
);

CREATE INDEX IF NOT EXISTS idx_supplier_tax_id ON supplier(tax_id);

CREATE TABLE IF NOT EXISTS score_record (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    supplier_id INTEGER NOT NULL REFERENCES supplier(id),
    n1 REAL NOT NULL DEFAULT 0,
    n2 REAL NOT NULL DEFAULT 0,
    n3 REAL NOT NULL DEFAULT 0,
    n4 REAL NOT NULL DEFAULT 0,
    n5 REAL NOT NULL DEFAULT 0,
    n6 REAL NOT NULL DEFAULT 0,
    n7 REAL NOT NULL DEFAULT 0,
    n8 REAL NOT NULL DEFAULT 0,
    n9 REAL NOT NULL DEFAULT 0,
    n10 REAL NOT NULL DEFAULT 0
);

CREATE INDEX IF NOT EXISTS idx_score_record_supplier ON score_record(supplier_id);

CREATE TABLE IF NOT EXISTS config_kv (
    scope_id TEXT NOT NULL DEFAULT 'global',
    key TEXT NOT NULL,
    value TEXT NOT NULL,
    updated_at TEXT NOT NULL DEFAULT (datetime('now')),
    PRIMARY KEY (scope_id, key)
);
"#;

/// 配置 SQLite 连接的统一 PRAGMA
///
/// 说明：
/// - foreign_keys 需要“每个连接”单独开启
/// - busy_timeout 需要“每个连接”单独配置
pub fn configure_sqlite_connection(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch("PRAGMA foreign_keys = ON;")?;
    conn.busy_timeout(Duration::from_millis(DEFAULT_BUSY_TIMEOUT_MS))?;
    Ok(())
}

/// 打开 SQLite 连接并应用统一配置
pub fn open_sqlite_connection(db_path: &str) -> rusqlite::Result<Connection> {
    let conn = Connection::open(db_path)?;
    configure_sqlite_connection(&conn)?;
    Ok(conn)
}

/// 打开共享连接句柄（供各仓储构造函数注入）
pub fn open_shared_connection(db_path: &str) -> rusqlite::Result<Arc<Mutex<Connection>>> {
    Ok(Arc::new(Mutex::new(open_sqlite_connection(db_path)?)))
}

/// 初始化表结构（幂等）
pub fn init_schema(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch(SCHEMA_SQL)
}
