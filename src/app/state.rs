// ==========================================
// 供应商资质表导入系统 - 应用状态
// ==========================================
// 职责: 管理应用级别的共享连接和API实例
// ==========================================

use std::sync::{Arc, Mutex};

use rusqlite::Connection;

use crate::api::ImportApi;
use crate::config::ConfigManager;
use crate::db::{init_schema, open_shared_connection};

/// 数据库路径环境变量
pub const DB_PATH_ENV: &str = "SUPPLIER_IMPORT_DB_PATH";

/// 应用状态
///
/// 一次进程只持有一个连接，所有仓储/API共享
pub struct AppState {
    /// 数据库路径
    pub db_path: String,

    /// 共享连接
    pub conn: Arc<Mutex<Connection>>,

    /// 供应商导入API
    pub import_api: Arc<ImportApi>,

    /// 配置管理器
    pub config: Arc<ConfigManager>,
}

impl AppState {
    /// 创建新的AppState实例
    ///
    /// # 参数
    /// - db_path: 数据库文件路径
    ///
    /// # 返回
    /// - Ok(AppState): 应用状态实例（建表已完成）
    /// - Err(String): 初始化错误
    pub fn new(db_path: String) -> Result<Self, String> {
        tracing::info!("初始化AppState，数据库路径: {}", db_path);

        let conn =
            open_shared_connection(&db_path).map_err(|e| format!("无法打开数据库: {}", e))?;

        {
            let guard = conn
                .lock()
                .map_err(|e| format!("数据库锁获取失败: {}", e))?;
            init_schema(&guard).map_err(|e| format!("数据库初始化失败: {}", e))?;
        }

        let import_api = Arc::new(ImportApi::new(conn.clone()));
        let config = Arc::new(ConfigManager::from_connection(conn.clone()));

        tracing::info!("AppState初始化完成");

        Ok(Self {
            db_path,
            conn,
            import_api,
            config,
        })
    }
}

/// 获取默认数据库路径
///
/// 优先级: 环境变量 SUPPLIER_IMPORT_DB_PATH > 用户数据目录 > 当前目录
pub fn get_default_db_path() -> String {
    use std::path::PathBuf;

    if let Ok(path) = std::env::var(DB_PATH_ENV) {
        let trimmed = path.trim();
        if !trimmed.is_empty() {
            return trimmed.to_string();
        }
    }

    let mut path = PathBuf::from("./supplier_import.db");

    if let Some(data_dir) = dirs::data_dir() {
        let dir = data_dir.join("supplier-import");
        // 目录创建失败时回退到当前目录
        if std::fs::create_dir_all(&dir).is_ok() {
            path = dir.join("supplier_import.db");
        }
    }

    path.to_string_lossy().to_string()
}
