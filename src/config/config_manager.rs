// ==========================================
// 供应商资质表导入系统 - 配置管理器
// ==========================================
// 职责: 配置查询、写入，缺省值兜底
// 存储: config_kv 表 (scope_id='global')
// ==========================================

use crate::config::import_config_trait::ImportConfigReader;
use rusqlite::{params, Connection, OptionalExtension};
use std::collections::BTreeMap;
use std::error::Error;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

// ==========================================
// ConfigManager - 配置管理器
// ==========================================
pub struct ConfigManager {
    conn: Arc<Mutex<Connection>>,
}

impl ConfigManager {
    /// 从已有连接创建 ConfigManager
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    /// 从 config_kv 表读取配置值
    ///
    /// # 返回
    /// - Some(String): 配置值
    /// - None: 配置不存在
    pub fn get_config_value(&self, key: &str) -> Result<Option<String>, Box<dyn Error>> {
        let conn = self.conn.lock().map_err(|e| format!("锁获取失败: {}", e))?;

        let value = conn
            .query_row(
                "SELECT value FROM config_kv WHERE scope_id = 'global' AND key = ?1",
                params![key],
                |row| row.get::<_, String>(0),
            )
            .optional()?;

        Ok(value)
    }

    /// 写入配置值（UPSERT）
    pub fn set_config_value(&self, key: &str, value: &str) -> Result<(), Box<dyn Error>> {
        if !config_keys::ALL.contains(&key) {
            return Err(format!("未知配置键: {}", key).into());
        }

        let conn = self.conn.lock().map_err(|e| format!("锁获取失败: {}", e))?;
        conn.execute(
            "INSERT INTO config_kv (scope_id, key, value) VALUES ('global', ?1, ?2)
             ON CONFLICT(scope_id, key) DO UPDATE SET value = ?2, updated_at = datetime('now')",
            params![key, value],
        )?;

        tracing::info!(config_key = key, value = value, "配置已更新");
        Ok(())
    }

    /// 列出全部生效配置（已写入值覆盖缺省值）
    pub fn list_effective_configs(&self) -> Result<BTreeMap<String, String>, Box<dyn Error>> {
        let mut configs = BTreeMap::new();
        for key in config_keys::ALL {
            configs.insert(
                key.to_string(),
                self.get_config_or_default(key, defaults::for_key(key))?,
            );
        }
        Ok(configs)
    }

    /// 从 config_kv 表读取配置值，带默认值
    fn get_config_or_default(&self, key: &str, default: &str) -> Result<String, Box<dyn Error>> {
        Ok(self
            .get_config_value(key)?
            .filter(|v| !v.trim().is_empty())
            .unwrap_or_else(|| default.to_string()))
    }

    fn get_bool_or_default(&self, key: &str, default: bool) -> Result<bool, Box<dyn Error>> {
        let value = match self.get_config_value(key)? {
            Some(v) => v,
            None => return Ok(default),
        };

        match parse_bool(&value) {
            Some(b) => Ok(b),
            None => {
                tracing::warn!(config_key = key, raw_value = %value, "布尔配置格式错误，使用默认值");
                Ok(default)
            }
        }
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

// ==========================================
// ImportConfigReader Trait 实现
// ==========================================
impl ImportConfigReader for ConfigManager {
    fn get_atomic_rows(&self) -> Result<bool, Box<dyn Error>> {
        self.get_bool_or_default(config_keys::ATOMIC_ROWS, defaults::ATOMIC_ROWS)
    }

    fn get_strict_layout(&self) -> Result<bool, Box<dyn Error>> {
        self.get_bool_or_default(config_keys::STRICT_LAYOUT, defaults::STRICT_LAYOUT)
    }

    fn get_date_format(&self) -> Result<String, Box<dyn Error>> {
        self.get_config_or_default(config_keys::DATE_FORMAT, defaults::DATE_FORMAT)
    }

    fn get_upload_dir(&self) -> Result<PathBuf, Box<dyn Error>> {
        Ok(PathBuf::from(self.get_config_or_default(
            config_keys::UPLOAD_DIR,
            defaults::UPLOAD_DIR,
        )?))
    }

    fn get_allowed_extensions(&self) -> Result<Vec<String>, Box<dyn Error>> {
        let value = self.get_config_or_default(
            config_keys::ALLOWED_EXTENSIONS,
            defaults::ALLOWED_EXTENSIONS,
        )?;

        let extensions: Vec<String> = value
            .split(',')
            .map(|s| s.trim().trim_start_matches('.').to_lowercase())
            .filter(|s| !s.is_empty())
            .collect();

        if extensions.is_empty() {
            Ok(defaults::ALLOWED_EXTENSIONS
                .split(',')
                .map(|s| s.to_string())
                .collect())
        } else {
            Ok(extensions)
        }
    }
}

// ==========================================
// 配置键常量
// ==========================================
pub mod config_keys {
    // 导入
    pub const ATOMIC_ROWS: &str = "import.atomic_rows";
    pub const STRICT_LAYOUT: &str = "import.strict_layout";
    pub const DATE_FORMAT: &str = "import.date_format";

    // 上传
    pub const UPLOAD_DIR: &str = "upload.dir";
    pub const ALLOWED_EXTENSIONS: &str = "upload.allowed_extensions";

    pub const ALL: [&str; 5] = [
        ATOMIC_ROWS,
        STRICT_LAYOUT,
        DATE_FORMAT,
        UPLOAD_DIR,
        ALLOWED_EXTENSIONS,
    ];
}

// ==========================================
// 缺省值
// ==========================================
pub mod defaults {
    use super::config_keys;

    pub const ATOMIC_ROWS: bool = true;
    pub const STRICT_LAYOUT: bool = true;
    pub const DATE_FORMAT: &str = "%d/%m/%Y";
    pub const UPLOAD_DIR: &str = "uploads";
    pub const ALLOWED_EXTENSIONS: &str = "xls,xlsx,xlsm";

    pub fn for_key(key: &str) -> &'static str {
        match key {
            config_keys::ATOMIC_ROWS => "true",
            config_keys::STRICT_LAYOUT => "true",
            config_keys::DATE_FORMAT => DATE_FORMAT,
            config_keys::UPLOAD_DIR => UPLOAD_DIR,
            config_keys::ALLOWED_EXTENSIONS => ALLOWED_EXTENSIONS,
            _ => "",
        }
    }
}
