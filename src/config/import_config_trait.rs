// ==========================================
// 供应商资质表导入系统 - 导入配置读取 Trait
// ==========================================
// 职责: 定义导入/上传所需的配置读取接口（不包含实现）
// 红线: 不包含配置写入、不包含业务逻辑
// ==========================================

use std::error::Error;
use std::path::PathBuf;

// ==========================================
// ImportSettings - 单次导入的配置快照
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportSettings {
    pub atomic_rows: bool,   // 每行“供应商解析 + 评分插入”是否在同一事务内
    pub strict_layout: bool, // 表格宽度不足时是否整次失败
    pub date_format: String, // 日期单元格显示格式（chrono 格式串）
}

impl Default for ImportSettings {
    fn default() -> Self {
        Self {
            atomic_rows: true,
            strict_layout: true,
            date_format: super::config_manager::defaults::DATE_FORMAT.to_string(),
        }
    }
}

// ==========================================
// UploadSettings - 上传边界配置
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadSettings {
    pub upload_dir: PathBuf,
    pub allowed_extensions: Vec<String>,
}

impl Default for UploadSettings {
    fn default() -> Self {
        Self {
            upload_dir: PathBuf::from(super::config_manager::defaults::UPLOAD_DIR),
            allowed_extensions: super::config_manager::defaults::ALLOWED_EXTENSIONS
                .split(',')
                .map(|s| s.to_string())
                .collect(),
        }
    }
}

// ==========================================
// ImportConfigReader Trait
// ==========================================
// 实现者: ConfigManager（从 config_kv 表读取）
pub trait ImportConfigReader {
    /// 是否按行事务化
    ///
    /// # 默认值
    /// - true
    fn get_atomic_rows(&self) -> Result<bool, Box<dyn Error>>;

    /// 是否严格校验表格宽度
    ///
    /// # 默认值
    /// - true
    fn get_strict_layout(&self) -> Result<bool, Box<dyn Error>>;

    /// 日期单元格显示格式
    ///
    /// # 默认值
    /// - %d/%m/%Y
    fn get_date_format(&self) -> Result<String, Box<dyn Error>>;

    /// 上传目录
    ///
    /// # 默认值
    /// - uploads
    fn get_upload_dir(&self) -> Result<PathBuf, Box<dyn Error>>;

    /// 允许上传的扩展名（小写，不含点）
    ///
    /// # 默认值
    /// - ["xls", "xlsx", "xlsm"]
    fn get_allowed_extensions(&self) -> Result<Vec<String>, Box<dyn Error>>;

    /// 读取导入配置快照
    fn load_import_settings(&self) -> Result<ImportSettings, Box<dyn Error>> {
        Ok(ImportSettings {
            atomic_rows: self.get_atomic_rows()?,
            strict_layout: self.get_strict_layout()?,
            date_format: self.get_date_format()?,
        })
    }

    /// 读取上传配置快照
    fn load_upload_settings(&self) -> Result<UploadSettings, Box<dyn Error>> {
        Ok(UploadSettings {
            upload_dir: self.get_upload_dir()?,
            allowed_extensions: self.get_allowed_extensions()?,
        })
    }
}
