// ==========================================
// 供应商资质表导入 API
// ==========================================
// 职责: 对外暴露单一同步入口 import(filePath)
// 约定: 整次导入成功/失败二选一；行级跳过/失败只记录日志与报告
// ==========================================

use crate::api::error::{ApiError, ApiResult};
use crate::config::{ConfigManager, ImportConfigReader};
use crate::domain::import_report::ImportReport;
use crate::importer::{ExcelSource, FileUploader, SupplierImporter};
use rusqlite::Connection;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::{Arc, Mutex};
use tracing::{error, info};

/// 导入成功提示
pub const IMPORT_SUCCESS_MESSAGE: &str = "数据导入成功";

/// 导入API响应
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImportApiResponse {
    /// 面向用户的结果提示
    pub message: String,
    /// 上传后保存路径
    pub stored_path: String,
    /// 导入汇总
    pub report: ImportReport,
}

/// 导入API
pub struct ImportApi {
    conn: Arc<Mutex<Connection>>,
    config: ConfigManager,
}

impl ImportApi {
    /// 创建新的ImportApi实例
    pub fn new(conn: Arc<Mutex<Connection>>) -> Self {
        Self {
            config: ConfigManager::from_connection(conn.clone()),
            conn,
        }
    }

    /// 导入已落盘的表格文件
    ///
    /// # 返回
    /// - Ok(ImportReport): 整次导入完成
    /// - Err(ApiError): 文件不可读、布局不符、存储不可用、配置错误
    pub fn import_file(&self, file_path: &Path) -> ApiResult<ImportReport> {
        let settings = self
            .config
            .load_import_settings()
            .map_err(|e| ApiError::ConfigError(e.to_string()))?;

        let source = ExcelSource::new(&settings.date_format)?;
        let importer = SupplierImporter::new(self.conn.clone(), source, settings);

        importer.process(file_path).map_err(|e| {
            error!(file = %file_path.display(), error = %e, "导入失败");
            ApiError::from(e)
        })
    }

    /// 上传并导入
    ///
    /// # 参数
    /// - source: 待上传文件（临时路径）
    /// - original_name: 原始文件名（决定扩展名校验与保存名）
    pub fn upload_and_import(
        &self,
        source: &Path,
        original_name: &str,
    ) -> ApiResult<ImportApiResponse> {
        let upload_settings = self
            .config
            .load_upload_settings()
            .map_err(|e| ApiError::ConfigError(e.to_string()))?;

        let stored_path = FileUploader::new(upload_settings).upload(source, original_name)?;
        info!(stored_path = %stored_path.display(), "文件已上传，开始导入");

        let report = self.import_file(&stored_path)?;

        Ok(ImportApiResponse {
            message: IMPORT_SUCCESS_MESSAGE.to_string(),
            stored_path: stored_path.display().to_string(),
            report,
        })
    }
}
