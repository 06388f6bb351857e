// ==========================================
// 供应商资质表导入系统 - 上传文件落盘
// ==========================================
// 职责: 扩展名白名单校验 + 保存到上传目录，返回核心流程使用的路径
// 支持: .xls / .xlsx / .xlsm（可配置）
// ==========================================

use crate::config::UploadSettings;
use crate::importer::error::{ImportError, ImportResult};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

pub struct FileUploader {
    settings: UploadSettings,
}

impl FileUploader {
    pub fn new(settings: UploadSettings) -> Self {
        Self { settings }
    }

    /// 保存上传文件
    ///
    /// # 参数
    /// - source: 临时文件路径
    /// - original_name: 客户端提交的原始文件名（仅取最后一段）
    ///
    /// # 返回
    /// - Ok(PathBuf): 上传目录内的保存路径（同名文件被覆盖）
    /// - Err(UnsupportedExtension): 扩展名不在白名单
    /// - Err(UploadStorage): 目录创建或复制失败
    pub fn upload(&self, source: &Path, original_name: &str) -> ImportResult<PathBuf> {
        let file_name = Path::new(original_name)
            .file_name()
            .and_then(|n| n.to_str())
            .filter(|n| !n.is_empty())
            .ok_or_else(|| ImportError::UploadStorage(format!("文件名无效: {}", original_name)))?;

        self.validate_extension(file_name)?;

        fs::create_dir_all(&self.settings.upload_dir).map_err(|e| {
            ImportError::UploadStorage(format!(
                "创建上传目录失败 ({}): {}",
                self.settings.upload_dir.display(),
                e
            ))
        })?;

        let dest_path = self.settings.upload_dir.join(file_name);
        fs::copy(source, &dest_path).map_err(|e| {
            ImportError::UploadStorage(format!(
                "移动文件到上传目录失败 ({}): {}",
                dest_path.display(),
                e
            ))
        })?;

        info!(file_name, dest = %dest_path.display(), "上传文件已保存");
        Ok(dest_path)
    }

    /// 校验扩展名（大小写不敏感）
    pub fn validate_extension(&self, file_name: &str) -> ImportResult<()> {
        let ext = Path::new(file_name)
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("")
            .to_lowercase();

        if self.settings.allowed_extensions.iter().any(|a| *a == ext) {
            Ok(())
        } else {
            Err(ImportError::UnsupportedExtension {
                file_name: file_name.to_string(),
                allowed: self.settings.allowed_extensions.join(", "),
            })
        }
    }
}
