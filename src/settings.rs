//! 应用设置
//!
//! 可选的 JSON 设置文件，缺省字段使用默认值。
//! 解析结果显式传给服务层构造配置，不存放在全局状态中。

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::error::AppError;
use crate::upload::UploadConfig;
use crate::upload::config::{DEFAULT_MAX_FILE_SIZE, DEFAULT_PREVIEW_MAX_DIMENSION};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppSettings {
    pub max_file_size_mb: u64,
    pub preview_max_dimension: u32,
    pub persist_accepted: bool,
    pub images_dir: Option<String>,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            max_file_size_mb: DEFAULT_MAX_FILE_SIZE / 1024 / 1024,
            preview_max_dimension: DEFAULT_PREVIEW_MAX_DIMENSION,
            persist_accepted: false,
            images_dir: None,
        }
    }
}

impl AppSettings {
    pub fn load(path: &Path) -> Result<Self, AppError> {
        if !path.exists() {
            log::info!("设置文件不存在，使用默认设置: {}", path.display());
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    pub fn from_json(content: &str) -> Result<Self, AppError> {
        serde_json::from_str(content)
            .map_err(|e| AppError::Settings(format!("解析设置文件失败: {}", e)))
    }

    pub fn to_upload_config(&self) -> Result<UploadConfig, AppError> {
        let max_file_size = self
            .max_file_size_mb
            .checked_mul(1024 * 1024)
            .ok_or_else(|| AppError::Settings("max_file_size_mb 溢出".to_string()))?;

        let config = UploadConfig {
            max_file_size,
            preview_max_dimension: self.preview_max_dimension,
            ..UploadConfig::default()
        };
        config.validate()?;
        Ok(config)
    }
}
