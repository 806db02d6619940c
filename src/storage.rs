//! 图表图片存储目录管理模块
//!
//! # 设计思路
//!
//! 统一管理通过判定的图表图片的持久化路径，支持自定义目录，
//! 并在目录不存在时自动创建。持久化是可选功能，未配置时服务层不会调用。
//!
//! # 实现思路
//!
//! - 优先使用设置中的自定义目录。
//! - 未设置时回退到数据根目录下的 `images` 子目录。
//! - 目录不存在时自动 `create_dir_all`，避免上层判断。
//! - 所有可能失败的操作均返回 `Result`，不使用 `expect()` / `unwrap()`。

use chrono::Local;
use image::ImageFormat;
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};

use crate::chart_validator::Bitmap;
use crate::error::AppError;

/// 存储目录信息
#[derive(Debug, Clone, Serialize)]
pub struct StorageInfo {
    pub path: String,
    pub total_size: u64,
    pub file_count: u64,
}

/// 获取图片存储目录
///
/// # 参数
/// * `data_root` - 默认数据根目录
/// * `custom_dir` - 用户自定义目录（可选）
///
/// # 返回
/// - `Ok(PathBuf)` — 可用的图片存储目录
/// - `Err(AppError::Storage)` — 无法创建目录
pub fn get_images_dir(data_root: &Path, custom_dir: Option<&str>) -> Result<PathBuf, AppError> {
    // 优先使用用户自定义目录
    if let Some(dir) = custom_dir.filter(|dir| !dir.is_empty()) {
        let path = PathBuf::from(dir);
        if !path.exists() {
            fs::create_dir_all(&path).map_err(|e| {
                AppError::Storage(format!("创建自定义目录 '{}' 失败: {}", dir, e))
            })?;
        }
        return Ok(path);
    }

    let images_dir = data_root.join("images");
    if !images_dir.exists() {
        fs::create_dir_all(&images_dir)
            .map_err(|e| AppError::Storage(format!("创建图片目录失败: {}", e)))?;
    }
    Ok(images_dir)
}

/// 图表图片存储。
#[derive(Debug, Clone)]
pub struct ChartStore {
    dir: PathBuf,
}

impl ChartStore {
    pub fn open(data_root: &Path, custom_dir: Option<&str>) -> Result<Self, AppError> {
        let dir = get_images_dir(data_root, custom_dir)?;
        log::info!("🗂️ 图表存储目录: {}", dir.display());
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// 以 PNG 保存位图，文件名带时间戳。
    pub fn save_bitmap(&self, bitmap: &Bitmap) -> Result<PathBuf, AppError> {
        let image = bitmap
            .clone()
            .into_rgba_image()
            .ok_or_else(|| AppError::Storage("创建图像缓冲区失败".to_string()))?;

        let timestamp = Local::now().format("%Y%m%d%H%M%S%f");
        let file_path = self.dir.join(format!("chart_{}.png", timestamp));

        image
            .save_with_format(&file_path, ImageFormat::Png)
            .map_err(|e| AppError::Storage(format!("保存图片失败: {}", e)))?;

        log::info!(
            "💾 已保存图表 {}x{} -> {}",
            bitmap.width(),
            bitmap.height(),
            file_path.display()
        );

        Ok(file_path)
    }

    /// 统计存储目录（路径 + 占用大小 + 文件数）
    pub fn info(&self) -> Result<StorageInfo, AppError> {
        let mut total_size: u64 = 0;
        let mut file_count: u64 = 0;

        for entry in fs::read_dir(&self.dir)?.flatten() {
            if let Ok(metadata) = entry.metadata() {
                if metadata.is_file() {
                    total_size += metadata.len();
                    file_count += 1;
                }
            }
        }

        Ok(StorageInfo {
            path: self.dir.to_string_lossy().to_string(),
            total_size,
            file_count,
        })
    }
}
