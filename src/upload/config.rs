//! # 上传配置模块
//!
//! ## 设计思路
//!
//! 将上传链路中所有“可调策略”集中到 `UploadConfig`，
//! 判定阈值本身是固定常量，不在此处配置。
//!
//! ## 实现思路
//!
//! - `Default` 与原上传页保持一致：5MB 体积上限、预览最长边 1200。
//! - `validate` 在运行时替换配置前做范围检查，避免写入明显错误的参数。

use image::imageops::FilterType;

use super::UploadError;

/// 单个上传文件默认体积上限（5MB）。
pub const DEFAULT_MAX_FILE_SIZE: u64 = 5 * 1024 * 1024;
/// 预览图默认最长边（像素）。
pub const DEFAULT_PREVIEW_MAX_DIMENSION: u32 = 1200;

/// 上传处理配置。
///
/// 字段覆盖了加载、解码与预览降采样三个阶段。
#[derive(Debug, Clone)]
pub struct UploadConfig {
    /// 允许的最大文件体积（字节）。
    pub max_file_size: u64,
    /// 解码后的像素上限（`width * height`）。
    pub max_decoded_pixels: u64,
    /// 解码阶段允许的预计内存上限（按 RGBA 估算，字节）。
    pub max_decoded_bytes: u64,
    /// 是否为通过判定的图片生成缩小后的预览。
    pub adaptive_preview: bool,
    /// 预览图宽/高单边最大值。
    pub preview_max_dimension: u32,
    /// 降采样滤镜策略。
    pub resize_filter: FilterType,
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self {
            max_file_size: DEFAULT_MAX_FILE_SIZE,
            max_decoded_pixels: 40_000_000,
            max_decoded_bytes: 160 * 1024 * 1024,
            adaptive_preview: true,
            preview_max_dimension: DEFAULT_PREVIEW_MAX_DIMENSION,
            resize_filter: FilterType::Triangle,
        }
    }
}

impl UploadConfig {
    /// 校验配置取值范围。
    pub fn validate(&self) -> Result<(), UploadError> {
        if self.max_file_size == 0 {
            return Err(UploadError::InvalidFormat("max_file_size 不能为 0".to_string()));
        }
        if self.max_decoded_pixels == 0 {
            return Err(UploadError::InvalidFormat(
                "max_decoded_pixels 不能为 0".to_string(),
            ));
        }
        if self.max_decoded_bytes < 4 {
            return Err(UploadError::InvalidFormat(
                "max_decoded_bytes 不能小于单个像素".to_string(),
            ));
        }
        if !(16..=8192).contains(&self.preview_max_dimension) {
            return Err(UploadError::InvalidFormat(
                "preview_max_dimension 必须在 16~8192 像素之间".to_string(),
            ));
        }
        Ok(())
    }
}
