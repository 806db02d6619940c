//! # 加载与校验模块
//!
//! ## 设计思路
//!
//! 统一处理不同来源（内存字节 / Base64 / 本地文件）的原始字节加载，
//! 并在“尽可能早”的阶段执行输入校验，尽快失败，减少不必要的内存与 CPU 消耗。
//!
//! ## 实现思路
//!
//! - 字节：声明类型必须为 `image/*` + 体积上限。
//! - Base64：Data URL 类型校验 + 解码前体积预估 + 解码。
//! - 文件：存在性 + metadata 体积限制 + 读取。
//! - 所有来源最后都通过文件签名（magic bytes）确认确实是图片。

use base64::{Engine as _, engine::general_purpose};
use std::path::Path;

use super::source::RawUpload;
use super::{UploadConfig, UploadError, UploadHandler};

const DATA_URL_PREFIX: &str = "data:";
const BASE64_MARKER: &str = ";base64,";

impl UploadHandler {
    /// 从内存字节加载。
    ///
    /// `content_type` 为客户端声明的类型，缺省时仅依赖文件签名。
    pub(crate) fn load_from_bytes(
        &self,
        bytes: Vec<u8>,
        content_type: Option<&str>,
        config: &UploadConfig,
    ) -> Result<RawUpload, UploadError> {
        log::info!(
            "📥 开始处理上传字节 - 大小: {} 字节 类型: {}",
            bytes.len(),
            content_type.unwrap_or("<未声明>")
        );

        if let Some(content_type) = content_type {
            if !Self::is_image_content_type(content_type) {
                return Err(UploadError::InvalidFormat(format!(
                    "仅支持图片文件，收到类型：{}",
                    content_type
                )));
            }
        }

        Self::validate_file_size(bytes.len() as u64, config, "上传文件")?;
        Self::validate_image_signature(&bytes)?;

        Ok(RawUpload {
            bytes,
            source_hint: "bytes",
        })
    }

    /// 从 Base64 字符串加载图片原始字节。
    pub(crate) fn load_from_base64(
        &self,
        data: &str,
        config: &UploadConfig,
    ) -> Result<RawUpload, UploadError> {
        log::info!("📝 开始处理 base64 图片");

        let bytes = Self::parse_base64_with_limit(data, config.max_file_size)?;
        Self::validate_file_size(bytes.len() as u64, config, "Base64 解码后")?;
        Self::validate_image_signature(&bytes)?;

        Ok(RawUpload {
            bytes,
            source_hint: "base64",
        })
    }

    /// 从本地路径加载图片原始字节。
    pub(crate) fn load_from_file(
        &self,
        path: &str,
        config: &UploadConfig,
    ) -> Result<RawUpload, UploadError> {
        log::info!("📁 开始读取本地图片 - 路径: {}", path);

        let file_path = Path::new(path);
        if !file_path.exists() {
            return Err(UploadError::FileSystem(format!("文件不存在：{}", path)));
        }

        let metadata = std::fs::metadata(file_path)
            .map_err(|e| UploadError::FileSystem(format!("无法读取文件信息：{}", e)))?;

        if !metadata.is_file() {
            return Err(UploadError::FileSystem(format!("不是普通文件：{}", path)));
        }

        Self::validate_file_size(metadata.len(), config, "文件")?;

        let bytes = std::fs::read(file_path)
            .map_err(|e| UploadError::FileSystem(format!("无法读取图片文件：{}", e)))?;
        Self::validate_image_signature(&bytes)?;

        Ok(RawUpload {
            bytes,
            source_hint: "file",
        })
    }

    fn validate_file_size(len: u64, config: &UploadConfig, what: &str) -> Result<(), UploadError> {
        if len > config.max_file_size {
            return Err(UploadError::ResourceLimit(format!(
                "{}过大：{:.2} MB（限制：{:.2} MB）",
                what,
                len as f64 / 1024.0 / 1024.0,
                config.max_file_size as f64 / 1024.0 / 1024.0
            )));
        }
        Ok(())
    }

    pub(crate) fn is_image_content_type(content_type: &str) -> bool {
        content_type
            .split(';')
            .next()
            .map(|base| base.trim().to_ascii_lowercase().starts_with("image/"))
            .unwrap_or(false)
    }

    fn estimate_base64_decoded_upper_bound_len(base64_data: &str) -> Result<u64, UploadError> {
        let len = base64_data.trim().len() as u64;
        let groups = len
            .checked_add(3)
            .ok_or_else(|| UploadError::ResourceLimit("Base64 输入长度溢出".to_string()))?
            / 4;

        groups
            .checked_mul(3)
            .ok_or_else(|| UploadError::ResourceLimit("Base64 解码体积估算溢出".to_string()))
    }

    /// 解析 Base64 输入（支持 Data URL / 纯 Base64），解码前按预估体积拒绝超限输入。
    pub(crate) fn parse_base64_with_limit(
        data: &str,
        max_file_size: u64,
    ) -> Result<Vec<u8>, UploadError> {
        let normalized = data.trim();

        let payload = match normalized.strip_prefix(DATA_URL_PREFIX) {
            Some(rest) => {
                let marker = rest
                    .find(BASE64_MARKER)
                    .ok_or_else(|| UploadError::InvalidFormat("缺少 base64 标记".to_string()))?;
                let mime = &rest[..marker];
                if !Self::is_image_content_type(mime) {
                    return Err(UploadError::InvalidFormat(format!(
                        "仅支持图片文件，收到类型：{}",
                        mime
                    )));
                }
                &rest[marker + BASE64_MARKER.len()..]
            }
            None => normalized,
        };

        let estimated_len = Self::estimate_base64_decoded_upper_bound_len(payload)?;
        if estimated_len > max_file_size {
            return Err(UploadError::ResourceLimit(format!(
                "Base64 预计解码体积过大：{:.2} MB（限制：{:.2} MB）",
                estimated_len as f64 / 1024.0 / 1024.0,
                max_file_size as f64 / 1024.0 / 1024.0
            )));
        }

        general_purpose::STANDARD
            .decode(payload.trim())
            .map_err(|e| UploadError::Decode(format!("Base64 解码失败：{}", e)))
    }

    /// 通过文件签名（magic bytes）校验输入是否为图片。
    fn validate_image_signature(bytes: &[u8]) -> Result<(), UploadError> {
        if bytes.is_empty() {
            return Err(UploadError::InvalidFormat("图片内容为空".to_string()));
        }

        let kind = infer::get(bytes)
            .ok_or_else(|| UploadError::InvalidFormat("无法识别图片类型".to_string()))?;

        if kind.matcher_type() != infer::MatcherType::Image {
            return Err(UploadError::InvalidFormat(format!(
                "文件签名不是图片类型：{}",
                kind.mime_type()
            )));
        }

        Ok(())
    }
}
