//! # 数据源与中间模型
//!
//! ## 设计思路
//!
//! 将“外部输入类型”和“流水线中间结果”解耦：
//! - `UploadSource` 表示上传来源语义
//! - `RawUpload` 表示已加载、已通过体积与签名校验但未解码的字节
//! - `ScreenedChart` 表示已通过判定、可进入后续流程的图片

use crate::chart_validator::Bitmap;

/// 图片上传来源。
#[derive(Debug, Clone)]
pub enum UploadSource {
    /// 内存中的上传字节，附带客户端声明的内容类型。
    Bytes {
        bytes: Vec<u8>,
        content_type: Option<String>,
    },
    /// Base64（支持 Data URL 与纯 Base64 字符串）。
    Base64(String),
    /// 本地文件路径来源。
    FilePath(String),
}

impl UploadSource {
    pub fn hint(&self) -> &'static str {
        match self {
            Self::Bytes { .. } => "bytes",
            Self::Base64(_) => "base64",
            Self::FilePath(_) => "file",
        }
    }
}

/// 加载阶段输出：原始字节与来源标识。
pub(crate) struct RawUpload {
    pub(crate) bytes: Vec<u8>,
    /// 来源提示（用于日志与诊断）。
    pub(crate) source_hint: &'static str,
}

/// 判定通过的上传结果。
#[derive(Debug, Clone)]
pub struct ScreenedChart {
    /// 原始分辨率位图（判定即基于此位图）。
    pub bitmap: Bitmap,
    /// 缩小后的预览图；原图已足够小时为 `None`。
    pub preview: Option<Bitmap>,
    pub source_hint: &'static str,
}

impl ScreenedChart {
    /// 用于展示或持久化的位图：有预览用预览，否则用原图。
    pub fn display_bitmap(&self) -> &Bitmap {
        self.preview.as_ref().unwrap_or(&self.bitmap)
    }
}
