//! # 错误模型模块
//!
//! ## 设计思路
//!
//! 使用单一错误枚举承载上传链路中的所有失败原因，避免字符串拼接式错误处理。
//! 解码类错误与“不是图表”分开，调用方据此展示不同的提示文案。

/// 上传处理统一错误类型。
#[derive(Debug, thiserror::Error)]
pub enum UploadError {
    #[error("解码错误：{0}")]
    Decode(String),

    #[error("格式错误：{0}")]
    InvalidFormat(String),

    #[error("文件错误：{0}")]
    FileSystem(String),

    #[error("资源限制：{0}")]
    ResourceLimit(String),

    #[error("未识别为蜡烛图：缺少 {0}")]
    NotAChart(String),
}

impl UploadError {
    /// 稳定的错误码，供报告输出与调用方分支。
    pub fn code(&self) -> &'static str {
        match self {
            Self::Decode(_) => "decode_failure",
            Self::InvalidFormat(_) => "invalid_format",
            Self::FileSystem(_) => "file_system",
            Self::ResourceLimit(_) => "resource_limit",
            Self::NotAChart(_) => "not_a_chart",
        }
    }

    /// 出错所在阶段。
    pub fn stage(&self) -> &'static str {
        match self {
            Self::InvalidFormat(_) | Self::FileSystem(_) => "load",
            Self::Decode(_) | Self::ResourceLimit(_) => "decode",
            Self::NotAChart(_) => "classify",
        }
    }

    /// 面向用户的提示文案。
    pub fn user_message(&self) -> &'static str {
        match self {
            Self::Decode(_) | Self::InvalidFormat(_) | Self::FileSystem(_) => {
                "请上传有效的图片文件。"
            }
            Self::ResourceLimit(_) => "图片过大，请选择更小的图片。",
            Self::NotAChart(_) => "图片中似乎没有蜡烛图，请上传交易图表截图。",
        }
    }
}

impl From<UploadError> for String {
    fn from(error: UploadError) -> Self {
        error.to_string()
    }
}
