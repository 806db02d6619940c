//! 统一错误类型模块
//!
//! # 设计思路
//!
//! 定义全局统一的 `AppError` 枚举，替代各模块中分散的
//! `.map_err(|e| e.to_string())`、`format!(...)`、`expect()` 等不一致模式。
//!
//! # 实现思路
//!
//! - 使用 `thiserror` 派生可读错误消息。
//! - 为 `UploadError` 与 `std::io::Error` 提供 `From` 转换，无需手动 map。
//! - `code()` 输出稳定错误码，供报告序列化使用。

use crate::upload::UploadError;

/// 应用级统一错误类型
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// 上传处理流水线错误（加载 / 解码 / 判定）
    #[error("{0}")]
    Upload(#[from] UploadError),

    /// 文件系统 I/O 错误
    #[error("文件系统错误: {0}")]
    Io(#[from] std::io::Error),

    /// 存储目录不可用或写入失败
    #[error("存储错误: {0}")]
    Storage(String),

    /// 设置文件读取或解析失败
    #[error("设置错误: {0}")]
    Settings(String),
}

impl AppError {
    pub fn code(&self) -> &'static str {
        match self {
            Self::Upload(err) => err.code(),
            Self::Io(_) => "io",
            Self::Storage(_) => "storage",
            Self::Settings(_) => "settings",
        }
    }

    /// 面向用户的提示文案。
    pub fn user_message(&self) -> &'static str {
        match self {
            Self::Upload(err) => err.user_message(),
            Self::Io(_) | Self::Storage(_) => "图片保存失败，请稍后重试。",
            Self::Settings(_) => "设置文件无效。",
        }
    }
}
