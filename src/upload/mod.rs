//! # 上传处理模块（upload）
//!
//! ## 设计思路
//!
//! 该模块将“来源识别 → 加载校验 → 解码 → 图表判定 → 预览/持久化”
//! 按职责拆分为多个子模块，避免单文件膨胀与耦合。
//!
//! - `service`：承载可注入状态（`UploadService`），异步入口
//! - `handler`：编排整条处理流水线
//! - `loader`：负责字节/Base64/文件加载与体积、类型、签名校验
//! - `pipeline`：负责受限解码与预览降采样
//! - `config/error/source`：配置、错误、中间数据模型
//!
//! ## 调用链
//!
//! ```text
//! main.rs / 调用方
//!    ↓
//! service.rs（spawn_blocking、可选持久化）
//!    ↓
//! handler.rs（统一编排 + 阶段耗时日志）
//!    ├─ loader.rs（来源加载 + 体积/类型校验）
//!    ├─ pipeline.rs（解码 + 像素限制）
//!    ├─ chart_validator（颜色扫描判定）
//!    └─ pipeline.rs（预览降采样）
//!    ↓
//! 返回 AppError 给调用方
//! ```

pub mod config;
mod error;
mod handler;
mod loader;
mod pipeline;
mod service;
mod source;

pub use config::UploadConfig;
pub use error::UploadError;
pub use handler::UploadHandler;
pub use service::{ScreeningOutcome, UploadService};
pub use source::{ScreenedChart, UploadSource};
