//! # 服务层（可注入状态）
//!
//! ## 设计思路
//!
//! 使用 `UploadService` 作为显式传入的服务状态，替代全局单例函数：
//! 生命周期由 `main.rs` 统一管理，测试可创建独立实例。
//!
//! ## 实现思路
//!
//! 解码是唯一的挂起点：整条“解码 + 扫描”链路通过 `spawn_blocking`
//! 移到阻塞线程池执行，异步调用方只需 `await`。
//! 每次调用互不共享可变状态，可以并发发起；调用方丢弃 future 即视为放弃结果。

use std::path::PathBuf;
use std::sync::Arc;

use super::{ScreenedChart, UploadConfig, UploadError, UploadHandler, UploadSource};
use crate::chart_validator;
use crate::error::AppError;
use crate::storage::ChartStore;

/// 一次上传筛查的结果。
#[derive(Debug, Clone)]
pub struct ScreeningOutcome {
    pub chart: ScreenedChart,
    /// 持久化后的文件路径；未配置存储时为 `None`。
    pub stored_path: Option<PathBuf>,
}

/// 上传处理服务状态。
pub struct UploadService {
    handler: Arc<UploadHandler>,
    store: Option<ChartStore>,
}

impl UploadService {
    /// 使用默认配置创建服务，不持久化图片。
    pub fn new() -> Result<Self, UploadError> {
        Self::with_config(UploadConfig::default(), None)
    }

    /// 使用自定义配置与可选存储创建服务。
    ///
    /// # 示例
    /// ```rust,no_run
    /// use iacam::upload::{UploadConfig, UploadService};
    ///
    /// let mut config = UploadConfig::default();
    /// config.preview_max_dimension = 800;
    /// let service = UploadService::with_config(config, None)?;
    /// # Ok::<(), iacam::upload::UploadError>(())
    /// ```
    pub fn with_config(config: UploadConfig, store: Option<ChartStore>) -> Result<Self, UploadError> {
        Ok(Self {
            handler: Arc::new(UploadHandler::new(config)?),
            store,
        })
    }

    pub fn handler(&self) -> &UploadHandler {
        &self.handler
    }

    /// 执行完整筛查流程；通过判定且配置了存储时保存预览图。
    pub async fn screen_upload(&self, source: UploadSource) -> Result<ScreeningOutcome, AppError> {
        let handler = Arc::clone(&self.handler);
        let hint = source.hint();

        let chart = tokio::task::spawn_blocking(move || handler.screen(source))
            .await
            .map_err(|e| {
                log::error!("❌ 筛查任务异常终止 - 来源: {} 错误: {}", hint, e);
                UploadError::Decode(format!("筛查任务异常终止：{}", e))
            })??;

        let stored_path = match &self.store {
            Some(store) => {
                let store = store.clone();
                let bitmap = chart.display_bitmap().clone();
                let path = tokio::task::spawn_blocking(move || store.save_bitmap(&bitmap))
                    .await
                    .map_err(|e| AppError::Storage(format!("保存任务异常终止：{}", e)))??;
                Some(path)
            }
            None => None,
        };

        Ok(ScreeningOutcome { chart, stored_path })
    }

    /// 仅返回布尔判定：解码失败、任务失败都视为 `false`。
    ///
    /// 不经过上传体积与类型校验，调用方负责前置过滤。
    pub async fn is_chart(bytes: Vec<u8>) -> bool {
        match tokio::task::spawn_blocking(move || chart_validator::classify_encoded(&bytes)).await
        {
            Ok(verdict) => verdict,
            Err(err) => {
                log::warn!("⚠️ 判定任务异常终止，按非图表处理：{}", err);
                false
            }
        }
    }
}
