//! # 核心编排模块
//!
//! ## 设计思路
//!
//! `UploadHandler` 只负责流程编排与配置管理，处理链路固定为：
//! 1. 读取配置快照
//! 2. 按来源加载原始字节（体积、类型、签名校验）
//! 3. 解码为原始分辨率 RGBA 位图
//! 4. 颜色扫描判定，未通过返回 `NotAChart`
//! 5. 按配置生成预览图
//!
//! ## 实现思路
//!
//! - 配置通过 `Arc<RwLock<UploadConfig>>` 支持运行时替换。
//! - 单次请求内使用“同一配置快照”，避免处理中途配置漂移。
//! - 记录 `load/decode/classify/total` 阶段耗时，便于性能诊断。

use std::sync::{Arc, RwLock};
use std::time::Instant;

use super::source::RawUpload;
use super::{ScreenedChart, UploadConfig, UploadError, UploadSource};
use crate::chart_validator::{self, Bitmap};

/// 上传处理器。
pub struct UploadHandler {
    pub(super) config: Arc<RwLock<UploadConfig>>,
}

impl UploadHandler {
    /// 根据初始配置创建处理器，配置不合法时返回错误。
    ///
    /// # 示例
    /// ```rust
    /// use iacam::upload::{UploadConfig, UploadHandler};
    ///
    /// let handler = UploadHandler::new(UploadConfig::default())?;
    /// # Ok::<(), iacam::upload::UploadError>(())
    /// ```
    pub fn new(config: UploadConfig) -> Result<Self, UploadError> {
        config.validate()?;
        Ok(Self {
            config: Arc::new(RwLock::new(config)),
        })
    }

    /// 获取配置快照。
    ///
    /// 作用：保证单次请求链路使用一致参数。
    pub fn config_snapshot(&self) -> Result<UploadConfig, UploadError> {
        self.config
            .read()
            .map(|cfg| cfg.clone())
            .map_err(|_| UploadError::ResourceLimit("配置读取锁已中毒".to_string()))
    }

    /// 整体替换配置（先校验）。
    pub fn set_config(&self, config: UploadConfig) -> Result<(), UploadError> {
        config.validate()?;

        let mut current = self
            .config
            .write()
            .map_err(|_| UploadError::ResourceLimit("配置写入锁已中毒".to_string()))?;
        *current = config;

        log::info!(
            "⚙️ 已更新上传配置（max_file_size={}, preview_max_dimension={}, adaptive_preview={}）",
            current.max_file_size,
            current.preview_max_dimension,
            current.adaptive_preview
        );

        Ok(())
    }

    pub fn set_max_file_size(&self, max_file_size: u64) -> Result<(), UploadError> {
        let mut config = self.config_snapshot()?;
        config.max_file_size = max_file_size;
        self.set_config(config)
    }

    pub(crate) fn load(
        &self,
        source: UploadSource,
        config: &UploadConfig,
    ) -> Result<RawUpload, UploadError> {
        match source {
            UploadSource::Bytes {
                bytes,
                content_type,
            } => self.load_from_bytes(bytes, content_type.as_deref(), config),
            UploadSource::Base64(data) => self.load_from_base64(&data, config),
            UploadSource::FilePath(path) => self.load_from_file(&path, config),
        }
    }

    /// 加载并解码，不做图表判定。
    pub fn intake(&self, source: UploadSource) -> Result<Bitmap, UploadError> {
        let config = self.config_snapshot()?;
        let raw = self.load(source, &config)?;
        self.decode_to_bitmap(raw, &config)
    }

    /// 处理主入口：加载 → 解码 → 判定 → 预览。
    ///
    /// # 示例
    /// ```rust,no_run
    /// use iacam::upload::{UploadConfig, UploadHandler, UploadSource};
    ///
    /// let handler = UploadHandler::new(UploadConfig::default())?;
    /// let chart = handler.screen(UploadSource::FilePath("/tmp/chart.png".into()))?;
    /// println!("{}x{}", chart.bitmap.width(), chart.bitmap.height());
    /// # Ok::<(), iacam::upload::UploadError>(())
    /// ```
    pub fn screen(&self, source: UploadSource) -> Result<ScreenedChart, UploadError> {
        let config = self.config_snapshot()?;
        let total_start = Instant::now();

        let load_start = Instant::now();
        let raw = self.load(source, &config)?;
        let source_hint = raw.source_hint;
        let load_elapsed = load_start.elapsed();

        let decode_start = Instant::now();
        let bitmap = self.decode_to_bitmap(raw, &config)?;
        let decode_elapsed = decode_start.elapsed();

        let classify_start = Instant::now();
        let flags = chart_validator::scan(&bitmap);
        let classify_elapsed = classify_start.elapsed();

        if !flags.all() {
            let missing = flags.missing().join(", ");
            log::debug!(
                "🚫 未识别为蜡烛图 - 来源: {} 缺少颜色: {}",
                source_hint,
                missing
            );
            return Err(UploadError::NotAChart(missing));
        }

        let preview = self.prepare_preview(&bitmap, &config)?;

        log::info!(
            "✅ 图表判定通过 - load={}ms decode={}ms classify={}ms total={}ms",
            load_elapsed.as_millis(),
            decode_elapsed.as_millis(),
            classify_elapsed.as_millis(),
            total_start.elapsed().as_millis()
        );

        Ok(ScreenedChart {
            bitmap,
            preview,
            source_hint,
        })
    }
}
