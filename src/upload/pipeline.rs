//! # 解码与预览流水线模块
//!
//! ## 设计思路
//!
//! 将“字节 → 图像 → RGBA 位图”的过程集中管理，并在关键节点增加资源上限控制。
//! 优先做尺寸检查，再进行完整解码，降低恶意输入触发高内存开销的风险。
//!
//! ## 实现思路
//!
//! 1. 猜测格式并读取 header 尺寸
//! 2. 按像素与内存上限快速拒绝
//! 3. 完整解码，转换为 RGBA 位图
//! 4. 判定通过后按配置生成缩小的预览图（判定本身始终基于原图）

use fast_image_resize as fr;
use image::{DynamicImage, ImageBuffer, ImageReader, Rgba};
use std::io::Cursor;

use super::source::RawUpload;
use super::{UploadConfig, UploadError, UploadHandler};
use crate::chart_validator::Bitmap;

impl UploadHandler {
    /// 将原始字节解码为 RGBA 位图。
    pub(crate) fn decode_to_bitmap(
        &self,
        raw: RawUpload,
        config: &UploadConfig,
    ) -> Result<Bitmap, UploadError> {
        image::guess_format(&raw.bytes)
            .map_err(|e| UploadError::InvalidFormat(format!("不支持的图片格式：{}", e)))?;

        let (header_width, header_height) = Self::inspect_dimensions_from_memory(&raw.bytes)?;
        Self::validate_pixel_limits(config, header_width, header_height)?;
        Self::validate_decoded_memory_limits(config, header_width, header_height)?;

        let decoded = image::load_from_memory(&raw.bytes)
            .map_err(|e| UploadError::Decode(format!("图片解码失败：{}", e)))?;

        let rgba = decoded.to_rgba8();
        let (width, height) = rgba.dimensions();
        Self::validate_pixel_limits(config, width, height)?;

        let bitmap = Bitmap::from_rgba_image(rgba)
            .map_err(|e| UploadError::Decode(format!("解码后像素数据异常：{}", e)))?;

        log::info!(
            "✅ 图片解码成功 - 来源: {} 尺寸: {}x{}",
            raw.source_hint,
            width,
            height
        );

        Ok(bitmap)
    }

    /// 仅通过内存中的图片头信息读取宽高。
    ///
    /// 用于在完整解码前做像素限制检查。
    fn inspect_dimensions_from_memory(bytes: &[u8]) -> Result<(u32, u32), UploadError> {
        let reader = ImageReader::new(Cursor::new(bytes))
            .with_guessed_format()
            .map_err(|e| UploadError::InvalidFormat(format!("无法识别图片格式：{}", e)))?;

        reader
            .into_dimensions()
            .map_err(|e| UploadError::Decode(format!("无法读取图片尺寸：{}", e)))
    }

    /// 校验像素数量是否超过配置上限。
    fn validate_pixel_limits(
        config: &UploadConfig,
        width: u32,
        height: u32,
    ) -> Result<(), UploadError> {
        let pixels = (width as u64)
            .checked_mul(height as u64)
            .ok_or_else(|| UploadError::ResourceLimit("图片像素数溢出".to_string()))?;

        if pixels == 0 {
            return Err(UploadError::Decode(format!("图片尺寸无效：{}x{}", width, height)));
        }

        if pixels > config.max_decoded_pixels {
            return Err(UploadError::ResourceLimit(format!(
                "图片像素过大：{} 像素（限制：{} 像素）",
                pixels, config.max_decoded_pixels
            )));
        }

        Ok(())
    }

    fn validate_decoded_memory_limits(
        config: &UploadConfig,
        width: u32,
        height: u32,
    ) -> Result<(), UploadError> {
        let estimated = (width as u64)
            .checked_mul(height as u64)
            .and_then(|pixels| pixels.checked_mul(4))
            .ok_or_else(|| UploadError::ResourceLimit("图片解码内存估算溢出".to_string()))?;

        if estimated > config.max_decoded_bytes {
            return Err(UploadError::ResourceLimit(format!(
                "图片解码预计内存过大：{:.2} MB（限制：{:.2} MB）",
                estimated as f64 / 1024.0 / 1024.0,
                config.max_decoded_bytes as f64 / 1024.0 / 1024.0
            )));
        }

        Ok(())
    }

    /// 按最长边限制等比缩小，生成预览位图。
    ///
    /// 未开启预览或原图已不超过限制时返回 `None`。
    pub(crate) fn prepare_preview(
        &self,
        bitmap: &Bitmap,
        config: &UploadConfig,
    ) -> Result<Option<Bitmap>, UploadError> {
        if !config.adaptive_preview {
            return Ok(None);
        }

        let Some((target_width, target_height)) = Self::preview_dimensions(
            bitmap.width(),
            bitmap.height(),
            config.preview_max_dimension,
        ) else {
            return Ok(None);
        };

        log::info!(
            "🧩 生成预览图：{}x{} -> {}x{}（filter={:?}）",
            bitmap.width(),
            bitmap.height(),
            target_width,
            target_height,
            config.resize_filter
        );

        let resized = match Self::resize_with_fast_image_resize(
            bitmap,
            target_width,
            target_height,
            config.resize_filter,
        ) {
            Ok(resized) => resized,
            Err(err) => {
                log::warn!(
                    "⚠️ fast_image_resize 降采样失败，回退 image::resize_exact：{}",
                    err
                );
                let source = bitmap
                    .clone()
                    .into_rgba_image()
                    .ok_or_else(|| UploadError::Decode("位图缓冲长度异常".to_string()))?;
                DynamicImage::ImageRgba8(source)
                    .resize_exact(target_width, target_height, config.resize_filter)
                    .to_rgba8()
            }
        };

        Bitmap::from_rgba_image(resized)
            .map(Some)
            .map_err(|e| UploadError::Decode(format!("预览图构建失败：{}", e)))
    }

    /// 计算预览尺寸：最长边不超过 `max_dimension`，保持宽高比。
    pub(crate) fn preview_dimensions(
        width: u32,
        height: u32,
        max_dimension: u32,
    ) -> Option<(u32, u32)> {
        if width <= max_dimension && height <= max_dimension {
            return None;
        }

        let scale = (max_dimension as f64 / width as f64).min(max_dimension as f64 / height as f64);
        let target_width = ((width as f64 * scale).round() as u32).clamp(1, max_dimension);
        let target_height = ((height as f64 * scale).round() as u32).clamp(1, max_dimension);

        Some((target_width, target_height))
    }

    fn resize_with_fast_image_resize(
        bitmap: &Bitmap,
        target_width: u32,
        target_height: u32,
        filter: image::imageops::FilterType,
    ) -> Result<image::RgbaImage, UploadError> {
        let src_image = fr::images::Image::from_vec_u8(
            bitmap.width(),
            bitmap.height(),
            bitmap.as_bytes().to_vec(),
            fr::PixelType::U8x4,
        )
        .map_err(|e| UploadError::Decode(format!("构建源图像缓冲失败：{}", e)))?;

        let mut dst_image =
            fr::images::Image::new(target_width, target_height, fr::PixelType::U8x4);

        let mut resizer = fr::Resizer::new();
        let options = fr::ResizeOptions::new()
            .resize_alg(fr::ResizeAlg::Convolution(Self::to_fast_filter(filter)));

        resizer
            .resize(&src_image, &mut dst_image, Some(&options))
            .map_err(|e| UploadError::Decode(format!("fast_image_resize 执行失败：{}", e)))?;

        ImageBuffer::<Rgba<u8>, Vec<u8>>::from_raw(
            target_width,
            target_height,
            dst_image.into_vec(),
        )
        .ok_or_else(|| UploadError::Decode("fast_image_resize 输出缓冲长度异常".to_string()))
    }

    fn to_fast_filter(filter: image::imageops::FilterType) -> fr::FilterType {
        match filter {
            image::imageops::FilterType::Nearest => fr::FilterType::Box,
            image::imageops::FilterType::Triangle => fr::FilterType::Bilinear,
            image::imageops::FilterType::CatmullRom => fr::FilterType::CatmullRom,
            image::imageops::FilterType::Gaussian => fr::FilterType::Mitchell,
            image::imageops::FilterType::Lanczos3 => fr::FilterType::Lanczos3,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::ImageFormat;

    fn create_png_bytes(width: u32, height: u32) -> Vec<u8> {
        let img = ImageBuffer::from_fn(width, height, |x, y| {
            Rgba([(x % 255) as u8, (y % 255) as u8, ((x + y) % 255) as u8, 255])
        });

        let mut cursor = Cursor::new(Vec::new());
        DynamicImage::ImageRgba8(img)
            .write_to(&mut cursor, ImageFormat::Png)
            .expect("failed to encode test image");
        cursor.into_inner()
    }

    fn raw(bytes: Vec<u8>) -> RawUpload {
        RawUpload {
            bytes,
            source_hint: "test",
        }
    }

    #[test]
    fn decode_produces_full_resolution_bitmap() {
        let handler = UploadHandler::new(UploadConfig::default()).expect("handler init failed");
        let config = UploadConfig::default();

        let bitmap = handler
            .decode_to_bitmap(raw(create_png_bytes(64, 48)), &config)
            .expect("decode should succeed");

        assert_eq!(bitmap.width(), 64);
        assert_eq!(bitmap.height(), 48);
        assert_eq!(bitmap.as_bytes().len(), 64 * 48 * 4);
    }

    #[test]
    fn decode_rejects_too_many_pixels_from_header() {
        let mut config = UploadConfig::default();
        config.max_decoded_pixels = 1_000;
        let handler = UploadHandler::new(config.clone()).expect("handler init failed");

        let result = handler.decode_to_bitmap(raw(create_png_bytes(100, 100)), &config);

        assert!(matches!(result, Err(UploadError::ResourceLimit(_))));
    }

    #[test]
    fn decode_rejects_truncated_png() {
        let handler = UploadHandler::new(UploadConfig::default()).expect("handler init failed");
        let config = UploadConfig::default();
        let mut bytes = create_png_bytes(32, 32);
        bytes.truncate(40);

        let result = handler.decode_to_bitmap(raw(bytes), &config);

        assert!(matches!(result, Err(UploadError::Decode(_))));
    }

    #[test]
    fn preview_dimensions_keep_aspect_ratio() {
        assert_eq!(UploadHandler::preview_dimensions(800, 600, 1200), None);
        assert_eq!(
            UploadHandler::preview_dimensions(2400, 1200, 1200),
            Some((1200, 600))
        );
        assert_eq!(
            UploadHandler::preview_dimensions(1000, 3000, 1200),
            Some((400, 1200))
        );
    }

    #[test]
    fn preview_downscales_large_bitmap() {
        let mut config = UploadConfig::default();
        config.preview_max_dimension = 64;
        let handler = UploadHandler::new(config.clone()).expect("handler init failed");
        let bitmap = handler
            .decode_to_bitmap(raw(create_png_bytes(256, 128)), &config)
            .expect("decode should succeed");

        let preview = handler
            .prepare_preview(&bitmap, &config)
            .expect("preview should succeed")
            .expect("large bitmap should get a preview");

        assert_eq!(preview.width(), 64);
        assert_eq!(preview.height(), 32);
    }

    #[test]
    fn preview_skipped_when_disabled() {
        let mut config = UploadConfig::default();
        config.adaptive_preview = false;
        config.preview_max_dimension = 16;
        let handler = UploadHandler::new(config.clone()).expect("handler init failed");
        let bitmap = Bitmap::new(32, 32, vec![0; 32 * 32 * 4]).expect("valid bitmap");

        let preview = handler
            .prepare_preview(&bitmap, &config)
            .expect("preview should succeed");

        assert!(preview.is_none());
    }
}
