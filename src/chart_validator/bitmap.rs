//! # 位图模型
//!
//! 解码后的栅格图像：宽、高与按行优先排列的 RGBA 字节（每像素 4 字节）。
//! 构造后不可变，由接收它的那次判定调用独占。

use image::RgbaImage;

/// 每像素通道数（R、G、B、A）。
pub const CHANNELS: usize = 4;

/// 位图构造错误。
#[derive(Debug, thiserror::Error)]
pub enum BitmapError {
    #[error("位图尺寸无效：{width}x{height}")]
    EmptyDimensions { width: u32, height: u32 },

    #[error("像素缓冲长度不匹配：期望 {expected} 字节，实际 {actual} 字节")]
    BufferLength { expected: usize, actual: usize },

    #[error("图片解码失败：{0}")]
    Decode(String),
}

/// 解码后的 RGBA 位图。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bitmap {
    width: u32,
    height: u32,
    pixels: Vec<u8>,
}

impl Bitmap {
    /// 从原始 RGBA 字节构造位图。
    ///
    /// 宽高必须都不小于 1，且 `pixels.len() == width * height * 4`。
    ///
    /// # 示例
    /// ```rust
    /// use iacam::chart_validator::Bitmap;
    ///
    /// let bitmap = Bitmap::new(1, 1, vec![128, 128, 128, 255])?;
    /// assert_eq!(bitmap.pixel_count(), 1);
    /// # Ok::<(), iacam::chart_validator::BitmapError>(())
    /// ```
    pub fn new(width: u32, height: u32, pixels: Vec<u8>) -> Result<Self, BitmapError> {
        if width == 0 || height == 0 {
            return Err(BitmapError::EmptyDimensions { width, height });
        }

        let expected = Self::expected_len(width, height).ok_or(BitmapError::BufferLength {
            expected: usize::MAX,
            actual: pixels.len(),
        })?;

        if pixels.len() != expected {
            return Err(BitmapError::BufferLength {
                expected,
                actual: pixels.len(),
            });
        }

        Ok(Self {
            width,
            height,
            pixels,
        })
    }

    /// 解码任意格式的图片字节。
    ///
    /// 不做体积或像素上限控制，受限解码见 `upload` 模块。
    pub fn decode(bytes: &[u8]) -> Result<Self, BitmapError> {
        if bytes.is_empty() {
            return Err(BitmapError::Decode("图片内容为空".to_string()));
        }

        let decoded =
            image::load_from_memory(bytes).map_err(|e| BitmapError::Decode(e.to_string()))?;

        Self::from_rgba_image(decoded.to_rgba8())
    }

    pub fn from_rgba_image(image: RgbaImage) -> Result<Self, BitmapError> {
        let (width, height) = image.dimensions();
        Self::new(width, height, image.into_raw())
    }

    pub fn into_rgba_image(self) -> Option<RgbaImage> {
        RgbaImage::from_raw(self.width, self.height, self.pixels)
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn pixel_count(&self) -> usize {
        self.pixels.len() / CHANNELS
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.pixels
    }

    /// 按行优先顺序遍历像素 `[r, g, b, a]`。
    pub fn pixels(&self) -> impl Iterator<Item = [u8; 4]> + '_ {
        self.pixels
            .chunks_exact(CHANNELS)
            .map(|px| [px[0], px[1], px[2], px[3]])
    }

    pub(crate) fn expected_len(width: u32, height: u32) -> Option<usize> {
        (width as usize)
            .checked_mul(height as usize)
            .and_then(|pixels| pixels.checked_mul(CHANNELS))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_rejects_zero_dimensions() {
        assert!(matches!(
            Bitmap::new(0, 4, Vec::new()),
            Err(BitmapError::EmptyDimensions { .. })
        ));
        assert!(matches!(
            Bitmap::new(4, 0, Vec::new()),
            Err(BitmapError::EmptyDimensions { .. })
        ));
    }

    #[test]
    fn new_rejects_mismatched_buffer() {
        let result = Bitmap::new(2, 2, vec![0; 15]);

        assert!(matches!(
            result,
            Err(BitmapError::BufferLength {
                expected: 16,
                actual: 15
            })
        ));
    }

    #[test]
    fn pixels_iterates_rgba_quads_in_row_major_order() {
        let bitmap = Bitmap::new(2, 1, vec![1, 2, 3, 4, 5, 6, 7, 8]).expect("valid bitmap");
        let pixels: Vec<[u8; 4]> = bitmap.pixels().collect();

        assert_eq!(pixels, vec![[1, 2, 3, 4], [5, 6, 7, 8]]);
    }

    #[test]
    fn decode_rejects_empty_and_garbage_input() {
        assert!(matches!(Bitmap::decode(&[]), Err(BitmapError::Decode(_))));
        assert!(matches!(
            Bitmap::decode(b"definitely not an image"),
            Err(BitmapError::Decode(_))
        ));
    }

    #[test]
    fn rgba_image_conversion_keeps_pixels() {
        let image = RgbaImage::from_pixel(3, 2, image::Rgba([10, 20, 30, 40]));
        let bitmap = Bitmap::from_rgba_image(image.clone()).expect("valid bitmap");

        assert_eq!(bitmap.width(), 3);
        assert_eq!(bitmap.height(), 2);
        assert_eq!(bitmap.into_rgba_image(), Some(image));
    }
}
