//! # 颜色扫描判定
//!
//! 单次线性扫描，每个像素依次检查四个谓词（忽略 alpha）：
//!
//! | 类别 | 条件 |
//! |------|------|
//! | 绿（阳线） | `g > r + 50 && g > b + 50` |
//! | 红（阴线） | `r > g + 50 && r > b + 50` |
//! | 黑（网格/文字） | `r < 50 && g < 50 && b < 50` |
//! | 白（背景） | `r > 200 && g > 200 && b > 200` |
//!
//! 标志位一旦置位不再复位；四个同时为真时立即返回，与扫完再判断结果一致。

use super::Bitmap;

/// 颜色优势判定的差值阈值（严格大于）。
const DOMINANCE_MARGIN: u16 = 50;
/// 黑色判定的亮度上限（严格小于）。
const DARK_CEILING: u8 = 50;
/// 白色判定的亮度下限（严格大于）。
const LIGHT_FLOOR: u8 = 200;

/// 扫描过程中的四个颜色标志位，每次判定重新创建。
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) struct ColorPresenceFlags {
    pub(crate) has_green: bool,
    pub(crate) has_red: bool,
    pub(crate) has_black: bool,
    pub(crate) has_white: bool,
}

impl ColorPresenceFlags {
    fn observe(&mut self, r: u8, g: u8, b: u8) {
        if is_greenish(r, g, b) {
            self.has_green = true;
        }
        if is_reddish(r, g, b) {
            self.has_red = true;
        }
        if is_blackish(r, g, b) {
            self.has_black = true;
        }
        if is_whitish(r, g, b) {
            self.has_white = true;
        }
    }

    pub(crate) fn all(&self) -> bool {
        self.has_green && self.has_red && self.has_black && self.has_white
    }

    /// 未出现的颜色类别，仅用于日志诊断。
    pub(crate) fn missing(&self) -> Vec<&'static str> {
        [
            (self.has_green, "green"),
            (self.has_red, "red"),
            (self.has_black, "black"),
            (self.has_white, "white"),
        ]
        .into_iter()
        .filter(|(present, _)| !present)
        .map(|(_, name)| name)
        .collect()
    }
}

// u16 加宽，避免 `r + 50` 在 u8 上溢出。
fn dominates(value: u8, other: u8) -> bool {
    u16::from(value) > u16::from(other) + DOMINANCE_MARGIN
}

fn is_greenish(r: u8, g: u8, b: u8) -> bool {
    dominates(g, r) && dominates(g, b)
}

fn is_reddish(r: u8, g: u8, b: u8) -> bool {
    dominates(r, g) && dominates(r, b)
}

fn is_blackish(r: u8, g: u8, b: u8) -> bool {
    r < DARK_CEILING && g < DARK_CEILING && b < DARK_CEILING
}

fn is_whitish(r: u8, g: u8, b: u8) -> bool {
    r > LIGHT_FLOOR && g > LIGHT_FLOOR && b > LIGHT_FLOOR
}

/// 扫描位图并返回累计的颜色标志位。
///
/// 四个标志全部置位后立即停止扫描。
pub(crate) fn scan(bitmap: &Bitmap) -> ColorPresenceFlags {
    let mut flags = ColorPresenceFlags::default();

    for [r, g, b, _alpha] in bitmap.pixels() {
        flags.observe(r, g, b);
        if flags.all() {
            break;
        }
    }

    flags
}

/// 判断位图是否像一张蜡烛图。
///
/// # 示例
/// ```rust
/// use iacam::chart_validator::{Bitmap, classify};
///
/// let bitmap = Bitmap::new(2, 2, vec![
///     0, 255, 0, 255,
///     255, 0, 0, 255,
///     0, 0, 0, 255,
///     255, 255, 255, 255,
/// ])?;
/// assert!(classify(&bitmap));
/// # Ok::<(), iacam::chart_validator::BitmapError>(())
/// ```
pub fn classify(bitmap: &Bitmap) -> bool {
    scan(bitmap).all()
}

/// 解码图片字节后判定。
///
/// 任何解码失败（空数据、损坏、不支持的格式）都返回 `false`，不向上抛错。
pub fn classify_encoded(bytes: &[u8]) -> bool {
    match Bitmap::decode(bytes) {
        Ok(bitmap) => classify(&bitmap),
        Err(err) => {
            log::debug!("🚫 图片无法解码，按非图表处理：{}", err);
            false
        }
    }
}
