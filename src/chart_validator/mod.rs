//! # K 线图判定模块（chart_validator）
//!
//! ## 设计思路
//!
//! 仅凭像素数据粗略判断一张图片“像不像”蜡烛图截图：
//! 同时出现阳线绿、阴线红、黑色网格/坐标文字、白色/浅色背景四类颜色即视为图表。
//!
//! 这是一个固定阈值的启发式规则，不是训练得到的分类器。
//! 蓝/橙配色或单色图表会被误判，属于已知限制，阈值保持不变以兼容既有行为。
//!
//! ## 实现思路
//!
//! - `bitmap`：解码后的 RGBA 位图，构造时校验尺寸与缓冲长度
//! - `classifier`：单次线性扫描 + 四个颜色标志位，全部命中即提前返回
//!
//! 判定函数为纯函数，不持有任何跨调用状态，可在多个线程中并行调用。

mod bitmap;
mod classifier;

pub use bitmap::{Bitmap, BitmapError};
pub use classifier::{classify, classify_encoded};

pub(crate) use classifier::scan;
