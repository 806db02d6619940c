//! # IACAM 图表截图筛查 — 库入口
//!
//! ## 架构总览
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │            调用方 (命令行 / 上传接口)                    │
//! │       UploadSource ── AppSettings (显式传入)              │
//! └───────┼──────────────────────────────────────────────────┘
//!         ↕ Result<ScreeningOutcome, AppError>
//! ┌───────┼──────────────────────────────────────────────────┐
//! │       ↕                                                  │
//! │  ┌─ error ────────── AppError (统一错误类型)             │
//! │  │                                                       │
//! │  ├─ upload ───────── 加载·校验·解码·预览                 │
//! │  │   └─ service        spawn_blocking 异步入口           │
//! │  │                                                       │
//! │  ├─ chart_validator ─ Bitmap + 四色扫描判定 (纯函数)     │
//! │  ├─ storage ──────── 通过判定的图片持久化 (可选)          │
//! │  └─ settings ─────── JSON 设置 → UploadConfig            │
//! └──────────────────────────────────────────────────────────┘
//! ```
//!
//! ## 模块职责
//!
//! | 模块 | 职责 |
//! |------|------|
//! | [`error`] | 统一错误类型 `AppError` |
//! | [`chart_validator`] | 位图模型与蜡烛图颜色启发式判定 |
//! | [`upload`] | 上传体积/类型校验、受限解码、判定编排、预览降采样 |
//! | [`storage`] | 图片存储目录的获取、自动创建与 PNG 保存 |
//! | [`settings`] | 设置文件解析与配置转换 |

pub mod error;
pub mod chart_validator;
pub mod settings;
pub mod storage;
pub mod upload;
