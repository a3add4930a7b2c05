//! # 画布缩放工具：库入口
//!
//! 把图片缩放到固定尺寸：不裁剪、不放大，不足部分用背景色补齐并居中。
//! 背景色可自动推断（四角采样 / 透明 PNG 用黑色），也可固定为黑、白或自定义颜色。
//!
//! ## 架构总览
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │              命令行 (clap + tokio, main.rs)               │
//! │   single / folder / zip  ── Ctrl-C → 取消标志            │
//! └───────┬──────────────────────────────────────────────────┘
//!         ↓ spawn_blocking
//! ┌───────┼──────────────────────────────────────────────────┐
//! │       ↓            库 (Rust)                             │
//! │                                                          │
//! │  ┌─ settings ─── ResizeSettings (JSON + 默认值)           │
//! │  │                                                       │
//! │  ├─ batch ────── BatchRunner<Source, Sink>               │
//! │  │   ├─ source        单图 / 文件夹 / 压缩包枚举          │
//! │  │   ├─ sink          文件 / 目录 / 压缩包写出            │
//! │  │   └─ report        BatchReport + 状态文本              │
//! │  │                                                       │
//! │  ├─ canvas ───── CanvasHandler 编排                       │
//! │  │   ├─ estimator     四角平均背景色                      │
//! │  │   └─ compositor    背景决策 + 缩小 + 居中合成          │
//! │  │                                                       │
//! │  ├─ storage           默认输出位置 / 目录信息             │
//! │  └─ error ─────── AppError (统一错误类型)                 │
//! └──────────────────────────────────────────────────────────┘
//! ```
//!
//! ## 模块职责
//!
//! | 模块 | 职责 |
//! |------|------|
//! | [`error`] | 统一错误类型 `AppError` |
//! | [`canvas`] | 加载、解码、背景推断、合成、编码 |
//! | [`batch`] | 三种输入模式共用的批处理主循环与报告 |
//! | [`settings`] | 用户设置的加载与强类型转换 |
//! | [`storage`] | 默认输出路径、目录创建与统计 |

pub mod batch;
pub mod canvas;
pub mod error;
pub mod settings;
pub mod storage;
