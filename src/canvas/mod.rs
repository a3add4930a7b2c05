//! # 画布缩放模块（canvas）
//!
//! ## 设计思路
//!
//! 该模块把“加载校验 → 解码 → 背景色决策 → 等比缩小 → 居中合成 → 编码”
//! 按职责拆分为多个子模块，批处理层只需面对 `CanvasHandler` 一个入口。
//!
//! - `handler`：编排整条处理流水线
//! - `loader`：负责文件/内存字节加载与签名校验
//! - `pipeline`：负责解码、像素限制、等比缩小
//! - `estimator`：四角采样估计背景色
//! - `compositor`：背景决策与居中合成
//! - `encoder`：按容器格式编码
//! - `config/error/color/source`：配置、错误、颜色策略、中间数据模型
//!
//! ## 实现思路
//!
//! 合成相关的纯函数（估计、决策、偏移）对外公开，便于单独测试与复用；
//! 加载与编码细节保持 `mod` 私有。
//!
//! ## 调用链
//!
//! ```text
//! batch::BatchRunner
//!    ↓
//! handler.rs（配置快照 + 阶段耗时日志）
//!    ├─ loader.rs（体积限制 + 签名校验）
//!    ├─ pipeline.rs（解码 + 像素限制）
//!    ├─ compositor.rs（背景决策 + 缩小 + 居中）
//!    │     └─ estimator.rs（四角平均色）
//!    └─ encoder.rs（JPEG 质量 / 其他格式默认编码）
//!    ↓
//! EncodedImage 交回批处理层写出
//! ```

mod color;
mod compositor;
mod config;
mod encoder;
mod error;
mod estimator;
mod handler;
mod loader;
mod pipeline;
mod source;

pub use color::{BackgroundPolicy, Color};
pub use compositor::{CanvasCompositor, centering_offset, has_transparency, resolve_background};
pub use config::{CanvasConfig, DEFAULT_JPEG_QUALITY, ResamplingProfile};
pub use encoder::encode_canvas;
pub use error::ImageError;
pub use estimator::estimate_background_color;
pub use handler::CanvasHandler;
pub use pipeline::{downscale_to_fit, fit_within};
pub use source::{
    ContainerFormat, EncodedImage, RawImageData, ResizeRequest, SUPPORTED_EXTENSIONS,
    is_supported_image,
};
