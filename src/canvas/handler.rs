//! # 核心编排模块
//!
//! ## 设计思路
//!
//! `CanvasHandler` 只负责流程编排与配置管理，不关心文件来自文件夹还是压缩包。
//! 处理链路固定为：
//! 1. 读取配置快照
//! 2. 加载原始字节（文件或内存）
//! 3. 解码并检查资源上限
//! 4. 合成画布
//! 5. 编码：默认沿用原容器格式，调用方给出输出格式时按输出格式
//!
//! ## 实现思路
//!
//! - 配置通过 `Arc<RwLock<CanvasConfig>>` 支持运行时切换档位。
//! - 单次批处理使用“同一配置快照”，避免处理中途配置漂移。
//! - 记录 `load/decode/compose/encode/total` 阶段耗时，便于性能诊断。
//! - 目标尺寸与原图一样受像素和内存上限约束，超限记为该条目的错误。

use image::{GenericImageView, ImageFormat};
use std::path::Path;
use std::sync::{Arc, RwLock};
use std::time::Instant;

use super::compositor::CanvasCompositor;
use super::encoder::encode_canvas;
use super::loader::{load_from_bytes, load_from_file};
use super::pipeline::{decode_image, validate_canvas_limits};
use super::source::{ContainerFormat, EncodedImage, RawImageData, ResizeRequest};
use super::{CanvasConfig, ImageError, ResamplingProfile};

/// 画布处理器。
///
/// 可在多个批处理之间共享（`Clone` 只复制 `Arc`）。
#[derive(Debug, Clone)]
pub struct CanvasHandler {
    config: Arc<RwLock<CanvasConfig>>,
}

impl Default for CanvasHandler {
    fn default() -> Self {
        Self::new(CanvasConfig::default())
    }
}

impl CanvasHandler {
    /// 根据初始配置创建处理器。
    ///
    /// # 示例
    /// ```rust
    /// use canvas_resizer::canvas::{CanvasConfig, CanvasHandler, ResamplingProfile};
    ///
    /// let handler = CanvasHandler::new(CanvasConfig::default());
    /// assert_eq!(handler.resampling_profile()?, ResamplingProfile::Quality);
    /// # Ok::<(), canvas_resizer::canvas::ImageError>(())
    /// ```
    pub fn new(config: CanvasConfig) -> Self {
        Self {
            config: Arc::new(RwLock::new(config)),
        }
    }

    /// 获取配置快照。
    ///
    /// 作用：保证单次批处理链路使用一致参数。
    pub fn config_snapshot(&self) -> Result<CanvasConfig, ImageError> {
        self.config
            .read()
            .map(|cfg| cfg.clone())
            .map_err(|_| ImageError::ResourceLimit("配置读取锁已中毒".to_string()))
    }

    /// 设置重采样档位。
    pub fn set_resampling_profile(&self, profile: ResamplingProfile) -> Result<(), ImageError> {
        let mut config = self
            .config
            .write()
            .map_err(|_| ImageError::ResourceLimit("配置写入锁已中毒".to_string()))?;
        config.apply_resampling_profile(profile);

        log::info!(
            "⚙️ 已切换重采样档位：{}（filter={:?}）",
            profile.as_str(),
            config.resize_filter
        );

        Ok(())
    }

    /// 获取当前生效档位。
    pub fn resampling_profile(&self) -> Result<ResamplingProfile, ImageError> {
        let config = self
            .config
            .read()
            .map_err(|_| ImageError::ResourceLimit("配置读取锁已中毒".to_string()))?;
        Ok(config.infer_resampling_profile())
    }

    /// 设置 JPEG 输出质量。
    pub fn set_jpeg_quality(&self, quality: u8) -> Result<(), ImageError> {
        let mut config = self
            .config
            .write()
            .map_err(|_| ImageError::ResourceLimit("配置写入锁已中毒".to_string()))?;
        config.set_jpeg_quality(quality)
    }

    /// 处理本地图片文件。
    ///
    /// `output` 为 `None` 时按原文件的容器格式编码。
    pub fn process_file(
        &self,
        path: &Path,
        output: Option<ContainerFormat>,
        request: &ResizeRequest,
        config: &CanvasConfig,
    ) -> Result<EncodedImage, ImageError> {
        request.validate()?;
        validate_canvas_limits(config, request.width, request.height)?;
        let format = container_format_of(path)?;

        let load_start = Instant::now();
        let raw = load_from_file(path, config)?;
        let load_elapsed = load_start.elapsed();

        self.process_raw(raw, format, output, request, config, load_elapsed.as_millis())
    }

    /// 处理已在内存中的图片字节（例如压缩包条目）；`name` 决定源容器格式。
    pub fn process_bytes(
        &self,
        bytes: Vec<u8>,
        name: &str,
        output: Option<ContainerFormat>,
        request: &ResizeRequest,
        config: &CanvasConfig,
    ) -> Result<EncodedImage, ImageError> {
        request.validate()?;
        validate_canvas_limits(config, request.width, request.height)?;
        let format = container_format_of(Path::new(name))?;

        let load_start = Instant::now();
        let raw = load_from_bytes(bytes, name, config)?;
        let load_elapsed = load_start.elapsed();

        self.process_raw(raw, format, output, request, config, load_elapsed.as_millis())
    }

    fn process_raw(
        &self,
        raw: RawImageData,
        format: ContainerFormat,
        output: Option<ContainerFormat>,
        request: &ResizeRequest,
        config: &CanvasConfig,
        load_ms: u128,
    ) -> Result<EncodedImage, ImageError> {
        let total_start = Instant::now();

        let decode_start = Instant::now();
        let decoded = decode_image(&raw, config)?;
        let decode_elapsed = decode_start.elapsed();

        // 背景策略只看源：扩展名或解码签名任一为 PNG 都视为 PNG 容器。
        let is_png = format.is_png() || decoded.format == ImageFormat::Png;
        let output = output.unwrap_or(format);

        let compose_start = Instant::now();
        let canvas = CanvasCompositor::new(config.resize_filter).composite(
            &decoded.image,
            request.width,
            request.height,
            request.maintain_aspect,
            is_png,
            request.policy,
        )?;
        let compose_elapsed = compose_start.elapsed();

        let encode_start = Instant::now();
        let bytes = encode_canvas(&canvas, output, config.jpeg_quality)?;
        let encode_elapsed = encode_start.elapsed();

        log::info!(
            "✅ 图片处理完成 - {} {}x{} -> {}x{} load={}ms decode={}ms compose={}ms encode={}ms total={}ms",
            raw.source_hint,
            decoded.image.width(),
            decoded.image.height(),
            canvas.width(),
            canvas.height(),
            load_ms,
            decode_elapsed.as_millis(),
            compose_elapsed.as_millis(),
            encode_elapsed.as_millis(),
            load_ms + total_start.elapsed().as_millis()
        );

        Ok(EncodedImage {
            bytes,
            format: output,
            original_size: decoded.image.dimensions(),
            size: canvas.dimensions(),
        })
    }
}

fn container_format_of(path: &Path) -> Result<ContainerFormat, ImageError> {
    ContainerFormat::from_path(path).ok_or_else(|| {
        ImageError::InvalidFormat(format!("不支持的图片扩展名：{}", path.display()))
    })
}
