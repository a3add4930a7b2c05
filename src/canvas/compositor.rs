//! # 画布合成模块
//!
//! ## 设计思路
//!
//! 给定一张已解码的图与背景策略，产出严格等于目标尺寸的新画布：
//! 背景色先按“容器格式 → 透明度 → 策略”的优先级确定一次，再把（可能已等比缩小的）
//! 原图居中贴上去。只补边、不裁剪；输出永远是不透明 RGB。
//!
//! ## 实现思路
//!
//! - 背景色：PNG 容器才看策略；`Auto` 下透明 PNG 用黑色，其余走四角采样。
//!   非 PNG 容器一律四角采样，策略被忽略。
//! - 偏移：`floor((目标 - 源) / 2)`，源图比画布大时为负，贴图时自动裁掉越界部分。
//! - 带 alpha 的源图用 `imageops::overlay` 按 alpha 混合；否则 `imageops::replace` 直接覆盖。

use image::imageops::{self, FilterType};
use image::{DynamicImage, GenericImageView, RgbImage, RgbaImage};
use std::borrow::Cow;

use super::estimator::estimate_background_color;
use super::pipeline::downscale_to_fit;
use super::{BackgroundPolicy, Color, ImageError};

/// 无状态画布合成器；只持有缩放滤镜。
#[derive(Debug, Clone, Copy)]
pub struct CanvasCompositor {
    resize_filter: FilterType,
}

impl Default for CanvasCompositor {
    fn default() -> Self {
        Self::new(FilterType::Lanczos3)
    }
}

impl CanvasCompositor {
    pub fn new(resize_filter: FilterType) -> Self {
        Self { resize_filter }
    }

    /// 生成目标尺寸的画布并把原图居中贴上。
    ///
    /// 原图只读；任何情况下返回的画布尺寸都恰好是 `target_width x target_height`。
    ///
    /// # 示例
    /// ```rust
    /// use canvas_resizer::canvas::{BackgroundPolicy, CanvasCompositor};
    /// use image::DynamicImage;
    ///
    /// let source = DynamicImage::new_rgb8(40, 10);
    /// let canvas = CanvasCompositor::default()
    ///     .composite(&source, 20, 20, true, false, BackgroundPolicy::Auto)?;
    /// assert_eq!(canvas.dimensions(), (20, 20));
    /// # Ok::<(), canvas_resizer::canvas::ImageError>(())
    /// ```
    pub fn composite(
        &self,
        image: &DynamicImage,
        target_width: u32,
        target_height: u32,
        maintain_aspect: bool,
        is_png_container: bool,
        policy: BackgroundPolicy,
    ) -> Result<RgbImage, ImageError> {
        if target_width == 0 || target_height == 0 {
            return Err(ImageError::InvalidDimensions {
                width: target_width,
                height: target_height,
            });
        }

        check_canvas_len(target_width, target_height)?;

        let background = resolve_background(image, is_png_container, policy);

        let source = if maintain_aspect {
            downscale_to_fit(image, target_width, target_height, self.resize_filter)
        } else {
            Cow::Borrowed(image)
        };

        let (x, y) = centering_offset((target_width, target_height), source.dimensions());

        log::debug!(
            "🖼️ 合成画布 - 源: {}x{} 贴图: {}x{} 画布: {}x{} 偏移: ({}, {}) 背景: {} 策略: {} PNG: {}",
            image.width(),
            image.height(),
            source.width(),
            source.height(),
            target_width,
            target_height,
            x,
            y,
            background,
            policy,
            is_png_container
        );

        let canvas = if source.color().has_alpha() {
            let mut canvas =
                RgbaImage::from_pixel(target_width, target_height, background.to_opaque_rgba());
            match &*source {
                DynamicImage::ImageRgba8(top) => imageops::overlay(&mut canvas, top, x, y),
                other => imageops::overlay(&mut canvas, &other.to_rgba8(), x, y),
            }
            DynamicImage::ImageRgba8(canvas).into_rgb8()
        } else {
            let mut canvas = RgbImage::from_pixel(target_width, target_height, background.to_rgb());
            match &*source {
                DynamicImage::ImageRgb8(top) => imageops::replace(&mut canvas, top, x, y),
                other => imageops::replace(&mut canvas, &other.to_rgb8(), x, y),
            }
            canvas
        };

        Ok(canvas)
    }
}

/// RGBA 画布的缓冲区长度必须能用 `usize` 表示。
fn check_canvas_len(width: u32, height: u32) -> Result<(), ImageError> {
    u64::from(width)
        .checked_mul(u64::from(height))
        .and_then(|pixels| pixels.checked_mul(4))
        .and_then(|len| usize::try_from(len).ok())
        .map(|_| ())
        .ok_or_else(|| ImageError::ResourceLimit(format!("画布尺寸过大：{}x{}", width, height)))
}

/// 按优先级确定背景色（每次合成只计算一次）。
pub fn resolve_background(
    image: &DynamicImage,
    is_png_container: bool,
    policy: BackgroundPolicy,
) -> Color {
    if !is_png_container {
        return estimate_background_color(image);
    }

    match policy {
        BackgroundPolicy::Fixed(color) | BackgroundPolicy::Custom(color) => color,
        BackgroundPolicy::Auto if has_transparency(image) => Color::BLACK,
        BackgroundPolicy::Auto => estimate_background_color(image),
    }
}

/// 是否存在透明度：有 alpha 通道且至少一个像素 alpha 不是满值。
///
/// 抗锯齿边缘上 alpha=254 的像素也算透明。
pub fn has_transparency(image: &DynamicImage) -> bool {
    match image {
        DynamicImage::ImageRgba8(buffer) => buffer.pixels().any(|p| p.0[3] < u8::MAX),
        DynamicImage::ImageLumaA8(buffer) => buffer.pixels().any(|p| p.0[1] < u8::MAX),
        DynamicImage::ImageRgba16(buffer) => buffer.pixels().any(|p| p.0[3] < u16::MAX),
        DynamicImage::ImageLumaA16(buffer) => buffer.pixels().any(|p| p.0[1] < u16::MAX),
        other if other.color().has_alpha() => other.to_rgba8().pixels().any(|p| p.0[3] < u8::MAX),
        _ => false,
    }
}

/// 居中偏移：`floor((目标 - 源) / 2)`，可为负。
pub fn centering_offset(target: (u32, u32), source: (u32, u32)) -> (i64, i64) {
    let axis = |t: u32, s: u32| (i64::from(t) - i64::from(s)).div_euclid(2);
    (axis(target.0, source.0), axis(target.1, source.1))
}
