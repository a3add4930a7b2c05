//! # 解码与缩放流水线模块
//!
//! ## 设计思路
//!
//! 将“字节 → 图像”和“大图 → 等比缩小”集中管理，并在关键节点增加资源上限控制。
//! 优先读取 header 尺寸做检查，再进行完整解码，降低恶意输入触发高内存开销的风险。
//!
//! ## 实现思路
//!
//! 1. 猜测格式并读取 header 尺寸
//! 2. 按像素/内存上限快速拒绝
//! 3. 完整解码，同时记录解码出的格式（PNG 签名也视为 PNG 容器）
//! 4. 需要时用 `fast_image_resize` 等比缩小，失败回退 `image::resize_exact`

use fast_image_resize as fr;
use image::imageops::FilterType;
use image::{DynamicImage, GenericImageView, ImageBuffer, ImageFormat, Rgb, Rgba};
use std::borrow::Cow;
use std::io::Cursor;

use super::source::RawImageData;
use super::{CanvasConfig, ImageError};

/// 解码阶段输出。
pub struct DecodedImage {
    pub image: DynamicImage,
    /// 由字节签名猜出的格式。
    pub format: ImageFormat,
}

/// 将原始字节解码为图像，解码前后都执行资源上限检查。
pub fn decode_image(raw: &RawImageData, config: &CanvasConfig) -> Result<DecodedImage, ImageError> {
    let format = image::guess_format(&raw.bytes)
        .map_err(|e| ImageError::Decode(format!("无法识别图片格式：{}", e)))?;

    let (header_width, header_height) = inspect_dimensions_from_memory(&raw.bytes)?;
    validate_pixel_limits(config, header_width, header_height)?;
    validate_decoded_memory_limits(config, header_width, header_height)?;

    let image = image::load_from_memory_with_format(&raw.bytes, format)
        .map_err(|e| ImageError::Decode(format!("图片解码失败：{}", e)))?;

    let (width, height) = image.dimensions();
    validate_pixel_limits(config, width, height)?;

    log::debug!(
        "🧾 解码完成 - 来源: {} 格式: {:?} 尺寸: {}x{} 色彩: {:?}",
        raw.source_hint,
        format,
        width,
        height,
        image.color()
    );

    Ok(DecodedImage { image, format })
}

/// 仅通过内存中的图片头信息读取宽高。
///
/// 用于在完整解码前做像素限制检查。
fn inspect_dimensions_from_memory(bytes: &[u8]) -> Result<(u32, u32), ImageError> {
    let reader = image::ImageReader::new(Cursor::new(bytes))
        .with_guessed_format()
        .map_err(|e| ImageError::Decode(format!("无法识别图片格式：{}", e)))?;

    reader
        .into_dimensions()
        .map_err(|e| ImageError::Decode(format!("无法读取图片尺寸：{}", e)))
}

/// 校验像素数量是否超过配置上限。
/// 目标画布同样受像素与内存上限约束，超限时在加载原图之前就失败。
pub(super) fn validate_canvas_limits(
    config: &CanvasConfig,
    width: u32,
    height: u32,
) -> Result<(), ImageError> {
    validate_pixel_limits(config, width, height)
        .and_then(|()| validate_decoded_memory_limits(config, width, height))
        .map_err(|err| match err {
            ImageError::ResourceLimit(msg) => {
                ImageError::ResourceLimit(format!("目标画布 {}x{}：{}", width, height, msg))
            }
            other => other,
        })
}

fn validate_pixel_limits(config: &CanvasConfig, width: u32, height: u32) -> Result<(), ImageError> {
    let pixels = u64::from(width) * u64::from(height);

    if pixels > config.max_decoded_pixels {
        return Err(ImageError::ResourceLimit(format!(
            "图片像素过大：{} 像素（限制：{} 像素）",
            pixels, config.max_decoded_pixels
        )));
    }

    Ok(())
}

fn validate_decoded_memory_limits(
    config: &CanvasConfig,
    width: u32,
    height: u32,
) -> Result<(), ImageError> {
    let estimated = u64::from(width)
        .checked_mul(u64::from(height))
        .and_then(|pixels| pixels.checked_mul(4))
        .ok_or_else(|| ImageError::ResourceLimit("图片解码内存估算溢出".to_string()))?;

    if estimated > config.max_decoded_bytes {
        return Err(ImageError::ResourceLimit(format!(
            "图片解码预计内存过大：{:.2} MB（限制：{:.2} MB）",
            estimated as f64 / 1024.0 / 1024.0,
            config.max_decoded_bytes as f64 / 1024.0 / 1024.0
        )));
    }

    Ok(())
}

/// 计算“等比缩小到能完整放入目标框”的尺寸；已经放得下时原样返回。
///
/// 缩放比 = 两轴比例的较小值，永不放大；被约束的那条轴精确等于目标值，
/// 另一条轴四舍五入且至少为 1。
pub fn fit_within(source: (u32, u32), target: (u32, u32)) -> (u32, u32) {
    let (sw, sh) = source;
    let (tw, th) = target;
    if sw == 0 || sh == 0 || (sw <= tw && sh <= th) {
        return source;
    }

    let (sw, sh, tw, th) = (u64::from(sw), u64::from(sh), u64::from(tw), u64::from(th));
    // tw / sw <= th / sh  ⇔  tw * sh <= th * sw
    let (width, height) = if tw * sh <= th * sw {
        (tw, ((sh * tw + sw / 2) / sw).clamp(1, th))
    } else {
        (((sw * th + sh / 2) / sh).clamp(1, tw), th)
    };

    (width as u32, height as u32)
}

/// 按需等比缩小：源图超出目标框任一维度时才缩放，否则借用原图。
pub fn downscale_to_fit(
    image: &DynamicImage,
    target_width: u32,
    target_height: u32,
    filter: FilterType,
) -> Cow<'_, DynamicImage> {
    let (width, height) = image.dimensions();
    let (fit_width, fit_height) = fit_within((width, height), (target_width, target_height));
    if (fit_width, fit_height) == (width, height) {
        return Cow::Borrowed(image);
    }

    log::info!(
        "🧩 等比缩小：{}x{} -> {}x{}（filter={:?}）",
        width,
        height,
        fit_width,
        fit_height,
        filter
    );

    match resize_with_fast_image_resize(image, fit_width, fit_height, filter) {
        Ok(resized) => Cow::Owned(resized),
        Err(err) => {
            log::warn!("⚠️ fast_image_resize 缩放失败，回退 image::resize_exact：{}", err);
            Cow::Owned(image.resize_exact(fit_width, fit_height, filter))
        }
    }
}

/// 带 alpha 的图按 RGBA 缩放（内部预乘 alpha，保留半透明边缘），其余按 RGB 缩放。
fn resize_with_fast_image_resize(
    image: &DynamicImage,
    target_width: u32,
    target_height: u32,
    filter: FilterType,
) -> Result<DynamicImage, ImageError> {
    let has_alpha = image.color().has_alpha();
    let (src_width, src_height) = image.dimensions();
    let (pixel_type, src_bytes) = if has_alpha {
        (fr::PixelType::U8x4, image.to_rgba8().into_raw())
    } else {
        (fr::PixelType::U8x3, image.to_rgb8().into_raw())
    };

    let src_image = fr::images::Image::from_vec_u8(src_width, src_height, src_bytes, pixel_type)
        .map_err(|e| ImageError::Decode(format!("构建源图像缓冲失败：{}", e)))?;

    let mut dst_image = fr::images::Image::new(target_width, target_height, pixel_type);

    let mut resizer = fr::Resizer::new();
    let options = fr::ResizeOptions::new().resize_alg(fr::ResizeAlg::Convolution(to_fast_filter(filter)));

    resizer
        .resize(&src_image, &mut dst_image, Some(&options))
        .map_err(|e| ImageError::Decode(format!("fast_image_resize 执行失败：{}", e)))?;

    let buffer = dst_image.into_vec();
    let resized = if has_alpha {
        ImageBuffer::<Rgba<u8>, Vec<u8>>::from_raw(target_width, target_height, buffer)
            .map(DynamicImage::ImageRgba8)
    } else {
        ImageBuffer::<Rgb<u8>, Vec<u8>>::from_raw(target_width, target_height, buffer)
            .map(DynamicImage::ImageRgb8)
    };

    resized.ok_or_else(|| ImageError::Decode("fast_image_resize 输出缓冲长度异常".to_string()))
}

fn to_fast_filter(filter: FilterType) -> fr::FilterType {
    match filter {
        FilterType::Nearest => fr::FilterType::Box,
        FilterType::Triangle => fr::FilterType::Bilinear,
        FilterType::CatmullRom => fr::FilterType::CatmullRom,
        FilterType::Gaussian => fr::FilterType::Mitchell,
        FilterType::Lanczos3 => fr::FilterType::Lanczos3,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::RgbaImage;

    fn encode(image: &DynamicImage, format: ImageFormat) -> Vec<u8> {
        let mut cursor = Cursor::new(Vec::new());
        image
            .write_to(&mut cursor, format)
            .expect("failed to encode test image");
        cursor.into_inner()
    }

    fn raw(bytes: Vec<u8>) -> RawImageData {
        RawImageData {
            bytes,
            source_hint: "test".to_string(),
        }
    }

    #[test]
    fn fit_within_keeps_images_that_already_fit() {
        assert_eq!(fit_within((100, 50), (200, 200)), (100, 50));
        assert_eq!(fit_within((200, 200), (200, 200)), (200, 200));
    }

    #[test]
    fn fit_within_scales_by_the_tighter_axis() {
        assert_eq!(fit_within((400, 200), (200, 200)), (200, 100));
        assert_eq!(fit_within((200, 400), (200, 200)), (100, 200));
        assert_eq!(fit_within((1000, 10), (100, 100)), (100, 1));
        assert_eq!(fit_within((300, 100), (200, 100)), (200, 67));
    }

    #[test]
    fn fit_within_never_collapses_an_axis() {
        assert_eq!(fit_within((10_000, 1), (10, 10)), (10, 1));
        assert_eq!(fit_within((1, 10_000), (10, 10)), (1, 10));
    }

    #[test]
    fn downscale_produces_fitted_dimensions_and_keeps_alpha() {
        let image = DynamicImage::ImageRgba8(RgbaImage::from_pixel(
            300,
            120,
            Rgba([10, 20, 30, 128]),
        ));
        let resized = downscale_to_fit(&image, 100, 100, FilterType::Lanczos3);
        assert!(matches!(resized, Cow::Owned(_)));
        assert_eq!(resized.dimensions(), (100, 40));
        assert!(resized.color().has_alpha());
    }

    #[test]
    fn downscale_leaves_small_images_untouched() {
        let image = DynamicImage::new_rgb8(30, 20);
        let resized = downscale_to_fit(&image, 100, 100, FilterType::Lanczos3);
        assert!(matches!(resized, Cow::Borrowed(_)));
        assert_eq!(resized.dimensions(), (30, 20));
    }

    #[test]
    fn decode_reports_png_signature() {
        let bytes = encode(&DynamicImage::new_rgb8(4, 4), ImageFormat::Png);
        let decoded = decode_image(&raw(bytes), &CanvasConfig::default()).unwrap();
        assert_eq!(decoded.format, ImageFormat::Png);
        assert_eq!(decoded.image.dimensions(), (4, 4));
    }

    #[test]
    fn decode_rejects_garbage() {
        let result = decode_image(&raw(vec![0u8; 64]), &CanvasConfig::default());
        assert!(matches!(result, Err(ImageError::Decode(_))));
    }

    #[test]
    fn decode_rejects_truncated_png() {
        let mut bytes = encode(&DynamicImage::new_rgb8(64, 64), ImageFormat::Png);
        bytes.truncate(bytes.len() / 2);
        let result = decode_image(&raw(bytes), &CanvasConfig::default());
        assert!(matches!(result, Err(ImageError::Decode(_))));
    }

    #[test]
    fn canvas_limits_reject_oversized_and_overflowing_targets() {
        let config = CanvasConfig::default();
        assert!(validate_canvas_limits(&config, 800, 600).is_ok());
        assert!(matches!(
            validate_canvas_limits(&config, 100_000, 100_000),
            Err(ImageError::ResourceLimit(msg)) if msg.starts_with("目标画布 100000x100000")
        ));
        assert!(matches!(
            validate_canvas_limits(&config, u32::MAX, u32::MAX),
            Err(ImageError::ResourceLimit(_))
        ));
    }

    #[test]
    fn decode_rejects_too_many_pixels() {
        let config = CanvasConfig {
            max_decoded_pixels: 100,
            ..CanvasConfig::default()
        };
        let bytes = encode(&DynamicImage::new_rgb8(20, 20), ImageFormat::Png);
        let result = decode_image(&raw(bytes), &config);
        assert!(matches!(result, Err(ImageError::ResourceLimit(_))));
    }
}
