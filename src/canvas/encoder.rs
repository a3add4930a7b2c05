//! # 编码模块
//!
//! 画布始终是不透明 RGB，按原文件的容器格式编码：JPEG 使用配置中的质量（默认 95），
//! 其余格式（PNG / BMP / TIFF / WebP 无损）走 `image` 的默认编码器。

use image::codecs::jpeg::JpegEncoder;
use image::{ExtendedColorType, ImageEncoder, RgbImage};
use std::io::Cursor;

use super::ImageError;
use super::source::ContainerFormat;

/// 将画布编码为指定容器格式的字节。
pub fn encode_canvas(
    canvas: &RgbImage,
    format: ContainerFormat,
    jpeg_quality: u8,
) -> Result<Vec<u8>, ImageError> {
    let mut cursor = Cursor::new(Vec::new());

    match format {
        ContainerFormat::Jpeg => {
            JpegEncoder::new_with_quality(&mut cursor, jpeg_quality)
                .write_image(
                    canvas.as_raw(),
                    canvas.width(),
                    canvas.height(),
                    ExtendedColorType::Rgb8,
                )
                .map_err(|e| ImageError::Encode(format!("JPEG 编码失败：{}", e)))?;
        }
        other => {
            canvas
                .write_to(&mut cursor, other.image_format())
                .map_err(|e| ImageError::Encode(format!("{:?} 编码失败：{}", other, e)))?;
        }
    }

    Ok(cursor.into_inner())
}
