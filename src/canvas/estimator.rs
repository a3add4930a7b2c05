//! # 背景色推断
//!
//! 从图片四个角各取一块 `corner × corner` 像素，按通道求整数平均值作为背景色。
//! `corner = min(10, width / 10, height / 10)`，小图上角块可能为 0 或 1 像素；
//! 没有任何采样点时回退为白色，推断本身永不报错。

use image::{DynamicImage, GenericImageView, RgbImage};

use super::Color;

/// 角块边长上限（像素）。
const MAX_CORNER_SIZE: u32 = 10;

/// 推断图片的代表性背景色。
///
/// 只在局部 RGB 副本上采样，不修改调用方的图片。
pub fn estimate_background_color(image: &DynamicImage) -> Color {
    let rgb;
    let view: &RgbImage = match image {
        DynamicImage::ImageRgb8(buffer) => buffer,
        other => {
            rgb = other.to_rgb8();
            &rgb
        }
    };

    match average_corner_color(view) {
        Some(color) => color,
        None => {
            log::debug!(
                "🎨 角落采样为空（{}x{}），回退白色背景",
                image.width(),
                image.height()
            );
            Color::WHITE
        }
    }
}

fn average_corner_color(image: &RgbImage) -> Option<Color> {
    let (width, height) = image.dimensions();
    let corner = MAX_CORNER_SIZE.min(width / 10).min(height / 10);
    if corner == 0 {
        return None;
    }

    let right = width - corner;
    let bottom = height - corner;
    let origins = [(0, 0), (right, 0), (0, bottom), (right, bottom)];

    let mut sum = [0u64; 3];
    let mut count = 0u64;
    for (x0, y0) in origins {
        for (_, _, pixel) in image.view(x0, y0, corner, corner).pixels() {
            for (acc, channel) in sum.iter_mut().zip(pixel.0) {
                *acc += u64::from(channel);
            }
            count += 1;
        }
    }

    if count == 0 {
        return None;
    }

    let mean = |acc: u64| (acc / count) as u8;
    Some(Color::new(mean(sum[0]), mean(sum[1]), mean(sum[2])))
}
