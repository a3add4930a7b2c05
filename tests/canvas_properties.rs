use image::{DynamicImage, GenericImageView, ImageFormat, Rgb, RgbImage, Rgba, RgbaImage};
use proptest::prelude::*;
use std::io::Cursor;

use canvas_resizer::canvas::{
    BackgroundPolicy, CanvasCompositor, CanvasHandler, Color, ContainerFormat, ResizeRequest,
    centering_offset,
};

fn encode(image: &DynamicImage, format: ImageFormat) -> Vec<u8> {
    let mut cursor = Cursor::new(Vec::new());
    image
        .write_to(&mut cursor, format)
        .expect("encode test image failed");
    cursor.into_inner()
}

fn decode(bytes: &[u8]) -> RgbImage {
    image::load_from_memory(bytes)
        .expect("decode output failed")
        .to_rgb8()
}

fn close_to(actual: &Rgb<u8>, expected: [u8; 3], tolerance: u8) -> bool {
    actual
        .0
        .iter()
        .zip(expected)
        .all(|(a, e)| a.abs_diff(e) <= tolerance)
}

fn one_transparent_pixel_png() -> Vec<u8> {
    let mut buffer = RgbaImage::from_pixel(50, 50, Rgba([30, 160, 90, 255]));
    buffer.put_pixel(25, 25, Rgba([0, 0, 0, 0]));
    encode(&DynamicImage::ImageRgba8(buffer), ImageFormat::Png)
}

#[test]
fn small_source_is_centered_without_scaling() {
    let source = DynamicImage::ImageRgb8(RgbImage::from_fn(30, 20, |x, y| {
        Rgb([x as u8 * 8, y as u8 * 12, 77])
    }));

    let canvas = CanvasCompositor::default()
        .composite(&source, 100, 80, true, false, BackgroundPolicy::Auto)
        .expect("composite failed");

    let (ox, oy) = centering_offset((100, 80), (30, 20));
    assert_eq!((ox, oy), (35, 30));
    for (x, y) in [(0, 0), (29, 0), (0, 19), (29, 19), (13, 7)] {
        assert_eq!(
            canvas.get_pixel(ox as u32 + x, oy as u32 + y),
            source.to_rgb8().get_pixel(x, y),
            "像素 ({x},{y}) 应原样拷贝"
        );
    }
}

#[test]
fn white_jpeg_gets_white_padding() {
    let jpeg = encode(
        &DynamicImage::ImageRgb8(RgbImage::from_pixel(100, 100, Rgb([255, 255, 255]))),
        ImageFormat::Jpeg,
    );
    let handler = CanvasHandler::default();
    let config = handler.config_snapshot().expect("snapshot failed");

    let encoded = handler
        .process_bytes(jpeg, "white.jpg", None, &ResizeRequest::new(200, 200), &config)
        .expect("process failed");
    let canvas = decode(&encoded.bytes);

    assert_eq!(canvas.dimensions(), (200, 200));
    for (x, y) in [(0, 0), (199, 0), (0, 199), (199, 199), (10, 100)] {
        assert!(close_to(canvas.get_pixel(x, y), [255, 255, 255], 3), "({x},{y})");
    }
}

#[test]
fn transparent_png_auto_pads_black_and_fixed_white_pads_white() {
    let handler = CanvasHandler::default();
    let config = handler.config_snapshot().expect("snapshot failed");

    let auto = handler
        .process_bytes(
            one_transparent_pixel_png(),
            "icon.png",
            None,
            &ResizeRequest::new(100, 100),
            &config,
        )
        .expect("auto failed");
    assert_eq!(decode(&auto.bytes).get_pixel(0, 0), &Rgb([0, 0, 0]));

    let white = handler
        .process_bytes(
            one_transparent_pixel_png(),
            "icon.png",
            None,
            &ResizeRequest::new(100, 100).with_policy(BackgroundPolicy::Fixed(Color::WHITE)),
            &config,
        )
        .expect("fixed failed");
    let canvas = decode(&white.bytes);
    assert_eq!(canvas.get_pixel(0, 0), &Rgb([255, 255, 255]));
    assert_eq!(canvas.get_pixel(99, 99), &Rgb([255, 255, 255]));
    // 透明像素混合到白色背景上。
    assert_eq!(canvas.get_pixel(50, 50), &Rgb([255, 255, 255]));
}

#[test]
fn jpeg_ignores_fixed_policy() {
    let jpeg = encode(
        &DynamicImage::ImageRgb8(RgbImage::from_pixel(60, 40, Rgb([120, 80, 200]))),
        ImageFormat::Jpeg,
    );
    let handler = CanvasHandler::default();
    let config = handler.config_snapshot().expect("snapshot failed");

    let auto = handler
        .process_bytes(jpeg.clone(), "photo.jpg", None, &ResizeRequest::new(120, 90), &config)
        .expect("auto failed");
    let black = handler
        .process_bytes(
            jpeg,
            "photo.jpg",
            None,
            &ResizeRequest::new(120, 90).with_policy(BackgroundPolicy::Fixed(Color::BLACK)),
            &config,
        )
        .expect("fixed failed");

    assert_eq!(auto.bytes, black.bytes);
    assert_eq!(auto.format, ContainerFormat::Jpeg);
}

#[test]
fn pixel_at_origin_matches_source_corner() {
    let mut source = RgbImage::from_pixel(41, 17, Rgb([5, 5, 5]));
    source.put_pixel(0, 0, Rgb([250, 1, 99]));
    let source = DynamicImage::ImageRgb8(source);

    let canvas = CanvasCompositor::default()
        .composite(&source, 64, 64, true, false, BackgroundPolicy::Auto)
        .expect("composite failed");

    let (ox, oy) = centering_offset((64, 64), (41, 17));
    assert_eq!((ox, oy), (11, 23));
    assert_eq!(canvas.get_pixel(ox as u32, oy as u32), &Rgb([250, 1, 99]));
}

#[test]
fn oversized_source_is_downscaled_to_fit() {
    let source = DynamicImage::ImageRgb8(RgbImage::from_pixel(1600, 400, Rgb([0, 0, 255])));
    let canvas = CanvasCompositor::default()
        .composite(&source, 800, 600, true, false, BackgroundPolicy::Auto)
        .expect("composite failed");

    assert_eq!(canvas.dimensions(), (800, 600));
    // 缩放后 800x200，居中于 y=200..400。
    assert!(close_to(canvas.get_pixel(400, 300), [0, 0, 255], 2));
    assert!(close_to(canvas.get_pixel(0, 200), [0, 0, 255], 2));
}

fn arb_source() -> impl Strategy<Value = (u32, u32, bool)> {
    (1u32..160, 1u32..160, any::<bool>())
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(48))]

    #[test]
    fn output_always_has_target_dimensions(
        (sw, sh, alpha) in arb_source(),
        tw in 1u32..200,
        th in 1u32..200,
        maintain_aspect in any::<bool>(),
        is_png in any::<bool>(),
    ) {
        let source = if alpha {
            DynamicImage::ImageRgba8(RgbaImage::from_pixel(sw, sh, Rgba([10, 20, 30, 128])))
        } else {
            DynamicImage::ImageRgb8(RgbImage::from_pixel(sw, sh, Rgb([10, 20, 30])))
        };

        let canvas = CanvasCompositor::default()
            .composite(&source, tw, th, maintain_aspect, is_png, BackgroundPolicy::Auto)
            .expect("composite failed");

        prop_assert_eq!(canvas.dimensions(), (tw, th));
        prop_assert_eq!(source.dimensions(), (sw, sh));
    }

    #[test]
    fn centering_offset_is_floor_of_half_difference(
        tw in 1u32..5000,
        th in 1u32..5000,
        sw in 1u32..5000,
        sh in 1u32..5000,
    ) {
        let (x, y) = centering_offset((tw, th), (sw, sh));
        let dx = i64::from(tw) - i64::from(sw);
        let dy = i64::from(th) - i64::from(sh);
        prop_assert!(2 * x <= dx && dx <= 2 * x + 1);
        prop_assert!(2 * y <= dy && dy <= 2 * y + 1);
    }
}
