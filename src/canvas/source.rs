//! # 数据源与中间模型
//!
//! ## 设计思路
//!
//! 将“外部输入语义”和“流水线中间结果”解耦：
//! - `ContainerFormat` 表示由扩展名决定的容器格式（决定背景策略是否生效、输出编码）
//! - `RawImageData` 表示已加载但未解码的字节
//! - `EncodedImage` 表示已编码、可直接落盘或写入压缩包的字节（格式默认同源，单图模式跟随输出扩展名）

use image::ImageFormat;
use std::path::Path;

use super::{BackgroundPolicy, ImageError};

/// 批处理层识别的源文件扩展名（大小写不敏感）。
pub const SUPPORTED_EXTENSIONS: [&str; 6] = ["jpg", "jpeg", "png", "bmp", "tiff", "webp"];

/// 输入/输出容器格式。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContainerFormat {
    Jpeg,
    Png,
    Bmp,
    Tiff,
    WebP,
}

impl ContainerFormat {
    /// 根据文件名后缀识别容器格式；不受支持的后缀返回 `None`。
    ///
    /// 按小写文件名的最后一个 `.` 之后的部分匹配，`.png` 这样的点文件同样算 PNG。
    pub fn from_path(path: impl AsRef<Path>) -> Option<Self> {
        let name = path.as_ref().file_name()?.to_str()?.to_ascii_lowercase();
        let (_, suffix) = name.rsplit_once('.')?;
        match suffix {
            "jpg" | "jpeg" => Some(Self::Jpeg),
            "png" => Some(Self::Png),
            "bmp" => Some(Self::Bmp),
            "tiff" => Some(Self::Tiff),
            "webp" => Some(Self::WebP),
            _ => None,
        }
    }

    pub fn is_png(self) -> bool {
        self == Self::Png
    }

    pub fn image_format(self) -> ImageFormat {
        match self {
            Self::Jpeg => ImageFormat::Jpeg,
            Self::Png => ImageFormat::Png,
            Self::Bmp => ImageFormat::Bmp,
            Self::Tiff => ImageFormat::Tiff,
            Self::WebP => ImageFormat::WebP,
        }
    }
}

/// 判断路径是否为受支持的图片扩展名。
pub fn is_supported_image(path: impl AsRef<Path>) -> bool {
    ContainerFormat::from_path(path).is_some()
}

/// 单次运行的缩放参数（单图 / 文件夹 / 压缩包共用）。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResizeRequest {
    pub width: u32,
    pub height: u32,
    pub maintain_aspect: bool,
    pub policy: BackgroundPolicy,
}

impl ResizeRequest {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            maintain_aspect: true,
            policy: BackgroundPolicy::Auto,
        }
    }

    pub fn with_maintain_aspect(mut self, maintain_aspect: bool) -> Self {
        self.maintain_aspect = maintain_aspect;
        self
    }

    pub fn with_policy(mut self, policy: BackgroundPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// 目标宽高必须为正整数；不设上限。
    pub fn validate(&self) -> Result<(), ImageError> {
        if self.width == 0 || self.height == 0 {
            return Err(ImageError::InvalidDimensions {
                width: self.width,
                height: self.height,
            });
        }
        Ok(())
    }
}

/// 加载阶段输出：原始字节与来源标识。
#[derive(Debug, Clone)]
pub struct RawImageData {
    /// 原始图片字节。
    pub bytes: Vec<u8>,
    /// 来源提示（文件路径或压缩包内路径，用于日志与诊断）。
    pub source_hint: String,
}

/// 编码阶段输出。
#[derive(Debug, Clone)]
pub struct EncodedImage {
    pub bytes: Vec<u8>,
    pub format: ContainerFormat,
    pub original_size: (u32, u32),
    pub size: (u32, u32),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extension_detection_is_case_insensitive() {
        assert_eq!(ContainerFormat::from_path("a/B.PNG"), Some(ContainerFormat::Png));
        assert_eq!(ContainerFormat::from_path("photo.JpEg"), Some(ContainerFormat::Jpeg));
        assert_eq!(ContainerFormat::from_path("x.webp"), Some(ContainerFormat::WebP));
        assert_eq!(ContainerFormat::from_path("scan.tiff"), Some(ContainerFormat::Tiff));
    }

    #[test]
    fn every_listed_extension_maps_to_a_container() {
        for ext in SUPPORTED_EXTENSIONS {
            assert!(is_supported_image(format!("file.{ext}")), "{ext}");
        }
    }

    #[test]
    fn unsupported_extensions_are_rejected() {
        for name in ["notes.txt", "anim.gif", "scan.tif", "README", ".png.bak", "png"] {
            assert!(!is_supported_image(name), "不应支持：{name}");
        }
    }

    #[test]
    fn dotfile_named_after_an_extension_is_accepted() {
        assert_eq!(ContainerFormat::from_path(".png"), Some(ContainerFormat::Png));
        assert_eq!(ContainerFormat::from_path("photos/.JPG"), Some(ContainerFormat::Jpeg));
        assert!(is_supported_image("nested/dir/.webp"));
    }

    #[test]
    fn request_validation_rejects_zero_sides() {
        assert!(ResizeRequest::new(800, 600).validate().is_ok());
        assert!(ResizeRequest::new(1, u32::MAX).validate().is_ok());
        assert!(matches!(
            ResizeRequest::new(0, 600).validate(),
            Err(ImageError::InvalidDimensions { width: 0, height: 600 })
        ));
    }

    #[test]
    fn only_png_gates_background_policy() {
        assert!(ContainerFormat::Png.is_png());
        assert!(!ContainerFormat::Jpeg.is_png());
        assert!(!ContainerFormat::WebP.is_png());
    }
}
