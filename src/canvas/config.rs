//! # 配置模块
//!
//! ## 设计思路
//!
//! 将所有“可调策略”集中到 `CanvasConfig`，保证运行时行为可观测、可调整、可测试。
//! 其中重采样档位（quality / balanced / speed）作为高层语义，映射到底层滤镜。
//!
//! ## 实现思路
//!
//! - `Default` 提供生产可用的高质量配置（Lanczos3 + JPEG 质量 95）。
//! - `ResamplingProfile` 负责档位字符串解析与反向输出。
//! - `apply_resampling_profile` 将档位转换为具体滤镜。
//! - `infer_resampling_profile` 用于从当前配置反推档位（给日志与报告展示）。

use image::imageops::FilterType;

use super::ImageError;

/// 有损编码器使用的默认质量。
pub const DEFAULT_JPEG_QUALITY: u8 = 95;

/// 画布处理配置。
///
/// 字段覆盖了读取、解码、缩放与编码四个阶段。
#[derive(Debug, Clone)]
pub struct CanvasConfig {
    /// 读取原始字节时允许的最大文件体积（字节）。
    pub max_file_size: u64,
    /// 解码后的像素上限（`width * height`）。
    pub max_decoded_pixels: u64,
    /// 解码阶段允许的预计内存上限（按 RGBA 估算，字节）。
    pub max_decoded_bytes: u64,
    /// 等比缩小时使用的滤镜。
    pub resize_filter: FilterType,
    /// JPEG 输出质量（1~100）。
    pub jpeg_quality: u8,
}

impl Default for CanvasConfig {
    fn default() -> Self {
        Self {
            max_file_size: 200 * 1024 * 1024,
            max_decoded_pixels: 200_000_000,
            max_decoded_bytes: 800 * 1024 * 1024,
            resize_filter: FilterType::Lanczos3,
            jpeg_quality: DEFAULT_JPEG_QUALITY,
        }
    }
}

/// 重采样档位（面向用户语义）。
///
/// - `Quality`：Lanczos3，尽量保真（默认）
/// - `Balanced`：CatmullRom
/// - `Speed`：Triangle，优先速度
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResamplingProfile {
    Quality,
    Balanced,
    Speed,
}

impl ResamplingProfile {
    /// 从外部字符串解析档位。
    ///
    /// # 示例
    /// ```rust
    /// use canvas_resizer::canvas::ResamplingProfile;
    ///
    /// let p = ResamplingProfile::from_str("Balanced")?;
    /// assert_eq!(p.as_str(), "balanced");
    /// # Ok::<(), canvas_resizer::canvas::ImageError>(())
    /// ```
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(profile: &str) -> Result<Self, ImageError> {
        match profile.trim().to_lowercase().as_str() {
            "quality" => Ok(Self::Quality),
            "balanced" => Ok(Self::Balanced),
            "speed" => Ok(Self::Speed),
            other => Err(ImageError::Configuration(format!(
                "未知重采样档位：{}（可选：quality / balanced / speed）",
                other
            ))),
        }
    }

    /// 将档位输出为稳定字符串，供日志与报告展示。
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Quality => "quality",
            Self::Balanced => "balanced",
            Self::Speed => "speed",
        }
    }
}

impl CanvasConfig {
    /// 基于当前滤镜反推档位。
    ///
    /// 不在三档映射内的滤镜（如 Nearest / Gaussian）按 `Speed` / `Balanced` 归类。
    pub fn infer_resampling_profile(&self) -> ResamplingProfile {
        match self.resize_filter {
            FilterType::Lanczos3 => ResamplingProfile::Quality,
            FilterType::CatmullRom | FilterType::Gaussian => ResamplingProfile::Balanced,
            FilterType::Triangle | FilterType::Nearest => ResamplingProfile::Speed,
        }
    }

    /// 应用指定档位到实际滤镜。
    pub fn apply_resampling_profile(&mut self, profile: ResamplingProfile) {
        self.resize_filter = match profile {
            ResamplingProfile::Quality => FilterType::Lanczos3,
            ResamplingProfile::Balanced => FilterType::CatmullRom,
            ResamplingProfile::Speed => FilterType::Triangle,
        };
    }

    /// 原始字节体积是否在 `max_file_size` 以内。
    pub fn check_file_size(&self, len: u64) -> Result<(), ImageError> {
        if len > self.max_file_size {
            return Err(ImageError::ResourceLimit(format!(
                "文件过大：{:.2} MB（限制：{:.2} MB）",
                len as f64 / 1024.0 / 1024.0,
                self.max_file_size as f64 / 1024.0 / 1024.0
            )));
        }
        Ok(())
    }

    /// 设置 JPEG 质量，超出 1~100 视为配置错误。
    pub fn set_jpeg_quality(&mut self, quality: u8) -> Result<(), ImageError> {
        if !(1..=100).contains(&quality) {
            return Err(ImageError::Configuration(format!(
                "JPEG 质量必须在 1~100 之间：{}",
                quality
            )));
        }
        self.jpeg_quality = quality;
        Ok(())
    }
}
