//! 用户设置模块
//!
//! # 设计思路
//!
//! 面向用户的默认参数（尺寸、背景、档位、质量）集中在 `ResizeSettings`，
//! 可从 JSON 文件加载，缺失字段回退到默认值；命令行参数再覆盖文件中的值。
//!
//! # 实现思路
//!
//! - `serde(default)` 保证部分字段的设置文件也能解析。
//! - `to_request` / `to_config` 在边界处完成字符串 → 强类型转换，
//!   非法背景选项或颜色在这里报配置错误，不会进入核心算法。

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::canvas::{
    BackgroundPolicy, CanvasConfig, DEFAULT_JPEG_QUALITY, ResamplingProfile, ResizeRequest,
};
use crate::error::AppError;

/// 缩放参数的用户设置。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResizeSettings {
    pub width: u32,
    pub height: u32,
    pub maintain_aspect: bool,
    /// `auto | black | white | custom`
    pub background: String,
    /// `custom` 背景使用的 `#RRGGBB` 颜色。
    pub custom_color: String,
    /// `quality | balanced | speed`
    pub profile: String,
    pub jpeg_quality: u8,
}

impl Default for ResizeSettings {
    fn default() -> Self {
        Self {
            width: 800,
            height: 600,
            maintain_aspect: true,
            background: "auto".to_string(),
            custom_color: "#FFFFFF".to_string(),
            profile: ResamplingProfile::Quality.as_str().to_string(),
            jpeg_quality: DEFAULT_JPEG_QUALITY,
        }
    }
}

impl ResizeSettings {
    /// 从 JSON 文件加载设置。
    pub fn load(path: &Path) -> Result<Self, AppError> {
        let content = fs::read_to_string(path).map_err(|e| {
            AppError::Settings(format!("读取设置文件 '{}' 失败: {}", path.display(), e))
        })?;
        let settings = serde_json::from_str::<Self>(&content)
            .map_err(|e| AppError::Settings(format!("解析设置文件失败: {}", e)))?;

        log::info!("⚙️ 已加载设置文件: {}", path.display());
        Ok(settings)
    }

    /// 有路径时加载文件，否则使用默认值。
    pub fn load_or_default(path: Option<&Path>) -> Result<Self, AppError> {
        match path {
            Some(path) => Self::load(path),
            None => Ok(Self::default()),
        }
    }

    /// 解析背景选项。
    pub fn background_policy(&self) -> Result<BackgroundPolicy, AppError> {
        Ok(BackgroundPolicy::from_option(
            &self.background,
            Some(self.custom_color.as_str()),
        )?)
    }

    /// 转换为单次运行的缩放参数。
    pub fn to_request(&self) -> Result<ResizeRequest, AppError> {
        let request = ResizeRequest::new(self.width, self.height)
            .with_maintain_aspect(self.maintain_aspect)
            .with_policy(self.background_policy()?);
        request.validate()?;
        Ok(request)
    }

    /// 转换为流水线配置（档位 + JPEG 质量），其余字段取默认。
    pub fn to_config(&self) -> Result<CanvasConfig, AppError> {
        let mut config = CanvasConfig::default();
        config.apply_resampling_profile(ResamplingProfile::from_str(&self.profile)?);
        config.set_jpeg_quality(self.jpeg_quality)?;
        Ok(config)
    }
}
