//! # 颜色与背景策略
//!
//! ## 设计思路
//!
//! 画布背景只携带 RGB 三元组，不带 alpha。背景策略是三选一的标签类型：
//! `Auto`（从图片推断）、`Fixed`（黑/白）、`Custom`（用户指定）。
//! `Custom` 在类型上必须携带颜色，“选了自定义却没给颜色”只可能出现在
//! 字符串入参阶段，因此在 `BackgroundPolicy::from_option` 处报配置错误。
//!
//! ## 实现思路
//!
//! - `#RRGGBB` 解析通过 `once_cell::sync::Lazy` 预编译正则，首个 `#` 可省略。
//! - 非法十六进制在边界处即报 `ImageError::Configuration`，不会进入核心算法。

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;

use super::ImageError;

static HEX_COLOR: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^#?([0-9a-fA-F]{2})([0-9a-fA-F]{2})([0-9a-fA-F]{2})$")
        .expect("十六进制颜色正则必须可编译")
});

/// 不透明 RGB 颜色。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const BLACK: Color = Color::new(0, 0, 0);
    pub const WHITE: Color = Color::new(255, 255, 255);

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// 解析 `#RRGGBB`（大小写不敏感，`#` 可省略）。
    ///
    /// # 示例
    /// ```rust
    /// use canvas_resizer::canvas::Color;
    ///
    /// assert_eq!(Color::from_hex("#1a2B3c")?, Color::new(0x1a, 0x2b, 0x3c));
    /// assert!(Color::from_hex("#12345").is_err());
    /// # Ok::<(), canvas_resizer::canvas::ImageError>(())
    /// ```
    pub fn from_hex(hex: &str) -> Result<Self, ImageError> {
        let caps = HEX_COLOR.captures(hex.trim()).ok_or_else(|| {
            ImageError::Configuration(format!("无效的十六进制颜色：{}（应为 #RRGGBB）", hex))
        })?;

        let channel = |idx: usize| -> Result<u8, ImageError> {
            u8::from_str_radix(&caps[idx], 16)
                .map_err(|e| ImageError::Configuration(format!("颜色通道解析失败：{}", e)))
        };

        Ok(Self::new(channel(1)?, channel(2)?, channel(3)?))
    }

    pub fn to_hex(self) -> String {
        format!("#{:02X}{:02X}{:02X}", self.r, self.g, self.b)
    }

    pub fn to_rgb(self) -> image::Rgb<u8> {
        image::Rgb([self.r, self.g, self.b])
    }

    pub fn to_opaque_rgba(self) -> image::Rgba<u8> {
        image::Rgba([self.r, self.g, self.b, 255])
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

/// 画布背景色策略。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BackgroundPolicy {
    /// 从图片推断（透明 PNG 用黑色，其它按四角采样）。
    #[default]
    Auto,
    /// 固定调色板颜色（黑或白）。
    Fixed(Color),
    /// 用户自定义颜色。
    Custom(Color),
}

impl BackgroundPolicy {
    /// 从界面/命令行的选项字符串构造策略。
    ///
    /// 可选值：`auto` / `black` / `white` / `custom`。
    /// `custom` 必须同时给出合法的 `#RRGGBB`，否则返回配置错误。
    pub fn from_option(option: &str, custom_color: Option<&str>) -> Result<Self, ImageError> {
        match option.trim().to_lowercase().as_str() {
            "auto" => Ok(Self::Auto),
            "black" => Ok(Self::Fixed(Color::BLACK)),
            "white" => Ok(Self::Fixed(Color::WHITE)),
            "custom" => {
                let hex = custom_color
                    .filter(|hex| !hex.trim().is_empty())
                    .ok_or_else(|| {
                        ImageError::Configuration("选择了自定义背景色但未提供颜色".to_string())
                    })?;
                Ok(Self::Custom(Color::from_hex(hex)?))
            }
            other => Err(ImageError::Configuration(format!(
                "未知背景选项：{}（可选：auto / black / white / custom）",
                other
            ))),
        }
    }
}

impl fmt::Display for BackgroundPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Auto => write!(f, "auto"),
            Self::Fixed(color) => write!(f, "fixed({})", color),
            Self::Custom(color) => write!(f, "custom({})", color),
        }
    }
}
