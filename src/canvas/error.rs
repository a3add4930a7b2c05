//! # 错误模型模块
//!
//! ## 设计思路
//!
//! 使用单一错误枚举承载画布链路中的所有错误来源，避免字符串拼接式错误处理。
//! 通过 `thiserror` 保持人类可读错误，同时让批处理层可按分支匹配、记录并继续。

/// 画布处理统一错误类型。
///
/// 单个文件的任何失败都落在这里，由批处理层记录为 `文件名: 消息` 后继续。
#[derive(Debug, thiserror::Error)]
pub enum ImageError {
    #[error("解码错误：{0}")]
    Decode(String),

    #[error("目标尺寸无效：{width}x{height}（宽高必须为正整数）")]
    InvalidDimensions { width: u32, height: u32 },

    #[error("配置错误：{0}")]
    Configuration(String),

    #[error("格式错误：{0}")]
    InvalidFormat(String),

    #[error("文件错误：{0}")]
    FileSystem(String),

    #[error("编码错误：{0}")]
    Encode(String),

    #[error("压缩包错误：{0}")]
    Archive(String),

    #[error("资源限制：{0}")]
    ResourceLimit(String),
}

