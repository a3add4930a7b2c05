//! 统一错误类型模块
//!
//! # 设计思路
//!
//! 定义全局统一的 `AppError` 枚举，承载画布链路之外的失败：
//! 批处理准备（目录/压缩包不可用）、设置文件解析、后台线程异常等。
//!
//! 单个文件的失败由批处理层记录为字符串标签并继续，不会上升为 `AppError`；
//! 只有“整批无法开始/无法收尾”的情况才走这里。
//!
//! # 实现思路
//!
//! - 使用 `thiserror` 派生可读错误消息。
//! - 为 `ImageError` / `std::io::Error` 提供 `From` 转换，无需手动 map。
//! - 实现 `Serialize` 将错误序列化为字符串，供 `--json` 输出使用。

use serde::Serialize;

use crate::canvas::ImageError;

/// 应用级统一错误类型
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// 图片处理流水线错误（解码 / 尺寸 / 配置 / 编码 / 压缩包）
    #[error("{0}")]
    Image(#[from] ImageError),

    /// 文件系统 I/O 错误
    #[error("文件系统错误: {0}")]
    Io(#[from] std::io::Error),

    /// 输入或输出位置不可用
    #[error("{0}")]
    Storage(String),

    /// 设置文件读取或解析失败
    #[error("设置错误: {0}")]
    Settings(String),

    /// 批处理执行失败（后台线程异常等）
    #[error("批处理失败: {0}")]
    Batch(String),
}

/// 将错误序列化为人类可读的字符串。
impl Serialize for AppError {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn image_errors_keep_their_message() {
        let err: AppError = ImageError::Decode("坏数据".to_string()).into();
        assert_eq!(err.to_string(), "解码错误：坏数据");
    }

    #[test]
    fn serializes_as_plain_string() {
        let err = AppError::Storage("Invalid folder path".to_string());
        assert_eq!(
            serde_json::to_string(&err).unwrap(),
            "\"Invalid folder path\""
        );
    }
}
