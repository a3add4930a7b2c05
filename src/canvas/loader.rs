//! # 加载与校验模块
//!
//! ## 设计思路
//!
//! 统一处理不同来源（本地文件 / 压缩包条目）的原始字节加载，并在“尽可能早”的阶段执行输入校验。
//! 目标是尽快失败，减少不必要内存与 CPU 消耗。
//!
//! ## 实现思路
//!
//! - 文件：存在性 + metadata 体积限制 + 读取。
//! - 内存字节（压缩包条目）：体积限制。
//! - 两者最后都做 magic bytes 签名校验，非图片内容直接拒绝。

use std::path::Path;

use super::source::RawImageData;
use super::{CanvasConfig, ImageError};

/// 从本地路径加载图片原始字节。
pub fn load_from_file(path: &Path, config: &CanvasConfig) -> Result<RawImageData, ImageError> {
    log::debug!("📁 开始读取本地图片 - 路径: {}", path.display());

    if !path.is_file() {
        return Err(ImageError::FileSystem(format!("文件不存在：{}", path.display())));
    }

    let metadata = std::fs::metadata(path)
        .map_err(|e| ImageError::FileSystem(format!("无法读取文件信息：{}", e)))?;

    config.check_file_size(metadata.len())?;

    let bytes = std::fs::read(path)
        .map_err(|e| ImageError::FileSystem(format!("无法读取图片文件：{}", e)))?;
    validate_image_signature(&bytes)?;

    Ok(RawImageData {
        bytes,
        source_hint: path.display().to_string(),
    })
}

/// 包装已在内存中的字节（例如压缩包条目）。
pub fn load_from_bytes(
    bytes: Vec<u8>,
    source_hint: impl Into<String>,
    config: &CanvasConfig,
) -> Result<RawImageData, ImageError> {
    config.check_file_size(bytes.len() as u64)?;
    validate_image_signature(&bytes)?;

    Ok(RawImageData {
        bytes,
        source_hint: source_hint.into(),
    })
}

/// 通过文件签名（magic bytes）校验输入是否为图片。
///
/// 无法识别的签名交给解码器判定，已识别为非图片类型才在这里拒绝。
fn validate_image_signature(bytes: &[u8]) -> Result<(), ImageError> {
    if bytes.is_empty() {
        return Err(ImageError::Decode("图片内容为空".to_string()));
    }

    if let Some(kind) = infer::get(bytes) {
        if kind.matcher_type() != infer::MatcherType::Image {
            return Err(ImageError::Decode(format!(
                "文件签名不是图片类型：{}",
                kind.mime_type()
            )));
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const PNG_MAGIC: [u8; 8] = [0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A];

    #[test]
    fn empty_payload_is_a_decode_error() {
        let result = load_from_bytes(Vec::new(), "empty", &CanvasConfig::default());
        assert!(matches!(result, Err(ImageError::Decode(_))));
    }

    #[test]
    fn non_image_signature_is_rejected() {
        // ZIP 签名
        let bytes = vec![0x50, 0x4B, 0x03, 0x04, 0, 0, 0, 0, 0, 0, 0, 0];
        let result = load_from_bytes(bytes, "fake.png", &CanvasConfig::default());
        assert!(matches!(result, Err(ImageError::Decode(_))));
    }

    #[test]
    fn image_signature_passes() {
        let raw = load_from_bytes(PNG_MAGIC.to_vec(), "magic.png", &CanvasConfig::default())
            .unwrap();
        assert_eq!(raw.source_hint, "magic.png");
    }

    #[test]
    fn oversized_payload_is_a_resource_limit() {
        let config = CanvasConfig {
            max_file_size: 4,
            ..CanvasConfig::default()
        };
        let result = load_from_bytes(PNG_MAGIC.to_vec(), "big.png", &config);
        assert!(matches!(result, Err(ImageError::ResourceLimit(_))));
    }

    #[test]
    fn missing_file_is_a_filesystem_error() {
        let result = load_from_file(Path::new("/definitely/not/here.png"), &CanvasConfig::default());
        assert!(matches!(result, Err(ImageError::FileSystem(_))));
    }
}
