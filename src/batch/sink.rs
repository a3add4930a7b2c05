//! # 输出落点
//!
//! 与 `SourceEnumerator` 对称：单文件、目录、压缩包三种写出方式共用一个 trait。
//! 目录与压缩包都在 `prepare` 才真正创建，枚举失败时不会留下空的输出物。

use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

use crate::canvas::{ContainerFormat, EncodedImage, ImageError};
use crate::error::AppError;
use crate::storage;

/// 批处理的输出一侧。
pub trait OutputSink {
    /// 枚举成功后、处理第一个条目前调用。
    fn prepare(&mut self) -> Result<(), AppError>;

    /// 写出一个结果，返回其落点描述（文件路径或压缩包内路径）。
    fn write(&mut self, name: &str, image: &EncodedImage) -> Result<String, AppError>;

    /// 收尾（压缩包需要写中央目录）。
    fn finish(&mut self) -> Result<(), AppError>;

    fn location(&self) -> &Path;

    /// 输出容器格式；`None` 表示沿用每个条目的源格式。
    fn output_format(&self) -> Option<ContainerFormat> {
        None
    }
}

fn ensure_parent(path: &Path) -> Result<(), AppError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        storage::ensure_dir(parent)?;
    }
    Ok(())
}

/// 单图模式：写到一个确定的文件路径，忽略条目名。
///
/// 编码格式由目标路径的扩展名决定，不受支持的扩展名在 `prepare` 阶段拒绝。
#[derive(Debug, Clone)]
pub struct SingleFileSink {
    path: PathBuf,
}

impl SingleFileSink {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl OutputSink for SingleFileSink {
    fn prepare(&mut self) -> Result<(), AppError> {
        if self.output_format().is_none() {
            return Err(ImageError::InvalidFormat(format!(
                "不支持的输出扩展名：{}",
                self.path.display()
            ))
            .into());
        }
        ensure_parent(&self.path)?;
        Ok(())
    }

    fn write(&mut self, _name: &str, image: &EncodedImage) -> Result<String, AppError> {
        fs::write(&self.path, &image.bytes)?;
        Ok(self.path.display().to_string())
    }

    fn finish(&mut self) -> Result<(), AppError> {
        Ok(())
    }

    fn location(&self) -> &Path {
        &self.path
    }

    fn output_format(&self) -> Option<ContainerFormat> {
        ContainerFormat::from_path(&self.path)
    }
}

/// 文件夹模式：输出目录下与原文件同名。
#[derive(Debug, Clone)]
pub struct DirectorySink {
    dir: PathBuf,
}

impl DirectorySink {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }
}

impl OutputSink for DirectorySink {
    fn prepare(&mut self) -> Result<(), AppError> {
        storage::ensure_dir(&self.dir)?;
        Ok(())
    }

    fn write(&mut self, name: &str, image: &EncodedImage) -> Result<String, AppError> {
        let path = self.dir.join(name);
        fs::write(&path, &image.bytes)?;
        Ok(path.display().to_string())
    }

    fn finish(&mut self) -> Result<(), AppError> {
        Ok(())
    }

    fn location(&self) -> &Path {
        &self.dir
    }
}

/// 压缩包模式：Deflate 压缩，保留条目相对路径。
pub struct ZipSink {
    path: PathBuf,
    writer: Option<ZipWriter<File>>,
}

impl ZipSink {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            writer: None,
        }
    }

    fn options() -> SimpleFileOptions {
        SimpleFileOptions::default().compression_method(CompressionMethod::Deflated)
    }
}

impl OutputSink for ZipSink {
    fn prepare(&mut self) -> Result<(), AppError> {
        ensure_parent(&self.path)?;
        let file = File::create(&self.path).map_err(|e| {
            ImageError::Archive(format!("无法创建压缩包 {}：{}", self.path.display(), e))
        })?;
        self.writer = Some(ZipWriter::new(file));
        Ok(())
    }

    fn write(&mut self, name: &str, image: &EncodedImage) -> Result<String, AppError> {
        let writer = self
            .writer
            .as_mut()
            .ok_or_else(|| ImageError::Archive("压缩包尚未创建".to_string()))?;

        writer
            .start_file(name, Self::options())
            .map_err(|e| ImageError::Archive(format!("无法写入条目 {}：{}", name, e)))?;
        writer
            .write_all(&image.bytes)
            .map_err(|e| ImageError::Archive(format!("无法写入条目 {}：{}", name, e)))?;

        Ok(name.to_string())
    }

    fn finish(&mut self) -> Result<(), AppError> {
        if let Some(writer) = self.writer.take() {
            writer
                .finish()
                .map_err(|e| ImageError::Archive(format!("无法完成压缩包：{}", e)))?;
        }
        Ok(())
    }

    fn location(&self) -> &Path {
        &self.path
    }
}
