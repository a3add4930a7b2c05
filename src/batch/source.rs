//! # 源枚举器
//!
//! ## 设计思路
//!
//! 单图、文件夹、压缩包三种输入只在“列出待处理条目”这一步不同，
//! 因此抽象为 `SourceEnumerator`，批处理主循环只写一份。
//!
//! ## 实现思路
//!
//! - 文件夹：只看一层，不递归；按文件名排序保证输出顺序稳定。
//! - 压缩包：递归读取所有文件条目到内存，保留相对路径；
//!   路径不安全（`..`、绝对路径）的条目直接跳过。
//!   读取前先用条目头声明的大小比对 `max_file_size`，超限条目不解压，直接记为该条目的错误；
//!   实际读取也以上限为界，头信息不可信时同样不会越界占用内存。
//! - 不受支持扩展名的条目在枚举阶段就被过滤，不计入总数。

use std::fs::{self, File};
use std::io::Read;
use std::path::PathBuf;

use crate::canvas::{CanvasConfig, ImageError, SUPPORTED_EXTENSIONS, is_supported_image};
use crate::error::AppError;

/// 条目载荷：磁盘文件、已读入内存的字节，或枚举阶段就已判定失败的条目。
#[derive(Debug)]
pub enum ItemPayload {
    File(PathBuf),
    Bytes(Vec<u8>),
    Rejected(ImageError),
}

/// 待处理条目。
#[derive(Debug)]
pub struct SourceItem {
    /// 输出时使用的相对名称（文件名或压缩包内路径，`/` 分隔）。
    pub name: String,
    pub payload: ItemPayload,
}

impl SourceItem {
    /// 名称的最后一段，用于错误标签。
    pub fn file_name(&self) -> &str {
        self.name.rsplit('/').next().unwrap_or(&self.name)
    }
}

/// 批处理的输入一侧。
pub trait SourceEnumerator {
    /// 列出所有受支持的条目；失败即整批失败。
    ///
    /// `config` 与处理阶段是同一份快照，用于在读取前拦截超限条目。
    fn enumerate(&mut self, config: &CanvasConfig) -> Result<Vec<SourceItem>, AppError>;

    /// 输入位置描述（日志与报告使用）。
    fn describe(&self) -> String;
}

/// 单个图片文件。
#[derive(Debug, Clone)]
pub struct SingleFileSource {
    path: PathBuf,
}

impl SingleFileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl SourceEnumerator for SingleFileSource {
    fn enumerate(&mut self, _config: &CanvasConfig) -> Result<Vec<SourceItem>, AppError> {
        if !self.path.is_file() {
            return Err(ImageError::FileSystem(format!(
                "文件不存在：{}",
                self.path.display()
            ))
            .into());
        }

        let name = self
            .path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| self.path.display().to_string());

        Ok(vec![SourceItem {
            name,
            payload: ItemPayload::File(self.path.clone()),
        }])
    }

    fn describe(&self) -> String {
        self.path.display().to_string()
    }
}

/// 文件夹（非递归）。
#[derive(Debug, Clone)]
pub struct DirectorySource {
    dir: PathBuf,
}

impl DirectorySource {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }
}

impl SourceEnumerator for DirectorySource {
    fn enumerate(&mut self, _config: &CanvasConfig) -> Result<Vec<SourceItem>, AppError> {
        if !self.dir.is_dir() {
            return Err(AppError::Storage("Invalid folder path".to_string()));
        }

        let mut items = Vec::new();
        for entry in fs::read_dir(&self.dir)? {
            let entry = entry?;
            let path = entry.path();
            if !path.is_file() {
                continue;
            }
            if !is_supported_image(&path) {
                log::debug!(
                    "⏭️ 跳过非图片文件: {}（支持：{}）",
                    path.display(),
                    SUPPORTED_EXTENSIONS.join(" ")
                );
                continue;
            }
            items.push(SourceItem {
                name: entry.file_name().to_string_lossy().to_string(),
                payload: ItemPayload::File(path),
            });
        }

        items.sort_by(|a, b| a.name.cmp(&b.name));
        log::info!("📂 文件夹枚举完成 - {} 个图片: {}", items.len(), self.dir.display());
        Ok(items)
    }

    fn describe(&self) -> String {
        self.dir.display().to_string()
    }
}

/// 压缩包（递归所有条目）。
#[derive(Debug, Clone)]
pub struct ZipSource {
    path: PathBuf,
}

impl ZipSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl SourceEnumerator for ZipSource {
    fn enumerate(&mut self, config: &CanvasConfig) -> Result<Vec<SourceItem>, AppError> {
        let file = File::open(&self.path).map_err(|e| {
            ImageError::Archive(format!("无法打开压缩包 {}：{}", self.path.display(), e))
        })?;
        let mut archive = zip::ZipArchive::new(file)
            .map_err(|e| ImageError::Archive(format!("无法读取压缩包：{}", e)))?;

        let mut items = Vec::new();
        for index in 0..archive.len() {
            let mut entry = archive
                .by_index(index)
                .map_err(|e| ImageError::Archive(format!("无法读取条目 #{}：{}", index, e)))?;

            if entry.is_dir() {
                continue;
            }
            if entry.enclosed_name().is_none() {
                log::warn!("⚠️ 跳过路径不安全的压缩包条目: {}", entry.name());
                continue;
            }

            let name = entry.name().to_string();
            if !is_supported_image(&name) {
                log::debug!("⏭️ 跳过非图片条目: {}", name);
                continue;
            }

            let declared_size = entry.size();
            let payload = match read_entry(&mut entry, declared_size, &name, config) {
                Ok(bytes) => ItemPayload::Bytes(bytes),
                Err(err) => {
                    log::warn!("⚠️ 压缩包条目未读取 - {}: {}", name, err);
                    ItemPayload::Rejected(err)
                }
            };

            items.push(SourceItem { name, payload });
        }

        log::info!(
            "🗜️ 压缩包枚举完成 - {} 个图片: {}",
            items.len(),
            self.path.display()
        );
        Ok(items)
    }

    fn describe(&self) -> String {
        self.path.display().to_string()
    }
}

/// 以 `max_file_size` 为界读取单个条目。
fn read_entry(
    entry: &mut impl Read,
    declared_size: u64,
    name: &str,
    config: &CanvasConfig,
) -> Result<Vec<u8>, ImageError> {
    config.check_file_size(declared_size)?;

    let limit = config.max_file_size;
    let mut bytes = Vec::with_capacity(declared_size.min(limit) as usize);
    entry
        .take(limit.saturating_add(1))
        .read_to_end(&mut bytes)
        .map_err(|e| ImageError::Archive(format!("无法解压条目 {}：{}", name, e)))?;

    config.check_file_size(bytes.len() as u64)?;
    Ok(bytes)
}
