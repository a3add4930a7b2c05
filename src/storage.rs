//! 输出位置管理模块
//!
//! # 设计思路
//!
//! 统一管理三种模式的默认输出位置，支持用户自定义，并在目录不存在时自动创建。
//!
//! # 实现思路
//!
//! - 单图：原文件旁的 `<stem>_resized.<ext>`。
//! - 文件夹：与文件夹同级的 `resized_<文件夹名>` 目录，文件名保持不变。
//! - 压缩包：原压缩包旁的 `<stem>_resized.zip`。
//! - 所有可能失败的操作均返回 `Result`，不使用 `expect()` / `unwrap()`。

use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::AppError;

/// 输出目录信息
#[derive(Debug, Clone, Serialize)]
pub struct OutputDirInfo {
    pub path: String,
    pub total_size: u64,
    pub file_count: u64,
}

/// 单图模式的默认输出路径。
///
/// 后缀按文件名最后一个 `.` 切分，与图片识别规则一致（`.png` → `_resized.png`）。
pub fn single_output_path(source: &Path) -> PathBuf {
    let name = source
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| "output".to_string());
    let file_name = match name.rsplit_once('.') {
        Some((stem, ext)) => format!("{stem}_resized.{ext}"),
        None => format!("{name}_resized"),
    };
    source.with_file_name(file_name)
}

/// 压缩包模式的默认输出路径。
pub fn zip_output_path(source: &Path) -> PathBuf {
    let stem = source
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_else(|| "output".to_string());
    source.with_file_name(format!("{stem}_resized.zip"))
}

/// 文件夹模式的默认输出目录：与源文件夹同级的 `resized_<名称>`。
///
/// # 返回
/// - `Ok(PathBuf)`：输出目录路径（尚未创建）
/// - `Err(AppError::Storage)`：源文件夹不存在或无法解析名称
pub fn folder_output_dir(folder: &Path) -> Result<PathBuf, AppError> {
    if !folder.is_dir() {
        return Err(AppError::Storage("Invalid folder path".to_string()));
    }

    // 规范化以支持 `.`、结尾分隔符等写法。
    let folder = fs::canonicalize(folder)
        .map_err(|e| AppError::Storage(format!("解析文件夹路径失败: {}", e)))?;
    let name = folder
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .ok_or_else(|| AppError::Storage("Invalid folder path".to_string()))?;
    let parent = folder.parent().unwrap_or(&folder);

    Ok(parent.join(format!("resized_{name}")))
}

/// 确保目录存在，必要时递归创建。
pub fn ensure_dir(dir: &Path) -> Result<PathBuf, AppError> {
    if !dir.exists() {
        fs::create_dir_all(dir).map_err(|e| {
            AppError::Storage(format!("创建目录 '{}' 失败: {}", dir.display(), e))
        })?;
    }
    Ok(dir.to_path_buf())
}

/// 获取输出目录信息（路径 + 占用大小 + 文件数）
pub fn get_output_dir_info(dir: &Path) -> Result<OutputDirInfo, AppError> {
    let mut total_size: u64 = 0;
    let mut file_count: u64 = 0;

    if dir.exists() {
        for entry in fs::read_dir(dir)?.flatten() {
            if let Ok(metadata) = entry.metadata() {
                if metadata.is_file() {
                    total_size += metadata.len();
                    file_count += 1;
                }
            }
        }
    }

    Ok(OutputDirInfo {
        path: dir.to_string_lossy().to_string(),
        total_size,
        file_count,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_output_sits_next_to_source() {
        assert_eq!(
            single_output_path(Path::new("/a/b/photo.JPG")),
            PathBuf::from("/a/b/photo_resized.JPG")
        );
        assert_eq!(
            single_output_path(Path::new("noext")),
            PathBuf::from("noext_resized")
        );
        assert_eq!(
            single_output_path(Path::new("/a/.png")),
            PathBuf::from("/a/_resized.png")
        );
    }

    #[test]
    fn zip_output_gets_resized_suffix() {
        assert_eq!(
            zip_output_path(Path::new("/tmp/batch.zip")),
            PathBuf::from("/tmp/batch_resized.zip")
        );
    }

    #[test]
    fn folder_output_is_a_sibling() {
        let root = tempfile::tempdir().unwrap();
        let folder = root.path().join("photos");
        fs::create_dir(&folder).unwrap();

        let out = folder_output_dir(&folder).unwrap();
        assert_eq!(out.file_name().unwrap(), "resized_photos");
        assert_eq!(
            out.parent().unwrap(),
            fs::canonicalize(root.path()).unwrap()
        );
    }

    #[test]
    fn missing_folder_is_invalid() {
        let err = folder_output_dir(Path::new("/definitely/not/here")).unwrap_err();
        assert_eq!(err.to_string(), "Invalid folder path");
    }

    #[test]
    fn dir_info_counts_files_only() {
        let root = tempfile::tempdir().unwrap();
        fs::write(root.path().join("a.png"), [0u8; 10]).unwrap();
        fs::write(root.path().join("b.png"), [0u8; 5]).unwrap();
        fs::create_dir(root.path().join("sub")).unwrap();

        let info = get_output_dir_info(root.path()).unwrap();
        assert_eq!(info.file_count, 2);
        assert_eq!(info.total_size, 15);

        let created = ensure_dir(&root.path().join("x/y")).unwrap();
        assert!(created.is_dir());
    }
}
