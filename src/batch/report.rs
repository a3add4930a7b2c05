//! # 批处理报告
//!
//! 报告既用于人类可读的状态文本（`summary`），也可整体序列化为 JSON（`--json`）。
//! 状态文本使用固定的英文前缀，便于脚本解析。

use chrono::{DateTime, Local};
use serde::Serialize;
use std::fmt;

/// 状态文本中最多展示的错误条数。
pub const MAX_REPORTED_ERRORS: usize = 3;

/// 批处理模式。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum BatchMode {
    Single,
    Folder,
    Zip,
}

impl BatchMode {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Single => "single",
            Self::Folder => "folder",
            Self::Zip => "zip",
        }
    }

    /// 整批无法开始时的状态文本前缀。
    pub fn failure_prefix(self) -> &'static str {
        match self {
            Self::Single => "Error processing image",
            Self::Folder => "Error processing folder",
            Self::Zip => "Error processing zip file",
        }
    }
}

impl fmt::Display for BatchMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 单个成功条目。
#[derive(Debug, Clone, Serialize)]
pub struct ProcessedItem {
    pub name: String,
    pub output: String,
    pub original_size: (u32, u32),
    pub size: (u32, u32),
}

/// 一次批处理的完整结果。
#[derive(Debug, Clone, Serialize)]
pub struct BatchReport {
    pub mode: BatchMode,
    pub source: String,
    pub output: String,
    /// 枚举出的受支持条目总数。
    pub total: usize,
    pub processed: Vec<ProcessedItem>,
    /// `文件名: 错误消息` 形式的失败标签，按处理顺序。
    pub errors: Vec<String>,
    pub cancelled: bool,
    pub started_at: DateTime<Local>,
    pub finished_at: DateTime<Local>,
}

impl BatchReport {
    pub fn success_count(&self) -> usize {
        self.processed.len()
    }

    pub fn error_count(&self) -> usize {
        self.errors.len()
    }

    /// 至少有一个条目成功，或根本没有可处理的条目且未出错。
    pub fn is_success(&self) -> bool {
        !self.processed.is_empty() || self.errors.is_empty()
    }

    pub fn elapsed_ms(&self) -> i64 {
        (self.finished_at - self.started_at).num_milliseconds()
    }

    /// 人类可读的状态文本。
    pub fn summary(&self) -> String {
        let mut status = match self.mode {
            BatchMode::Single => match (self.processed.first(), self.errors.first()) {
                (Some(item), _) => format!(
                    "Original: {}x{} → Resized: {}x{}\nSaved to: {}",
                    item.original_size.0,
                    item.original_size.1,
                    item.size.0,
                    item.size.1,
                    item.output
                ),
                (None, Some(error)) => {
                    return format!("{}: {}", self.mode.failure_prefix(), error);
                }
                (None, None) => "No image processed".to_string(),
            },
            BatchMode::Folder => format!(
                "Processed {} images successfully\nOutput folder: {}",
                self.processed.len(),
                self.output
            ),
            BatchMode::Zip => format!("Processed {} images successfully", self.processed.len()),
        };

        if self.mode != BatchMode::Single && !self.errors.is_empty() {
            let shown: Vec<&str> = self
                .errors
                .iter()
                .take(MAX_REPORTED_ERRORS)
                .map(String::as_str)
                .collect();
            status.push_str(&format!(
                "\nErrors with {} files: {}",
                self.errors.len(),
                shown.join("; ")
            ));
        }

        if self.mode == BatchMode::Zip {
            status.push_str(&format!("\nSaved to: {}", self.output));
        }

        if self.cancelled {
            let attempted = self.processed.len() + self.errors.len();
            status.push_str(&format!(
                "\nCancelled after {} of {} files",
                attempted, self.total
            ));
        }

        status
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn report(mode: BatchMode, processed: usize, errors: &[&str]) -> BatchReport {
        let now = Local::now();
        BatchReport {
            mode,
            source: "in".to_string(),
            output: "out".to_string(),
            total: processed + errors.len(),
            processed: (0..processed)
                .map(|i| ProcessedItem {
                    name: format!("{i}.png"),
                    output: format!("out/{i}.png"),
                    original_size: (1000, 500),
                    size: (800, 600),
                })
                .collect(),
            errors: errors.iter().map(|e| e.to_string()).collect(),
            cancelled: false,
            started_at: now,
            finished_at: now,
        }
    }

    #[test]
    fn folder_summary_lists_first_three_errors() {
        let text = report(BatchMode::Folder, 2, &["a: x", "b: y", "c: z", "d: w"]).summary();
        assert_eq!(
            text,
            "Processed 2 images successfully\nOutput folder: out\nErrors with 4 files: a: x; b: y; c: z"
        );
    }

    #[test]
    fn folder_summary_without_errors() {
        assert_eq!(
            report(BatchMode::Folder, 3, &[]).summary(),
            "Processed 3 images successfully\nOutput folder: out"
        );
    }

    #[test]
    fn single_summary_shows_sizes() {
        assert_eq!(
            report(BatchMode::Single, 1, &[]).summary(),
            "Original: 1000x500 → Resized: 800x600\nSaved to: out/0.png"
        );
        assert_eq!(
            report(BatchMode::Single, 0, &["a.png: 解码错误：x"]).summary(),
            "Error processing image: a.png: 解码错误：x"
        );
    }

    #[test]
    fn zip_summary_mentions_archive() {
        assert_eq!(
            report(BatchMode::Zip, 1, &["bad.jpg: e"]).summary(),
            "Processed 1 images successfully\nErrors with 1 files: bad.jpg: e\nSaved to: out"
        );
    }

    #[test]
    fn success_requires_at_least_one_item_when_errors_exist() {
        assert!(report(BatchMode::Folder, 0, &[]).is_success());
        assert!(!report(BatchMode::Folder, 0, &["a: x"]).is_success());
        assert!(report(BatchMode::Folder, 1, &["a: x"]).is_success());
    }

    #[test]
    fn report_serializes_mode_lowercase() {
        let json = serde_json::to_value(report(BatchMode::Zip, 0, &[])).unwrap();
        assert_eq!(json["mode"], "zip");
        assert_eq!(json["errors"].as_array().unwrap().len(), 0);
    }
}
