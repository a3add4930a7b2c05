//! # 批处理模块（batch）
//!
//! ## 设计思路
//!
//! 单图 / 文件夹 / 压缩包三种模式只在“从哪读”和“写到哪”上不同：
//!
//! - `source`：`SourceEnumerator` 及三种实现
//! - `sink`：`OutputSink` 及三种实现
//! - `runner`：`BatchRunner` 主循环（进度、取消、错误汇总）
//! - `report`：`BatchReport` 与状态文本
//!
//! ## 使用示例
//!
//! ```rust,no_run
//! use canvas_resizer::batch::{BatchMode, BatchRunner, DirectorySink, DirectorySource};
//! use canvas_resizer::canvas::{CanvasHandler, ResizeRequest};
//!
//! let report = BatchRunner::new(
//!     BatchMode::Folder,
//!     CanvasHandler::default(),
//!     ResizeRequest::new(800, 600),
//!     DirectorySource::new("photos"),
//!     DirectorySink::new("resized_photos"),
//! )
//! .run()?;
//! println!("{}", report.summary());
//! # Ok::<(), canvas_resizer::error::AppError>(())
//! ```

mod report;
mod runner;
mod sink;
mod source;

pub use report::{BatchMode, BatchReport, MAX_REPORTED_ERRORS, ProcessedItem};
pub use runner::BatchRunner;
pub use sink::{DirectorySink, OutputSink, SingleFileSink, ZipSink};
pub use source::{
    DirectorySource, ItemPayload, SingleFileSource, SourceEnumerator, SourceItem, ZipSource,
};
