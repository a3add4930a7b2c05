//! # 批处理主循环
//!
//! ## 设计思路
//!
//! 一个 `BatchRunner` 由“源枚举器 + 输出落点”参数化，三种模式共用同一条主循环。
//! 单个条目的任何失败都只记录为 `文件名: 消息`，绝不中断整批。
//!
//! ## 实现思路
//!
//! 1. 启动时取一次配置快照，整批使用同一组参数
//! 2. 枚举条目（失败即整批失败）→ 准备输出
//! 3. 每个条目前轮询取消钩子；处理后回调进度 `(done, total, name)`
//! 4. 收尾输出并生成 `BatchReport`

use chrono::Local;

use super::report::{BatchMode, BatchReport, ProcessedItem};
use super::sink::OutputSink;
use super::source::{ItemPayload, SourceEnumerator, SourceItem};
use crate::canvas::{CanvasConfig, CanvasHandler, EncodedImage, ResizeRequest};
use crate::error::AppError;

/// 批处理执行器。
pub struct BatchRunner<S, O> {
    mode: BatchMode,
    handler: CanvasHandler,
    request: ResizeRequest,
    source: S,
    sink: O,
}

impl<S, O> BatchRunner<S, O>
where
    S: SourceEnumerator,
    O: OutputSink,
{
    pub fn new(
        mode: BatchMode,
        handler: CanvasHandler,
        request: ResizeRequest,
        source: S,
        sink: O,
    ) -> Self {
        Self {
            mode,
            handler,
            request,
            source,
            sink,
        }
    }

    /// 不带进度与取消钩子的便捷入口。
    pub fn run(self) -> Result<BatchReport, AppError> {
        self.run_with_hooks(|_, _, _| {}, || false)
    }

    /// 执行整批处理。
    ///
    /// - `on_progress(done, total, name)`：每个条目处理完（无论成败）后调用
    /// - `is_cancelled()`：每个条目开始前轮询，返回 `true` 时干净退出并标记报告
    pub fn run_with_hooks<P, C>(
        mut self,
        mut on_progress: P,
        is_cancelled: C,
    ) -> Result<BatchReport, AppError>
    where
        P: FnMut(usize, usize, &str),
        C: Fn() -> bool,
    {
        let started_at = Local::now();
        let config = self.handler.config_snapshot()?;

        log::info!(
            "🚀 开始批处理 - 模式: {} 来源: {} 目标: {}x{} 保持比例: {} 背景: {} 档位: {}",
            self.mode,
            self.source.describe(),
            self.request.width,
            self.request.height,
            self.request.maintain_aspect,
            self.request.policy,
            config.infer_resampling_profile().as_str()
        );

        let items = self.source.enumerate(&config)?;
        self.sink.prepare()?;

        let total = items.len();
        let mut processed = Vec::with_capacity(total);
        let mut errors = Vec::new();
        let mut cancelled = false;

        for (index, item) in items.into_iter().enumerate() {
            if is_cancelled() {
                log::warn!("🛑 批处理已取消 - 已完成 {}/{}", index, total);
                cancelled = true;
                break;
            }

            let name = item.name.clone();
            let label = item.file_name().to_string();

            match self.process_item(item, &config) {
                Ok(done) => processed.push(done),
                Err(err) => {
                    log::warn!("❌ 处理失败 - {}: {}", name, err);
                    errors.push(format!("{}: {}", label, err));
                }
            }

            on_progress(index + 1, total, &name);
        }

        self.sink.finish()?;

        let report = BatchReport {
            mode: self.mode,
            source: self.source.describe(),
            output: self.sink.location().display().to_string(),
            total,
            processed,
            errors,
            cancelled,
            started_at,
            finished_at: Local::now(),
        };

        log::info!(
            "🏁 批处理结束 - 成功: {} 失败: {} 取消: {} 耗时: {}ms",
            report.success_count(),
            report.error_count(),
            report.cancelled,
            report.elapsed_ms()
        );

        Ok(report)
    }

    fn process_item(
        &mut self,
        item: SourceItem,
        config: &CanvasConfig,
    ) -> Result<ProcessedItem, AppError> {
        let output_format = self.sink.output_format();
        let encoded: EncodedImage = match item.payload {
            ItemPayload::File(path) => {
                self.handler
                    .process_file(&path, output_format, &self.request, config)?
            }
            ItemPayload::Bytes(bytes) => {
                self.handler
                    .process_bytes(bytes, &item.name, output_format, &self.request, config)?
            }
            ItemPayload::Rejected(err) => return Err(err.into()),
        };

        let output = self.sink.write(&item.name, &encoded)?;

        Ok(ProcessedItem {
            name: item.name,
            output,
            original_size: encoded.original_size,
            size: encoded.size,
        })
    }
}
